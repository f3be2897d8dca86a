use crate::error::{GitReleaseError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const CALVER_DATE_FORMAT: &str = "%Y.%m.%d";

/// Version bump type requested by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionBump {
    Major,
    #[default]
    Minor,
    Patch,
}

impl FromStr for VersionBump {
    type Err = GitReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "major" => Ok(VersionBump::Major),
            "minor" => Ok(VersionBump::Minor),
            "patch" => Ok(VersionBump::Patch),
            other => Err(GitReleaseError::version(format!(
                "Invalid bump type '{}' (expected major, minor or patch)",
                other
            ))),
        }
    }
}

impl fmt::Display for VersionBump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionBump::Major => write!(f, "major"),
            VersionBump::Minor => write!(f, "minor"),
            VersionBump::Patch => write!(f, "patch"),
        }
    }
}

/// Calendar version: a date plus a patch counter, rendered `YYYY.MM.DD_N`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CalendarVersion {
    pub date: NaiveDate,
    pub patch: u32,
}

impl CalendarVersion {
    pub fn new(date: NaiveDate, patch: u32) -> Self {
        CalendarVersion { date, patch }
    }

    /// Parse `2020.01.01_1`
    pub fn parse(s: &str) -> Result<Self> {
        let (date_part, patch_part) = s.split_once('_').ok_or_else(|| {
            GitReleaseError::version(format!(
                "Invalid calendar version '{}' - expected YYYY.MM.DD_N",
                s
            ))
        })?;

        let date = NaiveDate::parse_from_str(date_part, CALVER_DATE_FORMAT).map_err(|e| {
            GitReleaseError::version(format!("Invalid date '{}': {}", date_part, e))
        })?;
        let patch = patch_part.parse::<u32>().map_err(|_| {
            GitReleaseError::version(format!("Invalid patch counter: {}", patch_part))
        })?;

        Ok(CalendarVersion { date, patch })
    }

    pub fn bump_patch(&self) -> Result<Self> {
        let patch = self.patch.checked_add(1).ok_or_else(|| {
            GitReleaseError::version(format!("Patch counter of {} is exhausted", self))
        })?;
        Ok(CalendarVersion {
            date: self.date,
            patch,
        })
    }

    /// The `YYYY.MM.DD` part, shared by every patch of the same day
    pub fn base(&self) -> String {
        self.date.format(CALVER_DATE_FORMAT).to_string()
    }
}

impl fmt::Display for CalendarVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.base(), self.patch)
    }
}

/// Either flavour of release version
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseVersion {
    Semantic(semver::Version),
    Calendar(CalendarVersion),
}

impl ReleaseVersion {
    /// Apply a semantic bump. Calendar versions only know patch bumps.
    pub fn bump(&self, bump: VersionBump) -> Result<Self> {
        match self {
            ReleaseVersion::Semantic(v) => Ok(ReleaseVersion::Semantic(bump_semver(v, bump)?)),
            ReleaseVersion::Calendar(v) => match bump {
                VersionBump::Patch => Ok(ReleaseVersion::Calendar(v.bump_patch()?)),
                other => Err(GitReleaseError::version(format!(
                    "Calendar versions cannot take a {} bump",
                    other
                ))),
            },
        }
    }

    /// Version with patch segment dropped: `1.2` for semver, the date for calver
    pub fn base(&self) -> String {
        match self {
            ReleaseVersion::Semantic(v) => format!("{}.{}", v.major, v.minor),
            ReleaseVersion::Calendar(v) => v.base(),
        }
    }
}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseVersion::Semantic(v) => write!(f, "{}", v),
            ReleaseVersion::Calendar(v) => write!(f, "{}", v),
        }
    }
}

/// Increment one segment and reset the lower ones
pub fn bump_semver(version: &semver::Version, bump: VersionBump) -> Result<semver::Version> {
    let next = |segment: u64| {
        segment.checked_add(1).ok_or_else(|| {
            GitReleaseError::version(format!("Cannot apply a {} bump to {}", bump, version))
        })
    };
    Ok(match bump {
        VersionBump::Major => semver::Version::new(next(version.major)?, 0, 0),
        VersionBump::Minor => semver::Version::new(version.major, next(version.minor)?, 0),
        VersionBump::Patch => {
            semver::Version::new(version.major, version.minor, next(version.patch)?)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> semver::Version {
        semver::Version::parse(s).unwrap()
    }

    #[test]
    fn test_bump_semver_patch() {
        assert_eq!(bump_semver(&v("1.2.3"), VersionBump::Patch).unwrap(), v("1.2.4"));
    }

    #[test]
    fn test_bump_semver_minor() {
        assert_eq!(bump_semver(&v("1.2.3"), VersionBump::Minor).unwrap(), v("1.3.0"));
    }

    #[test]
    fn test_bump_semver_major() {
        assert_eq!(bump_semver(&v("1.2.3"), VersionBump::Major).unwrap(), v("2.0.0"));
    }

    #[test]
    fn test_bump_semver_overflow_is_an_error() {
        let max = semver::Version::new(1, 2, u64::MAX);
        assert!(bump_semver(&max, VersionBump::Patch).is_err());
        assert_eq!(bump_semver(&max, VersionBump::Minor).unwrap(), v("1.3.0"));
    }

    #[test]
    fn test_calendar_counter_overflow_is_an_error() {
        let cv = CalendarVersion::new(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(), u32::MAX);
        let err = cv.bump_patch().unwrap_err();
        assert!(err.to_string().contains("exhausted"));
    }

    #[test]
    fn test_bump_from_str() {
        assert_eq!("MAJOR".parse::<VersionBump>().unwrap(), VersionBump::Major);
        assert!("huge".parse::<VersionBump>().is_err());
    }

    #[test]
    fn test_calendar_parse_and_display() {
        let cv = CalendarVersion::parse("2020.01.01_1").unwrap();
        assert_eq!(cv.date, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(cv.patch, 1);
        assert_eq!(cv.to_string(), "2020.01.01_1");
    }

    #[test]
    fn test_calendar_parse_invalid() {
        assert!(CalendarVersion::parse("2020.01.01").is_err());
        assert!(CalendarVersion::parse("2020.13.01_0").is_err());
        assert!(CalendarVersion::parse("2020.01.01_x").is_err());
    }

    #[test]
    fn test_calendar_rejects_minor_bump() {
        let cv = ReleaseVersion::Calendar(CalendarVersion::parse("2020.01.01_0").unwrap());
        assert!(cv.bump(VersionBump::Minor).is_err());
        assert_eq!(
            cv.bump(VersionBump::Patch).unwrap().to_string(),
            "2020.01.01_1"
        );
    }

    #[test]
    fn test_release_version_base() {
        assert_eq!(ReleaseVersion::Semantic(v("1.2.3")).base(), "1.2");
        let cv = ReleaseVersion::Calendar(CalendarVersion::parse("2021.05.04_3").unwrap());
        assert_eq!(cv.base(), "2021.05.04");
    }
}
