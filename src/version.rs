//! Next-release naming.
//!
//! Computes the tag, branch and release name a workflow is about to create,
//! starting from the latest release tag and the project's versioning strategy.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::version::bump_semver;
use crate::domain::{
    CalendarVersion, ReleaseVersion, TagParts, TagPrefix, VersionBump, VersioningStrategy,
};
use crate::error::{GitReleaseError, Result};

/// Version a semver repository starts at when it has no release yet
pub const INITIAL_SEMVER: semver::Version = semver::Version::new(1, 0, 0);

/// Names of the git objects a workflow will create
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GitInfo {
    pub version: String,
    pub tag_name: String,
    pub rc_branch: String,
    pub release_name: String,
}

impl GitInfo {
    fn from_parts(parts: &TagParts) -> Self {
        GitInfo {
            version: parts.version.to_string(),
            tag_name: parts.tag_name(),
            rc_branch: parts.rc_branch(),
            release_name: parts.release_name(),
        }
    }
}

/// Compute the next release candidate.
///
/// - **Semver**: bumps the latest tag by `bump`; starts at `1.0.0` when there
///   is no release. A collision with an existing tag is an error.
/// - **Calver**: uses `today`, with the counter set one past the highest
///   counter any existing tag already uses for that date.
///
/// # Arguments
/// * `strategy` - The project's versioning strategy
/// * `latest_tag` - Tag of the latest release, if any
/// * `bump` - Requested bump (ignored for calver)
/// * `today` - Date used for calendar versions
/// * `existing_tags` - Every tag name already in the repository
pub fn next_rc(
    strategy: VersioningStrategy,
    latest_tag: Option<&str>,
    bump: VersionBump,
    today: NaiveDate,
    existing_tags: &[String],
) -> Result<GitInfo> {
    let version = match strategy {
        VersioningStrategy::Semver => {
            let next = match latest_tag {
                Some(tag) => match TagParts::parse(tag, strategy)?.version {
                    ReleaseVersion::Semantic(current) => bump_semver(&current, bump)?,
                    ReleaseVersion::Calendar(_) => {
                        return Err(GitReleaseError::version(format!(
                            "Tag '{}' is not a semantic version",
                            tag
                        )))
                    }
                },
                None => INITIAL_SEMVER,
            };
            ReleaseVersion::Semantic(next)
        }
        VersioningStrategy::Calver => {
            ReleaseVersion::Calendar(next_calendar_version(today, existing_tags)?)
        }
    };

    let parts = TagParts::new(TagPrefix::Rc, version);
    let info = GitInfo::from_parts(&parts);

    if existing_tags.iter().any(|t| t == &info.tag_name) {
        return Err(GitReleaseError::version(format!(
            "Tag '{}' already exists",
            info.tag_name
        )));
    }

    Ok(info)
}

/// First free calendar version for `today`
pub fn next_calendar_version(today: NaiveDate, existing_tags: &[String]) -> Result<CalendarVersion> {
    let highest = existing_tags
        .iter()
        .filter_map(|tag| TagParts::parse(tag, VersioningStrategy::Calver).ok())
        .filter_map(|parts| match parts.version {
            ReleaseVersion::Calendar(cv) if cv.date == today => Some(cv.patch),
            _ => None,
        })
        .max();

    match highest {
        Some(patch) => CalendarVersion::new(today, patch).bump_patch(),
        None => Ok(CalendarVersion::new(today, 0)),
    }
}

/// Tag produced when the latest release candidate is promoted.
///
/// The branch is the one the candidate was cut on; promoting never creates a
/// new branch.
pub fn promoted(strategy: VersioningStrategy, rc_tag: &str, release_branch: &str) -> Result<GitInfo> {
    let parts = TagParts::parse(rc_tag, strategy)?;
    if parts.prefix != TagPrefix::Rc {
        return Err(GitReleaseError::version(format!(
            "Tag '{}' is not a release candidate",
            rc_tag
        )));
    }

    let promoted = parts.with_prefix(TagPrefix::Version);
    Ok(GitInfo {
        rc_branch: release_branch.to_string(),
        ..GitInfo::from_parts(&promoted)
    })
}

/// Tag produced by patching the latest release: same prefix, patch segment
/// (or calendar counter) incremented.
pub fn next_patch(strategy: VersioningStrategy, latest_tag: &str, release_branch: &str) -> Result<GitInfo> {
    let parts = TagParts::parse(latest_tag, strategy)?;
    let bumped = TagParts::new(parts.prefix, parts.version.bump(VersionBump::Patch)?);
    Ok(GitInfo {
        rc_branch: release_branch.to_string(),
        ..GitInfo::from_parts(&bumped)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_next_rc_semver_bumps() {
        let today = day(2024, 3, 1);
        let minor = next_rc(VersioningStrategy::Semver, Some("rc-1.2.3"), VersionBump::Minor, today, &[]).unwrap();
        assert_eq!(minor.version, "1.3.0");
        assert_eq!(minor.tag_name, "rc-1.3.0");
        assert_eq!(minor.rc_branch, "rc/1.3.0");
        assert_eq!(minor.release_name, "Version 1.3.0");

        let major = next_rc(VersioningStrategy::Semver, Some("version-1.2.3"), VersionBump::Major, today, &[]).unwrap();
        assert_eq!(major.version, "2.0.0");

        let patch = next_rc(VersioningStrategy::Semver, Some("rc-1.2.3"), VersionBump::Patch, today, &[]).unwrap();
        assert_eq!(patch.version, "1.2.4");
    }

    #[test]
    fn test_next_rc_semver_without_release() {
        let info = next_rc(VersioningStrategy::Semver, None, VersionBump::Minor, day(2024, 3, 1), &[]).unwrap();
        assert_eq!(info.tag_name, "rc-1.0.0");
    }

    #[test]
    fn test_next_rc_semver_collision_is_error() {
        let tags = vec!["rc-1.3.0".to_string()];
        let result = next_rc(VersioningStrategy::Semver, Some("rc-1.2.3"), VersionBump::Minor, day(2024, 3, 1), &tags);
        assert!(result.is_err());
    }

    #[test]
    fn test_next_rc_calver_fresh_day() {
        let tags = vec!["version-2020.01.01_1".to_string()];
        let info = next_rc(VersioningStrategy::Calver, Some("version-2020.01.01_1"), VersionBump::Minor, day(2020, 1, 2), &tags).unwrap();
        assert_eq!(info.tag_name, "rc-2020.01.02_0");
        assert_eq!(info.rc_branch, "rc/2020.01.02_0");
    }

    #[test]
    fn test_next_rc_calver_same_day_collision() {
        let tags = vec![
            "rc-2020.01.01_0".to_string(),
            "version-2020.01.01_1".to_string(),
            "rc-2019.12.31_4".to_string(),
        ];
        let info = next_rc(VersioningStrategy::Calver, Some("version-2020.01.01_1"), VersionBump::Minor, day(2020, 1, 1), &tags).unwrap();
        assert_eq!(info.tag_name, "rc-2020.01.01_2");
        assert!(!tags.contains(&info.tag_name));
    }

    #[test]
    fn test_next_rc_calver_exhausted_counter_is_error() {
        let tags = vec!["rc-2020.01.01_4294967295".to_string()];
        let result = next_rc(VersioningStrategy::Calver, Some("rc-2020.01.01_4294967295"), VersionBump::Minor, day(2020, 1, 1), &tags);
        assert!(result.unwrap_err().to_string().contains("exhausted"));
    }

    #[test]
    fn test_promoted() {
        let info = promoted(VersioningStrategy::Semver, "rc-1.2.3", "rc/1.2.3").unwrap();
        assert_eq!(info.tag_name, "version-1.2.3");
        assert_eq!(info.rc_branch, "rc/1.2.3");
        assert!(promoted(VersioningStrategy::Semver, "version-1.2.3", "rc/1.2.3").is_err());
    }

    #[test]
    fn test_next_patch_keeps_prefix() {
        let rc = next_patch(VersioningStrategy::Semver, "rc-1.2.3", "rc/1.2.3").unwrap();
        assert_eq!(rc.tag_name, "rc-1.2.4");
        assert_eq!(rc.rc_branch, "rc/1.2.3");

        let released = next_patch(VersioningStrategy::Calver, "version-2020.01.01_1", "rc/2020.01.01_0").unwrap();
        assert_eq!(released.tag_name, "version-2020.01.01_2");
    }
}
