use crate::domain::project::VersioningStrategy;
use crate::domain::version::{CalendarVersion, ReleaseVersion};
use crate::error::{GitReleaseError, Result};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Prefix of a release tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagPrefix {
    /// Release candidate, `rc-…`
    Rc,
    /// Promoted release, `version-…`
    Version,
}

impl TagPrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            TagPrefix::Rc => "rc",
            TagPrefix::Version => "version",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "rc" => Some(TagPrefix::Rc),
            "version" => Some(TagPrefix::Version),
            _ => None,
        }
    }
}

impl fmt::Display for TagPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn semver_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(rc|version)-([0-9]+\.[0-9]+\.[0-9]+)$").expect("valid semver tag regex")
    })
}

fn calver_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(rc|version)-([0-9]{4}\.[0-9]{2}\.[0-9]{2}_[0-9]+)$")
            .expect("valid calver tag regex")
    })
}

/// A release tag split into prefix and version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagParts {
    pub prefix: TagPrefix,
    pub version: ReleaseVersion,
}

impl TagParts {
    pub fn new(prefix: TagPrefix, version: ReleaseVersion) -> Self {
        TagParts { prefix, version }
    }

    /// Parse a tag name according to the project's strategy
    ///
    /// # Examples
    /// ```ignore
    /// let parts = TagParts::parse("rc-1.2.3", VersioningStrategy::Semver)?;
    /// assert_eq!(parts.prefix, TagPrefix::Rc);
    /// ```
    pub fn parse(tag: &str, strategy: VersioningStrategy) -> Result<Self> {
        let (re, expected) = match strategy {
            VersioningStrategy::Semver => (semver_tag_regex(), "rc-1.2.3 or version-1.2.3"),
            VersioningStrategy::Calver => {
                (calver_tag_regex(), "rc-2020.01.01_1 or version-2020.01.01_1")
            }
        };

        let captures = re.captures(tag).ok_or_else(|| {
            GitReleaseError::version(format!(
                "Tag '{}' does not match the {} scheme (expected {})",
                tag, strategy, expected
            ))
        })?;

        let prefix = captures
            .get(1)
            .and_then(|m| TagPrefix::parse(m.as_str()))
            .ok_or_else(|| GitReleaseError::version(format!("Unknown prefix in tag '{}'", tag)))?;
        let raw_version = captures.get(2).map(|m| m.as_str()).unwrap_or_default();

        let version = match strategy {
            VersioningStrategy::Semver => {
                let parsed = semver::Version::parse(raw_version).map_err(|e| {
                    GitReleaseError::version(format!("Invalid version in '{}': {}", tag, e))
                })?;
                ReleaseVersion::Semantic(parsed)
            }
            VersioningStrategy::Calver => {
                ReleaseVersion::Calendar(CalendarVersion::parse(raw_version)?)
            }
        };

        Ok(TagParts { prefix, version })
    }

    pub fn tag_name(&self) -> String {
        format!("{}-{}", self.prefix, self.version)
    }

    /// Branch created when the release candidate is cut
    pub fn rc_branch(&self) -> String {
        format!("rc/{}", self.version)
    }

    pub fn release_name(&self) -> String {
        format!("Version {}", self.version)
    }

    pub fn with_prefix(&self, prefix: TagPrefix) -> Self {
        TagParts {
            prefix,
            version: self.version.clone(),
        }
    }
}

impl fmt::Display for TagParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.prefix, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_semver_rc() {
        let parts = TagParts::parse("rc-1.2.3", VersioningStrategy::Semver).unwrap();
        assert_eq!(parts.prefix, TagPrefix::Rc);
        assert_eq!(parts.version.to_string(), "1.2.3");
        assert_eq!(parts.rc_branch(), "rc/1.2.3");
        assert_eq!(parts.release_name(), "Version 1.2.3");
    }

    #[test]
    fn test_parse_semver_version() {
        let parts = TagParts::parse("version-10.0.7", VersioningStrategy::Semver).unwrap();
        assert_eq!(parts.prefix, TagPrefix::Version);
        assert_eq!(parts.tag_name(), "version-10.0.7");
    }

    #[test]
    fn test_parse_calver() {
        let parts = TagParts::parse("rc-2020.01.01_1", VersioningStrategy::Calver).unwrap();
        assert_eq!(parts.prefix, TagPrefix::Rc);
        assert_eq!(parts.tag_name(), "rc-2020.01.01_1");
    }

    #[test]
    fn test_parse_wrong_strategy() {
        assert!(TagParts::parse("rc-1.2.3", VersioningStrategy::Calver).is_err());
        assert!(TagParts::parse("rc-2020.01.01_1", VersioningStrategy::Semver).is_err());
    }

    #[test]
    fn test_parse_foreign_tags() {
        assert!(TagParts::parse("v1.2.3", VersioningStrategy::Semver).is_err());
        assert!(TagParts::parse("rc-1.2", VersioningStrategy::Semver).is_err());
        assert!(TagParts::parse("", VersioningStrategy::Semver).is_err());
    }

    #[test]
    fn test_with_prefix() {
        let rc = TagParts::parse("rc-1.2.3", VersioningStrategy::Semver).unwrap();
        assert_eq!(rc.with_prefix(TagPrefix::Version).tag_name(), "version-1.2.3");
    }
}
