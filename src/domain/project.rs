use crate::error::{GitReleaseError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Entity annotation holding the `owner/repo` slug
pub const PROJECT_SLUG_ANNOTATION: &str = "github.com/project-slug";

/// Entity annotation holding the versioning strategy
pub const VERSIONING_STRATEGY_ANNOTATION: &str = "git-release-manager/versioning-strategy";

/// Tag naming scheme used by a repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersioningStrategy {
    /// `MAJOR.MINOR.PATCH`
    #[default]
    Semver,
    /// `YYYY.MM.DD_N`
    Calver,
}

impl FromStr for VersioningStrategy {
    type Err = GitReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "semver" => Ok(VersioningStrategy::Semver),
            "calver" => Ok(VersioningStrategy::Calver),
            other => Err(GitReleaseError::validation(format!(
                "Unknown versioning strategy '{}' (expected 'semver' or 'calver')",
                other
            ))),
        }
    }
}

impl fmt::Display for VersioningStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersioningStrategy::Semver => write!(f, "semver"),
            VersioningStrategy::Calver => write!(f, "calver"),
        }
    }
}

/// Where a project's coordinates came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectSource {
    Cli,
    Entity,
    Config,
    GitRemote,
}

/// The repository every API call targets
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    pub owner: String,
    pub repo: String,
    pub versioning_strategy: VersioningStrategy,
    pub source: ProjectSource,
}

impl Project {
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        versioning_strategy: VersioningStrategy,
        source: ProjectSource,
    ) -> Self {
        Project {
            owner: owner.into(),
            repo: repo.into(),
            versioning_strategy,
            source,
        }
    }

    /// Build a project from an `owner/repo` slug.
    ///
    /// A malformed slug still yields a project (with empty parts) so that
    /// [`Project::validate`] reports the problem in one place.
    pub fn from_slug(slug: &str, strategy: VersioningStrategy, source: ProjectSource) -> Self {
        let mut parts = slug.trim().splitn(2, '/');
        let owner = parts.next().unwrap_or_default();
        let repo = parts.next().unwrap_or_default();
        Project::new(owner, repo, strategy, source)
    }

    /// Build a project from catalog entity annotations.
    ///
    /// The strategy annotation wins over `fallback_strategy` when present.
    pub fn from_annotations(
        annotations: &HashMap<String, String>,
        fallback_strategy: VersioningStrategy,
    ) -> Result<Self> {
        let slug = annotations
            .get(PROJECT_SLUG_ANNOTATION)
            .map(String::as_str)
            .unwrap_or_default();

        let strategy = match annotations.get(VERSIONING_STRATEGY_ANNOTATION) {
            Some(value) => value.parse()?,
            None => fallback_strategy,
        };

        Ok(Project::from_slug(slug, strategy, ProjectSource::Entity))
    }

    /// Owner and repo must both be non-empty and free of path separators
    pub fn validate(&self) -> Result<()> {
        if self.owner.trim().is_empty() {
            return Err(GitReleaseError::validation("owner must not be empty"));
        }
        if self.repo.trim().is_empty() {
            return Err(GitReleaseError::validation("repo must not be empty"));
        }
        if self.owner.contains('/') || self.repo.contains('/') {
            return Err(GitReleaseError::validation(format!(
                "'{}/{}' is not a valid owner/repo pair",
                self.owner, self.repo
            )));
        }
        Ok(())
    }

    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

/// The authenticated GitHub user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub email: Option<String>,
}
