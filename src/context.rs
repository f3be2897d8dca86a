//! Project and user resolution.
//!
//! A [`ReleaseContext`] is built once per invocation and passed explicitly to
//! every workflow. Project coordinates come from the first source that names
//! them: CLI flags, an entity descriptor, the config file, then the local
//! git remote.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::domain::{Project, ProjectSource, User, VersioningStrategy};
use crate::error::{GitReleaseError, Result};
use crate::github::remote::detect_remote;
use crate::github::GitReleaseApi;

/// Project and user every workflow operates on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseContext {
    pub project: Project,
    pub user: User,
}

impl ReleaseContext {
    /// Validate `project`, then fetch the authenticated user.
    ///
    /// Validation happens before any API call, so an invalid project never
    /// reaches the network.
    pub async fn establish(api: &dyn GitReleaseApi, project: Project) -> Result<Self> {
        project.validate()?;

        let user = api.get_user(&project).await?;
        if user.username.trim().is_empty() {
            return Err(GitReleaseError::validation("Unable to retrieve username"));
        }

        tracing::debug!(project = %project.slug(), user = %user.username, "Context established");
        Ok(ReleaseContext { project, user })
    }
}

/// Project-related command line flags
#[derive(Debug, Clone, Default)]
pub struct ProjectOverrides {
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub strategy: Option<VersioningStrategy>,
    pub entity: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct EntityDescriptor {
    #[serde(default)]
    metadata: EntityMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct EntityMetadata {
    #[serde(default)]
    annotations: HashMap<String, String>,
}

/// Read `metadata.annotations` of a catalog entity YAML file
pub fn read_entity_annotations(path: &Path) -> Result<HashMap<String, String>> {
    let content = fs::read_to_string(path).map_err(|e| {
        GitReleaseError::config(format!("Cannot read entity {}: {}", path.display(), e))
    })?;
    parse_entity_annotations(&content)
}

pub fn parse_entity_annotations(content: &str) -> Result<HashMap<String, String>> {
    let entity: EntityDescriptor = serde_yaml::from_str(content)
        .map_err(|e| GitReleaseError::config(format!("Invalid entity descriptor: {}", e)))?;
    Ok(entity.metadata.annotations)
}

/// Resolve the project from the first source that names one.
///
/// `cwd` is where the git remote is looked up when nothing else applies.
/// An explicit `--strategy` overrides whatever strategy the chosen source
/// carries. The returned project is not validated yet.
pub fn resolve_project(overrides: &ProjectOverrides, config: &Config, cwd: &Path) -> Result<Project> {
    let configured_strategy = config.project.versioning_strategy.unwrap_or_default();

    let mut project = if overrides.owner.is_some() || overrides.repo.is_some() {
        Project::new(
            overrides.owner.clone().unwrap_or_default(),
            overrides.repo.clone().unwrap_or_default(),
            configured_strategy,
            ProjectSource::Cli,
        )
    } else if let Some(entity) = &overrides.entity {
        let annotations = read_entity_annotations(entity)?;
        Project::from_annotations(&annotations, configured_strategy)?
    } else if config.project.owner.is_some() || config.project.repo.is_some() {
        Project::new(
            config.project.owner.clone().unwrap_or_default(),
            config.project.repo.clone().unwrap_or_default(),
            configured_strategy,
            ProjectSource::Config,
        )
    } else {
        match detect_remote(cwd)? {
            Some(remote) => {
                if remote.host != config.github.host {
                    tracing::warn!(
                        remote_host = %remote.host,
                        configured_host = %config.github.host,
                        "Git remote host differs from the configured GitHub host"
                    );
                }
                Project::new(remote.owner, remote.repo, configured_strategy, ProjectSource::GitRemote)
            }
            None => {
                return Err(GitReleaseError::config(
                    "No project given: pass --owner/--repo, --entity, set [project] in the config, or run inside a clone with a GitHub remote",
                ))
            }
        }
    };

    if let Some(strategy) = overrides.strategy {
        project.versioning_strategy = strategy;
    }

    Ok(project)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectConfig;
    use crate::github::{ApiOperation, MockGitReleaseApi};
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    const ENTITY: &str = r#"
apiVersion: backstage.io/v1alpha1
kind: Component
metadata:
  name: widgets
  annotations:
    github.com/project-slug: acme/widgets
    git-release-manager/versioning-strategy: calver
spec:
  type: service
"#;

    fn config_with_project(owner: &str, repo: &str) -> Config {
        Config {
            project: ProjectConfig {
                owner: Some(owner.to_string()),
                repo: Some(repo.to_string()),
                versioning_strategy: Some(VersioningStrategy::Semver),
            },
            ..Config::default()
        }
    }

    #[test]
    fn test_cli_flags_win() {
        let overrides = ProjectOverrides {
            owner: Some("cli-owner".to_string()),
            repo: Some("cli-repo".to_string()),
            ..ProjectOverrides::default()
        };
        let project = resolve_project(&overrides, &config_with_project("a", "b"), Path::new(".")).unwrap();
        assert_eq!(project.slug(), "cli-owner/cli-repo");
        assert_eq!(project.source, ProjectSource::Cli);
    }

    #[test]
    fn test_entity_annotations() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(ENTITY.as_bytes()).unwrap();

        let overrides = ProjectOverrides {
            entity: Some(file.path().to_path_buf()),
            ..ProjectOverrides::default()
        };
        let project = resolve_project(&overrides, &config_with_project("a", "b"), Path::new(".")).unwrap();
        assert_eq!(project.slug(), "acme/widgets");
        assert_eq!(project.versioning_strategy, VersioningStrategy::Calver);
        assert_eq!(project.source, ProjectSource::Entity);
    }

    #[test]
    fn test_config_project_and_strategy_override() {
        let overrides = ProjectOverrides {
            strategy: Some(VersioningStrategy::Calver),
            ..ProjectOverrides::default()
        };
        let project = resolve_project(&overrides, &config_with_project("acme", "widgets"), Path::new(".")).unwrap();
        assert_eq!(project.source, ProjectSource::Config);
        assert_eq!(project.versioning_strategy, VersioningStrategy::Calver);
    }

    #[test]
    fn test_git_remote_fallback() {
        let dir = TempDir::new().unwrap();
        let repo = git2::Repository::init(dir.path()).unwrap();
        repo.remote("origin", "https://github.com/acme/gadgets.git").unwrap();

        let project = resolve_project(&ProjectOverrides::default(), &Config::default(), dir.path()).unwrap();
        assert_eq!(project.slug(), "acme/gadgets");
        assert_eq!(project.source, ProjectSource::GitRemote);
    }

    #[test]
    fn test_no_source_is_config_error() {
        let dir = TempDir::new().unwrap();
        git2::Repository::init(dir.path()).unwrap();
        let err = resolve_project(&ProjectOverrides::default(), &Config::default(), dir.path()).unwrap_err();
        assert!(matches!(err, GitReleaseError::Config(_)));
    }

    #[test]
    fn test_entity_without_annotations() {
        let annotations = parse_entity_annotations("kind: Component\nmetadata:\n  name: x\n").unwrap();
        assert!(annotations.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_project_makes_no_calls() {
        let api = MockGitReleaseApi::semver();
        let project = Project::new("", "repo_sem_ver", VersioningStrategy::Semver, ProjectSource::Cli);
        let err = ReleaseContext::establish(&api, project).await.unwrap_err();
        assert!(err.is_validation());
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_empty_username_is_rejected() {
        let api = MockGitReleaseApi::semver();
        api.set_user("", None);
        let project = Project::new("goodreleaser", "repo_sem_ver", VersioningStrategy::Semver, ProjectSource::Cli);
        let err = ReleaseContext::establish(&api, project).await.unwrap_err();
        assert_eq!(err.to_string(), "Validation failed: Unable to retrieve username");
        assert_eq!(api.calls(), vec![ApiOperation::GetUser]);
    }
}
