use std::fmt;

use crate::github::Repository;
use crate::workflow::{AvailableAction, ReleaseState};

/// Warnings that occur around the edges of a release workflow.
/// These are non-fatal issues that should be reported to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// Cutting a new candidate while the previous one was never promoted
    CandidateNotPromoted { tag: String },
    /// Running a workflow the current release state does not suggest
    UnsuggestedAction {
        action: AvailableAction,
        latest_tag: Option<String>,
    },
    /// The token cannot push to the repository
    NoPushPermission { repo: String },
    /// Release tag that cannot be parsed with the project's scheme
    UnparsableTag { tag: String, reason: String },
    /// A success hook failed after the workflow completed
    HookFailed { feature: String, reason: String },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::CandidateNotPromoted { tag } => {
                write!(f, "Release candidate '{}' was never promoted", tag)
            }
            BoundaryWarning::UnsuggestedAction { action, latest_tag } => match latest_tag {
                Some(tag) => write!(
                    f,
                    "'{}' is not a suggested action for latest release '{}'",
                    action, tag
                ),
                None => write!(f, "'{}' is not a suggested action without a release", action),
            },
            BoundaryWarning::NoPushPermission { repo } => {
                write!(f, "The current token cannot push to '{}'", repo)
            }
            BoundaryWarning::UnparsableTag { tag, reason } => {
                write!(f, "Cannot parse tag '{}': {}", tag, reason)
            }
            BoundaryWarning::HookFailed { feature, reason } => {
                write!(f, "Success hook of '{}' failed: {}", feature, reason)
            }
        }
    }
}

fn push_warning(repository: &Repository) -> Option<BoundaryWarning> {
    match repository.push_permissions {
        Some(false) => Some(BoundaryWarning::NoPushPermission {
            repo: repository.name.clone(),
        }),
        _ => None,
    }
}

/// Warnings to show before running `action` against `state`
pub fn check_action(action: AvailableAction, state: &ReleaseState) -> Vec<BoundaryWarning> {
    let mut warnings: Vec<BoundaryWarning> = push_warning(&state.repository).into_iter().collect();
    let latest = state.latest_release.as_ref();

    if !crate::workflow::suggest_actions(state).contains(&action) {
        warnings.push(BoundaryWarning::UnsuggestedAction {
            action,
            latest_tag: latest.map(|r| r.tag_name.clone()),
        });
    }

    if let (AvailableAction::CreateRc, Some(release)) = (action, latest) {
        if release.prerelease {
            warnings.push(BoundaryWarning::CandidateNotPromoted {
                tag: release.tag_name.clone(),
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::Release;

    fn state(prerelease: bool, push: Option<bool>) -> ReleaseState {
        ReleaseState {
            repository: Repository {
                name: "widgets".to_string(),
                default_branch: "main".to_string(),
                push_permissions: push,
            },
            latest_release: Some(Release {
                id: 7,
                name: None,
                tag_name: "rc-1.2.3".to_string(),
                target_commitish: "rc/1.2.3".to_string(),
                prerelease,
                html_url: String::new(),
                body: None,
            }),
        }
    }

    #[test]
    fn test_create_rc_over_candidate() {
        let warnings = check_action(AvailableAction::CreateRc, &state(true, Some(true)));
        assert_eq!(warnings.len(), 2);
        assert!(warnings.contains(&BoundaryWarning::CandidateNotPromoted {
            tag: "rc-1.2.3".to_string()
        }));
    }

    #[test]
    fn test_suggested_action_is_clean() {
        assert!(check_action(AvailableAction::PromoteRc, &state(true, None)).is_empty());
    }

    #[test]
    fn test_missing_push_permission() {
        let warnings = check_action(AvailableAction::Patch, &state(false, Some(false)));
        assert_eq!(
            warnings,
            vec![BoundaryWarning::NoPushPermission {
                repo: "widgets".to_string()
            }]
        );
    }
}
