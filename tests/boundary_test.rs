use git_release_manager::boundary::{check_action, BoundaryWarning};
use git_release_manager::github::{Release, Repository};
use git_release_manager::ui;
use git_release_manager::workflow::{AvailableAction, ReleaseState};

fn state(latest: Option<(&str, bool)>, push_permissions: Option<bool>) -> ReleaseState {
    ReleaseState {
        repository: Repository {
            name: "widgets".to_string(),
            default_branch: "main".to_string(),
            push_permissions,
        },
        latest_release: latest.map(|(tag, prerelease)| Release {
            id: 1,
            name: None,
            tag_name: tag.to_string(),
            target_commitish: "rc/1.2.3".to_string(),
            prerelease,
            html_url: String::new(),
            body: None,
        }),
    }
}

// ============================================================================
// BoundaryWarning Display Tests
// ============================================================================

#[test]
fn test_boundary_warning_candidate_not_promoted_display() {
    let warning = BoundaryWarning::CandidateNotPromoted {
        tag: "rc-1.2.3".to_string(),
    };

    let display_msg = warning.to_string();
    assert!(
        display_msg.contains("never promoted"),
        "Message should contain 'never promoted', got: {}",
        display_msg
    );
    assert!(display_msg.contains("rc-1.2.3"));
}

#[test]
fn test_boundary_warning_unsuggested_action_display() {
    let with_release = BoundaryWarning::UnsuggestedAction {
        action: AvailableAction::PromoteRc,
        latest_tag: Some("version-1.2.3".to_string()),
    };
    assert_eq!(
        with_release.to_string(),
        "'promote' is not a suggested action for latest release 'version-1.2.3'"
    );

    let without_release = BoundaryWarning::UnsuggestedAction {
        action: AvailableAction::Patch,
        latest_tag: None,
    };
    assert!(without_release.to_string().contains("without a release"));
}

#[test]
fn test_boundary_warning_unparsable_tag_display() {
    let warning = BoundaryWarning::UnparsableTag {
        tag: "release-123".to_string(),
        reason: "Invalid format".to_string(),
    };

    let display_msg = warning.to_string();
    assert!(
        display_msg.contains("Cannot parse tag"),
        "Message should contain 'Cannot parse tag', got: {}",
        display_msg
    );
    assert!(display_msg.contains("release-123"));
    assert!(display_msg.contains("Invalid format"));
}

#[test]
fn test_boundary_warning_hook_failed_display() {
    let warning = BoundaryWarning::HookFailed {
        feature: "create_rc".to_string(),
        reason: "exit status 3".to_string(),
    };
    assert_eq!(
        warning.to_string(),
        "Success hook of 'create_rc' failed: exit status 3"
    );
}

// ============================================================================
// check_action
// ============================================================================

#[test]
fn test_promote_candidate_has_no_warnings() {
    let warnings = check_action(AvailableAction::PromoteRc, &state(Some(("rc-1.2.3", true)), Some(true)));
    assert!(warnings.is_empty(), "unexpected warnings: {:?}", warnings);
}

#[test]
fn test_first_candidate_has_no_warnings() {
    assert!(check_action(AvailableAction::CreateRc, &state(None, Some(true))).is_empty());
}

#[test]
fn test_patch_without_release_is_unsuggested() {
    let warnings = check_action(AvailableAction::Patch, &state(None, None));
    assert_eq!(
        warnings,
        vec![BoundaryWarning::UnsuggestedAction {
            action: AvailableAction::Patch,
            latest_tag: None,
        }]
    );
}

#[test]
fn test_missing_push_permission_is_reported_first() {
    let warnings = check_action(AvailableAction::Patch, &state(Some(("version-1.2.3", false)), Some(false)));
    assert_eq!(
        warnings.first(),
        Some(&BoundaryWarning::NoPushPermission {
            repo: "widgets".to_string()
        })
    );
}

#[test]
fn test_new_candidate_over_unpromoted_candidate() {
    let warnings = check_action(AvailableAction::CreateRc, &state(Some(("rc-1.2.3", true)), Some(true)));
    assert!(warnings.contains(&BoundaryWarning::CandidateNotPromoted {
        tag: "rc-1.2.3".to_string()
    }));
}

// ============================================================================
// Commit selection
// ============================================================================

#[test]
fn test_commit_selection_without_list_accepts_sha_only() {
    assert_eq!(ui::parse_commit_selection("abcdef1", &[]).unwrap(), "abcdef1");
    assert!(ui::parse_commit_selection("1", &[]).is_err());
}
