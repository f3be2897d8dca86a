use serde::Serialize;

use super::{rejected, require_candidate, Pipeline, ReleaseState, WorkflowResult};
use crate::context::ReleaseContext;
use crate::github::{GitReleaseApi, Release, ReleaseUpdate};
use crate::version::{promoted, GitInfo};

pub const STEP_START: &str = "Start promotion";
pub const STEP_RESOLVE_COMMIT: &str = "Resolve candidate commit";
pub const STEP_UPDATE_RELEASE: &str = "Promote release";

#[derive(Debug, Clone, Serialize)]
pub struct PromoteResult {
    pub git_info: GitInfo,
    pub commit_sha: String,
    pub release: Release,
}

/// Promote the latest release candidate.
///
/// The existing release is retagged `version-<version>` and marked final.
/// Its target stays the release branch, which later patches move. No commit
/// or tag object is created; GitHub creates the lightweight tag when the
/// release is updated.
pub async fn promote_rc(
    api: &dyn GitReleaseApi,
    ctx: &ReleaseContext,
    state: &ReleaseState,
) -> WorkflowResult<PromoteResult> {
    let project = &ctx.project;

    let candidate = match require_candidate(ctx, state) {
        Ok(release) => release,
        Err(e) => return rejected(STEP_START, e),
    };
    let git_info = match promoted(
        project.versioning_strategy,
        &candidate.tag_name,
        &candidate.target_commitish,
    ) {
        Ok(info) => info,
        Err(e) => return rejected(STEP_START, e),
    };

    let mut pipeline = Pipeline::new("promote");

    let commit = pipeline.check(
        STEP_RESOLVE_COMMIT,
        api.get_commit(project, &candidate.tag_name).await,
    )?;
    pipeline.complete(
        STEP_RESOLVE_COMMIT,
        format!("{} points at {}", candidate.tag_name, commit.sha),
        Some(commit.html_url.clone()),
    );

    let release = pipeline.check(
        STEP_UPDATE_RELEASE,
        api.update_release(
            project,
            ReleaseUpdate {
                release_id: candidate.id,
                tag_name: &git_info.tag_name,
                body: None,
                prerelease: Some(false),
            },
        )
        .await,
    )?;
    pipeline.complete(
        STEP_UPDATE_RELEASE,
        format!("{} promoted to {}", candidate.tag_name, git_info.tag_name),
        Some(release.html_url.clone()),
    );

    pipeline.finish(PromoteResult {
        git_info,
        commit_sha: commit.sha,
        release,
    })
}
