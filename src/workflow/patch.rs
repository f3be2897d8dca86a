use serde::Serialize;

use super::create_rc::short_sha;
use super::{rejected, require_latest, Pipeline, ReleaseState, WorkflowResult};
use crate::context::ReleaseContext;
use crate::error::GitReleaseError;
use crate::github::{Commit, GitReleaseApi, NewTagObject, Release, ReleaseUpdate, Tagger};
use crate::version::{next_patch, GitInfo};

pub const STEP_START: &str = "Start patch";
pub const STEP_READ_BRANCH: &str = "Read release branch";
pub const STEP_COMPARE: &str = "Check commit is missing from release";
pub const STEP_READ_COMMIT: &str = "Read patch commit";
pub const STEP_TEMP_COMMIT: &str = "Create temporary commit";
pub const STEP_TEMP_BRANCH: &str = "Create temporary branch";
pub const STEP_MERGE: &str = "Merge patch commit";
pub const STEP_CHERRY_PICK: &str = "Create cherry-pick commit";
pub const STEP_UPDATE_BRANCH: &str = "Update release branch";
pub const STEP_DELETE_TEMP: &str = "Delete temporary branch";
pub const STEP_TAG_OBJECT: &str = "Create tag object";
pub const STEP_TAG_REF: &str = "Create tag reference";
pub const STEP_UPDATE_RELEASE: &str = "Update release";

#[derive(Debug, Clone)]
pub struct PatchOptions {
    /// Commit to cherry-pick onto the release branch
    pub commit_sha: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PatchResult {
    pub git_info: GitInfo,
    pub patched_commit: Commit,
    pub cherry_pick_sha: String,
    pub release: Release,
}

/// Name of the scratch branch a patch is merged on
pub fn temp_branch_name(tag_name: &str) -> String {
    format!("patch-temp/{}", tag_name)
}

/// Cherry-pick a commit onto the latest release's branch and re-tag it.
///
/// The cherry-pick is emulated remotely. A temporary commit carrying the
/// release branch's tree is parented on the patch commit's first parent, so
/// merging the patch commit into it applies only that commit's diff. The
/// merge tree is recommitted with the release head as its only parent, the
/// release branch fast-forwarded to it and the bumped tag created.
pub async fn patch(
    api: &dyn GitReleaseApi,
    ctx: &ReleaseContext,
    state: &ReleaseState,
    options: PatchOptions,
) -> WorkflowResult<PatchResult> {
    let project = &ctx.project;

    let latest = match require_latest(state, "Patch") {
        Ok(release) => release,
        Err(e) => return rejected(STEP_START, e),
    };
    let release_branch = latest.target_commitish.as_str();
    let git_info = match next_patch(project.versioning_strategy, &latest.tag_name, release_branch) {
        Ok(info) => info,
        Err(e) => return rejected(STEP_START, e),
    };

    let mut pipeline = Pipeline::new("patch");

    let branch = pipeline.check(STEP_READ_BRANCH, api.get_branch(project, release_branch).await)?;
    pipeline.complete(
        STEP_READ_BRANCH,
        format!("{} is at {}", release_branch, short_sha(&branch.commit_sha)),
        Some(branch.html_url.clone()),
    );

    let comparison = pipeline.check(
        STEP_COMPARE,
        api.get_comparison(project, release_branch, &options.commit_sha).await,
    )?;
    if comparison.ahead_by == 0 {
        let error = GitReleaseError::validation(format!(
            "Commit {} is already part of {}",
            short_sha(&options.commit_sha),
            release_branch
        ));
        return Err(pipeline.fail(STEP_COMPARE, error));
    }
    pipeline.complete(
        STEP_COMPARE,
        format!("Commit is {} ahead of {}", comparison.ahead_by, release_branch),
        Some(comparison.html_url.clone()),
    );

    let commit = pipeline.check(STEP_READ_COMMIT, api.get_commit(project, &options.commit_sha).await)?;
    pipeline.complete(
        STEP_READ_COMMIT,
        first_line(&commit.message).to_string(),
        Some(commit.html_url.clone()),
    );

    let Some(first_parent) = commit.first_parent_sha.clone() else {
        let error = GitReleaseError::validation(format!(
            "Commit {} has no parent to cherry-pick against",
            short_sha(&commit.sha)
        ));
        return Err(pipeline.fail(STEP_TEMP_COMMIT, error));
    };
    let temp_commit = pipeline.check(
        STEP_TEMP_COMMIT,
        api.create_commit(
            project,
            &format!("Temporary commit for patch {}", git_info.tag_name),
            &branch.tree_sha,
            &[first_parent.clone()],
        )
        .await,
    )?;
    pipeline.complete(
        STEP_TEMP_COMMIT,
        format!("Release tree on top of {}", short_sha(&first_parent)),
        None,
    );

    let temp_branch = temp_branch_name(&git_info.tag_name);
    let temp_ref = pipeline.check(
        STEP_TEMP_BRANCH,
        api.create_ref(project, &format!("refs/heads/{}", temp_branch), &temp_commit.sha)
            .await,
    )?;
    pipeline.complete(STEP_TEMP_BRANCH, format!("Created {}", temp_ref.ref_name), None);

    let merge = pipeline.check(
        STEP_MERGE,
        api.merge(project, &temp_branch, &commit.sha).await,
    )?;
    pipeline.complete(STEP_MERGE, merge.message.clone(), Some(merge.html_url.clone()));

    let cherry_pick = pipeline.check(
        STEP_CHERRY_PICK,
        api.create_commit(
            project,
            &commit.message,
            &merge.tree_sha,
            &[branch.commit_sha.clone()],
        )
        .await,
    )?;
    pipeline.complete(
        STEP_CHERRY_PICK,
        format!("Created {}", short_sha(&cherry_pick.sha)),
        None,
    );

    let updated = pipeline.check(
        STEP_UPDATE_BRANCH,
        api.update_ref(project, &format!("heads/{}", release_branch), &cherry_pick.sha, false)
            .await,
    )?;
    pipeline.complete(
        STEP_UPDATE_BRANCH,
        format!("{} moved to {}", updated.ref_name, short_sha(&cherry_pick.sha)),
        None,
    );

    pipeline.check(
        STEP_DELETE_TEMP,
        api.delete_ref(project, &format!("heads/{}", temp_branch)).await,
    )?;
    pipeline.complete(STEP_DELETE_TEMP, format!("Deleted {}", temp_branch), None);

    let tagger = Tagger {
        name: ctx.user.username.clone(),
        email: ctx.user.email.clone(),
    };
    let tag_message = format!("Patch {} with {}", git_info.version, short_sha(&commit.sha));
    let tag_object = pipeline.check(
        STEP_TAG_OBJECT,
        api.create_tag_object(
            project,
            NewTagObject {
                tag: &git_info.tag_name,
                message: &tag_message,
                object_sha: &cherry_pick.sha,
                tagger: &tagger,
            },
        )
        .await,
    )?;
    pipeline.complete(STEP_TAG_OBJECT, format!("Tagged {}", tag_object.tag_name), None);

    let tag_ref = pipeline.check(
        STEP_TAG_REF,
        api.create_ref(
            project,
            &format!("refs/tags/{}", git_info.tag_name),
            &tag_object.tag_sha,
        )
        .await,
    )?;
    pipeline.complete(STEP_TAG_REF, format!("Created {}", tag_ref.ref_name), None);

    let body = patched_body(latest.body.as_deref(), &git_info, &commit);
    let release = pipeline.check(
        STEP_UPDATE_RELEASE,
        api.update_release(
            project,
            ReleaseUpdate {
                release_id: latest.id,
                tag_name: &git_info.tag_name,
                body: Some(&body),
                prerelease: None,
            },
        )
        .await,
    )?;
    pipeline.complete(
        STEP_UPDATE_RELEASE,
        format!("{} now points at {}", latest.tag_name, git_info.tag_name),
        Some(release.html_url.clone()),
    );

    pipeline.finish(PatchResult {
        git_info,
        patched_commit: commit,
        cherry_pick_sha: cherry_pick.sha,
        release,
    })
}

fn first_line(message: &str) -> &str {
    message.lines().next().unwrap_or_default()
}

/// Release body with a section describing the patch appended
fn patched_body(previous: Option<&str>, git_info: &GitInfo, commit: &Commit) -> String {
    let section = format!(
        "### Patch {}\n\n[{}]({}) {}",
        git_info.version,
        short_sha(&commit.sha),
        commit.html_url,
        first_line(&commit.message)
    );
    match previous.map(str::trim_end).filter(|b| !b.is_empty()) {
        Some(body) => format!("{}\n\n{}", body, section),
        None => section,
    }
}
