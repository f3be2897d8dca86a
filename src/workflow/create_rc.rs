use chrono::NaiveDate;
use serde::Serialize;

use super::{Pipeline, ReleaseState, WorkflowResult};
use crate::context::ReleaseContext;
use crate::domain::VersionBump;
use crate::error::GitReleaseError;
use crate::github::{GitReleaseApi, NewRelease, NewTagObject, Release, Tagger};
use crate::version::{next_rc, GitInfo};

pub const STEP_START: &str = "Start release candidate";
pub const STEP_NEXT_VERSION: &str = "Compute next version";
pub const STEP_CHECK_BRANCH: &str = "Check release branch";
pub const STEP_BASE_COMMIT: &str = "Read default branch";
pub const STEP_CREATE_BRANCH: &str = "Create release branch";
pub const STEP_TAG_OBJECT: &str = "Create tag object";
pub const STEP_TAG_REF: &str = "Create tag reference";
pub const STEP_COMPARE: &str = "Compare with previous release";
pub const STEP_CREATE_RELEASE: &str = "Create prerelease";

#[derive(Debug, Clone, Copy)]
pub struct CreateRcOptions {
    pub bump: VersionBump,
    /// Date used for calendar versions
    pub today: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateRcResult {
    pub git_info: GitInfo,
    pub base_commit_sha: String,
    pub comparison_url: Option<String>,
    pub release: Release,
}

/// Cut a release candidate from the head of the default branch.
///
/// Creates `rc/<version>`, an annotated `rc-<version>` tag on it and a
/// prerelease. When a previous release exists, the release body links the
/// comparison with its branch.
pub async fn create_rc(
    api: &dyn GitReleaseApi,
    ctx: &ReleaseContext,
    state: &ReleaseState,
    options: CreateRcOptions,
) -> WorkflowResult<CreateRcResult> {
    let project = &ctx.project;
    let previous = state.latest_release.as_ref();
    let mut pipeline = Pipeline::new("create-rc");

    let tags = pipeline.check(STEP_NEXT_VERSION, api.get_all_tags(project).await)?;
    let existing: Vec<String> = tags.into_iter().map(|t| t.tag_name).collect();
    let git_info = pipeline.check(
        STEP_NEXT_VERSION,
        next_rc(
            project.versioning_strategy,
            previous.map(|r| r.tag_name.as_str()),
            options.bump,
            options.today,
            &existing,
        ),
    )?;
    pipeline.complete(
        STEP_NEXT_VERSION,
        format!("Next release candidate is {}", git_info.tag_name),
        None,
    );

    let existing_branch = match api.get_branch(project, &git_info.rc_branch).await {
        Ok(branch) => Err(GitReleaseError::validation(format!(
            "Branch {} already exists",
            branch.name
        ))),
        Err(e) if e.is_not_found() => Ok(()),
        Err(e) => Err(e),
    };
    pipeline.check(STEP_CHECK_BRANCH, existing_branch)?;
    pipeline.complete(
        STEP_CHECK_BRANCH,
        format!("Branch {} is free", git_info.rc_branch),
        None,
    );

    let default_branch = &state.repository.default_branch;
    let base = pipeline.check(STEP_BASE_COMMIT, api.get_branch(project, default_branch).await)?;
    pipeline.complete(
        STEP_BASE_COMMIT,
        format!("Cutting from {} at {}", default_branch, short_sha(&base.commit_sha)),
        Some(base.html_url.clone()),
    );

    let branch_ref = format!("refs/heads/{}", git_info.rc_branch);
    let created = pipeline.check(
        STEP_CREATE_BRANCH,
        api.create_ref(project, &branch_ref, &base.commit_sha).await,
    )?;
    pipeline.complete(
        STEP_CREATE_BRANCH,
        format!("Created {}", created.ref_name),
        None,
    );

    let tagger = Tagger {
        name: ctx.user.username.clone(),
        email: ctx.user.email.clone(),
    };
    let message = format!("Release candidate {}", git_info.version);
    let tag_object = pipeline.check(
        STEP_TAG_OBJECT,
        api.create_tag_object(
            project,
            NewTagObject {
                tag: &git_info.tag_name,
                message: &message,
                object_sha: &base.commit_sha,
                tagger: &tagger,
            },
        )
        .await,
    )?;
    pipeline.complete(
        STEP_TAG_OBJECT,
        format!("Tagged {} as {}", short_sha(&base.commit_sha), tag_object.tag_name),
        None,
    );

    let tag_ref = format!("refs/tags/{}", git_info.tag_name);
    let created_tag = pipeline.check(
        STEP_TAG_REF,
        api.create_ref(project, &tag_ref, &tag_object.tag_sha).await,
    )?;
    pipeline.complete(STEP_TAG_REF, format!("Created {}", created_tag.ref_name), None);

    let comparison = match previous {
        Some(previous) => {
            let comparison = pipeline.check(
                STEP_COMPARE,
                api.get_comparison(project, &previous.target_commitish, &git_info.rc_branch)
                    .await,
            )?;
            pipeline.complete(
                STEP_COMPARE,
                format!(
                    "{} is {} commit(s) ahead of {}",
                    git_info.rc_branch, comparison.ahead_by, previous.target_commitish
                ),
                Some(comparison.html_url.clone()),
            );
            Some((previous, comparison))
        }
        None => None,
    };

    let body = match &comparison {
        Some((previous, comparison)) => format!(
            "Release candidate cut from `{}`.\n\n**Changes since {}**: {} commit(s), [compare]({})",
            default_branch, previous.tag_name, comparison.ahead_by, comparison.html_url
        ),
        None => format!(
            "First release candidate of {}, cut from `{}`.",
            project.slug(),
            default_branch
        ),
    };

    let release = pipeline.check(
        STEP_CREATE_RELEASE,
        api.create_release(
            project,
            NewRelease {
                tag_name: &git_info.tag_name,
                name: &git_info.release_name,
                target_commitish: &git_info.rc_branch,
                body: &body,
                prerelease: true,
            },
        )
        .await,
    )?;
    pipeline.complete(
        STEP_CREATE_RELEASE,
        format!("Published {}", git_info.release_name),
        Some(release.html_url.clone()),
    );

    pipeline.finish(CreateRcResult {
        git_info,
        base_commit_sha: base.commit_sha,
        comparison_url: comparison.map(|(_, c)| c.html_url),
        release,
    })
}

pub(crate) fn short_sha(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}
