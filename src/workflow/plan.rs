//! Dry-run planning: what each workflow would create, computed with read-only
//! calls.

use super::{require_candidate, require_latest, CreateRcOptions, ReleaseState};
use crate::context::ReleaseContext;
use crate::error::Result;
use crate::github::GitReleaseApi;
use crate::version::{next_patch, next_rc, promoted, GitInfo};

/// Names a release candidate would get; reads the tag list for collisions
pub async fn plan_create_rc(
    api: &dyn GitReleaseApi,
    ctx: &ReleaseContext,
    state: &ReleaseState,
    options: CreateRcOptions,
) -> Result<GitInfo> {
    let tags = api.get_all_tags(&ctx.project).await?;
    let existing: Vec<String> = tags.into_iter().map(|t| t.tag_name).collect();
    next_rc(
        ctx.project.versioning_strategy,
        state.latest_release.as_ref().map(|r| r.tag_name.as_str()),
        options.bump,
        options.today,
        &existing,
    )
}

pub fn plan_promote(ctx: &ReleaseContext, state: &ReleaseState) -> Result<GitInfo> {
    let candidate = require_candidate(ctx, state)?;
    promoted(
        ctx.project.versioning_strategy,
        &candidate.tag_name,
        &candidate.target_commitish,
    )
}

pub fn plan_patch(ctx: &ReleaseContext, state: &ReleaseState) -> Result<GitInfo> {
    let latest = require_latest(state, "Patch")?;
    next_patch(
        ctx.project.versioning_strategy,
        &latest.tag_name,
        &latest.target_commitish,
    )
}
