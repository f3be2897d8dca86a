//! GitHub operations abstraction layer
//!
//! This module provides a trait-based abstraction over the GitHub REST
//! endpoints the release workflows need, allowing for a real HTTP client and
//! an in-memory double for tests and local development.
//!
//! # Overview
//!
//! The primary abstraction is the [GitReleaseApi] trait. Each method maps to
//! exactly one REST call (or, for `get_host`/`get_repo_path`, to no call at
//! all). Implementations add no retries, batching or rate-limit handling.
//!
//! - [client::GitHubClient]: A real implementation using `reqwest`
//! - [mock::MockGitReleaseApi]: An in-memory implementation with fixtures
//!
//! # Usage
//!
//! Workflows depend on `&dyn GitReleaseApi` so either implementation can be
//! plugged in:
//!
//! ```rust,ignore
//! # use git_release_manager::github::GitReleaseApi;
//! # async fn example(api: &dyn GitReleaseApi, project: &git_release_manager::Project) -> git_release_manager::Result<()> {
//! let branch = api.get_branch(project, "main").await?;
//! println!("main is at {}", branch.commit_sha);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod mock;
pub mod remote;
pub mod types;

pub use client::GitHubClient;
pub use mock::MockGitReleaseApi;
pub use types::*;

use async_trait::async_trait;
use std::fmt;

use crate::domain::{Project, User};
use crate::error::Result;

/// Name of every API operation, used in logs, step reports and the mock's
/// failure injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiOperation {
    GetUser,
    GetOwners,
    GetRepositories,
    GetRepository,
    GetLatestRelease,
    GetRecentCommits,
    GetCommit,
    GetBranch,
    CreateRef,
    UpdateRef,
    DeleteRef,
    GetComparison,
    CreateTagObject,
    CreateCommit,
    Merge,
    CreateRelease,
    UpdateRelease,
    GetAllTags,
    GetAllReleases,
    GetTag,
}

impl ApiOperation {
    pub fn name(&self) -> &'static str {
        match self {
            ApiOperation::GetUser => "getUser",
            ApiOperation::GetOwners => "getOwners",
            ApiOperation::GetRepositories => "getRepositories",
            ApiOperation::GetRepository => "getRepository",
            ApiOperation::GetLatestRelease => "getLatestRelease",
            ApiOperation::GetRecentCommits => "getRecentCommits",
            ApiOperation::GetCommit => "getCommit",
            ApiOperation::GetBranch => "getBranch",
            ApiOperation::CreateRef => "createRef",
            ApiOperation::UpdateRef => "updateRef",
            ApiOperation::DeleteRef => "deleteRef",
            ApiOperation::GetComparison => "getComparison",
            ApiOperation::CreateTagObject => "createTagObject",
            ApiOperation::CreateCommit => "createCommit",
            ApiOperation::Merge => "merge",
            ApiOperation::CreateRelease => "createRelease",
            ApiOperation::UpdateRelease => "updateRelease",
            ApiOperation::GetAllTags => "getAllTags",
            ApiOperation::GetAllReleases => "getAllReleases",
            ApiOperation::GetTag => "getTag",
        }
    }
}

impl fmt::Display for ApiOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// GitHub operations used by the release workflows
///
/// ## Thread Safety
///
/// All implementors must be `Send + Sync` so a single client can be shared
/// behind an `Arc` for the lifetime of the process.
///
/// ## Error Handling
///
/// Every method returns [crate::error::Result<T>]. Non-2xx responses are
/// mapped to [crate::error::GitReleaseError::Api] carrying the status code and
/// GitHub's message; use `is_not_found()` to detect a 404.
///
/// ## Refs
///
/// `create_ref` takes a fully-qualified ref (`refs/heads/rc/1.2.3`), while
/// `update_ref` and `delete_ref` take the ref without the `refs/` prefix
/// (`heads/rc/1.2.3`), mirroring the REST endpoints.
#[async_trait]
pub trait GitReleaseApi: Send + Sync {
    /// Host name of the GitHub instance (e.g. `github.com`)
    fn get_host(&self) -> String;

    /// `owner/repo` path of a project on the host
    fn get_repo_path(&self, project: &Project) -> String {
        project.slug()
    }

    /// The authenticated user
    async fn get_user(&self, project: &Project) -> Result<User>;

    /// Accounts the user can release under: the user plus their organisations
    async fn get_owners(&self) -> Result<Vec<String>>;

    /// Repository names belonging to `owner`
    async fn get_repositories(&self, owner: &str) -> Result<Vec<String>>;

    async fn get_repository(&self, project: &Project) -> Result<Repository>;

    /// Most recently created release, prereleases included.
    ///
    /// # Returns
    /// * `Ok(None)` - The repository has no release yet
    async fn get_latest_release(&self, project: &Project) -> Result<Option<Release>>;

    /// Recent commits on `branch`, or on the default branch when `None`
    async fn get_recent_commits(
        &self,
        project: &Project,
        branch: Option<&str>,
    ) -> Result<Vec<RecentCommit>>;

    /// Commit a sha, branch or tag name resolves to
    async fn get_commit(&self, project: &Project, reference: &str) -> Result<Commit>;

    async fn get_branch(&self, project: &Project, branch: &str) -> Result<Branch>;

    /// Create `reference` (fully qualified) pointing at `sha`
    async fn create_ref(&self, project: &Project, reference: &str, sha: &str) -> Result<Reference>;

    /// Move `reference` to `sha`; without `force` only fast-forwards succeed
    async fn update_ref(
        &self,
        project: &Project,
        reference: &str,
        sha: &str,
        force: bool,
    ) -> Result<Reference>;

    async fn delete_ref(&self, project: &Project, reference: &str) -> Result<()>;

    /// Compare `base...head`
    async fn get_comparison(&self, project: &Project, base: &str, head: &str)
        -> Result<Comparison>;

    /// Create an annotated tag object (the tag ref is created separately)
    async fn create_tag_object(&self, project: &Project, tag: NewTagObject<'_>) -> Result<TagObject>;

    async fn create_commit(
        &self,
        project: &Project,
        message: &str,
        tree_sha: &str,
        parents: &[String],
    ) -> Result<CreatedCommit>;

    /// Merge `head` into the branch `base`
    async fn merge(&self, project: &Project, base: &str, head: &str) -> Result<MergeResult>;

    async fn create_release(&self, project: &Project, release: NewRelease<'_>) -> Result<Release>;

    async fn update_release(&self, project: &Project, update: ReleaseUpdate<'_>) -> Result<Release>;

    async fn get_all_tags(&self, project: &Project) -> Result<Vec<TagSummary>>;

    async fn get_all_releases(&self, project: &Project) -> Result<Vec<ReleaseSummary>>;

    /// Details of the annotated tag object `tag_sha`
    async fn get_tag(&self, project: &Project, tag_sha: &str) -> Result<TagDetails>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_names_match_rest_client_vocabulary() {
        assert_eq!(ApiOperation::CreateTagObject.to_string(), "createTagObject");
        assert_eq!(ApiOperation::GetLatestRelease.name(), "getLatestRelease");
    }
}
