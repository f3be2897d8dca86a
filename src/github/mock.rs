use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use super::types::*;
use super::{ApiOperation, GitReleaseApi};
use crate::domain::{Project, User};
use crate::error::{GitReleaseError, Result};

pub const MOCK_OWNER: &str = "goodreleaser";
pub const MOCK_SEMVER_REPO: &str = "repo_sem_ver";
pub const MOCK_CALVER_REPO: &str = "repo_cal_ver";
pub const MOCK_EMPTY_REPO: &str = "repo_no_release";
pub const MOCK_DEFAULT_BRANCH: &str = "main";
pub const MOCK_DEFAULT_BRANCH_SHA: &str = "mock_default_branch_commit_sha";
pub const MOCK_DEFAULT_BRANCH_TREE_SHA: &str = "mock_default_branch_tree_sha";
pub const MOCK_BRANCH_COMMIT_SHA: &str = "mock_branch_commit_sha";
pub const MOCK_BRANCH_TREE_SHA: &str = "mock_branch_commit_tree_sha";
pub const MOCK_PATCH_COMMIT_SHA: &str = "mock_patch_commit_sha";
pub const MOCK_PATCH_PARENT_SHA: &str = "mock_patch_commit_parent_sha";

/// A commit created through [`GitReleaseApi::create_commit`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedCommitRecord {
    pub sha: String,
    pub tree_sha: String,
    pub parents: Vec<String>,
}

#[derive(Default)]
struct MockState {
    user: Option<User>,
    owners: Vec<String>,
    repositories: HashMap<String, Vec<String>>,
    repository: Option<Repository>,
    releases: Vec<Release>,
    branches: BTreeMap<String, Branch>,
    commits: HashMap<String, Commit>,
    recent_commits: Vec<RecentCommit>,
    refs: BTreeMap<String, String>,
    tag_objects: HashMap<String, (TagObject, TagDetails)>,
    comparisons: HashMap<(String, String), Comparison>,
    release_dates: HashMap<u64, String>,
    created_commits: Vec<CreatedCommitRecord>,
    failures: HashMap<ApiOperation, GitReleaseError>,
    unimplemented: HashSet<ApiOperation>,
    calls: Vec<ApiOperation>,
    next_id: u64,
}

/// In-memory GitHub double.
///
/// Holds a tiny repository model (branches, refs, tag objects, releases) so
/// that workflows can be exercised end to end, records every call, and can be
/// told to fail or to behave as an unimplemented stub per operation.
pub struct MockGitReleaseApi {
    host: String,
    state: Mutex<MockState>,
}

impl MockGitReleaseApi {
    /// Create an empty mock: no user, no repository, no releases
    pub fn new() -> Self {
        MockGitReleaseApi {
            host: "github.com".to_string(),
            state: Mutex::new(MockState {
                next_id: 1,
                ..MockState::default()
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        // A panicking test thread must not hide the state from the others
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Repository with a default branch and user, but no release yet
    pub fn empty() -> Self {
        let mock = MockGitReleaseApi::new();
        mock.set_user("backstage-user", Some("guest@backstage.io"));
        mock.set_owners(&["backstage-user", MOCK_OWNER]);
        mock.add_repositories(MOCK_OWNER, &[MOCK_SEMVER_REPO, MOCK_CALVER_REPO, MOCK_EMPTY_REPO]);
        mock.set_repository(MOCK_EMPTY_REPO, MOCK_DEFAULT_BRANCH);
        mock.add_branch(
            MOCK_DEFAULT_BRANCH,
            MOCK_DEFAULT_BRANCH_SHA,
            MOCK_DEFAULT_BRANCH_TREE_SHA,
        );
        mock.add_commit(Commit {
            sha: MOCK_PATCH_COMMIT_SHA.to_string(),
            html_url: format!("https://github.com/{}/commit/{}", MOCK_OWNER, MOCK_PATCH_COMMIT_SHA),
            message: "fix: handle empty changelog".to_string(),
            created_at: Some("2020-01-02T10:00:00Z".to_string()),
            first_parent_sha: Some(MOCK_PATCH_PARENT_SHA.to_string()),
        });
        mock.add_recent_commit(RecentCommit {
            sha: MOCK_PATCH_COMMIT_SHA.to_string(),
            html_url: format!("https://github.com/{}/commit/{}", MOCK_OWNER, MOCK_PATCH_COMMIT_SHA),
            message: "fix: handle empty changelog".to_string(),
            author_login: Some("backstage-user".to_string()),
            author_html_url: Some("https://github.com/backstage-user".to_string()),
            first_parent_sha: Some(MOCK_PATCH_PARENT_SHA.to_string()),
        });
        mock
    }

    /// `goodreleaser/repo_sem_ver` with latest release `rc-1.2.3`
    pub fn semver() -> Self {
        let mock = MockGitReleaseApi::empty();
        mock.set_repository(MOCK_SEMVER_REPO, MOCK_DEFAULT_BRANCH);
        mock.add_released_candidate("rc-1.2.3", "rc/1.2.3", "2020-01-01T10:00:00Z");
        // Branch named after the tag, pinned like the release branch
        mock.add_branch("rc-1.2.3", MOCK_BRANCH_COMMIT_SHA, MOCK_BRANCH_TREE_SHA);
        mock
    }

    /// `goodreleaser/repo_cal_ver` with latest release `rc-2020.01.01_1`
    pub fn calver() -> Self {
        let mock = MockGitReleaseApi::empty();
        mock.set_repository(MOCK_CALVER_REPO, MOCK_DEFAULT_BRANCH);
        mock.add_released_candidate("rc-2020.01.01_1", "rc/2020.01.01_0", "2020-01-01T10:00:00Z");
        mock
    }

    fn add_released_candidate(&self, tag: &str, branch: &str, date: &str) {
        self.add_branch(branch, MOCK_BRANCH_COMMIT_SHA, MOCK_BRANCH_TREE_SHA);
        self.add_annotated_tag(tag, MOCK_BRANCH_COMMIT_SHA, date);
        let id = self.add_release(tag, branch, true);
        self.state().release_dates.insert(id, date.to_string());
    }

    pub fn set_user(&self, username: &str, email: Option<&str>) {
        self.state().user = Some(User {
            username: username.to_string(),
            email: email.map(str::to_string),
        });
    }

    pub fn set_owners(&self, owners: &[&str]) {
        self.state().owners = owners.iter().map(|o| o.to_string()).collect();
    }

    pub fn add_repositories(&self, owner: &str, repos: &[&str]) {
        self.state()
            .repositories
            .insert(owner.to_string(), repos.iter().map(|r| r.to_string()).collect());
    }

    pub fn set_repository(&self, name: &str, default_branch: &str) {
        self.state().repository = Some(Repository {
            name: name.to_string(),
            default_branch: default_branch.to_string(),
            push_permissions: Some(true),
        });
    }

    /// Add a branch and its head ref
    pub fn add_branch(&self, name: &str, commit_sha: &str, tree_sha: &str) {
        let mut state = self.state();
        state.branches.insert(
            name.to_string(),
            Branch {
                name: name.to_string(),
                html_url: format!("https://github.com/{}/tree/{}", MOCK_OWNER, name),
                commit_sha: commit_sha.to_string(),
                tree_sha: tree_sha.to_string(),
            },
        );
        state
            .refs
            .insert(format!("refs/heads/{}", name), commit_sha.to_string());
    }

    pub fn add_commit(&self, commit: Commit) {
        self.state().commits.insert(commit.sha.clone(), commit);
    }

    pub fn add_recent_commit(&self, commit: RecentCommit) {
        self.state().recent_commits.push(commit);
    }

    /// Add an annotated tag object and its ref
    pub fn add_annotated_tag(&self, tag: &str, commit_sha: &str, date: &str) {
        let mut state = self.state();
        let tag_sha = format!("mock_tag_sha_{}", tag);
        let username = state
            .user
            .as_ref()
            .map(|u| u.username.clone())
            .unwrap_or_default();
        state.tag_objects.insert(
            tag_sha.clone(),
            (
                TagObject {
                    tag_name: tag.to_string(),
                    tag_sha: tag_sha.clone(),
                },
                TagDetails {
                    date: date.to_string(),
                    username,
                    user_email: String::new(),
                    object_sha: commit_sha.to_string(),
                },
            ),
        );
        state.refs.insert(format!("refs/tags/{}", tag), tag_sha);
    }

    /// Add a lightweight tag pointing straight at a commit
    pub fn add_lightweight_tag(&self, tag: &str, commit_sha: &str) {
        self.state()
            .refs
            .insert(format!("refs/tags/{}", tag), commit_sha.to_string());
    }

    /// Add a release; the newest one added is the latest release
    pub fn add_release(&self, tag: &str, target_commitish: &str, prerelease: bool) -> u64 {
        let mut state = self.state();
        let id = state.next_id;
        state.next_id += 1;
        state.releases.push(Release {
            id,
            name: Some(tag.to_string()),
            tag_name: tag.to_string(),
            target_commitish: target_commitish.to_string(),
            prerelease,
            html_url: format!("https://github.com/{}/releases/tag/{}", MOCK_OWNER, tag),
            body: Some(String::new()),
        });
        id
    }

    pub fn set_comparison(&self, base: &str, head: &str, ahead_by: u64) {
        self.state().comparisons.insert(
            (base.to_string(), head.to_string()),
            Comparison {
                html_url: format!("https://github.com/{}/compare/{}...{}", MOCK_OWNER, base, head),
                ahead_by,
            },
        );
    }

    /// Make every call of `operation` fail with `error`
    pub fn fail_on(&self, operation: ApiOperation, error: GitReleaseError) {
        self.state().failures.insert(operation, error);
    }

    /// Make `operation` behave like a development stub
    pub fn mark_unimplemented(&self, operation: ApiOperation) {
        self.state().unimplemented.insert(operation);
    }

    /// Every operation called so far, in order
    pub fn calls(&self) -> Vec<ApiOperation> {
        self.state().calls.clone()
    }

    pub fn ref_sha(&self, reference: &str) -> Option<String> {
        self.state().refs.get(reference).cloned()
    }

    pub fn releases(&self) -> Vec<Release> {
        self.state().releases.clone()
    }

    /// Commits created so far, in order
    pub fn created_commits(&self) -> Vec<CreatedCommitRecord> {
        self.state().created_commits.clone()
    }

    pub fn branch(&self, name: &str) -> Option<Branch> {
        self.state().branches.get(name).cloned()
    }

    /// Record the call, then apply injected failures
    fn enter(&self, operation: ApiOperation) -> Result<MutexGuard<'_, MockState>> {
        let mut state = self.state();
        state.calls.push(operation);

        if state.unimplemented.contains(&operation) {
            return Err(GitReleaseError::unimplemented(operation.name()));
        }
        if let Some(error) = state.failures.get(&operation) {
            return Err(clone_error(error));
        }
        Ok(state)
    }
}

impl Default for MockGitReleaseApi {
    fn default() -> Self {
        Self::new()
    }
}

fn clone_error(error: &GitReleaseError) -> GitReleaseError {
    match error {
        GitReleaseError::Api { status, message } => GitReleaseError::api(*status, message.clone()),
        other => GitReleaseError::api(500, other.to_string()),
    }
}

fn not_found(what: impl std::fmt::Display) -> GitReleaseError {
    GitReleaseError::api(404, format!("{} not found", what))
}

fn new_sha(state: &mut MockState, kind: &str) -> String {
    let id = state.next_id;
    state.next_id += 1;
    format!("mock_{}_sha_{}", kind, id)
}

/// Peel a tag ref value down to the commit it designates
fn peel(state: &MockState, sha: &str) -> String {
    match state.tag_objects.get(sha) {
        Some((_, details)) => details.object_sha.clone(),
        None => sha.to_string(),
    }
}

#[async_trait]
impl GitReleaseApi for MockGitReleaseApi {
    fn get_host(&self) -> String {
        self.host.clone()
    }

    async fn get_user(&self, _project: &Project) -> Result<User> {
        let state = self.enter(ApiOperation::GetUser)?;
        state
            .user
            .clone()
            .ok_or_else(|| GitReleaseError::api(401, "Requires authentication"))
    }

    async fn get_owners(&self) -> Result<Vec<String>> {
        let state = self.enter(ApiOperation::GetOwners)?;
        Ok(state.owners.clone())
    }

    async fn get_repositories(&self, owner: &str) -> Result<Vec<String>> {
        let state = self.enter(ApiOperation::GetRepositories)?;
        Ok(state.repositories.get(owner).cloned().unwrap_or_default())
    }

    async fn get_repository(&self, project: &Project) -> Result<Repository> {
        let state = self.enter(ApiOperation::GetRepository)?;
        state
            .repository
            .clone()
            .ok_or_else(|| not_found(project.slug()))
    }

    async fn get_latest_release(&self, _project: &Project) -> Result<Option<Release>> {
        let state = self.enter(ApiOperation::GetLatestRelease)?;
        Ok(state.releases.last().cloned())
    }

    async fn get_recent_commits(
        &self,
        _project: &Project,
        _branch: Option<&str>,
    ) -> Result<Vec<RecentCommit>> {
        let state = self.enter(ApiOperation::GetRecentCommits)?;
        Ok(state.recent_commits.clone())
    }

    async fn get_commit(&self, _project: &Project, reference: &str) -> Result<Commit> {
        let state = self.enter(ApiOperation::GetCommit)?;

        let sha = state
            .refs
            .get(&format!("refs/tags/{}", reference))
            .or_else(|| state.refs.get(&format!("refs/heads/{}", reference)))
            .map(|sha| peel(&state, sha))
            .unwrap_or_else(|| reference.to_string());

        if let Some(commit) = state.commits.get(&sha) {
            return Ok(commit.clone());
        }
        if state.refs.values().any(|v| peel(&state, v) == sha) {
            return Ok(Commit {
                html_url: format!("https://github.com/{}/commit/{}", MOCK_OWNER, sha),
                message: format!("commit {}", sha),
                created_at: None,
                first_parent_sha: None,
                sha,
            });
        }
        Err(not_found(format!("Commit {}", reference)))
    }

    async fn get_branch(&self, _project: &Project, branch: &str) -> Result<Branch> {
        let state = self.enter(ApiOperation::GetBranch)?;
        state
            .branches
            .get(branch)
            .cloned()
            .ok_or_else(|| not_found(format!("Branch {}", branch)))
    }

    async fn create_ref(&self, _project: &Project, reference: &str, sha: &str) -> Result<Reference> {
        let mut state = self.enter(ApiOperation::CreateRef)?;
        if state.refs.contains_key(reference) {
            return Err(GitReleaseError::api(422, "Reference already exists"));
        }

        state.refs.insert(reference.to_string(), sha.to_string());
        if let Some(name) = reference.strip_prefix("refs/heads/") {
            let tree_sha = state
                .branches
                .values()
                .find(|b| b.commit_sha == sha)
                .map(|b| b.tree_sha.clone())
                .unwrap_or_else(|| format!("mock_tree_for_{}", sha));
            state.branches.insert(
                name.to_string(),
                Branch {
                    name: name.to_string(),
                    html_url: format!("https://github.com/{}/tree/{}", MOCK_OWNER, name),
                    commit_sha: sha.to_string(),
                    tree_sha,
                },
            );
        }

        Ok(Reference {
            ref_name: reference.to_string(),
            object_sha: sha.to_string(),
        })
    }

    async fn update_ref(
        &self,
        _project: &Project,
        reference: &str,
        sha: &str,
        _force: bool,
    ) -> Result<Reference> {
        let mut state = self.enter(ApiOperation::UpdateRef)?;
        let full = format!("refs/{}", reference);
        if !state.refs.contains_key(&full) {
            return Err(GitReleaseError::api(422, "Reference does not exist"));
        }

        state.refs.insert(full.clone(), sha.to_string());
        if let Some(name) = reference.strip_prefix("heads/") {
            if let Some(branch) = state.branches.get_mut(name) {
                branch.commit_sha = sha.to_string();
            }
        }

        Ok(Reference {
            ref_name: full,
            object_sha: sha.to_string(),
        })
    }

    async fn delete_ref(&self, _project: &Project, reference: &str) -> Result<()> {
        let mut state = self.enter(ApiOperation::DeleteRef)?;
        let full = format!("refs/{}", reference);
        if state.refs.remove(&full).is_none() {
            return Err(GitReleaseError::api(422, "Reference does not exist"));
        }
        if let Some(name) = reference.strip_prefix("heads/") {
            state.branches.remove(name);
        }
        Ok(())
    }

    async fn get_comparison(
        &self,
        _project: &Project,
        base: &str,
        head: &str,
    ) -> Result<Comparison> {
        let state = self.enter(ApiOperation::GetComparison)?;
        Ok(state
            .comparisons
            .get(&(base.to_string(), head.to_string()))
            .cloned()
            .unwrap_or_else(|| Comparison {
                html_url: format!("https://github.com/{}/compare/{}...{}", MOCK_OWNER, base, head),
                ahead_by: 1,
            }))
    }

    async fn create_tag_object(&self, _project: &Project, tag: NewTagObject<'_>) -> Result<TagObject> {
        let mut state = self.enter(ApiOperation::CreateTagObject)?;
        let tag_sha = new_sha(&mut state, "tag");
        let object = TagObject {
            tag_name: tag.tag.to_string(),
            tag_sha: tag_sha.clone(),
        };
        state.tag_objects.insert(
            tag_sha,
            (
                object.clone(),
                TagDetails {
                    date: "2020-01-02T10:00:00Z".to_string(),
                    username: tag.tagger.name.clone(),
                    user_email: tag.tagger.email.clone().unwrap_or_default(),
                    object_sha: tag.object_sha.to_string(),
                },
            ),
        );
        Ok(object)
    }

    async fn create_commit(
        &self,
        _project: &Project,
        message: &str,
        tree_sha: &str,
        parents: &[String],
    ) -> Result<CreatedCommit> {
        let mut state = self.enter(ApiOperation::CreateCommit)?;
        let sha = new_sha(&mut state, "commit");
        state.commits.insert(
            sha.clone(),
            Commit {
                sha: sha.clone(),
                html_url: format!("https://github.com/{}/commit/{}", MOCK_OWNER, sha),
                message: message.to_string(),
                created_at: None,
                first_parent_sha: parents.first().cloned(),
            },
        );
        state.created_commits.push(CreatedCommitRecord {
            sha: sha.clone(),
            tree_sha: tree_sha.to_string(),
            parents: parents.to_vec(),
        });
        Ok(CreatedCommit {
            message: message.to_string(),
            sha,
        })
    }

    async fn merge(&self, _project: &Project, base: &str, head: &str) -> Result<MergeResult> {
        let mut state = self.enter(ApiOperation::Merge)?;
        if !state.branches.contains_key(base) {
            return Err(not_found(format!("Base {}", base)));
        }
        let merge_sha = new_sha(&mut state, "merge");
        let tree_sha = new_sha(&mut state, "tree");
        if let Some(branch) = state.branches.get_mut(base) {
            branch.commit_sha = merge_sha.clone();
            branch.tree_sha = tree_sha.clone();
        }
        state.refs.insert(format!("refs/heads/{}", base), merge_sha.clone());

        Ok(MergeResult {
            html_url: format!("https://github.com/{}/commit/{}", MOCK_OWNER, merge_sha),
            message: format!("Merge {} into {}", head, base),
            tree_sha,
        })
    }

    async fn create_release(&self, _project: &Project, release: NewRelease<'_>) -> Result<Release> {
        let mut state = self.enter(ApiOperation::CreateRelease)?;
        let id = state.next_id;
        state.next_id += 1;

        let created = Release {
            id,
            name: Some(release.name.to_string()),
            tag_name: release.tag_name.to_string(),
            target_commitish: release.target_commitish.to_string(),
            prerelease: release.prerelease,
            html_url: format!(
                "https://github.com/{}/releases/tag/{}",
                MOCK_OWNER, release.tag_name
            ),
            body: Some(release.body.to_string()),
        };
        state.releases.push(created.clone());
        Ok(created)
    }

    async fn update_release(&self, _project: &Project, update: ReleaseUpdate<'_>) -> Result<Release> {
        let mut state = self.enter(ApiOperation::UpdateRelease)?;
        let release = state
            .releases
            .iter_mut()
            .find(|r| r.id == update.release_id)
            .ok_or_else(|| not_found(format!("Release {}", update.release_id)))?;

        release.tag_name = update.tag_name.to_string();
        release.html_url = format!(
            "https://github.com/{}/releases/tag/{}",
            MOCK_OWNER, update.tag_name
        );
        if let Some(body) = update.body {
            release.body = Some(body.to_string());
        }
        if let Some(prerelease) = update.prerelease {
            release.prerelease = prerelease;
        }
        Ok(release.clone())
    }

    async fn get_all_tags(&self, _project: &Project) -> Result<Vec<TagSummary>> {
        let state = self.enter(ApiOperation::GetAllTags)?;
        Ok(state
            .refs
            .iter()
            .filter_map(|(reference, sha)| {
                reference.strip_prefix("refs/tags/").map(|name| TagSummary {
                    tag_name: name.to_string(),
                    tag_sha: sha.clone(),
                    tag_type: if state.tag_objects.contains_key(sha) {
                        TagType::Tag
                    } else {
                        TagType::Commit
                    },
                })
            })
            .collect())
    }

    async fn get_all_releases(&self, _project: &Project) -> Result<Vec<ReleaseSummary>> {
        let state = self.enter(ApiOperation::GetAllReleases)?;
        Ok(state
            .releases
            .iter()
            .rev()
            .map(|r| ReleaseSummary {
                id: r.id,
                name: r.name.clone(),
                tag_name: r.tag_name.clone(),
                created_at: state.release_dates.get(&r.id).cloned(),
                html_url: r.html_url.clone(),
            })
            .collect())
    }

    async fn get_tag(&self, _project: &Project, tag_sha: &str) -> Result<TagDetails> {
        let state = self.enter(ApiOperation::GetTag)?;
        state
            .tag_objects
            .get(tag_sha)
            .map(|(_, details)| details.clone())
            .ok_or_else(|| not_found(format!("Tag {}", tag_sha)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ProjectSource, VersioningStrategy};

    fn project() -> Project {
        Project::new(
            MOCK_OWNER,
            MOCK_SEMVER_REPO,
            VersioningStrategy::Semver,
            ProjectSource::Cli,
        )
    }

    #[tokio::test]
    async fn test_semver_fixture_branch_round_trip() {
        let api = MockGitReleaseApi::semver();
        let latest = api.get_latest_release(&project()).await.unwrap().unwrap();
        assert_eq!(latest.tag_name, "rc-1.2.3");

        let branch = api.get_branch(&project(), "rc-1.2.3").await.unwrap();
        assert_eq!(branch.commit_sha, MOCK_BRANCH_COMMIT_SHA);
        assert_eq!(branch.tree_sha, MOCK_BRANCH_TREE_SHA);

        let release_branch = api.get_branch(&project(), &latest.target_commitish).await.unwrap();
        assert_eq!(release_branch.commit_sha, MOCK_BRANCH_COMMIT_SHA);
    }

    #[tokio::test]
    async fn test_fixture_lists_owner_repositories() {
        let api = MockGitReleaseApi::semver();
        let repos = api.get_repositories(MOCK_OWNER).await.unwrap();
        assert_eq!(repos, vec![MOCK_SEMVER_REPO, MOCK_CALVER_REPO, MOCK_EMPTY_REPO]);
    }

    #[test]
    fn test_host_and_repo_path() {
        let api = MockGitReleaseApi::new();
        assert_eq!(api.get_host(), "github.com");
        assert_eq!(api.get_repo_path(&project()), "goodreleaser/repo_sem_ver");
    }

    #[tokio::test]
    async fn test_missing_branch_is_not_found() {
        let api = MockGitReleaseApi::semver();
        let err = api.get_branch(&project(), "rc/9.9.9").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_create_ref_twice_fails() {
        let api = MockGitReleaseApi::empty();
        api.create_ref(&project(), "refs/heads/rc/1.0.0", "abc").await.unwrap();
        let err = api
            .create_ref(&project(), "refs/heads/rc/1.0.0", "abc")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[tokio::test]
    async fn test_unimplemented_operation() {
        let api = MockGitReleaseApi::empty();
        api.mark_unimplemented(ApiOperation::GetRepositories);
        let err = api.get_repositories(MOCK_OWNER).await.unwrap_err();
        assert_eq!(err.to_string(), "Function getRepositories not implemented");
    }

    #[tokio::test]
    async fn test_injected_failure_is_recorded() {
        let api = MockGitReleaseApi::empty();
        api.fail_on(ApiOperation::GetUser, GitReleaseError::api(500, "boom"));
        assert!(api.get_user(&project()).await.is_err());
        assert_eq!(api.calls(), vec![ApiOperation::GetUser]);
    }

    #[tokio::test]
    async fn test_get_commit_resolves_annotated_tag() {
        let api = MockGitReleaseApi::semver();
        let commit = api.get_commit(&project(), "rc-1.2.3").await.unwrap();
        assert_eq!(commit.sha, MOCK_BRANCH_COMMIT_SHA);
    }

    #[tokio::test]
    async fn test_tags_listing_reports_types() {
        let api = MockGitReleaseApi::semver();
        api.add_lightweight_tag("version-1.1.0", MOCK_DEFAULT_BRANCH_SHA);
        let tags = api.get_all_tags(&project()).await.unwrap();

        let rc = tags.iter().find(|t| t.tag_name == "rc-1.2.3").unwrap();
        assert_eq!(rc.tag_type, TagType::Tag);
        let light = tags.iter().find(|t| t.tag_name == "version-1.1.0").unwrap();
        assert_eq!(light.tag_type, TagType::Commit);
    }
}
