use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::types::*;
use super::{ApiOperation, GitReleaseApi};
use crate::config::GitHubConfig;
use crate::domain::{Project, User};
use crate::error::{GitReleaseError, Result};

const PUBLIC_HOST: &str = "github.com";
const PUBLIC_API_URL: &str = "https://api.github.com";
const PAGE_SIZE: usize = 100;
const RECENT_COMMITS: usize = 20;
const USER_AGENT: &str = concat!("git-release-manager/", env!("CARGO_PKG_VERSION"));

/// GitHub REST client
pub struct GitHubClient {
    client: Client,
    host: String,
    api_base_url: String,
    token: Option<String>,
}

impl GitHubClient {
    /// Build a client for the configured host.
    ///
    /// The token is taken from the configuration, then `GITHUB_TOKEN`, then
    /// `GH_TOKEN`. Without a token only anonymous (read) calls work.
    pub fn new(config: &GitHubConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(GitReleaseError::Http)?;

        Ok(GitHubClient {
            client,
            host: config.host.clone(),
            api_base_url: api_base_url(config),
            token: resolve_token(config),
        })
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.api_base_url, path);
        let builder = self
            .client
            .request(method, url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");

        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        operation: ApiOperation,
        builder: RequestBuilder,
    ) -> Result<T> {
        let response = self.execute(operation, builder).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn execute(&self, operation: ApiOperation, builder: RequestBuilder) -> Result<Response> {
        let request = builder.build()?;
        debug!(%operation, method = %request.method(), url = %request.url(), "GitHub request");

        let response = self.client.execute(request).await?;
        let status = response.status();
        debug!(%operation, status = status.as_u16(), "GitHub response");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<WireError>(&body)
            .map(|e| e.message)
            .unwrap_or_else(|_| {
                status
                    .canonical_reason()
                    .unwrap_or("unexpected response")
                    .to_string()
            });

        Err(GitReleaseError::api(status.as_u16(), message))
    }

    /// Follow `page=N` until a short page comes back
    async fn paginate<T: DeserializeOwned>(
        &self,
        operation: ApiOperation,
        path: &str,
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut page = 1;

        loop {
            let builder = self
                .request(Method::GET, path)
                .query(&[("per_page", PAGE_SIZE), ("page", page)]);
            let batch: Vec<T> = self.send(operation, builder).await?;
            let len = batch.len();
            items.extend(batch);

            if len < PAGE_SIZE {
                return Ok(items);
            }
            page += 1;
        }
    }
}

/// REST base URL for a host; GitHub Enterprise serves the API under `/api/v3`
pub fn api_base_url(config: &GitHubConfig) -> String {
    if let Some(url) = &config.api_base_url {
        return url.trim_end_matches('/').to_string();
    }
    if config.host == PUBLIC_HOST {
        PUBLIC_API_URL.to_string()
    } else {
        format!("https://{}/api/v3", config.host)
    }
}

/// Token from config, then `GITHUB_TOKEN`, then `GH_TOKEN`
pub fn resolve_token(config: &GitHubConfig) -> Option<String> {
    config
        .token
        .clone()
        .or_else(|| std::env::var("GITHUB_TOKEN").ok())
        .or_else(|| std::env::var("GH_TOKEN").ok())
        .filter(|t| !t.trim().is_empty())
}

fn repo_path(project: &Project) -> String {
    format!("/repos/{}/{}", project.owner, project.repo)
}

#[async_trait]
impl GitReleaseApi for GitHubClient {
    fn get_host(&self) -> String {
        self.host.clone()
    }

    async fn get_user(&self, _project: &Project) -> Result<User> {
        let user: WireUser = self
            .send(ApiOperation::GetUser, self.request(Method::GET, "/user"))
            .await?;
        Ok(User {
            username: user.login,
            email: user.email,
        })
    }

    async fn get_owners(&self) -> Result<Vec<String>> {
        let user: WireUser = self
            .send(ApiOperation::GetOwners, self.request(Method::GET, "/user"))
            .await?;
        let orgs: Vec<WireAccount> = self.paginate(ApiOperation::GetOwners, "/user/orgs").await?;

        let mut owners = vec![user.login];
        owners.extend(orgs.into_iter().map(|o| o.login));
        Ok(owners)
    }

    async fn get_repositories(&self, owner: &str) -> Result<Vec<String>> {
        let repos: Vec<WireRepoName> = self
            .paginate(ApiOperation::GetRepositories, &format!("/users/{}/repos", owner))
            .await?;
        Ok(repos.into_iter().map(|r| r.name).collect())
    }

    async fn get_repository(&self, project: &Project) -> Result<Repository> {
        let repo: WireRepository = self
            .send(
                ApiOperation::GetRepository,
                self.request(Method::GET, &repo_path(project)),
            )
            .await?;
        Ok(Repository {
            name: repo.name,
            default_branch: repo.default_branch,
            push_permissions: repo.permissions.map(|p| p.push),
        })
    }

    async fn get_latest_release(&self, project: &Project) -> Result<Option<Release>> {
        let builder = self
            .request(Method::GET, &format!("{}/releases", repo_path(project)))
            .query(&[("per_page", 1)]);
        let releases: Vec<WireRelease> = self.send(ApiOperation::GetLatestRelease, builder).await?;
        Ok(releases.into_iter().next().map(Release::from))
    }

    async fn get_recent_commits(
        &self,
        project: &Project,
        branch: Option<&str>,
    ) -> Result<Vec<RecentCommit>> {
        let mut builder = self
            .request(Method::GET, &format!("{}/commits", repo_path(project)))
            .query(&[("per_page", RECENT_COMMITS)]);
        if let Some(branch) = branch {
            builder = builder.query(&[("sha", branch)]);
        }

        let commits: Vec<WireCommit> = self.send(ApiOperation::GetRecentCommits, builder).await?;
        Ok(commits
            .into_iter()
            .map(|c| RecentCommit {
                first_parent_sha: c.parents.first().map(|p| p.sha.clone()),
                author_login: c.author.as_ref().and_then(|a| a.login.clone()),
                author_html_url: c.author.as_ref().and_then(|a| a.html_url.clone()),
                sha: c.sha,
                html_url: c.html_url,
                message: c.commit.message,
            })
            .collect())
    }

    async fn get_commit(&self, project: &Project, reference: &str) -> Result<Commit> {
        let commit: WireCommit = self
            .send(
                ApiOperation::GetCommit,
                self.request(
                    Method::GET,
                    &format!("{}/commits/{}", repo_path(project), reference),
                ),
            )
            .await?;
        Ok(Commit {
            first_parent_sha: commit.parents.first().map(|p| p.sha.clone()),
            created_at: commit.commit.committer.and_then(|c| c.date),
            sha: commit.sha,
            html_url: commit.html_url,
            message: commit.commit.message,
        })
    }

    async fn get_branch(&self, project: &Project, branch: &str) -> Result<Branch> {
        let wire: WireBranch = self
            .send(
                ApiOperation::GetBranch,
                self.request(
                    Method::GET,
                    &format!("{}/branches/{}", repo_path(project), branch),
                ),
            )
            .await?;
        Ok(Branch {
            name: wire.name,
            html_url: wire.links.html,
            commit_sha: wire.commit.sha,
            tree_sha: wire.commit.commit.tree.sha,
        })
    }

    async fn create_ref(&self, project: &Project, reference: &str, sha: &str) -> Result<Reference> {
        let builder = self
            .request(Method::POST, &format!("{}/git/refs", repo_path(project)))
            .json(&json!({ "ref": reference, "sha": sha }));
        let wire: WireRef = self.send(ApiOperation::CreateRef, builder).await?;
        Ok(wire.into())
    }

    async fn update_ref(
        &self,
        project: &Project,
        reference: &str,
        sha: &str,
        force: bool,
    ) -> Result<Reference> {
        let builder = self
            .request(
                Method::PATCH,
                &format!("{}/git/refs/{}", repo_path(project), reference),
            )
            .json(&json!({ "sha": sha, "force": force }));
        let wire: WireRef = self.send(ApiOperation::UpdateRef, builder).await?;
        Ok(wire.into())
    }

    async fn delete_ref(&self, project: &Project, reference: &str) -> Result<()> {
        let builder = self.request(
            Method::DELETE,
            &format!("{}/git/refs/{}", repo_path(project), reference),
        );
        self.execute(ApiOperation::DeleteRef, builder).await?;
        Ok(())
    }

    async fn get_comparison(
        &self,
        project: &Project,
        base: &str,
        head: &str,
    ) -> Result<Comparison> {
        let wire: WireComparison = self
            .send(
                ApiOperation::GetComparison,
                self.request(
                    Method::GET,
                    &format!("{}/compare/{}...{}", repo_path(project), base, head),
                ),
            )
            .await?;
        Ok(Comparison {
            html_url: wire.html_url,
            ahead_by: wire.ahead_by,
        })
    }

    async fn create_tag_object(&self, project: &Project, tag: NewTagObject<'_>) -> Result<TagObject> {
        let mut tagger = json!({ "name": tag.tagger.name });
        if let Some(email) = &tag.tagger.email {
            tagger["email"] = json!(email);
        }

        let builder = self
            .request(Method::POST, &format!("{}/git/tags", repo_path(project)))
            .json(&json!({
                "tag": tag.tag,
                "message": tag.message,
                "object": tag.object_sha,
                "type": "commit",
                "tagger": tagger,
            }));
        let wire: WireTagObject = self.send(ApiOperation::CreateTagObject, builder).await?;
        Ok(TagObject {
            tag_name: wire.tag,
            tag_sha: wire.sha,
        })
    }

    async fn create_commit(
        &self,
        project: &Project,
        message: &str,
        tree_sha: &str,
        parents: &[String],
    ) -> Result<CreatedCommit> {
        let builder = self
            .request(Method::POST, &format!("{}/git/commits", repo_path(project)))
            .json(&json!({ "message": message, "tree": tree_sha, "parents": parents }));
        let wire: WireGitCommit = self.send(ApiOperation::CreateCommit, builder).await?;
        Ok(CreatedCommit {
            message: wire.message,
            sha: wire.sha,
        })
    }

    async fn merge(&self, project: &Project, base: &str, head: &str) -> Result<MergeResult> {
        let builder = self
            .request(Method::POST, &format!("{}/merges", repo_path(project)))
            .json(&json!({ "base": base, "head": head }));
        let wire: WireMerge = self.send(ApiOperation::Merge, builder).await?;
        Ok(MergeResult {
            html_url: wire.html_url,
            message: wire.commit.message,
            tree_sha: wire.commit.tree.sha,
        })
    }

    async fn create_release(&self, project: &Project, release: NewRelease<'_>) -> Result<Release> {
        let builder = self
            .request(Method::POST, &format!("{}/releases", repo_path(project)))
            .json(&json!({
                "tag_name": release.tag_name,
                "name": release.name,
                "target_commitish": release.target_commitish,
                "body": release.body,
                "prerelease": release.prerelease,
            }));
        let wire: WireRelease = self.send(ApiOperation::CreateRelease, builder).await?;
        Ok(wire.into())
    }

    async fn update_release(&self, project: &Project, update: ReleaseUpdate<'_>) -> Result<Release> {
        let mut payload = json!({ "tag_name": update.tag_name });
        if let Some(body) = update.body {
            payload["body"] = json!(body);
        }
        if let Some(prerelease) = update.prerelease {
            payload["prerelease"] = json!(prerelease);
        }

        let builder = self
            .request(
                Method::PATCH,
                &format!("{}/releases/{}", repo_path(project), update.release_id),
            )
            .json(&payload);
        let wire: WireRelease = self.send(ApiOperation::UpdateRelease, builder).await?;
        Ok(wire.into())
    }

    async fn get_all_tags(&self, project: &Project) -> Result<Vec<TagSummary>> {
        let refs: Vec<WireMatchingRef> = self
            .paginate(
                ApiOperation::GetAllTags,
                &format!("{}/git/matching-refs/tags", repo_path(project)),
            )
            .await?;

        Ok(refs
            .into_iter()
            .map(|r| TagSummary {
                tag_name: r.reference.trim_start_matches("refs/tags/").to_string(),
                tag_sha: r.object.sha,
                tag_type: if r.object.object_type == "tag" {
                    TagType::Tag
                } else {
                    TagType::Commit
                },
            })
            .collect())
    }

    async fn get_all_releases(&self, project: &Project) -> Result<Vec<ReleaseSummary>> {
        let releases: Vec<WireRelease> = self
            .paginate(
                ApiOperation::GetAllReleases,
                &format!("{}/releases", repo_path(project)),
            )
            .await?;

        Ok(releases
            .into_iter()
            .map(|r| ReleaseSummary {
                id: r.id,
                name: r.name,
                tag_name: r.tag_name,
                created_at: r.created_at,
                html_url: r.html_url,
            })
            .collect())
    }

    async fn get_tag(&self, project: &Project, tag_sha: &str) -> Result<TagDetails> {
        let wire: WireTagDetails = self
            .send(
                ApiOperation::GetTag,
                self.request(
                    Method::GET,
                    &format!("{}/git/tags/{}", repo_path(project), tag_sha),
                ),
            )
            .await?;
        Ok(TagDetails {
            date: wire.tagger.date,
            username: wire.tagger.name,
            user_email: wire.tagger.email,
            object_sha: wire.object.sha,
        })
    }
}

// Wire formats: only the fields we read.

#[derive(Deserialize)]
struct WireError {
    message: String,
}

#[derive(Deserialize)]
struct WireUser {
    login: String,
    email: Option<String>,
}

#[derive(Deserialize)]
struct WireAccount {
    login: String,
}

#[derive(Deserialize)]
struct WireRepoName {
    name: String,
}

#[derive(Deserialize)]
struct WirePermissions {
    push: bool,
}

#[derive(Deserialize)]
struct WireRepository {
    name: String,
    default_branch: String,
    permissions: Option<WirePermissions>,
}

#[derive(Deserialize)]
struct WireRelease {
    id: u64,
    name: Option<String>,
    tag_name: String,
    target_commitish: String,
    prerelease: bool,
    html_url: String,
    body: Option<String>,
    created_at: Option<String>,
}

impl From<WireRelease> for Release {
    fn from(r: WireRelease) -> Self {
        Release {
            id: r.id,
            name: r.name,
            tag_name: r.tag_name,
            target_commitish: r.target_commitish,
            prerelease: r.prerelease,
            html_url: r.html_url,
            body: r.body,
        }
    }
}

#[derive(Deserialize)]
struct WireSha {
    sha: String,
}

#[derive(Deserialize)]
struct WireCommitAuthor {
    login: Option<String>,
    html_url: Option<String>,
}

#[derive(Deserialize)]
struct WireCommitter {
    date: Option<String>,
}

#[derive(Deserialize)]
struct WireCommitDetail {
    message: String,
    committer: Option<WireCommitter>,
}

#[derive(Deserialize)]
struct WireCommit {
    sha: String,
    html_url: String,
    commit: WireCommitDetail,
    author: Option<WireCommitAuthor>,
    #[serde(default)]
    parents: Vec<WireSha>,
}

#[derive(Deserialize)]
struct WireBranchLinks {
    html: String,
}

#[derive(Deserialize)]
struct WireBranchCommitDetail {
    tree: WireSha,
}

#[derive(Deserialize)]
struct WireBranchCommit {
    sha: String,
    commit: WireBranchCommitDetail,
}

#[derive(Deserialize)]
struct WireBranch {
    name: String,
    #[serde(rename = "_links")]
    links: WireBranchLinks,
    commit: WireBranchCommit,
}

#[derive(Deserialize)]
struct WireRef {
    #[serde(rename = "ref")]
    reference: String,
    object: WireSha,
}

impl From<WireRef> for Reference {
    fn from(r: WireRef) -> Self {
        Reference {
            ref_name: r.reference,
            object_sha: r.object.sha,
        }
    }
}

#[derive(Deserialize)]
struct WireComparison {
    html_url: String,
    ahead_by: u64,
}

#[derive(Deserialize)]
struct WireTagObject {
    tag: String,
    sha: String,
}

#[derive(Deserialize)]
struct WireGitCommit {
    message: String,
    sha: String,
}

#[derive(Deserialize)]
struct WireMergeCommit {
    message: String,
    tree: WireSha,
}

#[derive(Deserialize)]
struct WireMerge {
    html_url: String,
    commit: WireMergeCommit,
}

#[derive(Deserialize)]
struct WireTypedObject {
    sha: String,
    #[serde(rename = "type")]
    object_type: String,
}

#[derive(Deserialize)]
struct WireMatchingRef {
    #[serde(rename = "ref")]
    reference: String,
    object: WireTypedObject,
}

#[derive(Deserialize)]
struct WireTagger {
    name: String,
    email: String,
    date: String,
}

#[derive(Deserialize)]
struct WireTagDetails {
    tagger: WireTagger,
    object: WireSha,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn config(host: &str) -> GitHubConfig {
        GitHubConfig {
            host: host.to_string(),
            api_base_url: None,
            token: None,
        }
    }

    #[test]
    fn test_api_base_url_public() {
        assert_eq!(api_base_url(&config("github.com")), "https://api.github.com");
    }

    #[test]
    fn test_api_base_url_enterprise() {
        assert_eq!(
            api_base_url(&config("ghe.example.com")),
            "https://ghe.example.com/api/v3"
        );
    }

    #[test]
    fn test_api_base_url_override() {
        let mut cfg = config("github.com");
        cfg.api_base_url = Some("http://localhost:8080/".to_string());
        assert_eq!(api_base_url(&cfg), "http://localhost:8080");
    }

    #[test]
    #[serial]
    fn test_resolve_token_prefers_config() {
        std::env::set_var("GITHUB_TOKEN", "from-env");
        let mut cfg = config("github.com");
        cfg.token = Some("from-config".to_string());
        assert_eq!(resolve_token(&cfg).as_deref(), Some("from-config"));
        std::env::remove_var("GITHUB_TOKEN");
    }

    #[test]
    #[serial]
    fn test_resolve_token_falls_back_to_env() {
        std::env::remove_var("GITHUB_TOKEN");
        std::env::set_var("GH_TOKEN", "gh-cli-token");
        assert_eq!(
            resolve_token(&config("github.com")).as_deref(),
            Some("gh-cli-token")
        );
        std::env::remove_var("GH_TOKEN");
    }

    #[test]
    #[serial]
    fn test_resolve_token_ignores_blank() {
        std::env::remove_var("GITHUB_TOKEN");
        std::env::set_var("GH_TOKEN", "  ");
        assert_eq!(resolve_token(&config("github.com")), None);
        std::env::remove_var("GH_TOKEN");
    }

    #[test]
    fn test_wire_branch_decoding() {
        let body = r#"{
            "name": "rc/1.2.3",
            "_links": { "html": "https://github.com/o/r/tree/rc/1.2.3" },
            "commit": { "sha": "abc", "commit": { "tree": { "sha": "def" } } }
        }"#;
        let wire: WireBranch = serde_json::from_str(body).unwrap();
        assert_eq!(wire.commit.sha, "abc");
        assert_eq!(wire.commit.commit.tree.sha, "def");
        assert_eq!(wire.links.html, "https://github.com/o/r/tree/rc/1.2.3");
    }

    #[test]
    fn test_wire_matching_ref_decoding() {
        let body = r#"[{ "ref": "refs/tags/rc-1.2.3", "object": { "sha": "123", "type": "tag" } }]"#;
        let refs: Vec<WireMatchingRef> = serde_json::from_str(body).unwrap();
        assert_eq!(refs[0].reference, "refs/tags/rc-1.2.3");
        assert_eq!(refs[0].object.object_type, "tag");
    }
}
