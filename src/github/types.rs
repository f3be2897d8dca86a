//! Narrow views of the GitHub objects the release workflows read and create.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub default_branch: String,
    pub push_permissions: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub id: u64,
    pub name: Option<String>,
    pub tag_name: String,
    pub target_commitish: String,
    pub prerelease: bool,
    pub html_url: String,
    pub body: Option<String>,
}

/// Entry of the full release listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseSummary {
    pub id: u64,
    pub name: Option<String>,
    pub tag_name: String,
    pub created_at: Option<String>,
    pub html_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    pub html_url: String,
    pub commit_sha: String,
    pub tree_sha: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    pub html_url: String,
    pub message: String,
    pub created_at: Option<String>,
    /// Absent for root commits
    pub first_parent_sha: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentCommit {
    pub sha: String,
    pub html_url: String,
    pub message: String,
    pub author_login: Option<String>,
    pub author_html_url: Option<String>,
    pub first_parent_sha: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub ref_name: String,
    pub object_sha: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    pub html_url: String,
    pub ahead_by: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagObject {
    pub tag_name: String,
    pub tag_sha: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedCommit {
    pub message: String,
    pub sha: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeResult {
    pub html_url: String,
    pub message: String,
    pub tree_sha: String,
}

/// Whether a tag ref points at an annotated tag object or straight at a commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagType {
    Tag,
    Commit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSummary {
    pub tag_name: String,
    pub tag_sha: String,
    pub tag_type: TagType,
}

/// Annotated tag object details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagDetails {
    pub date: String,
    pub username: String,
    pub user_email: String,
    pub object_sha: String,
}

/// Identity recorded on annotated tags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tagger {
    pub name: String,
    pub email: Option<String>,
}

pub struct NewRelease<'a> {
    pub tag_name: &'a str,
    pub name: &'a str,
    pub target_commitish: &'a str,
    pub body: &'a str,
    pub prerelease: bool,
}

pub struct ReleaseUpdate<'a> {
    pub release_id: u64,
    pub tag_name: &'a str,
    pub body: Option<&'a str>,
    pub prerelease: Option<bool>,
}

pub struct NewTagObject<'a> {
    pub tag: &'a str,
    pub message: &'a str,
    pub object_sha: &'a str,
    pub tagger: &'a Tagger,
}
