use git2::Repository;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

use crate::error::{GitReleaseError, Result};

fn remote_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // https://host/owner/repo(.git), ssh://git@host(:port)/owner/repo(.git), git@host:owner/repo(.git)
        Regex::new(
            r"^(?:(?:https?|ssh|git)://(?:[^@/]+@)?(?P<h1>[^/:]+)(?::\d+)?/|[^@]+@(?P<h2>[^:]+):)(?P<owner>[^/]+)/(?P<repo>[^/]+?)(?:\.git)?/?$",
        )
        .expect("remote url regex is valid")
    })
}

/// `owner/repo` slug and host parsed out of a git remote URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSlug {
    pub host: String,
    pub owner: String,
    pub repo: String,
}

impl RemoteSlug {
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

/// Parse a remote URL such as `git@github.com:owner/repo.git`.
///
/// # Returns
/// * `Some(RemoteSlug)` - The URL names an `owner/repo` on some host
/// * `None` - Local paths and anything else that cannot be mapped to a project
pub fn parse_remote_url(url: &str) -> Option<RemoteSlug> {
    let caps = remote_url_regex().captures(url.trim())?;
    let host = caps.name("h1").or_else(|| caps.name("h2"))?.as_str();
    Some(RemoteSlug {
        host: host.to_string(),
        owner: caps["owner"].to_string(),
        repo: caps["repo"].to_string(),
    })
}

/// Read the project slug from the `origin` remote of the repository that
/// contains `path`.
///
/// Remotes are tried with `origin` first, then the rest alphabetically; the
/// first one that parses wins.
///
/// # Returns
/// * `Ok(Some(slug))` - A remote pointing at a hosted repository was found
/// * `Ok(None)` - The repository has no usable remote
/// * `Err` - `path` is not inside a git repository
pub fn detect_remote(path: &Path) -> Result<Option<RemoteSlug>> {
    let repo = Repository::discover(path)
        .map_err(|e| GitReleaseError::config(format!("Not in a git repository: {}", e.message())))?;

    let mut names: Vec<String> = repo
        .remotes()?
        .iter()
        .flatten()
        .map(str::to_string)
        .collect();
    names.sort_by(|a, b| match (a == "origin", b == "origin") {
        (true, false) => std::cmp::Ordering::Less,
        (false, true) => std::cmp::Ordering::Greater,
        _ => a.cmp(b),
    });

    for name in names {
        let remote = repo.find_remote(&name)?;
        if let Some(slug) = remote.url().and_then(parse_remote_url) {
            tracing::debug!(remote = %name, slug = %slug.slug(), "Detected project from git remote");
            return Ok(Some(slug));
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_https_url() {
        let slug = parse_remote_url("https://github.com/goodreleaser/repo_sem_ver.git").unwrap();
        assert_eq!(slug.host, "github.com");
        assert_eq!(slug.slug(), "goodreleaser/repo_sem_ver");
    }

    #[test]
    fn test_parse_ssh_urls() {
        let scp = parse_remote_url("git@github.example.com:acme/widgets.git").unwrap();
        assert_eq!(scp.host, "github.example.com");
        assert_eq!(scp.slug(), "acme/widgets");

        let ssh = parse_remote_url("ssh://git@github.com:22/acme/widgets").unwrap();
        assert_eq!(ssh.host, "github.com");
        assert_eq!(ssh.repo, "widgets");
    }

    #[test]
    fn test_parse_rejects_local_paths() {
        assert!(parse_remote_url("/srv/git/widgets.git").is_none());
        assert!(parse_remote_url("https://github.com/only-owner").is_none());
    }

    #[test]
    fn test_detect_remote_prefers_origin() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        repo.remote("backup", "https://github.com/mirror/widgets.git").unwrap();
        repo.remote("origin", "git@github.com:acme/widgets.git").unwrap();

        let slug = detect_remote(dir.path()).unwrap().unwrap();
        assert_eq!(slug.slug(), "acme/widgets");
    }

    #[test]
    fn test_detect_remote_without_remotes() {
        let dir = TempDir::new().unwrap();
        Repository::init(dir.path()).unwrap();
        assert_eq!(detect_remote(dir.path()).unwrap(), None);
    }
}
