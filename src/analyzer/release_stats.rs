use chrono::{DateTime, Duration, FixedOffset, NaiveDate};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::domain::{Project, ReleaseVersion, TagParts, TagPrefix, VersioningStrategy};
use crate::error::{GitReleaseError, Result};
use crate::github::{GitReleaseApi, ReleaseSummary, TagSummary, TagType};

/// Sort key of a base version; numeric so that `1.10` follows `1.9`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum BaseKey {
    Semantic(u64, u64),
    Calendar(NaiveDate),
}

impl BaseKey {
    fn of(version: &ReleaseVersion) -> Self {
        match version {
            ReleaseVersion::Semantic(v) => BaseKey::Semantic(v.major, v.minor),
            ReleaseVersion::Calendar(v) => BaseKey::Calendar(v.date),
        }
    }
}

/// A tag of a release line, in version order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupedTag {
    pub tag_name: String,
    pub tag_sha: String,
    pub tag_type: TagType,
    #[serde(skip)]
    version: ReleaseVersion,
}

/// Time from the first candidate of a release line to its first final tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadTime {
    pub candidate_tag: String,
    pub candidate_date: DateTime<FixedOffset>,
    pub release_tag: String,
    pub release_date: DateTime<FixedOffset>,
    #[serde(skip)]
    pub duration: Duration,
}

impl LeadTime {
    pub fn days(&self) -> i64 {
        self.duration.num_days()
    }
}

/// Releases and tags sharing a base version (`1.2` or `2020.01.01`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionGroup {
    pub base_version: String,
    pub releases: Vec<ReleaseSummary>,
    pub candidate_tags: Vec<GroupedTag>,
    pub version_tags: Vec<GroupedTag>,
    pub lead_time: Option<LeadTime>,
}

/// Release history summary of a repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseStats {
    /// Newest release line first
    pub groups: Vec<VersionGroup>,
    /// Releases whose tag does not follow the project's scheme
    pub unmatched_releases: Vec<ReleaseSummary>,
}

impl ReleaseStats {
    pub fn release_count(&self) -> usize {
        self.groups.iter().map(|g| g.releases.len()).sum()
    }

    /// Mean lead time over the groups that have one
    pub fn average_lead_time(&self) -> Option<Duration> {
        let durations: Vec<Duration> = self
            .groups
            .iter()
            .filter_map(|g| g.lead_time.as_ref().map(|l| l.duration))
            .collect();
        if durations.is_empty() {
            return None;
        }
        let total: i64 = durations.iter().map(|d| d.num_seconds()).sum();
        Some(Duration::seconds(total / durations.len() as i64))
    }
}

/// Group releases and tags by base version. No API calls; lead times are
/// left empty.
pub fn group_by_base_version(
    strategy: VersioningStrategy,
    releases: Vec<ReleaseSummary>,
    tags: Vec<TagSummary>,
) -> ReleaseStats {
    let mut groups: BTreeMap<BaseKey, VersionGroup> = BTreeMap::new();
    let mut unmatched_releases = Vec::new();

    fn group_for<'a>(
        groups: &'a mut BTreeMap<BaseKey, VersionGroup>,
        version: &ReleaseVersion,
    ) -> &'a mut VersionGroup {
        groups.entry(BaseKey::of(version)).or_insert_with(|| VersionGroup {
            base_version: version.base(),
            releases: Vec::new(),
            candidate_tags: Vec::new(),
            version_tags: Vec::new(),
            lead_time: None,
        })
    }

    for release in releases {
        match TagParts::parse(&release.tag_name, strategy) {
            Ok(parts) => group_for(&mut groups, &parts.version).releases.push(release),
            Err(_) => unmatched_releases.push(release),
        }
    }

    for tag in tags {
        // Tags outside the scheme are not part of any release line
        let Ok(parts) = TagParts::parse(&tag.tag_name, strategy) else {
            continue;
        };
        let grouped = GroupedTag {
            tag_name: tag.tag_name,
            tag_sha: tag.tag_sha,
            tag_type: tag.tag_type,
            version: parts.version.clone(),
        };
        let group = group_for(&mut groups, &parts.version);
        match parts.prefix {
            TagPrefix::Rc => group.candidate_tags.push(grouped),
            TagPrefix::Version => group.version_tags.push(grouped),
        }
    }

    let mut groups: Vec<VersionGroup> = groups.into_values().rev().collect();
    for group in &mut groups {
        group.candidate_tags.sort_by(|a, b| version_cmp(&a.version, &b.version));
        group.version_tags.sort_by(|a, b| version_cmp(&a.version, &b.version));
    }

    ReleaseStats {
        groups,
        unmatched_releases,
    }
}

fn version_cmp(a: &ReleaseVersion, b: &ReleaseVersion) -> Ordering {
    match (a, b) {
        (ReleaseVersion::Semantic(a), ReleaseVersion::Semantic(b)) => a.cmp(b),
        (ReleaseVersion::Calendar(a), ReleaseVersion::Calendar(b)) => a.cmp(b),
        (ReleaseVersion::Semantic(_), ReleaseVersion::Calendar(_)) => Ordering::Less,
        (ReleaseVersion::Calendar(_), ReleaseVersion::Semantic(_)) => Ordering::Greater,
    }
}

fn parse_date(raw: &str, tag: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw)
        .map_err(|e| GitReleaseError::version(format!("Invalid date '{}' on tag {}: {}", raw, tag, e)))
}

/// Collects release statistics for a project
pub struct ReleaseStatsAnalyzer<'a> {
    api: &'a dyn GitReleaseApi,
}

impl<'a> ReleaseStatsAnalyzer<'a> {
    pub fn new(api: &'a dyn GitReleaseApi) -> Self {
        ReleaseStatsAnalyzer { api }
    }

    /// Fetch every release and tag, group them, and compute lead times.
    ///
    /// Lead times need the date of two tags per group: annotated tags are
    /// read through the tag object, lightweight tags through their commit.
    pub async fn collect(&self, project: &Project) -> Result<ReleaseStats> {
        let releases = self.api.get_all_releases(project).await?;
        let tags = self.api.get_all_tags(project).await?;
        tracing::debug!(releases = releases.len(), tags = tags.len(), "Grouping release history");

        let mut stats = group_by_base_version(project.versioning_strategy, releases, tags);
        for group in &mut stats.groups {
            let (Some(candidate), Some(release)) =
                (group.candidate_tags.first(), group.version_tags.first())
            else {
                continue;
            };

            let candidate_date = self.tag_date(project, candidate).await?;
            let release_date = self.tag_date(project, release).await?;
            group.lead_time = Some(LeadTime {
                candidate_tag: candidate.tag_name.clone(),
                candidate_date,
                release_tag: release.tag_name.clone(),
                release_date,
                duration: release_date.signed_duration_since(candidate_date),
            });
        }

        Ok(stats)
    }

    async fn tag_date(&self, project: &Project, tag: &GroupedTag) -> Result<DateTime<FixedOffset>> {
        let raw = match tag.tag_type {
            TagType::Tag => self.api.get_tag(project, &tag.tag_sha).await?.date,
            TagType::Commit => self
                .api
                .get_commit(project, &tag.tag_sha)
                .await?
                .created_at
                .ok_or_else(|| {
                    GitReleaseError::version(format!("Commit of tag {} has no date", tag.tag_name))
                })?,
        };
        parse_date(&raw, &tag.tag_name)
    }
}
