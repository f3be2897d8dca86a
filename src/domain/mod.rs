//! Domain logic - pure release rules independent of the GitHub API

pub mod project;
pub mod tag;
pub mod version;

pub use project::{
    Project, ProjectSource, User, VersioningStrategy, PROJECT_SLUG_ANNOTATION,
    VERSIONING_STRATEGY_ANNOTATION,
};
pub use tag::{TagParts, TagPrefix};
pub use version::{CalendarVersion, ReleaseVersion, VersionBump};
