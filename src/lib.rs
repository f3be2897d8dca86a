pub mod analyzer;
pub mod boundary;
pub mod config;
pub mod context;
pub mod domain;
pub mod error;
pub mod features;
pub mod github;
pub mod hooks;
pub mod ui;
pub mod version;
pub mod workflow;

pub use context::ReleaseContext;
pub use domain::{Project, User, VersioningStrategy};
pub use error::{GitReleaseError, Result};
pub use github::GitReleaseApi;
pub use workflow::{ReleaseManager, WorkflowFailure, WorkflowOutcome};
