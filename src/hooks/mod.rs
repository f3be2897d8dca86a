//! Hook scripts for extensibility
//!
//! Allows users to run custom scripts for a feature:
//! - on-success: after the feature's workflow completed
//! - command: in place of the feature's built-in workflow

pub mod executor;
pub mod lifecycle;

pub use executor::HookExecutor;
pub use lifecycle::{HookContext, HookType};
