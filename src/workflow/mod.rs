//! Release workflows
//!
//! Each workflow is an ordered pipeline of named steps run against a
//! [`GitReleaseApi`]. The first failing step halts the pipeline; steps that
//! already completed are reported back in the [`WorkflowFailure`] and are
//! never rolled back.
//!
//! - [create_rc]: cut a release candidate from the default branch
//! - [promote]: turn the latest candidate into a final release
//! - [patch]: cherry-pick a commit onto the release branch and re-tag it
//! - [plan]: compute what a workflow would create, without mutating anything

pub mod create_rc;
pub mod patch;
pub mod plan;
pub mod promote;

pub use create_rc::{CreateRcOptions, CreateRcResult};
pub use patch::{PatchOptions, PatchResult};
pub use promote::PromoteResult;

use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::context::ReleaseContext;
use crate::domain::{TagParts, TagPrefix};
use crate::error::{GitReleaseError, Result};
use crate::github::{GitReleaseApi, Release, Repository};

/// A workflow step that finished successfully
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletedStep {
    pub step: String,
    pub message: String,
    pub link: Option<String>,
}

/// A workflow that halted on a failing step
#[derive(Debug, thiserror::Error)]
#[error("{step} failed: {error}")]
pub struct WorkflowFailure {
    /// Name of the step that failed
    pub step: String,
    /// Steps that completed before the failure, in order
    pub completed: Vec<CompletedStep>,
    #[source]
    pub error: GitReleaseError,
}

/// A workflow that ran every step
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowOutcome<T> {
    pub steps: Vec<CompletedStep>,
    pub result: T,
}

pub type WorkflowResult<T> = std::result::Result<WorkflowOutcome<T>, WorkflowFailure>;

/// Ledger of the steps a running workflow has completed
pub(crate) struct Pipeline {
    workflow: &'static str,
    completed: Vec<CompletedStep>,
}

impl Pipeline {
    pub(crate) fn new(workflow: &'static str) -> Self {
        Pipeline {
            workflow,
            completed: Vec::new(),
        }
    }

    /// Turn a step error into a [`WorkflowFailure`] carrying the ledger
    pub(crate) fn check<T>(&self, step: &str, result: Result<T>) -> std::result::Result<T, WorkflowFailure> {
        result.map_err(|error| self.fail(step, error))
    }

    pub(crate) fn fail(&self, step: &str, error: GitReleaseError) -> WorkflowFailure {
        tracing::warn!(workflow = self.workflow, step, %error, "Step failed");
        WorkflowFailure {
            step: step.to_string(),
            completed: self.completed.clone(),
            error,
        }
    }

    pub(crate) fn complete(&mut self, step: &str, message: impl Into<String>, link: Option<String>) {
        let message = message.into();
        tracing::info!(workflow = self.workflow, step, %message, "Step completed");
        self.completed.push(CompletedStep {
            step: step.to_string(),
            message,
            link,
        });
    }

    pub(crate) fn finish<T>(self, result: T) -> WorkflowResult<T> {
        tracing::info!(workflow = self.workflow, steps = self.completed.len(), "Workflow finished");
        Ok(WorkflowOutcome {
            steps: self.completed,
            result,
        })
    }
}

/// Repository and latest release as fetched at the start of an action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseState {
    pub repository: Repository,
    pub latest_release: Option<Release>,
}

/// Workflows that make sense for a given [`ReleaseState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AvailableAction {
    CreateRc,
    PromoteRc,
    Patch,
}

impl fmt::Display for AvailableAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AvailableAction::CreateRc => write!(f, "create-rc"),
            AvailableAction::PromoteRc => write!(f, "promote"),
            AvailableAction::Patch => write!(f, "patch"),
        }
    }
}

/// Fetch the repository and its latest release
pub async fn fetch_release_state(api: &dyn GitReleaseApi, ctx: &ReleaseContext) -> Result<ReleaseState> {
    let repository = api.get_repository(&ctx.project).await?;
    let latest_release = api.get_latest_release(&ctx.project).await?;
    Ok(ReleaseState {
        repository,
        latest_release,
    })
}

/// Decide which workflows apply.
///
/// - No release yet: only a candidate can be cut
/// - Latest is a prerelease: promote it or patch it
/// - Latest is final: cut the next candidate or patch the release
pub fn suggest_actions(state: &ReleaseState) -> Vec<AvailableAction> {
    match &state.latest_release {
        None => vec![AvailableAction::CreateRc],
        Some(release) if release.prerelease => {
            vec![AvailableAction::PromoteRc, AvailableAction::Patch]
        }
        Some(_) => vec![AvailableAction::CreateRc, AvailableAction::Patch],
    }
}

/// Latest release, or a validation error naming the workflow that needs one
pub(crate) fn require_latest<'a>(state: &'a ReleaseState, workflow: &str) -> Result<&'a Release> {
    state.latest_release.as_ref().ok_or_else(|| {
        GitReleaseError::validation(format!("{} requires an existing release", workflow))
    })
}

/// Latest release, which must be a prerelease tagged `rc-*`
pub(crate) fn require_candidate<'a>(ctx: &ReleaseContext, state: &'a ReleaseState) -> Result<&'a Release> {
    let release = require_latest(state, "Promote")?;
    if !release.prerelease {
        return Err(GitReleaseError::validation(format!(
            "Latest release '{}' is not a prerelease",
            release.tag_name
        )));
    }
    let parts = TagParts::parse(&release.tag_name, ctx.project.versioning_strategy)?;
    if parts.prefix != TagPrefix::Rc {
        return Err(GitReleaseError::validation(format!(
            "Latest release '{}' is not a release candidate",
            release.tag_name
        )));
    }
    Ok(release)
}

/// Fail a workflow before its first step
pub(crate) fn rejected<T>(step: &str, error: GitReleaseError) -> WorkflowResult<T> {
    Err(WorkflowFailure {
        step: step.to_string(),
        completed: Vec::new(),
        error,
    })
}

/// Resets the busy flag when a workflow ends, whatever the outcome
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Runs workflows for one context, one at a time.
///
/// Starting a workflow while another is still running fails with
/// [`GitReleaseError::Busy`] instead of interleaving ref mutations.
pub struct ReleaseManager {
    api: Arc<dyn GitReleaseApi>,
    context: ReleaseContext,
    busy: AtomicBool,
}

impl ReleaseManager {
    pub fn new(api: Arc<dyn GitReleaseApi>, context: ReleaseContext) -> Self {
        ReleaseManager {
            api,
            context,
            busy: AtomicBool::new(false),
        }
    }

    pub fn context(&self) -> &ReleaseContext {
        &self.context
    }

    pub fn api(&self) -> &dyn GitReleaseApi {
        self.api.as_ref()
    }

    /// True while a workflow is running
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    fn acquire(&self, workflow: &str) -> Result<BusyGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| {
                GitReleaseError::Busy(format!("cannot start {} while another workflow runs", workflow))
            })?;
        Ok(BusyGuard(&self.busy))
    }

    pub async fn fetch_state(&self) -> Result<ReleaseState> {
        fetch_release_state(self.api(), &self.context).await
    }

    pub async fn create_rc(&self, state: &ReleaseState, options: CreateRcOptions) -> WorkflowResult<CreateRcResult> {
        let _guard = match self.acquire("create-rc") {
            Ok(guard) => guard,
            Err(e) => return rejected(create_rc::STEP_START, e),
        };
        create_rc::create_rc(self.api(), &self.context, state, options).await
    }

    pub async fn promote_rc(&self, state: &ReleaseState) -> WorkflowResult<PromoteResult> {
        let _guard = match self.acquire("promote") {
            Ok(guard) => guard,
            Err(e) => return rejected(promote::STEP_START, e),
        };
        promote::promote_rc(self.api(), &self.context, state).await
    }

    pub async fn patch(&self, state: &ReleaseState, options: PatchOptions) -> WorkflowResult<PatchResult> {
        let _guard = match self.acquire("patch") {
            Ok(guard) => guard,
            Err(e) => return rejected(patch::STEP_START, e),
        };
        patch::patch(self.api(), &self.context, state, options).await
    }
}
