//! Per-feature settings.
//!
//! Every feature is shown by default with no success callback, except
//! `custom`, which only exists once something replaces it. Library users
//! build [`Features`] directly with closures; the CLI derives them from the
//! `[features.*]` tables, wiring scripts through the hook executor.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::config::{FeatureConfig, FeaturesConfig};
use crate::context::ReleaseContext;
use crate::domain::{Project, User};
use crate::error::Result;
use crate::github::{Release, Repository};
use crate::hooks::{HookContext, HookExecutor, HookType};
use crate::workflow::ReleaseState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    CreateRc,
    PromoteRc,
    Patch,
    Custom,
}

impl Feature {
    pub const ALL: [Feature; 4] = [
        Feature::CreateRc,
        Feature::PromoteRc,
        Feature::Patch,
        Feature::Custom,
    ];

    /// Key of the feature's `[features.<name>]` table
    pub fn name(&self) -> &'static str {
        match self {
            Feature::CreateRc => "create_rc",
            Feature::PromoteRc => "promote_rc",
            Feature::Patch => "patch",
            Feature::Custom => "custom",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a replacement feature gets to work with
#[derive(Debug, Clone, Serialize)]
pub struct FeatureArgs<'a> {
    pub project: &'a Project,
    pub user: &'a User,
    pub latest_release: Option<&'a Release>,
    pub repository: &'a Repository,
}

impl<'a> FeatureArgs<'a> {
    pub fn new(ctx: &'a ReleaseContext, state: &'a ReleaseState) -> Self {
        FeatureArgs {
            project: &ctx.project,
            user: &ctx.user,
            latest_release: state.latest_release.as_ref(),
            repository: &state.repository,
        }
    }
}

/// Receives the JSON payload of a completed workflow
pub type SuccessCallback = Arc<dyn Fn(&ReleaseContext, &serde_json::Value) -> Result<()> + Send + Sync>;

/// Runs in place of a built-in feature; returns text to show the user
pub type CustomFactory = Arc<dyn Fn(&FeatureArgs<'_>) -> Result<String> + Send + Sync>;

#[derive(Clone)]
pub enum FeatureSetting {
    Shown { on_success: Option<SuccessCallback> },
    Omitted,
    Custom(CustomFactory),
}

impl FeatureSetting {
    pub fn shown() -> Self {
        FeatureSetting::Shown { on_success: None }
    }

    pub fn is_omitted(&self) -> bool {
        matches!(self, FeatureSetting::Omitted)
    }

    /// Hand a completed workflow's result to the success callback, if any.
    ///
    /// Callback errors are returned for the caller to report; the workflow
    /// itself has already succeeded.
    pub fn notify_success<T: Serialize>(&self, ctx: &ReleaseContext, result: &T) -> Result<()> {
        if let FeatureSetting::Shown {
            on_success: Some(callback),
        } = self
        {
            let payload = serde_json::to_value(result)?;
            callback(ctx, &payload)?;
        }
        Ok(())
    }
}

impl fmt::Debug for FeatureSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureSetting::Shown { on_success } => f
                .debug_struct("Shown")
                .field("on_success", &on_success.is_some())
                .finish(),
            FeatureSetting::Omitted => write!(f, "Omitted"),
            FeatureSetting::Custom(_) => write!(f, "Custom"),
        }
    }
}

/// Settings of all four features
#[derive(Debug, Clone)]
pub struct Features {
    pub create_rc: FeatureSetting,
    pub promote_rc: FeatureSetting,
    pub patch: FeatureSetting,
    pub custom: FeatureSetting,
}

impl Default for Features {
    fn default() -> Self {
        Features {
            create_rc: FeatureSetting::shown(),
            promote_rc: FeatureSetting::shown(),
            patch: FeatureSetting::shown(),
            custom: FeatureSetting::Omitted,
        }
    }
}

impl Features {
    pub fn get(&self, feature: Feature) -> &FeatureSetting {
        match feature {
            Feature::CreateRc => &self.create_rc,
            Feature::PromoteRc => &self.promote_rc,
            Feature::Patch => &self.patch,
            Feature::Custom => &self.custom,
        }
    }

    fn slot(&mut self, feature: Feature) -> &mut FeatureSetting {
        match feature {
            Feature::CreateRc => &mut self.create_rc,
            Feature::PromoteRc => &mut self.promote_rc,
            Feature::Patch => &mut self.patch,
            Feature::Custom => &mut self.custom,
        }
    }

    /// Derive settings from `[features.*]` tables.
    ///
    /// `omit` wins over `command`, which wins over `on_success`. Unknown
    /// table names are ignored with a warning.
    pub fn from_config(config: &FeaturesConfig) -> Self {
        let mut features = Features::default();

        for name in config.entries.keys() {
            if !Feature::ALL.iter().any(|f| f.name() == name) {
                tracing::warn!(feature = %name, "Ignoring unknown feature table");
            }
        }

        for feature in Feature::ALL {
            if let Some(entry) = config.get(feature.name()) {
                *features.slot(feature) = setting_from_config(feature, entry);
            }
        }

        features
    }
}

fn setting_from_config(feature: Feature, entry: &FeatureConfig) -> FeatureSetting {
    if entry.omit {
        return FeatureSetting::Omitted;
    }

    if let Some(command) = entry.command.clone() {
        let factory: CustomFactory = Arc::new(move |args: &FeatureArgs<'_>| -> Result<String> {
            let payload = serde_json::to_value(args)?;
            let context = HookContext::new(HookType::Command, feature.name(), args.project, args.user, payload);
            HookExecutor::execute(&command, &context)
        });
        return FeatureSetting::Custom(factory);
    }

    let on_success = entry.on_success.clone().map(|script| {
        let callback: SuccessCallback = Arc::new(move |ctx: &ReleaseContext, payload: &serde_json::Value| -> Result<()> {
            let context = HookContext::new(
                HookType::OnSuccess,
                feature.name(),
                &ctx.project,
                &ctx.user,
                payload.clone(),
            );
            HookExecutor::execute(&script, &context).map(|_| ())
        });
        callback
    });

    FeatureSetting::Shown { on_success }
}
