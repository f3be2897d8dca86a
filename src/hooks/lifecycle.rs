use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::{Project, User};

/// Points at which a configured script runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HookType {
    /// After a feature's workflow completed every step
    OnSuccess,
    /// In place of a feature's built-in workflow
    Command,
}

impl HookType {
    /// Get the hook name as a string
    pub fn name(&self) -> &'static str {
        match self {
            HookType::OnSuccess => "on-success",
            HookType::Command => "command",
        }
    }
}

/// Context information passed to a hook
#[derive(Debug, Clone)]
pub struct HookContext {
    /// Type of hook being executed
    pub hook_type: HookType,
    /// Feature the hook belongs to (`create_rc`, `promote_rc`, `patch`, `custom`)
    pub feature: String,
    pub owner: String,
    pub repo: String,
    pub versioning_strategy: String,
    pub username: String,
    /// Tag the workflow created or moved, if any
    pub tag: Option<String>,
    /// JSON document describing the workflow result or the feature arguments
    pub payload: serde_json::Value,
}

impl HookContext {
    pub fn new(
        hook_type: HookType,
        feature: &str,
        project: &Project,
        user: &User,
        payload: serde_json::Value,
    ) -> Self {
        let tag = payload
            .pointer("/git_info/tag_name")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        HookContext {
            hook_type,
            feature: feature.to_string(),
            owner: project.owner.clone(),
            repo: project.repo.clone(),
            versioning_strategy: project.versioning_strategy.to_string(),
            username: user.username.clone(),
            tag,
            payload,
        }
    }

    /// Convert context to environment variables for the hook script
    ///
    /// Maps context fields to GRM_* environment variables
    pub fn to_env_vars(&self) -> HashMap<String, String> {
        let mut env = HashMap::new();

        env.insert("GRM_HOOK".to_string(), self.hook_type.name().to_string());
        env.insert("GRM_FEATURE".to_string(), self.feature.clone());
        env.insert("GRM_OWNER".to_string(), self.owner.clone());
        env.insert("GRM_REPO".to_string(), self.repo.clone());
        env.insert(
            "GRM_VERSIONING_STRATEGY".to_string(),
            self.versioning_strategy.clone(),
        );
        env.insert("GRM_USER".to_string(), self.username.clone());
        env.insert("GRM_PAYLOAD".to_string(), self.payload.to_string());

        if let Some(ref tag) = self.tag {
            env.insert("GRM_TAG_NAME".to_string(), tag.clone());
        }

        env
    }
}
