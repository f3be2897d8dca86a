use crate::error::{GitReleaseError, Result};
use crate::hooks::HookContext;
use std::path::Path;
use std::process::Command;

/// Executes configured hook scripts
pub struct HookExecutor;

impl HookExecutor {
    /// Execute a hook script with the given context
    ///
    /// The script is executed with environment variables set from the context.
    /// If the script exits with code 0, the hook succeeds. Any non-zero exit code
    /// is treated as a failure.
    ///
    /// # Returns
    /// * `Ok(stdout)` if hook succeeds (exit code 0)
    /// * `Err` if script not found, not executable, or returns non-zero exit code
    pub fn execute(script_path: &str, context: &HookContext) -> Result<String> {
        let path = Path::new(script_path);

        if !path.exists() {
            return Err(GitReleaseError::hook(format!(
                "Hook script not found: {}",
                script_path
            )));
        }

        if !path.is_file() {
            return Err(GitReleaseError::hook(format!(
                "Hook path is not a file: {}",
                script_path
            )));
        }

        tracing::debug!(
            hook = context.hook_type.name(),
            feature = %context.feature,
            script = script_path,
            "Running hook"
        );

        let output = Command::new(script_path)
            .envs(context.to_env_vars())
            .output()
            .map_err(|e| {
                GitReleaseError::hook(format!("Failed to execute hook {}: {}", script_path, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            return Err(GitReleaseError::hook(format!(
                "Hook {} failed with exit code {}\nStdout: {}\nStderr: {}",
                script_path,
                output.status.code().unwrap_or(-1),
                stdout,
                stderr
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Project, ProjectSource, User, VersioningStrategy};
    use crate::hooks::HookType;

    fn ctx() -> HookContext {
        HookContext::new(
            HookType::OnSuccess,
            "patch",
            &Project::new("acme", "widgets", VersioningStrategy::Semver, ProjectSource::Cli),
            &User {
                username: "octocat".to_string(),
                email: None,
            },
            serde_json::json!({}),
        )
    }

    #[test]
    fn test_nonexistent_hook_fails() {
        let result = HookExecutor::execute("/nonexistent/path/to/hook.sh", &ctx());
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Hook script not found"));
    }

    #[test]
    fn test_hook_directory_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = HookExecutor::execute(dir.path().to_str().unwrap(), &ctx());
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not a file"));
    }

    #[cfg(unix)]
    #[test]
    fn test_hook_receives_environment() {
        use std::io::Write;
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::TempDir::new().unwrap();
        let script = dir.path().join("hook.sh");
        let mut file = std::fs::File::create(&script).unwrap();
        writeln!(file, "#!/bin/sh\necho \"$GRM_FEATURE $GRM_OWNER/$GRM_REPO\"").unwrap();
        drop(file);
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let stdout = HookExecutor::execute(script.to_str().unwrap(), &ctx()).unwrap();
        assert_eq!(stdout.trim(), "patch acme/widgets");
    }
}
