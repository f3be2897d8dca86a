//! User interface module - interaction (prompts) and formatting.
//!
//! Separates concerns:
//! - `formatter` - Pure formatting functions
//! - This module - Interactive prompts and user input handling

use std::io::{self, Write};

use anyhow::Result;

use crate::github::RecentCommit;

pub mod formatter;

// Re-export formatter functions for convenience
pub use formatter::{
    display_boundary_warning, display_error, display_failure, display_list, display_plan,
    display_recent_commits, display_state, display_stats, display_status, display_steps,
    display_success,
};

/// Resolve a commit selection against a numbered list.
///
/// Accepts a 1-based index into `commits`, or anything that looks like a sha
/// (at least 7 hex characters), which is returned as typed.
pub fn parse_commit_selection(selection: &str, commits: &[RecentCommit]) -> Result<String> {
    let selection = selection.trim();

    if let Ok(index) = selection.parse::<usize>() {
        if index > 0 && index <= commits.len().min(10) {
            return Ok(commits[index - 1].sha.clone());
        }
    }

    if selection.len() >= 7 && selection.chars().all(|c| c.is_ascii_hexdigit()) {
        return Ok(selection.to_string());
    }

    Err(anyhow::anyhow!("Invalid commit selection '{}'", selection))
}

/// Prompts user to pick the commit to patch into the release.
///
/// Displays a numbered list of recent commits and accepts an index or a
/// full/abbreviated sha.
///
/// # Returns
/// * `Ok(String)` - The selected commit sha
/// * `Err` - If selection is invalid or nothing was entered
pub fn select_commit(commits: &[RecentCommit], branch_name: &str) -> Result<String> {
    if commits.is_empty() {
        print!("\nCommit sha to patch: ");
    } else {
        formatter::display_recent_commits(commits, branch_name);
        print!(
            "\nSelect a commit (1-{}) or enter a sha: ",
            commits.len().min(10)
        );
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    parse_commit_selection(&input, commits)
}

/// Prompts user to confirm an action with a yes/no prompt.
///
/// Displays the given prompt and accepts "y" or "yes" (case-insensitive) as confirmation.
/// Default is "no" if user presses Enter.
///
/// # Returns
/// * `Ok(true)` - If user entered "y" or "yes"
/// * `Ok(false)` - Otherwise (including Enter, or "n"/"no")
/// * `Err` - If input error occurs
pub fn confirm_action(prompt: &str) -> Result<bool> {
    print!("\n{} (y/N): ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let response = input.trim().to_lowercase();
    Ok(response == "y" || response == "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commits() -> Vec<RecentCommit> {
        ["aaaaaaa1", "bbbbbbb2"]
            .iter()
            .map(|sha| RecentCommit {
                sha: sha.to_string(),
                html_url: String::new(),
                message: "fix: thing".to_string(),
                author_login: None,
                author_html_url: None,
                first_parent_sha: None,
            })
            .collect()
    }

    #[test]
    fn test_selection_by_index() {
        assert_eq!(parse_commit_selection("2\n", &commits()).unwrap(), "bbbbbbb2");
    }

    #[test]
    fn test_selection_by_sha() {
        assert_eq!(
            parse_commit_selection("deadbeef", &commits()).unwrap(),
            "deadbeef"
        );
    }

    #[test]
    fn test_selection_invalid() {
        assert!(parse_commit_selection("", &commits()).is_err());
        assert!(parse_commit_selection("3", &commits()).is_err());
        assert!(parse_commit_selection("not-a-sha", &commits()).is_err());
    }
}
