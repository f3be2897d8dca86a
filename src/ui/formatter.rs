//! Pure formatting functions for UI output.
//!
//! This module contains all display/formatting logic separated from user interaction.
//! Functions here are pure (no I/O side effects beyond printing) and testable.

use chrono::Duration;
use console::style;

use crate::analyzer::ReleaseStats;
use crate::boundary::BoundaryWarning;
use crate::context::ReleaseContext;
use crate::github::RecentCommit;
use crate::version::GitInfo;
use crate::workflow::{AvailableAction, CompletedStep, ReleaseState, WorkflowFailure};

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// Shorten a commit message to its first line and at most `max` characters
pub fn truncate_message(message: &str, max: usize) -> String {
    let first_line = message.lines().next().unwrap_or_default();
    if first_line.chars().count() > max {
        let cut: String = first_line.chars().take(max).collect();
        format!("{}…", cut)
    } else {
        first_line.to_string()
    }
}

/// Render a duration as `3d 4h`, `5h 12m` or `42m`
pub fn format_duration(duration: Duration) -> String {
    let minutes = duration.num_minutes();
    if minutes < 0 {
        return format!("-{}", format_duration(-duration));
    }
    let (days, hours, mins) = (minutes / (24 * 60), (minutes / 60) % 24, minutes % 60);
    if days > 0 {
        format!("{}d {}h", days, hours)
    } else if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else {
        format!("{}m", mins)
    }
}

fn display_step(step: &CompletedStep) {
    match &step.link {
        Some(link) => println!(
            "  {} {}: {} {}",
            style("✓").green(),
            style(&step.step).bold(),
            step.message,
            style(link).dim()
        ),
        None => println!(
            "  {} {}: {}",
            style("✓").green(),
            style(&step.step).bold(),
            step.message
        ),
    }
}

/// Display the completed steps of a workflow
pub fn display_steps(title: &str, steps: &[CompletedStep]) {
    println!("\n{}", style(title).bold());
    for step in steps {
        display_step(step);
    }
}

/// Display a halted workflow: what completed, then what failed.
///
/// Completed steps are not undone, so they are listed for manual cleanup.
pub fn display_failure(failure: &WorkflowFailure) {
    if !failure.completed.is_empty() {
        display_steps("Completed before failure:", &failure.completed);
    }
    eprintln!(
        "  {} {}: {}",
        style("✗").red(),
        style(&failure.step).bold(),
        failure.error
    );
}

/// Display what a workflow is about to create.
///
/// Shows either:
/// - If moving on from a release: "From: old_tag -> To: new_tag"
/// - If first: "Initial Tag: new_tag"
pub fn display_plan(title: &str, old_tag: Option<&str>, info: &GitInfo) {
    println!("\n{}", style(title).bold());
    match old_tag {
        Some(old) => {
            println!("  From:    {}", style(old).red());
            println!("  To:      {}", style(&info.tag_name).green());
        }
        None => println!("  Initial: {}", style(&info.tag_name).green()),
    }
    println!("  Branch:  {}", info.rc_branch);
    println!("  Release: {}", info.release_name);
}

/// Display project, user, latest release and suggested actions
pub fn display_state(ctx: &ReleaseContext, state: &ReleaseState, actions: &[AvailableAction]) {
    println!(
        "{} {} ({}, {})",
        style("Project:").bold(),
        ctx.project.slug(),
        ctx.project.versioning_strategy,
        style(format!("{:?}", ctx.project.source)).dim()
    );
    println!("{} {}", style("User:").bold(), ctx.user.username);
    println!(
        "{} {}",
        style("Default branch:").bold(),
        state.repository.default_branch
    );

    match &state.latest_release {
        Some(release) => {
            let kind = if release.prerelease {
                style("prerelease").yellow()
            } else {
                style("release").green()
            };
            println!(
                "{} {} [{}] on {}",
                style("Latest release:").bold(),
                release.tag_name,
                kind,
                release.target_commitish
            );
            println!("  {}", style(&release.html_url).dim());
        }
        None => println!("{} none", style("Latest release:").bold()),
    }

    let names: Vec<String> = actions.iter().map(|a| a.to_string()).collect();
    println!("{} {}", style("Suggested:").bold(), names.join(", "));
}

/// Display recent commits, numbered for selection.
///
/// Shows up to 10 commits; if more exist, displays the count of the rest.
pub fn display_recent_commits(commits: &[RecentCommit], branch_name: &str) {
    println!("\n{}", style(format!("Recent commits on '{}'", branch_name)).bold());

    for (i, commit) in commits.iter().take(10).enumerate() {
        println!(
            "  {}. {} {} {}",
            i + 1,
            style(commit.sha.get(..7).unwrap_or(&commit.sha)).cyan(),
            truncate_message(&commit.message, 60),
            style(commit.author_login.as_deref().unwrap_or("unknown")).dim()
        );
    }

    if commits.len() > 10 {
        println!("  ... and {} more commits", commits.len() - 10);
    }
}

/// Display a simple list (owners, repositories)
pub fn display_list(title: &str, items: &[String]) {
    println!("{}", style(title).bold());
    for item in items {
        println!("  - {}", item);
    }
}

/// Display release history grouped by base version
pub fn display_stats(stats: &ReleaseStats) {
    println!(
        "{} {} release(s) in {} release line(s)",
        style("Releases:").bold(),
        stats.release_count(),
        stats.groups.len()
    );
    if let Some(average) = stats.average_lead_time() {
        println!("{} {}", style("Average lead time:").bold(), format_duration(average));
    }

    for group in &stats.groups {
        println!("\n{}", style(&group.base_version).bold());
        let candidates: Vec<&str> = group.candidate_tags.iter().map(|t| t.tag_name.as_str()).collect();
        let versions: Vec<&str> = group.version_tags.iter().map(|t| t.tag_name.as_str()).collect();
        println!("  Candidates: {}", candidates.join(", "));
        println!("  Versions:   {}", versions.join(", "));
        if let Some(lead) = &group.lead_time {
            println!(
                "  Lead time:  {} ({} → {})",
                format_duration(lead.duration),
                lead.candidate_tag,
                lead.release_tag
            );
        }
    }

    for release in &stats.unmatched_releases {
        display_boundary_warning(&BoundaryWarning::UnparsableTag {
            tag: release.tag_name.clone(),
            reason: "not part of any release line".to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_message() {
        assert_eq!(truncate_message("fix: short\n\nbody", 60), "fix: short");
        assert_eq!(truncate_message("abcdef", 3), "abc…");
        assert_eq!(truncate_message("", 3), "");
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate_message("ééééé", 2), "éé…");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::minutes(42)), "42m");
        assert_eq!(format_duration(Duration::minutes(5 * 60 + 12)), "5h 12m");
        assert_eq!(format_duration(Duration::hours(76)), "3d 4h");
        assert_eq!(format_duration(Duration::minutes(-5)), "-5m");
    }

    #[test]
    fn test_display_error() {
        // Visual verification test - output is printed to stderr
        display_error("test error");
    }
}
