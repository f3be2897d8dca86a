use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use git_release_manager::analyzer::ReleaseStatsAnalyzer;
use git_release_manager::boundary::{self, BoundaryWarning};
use git_release_manager::config::{self, Config};
use git_release_manager::context::{resolve_project, ProjectOverrides, ReleaseContext};
use git_release_manager::domain::{VersionBump, VersioningStrategy};
use git_release_manager::features::{Feature, FeatureArgs, FeatureSetting, Features};
use git_release_manager::github::mock::{MOCK_CALVER_REPO, MOCK_EMPTY_REPO, MOCK_OWNER, MOCK_SEMVER_REPO};
use git_release_manager::github::{GitHubClient, GitReleaseApi, MockGitReleaseApi};
use git_release_manager::ui;
use git_release_manager::workflow::plan::{plan_create_rc, plan_patch, plan_promote};
use git_release_manager::workflow::{
    suggest_actions, AvailableAction, CreateRcOptions, PatchOptions, ReleaseManager, ReleaseState,
    WorkflowResult,
};

#[derive(Parser)]
#[command(
    name = "git-release-manager",
    version,
    about = "Cut, promote and patch GitHub releases through the REST API"
)]
struct Args {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(long, global = true, help = "Repository owner")]
    owner: Option<String>,

    #[arg(long, global = true, help = "Repository name")]
    repo: Option<String>,

    #[arg(long, global = true, help = "Versioning strategy (semver or calver)")]
    strategy: Option<VersioningStrategy>,

    #[arg(long, global = true, help = "Entity descriptor (YAML) carrying project annotations")]
    entity: Option<PathBuf>,

    #[arg(long, global = true, value_enum, help = "Run against an in-memory fixture instead of GitHub")]
    mock: Option<MockFixture>,

    #[arg(short, long, global = true, help = "Skip confirmation prompts")]
    force: bool,

    #[arg(long, global = true, help = "Preview what would happen without making changes")]
    dry_run: bool,

    #[arg(short, long, global = true, help = "Enable debug logging")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the project, latest release and suggested actions
    Info,
    /// Cut a release candidate from the default branch
    CreateRc {
        #[arg(long, help = "Semver bump (major, minor or patch)")]
        bump: Option<VersionBump>,
    },
    /// Promote the latest release candidate
    Promote,
    /// Cherry-pick a commit onto the release branch and re-tag it
    Patch {
        #[arg(long, help = "Commit to patch in; prompts when omitted")]
        commit: Option<String>,
    },
    /// Release lines and lead times
    Stats,
    /// Accounts the token can release under
    Owners,
    /// Repositories of an owner
    Repos {
        #[arg(help = "Owner to list (defaults to the configured owner)")]
        owner: Option<String>,
    },
    /// Run the configured custom feature
    Custom,
}

#[derive(Clone, Copy, ValueEnum)]
enum MockFixture {
    Semver,
    Calver,
    Empty,
}

impl MockFixture {
    fn build(self) -> MockGitReleaseApi {
        match self {
            MockFixture::Semver => MockGitReleaseApi::semver(),
            MockFixture::Calver => MockGitReleaseApi::calver(),
            MockFixture::Empty => MockGitReleaseApi::empty(),
        }
    }

    fn repo(self) -> &'static str {
        match self {
            MockFixture::Semver => MOCK_SEMVER_REPO,
            MockFixture::Calver => MOCK_CALVER_REPO,
            MockFixture::Empty => MOCK_EMPTY_REPO,
        }
    }

    fn strategy(self) -> VersioningStrategy {
        match self {
            MockFixture::Calver => VersioningStrategy::Calver,
            _ => VersioningStrategy::Semver,
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(args).await {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let config = config::load_config(args.config.as_deref()).context("Error loading config")?;

    let api: Arc<dyn GitReleaseApi> = match args.mock {
        Some(fixture) => Arc::new(fixture.build()),
        None => Arc::new(GitHubClient::new(&config.github)?),
    };

    match &args.command {
        Command::Owners => {
            let owners = api.get_owners().await?;
            ui::display_list("Owners:", &owners);
            return Ok(());
        }
        Command::Repos { owner } => {
            let owner = owner
                .clone()
                .or_else(|| args.owner.clone())
                .or_else(|| config.project.owner.clone())
                .context("No owner given: pass one or set [project] owner in the config")?;
            let repos = api.get_repositories(&owner).await?;
            ui::display_list(&format!("Repositories of {}:", owner), &repos);
            return Ok(());
        }
        _ => {}
    }

    let overrides = project_overrides(&args);
    let cwd = std::env::current_dir()?;
    let project = resolve_project(&overrides, &config, &cwd)?;
    let ctx = ReleaseContext::establish(api.as_ref(), project).await?;

    let features = Features::from_config(&config.features);
    let manager = ReleaseManager::new(api.clone(), ctx);
    let state = manager.fetch_state().await?;

    match &args.command {
        Command::Info => {
            ui::display_state(manager.context(), &state, &suggest_actions(&state));
        }
        Command::CreateRc { bump } => {
            if !gate(Feature::CreateRc, &features, manager.context(), &state)? {
                return Ok(());
            }
            warn_for(AvailableAction::CreateRc, &state);

            let options = CreateRcOptions {
                bump: bump.unwrap_or(config.behavior.default_bump),
                today: chrono::Local::now().date_naive(),
            };
            let info = plan_create_rc(manager.api(), manager.context(), &state, options).await?;
            let previous = state.latest_release.as_ref().map(|r| r.tag_name.as_str());
            ui::display_plan("Release candidate", previous, &info);

            if !proceed(&args, &config, &format!("Create {}?", info.tag_name))? {
                return Ok(());
            }
            let result = manager.create_rc(&state, options).await;
            let created = finish(Feature::CreateRc, &features, manager.context(), "Create RC", result);
            ui::display_success(&format!("Created release candidate {}", created.git_info.tag_name));
        }
        Command::Promote => {
            if !gate(Feature::PromoteRc, &features, manager.context(), &state)? {
                return Ok(());
            }
            warn_for(AvailableAction::PromoteRc, &state);

            let info = plan_promote(manager.context(), &state)?;
            let previous = state.latest_release.as_ref().map(|r| r.tag_name.as_str());
            ui::display_plan("Promotion", previous, &info);

            if !proceed(&args, &config, &format!("Promote to {}?", info.tag_name))? {
                return Ok(());
            }
            let result = manager.promote_rc(&state).await;
            let promoted = finish(Feature::PromoteRc, &features, manager.context(), "Promote RC", result);
            ui::display_success(&format!("Released {}", promoted.git_info.tag_name));
        }
        Command::Patch { commit } => {
            if !gate(Feature::Patch, &features, manager.context(), &state)? {
                return Ok(());
            }
            warn_for(AvailableAction::Patch, &state);

            let info = plan_patch(manager.context(), &state)?;
            let previous = state.latest_release.as_ref().map(|r| r.tag_name.as_str());
            ui::display_plan("Patch", previous, &info);

            let commit_sha = match commit {
                Some(sha) => sha.clone(),
                None => {
                    let branch = &state.repository.default_branch;
                    let recent = manager
                        .api()
                        .get_recent_commits(&manager.context().project, Some(branch.as_str()))
                        .await?;
                    ui::select_commit(&recent, branch)?
                }
            };

            if !proceed(&args, &config, &format!("Patch {} into {}?", commit_sha, info.rc_branch))? {
                return Ok(());
            }
            let result = manager.patch(&state, PatchOptions { commit_sha }).await;
            let patched = finish(Feature::Patch, &features, manager.context(), "Patch", result);
            ui::display_success(&format!("Patched release as {}", patched.git_info.tag_name));
        }
        Command::Stats => {
            let stats = ReleaseStatsAnalyzer::new(manager.api())
                .collect(&manager.context().project)
                .await?;
            ui::display_stats(&stats);
        }
        Command::Custom => match features.get(Feature::Custom) {
            FeatureSetting::Custom(factory) => {
                let output = factory(&FeatureArgs::new(manager.context(), &state))?;
                print!("{}", output);
            }
            _ => ui::display_status("No custom feature configured ([features.custom] command)"),
        },
        Command::Owners | Command::Repos { .. } => {}
    }

    Ok(())
}

fn project_overrides(args: &Args) -> ProjectOverrides {
    let mut overrides = ProjectOverrides {
        owner: args.owner.clone(),
        repo: args.repo.clone(),
        strategy: args.strategy,
        entity: args.entity.clone(),
    };

    // Fixtures bring their own project unless one is named explicitly
    if let Some(fixture) = args.mock {
        if overrides.owner.is_none() && overrides.repo.is_none() && overrides.entity.is_none() {
            overrides.owner = Some(MOCK_OWNER.to_string());
            overrides.repo = Some(fixture.repo().to_string());
            overrides.strategy = overrides.strategy.or(Some(fixture.strategy()));
        }
    }

    overrides
}

/// Decide whether the built-in workflow runs: omitted features refuse,
/// replaced features run their command instead.
fn gate(feature: Feature, features: &Features, ctx: &ReleaseContext, state: &ReleaseState) -> Result<bool> {
    match features.get(feature) {
        FeatureSetting::Shown { .. } => Ok(true),
        FeatureSetting::Omitted => Err(anyhow::anyhow!(
            "Feature '{}' is disabled by configuration",
            feature
        )),
        FeatureSetting::Custom(factory) => {
            let output = factory(&FeatureArgs::new(ctx, state))?;
            print!("{}", output);
            Ok(false)
        }
    }
}

fn warn_for(action: AvailableAction, state: &ReleaseState) {
    for warning in boundary::check_action(action, state) {
        ui::display_boundary_warning(&warning);
    }
}

/// Dry runs stop here; otherwise ask unless `--force` or `confirm = false`
fn proceed(args: &Args, config: &Config, prompt: &str) -> Result<bool> {
    if args.dry_run {
        ui::display_status("Dry run: nothing was changed");
        return Ok(false);
    }
    if args.force || !config.behavior.confirm {
        return Ok(true);
    }
    let confirmed = ui::confirm_action(prompt)?;
    if !confirmed {
        println!("Operation cancelled by user.");
    }
    Ok(confirmed)
}

/// Report a workflow outcome and run the success hook. A failed workflow
/// ends the process after listing the steps that did complete.
fn finish<T: Serialize>(
    feature: Feature,
    features: &Features,
    ctx: &ReleaseContext,
    title: &str,
    result: WorkflowResult<T>,
) -> T {
    match result {
        Ok(outcome) => {
            ui::display_steps(title, &outcome.steps);
            if let Err(e) = features.get(feature).notify_success(ctx, &outcome.result) {
                ui::display_boundary_warning(&BoundaryWarning::HookFailed {
                    feature: feature.to_string(),
                    reason: e.to_string(),
                });
            }
            outcome.result
        }
        Err(failure) => {
            ui::display_failure(&failure);
            std::process::exit(1);
        }
    }
}
