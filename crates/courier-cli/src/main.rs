//! Courier CLI - drive the desktop bootstrap flow from a terminal

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use courier_core::api::export::{
    DirectoryPicker, ExportFlowOutcome, Notice, NoticeKind, Notifier, export_all_data_flow,
    import_all_data,
};
use courier_core::api::{AppContext, organizations, projects};
use courier_core::config::Config;
use courier_core::session::SessionData;
use courier_core::storage::ExportScope;
use courier_core::sync::{ConflictInbox, ConflictPolicy};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tokio::task::JoinHandle;
use tracing::warn;

#[derive(Parser)]
#[command(name = "courier")]
#[command(author, version, about = "Desktop API client backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// How merge conflicts raised during this run are answered
    #[arg(long, global = true, default_value = "ours")]
    conflicts: ConflictArg,
}

#[derive(Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum ConflictArg {
    Ours,
    Theirs,
}

impl From<ConflictArg> for ConflictPolicy {
    fn from(arg: ConflictArg) -> Self {
        match arg {
            ConflictArg::Ours => ConflictPolicy::Ours,
            ConflictArg::Theirs => ConflictPolicy::Theirs,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Store a session for subsequent commands
    Login {
        #[arg(long)]
        session_id: String,
        #[arg(long)]
        account_id: String,
        #[arg(long)]
        email: Option<String>,
    },

    /// End the current session
    Logout,

    /// Run the start-up sequence and print the landing route
    Start,

    /// Organizations of the current account
    Orgs {
        #[command(subcommand)]
        action: OrgAction,
    },

    /// Local projects
    Projects {
        #[command(subcommand)]
        action: ProjectAction,
    },

    /// Export local data as JSONL
    Export {
        /// Destination directory (prompted for when omitted)
        dir: Option<PathBuf>,
        /// Export a single project and its workspaces
        #[arg(short, long)]
        project: Option<String>,
    },

    /// Import a directory written by `export`
    Import { dir: PathBuf },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum OrgAction {
    /// List cached organizations (fetching them first)
    List,
    /// Refresh organizations, profile and plan
    Sync,
    /// Show feature flags for an organization
    Features { id: String },
}

#[derive(Subcommand)]
enum ProjectAction {
    /// Projects outside the scratch organization, with workspace counts
    Untracked,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// List all configuration values
    List,
    /// Reset configuration to defaults
    Reset,
    /// Show configuration file path
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("courier=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Commands::Config { action } = cli.command {
        return cmd_config(action, cli.quiet);
    }

    let config = Config::load()?;
    let (ctx, inbox) = AppContext::open(&config)
        .await
        .map_err(describe)
        .context("Failed to open local data")?;
    let responder = spawn_conflict_responder(inbox, cli.conflicts.into());

    let result = match cli.command {
        Commands::Login {
            session_id,
            account_id,
            email,
        } => cmd_login(&ctx, session_id, account_id, email, cli.quiet),
        Commands::Logout => cmd_logout(&ctx, cli.quiet).await,
        Commands::Start => cmd_start(&ctx, cli.format, cli.quiet).await,
        Commands::Orgs { action } => cmd_orgs(&ctx, action, cli.format, cli.quiet).await,
        Commands::Projects { action } => cmd_projects(&ctx, action, cli.format, cli.quiet).await,
        Commands::Export { dir, project } => {
            cmd_export(&ctx, dir, project, cli.format, cli.quiet).await
        }
        Commands::Import { dir } => cmd_import(&ctx, &dir, cli.format, cli.quiet).await,
        Commands::Config { .. } => Ok(()),
    };

    ctx.shutdown();
    responder.abort();
    result
}

/// Answer every conflict prompt with a fixed policy
fn spawn_conflict_responder(mut inbox: ConflictInbox, policy: ConflictPolicy) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(request) = inbox.next().await {
            warn!(
                count = request.conflicts.len(),
                policy = ?policy,
                "Resolving merge conflicts automatically"
            );
            let resolved = policy.apply(request.conflicts.clone());
            request.respond(resolved);
        }
    })
}

/// Attach the error code and hint to a core error
fn describe(e: courier_core::Error) -> anyhow::Error {
    match e.suggestion() {
        Some(hint) => anyhow!("[{}] {}\n  hint: {}", e.code(), e, hint),
        None => anyhow!("[{}] {}", e.code(), e),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ============================================================================
// Command Implementations
// ============================================================================

fn cmd_login(
    ctx: &AppContext,
    session_id: String,
    account_id: String,
    email: Option<String>,
    quiet: bool,
) -> anyhow::Result<()> {
    let mut session = SessionData::new(session_id, account_id);
    if let Some(email) = email {
        session = session.with_email(email);
    }
    ctx.login(session).map_err(describe)?;
    if !quiet {
        println!("Logged in.");
    }
    Ok(())
}

async fn cmd_logout(ctx: &AppContext, quiet: bool) -> anyhow::Result<()> {
    ctx.logout().await.map_err(describe)?;
    if !quiet {
        println!("Logged out.");
    }
    Ok(())
}

async fn cmd_start(ctx: &AppContext, format: OutputFormat, quiet: bool) -> anyhow::Result<()> {
    let outcome = organizations::index_loader(ctx).await.map_err(describe)?;

    if format == OutputFormat::Json {
        return print_json(&outcome);
    }
    println!("{}", outcome.landing.route());
    if quiet {
        return Ok(());
    }
    if let Some(report) = &outcome.promotion {
        println!(
            "Promoted {} of {} migrated projects to remote.",
            report.promoted.len(),
            report.attempted()
        );
        for failure in &report.failed {
            println!("  ! {} ({}): {}", failure.name, failure.project_id, failure.error);
        }
    }
    Ok(())
}

async fn cmd_orgs(
    ctx: &AppContext,
    action: OrgAction,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    match action {
        OrgAction::List => {
            if !ctx.is_logged_in() {
                return Err(describe(courier_core::Error::NotAuthenticated));
            }
            organizations::sync_organizations_action(ctx).await;
            let data = organizations::organizations_loader(ctx).await;
            if format == OutputFormat::Json {
                return print_json(data.as_ref());
            }
            if data.organizations.is_empty() {
                println!("No organizations.");
                return Ok(());
            }
            for org in &data.organizations {
                let kind = if org.is_personal() { " (personal)" } else { "" };
                println!("{:<24} {}{}", org.id, org.display_name, kind);
            }
            if let (false, Some(plan)) = (quiet, &data.current_plan) {
                println!();
                println!("Plan: {}", plan.plan_type.display_name());
            }
        }
        OrgAction::Sync => {
            organizations::sync_organizations_action(ctx).await;
            if !quiet {
                let data = organizations::organizations_loader(ctx).await;
                println!("Synced {} organizations.", data.organizations.len());
            }
        }
        OrgAction::Features { id } => {
            let loaded = organizations::single_organization_loader(ctx, &id).await;
            if format == OutputFormat::Json {
                return print_json(&loaded);
            }
            for (name, status) in [
                ("gitSync", &loaded.features.git_sync),
                ("orgBasicRbac", &loaded.features.org_basic_rbac),
            ] {
                let state = if status.enabled { "enabled" } else { "disabled" };
                match &status.reason {
                    Some(reason) => println!("{:<14} {} ({})", name, state, reason),
                    None => println!("{:<14} {}", name, state),
                }
            }
        }
    }
    Ok(())
}

async fn cmd_projects(
    ctx: &AppContext,
    action: ProjectAction,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    match action {
        ProjectAction::Untracked => {
            let loaded = projects::untracked_projects_loader(ctx).await.map_err(describe)?;
            if format == OutputFormat::Json {
                return print_json(&loaded);
            }
            if loaded.untracked_projects.is_empty() {
                if !quiet {
                    println!("No untracked projects.");
                }
                return Ok(());
            }
            for entry in &loaded.untracked_projects {
                println!(
                    "{:<40} {:<24} {} workspaces",
                    entry.project.id, entry.project.name, entry.workspaces_count
                );
            }
        }
    }
    Ok(())
}

/// Uses the directory given on the command line, or asks on stdin
struct TerminalPicker {
    preset: Option<PathBuf>,
}

#[async_trait]
impl DirectoryPicker for TerminalPicker {
    async fn pick_directory(&self, title: &str) -> Option<PathBuf> {
        if let Some(dir) = &self.preset {
            return Some(dir.clone());
        }
        let prompt = format!("{title} - directory (empty to cancel): ");
        match tokio::task::spawn_blocking(move || read_directory(&prompt)).await {
            Ok(dir) => dir,
            Err(e) => {
                warn!(error = %e, "Directory prompt failed");
                None
            }
        }
    }
}

/// Blocking stdin prompt; empty input or a read error cancels
fn read_directory(prompt: &str) -> Option<PathBuf> {
    eprint!("{prompt}");
    std::io::stderr().flush().ok()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line).ok()?;
    let trimmed = line.trim();
    (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
}

struct TerminalNotifier {
    quiet: bool,
}

#[async_trait]
impl Notifier for TerminalNotifier {
    async fn notify(&self, notice: Notice) {
        match notice.kind {
            NoticeKind::Success if !self.quiet => println!("{}: {}", notice.title, notice.message),
            NoticeKind::Success => {}
            NoticeKind::Failure => eprintln!("{}: {}", notice.title, notice.message),
        }
    }
}

async fn cmd_export(
    ctx: &AppContext,
    dir: Option<PathBuf>,
    project: Option<String>,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    let scope = match project {
        Some(id) => ExportScope::Project(id),
        None => ExportScope::All,
    };
    let picker = TerminalPicker { preset: dir };
    let notifier = TerminalNotifier {
        quiet: quiet || format == OutputFormat::Json,
    };

    match export_all_data_flow(ctx.store(), &picker, &notifier, &scope).await {
        ExportFlowOutcome::Cancelled => Ok(()),
        ExportFlowOutcome::Exported(summary) => {
            if format == OutputFormat::Json {
                print_json(&summary.metadata)?;
            } else if !quiet {
                println!("Wrote {}", summary.directory.display());
            }
            Ok(())
        }
        ExportFlowOutcome::Failed(message) => Err(anyhow!("Export failed: {}", message)),
    }
}

async fn cmd_import(
    ctx: &AppContext,
    dir: &std::path::Path,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    let summary = import_all_data(ctx.store(), dir).await.map_err(describe)?;

    if format == OutputFormat::Json {
        return print_json(&serde_json::json!({
            "recordCounts": summary.record_counts,
            "totalRecords": summary.total_records,
            "warnings": summary.warnings,
        }));
    }
    if !quiet {
        println!("Imported {} records.", summary.total_records);
        for (table, count) in &summary.record_counts {
            println!("  {:<12} {}", table, count);
        }
    }
    for warning in &summary.warnings {
        eprintln!("warning: {}", warning);
    }
    Ok(())
}

fn cmd_config(action: ConfigAction, quiet: bool) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config.get(&key)?;
            println!("{}", value);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            if !quiet {
                println!("Set {} = {}", key, value);
            }
        }
        ConfigAction::List => {
            let config = Config::load()?;
            for (key, value) in config.list()? {
                println!("{} = {}", key, value);
            }
        }
        ConfigAction::Reset => {
            Config::reset()?;
            if !quiet {
                println!("Configuration reset to defaults.");
            }
        }
        ConfigAction::Path => {
            let path = Config::config_path()?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["courier", "start", "--format", "json", "--conflicts", "theirs"])
            .unwrap();
        assert!(matches!(cli.command, Commands::Start));
        assert!(cli.format == OutputFormat::Json);
        assert_eq!(ConflictPolicy::from(cli.conflicts), ConflictPolicy::Theirs);
    }

    #[test]
    fn test_parses_export_with_project() {
        let cli = Cli::try_parse_from(["courier", "export", "out", "--project", "proj_1"]).unwrap();
        match cli.command {
            Commands::Export { dir, project } => {
                assert_eq!(dir, Some(PathBuf::from("out")));
                assert_eq!(project.as_deref(), Some("proj_1"));
            }
            _ => panic!("expected export"),
        }
    }
}
