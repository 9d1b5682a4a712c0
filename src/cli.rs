//! Command-line front end for the analysis editor.
//!
//! Each invocation opens the workspace, applies one command to the active
//! document and saves. The active document is remembered between runs.

use std::fmt::Write as _;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use url::Url;

use crate::completion::{overall_completion, section_breakdown};
use crate::config::Config;
use crate::error::AppResult;
use crate::export::{render, share_url, write_export, ExportFormat};
use crate::model::{
    AssumptionField, EdgeCaseKind, FieldPath, Priority, QuestionField, QuestionType, ScopeItem,
    ScopeItemField, VersionPhase,
};
use crate::scope::{
    counts_by_version, filter_items, group_by_version, phase_filter_counts, PhaseFilter,
};
use crate::state::Workspace;
use crate::storage::KeyValueStore;

const RULE: &str = "────────────────────────────────────────";

/// Requirement analysis editor.
#[derive(Parser, Debug)]
#[command(name = "req-analysis", version, about)]
pub struct Cli {
    /// Database file, overrides ANALYSIS_DATABASE_PATH
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    /// Command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List saved analyses
    List,

    /// Create a blank analysis and make it active
    New {
        /// Name of the new analysis
        #[arg(long)]
        name: Option<String>,
    },

    /// Make another analysis active
    Select {
        /// Analysis id
        id: String,
    },

    /// Delete an analysis (the last one is always kept)
    Delete {
        /// Analysis id
        id: String,
    },

    /// Rename the active analysis
    Rename {
        /// New name
        name: String,
    },

    /// Set the target phase, or `none` to clear it
    Phase {
        /// Phase label
        phase: String,
    },

    /// Set a text field, e.g. `problem.who` or `summary.confidence`
    Set {
        /// Dotted field path
        field: FieldPath,
        /// New value
        value: String,
    },

    /// Show completion for the active analysis
    Status,

    /// Print the active analysis
    Show {
        /// Print JSON instead of the Markdown report
        #[arg(long)]
        json: bool,
    },

    /// Edit assumptions
    #[command(subcommand)]
    Assumption(AssumptionCommands),

    /// Edit the edge-case checklist
    #[command(subcommand)]
    Edge(EdgeCommands),

    /// Edit and view scope items
    #[command(subcommand)]
    Scope(ScopeCommands),

    /// Edit open questions
    #[command(subcommand)]
    Question(QuestionCommands),

    /// Write the Markdown report to a file
    Export {
        /// Output path, defaults to the export directory
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Write the analysis as JSON to a file
    ExportJson {
        /// Output path, defaults to the export directory
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Print a share link for the active analysis
    Share {
        /// Link base, overrides ANALYSIS_SHARE_BASE_URL
        #[arg(long)]
        base_url: Option<Url>,

        /// Write the link to a file instead of printing it
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Replace all analyses with a shared one
    Open {
        /// Share link or bare token
        link: String,
    },
}

/// Assumption subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum AssumptionCommands {
    /// Add an unvalidated assumption
    Add {
        /// Assumption text
        text: String,
    },
    /// Set `assumption`, `status` or `validation`
    Update {
        /// Assumption id
        id: String,
        /// Field to set
        field: AssumptionField,
        /// New value
        value: String,
    },
    /// Remove an assumption
    Remove {
        /// Assumption id
        id: String,
    },
}

/// Edge-case subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum EdgeCommands {
    /// Show the checklist
    List,
    /// Flip the considered flag
    Toggle {
        /// Category key, e.g. `firstTime`
        kind: EdgeCaseKind,
    },
    /// Replace the notes for a category
    Notes {
        /// Category key, e.g. `firstTime`
        kind: EdgeCaseKind,
        /// New notes
        notes: String,
    },
}

/// Scope subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum ScopeCommands {
    /// Add a deliverable
    Add {
        /// Item name
        item: String,
        /// Phase tag
        #[arg(long)]
        version: Option<VersionPhase>,
        /// MoSCoW priority, defaults to Must
        #[arg(long)]
        priority: Option<Priority>,
        /// Longer description
        #[arg(long)]
        description: Option<String>,
    },
    /// Set `item`, `version`, `priority` or `description`
    Update {
        /// Item id
        id: String,
        /// Field to set
        field: ScopeItemField,
        /// New value
        value: String,
    },
    /// Remove a deliverable
    Remove {
        /// Item id
        id: String,
    },
    /// List items, optionally filtered by phase (`All`, `Untagged`, `V1`, ...)
    List {
        /// Phase filter
        #[arg(long)]
        filter: Option<PhaseFilter>,
    },
    /// Show items grouped by version
    Groups,
}

/// Question subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum QuestionCommands {
    /// Add an open question
    Add {
        /// Question text
        text: String,
        /// Question type, defaults to Can Answer Now
        #[arg(long = "type")]
        kind: Option<QuestionType>,
    },
    /// Set `question`, `type`, `status` or `answer`
    Update {
        /// Question id
        id: String,
        /// Field to set
        field: QuestionField,
        /// New value
        value: String,
    },
    /// Remove a question
    Remove {
        /// Question id
        id: String,
    },
}

/// Result of CLI command execution.
pub struct CliResult {
    /// Exit code (0 = success)
    pub exit_code: i32,
    /// Output message
    pub message: String,
}

impl CliResult {
    /// Create a success result with the given message.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            message: message.into(),
        }
    }

    /// Create an error result with the given message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            exit_code: 1,
            message: message.into(),
        }
    }
}

/// Execute a command against the workspace.
pub async fn execute_command<S: KeyValueStore>(
    command: Commands,
    workspace: &mut Workspace<S>,
    config: &Config,
) -> CliResult {
    match run(command, workspace, config).await {
        Ok(message) => CliResult::success(message),
        Err(e) => CliResult::error(format!("Error: {}", e)),
    }
}

async fn run<S: KeyValueStore>(
    command: Commands,
    workspace: &mut Workspace<S>,
    config: &Config,
) -> AppResult<String> {
    match command {
        Commands::List => Ok(format_list(workspace)),
        Commands::New { name } => {
            let id = workspace.add_blank(name.as_deref()).await?;
            workspace.remember_active().await?;
            Ok(format!("Created analysis {}", id))
        }
        Commands::Select { id } => {
            workspace.set_active(&id)?;
            workspace.remember_active().await?;
            Ok(format!("Active analysis: {}", workspace.state().active().name))
        }
        Commands::Delete { id } => {
            if !workspace.remove(&id).await? {
                return Ok("The only analysis cannot be deleted".to_string());
            }
            workspace.remember_active().await?;
            Ok(format!("Deleted analysis {}", id))
        }
        Commands::Rename { name } => {
            workspace
                .edit_active(|a| a.set_field(FieldPath::Name, &name))
                .await?;
            Ok(format!("Renamed to {}", name))
        }
        Commands::Phase { phase } => {
            let value = if phase.eq_ignore_ascii_case("none") {
                ""
            } else {
                phase.as_str()
            };
            workspace
                .edit_active(|a| a.set_field(FieldPath::Phase, value))
                .await?;
            let phase = &workspace.state().active().phase;
            Ok(if phase.is_empty() {
                "Target phase cleared".to_string()
            } else {
                format!("Target phase: {}", phase)
            })
        }
        Commands::Set { field, value } => {
            workspace.edit_active(|a| a.set_field(field, &value)).await?;
            let assignment = format!("{} = {}", field, workspace.state().active().field(field));
            Ok(match field.section() {
                Some(section) => format!("[{}] {}", section.label(), assignment),
                None => assignment,
            })
        }
        Commands::Status => Ok(format_status(workspace)),
        Commands::Show { json } => {
            let format = if json {
                ExportFormat::Json
            } else {
                ExportFormat::Markdown
            };
            render(workspace.state().active(), format)
        }
        Commands::Assumption(cmd) => run_assumption(cmd, workspace).await,
        Commands::Edge(cmd) => run_edge(cmd, workspace).await,
        Commands::Scope(cmd) => run_scope(cmd, workspace).await,
        Commands::Question(cmd) => run_question(cmd, workspace).await,
        Commands::Export { output } => {
            let path = write_export(
                workspace.state().active(),
                ExportFormat::Markdown,
                &config.export.dir,
                output.as_deref(),
            )?;
            Ok(format!("Report written to {}", path.display()))
        }
        Commands::ExportJson { output } => {
            let path = write_export(
                workspace.state().active(),
                ExportFormat::Json,
                &config.export.dir,
                output.as_deref(),
            )?;
            Ok(format!("JSON written to {}", path.display()))
        }
        Commands::Share { base_url, output } => {
            let base = base_url.unwrap_or_else(|| config.share.base_url.clone());
            let link = share_url(&base, workspace.state().active())?;
            match output {
                Some(path) => {
                    std::fs::write(&path, format!("{}\n", link))?;
                    Ok(format!("Share link written to {}", path.display()))
                }
                None => Ok(link.to_string()),
            }
        }
        Commands::Open { link } => {
            let id = workspace.open_shared(&link).await?;
            workspace.remember_active().await?;
            Ok(format!(
                "Opened shared analysis {} ({})",
                workspace.state().active().name,
                id
            ))
        }
    }
}

async fn run_assumption<S: KeyValueStore>(
    command: AssumptionCommands,
    workspace: &mut Workspace<S>,
) -> AppResult<String> {
    match command {
        AssumptionCommands::Add { text } => {
            let id = workspace.edit_active(|a| Ok(a.add_assumption(text))).await?;
            Ok(format!("Added assumption {}", id))
        }
        AssumptionCommands::Update { id, field, value } => {
            workspace
                .edit_active(|a| a.update_assumption(&id, field, &value))
                .await?;
            Ok(format!("Updated assumption {}", id))
        }
        AssumptionCommands::Remove { id } => {
            workspace.edit_active(|a| a.remove_assumption(&id)).await?;
            Ok(format!("Removed assumption {}", id))
        }
    }
}

async fn run_edge<S: KeyValueStore>(
    command: EdgeCommands,
    workspace: &mut Workspace<S>,
) -> AppResult<String> {
    match command {
        EdgeCommands::List => {
            let mut out = String::new();
            for (kind, entry) in workspace.state().active().edges.iter() {
                let mark = if entry.considered { "x" } else { " " };
                let _ = write!(out, "[{}] {:<12} {}", mark, kind.key(), kind.label());
                if !entry.notes.is_empty() {
                    let _ = write!(out, ": {}", entry.notes);
                }
                out.push('\n');
            }
            Ok(out)
        }
        EdgeCommands::Toggle { kind } => {
            let considered = workspace.edit_active(|a| Ok(a.toggle_edge(kind))).await?;
            Ok(format!(
                "{}: {}",
                kind.label(),
                if considered {
                    "considered"
                } else {
                    "not considered"
                }
            ))
        }
        EdgeCommands::Notes { kind, notes } => {
            workspace
                .edit_active(|a| {
                    a.set_edge_notes(kind, notes);
                    Ok(())
                })
                .await?;
            Ok(format!("Updated notes for {}", kind.label()))
        }
    }
}

async fn run_scope<S: KeyValueStore>(
    command: ScopeCommands,
    workspace: &mut Workspace<S>,
) -> AppResult<String> {
    match command {
        ScopeCommands::Add {
            item,
            version,
            priority,
            description,
        } => {
            let mut new_item = ScopeItem::new(item);
            if let Some(phase) = version {
                new_item = new_item.with_version(phase);
            }
            if let Some(priority) = priority {
                new_item = new_item.with_priority(priority);
            }
            if let Some(description) = description {
                new_item = new_item.with_description(description);
            }
            let id = workspace
                .edit_active(|a| Ok(a.add_scope_item(new_item)))
                .await?;
            Ok(format!("Added scope item {}", id))
        }
        ScopeCommands::Update { id, field, value } => {
            workspace
                .edit_active(|a| a.update_scope_item(&id, field, &value))
                .await?;
            Ok(format!("Updated scope item {}", id))
        }
        ScopeCommands::Remove { id } => {
            workspace.edit_active(|a| a.remove_scope_item(&id)).await?;
            Ok(format!("Removed scope item {}", id))
        }
        ScopeCommands::List { filter } => {
            let filter = filter.unwrap_or_default();
            let items = &workspace.state().active().scope.items;

            let mut out = String::new();
            let bar: Vec<String> = phase_filter_counts(items)
                .into_iter()
                .map(|(f, n)| {
                    if f == filter {
                        format!("[{} {}]", f, n)
                    } else {
                        format!("{} {}", f, n)
                    }
                })
                .collect();
            let _ = writeln!(out, "{}", bar.join("  "));
            let _ = writeln!(out, "{}", RULE);

            let shown = filter_items(items, filter);
            if shown.is_empty() {
                out.push_str("No scope items\n");
            }
            for item in shown {
                let _ = writeln!(out, "{}", format_scope_item(item));
            }
            Ok(out)
        }
        ScopeCommands::Groups => {
            let items = &workspace.state().active().scope.items;
            if items.is_empty() {
                return Ok("No scope items\n".to_string());
            }

            let mut out = String::new();
            let totals: Vec<String> = counts_by_version(items)
                .into_iter()
                .map(|(bucket, n)| format!("{} {}", bucket, n))
                .collect();
            let _ = writeln!(out, "{}", totals.join("  "));
            let _ = writeln!(out, "{}", RULE);

            for (bucket, group) in group_by_version(items) {
                if group.is_empty() {
                    continue;
                }
                let _ = writeln!(out, "{}", bucket);
                for item in group {
                    let _ = writeln!(out, "  {}", format_scope_item(item));
                }
            }
            Ok(out)
        }
    }
}

async fn run_question<S: KeyValueStore>(
    command: QuestionCommands,
    workspace: &mut Workspace<S>,
) -> AppResult<String> {
    match command {
        QuestionCommands::Add { text, kind } => {
            let id = workspace
                .edit_active(|a| {
                    let id = a.add_question(text);
                    if let Some(kind) = kind {
                        a.update_question(&id, QuestionField::Type, kind.label())?;
                    }
                    Ok(id)
                })
                .await?;
            Ok(format!("Added question {}", id))
        }
        QuestionCommands::Update { id, field, value } => {
            workspace
                .edit_active(|a| a.update_question(&id, field, &value))
                .await?;
            Ok(format!("Updated question {}", id))
        }
        QuestionCommands::Remove { id } => {
            workspace.edit_active(|a| a.remove_question(&id)).await?;
            Ok(format!("Removed question {}", id))
        }
    }
}

fn format_list<S: KeyValueStore>(workspace: &Workspace<S>) -> String {
    let state = workspace.state();
    let mut out = String::new();
    for analysis in state.analyses() {
        let marker = if analysis.id == state.active_id() {
            "*"
        } else {
            " "
        };
        let _ = writeln!(
            out,
            "{} {}  {:>3}%  {}",
            marker,
            analysis.id,
            overall_completion(analysis),
            analysis.name
        );
    }
    out
}

fn format_status<S: KeyValueStore>(workspace: &Workspace<S>) -> String {
    let analysis = workspace.state().active();
    let mut out = String::new();

    let _ = writeln!(out, "{} ({})", analysis.name, analysis.id);
    let phase = if analysis.phase.is_empty() {
        "unset"
    } else {
        analysis.phase.as_str()
    };
    let _ = writeln!(
        out,
        "Phase: {}  Overall: {}%",
        phase,
        overall_completion(analysis)
    );
    let _ = writeln!(out, "{}", RULE);
    for (section, completion) in section_breakdown(analysis) {
        let mark = if completion.is_filled() { "✓" } else { "·" };
        let _ = writeln!(out, "{} {:<22} {}", mark, section.label(), completion);
    }
    out
}

fn format_scope_item(item: &ScopeItem) -> String {
    let version = if item.version.is_empty() {
        "Untagged"
    } else {
        item.version.as_str()
    };
    let mut line = format!("{}  [{}] {}: {}", item.id, version, item.priority, item.item);
    if !item.description.is_empty() {
        line.push_str(" (");
        line.push_str(&item.description);
        line.push(')');
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatabaseConfig, ExportConfig, LogFormat, LoggingConfig, ShareConfig};
    use crate::storage::SqliteStorage;

    fn test_config(export_dir: PathBuf) -> Config {
        Config {
            database: DatabaseConfig::default(),
            logging: LoggingConfig {
                level: "warn".to_string(),
                format: LogFormat::Pretty,
            },
            share: ShareConfig::default(),
            export: ExportConfig { dir: export_dir },
        }
    }

    async fn workspace() -> Workspace<SqliteStorage> {
        let storage = SqliteStorage::new_in_memory().await.unwrap();
        Workspace::open(storage).await
    }

    fn parse(args: &[&str]) -> Commands {
        let mut argv = vec!["req-analysis"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap().command
    }

    #[test]
    fn test_parse_typed_arguments() {
        assert!(matches!(
            parse(&["set", "problem.ifNotBuilt", "Churn"]),
            Commands::Set {
                field: FieldPath::IfNotBuilt,
                ..
            }
        ));
        assert!(matches!(
            parse(&["scope", "add", "Search bar", "--version", "v1.1"]),
            Commands::Scope(ScopeCommands::Add {
                version: Some(VersionPhase::V1_1),
                ..
            })
        ));
        assert!(matches!(
            parse(&["scope", "list", "--filter", "untagged"]),
            Commands::Scope(ScopeCommands::List {
                filter: Some(PhaseFilter::Untagged)
            })
        ));
        assert!(matches!(
            parse(&["edge", "toggle", "firstTime"]),
            Commands::Edge(EdgeCommands::Toggle {
                kind: EdgeCaseKind::FirstTime
            })
        ));
    }

    #[test]
    fn test_parse_rejects_unknown_field() {
        assert!(Cli::try_parse_from(["req-analysis", "set", "overview.color", "red"]).is_err());
    }

    #[tokio::test]
    async fn test_set_and_status() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path().to_path_buf());
        let mut ws = workspace().await;

        let result =
            execute_command(parse(&["set", "problem.who", "Ops"]), &mut ws, &config).await;
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.message, "[Problem & Purpose] problem.who = Ops");

        let status = execute_command(Commands::Status, &mut ws, &config).await;
        assert!(status.message.contains("Overall: 13%"));
        assert!(status.message.contains("20%"));
    }

    #[tokio::test]
    async fn test_set_top_level_field_has_no_section() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path().to_path_buf());
        let mut ws = workspace().await;

        let result = execute_command(parse(&["set", "phase", "v2"]), &mut ws, &config).await;
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.message, "phase = V2");
    }

    #[tokio::test]
    async fn test_invalid_value_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path().to_path_buf());
        let mut ws = workspace().await;

        let result = execute_command(
            parse(&["set", "summary.confidence", "Certain"]),
            &mut ws,
            &config,
        )
        .await;
        assert_eq!(result.exit_code, 1);
        assert!(result.message.starts_with("Error:"));
        assert_eq!(ws.state().active().summary.confidence, "");
    }

    #[tokio::test]
    async fn test_phase_none_clears() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path().to_path_buf());
        let mut ws = workspace().await;

        execute_command(parse(&["phase", "mvp"]), &mut ws, &config).await;
        assert_eq!(ws.state().active().phase, "MVP");

        let result = execute_command(parse(&["phase", "none"]), &mut ws, &config).await;
        assert_eq!(result.message, "Target phase cleared");
        assert_eq!(ws.state().active().phase, "");
    }

    #[tokio::test]
    async fn test_delete_only_analysis_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path().to_path_buf());
        let mut ws = workspace().await;
        let id = ws.state().active_id().to_string();

        let result = execute_command(Commands::Delete { id }, &mut ws, &config).await;
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.message, "The only analysis cannot be deleted");
        assert_eq!(ws.state().analyses().len(), 1);
    }

    #[tokio::test]
    async fn test_scope_list_marks_filter() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path().to_path_buf());
        let mut ws = workspace().await;

        execute_command(
            parse(&["scope", "add", "Login", "--version", "MVP"]),
            &mut ws,
            &config,
        )
        .await;
        execute_command(parse(&["scope", "add", "Audit log"]), &mut ws, &config).await;

        let result =
            execute_command(parse(&["scope", "list", "--filter", "MVP"]), &mut ws, &config).await;
        assert!(result.message.starts_with("All 2  [MVP 1]"));
        assert!(result.message.contains("[MVP] Must: Login"));
        assert!(!result.message.contains("Audit log"));
    }

    #[tokio::test]
    async fn test_scope_groups_skip_empty_buckets() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path().to_path_buf());
        let mut ws = workspace().await;

        execute_command(
            parse(&["scope", "add", "Export", "--version", "V2"]),
            &mut ws,
            &config,
        )
        .await;
        let result = execute_command(parse(&["scope", "groups"]), &mut ws, &config).await;

        assert!(result
            .message
            .starts_with("MVP 0  V1 0  V1.1 0  V2 1  Future 0  Cut 0  Untagged 0\n"));
        assert!(result.message.contains("\nV2\n  "));
        assert!(!result.message.contains("\nMVP\n"));
    }

    #[tokio::test]
    async fn test_export_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path().to_path_buf());
        let mut ws = workspace().await;
        execute_command(parse(&["rename", "Checkout"]), &mut ws, &config).await;

        let result = execute_command(Commands::Export { output: None }, &mut ws, &config).await;
        assert_eq!(result.exit_code, 0);

        let content = std::fs::read_to_string(dir.path().join("Checkout.md")).unwrap();
        assert!(content.starts_with("# Checkout\n"));
    }

    #[tokio::test]
    async fn test_export_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path().join("missing"));
        let mut ws = workspace().await;

        let result = execute_command(Commands::Export { output: None }, &mut ws, &config).await;
        assert_eq!(result.exit_code, 1);
    }

    #[tokio::test]
    async fn test_share_then_open_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path().to_path_buf());
        let mut ws = workspace().await;
        execute_command(parse(&["rename", "Shared"]), &mut ws, &config).await;

        let link = execute_command(
            Commands::Share {
                base_url: None,
                output: None,
            },
            &mut ws,
            &config,
        )
        .await;
        assert!(link.message.starts_with("http://localhost:5173/?data="));

        let mut other = workspace().await;
        let opened = execute_command(
            Commands::Open { link: link.message },
            &mut other,
            &config,
        )
        .await;
        assert_eq!(opened.exit_code, 0);
        assert_eq!(other.state().active().name, "Shared");
        assert_eq!(other.state().analyses().len(), 1);
    }
}
