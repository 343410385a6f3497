//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use resolvekit_classifier::ClassifyContext;
use resolvekit_client::RemoteStore;
use resolvekit_core::{ImportSummary, Pipeline, ProgressReporter, import_files};
use resolvekit_render::{RenderFormat, RenderMode, render};
use resolvekit_shared::{
    AppConfig, DocumentFragment, expand_home, init_config, load_config, load_config_from,
    validate_config,
};
use resolvekit_storage::Storage;
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// resolvekit: turn complaint-procedure pages into structured documents.
#[derive(Parser)]
#[command(
    name = "resolvekit",
    version,
    about = "Normalize, classify, store and render complaint-procedure documents.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Config file (defaults to ~/.resolvekit/resolvekit.toml).
    #[arg(long = "config", env = "RESOLVEKIT_CONFIG", global = true)]
    pub config_file: Option<PathBuf>,

    /// Database file (overrides `[storage] db_path`).
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Print the normalized markup of a file.
    Normalize {
        file: PathBuf,
    },

    /// Classify a file and print the structured document as JSON.
    Classify {
        file: PathBuf,

        /// Entity display name used in the main-heading description.
        #[arg(short, long)]
        entity: Option<String>,
    },

    /// Classify a file and render it.
    Render {
        file: PathBuf,

        /// Render the editing surface instead of the read-only view.
        #[arg(long)]
        editable: bool,

        /// Emit Markdown instead of HTML (read-only only).
        #[arg(long)]
        markdown: bool,

        #[arg(short, long)]
        entity: Option<String>,
    },

    /// Process one or more files as a single document and store it locally.
    Import {
        /// Entity key to store the document under.
        entity_id: String,

        /// Markup files, concatenated in the given order.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[arg(short, long)]
        entity: Option<String>,
    },

    /// Print the stored document for an entity.
    Show {
        entity_id: String,
    },

    /// Delete the stored document for an entity.
    Delete {
        entity_id: String,
    },

    /// List stored entity keys.
    List,

    /// Send a file's markup to a resolvekit server, which classifies and stores it.
    Push {
        entity_id: String,
        file: PathBuf,

        /// Server base URL (overrides `[client] base_url`).
        #[arg(long)]
        url: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr so command
/// output on stdout stays pipeable.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "resolvekit=warn",
        1 => "resolvekit=info",
        2 => "resolvekit=debug",
        _ => "resolvekit=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    if let Command::Config { action } = &cli.command {
        return match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&resolve_config(&cli)?),
        };
    }

    let config = resolve_config(&cli)?;
    match cli.command {
        Command::Normalize { file } => cmd_normalize(&config, &file).await,
        Command::Classify { file, entity } => cmd_classify(&config, &file, entity).await,
        Command::Render {
            file,
            editable,
            markdown,
            entity,
        } => cmd_render(&config, &file, editable, markdown, entity).await,
        Command::Import {
            entity_id,
            files,
            entity,
        } => cmd_import(&config, &entity_id, &files, entity).await,
        Command::Show { entity_id } => cmd_show(&config, &entity_id).await,
        Command::Delete { entity_id } => cmd_delete(&config, &entity_id).await,
        Command::List => cmd_list(&config).await,
        Command::Push {
            entity_id,
            file,
            url,
        } => cmd_push(config, &entity_id, &file, url).await,
        Command::Config { .. } => Ok(()),
    }
}

/// Load the config file and apply flag overrides.
fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config_file {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    if let Some(db) = &cli.db {
        config.storage.db_path = db.clone();
    }
    validate_config(&config)?;
    Ok(config)
}

fn context(entity: Option<String>) -> ClassifyContext {
    entity.map(ClassifyContext::for_entity).unwrap_or_default()
}

async fn read_markup(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .wrap_err_with(|| format!("cannot read {}", path.display()))
}

async fn open_storage(config: &AppConfig) -> Result<Storage> {
    let path = expand_home(&config.storage.db_path)?;
    Ok(Storage::open(&path).await?)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_normalize(config: &AppConfig, file: &Path) -> Result<()> {
    let pipeline = Pipeline::new(config)?;
    let raw = read_markup(file).await?;
    println!("{}", pipeline.normalize(&raw).to_html());
    Ok(())
}

async fn cmd_classify(config: &AppConfig, file: &Path, entity: Option<String>) -> Result<()> {
    let pipeline = Pipeline::new(config)?;
    let raw = read_markup(file).await?;
    let doc = pipeline.process(&raw, &context(entity));
    info!(status = %doc.processing_status, "classified");
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}

async fn cmd_render(
    config: &AppConfig,
    file: &Path,
    editable: bool,
    markdown: bool,
    entity: Option<String>,
) -> Result<()> {
    let mode = if editable {
        RenderMode::Editable
    } else {
        RenderMode::ReadOnly
    };
    let format = if markdown {
        RenderFormat::Markdown
    } else {
        RenderFormat::Html
    };

    let pipeline = Pipeline::new(config)?;
    let raw = read_markup(file).await?;
    let doc = pipeline.process(&raw, &context(entity));
    let rendered = render(&doc, mode, format)?;
    info!(kind = ?rendered.kind, "rendered");
    println!("{}", rendered.body);
    Ok(())
}

async fn cmd_import(
    config: &AppConfig,
    entity_id: &str,
    files: &[PathBuf],
    entity: Option<String>,
) -> Result<()> {
    let pipeline = Pipeline::new(config)?;
    let storage = open_storage(config).await?;
    let reporter = CliProgress::new(files.len());

    let summary = import_files(
        &pipeline,
        &storage,
        entity_id,
        files,
        &context(entity),
        &reporter,
    )
    .await?;

    println!();
    println!("  Document stored!");
    println!("  Entity:    {}", summary.entity_id);
    println!("  Files:     {}", summary.files);
    println!("  Status:    {}", summary.status);
    println!("  Methods:   {}", summary.methods);
    println!("  Levels:    {}", summary.levels);
    println!("  Documents: {}", summary.documents);
    println!(
        "  Time:      {:.1}s",
        summary.elapsed.as_secs_f64()
    );
    println!();

    Ok(())
}

async fn cmd_show(config: &AppConfig, entity_id: &str) -> Result<()> {
    let storage = open_storage(config).await?;
    match storage.get_complaint(entity_id).await? {
        Some(doc) => println!("{}", serde_json::to_string_pretty(&doc)?),
        None => println!("No document stored for '{entity_id}'."),
    }
    Ok(())
}

async fn cmd_delete(config: &AppConfig, entity_id: &str) -> Result<()> {
    let storage = open_storage(config).await?;
    if storage.delete_complaint(entity_id).await? {
        println!("Deleted '{entity_id}'.");
    } else {
        println!("No document stored for '{entity_id}'.");
    }
    Ok(())
}

async fn cmd_list(config: &AppConfig) -> Result<()> {
    let storage = open_storage(config).await?;
    let keys = storage.list_complaint_keys().await?;
    if keys.is_empty() {
        println!("No documents stored.");
    }
    for key in keys {
        println!("{key}");
    }
    Ok(())
}

async fn cmd_push(
    mut config: AppConfig,
    entity_id: &str,
    file: &Path,
    url: Option<String>,
) -> Result<()> {
    if let Some(url) = url {
        config.client.base_url = url;
    }
    let store = RemoteStore::new(&config.client)?;
    let raw = read_markup(file).await?;
    let fragment = DocumentFragment {
        rich_text_content: Some(raw),
        ..Default::default()
    };

    let stored = store
        .save_fragment(entity_id, &fragment)
        .await
        .map_err(|e| {
            if e.is_retryable() {
                eyre!("{e} (the save can be retried)")
            } else {
                eyre!(e)
            }
        })?;
    println!(
        "Pushed '{entity_id}' to {} ({}).",
        config.client.base_url, stored.processing_status
    );
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Spinner for a single file, bar for several.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new(total: usize) -> Self {
        let bar = if total > 1 {
            let bar = ProgressBar::new(total as u64);
            bar.set_style(
                ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar
        } else {
            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::with_template("{spinner:.cyan} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner())
                    .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
            spinner.enable_steady_tick(std::time::Duration::from_millis(80));
            spinner
        };
        Self { bar }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.bar.set_message(name.to_string());
    }

    fn file_read(&self, path: &Path, current: usize, total: usize) {
        self.bar.set_position(current as u64);
        self.bar
            .set_message(format!("Reading [{current}/{total}] {}", path.display()));
    }

    fn done(&self, _summary: &ImportSummary) {
        self.bar.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_import_with_several_files() {
        let cli = Cli::try_parse_from([
            "resolvekit",
            "import",
            "xyz-telecom",
            "a.html",
            "b.html",
            "--entity",
            "XYZ Telecom",
        ])
        .expect("parse");
        let Command::Import {
            entity_id,
            files,
            entity,
        } = cli.command
        else {
            panic!("expected import");
        };
        assert_eq!(entity_id, "xyz-telecom");
        assert_eq!(files, vec![PathBuf::from("a.html"), PathBuf::from("b.html")]);
        assert_eq!(entity.as_deref(), Some("XYZ Telecom"));
    }

    #[test]
    fn import_requires_a_file() {
        assert!(Cli::try_parse_from(["resolvekit", "import", "xyz"]).is_err());
    }

    #[test]
    fn global_flags_apply_after_subcommand() {
        let cli = Cli::try_parse_from(["resolvekit", "show", "xyz", "-vv", "--db", "/tmp/x.db"])
            .expect("parse");
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.db.as_deref(), Some("/tmp/x.db"));
    }

    #[test]
    fn entity_name_feeds_context() {
        assert_eq!(
            context(Some("ABC".into())).entity_name.as_deref(),
            Some("ABC")
        );
        assert!(context(None).entity_name.is_none());
    }
}
