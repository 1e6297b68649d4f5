//! Argument parsing, configuration loading and command dispatch.

use std::path::{Path, PathBuf};

use anyhow::anyhow;
use clap::{Args, Parser, Subcommand, ValueEnum};
use lexicon_api_models::{BackupFormat, RestoreMode};
use lexicon_telemetry::{LogFormat, LoggingConfig, in_command_span, init_logging};
use lexicon_ui::config::UiConfig;
use lexicon_ui::models::Field;
use reqwest::Url;

use crate::client::{CliError, CliResult, build_client, gateway, parse_url};
use crate::commands::{Session, backup, catalog, combine, editor, entries};

const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CLI_LOG_LEVEL: &str = "warn";

/// Parses CLI arguments and executes the requested command. Returns the
/// process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    match execute(cli).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

async fn execute(cli: Cli) -> CliResult<()> {
    init_logging(&LoggingConfig {
        level: &cli.log_level,
        format: cli.log_format,
        build_label: env!("CARGO_PKG_VERSION"),
    })
    .map_err(|err| CliError::failure(anyhow!("failed to initialise logging: {err}")))?;

    let config = load_config(cli.config.as_deref(), cli.page_size)?;
    let client = build_client(cli.timeout)?;
    let quiet = cli.quiet || cli.output == OutputFormat::Json;
    let session = Session::new(
        gateway(client, &cli.api_url),
        config,
        cli.output,
        cli.yes,
        quiet,
    );
    let label = command_label(&cli.command);
    tracing::debug!(command = label, api_url = %cli.api_url, "dispatching command");
    in_command_span(label, dispatch(&session, cli.command)).await
}

async fn dispatch(session: &Session, command: Command) -> CliResult<()> {
    match command {
        Command::Categories => catalog::handle_categories(session).await,
        Command::Stats => backup::handle_stats(session).await,
        Command::Search(args) => catalog::handle_search(session, args).await,
        Command::Show { id } => catalog::handle_show(session, id).await,
        Command::Ls(args) => entries::handle_list(session, args).await,
        Command::Add(args) => entries::handle_add(session, args).await,
        Command::Edit(args) => entries::handle_edit(session, args).await,
        Command::Rm(args) => entries::handle_remove(session, args).await,
        Command::Editor(command) => editor::handle_editor(session, command).await,
        Command::Combine(args) => combine::handle_combine(session, args).await,
        Command::Export(args) => backup::handle_export(session, args).await,
        Command::Restore(args) => backup::handle_restore(session, args).await,
        Command::History => backup::handle_history(session).await,
    }
}

const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Categories => "categories",
        Command::Stats => "stats",
        Command::Search(_) => "search",
        Command::Show { .. } => "show",
        Command::Ls(_) => "ls",
        Command::Add(_) => "add",
        Command::Edit(_) => "edit",
        Command::Rm(_) => "rm",
        Command::Editor(EditorCommand::Rows { .. }) => "editor_rows",
        Command::Editor(EditorCommand::Set(_)) => "editor_set",
        Command::Editor(EditorCommand::Add(_)) => "editor_add",
        Command::Editor(EditorCommand::Drop(_)) => "editor_drop",
        Command::Editor(EditorCommand::Sort { .. }) => "editor_sort",
        Command::Combine(_) => "combine",
        Command::Export(_) => "export",
        Command::Restore(_) => "restore",
        Command::History => "history",
    }
}

/// Defaults, overlaid by an optional JSON file, then by command-line flags.
fn load_config(path: Option<&Path>, page_size: Option<u32>) -> CliResult<UiConfig> {
    let mut config = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path).map_err(|err| {
                CliError::validation(format!("failed to read {}: {err}", path.display()))
            })?;
            UiConfig::from_json(&raw).map_err(|err| {
                CliError::validation(format!("invalid configuration in {}: {err}", path.display()))
            })?
        }
        None => UiConfig::default(),
    };
    if let Some(page_size) = page_size {
        config.page_size = page_size;
    }
    config
        .validated()
        .map_err(|err| CliError::validation(err.to_string()))
}

fn parse_field(input: &str) -> Result<Field, String> {
    Field::from_key(&input.trim().to_ascii_lowercase()).ok_or_else(|| {
        format!("unknown field '{input}'; expected category, term, translation or note")
    })
}

fn parse_log_format(input: &str) -> Result<LogFormat, String> {
    input.parse::<LogFormat>().map_err(|err| err.to_string())
}

#[derive(Parser)]
#[command(name = "lexicon", version, about = "Lexicon glossary command-line client")]
struct Cli {
    #[arg(
        long,
        global = true,
        env = "LEXICON_API_URL",
        value_parser = parse_url,
        default_value = DEFAULT_API_URL
    )]
    api_url: Url,
    #[arg(
        long,
        global = true,
        env = "LEXICON_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    timeout: u64,
    #[arg(
        long,
        global = true,
        env = "LEXICON_CONFIG",
        help = "JSON file overriding page size, field limits, prefix and joiner"
    )]
    config: Option<PathBuf>,
    #[arg(long, global = true, env = "LEXICON_PAGE_SIZE")]
    page_size: Option<u32>,
    #[arg(
        long,
        global = true,
        env = "LEXICON_LOG_LEVEL",
        default_value = DEFAULT_CLI_LOG_LEVEL
    )]
    log_level: String,
    #[arg(
        long,
        global = true,
        env = "LEXICON_LOG_FORMAT",
        value_parser = parse_log_format,
        default_value = "pretty"
    )]
    log_format: LogFormat,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    output: OutputFormat,
    #[arg(long, short = 'y', global = true, help = "Answer yes to every confirmation")]
    yes: bool,
    #[arg(long, short = 'q', global = true, help = "Suppress progress notices on stderr")]
    quiet: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List categories with their entry counts.
    Categories,
    /// Show category and entry totals.
    Stats,
    /// Search entries by keyword.
    Search(SearchArgs),
    /// Show one entry.
    Show { id: i64 },
    /// List one page of entries.
    Ls(ListArgs),
    /// Add a single entry.
    Add(AddArgs),
    /// Change fields of an existing entry.
    Edit(EditArgs),
    /// Delete entries listed on a page.
    Rm(RemoveArgs),
    /// Edit a whole category as a table.
    #[command(subcommand)]
    Editor(EditorCommand),
    /// Join selected translations into one line on stdout.
    Combine(CombineArgs),
    /// Download a CSV or database export.
    Export(ExportArgs),
    /// Restore from a CSV or database file.
    Restore(RestoreArgs),
    /// List past restore operations.
    History,
}

#[derive(Subcommand)]
pub(crate) enum EditorCommand {
    /// Print the rows of a category with their row numbers.
    Rows { category: String },
    /// Change one cell and save the category.
    Set(EditorSetArgs),
    /// Append a row and save the category.
    Add(EditorAddArgs),
    /// Remove a row and save the category.
    Drop(EditorRowArgs),
    /// Save the category and sort it on the server.
    Sort { category: String },
}

#[derive(Args)]
pub(crate) struct SearchArgs {
    pub(crate) keyword: String,
    #[arg(long)]
    pub(crate) category: Option<String>,
    #[arg(long, default_value_t = 1)]
    pub(crate) page: u32,
}

#[derive(Args)]
pub(crate) struct ListArgs {
    #[arg(long)]
    pub(crate) category: Option<String>,
    #[arg(long, default_value_t = 1)]
    pub(crate) page: u32,
}

#[derive(Args)]
pub(crate) struct AddArgs {
    #[arg(long)]
    pub(crate) category: String,
    #[arg(long)]
    pub(crate) term: String,
    #[arg(long)]
    pub(crate) translation: String,
    #[arg(long)]
    pub(crate) note: Option<String>,
    #[arg(long, help = "Submit through the legacy add endpoint")]
    pub(crate) legacy: bool,
}

#[derive(Args)]
pub(crate) struct EditArgs {
    pub(crate) id: i64,
    #[arg(long)]
    pub(crate) category: Option<String>,
    #[arg(long)]
    pub(crate) term: Option<String>,
    #[arg(long)]
    pub(crate) translation: Option<String>,
    #[arg(long)]
    pub(crate) note: Option<String>,
}

#[derive(Args)]
pub(crate) struct RemoveArgs {
    #[arg(required = true)]
    pub(crate) ids: Vec<i64>,
    #[arg(long)]
    pub(crate) category: Option<String>,
    #[arg(long, default_value_t = 1)]
    pub(crate) page: u32,
}

#[derive(Args)]
pub(crate) struct EditorSetArgs {
    pub(crate) category: String,
    pub(crate) row: usize,
    #[arg(value_parser = parse_field)]
    pub(crate) field: Field,
    pub(crate) value: String,
}

#[derive(Args)]
pub(crate) struct EditorAddArgs {
    pub(crate) category: String,
    #[arg(long)]
    pub(crate) term: String,
    #[arg(long)]
    pub(crate) translation: String,
    #[arg(long)]
    pub(crate) note: Option<String>,
}

#[derive(Args)]
pub(crate) struct EditorRowArgs {
    pub(crate) category: String,
    pub(crate) row: usize,
}

#[derive(Args)]
pub(crate) struct CombineArgs {
    #[arg(required = true)]
    pub(crate) categories: Vec<String>,
    #[arg(long, value_delimiter = ',', help = "Only select these terms")]
    pub(crate) pick: Vec<String>,
    #[arg(long, help = "Start the line with the configured prompt prefix")]
    pub(crate) prefix: bool,
    #[arg(long, help = "Read terms from the legacy endpoints")]
    pub(crate) legacy: bool,
}

#[derive(Args)]
pub(crate) struct ExportArgs {
    #[arg(long, value_enum, default_value_t = FormatArg::Csv)]
    pub(crate) format: FormatArg,
    #[arg(long, help = "Only export this category (CSV only)")]
    pub(crate) category: Option<String>,
    #[arg(short = 'o', long = "out-file", help = "Write to a file instead of stdout")]
    pub(crate) out_file: Option<PathBuf>,
}

#[derive(Args)]
pub(crate) struct RestoreArgs {
    pub(crate) file: PathBuf,
    #[arg(long, value_enum, default_value_t = FormatArg::Csv)]
    pub(crate) format: FormatArg,
    #[arg(long, value_enum, default_value_t = ModeArg::Increment)]
    pub(crate) mode: ModeArg,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum FormatArg {
    Csv,
    Db,
}

impl From<FormatArg> for BackupFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Csv => Self::Csv,
            FormatArg::Db => Self::Db,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum ModeArg {
    Increment,
    Replace,
}

impl From<ModeArg> for RestoreMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Increment => Self::Increment,
            ModeArg::Replace => Self::Replace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn parse(args: &[&str]) -> Option<Cli> {
        Cli::try_parse_from(std::iter::once("lexicon").chain(args.iter().copied())).ok()
    }

    #[test]
    fn global_flags_apply_after_the_subcommand() {
        let cli = parse(&["ls", "--category", "Animals", "--output", "json", "--yes"]);
        let Some(cli) = cli else {
            panic!("arguments should parse");
        };
        assert_eq!(cli.output, OutputFormat::Json);
        assert!(cli.yes);
        assert_eq!(command_label(&cli.command), "ls");
        assert!(matches!(
            cli.command,
            Command::Ls(ListArgs { category: Some(ref name), page: 1 }) if name == "Animals"
        ));
    }

    #[test]
    fn api_url_must_be_a_base_url() {
        assert!(parse(&["--api-url", "mailto:someone@example.com", "categories"]).is_none());
        let cli = parse(&["--api-url", "http://glossary.local:8080/", "categories"]);
        assert_eq!(
            cli.map(|cli| cli.api_url.to_string()),
            Some("http://glossary.local:8080/".to_string())
        );
    }

    #[test]
    fn editor_set_parses_field_names() {
        let cli = parse(&["editor", "set", "Animals", "2", "Translation", "chat"]);
        let Some(Cli {
            command: Command::Editor(EditorCommand::Set(args)),
            ..
        }) = cli
        else {
            panic!("editor set should parse");
        };
        assert_eq!(args.row, 2);
        assert_eq!(args.field, Field::Translation);
        assert!(parse(&["editor", "set", "Animals", "2", "colour", "red"]).is_none());
    }

    #[test]
    fn combine_splits_pick_lists() {
        let cli = parse(&["combine", "Animals", "Colours", "--pick", "cat,red", "--prefix"]);
        let Some(Cli {
            command: Command::Combine(args),
            ..
        }) = cli
        else {
            panic!("combine should parse");
        };
        assert_eq!(args.categories, vec!["Animals", "Colours"]);
        assert_eq!(args.pick, vec!["cat", "red"]);
        assert!(args.prefix);
        assert!(!args.legacy);
    }

    #[test]
    fn rm_requires_at_least_one_id() {
        assert!(parse(&["rm"]).is_none());
        assert!(parse(&["rm", "4", "9"]).is_some());
    }

    #[test]
    fn restore_defaults_to_csv_increment() {
        let cli = parse(&["restore", "backup.csv"]);
        let Some(Cli {
            command: Command::Restore(args),
            ..
        }) = cli
        else {
            panic!("restore should parse");
        };
        assert_eq!(BackupFormat::from(args.format), BackupFormat::Csv);
        assert_eq!(RestoreMode::from(args.mode), RestoreMode::Increment);
    }

    #[test]
    fn load_config_applies_page_size_override() {
        let config = load_config(None, Some(25)).ok();
        assert_eq!(config.map(|config| config.page_size), Some(25));

        let err = load_config(None, Some(0)).err();
        assert_eq!(err.map(|err| err.exit_code()), Some(2));
    }

    #[test]
    fn load_config_reads_json_overrides() -> anyhow::Result<()> {
        let path = std::env::temp_dir().join(format!("lexicon-cli-{}.json", std::process::id()));
        let mut file = std::fs::File::create(&path)?;
        file.write_all(br#"{ "prompt_prefix": "Nai", "joiner": " | " }"#)?;
        drop(file);

        let config = load_config(Some(&path), None);
        std::fs::remove_file(&path)?;

        let config = config.map_err(|err| anyhow!(err.display_message()))?;
        assert_eq!(config.joiner, " | ");
        Ok(())
    }

    #[test]
    fn load_config_reports_missing_files_as_validation_errors() {
        let err = load_config(Some(Path::new("/nonexistent/lexicon.json")), None).err();
        assert_eq!(err.map(|err| err.exit_code()), Some(2));
    }
}
