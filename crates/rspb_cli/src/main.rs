//! Command-line client for the rspb paste service.

mod render;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use render::TerminalView;
use rspb_client::{PasteClient, PasteOperations};
use rspb_core::forms::{CreateForm, DeleteForm, Expiration, FileUpload, ModifyForm, ViewForm};
use rspb_core::history::{HistoryStorage, HistoryStore, JsonFileHistory, MemoryHistory};
use rspb_core::status::{Panel, Status, StatusView};
use rspb_core::Config;
use std::io::{self, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "rspb", about = "Really Simple Paste Bin client", version)]
struct Cli {
    /// Service URL (can also be set via RSPB_SERVER env var)
    #[arg(short, long, env = "RSPB_SERVER")]
    server: Option<String>,

    /// History file (defaults to RSPB_HISTORY_PATH or ~/.cache/rspb/history.json)
    #[arg(long, global = true)]
    history: Option<PathBuf>,

    /// Neither read nor write the local paste history
    #[arg(long, global = true)]
    no_history: bool,

    /// Print cards and history entries as JSON lines
    #[arg(short, long, global = true)]
    json: bool,

    /// Request timeout in seconds
    #[arg(short = 't', long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Create a paste from TEXT, a file, or stdin
    Create {
        text: Option<String>,
        /// Upload this file instead of text
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Display name
        #[arg(short, long)]
        name: Option<String>,
        /// Expire after e.g. 90, 30m, 2h, 1d, 1w (bare numbers are minutes)
        #[arg(short, long)]
        expire: Option<Expiration>,
    },
    /// Print (or fetch) the URL of a paste
    View {
        id: String,
        /// File-extension hint for highlighting
        #[arg(short, long)]
        ext: Option<String>,
        /// Download the content to stdout instead of printing the URL
        #[arg(long)]
        fetch: bool,
    },
    /// Replace content or metadata of a paste
    Modify {
        id: String,
        text: Option<String>,
        /// Modify key (looked up in local history when omitted)
        #[arg(short, long)]
        key: Option<String>,
        #[arg(short, long)]
        file: Option<PathBuf>,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        expire: Option<Expiration>,
    },
    /// Delete a paste
    Delete {
        id: String,
        /// Modify key (looked up in local history when omitted)
        #[arg(short, long)]
        key: Option<String>,
    },
    /// List pastes created from this device
    History,
}

/// Effective settings after layering flags over the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Settings {
    server: String,
    timeout: Duration,
    history_path: Option<PathBuf>,
}

fn explicit_server_override(server: Option<&str>) -> Option<String> {
    server
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

impl Cli {
    fn settings(&self, config: Config) -> Settings {
        let history_enabled = config.history_enabled && !self.no_history;
        Settings {
            server: explicit_server_override(self.server.as_deref())
                .unwrap_or(config.server_url),
            timeout: Duration::from_secs(self.timeout.unwrap_or(config.timeout_secs)),
            history_path: history_enabled
                .then(|| self.history.clone().unwrap_or(config.history_path)),
        }
    }
}

/// Name given to binary content piped through stdin.
const STDIN_FILE_NAME: &str = "stdin";

fn read_upload(path: &Path) -> io::Result<FileUpload> {
    let bytes = std::fs::read(path)
        .map_err(|err| io::Error::new(err.kind(), format!("{}: {}", path.display(), err)))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "paste".to_string());
    Ok(FileUpload { file_name, bytes })
}

fn read_piped_stdin() -> io::Result<Vec<u8>> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(Vec::new());
    }
    let mut buffer = Vec::new();
    stdin.lock().read_to_end(&mut buffer)?;
    Ok(buffer)
}

/// Assemble the create form; `stdin` is consulted only without TEXT or a file.
///
/// Piped UTF-8 is sent as text, anything else as a file upload.
fn create_form(
    text: Option<String>,
    file: Option<&Path>,
    name: Option<String>,
    expire: Option<Expiration>,
    stdin: impl FnOnce() -> io::Result<Vec<u8>>,
) -> io::Result<CreateForm> {
    let mut file = file.map(read_upload).transpose()?;
    let text = match text {
        Some(text) => text,
        None if file.is_none() => match String::from_utf8(stdin()?) {
            Ok(text) => text,
            Err(err) => {
                file = Some(FileUpload {
                    file_name: STDIN_FILE_NAME.to_string(),
                    bytes: err.into_bytes(),
                });
                String::new()
            }
        },
        None => String::new(),
    };
    Ok(CreateForm {
        text,
        file,
        name: name.unwrap_or_default(),
        expiration: expire.unwrap_or_default(),
    })
}

fn history_storage(path: Option<PathBuf>) -> Box<dyn HistoryStorage> {
    match path {
        Some(path) => Box::new(JsonFileHistory::new(path)),
        None => Box::new(MemoryHistory::new()),
    }
}

/// Fill a missing modify key from the most recent history record for `id`.
fn key_or_remembered<S: HistoryStorage>(
    ops: &mut PasteOperations<S, TerminalView>,
    panel: Panel,
    id: &str,
    key: Option<String>,
) -> String {
    key.or_else(|| {
        ops.history()
            .fill_for(panel, id.trim())
            .and_then(|fill| fill.key)
    })
    .unwrap_or_default()
}

/// Render an input that could not be read as a Warning card.
fn reject_input<S: HistoryStorage>(
    ops: &mut PasteOperations<S, TerminalView>,
    panel: Panel,
    err: &io::Error,
) {
    tracing::debug!("{} input unreadable: {}", panel.as_str(), err);
    ops.ui_mut()
        .update_card(panel, &Status::warning(format!("Cannot read input: {}", err)));
}

/// Run one command; `Ok(false)` when it ended in a Failed card.
async fn run<S: HistoryStorage>(
    ops: &mut PasteOperations<S, TerminalView>,
    command: Commands,
) -> Result<bool, Box<dyn std::error::Error>> {
    match command {
        Commands::Completions { .. } => unreachable!("completions handled before client setup"),
        Commands::Create {
            text,
            file,
            name,
            expire,
        } => {
            let form = match create_form(text, file.as_deref(), name, expire, read_piped_stdin)
            {
                Ok(form) => form,
                Err(err) => {
                    reject_input(ops, Panel::Create, &err);
                    return Ok(false);
                }
            };
            let _ = ops.create(&form).await;
        }
        Commands::View { id, ext, fetch } => {
            let form = ViewForm {
                id,
                ext: ext.unwrap_or_default(),
            };
            let url = match ops.view(&form) {
                Ok(url) => url,
                Err(err) => {
                    tracing::debug!("view failed: {}", err);
                    return Ok(false);
                }
            };
            if fetch {
                match ops.client().fetch(url).await {
                    Ok(bytes) => io::stdout().lock().write_all(&bytes)?,
                    Err(err) => {
                        eprintln!("Failed: {}", err);
                        return Ok(false);
                    }
                }
            } else {
                println!("{}", url);
            }
        }
        Commands::Modify {
            id,
            text,
            key,
            file,
            name,
            expire,
        } => {
            let file = match file.as_deref().map(read_upload).transpose() {
                Ok(file) => file,
                Err(err) => {
                    reject_input(ops, Panel::Modify, &err);
                    return Ok(false);
                }
            };
            let key = key_or_remembered(ops, Panel::Modify, &id, key);
            let form = ModifyForm {
                id,
                key,
                text: text.unwrap_or_default(),
                file,
                name: name.unwrap_or_default(),
                expiration: expire.unwrap_or_default(),
            };
            let _ = ops.modify(&form).await;
        }
        Commands::Delete { id, key } => {
            let key = key_or_remembered(ops, Panel::Delete, &id, key);
            let _ = ops.delete(&DeleteForm { id, key }).await;
        }
        Commands::History => {
            ops.ui_mut().list(Panel::Delete);
            ops.refresh_history();
        }
    }
    Ok(!ops.ui().failed())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let settings = cli.settings(Config::from_env());
    tracing::debug!("Using {:?}", settings);
    let client = PasteClient::new(&settings.server, settings.timeout)?;
    let history = HistoryStore::new(history_storage(settings.history_path));
    let mut ops = PasteOperations::new(client, history, TerminalView::new(cli.json));

    if !run(&mut ops, cli.command).await? {
        std::process::exit(1);
    }
    Ok(())
}
