//! Command-line client for the Starc document API.

mod edit;
mod format;

use crate::format::{
    format_comparison, format_created, format_document, format_history, format_listing,
    format_rewrite, format_scores, format_settings, format_stats, format_suggestions,
    parse_version, version_label,
};
use anyhow::{anyhow, Context};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use starc_client::{ApiClient, ApiError};
use starc_core::models::search::SearchQuery;
use starc_core::models::DocumentId;
use starc_core::session::FileSessionStore;
use starc_core::settings::{FontSize, SettingsPatch, Theme};
use starc_core::validation::RegistrationForm;
use starc_core::{Config, Session};
use starc_editor::{HistoryPanel, RewriteEngine};
use std::io::{self, BufRead, Read};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "starc", about = "Starc document client", version)]
struct Cli {
    /// API base URL
    #[arg(short, long, env = "STARC_API_URL")]
    server: Option<String>,

    /// Print JSON instead of text
    #[arg(short, long, global = true)]
    json: bool,

    /// Request timeout in seconds
    #[arg(short = 't', long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Log in with a username or email
    Login {
        identifier: String,
        /// Read from stdin when omitted
        #[arg(long, env = "STARC_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Log in with a Google ID token
    GoogleLogin { token: String },
    /// Create an account
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Defaults to --password
        #[arg(long)]
        confirm_password: Option<String>,
    },
    /// Forget stored tokens
    Logout,
    /// Show the logged-in account
    Whoami,
    /// List or search documents
    List {
        query: Option<String>,
        #[arg(short, long, default_value = "1")]
        page: usize,
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Create a document from a file or stdin
    New {
        #[arg(long)]
        title: String,
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Print a document
    Get { id: DocumentId },
    /// Delete a document
    Delete { id: DocumentId },
    /// Show a document's tone scores
    Scores { id: DocumentId },
    /// Rewrite a document following an instruction
    Rewrite { id: DocumentId, instruction: String },
    /// List, apply, or discard rewrite suggestions
    Suggestions {
        id: DocumentId,
        #[arg(long, conflicts_with_all = ["discard", "reset"])]
        apply: Option<i64>,
        #[arg(long, conflicts_with = "reset")]
        discard: Option<i64>,
        #[arg(long)]
        reset: bool,
    },
    /// List saved versions of a document
    History { id: DocumentId },
    /// Word diff between two versions (`current` or a history entry id)
    Compare {
        id: DocumentId,
        a: String,
        b: String,
    },
    /// Download a document as PDF
    Export {
        id: DocumentId,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Upload a PDF as a new document
    Upload { file: PathBuf },
    /// Show account statistics
    Stats,
    /// Show or change display settings
    Settings {
        #[arg(long)]
        theme: Option<Theme>,
        #[arg(long)]
        font_size: Option<FontSize>,
    },
    /// Ask the writing assistant
    Chat { prompt: String },
    /// Mirror a document into a local file and autosave changes
    Edit {
        id: DocumentId,
        #[arg(short, long)]
        file: PathBuf,
    },
}

impl Commands {
    fn label(&self) -> &'static str {
        match self {
            Self::Completions { .. } => "Completions",
            Self::Login { .. } => "Login",
            Self::GoogleLogin { .. } => "Google login",
            Self::Register { .. } => "Registration",
            Self::Logout => "Logout",
            Self::Whoami => "Whoami",
            Self::List { .. } => "List",
            Self::New { .. } => "New",
            Self::Get { .. } => "Get",
            Self::Delete { .. } => "Delete",
            Self::Scores { .. } => "Scores",
            Self::Rewrite { .. } => "Rewrite",
            Self::Suggestions { .. } => "Suggestions",
            Self::History { .. } => "History",
            Self::Compare { .. } => "Compare",
            Self::Export { .. } => "Export",
            Self::Upload { .. } => "Upload",
            Self::Stats => "Stats",
            Self::Settings { .. } => "Settings",
            Self::Chat { .. } => "Chat",
            Self::Edit { .. } => "Edit",
        }
    }
}

fn init_tracing() {
    // Logs go to stderr so command output stays pipeable.
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "starc=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .try_init();
}

fn explicit_server_override(server: Option<String>) -> Option<String> {
    server.and_then(|value| {
        let trimmed = value.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// One-line failure text; authentication failures point at `starc login`.
fn failure_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ApiError>() {
        Some(api) if api.is_auth() => format!("{} (run `starc login`)", api.user_message()),
        Some(api) => api.user_message(),
        None => format!("{:#}", err),
    }
}

fn read_stdin() -> io::Result<String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}

fn read_password() -> io::Result<String> {
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn default_export_path(id: DocumentId) -> PathBuf {
    PathBuf::from(format!("document-{}.pdf", id))
}

async fn run(
    command: Commands,
    client: &ApiClient,
    config: &Config,
    json: bool,
) -> anyhow::Result<String> {
    let output = match command {
        Commands::Completions { .. } => String::new(),
        Commands::Login {
            identifier,
            password,
        } => {
            let password = match password {
                Some(password) => password,
                None => read_password()?,
            };
            client.login(&identifier, &password).await?;
            format!("Logged in as {}", identifier.trim())
        }
        Commands::GoogleLogin { token } => {
            client.google_login(&token).await?;
            "Logged in with Google".to_string()
        }
        Commands::Register {
            username,
            email,
            password,
            confirm_password,
        } => {
            let form = RegistrationForm {
                username,
                email,
                confirm_password: confirm_password.unwrap_or_else(|| password.clone()),
                password,
            };
            let request = form.into_request().map_err(|errors| {
                let details: Vec<String> = errors
                    .messages()
                    .into_iter()
                    .map(|(field, message)| format!("{}: {}", field, message))
                    .collect();
                anyhow!(details.join("; "))
            })?;
            client.register(&request).await.map_err(|err| match err {
                ApiError::BadRequest(message) if !message.trim().is_empty() => {
                    anyhow!(message)
                }
                ApiError::BadRequest(_) => anyhow!("Registration unsuccessful"),
                other => other.into(),
            })?;
            format!("Registered {}; log in to continue", request.username)
        }
        Commands::Logout => {
            client.logout()?;
            "Logged out".to_string()
        }
        Commands::Whoami => {
            if !client.session().is_authenticated() {
                return Err(ApiError::Unauthorized("Not logged in".to_string()).into());
            }
            let stats = client.user_stats().await?;
            if json {
                serde_json::to_string_pretty(&serde_json::json!({ "email": stats.email }))?
            } else {
                stats.email
            }
        }
        Commands::List { query, page, limit } => {
            let query = SearchQuery::new(
                query.unwrap_or_default(),
                limit.unwrap_or(config.search_limit),
            )
            .with_page(page);
            let listing = client.search_documents(&query).await?;
            format_listing(&listing, json)?
        }
        Commands::New { title, file } => {
            let text = match file {
                Some(path) => tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("failed to read {}", path.display()))?,
                None => read_stdin()?,
            };
            let document = client.create_document(&title, &text).await?;
            client.session().set_open_document(Some(document.id))?;
            format_created(&document, json)?
        }
        Commands::Get { id } => {
            let document = client.get_document(id).await?;
            format_document(&document, json)?
        }
        Commands::Delete { id } => {
            client.delete_document(id).await?;
            if client.session().open_document_id() == Some(id) {
                client.session().set_open_document(None)?;
            }
            format!("Deleted: {}", id)
        }
        Commands::Scores { id } => {
            let scores = client.get_scores(id).await?;
            format_scores(scores.as_ref(), json)?
        }
        Commands::Rewrite { id, instruction } => {
            let engine = RewriteEngine::new(client.clone());
            let outcome = engine.rewrite(id, &instruction).await?;
            engine.persist(id, &outcome.text).await?;
            format_rewrite(&outcome, json)?
        }
        Commands::Suggestions {
            id,
            apply,
            discard,
            reset,
        } => {
            if let Some(suggestion) = apply {
                client.apply_suggestion(id, suggestion).await?;
                format!("Applied suggestion {}", suggestion)
            } else if let Some(suggestion) = discard {
                client.delete_suggestion(id, suggestion).await?;
                format!("Discarded suggestion {}", suggestion)
            } else if reset {
                client.reset_suggestion(id).await?;
                "Suggestions reset".to_string()
            } else {
                let suggestions = client.list_suggestions(id).await?;
                format_suggestions(&suggestions, json)?
            }
        }
        Commands::History { id } => {
            let entries = client.get_history(id).await?;
            format_history(&entries, json)?
        }
        Commands::Compare { id, a, b } => {
            let first = parse_version(&a).map_err(|message| anyhow!(message))?;
            let second = parse_version(&b).map_err(|message| anyhow!(message))?;
            let (document, entries) =
                tokio::try_join!(client.get_document(id), client.get_history(id))?;
            let mut panel = HistoryPanel::with_entries(entries);
            for version in [first, second] {
                if !panel.toggle(version) {
                    return Err(anyhow!(
                        "history entry {} not found",
                        version_label(version)
                    ));
                }
            }
            let comparison = panel
                .compare(&document.text)
                .ok_or_else(|| anyhow!("select two different versions to compare"))?;
            format_comparison(&comparison, json)?
        }
        Commands::Export { id, out } => {
            let bytes = client.export_pdf(id).await?;
            let path = out.unwrap_or_else(|| default_export_path(id));
            tokio::fs::write(&path, &bytes)
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
            format!("Exported {} bytes to {}", bytes.len(), path.display())
        }
        Commands::Upload { file } => {
            client.upload_pdf(&file).await?;
            format!("Uploaded {}", file.display())
        }
        Commands::Stats => {
            let stats = client.user_stats().await?;
            format_stats(&stats, json)?
        }
        Commands::Settings { theme, font_size } => {
            let patch = SettingsPatch { theme, font_size };
            let settings = if patch.is_empty() {
                client.session().settings()
            } else {
                client.session().update_settings(patch)?
            };
            format_settings(settings, json)?
        }
        Commands::Chat { prompt } => client.chat(&prompt).await?,
        Commands::Edit { id, file } => edit::run_edit(client, config, id, &file, json).await?,
    };
    Ok(output)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Cli {
        server,
        json,
        timeout,
        command,
    } = Cli::parse();

    if let Commands::Completions { shell } = &command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    init_tracing();

    let mut config = Config::from_env();
    if let Some(server) = explicit_server_override(server) {
        config.api_url = server;
    }
    if let Some(secs) = timeout {
        config.request_timeout = Duration::from_secs(secs);
    }

    let session = Session::init(FileSessionStore::new(&config.session_path))
        .with_context(|| format!("failed to open session {}", config.session_path.display()))?;
    let client = ApiClient::from_config(&config, session)?;

    let label = command.label();
    match run(command, &client, &config, json).await {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
            Ok(())
        }
        Err(err) => {
            eprintln!("{} failed: {}", label, failure_message(&err));
            std::process::exit(1);
        }
    }
}
