use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use client_core::{
    load_settings, CoachBackend, HttpCoachBackend, PreferenceStore, Preferences, Theme, Workflow,
    WorkflowPolicy,
};
use shared::{
    domain::{PdfFile, SyllabusId, DEFAULT_HEADING, DEFAULT_MINUTES},
    error::{WorkflowError, CHAT_FAILED, UPLOAD_FAILED},
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "coach", about = "Upload a syllabus PDF and generate study plans")]
struct Cli {
    /// Backend base url; overrides coach.toml and API_BASE.
    #[arg(long, global = true)]
    api_base: Option<String>,
    /// Lock upload and query against each other and drop responses that outlive a reset.
    #[arg(long, global = true)]
    strict: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload a PDF and print its syllabus id.
    Upload { pdf: PathBuf },
    /// Ask for a study plan on an already uploaded syllabus.
    Ask {
        #[arg(long)]
        syllabus_id: String,
        #[arg(long, default_value = DEFAULT_HEADING)]
        heading: String,
        #[arg(long, default_value_t = DEFAULT_MINUTES.to_string())]
        minutes: String,
    },
    /// Upload a PDF and immediately ask for a study plan.
    Plan {
        pdf: PathBuf,
        #[arg(long, default_value = DEFAULT_HEADING)]
        heading: String,
        #[arg(long, default_value_t = DEFAULT_MINUTES.to_string())]
        minutes: String,
    },
    /// Check that the backend is reachable.
    Health,
    /// Print the backend API docs url.
    Docs,
    /// Show or change the stored theme.
    Theme { choice: Option<ThemeChoice> },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ThemeChoice {
    Dark,
    Light,
    Toggle,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings().context("failed to load settings")?;
    if let Some(api_base) = &cli.api_base {
        settings
            .set_api_base(api_base)
            .context("invalid --api-base")?;
    }
    if cli.strict {
        settings.apply_policy(WorkflowPolicy::strict());
    }

    let store = match &settings.preferences_path {
        Some(path) => PreferenceStore::new(path),
        None => PreferenceStore::at_default_location(),
    };
    let preferences = store.load();
    debug!(theme = %preferences.theme, path = %store.path().display(), "preferences loaded");

    match cli.command {
        Command::Upload { pdf } => {
            let workflow = Workflow::from_settings(&settings)?;
            workflow.select_file(Some(read_pdf(&pdf).await?)).await;
            let syllabus_id = workflow.upload().await.map_err(upload_failure)?;
            println!("{syllabus_id}");
        }
        Command::Ask {
            syllabus_id,
            heading,
            minutes,
        } => {
            let backend = HttpCoachBackend::from_settings(&settings)?;
            let request = client_core::controller::validate_query(
                Some(&SyllabusId::new(syllabus_id)),
                &heading,
                &minutes,
            )
            .map_err(|err| chat_failure(err.into()))?;
            let response = backend.chat(&request).await.map_err(chat_failure)?;
            println!("{}", response.answer);
        }
        Command::Plan {
            pdf,
            heading,
            minutes,
        } => {
            let workflow = Workflow::from_settings(&settings)?;
            workflow.select_file(Some(read_pdf(&pdf).await?)).await;
            workflow.set_heading(heading).await;
            workflow.set_minutes(minutes).await;

            let syllabus_id = workflow.upload().await.map_err(upload_failure)?;
            info!(%syllabus_id, "syllabus uploaded; generating plan");
            let answer = workflow.ask().await.map_err(chat_failure)?;
            println!("{answer}");
        }
        Command::Health => {
            let backend = HttpCoachBackend::from_settings(&settings)?;
            let health = backend
                .health()
                .await
                .map_err(|err| anyhow!(err.display_message("Health check failed")))?;
            println!(
                "ok={} syllabi_loaded={} model={}",
                health.ok,
                health.syllabi_loaded,
                health.ollama_model.as_deref().unwrap_or("unknown")
            );
        }
        Command::Docs => println!("{}", settings.docs_url()),
        Command::Theme { choice } => {
            let theme = match choice {
                None => preferences.theme,
                Some(choice) => {
                    let theme = apply_theme_choice(preferences.theme, choice);
                    store
                        .save(&Preferences { theme })
                        .context("failed to save theme preference")?;
                    theme
                }
            };
            println!("{theme}");
        }
    }

    Ok(())
}

fn apply_theme_choice(current: Theme, choice: ThemeChoice) -> Theme {
    match choice {
        ThemeChoice::Dark => Theme::Dark,
        ThemeChoice::Light => Theme::Light,
        ThemeChoice::Toggle => current.toggled(),
    }
}

async fn read_pdf(path: &Path) -> Result<PdfFile> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "syllabus.pdf".to_string());
    Ok(PdfFile::new(name, bytes))
}

fn upload_failure(err: WorkflowError) -> anyhow::Error {
    anyhow!(err.display_message(UPLOAD_FAILED))
}

fn chat_failure(err: WorkflowError) -> anyhow::Error {
    anyhow!(err.display_message(CHAT_FAILED))
}
