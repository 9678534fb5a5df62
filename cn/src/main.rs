//! ConceptNote CLI entry point

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tracing::{debug, info, warn};

use conceptnote::cli::{Cli, Command};
use conceptnote::config::Config;
use conceptnote::domain::{CatalogueProvider, Project, StaticCatalogue, Store, YamlCatalogue};
use conceptnote::ingest::{PlainTextExtractor, TextExtractor};
use conceptnote::llm::create_client;
use conceptnote::prompts::PromptLoader;
use conceptnote::render::PlainTextRenderer;
use conceptnote::stage::{Clarification, StageController};

fn setup_logging(cli_log_level: Option<&str>) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("conceptnote")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Priority: CLI --log-level > default (INFO)
    let level = match cli_log_level.map(str::to_uppercase).as_deref() {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("INFO") | None => tracing::Level::INFO,
        Some("WARN") | Some("WARNING") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        Some(other) => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", other);
            tracing::Level::INFO
        }
    };

    let log_file = fs::File::create(log_dir.join("conceptnote.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

fn build_catalogue(config: &Config) -> Result<Arc<dyn CatalogueProvider>> {
    if config.catalogue_path.exists() {
        debug!(path = ?config.catalogue_path, "build_catalogue: loading manifest");
        Ok(Arc::new(YamlCatalogue::load(&config.catalogue_path)?))
    } else {
        warn!(path = ?config.catalogue_path, "build_catalogue: no manifest found, catalogue is empty");
        Ok(Arc::new(StaticCatalogue::new(Vec::new())))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!("ConceptNote loaded config: provider={}", config.llm.provider);

    let store = Arc::new(Store::open(&config.db_path).context("Failed to open project store")?);

    // Session inspection works without an API key
    debug!(command = ?cli.command, "main: dispatching command");
    match &cli.command {
        Command::List => return cmd_list(&store),
        Command::Show { session_id } => return cmd_show(&store, session_id),
        _ => {}
    }

    let llm = create_client(&config.llm).context("Failed to create generation client")?;
    let prompts = Arc::new(PromptLoader::new(std::env::current_dir()?));
    let catalogue = build_catalogue(&config)?;
    let controller = StageController::new(
        store,
        llm,
        prompts,
        catalogue,
        Arc::new(PlainTextRenderer::new()),
        config.supporting_text_limit,
    );

    match cli.command {
        Command::New {
            description,
            highlights,
            attach,
        } => {
            let extractor = PlainTextExtractor::new();
            let mut supporting_text = String::new();
            for path in &attach {
                let text = extractor
                    .extract(path)
                    .with_context(|| format!("Failed to extract {}", path.display()))?;
                if !supporting_text.is_empty() {
                    supporting_text.push('\n');
                }
                supporting_text.push_str(&text);
            }

            let outcome = controller
                .initiate(&description, highlights.as_deref().unwrap_or(""), &supporting_text)
                .await?;

            println!("{} {}", "Session:".bold(), outcome.session_id.green());
            println!("\n{}", "Answer these before the preview:".bold());
            for (i, question) in outcome.questions.iter().enumerate() {
                println!("  {}. {}", i + 1, question.question);
            }
        }

        Command::AnswerPre { session_id, answers } => {
            let project = controller.answer_pre_questions(&session_id, answers)?;
            println!("{} {} answers recorded", "OK".green().bold(), project.pre_stage_answers.len());
        }

        Command::Preview { session_id } => {
            let preview = controller.generate_preview(&session_id).await?;
            println!("{}", preview);
        }

        Command::Clarify { session_id } => match controller.next_clarification(&session_id).await? {
            Clarification::Question(question) => {
                println!("{} {}", "Question:".bold(), question);
            }
            Clarification::Done => {
                println!("{}", "No more questions needed.".green());
            }
        },

        Command::Answer { session_id, answer } => {
            let project = controller.answer_clarification(&session_id, &answer)?;
            println!(
                "{} {}/{} clarifications recorded",
                "OK".green().bold(),
                project.clarification_count(),
                conceptnote::MAX_CLARIFICATIONS
            );
        }

        Command::Recommend { session_id } => {
            let recommendations = controller.get_recommendations(&session_id).await?;
            println!("{}", "INTERNAL MATCHES".bold());
            println!("{}\n", recommendations.internal);
            println!("{}", "EXTERNAL SUGGESTIONS".bold());
            println!("{}", recommendations.external);
        }

        Command::Finalize {
            session_id,
            internal,
            external,
        } => {
            let document = controller.finalize(&session_id, internal, external).await?;
            println!("{}", document);
        }

        Command::Export { session_id, output } => {
            let artifact = controller.export(&session_id)?;
            fs::write(&output, &artifact).with_context(|| format!("Failed to write {}", output.display()))?;
            println!("{} wrote {} bytes to {}", "OK".green().bold(), artifact.len(), output.display());
        }

        Command::List | Command::Show { .. } => unreachable!("handled before client setup"),
    }

    Ok(())
}

fn cmd_list(store: &Store) -> Result<()> {
    let projects: Vec<Project> = store.list()?;
    if projects.is_empty() {
        println!("No sessions yet.");
        return Ok(());
    }

    println!("{:<20} {:<16} {}", "SESSION".bold(), "STAGE".bold(), "DESCRIPTION".bold());
    for project in projects {
        let description: String = project.raw_input.chars().take(60).collect();
        println!("{:<20} {:<16} {}", project.id.green(), project.stage.to_string(), description);
    }
    Ok(())
}

fn cmd_show(store: &Store, session_id: &str) -> Result<()> {
    let project: Project = store.get(session_id)?;

    println!("{} {}", "Session:".bold(), project.id.green());
    println!("{} {}", "Stage:".bold(), project.stage);
    if let Some(ref name) = project.client_name {
        println!("{} {}", "Client:".bold(), name);
    }
    println!("\n{}\n{}", "Input:".bold(), project.raw_input);

    if !project.preview.is_empty() {
        println!("\n{}\n{}", "Preview:".bold(), project.preview);
    }
    if !project.conversation_history.is_empty() {
        println!("\n{}\n{}", "Clarifications:".bold(), project.qa_transcript());
    }
    if let Some(ref pending) = project.pending_question {
        println!("\n{} {}", "Pending question:".bold(), pending.yellow());
    }
    if project.has_recommendations() {
        println!("\n{}\n{}", "Internal matches:".bold(), project.internal_recommendation);
        println!("\n{}\n{}", "External suggestions:".bold(), project.external_recommendation);
    }
    if !project.final_document.is_empty() {
        println!("\n{}\n{}", "Final document:".bold(), project.final_document);
    }
    Ok(())
}
