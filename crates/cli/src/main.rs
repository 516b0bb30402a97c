//! Deckforge CLI
//!
//! Generates, refines and renders slide decks from the command line.
//! Reads `.env` first, then `DECKFORGE_*` settings, then flag overrides.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use deckforge_core::{
    DeckAgent, GenerateRequest, LlmProvider, ModelConfig, PresentationAssembler, Settings,
    TemplateStore,
};
use std::path::PathBuf;
use std::sync::{Arc, Once};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT_LOGGING: Once = Once::new();

/// Install the log subscriber. Reads `DECKFORGE_LOG`, e.g.
/// `DECKFORGE_LOG=deckforge_core=debug`.
fn init_logging() {
    INIT_LOGGING.call_once(|| {
        let filter = EnvFilter::try_from_env("DECKFORGE_LOG")
            .unwrap_or_else(|_| EnvFilter::new("deckforge_core=info,deckforge=info"));

        tracing_subscriber::registry()
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .with(filter)
            .init();
    });
}

#[derive(Parser)]
#[command(author, version, about = "Deckforge - LLM-driven slide deck generator")]
struct Args {
    /// Template directory (overrides DECKFORGE_TEMPLATE_DIR)
    #[arg(long, global = true)]
    templates: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a presentation from a topic
    Generate {
        topic: String,
        /// Template id, e.g. business_001
        #[arg(short, long)]
        template: Option<String>,
        #[arg(short, long)]
        author: Option<String>,
        /// Upper bound on the number of slides
        #[arg(short, long)]
        max_slides: Option<usize>,
        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// LLM provider: anthropic, openai or deepseek
        #[arg(short, long)]
        provider: Option<String>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        temperature: Option<f64>,
        /// Skip writing the outline JSON
        #[arg(long)]
        no_outline: bool,
    },
    /// Refine a saved outline from feedback and render it again
    Refine {
        outline: PathBuf,
        feedback: String,
        /// Output directory (defaults to the outline's directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Render a saved outline without calling the model
    Render {
        outline: PathBuf,
        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Expand one slide of a saved outline
    Expand {
        outline: PathBuf,
        slide: u32,
        /// Output file for the updated outline
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List available templates
    Templates,
    /// Show one template
    TemplateInfo { template_id: String },
}

fn apply_model_overrides(
    settings: &mut Settings,
    provider: Option<&str>,
    model: Option<String>,
) -> Result<()> {
    if let Some(provider) = provider {
        let provider: LlmProvider = provider
            .parse()
            .with_context(|| format!("unknown provider '{}'", provider))?;
        settings.model = ModelConfig::for_provider(provider);
    }
    if let Some(model) = model {
        settings.model.model = model;
    }
    Ok(())
}

async fn run(args: Args) -> Result<()> {
    let mut settings = Settings::from_env().context("failed to read DECKFORGE_* settings")?;
    if let Some(dir) = args.templates {
        settings.template_dir = dir;
    }
    tracing::debug!(
        templates = %settings.template_dir.display(),
        provider = %settings.model.provider,
        "Settings loaded"
    );

    match args.command {
        Command::Generate {
            topic,
            template,
            author,
            max_slides,
            output,
            provider,
            model,
            temperature,
            no_outline,
        } => {
            apply_model_overrides(&mut settings, provider.as_deref(), model)?;
            let agent = DeckAgent::new(settings).await.context("failed to start agent")?;

            let mut request = GenerateRequest::new(topic);
            request.template_id = template;
            request.author = author;
            request.max_slides = max_slides;
            request.output_dir = output;
            request.temperature = temperature;
            request.save_outline = !no_outline;

            let files = agent.generate_presentation(request).await?;
            println!("Presentation: {}", files.deck_path.display());
            if let Some(path) = files.outline_path {
                println!("Outline:      {}", path.display());
            }
        }
        Command::Refine {
            outline,
            feedback,
            output,
        } => {
            let agent = DeckAgent::new(settings).await.context("failed to start agent")?;
            let files = agent
                .refine_presentation(&outline, &feedback, output.as_deref())
                .await?;
            println!("Presentation: {}", files.deck_path.display());
            if let Some(path) = files.outline_path {
                println!("Outline:      {}", path.display());
            }
        }
        Command::Render { outline, output } => {
            let store = open_store(&settings).await?;
            let assembler = PresentationAssembler::new(store, &settings.output_dir);
            let path = assembler
                .render_outline_file(&outline, output.as_deref())
                .await
                .with_context(|| format!("failed to render {}", outline.display()))?;
            println!("Presentation: {}", path.display());
        }
        Command::Expand {
            outline,
            slide,
            output,
        } => {
            let agent = DeckAgent::new(settings).await.context("failed to start agent")?;
            let path = agent.expand_slide(&outline, slide, output.as_deref()).await?;
            println!("Outline: {}", path.display());
        }
        Command::Templates => {
            let templates = open_store(&settings).await?.list().await?;
            if templates.is_empty() {
                println!("No templates found");
            }
            for template in templates {
                println!(
                    "{:<16} {:<12} v{:<6} {}",
                    template.template_id, template.template_name, template.version, template.description
                );
            }
        }
        Command::TemplateInfo { template_id } => {
            let info = open_store(&settings)
                .await?
                .info(&template_id)
                .await
                .with_context(|| format!("failed to load template '{}'", template_id))?;
            println!("ID:          {}", info.template_id);
            println!("Name:        {}", info.template_name);
            println!("Version:     {}", info.version);
            println!("Description: {}", info.description);
        }
    }
    Ok(())
}

async fn open_store(settings: &Settings) -> Result<Arc<TemplateStore>> {
    let store = TemplateStore::new(&settings.template_dir)
        .await
        .with_context(|| format!("failed to open {}", settings.template_dir.display()))?;
    Ok(Arc::new(store))
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    init_logging();

    if let Err(e) = run(Args::parse()).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
