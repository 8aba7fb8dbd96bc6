use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use foldguide::api::{
    AdvisorProvider, AvatarProvider, ClaudeAdvisor, HeyGenRenderer, ProviderError,
};
use foldguide::config::Config;
use foldguide::guide::{source, GuideService};
use foldguide::logging::init_logging;
use foldguide::rest::{ApiDoc, ApiState};

#[derive(Parser)]
#[command(name = "foldguide")]
#[command(about = "Interactive step-by-step origami instruction service")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the REST API server (the default)
    Serve {
        /// Port to bind (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List built-in presets, or print one preset's steps
    Steps {
        /// Preset to print
        preset: Option<String>,
    },

    /// Print the OpenAPI specification
    Openapi,
}

fn build_advisor(config: &Config) -> Result<Option<Arc<dyn AdvisorProvider>>, ProviderError> {
    Ok(ClaudeAdvisor::from_env(Some(&config.advisor.model))?
        .map(|advisor| Arc::new(advisor) as Arc<dyn AdvisorProvider>))
}

fn build_renderer(config: &Config) -> Result<Option<Arc<dyn AvatarProvider>>, ProviderError> {
    Ok(HeyGenRenderer::from_env()?.map(|renderer| {
        Arc::new(renderer.with_poll_config(config.poll_delay(), config.avatar.poll_max_attempts))
            as Arc<dyn AvatarProvider>
    }))
}

async fn serve(config: Config, port: Option<u16>) -> Result<()> {
    let advisor = build_advisor(&config)?;
    let renderer = build_renderer(&config)?;

    if advisor.is_none() {
        tracing::warn!("FOLDGUIDE_CLAUDE_API_KEY not set; advisory endpoints disabled");
    }
    if renderer.is_none() {
        tracing::warn!("FOLDGUIDE_HEYGEN_API_KEY not set; video endpoints disabled");
    }

    let port = port.unwrap_or(config.server.port);
    let service = Arc::new(GuideService::new(&config, advisor, renderer));
    let state = ApiState::new(service);

    foldguide::rest::serve(state, port).await
}

fn print_steps(preset: Option<&str>) {
    match preset {
        Some(key) => match source::preset(key) {
            Some(text) => {
                for (index, step) in source::split_steps(text).iter().enumerate() {
                    println!("{:2}. {step}", index + 1);
                }
            }
            None => {
                eprintln!("Unknown preset '{key}'. Available presets:");
                for name in source::preset_names() {
                    eprintln!("  {name}");
                }
                std::process::exit(1);
            }
        },
        None => {
            for name in source::preset_names() {
                println!("{name}");
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;
    let _logging = init_logging(&config, cli.debug)?;

    match cli.command {
        Some(Commands::Serve { port }) => serve(config, port).await,
        Some(Commands::Steps { preset }) => {
            print_steps(preset.as_deref());
            Ok(())
        }
        Some(Commands::Openapi) => {
            println!("{}", ApiDoc::json()?);
            Ok(())
        }
        None => serve(config, None).await,
    }
}
