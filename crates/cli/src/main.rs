use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cli::render;
use nexa_core::config;
use nexa_core::pipeline;
use nexa_core::repository::ExpertRepository;
use nexa_core::seed;
use std::path::PathBuf;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref())?;
    let (engine, pool) = pipeline::open(&cfg).await?;

    match cli.command {
        Commands::Ingest {
            name,
            bio,
            bio_file,
            links,
            json,
        } => {
            let bio = match (bio, bio_file) {
                (Some(text), _) => text,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?,
                (None, None) => anyhow::bail!("provide --bio or --bio-file"),
            };
            let expert = engine.ingest(&name, &bio, &links).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&expert)?);
            } else {
                print!("{}", render::expert_card(&expert));
            }
        }
        Commands::Match { need, json } => {
            let matches = engine.find_matches(&need).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&matches)?);
            } else {
                print!("{}", render::match_cards(&matches));
            }
        }
        Commands::Experts { json } => {
            let experts = engine.repository().list_all().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&experts)?);
            } else {
                print!("{}", render::expert_list(&experts));
            }
        }
        Commands::Status => {
            let experts = engine.repository().list_all().await?;
            print!("{}", render::status(engine.is_live(), &experts));
        }
        Commands::Seed => {
            let n = seed::seed(engine.repository()).await?;
            println!("Seeded {} experts.", n);
        }
        Commands::Reset => {
            let n = storage::experts::delete_all(&pool).await?;
            info!("reset removed {} experts", n);
            println!("Removed {} experts.", n);
        }
    }

    Ok(())
}

#[derive(Parser)]
#[command(name = "nexa")]
#[command(about = "Expert vetting & matching engine", long_about = None)]
struct Cli {
    /// Path to config TOML
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a free-text profile and store it as an expert (upsert by name)
    Ingest {
        /// Full name; used as the dedup key
        #[arg(long)]
        name: String,
        /// Bio and case study answer
        #[arg(long, conflicts_with = "bio_file")]
        bio: Option<String>,
        /// Read the bio from a file instead
        #[arg(long)]
        bio_file: Option<PathBuf>,
        /// External links (comma-separated)
        #[arg(long, default_value = "")]
        links: String,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Match a business problem against stored experts
    Match {
        /// Free-text description of the need
        need: String,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// List stored experts
    Experts {
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Show credential mode and database contents
    Status,
    /// Insert the demo roster if the database is empty
    Seed,
    /// Delete every stored expert
    Reset,
}
