//! TKG CLI - Command-line interface
//!
//! Usage:
//!   tkg classify <sentence>
//!   tkg subjects <sentence>
//!   tkg triples --file <transcript> --interviewer <id> --interviewee <id>
//!   tkg ingest --file <transcript> --interviewer <id> --interviewee <id>
//!   tkg ask <question>
//!   tkg remove --context-id <id>
//!   tkg highlight --file <transcript> --highlights <json> <query>
//!
//! Author: hephaex@gmail.com

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tkg_core::{AppConfig, LlmClient, LoggingConfig, Speakers, Triple};
use tkg_extractor::{
    BasicTripleExtractor, LexiconTagger, LlmTripleConfig, RoleTable, SubjectExtractor,
};
use tkg_graph::{GraphStore, MemoryGraphStore};
use tkg_rag::{
    create_llm_client, ContextRetriever, Highlight, HighlightPrioritiser, InterviewAssistant,
    KnowledgeGraphPipeline, LlmTripleContextRetriever, TripleContextRetriever,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tkg")]
#[command(about = "Interview transcript knowledge graph CLI")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show every analysis stage of a sentence
    Classify {
        sentence: String,
    },
    /// Print the subject phrases of a sentence
    Subjects {
        sentence: String,
    },
    /// Extract interview triples as JSON
    Triples {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        interviewer: Option<String>,
        #[arg(long)]
        interviewee: Option<String>,
    },
    /// Extract and store a transcript in the graph
    Ingest {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        interviewer: Option<String>,
        #[arg(long)]
        interviewee: Option<String>,
        /// Defaults to the file name
        #[arg(long)]
        context_id: Option<String>,
        /// Extract with the configured LLM instead of the rule-based extractor
        #[arg(long)]
        llm: bool,
    },
    /// Ask a question about the stored interviews
    Ask {
        question: String,
        /// Answer from a JSON triple file instead of the configured store
        #[arg(long)]
        triples: Option<PathBuf>,
        /// Find context through LLM-extracted query triples
        #[arg(long)]
        llm_retrieval: bool,
    },
    /// Remove every triple of a context
    Remove {
        #[arg(long)]
        context_id: String,
    },
    /// Remove everything from the graph
    Clear,
    /// Search a transcript by highlight priority
    Highlight {
        #[arg(long)]
        file: PathBuf,
        /// JSON array of {start, end, priority}
        #[arg(long)]
        highlights: PathBuf,
        query: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config.logging);

    match cli.command {
        Commands::Classify { sentence } => {
            let mut extractor = subject_extractor(&config);
            extractor.reset_sentence(&sentence)?;
            println!("{}", extractor.analysis()?);
        }
        Commands::Subjects { sentence } => {
            let mut extractor = subject_extractor(&config);
            for subject in extractor.get_subjects(Some(&sentence))? {
                println!("{subject}");
            }
        }
        Commands::Triples {
            file,
            interviewer,
            interviewee,
        } => {
            let text = read_file(&file)?;
            let speakers = speakers(&config, interviewer, interviewee);
            let triples = BasicTripleExtractor::default().get_triples(
                &text,
                &speakers.interviewer,
                &speakers.interviewee,
            )?;
            println!("{}", serde_json::to_string_pretty(&triples)?);
        }
        Commands::Ingest {
            file,
            interviewer,
            interviewee,
            context_id,
            llm,
        } => {
            let text = read_file(&file)?;
            let speakers = speakers(&config, interviewer, interviewee);
            let context_id = context_id.unwrap_or_else(|| context_from_path(&file));

            let store = tkg_graph::connect(&config.graph).await?;
            let report = if llm {
                let chunking = LlmTripleConfig {
                    chunk_sentences: config.retrieval.chunk_sentences,
                    chunk_overlap: config.retrieval.chunk_overlap,
                    ..LlmTripleConfig::default()
                };
                KnowledgeGraphPipeline::new(store)
                    .with_llm(llm_client(&config)?, chunking)
                    .ingest_with_llm(&text, &context_id)
                    .await?
            } else {
                KnowledgeGraphPipeline::new(store)
                    .ingest_transcript(
                        &text,
                        &speakers.interviewer,
                        &speakers.interviewee,
                        &context_id,
                    )
                    .await?
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Ask {
            question,
            triples,
            llm_retrieval,
        } => {
            let store: Arc<dyn GraphStore> = match triples {
                Some(path) => {
                    let triples: Vec<Triple> = serde_json::from_str(&read_file(&path)?)
                        .with_context(|| format!("Invalid triple file {}", path.display()))?;
                    info!(triples = triples.len(), "Loaded triples");
                    let context_id = context_from_path(&path);
                    Arc::new(MemoryGraphStore::from_triples(&triples, &context_id).await?)
                }
                None => tkg_graph::connect(&config.graph).await?,
            };

            let llm = llm_client(&config)?;
            let retriever: Arc<dyn ContextRetriever> = if llm_retrieval {
                Arc::new(
                    LlmTripleContextRetriever::new(Arc::clone(&llm), store)
                        .with_max_triples(config.retrieval.max_context_triples),
                )
            } else {
                Arc::new(TripleContextRetriever::with_config(
                    store,
                    Speakers::from(&config.speakers),
                    &config.retrieval,
                ))
            };

            let answer = InterviewAssistant::new(llm, retriever).answer(&question).await?;
            println!("{answer}");
        }
        Commands::Remove { context_id } => {
            let store = tkg_graph::connect(&config.graph).await?;
            let removed = store.remove_context(&context_id).await?;
            println!("Removed {removed} triples from {context_id}");
        }
        Commands::Clear => {
            let store = tkg_graph::connect(&config.graph).await?;
            store.clear().await?;
            println!("Graph cleared");
        }
        Commands::Highlight {
            file,
            highlights,
            query,
        } => {
            let text = read_file(&file)?;
            let highlights: Vec<Highlight> = serde_json::from_str(&read_file(&highlights)?)
                .context("Invalid highlight file")?;

            match HighlightPrioritiser::new(&text, &highlights).best_match(&query) {
                Some(hit) => println!("{hit}"),
                None => println!("No match for '{query}'"),
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env()?,
    };
    Ok(config)
}

fn init_tracing(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn subject_extractor(config: &AppConfig) -> SubjectExtractor {
    SubjectExtractor::new(
        Arc::new(LexiconTagger::new()),
        Arc::new(RoleTable::penn_treebank()),
        Speakers::from(&config.speakers),
    )
}

fn speakers(
    config: &AppConfig,
    interviewer: Option<String>,
    interviewee: Option<String>,
) -> Speakers {
    Speakers::new(
        interviewer.unwrap_or_else(|| config.speakers.interviewer.clone()),
        interviewee.unwrap_or_else(|| config.speakers.interviewee.clone()),
    )
}

fn llm_client(config: &AppConfig) -> anyhow::Result<Arc<dyn LlmClient>> {
    Ok(Arc::from(create_llm_client(&config.llm)?))
}

fn read_file(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn context_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "default".to_string())
}
