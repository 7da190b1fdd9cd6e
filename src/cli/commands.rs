//! CLI command definitions and argument parsing

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(name = "wisdomrag")]
#[command(about = "Spiritual guidance grounded in the world's public-domain scriptures")]
#[command(version)]
pub struct Cli {
    /// Enable verbose debug logging (default: info level)
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file (default: config.toml, then config.example.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download scripture texts into the raw data directory
    Download {
        /// Download every tradition
        #[arg(long, conflicts_with = "tradition")]
        all: bool,
        /// Download a single tradition
        #[arg(short, long)]
        tradition: Option<String>,
        /// List the catalog and what is already downloaded
        #[arg(long)]
        list: bool,
        /// Re-download files that already exist
        #[arg(short, long)]
        force: bool,
    },
    /// Split, embed and index downloaded texts
    Index {
        /// Remove every indexed passage first
        #[arg(long)]
        clear: bool,
    },
    /// Ask the advisor a question
    Ask {
        /// The question to ask
        question: String,
        /// Restrict retrieval to these traditions (repeatable)
        #[arg(short, long = "tradition")]
        traditions: Vec<String>,
        /// Answer style (standard, prayer, journal, meditation)
        #[arg(short, long, default_value = "standard")]
        mode: String,
        /// Use the four-agent pipeline
        #[arg(long)]
        multi_agent: bool,
        /// Show the retrieved passages
        #[arg(long)]
        verbose: bool,
    },
    /// Compare how traditions approach a topic
    Compare {
        /// Topic to compare
        topic: String,
        /// Traditions to compare (repeatable, at least two)
        #[arg(short, long = "tradition")]
        traditions: Vec<String>,
    },
    /// Show today's wisdom
    Wisdom {
        /// Draw from a single tradition
        #[arg(short, long)]
        tradition: Option<String>,
    },
    /// Reflect on a journal entry
    Journal {
        /// The journal entry
        entry: String,
        /// Remember the entry under this session id
        #[arg(short, long)]
        session: Option<String>,
    },
    /// List the supported traditions and their scriptures
    Traditions,
    /// Show current configuration
    Config,
    /// Start the HTTP API server
    Serve {
        /// Host to bind to (default: from config)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind to (default: from config)
        #[arg(short, long)]
        port: Option<u16>,
        /// Enable CORS
        #[arg(long)]
        cors: bool,
    },
}
