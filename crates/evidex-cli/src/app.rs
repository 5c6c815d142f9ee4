//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "evidex")]
#[command(
    author,
    version,
    about = "Parse forensic evidence into searchable cases"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (defaults to the user config directory)
    #[arg(long, global = true, env = "EVIDEX_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage cases
    Case(CaseArgs),

    /// Parse evidence files into a case
    Parse(ParseArgs),

    /// Full-text search over a case's records
    Search(SearchArgs),

    /// Show case statistics
    Status(StatusArgs),

    /// Manage bookmarked records
    Bookmark(BookmarkArgs),

    /// Manage record tags
    Tag(TagArgs),

    /// List registered parsers and their extensions
    Parsers,
}

#[derive(Args)]
pub struct CaseArgs {
    #[command(subcommand)]
    pub action: CaseAction,
}

#[derive(Subcommand)]
pub enum CaseAction {
    /// Create a new case
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        investigator: Option<String>,
    },
    /// List all cases
    List,
    /// Show case details
    Info { name: String },
    /// Remove a case and everything extracted into it
    #[command(alias = "rm")]
    Remove { name: String },
}

#[derive(Args)]
pub struct ParseArgs {
    /// Case to parse into
    pub case: String,

    /// Evidence files or directories
    #[arg(required = true)]
    pub sources: Vec<PathBuf>,

    /// Include hidden files when scanning directories
    #[arg(long)]
    pub hidden: bool,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Case to search
    pub case: String,

    /// Search query
    #[arg(required = true)]
    pub query: Vec<String>,

    /// Number of results
    #[arg(short = 'n', default_value = "20")]
    pub limit: usize,
}

#[derive(Args)]
pub struct StatusArgs {
    pub case: String,
}

#[derive(Args)]
pub struct BookmarkArgs {
    pub case: String,

    #[command(subcommand)]
    pub action: BookmarkAction,
}

#[derive(Subcommand)]
pub enum BookmarkAction {
    /// Bookmark a record (full id or unique prefix)
    Add { record: String },
    /// Remove a bookmark
    #[command(alias = "rm")]
    Remove { record: String },
    /// List bookmarked records
    List,
}

#[derive(Args)]
pub struct TagArgs {
    pub case: String,

    #[command(subcommand)]
    pub action: TagAction,
}

#[derive(Subcommand)]
pub enum TagAction {
    /// Tag a record, replacing any previous tag
    Set { record: String, tag: String },
    /// Remove a record's tag
    #[command(alias = "rm")]
    Remove { record: String },
    /// List tags and how many records carry them
    List,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Cli,
    Json,
}
