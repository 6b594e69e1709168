use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::models::{Mode, PieceSizeAlgorithm, TorrentOptions};

#[derive(Parser, Debug)]
#[command(
    name = "torrite",
    version,
    about = "Create, verify, inspect, and edit BitTorrent metainfo files",
    author = "torrite contributors"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to a config file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new .torrent file from a file or directory
    Create(CreateArgs),
    /// Verify on-disk content against an existing .torrent file
    Verify(VerifyArgs),
    /// Print metadata about a .torrent file
    Inspect(InspectArgs),
    /// Edit fields of an existing .torrent file
    Edit(EditArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct CreateArgs {
    /// The file or directory to create a torrent from
    #[arg(value_name = "TARGET")]
    pub source: Option<PathBuf>,

    /// Announce URL tier - can be specified multiple times for backup
    /// tiers; comma-separate URLs within one tier
    #[arg(short = 'a', long = "announce", value_name = "URL")]
    pub announce: Vec<String>,

    /// Add a comment to the metainfo
    #[arg(short = 'c', long = "comment", value_name = "COMMENT")]
    pub comment: Option<String>,

    /// Don't write the creation date
    #[arg(short = 'd', long = "no-date")]
    pub no_date: bool,

    /// Exclude files matching pattern (glob) - can be comma-separated
    #[arg(short = 'e', long = "exclude", value_name = "PATTERN", value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Overwrite output file if it exists
    #[arg(short = 'f', long = "force")]
    pub force: bool,

    /// Set the piece length to 2^N bytes (e.g., 18 for 256KB)
    #[arg(short = 'l', long = "piece-length", value_name = "N")]
    pub piece_length: Option<u32>,

    /// Which algorithm picks the piece length when `--piece-length` is
    /// not given
    #[arg(long = "piece-size-algorithm", value_enum, default_value = "auto")]
    pub piece_size_algorithm: PieceSizeAlgorithmArg,

    /// Set the name of the torrent (defaults to basename of target)
    #[arg(short = 'n', long = "name", value_name = "NAME")]
    pub name: Option<String>,

    /// Set the output file path (defaults to <name>.torrent, "-" for stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Set the private flag
    #[arg(short = 'p', long = "private")]
    pub private: bool,

    /// Add source string embedded in infohash
    #[arg(short = 's', long = "source", value_name = "SOURCE")]
    pub source_string: Option<String>,

    /// Number of threads for hashing (defaults to number of CPU cores)
    #[arg(short = 't', long = "threads", value_name = "N")]
    pub threads: Option<usize>,

    /// Verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Web seed URL(s) - can be specified multiple times
    #[arg(short = 'w', long = "web-seed", value_name = "URL", value_delimiter = ',')]
    pub web_seed: Vec<String>,

    /// Ensure info hash is unique for easier cross-seeding
    #[arg(short = 'x', long = "cross-seed")]
    pub cross_seed: bool,

    /// Create a v2-only torrent (no v1 compatibility)
    #[arg(long = "v2", conflicts_with = "hybrid")]
    pub v2: bool,

    /// Create a hybrid torrent (v1 + v2 compatibility)
    #[arg(long = "hybrid", conflicts_with = "v2")]
    pub hybrid: bool,

    /// Scan files and report the planned layout without hashing anything
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Print the created torrent's info hash(es)
    #[arg(long = "info-hash")]
    pub info_hash: bool,

    /// Emit a JSON summary on stdout instead of human-readable output
    #[arg(long = "json")]
    pub json: bool,

    /// Apply defaults from a named profile in the config file
    #[arg(short = 'P', long = "profile", value_name = "NAME")]
    pub profile: Option<String>,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceSizeAlgorithmArg {
    Auto,
    MktorrentCompatible,
}

impl CreateArgs {
    /// Convert CLI arguments to TorrentOptions
    pub fn into_options(self) -> TorrentOptions {
        let mode = if self.hybrid {
            Mode::Hybrid
        } else if self.v2 {
            Mode::V2
        } else {
            Mode::V1
        };

        let piece_size_algorithm = match self.piece_size_algorithm {
            PieceSizeAlgorithmArg::Auto => PieceSizeAlgorithm::Auto,
            PieceSizeAlgorithmArg::MktorrentCompatible => PieceSizeAlgorithm::MktorrentCompatible,
        };

        TorrentOptions {
            mode,
            piece_length: self.piece_length,
            piece_size_algorithm,
            private: self.private,
            comment: self.comment,
            announce: self.announce,
            web_seed: self.web_seed,
            source_string: self.source_string,
            cross_seed: self.cross_seed,
            no_date: self.no_date,
            name: self.name,
            exclude: self.exclude,
            nodes: Vec::new(),
            similar: Vec::new(),
            collections: Vec::new(),
            dry_run: self.dry_run,
        }
    }
}

#[derive(Parser, Debug)]
pub struct VerifyArgs {
    /// The .torrent file to verify against
    #[arg(value_name = "TORRENT")]
    pub torrent: PathBuf,

    /// Path to the content (file or directory); defaults to the torrent's
    /// name in the current directory
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Number of threads for hashing (defaults to number of CPU cores)
    #[arg(short = 't', long = "threads", value_name = "N")]
    pub threads: Option<usize>,
}

#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// The .torrent file to inspect
    #[arg(value_name = "TORRENT")]
    pub torrent: PathBuf,
}

#[derive(Parser, Debug)]
pub struct EditArgs {
    /// The .torrent file to edit
    #[arg(value_name = "TORRENT")]
    pub torrent: PathBuf,

    /// Add an announce tier (repeatable)
    #[arg(short = 'a', long = "announce", value_name = "URL")]
    pub announce: Vec<String>,

    /// Replace the primary announce URL and announce-list entirely
    #[arg(long = "replace-announce", value_name = "URL")]
    pub replace_announce: Option<String>,

    /// Set the comment
    #[arg(short = 'c', long = "comment", value_name = "COMMENT")]
    pub comment: Option<String>,

    /// Set the private flag
    #[arg(short = 'p', long = "private", conflicts_with = "public")]
    pub private: bool,

    /// Clear the private flag
    #[arg(long = "public", conflicts_with = "private")]
    pub public: bool,

    /// Write the result to a different file (defaults to editing in place)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,
}
