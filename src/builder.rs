//! Orchestrator (C12/driver caller): scans a source path, resolves the
//! piece size, runs the hashing pipeline, and assembles the resulting
//! [`Torrent`]. Grounded on the shape of `storage_hasher.cpp`'s caller in
//! `original_source/` and the teacher's own `TorrentBuilder`.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use console::style;
use indicatif::{HumanBytes, ProgressBar, ProgressStyle};

use crate::error::{Result, TorrentError};
use crate::models::{FileStorage, Mode, PieceSizeAlgorithm, Torrent, TorrentOptions};
use crate::piece::calculate_piece_length_mktorrent_compatible;
use crate::pipeline::{Protocol, StorageHasher, StorageHasherOptions};
use crate::scanner::scan_files;
use crate::serialize::build_torrent;
use crate::trackers::{TrackerConfig, find_tracker_config};

fn tracker_config_for(announce: &[String]) -> Option<&'static TrackerConfig> {
    announce.iter().find_map(|tier| find_tracker_config(tier))
}

/// Fill in a matching tracker's default source string when the caller
/// didn't set one explicitly.
fn apply_tracker_source(options: &mut TorrentOptions) {
    if options.source_string.is_some() {
        return;
    }
    if let Some(cfg) = tracker_config_for(&options.announce) {
        if let Some(default_source) = cfg.default_source {
            options.source_string = Some(default_source.to_string());
        }
    }
}

/// Builder for creating torrent files.
pub struct TorrentBuilder {
    source: PathBuf,
    options: TorrentOptions,
    output_file: Option<PathBuf>,
    verbose: bool,
    show_progress: bool,
    threads: usize,
}

impl TorrentBuilder {
    pub fn new(source: PathBuf, options: TorrentOptions) -> Self {
        Self {
            source,
            options,
            output_file: None,
            verbose: false,
            show_progress: false,
            threads: 0,
        }
    }

    /// Set the output file path for exclusion from scanning
    pub fn with_output_file(mut self, output: PathBuf) -> Self {
        self.output_file = Some(output);
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.show_progress = progress;
        self
    }

    /// Number of hasher worker threads; 0 means let the driver pick
    /// `num_cpus::get()`.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Resolve the piece size in bytes. An explicit `--piece-length` wins
    /// over the selected algorithm or tracker-specific curve, but a
    /// tracker's `max_piece_length` still caps the result either way.
    fn resolve_piece_size(&self, total: u64) -> Result<u64> {
        let tracker = tracker_config_for(&self.options.announce);

        let mut bytes = if let Some(power) = self.options.piece_length {
            if !(15..=28).contains(&power) {
                return Err(TorrentError::InvalidArgument(
                    "piece length must be between 15 and 28 (2^15 to 2^28 bytes)".into(),
                ));
            }
            1u64 << power
        } else if let Some(cfg) = tracker.filter(|c| !c.piece_size_ranges.is_empty()) {
            let power = cfg
                .piece_size_ranges
                .iter()
                .find(|r| total <= r.max_size)
                .map(|r| r.piece_exp)
                .unwrap_or(23);
            1u64 << power
        } else {
            match self.options.piece_size_algorithm {
                PieceSizeAlgorithm::Auto => FileStorage::auto_piece_size(total),
                PieceSizeAlgorithm::MktorrentCompatible => {
                    1u64 << calculate_piece_length_mktorrent_compatible(total)
                }
            }
        };

        if let Some(cfg) = tracker {
            if let Some(max_power) = cfg.max_piece_length {
                bytes = bytes.min(1u64 << max_power);
            }
        }

        Ok(bytes)
    }


    fn scan(&self) -> Result<(FileStorage, bool)> {
        let is_single_file = self.source.is_file();
        let mut storage = scan_files(&self.source, self.output_file.as_deref(), &self.options.exclude)?;
        if storage.file_count() == 0 {
            return Err(TorrentError::InvalidArgument(
                "no files found to create torrent from".into(),
            ));
        }

        let piece_size = self.resolve_piece_size(storage.total_file_size())?;
        storage.set_piece_size(piece_size);

        if self.options.mode == Mode::Hybrid && !is_single_file {
            storage.align_for_hybrid();
        }

        Ok((storage, is_single_file))
    }

    fn print_configuration(&self) {
        eprintln!("Configuration:");
        eprintln!("  Source: {}", self.source.display());
        if let Some(ref output) = self.output_file {
            eprintln!("  Output: {}", output.display());
        }
        if let Some(ref name) = self.options.name {
            eprintln!("  Name: {}", name);
        }
        if !self.options.announce.is_empty() {
            eprintln!("  Announce tiers:");
            for (i, url) in self.options.announce.iter().enumerate() {
                eprintln!("    {}: {}", i + 1, url);
            }
        }
        if let Some(ref comment) = self.options.comment {
            eprintln!("  Comment: {}", comment);
        }
        eprintln!("  Private: {}", self.options.private);
        eprintln!("  No date: {}", self.options.no_date);
        if let Some(ref source) = self.options.source_string {
            eprintln!("  Source string: {}", source);
        }
        if self.options.cross_seed {
            eprintln!("  Cross-seed: enabled");
        }
        eprintln!("  Mode: {:?}", self.options.mode);
        eprintln!();
    }

    /// Scan files and report the planned layout without hashing anything.
    pub fn dry_run(&self) -> Result<()> {
        if self.verbose {
            self.print_configuration();
        } else {
            eprintln!("{}", style("Dry run: scanning files...").bold());
        }

        let (storage, _) = self.scan()?;

        eprintln!();
        eprintln!("{}", style("Dry Run Results:").bold().underlined());
        eprintln!(
            "{:<15} {}",
            style("Total Size:").bold(),
            style(HumanBytes(storage.total_regular_file_size())).green()
        );
        eprintln!("{:<15} {}", style("File Count:").bold(), storage.file_count());
        eprintln!(
            "{:<15} {}",
            style("Piece Length:").bold(),
            style(HumanBytes(storage.piece_size())).yellow()
        );
        eprintln!("{:<15} {}", style("Piece Count:").bold(), storage.piece_count());

        if self.verbose {
            eprintln!("\n{}", style("Files that would be included:").bold());
            for file in storage.files().iter().filter(|f| !f.is_padding_file()).take(20) {
                eprintln!("  - {:<40} {}", file.path_str(), style(HumanBytes(file.file_size())).dim());
            }
            if storage.file_count() > 20 {
                eprintln!("  ... and {} more", style(storage.file_count() - 20).dim());
            }
        }

        Ok(())
    }

    /// Scan, hash, and assemble a [`Torrent`].
    pub fn build(self) -> Result<Torrent> {
        if self.verbose {
            self.print_configuration();
        }

        let (storage, is_single_file) = self.scan()?;

        if self.verbose {
            eprintln!(
                "Hashing {} across {} thread(s), mode {:?}",
                HumanBytes(storage.total_regular_file_size()),
                if self.threads == 0 { num_cpus::get() } else { self.threads },
                self.options.mode
            );
        }

        let protocol = match self.options.mode {
            Mode::V1 => Protocol::V1,
            Mode::V2 => Protocol::V2,
            Mode::Hybrid => Protocol::Hybrid,
        };

        let storage = Arc::new(Mutex::new(storage));
        let hasher_options = StorageHasherOptions {
            protocol,
            threads: self.threads,
            ..Default::default()
        };
        let mut hasher = StorageHasher::new(storage.clone(), hasher_options)?;

        let progress = if self.show_progress {
            let bar = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}") {
                bar.set_style(style);
            }
            bar.set_message("Hashing...");
            bar.enable_steady_tick(Duration::from_millis(120));
            Some(bar)
        } else {
            None
        };

        hasher.start()?;
        hasher.wait()?;

        if let Some(bar) = progress {
            bar.finish_with_message("Hashing complete");
        }

        let storage = Arc::try_unwrap(storage)
            .map_err(|_| TorrentError::InvalidState("hasher outlived its storage handle".into()))?
            .into_inner()
            .map_err(|_| TorrentError::InvalidState("storage mutex poisoned".into()))?;

        if self.verbose {
            eprintln!("Building torrent file...");
        }

        let mut options = self.options;
        apply_tracker_source(&mut options);
        build_torrent(&storage, &options, is_single_file)
    }
}
