use anyhow::{Context, Result};
use clap::Parser;
use console::{Emoji, style};
use indicatif::HumanBytes;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use torrite::TorrentBuilder;
use torrite::cli::{Cli, Commands, CreateArgs};
use torrite::config::Config;
use torrite::models::TorrentSummary;

mod edit;
mod inspect;
mod verify;

use edit::edit_torrent;
use inspect::inspect_torrent;
use verify::verify_torrent;

static SUCCESS: Emoji<'_, '_> = Emoji("✅ ", "OK");
static MAGNET: Emoji<'_, '_> = Emoji("🧲 ", "MAG");

fn main() -> Result<()> {
    let cli = Cli::parse_from(args_with_implicit_create());

    // Load configuration
    let config = Config::load(cli.config)?;

    match cli.command {
        Commands::Create(args) => cmd_create(args, &config),
        Commands::Verify(args) => verify_torrent(args),
        Commands::Edit(args) => edit_torrent(args),
        Commands::Inspect(args) => inspect_torrent(args),
    }
}

/// Let `torrite <path> [flags]` work without spelling out `create`, the way
/// most users expect from a single-purpose torrent tool.
fn args_with_implicit_create() -> Vec<String> {
    let args: Vec<String> = std::env::args().collect();
    const SUBCOMMANDS: &[&str] = &["create", "verify", "inspect", "edit", "help"];
    const GLOBAL_FLAGS: &[&str] = &["-h", "--help", "-V", "--version"];

    match args.get(1) {
        Some(first)
            if SUBCOMMANDS.contains(&first.as_str()) || GLOBAL_FLAGS.contains(&first.as_str()) =>
        {
            args
        }
        Some(_) => {
            let mut out = Vec::with_capacity(args.len() + 1);
            out.push(args[0].clone());
            out.push("create".to_string());
            out.extend(args.into_iter().skip(1));
            out
        }
        None => args,
    }
}

fn cmd_create(mut args: CreateArgs, config: &Config) -> Result<()> {
    // Apply profile if specified
    if let Some(profile_name) = &args.profile {
        if let Some(profile) = config.profiles.get(profile_name) {
            if !args.json {
                eprintln!(
                    "{} Using profile: {}",
                    style("ℹ️").blue(),
                    style(profile_name).bold()
                );
            }

            if args.announce.is_empty() {
                if let Some(announce) = &profile.announce {
                    if !args.json {
                        eprintln!("  {:<15} {}", style("Announce:").dim(), announce.join(", "));
                    }
                    args.announce = announce.clone();
                }
            }

            if args.comment.is_none() {
                if let Some(comment) = &profile.comment {
                    if !args.json {
                        eprintln!("  {:<15} {}", style("Comment:").dim(), comment);
                    }
                    args.comment = Some(comment.clone());
                }
            }

            if !args.private {
                if let Some(true) = profile.private {
                    if !args.json {
                        eprintln!("  {:<15} {}", style("Private:").dim(), true);
                    }
                    args.private = true;
                }
            }

            if args.piece_length.is_none() {
                if let Some(piece_length) = profile.piece_length {
                    if !args.json {
                        eprintln!(
                            "  {:<15} 2^{} ({})",
                            style("Piece Length:").dim(),
                            piece_length,
                            HumanBytes(1u64 << piece_length)
                        );
                    }
                    args.piece_length = Some(piece_length);
                }
            }

            if args.threads.is_none() {
                if let Some(threads) = profile.threads {
                    if !args.json {
                        eprintln!("  {:<15} {}", style("Threads:").dim(), threads);
                    }
                    args.threads = Some(threads);
                }
            }

            if args.web_seed.is_empty() {
                if let Some(web_seed) = &profile.web_seed {
                    if !args.json {
                        eprintln!(
                            "  {:<15} {}",
                            style("Web Seeds:").dim(),
                            web_seed.join(", ")
                        );
                    }
                    args.web_seed = web_seed.clone();
                }
            }

            if !args.cross_seed {
                if let Some(true) = profile.cross_seed {
                    if !args.json {
                        eprintln!("  {:<15} {}", style("Cross-seed:").dim(), true);
                    }
                    args.cross_seed = true;
                }
            }

            // Handle mode flags (v2/hybrid)
            // If neither v2 nor hybrid is set in args, check profile
            if !args.v2 && !args.hybrid {
                if let Some(true) = profile.v2 {
                    if !args.json {
                        eprintln!("  {:<15} {}", style("Mode:").dim(), "V2");
                    }
                    args.v2 = true;
                } else if let Some(true) = profile.hybrid {
                    if !args.json {
                        eprintln!("  {:<15} {}", style("Mode:").dim(), "Hybrid");
                    }
                    args.hybrid = true;
                }
            }

            if args.exclude.is_empty() {
                if let Some(exclude) = &profile.exclude {
                    if !args.json {
                        eprintln!("  {:<15} {}", style("Exclude:").dim(), exclude.join(", "));
                    }
                    args.exclude = exclude.clone();
                }
            }

            if args.source_string.is_none() {
                if let Some(source) = &profile.source_string {
                    if !args.json {
                        eprintln!("  {:<15} {}", style("Source:").dim(), source);
                    }
                    args.source_string = Some(source.clone());
                }
            }

            if !args.no_date {
                if let Some(true) = profile.no_date {
                    if !args.json {
                        eprintln!("  {:<15} {}", style("No Date:").dim(), true);
                    }
                    args.no_date = true;
                }
            }

            if !args.json {
                eprintln!();
            }
        } else {
            anyhow::bail!("Profile '{}' not found in configuration", profile_name);
        }
    }

    let verbose = args.verbose;
    let force = args.force;
    let threads = args.threads;
    let show_info_hash = args.info_hash;
    let use_json = args.json;
    
    // Ensure source is present
    let source = args.source.clone().ok_or_else(|| anyhow::anyhow!("No source selected"))?;

    // Determine output file path
    let output_path = if let Some(path) = args.output.clone() {
        path
    } else {
        let name = args.name.clone().unwrap_or_else(|| {
            source
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("output")
                .to_string()
        });
        PathBuf::from(format!("{}.torrent", name))
    };

    let is_stdout = output_path.to_str() == Some("-");

    // Convert args to options
    let options = args.clone().into_options();
    let mode = options.mode; // Capture mode before options is moved into TorrentBuilder
    let is_dry_run = options.dry_run;

    // Build the torrent
    let mut builder = TorrentBuilder::new(source.clone(), options)
        .with_output_file(output_path.clone())
        .with_verbose(verbose)
        .with_progress(!use_json);

    if let Some(t) = threads {
        builder = builder.with_threads(t);
    }

    if is_dry_run {
        builder.dry_run()?;
        return Ok(());
    }

    let torrent = builder.build()?;

    // Serialize to bencode
    let bencode_data =
        serde_bencode::to_bytes(&torrent).context("Failed to serialize torrent to bencode")?;

    // Write to file or stdout
    if is_stdout {
        let mut stdout = std::io::stdout();
        stdout
            .write_all(&bencode_data)
            .context("Failed to write torrent to stdout")?;
    } else {
        if verbose && !use_json {
            eprintln!("Writing to: {}", output_path.display());
        }

        let mut output_file = if force {
            File::create(&output_path).context("Failed to create output file")?
        } else {
            File::options()
                .write(true)
                .create_new(true)
                .open(&output_path)
                .with_context(|| {
                    format!(
                        "Failed to create output file (use -f to overwrite): {}",
                        output_path.display()
                    )
                })?
        };

        output_file
            .write_all(&bencode_data)
            .context("Failed to write torrent file")?;
    }

    if use_json {
        let summary = TorrentSummary {
            name: torrent.info.name.clone(),
            file_path: if is_stdout {
                "-".to_string()
            } else {
                output_path.to_string_lossy().into_owned()
            },
            total_size: torrent.total_size(),
            piece_length: torrent.info.piece_length,
            mode,
            source: torrent.info.source.clone(),
            comment: torrent.comment.clone(),
            info_hash_v1: torrent.info_hash_v1().map(hex::encode),
            info_hash_v2: torrent.info_hash_v2().map(hex::encode),
            magnet_link: torrent.magnet_link(),
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else if !is_stdout {
        if verbose {
            eprintln!(
                "{} {}",
                SUCCESS,
                style(format!(
                    "Success! Torrent file created: {}",
                    output_path.display()
                ))
                .green()
            );
        } else {
            eprintln!(
                "{} Created: {}",
                SUCCESS,
                style(output_path.display()).cyan()
            );
        }

        eprintln!("{:<12} {}", style("Name:").bold(), torrent.info.name);
        eprintln!(
            "{:<12} {}",
            style("Total Size:").bold(),
            HumanBytes(torrent.total_size())
        );
        eprintln!(
            "{:<12} {}",
            style("Piece Size:").bold(),
            HumanBytes(torrent.info.piece_length)
        );

        if show_info_hash {
            if let Some(h1) = torrent.info_hash_v1() {
                eprintln!("{:<12} {}", style("Info Hash v1:").bold(), hex::encode(h1));
            }
            if let Some(h2) = torrent.info_hash_v2() {
                eprintln!("{:<12} {}", style("Info Hash v2:").bold(), hex::encode(h2));
            }
        }

        eprintln!("\n{} {}", MAGNET, style("Magnet Link:").bold());
        eprintln!("{}", style(torrent.magnet_link()).underlined());
    }

    Ok(())
}
