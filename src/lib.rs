//! # torrite
//!
//! A library for creating and verifying BitTorrent v1 (BEP-3), v2 (BEP-52),
//! and hybrid metainfo files, backed by a multi-threaded hashing pipeline.
//!
//! ## Example
//!
//! ```no_run
//! use torrite::{TorrentBuilder, TorrentOptions};
//! use std::path::PathBuf;
//!
//! let options = TorrentOptions::default();
//! let builder = TorrentBuilder::new(PathBuf::from("my_file.txt"), options);
//! let torrent = builder.build().unwrap();
//! ```

pub mod builder;
pub mod cli;
pub mod config;
pub mod error;
pub mod hash;
pub mod magnet;
pub mod merkle;
pub mod models;
pub mod piece;
pub mod pipeline;
pub mod scanner;
pub mod serialize;
pub mod trackers;
pub mod tree;

pub use builder::TorrentBuilder;
pub use error::{Result, TorrentError};
pub use models::{Mode, Torrent, TorrentOptions};
