use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::file_entry::BencodeFileEntry;

/// Which protocol generation a torrent's info dictionary targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    V1,
    V2,
    Hybrid,
}

/// Which piece-size selection algorithm the builder should use when the
/// user doesn't pin `--piece-length` explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PieceSizeAlgorithm {
    #[default]
    Auto,
    MktorrentCompatible,
}

impl Mode {
    pub fn has_v1(self) -> bool {
        matches!(self, Mode::V1 | Mode::Hybrid)
    }

    pub fn has_v2(self) -> bool {
        matches!(self, Mode::V2 | Mode::Hybrid)
    }
}

/// A DHT bootstrap node (BEP-5), serialized as the bencoded 2-element list
/// `[host, port]` under the `nodes` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "(String, u16)", from = "(String, u16)")]
pub struct Node {
    pub host: String,
    pub port: u16,
}

impl From<Node> for (String, u16) {
    fn from(n: Node) -> Self {
        (n.host, n.port)
    }
}

impl From<(String, u16)> for Node {
    fn from((host, port): (String, u16)) -> Self {
        Node { host, port }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FileMetadata {
    pub length: u64,
    #[serde(
        rename = "pieces root",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub pieces_root: Option<serde_bytes::ByteBuf>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FileNode {
    #[serde(rename = "")]
    pub metadata: FileMetadata,
}

/// A node of the v2 `file tree` dictionary: either a file (leaf, keyed by
/// the empty string) or a subdirectory.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileTreeNode {
    File(FileNode),
    Directory(BTreeMap<String, FileTreeNode>),
}

/// Info dictionary, covering v1, v2, and hybrid fields simultaneously; the
/// builder only populates the fields relevant to the selected [`Mode`].
#[derive(Debug, Serialize, Deserialize)]
pub struct Info {
    #[serde(rename = "piece length")]
    pub piece_length: u64,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub pieces: Option<serde_bytes::ByteBuf>,

    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub private: Option<u8>,

    // Multi-file mode (v1)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub files: Option<Vec<BencodeFileEntry>>,

    // Single-file mode (v1)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub length: Option<u64>,

    // Source string (for cross-seeding)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub source: Option<String>,

    // Cross-seed random identifier (added to info dict to make hash unique)
    #[serde(
        rename = "x_cross_seed_entropy",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub x_cross_seed: Option<String>,

    // v2 fields
    #[serde(
        rename = "meta version",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub meta_version: Option<u8>,

    #[serde(
        rename = "file tree",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub file_tree: Option<BTreeMap<String, FileTreeNode>>,
}

/// Torrent metainfo structure (the value bencoded to disk as a `.torrent`
/// file).
#[derive(Debug, Serialize, Deserialize)]
pub struct Torrent {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub announce: Option<String>,

    #[serde(
        rename = "announce-list",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub announce_list: Option<Vec<Vec<String>>>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub comment: Option<String>,

    #[serde(rename = "created by")]
    pub created_by: String,

    #[serde(
        rename = "creation date",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub creation_date: Option<i64>,

    pub info: Info,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    #[serde(rename = "url-list")]
    pub url_list: Option<Vec<String>>,

    #[serde(
        rename = "piece layers",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub piece_layers: Option<BTreeMap<serde_bytes::ByteBuf, serde_bytes::ByteBuf>>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub nodes: Option<Vec<Node>>,

    /// BEP-38 similar-torrents: info-hashes (v1, 20 bytes) of torrents that
    /// share file content with this one.
    #[serde(rename = "similar", skip_serializing_if = "Option::is_none", default)]
    pub similar: Option<Vec<serde_bytes::ByteBuf>>,

    /// BEP-38 collections: free-form tags grouping related torrents.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub collections: Option<Vec<String>>,
}

/// Configuration options for building a torrent
#[derive(Debug, Clone)]
pub struct TorrentOptions {
    pub mode: Mode,
    pub piece_length: Option<u32>,
    pub piece_size_algorithm: PieceSizeAlgorithm,
    pub private: bool,
    pub comment: Option<String>,
    pub announce: Vec<String>,
    pub web_seed: Vec<String>,
    pub source_string: Option<String>,
    pub cross_seed: bool,
    pub no_date: bool,
    pub name: Option<String>,
    pub exclude: Vec<String>,
    pub nodes: Vec<Node>,
    pub similar: Vec<[u8; 20]>,
    pub collections: Vec<String>,
    pub dry_run: bool,
}

impl Torrent {
    /// BEP-3 info-hash: SHA-1 of the bencoded info dict. `None` when the
    /// info dict carries no v1 `pieces` field (pure v2 mode).
    pub fn info_hash_v1(&self) -> Option<[u8; 20]> {
        use sha1::{Digest, Sha1};
        self.info.pieces.as_ref()?;
        let bytes = serde_bencode::to_bytes(&self.info).ok()?;
        let mut out = [0u8; 20];
        out.copy_from_slice(&Sha1::digest(&bytes));
        Some(out)
    }

    /// BEP-52 info-hash: SHA-256 of the bencoded info dict. `None` when the
    /// info dict carries no `file tree` (pure v1 mode).
    pub fn info_hash_v2(&self) -> Option<[u8; 32]> {
        use sha2::{Digest, Sha256};
        self.info.file_tree.as_ref()?;
        let bytes = serde_bencode::to_bytes(&self.info).ok()?;
        let mut out = [0u8; 32];
        out.copy_from_slice(&Sha256::digest(&bytes));
        Some(out)
    }

    /// Total content size, read from whichever of `length`/`files`/`file
    /// tree` the info dict actually carries.
    pub fn total_size(&self) -> u64 {
        if let Some(length) = self.info.length {
            length
        } else if let Some(files) = &self.info.files {
            files.iter().map(|f| f.length).sum()
        } else if let Some(tree) = &self.info.file_tree {
            sum_tree(tree)
        } else {
            0
        }
    }

    /// Magnet URI for this torrent, grounded on `magnet_uri.cpp`'s
    /// `make_magnet_uri`.
    pub fn magnet_link(&self) -> String {
        crate::magnet::build_magnet_uri(self)
    }
}

fn sum_tree(tree: &BTreeMap<String, FileTreeNode>) -> u64 {
    tree.values()
        .map(|node| match node {
            FileTreeNode::File(f) => f.metadata.length,
            FileTreeNode::Directory(sub) => sum_tree(sub),
        })
        .sum()
}

/// One-line JSON summary emitted by `create --json`.
#[derive(Debug, Serialize)]
pub struct TorrentSummary {
    pub name: String,
    pub file_path: String,
    pub total_size: u64,
    pub piece_length: u64,
    pub mode: Mode,
    pub source: Option<String>,
    pub comment: Option<String>,
    pub info_hash_v1: Option<String>,
    pub info_hash_v2: Option<String>,
    pub magnet_link: String,
}

impl Default for TorrentOptions {
    fn default() -> Self {
        Self {
            mode: Mode::V1,
            piece_length: None,
            piece_size_algorithm: PieceSizeAlgorithm::default(),
            private: false,
            comment: None,
            announce: Vec::new(),
            web_seed: Vec::new(),
            source_string: None,
            cross_seed: false,
            no_date: false,
            name: None,
            exclude: Vec::new(),
            nodes: Vec::new(),
            similar: Vec::new(),
            collections: Vec::new(),
            dry_run: false,
        }
    }
}
