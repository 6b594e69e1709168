use std::collections::BTreeMap;
use std::time::SystemTime;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::hash::{HashFunction, HashValue};

/// Bencode shape of one entry in the v1 `info.files` list (BEP-3 plus the
/// BEP-47 `attr`/`symlink path` extensions).
#[derive(Debug, Serialize, Deserialize)]
pub struct BencodeFileEntry {
    pub length: u64,
    pub path: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub attr: Option<String>,
    #[serde(
        rename = "symlink path",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub symlink_path: Option<Vec<String>>,
    #[serde(rename = "sha1", skip_serializing_if = "Option::is_none", default)]
    pub sha1: Option<serde_bytes::ByteBuf>,
}

bitflags! {
    /// File attribute bitmask, matching the single-letter BEP-47 `attr`
    /// string (`x` executable, `l` symlink, `h` hidden, `p` padding file).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FileAttributes: u8 {
        const EXECUTABLE   = 0b0001;
        const SYMLINK      = 0b0010;
        const HIDDEN       = 0b0100;
        const PADDING_FILE = 0b1000;
    }
}

impl FileAttributes {
    /// Render as the fixed-order `xlhp` attribute string used by BEP-47.
    pub fn to_attr_string(self) -> Option<String> {
        let mut s = String::new();
        if self.contains(FileAttributes::EXECUTABLE) {
            s.push('x');
        }
        if self.contains(FileAttributes::SYMLINK) {
            s.push('l');
        }
        if self.contains(FileAttributes::HIDDEN) {
            s.push('h');
        }
        if self.contains(FileAttributes::PADDING_FILE) {
            s.push('p');
        }
        if s.is_empty() { None } else { Some(s) }
    }

    pub fn from_attr_string(s: &str) -> Self {
        let mut attrs = FileAttributes::empty();
        for c in s.chars() {
            match c {
                'x' => attrs |= FileAttributes::EXECUTABLE,
                'l' => attrs |= FileAttributes::SYMLINK,
                'h' => attrs |= FileAttributes::HIDDEN,
                'p' => attrs |= FileAttributes::PADDING_FILE,
                _ => {}
            }
        }
        attrs
    }
}

/// One logical file in the torrent. `path` is a pure data path: a
/// slash-delimited sequence of components, never re-normalized once set.
#[derive(Debug, Clone)]
pub struct FileEntry {
    path: Vec<String>,
    file_size: u64,
    attributes: FileAttributes,
    symlink_path: Option<Vec<String>>,
    last_modified_time: Option<SystemTime>,
    checksums: BTreeMap<HashFunction, HashValue>,
    pieces_root: Option<[u8; 32]>,
    piece_layer: Vec<[u8; 32]>,
    /// Absolute on-disk path, empty for synthesized padding files.
    full_path: std::path::PathBuf,
}

impl FileEntry {
    pub fn new(path: Vec<String>, file_size: u64, full_path: std::path::PathBuf) -> Self {
        Self {
            path,
            file_size,
            attributes: FileAttributes::empty(),
            symlink_path: None,
            last_modified_time: None,
            checksums: BTreeMap::new(),
            pieces_root: None,
            piece_layer: Vec::new(),
            full_path,
        }
    }

    pub fn padding(size: u64) -> Self {
        let name = format!("{size}");
        let mut entry = Self::new(vec![".pad".to_string(), name], size, std::path::PathBuf::new());
        entry.attributes |= FileAttributes::PADDING_FILE;
        entry
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn path_str(&self) -> String {
        self.path.join("/")
    }

    pub fn full_path(&self) -> &std::path::Path {
        &self.full_path
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    pub fn attributes(&self) -> FileAttributes {
        self.attributes
    }

    pub fn set_attributes(&mut self, attrs: FileAttributes) {
        self.attributes = attrs;
    }

    pub fn is_padding_file(&self) -> bool {
        self.attributes.contains(FileAttributes::PADDING_FILE)
    }

    pub fn is_symlink(&self) -> bool {
        self.attributes.contains(FileAttributes::SYMLINK)
    }

    pub fn set_symlink_path(&mut self, target: Vec<String>) {
        self.attributes |= FileAttributes::SYMLINK;
        self.symlink_path = Some(target);
    }

    pub fn symlink_path(&self) -> Option<&[String]> {
        self.symlink_path.as_deref()
    }

    pub fn last_modified_time(&self) -> Option<SystemTime> {
        self.last_modified_time
    }

    pub fn set_last_modified_time(&mut self, t: SystemTime) {
        self.last_modified_time = Some(t);
    }

    pub fn checksums(&self) -> &BTreeMap<HashFunction, HashValue> {
        &self.checksums
    }

    pub fn set_checksum(&mut self, function: HashFunction, value: HashValue) {
        self.checksums.insert(function, value);
    }

    pub fn pieces_root(&self) -> Option<[u8; 32]> {
        self.pieces_root
    }

    pub fn piece_layer(&self) -> &[[u8; 32]] {
        &self.piece_layer
    }

    pub fn has_v2_data(&self) -> bool {
        self.pieces_root.is_some()
    }

    /// Record the result of finalizing this file's Merkle tree. Padding
    /// files and symlinks never carry v2 data (spec invariant).
    pub fn set_v2_data(&mut self, root: [u8; 32], layer: Vec<[u8; 32]>) {
        debug_assert!(!self.is_padding_file() && !self.is_symlink());
        self.pieces_root = Some(root);
        self.piece_layer = layer;
    }

    /// Project this entry into the bencode shape stored under `info.files`.
    pub fn to_bencode_entry(&self) -> BencodeFileEntry {
        BencodeFileEntry {
            length: self.file_size,
            path: self.path.clone(),
            attr: self.attributes.to_attr_string(),
            symlink_path: self.symlink_path.clone(),
            sha1: self
                .checksums
                .get(&HashFunction::Sha1)
                .map(|v| serde_bytes::ByteBuf::from(v.as_bytes().to_vec())),
        }
    }
}
