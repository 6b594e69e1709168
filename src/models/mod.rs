pub mod file_entry;
pub mod file_storage;
mod torrent;

pub use file_entry::{BencodeFileEntry, FileAttributes, FileEntry};
pub use file_storage::FileStorage;
pub use torrent::{
    FileMetadata, FileNode, FileTreeNode, Info, Mode, Node, PieceSizeAlgorithm, Torrent,
    TorrentOptions, TorrentSummary,
};
