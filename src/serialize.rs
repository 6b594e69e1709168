//! Metafile assembly (C13): builds a [`Torrent`] from a fully hashed
//! [`FileStorage`] plus [`TorrentOptions`]. The actual bencode write is
//! `serde_bencode::to_bytes` — an external codec collaborator, not
//! reimplemented here.

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Result, TorrentError};
use crate::models::{Info, Mode, Torrent, TorrentOptions};
use crate::models::FileStorage;
use crate::scanner::generate_cross_seed_entropy;
use crate::tree::build_file_tree;

/// Assemble a `Torrent` from a hashed `storage` and the build `options`.
/// `storage` must already carry v1 pieces and/or v2 Merkle roots for the
/// protocol(s) `options.mode` selects.
pub fn build_torrent(
    storage: &FileStorage,
    options: &TorrentOptions,
    is_single_file: bool,
) -> Result<Torrent> {
    let name = options.name.clone().unwrap_or_else(|| {
        storage
            .root_directory()
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "output".to_string())
    });

    let (files_section, length_section) = if options.mode == Mode::V2 {
        (None, None)
    } else if is_single_file {
        (None, Some(storage.get(0).file_size()))
    } else {
        let entries = storage
            .files()
            .iter()
            .map(|f| f.to_bencode_entry())
            .collect();
        (Some(entries), None)
    };

    let pieces_section = if options.mode == Mode::V2 {
        None
    } else {
        let mut bytes = Vec::with_capacity(storage.pieces().len() * 20);
        for p in storage.pieces() {
            bytes.extend_from_slice(p);
        }
        Some(serde_bytes::ByteBuf::from(bytes))
    };

    let (file_tree, piece_layers, meta_version) = if options.mode.has_v2() {
        let tree = build_file_tree(storage);
        let mut layers = BTreeMap::new();
        for file in storage.files() {
            if file.is_padding_file() || file.is_symlink() {
                continue;
            }
            let Some(root) = file.pieces_root() else {
                continue;
            };
            if file.piece_layer().is_empty() {
                continue;
            }
            let mut value = Vec::with_capacity(file.piece_layer().len() * 32);
            for h in file.piece_layer() {
                value.extend_from_slice(h);
            }
            layers.insert(
                serde_bytes::ByteBuf::from(root.to_vec()),
                serde_bytes::ByteBuf::from(value),
            );
        }
        (Some(tree), Some(layers), Some(2u8))
    } else {
        (None, None, None)
    };

    let info = Info {
        piece_length: storage.piece_size(),
        pieces: pieces_section,
        name,
        private: if options.private { Some(1) } else { None },
        files: files_section,
        length: length_section,
        source: options.source_string.clone(),
        x_cross_seed: if options.cross_seed {
            Some(generate_cross_seed_entropy())
        } else {
            None
        },
        meta_version,
        file_tree,
    };

    let (announce, announce_list) = build_announce(&options.announce);

    let creation_date = if options.no_date {
        None
    } else {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .ok()
            .map(|d| d.as_secs() as i64)
    };

    Ok(Torrent {
        announce,
        announce_list,
        comment: options.comment.clone(),
        created_by: format!("torrite {}", env!("CARGO_PKG_VERSION")),
        creation_date,
        info,
        url_list: if options.web_seed.is_empty() {
            None
        } else {
            Some(options.web_seed.clone())
        },
        piece_layers,
        nodes: if options.nodes.is_empty() {
            None
        } else {
            Some(options.nodes.clone())
        },
        similar: if options.similar.is_empty() {
            None
        } else {
            Some(
                options
                    .similar
                    .iter()
                    .map(|h| serde_bytes::ByteBuf::from(h.to_vec()))
                    .collect(),
            )
        },
        collections: if options.collections.is_empty() {
            None
        } else {
            Some(options.collections.clone())
        },
    })
}

/// Split comma-separated announce tiers into the bencode `announce`/
/// `announce-list` pair, collapsing to a bare `announce` when there is
/// exactly one tracker in one tier.
fn build_announce(tiers: &[String]) -> (Option<String>, Option<Vec<Vec<String>>>) {
    if tiers.is_empty() {
        return (None, None);
    }
    let list: Vec<Vec<String>> = tiers
        .iter()
        .map(|tier| {
            tier.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
        })
        .filter(|tier| !tier.is_empty())
        .collect();

    if list.is_empty() {
        return (None, None);
    }
    let first = list[0][0].clone();
    if list.len() == 1 && list[0].len() == 1 {
        (Some(first), None)
    } else {
        (Some(first), Some(list))
    }
}

/// Bencode-serialize `torrent` to a byte vector, the one place this crate
/// touches the codec boundary for output.
pub fn to_bytes(torrent: &Torrent) -> Result<Vec<u8>> {
    serde_bencode::to_bytes(torrent)
        .map_err(|e| TorrentError::InvalidState(format!("failed to bencode torrent: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FileEntry;
    use std::path::PathBuf;

    #[test]
    fn single_tier_collapses_to_bare_announce() {
        let (a, list) = build_announce(&["http://a/announce".to_string()]);
        assert_eq!(a.as_deref(), Some("http://a/announce"));
        assert!(list.is_none());
    }

    #[test]
    fn multi_tier_keeps_announce_list() {
        let (a, list) = build_announce(&[
            "http://a/announce,http://b/announce".to_string(),
            "http://c/announce".to_string(),
        ]);
        assert_eq!(a.as_deref(), Some("http://a/announce"));
        assert_eq!(list.unwrap().len(), 2);
    }

    #[test]
    fn v1_multi_file_has_files_list_not_length() {
        let mut storage = FileStorage::new();
        storage.set_root_directory(PathBuf::from("root"));
        storage.set_piece_size(16 * 1024);
        storage.add_file(FileEntry::new(vec!["a.txt".to_string()], 10, PathBuf::from("a.txt")));
        storage.add_file(FileEntry::new(vec!["b.txt".to_string()], 20, PathBuf::from("b.txt")));
        storage.allocate_pieces();

        let options = TorrentOptions {
            name: Some("root".to_string()),
            ..TorrentOptions::default()
        };
        let torrent = build_torrent(&storage, &options, false).unwrap();
        assert!(torrent.info.files.is_some());
        assert!(torrent.info.length.is_none());
    }
}
