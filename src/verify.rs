use anyhow::{Context, Result, anyhow, bail};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use torrite::cli::VerifyArgs;
use torrite::models::{FileAttributes, FileEntry, FileStorage, FileTreeNode, Torrent};
use torrite::pipeline::{Protocol, StorageHasherOptions, StorageVerifier};

pub fn verify_torrent(args: VerifyArgs) -> Result<()> {
    let content = fs::read(&args.torrent).context("Failed to read torrent file")?;
    let torrent: Torrent = serde_bencode::from_bytes(&content).context("Invalid torrent file")?;

    let content_root = args
        .path
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default().join(&torrent.info.name));

    println!("Verifying torrent: {}", style(&torrent.info.name).bold());
    println!("Content path: {}", style(content_root.display()).cyan());

    let mut storage = build_storage_from_torrent(&torrent, &content_root)?;
    check_files_exist(&storage)?;

    let protocol = match (torrent.info.pieces.is_some(), torrent.info.file_tree.is_some()) {
        (true, true) => Protocol::Hybrid,
        (true, false) => Protocol::V1,
        (false, true) => Protocol::V2,
        (false, false) => bail!("invalid torrent: no hash data (neither v1 pieces nor v2 file tree)"),
    };

    if matches!(protocol, Protocol::V1 | Protocol::Hybrid) {
        storage.allocate_pieces();
        let pieces = torrent.info.pieces.as_ref().unwrap();
        for (i, chunk) in pieces.chunks(20).enumerate() {
            let mut hash = [0u8; 20];
            hash.copy_from_slice(chunk);
            storage.set_piece_hash(i, hash);
        }
    }

    let storage = Arc::new(Mutex::new(storage));
    let options = StorageHasherOptions {
        protocol,
        threads: args.threads.unwrap_or(0),
        ..Default::default()
    };
    let mut verifier = StorageVerifier::new(storage, options);

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}") {
        pb.set_style(style);
    }
    pb.set_message("Verifying...");
    pb.enable_steady_tick(Duration::from_millis(120));

    verifier.start()?;
    let all_matched = verifier.wait()?;
    pb.finish_and_clear();

    if all_matched {
        println!("\n{} {}", style("\u{2705}").green(), style("Verification Successful!").green().bold());
        Ok(())
    } else {
        println!("\n{} {}", style("\u{274c}").red(), style("Verification Failed!").red().bold());
        Err(anyhow!("verification failed: content does not match recorded hashes"))
    }
}

/// Reconstruct a [`FileStorage`] from a parsed `.torrent`, rooted at
/// `content_root`, carrying whatever expected v1/v2 hash data the metafile
/// recorded so the pipeline's verifiers have something to compare against.
fn build_storage_from_torrent(torrent: &Torrent, content_root: &Path) -> Result<FileStorage> {
    let mut storage = FileStorage::new();
    storage.set_root_directory(content_root.to_path_buf());

    if let Some(files) = &torrent.info.files {
        for f in files {
            let full_path = content_root.join(f.path.join("/"));
            let mut entry = FileEntry::new(f.path.clone(), f.length, full_path);
            if let Some(attr) = &f.attr {
                entry.set_attributes(FileAttributes::from_attr_string(attr));
            }
            storage.add_file(entry);
        }
    } else if let Some(length) = torrent.info.length {
        storage.add_file(FileEntry::new(vec![torrent.info.name.clone()], length, content_root.to_path_buf()));
    } else if let Some(tree) = &torrent.info.file_tree {
        flatten_tree(tree, &[], content_root, &mut storage);
    } else {
        bail!("invalid torrent info: missing files, length, or file tree");
    }

    if storage.file_count() == 0 {
        bail!("torrent contains no files");
    }

    storage.set_piece_size(torrent.info.piece_length);

    if let Some(tree) = &torrent.info.file_tree {
        let mut roots = Vec::new();
        collect_v2_roots(tree, &[], &mut roots);
        for (path, root) in roots {
            if let Some(&idx) = storage.path_index().get(&path) {
                let layer = expected_piece_layer(torrent, &root);
                storage.get_mut(idx).set_v2_data(root, layer);
            }
        }
    }

    Ok(storage)
}

/// Look up a file's expected BEP-52 piece layer from the torrent's top-level
/// `piece layers` dict, keyed by that file's `pieces_root`. Empty if the
/// torrent has no entry for this root (e.g. the file fits in a single piece,
/// per BEP-52, which never stores a layer for it).
fn expected_piece_layer(torrent: &Torrent, root: &[u8; 32]) -> Vec<[u8; 32]> {
    let Some(layers) = &torrent.piece_layers else {
        return Vec::new();
    };
    let key = serde_bytes::ByteBuf::from(root.to_vec());
    let Some(bytes) = layers.get(&key) else {
        return Vec::new();
    };
    bytes
        .chunks_exact(32)
        .map(|c| {
            let mut arr = [0u8; 32];
            arr.copy_from_slice(c);
            arr
        })
        .collect()
}

fn flatten_tree(
    tree: &BTreeMap<String, FileTreeNode>,
    prefix: &[String],
    root: &Path,
    storage: &mut FileStorage,
) {
    for (name, node) in tree {
        let mut path = prefix.to_vec();
        path.push(name.clone());
        match node {
            FileTreeNode::File(f) => {
                let full_path = root.join(path.join("/"));
                storage.add_file(FileEntry::new(path, f.metadata.length, full_path));
            }
            FileTreeNode::Directory(sub) => flatten_tree(sub, &path, root, storage),
        }
    }
}

fn collect_v2_roots(tree: &BTreeMap<String, FileTreeNode>, prefix: &[String], out: &mut Vec<(String, [u8; 32])>) {
    for (name, node) in tree {
        let mut path = prefix.to_vec();
        path.push(name.clone());
        match node {
            FileTreeNode::File(f) => {
                if let Some(root) = &f.metadata.pieces_root {
                    if root.len() == 32 {
                        let mut arr = [0u8; 32];
                        arr.copy_from_slice(root);
                        out.push((path.join("/"), arr));
                    }
                }
            }
            FileTreeNode::Directory(sub) => collect_v2_roots(sub, &path, out),
        }
    }
}

/// Stats every file the torrent expects. A missing file is not fatal here:
/// it's reported and left for the pipeline to recover as a zero-fill stream,
/// which surfaces as invalid pieces once verification runs. A size mismatch
/// on a file that *does* exist still aborts the run, since there is no
/// sensible partial-content reading to fall back on.
fn check_files_exist(storage: &FileStorage) -> Result<()> {
    let pb = ProgressBar::new(storage.file_count() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} Checking files")?
            .progress_chars("#>- "),
    );

    let mut missing = 0usize;
    for file in storage.files() {
        if file.is_padding_file() {
            continue;
        }
        match fs::metadata(file.full_path()) {
            Ok(metadata) => {
                if metadata.len() != file.file_size() {
                    pb.finish_and_clear();
                    bail!(
                        "size mismatch for file {}: expected {}, found {}",
                        file.full_path().display(),
                        file.file_size(),
                        metadata.len()
                    );
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                missing += 1;
            }
            Err(e) => {
                pb.finish_and_clear();
                return Err(e).with_context(|| {
                    format!("failed to stat file: {}", file.full_path().display())
                });
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();
    if missing > 0 {
        println!(
            "{} file(s) missing on disk; affected pieces will be reported invalid.",
            missing
        );
    } else {
        println!("All files found and sizes match.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flatten_tree_builds_sorted_offsets() {
        let mut tree = BTreeMap::new();
        tree.insert(
            "a.txt".to_string(),
            FileTreeNode::File(torrite::models::FileNode {
                metadata: torrite::models::FileMetadata { length: 100, pieces_root: None },
            }),
        );
        let mut sub = BTreeMap::new();
        sub.insert(
            "c.txt".to_string(),
            FileTreeNode::File(torrite::models::FileNode {
                metadata: torrite::models::FileMetadata { length: 200, pieces_root: None },
            }),
        );
        tree.insert("b".to_string(), FileTreeNode::Directory(sub));

        let mut storage = FileStorage::new();
        flatten_tree(&tree, &[], Path::new("/base"), &mut storage);

        assert_eq!(storage.file_count(), 2);
        assert_eq!(storage.get(0).path_str(), "a.txt");
        assert_eq!(storage.get(1).path_str(), "b/c.txt");
    }
}
