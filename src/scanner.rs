//! Directory walk (C3 input): builds a [`FileStorage`] from a source path
//! on disk, sorted by path for a deterministic info-hash.

use std::path::Path;

use glob::Pattern;
use jwalk::WalkDir;

use crate::error::{Result, TorrentError};
use crate::models::{FileEntry, FileStorage};

/// Walk `source` (a single file or a directory tree) and collect every
/// regular file into a [`FileStorage`], skipping `output_file` (the
/// `.torrent` being written, if it lives inside the source tree) and any
/// path matching one of `exclude_patterns`.
pub fn scan_files(
    source: &Path,
    output_file: Option<&Path>,
    exclude_patterns: &[String],
) -> Result<FileStorage> {
    let source = source
        .canonicalize()
        .map_err(|e| TorrentError::InvalidArgument(format!("cannot resolve {}: {e}", source.display())))?;
    let output_canonical = output_file.and_then(|p| p.canonicalize().ok());

    let mut patterns = Vec::new();
    for pattern_str in exclude_patterns {
        if let Ok(p) = Pattern::new(pattern_str) {
            patterns.push(p);
        }
    }

    let mut storage = FileStorage::new();
    storage.set_root_directory(source.clone());

    if source.is_file() {
        let name = source
            .file_name()
            .ok_or_else(|| TorrentError::InvalidArgument("source has no file name".into()))?
            .to_string_lossy()
            .to_string();
        let len = source.metadata()?.len();
        storage.add_file(FileEntry::new(vec![name], len, source));
        return Ok(storage);
    }

    let mut entries: Vec<(Vec<String>, u64, std::path::PathBuf)> = Vec::new();

    for entry in WalkDir::new(&source) {
        let entry = entry.map_err(|e| TorrentError::InvalidArgument(format!("walk failed: {e}")))?;
        if entry.file_type().is_dir() {
            continue;
        }
        let entry_path = entry.path();

        if let Some(output) = &output_canonical {
            if entry_path == *output {
                continue;
            }
        }

        let relative_path = entry_path
            .strip_prefix(&source)
            .map_err(|_| TorrentError::InvalidState("walked path outside source root".into()))?;
        let relative_str = relative_path.to_string_lossy();
        let file_name = entry.file_name().to_string_lossy();

        if patterns.iter().any(|p| p.matches(&file_name) || p.matches(&relative_str)) {
            continue;
        }

        let components: Vec<String> = relative_path
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect();
        let len = entry_path.metadata()?.len();

        entries.push((components, len, entry_path.to_path_buf()));
    }

    entries.sort_by(|a, b| a.0.cmp(&b.0));

    for (path, len, full_path) in entries {
        storage.add_file(FileEntry::new(path, len, full_path));
    }

    Ok(storage)
}

/// Generate a cross-seed entropy token: a short random hex suffix added to
/// the info dict so re-hashed torrents of identical content produce a
/// distinct info-hash (used when `--cross-seed` is set).
pub fn generate_cross_seed_entropy() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 8] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn scan_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("a.txt");
        fs::write(&file_path, b"hello").unwrap();

        let storage = scan_files(&file_path, None, &[]).unwrap();
        assert_eq!(storage.file_count(), 1);
        assert_eq!(storage.get(0).file_size(), 5);
    }

    #[test]
    fn scan_directory_sorted_and_excludes() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), b"bb").unwrap();
        fs::write(dir.path().join("a.txt"), b"a").unwrap();
        fs::write(dir.path().join("skip.tmp"), b"x").unwrap();

        let storage = scan_files(dir.path(), None, &["*.tmp".to_string()]).unwrap();
        assert_eq!(storage.file_count(), 2);
        assert_eq!(storage.get(0).path_str(), "a.txt");
        assert_eq!(storage.get(1).path_str(), "b.txt");
    }
}
