use std::collections::BTreeMap;
use std::path::PathBuf;

use super::file_entry::FileEntry;
use crate::error::{Result, TorrentError};

/// Ordered list of files plus the shared piece-size/offset bookkeeping that
/// the hashing pipeline and the verifier read from and write into.
///
/// File order is authoritative: offsets, piece indices, and the `.pad/`
/// alignment pass all depend on iteration order, never on the path index.
#[derive(Debug, Default)]
pub struct FileStorage {
    files: Vec<FileEntry>,
    root_directory: PathBuf,
    piece_size: u64,
    pieces: Vec<[u8; 20]>,
    path_index: Option<BTreeMap<String, usize>>,
}

impl FileStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_root_directory(&self) -> bool {
        !self.root_directory.as_os_str().is_empty()
    }

    pub fn root_directory(&self) -> &std::path::Path {
        &self.root_directory
    }

    pub fn set_root_directory(&mut self, root: PathBuf) {
        self.root_directory = root;
    }

    pub fn add_file(&mut self, file: FileEntry) {
        self.files.push(file);
        self.path_index = None;
    }

    pub fn remove_file(&mut self, index: usize) -> FileEntry {
        let entry = self.files.remove(index);
        self.path_index = None;
        entry
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn files(&self) -> &[FileEntry] {
        &self.files
    }

    pub fn files_mut(&mut self) -> &mut [FileEntry] {
        &mut self.files
    }

    pub fn get(&self, index: usize) -> &FileEntry {
        &self.files[index]
    }

    pub fn get_mut(&mut self, index: usize) -> &mut FileEntry {
        &mut self.files[index]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FileEntry> {
        self.files.iter()
    }

    /// Lazily build (or return the cached) sorted path -> index map.
    /// Invalidated by any call to `add_file`/`remove_file`.
    pub fn path_index(&mut self) -> &BTreeMap<String, usize> {
        if self.path_index.is_none() {
            let map = self
                .files
                .iter()
                .enumerate()
                .map(|(i, f)| (f.path_str(), i))
                .collect();
            self.path_index = Some(map);
        }
        self.path_index.as_ref().unwrap()
    }

    pub fn total_file_size(&self) -> u64 {
        self.files.iter().map(|f| f.file_size()).sum()
    }

    pub fn total_regular_file_size(&self) -> u64 {
        self.files
            .iter()
            .filter(|f| !f.is_padding_file())
            .map(|f| f.file_size())
            .sum()
    }

    pub fn piece_size(&self) -> u64 {
        self.piece_size
    }

    /// Set the piece size. Clears any already-allocated v1 pieces, since
    /// they were sized for the old piece count.
    pub fn set_piece_size(&mut self, size: u64) {
        self.piece_size = size;
        self.pieces.clear();
    }

    pub fn piece_count(&self) -> u64 {
        if self.piece_size == 0 {
            return 0;
        }
        self.total_file_size().div_ceil(self.piece_size)
    }

    pub fn allocate_pieces(&mut self) {
        self.pieces = vec![[0u8; 20]; self.piece_count() as usize];
    }

    pub fn pieces(&self) -> &[[u8; 20]] {
        &self.pieces
    }

    pub fn set_piece_hash(&mut self, index: usize, hash: [u8; 20]) {
        self.pieces[index] = hash;
    }

    /// `(first_piece, last_piece_exclusive)` for the v1 piece range a file
    /// occupies, derived from prefix sums of file sizes in storage order.
    pub fn pieces_offsets(&self, file_index: usize) -> (u64, u64) {
        let mut offset = 0u64;
        for (i, f) in self.files.iter().enumerate() {
            if i == file_index {
                let first = offset / self.piece_size;
                let last = (offset + f.file_size()).div_ceil(self.piece_size);
                return (first, last);
            }
            offset += f.file_size();
        }
        (0, 0)
    }

    pub fn is_piece_aligned(&self) -> bool {
        let mut offset = 0u64;
        for f in &self.files {
            if !f.is_padding_file() && offset % self.piece_size != 0 {
                return false;
            }
            offset += f.file_size();
        }
        true
    }

    /// Alignment pass (hybrid only, spec.md §4.3): walk the file list and
    /// insert a padding entry between consecutive files wherever the next
    /// file would not otherwise start on a piece boundary.
    pub fn align_for_hybrid(&mut self) {
        if self.files.is_empty() {
            return;
        }
        let piece_size = self.piece_size;
        let mut new_files = Vec::with_capacity(self.files.len() * 2);
        let mut offset = 0u64;
        let last_index = self.files.len() - 1;

        for (i, file) in self.files.drain(..).enumerate() {
            offset += file.file_size();
            new_files.push(file);

            if i == last_index {
                continue;
            }
            let remainder = offset % piece_size;
            if remainder != 0 {
                let padding_len = piece_size - remainder;
                new_files.push(super::file_entry::FileEntry::padding(padding_len));
                offset += padding_len;
            }
        }

        self.files = new_files;
        self.path_index = None;
    }

    /// Auto-select a piece size per spec.md §4.3:
    /// `2^clamp(round(log2(total) - 9), 15, 24)`.
    pub fn auto_piece_size(total_size: u64) -> u64 {
        if total_size == 0 {
            return 1 << 15;
        }
        let log2_total = (total_size as f64).log2();
        let power = (log2_total - 9.0).round() as i64;
        let power = power.clamp(15, 24) as u32;
        1u64 << power
    }

    pub fn validate_piece_size(size: u64) -> Result<()> {
        if size < 16 * 1024 || !size.is_power_of_two() {
            return Err(TorrentError::InvalidArgument(format!(
                "piece size must be a power of two >= 16 KiB, got {size}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::file_entry::FileEntry;

    fn file(name: &str, size: u64) -> FileEntry {
        FileEntry::new(vec![name.to_string()], size, PathBuf::from(name))
    }

    #[test]
    fn align_for_hybrid_inserts_padding_between_unaligned_files() {
        let mut storage = FileStorage::new();
        storage.set_piece_size(60);
        storage.add_file(file("a.txt", 100));
        storage.add_file(file("b.txt", 200));

        storage.align_for_hybrid();

        assert_eq!(storage.file_count(), 3);
        assert!(!storage.get(0).is_padding_file());
        assert!(storage.get(1).is_padding_file());
        assert_eq!(storage.get(1).file_size(), 20);
        assert!(!storage.get(2).is_padding_file());
        assert!(storage.is_piece_aligned());
    }

    #[test]
    fn align_for_hybrid_skips_padding_after_last_file() {
        let mut storage = FileStorage::new();
        storage.set_piece_size(50);
        storage.add_file(file("a.txt", 100));
        storage.add_file(file("b.txt", 199));
        storage.align_for_hybrid();
        // last file is never followed by padding
        assert_eq!(storage.get(storage.file_count() - 1).path_str(), "b.txt");
    }

    #[test]
    fn auto_piece_size_is_power_of_two_within_bounds() {
        for total in [0u64, 1, 1024, 1 << 20, 1 << 40] {
            let size = FileStorage::auto_piece_size(total);
            assert!(size.is_power_of_two());
            assert!((1 << 15..=1 << 24).contains(&size));
        }
    }

    #[test]
    fn pieces_offsets_match_prefix_sums() {
        let mut storage = FileStorage::new();
        storage.set_piece_size(100);
        storage.add_file(file("a.txt", 150));
        storage.add_file(file("b.txt", 50));
        assert_eq!(storage.pieces_offsets(0), (0, 2));
        assert_eq!(storage.pieces_offsets(1), (1, 2));
    }
}
