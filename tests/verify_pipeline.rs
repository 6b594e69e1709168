use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use torrite::models::{FileEntry, FileStorage};
use torrite::pipeline::{Protocol, StorageHasher, StorageHasherOptions, StorageVerifier};
use torrite::{Mode, TorrentBuilder, TorrentOptions};

const PIECE_SIZE: u64 = 32768;

/// Corrupting a single byte in the second of two pieces must invalidate
/// only that piece, not the whole file's piece range.
#[test]
fn corrupt_byte_flags_only_its_own_piece() {
    let tmp_dir = std::env::temp_dir().join("torrite_corrupt_byte_piece");
    if tmp_dir.exists() {
        std::fs::remove_dir_all(&tmp_dir).unwrap();
    }
    std::fs::create_dir_all(&tmp_dir).unwrap();

    let file_path = tmp_dir.join("content.bin");
    let original: Vec<u8> = (0..(PIECE_SIZE as usize * 2)).map(|i| (i % 251) as u8).collect();
    File::create(&file_path).unwrap().write_all(&original).unwrap();

    let mut options = TorrentOptions::default();
    options.mode = Mode::V1;
    options.piece_length = Some(15); // 2^15 = 32768

    let torrent = TorrentBuilder::new(file_path.clone(), options).build().unwrap();
    let pieces = torrent.info.pieces.clone().unwrap();
    assert_eq!(pieces.len(), 40); // two 20-byte piece hashes

    // Flip one byte inside the second piece, leaving the first untouched.
    let corrupt_offset = PIECE_SIZE + 10;
    let mut file = std::fs::OpenOptions::new().write(true).read(true).open(&file_path).unwrap();
    let mut byte = [0u8; 1];
    file.seek(SeekFrom::Start(corrupt_offset)).unwrap();
    file.read_exact(&mut byte).unwrap();
    file.seek(SeekFrom::Start(corrupt_offset)).unwrap();
    file.write_all(&[byte[0].wrapping_add(1)]).unwrap();
    drop(file);

    let mut storage = FileStorage::new();
    storage.add_file(FileEntry::new(vec!["content.bin".to_string()], original.len() as u64, file_path.clone()));
    storage.set_piece_size(PIECE_SIZE);
    storage.allocate_pieces();
    for (i, chunk) in pieces.chunks(20).enumerate() {
        let mut hash = [0u8; 20];
        hash.copy_from_slice(chunk);
        storage.set_piece_hash(i, hash);
    }

    let storage = Arc::new(Mutex::new(storage));
    let mut verifier = StorageVerifier::new(
        storage,
        StorageHasherOptions { protocol: Protocol::V1, ..Default::default() },
    );
    verifier.start().unwrap();
    let all_matched = verifier.wait().unwrap();

    assert!(!all_matched);
    assert_eq!(verifier.percentage(0..1), 100.0);
    assert_eq!(verifier.percentage(1..2), 0.0);

    std::fs::remove_dir_all(&tmp_dir).unwrap();
}

/// A missing file on disk must surface as invalid pieces, not a fatal error.
#[test]
fn missing_file_is_recovered_as_invalid_pieces() {
    let tmp_dir = std::env::temp_dir().join("torrite_missing_file_verify");
    if tmp_dir.exists() {
        std::fs::remove_dir_all(&tmp_dir).unwrap();
    }
    std::fs::create_dir_all(&tmp_dir).unwrap();

    let file_path = tmp_dir.join("content.bin");
    let original = vec![7u8; PIECE_SIZE as usize];
    File::create(&file_path).unwrap().write_all(&original).unwrap();

    let mut options = TorrentOptions::default();
    options.mode = Mode::V1;
    options.piece_length = Some(15);
    let torrent = TorrentBuilder::new(file_path.clone(), options).build().unwrap();
    let pieces = torrent.info.pieces.clone().unwrap();

    std::fs::remove_file(&file_path).unwrap();

    let mut storage = FileStorage::new();
    storage.add_file(FileEntry::new(vec!["content.bin".to_string()], original.len() as u64, file_path.clone()));
    storage.set_piece_size(PIECE_SIZE);
    storage.allocate_pieces();
    for (i, chunk) in pieces.chunks(20).enumerate() {
        let mut hash = [0u8; 20];
        hash.copy_from_slice(chunk);
        storage.set_piece_hash(i, hash);
    }

    let storage = Arc::new(Mutex::new(storage));
    let mut verifier = StorageVerifier::new(
        storage,
        StorageHasherOptions { protocol: Protocol::V1, ..Default::default() },
    );
    verifier.start().unwrap();
    let all_matched = verifier.wait().unwrap();

    assert!(!all_matched);
    assert_eq!(verifier.percentage(0..1), 0.0);

    std::fs::remove_dir_all(&tmp_dir).unwrap();
}

/// Cancelling a hashing run against a large file under a tight queue must
/// return promptly instead of draining the whole file first.
#[test]
fn cancel_hasher_returns_promptly_under_load() {
    let tmp_dir = std::env::temp_dir().join("torrite_cancel_hasher");
    if tmp_dir.exists() {
        std::fs::remove_dir_all(&tmp_dir).unwrap();
    }
    std::fs::create_dir_all(&tmp_dir).unwrap();

    let file_path = tmp_dir.join("big.bin");
    {
        let mut file = File::create(&file_path).unwrap();
        let chunk = vec![0u8; 1 << 20];
        for _ in 0..512 {
            file.write_all(&chunk).unwrap();
        }
    }

    let mut storage = FileStorage::new();
    let file_len = std::fs::metadata(&file_path).unwrap().len();
    storage.add_file(FileEntry::new(vec!["big.bin".to_string()], file_len, file_path.clone()));

    let storage = Arc::new(Mutex::new(storage));
    let options = StorageHasherOptions {
        protocol: Protocol::V1,
        threads: 2,
        min_chunk_size: 1 << 15,
        queue_capacity: 4,
        ..Default::default()
    };
    let mut hasher = StorageHasher::new(storage, options).unwrap();
    hasher.start().unwrap();

    std::thread::sleep(Duration::from_millis(10));
    let started = Instant::now();
    hasher.cancel().unwrap();
    let elapsed = started.elapsed();

    assert!(hasher.is_cancelled());
    assert!(elapsed < Duration::from_millis(100), "cancel took {elapsed:?}");

    std::fs::remove_dir_all(&tmp_dir).unwrap();
}
