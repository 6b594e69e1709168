use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use super::checksum::ChecksumHasher;
use super::hash_v1::V1ChunkHasher;
use super::hash_v2::{HybridFileLayout, V2ChunkHasher};
use super::reader::{ChunkReader, V1ChunkReader, V2ChunkReader};
use super::verifier::{PieceMap, V1PieceVerifier, V2PieceVerifier};
use super::writer::{V1PieceWriter, V2PieceWriter};
use crate::error::{Result, TorrentError};
use crate::hash::HashFunction;
use crate::models::FileStorage;

/// Which protocol generation the hashing run targets; mirrors
/// [`crate::models::Mode`] but lives in the pipeline so the driver doesn't
/// have to depend on the builder-facing model type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    V1,
    V2,
    Hybrid,
}

pub struct StorageHasherOptions {
    pub protocol: Protocol,
    /// Number of hasher worker threads; 0 means `num_cpus::get()`.
    pub threads: usize,
    pub checksums: Vec<HashFunction>,
    /// Floor on the reader's read granularity; the effective chunk size is
    /// `max(min_chunk_size, piece_size)`.
    pub min_chunk_size: u64,
    pub queue_capacity: usize,
}

impl Default for StorageHasherOptions {
    fn default() -> Self {
        Self {
            protocol: Protocol::V1,
            threads: 0,
            checksums: Vec::new(),
            min_chunk_size: 1 << 20,
            queue_capacity: 64,
        }
    }
}

fn hybrid_layouts(storage: &FileStorage) -> Arc<Vec<HybridFileLayout>> {
    let last_index = storage.file_count().saturating_sub(1);
    Arc::new(
        (0..storage.file_count())
            .map(|i| {
                let (first, _) = storage.pieces_offsets(i);
                HybridFileLayout {
                    first_piece_index: first,
                    is_last_file: i == last_index,
                }
            })
            .collect(),
    )
}

/// Wires the reader, hashers, writers, and checksum hashers together and
/// drives their `start`/`wait` sequencing (C12), grounded on
/// `storage_hasher.cpp`.
pub struct StorageHasher {
    storage: Arc<Mutex<FileStorage>>,
    options: StorageHasherOptions,
    reader: Option<Arc<dyn ChunkReader>>,
    reader_thread: Option<JoinHandle<Result<()>>>,
    v1_hasher: Option<V1ChunkHasher>,
    v2_hasher: Option<V2ChunkHasher>,
    v1_writer: Option<V1PieceWriter>,
    v2_writer: Option<V2PieceWriter>,
    checksum_hashers: Vec<ChecksumHasher>,
    started: bool,
    cancelled: Arc<AtomicBool>,
}

impl StorageHasher {
    pub fn new(storage: Arc<Mutex<FileStorage>>, options: StorageHasherOptions) -> Result<Self> {
        {
            let mut s = storage.lock().unwrap();
            if s.piece_size() == 0 {
                let size = FileStorage::auto_piece_size(s.total_file_size());
                s.set_piece_size(size);
            }
            FileStorage::validate_piece_size(s.piece_size())?;
            if matches!(options.protocol, Protocol::V1 | Protocol::Hybrid) {
                s.allocate_pieces();
            }
        }

        Ok(Self {
            storage,
            options,
            reader: None,
            reader_thread: None,
            v1_hasher: None,
            v2_hasher: None,
            v1_writer: None,
            v2_writer: None,
            checksum_hashers: Vec::new(),
            started: false,
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn start(&mut self) -> Result<()> {
        if self.started {
            return Err(TorrentError::InvalidState("hasher already started".into()));
        }
        let piece_size = self.storage.lock().unwrap().piece_size();
        let chunk_size = self.options.min_chunk_size.max(piece_size);
        let cap = self.options.queue_capacity;

        let mut checksum_queues = Vec::new();
        for function in &self.options.checksums {
            let mut ch = ChecksumHasher::new(cap);
            ch.start(*function, self.storage.clone());
            checksum_queues.push(ch.queue().clone());
            self.checksum_hashers.push(ch);
        }

        let reader: Arc<dyn ChunkReader> = match self.options.protocol {
            Protocol::V1 => Arc::new(V1ChunkReader::new(chunk_size, false)),
            Protocol::V2 | Protocol::Hybrid => Arc::new(V2ChunkReader::new(chunk_size, false)),
        };

        let mut hash_queues = Vec::new();

        match self.options.protocol {
            Protocol::V1 => {
                let mut writer = V1PieceWriter::new(cap);
                writer.start(1, self.storage.clone());
                let mut hasher = V1ChunkHasher::new(cap);
                hasher.start(self.options.threads, piece_size, writer.queue().clone());
                hash_queues.push(hasher.queue().clone());
                self.v1_hasher = Some(hasher);
                self.v1_writer = Some(writer);
            }
            Protocol::V2 => {
                let mut writer = V2PieceWriter::new(cap);
                writer.start(1, piece_size, self.storage.clone());
                let mut hasher = V2ChunkHasher::new(cap);
                hasher.start(self.options.threads, piece_size, writer.queue().clone(), None);
                hash_queues.push(hasher.queue().clone());
                self.v2_hasher = Some(hasher);
                self.v2_writer = Some(writer);
            }
            Protocol::Hybrid => {
                let layouts = hybrid_layouts(&self.storage.lock().unwrap());

                let mut v1_writer = V1PieceWriter::new(cap);
                v1_writer.start(1, self.storage.clone());
                let mut v2_writer = V2PieceWriter::new(cap);
                v2_writer.start(1, piece_size, self.storage.clone());

                let mut hasher = V2ChunkHasher::new(cap);
                hasher.start(
                    self.options.threads,
                    piece_size,
                    v2_writer.queue().clone(),
                    Some((layouts, v1_writer.queue().clone())),
                );
                hash_queues.push(hasher.queue().clone());
                self.v2_hasher = Some(hasher);
                self.v1_writer = Some(v1_writer);
                self.v2_writer = Some(v2_writer);
            }
        }

        let mut consumers = hash_queues;
        consumers.extend(checksum_queues);

        let storage = self.storage.clone();
        let reader_for_thread = reader.clone();
        let cancelled_for_reader = self.cancelled.clone();
        self.reader = Some(reader);
        self.reader_thread = Some(std::thread::spawn(move || {
            reader_for_thread.run(storage, &consumers, &cancelled_for_reader)
        }));

        self.started = true;
        Ok(())
    }

    /// Reader finishes first (no more work will ever be queued), then the
    /// piece hasher(s) are drained, then the writer(s), then the checksum
    /// hashers — matching `storage_hasher.cpp`'s `wait()`.
    pub fn wait(&mut self) -> Result<()> {
        if !self.started {
            return Err(TorrentError::InvalidState("hasher not running".into()));
        }
        if let Some(handle) = self.reader_thread.take() {
            handle.join().map_err(|_| TorrentError::InvalidState("reader thread panicked".into()))??;
        }
        if let Some(h) = &mut self.v1_hasher {
            h.wait()?;
        }
        if let Some(h) = &mut self.v2_hasher {
            h.wait()?;
        }
        if let Some(w) = &mut self.v1_writer {
            w.wait()?;
        }
        if let Some(w) = &mut self.v2_writer {
            w.wait()?;
        }
        for ch in &mut self.checksum_hashers {
            ch.wait()?;
        }
        self.started = false;
        Ok(())
    }

    /// Cooperatively cancel an in-progress run: the reader stops pushing
    /// further chunks, every hasher/writer/checksum stage drops whatever is
    /// queued and stops after its current item, then this blocks until
    /// everything (including the reader thread) has joined.
    pub fn cancel(&mut self) -> Result<()> {
        self.cancelled.store(true, Ordering::Relaxed);
        if let Some(h) = &self.v1_hasher {
            h.request_cancellation();
        }
        if let Some(h) = &self.v2_hasher {
            h.request_cancellation();
        }
        if let Some(w) = &self.v1_writer {
            w.request_cancellation();
        }
        if let Some(w) = &self.v2_writer {
            w.request_cancellation();
        }
        for ch in &self.checksum_hashers {
            ch.request_cancellation();
        }
        self.wait()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    pub fn bytes_read(&self) -> usize {
        self.reader.as_ref().map(|r| r.bytes_read()).unwrap_or(0)
    }

    pub fn bytes_hashed(&self) -> usize {
        self.v1_hasher
            .as_ref()
            .map(|h| h.bytes_hashed())
            .or_else(|| self.v2_hasher.as_ref().map(|h| h.bytes_hashed()))
            .unwrap_or(0)
    }
}

/// Verifies an existing `.torrent`'s recorded hashes against on-disk
/// content, reusing the same reader/hasher wiring with writers swapped for
/// verifiers that compare instead of overwrite.
pub struct StorageVerifier {
    storage: Arc<Mutex<FileStorage>>,
    options: StorageHasherOptions,
    reader: Option<Arc<dyn ChunkReader>>,
    reader_thread: Option<JoinHandle<Result<()>>>,
    v1_hasher: Option<V1ChunkHasher>,
    v2_hasher: Option<V2ChunkHasher>,
    v1_verifier: Option<V1PieceVerifier>,
    v2_verifier: Option<V2PieceVerifier>,
    map: Arc<PieceMap>,
    started: bool,
    cancelled: Arc<AtomicBool>,
}

impl StorageVerifier {
    pub fn new(storage: Arc<Mutex<FileStorage>>, options: StorageHasherOptions) -> Self {
        let piece_count = storage.lock().unwrap().piece_count().max(1) as usize;
        Self {
            storage,
            options,
            reader: None,
            reader_thread: None,
            v1_hasher: None,
            v2_hasher: None,
            v1_verifier: None,
            v2_verifier: None,
            map: Arc::new(PieceMap::new(piece_count)),
            started: false,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn start(&mut self) -> Result<()> {
        if self.started {
            return Err(TorrentError::InvalidState("verifier already started".into()));
        }
        let piece_size = self.storage.lock().unwrap().piece_size();
        let chunk_size = self.options.min_chunk_size.max(piece_size);
        let cap = self.options.queue_capacity;

        let reader: Arc<dyn ChunkReader> = match self.options.protocol {
            Protocol::V1 => Arc::new(V1ChunkReader::new(chunk_size, true)),
            Protocol::V2 | Protocol::Hybrid => Arc::new(V2ChunkReader::new(chunk_size, true)),
        };

        let mut hash_queues = Vec::new();

        match self.options.protocol {
            Protocol::V1 => {
                let mut verifier = V1PieceVerifier::new(cap);
                verifier.start(1, self.storage.clone(), self.map.clone());
                let mut hasher = V1ChunkHasher::new(cap);
                hasher.start(self.options.threads, piece_size, verifier.queue().clone());
                hash_queues.push(hasher.queue().clone());
                self.v1_hasher = Some(hasher);
                self.v1_verifier = Some(verifier);
            }
            Protocol::V2 | Protocol::Hybrid => {
                let mut verifier = V2PieceVerifier::new(cap);
                verifier.start(1, piece_size, self.storage.clone(), self.map.clone());
                let mut hasher = V2ChunkHasher::new(cap);
                hasher.start(self.options.threads, piece_size, verifier.queue().clone(), None);
                hash_queues.push(hasher.queue().clone());
                self.v2_hasher = Some(hasher);
                self.v2_verifier = Some(verifier);
            }
        }

        let storage = self.storage.clone();
        let reader_for_thread = reader.clone();
        let cancelled_for_reader = self.cancelled.clone();
        self.reader = Some(reader);
        self.reader_thread = Some(std::thread::spawn(move || {
            reader_for_thread.run(storage, &hash_queues, &cancelled_for_reader)
        }));

        self.started = true;
        Ok(())
    }

    pub fn wait(&mut self) -> Result<bool> {
        if !self.started {
            return Err(TorrentError::InvalidState("verifier not running".into()));
        }
        if let Some(handle) = self.reader_thread.take() {
            handle.join().map_err(|_| TorrentError::InvalidState("reader thread panicked".into()))??;
        }
        if let Some(h) = &mut self.v1_hasher {
            h.wait()?;
        }
        if let Some(h) = &mut self.v2_hasher {
            h.wait()?;
        }
        if let Some(v) = &mut self.v1_verifier {
            v.wait()?;
        }
        if let Some(v) = &mut self.v2_verifier {
            v.wait()?;
        }
        self.started = false;
        Ok(self.map.all_matched())
    }

    /// Cooperatively cancel an in-progress verification run; see
    /// [`StorageHasher::cancel`] for the shutdown sequence this mirrors.
    pub fn cancel(&mut self) -> Result<bool> {
        self.cancelled.store(true, Ordering::Relaxed);
        if let Some(h) = &self.v1_hasher {
            h.request_cancellation();
        }
        if let Some(h) = &self.v2_hasher {
            h.request_cancellation();
        }
        if let Some(v) = &self.v1_verifier {
            v.request_cancellation();
        }
        if let Some(v) = &self.v2_verifier {
            v.request_cancellation();
        }
        self.wait()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    pub fn percentage(&self, piece_range: std::ops::Range<u64>) -> f64 {
        self.map.percentage(piece_range)
    }
}
