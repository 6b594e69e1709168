use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::chunk::DataChunk;
use super::processor::ChunkProcessor;
use super::queue::BoundedQueue;
use crate::error::Result;
use crate::hash::{self, HashFunction, Hasher as _};
use crate::models::FileStorage;

/// Supplementary per-file digest (C9), run alongside the v1/v2 piece
/// hashers when the caller asked for one or more checksum algorithms
/// (md5/sha1/sha256/sha512 over each whole file, independent of pieces).
///
/// Always single-threaded: it tracks a running digest across chunk calls
/// and detects file boundaries from cumulative byte position, so chunks
/// must arrive in file-storage order (grounded on
/// `checksum_hasher.hpp::hash_chunk`'s `current_file_idx_` bookkeeping).
pub struct ChecksumHasher {
    processor: ChunkProcessor<DataChunk>,
    bytes_hashed: Arc<AtomicUsize>,
}

struct RunningState {
    hasher: Box<dyn hash::Hasher>,
    file_idx: usize,
    file_size: u64,
    file_hashed: u64,
}

impl ChecksumHasher {
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            processor: ChunkProcessor::new(queue_capacity),
            bytes_hashed: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn queue(&self) -> &Arc<BoundedQueue<Option<DataChunk>>> {
        self.processor.queue()
    }

    pub fn push(&self, chunk: DataChunk) {
        self.processor.push(chunk);
    }

    pub fn bytes_hashed(&self) -> usize {
        self.bytes_hashed.load(Ordering::Relaxed)
    }

    pub fn start(&mut self, function: HashFunction, storage: Arc<Mutex<FileStorage>>) {
        let bytes_hashed = self.bytes_hashed.clone();

        let first_file_size = storage.lock().unwrap().files().first().map(|f| f.file_size()).unwrap_or(0);
        let state = Mutex::new(RunningState {
            hasher: hash::make_hasher(function).expect("checksum hash function is always constructible"),
            file_idx: 0,
            file_size: first_file_size,
            file_hashed: 0,
        });

        self.processor.start(1, move |chunk: DataChunk| {
            let mut state = state.lock().unwrap();
            let data = &chunk.data[..];
            let mut processed = 0usize;

            while processed < data.len() {
                let file_count = storage.lock().unwrap().file_count();
                if state.file_idx >= file_count {
                    break;
                }
                let remaining_in_file = (state.file_size - state.file_hashed) as usize;
                let take = remaining_in_file.min(data.len() - processed);

                state.hasher.update(&data[processed..processed + take]);
                processed += take;
                state.file_hashed += take as u64;

                if state.file_hashed >= state.file_size {
                    let finished = std::mem::replace(
                        &mut state.hasher,
                        hash::make_hasher(function).expect("checksum hash function is always constructible"),
                    );
                    let value = finished.finalize();
                    {
                        let mut storage = storage.lock().unwrap();
                        storage.get_mut(state.file_idx).set_checksum(function, value);
                    }
                    state.file_idx += 1;
                    state.file_hashed = 0;
                    let storage = storage.lock().unwrap();
                    state.file_size = storage
                        .files()
                        .get(state.file_idx)
                        .map(|f| f.file_size())
                        .unwrap_or(0);
                }
            }

            bytes_hashed.fetch_add(data.len(), Ordering::Relaxed);
        });
    }

    pub fn wait(&mut self) -> Result<()> {
        self.processor.wait()
    }

    pub fn request_cancellation(&self) {
        self.processor.request_cancellation();
    }
}
