use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use sha1::{Digest, Sha1};

use super::chunk::{DataChunk, V1HashedPiece};
use super::processor::ChunkProcessor;
use super::queue::BoundedQueue;
use crate::error::Result;

/// v1 SHA-1 piece hasher (C7): pops chunks spanning one or more whole
/// pieces, SHA-1's each piece-sized slice, and forwards the results to the
/// piece writer's queue.
///
/// Grounded on `v1_chunk_hasher.cpp`'s `hash_chunk`: a chunk flagged
/// `is_missing` (verifier path only, see `V1ChunkReader`) skips hashing
/// entirely and forwards `missing: true` sentinels instead, bumping
/// `pieces_done` but never `bytes_hashed`.
pub struct V1ChunkHasher {
    processor: ChunkProcessor<DataChunk>,
    bytes_hashed: Arc<AtomicUsize>,
    pieces_done: Arc<AtomicUsize>,
}

impl V1ChunkHasher {
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            processor: ChunkProcessor::new(queue_capacity),
            bytes_hashed: Arc::new(AtomicUsize::new(0)),
            pieces_done: Arc::new(AtomicUsize::new(0)),
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

    pub fn pieces_done(&self) -> usize {
        self.pieces_done.load(Ordering::Relaxed)
    }

    pub fn start(&mut self, thread_count: usize, piece_size: u64, output: Arc<BoundedQueue<Option<V1HashedPiece>>>) {
        let bytes_hashed = self.bytes_hashed.clone();
        let pieces_done = self.pieces_done.clone();

        self.processor.start(thread_count, move |chunk: DataChunk| {
            let pieces_in_chunk = (chunk.data.len() as u64).div_ceil(piece_size).max(1);

            if chunk.is_missing {
                for offset in 0..pieces_in_chunk {
                    output.push(Some(V1HashedPiece {
                        index: chunk.piece_index as usize + offset as usize,
                        hash: [0u8; 20],
                        missing: true,
                    }));
                    pieces_done.fetch_add(1, Ordering::Relaxed);
                }
                return;
            }

            for offset in 0..pieces_in_chunk {
                let start = (offset * piece_size) as usize;
                let end = ((offset + 1) * piece_size).min(chunk.data.len() as u64) as usize;

                let mut hasher = Sha1::new();
                hasher.update(&chunk.data[start..end]);
                let digest = hasher.finalize();
                let mut hash = [0u8; 20];
                hash.copy_from_slice(&digest);

                output.push(Some(V1HashedPiece {
                    index: chunk.piece_index as usize + offset as usize,
                    hash,
                    missing: false,
                }));
                pieces_done.fetch_add(1, Ordering::Relaxed);
            }
            bytes_hashed.fetch_add(chunk.data.len(), Ordering::Relaxed);
        });
    }

    pub fn wait(&mut self) -> Result<()> {
        self.processor.wait()
    }

    pub fn request_cancellation(&self) {
        self.processor.request_cancellation();
    }
}
