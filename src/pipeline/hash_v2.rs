use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use sha1::Sha1;
use sha2::{Digest, Sha256};

use super::chunk::{DataChunk, V1HashedPiece, V2HashedLeaf};
use super::processor::ChunkProcessor;
use super::queue::BoundedQueue;
use crate::config::BLOCK_SIZE;
use crate::error::Result;

/// Per-file layout the hybrid add-on needs to turn v2 block hashes into v1
/// piece hashes without a second read of the file.
#[derive(Clone)]
pub struct HybridFileLayout {
    /// Global v1 piece index this file's first byte falls in.
    pub first_piece_index: u64,
    /// True only for the last file in storage order: its tail piece is
    /// never zero-padded, matching ordinary v1 tail-piece handling.
    pub is_last_file: bool,
}

/// v2 SHA-256 leaf hasher (C8), with an optional hybrid add-on that derives
/// v1 SHA-1 piece hashes from the same bytes instead of re-reading the file.
///
/// Grounded on `v2_chunk_hasher.cpp`'s `hash_chunk`: chunks carry the index
/// of their first 16 KiB leaf within the file so leaves can be written
/// directly into the per-file Merkle tree by the piece writer.
pub struct V2ChunkHasher {
    processor: ChunkProcessor<DataChunk>,
    bytes_hashed: Arc<AtomicUsize>,
}

impl V2ChunkHasher {
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

    #[allow(clippy::too_many_arguments)]
    pub fn start(
        &mut self,
        thread_count: usize,
        piece_size: u64,
        v2_output: Arc<BoundedQueue<Option<V2HashedLeaf>>>,
        hybrid: Option<(Arc<Vec<HybridFileLayout>>, Arc<BoundedQueue<Option<V1HashedPiece>>>)>,
    ) {
        let bytes_hashed = self.bytes_hashed.clone();
        let block_size = BLOCK_SIZE as u64;
        let leaves_per_piece = (piece_size / block_size).max(1);

        self.processor.start(thread_count, move |chunk: DataChunk| {
            let file_index = chunk.file_index as usize;
            let start_leaf = chunk.piece_index as u64;

            if chunk.is_missing {
                let block_count = (chunk.data.len() as u64).div_ceil(block_size).max(1);
                for i in 0..block_count {
                    v2_output.push(Some(V2HashedLeaf {
                        file_index,
                        leaf_index: (start_leaf + i) as usize,
                        hash: [0u8; 32],
                        missing: true,
                    }));
                }

                if let Some((layouts, v1_output)) = &hybrid {
                    let layout = &layouts[file_index];
                    let pieces_in_chunk = (chunk.data.len() as u64).div_ceil(piece_size).max(1);
                    let chunk_first_piece = start_leaf / leaves_per_piece;
                    for p in 0..pieces_in_chunk {
                        v1_output.push(Some(V1HashedPiece {
                            index: (layout.first_piece_index + chunk_first_piece + p) as usize,
                            hash: [0u8; 20],
                            missing: true,
                        }));
                    }
                }
                return;
            }

            let block_count = (chunk.data.len() as u64).div_ceil(block_size);
            for i in 0..block_count {
                let start = (i * block_size) as usize;
                let end = ((i + 1) * block_size).min(chunk.data.len() as u64) as usize;
                let mut out = [0u8; 32];
                out.copy_from_slice(&Sha256::digest(&chunk.data[start..end]));
                v2_output.push(Some(V2HashedLeaf {
                    file_index,
                    leaf_index: (start_leaf + i) as usize,
                    hash: out,
                    missing: false,
                }));
            }

            if let Some((layouts, v1_output)) = &hybrid {
                let layout = &layouts[file_index];
                let pieces_in_chunk = (chunk.data.len() as u64).div_ceil(piece_size);
                let chunk_first_piece = start_leaf / leaves_per_piece;

                for p in 0..pieces_in_chunk {
                    let start = (p * piece_size) as usize;
                    let end = ((p + 1) * piece_size).min(chunk.data.len() as u64) as usize;
                    let is_tail_of_chunk = p == pieces_in_chunk - 1;
                    let is_tail_of_file = is_tail_of_chunk && end - start < piece_size as usize;

                    let mut hasher = Sha1::new();
                    use sha1::Digest as _;
                    if is_tail_of_file && !layout.is_last_file {
                        let mut padded = vec![0u8; piece_size as usize];
                        padded[..end - start].copy_from_slice(&chunk.data[start..end]);
                        hasher.update(&padded);
                    } else {
                        hasher.update(&chunk.data[start..end]);
                    }
                    let digest = hasher.finalize();
                    let mut hash = [0u8; 20];
                    hash.copy_from_slice(&digest);

                    v1_output.push(Some(V1HashedPiece {
                        index: (layout.first_piece_index + chunk_first_piece + p) as usize,
                        hash,
                        missing: false,
                    }));
                }
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
