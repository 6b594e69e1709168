use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::chunk::{V1HashedPiece, V2HashedLeaf};
use super::processor::ChunkProcessor;
use super::queue::BoundedQueue;
use crate::error::Result;
use crate::hash;
use crate::merkle::MerkleTree;
use crate::models::FileStorage;

/// Writes finished v1 piece hashes into the shared [`FileStorage`].
///
/// Split out from [`V2PieceWriter`] because v1 pieces need no accumulation
/// state: each hash is simply written at its index.
pub struct V1PieceWriter {
    processor: ChunkProcessor<V1HashedPiece>,
}

impl V1PieceWriter {
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            processor: ChunkProcessor::new(queue_capacity),
        }
    }

    pub fn queue(&self) -> &Arc<BoundedQueue<Option<V1HashedPiece>>> {
        self.processor.queue()
    }

    pub fn push(&self, piece: V1HashedPiece) {
        self.processor.push(piece);
    }

    pub fn start(&mut self, thread_count: usize, storage: Arc<Mutex<FileStorage>>) {
        self.processor.start(thread_count, move |piece: V1HashedPiece| {
            storage.lock().unwrap().set_piece_hash(piece.index, piece.hash);
        });
    }

    pub fn wait(&mut self) -> Result<()> {
        self.processor.wait()
    }

    pub fn request_cancellation(&self) {
        self.processor.request_cancellation();
    }
}

/// Per-file Merkle tree state shared between writer threads. A leaf write
/// (`set_leaf`) only needs a short-lived lock; `update()`/finalize only run
/// once, when [`completion latch`](Self::leaf_count) is satisfied.
struct V2FileState {
    tree: Mutex<MerkleTree>,
    leaves_written: AtomicUsize,
    leaf_count: usize,
}

/// Accumulates v2 leaf hashes into per-file Merkle trees and writes
/// `pieces_root`/`piece_layer` into storage once a file's last leaf
/// arrives.
///
/// The `fetch_add(1, AcqRel)` on `leaves_written` is the synchronization
/// point: the thread that observes the count reach `leaf_count` is
/// guaranteed to see every `set_leaf` write from every other thread before
/// it calls `tree.update()` (C10/C11 completion latch).
pub struct V2PieceWriter {
    processor: ChunkProcessor<V2HashedLeaf>,
}

impl V2PieceWriter {
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            processor: ChunkProcessor::new(queue_capacity),
        }
    }

    pub fn queue(&self) -> &Arc<BoundedQueue<Option<V2HashedLeaf>>> {
        self.processor.queue()
    }

    pub fn push(&self, leaf: V2HashedLeaf) {
        self.processor.push(leaf);
    }

    /// Build per-file tree state from the current file list. Padding files
    /// and symlinks get a zero-leaf placeholder and are never written to.
    pub fn start(&mut self, thread_count: usize, piece_size: u64, storage: Arc<Mutex<FileStorage>>) {
        let fill = hash::zero_block_sha256(crate::config::BLOCK_SIZE);
        let states: Vec<V2FileState> = {
            let storage = storage.lock().unwrap();
            storage
                .files()
                .iter()
                .map(|f| {
                    let leaf_count = (f.file_size() as usize).div_ceil(crate::config::BLOCK_SIZE).max(1);
                    V2FileState {
                        tree: Mutex::new(MerkleTree::with_leaves(leaf_count, fill)),
                        leaves_written: AtomicUsize::new(0),
                        leaf_count: if f.is_padding_file() || f.is_symlink() || f.file_size() == 0 {
                            0
                        } else {
                            leaf_count
                        },
                    }
                })
                .collect()
        };
        let states = Arc::new(states);

        self.processor.start(thread_count, move |leaf: V2HashedLeaf| {
            let state = &states[leaf.file_index];
            if state.leaf_count == 0 {
                return;
            }
            state.tree.lock().unwrap().set_leaf(leaf.leaf_index, leaf.hash);

            let written = state.leaves_written.fetch_add(1, Ordering::AcqRel) + 1;
            if written == state.leaf_count {
                let file_size = storage.lock().unwrap().get(leaf.file_index).file_size();

                let mut tree = state.tree.lock().unwrap();
                tree.update();
                let root = tree.root();
                let layer = tree.piece_layer(file_size, piece_size);
                drop(tree);

                storage
                    .lock()
                    .unwrap()
                    .get_mut(leaf.file_index)
                    .set_v2_data(root, layer);
            }
        });
    }

    pub fn wait(&mut self) -> Result<()> {
        self.processor.wait()
    }

    pub fn request_cancellation(&self) {
        self.processor.request_cancellation();
    }
}
