use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::chunk::{V1HashedPiece, V2HashedLeaf};
use super::processor::ChunkProcessor;
use super::queue::BoundedQueue;
use crate::error::Result;
use crate::hash;
use crate::merkle::MerkleTree;
use crate::models::FileStorage;

/// Per-piece verification result: 0 = not yet checked, 1 = match, 2 = mismatch.
pub struct PieceMap(Vec<AtomicU8>);

impl PieceMap {
    pub fn new(piece_count: usize) -> Self {
        Self((0..piece_count).map(|_| AtomicU8::new(0)).collect())
    }

    pub fn mark(&self, index: usize, matched: bool) {
        self.0[index].store(if matched { 1 } else { 2 }, Ordering::Relaxed);
    }

    pub fn mark_range(&self, range: std::ops::Range<u64>, matched: bool) {
        for i in range {
            self.mark(i as usize, matched);
        }
    }

    /// Fraction of `range` verified (checked, regardless of match), in `[0, 1]`.
    pub fn percentage(&self, range: std::ops::Range<u64>) -> f64 {
        let total = range.end.saturating_sub(range.start);
        if total == 0 {
            return 1.0;
        }
        let checked = range
            .filter(|i| self.0[*i as usize].load(Ordering::Relaxed) != 0)
            .count();
        checked as f64 / total as f64
    }

    pub fn all_matched(&self) -> bool {
        self.0.iter().all(|b| b.load(Ordering::Relaxed) == 1)
    }
}

/// Verifies v1 piece hashes against the pieces already recorded in storage
/// (loaded from an existing `.torrent` file).
pub struct V1PieceVerifier {
    processor: ChunkProcessor<V1HashedPiece>,
}

impl V1PieceVerifier {
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

    pub fn start(&mut self, thread_count: usize, storage: Arc<Mutex<FileStorage>>, map: Arc<PieceMap>) {
        self.processor.start(thread_count, move |piece: V1HashedPiece| {
            if piece.missing {
                map.mark(piece.index, false);
                return;
            }
            let expected = storage.lock().unwrap().pieces()[piece.index];
            map.mark(piece.index, expected == piece.hash);
        });
    }

    pub fn wait(&mut self) -> Result<()> {
        self.processor.wait()
    }

    pub fn request_cancellation(&self) {
        self.processor.request_cancellation();
    }
}

struct V2FileState {
    tree: Mutex<MerkleTree>,
    leaves_written: AtomicUsize,
    leaf_count: usize,
    piece_range: std::ops::Range<u64>,
}

/// Verifies v2 per-file content against the root (and, where available, the
/// BEP-52 piece layer) recorded in storage. When a file's expected piece
/// layer is present, each layer entry is compared independently so a single
/// corrupted leaf only flags the piece(s) whose 16 KiB window it falls in,
/// instead of the whole file's piece range; files that fit in a single
/// piece (no piece layer, root-only) fall back to a whole-range verdict.
pub struct V2PieceVerifier {
    processor: ChunkProcessor<V2HashedLeaf>,
}

impl V2PieceVerifier {
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

    pub fn start(
        &mut self,
        thread_count: usize,
        piece_size: u64,
        storage: Arc<Mutex<FileStorage>>,
        map: Arc<PieceMap>,
    ) {
        let fill = hash::zero_block_sha256(crate::config::BLOCK_SIZE);
        let states: Vec<V2FileState> = {
            let storage = storage.lock().unwrap();
            (0..storage.file_count())
                .map(|i| {
                    let (a, b) = storage.pieces_offsets(i);
                    let f = storage.get(i);
                    let leaf_count = (f.file_size() as usize).div_ceil(crate::config::BLOCK_SIZE).max(1);
                    let skip = f.is_padding_file() || f.is_symlink() || f.file_size() == 0;
                    V2FileState {
                        tree: Mutex::new(MerkleTree::with_leaves(leaf_count, fill)),
                        leaves_written: AtomicUsize::new(0),
                        leaf_count: if skip { 0 } else { leaf_count },
                        piece_range: a..b,
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
            if !leaf.missing {
                state.tree.lock().unwrap().set_leaf(leaf.leaf_index, leaf.hash);
            }
            // a missing leaf keeps the tree's padding-fill value in place,
            // which will not match a real file's root or piece layer

            let written = state.leaves_written.fetch_add(1, Ordering::AcqRel) + 1;
            if written == state.leaf_count {
                let (expected_root, expected_layer, file_size) = {
                    let storage = storage.lock().unwrap();
                    let f = storage.get(leaf.file_index);
                    (f.pieces_root(), f.piece_layer().to_vec(), f.file_size())
                };

                let mut tree = state.tree.lock().unwrap();
                tree.update();
                let root = tree.root();
                let computed_layer = tree.piece_layer(file_size, piece_size);
                drop(tree);

                if expected_layer.is_empty() {
                    map.mark_range(state.piece_range.clone(), expected_root == Some(root));
                } else {
                    let start = state.piece_range.start;
                    for (i, expected_entry) in expected_layer.iter().enumerate() {
                        let matched = computed_layer.get(i) == Some(expected_entry);
                        map.mark(start as usize + i, matched);
                    }
                }
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
