//! Merkle tree (C2): a complete balanced binary tree of SHA-256 hashes over
//! a file's 16 KiB leaf blocks, stored in breadth-first flat order.
//!
//! The flat-index arithmetic mirrors a classic array-backed binary heap:
//! layer `l` starts at flat index `2^l - 1` and has `2^l` nodes, so a node's
//! parent is `(i - 1) / 2` and its children are `2i + 1` / `2i + 2`.

use crate::config::BLOCK_SIZE;

/// Balanced SHA-256 Merkle tree over a file's 16 KiB leaf blocks.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    nodes: Vec<[u8; 32]>,
    leaf_count: usize,
}

impl MerkleTree {
    /// Allocate a tree for `leaf_count` leaves, padded up to the next power
    /// of two with `fill`. `leaf_count` must be at least 1.
    pub fn with_leaves(leaf_count: usize, fill: [u8; 32]) -> Self {
        assert!(leaf_count >= 1, "merkle tree requires at least one leaf");
        let padded = leaf_count.next_power_of_two();
        let node_count = 2 * padded - 1;
        Self {
            nodes: vec![fill; node_count],
            leaf_count,
        }
    }

    /// Number of real (unpadded) leaves this tree was constructed for.
    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Height of the tree: the root is at depth 0, leaves are at
    /// `tree_height()`.
    pub fn tree_height(&self) -> u32 {
        let padded_leaves = (self.nodes.len() + 1) / 2;
        padded_leaves.trailing_zeros()
    }

    fn layer_start(depth: u32) -> usize {
        (1usize << depth) - 1
    }

    fn nodes_in_layer(depth: u32) -> usize {
        1usize << depth
    }

    /// Set leaf `index` to `value`.
    pub fn set_leaf(&mut self, index: usize, value: [u8; 32]) {
        let height = self.tree_height();
        let flat = Self::layer_start(height) + index;
        self.nodes[flat] = value;
    }

    /// Recompute every interior node from the leaves upward. Not re-entrant;
    /// the caller must ensure no other thread is writing leaves during the
    /// call (the per-file completion latch in the piece writer/verifier
    /// provides this happens-before edge).
    pub fn update(&mut self) {
        use sha2::Digest;

        let height = self.tree_height();
        let mut depth = height;
        while depth > 0 {
            let parent_depth = depth - 1;
            let start = Self::layer_start(depth);
            let parent_start = Self::layer_start(parent_depth);
            let count = Self::nodes_in_layer(parent_depth);
            for i in 0..count {
                let left = self.nodes[start + 2 * i];
                let right = self.nodes[start + 2 * i + 1];
                let mut hasher = sha2::Sha256::new();
                hasher.update(left);
                hasher.update(right);
                let out = hasher.finalize();
                let mut arr = [0u8; 32];
                arr.copy_from_slice(&out);
                self.nodes[parent_start + i] = arr;
            }
            depth = parent_depth;
        }
    }

    pub fn root(&self) -> [u8; 32] {
        self.nodes[0]
    }

    /// Contiguous slice of nodes at `depth`.
    pub fn layer(&self, depth: u32) -> &[[u8; 32]] {
        let start = Self::layer_start(depth);
        let count = Self::nodes_in_layer(depth);
        &self.nodes[start..start + count]
    }

    /// The piece-layer for a file whose pieces each cover `piece_size`
    /// bytes: the tree layer whose leaves span exactly `piece_size` bytes,
    /// truncated to `ceil(file_size / piece_size)` entries. Returns an
    /// empty vector when the file fits in a single piece.
    pub fn piece_layer(&self, file_size: u64, piece_size: u64) -> Vec<[u8; 32]> {
        if file_size <= piece_size {
            return Vec::new();
        }
        let leaves_per_piece = (piece_size / BLOCK_SIZE as u64).max(1);
        let depth_delta = leaves_per_piece.trailing_zeros();
        let depth = self.tree_height().saturating_sub(depth_delta);
        let entries = file_size.div_ceil(piece_size) as usize;
        let layer = self.layer(depth);
        layer[..entries.min(layer.len())].to_vec()
    }
}
