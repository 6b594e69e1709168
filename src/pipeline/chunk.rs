use std::sync::Arc;

/// A chunk of file data read off disk, handed from the reader to one or more
/// hasher workers.
///
/// `piece_index` means different things per protocol: for v1 it is the
/// global piece index this chunk's bytes belong to; for v2 it is the index
/// of the first 16 KiB block within `file_index`'s byte stream.
#[derive(Clone)]
pub struct DataChunk {
    pub piece_index: u32,
    pub file_index: u32,
    pub data: Arc<Vec<u8>>,
    /// Set when the reader could not find the underlying file on disk and
    /// synthesized a zero-filled placeholder of the declared length instead
    /// of failing the whole run (verify path only).
    pub is_missing: bool,
}

impl DataChunk {
    pub fn new(piece_index: u32, file_index: u32, data: Vec<u8>) -> Self {
        Self {
            piece_index,
            file_index,
            data: Arc::new(data),
            is_missing: false,
        }
    }

    /// A zero-filled placeholder standing in for `len` bytes of a file that
    /// does not exist on disk.
    pub fn missing(piece_index: u32, file_index: u32, len: usize) -> Self {
        Self {
            piece_index,
            file_index,
            data: Arc::new(vec![0u8; len]),
            is_missing: true,
        }
    }
}

/// A single finished v1 piece hash.
#[derive(Debug, Clone, Copy)]
pub struct V1HashedPiece {
    pub index: usize,
    pub hash: [u8; 20],
    /// True if this hash is a placeholder for a missing source file; the
    /// verifier marks the piece invalid directly instead of comparing it.
    pub missing: bool,
}

/// A single finished v2 leaf hash (one 16 KiB block within a file).
#[derive(Debug, Clone, Copy)]
pub struct V2HashedLeaf {
    pub file_index: usize,
    pub leaf_index: usize,
    pub hash: [u8; 32],
    pub missing: bool,
}
