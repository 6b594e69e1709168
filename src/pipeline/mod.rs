//! Multi-threaded hashing pipeline: a chunk reader feeds bounded queues
//! consumed by piece hashers, which in turn feed the piece writer or
//! verifier. See `driver` for how the pieces are wired together.

pub mod checksum;
pub mod chunk;
pub mod driver;
pub mod hash_v1;
pub mod hash_v2;
pub mod processor;
pub mod queue;
pub mod reader;
pub mod verifier;
pub mod writer;

pub use chunk::{DataChunk, V1HashedPiece, V2HashedLeaf};
pub use driver::{Protocol, StorageHasher, StorageHasherOptions, StorageVerifier};
pub use queue::BoundedQueue;
