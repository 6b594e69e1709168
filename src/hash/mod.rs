//! Hash primitives (C1): a small factory over the digest algorithms the
//! pipeline and checksum hasher need. Only a single-buffer backend is
//! implemented — see DESIGN.md for why no multi-buffer/SIMD backend exists
//! in this ecosystem.

use std::fmt;

use crate::error::Result;

/// Tag identifying a supported digest algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HashFunction {
    Md5,
    Sha1,
    Sha256,
    Sha512,
}

impl HashFunction {
    pub fn as_str(self) -> &'static str {
        match self {
            HashFunction::Md5 => "md5",
            HashFunction::Sha1 => "sha1",
            HashFunction::Sha256 => "sha256",
            HashFunction::Sha512 => "sha512",
        }
    }

    pub fn digest_len(self) -> usize {
        match self {
            HashFunction::Md5 => 16,
            HashFunction::Sha1 => 20,
            HashFunction::Sha256 => 32,
            HashFunction::Sha512 => 64,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "md5" => Some(HashFunction::Md5),
            "sha1" => Some(HashFunction::Sha1),
            "sha256" => Some(HashFunction::Sha256),
            "sha512" => Some(HashFunction::Sha512),
            // sha3-*/blake2* are named by the spec as optional extras that
            // only a multi-buffer backend would provide here; this crate's
            // single-buffer backend does not, so they fall through to None
            // the same way an unavailable backend would upstream.
            _ => None,
        }
    }
}

impl fmt::Display for HashFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fixed-length digest value tagged by the function that produced it.
///
/// Equality and ordering are byte-wise; `Display` renders lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HashValue {
    Md5([u8; 16]),
    Sha1([u8; 20]),
    Sha256([u8; 32]),
    Sha512([u8; 64]),
}

impl HashValue {
    pub fn function(&self) -> HashFunction {
        match self {
            HashValue::Md5(_) => HashFunction::Md5,
            HashValue::Sha1(_) => HashFunction::Sha1,
            HashValue::Sha256(_) => HashFunction::Sha256,
            HashValue::Sha512(_) => HashFunction::Sha512,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            HashValue::Md5(b) => b.as_slice(),
            HashValue::Sha1(b) => b.as_slice(),
            HashValue::Sha256(b) => b.as_slice(),
            HashValue::Sha512(b) => b.as_slice(),
        }
    }

    pub fn sha1(bytes: [u8; 20]) -> Self {
        HashValue::Sha1(bytes)
    }

    pub fn sha256(bytes: [u8; 32]) -> Self {
        HashValue::Sha256(bytes)
    }

    pub fn as_sha1(&self) -> Option<[u8; 20]> {
        match self {
            HashValue::Sha1(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_sha256(&self) -> Option<[u8; 32]> {
        match self {
            HashValue::Sha256(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for HashValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.as_bytes() {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Streaming digest contract. Each worker owns its own instance; instances
/// are not `Sync` and are never shared across threads.
pub trait Hasher: Send {
    fn update(&mut self, bytes: &[u8]);
    fn finalize(self: Box<Self>) -> HashValue;
}

struct Sha1Hasher(sha1::Sha1);
struct Sha256Hasher(sha2::Sha256);
struct Sha512Hasher(sha2::Sha512);
struct Md5Hasher(md5::Context);

impl Hasher for Sha1Hasher {
    fn update(&mut self, bytes: &[u8]) {
        use sha1::Digest;
        self.0.update(bytes);
    }
    fn finalize(self: Box<Self>) -> HashValue {
        use sha1::Digest;
        let out = self.0.finalize();
        let mut arr = [0u8; 20];
        arr.copy_from_slice(&out);
        HashValue::Sha1(arr)
    }
}

impl Hasher for Sha256Hasher {
    fn update(&mut self, bytes: &[u8]) {
        use sha2::Digest;
        self.0.update(bytes);
    }
    fn finalize(self: Box<Self>) -> HashValue {
        use sha2::Digest;
        let out = self.0.finalize();
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&out);
        HashValue::Sha256(arr)
    }
}

impl Hasher for Sha512Hasher {
    fn update(&mut self, bytes: &[u8]) {
        use sha2::Digest;
        self.0.update(bytes);
    }
    fn finalize(self: Box<Self>) -> HashValue {
        use sha2::Digest;
        let out = self.0.finalize();
        let mut arr = [0u8; 64];
        arr.copy_from_slice(&out);
        HashValue::Sha512(arr)
    }
}

impl Hasher for Md5Hasher {
    fn update(&mut self, bytes: &[u8]) {
        self.0.consume(bytes);
    }
    fn finalize(self: Box<Self>) -> HashValue {
        let digest = self.0.compute();
        HashValue::Md5(digest.0)
    }
}

/// Construct a fresh streaming hasher for the given algorithm.
pub fn make_hasher(function: HashFunction) -> Result<Box<dyn Hasher>> {
    match function {
        HashFunction::Sha1 => {
            use sha1::Digest;
            Ok(Box::new(Sha1Hasher(sha1::Sha1::new())))
        }
        HashFunction::Sha256 => {
            use sha2::Digest;
            Ok(Box::new(Sha256Hasher(sha2::Sha256::new())))
        }
        HashFunction::Sha512 => {
            use sha2::Digest;
            Ok(Box::new(Sha512Hasher(sha2::Sha512::new())))
        }
        HashFunction::Md5 => Ok(Box::new(Md5Hasher(md5::Context::new()))),
    }
}

/// Hash a single buffer in one shot, for callers that don't need streaming.
pub fn digest(function: HashFunction, bytes: &[u8]) -> Result<HashValue> {
    let _ = function.digest_len();
    let mut hasher = make_hasher(function)?;
    hasher.update(bytes);
    Ok(hasher.finalize())
}

/// Hash a 16 KiB block of zero bytes with SHA-256; this is the canonical
/// fill value for Merkle-tree padding leaves.
pub fn zero_block_sha256(block_size: usize) -> [u8; 32] {
    use sha2::Digest;
    let zeros = vec![0u8; block_size];
    let out = sha2::Sha256::digest(&zeros);
    let mut arr = [0u8; 32];
    arr.copy_from_slice(&out);
    arr
}
