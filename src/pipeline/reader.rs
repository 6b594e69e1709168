use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::chunk::DataChunk;
use super::queue::BoundedQueue;
use crate::error::Result;
use crate::models::FileStorage;

type ChunkQueue = Arc<BoundedQueue<Option<DataChunk>>>;

/// Single-producer file reader (C5): runs on its own thread, reading the
/// torrent's file content in order and fanning each chunk out to every
/// registered hash/checksum queue.
pub trait ChunkReader: Send + Sync {
    /// Consume the reader on its dedicated thread. `cancelled` is polled
    /// between chunks so a driver-level `cancel()` can make the reader give
    /// up on a full downstream queue instead of blocking forever once its
    /// consumers have already exited.
    fn run(
        &self,
        storage: Arc<Mutex<FileStorage>>,
        consumers: &[ChunkQueue],
        cancelled: &Arc<AtomicBool>,
    ) -> Result<()>;

    fn bytes_read(&self) -> usize;
}

/// Push `chunk` to every consumer, retrying against a full queue instead of
/// blocking unconditionally so a cancelled run can give up. Returns `false`
/// if `cancelled` became set before every consumer received the chunk.
fn push_to_all(consumers: &[ChunkQueue], chunk: DataChunk, cancelled: &Arc<AtomicBool>) -> bool {
    for q in consumers {
        if !try_push_until_cancelled(q, chunk.clone(), cancelled) {
            return false;
        }
    }
    true
}

fn try_push_until_cancelled(q: &ChunkQueue, item: DataChunk, cancelled: &Arc<AtomicBool>) -> bool {
    let mut item = Some(item);
    loop {
        if cancelled.load(Ordering::Relaxed) {
            return false;
        }
        match q.try_push(Some(item.take().unwrap())) {
            Ok(()) => return true,
            Err(Some(rejected)) => {
                item = Some(rejected);
                std::thread::sleep(Duration::from_millis(5));
            }
            Err(None) => unreachable!("reader never pushes a poison pill"),
        }
    }
}

/// Reads the concatenated v1 byte stream (file-storage order, padding files
/// read as zero blocks) in `chunk_size`-aligned slices; `piece_index` on
/// each chunk is the global piece the chunk starts at (per spec.md §4.5.1).
pub struct V1ChunkReader {
    chunk_size: u64,
    bytes_read: Arc<AtomicUsize>,
    /// Only set for the verify path: a missing source file is recovered as
    /// a zero-fill stream instead of failing the run.
    tolerate_missing: bool,
}

impl V1ChunkReader {
    pub fn new(chunk_size: u64, tolerate_missing: bool) -> Self {
        Self {
            chunk_size,
            bytes_read: Arc::new(AtomicUsize::new(0)),
            tolerate_missing,
        }
    }
}

impl ChunkReader for V1ChunkReader {
    fn bytes_read(&self) -> usize {
        self.bytes_read.load(Ordering::Relaxed)
    }

    fn run(
        &self,
        storage: Arc<Mutex<FileStorage>>,
        consumers: &[ChunkQueue],
        cancelled: &Arc<AtomicBool>,
    ) -> Result<()> {
        let (piece_size, total_len, files) = {
            let storage = storage.lock().unwrap();
            (
                storage.piece_size(),
                storage.total_file_size(),
                storage.files().to_vec(),
            )
        };
        let chunk_size = self.chunk_size.max(piece_size);
        let mut file_starts = Vec::with_capacity(files.len());
        let mut acc = 0u64;
        for f in &files {
            file_starts.push(acc);
            acc += f.file_size();
        }

        let mut global_offset = 0u64;
        while global_offset < total_len {
            if cancelled.load(Ordering::Relaxed) {
                break;
            }
            let this_chunk_len = chunk_size.min(total_len - global_offset);
            let mut buffer = vec![0u8; this_chunk_len as usize];

            let chunk_start = global_offset;
            let chunk_end = global_offset + this_chunk_len;
            let start_file_idx = file_starts.partition_point(|&start| start <= chunk_start).saturating_sub(1);

            let mut chunk_is_missing = false;
            for (idx, file) in files.iter().enumerate().skip(start_file_idx) {
                let file_start = file_starts[idx];
                let file_end = file_start + file.file_size();
                if file_start >= chunk_end {
                    break;
                }
                let overlap_start = file_start.max(chunk_start);
                let overlap_end = file_end.min(chunk_end);
                if overlap_end <= overlap_start {
                    continue;
                }
                let buf_start = (overlap_start - chunk_start) as usize;
                let buf_end = (overlap_end - chunk_start) as usize;

                if file.is_padding_file() {
                    continue; // buffer already zero-initialized
                }
                match File::open(file.full_path()) {
                    Ok(mut f) => {
                        f.seek(SeekFrom::Start(overlap_start - file_start))?;
                        f.read_exact(&mut buffer[buf_start..buf_end])?;
                    }
                    Err(e) if self.tolerate_missing && e.kind() == std::io::ErrorKind::NotFound => {
                        // buffer slice already zero-initialized; the whole
                        // chunk is tainted so the verifier marks every piece
                        // it covers invalid rather than trusting a partial
                        // hash.
                        chunk_is_missing = true;
                    }
                    Err(e) => return Err(e.into()),
                }
            }

            let piece_index = (chunk_start / piece_size) as u32;
            let chunk = if chunk_is_missing {
                DataChunk::missing(piece_index, start_file_idx as u32, buffer.len())
            } else {
                DataChunk::new(piece_index, start_file_idx as u32, buffer)
            };
            self.bytes_read.fetch_add(this_chunk_len as usize, Ordering::Relaxed);
            if !push_to_all(consumers, chunk, cancelled) {
                break;
            }

            global_offset = chunk_end;
        }
        Ok(())
    }
}

/// Reads each non-padding file independently, in `chunk_size`-aligned
/// slices; `piece_index` on each chunk is the index of the chunk's first
/// 16 KiB leaf within that file's own byte stream (per spec.md §4.5.2).
pub struct V2ChunkReader {
    chunk_size: u64,
    bytes_read: Arc<AtomicUsize>,
    tolerate_missing: bool,
}

impl V2ChunkReader {
    pub fn new(chunk_size: u64, tolerate_missing: bool) -> Self {
        Self {
            chunk_size,
            bytes_read: Arc::new(AtomicUsize::new(0)),
            tolerate_missing,
        }
    }
}

impl ChunkReader for V2ChunkReader {
    fn bytes_read(&self) -> usize {
        self.bytes_read.load(Ordering::Relaxed)
    }

    fn run(
        &self,
        storage: Arc<Mutex<FileStorage>>,
        consumers: &[ChunkQueue],
        cancelled: &Arc<AtomicBool>,
    ) -> Result<()> {
        let block_size = crate::config::BLOCK_SIZE as u64;
        let chunk_size = self.chunk_size.max(block_size);
        let files = storage.lock().unwrap().files().to_vec();

        'files: for (file_index, file) in files.iter().enumerate() {
            if cancelled.load(Ordering::Relaxed) {
                break;
            }
            if file.is_padding_file() || file.file_size() == 0 {
                continue;
            }

            let mut handle = match File::open(file.full_path()) {
                Ok(f) => Some(f),
                Err(e) if self.tolerate_missing && e.kind() == std::io::ErrorKind::NotFound => None,
                Err(e) => return Err(e.into()),
            };

            let mut offset = 0u64;
            let mut leaf_index = 0u32;

            while offset < file.file_size() {
                if cancelled.load(Ordering::Relaxed) {
                    break 'files;
                }
                let this_len = chunk_size.min(file.file_size() - offset);
                let mut buffer = vec![0u8; this_len as usize];

                let chunk = if let Some(f) = handle.as_mut() {
                    f.read_exact(&mut buffer)?;
                    DataChunk::new(leaf_index, file_index as u32, buffer)
                } else {
                    DataChunk::missing(leaf_index, file_index as u32, buffer.len())
                };

                self.bytes_read.fetch_add(this_len as usize, Ordering::Relaxed);
                if !push_to_all(consumers, chunk, cancelled) {
                    break 'files;
                }

                leaf_index += this_len.div_ceil(block_size) as u32;
                offset += this_len;
            }
        }
        Ok(())
    }
}
