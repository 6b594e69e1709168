use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use super::queue::BoundedQueue;
use crate::error::{Result, TorrentError};

/// A thread pool running a single work function over a shared queue.
///
/// Items are wrapped in `Option<T>`: `None` is the poison pill used to wake
/// a worker blocked in `pop()` during shutdown, mirroring a stop-token
/// signal without needing cooperative cancellation support from the queue.
///
/// Control-plane states: `new -> started -> (stopping | cancelling) -> done`.
/// `request_stop()` drains whatever is already queued before exiting;
/// `request_cancellation()` drops everything still queued and exits as soon
/// as each worker finishes the item it's currently on.
pub struct ChunkProcessor<T: Send + 'static> {
    queue: Arc<BoundedQueue<Option<T>>>,
    handles: Vec<JoinHandle<()>>,
    done: Arc<Vec<AtomicBool>>,
    started: bool,
    cancelled: Arc<AtomicBool>,
    first_panic: Arc<Mutex<Option<String>>>,
}

impl<T: Send + 'static> ChunkProcessor<T> {
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            queue: Arc::new(BoundedQueue::new(queue_capacity)),
            handles: Vec::new(),
            done: Arc::new(Vec::new()),
            started: false,
            cancelled: Arc::new(AtomicBool::new(false)),
            first_panic: Arc::new(Mutex::new(None)),
        }
    }

    pub fn queue(&self) -> &Arc<BoundedQueue<Option<T>>> {
        &self.queue
    }

    pub fn push(&self, item: T) {
        self.queue.push(Some(item));
    }

    /// Spawn `worker_count` threads (0 means `num_cpus::get()`), each
    /// running `work` on items popped off the shared queue until it
    /// receives a poison pill and the queue is drained.
    pub fn start<F>(&mut self, worker_count: usize, work: F)
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        assert!(!self.started, "processor already started");
        let worker_count = if worker_count == 0 {
            num_cpus::get()
        } else {
            worker_count
        };

        let work = Arc::new(work);
        let done = Arc::new((0..worker_count).map(|_| AtomicBool::new(false)).collect::<Vec<_>>());
        self.done = done.clone();

        for thread_idx in 0..worker_count {
            let queue = self.queue.clone();
            let work = work.clone();
            let done = done.clone();
            let cancelled = self.cancelled.clone();
            let first_panic = self.first_panic.clone();

            let handle = std::thread::spawn(move || {
                loop {
                    if cancelled.load(Ordering::Relaxed) {
                        break;
                    }
                    let item = queue.pop();
                    match item {
                        None => break,
                        Some(value) => {
                            let result =
                                panic::catch_unwind(AssertUnwindSafe(|| work(value)));
                            if let Err(payload) = result {
                                let msg = panic_message(&payload);
                                let mut slot = first_panic.lock().unwrap();
                                if slot.is_none() {
                                    *slot = Some(msg);
                                }
                                cancelled.store(true, Ordering::Relaxed);
                                break;
                            }
                        }
                    }
                }
                done[thread_idx].store(true, Ordering::Relaxed);
            });
            self.handles.push(handle);
        }
        self.started = true;
    }

    /// Ask every worker to exit once it next reaches a poison pill, without
    /// discarding items already queued ahead of it.
    pub fn request_stop(&self) {
        for _ in 0..self.handles.len() {
            self.queue.push(None);
        }
    }

    /// Ask every worker to exit as soon as it finishes its current item,
    /// regardless of what else is still queued. Sets the shared `cancelled`
    /// flag each worker checks at the top of its loop, and best-effort wakes
    /// any worker already blocked in `pop()` so it doesn't wait for a real
    /// item that will never come.
    pub fn request_cancellation(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
        for _ in 0..self.handles.len() {
            let _ = self.queue.try_push(None);
        }
    }

    /// Block until every worker has exited. If cancellation was not already
    /// requested, first requests a polite stop that drains the queue.
    /// Propagates the first worker panic, if any, as an `InvalidState`
    /// error.
    pub fn wait(&mut self) -> Result<()> {
        if !self.started {
            return Ok(());
        }
        if !self.cancelled.load(Ordering::Relaxed) {
            self.request_stop();
        }
        // keep nudging in case earlier pills got consumed by workers that
        // then picked up more real work pushed concurrently by the caller
        while !self.all_done() {
            let _ = self.queue.try_push(None);
            std::thread::sleep(Duration::from_millis(10));
        }
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
        self.started = false;

        if let Some(msg) = self.first_panic.lock().unwrap().take() {
            return Err(TorrentError::InvalidState(format!(
                "worker thread panicked: {msg}"
            )));
        }
        Ok(())
    }

    fn all_done(&self) -> bool {
        self.done.iter().all(|d| d.load(Ordering::Relaxed))
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

impl<T: Send + 'static> Drop for ChunkProcessor<T> {
    fn drop(&mut self) {
        if self.started {
            let _ = self.wait();
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn processes_all_items() {
        let mut proc = ChunkProcessor::new(8);
        let total = Arc::new(AtomicUsize::new(0));
        let total2 = total.clone();
        proc.start(2, move |v: usize| {
            total2.fetch_add(v, Ordering::Relaxed);
        });
        for i in 1..=10 {
            proc.push(i);
        }
        proc.wait().unwrap();
        assert_eq!(total.load(Ordering::Relaxed), 55);
    }

    #[test]
    fn worker_panic_surfaces_as_invalid_state() {
        let mut proc = ChunkProcessor::new(8);
        proc.start(1, |_: usize| panic!("boom"));
        proc.push(1);
        let err = proc.wait().unwrap_err();
        assert!(matches!(err, TorrentError::InvalidState(_)));
    }

    #[test]
    fn request_cancellation_stops_workers_under_load() {
        let mut proc = ChunkProcessor::new(4);
        let processed = Arc::new(AtomicUsize::new(0));
        let processed2 = processed.clone();
        proc.start(2, move |_: usize| {
            processed2.fetch_add(1, Ordering::Relaxed);
            std::thread::sleep(Duration::from_micros(200));
        });

        // flood the queue well past what 2 workers can drain quickly
        for i in 0..100_000 {
            let _ = proc.queue().try_push(Some(i));
        }

        std::thread::sleep(Duration::from_millis(10));
        let started = std::time::Instant::now();
        proc.request_cancellation();
        proc.wait().unwrap();

        assert!(started.elapsed() < Duration::from_millis(100));
        assert!(proc.is_cancelled());
        assert!(processed.load(Ordering::Relaxed) < 100_000);
    }
}
