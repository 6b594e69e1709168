use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

/// FIFO queue with a runtime-mutable capacity, shared between a single
/// producer and a pool of workers via `Arc`.
///
/// Built directly on `Mutex`+`Condvar` rather than `crossbeam-channel`
/// because [`set_capacity`](Self::set_capacity) must be callable while
/// producers/consumers are already blocked on the queue; a channel's
/// capacity is fixed at construction.
pub struct BoundedQueue<T> {
    state: Mutex<State<T>>,
    not_empty: Condvar,
    not_full: Condvar,
}

struct State<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedQueue<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(State {
                items: VecDeque::new(),
                capacity,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
        }
    }

    /// Block until there is room, then push.
    pub fn push(&self, item: T) {
        let mut state = self.state.lock().unwrap();
        while state.items.len() >= state.capacity {
            state = self.not_full.wait(state).unwrap();
        }
        state.items.push_back(item);
        drop(state);
        self.not_empty.notify_all();
    }

    /// Push without blocking; returns the item back if the queue is full.
    pub fn try_push(&self, item: T) -> Result<(), T> {
        let mut state = self.state.lock().unwrap();
        if state.items.len() >= state.capacity {
            return Err(item);
        }
        state.items.push_back(item);
        drop(state);
        self.not_empty.notify_all();
        Ok(())
    }

    /// Block until an item is available, then pop it.
    pub fn pop(&self) -> T {
        let mut state = self.state.lock().unwrap();
        while state.items.is_empty() {
            state = self.not_empty.wait(state).unwrap();
        }
        let item = state.items.pop_front().unwrap();
        drop(state);
        self.not_full.notify_all();
        item
    }

    /// Pop without blocking; `None` if the queue is empty.
    pub fn try_pop(&self) -> Option<T> {
        let mut state = self.state.lock().unwrap();
        let item = state.items.pop_front();
        drop(state);
        if item.is_some() {
            self.not_full.notify_all();
        }
        item
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Change the capacity at runtime. Does not evict already-queued items
    /// even if the new capacity is smaller than the current length; it only
    /// changes the threshold future pushes block on.
    pub fn set_capacity(&self, capacity: usize) {
        let mut state = self.state.lock().unwrap();
        state.capacity = capacity;
        drop(state);
        self.not_full.notify_all();
    }
}
