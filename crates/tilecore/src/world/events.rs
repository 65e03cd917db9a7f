use std::collections::VecDeque;

/// FIFO queue of gameplay events, drained once per frame by the scene owner.
#[derive(Debug)]
pub struct EventBus<E> {
    pending: VecDeque<E>,
    posted_total: u64,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self {
            pending: VecDeque::new(),
            posted_total: 0,
        }
    }
}

impl<E> EventBus<E> {
    pub fn post(&mut self, event: E) {
        self.pending.push_back(event);
        self.posted_total = self.posted_total.saturating_add(1);
    }

    /// Events posted while handling a popped event are seen by the same drain.
    pub fn pop(&mut self) -> Option<E> {
        self.pending.pop_front()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn posted_total(&self) -> u64 {
        self.posted_total
    }
}
