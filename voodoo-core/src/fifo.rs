//! PCI FIFO of pending register writes

use bincode::{Decode, Encode};
use std::collections::VecDeque;

pub const FIFO_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub struct FifoEntry {
    // Full register address including chip select bits
    pub offset: u32,
    pub data: u32,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct PciFifo(VecDeque<FifoEntry>);

impl PciFifo {
    pub fn new() -> Self {
        Self(VecDeque::with_capacity(FIFO_CAPACITY))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.0.len() >= FIFO_CAPACITY
    }

    pub fn free_space(&self) -> usize {
        FIFO_CAPACITY - self.0.len()
    }

    // Callers drain a full FIFO before pushing
    pub fn push(&mut self, offset: u32, data: u32) {
        debug_assert!(!self.is_full());
        self.0.push_back(FifoEntry { offset, data });
    }

    pub fn pop(&mut self) -> Option<FifoEntry> {
        self.0.pop_front()
    }
}

impl Default for PciFifo {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_in_order() {
        let mut fifo = PciFifo::new();
        let entries: Vec<(u32, u32)> = (0..FIFO_CAPACITY).map(|_| rand::random()).collect();

        for (i, &(offset, data)) in entries.iter().enumerate() {
            assert_eq!(fifo.free_space(), FIFO_CAPACITY - i);
            assert!(!fifo.is_full());
            fifo.push(offset, data);
        }
        assert!(fifo.is_full());
        assert_eq!(fifo.free_space(), 0);

        for &(offset, data) in &entries {
            assert_eq!(fifo.pop(), Some(FifoEntry { offset, data }));
        }
        assert!(fifo.is_empty());
        assert_eq!(fifo.pop(), None);
    }
}
