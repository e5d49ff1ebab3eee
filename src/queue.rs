//! Bounded packet handoff between producers and the publishing thread.

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;

use crate::packet::Packet;

struct Inner {
    buf: VecDeque<Packet>,
    closed: bool,
}

/// Thread-safe FIFO with a fixed capacity.
///
/// Producers use the non-blocking [`try_push`](PacketQueue::try_push); the
/// single consumer blocks in [`wait_and_pop`](PacketQueue::wait_and_pop).
/// A full queue rejects new packets instead of blocking the producer, which
/// is how back-pressure from a slow consumer is expressed.
///
/// [`close`](PacketQueue::close) wakes a blocked consumer so shutdown does
/// not have to wait for another packet to arrive.
pub struct PacketQueue {
    inner: Mutex<Inner>,
    available: Condvar,
    capacity: usize,
}

impl PacketQueue {
    /// Create a queue holding at most `capacity` packets.
    pub fn bounded(capacity: usize) -> Self {
        assert!(capacity > 0, "queue capacity must be positive");
        Self {
            inner: Mutex::new(Inner {
                buf: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            available: Condvar::new(),
            capacity,
        }
    }

    /// Push a packet without blocking.
    ///
    /// At capacity (or after [`close`](PacketQueue::close)) the packet is
    /// handed back to the caller, who decides whether to drop or retry.
    pub fn try_push(&self, packet: Packet) -> Result<(), Packet> {
        let mut inner = self.inner.lock();
        if inner.closed || inner.buf.len() >= self.capacity {
            return Err(packet);
        }
        inner.buf.push_back(packet);
        self.available.notify_one();
        Ok(())
    }

    /// Block until a packet is available and return the oldest one.
    ///
    /// Returns `None` once the queue has been closed and drained.
    pub fn wait_and_pop(&self) -> Option<Packet> {
        let mut inner = self.inner.lock();
        loop {
            if let Some(packet) = inner.buf.pop_front() {
                return Some(packet);
            }
            if inner.closed {
                return None;
            }
            self.available.wait(&mut inner);
        }
    }

    /// Close the queue, refusing further pushes and waking the consumer.
    pub fn close(&self) {
        let mut inner = self.inner.lock();
        inner.closed = true;
        self.available.notify_all();
    }

    /// Number of packets currently waiting.
    pub fn len(&self) -> usize {
        self.inner.lock().buf.len()
    }

    /// Whether no packets are waiting.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of packets the queue holds, fixed at construction.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::TimeBase;
    use bytes::Bytes;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn packet(tag: u8) -> Packet {
        Packet::new(Bytes::copy_from_slice(&[tag]), TimeBase::new(1, 25))
    }

    #[test]
    fn test_capacity_bound() {
        let queue = PacketQueue::bounded(3);
        assert_eq!(queue.capacity(), 3);
        assert!(queue.is_empty());

        for i in 0..3 {
            assert!(queue.try_push(packet(i)).is_ok());
        }
        assert_eq!(queue.len(), 3);
        // One over capacity comes back to the caller
        let rejected = queue.try_push(packet(99)).unwrap_err();
        assert_eq!(rejected.data[0], 99);

        // Popping one frees a slot again
        assert!(queue.wait_and_pop().is_some());
        assert!(queue.try_push(packet(4)).is_ok());
    }

    #[test]
    fn test_fifo_order() {
        let queue = PacketQueue::bounded(8);
        for i in 0..8 {
            queue.try_push(packet(i)).unwrap();
        }
        for i in 0..8 {
            assert_eq!(queue.wait_and_pop().unwrap().data[0], i);
        }
    }

    #[test]
    fn test_fifo_order_across_threads() {
        let queue = Arc::new(PacketQueue::bounded(4));
        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for i in 0..32u8 {
                    let mut pkt = packet(i);
                    loop {
                        match queue.try_push(pkt) {
                            Ok(()) => break,
                            Err(back) => {
                                pkt = back;
                                thread::sleep(Duration::from_micros(200));
                            }
                        }
                    }
                }
            })
        };

        for i in 0..32u8 {
            assert_eq!(queue.wait_and_pop().unwrap().data[0], i);
        }
        producer.join().unwrap();
    }

    #[test]
    fn test_close_wakes_blocked_consumer() {
        let queue = Arc::new(PacketQueue::bounded(2));
        let consumer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.wait_and_pop())
        };

        thread::sleep(Duration::from_millis(20));
        queue.close();
        assert!(consumer.join().unwrap().is_none());
    }

    #[test]
    fn test_close_drains_before_none() {
        let queue = PacketQueue::bounded(2);
        queue.try_push(packet(7)).unwrap();
        queue.close();

        assert!(queue.try_push(packet(8)).is_err());
        assert_eq!(queue.wait_and_pop().unwrap().data[0], 7);
        assert!(queue.wait_and_pop().is_none());
    }
}
