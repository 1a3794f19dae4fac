//! Asynchronous FIFO between the input producer task and the UI loop.
//!
//! `enqueue` never blocks. When a consumer is parked in `dequeue` the event is
//! handed to the oldest waiter directly, otherwise it is appended to the buffer.
//! A waiter whose future is dropped before it observes its event puts that event
//! back at the front of the buffer, so cancellation (e.g. losing a `select!`
//! race against a timer) never loses or duplicates an event.
//!
//! The queue is built for exactly one consumer. Several concurrent consumers
//! would each receive a disjoint subset of events, which no caller wants; a
//! broadcast design would be needed instead.

use core_events::{QUEUE_BUFFERED, QUEUE_DIRECT_HANDOFFS, QUEUE_ENQUEUED};
use std::collections::VecDeque;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::oneshot;
use tracing::trace;

struct Inner<T> {
    buffer: VecDeque<T>,
    waiters: VecDeque<oneshot::Sender<T>>,
}

/// Cloneable handle to a shared FIFO.
pub struct InputQueue<T> {
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T> Clone for InputQueue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Default for InputQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for InputQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("InputQueue")
            .field("buffered", &inner.buffer.len())
            .field("waiters", &inner.waiters.len())
            .finish()
    }
}

impl<T> InputQueue<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                buffer: VecDeque::new(),
                waiters: VecDeque::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        // A poisoned lock only means another thread panicked mid-push; the
        // deques themselves are still structurally valid.
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Append an event, resuming the oldest waiting consumer if there is one.
    pub fn enqueue(&self, mut item: T) {
        QUEUE_ENQUEUED.fetch_add(1, Ordering::Relaxed);
        let mut inner = self.lock();
        while let Some(waiter) = inner.waiters.pop_front() {
            match waiter.send(item) {
                Ok(()) => {
                    QUEUE_DIRECT_HANDOFFS.fetch_add(1, Ordering::Relaxed);
                    trace!(target: "input.queue", "handoff");
                    return;
                }
                // Waiter went away between registering and now; try the next one.
                Err(back) => item = back,
            }
        }
        inner.buffer.push_back(item);
        QUEUE_BUFFERED.fetch_add(1, Ordering::Relaxed);
        trace!(target: "input.queue", buffered = inner.buffer.len(), "buffered");
    }

    /// Pop the oldest buffered event without waiting.
    pub fn try_dequeue(&self) -> Option<T> {
        self.lock().buffer.pop_front()
    }

    /// Suspend until an event is available and return it.
    pub async fn dequeue(&self) -> T {
        loop {
            let rx = {
                let mut inner = self.lock();
                if let Some(item) = inner.buffer.pop_front() {
                    return item;
                }
                let (tx, rx) = oneshot::channel();
                inner.waiters.push_back(tx);
                rx
            };
            let mut waiter = Waiter {
                queue: self,
                rx: Some(rx),
            };
            if let Some(item) = waiter.recv().await {
                return item;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.lock().buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().buffer.is_empty()
    }

    #[cfg(test)]
    fn waiter_count(&self) -> usize {
        self.lock().waiters.len()
    }
}

/// Registered consumer. Returns an undelivered event to the queue on drop.
struct Waiter<'q, T> {
    queue: &'q InputQueue<T>,
    rx: Option<oneshot::Receiver<T>>,
}

impl<T> Waiter<'_, T> {
    async fn recv(&mut self) -> Option<T> {
        let rx = self.rx.as_mut()?;
        let result = rx.await;
        self.rx = None;
        result.ok()
    }
}

impl<T> Drop for Waiter<'_, T> {
    fn drop(&mut self) {
        let Some(mut rx) = self.rx.take() else {
            return;
        };
        rx.close();
        if let Ok(item) = rx.try_recv() {
            trace!(target: "input.queue", "requeue_cancelled_waiter");
            self.queue.lock().buffer.push_front(item);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::task::Poll;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn buffered_events_come_out_in_order() {
        let q = InputQueue::new();
        for i in 0..5 {
            q.enqueue(i);
        }
        let mut out = Vec::new();
        for _ in 0..5 {
            out.push(q.dequeue().await);
        }
        assert_eq!(out, vec![0, 1, 2, 3, 4]);
        assert!(q.is_empty());
    }

    #[tokio::test]
    async fn enqueue_resumes_parked_consumer() {
        let q = InputQueue::new();
        let consumer = {
            let q = q.clone();
            tokio::spawn(async move { q.dequeue().await })
        };
        while q.waiter_count() == 0 {
            tokio::task::yield_now().await;
        }
        q.enqueue("x");
        let got = timeout(Duration::from_millis(200), consumer)
            .await
            .expect("consumer resumed")
            .expect("join");
        assert_eq!(got, "x");
        assert!(q.is_empty(), "handoff must bypass the buffer");
    }

    #[tokio::test]
    async fn cancelled_dequeue_does_not_lose_events() {
        let q = InputQueue::new();
        let timed_out = timeout(Duration::from_millis(5), q.dequeue()).await;
        assert!(timed_out.is_err());
        assert_eq!(q.waiter_count(), 1, "stale waiter stays registered");
        q.enqueue(7);
        q.enqueue(8);
        assert_eq!(q.dequeue().await, 7);
        assert_eq!(q.dequeue().await, 8);
    }

    #[tokio::test]
    async fn dropped_waiter_returns_handed_off_event_to_the_front() {
        let q = InputQueue::new();
        let mut pending = Box::pin(q.dequeue());
        let polled = std::future::poll_fn(|cx| Poll::Ready(pending.as_mut().poll(cx))).await;
        assert!(polled.is_pending());
        assert_eq!(q.waiter_count(), 1);

        q.enqueue(1); // handed to the parked waiter
        q.enqueue(2); // buffered behind it
        assert_eq!(q.len(), 1);
        drop(pending);

        assert_eq!(q.try_dequeue(), Some(1));
        assert_eq!(q.try_dequeue(), Some(2));
        assert_eq!(q.try_dequeue(), None);
    }

    #[tokio::test]
    async fn try_dequeue_never_waits() {
        let q: InputQueue<u8> = InputQueue::new();
        assert_eq!(q.try_dequeue(), None);
        q.enqueue(1);
        assert_eq!(q.len(), 1);
        assert_eq!(q.try_dequeue(), Some(1));
    }

    #[tokio::test]
    async fn interleaved_producer_consumer_preserves_fifo() {
        let q = InputQueue::new();
        let producer = {
            let q = q.clone();
            tokio::spawn(async move {
                for i in 0..200u32 {
                    q.enqueue(i);
                    if i % 7 == 0 {
                        tokio::task::yield_now().await;
                    }
                }
            })
        };
        let mut seen = Vec::with_capacity(200);
        while seen.len() < 200 {
            seen.push(q.dequeue().await);
        }
        producer.await.unwrap();
        assert_eq!(seen, (0..200).collect::<Vec<_>>());
    }
}
