//! Coalescing event streams for pointer interactions.
//!
//! Each interaction (viewport drag, pen stroke, minimap drag, cursor tracking) gets its
//! own bounded queue and a single consumer task. The consumer wakes up, drains the queue
//! down to the newest event and acts once on that one, so bursts of pointer events cost
//! one recomposition instead of one per event.
//!
//! A full queue never loses the newest event: it is parked in an overflow slot, which
//! the consumer checks after every drain. Older events are what get skipped.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, trace, warn};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

/// Newest event that did not fit in the queue.
type Overflow<T> = Arc<Mutex<Option<T>>>;

fn lock<T>(overflow: &Mutex<Option<T>>) -> MutexGuard<'_, Option<T>> {
    overflow.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Producer side of one interaction stream.
pub struct EventStream<T> {
    name: &'static str,
    tx: mpsc::Sender<T>,
    overflow: Overflow<T>,
    task: JoinHandle<usize>,
    runtime: Handle,
}

impl<T> std::fmt::Debug for EventStream<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStream")
            .field("name", &self.name)
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

impl<T: Send + 'static> EventStream<T> {
    /// Spawns the consumer task on `runtime`.
    ///
    /// `on_settled` runs on the consumer task with the newest event of every burst.
    pub fn spawn<F>(name: &'static str, runtime: &Handle, capacity: usize, mut on_settled: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        let (tx, mut rx) = mpsc::channel::<T>(capacity.max(1));
        let overflow: Overflow<T> = Arc::new(Mutex::new(None));
        let parked = Arc::clone(&overflow);
        let task = runtime.spawn(async move {
            let mut received = 0usize;
            let mut settled = 0usize;
            while let Some(mut latest) = rx.recv().await {
                received += 1;
                {
                    // The producer only parks an event while holding this lock, so
                    // everything still queued here is older than the parked one.
                    let mut slot = lock(&parked);
                    while let Ok(next) = rx.try_recv() {
                        latest = next;
                        received += 1;
                    }
                    if let Some(newest) = slot.take() {
                        latest = newest;
                        received += 1;
                    }
                }
                on_settled(latest);
                settled += 1;
            }
            let leftover = lock(&parked).take();
            if let Some(newest) = leftover {
                received += 1;
                on_settled(newest);
                settled += 1;
            }
            debug!(
                "{} stream done: {} events coalesced into {}",
                name, received, settled
            );
            settled
        });
        Self {
            name,
            tx,
            overflow,
            task,
            runtime: runtime.clone(),
        }
    }

    /// Queues an event without blocking.
    ///
    /// When the queue is full the event replaces whatever waits in the overflow slot.
    /// Returns false only when the consumer is gone.
    pub fn push(&self, event: T) -> bool {
        let mut slot = lock(&self.overflow);
        if slot.is_some() {
            *slot = Some(event);
            return true;
        }
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                trace!("{} stream queue full, parking newest event", self.name);
                *slot = Some(event);
                true
            }
            Err(TrySendError::Closed(_)) => {
                debug!("{} stream already closed", self.name);
                false
            }
        }
    }

    /// Closes the queue and waits for the consumer to handle the last event.
    ///
    /// Returns how many settled events the consumer acted on. Must be called from a
    /// thread that is not driving the runtime.
    pub fn finish(self) -> usize {
        let EventStream {
            name,
            tx,
            overflow: _,
            task,
            runtime,
        } = self;
        drop(tx);
        match runtime.block_on(task) {
            Ok(settled) => settled,
            Err(e) => {
                warn!("{} stream consumer failed: {}", name, e);
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc as std_mpsc;
    use std::sync::{Arc, Mutex};

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .unwrap()
    }

    #[test]
    fn last_event_is_always_delivered() {
        let rt = runtime();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let stream = EventStream::spawn("test", rt.handle(), 1000, move |event: i32| {
            sink.lock().unwrap().push(event);
        });
        for i in 0..500 {
            assert!(stream.push(i));
        }
        let settled = stream.finish();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.last(), Some(&499));
        assert_eq!(settled, seen.len());
        assert!(seen.len() <= 500);
        assert!(seen.windows(2).all(|pair| pair[0] < pair[1]));
    }

    /// Consumer that blocks inside the handler for event 0 until released.
    fn stalled_stream(
        rt: &tokio::runtime::Runtime,
        capacity: usize,
    ) -> (EventStream<i32>, Arc<Mutex<Vec<i32>>>, std_mpsc::Sender<()>) {
        let (entered_tx, entered_rx) = std_mpsc::channel::<()>();
        let (release_tx, release_rx) = std_mpsc::channel::<()>();
        let release_rx = Mutex::new(release_rx);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let stream = EventStream::spawn("stalled", rt.handle(), capacity, move |event: i32| {
            sink.lock().unwrap().push(event);
            if event == 0 {
                entered_tx.send(()).unwrap();
                release_rx.lock().unwrap().recv().unwrap();
            }
        });
        assert!(stream.push(0));
        entered_rx.recv().unwrap();
        (stream, seen, release_tx)
    }

    #[test]
    fn full_queue_keeps_newest_event() {
        let rt = runtime();
        let (stream, seen, release) = stalled_stream(&rt, 1);

        for i in 1..=20 {
            assert!(stream.push(i));
        }
        release.send(()).unwrap();
        assert_eq!(stream.finish(), 2);

        assert_eq!(*seen.lock().unwrap(), vec![0, 20]);
    }

    #[test]
    fn burst_past_capacity_settles_on_release_position() {
        let rt = runtime();
        let (stream, seen, release) = stalled_stream(&rt, 16);

        for i in 1..=20 {
            assert!(stream.push(i));
        }
        release.send(()).unwrap();
        stream.finish();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.last(), Some(&20));
        assert!(seen.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn empty_stream_finishes_without_events() {
        let rt = runtime();
        let stream = EventStream::spawn("idle", rt.handle(), 4, |_: ()| {});
        assert_eq!(stream.finish(), 0);
    }
}
