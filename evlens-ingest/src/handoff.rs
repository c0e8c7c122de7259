//! Blocking yield hand-off between the ingest loop and its consumer.
//!
//! The producer calls [`YieldPoint::yield_now`] from a blocking thread and
//! stays parked until the consumer answers the [`YieldRequest`]. The consumer
//! receives requests either from async code ([`HandoffReceiver::recv`]) or
//! from a plain thread ([`HandoffReceiver::blocking_recv`]).
//!
//! ```text
//!  producer                      consumer
//!  yield_now(stats) ──request──▶ recv()
//!      (parked)                  sync views, redraw
//!  Resumed ◀──────────resume──── request.resume()
//! ```

use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// Producer progress reported with each hand-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct YieldStats {
    /// Messages pulled from the source.
    pub messages: u64,
    /// Events appended to the table.
    pub events: u64,
    /// Rows stored in the table.
    pub stored_rows: usize,
    /// Nodes in the schema tree.
    pub tree_nodes: usize,
    /// Hand-offs so far, this one included.
    pub yields: u64,
    /// Producer time spent in the slice that just ended.
    pub slice: Duration,
}

/// How a hand-off ended, from the producer's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandoffOutcome {
    /// The consumer resumed the producer.
    Resumed,
    /// The consumer is gone; nobody will ever resume.
    Disconnected,
}

/// Create a connected producer/consumer hand-off pair.
pub fn channel() -> (YieldPoint, HandoffReceiver) {
    // At most one request is ever in flight: the producer waits for its answer.
    let (tx, rx) = mpsc::channel(1);
    (YieldPoint { tx }, HandoffReceiver { rx })
}

/// Producer side of the hand-off.
///
/// Dropping it closes the channel, which wakes a waiting consumer with `None`.
#[derive(Debug)]
pub struct YieldPoint {
    tx: mpsc::Sender<YieldRequest>,
}

impl YieldPoint {
    /// Hand control to the consumer and block until it answers.
    ///
    /// # Panics
    ///
    /// Panics if called from within an async execution context; run the
    /// producer on a blocking thread.
    pub fn yield_now(&self, stats: YieldStats) -> HandoffOutcome {
        let (resume_tx, resume_rx) = oneshot::channel();
        let request = YieldRequest {
            stats,
            resume: resume_tx,
        };

        if self.tx.blocking_send(request).is_err() {
            return HandoffOutcome::Disconnected;
        }

        match resume_rx.blocking_recv() {
            Ok(()) => HandoffOutcome::Resumed,
            // The request was dropped: either answered by drop, or discarded
            // together with the receiver.
            Err(_) if self.tx.is_closed() => HandoffOutcome::Disconnected,
            Err(_) => HandoffOutcome::Resumed,
        }
    }

    /// Check if the consumer dropped its receiver.
    pub fn is_disconnected(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer side of the hand-off.
#[derive(Debug)]
pub struct HandoffReceiver {
    rx: mpsc::Receiver<YieldRequest>,
}

impl HandoffReceiver {
    /// Wait for the next hand-off. `None` once the producer stopped.
    pub async fn recv(&mut self) -> Option<YieldRequest> {
        self.rx.recv().await
    }

    /// Blocking variant of [`recv`](Self::recv) for consumers on a plain
    /// thread.
    pub fn blocking_recv(&mut self) -> Option<YieldRequest> {
        self.rx.blocking_recv()
    }

    /// Take a pending hand-off without waiting.
    pub fn try_recv(&mut self) -> Option<YieldRequest> {
        self.rx.try_recv().ok()
    }
}

/// A parked producer waiting for the consumer.
///
/// Resumes the producer on [`resume`](Self::resume) or when dropped.
#[derive(Debug)]
#[must_use = "the producer stays parked until the request is resumed or dropped"]
pub struct YieldRequest {
    stats: YieldStats,
    resume: oneshot::Sender<()>,
}

impl YieldRequest {
    /// Producer progress at the time of the hand-off.
    pub fn stats(&self) -> &YieldStats {
        &self.stats
    }

    /// Release the producer.
    pub fn resume(self) {
        // The producer may have been torn down meanwhile; nothing to do then.
        let _ = self.resume.send(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;

    #[test]
    fn producer_waits_for_resume() {
        let (point, mut receiver) = channel();
        let answered = Arc::new(AtomicBool::new(false));

        let producer = {
            let answered = Arc::clone(&answered);
            thread::spawn(move || {
                let outcome = point.yield_now(YieldStats {
                    events: 3,
                    ..YieldStats::default()
                });
                (outcome, answered.load(Ordering::SeqCst))
            })
        };

        let request = receiver.blocking_recv().unwrap();
        assert_eq!(request.stats().events, 3);
        thread::sleep(Duration::from_millis(20));
        answered.store(true, Ordering::SeqCst);
        request.resume();

        let (outcome, saw_answer) = producer.join().unwrap();
        assert_eq!(outcome, HandoffOutcome::Resumed);
        assert!(saw_answer);

        // The producer thread dropped its yield point.
        assert!(receiver.blocking_recv().is_none());
    }

    #[test]
    fn dropping_the_request_resumes() {
        let (point, mut receiver) = channel();
        let producer = thread::spawn(move || point.yield_now(YieldStats::default()));

        drop(receiver.blocking_recv().unwrap());
        assert_eq!(producer.join().unwrap(), HandoffOutcome::Resumed);
    }

    #[test]
    fn dropped_receiver_disconnects() {
        let (point, receiver) = channel();
        drop(receiver);

        assert!(point.is_disconnected());
        assert_eq!(
            point.yield_now(YieldStats::default()),
            HandoffOutcome::Disconnected
        );
    }

    #[tokio::test]
    async fn async_consumer() {
        let (point, mut receiver) = channel();
        let producer = tokio::task::spawn_blocking(move || {
            let first = point.yield_now(YieldStats::default());
            let second = point.yield_now(YieldStats::default());
            (first, second)
        });

        let mut answered = 0;
        while let Some(request) = receiver.recv().await {
            answered += 1;
            request.resume();
        }

        assert_eq!(answered, 2);
        assert_eq!(
            producer.await.unwrap(),
            (HandoffOutcome::Resumed, HandoffOutcome::Resumed)
        );
    }
}
