//! # Handoff Channel
//!
//! Single-producer/single-consumer FIFO carrying one frequency value per
//! analysed block from the analysis context to the output context.
//!
//! `push` blocks while the channel is full. The consumer side waits for a
//! value and then drains everything already queued before waiting again.
//! Values are delivered in order, never dropped and never merged.
//! Dropping either end disconnects the other.

use crossbeam_channel::{Receiver, Sender, TryRecvError};

use crate::error::{Result, TunerError};

/// Creates a handoff channel buffering up to `capacity` values.
pub fn channel(capacity: usize) -> (FrequencySender, FrequencyReceiver) {
    let (tx, rx) = crossbeam_channel::bounded(capacity);
    (FrequencySender { tx }, FrequencyReceiver { rx })
}

/// Producer end, owned by the analysis context.
#[derive(Debug)]
pub struct FrequencySender {
    tx: Sender<f32>,
}

impl FrequencySender {
    /// Pushes one frequency, blocking while the channel is full.
    ///
    /// # Errors
    /// Returns [`TunerError::Disconnected`] if the receiver was dropped.
    pub fn push(&self, frequency: f32) -> Result<()> {
        self.tx.send(frequency).map_err(|_| TunerError::Disconnected)
    }
}

/// Consumer end, owned by the output context.
#[derive(Debug)]
pub struct FrequencyReceiver {
    rx: Receiver<f32>,
}

impl FrequencyReceiver {
    /// Blocks until at least one value is available, then hands every
    /// queued value to `handle` in FIFO order. Returns how many were handled.
    ///
    /// # Errors
    /// Returns [`TunerError::Disconnected`] once the sender is gone and the
    /// queue is empty.
    pub fn drain<F: FnMut(f32)>(&self, mut handle: F) -> Result<usize> {
        let first = self.rx.recv().map_err(|_| TunerError::Disconnected)?;
        handle(first);

        let mut handled = 1;
        loop {
            match self.rx.try_recv() {
                Ok(frequency) => {
                    handle(frequency);
                    handled += 1;
                }
                // Queue empty, or emptied after disconnect: the next call
                // to `drain` reports the disconnect.
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        Ok(handled)
    }

    /// Number of values currently queued.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn drains_everything_queued_in_order() {
        let (tx, rx) = channel(8);
        for value in [261.63, 440.0, 110.0] {
            tx.push(value).unwrap();
        }

        let mut received = Vec::new();
        let handled = rx.drain(|f| received.push(f)).unwrap();
        assert_eq!(handled, 3);
        assert_eq!(received, vec![261.63, 440.0, 110.0]);
        assert!(rx.is_empty());
    }

    #[test]
    fn drain_reports_disconnect_after_last_value() {
        let (tx, rx) = channel(4);
        tx.push(1.0).unwrap();
        drop(tx);

        let mut received = Vec::new();
        assert_eq!(rx.drain(|f| received.push(f)).unwrap(), 1);
        assert!(matches!(rx.drain(|_| {}), Err(TunerError::Disconnected)));
        assert_eq!(received, vec![1.0]);
    }

    #[test]
    fn push_fails_without_receiver() {
        let (tx, rx) = channel(1);
        drop(rx);
        assert!(matches!(tx.push(440.0), Err(TunerError::Disconnected)));
    }

    #[test]
    fn full_channel_applies_back_pressure() {
        let (tx, rx) = channel(2);
        let producer = thread::spawn(move || {
            for i in 0..100 {
                tx.push(i as f32).unwrap();
            }
        });

        let mut received = Vec::new();
        while rx.drain(|f| received.push(f)).is_ok() {
            assert!(received.len() <= 100);
        }
        producer.join().unwrap();

        let expected: Vec<f32> = (0..100).map(|i| i as f32).collect();
        assert_eq!(received, expected);
    }
}
