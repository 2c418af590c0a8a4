//! # Capture Buffers
//!
//! Double-buffered hand-over of raw sample blocks from a capture front end
//! to the analysis context.
//!
//! Exactly two regions of `N + M` samples exist. The capture side fills a
//! free region and publishes it; the analysis side leases it as a
//! [`RawBlock`]. Releasing (or dropping) the block returns the region to the
//! capture side, so capture of the next block can start while the current
//! one is still being analysed.

use std::ops::Deref;

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use log::debug;

use crate::error::{Result, TunerError};

/// Number of capture regions that alternate between capture and analysis.
pub const REGIONS: usize = 2;

/// A source of raw capture blocks.
pub trait BlockSource {
    /// Blocks until the next filled region is available.
    ///
    /// # Errors
    /// Returns [`TunerError::SourceClosed`] when no more blocks will come.
    fn next_block(&mut self) -> Result<RawBlock>;
}

impl<S: BlockSource + ?Sized> BlockSource for Box<S> {
    fn next_block(&mut self) -> Result<RawBlock> {
        (**self).next_block()
    }
}

/// A filled capture region leased to the analysis context.
#[derive(Debug)]
pub struct RawBlock {
    samples: Option<Box<[u8]>>,
    recycle: Sender<Box<[u8]>>,
}

impl RawBlock {
    pub fn samples(&self) -> &[u8] {
        self.samples.as_deref().unwrap_or(&[])
    }

    /// Hands the region back to capture. Same as dropping the block.
    pub fn release(self) {}
}

impl Deref for RawBlock {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.samples()
    }
}

impl Drop for RawBlock {
    fn drop(&mut self) {
        if let Some(region) = self.samples.take() {
            // Fails only when the capture side is gone, and then nobody
            // needs the region any more.
            let _ = self.recycle.send(region);
        }
    }
}

/// Creates the two capture regions of `block_len` samples each.
pub fn block_pool(block_len: usize) -> (BlockWriter, BlockReader) {
    let (free_tx, free_rx) = crossbeam_channel::bounded(REGIONS);
    let (filled_tx, filled_rx) = crossbeam_channel::bounded(REGIONS);
    for _ in 0..REGIONS {
        // Cannot fail: the channel has room for every region.
        let _ = free_tx.send(vec![0u8; block_len].into_boxed_slice());
    }

    (
        BlockWriter {
            free_rx,
            filled_tx,
            block_len,
        },
        BlockReader {
            filled_rx,
            recycle: free_tx,
        },
    )
}

/// Capture side of the pool.
#[derive(Debug)]
pub struct BlockWriter {
    free_rx: Receiver<Box<[u8]>>,
    filled_tx: Sender<Box<[u8]>>,
    block_len: usize,
}

impl BlockWriter {
    pub fn block_len(&self) -> usize {
        self.block_len
    }

    /// Waits for a free region, lets `fill` write it, and publishes it.
    ///
    /// # Errors
    /// Returns [`TunerError::Disconnected`] if the reader and every leased
    /// block are gone.
    pub fn fill_with<F: FnOnce(&mut [u8])>(&self, fill: F) -> Result<()> {
        let mut region = self.free_rx.recv().map_err(|_| TunerError::Disconnected)?;
        fill(&mut region[..]);
        self.publish(region)
    }

    /// Like [`fill_with`](Self::fill_with) but fails with
    /// [`TunerError::NoFreeRegion`] instead of waiting.
    pub fn try_fill_with<F: FnOnce(&mut [u8])>(&self, fill: F) -> Result<()> {
        let mut region = self.try_acquire()?.ok_or(TunerError::NoFreeRegion)?;
        fill(&mut region[..]);
        self.publish(region)
    }

    /// Takes a free region without waiting, if there is one.
    fn try_acquire(&self) -> Result<Option<Box<[u8]>>> {
        match self.free_rx.try_recv() {
            Ok(region) => Ok(Some(region)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(TunerError::Disconnected),
        }
    }

    fn publish(&self, region: Box<[u8]>) -> Result<()> {
        // Never blocks: the filled queue has room for every region.
        self.filled_tx.send(region).map_err(|_| TunerError::Disconnected)
    }
}

/// Analysis side of the pool.
#[derive(Debug)]
pub struct BlockReader {
    filled_rx: Receiver<Box<[u8]>>,
    recycle: Sender<Box<[u8]>>,
}

impl BlockSource for BlockReader {
    fn next_block(&mut self) -> Result<RawBlock> {
        let region = self.filled_rx.recv().map_err(|_| TunerError::SourceClosed)?;
        Ok(RawBlock {
            samples: Some(region),
            recycle: self.recycle.clone(),
        })
    }
}

/// Collects a continuous sample stream into capture regions.
///
/// Meant for device callbacks that deliver samples in arbitrary chunk
/// sizes and must never wait: when both regions are leased, incoming
/// samples are dropped until one comes back.
#[derive(Debug)]
pub struct BlockAccumulator {
    writer: BlockWriter,
    current: Option<Box<[u8]>>,
    filled: usize,
    dropped: u64,
}

impl BlockAccumulator {
    pub fn new(writer: BlockWriter) -> Self {
        Self {
            writer,
            current: None,
            filled: 0,
            dropped: 0,
        }
    }

    /// Appends samples, publishing each region as soon as it is full.
    ///
    /// # Errors
    /// Returns [`TunerError::Disconnected`] once the analysis side is gone.
    pub fn push_samples<I: IntoIterator<Item = u8>>(&mut self, samples: I) -> Result<()> {
        for sample in samples {
            if self.current.is_none() {
                match self.writer.try_acquire()? {
                    Some(region) => {
                        if self.dropped > 0 {
                            debug!("capture resumed, {} samples dropped so far", self.dropped);
                        }
                        self.current = Some(region);
                        self.filled = 0;
                    }
                    None => {
                        self.dropped += 1;
                        continue;
                    }
                }
            }

            if let Some(region) = self.current.as_mut() {
                region[self.filled] = sample;
                self.filled += 1;
                if self.filled == region.len() {
                    if let Some(full) = self.current.take() {
                        self.writer.publish(full)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Samples discarded because no region was free.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}
