//! Pull adapter: exposes a push chain as a lazy iterator.
//!
//! The adapter is both ends of its chain. It owns the head [`Feeder`], and
//! the chain's terminal consumer is a [`BufferSink`] that appends into an
//! accumulator shared only with the adapter. Each call to
//! [`Pull::next`] hands out buffered records first; only when none are
//! left does it read one more input unit and push it through the whole
//! chain. Output for unit `i` is therefore fully yielded before unit
//! `i + 1` is read.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::iter::FusedIterator;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::Record;
use crate::chain::{Consumer, Feeder, Filter, wire};
use crate::error::{ChainError, Result};
use crate::source::Source;

type Accumulator = Rc<RefCell<VecDeque<Record>>>;

/// Terminal consumer of a pull chain.
struct BufferSink {
    buffer: Accumulator,
}

impl Consumer for BufferSink {
    fn feed(&mut self, record: Record) -> Result<()> {
        self.buffer.borrow_mut().push_back(record);
        Ok(())
    }

    fn name(&self) -> &str {
        "PULL"
    }
}

/// A chain whose head and tail are the adapter itself.
pub struct PullAdapter {
    head: Feeder,
    buffer: Accumulator,
}

impl PullAdapter {
    /// Wire `filters` between the adapter's feeder side and its consumer side.
    pub fn new(filters: Vec<Box<dyn Filter>>) -> Self {
        let buffer = Accumulator::default();
        let sink = BufferSink {
            buffer: Rc::clone(&buffer),
        };
        let head = wire(filters, Box::new(sink));
        Self { head, buffer }
    }

    /// Run the chain lazily over `source`.
    ///
    /// The returned sequence is single-pass. Once it has returned `None`
    /// (or an error) it stays finished.
    pub fn produce_from<S: Source>(self, source: S) -> Pull<S> {
        Pull {
            adapter: self,
            source,
            ready: VecDeque::new(),
            units_read: 0,
            finished: false,
        }
    }

    fn take_buffered(&self) -> VecDeque<Record> {
        std::mem::take(&mut *self.buffer.borrow_mut())
    }
}

/// Lazy output of a [`PullAdapter`].
pub struct Pull<S> {
    adapter: PullAdapter,
    source: S,
    ready: VecDeque<Record>,
    units_read: usize,
    finished: bool,
}

impl<S> Pull<S> {
    /// Number of input units pulled from the source so far.
    pub fn units_read(&self) -> usize {
        self.units_read
    }

    /// The chain failed: drop whatever the failed unit left behind.
    fn fail(&mut self, err: ChainError) -> Option<Result<Record>> {
        debug!(units = self.units_read, error = %err, "pull chain failed");
        self.finished = true;
        self.ready.clear();
        self.adapter.buffer.borrow_mut().clear();
        Some(Err(err))
    }
}

impl<S: Source> Iterator for Pull<S> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.ready.pop_front() {
                return Some(Ok(record));
            }
            if self.finished {
                return None;
            }
            match self.source.read_unit() {
                Ok(Some(unit)) => {
                    self.units_read += 1;
                    if let Err(err) = self.adapter.head.feed_next(unit) {
                        return self.fail(err);
                    }
                }
                Ok(None) => {
                    // Close may flush records from emit-on-close filters.
                    self.finished = true;
                    if let Err(err) = self.adapter.head.close() {
                        return self.fail(err);
                    }
                }
                Err(err) => return self.fail(err),
            }
            self.ready = self.adapter.take_buffered();
            trace!(unit = self.units_read, ready = self.ready.len(), "pull cycle");
        }
    }
}

impl<S: Source> FusedIterator for Pull<S> {}
