//! Push-chain roles and wiring.
//!
//! A chain is a singly linked list of stages built tail-first: a [`Feeder`]
//! at the head, zero or more [`Filter`]s (each wrapped in a [`FilterStage`]),
//! and exactly one terminal [`Consumer`]. Every push is a synchronous call;
//! control returns to the pusher only after the whole downstream chain has
//! handled the record.

use tracing::{debug, trace, warn};

use crate::Record;
use crate::error::{ChainError, Result};
use crate::pull::PullAdapter;
use crate::source::Source;

/// A terminal sink with no downstream.
pub trait Consumer {
    /// Accept one record.
    fn feed(&mut self, record: Record) -> Result<()>;

    /// End of stream. Consumers that buffer or write override this to
    /// flush; the default does nothing.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }

    /// The display name of this stage.
    fn name(&self) -> &str {
        "CONSUMER"
    }
}

/// A mid-chain transformation stage.
///
/// The base contract is one record in, one record out: [`Filter::feed`]
/// calls [`Filter::transform`] and forwards the result. A filter that drops
/// records overrides `feed` and skips [`Feeder::feed_next`]; a filter that
/// splits calls `feed_next` several times from one `feed`. A filter that
/// emits on end of stream overrides [`Filter::close`] and pushes its final
/// records before forwarding the close.
pub trait Filter {
    /// Map one input record to one output record.
    fn transform(&mut self, record: Record) -> Result<Record>;

    /// The display name of this stage.
    fn name(&self) -> &str;

    /// Push entry point.
    fn feed(&mut self, record: Record, next: &mut Feeder) -> Result<()> {
        let out = self.transform(record)?;
        next.feed_next(out)
    }

    /// Forward end of stream downstream.
    fn close(&mut self, next: &mut Feeder) -> Result<()> {
        next.close()
    }
}

/// The push source side of a stage: owns the single downstream target.
///
/// A chain head is a bare `Feeder`; every [`FilterStage`] holds one for its
/// own downstream side.
pub struct Feeder {
    name: String,
    next: Box<dyn Consumer>,
    closed: bool,
}

impl Feeder {
    pub fn new(name: impl Into<String>, next: Box<dyn Consumer>) -> Self {
        Self {
            name: name.into(),
            next,
            closed: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Push one record downstream and run it through the rest of the chain.
    pub fn feed_next(&mut self, record: Record) -> Result<()> {
        if self.closed {
            return Err(ChainError::Closed {
                stage: self.name.clone(),
            });
        }
        trace!(stage = %self.name, next = self.next.name(), "push");
        self.next.feed(record)
    }

    /// Forward end of stream. Only the first call reaches downstream.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            warn!(stage = %self.name, "close called twice; ignoring");
            return Ok(());
        }
        self.closed = true;
        debug!(stage = %self.name, next = self.next.name(), "close");
        self.next.close()
    }

    /// Feed every unit of `source` into the chain, then close it.
    ///
    /// Returns the number of input units fed.
    pub fn run<S: Source>(&mut self, mut source: S) -> Result<usize> {
        let mut fed = 0;
        while let Some(record) = source.read_unit()? {
            self.feed_next(record)?;
            fed += 1;
        }
        self.close()?;
        debug!(stage = %self.name, fed, "source exhausted");
        Ok(fed)
    }
}

/// A [`Filter`] joined to its downstream, seen from upstream as a
/// [`Consumer`].
pub struct FilterStage {
    filter: Box<dyn Filter>,
    downstream: Feeder,
}

impl FilterStage {
    pub fn new(filter: Box<dyn Filter>, next: Box<dyn Consumer>) -> Self {
        let downstream = Feeder::new(filter.name(), next);
        Self { filter, downstream }
    }
}

impl Consumer for FilterStage {
    fn feed(&mut self, record: Record) -> Result<()> {
        self.filter.feed(record, &mut self.downstream)
    }

    fn close(&mut self) -> Result<()> {
        self.filter.close(&mut self.downstream)?;
        // An overriding close that forgets to forward still ends the stream.
        if !self.downstream.is_closed() {
            self.downstream.close()?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        self.filter.name()
    }
}

/// Wire `filters` in order in front of `consumer` and return the head.
///
/// The chain is built tail-first so each stage is constructed with its
/// downstream target already in hand.
pub fn wire(filters: Vec<Box<dyn Filter>>, consumer: Box<dyn Consumer>) -> Feeder {
    let depth = filters.len();
    let mut next = consumer;
    for filter in filters.into_iter().rev() {
        next = Box::new(FilterStage::new(filter, next));
    }
    debug!(filters = depth, "chain wired");
    Feeder::new("FEEDER", next)
}

/// Fluent construction of a chain.
///
/// ```
/// use cascade_rs::{ChainBuilder, Collector, Record};
/// use cascade_rs::filters::Upper;
///
/// let sink = Collector::new();
/// let out = sink.handle();
/// let mut head = ChainBuilder::new().filter(Upper).consumer(sink).build().unwrap();
/// head.feed_next(Record::from_str("ab\n")).unwrap();
/// head.close().unwrap();
/// assert_eq!(out.records(), vec![Record::from_str("AB\n")]);
/// ```
#[derive(Default)]
pub struct ChainBuilder {
    filters: Vec<Box<dyn Filter>>,
    consumer: Option<Box<dyn Consumer>>,
}

impl ChainBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filter after the ones already added.
    pub fn filter<F: Filter + 'static>(mut self, filter: F) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn filters<I>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn Filter>>,
    {
        self.filters.extend(filters);
        self
    }

    /// Set the terminal consumer.
    pub fn consumer<C: Consumer + 'static>(mut self, consumer: C) -> Self {
        self.consumer = Some(Box::new(consumer));
        self
    }

    /// Wire the chain and return its head.
    pub fn build(self) -> Result<Feeder> {
        let consumer = self.consumer.ok_or(ChainError::MissingConsumer)?;
        Ok(wire(self.filters, consumer))
    }

    /// Wire the filters behind a [`PullAdapter`], which becomes both head
    /// and terminal consumer.
    ///
    /// The builder must not have a consumer: the adapter is the consumer.
    pub fn into_pull(self) -> Result<PullAdapter> {
        if let Some(consumer) = &self.consumer {
            return Err(ChainError::ConsumerOnPull {
                consumer: consumer.name().to_string(),
            });
        }
        Ok(PullAdapter::new(self.filters))
    }
}
