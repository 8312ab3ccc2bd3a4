//! Concrete terminal consumers.

use std::cell::{Cell, RefCell};
use std::io::Write;
use std::rc::Rc;

use tracing::debug;

use crate::Record;
use crate::chain::Consumer;
use crate::error::Result;

/// What a [`Collector`] saw, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observed {
    Record(Record),
    Close,
}

/// Accumulates records in memory.
///
/// The chain takes ownership of the collector, so read results through a
/// [`CollectedRecords`] handle taken before wiring.
#[derive(Default)]
pub struct Collector {
    events: Rc<RefCell<Vec<Observed>>>,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> CollectedRecords {
        CollectedRecords {
            events: Rc::clone(&self.events),
        }
    }
}

impl Consumer for Collector {
    fn feed(&mut self, record: Record) -> Result<()> {
        self.events.borrow_mut().push(Observed::Record(record));
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.events.borrow_mut().push(Observed::Close);
        Ok(())
    }

    fn name(&self) -> &str {
        "COLLECT"
    }
}

/// Read side of a [`Collector`].
#[derive(Clone)]
pub struct CollectedRecords {
    events: Rc<RefCell<Vec<Observed>>>,
}

impl CollectedRecords {
    /// Records received so far.
    pub fn records(&self) -> Vec<Record> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                Observed::Record(record) => Some(record.clone()),
                Observed::Close => None,
            })
            .collect()
    }

    pub fn close_count(&self) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|event| **event == Observed::Close)
            .count()
    }

    /// Every feed and close, in order.
    pub fn events(&self) -> Vec<Observed> {
        self.events.borrow().clone()
    }
}

/// Writes each record verbatim and flushes on close.
pub struct WriterSink<W: Write> {
    writer: W,
    written: Rc<Cell<usize>>,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            written: Rc::default(),
        }
    }

    /// Shared count of records written, readable after the chain owns the sink.
    pub fn written(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.written)
    }
}

impl<W: Write> Consumer for WriterSink<W> {
    fn feed(&mut self, record: Record) -> Result<()> {
        self.writer.write_all(record.as_str().as_bytes())?;
        self.written.set(self.written.get() + 1);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.writer.flush()?;
        debug!(records = self.written.get(), "writer flushed");
        Ok(())
    }

    fn name(&self) -> &str {
        "WRITER"
    }
}

/// HOLE - discards everything.
pub struct Discard;

impl Consumer for Discard {
    fn feed(&mut self, _record: Record) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "HOLE"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_records_and_close() {
        let mut sink = Collector::new();
        let out = sink.handle();
        sink.feed(Record::from_str("a\n")).unwrap();
        sink.close().unwrap();
        assert_eq!(out.records(), vec![Record::from_str("a\n")]);
        assert_eq!(out.close_count(), 1);
        assert_eq!(out.events().last(), Some(&Observed::Close));
    }

    #[test]
    fn test_writer_sink() {
        let mut buf = Vec::new();
        {
            let mut sink = WriterSink::new(&mut buf);
            let written = sink.written();
            sink.feed(Record::from_str("a\n")).unwrap();
            sink.feed(Record::from_str("b")).unwrap();
            sink.close().unwrap();
            assert_eq!(written.get(), 2);
        }
        assert_eq!(String::from_utf8(buf).unwrap(), "a\nb");
    }

    #[test]
    fn test_discard() {
        let mut sink = Discard;
        sink.feed(Record::from_str("gone\n")).unwrap();
        sink.close().unwrap();
    }
}
