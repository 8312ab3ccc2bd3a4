//! Concrete filters.
//!
//! Most filters here keep the one-in/one-out contract and only supply
//! [`Filter::transform`]. The rest override [`Filter::feed`] or
//! [`Filter::close`] and say so in their docs:
//!
//! - drop: `DROPEMPTY`, `LOCATE`, `NLOCATE`, `TAKE`, `SKIP`
//! - split: `DUPLICATE`, `SPLIT`
//! - emit on close: `COUNT`

use tracing::trace;

use crate::Record;
use crate::chain::{Feeder, Filter};
use crate::error::Result;

// ---------------------------------------------------------------------------
// One in, one out
// ---------------------------------------------------------------------------

/// UPPER - converts record content to uppercase.
pub struct Upper;

impl Filter for Upper {
    fn transform(&mut self, record: Record) -> Result<Record> {
        Ok(record.map_content(str::to_uppercase))
    }

    fn name(&self) -> &str {
        "UPPER"
    }
}

/// LOWER - converts record content to lowercase.
pub struct Lower;

impl Filter for Lower {
    fn transform(&mut self, record: Record) -> Result<Record> {
        Ok(record.map_content(str::to_lowercase))
    }

    fn name(&self) -> &str {
        "LOWER"
    }
}

/// REVERSE - reverses the characters before the line terminator.
pub struct Reverse;

impl Filter for Reverse {
    fn transform(&mut self, record: Record) -> Result<Record> {
        Ok(record.map_content(|s| s.chars().rev().collect()))
    }

    fn name(&self) -> &str {
        "REVERSE"
    }
}

/// TRIM - strips trailing whitespace before the line terminator.
pub struct Trim;

impl Filter for Trim {
    fn transform(&mut self, record: Record) -> Result<Record> {
        Ok(record.map_content(|s| s.trim_end().to_string()))
    }

    fn name(&self) -> &str {
        "TRIM"
    }
}

/// CHANGE "old" "new" - replaces every occurrence in each record.
pub struct Change {
    old: String,
    new: String,
}

impl Change {
    pub fn new(old: impl Into<String>, new: impl Into<String>) -> Self {
        Self {
            old: old.into(),
            new: new.into(),
        }
    }
}

impl Filter for Change {
    fn transform(&mut self, record: Record) -> Result<Record> {
        if self.old.is_empty() {
            return Ok(record);
        }
        Ok(record.map_content(|s| s.replace(&self.old, &self.new)))
    }

    fn name(&self) -> &str {
        "CHANGE"
    }
}

// ---------------------------------------------------------------------------
// Drop
// ---------------------------------------------------------------------------

/// DROPEMPTY - drops lines with no content.
pub struct DropEmptyLines;

impl Filter for DropEmptyLines {
    fn transform(&mut self, record: Record) -> Result<Record> {
        Ok(record)
    }

    fn name(&self) -> &str {
        "DROPEMPTY"
    }

    fn feed(&mut self, record: Record, next: &mut Feeder) -> Result<()> {
        if record.is_empty_line() {
            trace!(stage = "DROPEMPTY", "dropped");
            return Ok(());
        }
        let out = self.transform(record)?;
        next.feed_next(out)
    }
}

/// LOCATE "pattern" - keeps records containing a pattern.
pub struct Locate {
    pattern: String,
}

impl Locate {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }
}

impl Filter for Locate {
    fn transform(&mut self, record: Record) -> Result<Record> {
        Ok(record)
    }

    fn name(&self) -> &str {
        "LOCATE"
    }

    fn feed(&mut self, record: Record, next: &mut Feeder) -> Result<()> {
        if !record.content().contains(self.pattern.as_str()) {
            return Ok(());
        }
        let out = self.transform(record)?;
        next.feed_next(out)
    }
}

/// NLOCATE "pattern" - keeps records NOT containing a pattern.
pub struct Nlocate {
    pattern: String,
}

impl Nlocate {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }
}

impl Filter for Nlocate {
    fn transform(&mut self, record: Record) -> Result<Record> {
        Ok(record)
    }

    fn name(&self) -> &str {
        "NLOCATE"
    }

    fn feed(&mut self, record: Record, next: &mut Feeder) -> Result<()> {
        if record.content().contains(self.pattern.as_str()) {
            return Ok(());
        }
        let out = self.transform(record)?;
        next.feed_next(out)
    }
}

/// TAKE n - keeps the first n records, discards the rest.
pub struct Take {
    n: usize,
    seen: usize,
}

impl Take {
    pub fn new(n: usize) -> Self {
        Self { n, seen: 0 }
    }
}

impl Filter for Take {
    fn transform(&mut self, record: Record) -> Result<Record> {
        Ok(record)
    }

    fn name(&self) -> &str {
        "TAKE"
    }

    fn feed(&mut self, record: Record, next: &mut Feeder) -> Result<()> {
        if self.seen >= self.n {
            return Ok(());
        }
        self.seen += 1;
        let out = self.transform(record)?;
        next.feed_next(out)
    }
}

/// SKIP n - skips the first n records, passes the rest.
pub struct Skip {
    n: usize,
    seen: usize,
}

impl Skip {
    pub fn new(n: usize) -> Self {
        Self { n, seen: 0 }
    }
}

impl Filter for Skip {
    fn transform(&mut self, record: Record) -> Result<Record> {
        Ok(record)
    }

    fn name(&self) -> &str {
        "SKIP"
    }

    fn feed(&mut self, record: Record, next: &mut Feeder) -> Result<()> {
        if self.seen < self.n {
            self.seen += 1;
            return Ok(());
        }
        let out = self.transform(record)?;
        next.feed_next(out)
    }
}

// ---------------------------------------------------------------------------
// Split
// ---------------------------------------------------------------------------

/// DUPLICATE n - repeats each record n times.
pub struct Duplicate {
    n: usize,
}

impl Duplicate {
    pub fn new(n: usize) -> Self {
        Self { n }
    }
}

impl Filter for Duplicate {
    fn transform(&mut self, record: Record) -> Result<Record> {
        Ok(record)
    }

    fn name(&self) -> &str {
        "DUPLICATE"
    }

    fn feed(&mut self, record: Record, next: &mut Feeder) -> Result<()> {
        let out = self.transform(record)?;
        for copy in std::iter::repeat_n(out, self.n) {
            next.feed_next(copy)?;
        }
        Ok(())
    }
}

/// SPLIT "delimiter" - splits each record into one record per piece.
///
/// Every piece carries the original line terminator. An empty delimiter
/// passes records through whole.
pub struct SplitOn {
    delimiter: String,
}

impl SplitOn {
    pub fn new(delimiter: impl Into<String>) -> Self {
        Self {
            delimiter: delimiter.into(),
        }
    }
}

impl Filter for SplitOn {
    fn transform(&mut self, record: Record) -> Result<Record> {
        Ok(record)
    }

    fn name(&self) -> &str {
        "SPLIT"
    }

    fn feed(&mut self, record: Record, next: &mut Feeder) -> Result<()> {
        let record = self.transform(record)?;
        if self.delimiter.is_empty() {
            return next.feed_next(record);
        }
        let terminator = record.terminator();
        for piece in record.content().split(self.delimiter.as_str()) {
            next.feed_next(Record::from(format!("{piece}{terminator}")))?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Emit on close
// ---------------------------------------------------------------------------

/// COUNT - counts records and emits the total when the stream closes.
///
/// Nothing is forwarded while records arrive.
#[derive(Default)]
pub struct Count {
    count: usize,
}

impl Count {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Filter for Count {
    /// Counts the record and hands it back unchanged.
    fn transform(&mut self, record: Record) -> Result<Record> {
        self.count += 1;
        Ok(record)
    }

    fn name(&self) -> &str {
        "COUNT"
    }

    fn feed(&mut self, record: Record, _next: &mut Feeder) -> Result<()> {
        self.transform(record)?;
        Ok(())
    }

    fn close(&mut self, next: &mut Feeder) -> Result<()> {
        next.feed_next(Record::from(format!("{}\n", self.count)))?;
        next.close()
    }
}
