//! Input sources that hand one unit at a time to a chain head.

use std::io::BufRead;

use crate::Record;
use crate::error::Result;

/// Something that yields one input unit at a time.
///
/// `Ok(None)` marks the end of the source; it is not an error.
pub trait Source {
    fn read_unit(&mut self) -> Result<Option<Record>>;
}

impl<S: Source + ?Sized> Source for &mut S {
    fn read_unit(&mut self) -> Result<Option<Record>> {
        (**self).read_unit()
    }
}

impl<S: Source + ?Sized> Source for Box<S> {
    fn read_unit(&mut self) -> Result<Option<Record>> {
        (**self).read_unit()
    }
}

/// Successive lines of a reader, terminators included.
///
/// The final line is yielded as-is even when the input does not end with a
/// newline.
pub struct LineSource<R> {
    reader: R,
}

impl<R: BufRead> Source for LineSource<R> {
    fn read_unit(&mut self) -> Result<Option<Record>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(Record::from(line)))
    }
}

/// In-memory records.
pub struct IterSource<I> {
    iter: I,
}

impl<I: Iterator<Item = Record>> Source for IterSource<I> {
    fn read_unit(&mut self) -> Result<Option<Record>> {
        Ok(self.iter.next())
    }
}

/// Read lines from `reader`.
pub fn lines<R: BufRead>(reader: R) -> LineSource<R> {
    LineSource { reader }
}

/// Yield the given records in order.
pub fn records<I>(records: I) -> IterSource<I::IntoIter>
where
    I: IntoIterator<Item = Record>,
{
    IterSource {
        iter: records.into_iter(),
    }
}
