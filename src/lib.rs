//! # cascade-rs
//!
//! Cascading filters over a stream of text records.
//!
//! A chain is a [`Feeder`] at the head, zero or more [`Filter`] stages, and
//! one terminal [`Consumer`]. Records are pushed in at the head and run
//! synchronously through every stage before the push returns. Closing the
//! head forwards end of stream, stage by stage, down to the consumer.
//!
//! A [`PullAdapter`] turns the same chain inside out for callers that want
//! to iterate: it is both head and tail of its chain, and hands out the
//! records produced by one input unit before reading the next.
//!
//! ## Example
//!
//! ```
//! use cascade_rs::filters::{DropEmptyLines, Upper};
//! use cascade_rs::{ChainBuilder, Record, records};
//!
//! let input = ["x\n", "\n", "y\n"].map(Record::from_str);
//!
//! let out: Vec<Record> = ChainBuilder::new()
//!     .filter(DropEmptyLines)
//!     .filter(Upper)
//!     .into_pull()
//!     .unwrap()
//!     .produce_from(records(input))
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//!
//! assert_eq!(out, ["X\n", "Y\n"].map(Record::from_str));
//! ```

pub mod chain;
pub mod consumers;
pub mod dsl;
pub mod error;
pub mod filters;
pub mod pull;
pub mod record;
pub mod source;

pub use chain::{ChainBuilder, Consumer, Feeder, Filter, FilterStage, wire};
pub use consumers::{CollectedRecords, Collector, Discard, Observed, WriterSink};
pub use dsl::{StageSpec, build_filters, parse_stages, spec_to_filter};
pub use error::{ChainError, Result};
pub use pull::{Pull, PullAdapter};
pub use record::Record;
pub use source::{IterSource, LineSource, Source, lines, records};
