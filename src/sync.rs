//! Action synchronization and query loop.

pub mod input_loop;
pub mod report;

pub use input_loop::{InputLoop, LoopStatus, TickOutcome};
pub use report::{ActionReading, ActionValue, ConsoleSink, RecordingSink, ReportSink, TickReport};
