//! Per-tick action readings and the sinks that consume them.

use crate::error::Result;
use std::fmt;
use std::io::{self, Write};

/// Value read for one action in one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActionValue {
    Boolean(bool),
}

impl fmt::Display for ActionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionValue::Boolean(value) => write!(f, "{value}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActionReading {
    pub name: String,
    pub value: ActionValue,
    pub changed_since_last_sync: bool,
}

/// Everything read during one synchronized tick, in action order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub readings: Vec<ActionReading>,
    /// Actions whose type has no query path yet
    pub skipped: Vec<String>,
}

impl TickReport {
    pub fn new(tick: u64) -> Self {
        Self {
            tick,
            ..Default::default()
        }
    }

    /// Boolean value reported for `name`, if it was read this tick
    pub fn boolean(&self, name: &str) -> Option<bool> {
        self.readings
            .iter()
            .find(|r| r.name == name)
            .map(|r| match r.value {
                ActionValue::Boolean(value) => value,
            })
    }
}

/// Destination for tick reports.
pub trait ReportSink {
    fn emit(&mut self, report: &TickReport) -> Result<()>;
}

/// Writes `name: value` lines followed by a `=====` separator.
pub struct ConsoleSink<W: Write> {
    out: W,
}

impl ConsoleSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for ConsoleSink<W> {
    fn emit(&mut self, report: &TickReport) -> Result<()> {
        for reading in &report.readings {
            writeln!(self.out, "{}: {}", reading.name, reading.value)?;
        }
        writeln!(self.out, "=====")?;
        self.out.flush()?;
        Ok(())
    }
}

/// Keeps every report in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub reports: Vec<TickReport>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&TickReport> {
        self.reports.last()
    }
}

impl ReportSink for RecordingSink {
    fn emit(&mut self, report: &TickReport) -> Result<()> {
        self.reports.push(report.clone());
        Ok(())
    }
}

impl<S: ReportSink + ?Sized> ReportSink for &mut S {
    fn emit(&mut self, report: &TickReport) -> Result<()> {
        (**self).emit(report)
    }
}
