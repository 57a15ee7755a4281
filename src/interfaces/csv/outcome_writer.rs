use crate::application::sweep::OutcomeSink;
use crate::domain::order::OrderOutcome;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct OutcomeRow<'a> {
    order_id: u64,
    order_number: &'a str,
    outcome: &'static str,
    status: &'a str,
}

/// Writes one CSV row per processed order: `order_id,order_number,outcome,status`.
pub struct OutcomeWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> OutcomeWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_outcome(&mut self, outcome: &OrderOutcome) -> Result<()> {
        self.writer.serialize(OutcomeRow {
            order_id: outcome.order_id.0,
            order_number: &outcome.order_number,
            outcome: outcome.outcome.label(),
            status: outcome.outcome.status().unwrap_or_default(),
        })?;
        // Rows should hit the output while a long sweep is still running
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| crate::error::SweepError::IoError(e.into_error()))
    }
}

impl<W: Write> OutcomeSink for OutcomeWriter<W> {
    fn accept(&mut self, outcome: &OrderOutcome) -> Result<()> {
        self.write_outcome(outcome)
    }
}
