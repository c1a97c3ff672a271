//! One analysis invocation: validate, filter, aggregate.
//!
//! This is the boundary between the core and the command-line front end.
//! Failures come back as values; a panic raised while aggregating is
//! caught here and reported as a processing error for this run only.

use crate::analysis::{filter_by_region, validate, Aggregator, RegionSelector};
use crate::error::{AnalyzerError, Result};
use crate::models::{AnalysisResult, Table};
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, info};

/// Outcome of a single run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Rows left after the region filter.
    pub filtered_rows: usize,
    /// `None` when no row survived cleaning.
    pub result: Option<AnalysisResult>,
}

/// Run validation, the region filter and aggregation over `table`.
pub fn run(table: &Table, region: &RegionSelector, aggregator: &Aggregator) -> Result<PipelineOutput> {
    validate(table)?;
    debug!("Required columns present");

    let filtered = filter_by_region(table, region);
    info!(
        "Region '{}' selected {} of {} rows",
        region,
        filtered.len(),
        table.len()
    );

    let result = panic::catch_unwind(AssertUnwindSafe(|| aggregator.analyze(&filtered)))
        .map_err(|payload| AnalyzerError::Processing(panic_message(payload.as_ref())))?;

    Ok(PipelineOutput {
        filtered_rows: filtered.len(),
        result,
    })
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unexpected failure during aggregation".to_string()
    }
}
