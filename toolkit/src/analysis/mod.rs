//! Analysis module.
//!
//! Stateless aggregations over firm-year tables:
//! - Growth: group-wise percentage change
//! - Summary: descriptive statistics with missing counts
//! - Filter: conjunctive column conditions

pub mod filter;
pub mod growth;
pub mod summary;

pub use filter::{CompareOp, Condition};
pub use growth::GrowthOrder;
pub use summary::{ColumnSummary, Statistic, SummaryTable};

use crate::report::Reporter;

/// Statistical analysis tools for the delicensing study.
#[derive(Clone, Copy)]
pub struct Analyzer<'a> {
    reporter: &'a dyn Reporter,
}

impl<'a> Analyzer<'a> {
    pub fn new(reporter: &'a dyn Reporter) -> Self {
        Self { reporter }
    }
}
