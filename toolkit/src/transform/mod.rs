//! Processing module.
//!
//! Stateless table transformations:
//! - Numeric: coerce columns to numbers
//! - Panel: balance a firm × period panel
//! - Loader: per-year folder loading (placeholder)

pub mod loader;
pub mod numeric;
pub mod panel;

pub use loader::DEFAULT_FOLDER_PATTERN;

use crate::report::Reporter;

/// Process and transform firm-year tables.
#[derive(Clone, Copy)]
pub struct Processor<'a> {
    reporter: &'a dyn Reporter,
}

impl<'a> Processor<'a> {
    pub fn new(reporter: &'a dyn Reporter) -> Self {
        Self { reporter }
    }
}
