//! Per-year folder loading.
//!
//! Data for each survey year lives in a folder named after the year pair
//! (`1980_1981`, ...). Folders are resolved but their files are not read:
//! [`Processor::load_year_range`] always ends in
//! [`ProcessError::Unimplemented`].

use std::path::{Path, PathBuf};

use super::Processor;
use crate::error::{ProcessError, ProcessResult};
use crate::table::Table;

/// Default folder name pattern.
pub const DEFAULT_FOLDER_PATTERN: &str = "{year}_{next_year}";

/// Folder name for `year` under `pattern` (`{year}` and `{next_year}` placeholders).
pub fn folder_name(pattern: &str, year: i64) -> String {
    pattern
        .replace("{year}", &year.to_string())
        .replace("{next_year}", &(year + 1).to_string())
}

impl Processor<'_> {
    /// Resolve the year folders under `base_directory` for `start..=end`.
    ///
    /// Missing folders are reported as warnings and existing ones as the
    /// folders that would be loaded. No file is read: the call returns
    /// [`ProcessError::Unimplemented`] carrying the existing folders.
    pub fn load_year_range(
        &self,
        base_directory: &Path,
        start: i64,
        end: i64,
        pattern: &str,
    ) -> ProcessResult<Table> {
        let mut folders: Vec<PathBuf> = Vec::new();

        for year in start..=end {
            let folder = base_directory.join(folder_name(pattern, year));
            if !folder.is_dir() {
                self.reporter
                    .warning(&format!("Folder not found: {}", folder.display()));
                continue;
            }
            self.reporter
                .info(&format!("Loading data from {}", folder.display()));
            folders.push(folder);
        }

        self.reporter.error("No data loaded");
        Err(ProcessError::Unimplemented {
            capability: "Per-year file loading",
            folders,
        })
    }
}
