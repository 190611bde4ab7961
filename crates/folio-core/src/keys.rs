//! Local storage key conventions.
//!
//! The report record and the template selector are persisted under two
//! independent keys so that switching templates never rewrites the report.

pub const REPORT_DATA: &str = "reportData";

pub const REPORT_TEMPLATE: &str = "reportTemplate";
