//! folio-export
//!
//! HTML report rendering and the print orchestration that turns a rendered
//! preview into a printed document.

pub mod charts;
pub mod error;
pub mod print;
pub mod render;
