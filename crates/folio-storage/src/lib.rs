//! folio-storage
//!
//! Local persistence for the report record and template selector.

pub mod backend;
pub mod error;
pub mod store;
pub mod upload;
