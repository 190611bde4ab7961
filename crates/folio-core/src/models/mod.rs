pub mod field;
pub mod generation;
pub mod image;
pub mod report;
pub mod template;
