pub mod ai;
pub mod events;
pub mod export;
pub mod logos;
pub mod pages;
pub mod properties;
pub mod report;
pub mod template;
