//! DTO modules that bridge services with templates and APIs.

pub mod api;
pub mod client;
pub mod consumption;
pub mod document;
pub mod main;
pub mod training;
