//! Database models backing the portal repository.

pub mod client;
#[cfg(feature = "server")]
pub mod config;
pub mod consumption;
pub mod document;
pub mod folder;
pub mod training;
pub mod user;
