pub mod auth;
pub mod client;
pub mod consumption;
pub mod document;
pub mod errors;
pub mod main;
pub mod training;

pub use auth::Session;
pub use errors::{ServiceError, ServiceResult};

/// Page size of the clients table.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 20;
