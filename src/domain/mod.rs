pub mod analytics;
pub mod auth;
pub mod capabilities;
pub mod client;
pub mod consumption;
pub mod document;
pub mod folder;
pub mod navigation;
pub mod setup;
pub mod training;
pub mod types;
pub mod user;
