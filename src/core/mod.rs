pub mod clock;
pub mod error;
pub mod models;
pub mod schedule;
pub mod settings;
pub mod store;
