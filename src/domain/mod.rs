pub mod models;
pub mod reveal;
pub mod schedule;
pub mod triggers;
