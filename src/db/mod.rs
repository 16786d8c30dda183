mod connection;
mod data_service;
pub mod helpers;
mod migrations;
pub mod models;
mod repositories;

pub use connection::Database;
pub use models::{Label, LabelAssignment, NewAssignment};
