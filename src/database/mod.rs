//! # Database Access
//!
//! Connection pooling for the scheduler metadata database that holds the
//! connection registry.

pub mod connection;

pub use connection::DatabaseConnection;
