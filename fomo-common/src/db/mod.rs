//! Database initialization and document storage

pub mod init;
pub mod store;

pub use init::*;
pub use store::{Document, DocumentStore};
