//! # FOMO Common Library
//!
//! Shared code for the FOMO landing CMS crates:
//! - Configuration resolution (CLI → ENV → TOML → defaults)
//! - Database initialization and the JSON document store
//! - Localized text for the fixed RU/EN locale set
//! - Common error type

pub mod config;
pub mod db;
pub mod error;
pub mod locale;

pub use error::{Error, Result};
pub use locale::{Locale, LocalizedText};
