//! # Shinobi Roster Common Library
//!
//! Shared code for the Shinobi Roster service including:
//! - Character normalization (`NormalizedCharacter`, `normalize_character`)
//! - String token flattening used by the normalizer
//! - Bootstrap configuration loading
//! - Error types

pub mod character;
pub mod config;
pub mod error;
pub mod tokens;

pub use character::{normalize_character, NormalizedCharacter};
pub use error::{Error, Result};
