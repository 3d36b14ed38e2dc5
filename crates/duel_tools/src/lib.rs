//! # Duel Development Tools
//!
//! Command-line helpers for catalog authors:
//! - Catalog validation (every integrity problem, not just the first)
//! - Catalog listing

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod list;
pub mod validate;
