//! # Horde Development Tools
//!
//! Command-line tools for development:
//! - Data validators for the RON tables under `assets/data`
//! - Export of the built-in tables as RON

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod validate;
