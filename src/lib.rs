//! pagesync - mirror a local code project into a document workspace
//!
//! This crate provides the core functionality for the `pagesync` CLI tool,
//! which pushes source files to a hierarchical document store (one document
//! per file, content chunked into code blocks) and pulls them back.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`config`] - Settings, page-ID normalization, language table
//! - [`scan`] - Source file discovery
//! - [`sync`] - Cache, chunking, planning, push/pull engines
//! - [`remote`] - Document store trait, HTTP implementation, retries
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod remote;
pub mod scan;
pub mod sync;

pub use error::{Error, Result};
