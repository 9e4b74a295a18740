//! Leafpress CLI - Atomic note publishing to GitHub-backed sites
//!
//! This crate provides the core functionality for the `lp` CLI tool:
//! it publishes a local folder of notes as one atomic commit that
//! replaces a subtree of a remote branch, built with the low-level
//! Git Data API.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`config`] - Project config discovery and the per-run `SyncSession`
//! - [`github`] - Git Data API client, tree builder, commit orchestrator
//! - [`storage`] - SQLite store of per-note sync records
//! - [`sync`] - Note collection, status classification, batch publish
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod github;
pub mod storage;
pub mod sync;

pub use error::{Error, Result};
