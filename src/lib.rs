//! brewup - Formula updater library
//!
//! This library provides the core functionality for keeping `*.rb` formulae
//! current with their upstream releases:
//! - Version discovery from GitHub releases, directory listings and the Go release index
//! - Checksum reconciliation for the updated artifact
//! - Formula rewriting with dry-run support

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod formula;
pub mod hash;
pub mod http;
pub mod orchestrator;
pub mod output;
pub mod progress;
pub mod resolver;
pub mod source;
pub mod template;
pub mod version;
