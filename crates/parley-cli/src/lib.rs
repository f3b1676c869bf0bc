//! Scripted sidebar simulator for Parley
//!
//! A thin shell over [`parley_app::Driver`] that replays a scenario script
//! against the in-process database from `parley-harness` and prints what the
//! chat sidebar would show. All state logic lives in [`parley_app::Session`];
//! this crate only parses scripts and writes text.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod error;
pub mod runner;
pub mod script;
pub mod text;

pub use error::CliError;
pub use runner::{MemoryFileStore, RunOptions, Runner};
pub use script::{Command, parse_script};
pub use text::{TextDriver, write_sidebar};
