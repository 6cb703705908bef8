//! Core library for the codelist-manager command line application.
//!
//! The library exposes high-level orchestration helpers that power the
//! command-line interface as well as the tests. The modules are structured to
//! keep responsibilities narrow and composable: spreadsheet IO adapters live
//! under [`io`], data representations inside [`model`], the remote directory
//! service operations behind the [`client::DirectoryClient`] trait, and the
//! three-phase reconciliation orchestration in [`reconcile`].

pub mod client;
pub mod config;
pub mod error;
pub mod io;
pub mod model;
pub mod reconcile;
pub mod report;

pub use error::{DirectoryError, Result, ToolError};
