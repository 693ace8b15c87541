//! LazyLibrarian-facing types: the catalog snapshot, the command client
//! and the [`LibraryApi`] seam the reconciliation engine is written
//! against.

pub mod client;

pub use client::{ApiOutcome, CatalogEntry, HttpLibraryClient, LibraryApi};
