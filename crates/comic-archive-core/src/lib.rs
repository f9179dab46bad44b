//! # Comic Archive Core
//!
//! Shared, I/O-free logic for the comic archive: the data model, the
//! date-indexed [`archive::Archive`], substring search, sentiment scoring
//! through an injected [`sentiment::Classifier`], and the yearly
//! aggregation of per-item scores.
//!
//! This crate contains no tokio, filesystem, or network dependencies.
//! Dataset loading, classifier backends, and output rendering live in the
//! `comic-archive` app crate.

pub mod aggregate;
pub mod archive;
pub mod error;
pub mod models;
pub mod search;
pub mod sentiment;
