//! # Comic Archive
//!
//! A date-indexed archive of daily comic strips with temporal navigation,
//! text search, and a yearly sentiment trend analysis.
//!
//! The archive is loaded once from a JSON dataset and is read-only from then
//! on. It feeds two consumers: on-demand navigation and search (CLI and HTTP),
//! and the batch sentiment pipeline.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────────┐   ┌────────────┐   ┌──────────────┐
//! │ Dataset  │──▶│   Archive    │──▶│  Pipeline  │──▶│ CSV + SVG +  │
//! │  (JSON)  │   │ sorted index │   │ score+agg  │   │ failures.json│
//! └──────────┘   └──────┬───────┘   └─────┬──────┘   └──────────────┘
//!                       │                 │
//!              ┌────────┴───────┐   ┌─────┴──────┐
//!              ▼                ▼   │ Classifier │
//!         ┌──────────┐   ┌──────────┐ lexicon/http
//!         │   CLI    │   │   HTTP   │
//!         │ (comics) │   │  (JSON)  │
//!         └──────────┘   └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! comics stats                      # what was loaded
//! comics first                      # earliest strip
//! comics next 1989-04-16            # browse forward
//! comics search "dogbert"           # substring search
//! comics analyze                    # yearly sentiment table + chart
//! comics serve                      # JSON API for a UI
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`dataset`] | JSON dataset loading |
//! | [`navigate`] | first / last / get / previous / next / random |
//! | [`search`] | Search command |
//! | [`stats`] | Archive statistics |
//! | [`classifier`] | Sentiment classifier backends |
//! | [`pipeline`] | Scoring and aggregation orchestration |
//! | [`progress`] | Progress reporting |
//! | [`export`] | Table and failure report output |
//! | [`chart`] | Trend chart rendering |
//! | [`analyze`] | Analyze command |
//! | [`server`] | HTTP navigation and search API |

pub mod analyze;
pub mod chart;
pub mod classifier;
pub mod config;
pub mod dataset;
pub mod export;
pub mod navigate;
pub mod pipeline;
pub mod progress;
pub mod search;
pub mod server;
pub mod stats;
