//! # Rank Tracker
//!
//! Tracks where a target URL ranks in search results for a set of
//! keywords, and keeps the history of those positions.
//!
//! A ranking check searches every tracked keyword through the Google
//! Custom Search JSON API, finds the keyword's target URL in the first
//! result page, and appends a ranking row to SQLite. The data is exposed
//! through a CLI and an HTTP JSON API that a dashboard can chart.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────┐
//! │ Ranking check│──▶│ Search client│──▶│ Matcher  │
//! └──────┬───────┘   └──────────────┘   └──────────┘
//!        │ rankings
//!        ▼
//!   ┌──────────┐        ┌──────────┐
//!   │  SQLite  │◀──────▶│ CLI/HTTP │
//!   └──────────┘        └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! rtrack init
//! rtrack keyword add "rust web framework" https://example.com/axum
//! GOOGLE_API_KEY=... GOOGLE_SEARCH_ENGINE_ID=... rtrack check
//! rtrack history
//! rtrack serve
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`error`] | Error kinds |
//! | [`matcher`] | URL normalization and result matching |
//! | [`search`] | Search API client |
//! | [`store`] | Record store trait, SQLite and in-memory backends |
//! | [`check`] | Ranking check batch job |
//! | [`keywords`] | Keyword management |
//! | [`history`] | Ranking history series |
//! | [`server`] | HTTP JSON API |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |

pub mod check;
pub mod config;
pub mod db;
pub mod error;
pub mod history;
pub mod keywords;
pub mod matcher;
pub mod migrate;
pub mod models;
pub mod search;
pub mod server;
pub mod store;

pub use error::{Error, Result};
