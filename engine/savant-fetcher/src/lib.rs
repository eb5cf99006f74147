//! Savant Fetcher
//!
//! Pulls per-season player metrics from Baseball Savant leaderboards, FanGraphs
//! leader tables and the Chadwick register. Every metric family is fetched
//! independently and degrades to an empty contribution on failure, so a batch
//! run always gets as much data as the providers were willing to hand out.

pub mod arsenal;
pub mod client;
pub mod config;
pub mod error;
pub mod families;
pub mod fetcher;
pub mod fields;
pub mod models;
pub mod provider;

pub use client::SavantClient;
pub use crate::config::{FetcherConfig, ProviderConfig, RetryConfig, Thresholds};
pub use error::{FetchError, Result};
pub use fetcher::SavantFetcher;
pub use models::*;
pub use provider::{ArsenalKind, PlayerRole, ProviderQuery, Row, StatsProvider};
