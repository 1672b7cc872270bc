//! # lendly-client: Rental API Client for Lendly
//!
//! Async I/O on top of `lendly-core`: fetching product data, loading and
//! guarding availability, and turning prices into quotes.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Client Architecture                               │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                  AvailabilityService                             │  │
//! │  │                                                                  │  │
//! │  │  Built once at start-up, shared behind Arc                      │  │
//! │  │  Owns the month cache and buffer-settings memo                  │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┼─────────────────────┐                  │
//! │         ▼                     ▼                     ▼                   │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │ RentalDataSource│ │   MonthCache   │  │  AvailabilityBoard     │    │
//! │  │ (HttpRentalApi)│  │                │  │                        │    │
//! │  │ reqwest GETs   │  │ (product,month)│  │ GenerationCounter      │    │
//! │  │ per month      │  │ → MonthData    │  │ newest result only     │    │
//! │  └────────────────┘  └────────────────┘  └────────────────────────┘    │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐                                │
//! │  │  ClientConfig  │  │     Quote      │                                │
//! │  │  TOML + env    │  │ estimate vs    │                                │
//! │  │                │  │ backend total  │                                │
//! │  └────────────────┘  └────────────────┘                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//! - [`api`] - `RentalDataSource` trait and the `reqwest` implementation
//! - [`availability`] - Month fan-out, merge, and the guarded board
//! - [`cache`] - Month cache and buffer-settings memo
//! - [`config`] - Client configuration (API URL, timeout, lookahead)
//! - [`error`] - Client error types
//! - [`generation`] - Stale-result guard
//! - [`quote`] - Estimates and backend-confirmed totals

pub mod api;
pub mod availability;
pub mod cache;
pub mod config;
pub mod error;
pub mod generation;
pub mod quote;

pub use api::{HttpRentalApi, RentalDataSource};
pub use availability::{AvailabilityBoard, AvailabilityService, BoardSnapshot};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use generation::{Commit, GenerationCounter, GenerationToken};
pub use quote::{quote_product, Quote};
