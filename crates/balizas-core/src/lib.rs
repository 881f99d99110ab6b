//! Core library for balizas-v16.
//!
//! Keeps a live, in-memory picture of the V16 warning beacons reported by
//! the DGT incident feed:
//!
//! - `api`: feed client and transport decoder for the obfuscated payload
//! - `models`: external feed records and the domain `Beacon` / `Snapshot`
//! - `cache`: snapshot store and the refresh-cycle synchronizer
//! - `config`: runtime configuration

pub mod api;
pub mod cache;
pub mod config;
pub mod models;
pub mod utils;

pub use api::{FeedClient, FeedError, FeedSource};
pub use cache::BeaconCache;
pub use config::Config;
pub use models::{Beacon, BeaconState, Snapshot};
