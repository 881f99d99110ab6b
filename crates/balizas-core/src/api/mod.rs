//! Outbound side of the beacon cache.
//!
//! This module provides the `FeedClient` that pulls the DGT incident feed
//! and the transport decoder that undoes the feed's base64 + XOR layer.
//!
//! The synchronizer only depends on the `FeedSource` trait, so tests can
//! plug in canned payloads without touching the network.

pub mod client;
pub mod decode;
pub mod error;

pub use client::{FeedClient, FeedSource};
pub use decode::{decode, decode_with_key, encode_with_key, DEFAULT_KEY};
pub use error::FeedError;
