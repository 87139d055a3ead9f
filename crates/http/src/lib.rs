//! Storefront HTTP client and wire types

pub mod client;
pub mod types;

pub use client::{ClientError, PendingRequest, StorefrontClient};
