//! Grips & Gears Core - Shared types library.
//!
//! This crate provides the domain types used by the Grips & Gears components:
//! - `storefront` - Server-rendered storefront and dashboard
//! - `cli` - Operator tools (invoices, stats, catalog listing)
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. Everything
//! persistent lives behind the remote storefront API; these types describe
//! the values that cross that boundary.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, emails, phones and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
