//! Metadata cache module
//!
//! Deduplicates metadata fetches by key.
//!
//! # Overview
//!
//! A [`MetadataCache`] maps a key to one shared fetch. The first caller for
//! a key claims the slot and publishes the (not yet started) fetch in the
//! same map operation; every later or concurrent caller awaits that same
//! fetch. A key therefore reaches the network at most once until the entry
//! is cleared.
//!
//! - Failed fetches are evicted, so the next call for the key retries.
//! - Dropping a waiter only cancels that wait. Once started, the fetch runs
//!   to completion on the runtime even if every waiter has gone away.
//! - `clear` never touches the network and never cancels in-flight fetches.

mod metadata_cache;

pub use metadata_cache::MetadataCache;
