//! Client-side sync session manager.
//!
//! Keeps a live, per-user projection of remote record collections for a UI
//! layer. Each collection gets a live subscription with bounded retries; when
//! retries run out the collection falls back to the periodic reconciliation
//! fetch, and connectivity changes toggle the store's network layer.
//!
//! All session state lives inside one task, so subscription updates, timers
//! and commands are handled strictly one at a time.

pub mod config;
pub mod document;
pub mod errors;
pub mod manager;
pub mod mock;
pub mod registry;
pub mod session;
pub mod store;

pub use config::SyncConfig;
pub use errors::{StoreError, SyncError};
pub use manager::{CollectionView, Notice, Projection, Remediation, SyncHandle, SyncManager};
