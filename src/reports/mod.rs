//! Report Store Module
//!
//! Owns the collection of water-problem reports and every rule that applies to it.
//!
//! ## Core Concepts
//! - **Normalization**: Loosely typed input (numeric text, boolean text) is coerced into
//!   strict types exactly once, at the store boundary. Nothing stringly typed is persisted.
//! - **Identity**: Ids come from a monotonically increasing sequence owned by the store,
//!   so id order is creation order and an id is never handed out twice.
//! - **Durability**: An optional append-only journal records every committed mutation
//!   and is replayed on start-up.
//! - **Access**: `ReportStore` is the only entry point; the HTTP layer holds an `Arc` to it.

pub mod error;
pub mod journal;
pub mod normalize;
pub mod store;
pub mod types;
