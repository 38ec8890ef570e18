//! Water Problem Reporting Service Library
//!
//! Backend for field reports of unresolved water-infrastructure problems. A report is
//! tied to a coordinate and a creation time and carries a single resolution flag.
//! The binary (`main.rs`) wires these modules into an HTTP server.
//!
//! ## Modules
//! - **`reports`**: The report store. Owns the collection, normalizes loosely typed
//!   input, allocates ids and keeps the optional on-disk journal.
//! - **`api`**: The HTTP layer (`/store`, `/getall`, `/update`). Parses requests and
//!   shapes responses; carries no business rules.
//! - **`client`**: An HTTP client speaking the same contract as the mobile app.
//! - **`config`**: Server settings from flags and environment.

pub mod api;
pub mod client;
pub mod config;
pub mod reports;
