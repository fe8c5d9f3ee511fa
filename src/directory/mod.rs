//! Read-only client for the association's membership system: member
//! lookups and shipment-tracking queries.

pub mod client;
pub mod error;
pub mod types;
