//! PropBot Backend Library
//!
//! CS2 DFS projection and line-movement analytics engine. The HTTP/UI
//! layer and the real data connectors live outside this crate; they
//! consume the aggregator's query surface and implement the provider
//! traits.

pub mod aggregator;
pub mod manual;
pub mod models;
pub mod projection;
pub mod providers;
pub mod tracker;
pub mod value;

pub use aggregator::Aggregator;
pub use models::Config;
