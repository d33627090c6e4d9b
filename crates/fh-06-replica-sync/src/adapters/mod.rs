//! Writer feed adapters.

pub mod http;
pub mod memory;

pub use http::HttpWriterFeed;
pub use memory::MemoryWriterFeed;
