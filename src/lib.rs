pub mod carousel;
pub mod config;
pub mod detail;
pub mod events;
pub mod feed;
pub mod gesture;
pub mod tracing;
