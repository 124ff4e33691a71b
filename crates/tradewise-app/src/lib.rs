// Library root for the tradewise host application.
//
// Re-exports modules so the binary and integration tests can access them.

pub mod cache;
pub mod config;
pub mod provider;
pub mod report;
pub mod snapshot;
