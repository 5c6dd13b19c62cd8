//! Client for a single GraphQL-over-HTTP endpoint.
//!
//! Keep the public surface small and predictable: build once with
//! [`ClientBuilder`], then call [`Client::run`] per operation.
//! Implementation details are split into submodules under `src/client/`.

pub mod builder;
pub mod core;
mod execution;

pub use self::builder::ClientBuilder;
pub use self::core::Client;
