//! # gql-http
//!
//! A small client for GraphQL-style query services spoken over HTTP.
//!
//! ## Overview
//!
//! The crate covers the request/response protocol only: a [`Request`] (query text,
//! variables, header overrides) is encoded as `{"query": ..., "variables": {...}}`,
//! POSTed through a pluggable [`Transport`], and the `{"data": ..., "errors": [...]}`
//! envelope that comes back is decoded into a caller-supplied type. Failures are
//! reported as one [`Error`] whose variant tells transport, decoding and
//! service-reported errors apart.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gql_http::{Client, Request};
//! use serde::Deserialize;
//! use tokio_util::sync::CancellationToken;
//!
//! #[derive(Deserialize)]
//! struct Hero {
//!     hero: Name,
//! }
//!
//! #[derive(Deserialize)]
//! struct Name {
//!     name: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> gql_http::Result<()> {
//!     let client = Client::new("https://swapi.example.com/graphql")?;
//!     let req = Request::builder("query($ep: Episode) { hero(episode: $ep) { name } }")
//!         .variable("ep", "JEDI")
//!         .header("Authorization", "Bearer token")
//!         .build();
//!
//!     let hero: Option<Hero> = client.execute(&CancellationToken::new(), &req).await?;
//!     if let Some(h) = hero {
//!         println!("{}", h.hero.name);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`request`] | Operation model and builder |
//! | [`codec`] | Wire encoding of requests and decoding of response envelopes |
//! | [`client`] | Client configuration and execution |
//! | [`graphql`] | Service-reported error values |
//! | [`transport`] | Transport trait and the default `reqwest` implementation |

pub mod client;
pub mod codec;
pub mod graphql;
pub mod request;
pub mod transport;
mod variable;

pub use client::{Client, ClientBuilder};
pub use graphql::{GraphQlError, GraphQlErrors, Location, PathSegment};
pub use request::{Request, RequestBuilder};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};

// Callers need the token type to drive cancellation.
pub use tokio_util::sync::CancellationToken;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
