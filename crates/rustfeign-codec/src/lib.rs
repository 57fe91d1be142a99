//! Concrete encoders, decoders, and transport glue for RustFeign.
//!
//! The core crate only ships text and byte codecs. This crate adds JSON bodies,
//! `application/x-www-form-urlencoded` form bodies, a query-map encoder that
//! flattens nested objects, and conversions between finished requests and the
//! [`http`] crate types so any `http`-based transport can serve as a client.

pub mod error;
pub mod form;
pub mod http_client;
pub mod json;
pub mod query;

pub use error::CodecError;
pub use form::FormEncoder;
pub use http_client::{HttpClient, from_http_response, to_http_request};
pub use json::{JsonDecoder, JsonEncoder};
pub use query::FieldQueryMapEncoder;
