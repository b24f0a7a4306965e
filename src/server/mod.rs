//! # Server Module
//!
//! HTTP transport for a built [`App`](crate::App) on top of `may_minihttp`.
//!
//! Each connection is served on a `may` coroutine. The service converts the
//! wire request into a [`Request`](crate::Request), runs
//! [`App::dispatch`](crate::App::dispatch) and writes the buffered
//! [`Response`](crate::Response) back.

pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use http_server::{HttpServer, ServerHandle};
pub use request::parse_request;
pub use response::{status_reason, write_response};
