//! HTTP request modeling
//!
//! Structured request descriptions, authentication schemes, and the codec
//! that turns them into raw HTTP/1.1 request text and back.

pub mod auth;
mod codec;
mod form;
mod request;

pub use auth::{AuthSpec, TokenIssuer};
pub use codec::{decode, encode, RequestCodec, RequestLine, DEFAULT_HTTP_VERSION};
pub use form::{AuthForm, ContentForm, RequestForm};
pub use request::{
    ContentFormat, ContentSpec, Headers, Method, QueryParams, RequestBuilder, RequestSpec,
};
