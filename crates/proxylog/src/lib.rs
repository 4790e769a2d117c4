//! Request logging subsystem for an intercepting HTTP(S) proxy: durable
//! storage of Request/Response pairs, a projection planner so callers only
//! pay for the columns they ask for, a scope matcher deciding what's worth
//! logging, and a free-form filter over logged traffic. Deliberately knows
//! nothing about the proxy's TLS/connection handling or any API surface
//! (GraphQL, REST, UI) built on top of it — see [`service::Service`] for the
//! boundary this crate presents to one.

pub mod config;
pub mod error;
pub mod filter;
pub mod model;
pub mod planner;
mod pool;
pub mod projection;
pub mod repository;
pub mod scope;
pub mod service;

pub use error::Error;
pub use model::{Header, Headers, Method, NewRequest, NewResponse, Request, RequestId, Response, ResponseId};
pub use projection::{FieldSet, ResponseFields};
pub use repository::Repository;
pub use service::Service;
