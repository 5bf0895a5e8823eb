//! HTTP surface of the session service

pub mod routes;

pub use routes::build_router;
