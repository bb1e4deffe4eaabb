//! Weather tool service library.
//!
//! One pipeline — geocode, cache, fetch, translate — exposed two ways:
//! a JSON-RPC tool protocol on stdio for assistant clients, or a REST
//! API over HTTP. One transport per process instance; the tool set,
//! cache, and auth gate are identical either way. The binary in
//! `main.rs` wires configuration into these modules.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod protocol;
pub mod routes;
pub mod state;
pub mod stdio;
pub mod tools;
