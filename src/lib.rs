//! nodekit: base framework for building capability-serving model nodes.
//!
//! A node declares a set of named capabilities with optional input and
//! output schemas, validates requests against them, and answers every
//! execution through a uniform response envelope. Transports (HTTP
//! servers, queue consumers) sit outside this crate: they build an
//! [`runtime::context::ExecutionContext`] from an inbound request and
//! serialize the [`runtime::response::NodeResponse`] the node returns.

pub mod config;
pub mod error;
pub mod nodes;
pub mod runtime;
pub mod validation;
