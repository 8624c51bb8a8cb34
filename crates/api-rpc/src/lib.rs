//! JSON-RPC API Layer
//!
//! Exposes the queue coordinator as versioned JSON-RPC 2.0 methods
//! (`queue.*.v1`, `team.register.v1`) plus the `queue.subscribe.v1`
//! change feed.

pub mod error;
pub mod handler;
pub mod server;
pub mod types;

pub use server::{RpcServer, RpcServerConfig};
