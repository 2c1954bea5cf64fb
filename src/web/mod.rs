//! Web API for depot.

pub mod cors;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;

pub use server::WebServer;
