//! Single-room WebSocket Chat Library
//!
//! A WebSocket chat room built with tokio-tungstenite around a shared,
//! lock-protected hub.
//!
//! # Features
//! - Cookie-based sessions shared by every tab of a browser
//! - Default `user<N>` names and `/user` renaming
//! - `/who` and `/help` commands
//! - Room-wide broadcast with per-connection failure isolation
//! - Replay of the last 100 messages to new connections
//!
//! # Architecture
//! - `ChatHub` owns membership, names and history behind short critical
//!   sections; sends always happen outside the locks
//! - Each connection has a `handler` task that joins the hub, dispatches
//!   inbound text and always leaves on the way out
//! - The hub talks to connections only through the `Connection` trait
//!
//! # Example
//! ```ignore
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//! use chatik::{serve, ChatHub, Config};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::default();
//!     let listener = TcpListener::bind(&config.bind_addr).await.unwrap();
//!     let hub = Arc::new(ChatHub::from_config(&config));
//!     serve(listener, hub, Arc::new(config)).await;
//! }
//! ```

pub mod client;
pub mod command;
pub mod config;
pub mod connection;
pub mod error;
pub mod handler;
pub mod history;
pub mod hub;
pub mod message;
pub mod room;
pub mod server;
pub mod session;
pub mod types;

// Re-export main types for convenience
pub use client::{Client, Outbox};
pub use command::ClientMessage;
pub use config::Config;
pub use connection::{CloseReason, Connection};
pub use error::{AppError, CommandError, SendError};
pub use handler::handle_connection;
pub use history::History;
pub use hub::ChatHub;
pub use message::{Notice, ServerMessage};
pub use room::Room;
pub use server::serve;
pub use types::{ConnectionId, SessionId};
