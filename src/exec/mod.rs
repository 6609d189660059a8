// src/exec/mod.rs

//! Remote execution layer.
//!
//! The engine never talks to a daemon directly; it goes through a
//! [`Connection`] produced by a [`ConnectionFactory`].
//!
//! - [`connection`] defines both traits. Tests swap in scripted fakes.
//! - [`tcp`] is the production implementation: newline-delimited JSON over a
//!   plain TCP stream.

pub mod connection;
pub mod tcp;

pub use connection::{BoxFuture, Connection, ConnectionFactory};
pub use tcp::{TcpConnection, TcpConnectionFactory};
