// src/net/mod.rs

//! Wire contract between a client and a build daemon.
//!
//! - [`request`] holds the tagged requests a client may send.
//! - [`response`] holds the frames a daemon streams back.
//!
//! Both travel as newline-delimited JSON.

pub mod request;
pub mod response;

pub use request::{GetArtifacts, JobRequest, PushInputs, Request, parse_request};
pub use response::{Response, parse_response};

use crate::errors::{JunknetError, Result};

/// Join a host and port into a connection string.
///
/// IPv6 addresses are bracketed so their colons are not mistaken for the
/// port separator.
pub fn host_and_port(host: &str, port: u16) -> String {
    if host.contains(':') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}

/// Split a `host:port` (or `[v6-host]:port`) string.
pub fn parse_address(address: &str) -> Result<(String, u16)> {
    let address = address.trim();
    let invalid = || {
        JunknetError::ConfigError(format!(
            "invalid daemon address '{address}' (expected HOST:PORT)"
        ))
    };

    let (host, port) = if let Some(rest) = address.strip_prefix('[') {
        let (host, rest) = rest.split_once(']').ok_or_else(invalid)?;
        let port = rest.strip_prefix(':').ok_or_else(invalid)?;
        (host, port)
    } else {
        address.rsplit_once(':').ok_or_else(invalid)?
    };

    if host.is_empty() || (host.contains(':') && !address.starts_with('[')) {
        return Err(invalid());
    }

    let port = port.parse::<u16>().map_err(|_| invalid())?;
    Ok((host.to_string(), port))
}
