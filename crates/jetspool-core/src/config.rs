// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Server configuration.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Default raw/AppSocket print port (HP JetDirect).
pub const DEFAULT_PORT: u16 = 9100;

/// How a received job's byte stream is interpreted before dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecodeMode {
    /// Scan for a PJL preamble, recover job metadata, and deliver the
    /// document payload that follows it.
    Pjl,
    /// Deliver the byte stream untouched with no metadata. For clients that
    /// submit bare binary documents (e.g. a PDF) without a control preamble.
    Raw,
}

/// In-memory settings for one print server instance.
///
/// Immutable after `start()`; the bound address and port are the only values
/// normalised at runtime (port 0 resolves to the OS-assigned port).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Display label used when registering the printer endpoint.
    pub display_name: String,
    /// Address the listener binds to.
    pub bind_addr: IpAddr,
    /// Port the listener binds to. 0 lets the OS pick an ephemeral port.
    pub port: u16,
    /// Register/unregister the printer endpoint around the server's run loop.
    pub auto_register: bool,
    /// How job byte streams are interpreted.
    pub decode: DecodeMode,
    /// Where the no-handler fallback spools raw jobs. `None` means the
    /// default spool file in the working directory.
    pub spool_path: Option<PathBuf>,
}

impl ServerConfig {
    /// The socket address this configuration asks to bind.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            display_name: "Jetspool Virtual Printer".into(),
            bind_addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            auto_register: true,
            decode: DecodeMode::Pjl,
            spool_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_targets_loopback_9100() {
        let config = ServerConfig::default();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:9100");
        assert_eq!(config.decode, DecodeMode::Pjl);
        assert!(config.auto_register);
    }
}
