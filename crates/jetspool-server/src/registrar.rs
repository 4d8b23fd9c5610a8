// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printer endpoint registration.
//
// Making the ingestion endpoint appear as an installable printer is an OS
// concern that lives behind the `PrinterRegistrar` trait.  The server calls
// `register` exactly once after the real bound address is known and
// `unregister` exactly once at explicit stop -- never from a destructor.
//
// The bundled implementation advertises the endpoint over mDNS-SD as
// `_pdl-datastream._tcp.local.`, the service type print subsystems probe
// for raw/AppSocket printers, so clients on the LAN can discover it without
// driver installation.

use std::net::IpAddr;

use tracing::{info, warn};

use jetspool_core::error::{JetspoolError, Result};

/// mDNS service type for raw/AppSocket (port 9100) printing.
const PDL_SERVICE_TYPE: &str = "_pdl-datastream._tcp.local.";

/// Registers and unregisters the printer endpoint with the host system.
///
/// `register` returns an opaque port identifier that must be passed back to
/// `unregister`.  Implementations are called from the server lifecycle only,
/// once each per start/stop cycle.
pub trait PrinterRegistrar: Send {
    fn register(&mut self, display_name: &str, addr: IpAddr, port: u16) -> Result<String>;

    fn unregister(&mut self, display_name: &str, port_id: &str) -> Result<()>;
}

/// Advertises the endpoint via mDNS-SD so LAN clients discover it as a
/// network printer.
///
/// The mDNS service fullname doubles as the port identifier handed back
/// from `register`.
pub struct MdnsRegistrar {
    daemon: Option<mdns_sd::ServiceDaemon>,
}

impl MdnsRegistrar {
    pub fn new() -> Self {
        Self { daemon: None }
    }
}

impl Default for MdnsRegistrar {
    fn default() -> Self {
        Self::new()
    }
}

impl PrinterRegistrar for MdnsRegistrar {
    fn register(&mut self, display_name: &str, addr: IpAddr, port: u16) -> Result<String> {
        let daemon = mdns_sd::ServiceDaemon::new()
            .map_err(|e| JetspoolError::Registrar(format!("mDNS daemon: {e}")))?;

        let properties = [
            ("txtvers", "1"),
            ("qtotal", "1"),
            ("ty", display_name),
            ("pdl", "application/postscript,application/pdf,text/plain"),
        ];

        let hostname = std::env::var("HOSTNAME").unwrap_or_else(|_| "jetspool".into());

        // An unspecified bind address lets mDNS auto-detect the LAN IP.
        let ip = if addr.is_unspecified() {
            String::new()
        } else {
            addr.to_string()
        };

        let service_info = mdns_sd::ServiceInfo::new(
            PDL_SERVICE_TYPE,
            display_name,
            &format!("{hostname}.local."),
            ip.as_str(),
            port,
            &properties[..],
        )
        .map_err(|e| JetspoolError::Registrar(format!("mDNS service info: {e}")))?;

        let fullname = service_info.get_fullname().to_owned();

        daemon
            .register(service_info)
            .map_err(|e| JetspoolError::Registrar(format!("mDNS register: {e}")))?;

        info!(
            service_type = PDL_SERVICE_TYPE,
            name = %display_name,
            port,
            "mDNS printer service registered"
        );

        self.daemon = Some(daemon);
        Ok(fullname)
    }

    fn unregister(&mut self, display_name: &str, port_id: &str) -> Result<()> {
        let Some(daemon) = self.daemon.take() else {
            return Ok(());
        };

        let result = daemon
            .unregister(port_id)
            .map(|_| ())
            .map_err(|e| JetspoolError::Registrar(format!("mDNS unregister: {e}")));

        if let Err(e) = daemon.shutdown() {
            warn!(error = %e, "failed to shut down mDNS daemon");
        }

        if result.is_ok() {
            info!(name = %display_name, "mDNS printer service unregistered");
        }
        result
    }
}
