use std::time::Duration;

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

/// Ports tried, in order, on every MX host.
pub const DEFAULT_PORTS: [u16; 3] = [25, 587, 465];

#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOptions {
    /// Connect, read and write deadline for one host:port attempt.
    pub timeout: Duration,
    pub helo_host: String,
    pub ports: Vec<u16>,
    pub starttls_ports: Vec<u16>,
    /// Full host/port sweeps before giving up.
    pub sweeps: u32,
    pub sweep_delay: Duration,
    pub rotate_per_host: bool,
    /// Check certificate chain and host name after STARTTLS. Off: many MX
    /// hosts serve self-signed certificates on 587.
    pub verify_tls: bool,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            helo_host: "gmail.com".to_string(),
            ports: DEFAULT_PORTS.to_vec(),
            starttls_ports: vec![587],
            sweeps: 1,
            sweep_delay: Duration::from_secs(2),
            rotate_per_host: false,
            verify_tls: false,
        }
    }
}

impl ProbeOptions {
    pub fn uses_starttls(&self, port: u16) -> bool {
        self.starttls_ports.contains(&port)
    }
}
