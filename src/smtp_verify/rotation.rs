/// Whatever an egress backend reports when it cannot switch identity.
pub type RotationError = Box<dyn std::error::Error + Send + Sync>;

/// Switches the outbound network identity (VPN exit, source IP) before the
/// prober talks to a new MX host.
pub trait EgressRotator: Send + Sync {
    fn rotate(&self, host: &str) -> Result<(), RotationError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoRotation;

impl EgressRotator for NoRotation {
    fn rotate(&self, _host: &str) -> Result<(), RotationError> {
        Ok(())
    }
}
