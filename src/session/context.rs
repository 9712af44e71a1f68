//! Handler context
//!
//! Context passed to handler callbacks describing the connected device.

use std::sync::Arc;

use crate::protocol::ProtocolVariant;

/// Connected device information
#[derive(Debug, Clone)]
pub struct DeviceContext {
    /// Transport-level device identifier
    pub device_id: Arc<str>,

    /// Firmware revision reported by the device (or the configured fallback)
    pub firmware_revision: String,

    /// Photo layout resolved from the firmware revision
    pub variant: ProtocolVariant,
}

impl DeviceContext {
    /// Create a context, resolving the protocol variant from `firmware_revision`
    pub fn new(device_id: impl Into<Arc<str>>, firmware_revision: impl Into<String>) -> Self {
        let firmware_revision = firmware_revision.into();
        let variant = ProtocolVariant::from_firmware(&firmware_revision);
        Self {
            device_id: device_id.into(),
            firmware_revision,
            variant,
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_resolves_variant() {
        let ctx = DeviceContext::new("glass-1", "2.0.0");
        assert_eq!(ctx.variant, ProtocolVariant::Legacy);
        assert_eq!(ctx.device_id(), "glass-1");

        let ctx = DeviceContext::new("glass-1", "2.1.1\0");
        assert_eq!(ctx.variant, ProtocolVariant::Oriented);
    }
}
