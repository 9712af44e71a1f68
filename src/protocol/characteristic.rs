//! GATT characteristics used by the glass

use std::fmt;

use super::constants::*;

/// Characteristics the session reads, writes or subscribes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Characteristic {
    /// Photo chunk notifications
    PhotoData,
    /// Photo capture interval
    PhotoControl,
    /// Audio chunk notifications
    AudioData,
    /// Audio capture on/off
    AudioControl,
    /// Device information firmware revision string
    FirmwareRevision,
}

impl Characteristic {
    /// Characteristic UUID
    pub fn uuid(&self) -> &'static str {
        match self {
            Characteristic::PhotoData => PHOTO_DATA_UUID,
            Characteristic::PhotoControl => PHOTO_CONTROL_UUID,
            Characteristic::AudioData => AUDIO_DATA_UUID,
            Characteristic::AudioControl => AUDIO_CONTROL_UUID,
            Characteristic::FirmwareRevision => FIRMWARE_REVISION_UUID,
        }
    }

    /// UUID of the service owning this characteristic
    pub fn service_uuid(&self) -> &'static str {
        match self {
            Characteristic::FirmwareRevision => DEVICE_INFO_SERVICE_UUID,
            _ => GLASS_SERVICE_UUID,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Characteristic::PhotoData => "photo data",
            Characteristic::PhotoControl => "photo control",
            Characteristic::AudioData => "audio data",
            Characteristic::AudioControl => "audio control",
            Characteristic::FirmwareRevision => "firmware revision",
        }
    }
}

impl fmt::Display for Characteristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_mapping() {
        assert_eq!(Characteristic::PhotoData.service_uuid(), GLASS_SERVICE_UUID);
        assert_eq!(
            Characteristic::AudioControl.service_uuid(),
            GLASS_SERVICE_UUID
        );
        assert_eq!(
            Characteristic::FirmwareRevision.service_uuid(),
            DEVICE_INFO_SERVICE_UUID
        );
        assert_eq!(
            Characteristic::PhotoControl.uuid(),
            "19b10006-e8f2-537e-4f6c-d104768a1214"
        );
    }
}
