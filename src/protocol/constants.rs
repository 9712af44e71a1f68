//! Glass GATT protocol constants

/// Primary glass service
pub const GLASS_SERVICE_UUID: &str = "19b10000-e8f2-537e-4f6c-d104768a1214";

/// Audio data notifications
pub const AUDIO_DATA_UUID: &str = "19b10001-e8f2-537e-4f6c-d104768a1214";

/// Audio capture control (write 0x01 to start, 0x00 to stop)
pub const AUDIO_CONTROL_UUID: &str = "19b10002-e8f2-537e-4f6c-d104768a1214";

/// Photo data notifications
pub const PHOTO_DATA_UUID: &str = "19b10005-e8f2-537e-4f6c-d104768a1214";

/// Photo capture control (write the capture interval in seconds)
pub const PHOTO_CONTROL_UUID: &str = "19b10006-e8f2-537e-4f6c-d104768a1214";

/// Standard Device Information service
pub const DEVICE_INFO_SERVICE_UUID: &str = "0000180a-0000-1000-8000-00805f9b34fb";

/// Firmware Revision String characteristic
pub const FIRMWARE_REVISION_UUID: &str = "00002a26-0000-1000-8000-00805f9b34fb";

/// Header byte pair marking the end of a frame
pub const END_MARKER: [u8; 2] = [0xFF, 0xFF];

/// Size of the little-endian sequence header on every notification
pub const CHUNK_HEADER_SIZE: usize = 2;

/// First firmware revision whose photo frames carry an orientation byte
pub const ORIENTATION_FIRMWARE: &str = "2.1.1";

/// Codec id assumed until an audio frame announces one (PCM, 8 kHz)
pub const DEFAULT_AUDIO_CODEC: u8 = 1;

/// Sample rate advertised in audio webhook payloads
pub const AUDIO_SAMPLE_RATE: u32 = 16_000;

/// Default photo capture interval written to the photo control characteristic
pub const DEFAULT_CAPTURE_INTERVAL_SECS: u8 = 5;

/// Audio control values
pub const AUDIO_START: u8 = 0x01;
pub const AUDIO_STOP: u8 = 0x00;
