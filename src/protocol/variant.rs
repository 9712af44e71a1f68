//! Firmware-gated protocol variants
//!
//! Photo frames from firmware 2.1.1 onward start with an orientation byte.
//! Older firmware sends bare image data and the camera is always mounted
//! upside down. The variant is resolved once per connection and handed to
//! the reassemblers by value.

use std::cmp::Ordering;
use std::fmt;

use super::constants::ORIENTATION_FIRMWARE;

/// Dotted firmware revision, e.g. `2.1.1`
///
/// Missing trailing components compare as zero, so `2.1` == `2.1.0`.
/// Components that are not integers are treated as zero.
#[derive(Debug, Clone)]
pub struct FirmwareVersion {
    parts: Vec<u32>,
}

impl FirmwareVersion {
    /// Parse a firmware revision string
    ///
    /// Device information strings are often NUL padded, so surrounding
    /// whitespace and NUL bytes are stripped first.
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim_matches(|c: char| c.is_whitespace() || c == '\0');
        let parts = trimmed
            .split('.')
            .map(|p| p.trim().parse::<u32>().unwrap_or(0))
            .collect();
        Self { parts }
    }

    fn component(&self, i: usize) -> u32 {
        self.parts.get(i).copied().unwrap_or(0)
    }
}

impl PartialEq for FirmwareVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FirmwareVersion {}

impl PartialOrd for FirmwareVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FirmwareVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.parts.len().max(other.parts.len());
        (0..len)
            .map(|i| self.component(i).cmp(&other.component(i)))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for part in &self.parts {
            if !first {
                f.write_str(".")?;
            }
            write!(f, "{}", part)?;
            first = false;
        }
        Ok(())
    }
}

/// Photo frame layout negotiated for a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolVariant {
    /// No orientation byte; rotation is fixed at 180°
    Legacy,
    /// Chunk 0 starts with an orientation code
    Oriented,
}

impl ProtocolVariant {
    /// Resolve the variant from a firmware revision string
    pub fn from_firmware(revision: &str) -> Self {
        let threshold = FirmwareVersion::parse(ORIENTATION_FIRMWARE);
        if FirmwareVersion::parse(revision) >= threshold {
            ProtocolVariant::Oriented
        } else {
            ProtocolVariant::Legacy
        }
    }

    /// Whether photo chunk 0 carries an orientation byte
    pub fn has_orientation_byte(&self) -> bool {
        matches!(self, ProtocolVariant::Oriented)
    }

    /// Rotation to apply to a completed photo
    ///
    /// `orientation` is the code read from chunk 0, if any.
    pub fn rotation(&self, orientation: Option<u8>) -> Rotation {
        match self {
            ProtocolVariant::Legacy => Rotation::Deg180,
            ProtocolVariant::Oriented => orientation
                .map(Rotation::from_orientation_code)
                .unwrap_or(Rotation::Deg0),
        }
    }
}

/// Clockwise rotation needed to display a photo upright
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rotation {
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Map a device orientation code to a rotation
    ///
    /// Unknown codes leave the image as is.
    pub fn from_orientation_code(code: u8) -> Self {
        match code {
            1 => Rotation::Deg90,
            2 => Rotation::Deg180,
            3 => Rotation::Deg270,
            _ => Rotation::Deg0,
        }
    }

    /// Angle in degrees
    pub fn degrees(&self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.degrees())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_ordering() {
        let v = FirmwareVersion::parse;
        assert!(v("2.1.1") == v("2.1.1"));
        assert!(v("2.1") < v("2.1.1"));
        assert!(v("2.1.0") == v("2.1"));
        assert!(v("2.2") > v("2.1.9"));
        assert!(v("10.0.0") > v("9.9.9"));
        assert!(v("2.1.1.1") > v("2.1.1"));
    }

    #[test]
    fn test_version_parse_padding_and_garbage() {
        assert_eq!(FirmwareVersion::parse("2.1.1\0\0").to_string(), "2.1.1");
        assert_eq!(FirmwareVersion::parse(" 2.0.9 ").to_string(), "2.0.9");
        assert_eq!(FirmwareVersion::parse("2.x.3").to_string(), "2.0.3");
    }

    #[test]
    fn test_variant_threshold() {
        let v = ProtocolVariant::from_firmware;
        assert_eq!(v("2.1.1"), ProtocolVariant::Oriented);
        assert_eq!(v("2.3.0"), ProtocolVariant::Oriented);
        assert_eq!(v("2.1.0"), ProtocolVariant::Legacy);
        assert_eq!(v("1.0.10"), ProtocolVariant::Legacy);
        assert_eq!(v(""), ProtocolVariant::Legacy);
    }

    #[test]
    fn test_rotation_codes() {
        let oriented = ProtocolVariant::Oriented;
        assert_eq!(oriented.rotation(Some(0)), Rotation::Deg0);
        assert_eq!(oriented.rotation(Some(1)), Rotation::Deg90);
        assert_eq!(oriented.rotation(Some(2)), Rotation::Deg180);
        assert_eq!(oriented.rotation(Some(3)), Rotation::Deg270);
        assert_eq!(oriented.rotation(Some(9)), Rotation::Deg0);
        assert_eq!(oriented.rotation(None), Rotation::Deg0);
    }

    #[test]
    fn test_legacy_rotation_is_fixed() {
        for code in [None, Some(0), Some(1), Some(3)] {
            assert_eq!(ProtocolVariant::Legacy.rotation(code), Rotation::Deg180);
        }
        assert_eq!(Rotation::Deg180.degrees(), 180);
    }
}
