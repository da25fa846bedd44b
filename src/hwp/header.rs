//! FileHeader stream parsing.
//!
//! The FileHeader stream is 256 bytes: a 32-byte NUL-padded signature, the
//! format version and a properties bit set. Only the compression bit affects
//! table extraction; the remaining bits are exposed so callers can reject
//! documents whose body streams are encrypted.

use super::consts::{PROPERTIES_OFFSET, SIGNATURE, SIGNATURE_LEN, VERSION_OFFSET};
use crate::common::binary::read_u32_le;
use crate::common::{Error, Result};
use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Document properties word at offset 36 of the FileHeader stream.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FileProperties: u32 {
        /// Section streams are raw-deflate compressed
        const COMPRESSED = 1 << 0;
        /// Document is password protected
        const PASSWORD = 1 << 1;
        /// Distribution document (body stored encrypted under ViewText)
        const DISTRIBUTION = 1 << 2;
        /// Scripts are stored
        const SCRIPT = 1 << 3;
        /// DRM protected
        const DRM = 1 << 4;
        /// XML template storage present
        const XML_TEMPLATE = 1 << 5;
        /// Document history is stored
        const HISTORY = 1 << 6;
        /// Electronic signature present
        const SIGNATURE = 1 << 7;
        /// Encrypted with a public certificate
        const CERT_ENCRYPTED = 1 << 8;
        /// Spare electronic signature stored
        const SIGNATURE_SPARE = 1 << 9;
        /// Certificate DRM
        const CERT_DRM = 1 << 10;
        /// CCL document
        const CCL = 1 << 11;
        /// Optimized for mobile
        const MOBILE_OPTIMIZED = 1 << 12;
        /// Private information security document
        const PRIVATE_INFO = 1 << 13;
        /// Track changes enabled
        const TRACK_CHANGE = 1 << 14;
        /// Korea Open Government License document
        const KOGL = 1 << 15;
        /// Contains video controls
        const VIDEO_CONTROL = 1 << 16;
        /// Contains a table-of-contents field control
        const TOC_FIELD = 1 << 17;
    }
}

/// Format version stored as `0xMMnnPPrr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version(pub u32);

impl Version {
    pub fn major(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub fn minor(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub fn build(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub fn revision(self) -> u8 {
        self.0 as u8
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major(),
            self.minor(),
            self.build(),
            self.revision()
        )
    }
}

/// Parsed FileHeader stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub version: Version,
    pub properties: FileProperties,
}

impl FileHeader {
    /// Parse the raw FileHeader stream.
    ///
    /// Unknown property bits are kept as-is.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let signature = data.get(..SIGNATURE_LEN).ok_or_else(|| {
            Error::InvalidFormat(format!(
                "FileHeader stream too short: {} bytes",
                data.len()
            ))
        })?;
        if !signature.starts_with(SIGNATURE)
            || signature[SIGNATURE.len()..].iter().any(|&b| b != 0)
        {
            return Err(Error::InvalidFormat(
                "Not an HWP 5.x document: bad FileHeader signature".to_string(),
            ));
        }

        let version = Version(read_u32_le(data, VERSION_OFFSET)?);
        let properties = FileProperties::from_bits_retain(read_u32_le(data, PROPERTIES_OFFSET)?);
        Ok(Self {
            version,
            properties,
        })
    }

    /// Whether section streams are raw-deflate compressed.
    #[inline]
    pub fn is_compressed(&self) -> bool {
        self.properties.contains(FileProperties::COMPRESSED)
    }

    /// Whether section streams are encrypted and cannot be decoded here.
    pub fn is_encrypted(&self) -> bool {
        self.properties.intersects(
            FileProperties::PASSWORD
                | FileProperties::DISTRIBUTION
                | FileProperties::DRM
                | FileProperties::CERT_ENCRYPTED
                | FileProperties::CERT_DRM,
        )
    }
}

#[cfg(test)]
pub(crate) fn encode_file_header(version: u32, properties: u32) -> Vec<u8> {
    let mut data = vec![0u8; 256];
    data[..SIGNATURE.len()].copy_from_slice(SIGNATURE);
    data[VERSION_OFFSET..VERSION_OFFSET + 4].copy_from_slice(&version.to_le_bytes());
    data[PROPERTIES_OFFSET..PROPERTIES_OFFSET + 4].copy_from_slice(&properties.to_le_bytes());
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compressed_header() {
        let header = FileHeader::parse(&encode_file_header(0x0500_0300, 0x1)).unwrap();
        assert!(header.is_compressed());
        assert!(!header.is_encrypted());
        assert_eq!(header.version.to_string(), "5.0.3.0");
    }

    #[test]
    fn test_uncompressed_and_unknown_bits() {
        let header = FileHeader::parse(&encode_file_header(0x0501_0000, 0x8000_0000)).unwrap();
        assert!(!header.is_compressed());
        assert_eq!(header.properties.bits(), 0x8000_0000);
    }

    #[test]
    fn test_encrypted_flags() {
        let header = FileHeader::parse(&encode_file_header(0x0500_0000, 0b101)).unwrap();
        assert!(header.is_compressed());
        assert!(header.is_encrypted());
    }

    #[test]
    fn test_rejects_bad_signature_and_short_stream() {
        let mut data = encode_file_header(0x0500_0000, 0);
        data[0] = b'X';
        assert!(matches!(FileHeader::parse(&data), Err(Error::InvalidFormat(_))));
        assert!(matches!(FileHeader::parse(&[0u8; 8]), Err(Error::InvalidFormat(_))));
        assert!(matches!(
            FileHeader::parse(&encode_file_header(0, 1)[..38]),
            Err(Error::Format(_))
        ));
    }
}
