use core::str;

use crate::{Error, Result, HEADER_LENGTH, HEADER_STRING, HEADER_VERSION};

/// The fixed log header plus the free-form extra header that follows it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogHeader {
    pub version: u16,
    pub extra_header: Box<str>,
}

impl LogHeader {
    /// Checks the magic, version and extra header of `buffer`.
    ///
    /// A failure here means the file must not be decoded any further.
    pub fn validate(buffer: &[u8]) -> Result<Self> {
        if buffer.len() < HEADER_LENGTH {
            return Err(Error::InvalidHeader("file is shorter than the log header"));
        }

        if buffer[0..6] != *HEADER_STRING {
            return Err(Error::InvalidHeader("magic bytes do not match WPILOG"));
        }

        let version = u16::from_le_bytes([buffer[6], buffer[7]]);

        if version < HEADER_VERSION {
            return Err(Error::InvalidHeader("unsupported version"));
        }

        let length = u32::from_le_bytes([buffer[8], buffer[9], buffer[10], buffer[11]]) as usize;

        let extra_header = HEADER_LENGTH
            .checked_add(length)
            .and_then(|end| buffer.get(HEADER_LENGTH..end))
            .ok_or(Error::InvalidHeader("extra header runs past the end of the file"))?;

        let extra_header = str::from_utf8(extra_header)
            .map_err(|_| Error::InvalidHeader("extra header is not valid utf-8"))?
            .into();

        Ok(LogHeader {
            version,
            extra_header,
        })
    }

    /// Byte offset of the first record
    #[must_use]
    pub fn records_offset(&self) -> usize {
        HEADER_LENGTH + self.extra_header.len()
    }

    #[must_use]
    pub fn major(&self) -> u8 {
        (self.version >> 8) as u8
    }

    #[must_use]
    pub fn minor(&self) -> u8 {
        (self.version & 0xff) as u8
    }
}
