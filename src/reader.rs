use log::debug;

use crate::{header::LogHeader, Result};

/// Walks the records of a log held in memory. Payloads are borrowed from the buffer.
///
/// Iteration stops at the first record whose header or payload would run past the
/// end of the buffer. A truncated tail is therefore indistinguishable from a clean
/// end of log.
#[derive(Debug, Clone)]
pub struct WPILOGReader<'a> {
    buffer: &'a [u8],
    position: usize,
    done: bool,
}

impl<'a> WPILOGReader<'a> {
    /// Validates the header and positions the reader on the first record
    pub fn new(buffer: &'a [u8]) -> Result<(LogHeader, Self)> {
        let header = LogHeader::validate(buffer)?;
        let reader = WPILOGReader::from_offset(buffer, header.records_offset());

        Ok((header, reader))
    }

    /// Starts framing at `offset` without looking at the header
    #[must_use]
    pub fn from_offset(buffer: &'a [u8], offset: usize) -> Self {
        WPILOGReader {
            buffer,
            position: offset,
            done: false,
        }
    }

    /// Byte offset of the next record header
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Yields each record along with the fraction of the buffer consumed so far
    #[must_use]
    pub fn with_progress(self) -> WithProgress<'a> {
        WithProgress { inner: self }
    }

    /// Preconditions: `length <= 8`
    fn read_variable_int(&self, offset: usize, length: usize) -> Option<u64> {
        debug_assert!(length <= 8, "Invalid variable int length {length}");

        let bytes = self.buffer.get(offset..offset.checked_add(length)?)?;

        let mut final_buf = [0; 8];
        final_buf[0..length].copy_from_slice(bytes);

        Some(u64::from_le_bytes(final_buf))
    }

    fn read_record(&self) -> Option<(RawRecord<'a>, usize)> {
        let bitfield = *self.buffer.get(self.position)?;

        let entry_length = usize::from(bitfield & 0x3) + 1;
        let size_length = usize::from((bitfield >> 2) & 0x3) + 1;
        let timestamp_length = usize::from((bitfield >> 4) & 0x7) + 1;

        let mut ptr = self.position + 1;

        // Entry has to be a u32 or smaller since the bitfield can only represent byte lengths of 1-4
        let id = self.read_variable_int(ptr, entry_length)? as u32;
        ptr += entry_length;

        let size = usize::try_from(self.read_variable_int(ptr, size_length)?).ok()?;
        ptr += size_length;

        let timestamp = self.read_variable_int(ptr, timestamp_length)?;
        ptr += timestamp_length;

        let end = ptr.checked_add(size)?;
        let data = self.buffer.get(ptr..end)?;

        Some((RawRecord { id, timestamp, data }, end))
    }
}

impl<'a> Iterator for WPILOGReader<'a> {
    type Item = RawRecord<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if let Some((record, next)) = self.read_record() {
            self.position = next;
            return Some(record);
        }

        self.done = true;

        let trailing = self.buffer.len().saturating_sub(self.position);
        if trailing > 0 {
            debug!("Stopped framing with {trailing} trailing byte(s) at offset {}", self.position);
        }

        None
    }
}

#[derive(Debug)]
pub struct WithProgress<'a> {
    inner: WPILOGReader<'a>,
}

impl<'a> Iterator for WithProgress<'a> {
    type Item = (RawRecord<'a>, f64);

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.inner.next()?;
        let total = self.inner.buffer.len();

        let fraction = if total == 0 {
            1.0
        } else {
            self.inner.position as f64 / total as f64
        };

        Some((record, fraction))
    }
}

/// A single framed record. `data` borrows from the log buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRecord<'a> {
    pub id: u32,
    pub timestamp: u64,
    pub data: &'a [u8],
}
