use anyhow::{ensure, Result};
use std::io::Write;

use crate::{HEADER_STRING, HEADER_VERSION};

const MAX_ONE_BYTE: u64 = 256u64;
const MAX_TWO_BYTES: u64 = 256u64.pow(2);
const MAX_THREE_BYTES: u64 = 256u64.pow(3);
const MAX_FOUR_BYTES: u64 = 256u64.pow(4);
const MAX_FIVE_BYTES: u64 = 256u64.pow(5);
const MAX_SIX_BYTES: u64 = 256u64.pow(6);
const MAX_SEVEN_BYTES: u64 = 256u64.pow(7);

/// Smallest number of bytes that can hold `num`
fn int_width(num: u64) -> usize {
    match num {
        0..MAX_ONE_BYTE => 1,
        MAX_ONE_BYTE..MAX_TWO_BYTES => 2,
        MAX_TWO_BYTES..MAX_THREE_BYTES => 3,
        MAX_THREE_BYTES..MAX_FOUR_BYTES => 4,
        MAX_FOUR_BYTES..MAX_FIVE_BYTES => 5,
        MAX_FIVE_BYTES..MAX_SIX_BYTES => 6,
        MAX_SIX_BYTES..MAX_SEVEN_BYTES => 7,
        _ => 8,
    }
}

fn length_prefixed(out: &mut Vec<u8>, value: &str) -> Result<()> {
    out.extend_from_slice(&u32::try_from(value.len())?.to_le_bytes());
    out.extend_from_slice(value.as_bytes());
    Ok(())
}

/// Writes a log front to back. Used to produce fixtures; nothing here rewrites an existing log.
pub struct WPILOGWriter<W: Write> {
    writer: W,
    next_id: u32,
}

impl<W: Write> WPILOGWriter<W> {
    pub fn new(mut writer: W, extra_header: &str) -> Result<Self> {
        writer.write_all(HEADER_STRING)?;
        writer.write_all(&HEADER_VERSION.to_le_bytes())?;
        writer.write_all(&u32::try_from(extra_header.len())?.to_le_bytes())?;
        writer.write_all(extra_header.as_bytes())?;

        Ok(WPILOGWriter { writer, next_id: 1 })
    }

    /// Writes a record using the smallest width for every header field
    pub fn write_record(&mut self, id: u32, timestamp: u64, data: &[u8]) -> Result<()> {
        let size = u64::try_from(data.len())?;

        self.write_record_with_widths(
            id,
            timestamp,
            data,
            int_width(id.into()),
            int_width(size).min(4),
            int_width(timestamp),
        )
    }

    /// Writes a record with explicit field widths (entry 1-4, size 1-4, timestamp 1-8 bytes)
    pub fn write_record_with_widths(
        &mut self,
        id: u32,
        timestamp: u64,
        data: &[u8],
        entry_length: usize,
        size_length: usize,
        timestamp_length: usize,
    ) -> Result<()> {
        let size = u64::try_from(data.len())?;

        ensure!((1..=4).contains(&entry_length), "Invalid entry length {entry_length}");
        ensure!((1..=4).contains(&size_length), "Invalid size length {size_length}");
        ensure!(
            (1..=8).contains(&timestamp_length),
            "Invalid timestamp length {timestamp_length}"
        );
        ensure!(int_width(id.into()) <= entry_length, "Entry {id} does not fit");
        ensure!(int_width(size) <= size_length, "Size {size} does not fit");
        ensure!(
            int_width(timestamp) <= timestamp_length,
            "Timestamp {timestamp} does not fit"
        );

        let bitfield = (entry_length - 1) | ((size_length - 1) << 2) | ((timestamp_length - 1) << 4);

        let mut out = Vec::with_capacity(1 + entry_length + size_length + timestamp_length + data.len());
        out.push(bitfield as u8);
        out.extend_from_slice(&u64::from(id).to_le_bytes()[..entry_length]);
        out.extend_from_slice(&size.to_le_bytes()[..size_length]);
        out.extend_from_slice(&timestamp.to_le_bytes()[..timestamp_length]);
        out.extend_from_slice(data);

        self.writer.write_all(&out)?;
        Ok(())
    }

    /// Declares a new entry and returns its id
    pub fn start_entry(
        &mut self,
        name: &str,
        r#type: &str,
        metadata: &str,
        timestamp: u64,
    ) -> Result<u32> {
        let id = self.next_id;
        self.next_id += 1;

        self.start_entry_with_id(id, name, r#type, metadata, timestamp)?;
        Ok(id)
    }

    /// Declares an entry under a caller-chosen id, e.g. to reuse one after it finished
    pub fn start_entry_with_id(
        &mut self,
        id: u32,
        name: &str,
        r#type: &str,
        metadata: &str,
        timestamp: u64,
    ) -> Result<()> {
        let mut data = vec![0];
        data.extend_from_slice(&id.to_le_bytes());
        length_prefixed(&mut data, name)?;
        length_prefixed(&mut data, r#type)?;
        length_prefixed(&mut data, metadata)?;

        self.write_record(0, timestamp, &data)
    }

    pub fn finish_entry(&mut self, id: u32, timestamp: u64) -> Result<()> {
        let mut data = vec![1];
        data.extend_from_slice(&id.to_le_bytes());

        self.write_record(0, timestamp, &data)
    }

    pub fn set_metadata(&mut self, id: u32, metadata: &str, timestamp: u64) -> Result<()> {
        let mut data = vec![2];
        data.extend_from_slice(&id.to_le_bytes());
        length_prefixed(&mut data, metadata)?;

        self.write_record(0, timestamp, &data)
    }

    pub fn append_f64(&mut self, id: u32, value: f64, timestamp: u64) -> Result<()> {
        self.write_record(id, timestamp, &value.to_le_bytes())
    }

    pub fn append_i64(&mut self, id: u32, value: i64, timestamp: u64) -> Result<()> {
        self.write_record(id, timestamp, &value.to_le_bytes())
    }

    pub fn append_bool(&mut self, id: u32, value: bool, timestamp: u64) -> Result<()> {
        self.write_record(id, timestamp, &[u8::from(value)])
    }

    pub fn append_string(&mut self, id: u32, value: &str, timestamp: u64) -> Result<()> {
        self.write_record(id, timestamp, value.as_bytes())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
