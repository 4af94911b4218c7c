#![warn(clippy::pedantic, clippy::all)]
#![allow(
    clippy::module_name_repetitions,

    // TODO: Remove these exceptions
    clippy::missing_errors_doc,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
)]

#[cfg(test)]
mod tests;

static HEADER_STRING: &[u8; 6] = b"WPILOG";
static HEADER_VERSION: u16 = 0x0100;

/// Length of the fixed part of the log header (magic, version, extra header length)
pub const HEADER_LENGTH: usize = 12;

pub mod catalog;
pub mod entrytypes;
pub mod error;
pub mod header;
pub mod pipeline;
pub mod reader;
pub mod record;
pub mod resample;
pub mod sysid;
pub mod writer;

pub use catalog::{Catalog, Signal};
pub use error::{Error, Result};
pub use header::LogHeader;
pub use reader::{RawRecord, WPILOGReader};

/// Declares a new entry. Every data record with id `entry` is decoded using `type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartPayload {
    pub entry: u32,
    pub name: Box<str>,
    pub r#type: Box<str>,
    pub metadata: Box<str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataPayload {
    pub entry: u32,
    pub metadata: Box<str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinishPayload {
    pub entry: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlData {
    Start(StartPayload),
    Finish(FinishPayload),
    SetMetadata(MetadataPayload),
}

impl ControlData {
    #[must_use]
    pub fn entry(&self) -> u32 {
        match self {
            ControlData::Start(start) => start.entry,
            ControlData::Finish(finish) => finish.entry,
            ControlData::SetMetadata(metadata) => metadata.entry,
        }
    }
}
