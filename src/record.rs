use crate::{
    entrytypes::PayloadCursor, reader::RawRecord, ControlData, Error, FinishPayload,
    MetadataPayload, Result, StartPayload,
};

const CONTROL_START: u8 = 0;
const CONTROL_FINISH: u8 = 1;
const CONTROL_SET_METADATA: u8 = 2;

impl RawRecord<'_> {
    #[must_use]
    pub fn is_control(&self) -> bool {
        self.id == 0
    }

    fn control_tag(&self) -> Option<u8> {
        if self.is_control() {
            self.data.first().copied()
        } else {
            None
        }
    }

    #[must_use]
    pub fn is_start(&self) -> bool {
        self.control_tag() == Some(CONTROL_START)
    }

    #[must_use]
    pub fn is_finish(&self) -> bool {
        self.control_tag() == Some(CONTROL_FINISH)
    }

    #[must_use]
    pub fn is_set_metadata(&self) -> bool {
        self.control_tag() == Some(CONTROL_SET_METADATA)
    }

    fn wrong_kind(&self, expected: &'static str) -> Error {
        Error::WrongRecordKind {
            expected,
            id: self.id,
            tag: self.data.first().copied(),
        }
    }

    /// Cursor positioned after the control tag, with the entry id already read
    fn control_body(&self) -> Result<(u32, PayloadCursor<'_>)> {
        let mut cursor = PayloadCursor::new(self.data);
        cursor.read_u8()?;
        let entry = cursor.read_u32()?;

        Ok((entry, cursor))
    }

    pub fn decode_start(&self) -> Result<StartPayload> {
        if !self.is_start() {
            return Err(self.wrong_kind("start"));
        }

        let (entry, mut cursor) = self.control_body()?;
        let name = cursor.read_length_prefixed("entry name")?;
        let r#type = cursor.read_length_prefixed("entry type")?;
        let metadata = cursor.read_length_prefixed("entry metadata")?;

        Ok(StartPayload {
            entry,
            name,
            r#type,
            metadata,
        })
    }

    pub fn decode_finish(&self) -> Result<FinishPayload> {
        if !self.is_finish() {
            return Err(self.wrong_kind("finish"));
        }

        let (entry, _) = self.control_body()?;

        Ok(FinishPayload { entry })
    }

    pub fn decode_set_metadata(&self) -> Result<MetadataPayload> {
        if !self.is_set_metadata() {
            return Err(self.wrong_kind("set metadata"));
        }

        let (entry, mut cursor) = self.control_body()?;
        let metadata = cursor.read_length_prefixed("entry metadata")?;

        Ok(MetadataPayload { entry, metadata })
    }
}

impl TryFrom<RawRecord<'_>> for ControlData {
    type Error = Error;

    fn try_from(record: RawRecord<'_>) -> Result<Self> {
        match record.control_tag() {
            Some(CONTROL_START) => record.decode_start().map(ControlData::Start),
            Some(CONTROL_FINISH) => record.decode_finish().map(ControlData::Finish),
            Some(CONTROL_SET_METADATA) => {
                record.decode_set_metadata().map(ControlData::SetMetadata)
            }
            _ => Err(record.wrong_kind("control")),
        }
    }
}
