use std::collections::{BTreeMap, HashMap};

use log::{debug, warn};

use crate::{
    entrytypes::{EntryType, Value},
    reader::RawRecord,
    ControlData, Result,
};

/// Name of the state signal written by the SysId routine
pub const STATE_SIGNAL_NAME: &str = "State";
const STATE_SIGNAL_FRAGMENT: &str = "sysid-test-state";

/// A named time series in decode order
#[derive(Debug, Clone, PartialEq)]
pub struct Signal<T> {
    pub id: u32,
    pub name: Box<str>,
    pub values: Vec<(i64, T)>,
}

impl<T> Signal<T> {
    #[must_use]
    pub fn new(id: u32, name: Box<str>) -> Self {
        Signal {
            id,
            name,
            values: Vec::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    pub name: Box<str>,
    pub r#type: EntryType,
    pub metadata: Box<str>,
    pub finished: bool,
}

/// Every entry declared by a log, with the double and string entries collected into series
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: HashMap<u32, EntryInfo>,
    numeric: BTreeMap<u32, Signal<f64>>,
    textual: BTreeMap<u32, Signal<Box<str>>>,
    names: Vec<Box<str>>,
    /// Entry ids in the order of their most recent start
    declared: Vec<u32>,
}

impl Catalog {
    pub fn ingest<'a>(records: impl IntoIterator<Item = RawRecord<'a>>) -> Result<Self> {
        let mut catalog = Catalog::default();

        for record in records {
            catalog.push(record)?;
        }

        Ok(catalog)
    }

    /// Applies a single record to the catalog
    pub fn push(&mut self, record: RawRecord<'_>) -> Result<()> {
        if record.is_control() {
            return self.push_control(record);
        }

        let Some(info) = self.entries.get(&record.id) else {
            return Ok(());
        };

        let timestamp = i64::try_from(record.timestamp).unwrap_or(i64::MAX);

        match info.r#type {
            EntryType::Double => {
                if let (Some(signal), Value::Double(value)) =
                    (self.numeric.get_mut(&record.id), info.r#type.decode(record.data)?)
                {
                    signal.values.push((timestamp, value));
                }
            }
            EntryType::String => {
                if let (Some(signal), Value::String(value)) =
                    (self.textual.get_mut(&record.id), info.r#type.decode(record.data)?)
                {
                    signal.values.push((timestamp, value));
                }
            }
            _ => {}
        }

        Ok(())
    }

    fn push_control(&mut self, record: RawRecord<'_>) -> Result<()> {
        if !(record.is_start() || record.is_finish() || record.is_set_metadata()) {
            warn!(
                "Skipping control record with unknown tag {:?} at {}",
                record.data.first(),
                record.timestamp
            );
            return Ok(());
        }

        match ControlData::try_from(record)? {
            ControlData::Start(start) => {
                debug!(
                    "Start entry {} '{}' ({})",
                    start.entry, start.name, start.r#type
                );

                if start.entry == 0 {
                    warn!("Ignoring start for reserved entry 0 '{}'", start.name);
                    return Ok(());
                }

                let r#type = EntryType::parse(&start.r#type);

                if let Some(live) = self.entries.get(&start.entry) {
                    if !live.finished && live.r#type == r#type {
                        warn!(
                            "Ignoring repeated start for live entry {} '{}'",
                            start.entry, start.name
                        );
                        return Ok(());
                    }
                }

                // a restarted id begins a fresh series under its new declaration
                self.numeric.remove(&start.entry);
                self.textual.remove(&start.entry);
                self.declared.retain(|&id| id != start.entry);
                self.declared.push(start.entry);

                match r#type {
                    EntryType::Double => {
                        self.numeric
                            .insert(start.entry, Signal::new(start.entry, start.name.clone()));
                    }
                    EntryType::String => {
                        self.textual
                            .insert(start.entry, Signal::new(start.entry, start.name.clone()));
                    }
                    _ => {}
                }

                if !self.names.contains(&start.name) {
                    self.names.push(start.name.clone());
                }

                self.entries.insert(
                    start.entry,
                    EntryInfo {
                        name: start.name,
                        r#type,
                        metadata: start.metadata,
                        finished: false,
                    },
                );
            }
            ControlData::Finish(finish) => {
                debug!("Finish entry {}", finish.entry);

                if let Some(info) = self.entries.get_mut(&finish.entry) {
                    info.finished = true;
                }
            }
            ControlData::SetMetadata(update) => {
                debug!("Set metadata for entry {}", update.entry);

                if let Some(info) = self.entries.get_mut(&update.entry) {
                    info.metadata = update.metadata;
                }
            }
        }

        Ok(())
    }

    #[must_use]
    pub fn entry(&self, id: u32) -> Option<&EntryInfo> {
        self.entries.get(&id)
    }

    /// Distinct entry names in the order they were first declared
    #[must_use]
    pub fn names(&self) -> &[Box<str>] {
        &self.names
    }

    #[must_use]
    pub fn numeric(&self) -> &BTreeMap<u32, Signal<f64>> {
        &self.numeric
    }

    #[must_use]
    pub fn textual(&self) -> &BTreeMap<u32, Signal<Box<str>>> {
        &self.textual
    }

    #[must_use]
    pub fn numeric_by_name(&self, name: &str) -> Option<&Signal<f64>> {
        self.declared
            .iter()
            .filter_map(|id| self.numeric.get(id))
            .find(|signal| &*signal.name == name)
    }

    #[must_use]
    pub fn textual_by_name(&self, name: &str) -> Option<&Signal<Box<str>>> {
        self.declared
            .iter()
            .filter_map(|id| self.textual.get(id))
            .find(|signal| &*signal.name == name)
    }

    /// The SysId state signal: named `State`, or containing `sysid-test-state` in any case
    #[must_use]
    pub fn state_signal(&self) -> Option<&Signal<Box<str>>> {
        self.declared
            .iter()
            .filter_map(|id| self.textual.get(id))
            .find(|signal| {
                &*signal.name == STATE_SIGNAL_NAME
                    || signal
                        .name
                        .to_ascii_lowercase()
                        .contains(STATE_SIGNAL_FRAGMENT)
            })
    }
}
