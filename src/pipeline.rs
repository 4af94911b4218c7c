use std::{sync::Arc, thread::JoinHandle};

use anyhow::format_err;
use kanal::Receiver;
use log::info;

use crate::{catalog::Catalog, header::LogHeader, reader::WPILOGReader, Result};

/// Validates, frames and catalogs a whole log.
///
/// `progress` is called after every record with the fraction of the buffer consumed.
pub fn analyze(buffer: &[u8], mut progress: impl FnMut(f64)) -> Result<(LogHeader, Catalog)> {
    let (header, reader) = WPILOGReader::new(buffer)?;

    info!(
        "Log version {}.{}, extra header '{}'",
        header.major(),
        header.minor(),
        header.extra_header
    );

    let mut catalog = Catalog::default();
    let mut records = 0usize;

    for (record, fraction) in reader.with_progress() {
        catalog.push(record)?;
        records += 1;
        progress(fraction);
    }

    info!(
        "Log contains {records} records across {} entries",
        catalog.names().len()
    );

    Ok((header, catalog))
}

/// Runs [`analyze`] on a background thread.
///
/// Progress is reported in whole percent over a channel. Dropping the receiver stops
/// the reports but not the decode itself.
pub struct AnalysisWorker {
    progress: Receiver<f64>,
    handle: JoinHandle<Result<(LogHeader, Catalog)>>,
}

impl AnalysisWorker {
    #[must_use]
    pub fn spawn(buffer: Arc<[u8]>) -> AnalysisWorker {
        let (sender, progress) = kanal::unbounded::<f64>();

        let handle = std::thread::spawn(move || {
            let mut last_percent = -1.0;

            analyze(&buffer, |fraction| {
                let percent = (fraction * 100.0).floor();

                if percent > last_percent {
                    last_percent = percent;
                    // The receiver may have gone away; the decode carries on regardless
                    let _ = sender.send(percent / 100.0);
                }
            })
        });

        AnalysisWorker { progress, handle }
    }

    #[must_use]
    pub fn progress(&self) -> &Receiver<f64> {
        &self.progress
    }

    pub fn join(self) -> anyhow::Result<(LogHeader, Catalog)> {
        let result = self
            .handle
            .join()
            .map_err(|err| format_err!("{err:#?}"))?;

        Ok(result?)
    }
}
