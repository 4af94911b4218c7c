mod catalog;
mod header;

use crate::writer::WPILOGWriter;

/// Builds an in-memory log with an empty extra header
fn build_log(fill: impl FnOnce(&mut WPILOGWriter<Vec<u8>>) -> anyhow::Result<()>) -> Vec<u8> {
    let mut writer = WPILOGWriter::new(Vec::new(), "").unwrap();
    fill(&mut writer).unwrap();
    writer.into_inner()
}
