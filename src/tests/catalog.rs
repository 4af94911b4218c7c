use crate::{catalog::Catalog, entrytypes::EntryType, reader::WPILOGReader, Error};

fn catalog_of(buffer: &[u8]) -> crate::Result<Catalog> {
    let (_, reader) = WPILOGReader::new(buffer)?;
    Catalog::ingest(reader)
}

#[test]
fn collects_double_series_in_order() {
    let buffer = super::build_log(|log| {
        let id = log.start_entry("Velocity", "double", "", 0)?;
        log.append_f64(id, 1.0, 0)?;
        log.append_f64(id, 2.0, 10)?;
        log.append_f64(id, 3.0, 20)
    });
    let catalog = catalog_of(&buffer).unwrap();

    let velocity = catalog.numeric_by_name("Velocity").unwrap();
    assert_eq!(velocity.id, 1);
    assert_eq!(velocity.values, vec![(0, 1.0), (10, 2.0), (20, 3.0)]);
    assert!(!catalog.numeric().contains_key(&0));
}

#[test]
fn keeps_decode_order_for_unsorted_timestamps() {
    let buffer = super::build_log(|log| {
        let id = log.start_entry("State", "string", "", 0)?;
        log.append_string(id, "b", 30)?;
        log.append_string(id, "a", 10)
    });
    let catalog = catalog_of(&buffer).unwrap();

    let state = catalog.state_signal().unwrap();
    assert_eq!(state.values, vec![(30, Box::<str>::from("b")), (10, Box::<str>::from("a"))]);
}

#[test]
fn surfaces_only_double_and_string_series() {
    let buffer = super::build_log(|log| {
        let flag = log.start_entry("Enabled", "boolean", "", 0)?;
        let count = log.start_entry("Count", "int64", "", 0)?;
        log.append_bool(flag, true, 1)?;
        log.append_i64(count, 7, 1)
    });
    let catalog = catalog_of(&buffer).unwrap();

    assert!(catalog.numeric().is_empty());
    assert!(catalog.textual().is_empty());
    assert_eq!(catalog.names().len(), 2);
    assert_eq!(catalog.entry(2).unwrap().r#type, EntryType::Int64);
}

#[test]
fn skips_data_for_undeclared_entries() {
    let buffer = super::build_log(|log| {
        log.append_f64(9, 1.0, 0)?;
        let id = log.start_entry("Voltage", "double", "", 0)?;
        log.append_f64(id, 12.0, 5)
    });
    let catalog = catalog_of(&buffer).unwrap();

    assert_eq!(catalog.numeric().len(), 1);
    assert_eq!(catalog.numeric_by_name("Voltage").unwrap().len(), 1);
}

#[test]
fn metadata_and_finish_only_touch_bookkeeping() {
    let buffer = super::build_log(|log| {
        let id = log.start_entry("Position", "double", "old", 0)?;
        log.append_f64(id, 1.0, 1)?;
        log.set_metadata(id, "new", 2)?;
        log.finish_entry(id, 3)
    });
    let catalog = catalog_of(&buffer).unwrap();

    let info = catalog.entry(1).unwrap();
    assert_eq!(&*info.metadata, "new");
    assert!(info.finished);
    assert_eq!(catalog.numeric_by_name("Position").unwrap().len(), 1);
}

#[test]
fn names_are_deduplicated_in_declaration_order() {
    let buffer = super::build_log(|log| {
        log.start_entry("b", "double", "", 0)?;
        log.start_entry("a", "string", "", 0)?;
        log.start_entry("b", "double", "", 0)?;
        Ok(())
    });
    let catalog = catalog_of(&buffer).unwrap();

    let names: Vec<&str> = catalog.names().iter().map(|name| &**name).collect();
    assert_eq!(names, ["b", "a"]);
}

#[test]
fn finds_state_signal_by_fragment() {
    let buffer = super::build_log(|log| {
        log.start_entry("Other", "string", "", 0)?;
        log.start_entry("/SysId/SYSID-TEST-STATE-Drive", "string", "", 0)?;
        Ok(())
    });
    let catalog = catalog_of(&buffer).unwrap();

    assert_eq!(catalog.state_signal().unwrap().id, 2);
}

#[test]
fn short_double_payload_is_fatal() {
    let buffer = super::build_log(|log| {
        let id = log.start_entry("Velocity", "double", "", 0)?;
        log.write_record(id, 1, &[0; 3])
    });

    assert!(matches!(
        catalog_of(&buffer),
        Err(Error::Decode { what: "double", .. })
    ));
}

#[test]
fn restart_after_finish_begins_new_series() {
    let buffer = super::build_log(|log| {
        log.start_entry_with_id(5, "Old", "double", "", 0)?;
        log.append_f64(5, 1.0, 1)?;
        log.finish_entry(5, 2)?;
        log.start_entry_with_id(5, "State", "string", "", 3)?;
        log.append_string(5, "dynamic-forward", 4)
    });
    let catalog = catalog_of(&buffer).unwrap();

    let names: Vec<&str> = catalog.names().iter().map(|name| &**name).collect();
    assert_eq!(names, ["Old", "State"]);
    assert!(catalog.numeric_by_name("Old").is_none());

    let state = catalog.state_signal().unwrap();
    assert_eq!(state.id, 5);
    assert_eq!(state.values, vec![(4, Box::<str>::from("dynamic-forward"))]);

    let info = catalog.entry(5).unwrap();
    assert_eq!(info.r#type, EntryType::String);
    assert!(!info.finished);
}

#[test]
fn restart_with_new_type_replaces_live_entry() {
    let buffer = super::build_log(|log| {
        log.start_entry_with_id(3, "Counter", "int64", "", 0)?;
        log.append_i64(3, 7, 1)?;
        log.start_entry_with_id(3, "Voltage", "double", "", 2)?;
        log.append_f64(3, 12.5, 3)
    });
    let catalog = catalog_of(&buffer).unwrap();

    assert_eq!(catalog.entry(3).unwrap().r#type, EntryType::Double);
    assert_eq!(catalog.numeric_by_name("Voltage").unwrap().values, vec![(3, 12.5)]);
}

#[test]
fn duplicate_start_for_live_entry_is_ignored() {
    let buffer = super::build_log(|log| {
        log.start_entry_with_id(4, "Position", "double", "", 0)?;
        log.append_f64(4, 1.0, 1)?;
        log.start_entry_with_id(4, "Renamed", "double", "", 2)?;
        log.append_f64(4, 2.0, 3)
    });
    let catalog = catalog_of(&buffer).unwrap();

    assert_eq!(catalog.names().len(), 1);
    assert_eq!(
        catalog.numeric_by_name("Position").unwrap().values,
        vec![(1, 1.0), (3, 2.0)]
    );
}

#[test]
fn name_lookup_follows_declaration_order() {
    let buffer = super::build_log(|log| {
        log.start_entry_with_id(9, "Velocity", "double", "", 0)?;
        log.start_entry_with_id(2, "Velocity", "double", "", 0)?;
        log.start_entry_with_id(8, "State", "string", "", 0)?;
        log.start_entry_with_id(1, "State", "string", "", 0)?;
        Ok(())
    });
    let catalog = catalog_of(&buffer).unwrap();

    assert_eq!(catalog.numeric_by_name("Velocity").unwrap().id, 9);
    assert_eq!(catalog.textual_by_name("State").unwrap().id, 8);
    assert_eq!(catalog.state_signal().unwrap().id, 8);
}

#[test]
fn start_for_reserved_entry_is_ignored() {
    let buffer = super::build_log(|log| {
        log.start_entry_with_id(0, "Bogus", "double", "", 0)
    });
    let catalog = catalog_of(&buffer).unwrap();

    assert!(catalog.names().is_empty());
    assert!(catalog.entry(0).is_none());
    assert!(catalog.numeric().is_empty());
}

#[test]
fn unknown_control_tags_are_skipped() {
    let buffer = super::build_log(|log| {
        log.write_record(0, 0, &[7, 1, 0, 0, 0])?;
        log.write_record(0, 0, &[])?;
        let id = log.start_entry("Voltage", "double", "", 1)?;
        log.append_f64(id, 3.0, 2)
    });
    let catalog = catalog_of(&buffer).unwrap();

    assert_eq!(catalog.names().len(), 1);
    assert_eq!(catalog.numeric_by_name("Voltage").unwrap().len(), 1);
}

#[test]
fn invalid_utf8_string_payload_is_fatal() {
    let buffer = super::build_log(|log| {
        let id = log.start_entry("State", "string", "", 0)?;
        log.write_record(id, 1, &[b'o', 0xff, b'k'])
    });

    assert!(matches!(
        catalog_of(&buffer),
        Err(Error::Utf8 { what: "string", .. })
    ));
}
