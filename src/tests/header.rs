use crate::{header::LogHeader, Error};

fn header(version: u16, extra: &[u8]) -> Vec<u8> {
    let mut buffer = b"WPILOG".to_vec();
    buffer.extend_from_slice(&version.to_le_bytes());
    buffer.extend_from_slice(&(extra.len() as u32).to_le_bytes());
    buffer.extend_from_slice(extra);
    buffer
}

#[test]
fn accepts_minimal_header() {
    let header = LogHeader::validate(&header(0x0100, b"")).unwrap();

    assert_eq!(header.version, 0x0100);
    assert_eq!(&*header.extra_header, "");
    assert_eq!(header.records_offset(), 12);
    assert_eq!((header.major(), header.minor()), (1, 0));
}

#[test]
fn reads_extra_header() {
    let header = LogHeader::validate(&header(0x0101, b"team 1234")).unwrap();

    assert_eq!(&*header.extra_header, "team 1234");
    assert_eq!(header.records_offset(), 21);
    assert_eq!(header.minor(), 1);
}

#[test]
fn rejects_short_buffers() {
    let full = header(0x0100, b"");

    for length in 0..12 {
        assert!(matches!(
            LogHeader::validate(&full[..length]),
            Err(Error::InvalidHeader(_))
        ));
    }
}

#[test]
fn rejects_bad_magic() {
    for index in 0..6 {
        let mut buffer = header(0x0100, b"");
        buffer[index] ^= 0x20;

        assert!(matches!(
            LogHeader::validate(&buffer),
            Err(Error::InvalidHeader(_))
        ));
    }
}

#[test]
fn rejects_old_version() {
    assert!(matches!(
        LogHeader::validate(&header(0x00ff, b"")),
        Err(Error::InvalidHeader(_))
    ));
}

#[test]
fn rejects_extra_header_past_end() {
    let mut buffer = header(0x0100, b"abc");
    buffer.truncate(14);

    assert!(matches!(
        LogHeader::validate(&buffer),
        Err(Error::InvalidHeader(_))
    ));
}

#[test]
fn rejects_non_utf8_extra_header() {
    assert!(matches!(
        LogHeader::validate(&header(0x0100, &[b'o', 0xfe, b'k'])),
        Err(Error::InvalidHeader(_))
    ));
}
