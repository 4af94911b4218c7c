use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid log header: {0}")]
    InvalidHeader(&'static str),
    #[error("expected a {expected} record, found entry {id} with tag {tag:?}")]
    WrongRecordKind {
        expected: &'static str,
        id: u32,
        tag: Option<u8>,
    },
    #[error("not enough data for {what}: needed {needed} byte(s), {remaining} remaining")]
    Decode {
        what: &'static str,
        needed: usize,
        remaining: usize,
    },
    #[error("invalid utf-8 in {what}")]
    Utf8 {
        what: &'static str,
        #[source]
        source: std::str::Utf8Error,
    },
    #[error("need at least {needed} sample(s), found {found}")]
    InsufficientSamples { needed: usize, found: usize },
    #[error("no signal has enough samples to act as time base for {0}")]
    NoTimeBase(String),
    #[error("{role} signal is missing: {hint}")]
    MissingSignal { role: &'static str, hint: String },
}
