use mail_parser::{Addr, MessageParser};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Failure kinds a message reader can report.
///
/// The scan tolerates the first four with a per-file skip; an `Io`
/// failure aborts the run instead of being silently swallowed.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("malformed message container")]
    MalformedContainer,

    #[error("unsupported field access: {0}")]
    FieldAccess(String),

    #[error("unimplemented message feature: {0}")]
    Unimplemented(String),

    #[error("unrecognized message subtype: {0}")]
    UnrecognizedSubtype(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ReadError {
    /// Whether the scan may skip the offending file and continue.
    pub fn is_skippable(&self) -> bool {
        !matches!(self, Self::Io(_))
    }
}

/// Header fields extracted from one message file. A message with no
/// subject yields the empty string, not an error.
#[derive(Debug, Clone, Default)]
pub struct MessageFields {
    pub subject: String,
    pub sender: Option<String>,
    pub recipients: Option<String>,
}

/// Opaque message-file access. The pipeline only depends on this trait,
/// so tests and alternative container formats can plug in their own
/// readers.
pub trait MessageReader {
    fn read(&self, path: &Path) -> Result<MessageFields, ReadError>;
}

/// Production reader for RFC 5322 message files.
#[derive(Debug, Default)]
pub struct MailFileReader;

fn render_addr(addr: &Addr) -> String {
    if let Some(name) = addr.name() {
        format!("{} <{}>", name, addr.address().unwrap_or(""))
    } else {
        addr.address().unwrap_or("").to_string()
    }
}

impl MessageReader for MailFileReader {
    fn read(&self, path: &Path) -> Result<MessageFields, ReadError> {
        let raw = fs::read(path)?;
        let parsed = MessageParser::default()
            .parse(&raw)
            .ok_or(ReadError::MalformedContainer)?;

        let subject = parsed.subject().map(|s| s.to_string()).unwrap_or_default();

        let sender = parsed
            .from()
            .and_then(|a| a.first())
            .map(render_addr)
            .filter(|s| !s.is_empty());

        let recipients = parsed
            .to()
            .map(|list| {
                list.iter()
                    .map(render_addr)
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join("; ")
            })
            .filter(|s| !s.is_empty());

        Ok(MessageFields {
            subject,
            sender,
            recipients,
        })
    }
}
