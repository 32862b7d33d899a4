//! Multi-line VALUE block assembly for get/gets replies.
//!
//! A retrieval reply is a sequence of blocks, each a header line
//! `VALUE <key> <flags> <bytes> [<cas unique>]` followed by exactly
//! `<bytes>` bytes of payload, terminated by a lone `END` line. The payload
//! may itself contain the CRLF delimiter, in which case the transport's line
//! splitter hands it over as several lines; the accumulator re-joins those
//! chunks with CRLF until the declared byte count is reached.

use std::cmp::Ordering;

use bytes::{BufMut, BytesMut};

use crate::error::ClassifyError;
use crate::reply::Value;
use crate::token::ResponseType;

const VALUE_PREFIX: &[u8] = b"VALUE ";
const CRLF: &[u8] = b"\r\n";

/// Maximum declared payload size (1MB, the memcached default item limit).
const MAX_VALUE_DATA_LEN: usize = 1024 * 1024;

/// A VALUE header whose payload is still being accumulated.
#[derive(Debug)]
struct PendingValue {
    key: Vec<u8>,
    flags: u32,
    cas: Option<u64>,
    expected: usize,
    data: BytesMut,
    chunks: usize,
}

impl PendingValue {
    fn complete(self) -> Value {
        Value {
            key: self.key,
            flags: self.flags,
            cas: self.cas,
            data: self.data.freeze(),
        }
    }
}

/// Accumulates VALUE blocks until the terminating END line.
#[derive(Debug, Default)]
pub(crate) struct RetrieveState {
    values: Vec<Value>,
    pending: Option<PendingValue>,
}

impl RetrieveState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Feed one trimmed line.
    ///
    /// Returns `Ok(Some(values))` when the END line arrives, `Ok(None)` while
    /// more lines are expected.
    pub(crate) fn push_line(
        &mut self,
        line: &[u8],
    ) -> Result<Option<Vec<Value>>, ClassifyError> {
        if let Some(mut pending) = self.pending.take() {
            // Payload line. Chunks after the first re-join with the CRLF the
            // splitter consumed.
            if pending.chunks > 0 {
                pending.data.put_slice(CRLF);
            }
            pending.data.put_slice(line);
            pending.chunks += 1;
            match pending.data.len().cmp(&pending.expected) {
                Ordering::Greater => {
                    return Err(ClassifyError::Protocol(
                        "value data exceeds declared length",
                    ));
                }
                Ordering::Equal => self.values.push(pending.complete()),
                Ordering::Less => self.pending = Some(pending),
            }
            return Ok(None);
        }

        if ResponseType::End.matches(line) {
            return Ok(Some(std::mem::take(&mut self.values)));
        }

        match line.strip_prefix(VALUE_PREFIX) {
            Some(fields) => {
                self.pending = Some(parse_value_header(fields)?);
                Ok(None)
            }
            None => Err(ClassifyError::Protocol("expected VALUE or END")),
        }
    }
}

/// Parse the fields of a `VALUE <key> <flags> <bytes> [<cas unique>]` header.
fn parse_value_header(fields: &[u8]) -> Result<PendingValue, ClassifyError> {
    let mut parts = fields.split(|&b| b == b' ');

    let key = parts
        .next()
        .filter(|k| !k.is_empty())
        .ok_or(ClassifyError::Protocol("VALUE requires key"))?;
    let flags = parts
        .next()
        .ok_or(ClassifyError::Protocol("VALUE requires flags"))?;
    let bytes = parts
        .next()
        .ok_or(ClassifyError::Protocol("VALUE requires length"))?;
    let cas = parts.next();
    if parts.next().is_some() {
        return Err(ClassifyError::Protocol("trailing fields in VALUE line"));
    }

    let flags = parse_u32(flags)?;
    let expected = parse_usize(bytes)?;
    if expected > MAX_VALUE_DATA_LEN {
        return Err(ClassifyError::Protocol("value data too large"));
    }
    let cas = match cas {
        Some(c) => Some(parse_u64(c)?),
        None => None,
    };

    Ok(PendingValue {
        key: key.to_vec(),
        flags,
        cas,
        expected,
        data: BytesMut::with_capacity(expected),
        chunks: 0,
    })
}

/// Parse a u32 from ASCII decimal.
fn parse_u32(data: &[u8]) -> Result<u32, ClassifyError> {
    std::str::from_utf8(data)
        .map_err(|_| ClassifyError::InvalidNumber)?
        .parse()
        .map_err(|_| ClassifyError::InvalidNumber)
}

/// Parse a u64 from ASCII decimal.
fn parse_u64(data: &[u8]) -> Result<u64, ClassifyError> {
    std::str::from_utf8(data)
        .map_err(|_| ClassifyError::InvalidNumber)?
        .parse()
        .map_err(|_| ClassifyError::InvalidNumber)
}

/// Parse a usize from ASCII decimal.
fn parse_usize(data: &[u8]) -> Result<usize, ClassifyError> {
    std::str::from_utf8(data)
        .map_err(|_| ClassifyError::InvalidNumber)?
        .parse()
        .map_err(|_| ClassifyError::InvalidNumber)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_value() {
        let mut state = RetrieveState::new();
        assert_eq!(state.push_line(b"VALUE mykey 0 5").unwrap(), None);
        assert_eq!(state.push_line(b"hello").unwrap(), None);
        let values = state.push_line(b"END").unwrap().unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].key, b"mykey");
        assert_eq!(values[0].flags, 0);
        assert_eq!(values[0].cas, None);
        assert_eq!(values[0].data.as_ref(), b"hello");
    }

    #[test]
    fn test_miss() {
        let mut state = RetrieveState::new();
        let values = state.push_line(b"END").unwrap().unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn test_multi_value_with_cas() {
        let mut state = RetrieveState::new();
        assert_eq!(state.push_line(b"VALUE k1 0 3 100").unwrap(), None);
        assert_eq!(state.push_line(b"foo").unwrap(), None);
        assert_eq!(state.push_line(b"VALUE k2 7 3 200").unwrap(), None);
        assert_eq!(state.push_line(b"bar").unwrap(), None);
        let values = state.push_line(b"END").unwrap().unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].key, b"k1");
        assert_eq!(values[0].cas, Some(100));
        assert_eq!(values[1].key, b"k2");
        assert_eq!(values[1].flags, 7);
        assert_eq!(values[1].cas, Some(200));
    }

    #[test]
    fn test_payload_containing_delimiter() {
        // Payload "ab\r\ncd" (6 bytes) arrives split into two lines.
        let mut state = RetrieveState::new();
        assert_eq!(state.push_line(b"VALUE k 0 6").unwrap(), None);
        assert_eq!(state.push_line(b"ab").unwrap(), None);
        assert_eq!(state.push_line(b"cd").unwrap(), None);
        let values = state.push_line(b"END").unwrap().unwrap();
        assert_eq!(values[0].data.as_ref(), b"ab\r\ncd");
    }

    #[test]
    fn test_payload_trailing_delimiter() {
        // Payload "ab\r\n" (4 bytes): the second line is empty.
        let mut state = RetrieveState::new();
        assert_eq!(state.push_line(b"VALUE k 0 4").unwrap(), None);
        assert_eq!(state.push_line(b"ab").unwrap(), None);
        assert_eq!(state.push_line(b"").unwrap(), None);
        let values = state.push_line(b"END").unwrap().unwrap();
        assert_eq!(values[0].data.as_ref(), b"ab\r\n");
    }

    #[test]
    fn test_zero_length_payload() {
        let mut state = RetrieveState::new();
        assert_eq!(state.push_line(b"VALUE k 0 0").unwrap(), None);
        assert_eq!(state.push_line(b"").unwrap(), None);
        let values = state.push_line(b"END").unwrap().unwrap();
        assert_eq!(values[0].data.as_ref(), b"");
    }

    #[test]
    fn test_payload_overrun() {
        let mut state = RetrieveState::new();
        assert_eq!(state.push_line(b"VALUE k 0 3").unwrap(), None);
        assert_eq!(
            state.push_line(b"toolong"),
            Err(ClassifyError::Protocol("value data exceeds declared length"))
        );
    }

    #[test]
    fn test_unexpected_line_between_blocks() {
        let mut state = RetrieveState::new();
        assert_eq!(state.push_line(b"VALUE k 0 3").unwrap(), None);
        assert_eq!(state.push_line(b"abc").unwrap(), None);
        assert_eq!(
            state.push_line(b"STORED"),
            Err(ClassifyError::Protocol("expected VALUE or END"))
        );
    }

    #[test]
    fn test_bad_header() {
        let mut state = RetrieveState::new();
        assert_eq!(
            state.push_line(b"VALUE k"),
            Err(ClassifyError::Protocol("VALUE requires flags"))
        );
        assert_eq!(
            RetrieveState::new().push_line(b"VALUE k abc 5"),
            Err(ClassifyError::InvalidNumber)
        );
        assert_eq!(
            RetrieveState::new().push_line(b"VALUE k 0 xyz"),
            Err(ClassifyError::InvalidNumber)
        );
        assert_eq!(
            RetrieveState::new().push_line(b"VALUE k 0 5 1 extra"),
            Err(ClassifyError::Protocol("trailing fields in VALUE line"))
        );
    }

    #[test]
    fn test_declared_length_cap() {
        let mut state = RetrieveState::new();
        assert_eq!(
            state.push_line(b"VALUE k 0 1048577"),
            Err(ClassifyError::Protocol("value data too large"))
        );
        assert_eq!(
            RetrieveState::new().push_line(b"VALUE k 0 99999999999999999999"),
            Err(ClassifyError::InvalidNumber)
        );
    }
}
