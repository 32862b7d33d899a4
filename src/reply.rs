//! Assembled reply types.

use bytes::Bytes;

use crate::token::ResponseType;

/// Outcome of a classified reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The command completed; `data` carries the payload if the family has one.
    Success,
    /// The server reported an error line; `message` carries it.
    Error,
}

/// Semantic payload of a successful reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyData {
    /// Counter value from an incr/decr reply.
    Number(u64),
    /// Matched token from a closed-vocabulary family.
    Token(ResponseType),
    /// Retrieved values from a get/gets reply, in arrival order.
    /// Empty on a complete miss.
    Values(Vec<Value>),
}

/// A single retrieved value from a `VALUE` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value {
    pub key: Vec<u8>,
    /// Client-defined flags stored with the item (opaque to the server).
    pub flags: u32,
    /// CAS unique token, present when the reply is from a `gets` command.
    pub cas: Option<u64>,
    pub data: Bytes,
}

/// The assembled response for one command invocation.
///
/// `status` is set exactly once, when the classifier reports the reply
/// terminal; the classifier never re-evaluates lines after that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: Status,
    /// Present on success when the family carries a payload. Absent for an
    /// incr/decr `NOT_FOUND` reply (the key had no counter to return).
    pub data: Option<ReplyData>,
    /// Present on error: the symbolic `ERROR` name, or the verbatim
    /// `CLIENT ERROR` / `SERVER ERROR` line text.
    pub message: Option<String>,
}

impl Reply {
    pub(crate) fn success(data: Option<ReplyData>) -> Self {
        Reply {
            status: Status::Success,
            data,
            message: None,
        }
    }

    pub(crate) fn error(message: String) -> Self {
        Reply {
            status: Status::Error,
            data: None,
            message: Some(message),
        }
    }

    /// Returns true if this is a server-reported error reply.
    #[inline]
    pub fn is_error(&self) -> bool {
        self.status == Status::Error
    }

    /// Returns true if this reply represents a cache miss: an empty
    /// retrieval, a `NOT_FOUND` token, or a counter reply with no value.
    #[inline]
    pub fn is_miss(&self) -> bool {
        match (self.status, &self.data) {
            (Status::Success, None) => true,
            (_, Some(ReplyData::Values(values))) => values.is_empty(),
            (_, Some(ReplyData::Token(ResponseType::NotFound))) => true,
            _ => false,
        }
    }

    /// The counter value, if this is a numeric reply.
    #[inline]
    pub fn number(&self) -> Option<u64> {
        match self.data {
            Some(ReplyData::Number(n)) => Some(n),
            _ => None,
        }
    }

    /// The retrieved values, if this is a retrieval reply.
    #[inline]
    pub fn values(&self) -> Option<&[Value]> {
        match &self.data {
            Some(ReplyData::Values(values)) => Some(values),
            _ => None,
        }
    }

    /// The matched token, if this is a closed-vocabulary reply.
    #[inline]
    pub fn token(&self) -> Option<ResponseType> {
        match self.data {
            Some(ReplyData::Token(t)) => Some(t),
            _ => None,
        }
    }
}
