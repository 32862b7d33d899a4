//! Terminal token table for the memcache ASCII protocol.
//!
//! Each token pairs its exact wire byte pattern with a symbolic name.
//! Matching is exact byte equality against a trimmed line: the protocol is
//! case-sensitive, so there is no case folding and no prefix matching here.

/// A terminal response token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseType {
    /// `STORED` - storage command succeeded
    Stored,
    /// `NOT_STORED` - storage condition not met (add on existing key, etc.)
    NotStored,
    /// `EXISTS` - cas token did not match the stored item
    Exists,
    /// `NOT_FOUND` - the key does not exist
    NotFound,
    /// `DELETED` - delete succeeded
    Deleted,
    /// `TOUCHED` - touch succeeded
    Touched,
    /// `OK` - generic acknowledgement (flush_all)
    Ok,
    /// `END` - terminates a retrieval reply
    End,
    /// `ERROR` - the server did not recognize the command
    Error,
}

impl ResponseType {
    /// The exact byte pattern for this token as it appears on the wire.
    pub const fn token(self) -> &'static [u8] {
        match self {
            ResponseType::Stored => b"STORED",
            ResponseType::NotStored => b"NOT_STORED",
            ResponseType::Exists => b"EXISTS",
            ResponseType::NotFound => b"NOT_FOUND",
            ResponseType::Deleted => b"DELETED",
            ResponseType::Touched => b"TOUCHED",
            ResponseType::Ok => b"OK",
            ResponseType::End => b"END",
            ResponseType::Error => b"ERROR",
        }
    }

    /// The symbolic name of this token (same spelling as the wire pattern).
    pub const fn name(self) -> &'static str {
        match self {
            ResponseType::Stored => "STORED",
            ResponseType::NotStored => "NOT_STORED",
            ResponseType::Exists => "EXISTS",
            ResponseType::NotFound => "NOT_FOUND",
            ResponseType::Deleted => "DELETED",
            ResponseType::Touched => "TOUCHED",
            ResponseType::Ok => "OK",
            ResponseType::End => "END",
            ResponseType::Error => "ERROR",
        }
    }

    /// Exact-equality match against a trimmed line.
    #[inline]
    pub fn matches(self, line: &[u8]) -> bool {
        line == self.token()
    }
}

/// Find the first token in `candidates` whose pattern equals `line`.
///
/// Candidates are checked in the order supplied; the first exact match wins.
/// The fixed token patterns never overlap, but the ordered contract keeps
/// lookup deterministic regardless.
pub fn find_match(candidates: &[ResponseType], line: &[u8]) -> Option<ResponseType> {
    candidates.iter().copied().find(|t| t.matches(line))
}
