//! Line classification and reply assembly.
//!
//! The reply grammar is ambiguous at the line level: different commands share
//! terminal tokens, incr/decr return a bare decimal, and three error shapes
//! must be told apart from success and from each other. A [`LineClassifier`]
//! resolves the ambiguity by knowing which command family it is assembling a
//! reply for: the generic error shapes are checked first for every family,
//! then the family's own success vocabulary.
//!
//! One classifier serves exactly one command invocation. Feed it lines until
//! [`classify`](LineClassifier::classify) returns `true`, then read the
//! [`Reply`]; create a fresh classifier (or [`reset`](LineClassifier::reset))
//! for the next command.

use crate::error::ClassifyError;
use crate::reply::{Reply, ReplyData, Status};
use crate::retrieve::RetrieveState;
use crate::token::{self, ResponseType};

/// Literal prefix of a client error line.
const CLIENT_ERROR_PREFIX: &[u8] = b"CLIENT ERROR ";
/// Literal prefix of a server error line.
const SERVER_ERROR_PREFIX: &[u8] = b"SERVER ERROR ";

/// The command family a classifier assembles replies for.
///
/// Selects the success vocabulary checked after the generic error shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// set / add / replace / append / prepend / cas
    Store,
    /// get / gets - multi-line VALUE blocks terminated by END
    Retrieve,
    /// delete
    Delete,
    /// incr / decr - decimal counter value or NOT_FOUND
    Modify,
    /// touch
    Touch,
    /// flush_all
    Flush,
}

impl CommandKind {
    /// Closed success vocabulary for the single-line token families.
    fn vocabulary(self) -> &'static [ResponseType] {
        match self {
            CommandKind::Store => &[
                ResponseType::Stored,
                ResponseType::NotStored,
                ResponseType::Exists,
                ResponseType::NotFound,
            ],
            CommandKind::Delete => &[ResponseType::Deleted, ResponseType::NotFound],
            CommandKind::Touch => &[ResponseType::Touched, ResponseType::NotFound],
            CommandKind::Flush => &[ResponseType::Ok],
            // These families do not classify by token lookup.
            CommandKind::Retrieve | CommandKind::Modify => &[],
        }
    }
}

/// Classification state. Every state except `AwaitingLine` is terminal;
/// a response becomes terminal at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    AwaitingLine,
    TerminatedSuccess,
    TerminatedError,
    TerminatedMalformed,
}

impl State {
    #[inline]
    fn is_terminal(self) -> bool {
        !matches!(self, State::AwaitingLine)
    }
}

/// Assembles one reply for one command invocation, line by line.
#[derive(Debug)]
pub struct LineClassifier {
    kind: CommandKind,
    state: State,
    reply: Option<Reply>,
    failure: Option<ClassifyError>,
    retrieve: Option<RetrieveState>,
}

impl LineClassifier {
    /// Create a classifier for one command invocation.
    pub fn new(kind: CommandKind) -> Self {
        LineClassifier {
            kind,
            state: State::AwaitingLine,
            reply: None,
            failure: None,
            retrieve: (kind == CommandKind::Retrieve).then(RetrieveState::new),
        }
    }

    /// The command family this classifier was created for.
    #[inline]
    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    /// True once the reply is terminal (successfully assembled, a
    /// server-reported error, or malformed).
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// The assembled reply. `Some` only after [`classify`](Self::classify)
    /// has returned `true`.
    #[inline]
    pub fn reply(&self) -> Option<&Reply> {
        self.reply.as_ref()
    }

    /// Consume the classifier and return the assembled reply, if terminal.
    #[inline]
    pub fn into_reply(self) -> Option<Reply> {
        self.reply
    }

    /// Restore the initial state for a new response cycle.
    pub fn reset(&mut self) {
        *self = LineClassifier::new(self.kind);
    }

    /// Classify one reply line.
    ///
    /// The line may carry its trailing CRLF or arrive already stripped.
    /// Returns `Ok(true)` once the reply is terminal, `Ok(false)` when more
    /// lines are expected (only the retrieve family ever returns this), and
    /// `Err` when the line matches no known shape for the active family. An
    /// `Err` is terminal too: the reply grammar for these families leaves no
    /// way to resynchronize, so treating an unrecognized line as "more data
    /// coming" would hang the caller.
    ///
    /// Once terminal, further calls replay the outcome without examining the
    /// line or mutating the reply.
    pub fn classify(&mut self, line: &[u8]) -> Result<bool, ClassifyError> {
        match self.state {
            State::TerminatedSuccess | State::TerminatedError => return Ok(true),
            State::TerminatedMalformed => {
                return Err(self
                    .failure
                    .clone()
                    .unwrap_or(ClassifyError::UnexpectedFormat));
            }
            State::AwaitingLine => {}
        }

        let line = trim_delimiter(line);

        // Generic error shapes outrank any per-family vocabulary.
        if let Some(reply) = classify_generic(line) {
            self.finish(reply);
            return Ok(true);
        }

        match self.kind {
            CommandKind::Modify => self.classify_modify(line),
            CommandKind::Retrieve => self.classify_retrieve(line),
            _ => self.classify_token(line),
        }
    }

    /// Classify lines from an unsplit buffer.
    ///
    /// Scans for CRLF-terminated lines and classifies each in order. Returns
    /// whether the reply became terminal and the number of bytes consumed;
    /// trailing bytes without a delimiter stay unconsumed for the caller to
    /// re-supply once more data arrives.
    pub fn feed(&mut self, buf: &[u8]) -> Result<(bool, usize), ClassifyError> {
        let mut consumed = 0;
        while let Some(end) = find_crlf(&buf[consumed..]) {
            let line = &buf[consumed..consumed + end];
            consumed += end + 2;
            if self.classify(line)? {
                return Ok((true, consumed));
            }
        }
        Ok((false, consumed))
    }

    fn classify_modify(&mut self, line: &[u8]) -> Result<bool, ClassifyError> {
        if let Some(value) = parse_decimal(line) {
            self.finish(Reply::success(Some(ReplyData::Number(value))));
            return Ok(true);
        }
        if ResponseType::NotFound.matches(line) {
            self.finish(Reply::success(None));
            return Ok(true);
        }
        tracing::error!(
            line = %String::from_utf8_lossy(line),
            "unexpected line in counter reply"
        );
        self.fail(ClassifyError::UnexpectedFormat)
    }

    fn classify_token(&mut self, line: &[u8]) -> Result<bool, ClassifyError> {
        match token::find_match(self.kind.vocabulary(), line) {
            Some(t) => {
                self.finish(Reply::success(Some(ReplyData::Token(t))));
                Ok(true)
            }
            None => {
                tracing::error!(
                    kind = ?self.kind,
                    line = %String::from_utf8_lossy(line),
                    "unexpected line in status reply"
                );
                self.fail(ClassifyError::UnexpectedFormat)
            }
        }
    }

    fn classify_retrieve(&mut self, line: &[u8]) -> Result<bool, ClassifyError> {
        let step = match self.retrieve.as_mut() {
            Some(state) => state.push_line(line),
            // Unreachable by construction: the retrieve state exists for the
            // lifetime of a Retrieve classifier.
            None => Err(ClassifyError::Protocol("retrieve state missing")),
        };
        match step {
            Ok(Some(values)) => {
                self.finish(Reply::success(Some(ReplyData::Values(values))));
                Ok(true)
            }
            Ok(None) => Ok(false),
            Err(err) => {
                tracing::error!(
                    line = %String::from_utf8_lossy(line),
                    error = %err,
                    "malformed line in retrieval reply"
                );
                self.fail(err)
            }
        }
    }

    fn finish(&mut self, reply: Reply) {
        self.state = match reply.status {
            Status::Success => State::TerminatedSuccess,
            Status::Error => State::TerminatedError,
        };
        self.reply = Some(reply);
    }

    fn fail(&mut self, err: ClassifyError) -> Result<bool, ClassifyError> {
        self.state = State::TerminatedMalformed;
        self.failure = Some(err.clone());
        Err(err)
    }
}

/// Recognize the three generic error shapes shared by every command family.
///
/// A bare `ERROR` line carries the symbolic name; `CLIENT ERROR` and
/// `SERVER ERROR` lines carry their verbatim text.
fn classify_generic(line: &[u8]) -> Option<Reply> {
    if ResponseType::Error.matches(line) {
        return Some(Reply::error(ResponseType::Error.name().to_string()));
    }
    if line.starts_with(CLIENT_ERROR_PREFIX) || line.starts_with(SERVER_ERROR_PREFIX) {
        return Some(Reply::error(String::from_utf8_lossy(line).into_owned()));
    }
    None
}

/// Strip one full trailing CRLF if the transport left it attached.
///
/// Never strips a bare `\r` or `\n`: in a retrieval payload chunk those are
/// data bytes.
#[inline]
fn trim_delimiter(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r\n").unwrap_or(line)
}

/// Parse a non-negative base-10 integer; the whole line must be digits.
fn parse_decimal(line: &[u8]) -> Option<u64> {
    if line.is_empty() || !line.iter().all(|b| b.is_ascii_digit()) {
        return None;
    }
    std::str::from_utf8(line).ok()?.parse().ok()
}

/// Find `\r\n` in `data`, returning the position of the `\r`.
///
/// Skips bare `\r` bytes not followed by `\n` (payload data may contain
/// them).
fn find_crlf(data: &[u8]) -> Option<usize> {
    memchr::memchr_iter(b'\r', data).find(|&pos| data.get(pos + 1) == Some(&b'\n'))
}
