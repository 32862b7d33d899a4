//! Reply-line classification for the memcache ASCII protocol.
//!
//! A memcache client sends a command over a byte stream and reads back one or
//! more CRLF-terminated lines. The reply grammar is ambiguous at the line
//! level: commands share terminal tokens (`NOT_FOUND` ends a delete, a touch,
//! and an incr), incr/decr return a bare decimal, and three error shapes must
//! be told apart from success. This crate resolves that ambiguity with one
//! [`LineClassifier`] per in-flight command: the classifier knows which
//! command family it serves, decides line by line when the reply is complete,
//! and assembles the outcome into a structured [`Reply`].
//!
//! Transport concerns stay outside: socket I/O, connection pooling, command
//! encoding, and retries all belong to the surrounding client. The classifier
//! is pure, synchronous computation over the lines (or buffers) it is handed.
//!
//! # Reply shapes
//!
//! - `STORED` / `NOT_STORED` / `EXISTS` / `NOT_FOUND` - storage commands
//! - `DELETED` / `NOT_FOUND` - delete
//! - `TOUCHED` / `NOT_FOUND` - touch
//! - `OK` - flush_all
//! - `<decimal>` or `NOT_FOUND` - incr/decr
//! - `VALUE <key> <flags> <bytes> [<cas>]` blocks ending in `END` - get/gets
//! - `ERROR`, `CLIENT ERROR <text>`, `SERVER ERROR <text>` - any command
//!
//! # Example
//!
//! ```
//! use memcache_reply::{CommandKind, LineClassifier, Status};
//!
//! let mut classifier = LineClassifier::new(CommandKind::Modify);
//! assert!(classifier.classify(b"12345").unwrap());
//!
//! let reply = classifier.reply().unwrap();
//! assert_eq!(reply.status, Status::Success);
//! assert_eq!(reply.number(), Some(12345));
//! ```
//!
//! Retrieval replies span multiple lines; `classify` returns `false` until
//! the terminating `END`:
//!
//! ```
//! use memcache_reply::{CommandKind, LineClassifier};
//!
//! let mut classifier = LineClassifier::new(CommandKind::Retrieve);
//! assert!(!classifier.classify(b"VALUE greeting 0 5").unwrap());
//! assert!(!classifier.classify(b"hello").unwrap());
//! assert!(classifier.classify(b"END").unwrap());
//!
//! let values = classifier.reply().unwrap().values().unwrap();
//! assert_eq!(values[0].data.as_ref(), b"hello");
//! ```
//!
//! A server-reported error is a well-formed outcome, not a Rust error; a line
//! no family recognizes is a hard [`ClassifyError`]:
//!
//! ```
//! use memcache_reply::{ClassifyError, CommandKind, LineClassifier};
//!
//! let mut classifier = LineClassifier::new(CommandKind::Touch);
//! assert!(classifier.classify(b"SERVER ERROR out of memory").unwrap());
//! assert!(classifier.reply().unwrap().is_error());
//!
//! let mut classifier = LineClassifier::new(CommandKind::Touch);
//! assert_eq!(
//!     classifier.classify(b"wat"),
//!     Err(ClassifyError::UnexpectedFormat)
//! );
//! ```

mod classify;
mod error;
mod reply;
mod retrieve;
mod token;

pub use classify::{CommandKind, LineClassifier};
pub use error::ClassifyError;
pub use reply::{Reply, ReplyData, Status, Value};
pub use token::{find_match, ResponseType};
