//! pain.008.001.02 document emission
//!
//! - [`sink`] - element-level XML sink ([`XmlSink`]) and its quick-xml implementation
//! - [`writer`] - the streaming [`DocumentWriter`] state machine
//! - [`naming`] - message ids, batch ids and filenames

pub mod naming;
pub mod sink;
pub mod writer;

pub use sink::{QuickXmlSink, XmlSink};
pub use writer::{
    ClosedDocument, DocumentWriter, WriteOutcome, WriterState, DEFAULT_FLUSH_EVERY,
    PAIN_008_NAMESPACE,
};
