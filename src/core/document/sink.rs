//! Structured XML sink
//!
//! The document writer emits elements through [`XmlSink`] and never touches
//! the encoder directly. [`QuickXmlSink`] is the quick-xml backed
//! implementation: it buffers events in memory until the writer drains them.
//!
//! A sink can mark a checkpoint and roll back to it, discarding a partly
//! emitted block together with the elements it left open.

use crate::domain::{Result, SddError};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

/// Element-level XML emission
pub trait XmlSink: Send {
    /// Writes the XML declaration
    fn declaration(&mut self) -> Result<()>;

    /// Opens an element
    fn start_element(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<()>;

    /// Closes the most recently opened element
    fn end_element(&mut self) -> Result<()>;

    /// Writes `<name attrs>text</name>`
    fn text_element(&mut self, name: &str, attributes: &[(&str, &str)], text: &str) -> Result<()>;

    /// Number of currently open elements
    fn depth(&self) -> usize;

    /// Removes and returns everything emitted since the last call
    fn take_buffer(&mut self) -> Vec<u8>;

    /// Marks the current position, replacing any earlier mark
    fn checkpoint(&mut self);

    /// Discards everything emitted since the last checkpoint and reopens
    /// exactly the elements that were open at that point
    ///
    /// # Errors
    ///
    /// Returns an error if there is no checkpoint or the buffer was drained
    /// after it was taken.
    fn rollback(&mut self) -> Result<()>;
}

/// Position a [`QuickXmlSink`] can roll back to
struct Mark {
    len: usize,
    depth: usize,
    /// Encoder with an empty buffer, kept for its indentation state
    encoder: Writer<Vec<u8>>,
}

/// quick-xml sink with 4-space indentation
pub struct QuickXmlSink {
    writer: Writer<Vec<u8>>,
    open: Vec<String>,
    mark: Option<Mark>,
}

impl Default for QuickXmlSink {
    fn default() -> Self {
        Self::new()
    }
}

impl QuickXmlSink {
    pub fn new() -> Self {
        Self {
            writer: Writer::new_with_indent(Vec::new(), b' ', 4),
            open: Vec::new(),
            mark: None,
        }
    }
}

impl XmlSink for QuickXmlSink {
    fn declaration(&mut self) -> Result<()> {
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml)
    }

    fn start_element(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<()> {
        let start = BytesStart::new(name).with_attributes(attributes.iter().copied());
        self.writer.write_event(Event::Start(start)).map_err(xml)?;
        self.open.push(name.to_string());
        Ok(())
    }

    fn end_element(&mut self) -> Result<()> {
        let name = self
            .open
            .pop()
            .ok_or_else(|| SddError::Xml("no open element to close".to_string()))?;
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml)
    }

    fn text_element(&mut self, name: &str, attributes: &[(&str, &str)], text: &str) -> Result<()> {
        let start = BytesStart::new(name).with_attributes(attributes.iter().copied());
        self.writer.write_event(Event::Start(start)).map_err(xml)?;
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(xml)?;
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml)
    }

    fn depth(&self) -> usize {
        self.open.len()
    }

    fn take_buffer(&mut self) -> Vec<u8> {
        self.mark = None;
        std::mem::take(self.writer.get_mut())
    }

    fn checkpoint(&mut self) {
        let buffer = std::mem::take(self.writer.get_mut());
        let encoder = self.writer.clone();
        *self.writer.get_mut() = buffer;

        self.mark = Some(Mark {
            len: self.writer.get_ref().len(),
            depth: self.open.len(),
            encoder,
        });
    }

    fn rollback(&mut self) -> Result<()> {
        let mark = self
            .mark
            .take()
            .ok_or_else(|| SddError::Xml("no checkpoint to roll back to".to_string()))?;

        let mut buffer = std::mem::take(self.writer.get_mut());
        buffer.truncate(mark.len);
        self.writer = mark.encoder;
        *self.writer.get_mut() = buffer;
        self.open.truncate(mark.depth);
        Ok(())
    }
}

fn xml<E: std::fmt::Display>(e: E) -> SddError {
    SddError::Xml(e.to_string())
}

/// Fails whenever `element` is written with `text`
#[cfg(test)]
pub(crate) struct FailingSink {
    inner: QuickXmlSink,
    element: &'static str,
    text: &'static str,
}

#[cfg(test)]
impl FailingSink {
    pub(crate) fn new(element: &'static str, text: &'static str) -> Self {
        Self {
            inner: QuickXmlSink::new(),
            element,
            text,
        }
    }
}

#[cfg(test)]
impl XmlSink for FailingSink {
    fn declaration(&mut self) -> Result<()> {
        self.inner.declaration()
    }

    fn start_element(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<()> {
        self.inner.start_element(name, attributes)
    }

    fn end_element(&mut self) -> Result<()> {
        self.inner.end_element()
    }

    fn text_element(&mut self, name: &str, attributes: &[(&str, &str)], text: &str) -> Result<()> {
        if name == self.element && text == self.text {
            return Err(SddError::Xml("encoder fault".to_string()));
        }
        self.inner.text_element(name, attributes, text)
    }

    fn depth(&self) -> usize {
        self.inner.depth()
    }

    fn take_buffer(&mut self) -> Vec<u8> {
        self.inner.take_buffer()
    }

    fn checkpoint(&mut self) {
        self.inner.checkpoint()
    }

    fn rollback(&mut self) -> Result<()> {
        self.inner.rollback()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(sink: &mut QuickXmlSink) -> String {
        String::from_utf8(sink.take_buffer()).unwrap()
    }

    #[test]
    fn test_nested_elements_are_indented() {
        let mut sink = QuickXmlSink::new();
        sink.start_element("Outer", &[]).unwrap();
        sink.text_element("Inner", &[], "value").unwrap();
        sink.end_element().unwrap();

        assert_eq!(render(&mut sink), "<Outer>\n    <Inner>value</Inner>\n</Outer>");
    }

    #[test]
    fn test_text_is_escaped_and_attributes_written() {
        let mut sink = QuickXmlSink::new();
        sink.text_element("InstdAmt", &[("Ccy", "EUR")], "A & B <C>").unwrap();

        assert_eq!(
            render(&mut sink),
            "<InstdAmt Ccy=\"EUR\">A &amp; B &lt;C&gt;</InstdAmt>"
        );
    }

    #[test]
    fn test_take_buffer_drains_without_losing_nesting() {
        let mut sink = QuickXmlSink::new();
        sink.start_element("A", &[]).unwrap();
        let first = render(&mut sink);
        sink.start_element("B", &[]).unwrap();
        sink.end_element().unwrap();
        sink.end_element().unwrap();
        let second = render(&mut sink);

        assert_eq!(first, "<A>");
        assert_eq!(second, "\n    <B>\n    </B>\n</A>");
        assert_eq!(sink.depth(), 0);
    }

    #[test]
    fn test_rollback_discards_partial_block() {
        let mut sink = QuickXmlSink::new();
        sink.start_element("PmtInf", &[]).unwrap();
        sink.text_element("PmtInfId", &[], "B-1").unwrap();

        sink.checkpoint();
        sink.start_element("DrctDbtTxInf", &[]).unwrap();
        sink.start_element("PmtId", &[]).unwrap();
        sink.text_element("EndToEndId", &[], "E2E-2").unwrap();
        sink.rollback().unwrap();

        assert_eq!(sink.depth(), 1);
        sink.start_element("DrctDbtTxInf", &[]).unwrap();
        sink.end_element().unwrap();
        sink.end_element().unwrap();

        assert_eq!(
            render(&mut sink),
            "<PmtInf>\n    <PmtInfId>B-1</PmtInfId>\n    <DrctDbtTxInf>\n    </DrctDbtTxInf>\n</PmtInf>"
        );
    }

    #[test]
    fn test_rollback_needs_checkpoint() {
        let mut sink = QuickXmlSink::new();
        sink.checkpoint();
        sink.start_element("A", &[]).unwrap();
        sink.take_buffer();
        assert!(matches!(sink.rollback(), Err(SddError::Xml(_))));
    }

    #[test]
    fn test_end_without_start_is_error() {
        let mut sink = QuickXmlSink::new();
        assert!(matches!(sink.end_element(), Err(SddError::Xml(_))));
    }
}
