use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use thiserror::Error;

/// Errors that can occur while writing XML.
#[derive(Debug, Error)]
pub enum XmlWriteError {
    #[error("Failed to write XML: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML writer error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// An attribute or namespace declaration was written outside a start tag.
    #[error("No start tag is open for attribute '{0}'")]
    NoOpenStartTag(String),

    #[error("No open element to close")]
    NoOpenElement,

    /// The same prefix was declared twice on one element with different URIs.
    #[error("Prefix '{prefix}' is already bound to '{existing}' on this element")]
    PrefixConflict { prefix: String, existing: String },

    #[error("Element <{0}> was never closed")]
    Unclosed(String),

    #[error("Generated XML contains invalid UTF-8")]
    InvalidUtf8,
}

struct Frame {
    name: String,
    /// Bindings declared on this element, default namespace under "".
    bindings: Vec<(String, String)>,
}

/// Streaming XML sink used by extensions to serialize themselves.
///
/// A start tag is held back until content, a child element or the end tag is
/// written, so attributes and namespace declarations can still be attached.
/// Prefixes that are not yet bound in scope are declared automatically.
pub struct XmlWriter {
    inner: Writer<Vec<u8>>,
    pending: Option<BytesStart<'static>>,
    stack: Vec<Frame>,
}

impl Default for XmlWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for XmlWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XmlWriter")
            .field("depth", &self.stack.len())
            .field("pending", &self.pending.is_some())
            .finish()
    }
}

impl XmlWriter {
    /// Writer producing output indented by two spaces.
    pub fn new() -> Self {
        Self {
            inner: Writer::new_with_indent(Vec::new(), b' ', 2),
            pending: None,
            stack: Vec::new(),
        }
    }

    /// Writer producing output without any added whitespace.
    pub fn compact() -> Self {
        Self {
            inner: Writer::new(Vec::new()),
            pending: None,
            stack: Vec::new(),
        }
    }

    pub fn write_declaration(&mut self) -> Result<(), XmlWriteError> {
        self.inner
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        Ok(())
    }

    /// Opens an element, declaring `prefix` → `namespace` if it is not bound in scope.
    pub fn start_element(
        &mut self,
        prefix: Option<&str>,
        local_name: &str,
        namespace: Option<&str>,
    ) -> Result<(), XmlWriteError> {
        self.flush_pending()?;
        let name = qualify(prefix, local_name);
        self.pending = Some(BytesStart::new(name.clone()));
        self.stack.push(Frame {
            name,
            bindings: Vec::new(),
        });
        if let Some(namespace) = namespace {
            self.namespace_declaration(prefix.unwrap_or(""), namespace)?;
        }
        Ok(())
    }

    /// Adds an unqualified attribute to the open start tag.
    pub fn attribute(&mut self, name: &str, value: &str) -> Result<(), XmlWriteError> {
        let start = self
            .pending
            .as_mut()
            .ok_or_else(|| XmlWriteError::NoOpenStartTag(name.to_string()))?;
        start.push_attribute((name, value));
        Ok(())
    }

    /// Adds a namespace-qualified attribute to the open start tag.
    pub fn attribute_ns(
        &mut self,
        prefix: &str,
        local_name: &str,
        namespace: &str,
        value: &str,
    ) -> Result<(), XmlWriteError> {
        let name = qualify(Some(prefix), local_name);
        if self.pending.is_none() {
            return Err(XmlWriteError::NoOpenStartTag(name));
        }
        self.namespace_declaration(prefix, namespace)?;
        self.attribute(&name, value)
    }

    /// Declares `prefix` (or the default namespace for "") on the open start tag.
    ///
    /// Returns `false` when the binding was already in scope and nothing was written.
    pub fn namespace_declaration(
        &mut self,
        prefix: &str,
        namespace: &str,
    ) -> Result<bool, XmlWriteError> {
        let attr_name = if prefix.is_empty() {
            "xmlns".to_string()
        } else {
            format!("xmlns:{}", prefix)
        };
        if self.pending.is_none() {
            return Err(XmlWriteError::NoOpenStartTag(attr_name));
        }
        if self.lookup(prefix) == Some(namespace) {
            return Ok(false);
        }

        let frame = self.stack.last_mut().ok_or(XmlWriteError::NoOpenElement)?;
        if let Some((_, existing)) = frame.bindings.iter().find(|(p, _)| p == prefix) {
            return Err(XmlWriteError::PrefixConflict {
                prefix: prefix.to_string(),
                existing: existing.clone(),
            });
        }
        frame
            .bindings
            .push((prefix.to_string(), namespace.to_string()));
        self.attribute(&attr_name, namespace)?;
        Ok(true)
    }

    /// Namespace currently bound to `prefix`, innermost declaration first.
    pub fn lookup(&self, prefix: &str) -> Option<&str> {
        self.stack.iter().rev().find_map(|frame| {
            frame
                .bindings
                .iter()
                .find(|(p, _)| p == prefix)
                .map(|(_, uri)| uri.as_str())
        })
    }

    /// Writes escaped character data.
    pub fn text(&mut self, value: &str) -> Result<(), XmlWriteError> {
        self.flush_pending()?;
        self.inner.write_event(Event::Text(BytesText::new(value)))?;
        Ok(())
    }

    /// Writes `value` as CDATA, splitting around any embedded `]]>`.
    pub fn cdata(&mut self, value: &str) -> Result<(), XmlWriteError> {
        self.flush_pending()?;
        let mut rest = value;
        while let Some(pos) = rest.find("]]>") {
            // Keep "]]" in this section and start the next one at ">".
            let (head, tail) = rest.split_at(pos + 2);
            self.inner.write_event(Event::CData(BytesCData::new(head)))?;
            rest = tail;
        }
        self.inner.write_event(Event::CData(BytesCData::new(rest)))?;
        Ok(())
    }

    /// Writes `<prefix:local>value</prefix:local>`.
    pub fn element_text(
        &mut self,
        prefix: Option<&str>,
        local_name: &str,
        namespace: Option<&str>,
        value: &str,
    ) -> Result<(), XmlWriteError> {
        self.start_element(prefix, local_name, namespace)?;
        self.text(value)?;
        self.end_element()
    }

    /// Closes the innermost open element, as an empty element if it has no content.
    pub fn end_element(&mut self) -> Result<(), XmlWriteError> {
        let frame = self.stack.pop().ok_or(XmlWriteError::NoOpenElement)?;
        match self.pending.take() {
            Some(start) => self.inner.write_event(Event::Empty(start))?,
            None => self.inner.write_event(Event::End(BytesEnd::new(frame.name)))?,
        }
        Ok(())
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Consumes the writer and returns the produced document.
    pub fn finish(self) -> Result<String, XmlWriteError> {
        if let Some(frame) = self.stack.last() {
            return Err(XmlWriteError::Unclosed(frame.name.clone()));
        }
        String::from_utf8(self.inner.into_inner()).map_err(|_| XmlWriteError::InvalidUtf8)
    }

    fn flush_pending(&mut self) -> Result<(), XmlWriteError> {
        if let Some(start) = self.pending.take() {
            self.inner.write_event(Event::Start(start))?;
        }
        Ok(())
    }
}

fn qualify(prefix: Option<&str>, local_name: &str) -> String {
    match prefix {
        Some(prefix) if !prefix.is_empty() => format!("{}:{}", prefix, local_name),
        _ => local_name.to_string(),
    }
}
