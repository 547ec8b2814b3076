//! Thin writer over quick-xml used by every renderer and hook.

use crate::types::{Result, SyndicationError};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

pub struct XmlSink {
    writer: Writer<Vec<u8>>,
}

impl XmlSink {
    pub fn new() -> Self {
        Self {
            writer: Writer::new_with_indent(Vec::new(), b' ', 2),
        }
    }

    fn write(&mut self, event: Event<'_>) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(|e| SyndicationError::Xml(e.to_string()))
    }

    pub fn declaration(&mut self, charset: &str) -> Result<()> {
        self.write(Event::Decl(BytesDecl::new("1.0", Some(charset), None)))
    }

    pub fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let attrs: Vec<(&str, String)> = attrs.iter().map(|(k, v)| (*k, xml_safe(v))).collect();
        let elem = BytesStart::new(name).with_attributes(attrs.iter().map(|(k, v)| (*k, v.as_str())));
        self.write(Event::Start(elem))
    }

    pub fn end(&mut self, name: &str) -> Result<()> {
        self.write(Event::End(BytesEnd::new(name)))
    }

    pub fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let attrs: Vec<(&str, String)> = attrs.iter().map(|(k, v)| (*k, xml_safe(v))).collect();
        let elem = BytesStart::new(name).with_attributes(attrs.iter().map(|(k, v)| (*k, v.as_str())));
        self.write(Event::Empty(elem))
    }

    /// Escaped character data inside the currently open element.
    pub fn write_text(&mut self, value: &str) -> Result<()> {
        let value = xml_safe(value);
        self.write(Event::Text(BytesText::new(&value)))
    }

    /// Unescaped content inside the currently open element. A literal `]]>`
    /// is split across two sections.
    pub fn write_cdata(&mut self, value: &str) -> Result<()> {
        let value = xml_safe(value);
        for section in cdata_sections(&value) {
            self.write(Event::CData(BytesCData::new(section)))?;
        }
        Ok(())
    }

    /// `<name>value</name>` with the value escaped.
    pub fn text(&mut self, name: &str, value: &str) -> Result<()> {
        self.text_with(name, &[], value)
    }

    pub fn text_with(&mut self, name: &str, attrs: &[(&str, &str)], value: &str) -> Result<()> {
        self.start(name, attrs)?;
        self.write_text(value)?;
        self.end(name)
    }

    /// `<name><![CDATA[value]]></name>`
    pub fn cdata(&mut self, name: &str, value: &str) -> Result<()> {
        self.start(name, &[])?;
        self.write_cdata(value)?;
        self.end(name)
    }

    pub fn finish(self) -> Result<String> {
        String::from_utf8(self.writer.into_inner()).map_err(|e| SyndicationError::Xml(e.to_string()))
    }
}

impl Default for XmlSink {
    fn default() -> Self {
        Self::new()
    }
}

fn cdata_sections(value: &str) -> Vec<&str> {
    let mut sections = Vec::new();
    let mut rest = value;
    while let Some(pos) = rest.find("]]>") {
        sections.push(&rest[..pos + 2]);
        rest = &rest[pos + 2..];
    }
    sections.push(rest);
    sections
}

/// Drops characters XML 1.0 does not allow anywhere in a document.
fn xml_safe(value: &str) -> String {
    value
        .chars()
        .filter(|c| {
            matches!(
                *c,
                '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
            )
        })
        .collect()
}
