//! Owned XML tree for FB2 sources.
//!
//! FB2 books are small enough to hold in memory, and the builder needs
//! random access (a section's title, its first paragraph) before it walks
//! the content, so the event stream is collected into a tree first.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{Error, Result};

/// Namespace of FictionBook 2 documents.
pub const FB2_NAMESPACE: &str = "http://www.gribuser.ru/xml/fictionbook/2.0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Local name, prefix stripped.
    pub name: String,
    /// True if the element's namespace is [`FB2_NAMESPACE`].
    pub fb2: bool,
    pub children: Vec<Node>,
}

impl Element {
    /// True if this is the FB2 element `name`.
    pub fn is(&self, name: &str) -> bool {
        self.fb2 && self.name == name
    }

    /// Child elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.elements().filter(move |element| element.is(name))
    }

    /// First child FB2 element called `name`.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|element| element.is(name))
    }

    /// First FB2 element called `name` below this one, in document order.
    pub fn descendant(&self, name: &str) -> Option<&Element> {
        self.elements().find_map(|element| {
            if element.is(name) {
                Some(element)
            } else {
                element.descendant(name)
            }
        })
    }

    /// All descendant text concatenated.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Element(element) => element.collect_text(out),
            }
        }
    }
}

/// Parse a complete XML document into its root element.
///
/// Adjacent text, character data and entity references are merged into one
/// text node. Whitespace-only text containing a line break is layout
/// between elements and is dropped; other whitespace is kept.
pub fn parse(xml: &str) -> Result<Element> {
    let mut reader = Reader::from_str(xml);
    let mut builder = TreeBuilder::default();

    loop {
        match reader.read_event()? {
            Event::Start(e) => builder.open(&e)?,
            Event::Empty(e) => {
                builder.open(&e)?;
                builder.close()?;
            }
            Event::End(_) => builder.close()?,
            Event::Text(e) => builder.text(&String::from_utf8_lossy(e.as_ref())),
            Event::CData(e) => builder.text(&String::from_utf8_lossy(&e)),
            Event::GeneralRef(e) => {
                let entity = String::from_utf8_lossy(e.as_ref());
                let resolved = resolve_entity(&entity)
                    .ok_or_else(|| Error::Format(format!("unknown entity &{entity};")))?;
                builder.text(&resolved);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    builder.finish()
}

#[derive(Default)]
struct TreeBuilder {
    /// Open elements with the number of namespace bindings each declared.
    stack: Vec<(Element, usize)>,
    /// In-scope `(prefix, uri)` bindings; the default namespace has prefix "".
    namespaces: Vec<(String, String)>,
    root: Option<Element>,
}

impl TreeBuilder {
    fn open(&mut self, start: &BytesStart<'_>) -> Result<()> {
        if self.stack.is_empty() && self.root.is_some() {
            return Err(Error::Format("content after the root element".into()));
        }

        let mut declared = 0;
        for attr in start.attributes().flatten() {
            let key = attr.key.as_ref();
            let prefix = if key == b"xmlns" {
                Some(&[][..])
            } else {
                key.strip_prefix(b"xmlns:")
            };
            if let Some(prefix) = prefix {
                self.namespaces.push((
                    String::from_utf8_lossy(prefix).into_owned(),
                    String::from_utf8_lossy(&attr.value).into_owned(),
                ));
                declared += 1;
            }
        }

        let qname = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let (prefix, local) = match qname.split_once(':') {
            Some((prefix, local)) => (prefix, local),
            None => ("", qname.as_str()),
        };
        let uri = self
            .namespaces
            .iter()
            .rev()
            .find(|(bound, _)| bound == prefix)
            .map(|(_, uri)| uri.as_str());
        if uri.is_none() && !prefix.is_empty() {
            return Err(Error::Format(format!("unbound namespace prefix in <{qname}>")));
        }

        let element = Element {
            name: local.to_string(),
            fb2: uri == Some(FB2_NAMESPACE),
            children: Vec::new(),
        };
        self.stack.push((element, declared));
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let (mut element, declared) = self
            .stack
            .pop()
            .ok_or_else(|| Error::Format("closing tag without an open element".into()))?;
        self.namespaces.truncate(self.namespaces.len() - declared);

        element.children.retain(|node| match node {
            Node::Text(text) => !(text.contains('\n') && text.trim().is_empty()),
            Node::Element(_) => true,
        });

        match self.stack.last_mut() {
            Some((parent, _)) => parent.children.push(Node::Element(element)),
            None => self.root = Some(element),
        }
        Ok(())
    }

    fn text(&mut self, text: &str) {
        // text outside the root is prolog or epilog whitespace
        let Some((element, _)) = self.stack.last_mut() else {
            return;
        };
        match element.children.last_mut() {
            Some(Node::Text(existing)) => existing.push_str(text),
            _ => element.children.push(Node::Text(text.to_string())),
        }
    }

    fn finish(self) -> Result<Element> {
        if let Some((open, _)) = self.stack.last() {
            return Err(Error::Format(format!(
                "document ends inside <{}>",
                open.name
            )));
        }
        self.root
            .ok_or_else(|| Error::Format("document has no root element".into()))
    }
}

/// Resolve XML entity references.
fn resolve_entity(entity: &str) -> Option<String> {
    match entity {
        "apos" => return Some("'".to_string()),
        "quot" => return Some("\"".to_string()),
        "lt" => return Some("<".to_string()),
        "gt" => return Some(">".to_string()),
        "amp" => return Some("&".to_string()),
        _ => {}
    }

    let code = if let Some(hex) = entity.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        entity.strip_prefix('#')?.parse::<u32>().ok()?
    };
    char::from_u32(code).map(|c| c.to_string())
}
