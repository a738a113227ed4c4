use std::borrow::Cow;

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::{Reader, Writer};

use crate::errors::ExtractError;

// @module: Owned XML tree, parsed namespace-unaware and non-validating

/// One node of the parsed tree.
///
/// `Raw` carries markup re-emitted verbatim (declaration, doctype, comments,
/// processing instructions); `Text` is unescaped character data and is
/// re-escaped on serialisation. CDATA sections are folded into `Text`,
/// which serialises to an equivalent escaped form.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    Raw(String),
}

/// An element with its attributes in document order
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Value of the first attribute with the given name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Replace the value of an existing attribute, or append it
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(slot) = self.attributes.iter_mut().find(|(k, _)| k == name) {
            slot.1 = value;
        } else {
            self.attributes.push((name.to_string(), value));
        }
    }

    /// Concatenation of all descendant text, in document order
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(t) => out.push_str(t),
                Node::Element(e) => e.collect_text(out),
                Node::Raw(_) => {}
            }
        }
    }

    /// Replace all children with a single text node
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children = vec![Node::Text(text.into())];
    }

    fn write_to(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attributes {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape_str(value));
            out.push('"');
        }
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            match child {
                Node::Element(e) => e.write_to(out),
                Node::Text(t) => out.push_str(&escape_str(t)),
                Node::Raw(r) => out.push_str(r),
            }
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

/// A parsed XML document: prolog nodes, one root element, trailing nodes
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub prolog: Vec<Node>,
    pub root: Element,
    pub epilog: Vec<Node>,
}

impl Document {
    /// Parse an XML payload into an owned tree.
    ///
    /// Parsing is namespace-unaware and non-validating; external DTDs are
    /// never loaded. Any well-formedness violation is fatal to the document.
    pub fn parse(xml: &str) -> Result<Document, ExtractError> {
        let mut reader = Reader::from_str(xml);

        let mut prolog: Vec<Node> = Vec::new();
        let mut root: Option<Element> = None;
        let mut epilog: Vec<Node> = Vec::new();
        let mut stack: Vec<Element> = Vec::new();

        loop {
            let event = reader
                .read_event()
                .map_err(|e| ExtractError::ParseError(e.to_string()))?;
            match event {
                Event::Start(start) => {
                    let element = element_from_start(&start)?;
                    stack.push(element);
                }
                Event::Empty(start) => {
                    let element = element_from_start(&start)?;
                    place_node(Node::Element(element), &mut stack, &mut prolog, &mut root, &mut epilog);
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| ExtractError::ParseError("unexpected closing tag".into()))?;
                    place_node(Node::Element(element), &mut stack, &mut prolog, &mut root, &mut epilog);
                }
                Event::Text(text) => {
                    let value = text
                        .unescape()
                        .map_err(|e| ExtractError::ParseError(e.to_string()))?;
                    push_text(value, &mut stack, root.is_some(), &mut prolog, &mut epilog);
                }
                Event::CData(cdata) => {
                    let value = String::from_utf8_lossy(&cdata.into_inner()).into_owned();
                    push_text(Cow::Owned(value), &mut stack, root.is_some(), &mut prolog, &mut epilog);
                }
                Event::Eof => break,
                // Declaration, doctype, comments, and processing
                // instructions are carried through verbatim
                other => {
                    let raw = raw_markup(other)?;
                    place_node(Node::Raw(raw), &mut stack, &mut prolog, &mut root, &mut epilog);
                }
            }
        }

        if !stack.is_empty() {
            return Err(ExtractError::ParseError("unclosed element at end of input".into()));
        }
        let root = root.ok_or_else(|| ExtractError::ParseError("no root element".into()))?;

        Ok(Document { prolog, root, epilog })
    }

    /// Serialise the tree back to XML text
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        for node in &self.prolog {
            write_outer_node(node, &mut out);
        }
        self.root.write_to(&mut out);
        for node in &self.epilog {
            write_outer_node(node, &mut out);
        }
        out
    }
}

fn write_outer_node(node: &Node, out: &mut String) {
    match node {
        Node::Raw(r) => {
            out.push_str(r);
            out.push('\n');
        }
        Node::Text(t) => out.push_str(&escape_str(t)),
        // Only one root element exists; stray elements cannot appear here
        Node::Element(e) => e.write_to(out),
    }
}

fn element_from_start(start: &quick_xml::events::BytesStart<'_>) -> Result<Element, ExtractError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut element = Element::new(name);
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| ExtractError::ParseError(e.to_string()))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|e| ExtractError::ParseError(e.to_string()))?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn place_node(
    node: Node,
    stack: &mut [Element],
    prolog: &mut Vec<Node>,
    root: &mut Option<Element>,
    epilog: &mut Vec<Node>,
) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
        return;
    }
    match node {
        Node::Element(e) => {
            if root.is_none() {
                *root = Some(e);
            } else {
                epilog.push(Node::Element(e));
            }
        }
        other => {
            if root.is_none() {
                prolog.push(other);
            } else {
                epilog.push(other);
            }
        }
    }
}

fn push_text(
    value: Cow<'_, str>,
    stack: &mut [Element],
    root_seen: bool,
    prolog: &mut Vec<Node>,
    epilog: &mut Vec<Node>,
) {
    if let Some(parent) = stack.last_mut() {
        // Merge adjacent text (e.g. text + CDATA) into one node
        if let Some(Node::Text(existing)) = parent.children.last_mut() {
            existing.push_str(&value);
        } else {
            parent.children.push(Node::Text(value.into_owned()));
        }
    } else if value.trim().is_empty() {
        // Inter-markup whitespace outside the root is not significant
    } else if root_seen {
        epilog.push(Node::Text(value.into_owned()));
    } else {
        prolog.push(Node::Text(value.into_owned()));
    }
}

/// Re-serialise a non-tree event exactly as quick-xml would write it
fn raw_markup(event: Event<'_>) -> Result<String, ExtractError> {
    let mut writer = Writer::new(Vec::new());
    writer
        .write_event(event)
        .map_err(|e| ExtractError::ParseError(e.to_string()))?;
    String::from_utf8(writer.into_inner())
        .map_err(|e| ExtractError::ParseError(e.to_string()))
}

fn escape_str(value: &str) -> Cow<'_, str> {
    escape(value)
}
