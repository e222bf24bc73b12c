//! Minimal XML document model
//!
//! Names are kept exactly as written (`prefix:local`) and every text node
//! survives parsing, whitespace-only ones included. Namespace declarations
//! are stored on the element that makes them.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::io::Write;

use indexmap::IndexMap;
use thiserror::Error;
use xml::attribute::Attribute;
use xml::name::Name;
use xml::namespace::{Namespace, NamespaceStack, NS_XMLNS_PREFIX, NS_XML_PREFIX};
use xml::reader::{ParserConfig, XmlEvent};
use xml::writer::XmlEvent as WriteEvent;
use xml::EventWriter;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error(transparent)]
    Xml(#[from] xml::reader::Error),

    #[error("document has no root element")]
    NoRoot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    ProcessingInstruction { name: String, data: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    /// Qualified name, `prefix:local` or `local`
    pub name: String,
    /// Namespace declarations made on this element, `""` is the default namespace
    pub namespaces: IndexMap<String, String>,
    /// Attributes by qualified name, in document order
    pub attributes: IndexMap<String, String>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Parse a whole document and return its root element.
    ///
    /// Comments are dropped, CDATA sections become text. Text around a
    /// dropped comment is merged into a single node.
    pub fn parse(source: &[u8]) -> Result<Self, ParseError> {
        let reader = ParserConfig::new()
            .trim_whitespace(false)
            .whitespace_to_characters(true)
            .cdata_to_characters(true)
            .ignore_comments(true)
            .coalesce_characters(true)
            .create_reader(source);

        let base_scope = NamespaceStack::default().squash();
        // Open elements with the namespace scope they were started in
        let mut open: Vec<(Self, Namespace)> = Vec::new();
        let mut root = None;

        for event in reader {
            match event? {
                XmlEvent::StartElement {
                    name,
                    attributes,
                    namespace,
                } => {
                    let parent_scope = open.last().map_or(&base_scope, |(_, scope)| scope);
                    let mut element = Self::new(name.borrow().to_repr());
                    element.namespaces = declared_in(&namespace, parent_scope);
                    element.attributes = attributes
                        .into_iter()
                        .map(|attr| (attr.name.borrow().to_repr(), attr.value))
                        .collect();
                    open.push((element, namespace));
                }
                XmlEvent::EndElement { .. } => {
                    if let Some((element, _)) = open.pop() {
                        match open.last_mut() {
                            Some((parent, _)) => parent.children.push(Node::Element(element)),
                            None => root = Some(element),
                        }
                    }
                }
                XmlEvent::Characters(text) | XmlEvent::Whitespace(text) | XmlEvent::CData(text) => {
                    if let Some((parent, _)) = open.last_mut() {
                        parent.push_text(&text);
                    }
                }
                XmlEvent::ProcessingInstruction { name, data } => {
                    if let Some((parent, _)) = open.last_mut() {
                        parent
                            .children
                            .push(Node::ProcessingInstruction { name, data });
                    }
                }
                _ => {}
            }
        }

        root.ok_or(ParseError::NoRoot)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Direct child elements, skipping text and processing instructions
    pub fn child_elements(&self) -> impl Iterator<Item = &Self> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    /// Append text, merging it into a trailing text node
    pub fn push_text(&mut self, text: &str) {
        if let Some(Node::Text(last)) = self.children.last_mut() {
            last.push_str(text);
        } else {
            self.children.push(Node::Text(text.to_string()));
        }
    }

    /// Declare on this element the namespaces of `scope` it relies on.
    ///
    /// Used when the element is taken out of its document: prefixes bound on
    /// an ancestor would otherwise be unbound in the new one.
    pub fn bind_namespaces(&mut self, scope: &IndexMap<String, String>) {
        let mut used = BTreeSet::new();
        self.collect_prefixes(&mut used);
        let missing: Vec<(&String, &String)> = scope
            .iter()
            .filter(|(prefix, _)| {
                used.contains(prefix.as_str()) && !self.namespaces.contains_key(*prefix)
            })
            .collect();
        for (prefix, uri) in missing {
            self.namespaces.insert(prefix.clone(), uri.clone());
        }
    }

    fn collect_prefixes<'a>(&'a self, used: &mut BTreeSet<&'a str>) {
        used.insert(prefix_of(&self.name));
        for attr in self.attributes.keys() {
            // Unprefixed attributes are in no namespace
            if attr.contains(':') {
                used.insert(prefix_of(attr));
            }
        }
        for child in self.child_elements() {
            child.collect_prefixes(used);
        }
    }

    pub fn write<W: Write>(&self, writer: &mut EventWriter<W>) -> xml::writer::Result<()> {
        let mut namespace = Namespace::empty();
        for (prefix, uri) in &self.namespaces {
            namespace.put(prefix.as_str(), uri.as_str());
        }
        let attributes: Vec<Attribute<'_>> = self
            .attributes
            .iter()
            .map(|(name, value)| Attribute::new(Name::from(name.as_str()), value))
            .collect();

        writer.write(WriteEvent::StartElement {
            name: Name::from(self.name.as_str()),
            attributes: Cow::Owned(attributes),
            namespace: Cow::Owned(namespace),
        })?;
        for child in &self.children {
            match child {
                Node::Element(element) => element.write(writer)?,
                Node::Text(text) => writer.write(WriteEvent::Characters(text))?,
                Node::ProcessingInstruction { name, data } => {
                    writer.write(WriteEvent::processing_instruction(name, data.as_deref()))?;
                }
            }
        }
        writer.write(WriteEvent::end_element())
    }
}

/// Declarations in `scope` that `parent` does not already have
fn declared_in(scope: &Namespace, parent: &Namespace) -> IndexMap<String, String> {
    scope
        .iter()
        .filter(|(prefix, _)| *prefix != NS_XML_PREFIX && *prefix != NS_XMLNS_PREFIX)
        .filter(|(prefix, uri)| parent.get(prefix) != Some(*uri))
        .map(|(prefix, uri)| (prefix.to_string(), uri.to_string()))
        .collect()
}

fn prefix_of(name: &str) -> &str {
    name.split_once(':').map_or("", |(prefix, _)| prefix)
}
