//! Owned, immutable XML document model.
//!
//! Documents are parsed once with `quick-xml` into a plain tree. Lookups walk
//! the tree explicitly and edits produce a new [`Document`] rather than
//! mutating the parsed one, so a template read from disk is never changed in
//! place.

use std::borrow::Cow;
use std::fs;
use std::io::Write;
use std::path::Path;

use quick_xml::escape::unescape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::{Result, XmlError};

/// A node in the element tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

/// An XML element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the value of the attribute named `key`.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    /// Returns the first direct child element named `name`.
    pub fn find_child(&self, name: &str) -> Option<&Element> {
        self.child_elements().find(|child| child.name == name)
    }

    /// Returns every direct child element named `name`, in document order.
    pub fn find_children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.child_elements().filter(move |child| child.name == name)
    }

    /// Concatenated text of the direct text children, untrimmed.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Sets `key` to `value`, keeping the attribute's position if it exists.
    #[must_use]
    pub fn with_attribute(mut self, key: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.attributes.iter_mut().find(|(name, _)| name == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key.to_string(), value)),
        }
        self
    }

    /// Removes the attribute named `key` if present.
    #[must_use]
    pub fn without_attribute(mut self, key: &str) -> Self {
        self.attributes.retain(|(name, _)| name != key);
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    #[must_use]
    pub fn with_comment(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Comment(text.into()));
        self
    }

    /// Drops every child node (elements, text and comments).
    #[must_use]
    pub fn without_children(mut self) -> Self {
        self.children.clear();
        self
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Node::Text(last)) = self.children.last_mut() {
            last.push_str(text);
        } else {
            self.children.push(Node::Text(text.to_string()));
        }
    }
}

/// Location of an element as child indices from the root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementPath(Vec<usize>);

impl ElementPath {
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }
}

/// A parsed XML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    root: Element,
}

impl Document {
    pub fn new(root: Element) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Depth-first, document-order search for the first element named `name`,
    /// the root included.
    pub fn find_first(&self, name: &str) -> Option<ElementPath> {
        let mut path = Vec::new();
        find_in(&self.root, name, &mut path).then_some(ElementPath(path))
    }

    /// Returns the element at `path`.
    pub fn element(&self, path: &ElementPath) -> Option<&Element> {
        let mut current = &self.root;
        for &index in &path.0 {
            current = match current.children.get(index)? {
                Node::Element(element) => element,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Builds a new document in which the element at `path` is replaced by
    /// `rewrite(original)`. Returns `None` if `path` does not name an element.
    pub fn replace_element<F>(&self, path: &ElementPath, rewrite: F) -> Option<Document>
    where
        F: FnOnce(Element) -> Element,
    {
        rebuild(&self.root, &path.0, rewrite).map(Document::new)
    }

    /// Serializes with an XML declaration, one level of `indent` per depth,
    /// and a trailing newline.
    pub fn to_pretty_string(&self, indent: u8) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), indent, 1);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        write_element(&mut writer, &self.root)?;
        let mut bytes = writer.into_inner();
        bytes.push(b'\n');
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Writes the pretty-printed document to `path`, creating parent
    /// directories and replacing any existing file.
    pub fn write_pretty(&self, path: &Path, indent: u8) -> Result<()> {
        let rendered = self.to_pretty_string(indent)?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| XmlError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, rendered).map_err(|source| XmlError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn find_in(element: &Element, name: &str, path: &mut Vec<usize>) -> bool {
    if element.name == name {
        return true;
    }
    for (index, child) in element.children.iter().enumerate() {
        if let Node::Element(child) = child {
            path.push(index);
            if find_in(child, name, path) {
                return true;
            }
            path.pop();
        }
    }
    false
}

fn rebuild<F>(element: &Element, path: &[usize], rewrite: F) -> Option<Element>
where
    F: FnOnce(Element) -> Element,
{
    let Some((&index, rest)) = path.split_first() else {
        return Some(rewrite(element.clone()));
    };
    let Node::Element(child) = element.children.get(index)? else {
        return None;
    };
    let replaced = rebuild(child, rest, rewrite)?;
    let mut children = element.children.clone();
    children[index] = Node::Element(replaced);
    Some(Element {
        name: element.name.clone(),
        attributes: element.attributes.clone(),
        children,
    })
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &Element) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }
    writer.write_event(Event::Start(start))?;

    let nested = element
        .children
        .iter()
        .any(|node| !matches!(node, Node::Text(_)));
    if nested {
        // Whitespace-only text between child elements is layout and gets
        // replaced by the writer's own indentation.
        for child in &element.children {
            match child {
                Node::Element(child) => write_element(writer, child)?,
                Node::Comment(text) => {
                    writer.write_event(Event::Comment(BytesText::from_escaped(text.as_str())))?;
                }
                Node::Text(text) => {
                    let trimmed = text.trim();
                    if !trimmed.is_empty() {
                        writer.write_event(Event::Text(BytesText::new(trimmed)))?;
                    }
                }
            }
        }
    } else {
        // Emitting the (possibly empty) text keeps the end tag on the same line.
        writer.write_event(Event::Text(BytesText::new(&element.text())))?;
    }

    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}

/// Parses an XML document from text.
pub fn parse_document(text: &str) -> Result<Document> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut reader = Reader::from_str(text);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                let element = element_from_start(&start)?;
                if stack.is_empty() && root.is_some() {
                    return Err(XmlError::TrailingElement { name: element.name });
                }
                stack.push(element);
            }
            Event::Empty(start) => {
                let element = element_from_start(&start)?;
                close_element(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                if let Some(element) = stack.pop() {
                    close_element(&mut stack, &mut root, element)?;
                }
            }
            Event::Text(text) => {
                if let Some(parent) = stack.last_mut() {
                    let decoded = text.decode().map_err(quick_xml::Error::from)?;
                    parent.push_text(&unescape_text(&decoded)?);
                }
            }
            Event::GeneralRef(reference) => {
                if let Some(parent) = stack.last_mut() {
                    let name = reference.decode().map_err(quick_xml::Error::from)?;
                    parent.push_text(&unescape_text(&format!("&{name};"))?);
                }
            }
            Event::CData(data) => {
                if let Some(parent) = stack.last_mut() {
                    let decoded = data.decode().map_err(quick_xml::Error::from)?;
                    parent.push_text(&decoded);
                }
            }
            Event::Comment(comment) => {
                if let Some(parent) = stack.last_mut() {
                    let decoded = comment.decode().map_err(quick_xml::Error::from)?;
                    parent.children.push(Node::Comment(decoded.into_owned()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(XmlError::Unclosed { name: open.name });
    }
    root.map(Document::new).ok_or(XmlError::NoRoot)
}

/// Reads and parses the XML document at `path`.
pub fn read_document(path: &Path) -> Result<Document> {
    let text = fs::read_to_string(path).map_err(|source| XmlError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document(&text)
}

fn element_from_start(start: &BytesStart<'_>) -> Result<Element> {
    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()));
    for attribute in start.attributes() {
        let attribute = attribute.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let raw = String::from_utf8_lossy(&attribute.value);
        let value = unescape_text(&raw)?;
        element.attributes.push((key, value.into_owned()));
    }
    Ok(element)
}

fn close_element(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None if root.is_some() => {
            return Err(XmlError::TrailingElement { name: element.name });
        }
        None => *root = Some(element),
    }
    Ok(())
}

fn unescape_text(raw: &str) -> Result<Cow<'_, str>> {
    Ok(unescape(raw).map_err(quick_xml::Error::from)?)
}
