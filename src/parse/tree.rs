use quick_xml::Reader;
use quick_xml::events::Event;

use crate::core::ImportError;

/// One parsed XML element: name as written (prefix kept), concatenated
/// text content, and child elements in document order.
///
/// Invoice documents are small (hundreds of lines at most), so the parser
/// materializes the whole tree and lets the field tables probe it with
/// path candidates instead of threading per-field state through a
/// streaming event loop.
#[derive(Debug, Clone, Default)]
pub(crate) struct Element {
    pub name: String,
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    fn new(name: String) -> Self {
        Self {
            name,
            text: String::new(),
            children: Vec::new(),
        }
    }

    /// Name without its namespace prefix ("cbc:ID" → "ID").
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    /// Match a path segment against the full or local name.
    fn name_matches(&self, segment: &str) -> bool {
        self.name == segment || self.local_name() == segment
    }

    /// First element matching `path`, or `None`.
    ///
    /// Paths are slash-separated name chains. The first segment matches at
    /// any depth; later segments match direct children, except after an
    /// empty segment (`//`), which searches any depth again — e.g.
    /// `"cac:AccountingSupplierParty//cbc:RegistrationName"`.
    pub fn find(&self, path: &str) -> Option<&Element> {
        self.find_steps(&parse_steps(path))
    }

    /// All elements matching `path`, in document order.
    pub fn find_all(&self, path: &str) -> Vec<&Element> {
        let mut out = Vec::new();
        self.collect_steps(&parse_steps(path), &mut out);
        out
    }

    /// Trimmed text of the first match, `None` when absent or empty.
    pub fn find_text(&self, path: &str) -> Option<&str> {
        let text = self.find(path)?.text.trim();
        if text.is_empty() { None } else { Some(text) }
    }

    /// Resolve an ordered candidate list: first candidate with a non-empty
    /// text value wins.
    pub fn first_text<'a>(&'a self, candidates: &[&str]) -> Option<&'a str> {
        candidates.iter().find_map(|path| self.find_text(path))
    }

    fn find_steps(&self, steps: &[(bool, &str)]) -> Option<&Element> {
        let Some(&(any_depth, name)) = steps.first() else {
            return Some(self);
        };
        let rest = &steps[1..];
        if any_depth {
            for desc in self.descendants() {
                if desc.name_matches(name) {
                    if let Some(found) = desc.find_steps(rest) {
                        return Some(found);
                    }
                }
            }
        } else {
            for child in &self.children {
                if child.name_matches(name) {
                    if let Some(found) = child.find_steps(rest) {
                        return Some(found);
                    }
                }
            }
        }
        None
    }

    fn collect_steps<'a>(&'a self, steps: &[(bool, &str)], out: &mut Vec<&'a Element>) {
        let Some(&(any_depth, name)) = steps.first() else {
            out.push(self);
            return;
        };
        let rest = &steps[1..];
        if any_depth {
            for desc in self.descendants() {
                if desc.name_matches(name) {
                    desc.collect_steps(rest, out);
                }
            }
        } else {
            for child in &self.children {
                if child.name_matches(name) {
                    child.collect_steps(rest, out);
                }
            }
        }
    }

    /// All descendants (excluding self), pre-order.
    fn descendants(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        self.push_descendants(&mut out);
        out
    }

    fn push_descendants<'a>(&'a self, out: &mut Vec<&'a Element>) {
        for child in &self.children {
            out.push(child);
            child.push_descendants(out);
        }
    }
}

fn parse_steps(path: &str) -> Vec<(bool, &str)> {
    let mut steps = Vec::new();
    let mut any_depth = true; // first segment always searches any depth
    for segment in path.split('/') {
        if segment.is_empty() {
            any_depth = true;
            continue;
        }
        steps.push((any_depth, segment));
        any_depth = false;
    }
    steps
}

/// Parse an XML string into a synthetic document node whose single child
/// is the root element. Fails only on malformed XML.
pub(crate) fn parse_document(xml: &str) -> Result<Element, ImportError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut document = Element::new(String::new());
    let mut stack: Vec<Element> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                stack.push(Element::new(name));
            }
            Ok(Event::Empty(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let element = Element::new(name);
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => document.children.push(element),
                }
            }
            Ok(Event::Text(ref e)) => {
                let text = e.unescape().unwrap_or_default();
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text);
                }
            }
            Ok(Event::CData(ref e)) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(e));
                }
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| ImportError::Parse("unbalanced end tag".into()))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => document.children.push(element),
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ImportError::Parse(format!("XML parse error: {e}"))),
            Ok(_) => {}
        }
    }

    if !stack.is_empty() {
        return Err(ImportError::Parse("unclosed element".into()));
    }
    if document.children.is_empty() {
        return Err(ImportError::Parse("empty document".into()));
    }
    Ok(document)
}
