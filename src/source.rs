//! Source loading: raw markup → generic [`Node`] tree.
//!
//! Every input (original text, translations, section titles, boundary index)
//! is loaded into the same untyped tree before normalization. The loader knows
//! nothing about sections or verses; it only preserves element names,
//! attributes, child order and text.
//!
//! ## XML
//!
//! Parsed with `quick-xml`. Attribute values and text are unescaped, and
//! whitespace-only text between elements is dropped:
//!
//! ```text
//! <quran>                          Node "quran"
//!   <sura index="1" name="...">      ├── Node "sura" {index, name}
//!     <aya index="1" text="..."/>    │     └── Node "aya" {index, text}
//!   </sura>
//! </quran>
//! ```
//!
//! ## JSON
//!
//! Objects map onto nodes: scalar fields become attributes, object fields
//! become a child named after the key, and arrays become one child per element,
//! each named after the key. A top-level value is wrapped in a `root` node,
//! and top-level array elements are named `item`. Objects keyed by number
//! (`{"1": {...}, "2": {...}}`) become `item` children with an `index`
//! attribute, so index-keyed title lists survive the conversion.

use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("XML parse error in {path} at byte {position}: {message}")]
    Xml {
        path: PathBuf,
        position: u64,
        message: String,
    },
    #[error("JSON parse error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Unsupported source format (expected .xml or .json): {0}")]
    UnsupportedFormat(PathBuf),
    #[error("Translation locale '{locale}' provided by both {first} and {second}")]
    DuplicateLocale {
        locale: String,
        first: PathBuf,
        second: PathBuf,
    },
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Generic element of a loaded source document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    pub name: String,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<Node>,
    /// Concatenated, trimmed text content. `None` when empty.
    pub text: Option<String>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// All nodes below this one, in document (pre-)order.
    pub fn descendants(&self) -> Vec<&Node> {
        let mut out = Vec::new();
        collect_descendants(self, &mut out);
        out
    }
}

fn collect_descendants<'a>(node: &'a Node, out: &mut Vec<&'a Node>) {
    for child in &node.children {
        out.push(child);
        collect_descendants(child, out);
    }
}

/// Load a source document, choosing the parser by file extension.
pub fn parse(path: &Path) -> Result<Node, LoadError> {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let parser: fn(&str, &Path) -> Result<Node, LoadError> = match extension.as_str() {
        "xml" => parse_xml,
        "json" => parse_json,
        _ => return Err(LoadError::UnsupportedFormat(path.to_path_buf())),
    };
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parser(strip_bom(&content), path)
}

fn strip_bom(content: &str) -> &str {
    content.strip_prefix('\u{feff}').unwrap_or(content)
}

// =============================================================================
// XML
// =============================================================================

/// Parse an XML document and return its root element.
///
/// `path` is only used for error context.
pub fn parse_xml(content: &str, path: &Path) -> Result<Node, LoadError> {
    let mut reader = Reader::from_str(content);
    let xml_error = |position: u64, message: String| LoadError::Xml {
        path: path.to_path_buf(),
        position,
        message,
    };

    // Bottom of the stack is a synthetic document node holding the root element.
    let mut stack: Vec<(Node, String)> = vec![(Node::new(""), String::new())];

    loop {
        let position = reader.buffer_position() as u64;
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let node = element_node(&e).map_err(|m| xml_error(position, m))?;
                stack.push((node, String::new()));
            }
            Ok(Event::Empty(e)) => {
                let node = element_node(&e).map_err(|m| xml_error(position, m))?;
                attach(&mut stack, node);
            }
            Ok(Event::End(_)) => {
                if stack.len() < 2 {
                    return Err(xml_error(position, "unexpected closing tag".into()));
                }
                if let Some((node, text)) = stack.pop() {
                    attach(&mut stack, finish_node(node, &text));
                }
            }
            Ok(Event::Text(e)) => {
                let raw = String::from_utf8_lossy(e.as_ref());
                let text = unescape(&raw).map_err(|err| xml_error(position, err.to_string()))?;
                push_text(&mut stack, &text);
            }
            Ok(Event::CData(e)) => {
                push_text(&mut stack, &String::from_utf8_lossy(&e));
            }
            Ok(Event::GeneralRef(e)) => {
                let entity = String::from_utf8_lossy(e.as_ref()).to_string();
                let resolved = resolve_entity(&entity).ok_or_else(|| {
                    xml_error(position, format!("unknown entity reference &{entity};"))
                })?;
                push_text(&mut stack, &resolved);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(reader.buffer_position() as u64, e.to_string())),
            _ => {}
        }
    }

    if stack.len() != 1 {
        let open = stack.last().map(|(n, _)| n.name.clone()).unwrap_or_default();
        return Err(xml_error(
            reader.buffer_position() as u64,
            format!("unclosed element <{open}>"),
        ));
    }

    let (mut document, _) = stack.remove(0);
    match document.children.len() {
        1 => Ok(document.children.remove(0)),
        0 => Err(xml_error(0, "document has no root element".into())),
        n => Err(xml_error(0, format!("expected one root element, found {n}"))),
    }
}

fn element_node(e: &BytesStart<'_>) -> Result<Node, String> {
    let mut node = Node::new(String::from_utf8_lossy(e.name().as_ref()).to_string());
    for attr in e.attributes() {
        let attr = attr.map_err(|err| err.to_string())?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let raw = String::from_utf8_lossy(&attr.value);
        let value = unescape(&raw).map_err(|err| err.to_string())?;
        node.attributes.insert(key, value.into_owned());
    }
    Ok(node)
}

fn attach(stack: &mut [(Node, String)], node: Node) {
    if let Some((parent, _)) = stack.last_mut() {
        parent.children.push(node);
    }
}

fn push_text(stack: &mut [(Node, String)], text: &str) {
    if let Some((_, buf)) = stack.last_mut() {
        buf.push_str(text);
    }
}

fn finish_node(mut node: Node, text: &str) -> Node {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        node.text = Some(trimmed.to_string());
    }
    node
}

/// Resolve a predefined or numeric character entity (without `&` and `;`).
fn resolve_entity(entity: &str) -> Option<String> {
    let named = match entity {
        "apos" => Some('\''),
        "quot" => Some('"'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        _ => None,
    };
    if let Some(c) = named {
        return Some(c.to_string());
    }
    let code = entity.strip_prefix('#')?;
    let value = match code.strip_prefix('x').or_else(|| code.strip_prefix('X')) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => code.parse::<u32>().ok()?,
    };
    char::from_u32(value).map(|c| c.to_string())
}

// =============================================================================
// JSON
// =============================================================================

/// Parse a JSON document into a `root` node.
pub fn parse_json(content: &str, path: &Path) -> Result<Node, LoadError> {
    let value: Value = serde_json::from_str(content).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(json_node("root", &value))
}

fn json_node(name: &str, value: &Value) -> Node {
    let mut node = Node::new(name);
    match value {
        Value::Object(map) => {
            for (key, field) in map {
                match field {
                    Value::Array(items) => {
                        node.children
                            .extend(items.iter().map(|item| json_node(key, item)));
                    }
                    Value::Object(_) if is_numeric_key(key) => {
                        let mut child = json_node("item", field);
                        child
                            .attributes
                            .entry("index".to_string())
                            .or_insert_with(|| key.clone());
                        node.children.push(child);
                    }
                    Value::Object(_) => node.children.push(json_node(key, field)),
                    Value::Null => {}
                    scalar => {
                        node.attributes.insert(key.clone(), scalar_string(scalar));
                    }
                }
            }
        }
        Value::Array(items) => {
            node.children
                .extend(items.iter().map(|item| json_node("item", item)));
        }
        Value::Null => {}
        scalar => node.text = Some(scalar_string(scalar)),
    }
    node
}

fn is_numeric_key(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_digit())
}

fn scalar_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn xml(content: &str) -> Node {
        parse_xml(content, Path::new("test.xml")).unwrap()
    }

    #[test]
    fn xml_elements_and_attributes() {
        let root = xml(
            r#"<?xml version="1.0" encoding="utf-8"?>
<quran>
  <sura index="1" name="Opening">
    <aya index="1" text="first"/>
    <aya index="2" text="second"/>
  </sura>
</quran>"#,
        );
        assert_eq!(root.name, "quran");
        assert_eq!(root.children.len(), 1);
        let sura = &root.children[0];
        assert_eq!(sura.attr("name"), Some("Opening"));
        let texts: Vec<_> = sura.children.iter().map(|a| a.attr("text")).collect();
        assert_eq!(texts, vec![Some("first"), Some("second")]);
    }

    #[test]
    fn xml_attribute_values_are_unescaped() {
        let root = xml(r#"<r><v text="a &amp; b &quot;c&quot;"/></r>"#);
        assert_eq!(root.children[0].attr("text"), Some("a & b \"c\""));
    }

    #[test]
    fn xml_element_text_keeps_spaces_around_entities() {
        let root = xml("<r><v>  one &amp; two  </v></r>");
        assert_eq!(root.children[0].text.as_deref(), Some("one & two"));
    }

    #[test]
    fn xml_numeric_character_references() {
        let root = xml("<r><v>&#65;&#x42;</v></r>");
        assert_eq!(root.children[0].text.as_deref(), Some("AB"));
    }

    #[test]
    fn xml_whitespace_only_text_is_dropped() {
        let root = xml("<r>\n   <v/>\n</r>");
        assert_eq!(root.text, None);
    }

    #[test]
    fn xml_cdata_becomes_text() {
        let root = xml("<r><v><![CDATA[<raw>]]></v></r>");
        assert_eq!(root.children[0].text.as_deref(), Some("<raw>"));
    }

    #[test]
    fn xml_mismatched_tags_are_errors() {
        let result = parse_xml("<a><b></a>", Path::new("bad.xml"));
        assert!(matches!(result, Err(LoadError::Xml { .. })));
    }

    #[test]
    fn xml_unclosed_root_is_error() {
        let result = parse_xml("<a><b/>", Path::new("bad.xml"));
        assert!(matches!(result, Err(LoadError::Xml { .. })));
    }

    #[test]
    fn xml_empty_document_is_error() {
        let result = parse_xml("<?xml version=\"1.0\"?>", Path::new("empty.xml"));
        assert!(matches!(result, Err(LoadError::Xml { .. })));
    }

    #[test]
    fn json_array_of_objects() {
        let root = parse_json(
            r#"[{"name": "Opening"}, {"name": "Cow"}]"#,
            Path::new("t.json"),
        )
        .unwrap();
        assert_eq!(root.name, "root");
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].name, "item");
        assert_eq!(root.children[1].attr("name"), Some("Cow"));
    }

    #[test]
    fn json_array_fields_become_named_children() {
        let root = parse_json(
            r#"{"sections": [{"name": "A", "verses": [{"text": "x"}, {"text": "y"}]}]}"#,
            Path::new("c.json"),
        )
        .unwrap();
        let section = &root.children[0];
        assert_eq!(section.name, "sections");
        assert_eq!(section.children.len(), 2);
        assert_eq!(section.children[1].name, "verses");
        assert_eq!(section.children[1].attr("text"), Some("y"));
    }

    #[test]
    fn json_numeric_keys_become_indexed_items() {
        let root = parse_json(
            r#"{"2": {"name": "Cow"}, "1": {"name": "Opening"}}"#,
            Path::new("t.json"),
        )
        .unwrap();
        assert!(root.children.iter().all(|c| c.name == "item"));
        let cow = root
            .children
            .iter()
            .find(|c| c.attr("name") == Some("Cow"))
            .unwrap();
        assert_eq!(cow.attr("index"), Some("2"));
    }

    #[test]
    fn json_scalars_are_stringified() {
        let root = parse_json(r#"{"index": 3, "flag": true}"#, Path::new("s.json")).unwrap();
        assert_eq!(root.attr("index"), Some("3"));
        assert_eq!(root.attr("flag"), Some("true"));
    }

    #[test]
    fn json_scalar_array_items_carry_text() {
        let root = parse_json(r#"["Opening", "Cow"]"#, Path::new("t.json")).unwrap();
        assert_eq!(root.children[0].text.as_deref(), Some("Opening"));
    }

    #[test]
    fn malformed_json_is_error() {
        let result = parse_json("{not json", Path::new("bad.json"));
        assert!(matches!(result, Err(LoadError::Json { .. })));
    }

    #[test]
    fn parse_dispatches_on_extension() {
        let tmp = TempDir::new().unwrap();
        let xml_path = tmp.path().join("a.xml");
        let json_path = tmp.path().join("b.JSON");
        fs::write(&xml_path, "\u{feff}<root><x/></root>").unwrap();
        fs::write(&json_path, r#"{"k": "v"}"#).unwrap();

        assert_eq!(parse(&xml_path).unwrap().name, "root");
        assert_eq!(parse(&json_path).unwrap().attr("k"), Some("v"));
    }

    #[test]
    fn parse_rejects_unknown_extension() {
        let result = parse(Path::new("corpus.txt"));
        assert!(matches!(result, Err(LoadError::UnsupportedFormat(_))));
    }

    #[test]
    fn parse_missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let result = parse(&tmp.path().join("missing.xml"));
        assert!(matches!(result, Err(LoadError::Io { .. })));
    }

    #[test]
    fn descendants_are_preorder() {
        let root = Node::new("a")
            .with_child(Node::new("b").with_child(Node::new("c")))
            .with_child(Node::new("d"));
        let names: Vec<&str> = root.descendants().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c", "d"]);
    }
}
