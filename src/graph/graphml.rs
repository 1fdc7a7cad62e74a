//! GraphML reading and writing.
//!
//! Node attributes are declared as GraphML keys so Gephi picks up the tier,
//! owning candidate and geo coordinates:
//!
//! ```xml
//! <key id="d0" for="node" attr.name="node_type" attr.type="string"/>
//! <key id="d2" for="node" attr.name="latitude" attr.type="double"/>
//! ...
//! <node id="@alice">
//!   <data key="d0">user</data>
//!   <data key="d1">Trump</data>
//! </node>
//! ```
//!
//! Optional attributes (owning candidate, coordinates, weight) are omitted
//! when absent. Reading resolves `<data>` through the declared keys, so files
//! re-saved by other tools with different key ids still load.

use std::collections::HashMap;
use std::io::{BufRead, Write};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use super::document::{from_document, invalid, EdgeRecord, GraphDocument, NodeRecord};
use super::{AffiliationGraph, NodeType};
use crate::error::AppError;

const GRAPHML_NS: &str = "http://graphml.graphdrawing.org/xmlns";

const NODE_TYPE: &str = "node_type";
const CANDIDATE: &str = "candidate";
const LATITUDE: &str = "latitude";
const LONGITUDE: &str = "longitude";
const WEIGHT: &str = "weight";

const NODE_TYPE_KEY: &str = "d0";
const CANDIDATE_KEY: &str = "d1";
const LATITUDE_KEY: &str = "d2";
const LONGITUDE_KEY: &str = "d3";
const WEIGHT_KEY: &str = "d4";

/// (id, domain, attribute name, attribute type)
const KEYS: [(&str, &str, &str, &str); 5] = [
    (NODE_TYPE_KEY, "node", NODE_TYPE, "string"),
    (CANDIDATE_KEY, "node", CANDIDATE, "string"),
    (LATITUDE_KEY, "node", LATITUDE, "double"),
    (LONGITUDE_KEY, "node", LONGITUDE, "double"),
    (WEIGHT_KEY, "edge", WEIGHT, "int"),
];

/// Writes the graph as indented GraphML to any writer.
pub fn write_graphml<W: Write>(graph: &AffiliationGraph, writer: W) -> Result<(), AppError> {
    let mut xml = Writer::new_with_indent(writer, b' ', 2);

    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    xml.write_event(Event::Start(
        BytesStart::new("graphml").with_attributes([("xmlns", GRAPHML_NS)]),
    ))?;

    for (id, domain, name, ty) in KEYS {
        xml.write_event(Event::Empty(BytesStart::new("key").with_attributes([
            ("id", id),
            ("for", domain),
            ("attr.name", name),
            ("attr.type", ty),
        ])))?;
    }

    xml.write_event(Event::Start(
        BytesStart::new("graph").with_attributes([("edgedefault", "directed")]),
    ))?;

    for node in graph.nodes() {
        xml.write_event(Event::Start(
            BytesStart::new("node").with_attributes([("id", node.label.as_str())]),
        ))?;
        write_data(&mut xml, NODE_TYPE_KEY, node.node_type().as_str())?;
        if let Some(candidate) = node.candidate_name() {
            write_data(&mut xml, CANDIDATE_KEY, candidate)?;
        }
        if let Some(position) = node.position {
            write_data(&mut xml, LATITUDE_KEY, &position.latitude.to_string())?;
            write_data(&mut xml, LONGITUDE_KEY, &position.longitude.to_string())?;
        }
        xml.write_event(Event::End(BytesEnd::new("node")))?;
    }

    for (source, target, edge) in graph.edges() {
        let start = BytesStart::new("edge").with_attributes([
            ("source", source.label.as_str()),
            ("target", target.label.as_str()),
        ]);
        match edge.weight {
            Some(weight) => {
                xml.write_event(Event::Start(start))?;
                write_data(&mut xml, WEIGHT_KEY, &weight.to_string())?;
                xml.write_event(Event::End(BytesEnd::new("edge")))?;
            }
            None => xml.write_event(Event::Empty(start))?,
        }
    }

    xml.write_event(Event::End(BytesEnd::new("graph")))?;
    xml.write_event(Event::End(BytesEnd::new("graphml")))?;
    xml.get_mut().write_all(b"\n")?;
    Ok(())
}

fn write_data<W: Write>(xml: &mut Writer<W>, key: &str, value: &str) -> Result<(), AppError> {
    xml.write_event(Event::Start(BytesStart::new("data").with_attributes([("key", key)])))?;
    xml.write_event(Event::Text(BytesText::new(value)))?;
    xml.write_event(Event::End(BytesEnd::new("data")))?;
    Ok(())
}

/// Element currently collecting `<data>` children.
enum Open {
    Node(NodeRecord),
    Edge(EdgeRecord),
}

impl Open {
    fn set(&mut self, name: &str, value: &str) -> Result<(), AppError> {
        match (self, name) {
            (Open::Node(node), NODE_TYPE) => {
                let kind = NodeType::parse(value).ok_or_else(|| {
                    invalid(format!("node '{}' has unknown type '{}'", node.id, value))
                })?;
                node.kind = Some(kind);
            }
            (Open::Node(node), CANDIDATE) => node.candidate = Some(value.to_string()),
            (Open::Node(node), LATITUDE) => {
                node.latitude = Some(parse_number(&node.id, value)?);
            }
            (Open::Node(node), LONGITUDE) => {
                node.longitude = Some(parse_number(&node.id, value)?);
            }
            (Open::Edge(edge), WEIGHT) => {
                edge.weight = Some(parse_number(&edge.source, value)?);
            }
            _ => {}
        }
        Ok(())
    }

    fn close(self, document: &mut GraphDocument) {
        match self {
            Open::Node(node) => document.nodes.push(node),
            Open::Edge(edge) => document.edges.push(edge),
        }
    }
}

fn parse_number<T: std::str::FromStr>(owner: &str, value: &str) -> Result<T, AppError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(format!("'{}' has a malformed number '{}'", owner, value)))
}

fn attribute(element: &BytesStart<'_>, name: &str) -> Result<String, AppError> {
    for attr in element.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.as_ref() == name.as_bytes() {
            return Ok(attr.unescape_value()?.into_owned());
        }
    }
    Err(invalid(format!(
        "<{}> is missing the '{}' attribute",
        String::from_utf8_lossy(element.name().as_ref()),
        name
    )))
}

fn open(element: &BytesStart<'_>) -> Result<Option<Open>, AppError> {
    let open = match element.name().as_ref() {
        b"node" => Open::Node(NodeRecord {
            id: attribute(element, "id")?,
            ..NodeRecord::default()
        }),
        b"edge" => Open::Edge(EdgeRecord {
            source: attribute(element, "source")?,
            target: attribute(element, "target")?,
            weight: None,
        }),
        _ => return Ok(None),
    };
    Ok(Some(open))
}

/// Reads a GraphML graph from any buffered reader.
///
/// # Errors
///
/// Returns [`AppError::Xml`] for malformed XML and the same validation
/// errors as [`from_reader`](super::from_reader) for the decoded graph.
pub fn read_graphml<R: BufRead>(reader: R) -> Result<AffiliationGraph, AppError> {
    let mut reader = Reader::from_reader(reader);
    reader.trim_text(true);

    let mut keys: HashMap<String, String> = HashMap::new();
    let mut document = GraphDocument {
        directed: true,
        ..GraphDocument::default()
    };
    let mut current: Option<Open> = None;
    let mut data: Option<String> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"key" => {
                    keys.insert(attribute(&e, "id")?, attribute(&e, "attr.name")?);
                }
                b"data" => data = keys.get(&attribute(&e, "key")?).cloned(),
                _ => {
                    if let Some(element) = open(&e)? {
                        current = Some(element);
                    }
                }
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"key" => {
                    keys.insert(attribute(&e, "id")?, attribute(&e, "attr.name")?);
                }
                _ => {
                    if let Some(element) = open(&e)? {
                        element.close(&mut document);
                    }
                }
            },
            Event::Text(t) => {
                if let (Some(name), Some(element)) = (data.as_deref(), current.as_mut()) {
                    element.set(name, &t.unescape()?)?;
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"data" => data = None,
                b"node" | b"edge" => {
                    if let Some(element) = current.take() {
                        element.close(&mut document);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    from_document(document)
}
