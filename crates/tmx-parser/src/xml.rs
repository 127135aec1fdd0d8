use std::collections::BTreeMap;

use roxmltree::{Document, Node, TextPos};
use tmx_core::{SourceLocation, SourceSpan, TmxError};

/// An owned element of a Tiled document. Character data directly under the
/// element is concatenated into `text`; comments and processing
/// instructions are dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<XmlElement>,
    pub text: String,
    pub location: SourceSpan,
}

impl XmlElement {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn elements_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    pub fn required_attr(&self, name: &str) -> Result<&str, TmxError> {
        self.attr(name).ok_or_else(|| {
            TmxError::with_span(
                "XML_ATTR_MISSING",
                format!("<{}> requires attribute \"{}\".", self.name, name),
                self.location.clone(),
            )
        })
    }

    pub fn u32_attr(&self, name: &str) -> Result<u32, TmxError> {
        let raw = self.required_attr(name)?;
        raw.trim()
            .parse::<u32>()
            .map_err(|_| self.number_error(name, raw, "must be a non-negative integer"))
    }

    /// Reads a possibly fractional pixel coordinate, truncated toward zero.
    /// A missing attribute reads as zero.
    pub fn coordinate_attr(&self, name: &str) -> Result<i32, TmxError> {
        let Some(raw) = self.attr(name) else {
            return Ok(0);
        };
        match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value.trunc() as i32),
            _ => Err(self.number_error(name, raw, "must be a number")),
        }
    }

    fn number_error(&self, name: &str, raw: &str, expectation: &str) -> TmxError {
        TmxError::with_span(
            "XML_ATTR_NUMBER_INVALID",
            format!(
                "Attribute \"{}\" on <{}> {}, got \"{}\".",
                name, self.name, expectation, raw
            ),
            self.location.clone(),
        )
    }
}

/// Parses a map or tileset document and returns its root element.
pub fn parse_xml(source: &str) -> Result<XmlElement, TmxError> {
    let document = Document::parse(source).map_err(|error| {
        let at = location(error.pos());
        TmxError::with_span(
            "XML_PARSE_ERROR",
            error.to_string(),
            SourceSpan {
                start: at.clone(),
                end: at,
            },
        )
    })?;
    Ok(to_element(&document, document.root_element()))
}

fn to_element(document: &Document<'_>, node: Node<'_, '_>) -> XmlElement {
    let range = node.range();
    let mut element = XmlElement {
        name: node.tag_name().name().to_string(),
        attributes: node
            .attributes()
            .map(|attribute| (attribute.name().to_string(), attribute.value().to_string()))
            .collect(),
        children: Vec::new(),
        text: String::new(),
        location: SourceSpan {
            start: location(document.text_pos_at(range.start)),
            end: location(document.text_pos_at(range.end)),
        },
    };
    for child in node.children() {
        if child.is_element() {
            element.children.push(to_element(document, child));
        } else if child.is_text() {
            element.text.push_str(child.text().unwrap_or_default());
        }
    }
    element
}

fn location(position: TextPos) -> SourceLocation {
    SourceLocation {
        line: position.row as usize,
        column: position.col as usize,
    }
}
