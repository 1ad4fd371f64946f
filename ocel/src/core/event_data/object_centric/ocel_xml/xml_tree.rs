use std::collections::HashMap;

use quick_xml::{
    events::{BytesStart, Event},
    Reader,
};

///
/// Minimal owned XML element, as read by [`parse_xml_tree`]
///
/// Text content is not kept: OCEL XML documents store all data in attributes.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Value of the XML attribute `key`
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Child elements named `name`
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// First child element whose `key` attribute equals `key`
    pub fn keyed_child(&self, key: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.attribute("key") == Some(key))
    }

    ///
    /// All child elements together with their location path, given the path of `self`
    ///
    /// Keyed elements are addressed by key (`list[@key='vmap']`), all others by their
    /// 1-based position among siblings of the same name (`event[2]`).
    ///
    pub fn children_with_paths(&self, path: &str) -> Vec<(String, &XmlElement)> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        self.children
            .iter()
            .map(|c| {
                let n = counts.entry(c.name.as_str()).or_insert(0);
                *n += 1;
                let segment = match c.attribute("key") {
                    Some(key) => format!("{}[@key='{}']", c.name, key),
                    None => format!("{}[{}]", c.name, n),
                };
                (format!("{path}/{segment}"), c)
            })
            .collect()
    }
}

fn element_from_start(t: &BytesStart<'_>) -> Result<XmlElement, String> {
    let name = String::from_utf8_lossy(t.name().as_ref()).into_owned();
    let attributes = t
        .attributes()
        .map(|attr| {
            let attr = attr.map_err(|e| format!("invalid attribute in <{name}>: {e}"))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| format!("invalid value of attribute '{key}' in <{name}>: {e}"))?
                .into_owned();
            Ok::<_, String>((key, value))
        })
        .collect::<Result<Vec<_>, String>>()?;
    Ok(XmlElement {
        name,
        attributes,
        children: Vec::new(),
    })
}

fn attach(
    element: XmlElement,
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
) -> Result<(), String> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_some() => {
            return Err(format!(
                "unexpected second root element <{}>",
                element.name
            ))
        }
        None => *root = Some(element),
    }
    Ok(())
}

///
/// Read a complete XML document into an [`XmlElement`] tree
///
/// Fails on any XML syntax error (e.g., mismatched closing tags), on unclosed elements
/// and on documents without (or with more than one) root element.
///
pub(crate) fn parse_xml_tree(xml: &str) -> Result<XmlElement, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;
    loop {
        match reader.read_event() {
            Ok(Event::Start(t)) => stack.push(element_from_start(&t)?),
            Ok(Event::Empty(t)) => attach(element_from_start(&t)?, &mut stack, &mut root)?,
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| "unexpected closing tag".to_string())?;
                attach(element, &mut stack, &mut root)?;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(format!(
                    "XML syntax error at position {}: {e}",
                    reader.buffer_position()
                ))
            }
        }
    }
    if let Some(open) = stack.last() {
        return Err(format!("unexpected end of document, <{}> is not closed", open.name));
    }
    root.ok_or_else(|| "document has no root element".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_nested_tree_with_unescaped_attributes() {
        let tree = parse_xml_tree(
            r#"<?xml version="1.0"?><log><a key="x &amp; y"/><b><c/></b></log>"#,
        )
        .unwrap();
        assert_eq!(tree.name, "log");
        assert_eq!(tree.children.len(), 2);
        assert_eq!(tree.children[0].attribute("key"), Some("x & y"));
        assert_eq!(tree.keyed_child("x & y").map(|c| c.name.as_str()), Some("a"));
        assert_eq!(tree.children_named("b").next().unwrap().children[0].name, "c");
        let paths: Vec<String> = tree
            .children_with_paths("/log")
            .into_iter()
            .map(|(p, _)| p)
            .collect();
        assert_eq!(paths, vec!["/log/a[@key='x & y']", "/log/b[1]"]);
    }

    #[test]
    fn rejects_broken_documents() {
        assert!(parse_xml_tree("<log><a></b></log>").is_err());
        assert!(parse_xml_tree("<log><a>").is_err());
        assert!(parse_xml_tree("").is_err());
        assert!(parse_xml_tree("<a/><b/>").is_err());
    }
}
