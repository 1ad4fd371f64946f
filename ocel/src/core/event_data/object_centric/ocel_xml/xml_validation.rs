//! Structural checks of OCEL XML documents
use std::collections::HashSet;

use chrono::DateTime;

use super::{
    fields, tags,
    xml_tree::{parse_xml_tree, XmlElement},
};

struct Validator {
    messages: Vec<String>,
}

impl Validator {
    fn report(&mut self, path: &str, msg: impl AsRef<str>) {
        self.messages.push(format!("{path}: {}", msg.as_ref()));
    }

    fn value(&mut self, el: &XmlElement, path: &str, key_required: bool) {
        if key_required && el.attribute("key").is_none() {
            self.report(path, "missing attribute 'key'");
        }
        match el.name.as_str() {
            tags::STRING | tags::DATE | tags::INT | tags::FLOAT | tags::BOOLEAN => {
                if !el.children.is_empty() {
                    self.report(path, format!("<{}> must not have child elements", el.name));
                }
                let Some(v) = el.attribute("value") else {
                    self.report(path, "missing attribute 'value'");
                    return;
                };
                let ok = match el.name.as_str() {
                    tags::DATE => DateTime::parse_from_rfc3339(v).is_ok(),
                    tags::INT => v.parse::<i64>().is_ok(),
                    tags::FLOAT => v.parse::<f64>().is_ok(),
                    tags::BOOLEAN => v == "true" || v == "false",
                    _ => true,
                };
                if !ok {
                    self.report(path, format!("{v:?} is not a valid <{}> value", el.name));
                }
            }
            tags::LIST => {
                for (p, c) in el.children_with_paths(path) {
                    self.value(c, &p, false);
                }
            }
            tags::MAP => self.keyed_values(el, path),
            other => self.report(path, format!("unsupported value element <{other}>")),
        }
    }

    fn keyed_values(&mut self, el: &XmlElement, path: &str) {
        for (p, c) in el.children_with_paths(path) {
            self.value(c, &p, true);
        }
    }

    /// Check that `el` is one of `expected` and a valid value, returning the `value` attribute
    fn field<'a>(&mut self, el: &'a XmlElement, path: &str, expected: &str) -> Option<&'a str> {
        if el.name != expected {
            self.report(path, format!("expected <{expected}>, found <{}>", el.name));
            return None;
        }
        let before = self.messages.len();
        self.value(el, path, true);
        if self.messages.len() > before {
            return None;
        }
        el.attribute("value")
    }

    fn string_list(&mut self, el: &XmlElement, path: &str) {
        if el.name != tags::LIST {
            self.report(path, format!("expected <{}>, found <{}>", tags::LIST, el.name));
            return;
        }
        for (p, c) in el.children_with_paths(path) {
            self.field(c, &p, tags::STRING);
        }
    }

    fn attribute_map(&mut self, el: &XmlElement, path: &str) {
        if el.name != tags::LIST && el.name != tags::MAP {
            self.report(
                path,
                format!("expected <{}> or <{}>, found <{}>", tags::LIST, tags::MAP, el.name),
            );
            return;
        }
        self.keyed_values(el, path);
    }

    fn missing_fields(&mut self, el: &XmlElement, path: &str, required: &[&str]) {
        for key in required {
            if el.keyed_child(key).is_none() {
                self.report(path, format!("missing field '{key}'"));
            }
        }
    }

    fn unique_id(&mut self, id: Option<&str>, ids: &mut HashSet<String>, path: &str) {
        if let Some(id) = id {
            if !ids.insert(id.to_string()) {
                self.report(path, format!("duplicate id '{id}'"));
            }
        }
    }

    fn event(&mut self, el: &XmlElement, path: &str, ids: &mut HashSet<String>) {
        for (p, c) in el.children_with_paths(path) {
            match c.attribute("key") {
                Some(fields::ID) => {
                    let id = self.field(c, &p, tags::STRING);
                    self.unique_id(id, ids, &p);
                }
                Some(fields::ACTIVITY) => {
                    self.field(c, &p, tags::STRING);
                }
                Some(fields::TIMESTAMP) => {
                    self.field(c, &p, tags::DATE);
                }
                Some(fields::OMAP) => self.string_list(c, &p),
                Some(fields::VMAP) => self.attribute_map(c, &p),
                Some(other) => self.report(&p, format!("unexpected field '{other}'")),
                None => self.report(&p, "missing attribute 'key'"),
            }
        }
        self.missing_fields(
            el,
            path,
            &[
                fields::ID,
                fields::ACTIVITY,
                fields::TIMESTAMP,
                fields::OMAP,
                fields::VMAP,
            ],
        );
    }

    fn object(&mut self, el: &XmlElement, path: &str, ids: &mut HashSet<String>) {
        for (p, c) in el.children_with_paths(path) {
            match c.attribute("key") {
                Some(fields::ID) => {
                    let id = self.field(c, &p, tags::STRING);
                    self.unique_id(id, ids, &p);
                }
                Some(fields::TYPE) => {
                    self.field(c, &p, tags::STRING);
                }
                Some(fields::OVMAP) => self.attribute_map(c, &p),
                Some(other) => self.report(&p, format!("unexpected field '{other}'")),
                None => self.report(&p, "missing attribute 'key'"),
            }
        }
        self.missing_fields(el, path, &[fields::ID, fields::TYPE, fields::OVMAP]);
    }

    fn global(&mut self, el: &XmlElement, path: &str) {
        let scope = el.attribute("scope");
        if !matches!(scope, Some("event" | "object" | "log")) {
            self.report(path, "attribute 'scope' must be one of event, object, log");
        }
        for (p, c) in el.children_with_paths(path) {
            match c.attribute("key") {
                Some(fields::ATTRIBUTE_NAMES | fields::OBJECT_TYPES) if scope == Some("log") => {
                    self.string_list(c, &p)
                }
                _ => self.value(c, &p, true),
            }
        }
    }

    fn section(&mut self, el: &XmlElement, path: &str, item: &str) {
        let mut ids = HashSet::new();
        for (p, c) in el.children_with_paths(path) {
            if c.name != item {
                self.report(&p, format!("expected <{item}>, found <{}>", c.name));
            } else if item == tags::EVENT {
                self.event(c, &p, &mut ids);
            } else {
                self.object(c, &p, &mut ids);
            }
        }
    }

    fn log(&mut self, root: &XmlElement) {
        if root.name != tags::LOG {
            self.report("/", format!("root element must be <log>, found <{}>", root.name));
            return;
        }
        let path = "/log";
        for (p, c) in root.children_with_paths(path) {
            match c.name.as_str() {
                tags::GLOBAL => self.global(c, &p),
                tags::EVENTS => self.section(c, &p, tags::EVENT),
                tags::OBJECTS => self.section(c, &p, tags::OBJECT),
                other => self.report(&p, format!("unexpected element <{other}>")),
            }
        }
        for section in [tags::EVENTS, tags::OBJECTS] {
            if root.children_named(section).next().is_none() {
                self.report(path, format!("missing element <{section}>"));
            }
        }
    }
}

///
/// Validate an already parsed OCEL XML document
///
/// Returns all violation messages in document order (empty if the document is valid).
///
pub(crate) fn validate_xml_tree(root: &XmlElement) -> Vec<String> {
    let mut v = Validator {
        messages: Vec::new(),
    };
    v.log(root);
    v.messages
}

///
/// Parse and validate an OCEL XML string
///
pub(crate) fn validate_xml_str(xml: &str) -> Vec<String> {
    match parse_xml_tree(xml) {
        Ok(root) => validate_xml_tree(&root),
        Err(e) => vec![format!("/: {e}")],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_every_violation_with_path() {
        let xml = r#"<log>
            <global scope="log"><list key="object-types"><int key="x" value="1"/></list></global>
            <events>
                <event>
                    <string key="id" value="e1"/>
                    <string key="activity" value="a"/>
                    <date key="timestamp" value="2020-01-01T00:00:00Z"/>
                    <list key="omap"><string key="object-id" value="o1"/></list>
                    <list key="vmap"><blob key="b" value="x"/><int key="n" value="1.5"/></list>
                </event>
                <event>
                    <string key="id" value="e1"/>
                    <string key="activity" value="a"/>
                    <list key="omap"/>
                    <map key="vmap"/>
                </event>
            </events>
            <objects/>
        </log>"#;
        let messages = validate_xml_str(xml);
        assert_eq!(
            messages,
            vec![
                "/log/global[1]/list[@key='object-types']/int[@key='x']: expected <string>, found <int>",
                "/log/events[1]/event[1]/list[@key='vmap']/blob[@key='b']: unsupported value element <blob>",
                "/log/events[1]/event[1]/list[@key='vmap']/int[@key='n']: \"1.5\" is not a valid <int> value",
                "/log/events[1]/event[2]/string[@key='id']: duplicate id 'e1'",
                "/log/events[1]/event[2]: missing field 'timestamp'",
            ]
        );
    }

    #[test]
    fn wrong_root_and_syntax_errors() {
        assert_eq!(
            validate_xml_str("<ocel/>"),
            vec!["/: root element must be <log>, found <ocel>"]
        );
        let messages = validate_xml_str("<log><events></log>");
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("/: "));
        assert_eq!(
            validate_xml_str("<log><events/></log>"),
            vec!["/log: missing element <objects>"]
        );
    }
}
