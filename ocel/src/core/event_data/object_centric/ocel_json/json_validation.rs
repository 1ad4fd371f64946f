//! Structural checks of OCEL JSON documents
use chrono::DateTime;
use serde_json::{Map, Value};

use super::keys;

struct Validator {
    messages: Vec<String>,
}

impl Validator {
    fn report(&mut self, path: &str, msg: impl AsRef<str>) {
        self.messages.push(format!("{path}: {}", msg.as_ref()));
    }

    fn required_object<'a>(
        &mut self,
        parent: &'a Map<String, Value>,
        key: &str,
        path: &str,
    ) -> Option<&'a Map<String, Value>> {
        match parent.get(key) {
            Some(Value::Object(o)) => Some(o),
            Some(_) => {
                self.report(&format!("{path}/{key}"), "expected an object");
                None
            }
            None => {
                self.report(path, format!("missing required property '{key}'"));
                None
            }
        }
    }

    fn required_string(&mut self, parent: &Map<String, Value>, key: &str, path: &str) -> bool {
        match parent.get(key) {
            Some(Value::String(_)) => true,
            Some(_) => {
                self.report(&format!("{path}/{key}"), "expected a string");
                false
            }
            None => {
                self.report(path, format!("missing required property '{key}'"));
                false
            }
        }
    }

    fn string_array(&mut self, value: &Value, path: &str) {
        match value {
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if !item.is_string() {
                        self.report(&format!("{path}/{i}"), "expected a string");
                    }
                }
            }
            _ => self.report(path, "expected an array of strings"),
        }
    }

    fn unknown_properties(&mut self, obj: &Map<String, Value>, allowed: &[&str], path: &str) {
        for key in obj.keys() {
            if !allowed.contains(&key.as_str()) {
                self.report(path, format!("additional property '{key}' is not allowed"));
            }
        }
    }

    fn global_log(&mut self, log: &Map<String, Value>, path: &str) {
        for (key, value) in log {
            let value_path = format!("{path}/{key}");
            if key == keys::ATTRIBUTE_NAMES || key == keys::OBJECT_TYPES {
                self.string_array(value, &value_path);
            }
            // All remaining entries are free-form global attributes
        }
    }

    fn event(&mut self, ev: &Value, path: &str) {
        let Some(ev) = ev.as_object() else {
            self.report(path, "expected an object");
            return;
        };
        self.required_string(ev, keys::ACTIVITY, path);
        if self.required_string(ev, keys::TIMESTAMP, path) {
            if let Some(Value::String(t)) = ev.get(keys::TIMESTAMP) {
                if let Err(e) = DateTime::parse_from_rfc3339(t) {
                    self.report(
                        &format!("{path}/{}", keys::TIMESTAMP),
                        format!("{t:?} is not a valid date-time: {e}"),
                    );
                }
            }
        }
        match ev.get(keys::OMAP) {
            Some(omap) => self.string_array(omap, &format!("{path}/{}", keys::OMAP)),
            None => self.report(path, format!("missing required property '{}'", keys::OMAP)),
        }
        self.required_object(ev, keys::VMAP, path);
        self.unknown_properties(
            ev,
            &[keys::ACTIVITY, keys::TIMESTAMP, keys::OMAP, keys::VMAP],
            path,
        );
    }

    fn object(&mut self, ob: &Value, path: &str) {
        let Some(ob) = ob.as_object() else {
            self.report(path, "expected an object");
            return;
        };
        self.required_string(ob, keys::TYPE, path);
        self.required_object(ob, keys::OVMAP, path);
        self.unknown_properties(ob, &[keys::TYPE, keys::OVMAP], path);
    }
}

///
/// Validate a parsed OCEL JSON document
///
/// Returns all violation messages in document order (empty if the document is valid).
///
pub(crate) fn validate_json_value(doc: &Value) -> Vec<String> {
    let mut v = Validator {
        messages: Vec::new(),
    };
    let Some(root) = doc.as_object() else {
        v.report("#", "expected an object");
        return v.messages;
    };
    for key in [keys::GLOBAL_EVENT, keys::GLOBAL_OBJECT] {
        if let Some(section) = root.get(key) {
            if !section.is_object() {
                v.report(&format!("#/{key}"), "expected an object");
            }
        }
    }
    if let Some(log) = v.required_object(root, keys::GLOBAL_LOG, "#") {
        v.global_log(log, &format!("#/{}", keys::GLOBAL_LOG));
    }
    if let Some(events) = v.required_object(root, keys::EVENTS, "#") {
        for (id, ev) in events {
            v.event(ev, &format!("#/{}/{}", keys::EVENTS, id));
        }
    }
    if let Some(objects) = v.required_object(root, keys::OBJECTS, "#") {
        for (id, ob) in objects {
            v.object(ob, &format!("#/{}/{}", keys::OBJECTS, id));
        }
    }
    v.unknown_properties(
        root,
        &[
            keys::GLOBAL_EVENT,
            keys::GLOBAL_OBJECT,
            keys::GLOBAL_LOG,
            keys::EVENTS,
            keys::OBJECTS,
        ],
        "#",
    );
    v.messages
}

///
/// Parse and validate an OCEL JSON string
///
pub(crate) fn validate_json_str(json: &str) -> Vec<String> {
    match serde_json::from_str::<Value>(json) {
        Ok(doc) => validate_json_value(&doc),
        Err(e) => vec![format!("#: invalid JSON: {e}")],
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn reports_every_violation_with_path() {
        let doc = json!({
            "ocel:global-log": {"ocel:attribute-names": ["a", 1]},
            "ocel:events": {
                "e1": {
                    "ocel:activity": "a",
                    "ocel:timestamp": "yesterday",
                    "ocel:omap": ["o1"],
                    "ocel:vmap": {}
                },
                "e2": {"ocel:activity": 5, "ocel:omap": "o1", "ocel:vmap": {}, "extra": true}
            },
            "ocel:objects": {"o1": {"ocel:type": "order"}}
        });
        let messages = validate_json_value(&doc);
        let expected = [
            "#/ocel:global-log/ocel:attribute-names/1: expected a string",
            "#/ocel:events/e1/ocel:timestamp: \"yesterday\" is not a valid date-time",
            "#/ocel:events/e2/ocel:activity: expected a string",
            "#/ocel:events/e2: missing required property 'ocel:timestamp'",
            "#/ocel:events/e2/ocel:omap: expected an array of strings",
            "#/ocel:events/e2: additional property 'extra' is not allowed",
            "#/ocel:objects/o1: missing required property 'ocel:ovmap'",
        ];
        assert_eq!(messages.len(), expected.len(), "{messages:?}");
        for (m, e) in messages.iter().zip(expected) {
            assert!(m.starts_with(e), "{m} should start with {e}");
        }
    }

    #[test]
    fn broken_json_is_reported() {
        let messages = validate_json_str("{\"ocel:events\": ");
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("#: invalid JSON"));
    }
}
