use chrono::DateTime;
use serde_json::{Map, Value};

use crate::core::event_data::object_centric::{
    io::OCELIOError,
    ocel_struct::{Attributes, OCELEvent, OCELObject, OCELValue, OCEL},
};

use super::keys;

fn malformed(path: &str, msg: &str) -> OCELIOError {
    OCELIOError::MalformedInput(format!("{path}: {msg}"))
}

fn get_object<'a>(
    parent: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<&'a Map<String, Value>, OCELIOError> {
    parent
        .get(key)
        .and_then(Value::as_object)
        .ok_or_else(|| malformed(path, &format!("missing object '{key}'")))
}

fn get_str<'a>(
    parent: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<&'a str, OCELIOError> {
    parent
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| malformed(path, &format!("missing string '{key}'")))
}

///
/// Convert a JSON value into an [`OCELValue`]
///
/// Returns `None` for `null`, which is never stored.
///
pub(crate) fn json_to_value(value: &Value) -> Option<OCELValue> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(OCELValue::Boolean(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(OCELValue::Integer(i)),
            // Also covers u64 values outside of the i64 range
            None => n.as_f64().map(OCELValue::Float),
        },
        // The layout has no type tags, so any RFC 3339 string is taken to be a date
        Value::String(s) => match DateTime::parse_from_rfc3339(s) {
            Ok(dt) => Some(OCELValue::Timestamp(dt)),
            Err(_) => Some(OCELValue::String(s.clone())),
        },
        Value::Array(items) => Some(OCELValue::List(
            items.iter().filter_map(json_to_value).collect(),
        )),
        Value::Object(map) => Some(OCELValue::Map(json_to_attributes(map))),
    }
}

/// Convert all entries of a JSON object, dropping `null`s
pub(crate) fn json_to_attributes(map: &Map<String, Value>) -> Attributes {
    map.iter()
        .filter_map(|(k, v)| json_to_value(v).map(|v| (k.as_str(), v)))
        .collect()
}

///
/// Build an [`OCEL`] from an already parsed JSON document
///
/// Fails with [`OCELIOError::MalformedInput`] if required sections or fields are missing.
///
pub(crate) fn ocel_from_json_value(doc: &Value) -> Result<OCEL, OCELIOError> {
    let root = doc
        .as_object()
        .ok_or_else(|| malformed("#", "expected a JSON object"))?;

    let mut ocel = OCEL::default();

    if let Some(global_log) = root.get(keys::GLOBAL_LOG).and_then(Value::as_object) {
        for (key, value) in global_log {
            if key == keys::ATTRIBUTE_NAMES || key == keys::OBJECT_TYPES {
                continue;
            }
            if let Some(v) = json_to_value(value) {
                let name = key.strip_prefix(keys::PREFIX).unwrap_or(key);
                ocel.global_attributes.insert(name, v);
            }
        }
    }

    let events = get_object(root, keys::EVENTS, "#")?;
    ocel.events = events
        .iter()
        .map(|(id, ev)| {
            let path = format!("#/{}/{}", keys::EVENTS, id);
            let ev = ev
                .as_object()
                .ok_or_else(|| malformed(&path, "expected an object"))?;
            let activity = get_str(ev, keys::ACTIVITY, &path)?;
            let time = get_str(ev, keys::TIMESTAMP, &path)?;
            let timestamp = DateTime::parse_from_rfc3339(time)
                .map_err(|e| malformed(&path, &format!("invalid timestamp {time:?}: {e}")))?;
            let object_refs = match ev.get(keys::OMAP) {
                Some(Value::Array(refs)) => refs
                    .iter()
                    .map(|r| {
                        r.as_str()
                            .map(str::to_string)
                            .ok_or_else(|| malformed(&path, "object references must be strings"))
                    })
                    .collect::<Result<Vec<_>, _>>()?,
                _ => return Err(malformed(&path, &format!("missing array '{}'", keys::OMAP))),
            };
            let attributes = match ev.get(keys::VMAP) {
                Some(Value::Object(vmap)) => json_to_attributes(vmap),
                None | Some(Value::Null) => Attributes::new(),
                Some(_) => {
                    return Err(malformed(&path, &format!("'{}' must be an object", keys::VMAP)))
                }
            };
            Ok::<_, OCELIOError>((
                id.as_str(),
                OCELEvent {
                    activity: activity.to_string(),
                    timestamp,
                    object_refs,
                    attributes,
                },
            ))
        })
        .collect::<Result<_, OCELIOError>>()?;

    let objects = get_object(root, keys::OBJECTS, "#")?;
    ocel.objects = objects
        .iter()
        .map(|(id, ob)| {
            let path = format!("#/{}/{}", keys::OBJECTS, id);
            let ob = ob
                .as_object()
                .ok_or_else(|| malformed(&path, "expected an object"))?;
            let object_type = get_str(ob, keys::TYPE, &path)?;
            let attributes = match ob.get(keys::OVMAP) {
                Some(Value::Object(ovmap)) => json_to_attributes(ovmap),
                None | Some(Value::Null) => Attributes::new(),
                Some(_) => {
                    return Err(malformed(&path, &format!("'{}' must be an object", keys::OVMAP)))
                }
            };
            Ok::<_, OCELIOError>((
                id.as_str(),
                OCELObject {
                    object_type: object_type.to_string(),
                    attributes,
                },
            ))
        })
        .collect::<Result<_, OCELIOError>>()?;

    Ok(ocel)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn numbers_strings_and_nulls() {
        let attrs = json_to_attributes(
            json!({
                "int": 3,
                "float": 3.0,
                "big": 18446744073709551615u64,
                "date": "2020-07-09T08:21:01.527+02:00",
                "text": "2020-07-09",
                "gone": null,
                "list": [1, null, "a"],
            })
            .as_object()
            .unwrap(),
        );
        assert_eq!(attrs.get("int"), Some(&OCELValue::Integer(3)));
        assert_eq!(attrs.get("float"), Some(&OCELValue::Float(3.0)));
        assert!(attrs.get("big").unwrap().try_as_float().is_some());
        assert!(attrs.get("date").unwrap().try_as_timestamp().is_some());
        assert_eq!(attrs.get("text"), Some(&OCELValue::from("2020-07-09")));
        assert!(!attrs.contains_key("gone"));
        assert_eq!(
            attrs.get("list"),
            Some(&OCELValue::List(vec![
                OCELValue::Integer(1),
                OCELValue::from("a")
            ]))
        );
    }

    #[test]
    fn missing_events_section_is_malformed() {
        let res = ocel_from_json_value(&json!({"ocel:objects": {}}));
        assert!(matches!(res, Err(OCELIOError::MalformedInput(_))));
    }
}
