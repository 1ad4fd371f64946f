use serde_json::{Map, Number, Value};

use crate::core::event_data::object_centric::{
    codec::check_reserved_global_keys,
    io::OCELIOError,
    ocel_struct::{Attributes, OCELValue, OCEL},
};

use super::keys;

/// Value written for the default activity / type of the global event / object sections
const INVALID_DEFAULT: &str = "__INVALID__";

///
/// Convert an [`OCELValue`] into a JSON value
///
/// `path` is only used for error messages.
/// Fails for non-finite floats, which have no JSON representation.
///
pub(crate) fn value_to_json(value: &OCELValue, path: &str) -> Result<Value, OCELIOError> {
    Ok(match value {
        OCELValue::String(s) => Value::String(s.clone()),
        OCELValue::Timestamp(dt) => Value::String(dt.to_rfc3339()),
        OCELValue::Integer(i) => Value::Number((*i).into()),
        OCELValue::Float(f) => Value::Number(Number::from_f64(*f).ok_or_else(|| {
            OCELIOError::UnsupportedValueType(format!(
                "{path}: non-finite float {f} can not be written as JSON"
            ))
        })?),
        OCELValue::Boolean(b) => Value::Bool(*b),
        OCELValue::List(items) => Value::Array(
            items
                .iter()
                .enumerate()
                .map(|(i, v)| value_to_json(v, &format!("{path}/{i}")))
                .collect::<Result<_, _>>()?,
        ),
        OCELValue::Map(m) => Value::Object(attributes_to_json(m, path)?),
    })
}

pub(crate) fn attributes_to_json(
    attributes: &Attributes,
    path: &str,
) -> Result<Map<String, Value>, OCELIOError> {
    attributes
        .iter()
        .map(|(k, v)| Ok::<_, OCELIOError>((k.clone(), value_to_json(v, &format!("{path}/{k}"))?)))
        .collect()
}

fn string_array(mut items: Vec<String>) -> Value {
    items.sort();
    Value::Array(items.into_iter().map(Value::String).collect())
}

///
/// Build the JSON document for an [`OCEL`]
///
/// Fails if a global attribute uses the name of a derived global-log entry.
///
pub(crate) fn ocel_to_json_value(ocel: &OCEL) -> Result<Value, OCELIOError> {
    check_reserved_global_keys(ocel)?;
    let mut global_log = Map::new();
    global_log.insert(
        keys::ATTRIBUTE_NAMES.to_string(),
        string_array(ocel.attribute_names().into_iter().collect()),
    );
    global_log.insert(
        keys::OBJECT_TYPES.to_string(),
        string_array(ocel.object_types().into_iter().collect()),
    );
    for (k, v) in &ocel.global_attributes {
        let path = format!("#/{}/{}", keys::GLOBAL_LOG, k);
        global_log.insert(format!("{}{}", keys::PREFIX, k), value_to_json(v, &path)?);
    }

    let mut events = Map::with_capacity(ocel.events.len());
    for (id, ev) in &ocel.events {
        let path = format!("#/{}/{}", keys::EVENTS, id);
        let mut e = Map::new();
        e.insert(keys::ACTIVITY.to_string(), Value::String(ev.activity.clone()));
        e.insert(
            keys::TIMESTAMP.to_string(),
            Value::String(ev.timestamp.to_rfc3339()),
        );
        e.insert(
            keys::OMAP.to_string(),
            Value::Array(ev.object_refs.iter().cloned().map(Value::String).collect()),
        );
        e.insert(
            keys::VMAP.to_string(),
            Value::Object(attributes_to_json(
                &ev.attributes,
                &format!("{path}/{}", keys::VMAP),
            )?),
        );
        events.insert(id.clone(), Value::Object(e));
    }

    let mut objects = Map::with_capacity(ocel.objects.len());
    for (id, ob) in &ocel.objects {
        let path = format!("#/{}/{}", keys::OBJECTS, id);
        let mut o = Map::new();
        o.insert(keys::TYPE.to_string(), Value::String(ob.object_type.clone()));
        o.insert(
            keys::OVMAP.to_string(),
            Value::Object(attributes_to_json(
                &ob.attributes,
                &format!("{path}/{}", keys::OVMAP),
            )?),
        );
        objects.insert(id.clone(), Value::Object(o));
    }

    let mut global_event = Map::new();
    global_event.insert(
        keys::ACTIVITY.to_string(),
        Value::String(INVALID_DEFAULT.to_string()),
    );
    let mut global_object = Map::new();
    global_object.insert(
        keys::TYPE.to_string(),
        Value::String(INVALID_DEFAULT.to_string()),
    );

    let mut root = Map::new();
    root.insert(keys::GLOBAL_EVENT.to_string(), Value::Object(global_event));
    root.insert(keys::GLOBAL_OBJECT.to_string(), Value::Object(global_object));
    root.insert(keys::GLOBAL_LOG.to_string(), Value::Object(global_log));
    root.insert(keys::EVENTS.to_string(), Value::Object(events));
    root.insert(keys::OBJECTS.to_string(), Value::Object(objects));
    Ok(Value::Object(root))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nan_is_rejected_with_path() {
        let mut attrs = Attributes::new();
        attrs.insert("bad", OCELValue::List(vec![OCELValue::Float(f64::NAN)]));
        match attributes_to_json(&attrs, "#/x") {
            Err(OCELIOError::UnsupportedValueType(msg)) => assert!(msg.starts_with("#/x/bad/0")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn reserved_global_key_is_rejected() {
        let mut ocel = OCEL::default();
        ocel.global_attributes
            .insert("object-types", OCELValue::from("custom"));
        match ocel_to_json_value(&ocel) {
            Err(OCELIOError::UnsupportedValueType(msg)) => assert!(msg.contains("object-types")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn floats_keep_fraction() {
        let v = value_to_json(&OCELValue::Float(2.0), "#").unwrap();
        assert_eq!(serde_json::to_string(&v).unwrap(), "2.0");
    }
}
