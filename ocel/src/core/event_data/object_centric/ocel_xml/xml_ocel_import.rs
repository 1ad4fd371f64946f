use std::path::Path;

use chrono::{DateTime, FixedOffset};

use crate::core::event_data::{
    object_centric::{
        codec::OCELCodec,
        io::OCELIOError,
        ocel_struct::{Attributes, OCELEvent, OCELObject, OCELValue, OCEL},
    },
    timestamp_utils::parse_timestamp,
};

use super::{fields, tags, xml_tree::XmlElement, XmlOCEL};

fn malformed(path: &str, msg: impl AsRef<str>) -> OCELIOError {
    OCELIOError::MalformedInput(format!("{path}: {}", msg.as_ref()))
}

fn required_value<'a>(el: &'a XmlElement, path: &str) -> Result<&'a str, OCELIOError> {
    el.attribute("value")
        .ok_or_else(|| malformed(path, "missing attribute 'value'"))
}

///
/// Parse a date value, falling back to other common formats
///
/// Validated documents only contain RFC 3339 dates, so falling back is logged as a warning.
///
fn parse_date(value: &str, path: &str) -> Result<DateTime<FixedOffset>, OCELIOError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt);
    }
    match parse_timestamp(value) {
        Ok(dt) => {
            log::warn!(
                "{path}: date {value:?} is not RFC 3339, interpreted as {}",
                dt.to_rfc3339()
            );
            Ok(dt)
        }
        Err(e) => Err(malformed(path, format!("invalid date {value:?}: {e}"))),
    }
}

/// Convert a value element (recursively)
fn value_from_element(el: &XmlElement, path: &str) -> Result<OCELValue, OCELIOError> {
    Ok(match el.name.as_str() {
        tags::STRING => OCELValue::String(required_value(el, path)?.to_string()),
        tags::DATE => OCELValue::Timestamp(parse_date(required_value(el, path)?, path)?),
        tags::INT => {
            let v = required_value(el, path)?;
            OCELValue::Integer(
                v.parse()
                    .map_err(|e| malformed(path, format!("invalid integer {v:?}: {e}")))?,
            )
        }
        tags::FLOAT => {
            let v = required_value(el, path)?;
            OCELValue::Float(
                v.parse()
                    .map_err(|e| malformed(path, format!("invalid float {v:?}: {e}")))?,
            )
        }
        tags::BOOLEAN => {
            let v = required_value(el, path)?;
            OCELValue::Boolean(
                v.parse()
                    .map_err(|e| malformed(path, format!("invalid boolean {v:?}: {e}")))?,
            )
        }
        tags::LIST => OCELValue::List(
            el.children_with_paths(path)
                .into_iter()
                .map(|(p, c)| value_from_element(c, &p))
                .collect::<Result<_, _>>()?,
        ),
        tags::MAP => OCELValue::Map(attributes_from_children(el, path)?),
        other => {
            return Err(OCELIOError::UnsupportedValueType(format!(
                "{path}: unsupported value element <{other}>"
            )))
        }
    })
}

/// Convert all (keyed) child elements of `el` to [`Attributes`]
fn attributes_from_children(el: &XmlElement, path: &str) -> Result<Attributes, OCELIOError> {
    el.children_with_paths(path)
        .into_iter()
        .map(|(p, c)| {
            let key = c
                .attribute("key")
                .ok_or_else(|| malformed(&p, "missing attribute 'key'"))?;
            Ok::<_, OCELIOError>((key, value_from_element(c, &p)?))
        })
        .collect()
}

fn string_field(el: &XmlElement, key: &str, path: &str) -> Result<String, OCELIOError> {
    let field = el
        .keyed_child(key)
        .ok_or_else(|| malformed(path, format!("missing field '{key}'")))?;
    Ok(required_value(field, path)?.to_string())
}

fn attribute_field(el: &XmlElement, key: &str, path: &str) -> Result<Attributes, OCELIOError> {
    match el.keyed_child(key) {
        Some(field) => attributes_from_children(field, &format!("{path}/{key}")),
        None => Ok(Attributes::new()),
    }
}

fn event_from_element(el: &XmlElement, path: &str) -> Result<(String, OCELEvent), OCELIOError> {
    let id = string_field(el, fields::ID, path)?;
    let activity = string_field(el, fields::ACTIVITY, path)?;
    let timestamp = parse_date(&string_field(el, fields::TIMESTAMP, path)?, path)?;
    let object_refs = match el.keyed_child(fields::OMAP) {
        Some(omap) => omap
            .children
            .iter()
            .map(|c| required_value(c, path).map(str::to_string))
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };
    let attributes = attribute_field(el, fields::VMAP, path)?;
    Ok((
        id,
        OCELEvent {
            activity,
            timestamp,
            object_refs,
            attributes,
        },
    ))
}

fn object_from_element(el: &XmlElement, path: &str) -> Result<(String, OCELObject), OCELIOError> {
    let id = string_field(el, fields::ID, path)?;
    let object_type = string_field(el, fields::TYPE, path)?;
    let attributes = attribute_field(el, fields::OVMAP, path)?;
    Ok((
        id,
        OCELObject {
            object_type,
            attributes,
        },
    ))
}

///
/// Build an [`OCEL`] from a parsed XML document
///
/// Unknown elements outside of value containers are skipped.
///
pub(crate) fn ocel_from_xml_tree(root: &XmlElement) -> Result<OCEL, OCELIOError> {
    if root.name != tags::LOG {
        return Err(malformed(
            "/",
            format!("root element must be <log>, found <{}>", root.name),
        ));
    }
    let mut ocel = OCEL::default();
    for (p, c) in root.children_with_paths("/log") {
        match c.name.as_str() {
            tags::GLOBAL if c.attribute("scope") == Some("log") => {
                for (p, attr) in c.children_with_paths(&p) {
                    match attr.attribute("key") {
                        Some(fields::ATTRIBUTE_NAMES | fields::OBJECT_TYPES) => {}
                        Some(key) => {
                            ocel.global_attributes
                                .insert(key, value_from_element(attr, &p)?);
                        }
                        None => return Err(malformed(&p, "missing attribute 'key'")),
                    }
                }
            }
            tags::EVENTS => {
                for (p, ev) in c.children_with_paths(&p) {
                    if ev.name == tags::EVENT {
                        let (id, event) = event_from_element(ev, &p)?;
                        ocel.events.insert(id, event);
                    }
                }
            }
            tags::OBJECTS => {
                for (p, ob) in c.children_with_paths(&p) {
                    if ob.name == tags::OBJECT {
                        let (id, object) = object_from_element(ob, &p)?;
                        ocel.objects.insert(id, object);
                    }
                }
            }
            _ => {}
        }
    }
    Ok(ocel)
}

///
/// Import an [`OCEL`] from an XML file given by a filepath
///
/// The file is validated before parsing.
///
pub fn import_ocel_xml_from_path<P: AsRef<Path>>(path: P) -> Result<OCEL, OCELIOError> {
    let xml = std::fs::read_to_string(path)?;
    XmlOCEL::deserialize(&xml, true)
}

///
/// Import an [`OCEL`] from an XML byte slice
///
/// The input is validated before parsing.
///
pub fn import_ocel_xml_slice(xml_data: &[u8]) -> Result<OCEL, OCELIOError> {
    let xml = std::str::from_utf8(xml_data)
        .map_err(|e| OCELIOError::MalformedInput(format!("invalid UTF-8: {e}")))?;
    XmlOCEL::deserialize(xml, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event_data::object_centric::ocel_xml::xml_tree::parse_xml_tree;

    #[test]
    fn lenient_dates_and_nested_values() {
        let xml = r#"<log>
            <events>
                <event>
                    <string key="id" value="e1"/>
                    <string key="activity" value="a"/>
                    <date key="timestamp" value="2023-10-06 09:30:21"/>
                    <list key="omap"><string key="object-id" value="o1"/></list>
                    <list key="vmap">
                        <list key="l"><int key="0" value="1"/><map key="1"><boolean key="b" value="true"/></map></list>
                        <float key="f" value="NaN"/>
                    </list>
                </event>
            </events>
            <objects>
                <object>
                    <string key="id" value="o1"/>
                    <string key="type" value="t"/>
                    <list key="ovmap"/>
                </object>
            </objects>
        </log>"#;
        let ocel = ocel_from_xml_tree(&parse_xml_tree(xml).unwrap()).unwrap();
        let ev = ocel.events.get("e1").unwrap();
        assert_eq!(ev.timestamp.offset().local_minus_utc(), 0);
        assert_eq!(ev.object_refs, vec!["o1".to_string()]);
        let nested: Attributes = [("b", OCELValue::from(true))].into_iter().collect();
        assert_eq!(
            ev.attributes.get("l"),
            Some(&OCELValue::List(vec![
                OCELValue::Integer(1),
                OCELValue::Map(nested)
            ]))
        );
        assert!(ev.attributes.get("f").unwrap().try_as_float().unwrap().is_nan());
        assert!(ocel.is_valid());
    }

    #[test]
    fn unknown_value_element_is_unsupported() {
        let xml = r#"<log><global scope="log"><blob key="x" value="1"/></global><events/><objects/></log>"#;
        let res = ocel_from_xml_tree(&parse_xml_tree(xml).unwrap());
        assert!(matches!(res, Err(OCELIOError::UnsupportedValueType(_))));
    }
}
