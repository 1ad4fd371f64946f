use std::{fs::File, io::Write, path::Path};

use quick_xml::{
    events::{BytesDecl, BytesEnd, BytesStart, Event},
    Writer,
};

use crate::{
    core::event_data::object_centric::{
        codec::{check_reserved_global_keys, Formatting},
        io::OCELIOError,
        ocel_struct::{Attributes, OCELValue, OCEL},
    },
    utils::xml_utils::XMLWriterWrapper,
};

use super::{fields, tags};

/// Value written for the default activity / type of the `event` and `object` scopes
const INVALID_DEFAULT: &str = "__INVALID__";

fn write_scalar<W: Write>(
    w: &mut Writer<W>,
    tag: &str,
    key: &str,
    value: &str,
) -> Result<(), OCELIOError> {
    w.write_event(Event::Empty(
        BytesStart::new(tag).with_attributes([("key", key), ("value", value)]),
    ))?;
    Ok(())
}

fn write_container<W: Write>(
    w: &mut Writer<W>,
    tag: &str,
    key: &str,
    inner: impl FnOnce(&mut Writer<W>) -> Result<(), OCELIOError>,
) -> Result<(), OCELIOError> {
    w.write_event(Event::Start(
        BytesStart::new(tag).with_attributes([("key", key)]),
    ))?;
    inner(w)?;
    w.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn write_value<W: Write>(w: &mut Writer<W>, key: &str, value: &OCELValue) -> Result<(), OCELIOError> {
    match value {
        OCELValue::String(s) => write_scalar(w, tags::STRING, key, s),
        OCELValue::Timestamp(dt) => write_scalar(w, tags::DATE, key, &dt.to_rfc3339()),
        OCELValue::Integer(i) => write_scalar(w, tags::INT, key, &i.to_string()),
        OCELValue::Float(f) => write_scalar(w, tags::FLOAT, key, &f.to_string()),
        OCELValue::Boolean(b) => write_scalar(w, tags::BOOLEAN, key, &b.to_string()),
        OCELValue::List(items) => write_container(w, tags::LIST, key, |w| {
            for (i, item) in items.iter().enumerate() {
                write_value(w, &i.to_string(), item)?;
            }
            Ok(())
        }),
        OCELValue::Map(m) => write_container(w, tags::MAP, key, |w| write_attributes(w, m)),
    }
}

fn write_attributes<W: Write>(w: &mut Writer<W>, attributes: &Attributes) -> Result<(), OCELIOError> {
    for (k, v) in attributes {
        write_value(w, k, v)?;
    }
    Ok(())
}

fn write_string_list<W: Write>(
    w: &mut Writer<W>,
    key: &str,
    item_key: &str,
    mut items: Vec<String>,
) -> Result<(), OCELIOError> {
    items.sort();
    write_container(w, tags::LIST, key, |w| {
        for item in &items {
            write_scalar(w, tags::STRING, item_key, item)?;
        }
        Ok(())
    })
}

fn write_global<W: Write>(
    w: &mut Writer<W>,
    scope: &str,
    inner: impl FnOnce(&mut Writer<W>) -> Result<(), OCELIOError>,
) -> Result<(), OCELIOError> {
    w.write_event(Event::Start(
        BytesStart::new(tags::GLOBAL).with_attributes([("scope", scope)]),
    ))?;
    inner(w)?;
    w.write_event(Event::End(BytesEnd::new(tags::GLOBAL)))?;
    Ok(())
}

fn write_section<W: Write>(
    w: &mut Writer<W>,
    tag: &str,
    inner: impl FnOnce(&mut Writer<W>) -> Result<(), OCELIOError>,
) -> Result<(), OCELIOError> {
    w.write_event(Event::Start(BytesStart::new(tag)))?;
    inner(w)?;
    w.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

///
/// Export an [`OCEL`] to an XML Writer
///
/// Indentation is controlled by the passed writer (see [`quick_xml::Writer::new_with_indent`]).
/// Fails before writing anything if a global attribute uses the name of a derived global-log entry.
///
pub fn export_ocel_xml<'b, W>(
    writer: impl Into<XMLWriterWrapper<'b, W>>,
    ocel: &OCEL,
) -> Result<(), OCELIOError>
where
    W: Write + 'b,
{
    check_reserved_global_keys(ocel)?;
    let mut xml_writer = writer.into();
    let w: &mut Writer<W> = xml_writer.to_xml_writer();
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write_section(w, tags::LOG, |w| {
        write_global(w, "event", |w| {
            write_scalar(w, tags::STRING, fields::ACTIVITY, INVALID_DEFAULT)
        })?;
        write_global(w, "object", |w| {
            write_scalar(w, tags::STRING, fields::TYPE, INVALID_DEFAULT)
        })?;
        write_global(w, "log", |w| {
            write_string_list(
                w,
                fields::ATTRIBUTE_NAMES,
                "attribute-name",
                ocel.attribute_names().into_iter().collect(),
            )?;
            write_string_list(
                w,
                fields::OBJECT_TYPES,
                "object-type",
                ocel.object_types().into_iter().collect(),
            )?;
            write_attributes(w, &ocel.global_attributes)
        })?;
        write_section(w, tags::EVENTS, |w| {
            for (id, ev) in &ocel.events {
                write_section(w, tags::EVENT, |w| {
                    write_scalar(w, tags::STRING, fields::ID, id)?;
                    write_scalar(w, tags::STRING, fields::ACTIVITY, &ev.activity)?;
                    write_scalar(w, tags::DATE, fields::TIMESTAMP, &ev.timestamp.to_rfc3339())?;
                    write_container(w, tags::LIST, fields::OMAP, |w| {
                        for o in &ev.object_refs {
                            write_scalar(w, tags::STRING, "object-id", o)?;
                        }
                        Ok(())
                    })?;
                    write_container(w, tags::LIST, fields::VMAP, |w| {
                        write_attributes(w, &ev.attributes)
                    })
                })?;
            }
            Ok(())
        })?;
        write_section(w, tags::OBJECTS, |w| {
            for (id, ob) in &ocel.objects {
                write_section(w, tags::OBJECT, |w| {
                    write_scalar(w, tags::STRING, fields::ID, id)?;
                    write_scalar(w, tags::STRING, fields::TYPE, &ob.object_type)?;
                    write_container(w, tags::LIST, fields::OVMAP, |w| {
                        write_attributes(w, &ob.attributes)
                    })
                })?;
            }
            Ok(())
        })
    })?;
    Ok(())
}

///
/// Create an XML writer for the given [`Formatting`]
///
pub(crate) fn formatted_writer<W: Write>(inner: W, formatting: Formatting) -> Writer<W> {
    match formatting {
        Formatting::Compact => Writer::new(inner),
        Formatting::Indented => Writer::new_with_indent(inner, b' ', 2),
    }
}

///
/// Export an [`OCEL`] to an (indented) XML file at the specified path
///
pub fn export_ocel_xml_path<P: AsRef<Path>>(ocel: &OCEL, path: P) -> Result<(), OCELIOError> {
    let file = std::io::BufWriter::new(File::create(path)?);
    let mut writer = formatted_writer(file, Formatting::Indented);
    export_ocel_xml(&mut writer, ocel)?;
    writer.into_inner().flush()?;
    Ok(())
}
