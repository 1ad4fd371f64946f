//! Conversion between object references and inline event attributes
use std::collections::{HashMap, HashSet};

use crate::core::event_data::object_centric::{
    indexed_map::IndexedMap,
    ocel_struct::{Attributes, OCELObject, OCELValue, OCEL},
};

///
/// Inline objects of the given types into the events referencing them
///
/// For each reference of an event to an object of a selected type, the reference is removed
/// and an event attribute named after the object type is added:
///
/// - if the object has exactly one attribute, its __value__ (the attribute name is dropped)
/// - otherwise, a [`OCELValue::Map`] of all object attributes
///
/// If an event references several objects of the same type, the last reference wins.
/// All objects of the selected types are removed, also unreferenced ones.
///
pub fn convert_objects_to_attributes<S: AsRef<str>>(
    ocel: &OCEL,
    object_types: impl IntoIterator<Item = S>,
) -> OCEL {
    let selected: HashSet<String> = object_types
        .into_iter()
        .map(|t| t.as_ref().to_string())
        .collect();
    let is_converted = |o: &OCELObject| selected.contains(&o.object_type);

    let events = ocel
        .events
        .iter()
        .map(|(id, ev)| {
            let mut ev = ev.clone();
            let mut kept_refs = Vec::with_capacity(ev.object_refs.len());
            for o_id in std::mem::take(&mut ev.object_refs) {
                match ocel.objects.get(&o_id).filter(|o| is_converted(o)) {
                    Some(o) => {
                        let value = if o.attributes.len() == 1 {
                            o.attributes.values().next().cloned()
                        } else {
                            None
                        }
                        .unwrap_or_else(|| OCELValue::Map(o.attributes.clone()));
                        ev.attributes.insert(o.object_type.clone(), value);
                    }
                    None => kept_refs.push(o_id),
                }
            }
            ev.object_refs = kept_refs;
            (id.clone(), ev)
        })
        .collect();
    let objects: IndexedMap<OCELObject> = ocel
        .objects
        .iter()
        .filter(|(_, o)| !is_converted(o))
        .map(|(id, o)| (id.clone(), o.clone()))
        .collect();
    log::debug!(
        "Converted {} objects to event attributes",
        ocel.objects.len() - objects.len()
    );
    OCEL {
        global_attributes: ocel.global_attributes.clone(),
        events,
        objects,
    }
}

///
/// Attributes of an object created from the event attribute `key`
///
/// Map values are used as they are; any other value becomes the only attribute,
/// named like the attribute (and thus the object type).
///
fn object_attributes(key: &str, value: OCELValue) -> Attributes {
    match value {
        OCELValue::Map(m) => m,
        other => [(key, other)].into_iter().collect(),
    }
}

/// First ID of the form `base`, `base#2`, `base#3`, ... not contained in `taken`
fn fresh_id(base: String, taken: &IndexedMap<OCELObject>) -> String {
    if !taken.contains_key(&base) {
        return base;
    }
    let mut n = 2;
    loop {
        let id = format!("{base}#{n}");
        if !taken.contains_key(&id) {
            return id;
        }
        n += 1;
    }
}

///
/// Extract event attributes with the given names into objects
///
/// Each selected attribute is removed from its event and replaced by a reference to a new object
/// with the attribute name as object type. Map values become the attributes of the object,
/// other values its only attribute (again named like the event attribute).
/// New objects get the ID `<event id>:<attribute name>`.
///
/// New objects with the same type and attributes are created only once and shared by all events.
/// Objects already contained in the log are never reused or modified.
///
pub fn convert_attributes_to_objects<S: AsRef<str>>(
    ocel: &OCEL,
    attribute_names: impl IntoIterator<Item = S>,
) -> OCEL {
    let selected: HashSet<String> = attribute_names
        .into_iter()
        .map(|n| n.as_ref().to_string())
        .collect();

    let mut objects = ocel.objects.clone();
    let mut created: HashMap<(String, Attributes), String> = HashMap::new();
    let mut created_count = 0;
    let events = ocel
        .events
        .iter()
        .map(|(ev_id, ev)| {
            let mut ev = ev.clone();
            let keys: Vec<String> = ev
                .attributes
                .keys()
                .filter(|k| selected.contains(k.as_str()))
                .cloned()
                .collect();
            for key in keys {
                let Some(value) = ev.attributes.remove(&key) else {
                    continue;
                };
                let attributes = object_attributes(&key, value);
                let o_id = created
                    .entry((key.clone(), attributes))
                    .or_insert_with_key(|(object_type, attributes)| {
                        let id = fresh_id(format!("{ev_id}:{object_type}"), &objects);
                        objects.insert(
                            id.clone(),
                            OCELObject {
                                object_type: object_type.clone(),
                                attributes: attributes.clone(),
                            },
                        );
                        created_count += 1;
                        id
                    })
                    .clone();
                ev.object_refs.push(o_id);
            }
            (ev_id.clone(), ev)
        })
        .collect();
    log::debug!("Converted event attributes to {created_count} new objects");
    OCEL {
        global_attributes: ocel.global_attributes.clone(),
        events,
        objects,
    }
}

impl OCEL {
    ///
    /// Inline all objects of the given types as event attributes, returning a new [`OCEL`]
    ///
    /// See [`convert_objects_to_attributes`].
    ///
    pub fn convert_objects_to_attributes<S: AsRef<str>>(
        &self,
        object_types: impl IntoIterator<Item = S>,
    ) -> OCEL {
        convert_objects_to_attributes(self, object_types)
    }

    ///
    /// Extract the given event attributes into (shared) objects, returning a new [`OCEL`]
    ///
    /// See [`convert_attributes_to_objects`].
    ///
    pub fn convert_attributes_to_objects<S: AsRef<str>>(
        &self,
        attribute_names: impl IntoIterator<Item = S>,
    ) -> OCEL {
        convert_attributes_to_objects(self, attribute_names)
    }
}
