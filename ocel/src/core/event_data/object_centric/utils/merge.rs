//! Merging of [`OCEL`]s and collapsing of duplicate objects
use std::collections::HashMap;

use crate::core::event_data::object_centric::{
    indexed_map::IndexedMap,
    ocel_struct::{Attributes, OCEL},
};

/// Key-union of two maps where entries of `a` win on collisions
fn left_biased_union<V: Clone>(a: &IndexedMap<V>, b: &IndexedMap<V>) -> IndexedMap<V> {
    let mut res = a.clone();
    for (k, v) in b {
        if !res.contains_key(k) {
            res.insert(k.clone(), v.clone());
        }
    }
    res
}

///
/// Merge two [`OCEL`]s
///
/// Global attributes, events and objects are merged separately.
/// On an ID collision the entry of `a` is kept and the one of `b` is discarded entirely.
/// Entries of `a` come first (in their order), followed by the new entries of `b`.
///
pub fn merge_ocels(a: &OCEL, b: &OCEL) -> OCEL {
    OCEL {
        global_attributes: left_biased_union(&a.global_attributes, &b.global_attributes),
        events: left_biased_union(&a.events, &b.events),
        objects: left_biased_union(&a.objects, &b.objects),
    }
}

///
/// Collapse structurally equal objects
///
/// Objects with the same type and the same attributes are replaced by the first of them
/// (in object order). Object references of events are rewritten to that surviving object.
///
pub fn merge_duplicate_objects(ocel: &OCEL) -> OCEL {
    // First pass: assign a survivor to every object
    let mut survivors: HashMap<(&str, &Attributes), &str> = HashMap::new();
    let mut replaced_by: HashMap<&str, &str> = HashMap::new();
    for (id, ob) in &ocel.objects {
        let survivor = *survivors
            .entry((ob.object_type.as_str(), &ob.attributes))
            .or_insert(id.as_str());
        if survivor != id {
            replaced_by.insert(id.as_str(), survivor);
        }
    }
    log::debug!(
        "Collapsing {} duplicate objects into {} distinct objects",
        replaced_by.len(),
        survivors.len()
    );

    // Second pass: rewrite references and drop replaced objects
    let events = ocel
        .events
        .iter()
        .map(|(id, ev)| {
            let mut ev = ev.clone();
            for o in ev.object_refs.iter_mut() {
                if let Some(survivor) = replaced_by.get(o.as_str()) {
                    *o = survivor.to_string();
                }
            }
            (id.clone(), ev)
        })
        .collect();
    let objects = ocel
        .objects
        .iter()
        .filter(|(id, _)| !replaced_by.contains_key(id.as_str()))
        .map(|(id, ob)| (id.clone(), ob.clone()))
        .collect();
    OCEL {
        global_attributes: ocel.global_attributes.clone(),
        events,
        objects,
    }
}

impl OCEL {
    ///
    /// Merge this [`OCEL`] with another one, returning a new [`OCEL`]
    ///
    /// Entries of `self` win on ID collisions. See [`merge_ocels`].
    ///
    /// ```rust
    /// use ocel::core::event_data::object_centric::{OCELObject, OCELValue, Attributes, OCEL};
    /// let mut a = OCEL::default();
    /// a.objects.insert("o1", OCELObject::new("order", Attributes::new()));
    /// let mut b = OCEL::default();
    /// b.objects.insert("o1", OCELObject::new("item", Attributes::new()));
    /// b.objects.insert("o2", OCELObject::new("item", Attributes::new()));
    /// let merged = a.merge_with(&b);
    /// assert_eq!(merged.objects.len(), 2);
    /// assert_eq!(merged.objects.get("o1").unwrap().object_type, "order");
    /// ```
    pub fn merge_with(&self, other: &OCEL) -> OCEL {
        merge_ocels(self, other)
    }

    ///
    /// Collapse structurally equal objects, returning a new [`OCEL`]
    ///
    /// See [`merge_duplicate_objects`].
    ///
    pub fn merge_duplicate_objects(&self) -> OCEL {
        merge_duplicate_objects(self)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, FixedOffset, TimeZone, Utc};

    use crate::core::event_data::object_centric::{OCELEvent, OCELObject, OCELValue};

    use super::*;

    fn ts(days: u32) -> DateTime<FixedOffset> {
        Utc.with_ymd_and_hms(2023, 3, 1 + days, 9, 0, 0)
            .unwrap()
            .fixed_offset()
    }

    fn event(activity: &str, days: u32, refs: &[&str]) -> OCELEvent {
        OCELEvent::new(activity, ts(days), refs.iter().copied(), Attributes::new())
    }

    #[test]
    fn merge_is_left_biased() {
        let mut a = OCEL::default();
        a.global_attributes
            .insert("ordering", OCELValue::from("timestamp"));
        a.events.insert("e1", event("Activity 1", 0, &["o1"]));
        a.events.insert("e2", event("Activity 2", 1, &["o1"]));
        a.objects
            .insert("o1", OCELObject::new("Object", Attributes::new()));

        let mut b = OCEL::default();
        b.global_attributes
            .insert("ordering", OCELValue::from("other"));
        b.global_attributes.insert("version", OCELValue::from("1.0"));
        b.events.insert("e1", event("Different", 5, &["o1"]));
        b.events.insert("e3", event("Activity 2", 1, &["o1"]));
        b.objects
            .insert("o1", OCELObject::new("Object", Attributes::new()));

        let merged = a.merge_with(&b);
        assert_eq!(
            merged.global_attributes.keys().collect::<Vec<_>>(),
            vec!["ordering", "version"]
        );
        assert_eq!(
            merged.global_attributes.get("ordering"),
            Some(&OCELValue::from("timestamp"))
        );
        assert_eq!(
            merged.events.keys().collect::<Vec<_>>(),
            vec!["e1", "e2", "e3"]
        );
        assert_eq!(merged.events.get("e1").unwrap().activity, "Activity 1");
        assert_eq!(merged.objects.len(), 1);
        // inputs are untouched
        assert_eq!(a.events.len(), 2);
        assert_eq!(b.events.get("e1").unwrap().activity, "Different");
    }

    #[test]
    fn duplicates_collapse_to_first_object() {
        let attrs = || {
            [
                ("test", OCELValue::from("some string")),
                ("test2", OCELValue::from(123_i64)),
            ]
        };
        let mut ocel = OCEL::default();
        ocel.events.insert("e1", event("Activity 1", 0, &["o1"]));
        ocel.events
            .insert("e2", event("Activity 2", 0, &["o1-duplicate"]));
        ocel.objects.insert("o1", OCELObject::new("Object", attrs()));
        ocel.objects
            .insert("o1-duplicate", OCELObject::new("Object", attrs()));

        let mut expected = OCEL::default();
        expected.events.insert("e1", event("Activity 1", 0, &["o1"]));
        expected.events.insert("e2", event("Activity 2", 0, &["o1"]));
        expected
            .objects
            .insert("o1", OCELObject::new("Object", attrs()));

        let res = ocel.merge_duplicate_objects();
        assert_eq!(res, expected);
        assert!(res.is_valid());
        assert_eq!(ocel.objects.len(), 2);
    }

    #[test]
    fn attribute_order_and_type_matter_as_expected() {
        let mut ocel = OCEL::default();
        ocel.events
            .insert("e1", event("A", 0, &["a", "b", "c", "d"]));
        ocel.objects.insert(
            "a",
            OCELObject::new("T", [("x", OCELValue::from(1_i64)), ("y", OCELValue::from(2_i64))]),
        );
        // same attributes in a different order
        ocel.objects.insert(
            "b",
            OCELObject::new("T", [("y", OCELValue::from(2_i64)), ("x", OCELValue::from(1_i64))]),
        );
        // same attributes, other type
        ocel.objects.insert(
            "c",
            OCELObject::new("U", [("x", OCELValue::from(1_i64)), ("y", OCELValue::from(2_i64))]),
        );
        // float instead of integer
        ocel.objects.insert(
            "d",
            OCELObject::new("T", [("x", OCELValue::from(1.0)), ("y", OCELValue::from(2_i64))]),
        );
        let res = merge_duplicate_objects(&ocel);
        assert_eq!(res.objects.keys().collect::<Vec<_>>(), vec!["a", "c", "d"]);
        assert_eq!(
            res.events.get("e1").unwrap().object_refs,
            vec!["a", "a", "c", "d"]
        );
    }
}
