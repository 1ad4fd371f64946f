//! Convenient Macros for Creating Object-centric Event Data
/// Creates an [`OCEL`] containing the given events and the objects they reference.
///
/// `ocel!` allows `OCEL`s to be defined with a list of events and their object references.
/// Each event is a tuple that contains as first entry the activity and as second entry the
/// referenced objects as a list of object identifiers. Object identifiers have to be
/// denoted '`ob_type`':'`ob_id`'.
///
/// Events get the IDs `ev:1`, `ev:2`, ... and are one second apart, starting at 2020-01-01 00:00:00 UTC.
/// Every referenced object is created once (without attributes), so the resulting log is always valid.
///
/// See the example below, containing two events: ev:1 and ev:2 with activities "place" and "pack",
/// respectively. 'ev:1' references 'c:1' with object type 'c' (e.g., customer), 'o:1' with object
/// type 'o' (e.g., order), and 'i:1', 'i:2' with object type 'i' (e.g., item).
///
/// ```
/// use ocel::ocel;
///
/// let object_centric_event_log = ocel![
///     ("place", ["c:1", "o:1", "i:1", "i:2"]),
///     ("pack", ["o:1", "i:2", "e:1"]),
/// ];
/// assert_eq!(object_centric_event_log.events.len(), 2);
/// assert_eq!(object_centric_event_log.objects.len(), 5);
/// assert!(object_centric_event_log.is_valid());
/// ```
///
/// [`OCEL`]: crate::core::OCEL
#[macro_export]
macro_rules! ocel {
    ($(($activity:expr, [$($object:expr),* $(,)?])),* $(,)?) => {{
        use $crate::core::chrono::{DateTime, TimeDelta, Utc};
        use $crate::core::event_data::object_centric::{Attributes, OCELEvent, OCELObject, OCEL};

        let mut ocel = OCEL::default();
        // 2020-01-01 00:00:00 UTC
        #[allow(unused_mut, unused_variables)]
        let mut timestamp = DateTime::<Utc>::UNIX_EPOCH + TimeDelta::days(18262);
        #[allow(unused_mut, unused_variables)]
        let mut ev_counter = 0;
        $(
            let mut object_refs: Vec<String> = Vec::new();
            $(
                let object_id = $object.to_string();
                if !ocel.objects.contains_key(&object_id) {
                    let object_type = object_id.split(':').next().unwrap_or_default().to_string();
                    ocel.objects.insert(
                        object_id.clone(),
                        OCELObject::new(object_type, Attributes::new()),
                    );
                }
                object_refs.push(object_id);
            )*

            ev_counter += 1;
            ocel.events.insert(
                format!("ev:{}", ev_counter),
                OCELEvent::new(
                    $activity.to_string(),
                    timestamp.fixed_offset(),
                    object_refs,
                    Attributes::new(),
                ),
            );
            timestamp = timestamp + TimeDelta::seconds(1);
        )*
        ocel
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn events_and_objects_are_derived() {
        let ocel = crate::ocel![
            ("place", ["c:1", "o:1", "i:1"]),
            ("pack", ["o:1", "i:1", "i:1"]),
        ];
        assert_eq!(ocel.events.keys().collect::<Vec<_>>(), vec!["ev:1", "ev:2"]);
        assert_eq!(ocel.objects.len(), 3);
        assert_eq!(ocel.objects.get("i:1").unwrap().object_type, "i");
        let pack = ocel.events.get("ev:2").unwrap();
        assert_eq!(pack.object_refs, vec!["o:1", "i:1", "i:1"]);
        assert_eq!(
            pack.timestamp - ocel.events.get("ev:1").unwrap().timestamp,
            chrono::TimeDelta::seconds(1)
        );
        assert_eq!(
            ocel.ordered_events()[0].1.timestamp.to_rfc3339(),
            "2020-01-01T00:00:00+00:00"
        );
    }
}
