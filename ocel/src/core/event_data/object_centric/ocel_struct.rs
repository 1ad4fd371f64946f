use std::{
    collections::HashSet,
    fmt::Display,
    hash::{Hash, Hasher},
};

use chrono::{DateTime, FixedOffset};
use itertools::Itertools;
use ordered_float::OrderedFloat;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::indexed_map::IndexedMap;

///
/// Attributes of an event, object or of the whole log
///
/// Maps attribute names to [`OCELValue`]s, keeping insertion order for stable serialization.
///
/// Null values have no representation: use [`AttributesExt::from_nullable`] to build attributes
/// from optional values, which drops all `None` entries.
///
pub type Attributes = IndexedMap<OCELValue>;

///
/// Attribute values of an object-centric event log
///
/// A closed, recursive set of value kinds: scalars plus ordered lists and keyed maps,
/// which can be nested to arbitrary depth.
///
/// Tip: If you know the expected [`OCELValue`] type, make use of the `try_as_xxx` functions (e.g., [`OCELValue::try_as_string`])
///
/// ```rust
/// use ocel::core::event_data::object_centric::OCELValue;
/// let v = OCELValue::from(42.0);
/// assert_eq!(v.try_as_float(), Some(&42.0));
/// ```
///
/// _Equality_: Floats are compared by exact value (with `NaN` being equal to itself),
/// timestamps are equal only if both the instant _and_ the UTC offset match,
/// and maps are compared as sets of key/value pairs.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum OCELValue {
    /// String
    String(String),
    /// Timestamp (with UTC offset)
    Timestamp(DateTime<FixedOffset>),
    /// Integer
    Integer(i64),
    /// Float
    Float(f64),
    /// Boolean
    Boolean(bool),
    /// Ordered list of values
    List(Vec<OCELValue>),
    /// Named values
    Map(Attributes),
}

impl PartialEq for OCELValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (OCELValue::String(a), OCELValue::String(b)) => a == b,
            (OCELValue::Timestamp(a), OCELValue::Timestamp(b)) => {
                a == b && a.offset() == b.offset()
            }
            (OCELValue::Integer(a), OCELValue::Integer(b)) => a == b,
            (OCELValue::Float(a), OCELValue::Float(b)) => OrderedFloat(*a) == OrderedFloat(*b),
            (OCELValue::Boolean(a), OCELValue::Boolean(b)) => a == b,
            (OCELValue::List(a), OCELValue::List(b)) => a == b,
            (OCELValue::Map(a), OCELValue::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for OCELValue {}

impl Hash for OCELValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            OCELValue::String(value) => value.hash(state),
            OCELValue::Timestamp(value) => {
                value.hash(state);
                value.offset().local_minus_utc().hash(state);
            }
            OCELValue::Integer(value) => value.hash(state),
            OCELValue::Float(value) => OrderedFloat(*value).hash(state),
            OCELValue::Boolean(value) => value.hash(state),
            OCELValue::List(value) => value.hash(state),
            OCELValue::Map(value) => value.hash(state),
        }
    }
}

impl Display for OCELValue {
    /// Get String representation of an [`OCELValue`]
    ///
    /// Timestamps are printed as RFC 3339. For lists and maps, a debug representation string is returned.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OCELValue::String(s) => write!(f, "{s}"),
            OCELValue::Timestamp(dt) => write!(f, "{}", dt.to_rfc3339()),
            OCELValue::Integer(i) => write!(f, "{i}"),
            OCELValue::Float(x) => write!(f, "{x}"),
            OCELValue::Boolean(b) => write!(f, "{b}"),
            OCELValue::List(l) => write!(f, "{l:?}"),
            OCELValue::Map(m) => write!(f, "{m:?}"),
        }
    }
}

impl OCELValue {
    ///
    /// Name of the value kind (e.g., `"integer"`)
    ///
    /// These names are used as type tags in serialized documents.
    ///
    pub fn type_name(&self) -> &'static str {
        match self {
            OCELValue::String(_) => "string",
            OCELValue::Timestamp(_) => "timestamp",
            OCELValue::Integer(_) => "integer",
            OCELValue::Float(_) => "float",
            OCELValue::Boolean(_) => "boolean",
            OCELValue::List(_) => "list",
            OCELValue::Map(_) => "map",
        }
    }

    /// Returns `Some()` of inner value if value is of variant [`OCELValue::String`] and `None` otherwise
    pub fn try_as_string(&self) -> Option<&String> {
        match self {
            OCELValue::String(v) => Some(v),
            _ => None,
        }
    }

    /// Returns `Some()` of inner value if value is of variant [`OCELValue::Timestamp`] and `None` otherwise
    pub fn try_as_timestamp(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            OCELValue::Timestamp(v) => Some(v),
            _ => None,
        }
    }

    /// Returns `Some()` of inner value if value is of variant [`OCELValue::Integer`] and `None` otherwise
    pub fn try_as_integer(&self) -> Option<&i64> {
        match self {
            OCELValue::Integer(v) => Some(v),
            _ => None,
        }
    }

    /// Returns `Some()` of inner value if value is of variant [`OCELValue::Float`] and `None` otherwise
    pub fn try_as_float(&self) -> Option<&f64> {
        match self {
            OCELValue::Float(v) => Some(v),
            _ => None,
        }
    }

    /// Returns `Some()` of inner value if value is of variant [`OCELValue::Boolean`] and `None` otherwise
    pub fn try_as_bool(&self) -> Option<&bool> {
        match self {
            OCELValue::Boolean(v) => Some(v),
            _ => None,
        }
    }

    /// Returns `Some()` of inner value if value is of variant [`OCELValue::List`] and `None` otherwise
    pub fn try_as_list(&self) -> Option<&Vec<OCELValue>> {
        match self {
            OCELValue::List(v) => Some(v),
            _ => None,
        }
    }

    /// Returns `Some()` of inner value if value is of variant [`OCELValue::Map`] and `None` otherwise
    pub fn try_as_map(&self) -> Option<&Attributes> {
        match self {
            OCELValue::Map(v) => Some(v),
            _ => None,
        }
    }

    /// Collect all map keys contained in this value (recursively, including maps nested in lists)
    fn collect_nested_keys(&self, names: &mut HashSet<String>) {
        match self {
            OCELValue::List(l) => l.iter().for_each(|v| v.collect_nested_keys(names)),
            OCELValue::Map(m) => collect_attribute_names(m, names),
            _ => {}
        }
    }
}

impl From<&str> for OCELValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for OCELValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl<T> From<DateTime<T>> for OCELValue
where
    T: chrono::TimeZone,
{
    fn from(value: DateTime<T>) -> Self {
        Self::Timestamp(value.fixed_offset())
    }
}

impl From<i64> for OCELValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for OCELValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for OCELValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<Vec<OCELValue>> for OCELValue {
    fn from(value: Vec<OCELValue>) -> Self {
        Self::List(value)
    }
}

impl From<Attributes> for OCELValue {
    fn from(value: Attributes) -> Self {
        Self::Map(value)
    }
}

///
/// Construction helpers for [`Attributes`]
///
pub trait AttributesExt {
    ///
    /// Build attributes from possibly-absent values
    ///
    /// Entries with a `None` value are dropped, as absent values are never stored.
    ///
    /// ```rust
    /// use ocel::core::event_data::object_centric::{Attributes, AttributesExt, OCELValue};
    /// let attrs = Attributes::from_nullable([("a", Some(OCELValue::from(1_i64))), ("b", None)]);
    /// assert_eq!(attrs.len(), 1);
    /// ```
    fn from_nullable<K, V, I>(iter: I) -> Self
    where
        K: Into<String>,
        V: Into<Option<OCELValue>>,
        I: IntoIterator<Item = (K, V)>;
}

impl AttributesExt for Attributes {
    fn from_nullable<K, V, I>(iter: I) -> Self
    where
        K: Into<String>,
        V: Into<Option<OCELValue>>,
        I: IntoIterator<Item = (K, V)>,
    {
        iter.into_iter()
            .filter_map(|(k, v)| v.into().map(|v| (k.into(), v)))
            .collect()
    }
}

fn collect_attribute_names(attrs: &Attributes, names: &mut HashSet<String>) {
    for (k, v) in attrs {
        names.insert(k.clone());
        v.collect_nested_keys(names);
    }
}

///
/// OCEL Event
///
/// The ID of an event is the key under which it is stored in [`OCEL::events`].
///
/// _Equality_: as for [`OCELValue::Timestamp`], timestamps must agree in both instant and UTC offset.
///
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OCELEvent {
    /// Activity (i.e., the event type)
    pub activity: String,
    /// DateTime when event occured
    pub timestamp: DateTime<FixedOffset>,
    /// IDs of referenced [`OCELObject`]s (duplicates are kept)
    #[serde(default)]
    pub object_refs: Vec<String>,
    /// Event attributes
    #[serde(default)]
    pub attributes: Attributes,
}

impl PartialEq for OCELEvent {
    fn eq(&self, other: &Self) -> bool {
        self.activity == other.activity
            && self.timestamp == other.timestamp
            && self.timestamp.offset() == other.timestamp.offset()
            && self.object_refs == other.object_refs
            && self.attributes == other.attributes
    }
}

impl Eq for OCELEvent {}

impl Hash for OCELEvent {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.activity.hash(state);
        self.timestamp.hash(state);
        self.timestamp.offset().local_minus_utc().hash(state);
        self.object_refs.hash(state);
        self.attributes.hash(state);
    }
}

impl OCELEvent {
    ///
    /// Create a new event
    ///
    /// Attributes with a `None` value are dropped.
    ///
    pub fn new<K, V>(
        activity: impl Into<String>,
        timestamp: DateTime<FixedOffset>,
        object_refs: impl IntoIterator<Item = impl Into<String>>,
        attributes: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<Option<OCELValue>>,
    {
        Self {
            activity: activity.into(),
            timestamp,
            object_refs: object_refs.into_iter().map(Into::into).collect(),
            attributes: Attributes::from_nullable(attributes),
        }
    }
}

///
/// OCEL Object
///
/// The ID of an object is the key under which it is stored in [`OCEL::objects`].
///
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct OCELObject {
    /// Object Type
    #[serde(rename = "type")]
    pub object_type: String,
    /// Object attributes
    #[serde(default)]
    pub attributes: Attributes,
}

impl OCELObject {
    ///
    /// Create a new object
    ///
    /// Attributes with a `None` value are dropped.
    ///
    pub fn new<K, V>(
        object_type: impl Into<String>,
        attributes: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<Option<OCELValue>>,
    {
        Self {
            object_type: object_type.into(),
            attributes: Attributes::from_nullable(attributes),
        }
    }
}

///
/// Object-centric Event Log
///
/// Consists of log-level (global) attributes, [`OCELEvent`]s and [`OCELObject`]s, each keyed by their unique ID.
/// Events reference a variable number of objects by ID.
///
/// An [`OCEL`] might reference objects which do not exist (i.e., it is not well-formed).
/// Such logs can still be constructed and inspected; use [`OCEL::is_valid`] to check.
///
/// All transformations (e.g., [`OCEL::merge_with`]) return a new [`OCEL`] and leave their inputs untouched.
///
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct OCEL {
    /// Global (log-level) attributes
    #[serde(default)]
    pub global_attributes: Attributes,
    /// Events contained in OCEL, keyed by event ID
    #[serde(default)]
    pub events: IndexedMap<OCELEvent>,
    /// Objects contained in OCEL, keyed by object ID
    #[serde(default)]
    pub objects: IndexedMap<OCELObject>,
}

impl OCEL {
    /// Create a new [`OCEL`] from its three mappings
    pub fn new(
        global_attributes: Attributes,
        events: IndexedMap<OCELEvent>,
        objects: IndexedMap<OCELObject>,
    ) -> Self {
        Self {
            global_attributes,
            events,
            objects,
        }
    }

    ///
    /// Check well-formedness: every object ID referenced by an event exists in [`OCEL::objects`]
    ///
    pub fn is_valid(&self) -> bool {
        self.events
            .values()
            .all(|e| e.object_refs.iter().all(|o| self.objects.contains_key(o)))
    }

    ///
    /// All (event ID, object ID) pairs where the event references a non-existing object
    ///
    /// Returned in event order. Empty if and only if [`OCEL::is_valid`] returns `true`.
    ///
    pub fn dangling_references(&self) -> Vec<(&str, &str)> {
        self.events
            .iter()
            .flat_map(|(e_id, e)| {
                e.object_refs
                    .iter()
                    .filter(|o| !self.objects.contains_key(o))
                    .map(move |o| (e_id.as_str(), o.as_str()))
            })
            .collect()
    }

    ///
    /// All attribute names used by events or objects
    ///
    /// Includes keys of nested map values (also inside lists).
    ///
    pub fn attribute_names(&self) -> HashSet<String> {
        let mut names = HashSet::new();
        for e in self.events.values() {
            collect_attribute_names(&e.attributes, &mut names);
        }
        for o in self.objects.values() {
            collect_attribute_names(&o.attributes, &mut names);
        }
        names
    }

    /// All distinct object types
    pub fn object_types(&self) -> HashSet<String> {
        self.objects
            .values()
            .map(|o| o.object_type.clone())
            .collect()
    }

    /// All distinct event activities
    pub fn activities(&self) -> HashSet<String> {
        self.events.values().map(|e| e.activity.clone()).collect()
    }

    ///
    /// All events sorted by timestamp (ascending)
    ///
    /// Events with the same timestamp are ordered by their ID.
    ///
    pub fn ordered_events(&self) -> Vec<(&String, &OCELEvent)> {
        self.events
            .iter()
            .sorted_by(|(a_id, a), (b_id, b)| {
                a.timestamp
                    .cmp(&b.timestamp)
                    .then_with(|| a_id.cmp(b_id))
            })
            .collect()
    }

    ///
    /// Resolve the objects referenced by the event with ID `event_id`
    ///
    /// References to missing objects are skipped. Returns `None` if the event does not exist.
    ///
    pub fn objects_of_event(&self, event_id: &str) -> Option<Vec<(&String, &OCELObject)>> {
        let ev = self.events.get(event_id)?;
        Some(
            ev.object_refs
                .iter()
                .filter_map(|o_id| self.objects.get(o_id).map(|o| (o_id, o)))
                .collect(),
        )
    }
}

///
/// JSON Schema of the in-memory [`OCEL`] model
///
/// This is the schema of the documents stored by the document-store codec.
///
pub fn ocel_document_schema() -> schemars::Schema {
    schemars::schema_for!(OCEL)
}

#[cfg(test)]
mod tests {
    use std::collections::hash_map::DefaultHasher;

    use chrono::{TimeZone, Utc};

    use super::*;

    fn hash_of<T: Hash>(t: &T) -> u64 {
        let mut h = DefaultHasher::new();
        t.hash(&mut h);
        h.finish()
    }

    fn ts(h: u32) -> DateTime<FixedOffset> {
        Utc.with_ymd_and_hms(2023, 1, 1, h, 0, 0).unwrap().fixed_offset()
    }

    #[test]
    fn event_equality_includes_utc_offset() {
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let a = OCELEvent::new("A", ts(10), ["o1"], Attributes::new());
        let mut b = a.clone();
        b.timestamp = ts(10).with_timezone(&plus_two);
        assert_eq!(a.timestamp, b.timestamp);
        assert_ne!(a, b);

        let c = a.clone();
        assert_eq!(a, c);
        assert_eq!(hash_of(&a), hash_of(&c));
    }

    #[test]
    fn null_values_are_dropped() {
        let ev = OCELEvent::new(
            "Activity 1",
            ts(0),
            ["o1"],
            [("prop1", None::<OCELValue>), ("prop2", None)],
        );
        let ob = OCELObject::new(
            "Object",
            [("prop1", None), ("prop2", Some(OCELValue::from(3_i64)))],
        );
        assert!(ev.attributes.is_empty());
        assert_eq!(ob.attributes.len(), 1);
    }

    #[test]
    fn float_and_timestamp_equality() {
        assert_eq!(OCELValue::Float(f64::NAN), OCELValue::Float(f64::NAN));
        assert_ne!(OCELValue::Float(1.0), OCELValue::Integer(1));
        assert_ne!(OCELValue::Float(1.0), OCELValue::Float(1.0 + f64::EPSILON));

        let utc = ts(10);
        let shifted = utc.with_timezone(&FixedOffset::east_opt(3600).unwrap());
        assert_eq!(utc, shifted);
        assert_ne!(OCELValue::Timestamp(utc), OCELValue::Timestamp(shifted));
        assert_eq!(OCELValue::Timestamp(utc), OCELValue::Timestamp(utc));
    }

    #[test]
    fn nested_map_hash_is_order_independent() {
        let a = OCELValue::List(vec![OCELValue::Map(
            [("x", OCELValue::from(1_i64)), ("y", OCELValue::from("s"))]
                .into_iter()
                .collect(),
        )]);
        let b = OCELValue::List(vec![OCELValue::Map(
            [("y", OCELValue::from("s")), ("x", OCELValue::from(1_i64))]
                .into_iter()
                .collect(),
        )]);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn well_formedness_flips_when_object_added() {
        let mut ocel = OCEL::default();
        ocel.events.insert(
            "e1",
            OCELEvent::new("A", ts(0), ["o1", "o2"], Attributes::new()),
        );
        ocel.objects
            .insert("o1", OCELObject::new("T", Attributes::new()));
        assert!(!ocel.is_valid());
        assert_eq!(ocel.dangling_references(), vec![("e1", "o2")]);

        ocel.objects
            .insert("o2", OCELObject::new("T", Attributes::new()));
        assert!(ocel.is_valid());
        assert!(ocel.dangling_references().is_empty());
    }

    #[test]
    fn attribute_names_include_nested_keys() {
        let mut ocel = OCEL::default();
        let nested: Attributes = [("inner", OCELValue::from(true))].into_iter().collect();
        ocel.events.insert(
            "e1",
            OCELEvent::new(
                "A",
                ts(0),
                Vec::<String>::new(),
                [
                    ("outer", OCELValue::Map(nested)),
                    ("list", OCELValue::List(vec![OCELValue::Map(
                        [("deep", OCELValue::from(1_i64))].into_iter().collect(),
                    )])),
                ],
            ),
        );
        ocel.objects
            .insert("o1", OCELObject::new("T", [("cost", OCELValue::from(2.5))]));
        let names = ocel.attribute_names();
        for n in ["outer", "inner", "list", "deep", "cost"] {
            assert!(names.contains(n), "missing {n}");
        }
        assert_eq!(names.len(), 5);
        assert_eq!(
            ocel.object_types(),
            HashSet::from(["T".to_string()])
        );
    }

    #[test]
    fn ordered_events_breaks_ties_by_id() {
        let mut ocel = OCEL::default();
        ocel.events
            .insert("e3", OCELEvent::new("A", ts(2), ["o"], Attributes::new()));
        ocel.events
            .insert("e2", OCELEvent::new("A", ts(1), ["o"], Attributes::new()));
        ocel.events
            .insert("e1", OCELEvent::new("A", ts(1), ["o"], Attributes::new()));
        let order: Vec<_> = ocel
            .ordered_events()
            .into_iter()
            .map(|(id, _)| id.as_str())
            .collect();
        assert_eq!(order, vec!["e1", "e2", "e3"]);
    }

    #[test]
    fn document_schema_describes_events() {
        let schema = serde_json::to_value(ocel_document_schema()).unwrap();
        assert!(schema["properties"]["events"].is_object());
        assert!(schema["properties"]["objects"].is_object());
    }
}
