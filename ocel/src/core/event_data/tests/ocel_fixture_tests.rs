use std::collections::HashSet;

use crate::{
    core::{
        event_data::object_centric::{
            Formatting, JsonOCEL, OCELCodec, OCELIOError, OCELValue, XmlOCEL, OCEL,
        },
        io::{Exportable, Importable},
    },
    utils::test_utils::get_test_data_path,
};

const MINIMAL_JSON: &str = include_str!("../../../../test_data/ocel/minimal.jsonocel");
const MINIMAL_XML: &str = include_str!("../../../../test_data/ocel/minimal.xmlocel");

#[test]
fn minimal_json_is_valid_and_well_formed() {
    let (valid, errors) = JsonOCEL::validate_with_errors(MINIMAL_JSON);
    assert!(valid, "{errors:?}");
    let ocel = JsonOCEL::deserialize(MINIMAL_JSON, true).unwrap();
    assert!(ocel.is_valid());
    assert_eq!(ocel.events.len(), 4);
    assert_eq!(ocel.objects.len(), 4);
    assert_eq!(
        ocel.global_attributes.keys().collect::<Vec<_>>(),
        vec!["version", "ordering"]
    );
    assert_eq!(
        ocel.object_types(),
        HashSet::from(["customer", "item", "order"].map(String::from))
    );

    let c1 = ocel.objects.get("c1").unwrap();
    assert_eq!(c1.attributes.len(), 2, "null attribute is dropped");
    let o1 = ocel.objects.get("o1").unwrap();
    assert!(o1.attributes.get("placed").unwrap().try_as_timestamp().is_some());
    assert_eq!(o1.attributes.get("costs"), Some(&OCELValue::Integer(3500)));

    let e1 = ocel.events.get("e1").unwrap();
    assert_eq!(e1.object_refs, vec!["i1", "o1", "i2"]);
    assert_eq!(e1.attributes.get("prepaid-amount"), Some(&OCELValue::Float(1000.0)));
    assert_eq!(
        ocel.ordered_events()
            .into_iter()
            .map(|(id, _)| id.as_str())
            .collect::<Vec<_>>(),
        vec!["e1", "e2", "e3", "e4"]
    );
}

#[test]
fn minimal_xml_is_valid_and_well_formed() {
    assert!(XmlOCEL::validate(MINIMAL_XML));
    let ocel = XmlOCEL::deserialize(MINIMAL_XML, true).unwrap();
    assert!(ocel.is_valid());
    assert_eq!(ocel.events.len(), 2);
    assert_eq!(ocel.objects.len(), 3);
    let e2 = ocel.events.get("e2").unwrap();
    let checks = e2.attributes.get("checks").unwrap().try_as_list().unwrap();
    assert_eq!(checks[0], OCELValue::Boolean(true));
    assert_eq!(
        checks[1].try_as_map().unwrap().get("attempts"),
        Some(&OCELValue::Integer(2))
    );
}

#[test]
fn serialized_samples_validate_again() {
    for ocel in [
        JsonOCEL::deserialize(MINIMAL_JSON, true).unwrap(),
        XmlOCEL::deserialize(MINIMAL_XML, true).unwrap(),
    ] {
        for formatting in [Formatting::Compact, Formatting::Indented] {
            let json = JsonOCEL::serialize(&ocel, formatting, true).unwrap();
            assert_eq!(JsonOCEL::deserialize(&json, false).unwrap(), ocel);
            let xml = XmlOCEL::serialize(&ocel, formatting, true).unwrap();
            assert_eq!(XmlOCEL::deserialize(&xml, false).unwrap(), ocel);
        }
    }
}

#[test]
fn json_and_xml_agree() {
    let ocel = JsonOCEL::deserialize(MINIMAL_JSON, true).unwrap();
    let xml = XmlOCEL::serialize(&ocel, Formatting::Indented, true).unwrap();
    let via_xml = XmlOCEL::deserialize(&xml, true).unwrap();
    let json = JsonOCEL::serialize(&via_xml, Formatting::Compact, true).unwrap();
    assert_eq!(JsonOCEL::deserialize(&json, true).unwrap(), ocel);
}

#[test]
fn fixture_paths_import_and_convert() {
    let path = get_test_data_path().join("ocel").join("minimal.jsonocel");
    let ocel = OCEL::import_from_path(&path).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("minimal.xmlocel.gz");
    ocel.export_to_path(&out).unwrap();
    assert_eq!(OCEL::import_from_path(&out).unwrap(), ocel);
}

#[test]
fn transforms_on_fixture_keep_well_formedness() {
    let ocel = XmlOCEL::deserialize(MINIMAL_XML, true).unwrap();
    let merged = ocel.merge_with(&JsonOCEL::deserialize(MINIMAL_JSON, true).unwrap());
    assert!(merged.is_valid());
    assert_eq!(merged.events.len(), 4);

    let flat = merged.convert_objects_to_attributes(["item"]);
    assert!(flat.is_valid());
    assert!(flat.objects.values().all(|o| o.object_type != "item"));
    assert_eq!(
        flat.events.get("e1").unwrap().attributes.get("item"),
        merged
            .objects
            .get("i2")
            .map(|o| OCELValue::Map(o.attributes.clone()))
            .as_ref()
    );

    let back = flat.convert_attributes_to_objects(["item"]).merge_duplicate_objects();
    assert!(back.is_valid());
    assert_eq!(back.object_types(), merged.object_types());
}

#[test]
fn invalid_fixture_variant_is_rejected() {
    let broken = MINIMAL_JSON.replace("2020-07-09T08:22:01.527+01:00", "09/07/2020 08:22");
    let (valid, errors) = JsonOCEL::validate_with_errors(&broken);
    assert!(!valid);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("#/ocel:events/e2/ocel:timestamp: "));
    assert!(matches!(
        JsonOCEL::deserialize(&broken, true),
        Err(OCELIOError::SchemaViolation(_))
    ));
}
