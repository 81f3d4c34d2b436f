use popsynth_core::{Bounds, PlaceKind, SpatialBounds};

#[test]
fn serializes_bounds_deterministically() {
    let bounds = SpatialBounds::new(Bounds::new(10.0, 150.0), Bounds::new(100.0, 120.0));

    let json = serde_json::to_string_pretty(&bounds).expect("serialize bounds");
    let expected = r#"{
  "x": {
    "min": 10.0,
    "max": 150.0
  },
  "y": {
    "min": 100.0,
    "max": 120.0
  }
}"#;
    assert_eq!(json, expected);
}

#[test]
fn place_kinds_use_snake_case_names() {
    let json = serde_json::to_string(&PlaceKind::ALL).expect("serialize kinds");
    assert_eq!(json, r#"["household","school","workplace"]"#);

    let kind: PlaceKind = serde_json::from_str(r#""workplace""#).expect("parse kind");
    assert_eq!(kind, PlaceKind::Workplace);
}
