// Associations written to disk and read back keep ids and distances

use drawing_association::{resolve, AssociationConfig, Associator};
use drawing_common::records::{read_json, write_json};
use drawing_common::{Association, BBox, SymbolBox, TextBox};

#[test]
fn test_associations_round_trip_through_json() {
    let text = vec![
        TextBox::new(1, "P-101", BBox::new(100, 100, 40, 12), 0.0),
        TextBox::new(2, "FV-7", BBox::new(400, 220, 30, 12), 0.0),
        TextBox::new(3, "NOTE", BBox::new(900, 900, 60, 12), 0.0),
    ];
    let symbols = vec![
        SymbolBox::new("S1", BBox::new(105, 125, 30, 30)),
        SymbolBox::new("S2", BBox::new(380, 240, 40, 40)),
    ];
    let associator = Associator::new(AssociationConfig::default()).unwrap();
    let links = associator.associate(&text, &symbols);
    assert_eq!(links.len(), 2);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sheet_associations.json");
    write_json(&path, &links).unwrap();

    let back: Vec<Association> = read_json(&path).unwrap();
    assert_eq!(back, links);
    let ids: Vec<(u32, &str)> = back.iter().map(|a| (a.text_id, a.symbol_id.as_str())).collect();
    assert_eq!(ids, vec![(1, "S1"), (2, "S2")]);

    // persisted layout: tuples as arrays, 4-space indentation
    let raw = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value[0]["symbol_bbox"], serde_json::json!([105, 125, 30, 30]));
    assert_eq!(value[0]["text_center"], serde_json::json!([120.0, 106.0]));
    assert!(raw.contains("\n        \"text_id\": 1"));

    assert_eq!(resolve(&back, &symbols, &text[1]).map(|s| s.id.as_str()), Some("S2"));
    assert!(resolve(&back, &symbols, &text[2]).is_none());
}
