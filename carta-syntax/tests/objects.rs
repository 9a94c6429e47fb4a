use carta_syntax::{Dict, Name, ObjRef, Object, parse_objects};
use proptest::collection::{btree_map, vec};
use proptest::prelude::*;

fn name() -> impl Strategy<Value = Name> {
    vec(1_u8..=255, 1..8).prop_map(Name::new)
}

fn object() -> impl Strategy<Value = Object> {
    let leaf = prop_oneof![
        any::<bool>().prop_map(Object::Boolean),
        any::<i32>().prop_map(|i| Object::Integer(i64::from(i))),
        (-1_000_000_i32..1_000_000).prop_map(|i| Object::Float(f64::from(i) / 1000.0)),
        name().prop_map(Object::Name),
        vec(any::<u8>(), 0..16).prop_map(Object::String),
        vec(any::<u8>(), 0..16).prop_map(Object::HexString),
        (0_i64..10_000, 0_i64..100).prop_map(|(n, g)| Object::Ref(ObjRef::new(n, g))),
    ];

    leaf.prop_recursive(4, 32, 6, |inner| {
        prop_oneof![
            vec(inner.clone(), 0..6).prop_map(Object::Array),
            btree_map(name(), inner, 0..6)
                .prop_map(|entries| Object::Dict(entries.into_iter().collect::<Dict>())),
        ]
    })
}

proptest! {
    #[test]
    fn objects_read_back(objects in vec(object(), 1..4)) {
        let mut data = vec![];

        for object in &objects {
            object.write_to(&mut data);
            data.push(b' ');
        }

        prop_assert_eq!(parse_objects(&data), Ok(objects));
    }
}

#[test]
fn trailer_dictionary() {
    let data = b"<<
        /Size 22
        /Root 2 0 R
        /Info 1 0 R
        /ID [<81b14aafa313db63dbd6f981e49f94f4> <81B14AAFA313DB63DBD6F981E49F94F4>]
        /Prev null
    >>";

    let objects = parse_objects(data).unwrap();
    let [Object::Dict(trailer)] = objects.as_slice() else {
        panic!("expected a single dictionary, got {objects:?}");
    };

    assert_eq!(trailer.len(), 4);
    assert_eq!(trailer.get(b"Size"), Some(&Object::Integer(22)));
    assert_eq!(trailer.get(b"Root"), Some(&Object::Ref(ObjRef::new(2, 0))));
    assert_eq!(trailer.get(b"Prev"), None);

    let ids = trailer.get(b"ID").and_then(Object::as_array).unwrap();
    assert_eq!(ids[0], ids[1]);
    assert_eq!(ids[0].as_string().map(<[u8]>::len), Some(16));
}

#[test]
fn escapes() {
    let objects = parse_objects(b"/A#20B (a\\(b\\)\\n\\101) <4 1 4 0>").unwrap();

    assert_eq!(
        objects,
        vec![
            Object::Name(Name::from("A B")),
            Object::String(b"a(b)\nA".to_vec()),
            Object::HexString(b"A@".to_vec()),
        ]
    );
}

#[test]
fn serialization() {
    let dict: Dict = [
        (Name::from("Type"), Object::Name(Name::from("XObject"))),
        (Name::from("Length"), Object::Ref(ObjRef::new(5, 0))),
        (
            Name::from("Matrix"),
            Object::Array(vec![Object::Integer(1), Object::Float(0.5), Object::Null]),
        ),
    ]
    .into_iter()
    .collect();

    assert_eq!(
        Object::Dict(dict).to_bytes(),
        b"<<\n/Type /XObject\n/Length 5 0 R\n/Matrix [1 0.5 null]\n>>"
    );
    assert_eq!(Object::String(b"(x)".to_vec()).to_bytes(), b"(\\(x\\))");
    assert_eq!(Object::HexString(vec![0xAB, 0x01]).to_bytes(), b"<ab01>");
    assert_eq!(Object::Name(Name::from("a/b")).to_bytes(), b"/a#2Fb");
}
