use super::*;
use proptest::prelude::*;

fn int(i: i64) -> RuntimeValue {
    RuntimeValue::Integer(i)
}

fn num(n: f64) -> HostValue {
    HostValue::Number(n)
}

// ===== FromRuntime scalars =====

#[test]
fn test_scalars_from_runtime() {
    assert_eq!(from_runtime(RuntimeValue::Nil).unwrap(), HostValue::Undefined);
    assert_eq!(from_runtime(RuntimeValue::Boolean(true)).unwrap(), HostValue::Boolean(true));
    assert_eq!(from_runtime(int(-7)).unwrap(), num(-7.0));
    assert_eq!(from_runtime(RuntimeValue::Number(0.25)).unwrap(), num(0.25));
    assert_eq!(
        from_runtime(RuntimeValue::string("héllo")).unwrap(),
        HostValue::String("héllo".to_string())
    );
}

#[test]
fn test_integer_and_float_are_equal_on_host() {
    assert_eq!(
        from_runtime(int(10)).unwrap(),
        from_runtime(RuntimeValue::Number(10.0)).unwrap()
    );
}

#[test]
fn test_invalid_utf8_becomes_bytes() {
    let raw = vec![0x80, 0x81];
    assert_eq!(
        from_runtime(RuntimeValue::String(raw.clone())).unwrap(),
        HostValue::Bytes(raw.clone())
    );
    assert_eq!(to_runtime(HostValue::Bytes(raw.clone())).unwrap(), RuntimeValue::String(raw));
}

#[test]
fn test_functions_become_markers() {
    assert_eq!(from_runtime(RuntimeValue::Function).unwrap(), HostValue::FunctionMarker);
    assert_eq!(from_runtime(RuntimeValue::UserData).unwrap(), HostValue::FunctionMarker);
    assert_eq!(
        from_runtime(RuntimeValue::Function).unwrap().as_str(),
        Some("[LuaFunction]")
    );
}

// ===== FromRuntime tables =====

#[test]
fn test_sequence_becomes_array() {
    let value = from_runtime(RuntimeValue::sequence([1, 2, 3])).unwrap();
    assert_eq!(value, HostValue::array([1, 2, 3]));
}

#[test]
fn test_sparse_table_keeps_holes() {
    let table = RuntimeValue::table([(int(1), int(1)), (int(2), int(2)), (int(4), int(3))]);
    let value = from_runtime(table).unwrap();
    let array = value.as_array().unwrap();
    assert_eq!(array.len(), 4);
    assert!(array.is_hole(2));
    assert_eq!(
        value,
        HostValue::array([num(1.0), num(2.0), HostValue::Undefined, num(3.0)])
    );
}

#[test]
fn test_array_length_is_largest_index() {
    let table = RuntimeValue::table([(int(5), "e")]);
    let value = from_runtime(table).unwrap();
    let array = value.as_array().unwrap();
    assert_eq!(array.len(), 5);
    assert_eq!(array.get(4).as_str(), Some("e"));
    assert_eq!(array.elements().count(), 1);
}

#[test]
fn test_integer_valued_float_keys_index_the_array() {
    let table = RuntimeValue::table([(RuntimeValue::Number(2.0), "b")]);
    let value = from_runtime(table).unwrap();
    assert_eq!(value.as_array().unwrap().get(1).as_str(), Some("b"));
}

#[test]
fn test_object_table() {
    let table = RuntimeValue::table([
        (RuntimeValue::string("a"), int(1)),
        (RuntimeValue::string("b"), int(2)),
        (RuntimeValue::string("c"), int(3)),
        (RuntimeValue::Number(1.5), int(4)),
    ]);
    assert_eq!(
        from_runtime(table).unwrap(),
        HostValue::object([("a", 1), ("b", 2), ("c", 3), ("1.5", 4)])
    );
}

#[test]
fn test_empty_table_is_object() {
    assert_eq!(
        from_runtime(RuntimeValue::Table(vec![])).unwrap(),
        HostValue::Object(HostObject::new())
    );
}

#[test]
fn test_mixed_table_has_array_and_properties() {
    let table = RuntimeValue::table([
        (int(1), RuntimeValue::string("x")),
        (RuntimeValue::string("n"), int(1)),
    ]);
    let value = from_runtime(table).unwrap();
    let array = value.as_array().unwrap();
    assert_eq!(array.len(), 1);
    assert_eq!(value.get("n"), Some(&num(1.0)));
}

#[test]
fn test_key_quoting() {
    let table = RuntimeValue::table([
        (int(-1), int(-1)),
        (RuntimeValue::string("-1"), RuntimeValue::string("-1")),
    ]);
    assert_eq!(
        from_runtime(table).unwrap(),
        HostValue::object([("-1", HostValue::from(-1)), ("'-1'", HostValue::from("-1"))])
    );
}

#[test]
fn test_string_index_does_not_collide_with_array_position() {
    let table = RuntimeValue::table([
        (int(1), RuntimeValue::string("number")),
        (RuntimeValue::string("1"), RuntimeValue::string("string")),
    ]);
    let value = from_runtime(table).unwrap();
    assert_eq!(value.as_array().unwrap().get(0).as_str(), Some("number"));
    assert_eq!(value.get("'1'").and_then(HostValue::as_str), Some("string"));
    assert_eq!(value.get("1"), None);
}

#[test]
fn test_non_canonical_numeric_strings_are_not_quoted() {
    let table = RuntimeValue::table([
        (RuntimeValue::string("01"), int(1)),
        (RuntimeValue::string("1.0"), int(2)),
        (RuntimeValue::string("-0"), int(3)),
        (RuntimeValue::string("0"), int(4)),
    ]);
    let value = from_runtime(table).unwrap();
    let object = value.as_object().unwrap();
    assert!(object.contains_key("01"));
    assert!(object.contains_key("1.0"));
    assert!(object.contains_key("-0"));
    assert!(object.contains_key("'0'"));
}

#[test]
fn test_zero_key_uses_reserved_slot() {
    let table = RuntimeValue::table([(int(0), "zero"), (int(1), "one")]);
    let value = from_runtime(table).unwrap();
    let array = value.as_array().unwrap();
    assert_eq!(array.len(), 1);
    assert_eq!(array.get(0).as_str(), Some("one"));
    assert_eq!(
        array.properties().zero_index().and_then(HostValue::as_str),
        Some("zero")
    );
    assert!(!array.properties().contains_key("'0'"));
    assert!(!array.properties().contains_key("0"));
}

#[test]
fn test_zero_key_alone_gives_object() {
    let table = RuntimeValue::table([(RuntimeValue::Number(0.0), "zero")]);
    let value = from_runtime(table).unwrap();
    assert_eq!(
        value.as_object().unwrap().zero_index().and_then(HostValue::as_str),
        Some("zero")
    );
}

#[test]
fn test_boolean_keys() {
    let table = RuntimeValue::table([(RuntimeValue::Boolean(true), "yes")]);
    assert_eq!(from_runtime(table).unwrap(), HostValue::object([("true", "yes")]));
}

// Key 2^32 is the last array slot (index 2^32 - 1), so the length is 2^32
// rather than 2^32 - 1.
#[test]
fn test_overflow_boundary_key_is_last_slot() {
    let table = RuntimeValue::table([(int(1 << 32), "last")]);
    let value = from_runtime(table).unwrap();
    let array = value.as_array().unwrap();
    assert_eq!(array.len(), 1 << 32);
    assert_eq!(array.get(u64::from(u32::MAX)).as_str(), Some("last"));
}

#[test]
fn test_overflow_past_boundary_is_plain_property() {
    let table = RuntimeValue::table([(int((1 << 32) + 1), "over")]);
    assert_eq!(
        from_runtime(table).unwrap(),
        HostValue::object([("4294967297", "over")])
    );
}

#[test]
fn test_non_scalar_keys_fail() {
    for key in [
        RuntimeValue::Table(vec![]),
        RuntimeValue::Function,
        RuntimeValue::UserData,
    ] {
        let table = RuntimeValue::Table(vec![(key, int(1))]);
        let err = from_runtime(table).unwrap_err();
        assert!(matches!(err, Error::Conversion(_)));
    }
}

#[test]
fn test_non_utf8_key_fails() {
    let table = RuntimeValue::Table(vec![(RuntimeValue::String(vec![0xff]), int(1))]);
    assert!(matches!(from_runtime(table), Err(Error::Conversion(_))));
}

#[test]
fn test_nested_tables() {
    let inner = RuntimeValue::sequence(["a"]);
    let table = RuntimeValue::table([(RuntimeValue::string("inner"), inner)]);
    let value = from_runtime(table).unwrap();
    assert_eq!(value.get("inner"), Some(&HostValue::array(["a"])));
}

// ===== ToRuntime =====

#[test]
fn test_nullish_to_nil() {
    assert_eq!(to_runtime(HostValue::Undefined).unwrap(), RuntimeValue::Nil);
    assert_eq!(to_runtime(HostValue::Null).unwrap(), RuntimeValue::Nil);
    assert_eq!(from_runtime(RuntimeValue::Nil).unwrap(), HostValue::Undefined);
}

#[test]
fn test_array_to_runtime_skips_holes() {
    let array = HostValue::array([num(1.0), HostValue::Null, num(3.0)]);
    assert_eq!(
        to_runtime(array).unwrap(),
        RuntimeValue::table([
            (int(1), RuntimeValue::Number(1.0)),
            (int(3), RuntimeValue::Number(3.0)),
        ])
    );
}

#[test]
fn test_array_properties_to_runtime() {
    let array = HostArray::from_iter([true])
        .with_property("1.5", "float name")
        .with_property(PropertyKey::ZeroIndex, "zero");
    let table = to_runtime(HostValue::Array(array)).unwrap();
    let entries = table.as_table().unwrap();
    assert_eq!(entries.len(), 3);
    assert!(entries.contains(&(int(1), RuntimeValue::Boolean(true))));
    assert!(entries.contains(&(RuntimeValue::string("1.5"), RuntimeValue::string("float name"))));
    assert!(entries.contains(&(int(0), RuntimeValue::string("zero"))));
}

#[test]
fn test_object_to_runtime() {
    let object = HostValue::object([("a", 1), ("b", 2)]);
    assert_eq!(
        to_runtime(object).unwrap(),
        RuntimeValue::table([
            (RuntimeValue::string("a"), RuntimeValue::Number(1.0)),
            (RuntimeValue::string("b"), RuntimeValue::Number(2.0)),
        ])
    );
}

#[test]
fn test_function_marker_is_rejected() {
    assert!(matches!(
        to_runtime(HostValue::FunctionMarker),
        Err(Error::Conversion(_))
    ));
    let nested = HostValue::object([("f", HostValue::FunctionMarker)]);
    assert!(to_runtime(nested).is_err());
}

// ===== Round trips =====

#[test]
fn test_sparse_array_round_trip() {
    let original = HostValue::array([num(1.0), num(2.0), HostValue::Undefined, num(3.0)]);
    let back = from_runtime(to_runtime(original.clone()).unwrap()).unwrap();
    assert_eq!(back, original);
}

#[test]
fn test_object_round_trip() {
    let original = HostValue::object([
        ("name", HostValue::from("lua")),
        ("list", HostValue::array([1, 2])),
        ("flag", HostValue::from(false)),
    ]);
    let back = from_runtime(to_runtime(original.clone()).unwrap()).unwrap();
    assert_eq!(back, original);
}

#[test]
fn test_multi_conversion_keeps_order() {
    let values = from_runtime_multi(vec![int(1), int(2), int(3)]).unwrap();
    assert_eq!(values, vec![num(1.0), num(2.0), num(3.0)]);
    assert_eq!(to_runtime_multi(values).unwrap().len(), 3);
}

// ===== Nesting limit =====

fn nested_runtime(tables: usize) -> RuntimeValue {
    let mut value = RuntimeValue::Nil;
    for _ in 0..tables {
        value = RuntimeValue::Table(vec![(int(1), value)]);
    }
    value
}

fn nested_host(tables: usize) -> HostValue {
    let mut value = HostValue::Undefined;
    for _ in 0..tables {
        value = HostValue::object([("inner", value)]);
    }
    value
}

#[test]
fn test_from_runtime_nesting_limit() {
    assert!(from_runtime(nested_runtime(MAX_NESTING_DEPTH)).is_ok());

    let err = from_runtime(nested_runtime(MAX_NESTING_DEPTH + 1)).unwrap_err();
    assert!(matches!(err, Error::Conversion(_)));
    assert!(err.to_string().contains("nesting"));
}

#[test]
fn test_to_runtime_nesting_limit() {
    assert!(to_runtime(nested_host(MAX_NESTING_DEPTH)).is_ok());

    let err = to_runtime(nested_host(MAX_NESTING_DEPTH + 1)).unwrap_err();
    assert!(matches!(err, Error::Conversion(_)));

    let mut array = HostArray::new();
    array.push(nested_host(MAX_NESTING_DEPTH));
    assert!(matches!(
        to_runtime(HostValue::Array(array)),
        Err(Error::Conversion(_))
    ));
}

#[test]
fn test_infinite_float_keys() {
    let table = RuntimeValue::table([
        (RuntimeValue::Number(f64::INFINITY), "up"),
        (RuntimeValue::Number(f64::NEG_INFINITY), "down"),
    ]);
    assert_eq!(
        from_runtime(table).unwrap(),
        HostValue::object([("inf", "up"), ("-inf", "down")])
    );
}

proptest! {
    #[test]
    fn prop_number_round_trip(n in any::<f64>().prop_filter("NaN never equals itself", |n| !n.is_nan())) {
        let back = from_runtime(to_runtime(HostValue::Number(n)).unwrap()).unwrap();
        prop_assert_eq!(back, HostValue::Number(n));
    }

    #[test]
    fn prop_string_round_trip(s in ".*") {
        let back = from_runtime(to_runtime(HostValue::String(s.clone())).unwrap()).unwrap();
        prop_assert_eq!(back, HostValue::String(s));
    }

    #[test]
    fn prop_bool_round_trip(b in any::<bool>()) {
        let back = from_runtime(to_runtime(HostValue::Boolean(b)).unwrap()).unwrap();
        prop_assert_eq!(back, HostValue::Boolean(b));
    }

    #[test]
    fn prop_integer_text_matches_parse(n in any::<i64>()) {
        prop_assert!(is_integer_text(&n.to_string()));
    }
}
