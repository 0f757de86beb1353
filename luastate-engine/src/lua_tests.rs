use super::*;
use luastate_core::{LibraryFlagRegistry, RuntimeValue};
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

fn instance() -> Box<dyn EngineInstance> {
    let libraries = LibraryFlagRegistry::for_version(COMPILED_VERSION).all_safe();
    MluaBinding.create(libraries).unwrap()
}

#[test]
fn test_execute_returns_every_value() {
    let lua = instance();
    let values = lua.execute_string(b"return 1, 'two', true, nil", "?").unwrap();
    assert_eq!(values.len(), 4);
    assert_eq!(values[0].as_f64(), Some(1.0));
    assert_eq!(values[1], RuntimeValue::string("two"));
    assert_eq!(values[2], RuntimeValue::Boolean(true));
    assert_eq!(values[3], RuntimeValue::Nil);
}

#[test]
fn test_execute_without_return() {
    let lua = instance();
    assert!(lua.execute_string(b"local x = 1", "?").unwrap().is_empty());
}

#[test]
fn test_syntax_error() {
    let lua = instance();
    let err = lua.execute_string(b"return +", "broken").unwrap_err();
    assert!(matches!(err, Error::ScriptSyntax(_)), "{:?}", err);
}

#[test]
fn test_runtime_error_keeps_message() {
    let lua = instance();
    let err = lua.execute_string(b"error('kaboom')", "?").unwrap_err();
    match err {
        Error::ScriptRuntime(message) => assert!(message.contains("kaboom")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_globals_round_trip() {
    let lua = instance();
    lua.set_global("answer", RuntimeValue::Number(42.5)).unwrap();
    assert_eq!(lua.get_global("answer").unwrap(), RuntimeValue::Number(42.5));
    assert_eq!(lua.get_global("missing").unwrap(), RuntimeValue::Nil);
}

#[test]
fn test_table_snapshot() {
    let lua = instance();
    lua.execute_string(b"t = { 10, 20, name = 'x' }", "?").unwrap();
    let table = lua.get_global("t").unwrap();
    let entries = table.as_table().unwrap();
    assert_eq!(entries.len(), 3);
    assert!(entries
        .iter()
        .any(|(k, v)| k == &RuntimeValue::string("name") && v == &RuntimeValue::string("x")));
}

#[test]
fn test_shared_subtable_is_not_a_cycle() {
    let lua = instance();
    lua.execute_string(b"local s = {} t = { a = s, b = s }", "?").unwrap();
    assert!(lua.get_global("t").is_ok());
}

#[test]
fn test_cyclic_table_fails() {
    let lua = instance();
    lua.execute_string(b"t = {} t.self = t", "?").unwrap();
    let err = lua.get_global("t").unwrap_err();
    assert!(matches!(err, Error::Conversion(_)));
}

#[test]
fn test_deep_nesting_fails_without_overflowing() {
    let lua = instance();
    lua.execute_string(b"local t = {} for i = 1, 100000 do t = { t } end deep = t", "?")
        .unwrap();

    let err = lua.get_global("deep").unwrap_err();
    assert!(matches!(err, Error::Conversion(_)));

    lua.execute_string(b"local t = {} for i = 2, 200 do t = { t } end ok = t", "?")
        .unwrap();
    assert!(lua.get_global("ok").is_ok());
}

#[test]
fn test_deep_nesting_into_lua_fails() {
    let lua = instance();
    let mut value = RuntimeValue::Nil;
    for _ in 0..=MAX_NESTING_DEPTH {
        value = RuntimeValue::sequence([value]);
    }
    let err = lua.set_global("deep", value).unwrap_err();
    assert!(matches!(err, Error::Conversion(_)));
    assert!(lua.get_global("deep").unwrap().is_nil());
}

#[test]
fn test_non_utf8_strings_survive() {
    let lua = instance();
    lua.set_global("raw", RuntimeValue::String(vec![0xff, 0x00, 0x41])).unwrap();
    let values = lua.execute_string(b"return #raw, raw", "?").unwrap();
    assert_eq!(values[0].as_f64(), Some(3.0));
    assert_eq!(values[1], RuntimeValue::String(vec![0xff, 0x00, 0x41]));
}

#[test]
fn test_functions_are_opaque() {
    let lua = instance();
    lua.execute_string(b"function noop() end", "?").unwrap();
    assert_eq!(lua.get_global("noop").unwrap(), RuntimeValue::Function);
    assert!(lua.set_global("f", RuntimeValue::Function).is_err());
}

#[test]
fn test_installed_function_receives_arguments() {
    let lua = instance();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    lua.install_global_function(
        "record",
        Box::new(move |args| {
            sink.borrow_mut().push(args);
            Ok(())
        }),
    )
    .unwrap();

    let values = lua.execute_string(b"return record(1, 'a')", "?").unwrap();
    assert!(values.is_empty());
    assert_eq!(seen.borrow().len(), 1);
    assert_eq!(seen.borrow()[0][1], RuntimeValue::string("a"));
}

#[test]
fn test_failing_function_aborts_chunk() {
    let lua = instance();
    lua.install_global_function("fail", Box::new(|_| Err(Error::runtime("listener broke"))))
        .unwrap();
    let err = lua.execute_string(b"reached = 1 fail() reached = 2", "?").unwrap_err();
    assert!(matches!(err, Error::ScriptRuntime(ref m) if m.contains("listener broke")));
    assert_eq!(lua.get_global("reached").unwrap().as_f64(), Some(1.0));
}

#[test]
fn test_call_chunk() {
    let lua = instance();
    let values = lua
        .call_chunk(
            b"function(a, b) return a + b, a * b end",
            "adder",
            vec![RuntimeValue::Integer(3), RuntimeValue::Integer(4)],
        )
        .unwrap();
    assert_eq!(values.len(), 2);
    assert_eq!(values[0].as_f64(), Some(7.0));
    assert_eq!(values[1].as_f64(), Some(12.0));
}

#[test]
fn test_execute_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "return 5 + 5").unwrap();

    let lua = instance();
    let values = lua.execute_file(file.path(), "five_plus_five").unwrap();
    assert_eq!(values.len(), 1);
    assert_eq!(values[0].as_f64(), Some(10.0));
}

#[test]
fn test_library_selection_is_applied() {
    let lua = MluaBinding
        .create(LibraryFlags::from(Library::Math))
        .unwrap();
    assert!(lua.execute_string(b"return math.floor(1.5)", "?").is_ok());
    assert!(lua.execute_string(b"return string.rep('a', 2)", "?").is_err());
    assert_eq!(lua.libraries(), LibraryFlags::from(Library::Math));
}

#[test]
fn test_debug_library_uses_unsafe_constructor() {
    let lua = MluaBinding
        .create(Library::Debug | Library::String)
        .unwrap();
    let values = lua.execute_string(b"return type(debug.traceback)", "?").unwrap();
    assert_eq!(values[0], RuntimeValue::string("function"));
}

#[test]
fn test_foreign_library_is_rejected() {
    let foreign = if COMPILED_VERSION == LuaVersion::LuaJit {
        Library::Utf8
    } else {
        Library::Ffi
    };
    let err = MluaBinding.create(LibraryFlags::from(foreign)).err().unwrap();
    assert!(matches!(err, Error::UnsupportedLibrary { .. }));
}
