// vim: tw=80
//! Inspecting recorded calls after the fact

use dynmock::*;

fn logger() -> Mock {
    let mock = Mock::default();
    mock.call("info", args!["starting"]).unwrap();
    mock.call("debug", args!["x = {}", 1; target = "app"]).unwrap();
    mock.call("info", args!["done"; elapsed = 2.5, code = 0]).unwrap();
    mock
}

#[test]
fn all_calls_in_order() {
    let mock = logger();
    let names = mock.all_calls().iter()
        .map(|c| c.name().to_owned())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["info", "debug", "info"]);
}

#[test]
fn named_calls() {
    let mock = logger();
    let info = mock.named_calls("info");
    assert_eq!(info.len(), 2);
    info[0].check_args(args!["starting"]);
    info[1].check_args(args!["done"; code = 0, elapsed = 2.5]);
    assert!(mock.named_calls("warn").is_empty());
}

#[test]
fn call_strings() {
    let mock = logger();
    let rendered = mock.all_calls().iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>();
    assert_eq!(rendered, vec![
        r#"info("starting")"#,
        r#"debug("x = {}", 1, target="app")"#,
        r#"info("done", code=0, elapsed=2.5)"#,
    ]);
}

#[test]
fn call_string_value_forms() {
    let mock = Mock::default();
    mock.call("f", args![(), true, vec![1, 2], Value::from(Some("x"))])
        .unwrap();
    assert_eq!(mock.all_calls()[0].to_string(),
               r#"f(None, true, [1, 2], "x")"#);
}

#[test]
fn get_params() {
    let mock = logger();
    let calls = mock.all_calls();
    assert_eq!(*calls[1].param(0).unwrap(), Value::from("x = {}"));
    assert_eq!(*calls[1].param("target").unwrap(), Value::from("app"));
    let e = calls[1].param(2).unwrap_err();
    assert_eq!(e.to_string(),
               r#"debug("x = {}", 1, target="app") has no parameter 2"#);
}

#[test]
fn log_view() {
    let mock = logger();
    let log = mock.call_log();
    assert_eq!(log.len(), 3);
    assert_eq!(log.count("info"), 2);
    assert_eq!(log.named("debug").count(), 1);
    assert_eq!(log.last().map(Call::name), Some("info"));
}

#[test]
fn calls_while_holding_a_snapshot() {
    let mock = logger();
    let calls = mock.all_calls();
    let log = mock.call_log();
    mock.call("warn", args!["late"]).unwrap();
    assert_eq!(calls.len(), 3);
    assert_eq!(log.count("warn"), 0);
    mock.check_call(3, "warn", args!["late"]);
}

#[test]
fn check_call() {
    let mock = logger();
    mock.check_call(0, "info", args!["starting"]);
    mock.check_call(1, "debug", args!["x = {}", 1; target = "app"]);
    mock.check_call(2, "info", args!["done"; elapsed = 2.5, code = 0]);
}

#[test]
#[should_panic(expected = "Argument mismatch for info(\"starting\")")]
fn check_call_wrong_args() {
    logger().check_call(0, "info", args!["stopping"]);
}

#[test]
#[should_panic(expected = "Argument mismatch")]
fn check_call_missing_keyword() {
    logger().check_call(1, "debug", args!["x = {}", 1]);
}

#[test]
#[should_panic(expected = "Wrong method for call 1")]
fn check_call_wrong_method() {
    logger().check_call(1, "info", args!["x = {}", 1; target = "app"]);
}

#[test]
#[should_panic(expected = "No call at index 3; only 3 calls were made")]
fn check_call_beyond_end() {
    logger().check_call(3, "info", args![]);
}

#[test]
#[should_panic(expected = "Argument mismatch")]
fn check_args_positional_order() {
    let mock = Mock::default();
    mock.call("f", args![1, 2]).unwrap();
    mock.named_calls("f")[0].check_args(args![2, 1]);
}

#[test]
fn bound_method() {
    let mock = Mock::new([("tick", Returns::iter(1..))]);
    let tick = mock.method("tick");
    let tock = tick.clone();
    assert_eq!(tick.call(args![]).unwrap(), Value::from(1));
    assert_eq!(tock.call(args![]).unwrap(), Value::from(2));
    assert_eq!(tock.name(), "tick");
    assert_eq!(mock.call_log().count("tick"), 2);
}
