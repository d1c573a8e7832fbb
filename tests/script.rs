use pretty_assertions::assert_eq;
use serde_json::json;
use with_conditions::{Predicates, Script};

#[test]
fn demo_script_records_merged_calls() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/validations.json");
    let script = Script::load(path).unwrap();
    let target = script.recorder();
    script.run(&target).unwrap();

    let calls = target.calls();
    assert_eq!(calls.len(), 3);

    assert_eq!(calls[0].if_conds, Some(Predicates::from(["cond_1", "cond_3"])));
    assert_eq!(calls[0].unless_conds, Some(Predicates::from(["cond_2", "cond_4"])));

    assert_eq!(
        calls[1].if_conds,
        Some(Predicates::from(["cond_1", "cond_5", "cond_6"]))
    );
    assert_eq!(calls[1].unless_conds, Some(Predicates::from("cond_2")));
    assert_eq!(
        calls[1].get_option("length"),
        Some(&json!({"minimum": 1, "maximum": 20}))
    );

    // Outside every scope: no keys were added.
    assert_eq!(calls[2].if_conds, None);
    assert_eq!(calls[2].unless_conds, None);
}

#[test]
fn omit_empty_target_keeps_bare_calls_bare() {
    let script = Script::from_json_str(
        r#"{"omit_empty": true, "steps": [
            {"with_conditions": {}, "steps": [{"call": "validates", "args": ["value"]}]},
            {"with_conditions": {"unless": "x"}, "steps": [{"call": "validates"}]}
        ]}"#,
    )
    .unwrap();
    let target = script.recorder();
    script.run(&target).unwrap();

    let calls = target.calls();
    assert_eq!(calls[0].if_conds, None);
    assert_eq!(calls[0].unless_conds, None);
    assert_eq!(calls[1].if_conds, None);
    assert_eq!(calls[1].unless_conds, Some(Predicates::from("x")));
}

#[test]
fn recorded_calls_render_as_json() {
    let script = Script::from_json_str(
        r#"{"steps": [{"with_conditions": {"if": "a"}, "steps": [{"call": "validates", "args": ["v"]}]}]}"#,
    )
    .unwrap();
    let target = script.recorder();
    script.run(&target).unwrap();
    assert_eq!(
        serde_json::to_value(target.calls()).unwrap(),
        json!([{"name": "validates", "args": ["v"], "if": ["a"], "unless": []}])
    );
}
