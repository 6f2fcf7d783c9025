//! Integration tests for `channelci order`

mod common;

use common::{stderr, stdout, TestProject};

#[test]
fn test_order_prints_dependencies_first() {
    let project = TestProject::new();
    project.add_recipe("app", "2.0", &["lib", "numpy >=1.8"]);
    project.add_recipe("lib", "1.0", &["base"]);
    project.add_recipe("base", "0.1", &[]);

    let output = project.run(&["order", "."]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    let base = out.find("base 0.1").expect("base listed");
    let lib = out.find("lib 1.0").expect("lib listed");
    let app = out.find("app 2.0").expect("app listed");
    assert!(base < lib && lib < app, "unexpected order:\n{out}");
    assert!(out.contains("(after lib)"), "external numpy is not an edge:\n{out}");
}

#[test]
fn test_order_json() {
    let project = TestProject::new();
    project.add_recipe("b", "1.0", &["a"]);
    project.add_recipe("a", "1.0", &[]);

    let output = project.run(&["--json", "order", "."]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let entries: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let names: Vec<&str> = entries
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["a", "b"]);
    assert_eq!(entries[1]["depends_on"][0], "a");
}

#[test]
fn test_order_cycle_fails() {
    let project = TestProject::new();
    project.add_recipe("x", "1.0", &["y"]);
    project.add_recipe("y", "1.0", &["x"]);

    let output = project.run(&["order", "."]);
    assert!(!output.status.success());

    let err = stderr(&output);
    assert!(err.contains("could not be resolved"), "stderr: {err}");
    assert!(err.contains("x -> [y]"), "stderr: {err}");
}

#[test]
fn test_order_missing_directory_fails() {
    let project = TestProject::new();
    let output = project.run(&["order", "does-not-exist"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Recipe directory not found"));
}

#[test]
fn test_invalid_config_file_fails() {
    let project = TestProject::new();
    project.add_recipe("a", "1.0", &[]);
    project.create_file("bad.toml", "[registry\nchannel = ");

    let output = project.run(&["--config", "bad.toml", "order", "."]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Failed to load configuration"));
}
