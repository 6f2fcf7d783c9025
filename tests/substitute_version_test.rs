//! Integration tests for `channelci substitute-version`

mod common;

use assert_fs::prelude::*;
use common::{stderr, TestProject};
use predicates::prelude::*;

const META: &str = "package:\n  name: foo\n  version: 0.0.0\n\nsource:\n  path: ..\n";

#[test]
fn test_substitutes_declared_version() {
    let project = TestProject::new();
    project.create_file("recipe/meta.yaml", META);
    project.create_file("foo/_version.py", "__version__ = '1.4.2'\n");

    let output = project.run(&[
        "substitute-version",
        "recipe",
        "foo/_version.py",
        "--without-branch-name",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let meta = assert_fs::fixture::ChildPath::new(project.path().join("recipe/meta.yaml"));
    meta.assert(predicate::str::contains("  version: '1.4.2'\n"));
    meta.assert(predicate::str::contains("  path: ..\n"));
    assert!(predicate::str::contains("0.0.0")
        .not()
        .eval(&project.read_file("recipe/meta.yaml")));
}

#[test]
fn test_appends_branch_name_in_git_checkout() {
    let project = TestProject::new();
    gix::init(project.path()).unwrap();
    project.create_file("recipe/meta.yaml", META);
    project.create_file("_version.py", "__version__ = \"2.0\"\n");

    let output = project.run(&["substitute-version", "recipe", "_version.py"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let meta = assert_fs::fixture::ChildPath::new(project.path().join("recipe/meta.yaml"));
    meta.assert(predicate::str::is_match(r"  version: '2\.0\.[A-Za-z0-9._]+'\n").unwrap());
}

#[test]
fn test_missing_declaration_fails() {
    let project = TestProject::new();
    project.create_file("recipe/meta.yaml", META);
    project.create_file("_version.py", "VERSION = '1.0'\n");

    let output = project.run(&[
        "substitute-version",
        "recipe",
        "_version.py",
        "--without-branch-name",
    ]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("__version__"));
    assert_eq!(project.read_file("recipe/meta.yaml"), META);
}

#[test]
fn test_help_describes_branch_rewriting() {
    let project = TestProject::new();
    let output = project.run(&["substitute-version", "--help"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let help = common::stdout(&output);
    assert!(help.contains("feature_x_y"), "help: {help}");
    assert!(help.contains("become `_`"), "help: {help}");
}
