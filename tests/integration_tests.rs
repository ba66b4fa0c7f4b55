//! Integration tests for the taxo CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

/// Helper to get a taxo command
fn taxo() -> Command {
    Command::cargo_bin("taxo").unwrap()
}

/// Helper to create a test project in a temp directory
fn setup_test_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    taxo().current_dir(tmp.path()).arg("init").assert().success();
    tmp
}

/// Run a `new`-style command with `--format id` and return the printed UID
fn create(tmp: &TempDir, args: &[&str]) -> String {
    let output = taxo()
        .current_dir(tmp.path())
        .args(args)
        .args(["--format", "id"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "{:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn json_output(tmp: &TempDir, args: &[&str]) -> Value {
    let output = taxo()
        .current_dir(tmp.path())
        .args(args)
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "{:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

fn create_category(tmp: &TempDir, name: &str, label: &str) -> String {
    let name = format!("name={}", name);
    let label = format!("label.en={}", label);
    create(tmp, &["category", "new", "--set", &name, "--set", &label])
}

fn create_group(tmp: &TempDir, category: &str) -> String {
    let data = format!(
        r#"{{"name": "technical", "category_uid": "{}", "label": {{"en": "Technical data"}}, "type": "Technical Details"}}"#,
        category
    );
    create(tmp, &["group", "new", "--data", &data])
}

fn create_spec(tmp: &TempDir, group: &str, name: &str, spec_type: &str, options: &str, required: bool) -> String {
    let data = format!(
        r#"{{"name": "{}", "specification_group_uid": "{}", "label": {{"en": "{}"}}, "type": "{}", "type_options": {}, "required": {}}}"#,
        name, group, name, spec_type, options, required
    );
    create(tmp, &["spec", "new", "--data", &data])
}

fn create_model(tmp: &TempDir, category: &str) -> String {
    let category = format!("category_uid={}", category);
    create(tmp, &["model", "new", "--set", "name=Alegro", "--set", &category])
}

fn create_machine(tmp: &TempDir, model: &str) -> String {
    let model = format!("primary_model_uid={}", model);
    create(tmp, &["machine", "new", "--set", "name=Line 4", "--set", &model])
}

fn primary_instance(tmp: &TempDir, machine: &str) -> String {
    let details = json_output(tmp, &["machine", "show", machine]);
    details["instances"][0]["uid"].as_str().unwrap().to_string()
}

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    taxo()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Machine taxonomy toolkit"))
        .stdout(predicate::str::contains("category"))
        .stdout(predicate::str::contains("machine"));
}

#[test]
fn test_version_displays() {
    taxo()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("taxo"));
}

#[test]
fn test_init_creates_collection_files() {
    let tmp = TempDir::new().unwrap();
    taxo()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized taxonomy project"));

    assert!(tmp.path().join(".taxo/config.yaml").is_file());
    for file in [
        "categories.json",
        "specification-groups.json",
        "specifications.json",
        "enum-options.json",
        "models.json",
        "specification-presets.json",
        "machines.json",
        "machine-model-instances.json",
        "machine-specification-values.json",
    ] {
        let content = fs::read_to_string(tmp.path().join("data").join(file)).unwrap();
        assert_eq!(content.trim(), "[]", "{}", file);
    }
}

#[test]
fn test_init_twice_warns() {
    let tmp = setup_test_project();
    taxo()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_init_honors_data_dir_setting() {
    let tmp = TempDir::new().unwrap();
    taxo()
        .current_dir(tmp.path())
        .env("TAXO_DATA_DIR", "collections")
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("collections/categories.json"));

    assert!(tmp.path().join("collections/machines.json").is_file());
    assert!(!tmp.path().join("data").exists());

    // later commands pick the directory up from the project config
    taxo()
        .current_dir(tmp.path())
        .env_remove("TAXO_DATA_DIR")
        .args(["category", "new", "--set", "name=binders", "--set", "label.en=Binders"])
        .assert()
        .success();
    let content = fs::read_to_string(tmp.path().join("collections/categories.json")).unwrap();
    assert!(content.contains("binders"));
}

#[test]
fn test_commands_outside_project_fail() {
    let tmp = TempDir::new().unwrap();
    taxo()
        .current_dir(tmp.path())
        .args(["category", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a taxonomy project"));
}

#[test]
fn test_explicit_project_flag() {
    let tmp = setup_test_project();
    let elsewhere = TempDir::new().unwrap();
    taxo()
        .current_dir(elsewhere.path())
        .args(["--project", tmp.path().to_str().unwrap(), "category", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No categories found"));
}

// ============================================================================
// Category Tests
// ============================================================================

#[test]
fn test_category_create_list_show() {
    let tmp = setup_test_project();
    let uid = create_category(&tmp, "binders", "Perfect Binders");
    assert_eq!(uid.len(), 26);

    taxo()
        .current_dir(tmp.path())
        .args(["category", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("binders"))
        .stdout(predicate::str::contains("Perfect Binders"))
        .stdout(predicate::str::contains("1 categories found"));

    let shown = json_output(&tmp, &["category", "show", &uid]);
    assert_eq!(shown["name"], "binders");
    assert_eq!(shown["label"]["en"], "Perfect Binders");
    assert!(shown["created_at"].is_string());

    taxo()
        .current_dir(tmp.path())
        .args(["category", "show", &uid])
        .assert()
        .success()
        .stdout(predicate::str::contains("name: binders"));
}

#[test]
fn test_category_requires_label() {
    let tmp = setup_test_project();
    taxo()
        .current_dir(tmp.path())
        .args(["category", "new", "--set", "name=binders"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("validation failed"));

    let content = fs::read_to_string(tmp.path().join("data/categories.json")).unwrap();
    assert_eq!(content.trim(), "[]");
}

#[test]
fn test_category_unknown_parent_rejected() {
    let tmp = setup_test_project();
    taxo()
        .current_dir(tmp.path())
        .args([
            "category",
            "new",
            "--set",
            "name=child",
            "--set",
            "label.en=Child",
            "--set",
            "parent_category_uid=01J9ZQ3V6W8X9Y0Z1A2B3C4D5E",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("parent_category_uid"));
}

#[test]
fn test_category_children_filter() {
    let tmp = setup_test_project();
    let parent = create_category(&tmp, "finishing", "Finishing");
    let parent_set = format!("parent_category_uid={}", parent);
    let child = create(
        &tmp,
        &["category", "new", "--set", "name=binders", "--set", "label.en=Binders", "--set", &parent_set],
    );

    taxo()
        .current_dir(tmp.path())
        .args(["category", "list", "--parent", &parent, "--format", "id"])
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("{}\n", child)));

    taxo()
        .current_dir(tmp.path())
        .args(["category", "list", "--roots", "--format", "id"])
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("{}\n", parent)));
}

#[test]
fn test_category_update_keeps_created_at() {
    let tmp = setup_test_project();
    let uid = create_category(&tmp, "binders", "Binders");
    let before = json_output(&tmp, &["category", "show", &uid]);

    taxo()
        .current_dir(tmp.path())
        .args(["category", "update", &uid, "--set", "label.de=Klebebinder", "--set", "label.en=Binders"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated category"));

    let after = json_output(&tmp, &["category", "show", &uid]);
    assert_eq!(after["label"]["de"], "Klebebinder");
    assert_eq!(after["created_at"], before["created_at"]);
}

#[test]
fn test_category_delete_blocked_by_group() {
    let tmp = setup_test_project();
    let category = create_category(&tmp, "binders", "Binders");
    let group = create_group(&tmp, &category);

    taxo()
        .current_dir(tmp.path())
        .args(["category", "delete", &category])
        .assert()
        .failure()
        .stderr(predicate::str::contains("dependent"));

    taxo()
        .current_dir(tmp.path())
        .args(["group", "delete", &group])
        .assert()
        .success();
    taxo()
        .current_dir(tmp.path())
        .args(["category", "delete", &category])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted category"));
}

// ============================================================================
// Specification Tests
// ============================================================================

#[test]
fn test_spec_type_options_checked() {
    let tmp = setup_test_project();
    let category = create_category(&tmp, "binders", "Binders");
    let group = create_group(&tmp, &category);
    let data = format!(
        r#"{{"name": "glue", "specification_group_uid": "{}", "label": {{"en": "Glue"}}, "type": "Numerical Range", "type_options": {{"unit": "mm"}}}}"#,
        group
    );
    taxo()
        .current_dir(tmp.path())
        .args(["spec", "new", "--data", &data])
        .assert()
        .failure()
        .stderr(predicate::str::contains("range_type"));
}

#[test]
fn test_spec_list_filters() {
    let tmp = setup_test_project();
    let category = create_category(&tmp, "binders", "Binders");
    let group = create_group(&tmp, &category);
    let speed = create_spec(&tmp, &group, "speed", "Numerical", r#"{"unit": "cycles/h"}"#, true);
    create_spec(&tmp, &group, "stacker", "Boolean Plus", "{}", false);

    taxo()
        .current_dir(tmp.path())
        .args(["spec", "list", "--required", "--format", "id"])
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("{}\n", speed)));

    taxo()
        .current_dir(tmp.path())
        .args(["spec", "list", "--type", "Boolean Plus"])
        .assert()
        .success()
        .stdout(predicate::str::contains("stacker"))
        .stdout(predicate::str::contains("speed").not());
}

#[test]
fn test_enum_options_and_tree() {
    let tmp = setup_test_project();
    let category = create_category(&tmp, "binders", "Binders");
    let group = create_group(&tmp, &category);
    let glue = create_spec(&tmp, &group, "glue", "Enum Plus", r#"{"allow_multiple": true}"#, true);
    let spec_set = format!("specification_uid={}", glue);
    create(&tmp, &["option", "new", "--set", "name=pur", "--set", "label.en=PUR", "--set", &spec_set]);

    taxo()
        .current_dir(tmp.path())
        .args(["option", "list", "--spec", &glue])
        .assert()
        .success()
        .stdout(predicate::str::contains("PUR"));

    taxo()
        .current_dir(tmp.path())
        .args(["tree", &category])
        .assert()
        .success()
        .stdout(predicate::str::contains("Technical data"))
        .stdout(predicate::str::contains("glue"))
        .stdout(predicate::str::contains("Enum Plus"));

    let tree = json_output(&tmp, &["tree", &category]);
    assert_eq!(tree["specification_groups"][0]["specifications"][0]["uid"], glue.as_str());

    taxo()
        .current_dir(tmp.path())
        .args(["spec", "delete", &glue])
        .assert()
        .failure()
        .stderr(predicate::str::contains("enum option"));
}

// ============================================================================
// Preset Tests
// ============================================================================

#[test]
fn test_preset_duplicate_triple_rejected() {
    let tmp = setup_test_project();
    let category = create_category(&tmp, "binders", "Binders");
    let group = create_group(&tmp, &category);
    let speed = create_spec(&tmp, &group, "speed", "Numerical", "{}", false);
    let data = format!(
        r#"{{"preset_level": "category", "preset_target_uid": "{}", "specification_uid": "{}", "allowed_values": {{"type": "numerical", "numerical": {{"constraint_type": "range", "min": 0, "max": 100}}}}}}"#,
        category, speed
    );
    create(&tmp, &["preset", "new", "--data", &data]);

    taxo()
        .current_dir(tmp.path())
        .args(["preset", "new", "--data", &data])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already"));

    taxo()
        .current_dir(tmp.path())
        .args(["preset", "list", "--level", "category"])
        .assert()
        .success()
        .stdout(predicate::str::contains("numerical"));
}

// ============================================================================
// Machine Tests
// ============================================================================

#[test]
fn test_machine_readiness_flow() {
    let tmp = setup_test_project();
    let category = create_category(&tmp, "binders", "Binders");
    let group = create_group(&tmp, &category);
    let speed = create_spec(&tmp, &group, "speed", "Numerical", r#"{"min": 0, "max": 500}"#, true);
    let model = create_model(&tmp, &category);
    let machine = create_machine(&tmp, &model);
    let instance = primary_instance(&tmp, &machine);

    taxo()
        .current_dir(tmp.path())
        .args(["validate", &machine])
        .assert()
        .failure()
        .stdout(predicate::str::contains("missing 1 required"))
        .stdout(predicate::str::contains("speed"));

    taxo()
        .current_dir(tmp.path())
        .args(["machine", "set-value", &instance, &speed, r#"{"numerical": 600}"#])
        .assert()
        .failure()
        .stderr(predicate::str::contains("outside"));

    taxo()
        .current_dir(tmp.path())
        .args(["machine", "set-value", &instance, &speed, r#"{"numerical": 420}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created value"));

    taxo()
        .current_dir(tmp.path())
        .args(["machine", "set-value", &instance, &speed, r#"{"numerical": 430}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated value"));

    let values = json_output(&tmp, &["machine", "values", "--instance", &instance]);
    assert_eq!(values.as_array().unwrap().len(), 1);
    assert_eq!(values[0]["value"]["numerical"], 430.0);

    taxo()
        .current_dir(tmp.path())
        .args(["validate", &machine])
        .assert()
        .success()
        .stdout(predicate::str::contains("ready to publish"));
}

#[test]
fn test_machine_instances() {
    let tmp = setup_test_project();
    let category = create_category(&tmp, "binders", "Binders");
    let model = create_model(&tmp, &category);
    let machine = create_machine(&tmp, &model);
    let primary = primary_instance(&tmp, &machine);

    taxo()
        .current_dir(tmp.path())
        .args(["machine", "add-instance", &machine, "--model", &model, "--position", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("position 0"));

    let secondary = create(
        &tmp,
        &["machine", "add-instance", &machine, "--model", &model, "--position", "1", "--label", "Feeder"],
    );

    let details = json_output(&tmp, &["machine", "show", &machine]);
    assert_eq!(details["instances"].as_array().unwrap().len(), 2);
    assert_eq!(details["instances"][1]["instance_label"], "Feeder");

    taxo()
        .current_dir(tmp.path())
        .args(["machine", "remove-instance", &primary])
        .assert()
        .failure()
        .stderr(predicate::str::contains("primary"));

    taxo()
        .current_dir(tmp.path())
        .args(["machine", "remove-instance", &secondary])
        .assert()
        .success();

    taxo()
        .current_dir(tmp.path())
        .args(["machine", "delete", &machine])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 model instance(s)"));

    let instances = fs::read_to_string(tmp.path().join("data/machine-model-instances.json")).unwrap();
    assert_eq!(instances.trim(), "[]");
}

#[test]
fn test_model_delete_blocked_by_machine() {
    let tmp = setup_test_project();
    let category = create_category(&tmp, "binders", "Binders");
    let model = create_model(&tmp, &category);
    create_machine(&tmp, &model);

    taxo()
        .current_dir(tmp.path())
        .args(["model", "delete", &model])
        .assert()
        .failure()
        .stderr(predicate::str::contains("dependent machine"));
}

#[test]
fn test_machine_list_status_filter() {
    let tmp = setup_test_project();
    let category = create_category(&tmp, "binders", "Binders");
    let model = create_model(&tmp, &category);
    let machine = create_machine(&tmp, &model);

    taxo()
        .current_dir(tmp.path())
        .args(["machine", "list", "--status", "published"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No machines found"));

    taxo()
        .current_dir(tmp.path())
        .args(["machine", "update", &machine, "--set", "status=published"])
        .assert()
        .success();

    taxo()
        .current_dir(tmp.path())
        .args(["machine", "list", "--status", "published", "--format", "id"])
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("{}\n", machine)));
}

// ============================================================================
// Query Tests
// ============================================================================

#[test]
fn test_search_across_collections() {
    let tmp = setup_test_project();
    let category = create_category(&tmp, "binders", "Perfect Binders");
    create_model(&tmp, &category);

    taxo()
        .current_dir(tmp.path())
        .args(["search", "BINDER"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Perfect Binders"));

    taxo()
        .current_dir(tmp.path())
        .args(["search", "alegro", "--type", "model"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Alegro"))
        .stdout(predicate::str::contains("1 results found"));
}

#[test]
fn test_related_lists_both_directions() {
    let tmp = setup_test_project();
    let category = create_category(&tmp, "binders", "Binders");
    let model = create_model(&tmp, &category);

    let relations = json_output(&tmp, &["related", &category]);
    assert_eq!(relations["kind"], "category");
    assert_eq!(relations["related"]["models"][0]["uid"], model.as_str());

    taxo()
        .current_dir(tmp.path())
        .args(["related", "01J9ZQ3V6W8X9Y0Z1A2B3C4D5E"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no entity found"));
}

// ============================================================================
// Tool Tests
// ============================================================================

#[test]
fn test_tool_list_and_call() {
    let tmp = setup_test_project();
    taxo()
        .current_dir(tmp.path())
        .args(["tool", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("create_category"))
        .stdout(predicate::str::contains("get_relationships"));

    taxo()
        .current_dir(tmp.path())
        .args([
            "tool",
            "call",
            "create_category",
            "--data",
            r#"{"name": "binders", "label": {"en": "Binders"}}"#,
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Category created successfully!"));

    taxo()
        .current_dir(tmp.path())
        .args(["tool", "call", "list_categories"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 1 categories"));
}

#[test]
fn test_tool_errors_carry_codes() {
    let tmp = setup_test_project();
    let output = taxo()
        .current_dir(tmp.path())
        .args(["tool", "call", "create_category", "--set", "name=", "--format", "json"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let body: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["error"]["code"], -32602);

    taxo()
        .current_dir(tmp.path())
        .args(["tool", "call", "drop_everything"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Tool not found"));
}
