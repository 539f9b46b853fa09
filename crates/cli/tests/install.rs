use assert_cmd::prelude::*;
use snpm_testing_utils::{AddDefaultSnpmrc, CommandTempCwd, MockRegistry};
use std::fs;

fn seed_store_package(store_dir: &std::path::Path, name: &str, version: &str, files: &[(&str, &str)]) {
    let package_dir = store_dir.join(format!("{name}@{version}"));
    fs::create_dir_all(&package_dir).expect("create store package dir");
    fs::write(
        package_dir.join("package.json"),
        serde_json::json!({ "name": name, "version": version }).to_string(),
    )
    .expect("write package.json");
    for (relative_path, contents) in files {
        let path = package_dir.join(relative_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create file's parent dir");
        }
        fs::write(path, contents).expect("write fixture file");
    }
}

#[test]
fn installs_a_dependency_already_present_in_the_store() {
    let CommandTempCwd { mut snpm, workspace, snpmrc_info: AddDefaultSnpmrc { store_dir, .. }, root } =
        CommandTempCwd::init().add_default_snpmrc();

    seed_store_package(&store_dir, "left-pad", "1.3.0", &[("index.js", "module.exports = () => {}")]);

    fs::write(
        workspace.join("package.json"),
        serde_json::json!({
            "name": "app",
            "version": "1.0.0",
            "dependencies": { "left-pad": "1.3.0" },
        })
        .to_string(),
    )
    .expect("write package.json");

    snpm.arg("install").assert().success();

    let linked = workspace.join("node_modules/left-pad");
    assert!(linked.join("index.js").exists());
    assert!(linked.join("package.json").exists());

    drop(root);
}

#[test]
fn uninstall_removes_a_linked_package_and_the_manifest_entry() {
    let CommandTempCwd { mut snpm, workspace, snpmrc_info: AddDefaultSnpmrc { store_dir, .. }, root } =
        CommandTempCwd::init().add_default_snpmrc();

    seed_store_package(&store_dir, "left-pad", "1.3.0", &[("index.js", "module.exports = () => {}")]);
    fs::write(
        workspace.join("package.json"),
        serde_json::json!({
            "name": "app",
            "version": "1.0.0",
            "dependencies": { "left-pad": "1.3.0" },
        })
        .to_string(),
    )
    .expect("write package.json");

    snpm.arg("install").assert().success();
    assert!(workspace.join("node_modules/left-pad").exists());

    let mut uninstall = CommandTempCwd::init().snpm;
    uninstall.current_dir(&workspace);
    uninstall.args(["uninstall", "left-pad"]).assert().success();

    assert!(!workspace.join("node_modules/left-pad").exists());
    let manifest = fs::read_to_string(workspace.join("package.json")).unwrap();
    assert!(!manifest.contains("left-pad"));

    drop(root);
}

#[tokio::test]
async fn add_with_an_explicit_version_records_it_without_querying_the_registry() {
    let registry = MockRegistry::start().await;
    // no `publish`/`publish_versions` call registered: an explicit-version `add`
    // token is recorded literally and never needs to ask the registry for a
    // version, so this mock never gets hit.
    let env = CommandTempCwd::init().add_mocked_registry_snpmrc(&registry.url());
    let CommandTempCwd { mut snpm, workspace, snpmrc_info, root } = env;

    seed_store_package(&snpmrc_info.store_dir, "left-pad", "1.3.0", &[("index.js", "module.exports = () => {}")]);

    snpm.args(["add", "left-pad@1.3.0"]).assert().success();

    let manifest = fs::read_to_string(workspace.join("package.json")).unwrap();
    assert!(manifest.contains("left-pad"));
    assert!(workspace.join("node_modules/left-pad").exists());

    drop(root);
}
