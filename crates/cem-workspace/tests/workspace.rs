use cem_workspace::{LocalFs, Remote, Workspace};

#[test]
fn local_workspace_finds_config_file_by_convention() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("cem.yaml"), "packageName: demo\n").unwrap();
    let ws = LocalFs::new(dir.path());
    assert_eq!(ws.config_file().as_deref(), Some("cem.yaml"));
}

#[test]
fn remote_workspace_is_read_only_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let pkg_dir = dir.path().join("node_modules/@scope/widgets");
    std::fs::create_dir_all(&pkg_dir).unwrap();
    std::fs::write(
        pkg_dir.join("package.json"),
        r#"{"name":"@scope/widgets","customElements":"custom-elements.json"}"#,
    )
    .unwrap();
    std::fs::write(pkg_dir.join("custom-elements.json"), "{}").unwrap();

    let remote = Remote::resolve(dir.path(), "npm:@scope/widgets").unwrap();
    let contents = remote.read_file("custom-elements.json").unwrap();
    assert_eq!(contents, b"{}");
    assert!(remote.output_writer("anything.json").is_err());
    assert_eq!(
        remote
            .custom_elements_manifest_path(None)
            .unwrap()
            .as_deref(),
        Some("custom-elements.json")
    );
}
