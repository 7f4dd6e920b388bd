use std::sync::atomic::AtomicBool;

use cem_generate::{Coordinator, DemoDiscoveryOptions, GenerateOptions};
use cem_workspace::LocalFs;

fn write(dir: &std::path::Path, rel: &str, contents: &str) {
    let path = dir.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

#[test]
fn demo_discovery_attaches_canonical_urls_to_matching_elements() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "src/my-element.js",
        r#"
        @customElement('my-element')
        export class MyElement extends HTMLElement {}
        "#,
    );
    write(
        dir.path(),
        "demo/my-element/index.html",
        r#"<script type="module">
          import '../../src/my-element.js';
        </script>"#,
    );

    let workspace = LocalFs::new(dir.path());
    let coordinator = Coordinator::new().unwrap();
    let options = GenerateOptions {
        files: vec!["src/**/*.js".to_string()],
        demo_discovery: Some(DemoDiscoveryOptions {
            file_glob: "demo/**/index.html".to_string(),
            url_pattern: r"^demo/(?P<slug>[^/]+)/index\.html$".to_string(),
            url_template: "https://example.com/demos/{slug}/".to_string(),
        }),
        ..Default::default()
    };
    let cancel = AtomicBool::new(false);
    let package = coordinator.generate_package(&workspace, &options, &cancel).unwrap();

    let ce = package.modules[0].declarations[0].as_custom_element().unwrap();
    assert_eq!(ce.demos.len(), 1);
    assert_eq!(ce.demos[0].url, "https://example.com/demos/my-element/");
    assert_eq!(ce.demos[0].source.as_deref(), Some("demo/my-element/index.html"));
}

#[test]
fn output_is_deterministic_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "src/b.js", "export class B extends HTMLElement {}");
    write(dir.path(), "src/a.js", "export class A extends HTMLElement {}");

    let workspace = LocalFs::new(dir.path());
    let coordinator = Coordinator::new().unwrap();
    let options = GenerateOptions {
        files: vec!["**/*.js".to_string()],
        ..Default::default()
    };
    let cancel = AtomicBool::new(false);
    let first = coordinator.generate_json(&workspace, &options, &cancel).unwrap();
    let second = coordinator.generate_json(&workspace, &options, &cancel).unwrap();
    assert_eq!(first, second);
    assert!(first.find("src/a.js").unwrap() < first.find("src/b.js").unwrap());
}
