use cem_model::config::Config;
use cem_server::ServeOptions;

#[test]
fn generate_options_from_config_carries_design_tokens_and_demo_discovery() {
    let yaml = r#"
generate:
  files: ["src/**/*.js"]
  designTokens:
    spec: "tokens.json"
    prefix: "brand"
  demoDiscovery:
    fileGlob: "demo/**/index.html"
    urlPattern: "^demo/(?P<slug>[^/]+)/index\\.html$"
    urlTemplate: "https://example.com/demos/{slug}/"
"#;
    let config = Config::from_yaml_str(yaml).unwrap();
    let options = cem_server::generate_options_from_config(&config);

    assert_eq!(options.files, vec!["src/**/*.js".to_string()]);
    let tokens = options.design_tokens.unwrap();
    assert_eq!(tokens.spec, "tokens.json");
    assert_eq!(tokens.prefix, "brand");
    let demos = options.demo_discovery.unwrap();
    assert_eq!(demos.url_template, "https://example.com/demos/{slug}/");
}

#[test]
fn serve_options_reject_an_unlisted_target() {
    let yaml = "serve:\n  target: es5\n";
    let config = Config::from_yaml_str(yaml).unwrap();
    let err = ServeOptions::from_config(std::path::PathBuf::from("."), &config.serve, false).unwrap_err();
    assert!(matches!(err, cem_server::ServerError::InvalidTarget(_)));
}

#[test]
fn serve_options_default_port_matches_config_default() {
    let config = Config::from_yaml_str("{}").unwrap();
    let options = ServeOptions::from_config(std::path::PathBuf::from("."), &config.serve, false).unwrap();
    assert_eq!(options.addr.port(), 8000);
    assert!(options.reload);
}
