use cem_model::{
    Attribute, ClassDeclaration, ClassMember, CustomElementDeclaration, Declaration, Export,
    ExportKind, FieldMember, Module, Package, Privacy, Reference,
};

fn field(name: &str) -> ClassMember {
    ClassMember::Field(FieldMember {
        name: name.to_string(),
        privacy: Privacy::Public,
        r#static: false,
        readonly: false,
        r#type: None,
        default: None,
        description: None,
        summary: None,
        deprecated: None,
        reflects: false,
        inherited_from: None,
    })
}

#[test]
fn minimal_element_round_trips() {
    let mut package = Package::new();
    let mut module = Module::new("my-element.js");
    let ce = CustomElementDeclaration {
        name: "MyElement".to_string(),
        tag_name: "my-element".to_string(),
        superclass: Some(Reference::global("HTMLElement")),
        members: vec![field("open")],
        attributes: vec![Attribute {
            name: "open".to_string(),
            r#type: None,
            default: Some("false".to_string()),
            description: None,
            field_name: Some("open".to_string()),
            deprecated: None,
        }],
        ..Default::default()
    };
    module.declarations.push(Declaration::CustomElement(ce));
    module.exports.push(Export {
        kind: ExportKind::CustomElementDefinition,
        name: "MyElement".to_string(),
        declaration: Some(Reference::new("MyElement")),
    });
    package.modules.push(module);

    package.validate().expect("well-formed package validates");

    let json = package.to_json_string().unwrap();
    assert!(json.ends_with('\n'));
    let round_tripped = Package::from_json_str(&json).unwrap();
    assert_eq!(round_tripped.modules.len(), 1);
    let ce = round_tripped.modules[0].declarations[0]
        .as_custom_element()
        .unwrap();
    assert_eq!(ce.tag_name, "my-element");
    assert_eq!(ce.superclass.as_ref().unwrap().name, "HTMLElement");
    assert_eq!(ce.superclass.as_ref().unwrap().package.as_deref(), Some("global:"));
}

#[test]
fn duplicate_tag_names_are_rejected() {
    let mut package = Package::new();
    for path in ["a.js", "b.js"] {
        let mut module = Module::new(path);
        module.declarations.push(Declaration::CustomElement(CustomElementDeclaration {
            name: "X".to_string(),
            tag_name: "my-element".to_string(),
            ..Default::default()
        }));
        package.modules.push(module);
    }
    assert!(package.validate().is_err());
}

#[test]
fn attribute_referencing_missing_field_is_rejected() {
    let mut package = Package::new();
    let mut module = Module::new("a.js");
    module.declarations.push(Declaration::CustomElement(CustomElementDeclaration {
        name: "X".to_string(),
        tag_name: "x-el".to_string(),
        attributes: vec![Attribute {
            name: "foo".to_string(),
            r#type: None,
            default: None,
            description: None,
            field_name: Some("doesNotExist".to_string()),
            deprecated: None,
        }],
        ..Default::default()
    }));
    package.modules.push(module);
    assert!(package.validate().is_err());
}

#[test]
fn dangling_custom_element_export_is_rejected() {
    let mut module = Module::new("a.js");
    module.exports.push(Export {
        kind: ExportKind::CustomElementDefinition,
        name: "Missing".to_string(),
        declaration: None,
    });
    assert!(module.validate().is_err());
}

#[test]
fn backslash_paths_are_rejected() {
    let mut package = Package::new();
    package.modules.push(Module::new("src\\a.js"));
    assert!(package.validate().is_err());
}

#[test]
fn plain_class_without_tag_has_no_custom_element_kind() {
    let mut module = Module::new("a.js");
    module.declarations.push(Declaration::Class(ClassDeclaration {
        name: "Helper".to_string(),
        ..Default::default()
    }));
    module.validate().unwrap();
}

#[test]
fn unknown_declaration_kind_is_rejected_strictly() {
    let json = r#"{
        "schemaVersion": "2.1.1",
        "modules": [{
            "kind": "javascript-module",
            "path": "a.js",
            "declarations": [{"kind": "interface", "name": "Foo"}]
        }]
    }"#;
    assert!(Package::from_json_str(json).is_err());
}

#[test]
fn unknown_declaration_kind_is_tolerated_leniently() {
    let json = r#"{
        "schemaVersion": "2.1.1",
        "modules": [{
            "kind": "javascript-module",
            "path": "a.js",
            "declarations": [{"kind": "interface", "name": "Foo"}]
        }]
    }"#;
    let package = Package::from_json_str_lenient(json).unwrap();
    assert_eq!(package.modules[0].declarations[0].name(), "Foo");
}

#[test]
fn unknown_member_kind_inside_known_declaration_is_tolerated_leniently() {
    let json = r#"{
        "schemaVersion": "2.1.1",
        "modules": [{
            "kind": "javascript-module",
            "path": "a.js",
            "declarations": [{
                "kind": "class",
                "name": "Foo",
                "members": [{"kind": "accessor", "name": "bar"}]
            }]
        }]
    }"#;
    let package = Package::from_json_str_lenient(json).unwrap();
    assert_eq!(package.modules[0].declarations[0].members()[0].name(), "bar");
    assert!(Package::from_json_str(json).is_err());
}
