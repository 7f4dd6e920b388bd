//! The Custom Elements Manifest document model.
//!
//! Mirrors the Custom Elements Manifest schema: a `Package` owns an ordered
//! sequence of `Module`s, each of which owns its `Declaration`s and
//! `Export`s. Nothing here holds a back-reference; cross-references between
//! declarations are resolved by name through the query API in `query.rs`,
//! never by pointer.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

pub const CURRENT_SCHEMA_VERSION: &str = "2.1.1";

/// `bool | string` in the wire format: presence means deprecated, the
/// string variant carries the rationale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Deprecated {
    Flag(bool),
    Reason(String),
}

impl Deprecated {
    pub fn is_deprecated(&self) -> bool {
        match self {
            Deprecated::Flag(b) => *b,
            Deprecated::Reason(_) => true,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Deprecated::Reason(s) => Some(s.as_str()),
            Deprecated::Flag(_) => None,
        }
    }
}

/// A named reference to another declaration, resolved on demand by the
/// query API rather than held as a pointer. Built-in DOM/ECMA types carry
/// `package: Some("global:".into())`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
}

impl Reference {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: None,
            module: None,
        }
    }

    pub fn global(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: Some("global:".to_string()),
            module: None,
        }
    }

    pub fn is_global(&self) -> bool {
        self.package.as_deref() == Some("global:")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Demo {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Semver-like schema version string, comparable with semver ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaVersion(pub String);

impl SchemaVersion {
    pub fn current() -> Self {
        SchemaVersion(CURRENT_SCHEMA_VERSION.to_string())
    }

    fn parsed(&self) -> Option<semver::Version> {
        semver::Version::parse(&self.0).ok()
    }

    /// Two schema versions are compatible for read purposes when they share
    /// a major and minor version: a reader built against the emitter's
    /// minor version can ignore additive patch-level fields.
    pub fn is_compatible(&self, other: &SchemaVersion) -> bool {
        match (self.parsed(), other.parsed()) {
            (Some(a), Some(b)) => a.major == b.major && a.minor == b.minor,
            _ => self.0 == other.0,
        }
    }
}

impl PartialOrd for SchemaVersion {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SchemaVersion {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match (self.parsed(), other.parsed()) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => self.0.cmp(&other.0),
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Privacy {
    Public,
    Protected,
    Private,
}

impl Default for Privacy {
    fn default() -> Self {
        Privacy::Public
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMember {
    pub name: String,
    #[serde(default, skip_serializing_if = "is_default_privacy")]
    pub privacy: Privacy,
    #[serde(default, skip_serializing_if = "is_false")]
    pub r#static: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub readonly: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<TypeRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<Deprecated>,
    /// Whether a property mutation also reflects onto the linked
    /// attribute.
    #[serde(default, skip_serializing_if = "is_false")]
    pub reflects: bool,
    /// Populated by inheritance propagation; never written back onto the
    /// member's own `deprecated` field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inherited_from: Option<Reference>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodMember {
    pub name: String,
    #[serde(default, skip_serializing_if = "is_default_privacy")]
    pub privacy: Privacy,
    #[serde(default, skip_serializing_if = "is_false")]
    pub r#static: bool,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_type: Option<TypeRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<Deprecated>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inherited_from: Option<Reference>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<TypeRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub optional: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeRef {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<Reference>,
}

impl TypeRef {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            references: Vec::new(),
        }
    }
}

/// One `field` or `method` member of a class-ish declaration. Tagged by
/// `kind` in the wire format; an unrecognized `kind` fails unless the
/// loader is asked to read leniently (see `ClassMember::from_json_value`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ClassMember {
    Field(FieldMember),
    Method(MethodMember),
}

impl ClassMember {
    pub fn name(&self) -> &str {
        match self {
            ClassMember::Field(f) => &f.name,
            ClassMember::Method(m) => &m.name,
        }
    }

    pub fn is_static(&self) -> bool {
        match self {
            ClassMember::Field(f) => f.r#static,
            ClassMember::Method(m) => m.r#static,
        }
    }

    pub fn deprecated(&self) -> Option<&Deprecated> {
        match self {
            ClassMember::Field(f) => f.deprecated.as_ref(),
            ClassMember::Method(m) => m.deprecated.as_ref(),
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            ClassMember::Field(f) => f.description.as_deref(),
            ClassMember::Method(m) => m.description.as_deref(),
        }
    }

    pub fn summary(&self) -> Option<&str> {
        match self {
            ClassMember::Field(f) => f.summary.as_deref(),
            ClassMember::Method(m) => m.summary.as_deref(),
        }
    }

    pub fn set_inherited_from(&mut self, reference: Reference) {
        match self {
            ClassMember::Field(f) => f.inherited_from = Some(reference),
            ClassMember::Method(m) => m.inherited_from = Some(reference),
        }
    }

    /// Parse a single member from an already-decoded JSON value, honoring
    /// the lenient-read escape hatch.
    pub fn from_json_value(value: serde_json::Value, lenient: bool) -> Result<Self> {
        match value.get("kind").and_then(|k| k.as_str()) {
            Some("field") | Some("method") => {
                Ok(serde_json::from_value(value).map_err(ModelError::Json)?)
            }
            Some(other) if lenient => {
                // Fall back to treating unknown kinds as opaque fields so
                // lenient readers keep the name/description around.
                let name = value
                    .get("name")
                    .and_then(|n| n.as_str())
                    .unwrap_or(other)
                    .to_string();
                Ok(ClassMember::Field(FieldMember {
                    name,
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
                }))
            }
            Some(other) => Err(ModelError::UnknownKind(other.to_string())),
            None => Err(ModelError::UnknownKind("<missing>".to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<TypeRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<Deprecated>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<TypeRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<Deprecated>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CssCustomProperty {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub syntax: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CssPart {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CssState {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClassDeclaration {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub superclass: Option<Reference>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<ClassMember>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<Deprecated>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MixinDeclaration {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<ClassMember>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<Deprecated>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDeclaration {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_type: Option<TypeRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<Deprecated>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct VariableDeclaration {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<TypeRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<Deprecated>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CustomElementDeclaration {
    pub name: String,
    pub tag_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub superclass: Option<Reference>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<ClassMember>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<Event>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub slots: Vec<Slot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub css_properties: Vec<CssCustomProperty>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub css_parts: Vec<CssPart>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub css_states: Vec<CssState>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub demos: Vec<Demo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<Deprecated>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Declaration {
    Class(ClassDeclaration),
    Mixin(MixinDeclaration),
    Function(FunctionDeclaration),
    Variable(VariableDeclaration),
    CustomElement(CustomElementDeclaration),
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Class(d) => &d.name,
            Declaration::Mixin(d) => &d.name,
            Declaration::Function(d) => &d.name,
            Declaration::Variable(d) => &d.name,
            Declaration::CustomElement(d) => &d.name,
        }
    }

    pub fn as_custom_element(&self) -> Option<&CustomElementDeclaration> {
        match self {
            Declaration::CustomElement(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_custom_element_mut(&mut self) -> Option<&mut CustomElementDeclaration> {
        match self {
            Declaration::CustomElement(d) => Some(d),
            _ => None,
        }
    }

    pub fn members(&self) -> &[ClassMember] {
        match self {
            Declaration::Class(d) => &d.members,
            Declaration::Mixin(d) => &d.members,
            Declaration::CustomElement(d) => &d.members,
            Declaration::Function(_) | Declaration::Variable(_) => &[],
        }
    }

    pub fn members_mut(&mut self) -> Option<&mut Vec<ClassMember>> {
        match self {
            Declaration::Class(d) => Some(&mut d.members),
            Declaration::Mixin(d) => Some(&mut d.members),
            Declaration::CustomElement(d) => Some(&mut d.members),
            Declaration::Function(_) | Declaration::Variable(_) => None,
        }
    }

    pub fn superclass(&self) -> Option<&Reference> {
        match self {
            Declaration::Class(d) => d.superclass.as_ref(),
            Declaration::CustomElement(d) => d.superclass.as_ref(),
            _ => None,
        }
    }

    pub fn deprecated(&self) -> Option<&Deprecated> {
        match self {
            Declaration::Class(d) => d.deprecated.as_ref(),
            Declaration::Mixin(d) => d.deprecated.as_ref(),
            Declaration::Function(d) => d.deprecated.as_ref(),
            Declaration::Variable(d) => d.deprecated.as_ref(),
            Declaration::CustomElement(d) => d.deprecated.as_ref(),
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Declaration::Class(d) => d.description.as_deref(),
            Declaration::Mixin(d) => d.description.as_deref(),
            Declaration::Function(d) => d.description.as_deref(),
            Declaration::Variable(d) => d.description.as_deref(),
            Declaration::CustomElement(d) => d.description.as_deref(),
        }
    }

    pub fn summary(&self) -> Option<&str> {
        match self {
            Declaration::Class(d) => d.summary.as_deref(),
            Declaration::CustomElement(d) => d.summary.as_deref(),
            _ => None,
        }
    }

    /// Parse a single declaration from an already-decoded JSON value,
    /// honoring the lenient-read escape hatch the same way
    /// `ClassMember::from_json_value` does for members: a recognized
    /// `kind` deserializes normally (with its own `members` array run
    /// back through the member escape hatch so a forward-compatible
    /// member kind doesn't fail a declaration that is otherwise known),
    /// an unrecognized `kind` falls back to an opaque `class` declaration
    /// when `lenient` is set, and errors otherwise.
    pub fn from_json_value(value: serde_json::Value, lenient: bool) -> Result<Self> {
        match value.get("kind").and_then(|k| k.as_str()) {
            Some("class") | Some("mixin") | Some("function") | Some("variable")
            | Some("custom-element") => {
                let value = if lenient { sanitize_members(value)? } else { value };
                Ok(serde_json::from_value(value).map_err(ModelError::Json)?)
            }
            Some(other) if lenient => {
                let name = value
                    .get("name")
                    .and_then(|n| n.as_str())
                    .unwrap_or(other)
                    .to_string();
                Ok(Declaration::Class(ClassDeclaration {
                    name,
                    ..Default::default()
                }))
            }
            Some(other) => Err(ModelError::UnknownKind(other.to_string())),
            None => Err(ModelError::UnknownKind("<missing>".to_string())),
        }
    }
}

/// Replaces each entry of a declaration's `members` array with its
/// lenient-parsed-then-reserialized form, so an unrecognized member
/// `kind` inside an otherwise-known declaration doesn't fail the whole
/// declaration when the caller asked for a lenient read.
fn sanitize_members(mut value: serde_json::Value) -> Result<serde_json::Value> {
    if let Some(members) = value.get_mut("members").and_then(|m| m.as_array_mut()) {
        for member in members.iter_mut() {
            let raw = member.take();
            let sanitized = ClassMember::from_json_value(raw, true)?;
            *member = serde_json::to_value(sanitized).map_err(ModelError::Json)?;
        }
    }
    Ok(value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportKind {
    JavascriptModule,
    CustomElementDefinition,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Export {
    pub kind: ExportKind,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declaration: Option<Reference>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModuleKind {
    JavascriptModule,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub kind: ModuleKind,
    pub path: String,
    #[serde(default)]
    pub declarations: Vec<Declaration>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exports: Vec<Export>,
}

impl Module {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            kind: ModuleKind::JavascriptModule,
            path: path.into(),
            declarations: Vec::new(),
            exports: Vec::new(),
        }
    }

    pub fn find_declaration(&self, name: &str) -> Option<&Declaration> {
        self.declarations.iter().find(|d| d.name() == name)
    }

    /// Validates the per-module invariants: unique declaration names, and
    /// every `custom-element-definition` export resolves to a declaration
    /// in this module.
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for decl in &self.declarations {
            if !seen.insert(decl.name()) {
                return Err(ModelError::DuplicateDeclarationName {
                    module: self.path.clone(),
                    name: decl.name().to_string(),
                });
            }
        }
        for export in &self.exports {
            if export.kind == ExportKind::CustomElementDefinition
                && self.find_declaration(&export.name).is_none()
            {
                return Err(ModelError::DanglingExportReference {
                    module: self.path.clone(),
                    name: export.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Parse a single module from an already-decoded JSON value, running
    /// every declaration through `Declaration::from_json_value` so a
    /// forward-compatible declaration `kind` can be tolerated without
    /// discarding the rest of the module's declarations.
    pub fn from_json_value(value: serde_json::Value, lenient: bool) -> Result<Self> {
        let kind = value
            .get("kind")
            .cloned()
            .map(serde_json::from_value)
            .transpose()
            .map_err(ModelError::Json)?
            .unwrap_or(ModuleKind::JavascriptModule);
        let path = value
            .get("path")
            .and_then(|p| p.as_str())
            .unwrap_or_default()
            .to_string();
        let declarations = match value.get("declarations").and_then(|d| d.as_array()) {
            Some(arr) => arr
                .iter()
                .cloned()
                .map(|d| Declaration::from_json_value(d, lenient))
                .collect::<Result<Vec<_>>>()?,
            None => Vec::new(),
        };
        let exports = match value.get("exports").cloned() {
            Some(v) => serde_json::from_value(v).map_err(ModelError::Json)?,
            None => Vec::new(),
        };
        Ok(Module {
            kind,
            path,
            declarations,
            exports,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub schema_version: SchemaVersion,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readme: Option<String>,
    pub modules: Vec<Module>,
}

impl Package {
    pub fn new() -> Self {
        Self {
            schema_version: SchemaVersion::current(),
            readme: None,
            modules: Vec::new(),
        }
    }

    /// Enforces every package-level invariant: unique, forward-slash,
    /// root-relative module paths; unique declaration names per module;
    /// unique custom-element tag names across the whole package; every
    /// attribute `fieldName` names a real field.
    pub fn validate(&self) -> Result<()> {
        let mut paths = std::collections::HashSet::new();
        let mut tags = std::collections::HashSet::new();

        for module in &self.modules {
            if module.path.contains('\\') || module.path.starts_with('/') {
                return Err(ModelError::InvalidModulePath(module.path.clone()));
            }
            if !paths.insert(module.path.as_str()) {
                return Err(ModelError::DuplicateModulePath(module.path.clone()));
            }
            module.validate()?;

            for decl in &module.declarations {
                if let Declaration::CustomElement(ce) = decl {
                    if ce.tag_name.is_empty() {
                        return Err(ModelError::InvalidModulePath(format!(
                            "{}: empty tagName on {}",
                            module.path, ce.name
                        )));
                    }
                    if !tags.insert(ce.tag_name.clone()) {
                        return Err(ModelError::DuplicateTagName(ce.tag_name.clone()));
                    }
                    for attr in &ce.attributes {
                        if let Some(field_name) = &attr.field_name {
                            let has_field = ce
                                .members
                                .iter()
                                .any(|m| matches!(m, ClassMember::Field(f) if &f.name == field_name));
                            if !has_field {
                                return Err(ModelError::UnknownFieldReference {
                                    tag: ce.tag_name.clone(),
                                    attr: attr.name.clone(),
                                    field: field_name.clone(),
                                });
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Serializes with the CEM schema's stable key order, 2-space indent,
    /// trailing newline.
    pub fn to_json_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"  ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        serde::Serialize::serialize(self, &mut ser)?;
        let mut s = String::from_utf8(buf).expect("serde_json emits valid UTF-8");
        s.push('\n');
        Ok(s)
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let package: Package = serde_json::from_str(s)?;
        package.validate()?;
        Ok(package)
    }

    /// Like `from_json_str`, but a module's declaration (or a
    /// declaration's member) carrying an unrecognized `kind` is folded
    /// into an opaque stand-in instead of failing the whole read, for
    /// forward-compatible manifests. Read-only tooling (list/search/
    /// health) uses this; the generator's own round-trip checks use the
    /// strict `from_json_str`.
    pub fn from_json_str_lenient(s: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(s)?;
        let package = Self::from_json_value(value, true)?;
        package.validate()?;
        Ok(package)
    }

    fn from_json_value(value: serde_json::Value, lenient: bool) -> Result<Self> {
        let schema_version = value
            .get("schemaVersion")
            .and_then(|v| v.as_str())
            .unwrap_or(CURRENT_SCHEMA_VERSION)
            .to_string();
        let readme = value
            .get("readme")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        let modules = match value.get("modules").and_then(|m| m.as_array()) {
            Some(arr) => arr
                .iter()
                .cloned()
                .map(|m| Module::from_json_value(m, lenient))
                .collect::<Result<Vec<_>>>()?,
            None => Vec::new(),
        };
        Ok(Package {
            schema_version: SchemaVersion(schema_version),
            readme,
            modules,
        })
    }
}

impl Default for Package {
    fn default() -> Self {
        Self::new()
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

fn is_default_privacy(p: &Privacy) -> bool {
    matches!(p, Privacy::Public)
}
