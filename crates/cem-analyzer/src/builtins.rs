//! The curated set of DOM/ECMA built-in type names that the module
//! processor links with `package: "global:"` rather than treating as a
//! same-package reference.

use once_cell::sync::Lazy;
use std::collections::HashSet;

const BUILTIN_NAMES: &[&str] = &[
    // DOM base classes commonly used as a custom element superclass.
    "HTMLElement",
    "Element",
    "Node",
    "EventTarget",
    "DocumentFragment",
    "ShadowRoot",
    // Event hierarchy.
    "Event",
    "CustomEvent",
    "UIEvent",
    "MouseEvent",
    "KeyboardEvent",
    "FocusEvent",
    "InputEvent",
    "PointerEvent",
    // Common DOM value/collection types referenced in field/param types.
    "CSSStyleSheet",
    "CSSStyleDeclaration",
    "NodeList",
    "HTMLCollection",
    "DOMTokenList",
    "AbortController",
    "AbortSignal",
    "ResizeObserver",
    "IntersectionObserver",
    "MutationObserver",
    // ECMAScript globals.
    "Promise",
    "Array",
    "Map",
    "Set",
    "WeakMap",
    "WeakSet",
    "Object",
    "Error",
    "Date",
    "RegExp",
    "Symbol",
    "Function",
    // Primitive type annotations that appear as TypeScript type text.
    "string",
    "number",
    "boolean",
    "undefined",
    "null",
    "void",
    "any",
    "unknown",
    "never",
];

static BUILTINS: Lazy<HashSet<&'static str>> = Lazy::new(|| BUILTIN_NAMES.iter().copied().collect());

pub fn is_builtin(name: &str) -> bool {
    BUILTINS.contains(name)
}
