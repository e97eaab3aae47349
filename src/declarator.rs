//! Declarator and type decomposition
//!
//! Pure, stateless transformation from (base-type token text, declarator
//! subtree) into fully-populated property, parameter and method-signature
//! models. The walker computes the base-type prefix; everything downstream of
//! the declarator node is handled here.
//!
//! Qualifier flags and trailing specifiers are derived from token text, but
//! anchored to whole tokens: an identifier that merely contains a keyword
//! substring (`staticCounter`) never trips a flag.

use once_cell::sync::Lazy;
use regex::Regex;
use tree_sitter::Node;

use crate::schema::{MethodModel, ParameterModel, PropertyModel};

/// Placeholder name used when no identifier can be located in a declarator
pub const ANONYMOUS: &str = "(anonymous)";

/// Keywords stripped from a declaration-specifier prefix to isolate the
/// return type of a method
pub const METHOD_PREFIX_KEYWORDS: &[&str] = &[
    "inline",
    "static",
    "explicit",
    "friend",
    "constexpr",
    "virtual",
    "extern",
    "mutable",
    "register",
];

/// Qualifier and storage tokens removed when cleaning a type for
/// underlying-type flattening
const TYPE_NOISE_KEYWORDS: &[&str] = &[
    "const",
    "volatile",
    "mutable",
    "static",
    "register",
    "extern",
    "inline",
    "constexpr",
    "typename",
];

/// Container templates whose arguments are flattened into underlying types
static CONTAINER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:std::)?(?:vector|list|map|set|unordered_map|unordered_set|array|deque|queue|stack|priority_queue)$",
    )
    .expect("container pattern is valid")
});

// ============================================================================
// Text utilities
// ============================================================================

/// Get text content of a node
pub fn node_text(node: &Node, source: &str) -> String {
    node.utf8_text(source.as_bytes()).unwrap_or("").to_string()
}

/// Normalize whitespace: collapse multiple spaces/newlines to single space
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whole-token search: true when `token` appears in `text` as a complete
/// identifier-like token, not as a substring of a longer identifier
pub fn has_token(text: &str, token: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric() && c != '_')
        .any(|t| t == token)
}

/// Remove whole-token keywords from a declaration-specifier text
pub fn strip_keywords(text: &str, keywords: &[&str]) -> String {
    text.split_whitespace()
        .filter(|t| !keywords.contains(t))
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// Subtree search
// ============================================================================

/// Depth-first search for the first node of `kind`, at any depth
pub fn find_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    if node.kind() == kind {
        return Some(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = find_kind(child, kind) {
            return Some(found);
        }
    }
    None
}

fn is_identifier_kind(kind: &str) -> bool {
    matches!(
        kind,
        "identifier"
            | "field_identifier"
            | "type_identifier"
            | "qualified_identifier"
            | "destructor_name"
            | "operator_name"
    )
}

/// Generic fallback: first identifier-expression node anywhere in the subtree
fn find_identifier<'t>(node: Node<'t>) -> Option<Node<'t>> {
    if is_identifier_kind(node.kind()) {
        return Some(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = find_identifier(child) {
            return Some(found);
        }
    }
    None
}

/// Innermost declared identifier of a declarator, descending through
/// pointer/reference/array/function wrapper layers
pub fn declarator_name(declarator: Node, source: &str) -> Option<String> {
    let mut current = Some(declarator);
    while let Some(node) = current {
        if is_identifier_kind(node.kind()) {
            return Some(node_text(&node, source));
        }
        current = match node.kind() {
            "init_declarator"
            | "pointer_declarator"
            | "array_declarator"
            | "function_declarator" => node.child_by_field_name("declarator"),
            "reference_declarator" | "parenthesized_declarator" => node.named_child(0),
            _ => break,
        };
    }
    find_identifier(declarator).map(|n| node_text(&n, source))
}

// ============================================================================
// Field / parameter decomposition
// ============================================================================

/// Locate the name and structural flags of a declarator: pointer/reference
/// operators encountered while descending, and array suffixes with their
/// dimension expressions
fn fill_name_ptr_ref_array(prop: &mut PropertyModel, declarator: Node, source: &str) {
    let mut sizes: Vec<String> = Vec::new();
    let mut name: Option<String> = None;
    let mut current = Some(declarator);

    while let Some(node) = current {
        if is_identifier_kind(node.kind()) {
            name = Some(node_text(&node, source));
            break;
        }
        current = match node.kind() {
            "init_declarator" => node.child_by_field_name("declarator"),
            "pointer_declarator" | "abstract_pointer_declarator" => {
                prop.is_pointer = true;
                node.child_by_field_name("declarator")
            }
            "reference_declarator" | "abstract_reference_declarator" => {
                prop.is_reference = true;
                node.named_child(0)
            }
            "array_declarator" | "abstract_array_declarator" => {
                prop.is_array = true;
                if let Some(size) = node.child_by_field_name("size") {
                    sizes.push(normalize_whitespace(&node_text(&size, source)));
                }
                node.child_by_field_name("declarator")
            }
            "function_declarator" | "abstract_function_declarator" => {
                node.child_by_field_name("declarator")
            }
            "parenthesized_declarator" => node.named_child(0),
            _ => {
                name = find_identifier(node).map(|n| node_text(&n, source));
                break;
            }
        };
    }

    if name.is_none() {
        name = find_identifier(declarator).map(|n| node_text(&n, source));
    }
    prop.name = name.unwrap_or_else(|| ANONYMOUS.to_string());

    if prop.is_array {
        // Descent sees the outermost (last written) dimension first;
        // reverse so the stored text reads in declaration order.
        sizes.reverse();
        let joined = sizes.join(",");
        prop.array_size = (!joined.is_empty()).then_some(joined);
    }
}

/// Set qualifier flags from whole-token search over base-type text
fn mark_type_flags(prop: &mut PropertyModel, base_type: &str) {
    prop.is_const = has_token(base_type, "const");
    prop.is_volatile = has_token(base_type, "volatile");
    prop.is_mutable = has_token(base_type, "mutable");
    prop.is_static = has_token(base_type, "static");
    prop.is_signed = has_token(base_type, "signed");
    prop.is_unsigned = has_token(base_type, "unsigned");
    prop.is_short = has_token(base_type, "short");
    prop.is_long = has_token(base_type, "long");
}

/// Decompose one member/field declarator against its base type
pub fn decompose_field(base_type: &str, declarator: Node, source: &str) -> PropertyModel {
    let mut prop = PropertyModel::default();
    fill_name_ptr_ref_array(&mut prop, declarator, source);
    mark_type_flags(&mut prop, base_type);

    let decl_text = node_text(&declarator, source);
    prop.type_name = normalize_whitespace(base_type);
    prop.full_type = normalize_whitespace(&format!("{} {}", base_type, decl_text));
    prop.underlying_type = underlying_types(&prop.type_name);
    prop
}

/// Initializer text with the leading `=` stripped
pub fn default_value_text(value: Node, source: &str) -> String {
    let text = normalize_whitespace(&node_text(&value, source));
    match text.strip_prefix('=') {
        Some(rest) => rest.trim().to_string(),
        None => text,
    }
}

/// Decompose one `parameter_declaration` / `optional_parameter_declaration`
pub fn decompose_parameter(param: Node, source: &str) -> ParameterModel {
    let mut parameter = ParameterModel::default();
    let declarator = param.child_by_field_name("declarator");
    let default_value = param.child_by_field_name("default_value");

    let base_end = declarator
        .map(|d| d.start_byte())
        .or_else(|| default_value.map(|d| d.start_byte()))
        .unwrap_or_else(|| param.end_byte());
    let base_raw = &source[param.start_byte()..base_end];
    let base = base_raw.trim_end().trim_end_matches('=').trim_end();

    if let Some(decl) = declarator {
        fill_name_ptr_ref_array(&mut parameter.property, decl, source);
        let decl_text = node_text(&decl, source);
        if decl_text.contains("&&") {
            parameter.is_r_value_reference = true;
        }
        if parameter.property.name == ANONYMOUS && decl.kind().starts_with("abstract") {
            // unnamed parameter: only type information
            parameter.property.name = String::new();
        }
        parameter.property.full_type = normalize_whitespace(&format!("{} {}", base, decl_text));
    } else {
        parameter.property.name = String::new();
        parameter.property.full_type = normalize_whitespace(base);
    }

    parameter.property.type_name = normalize_whitespace(base);
    mark_type_flags(&mut parameter.property, base);
    parameter.property.underlying_type = underlying_types(&parameter.property.type_name);

    if let Some(value) = default_value {
        parameter.property.default_value = Some(default_value_text(value, source));
    }
    parameter
}

// ============================================================================
// Method decomposition
// ============================================================================

/// Decompose a method signature from its declaration-specifier prefix and
/// declarator subtree.
///
/// `tail_limit` is the byte offset where trailing-specifier scanning stops:
/// the end of the declaration for prototypes, the start of the body for
/// inline definitions. Pure/virtual specifiers (`= 0`, `= default`,
/// `= delete`, `override`, `final`) and the trailing cv-qualifier live in
/// that region.
pub fn decompose_method(
    prefix: &str,
    declarator: Node,
    source: &str,
    tail_limit: usize,
) -> MethodModel {
    let mut method = MethodModel::default();
    let prefix_norm = normalize_whitespace(prefix);

    method.is_inline = has_token(&prefix_norm, "inline");
    method.is_static = has_token(&prefix_norm, "static");
    method.is_explicit = has_token(&prefix_norm, "explicit");
    method.is_friend = has_token(&prefix_norm, "friend");
    method.is_constexpr = has_token(&prefix_norm, "constexpr");
    method.is_virtual = has_token(&prefix_norm, "virtual");

    let mut return_type = strip_keywords(&prefix_norm, METHOD_PREFIX_KEYWORDS);

    // pointer/reference operators wrapping the function declarator belong to
    // the return type: `int* get();`
    let mut node = declarator;
    loop {
        match node.kind() {
            "pointer_declarator" => {
                method.return_type_is_pointer = true;
                if !return_type.is_empty() {
                    return_type.push('*');
                }
            }
            "reference_declarator" => {
                method.return_type_is_reference = true;
                if !return_type.is_empty() {
                    return_type.push('&');
                }
            }
            _ => break,
        }
        match node
            .child_by_field_name("declarator")
            .or_else(|| node.named_child(0))
        {
            Some(inner) => node = inner,
            None => break,
        }
    }

    if !return_type.is_empty() {
        if return_type.contains('*') {
            method.return_type_is_pointer = true;
        }
        if return_type.contains('&') {
            method.return_type_is_reference = true;
        }
        if has_token(&return_type, "const") {
            method.return_type_is_const = true;
        }
    }
    method.return_type = return_type;

    method.name = declarator_name(declarator, source).unwrap_or_else(|| ANONYMOUS.to_string());

    // The grammar may nest the parameter list arbitrarily deep inside
    // wrapper layers; search instead of assuming a fixed shape.
    let tail_start = match find_kind(declarator, "parameter_list") {
        Some(params) => {
            let mut cursor = params.walk();
            for child in params.named_children(&mut cursor) {
                match child.kind() {
                    "parameter_declaration" | "optional_parameter_declaration" => {
                        method.parameters.push(decompose_parameter(child, source));
                    }
                    _ => {}
                }
            }
            params.end_byte()
        }
        None => declarator.end_byte(),
    };

    if tail_limit > tail_start && tail_limit <= source.len() {
        apply_tail_specifiers(&mut method, &source[tail_start..tail_limit]);
    }
    method
}

/// Interpret trailing cv-qualifiers and pure/virtual specifiers
fn apply_tail_specifiers(method: &mut MethodModel, tail: &str) {
    let compact: String = tail.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.contains("=0") {
        method.is_pure_virtual = true;
        method.is_virtual = true;
    }
    if compact.contains("=default") {
        method.is_default_implementation = true;
    }
    if compact.contains("=delete") {
        method.is_deleted = true;
    }
    if has_token(tail, "const") {
        method.is_const = true;
    }
    if has_token(tail, "override") {
        method.is_override = true;
    }
    if has_token(tail, "final") {
        method.is_final = true;
    }
}

// ============================================================================
// Underlying-type flattening
// ============================================================================

/// Strip pointer/reference operators and cv/storage qualifier tokens,
/// leaving the nominal type
pub fn clean_type(text: &str) -> String {
    let no_ops: String = text
        .chars()
        .map(|c| if c == '*' || c == '&' { ' ' } else { c })
        .collect();
    no_ops
        .split_whitespace()
        .filter(|t| !TYPE_NOISE_KEYWORDS.contains(t))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Flatten a declared type into its innermost element type(s).
///
/// Known container templates are unwrapped recursively; every top-level
/// template argument contributes its own flattened types, so
/// `std::map<K, V>` yields the flattening of both `K` and `V`.
pub fn underlying_types(type_text: &str) -> Vec<String> {
    let cleaned = clean_type(type_text);
    if cleaned.is_empty() {
        return Vec::new();
    }
    match split_container(&cleaned) {
        Some(args) => args.iter().flat_map(|a| underlying_types(a)).collect(),
        None => vec![cleaned],
    }
}

/// If `cleaned` is a known container instantiation, return its top-level
/// template arguments
fn split_container(cleaned: &str) -> Option<Vec<String>> {
    let open = cleaned.find('<')?;
    if !cleaned.ends_with('>') {
        return None;
    }
    let head = cleaned[..open].trim();
    if !CONTAINER_RE.is_match(head) {
        return None;
    }
    let inner = &cleaned[open + 1..cleaned.len() - 1];
    Some(split_template_args(inner))
}

/// Split template arguments at top-level commas, tracking angle-bracket and
/// parenthesis depth so commas inside nested templates or function types are
/// not mistaken for separators
pub fn split_template_args(args: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;
    for (idx, c) in args.char_indices() {
        match c {
            '<' | '(' => depth += 1,
            '>' | ')' => depth -= 1,
            ',' if depth == 0 => {
                let part = args[start..idx].trim();
                if !part.is_empty() {
                    parts.push(part.to_string());
                }
                start = idx + 1;
            }
            _ => {}
        }
    }
    let last = args[start..].trim();
    if !last.is_empty() {
        parts.push(last.to_string());
    }
    parts
}
