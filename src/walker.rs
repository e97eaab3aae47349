//! Tree walker: builds the semantic model from a parsed C++ header
//!
//! Single top-to-bottom depth-first pass over the syntax tree. The builder
//! threads three stacks through the traversal (namespace qualifiers, open
//! classes, visibility scopes); all state is local to one walk, so
//! independent walks never share anything.
//!
//! Errors raised while processing one member are caught at the member
//! boundary: the offending member degrades or is skipped and siblings
//! continue. Only hard violations of the assumed tree shape propagate.

use tracing::{debug, warn};
use tree_sitter::{Node, Tree};

use crate::declarator::{
    self, decompose_field, decompose_method, default_value_text, node_text, normalize_whitespace,
    ANONYMOUS,
};
use crate::error::{ModelError, Result};
use crate::schema::{
    ClassModel, EnumModel, HeaderModel, RelationshipKind, RelationshipModel, Stereotype,
};
use crate::visibility::VisibilityTracker;

/// One-walk model builder. Create, call [`ModelBuilder::build`], discard.
pub struct ModelBuilder {
    header: HeaderModel,
    namespaces: Vec<String>,
    /// Indices into `header.classes` for the currently open class nesting.
    /// The vector is append-only during a walk, so indices stay valid.
    class_stack: Vec<usize>,
    visibility: VisibilityTracker,
}

impl ModelBuilder {
    pub fn new(file_name: &str) -> Self {
        Self {
            header: HeaderModel {
                file_name: file_name.to_string(),
                classes: Vec::new(),
                enums: Vec::new(),
            },
            namespaces: Vec::new(),
            class_stack: Vec::new(),
            visibility: VisibilityTracker::new(),
        }
    }

    /// Walk the translation unit and hand back the raw model.
    ///
    /// Always yields a model for a well-formed tree, even an empty one;
    /// fails only when the tree root violates the translation-unit contract.
    pub fn build(mut self, tree: &Tree, source: &str) -> Result<HeaderModel> {
        let root = tree.root_node();
        if root.kind() != "translation_unit" {
            return Err(ModelError::ExtractionFailure {
                message: format!("expected a translation unit, got `{}`", root.kind()),
            });
        }
        self.walk_scope(root, source);
        Ok(self.header)
    }

    /// Visit each declaration in a translation unit or namespace body
    fn walk_scope(&mut self, scope: Node, source: &str) {
        let mut cursor = scope.walk();
        for child in scope.named_children(&mut cursor) {
            self.dispatch_declaration(child, source);
        }
    }

    fn dispatch_declaration(&mut self, node: Node, source: &str) {
        match node.kind() {
            "namespace_definition" => self.handle_namespace(node, source),
            "class_specifier" | "struct_specifier" | "union_specifier" => {
                if let Err(e) = self.handle_class(node, source) {
                    warn!(kind = node.kind(), error = %e, "skipping malformed type definition");
                }
            }
            "enum_specifier" => self.handle_enum(node, source),
            "template_declaration" => self.walk_scope(node, source),
            "declaration" => {
                // `class A { ... } a;` style: the definition rides on the
                // declaration's type
                if let Some(type_node) = node.child_by_field_name("type") {
                    self.handle_bare_type(type_node, source);
                }
            }
            other => debug!(kind = other, "ignoring top-level node"),
        }
    }

    /// A class/enum specifier encountered as the type of a declaration or a
    /// declarator-less member: extract the definition when a body is present
    fn handle_bare_type(&mut self, type_node: Node, source: &str) {
        match type_node.kind() {
            "class_specifier" | "struct_specifier" | "union_specifier"
                if type_node.child_by_field_name("body").is_some() =>
            {
                if let Err(e) = self.handle_class(type_node, source) {
                    warn!(error = %e, "skipping malformed nested type definition");
                }
            }
            "enum_specifier" if type_node.child_by_field_name("body").is_some() => {
                self.handle_enum(type_node, source);
            }
            _ => {}
        }
    }

    // ------------------------------------------------------------------
    // Namespaces
    // ------------------------------------------------------------------

    fn handle_namespace(&mut self, node: Node, source: &str) {
        let name = node
            .child_by_field_name("name")
            .map(|n| node_text(&n, source))
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| ANONYMOUS.to_string());
        self.namespaces.push(name);

        let body = node
            .child_by_field_name("body")
            .or_else(|| declarator::find_kind(node, "declaration_list"));
        if let Some(body) = body {
            self.walk_scope(body, source);
        }

        self.namespaces.pop();
    }

    /// Qualify a simple name with the `::`-joined namespace stack
    fn qualified(&self, simple: &str) -> String {
        if self.namespaces.is_empty() {
            simple.to_string()
        } else {
            format!("{}::{}", self.namespaces.join("::"), simple)
        }
    }

    // ------------------------------------------------------------------
    // Classes
    // ------------------------------------------------------------------

    fn handle_class(&mut self, node: Node, source: &str) -> Result<()> {
        // a specifier without a body is a forward declaration, not a definition
        let Some(body) = node.child_by_field_name("body") else {
            return Ok(());
        };
        if node.is_error() {
            return Err(ModelError::ExtractionFailure {
                message: "type specifier node is malformed".to_string(),
            });
        }

        let class_key = match node.kind() {
            "class_specifier" => "class",
            "struct_specifier" => "struct",
            _ => "union",
        };
        let stereotype = match class_key {
            "class" => Stereotype::Class,
            "struct" => Stereotype::Struct,
            _ => Stereotype::Class,
        };
        let name = node
            .child_by_field_name("name")
            .map(|n| node_text(&n, source))
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| ANONYMOUS.to_string());

        let mut class = ClassModel::new(self.qualified(&name), stereotype);
        self.collect_base_clause(node, source, &mut class);
        debug!(class = %class.name, key = class_key, "entering type definition");

        let idx = self.header.classes.len();
        self.header.classes.push(class);
        self.visibility.enter_scope(class_key);
        self.class_stack.push(idx);

        let mut cursor = body.walk();
        for member in body.named_children(&mut cursor) {
            if let Err(e) = self.dispatch_member(member, source) {
                warn!(kind = member.kind(), error = %e, "member degraded, continuing with siblings");
            }
        }

        self.class_stack.pop();
        self.visibility.leave_scope();
        Ok(())
    }

    /// One Generalization per base in the base-clause, by name only
    fn collect_base_clause(&self, node: Node, source: &str, class: &mut ClassModel) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() != "base_class_clause" {
                continue;
            }
            let mut base_cursor = child.walk();
            for base in child.named_children(&mut base_cursor) {
                if matches!(
                    base.kind(),
                    "type_identifier" | "qualified_identifier" | "template_type"
                ) {
                    let name = normalize_whitespace(&node_text(&base, source));
                    if !name.is_empty() {
                        class
                            .generalizations
                            .push(RelationshipModel::new(RelationshipKind::Generalization, name));
                    }
                }
            }
        }
    }

    fn current_class(&mut self) -> Option<&mut ClassModel> {
        let idx = *self.class_stack.last()?;
        self.header.classes.get_mut(idx)
    }

    // ------------------------------------------------------------------
    // Member specification
    // ------------------------------------------------------------------

    fn dispatch_member(&mut self, node: Node, source: &str) -> Result<()> {
        match node.kind() {
            "access_specifier" => {
                let text = node_text(&node, source);
                self.visibility
                    .set_current(text.trim().trim_end_matches(':').trim());
            }
            "function_definition" => self.handle_function_definition(node, source),
            "field_declaration" | "declaration" => self.handle_member_declaration(node, source)?,
            "class_specifier" | "struct_specifier" | "union_specifier" => {
                self.handle_class(node, source)?;
            }
            "enum_specifier" => self.handle_enum(node, source),
            "template_declaration" => {
                let mut cursor = node.walk();
                let children: Vec<Node> = node.named_children(&mut cursor).collect();
                for child in children {
                    self.dispatch_member(child, source)?;
                }
            }
            "friend_declaration" => self.handle_friend(node, source),
            "comment" => {}
            other => debug!(kind = other, "ignoring member node"),
        }
        Ok(())
    }

    /// Field vs. method-prototype disambiguation: after skipping leading
    /// pointer/reference operators (those belong to the return type, as in
    /// `const char* name() const;`), a declarator is a method prototype iff
    /// the token text before its first `(` contains no `*` and does not end
    /// with `)`. A function pointer like `(*cb)(int)` starts with `(`, so
    /// its head is empty and it classifies as a method; arrays of function
    /// pointers are a known misclassification case.
    fn is_method_prototype(declarator: Node, source: &str) -> bool {
        let text = normalize_whitespace(&node_text(&declarator, source));
        let trimmed = text.trim_start_matches(|c: char| c == '*' || c == '&' || c.is_whitespace());
        match trimmed.find('(') {
            None => false,
            Some(idx) => {
                let head = trimmed[..idx].trim();
                !head.contains('*') && !head.ends_with(')')
            }
        }
    }

    fn handle_member_declaration(&mut self, node: Node, source: &str) -> Result<()> {
        let mut cursor = node.walk();
        let declarators: Vec<Node> = node.children_by_field_name("declarator", &mut cursor).collect();

        // a declarator-less member is a nested type definition (or nothing)
        if let Some(type_node) = node.child_by_field_name("type") {
            self.handle_bare_type(type_node, source);
        }
        if declarators.is_empty() {
            return Ok(());
        }

        let base_end = declarators[0].start_byte();
        let base = source
            .get(node.start_byte()..base_end)
            .unwrap_or("")
            .trim()
            .to_string();
        let visibility = self.visibility.current();
        let single = declarators.len() == 1;
        let node_default = node.child_by_field_name("default_value");
        let end_byte = node.end_byte();

        for outer in declarators {
            // comma groups arrive as one declarator each; initializers may be
            // folded into an init_declarator wrapper
            let (decl, init_value) = if outer.kind() == "init_declarator" {
                (
                    outer.child_by_field_name("declarator").unwrap_or(outer),
                    outer.child_by_field_name("value"),
                )
            } else {
                (outer, None)
            };

            let Some(class) = self.current_class() else {
                return Err(ModelError::ExtractionFailure {
                    message: "member declaration outside any open class".to_string(),
                });
            };

            if Self::is_method_prototype(decl, source) {
                let mut method = decompose_method(&base, decl, source, end_byte);
                method.visibility = visibility;
                class.methods.push(method);
            } else {
                let mut property = decompose_field(&base, decl, source);
                property.visibility = visibility;
                if let Some(value) = init_value {
                    property.default_value = Some(default_value_text(value, source));
                } else if single {
                    if let Some(value) = node_default {
                        property.default_value = Some(default_value_text(value, source));
                    }
                }
                class.properties.push(property);
            }
        }
        Ok(())
    }

    /// Inline member definition: `int getAge() const { return age; }`
    fn handle_function_definition(&mut self, node: Node, source: &str) {
        let Some(decl) = node.child_by_field_name("declarator") else {
            warn!("function definition without declarator, skipping");
            return;
        };
        let prefix = source.get(node.start_byte()..decl.start_byte()).unwrap_or("");
        let tail_limit = node
            .child_by_field_name("body")
            .map(|b| b.start_byte())
            .unwrap_or_else(|| node.end_byte());

        let mut method = decompose_method(prefix, decl, source, tail_limit);
        method.visibility = self.visibility.current();

        if let Some(class) = self.current_class() {
            class.methods.push(method);
        } else {
            debug!(name = %method.name, "free function definition ignored");
        }
    }

    /// A friend function declaration becomes a method with `is_friend` set;
    /// `friend class X;` carries no member and is skipped
    fn handle_friend(&mut self, node: Node, source: &str) {
        let Some(func) = declarator::find_kind(node, "function_declarator") else {
            return;
        };
        let prefix = source.get(node.start_byte()..func.start_byte()).unwrap_or("");
        let mut method = decompose_method(prefix, func, source, node.end_byte());
        method.is_friend = true;
        method.visibility = self.visibility.current();
        if let Some(class) = self.current_class() {
            class.methods.push(method);
        }
    }

    // ------------------------------------------------------------------
    // Enums
    // ------------------------------------------------------------------

    fn handle_enum(&mut self, node: Node, source: &str) {
        let simple = node
            .child_by_field_name("name")
            .map(|n| node_text(&n, source))
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "(anonymous enum)".to_string());

        let mut model = EnumModel {
            name: self.qualified(&simple),
            is_scoped: Self::enum_is_scoped(node),
            underlying_type: Self::enum_base_type(node, source).unwrap_or_else(|| "int".to_string()),
            values: Default::default(),
        };

        if let Some(body) = node.child_by_field_name("body") {
            let mut cursor = body.walk();
            for child in body.named_children(&mut cursor) {
                if child.kind() != "enumerator" {
                    continue;
                }
                let name = child
                    .child_by_field_name("name")
                    .map(|n| node_text(&n, source))
                    .unwrap_or_default();
                if !name.is_empty() && !model.values.contains_key(&name) {
                    // display labels are populated externally
                    model.values.insert(name, String::new());
                }
            }
        }

        match self.current_class() {
            Some(class) => class.nested_enums.push(model),
            None => self.header.enums.push(model),
        }
    }

    /// `enum class` / `enum struct` carry a class-key token before the name
    fn enum_is_scoped(node: Node) -> bool {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if matches!(child.kind(), "class" | "struct") {
                return true;
            }
        }
        false
    }

    /// Enum-base clause type, when present
    fn enum_base_type(node: Node, source: &str) -> Option<String> {
        if let Some(base) = node.child_by_field_name("base") {
            return Some(normalize_whitespace(&node_text(&base, source)));
        }
        // fallback: a type node between the name and the body
        let body_start = node.child_by_field_name("body")?.start_byte();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.start_byte() < body_start
                && matches!(
                    child.kind(),
                    "primitive_type" | "sized_type_specifier" | "qualified_identifier"
                )
            {
                return Some(normalize_whitespace(&node_text(&child, source)));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Visibility;
    use tree_sitter::Parser;

    fn build(source: &str) -> HeaderModel {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_cpp::LANGUAGE.into())
            .unwrap();
        let tree = parser.parse(source, None).unwrap();
        ModelBuilder::new("test.h").build(&tree, source).unwrap()
    }

    #[test]
    fn test_empty_translation_unit() {
        let model = build("");
        assert_eq!(model.file_name, "test.h");
        assert!(model.classes.is_empty());
        assert!(model.enums.is_empty());
    }

    #[test]
    fn test_class_key_visibility_defaults() {
        let model = build("class C { int hidden; };\nstruct S { int open; };");
        assert_eq!(model.classes.len(), 2);
        assert_eq!(model.classes[0].properties[0].visibility, Visibility::Private);
        assert_eq!(model.classes[1].properties[0].visibility, Visibility::Public);
    }

    #[test]
    fn test_access_specifier_switches_level() {
        let model = build(
            "class C {\npublic:\n  int a;\nprotected:\n  int b;\nprivate:\n  int c;\n};",
        );
        let props = &model.classes[0].properties;
        assert_eq!(props[0].visibility, Visibility::Public);
        assert_eq!(props[1].visibility, Visibility::Protected);
        assert_eq!(props[2].visibility, Visibility::Private);
    }

    #[test]
    fn test_namespace_qualifies_names() {
        let model = build("namespace app { namespace model { class Person {}; } }");
        assert_eq!(model.classes[0].name, "app::model::Person");
    }

    #[test]
    fn test_anonymous_namespace_marker() {
        let model = build("namespace { class Hidden {}; }");
        assert_eq!(model.classes[0].name, "(anonymous)::Hidden");
    }

    #[test]
    fn test_base_clause_generalizations() {
        let model = build("class Derived : public Base, private Mixin {};");
        let gens = &model.classes[0].generalizations;
        assert_eq!(gens.len(), 2);
        assert_eq!(gens[0].target_name, "Base");
        assert_eq!(gens[1].target_name, "Mixin");
        assert_eq!(gens[0].kind, RelationshipKind::Generalization);
    }

    #[test]
    fn test_comma_grouped_declarators() {
        let model = build("struct S { int a, b, c; };");
        let names: Vec<&str> = model.classes[0]
            .properties
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_method_prototype_vs_field() {
        let model = build("class C { int x; void run(); };");
        let class = &model.classes[0];
        assert_eq!(class.properties.len(), 1);
        assert_eq!(class.properties[0].name, "x");
        assert_eq!(class.methods.len(), 1);
        assert_eq!(class.methods[0].name, "run");
        assert_eq!(class.methods[0].return_type, "void");
    }

    #[test]
    fn test_constructor_and_destructor() {
        let model = build("class C {\npublic:\n  C();\n  ~C();\n};");
        let methods = &model.classes[0].methods;
        assert_eq!(methods.len(), 2);
        assert_eq!(methods[0].name, "C");
        assert_eq!(methods[0].return_type, "");
        assert_eq!(methods[1].name, "~C");
    }

    #[test]
    fn test_pointer_returning_prototype_is_a_method() {
        let model = build("class C { const char* name() const; int* count; char** argv(); };");
        let class = &model.classes[0];

        let names: Vec<&str> = class.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["name", "argv"]);
        assert!(class.methods[0].return_type_is_pointer);
        assert!(class.methods[0].is_const);

        // pointer fields without a parameter list stay properties
        assert_eq!(class.properties.len(), 1);
        assert_eq!(class.properties[0].name, "count");
        assert!(class.properties[0].is_pointer);
    }

    #[test]
    fn test_reference_returning_prototype_is_a_method() {
        let model = build("class C { int& at(int i); };");
        let class = &model.classes[0];
        assert_eq!(class.methods.len(), 1);
        assert_eq!(class.methods[0].name, "at");
        assert!(class.methods[0].return_type_is_reference);
        assert!(class.properties.is_empty());
    }

    #[test]
    fn test_inline_definition_is_a_method() {
        let model = build("class C { int get() const { return 1; } };");
        let method = &model.classes[0].methods[0];
        assert_eq!(method.name, "get");
        assert!(method.is_const);
        assert_eq!(method.return_type, "int");
    }

    #[test]
    fn test_defaulted_and_deleted_methods() {
        let model = build("class C {\npublic:\n  C() = default;\n  C(const C&) = delete;\n};");
        let methods = &model.classes[0].methods;
        assert!(methods[0].is_default_implementation);
        assert!(methods[1].is_deleted);
    }

    #[test]
    fn test_override_and_final() {
        let model = build("class C : public B { void run() override; void stop() final; };");
        let methods = &model.classes[0].methods;
        assert!(methods[0].is_override);
        assert!(methods[1].is_final);
    }

    #[test]
    fn test_nested_enum_attaches_to_class() {
        let model = build("class C { enum Color { Red, Green }; };");
        let class = &model.classes[0];
        assert_eq!(class.nested_enums.len(), 1);
        let nested = &class.nested_enums[0];
        assert_eq!(nested.name, "Color");
        assert!(!nested.is_scoped);
        let keys: Vec<&String> = nested.values.keys().collect();
        assert_eq!(keys, vec!["Red", "Green"]);
    }

    #[test]
    fn test_top_level_scoped_enum() {
        let model = build("enum class Level : uint8_t { Low, High };");
        assert_eq!(model.enums.len(), 1);
        let level = &model.enums[0];
        assert!(level.is_scoped);
        assert_eq!(level.underlying_type, "uint8_t");
        assert_eq!(level.values.len(), 2);
    }

    #[test]
    fn test_unscoped_enum_defaults_to_int() {
        let model = build("enum Flags { A, B };");
        assert_eq!(model.enums[0].underlying_type, "int");
        assert!(!model.enums[0].is_scoped);
    }

    #[test]
    fn test_nested_class_registers_flat_in_order() {
        let model = build("class Outer { class Inner {}; };");
        let names: Vec<&str> = model.classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Outer", "Inner"]);
    }

    #[test]
    fn test_nested_class_restores_visibility_scope() {
        let model = build(
            "class Outer {\npublic:\n  struct Inner { int i; };\n  int after;\n};",
        );
        let outer = model.classes.iter().find(|c| c.name == "Outer").unwrap();
        assert_eq!(outer.properties[0].name, "after");
        assert_eq!(outer.properties[0].visibility, Visibility::Public);
        let inner = model.classes.iter().find(|c| c.name == "Outer::Inner");
        // nested classes register flat, without outer-class qualification
        assert!(inner.is_none());
    }

    #[test]
    fn test_forward_declaration_is_not_a_class() {
        let model = build("class Forward;\nclass Real {};");
        assert_eq!(model.classes.len(), 1);
        assert_eq!(model.classes[0].name, "Real");
    }

    #[test]
    fn test_degraded_member_does_not_abort_siblings() {
        // the garbage member may produce a placeholder or be skipped, but
        // `ok` must survive
        let model = build("class C {\n  int @@@;\n  int ok;\n};");
        let class = &model.classes[0];
        assert!(class.properties.iter().any(|p| p.name == "ok"));
    }

    #[test]
    fn test_walk_is_deterministic() {
        let source = "class A : public B { int x; void f(); enum E { V }; };";
        let first = build(source);
        let second = build(source);
        assert_eq!(first, second);
    }

    #[test]
    fn test_template_class_contributes_wrapped_class() {
        let model = build("template <typename T> class Box { T item; };");
        assert_eq!(model.classes.len(), 1);
        assert_eq!(model.classes[0].name, "Box");
        assert_eq!(model.classes[0].properties[0].name, "item");
    }

    #[test]
    fn test_union_maps_to_class_with_public_members() {
        let model = build("union U { int i; float f; };");
        let class = &model.classes[0];
        assert_eq!(class.stereotype, Stereotype::Class);
        assert_eq!(class.properties[0].visibility, Visibility::Public);
    }
}
