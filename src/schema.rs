//! Semantic model data structures for C++ header extraction
//!
//! The types in this module are the contract consumed by downstream tooling
//! (UML round-tripping, code generation). Field names and nesting are stable;
//! collection fields are always present in serialized output, even when empty.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Current schema version for output stability
pub const SCHEMA_VERSION: &str = "1.0";

/// Classification tag of a type definition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Stereotype {
    #[default]
    Class,
    Struct,
    Interface,
    AbstractClass,
}

/// Member access level
///
/// `None` means the walker never stamped a level; the classifier replaces it
/// with the global fallback (private for properties, public for methods)
/// before the model is handed off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    None,
    Public,
    Protected,
    Private,
}

/// Relationship kind between two type definitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationshipKind {
    Generalization,
    Realization,
    Dependency,
    Association,
    UnidirectionalAssociation,
    Composition,
    Aggregation,
}

/// Multiplicity category on the target end of a relationship
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Multiplicity {
    /// No multiplicity recorded
    #[default]
    None,
    /// Exactly one
    ToOne,
    /// Fixed number of elements (size in `target_fixed_size`)
    ToFixed,
    /// Unbounded (`0..*` style)
    ToMany,
}

/// Root container for one parsed header, created once per walk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderModel {
    /// Source file name this model was built from
    pub file_name: String,

    /// All classes/structs/unions, flat, in document order.
    /// Nested class definitions register here as well.
    pub classes: Vec<ClassModel>,

    /// Top-level (non-member) enums in document order
    pub enums: Vec<EnumModel>,
}

/// One class, struct or union definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassModel {
    /// Declared name, qualified with the enclosing `::`-joined namespace path
    pub name: String,

    /// Provisional at creation (from the class-key token); may be upgraded to
    /// Interface/AbstractClass by the classifier once all members are known
    pub stereotype: Stereotype,

    /// Value properties (fields)
    pub properties: Vec<PropertyModel>,

    /// Member functions, including constructors and destructors
    pub methods: Vec<MethodModel>,

    /// Enums declared inside this class body
    pub nested_enums: Vec<EnumModel>,

    /// Inheritance edges, one per base in the base-clause
    pub generalizations: Vec<RelationshipModel>,

    /// Interface realizations
    pub realizations: Vec<RelationshipModel>,

    /// Dependency edges
    pub dependencies: Vec<RelationshipModel>,

    /// Bidirectional associations
    pub associations: Vec<RelationshipModel>,

    /// Unidirectional associations
    pub unidirectional_associations: Vec<RelationshipModel>,

    /// Composition edges
    pub compositions: Vec<RelationshipModel>,

    /// Aggregation edges
    pub aggregations: Vec<RelationshipModel>,
}

/// One member variable
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyModel {
    /// Declared name, `(anonymous)` when no identifier could be located
    pub name: String,

    /// Base type text, without declarator modifiers
    #[serde(rename = "type")]
    pub type_name: String,

    /// Base type plus the declarator's own tokens, whitespace-normalized
    pub full_type: String,

    pub visibility: Visibility,

    pub is_static: bool,
    pub is_pointer: bool,
    pub is_reference: bool,
    pub is_array: bool,

    /// Bracket expression text of the array suffix, when `is_array` is set.
    /// Multi-dimensional declarators concatenate dimensions comma-separated;
    /// only the first dimension is structurally guaranteed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array_size: Option<String>,

    pub is_const: bool,
    pub is_volatile: bool,
    pub is_mutable: bool,
    pub is_signed: bool,
    pub is_unsigned: bool,
    pub is_short: bool,
    pub is_long: bool,

    /// Right-hand side of a brace-or-equals initializer, without the `=`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,

    /// Innermost element type(s) after flattening containers and stripping
    /// modifiers; a single entry for non-container types
    pub underlying_type: Vec<String>,
}

/// One member function
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodModel {
    /// Declared name; destructors keep the leading `~`
    pub name: String,

    /// Return type text after stripping prefix keywords; empty for
    /// constructors and destructors
    pub return_type: String,

    pub return_type_is_pointer: bool,
    pub return_type_is_reference: bool,
    pub return_type_is_const: bool,

    pub parameters: Vec<ParameterModel>,

    pub is_virtual: bool,
    pub is_pure_virtual: bool,
    pub is_static: bool,
    pub is_explicit: bool,
    pub is_inline: bool,
    pub is_friend: bool,
    pub is_constexpr: bool,

    /// Trailing cv-qualifier `const`
    pub is_const: bool,

    /// `= default`
    pub is_default_implementation: bool,
    /// `= delete`
    pub is_deleted: bool,
    pub is_override: bool,
    pub is_final: bool,

    pub visibility: Visibility,
}

/// One method parameter: a property plus rvalue-reference marking
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterModel {
    #[serde(flatten)]
    pub property: PropertyModel,

    /// `&&` in the parameter's declarator
    pub is_r_value_reference: bool,
}

/// One enum definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumModel {
    /// Declared name, namespace-qualified; `(anonymous enum)` when unnamed
    pub name: String,

    /// `enum class` / `enum struct`
    pub is_scoped: bool,

    /// Enum-base clause type, defaulting to `int` when absent
    pub underlying_type: String,

    /// Enumerator name → display label, in declaration order.
    /// Labels are populated externally; extraction leaves them empty.
    pub values: IndexMap<String, String>,
}

/// A structural link to another type definition.
///
/// The target is recorded by name only, as a weak reference that is never
/// resolved to a `ClassModel`; resolution is a separate linker's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipModel {
    pub kind: RelationshipKind,

    /// Name text of the target type
    pub target_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_stereotype: Option<Stereotype>,

    pub target_multiplicity: Multiplicity,

    /// Element count when `target_multiplicity` is `ToFixed`; the classifier
    /// defaults this to 1 when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_fixed_size: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_role_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_role_name: Option<String>,

    /// Association visibility (association kinds only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
}

impl RelationshipModel {
    /// New relationship of the given kind pointing at `target_name`,
    /// with no multiplicity or role information
    pub fn new(kind: RelationshipKind, target_name: impl Into<String>) -> Self {
        Self {
            kind,
            target_name: target_name.into(),
            target_stereotype: None,
            target_multiplicity: Multiplicity::None,
            target_fixed_size: None,
            source_role_name: None,
            target_role_name: None,
            visibility: None,
        }
    }
}

impl ClassModel {
    /// New class with the given qualified name and provisional stereotype
    pub fn new(name: impl Into<String>, stereotype: Stereotype) -> Self {
        Self {
            name: name.into(),
            stereotype,
            ..Default::default()
        }
    }

    /// Unqualified tail of the class name (`a::b::C` → `C`),
    /// used for constructor detection
    pub fn simple_name(&self) -> &str {
        self.name.rsplit("::").next().unwrap_or(&self.name)
    }
}

impl MethodModel {
    /// True when this method is a constructor of `class_name`:
    /// same unqualified name and no return type
    pub fn is_constructor_of(&self, class_name: &str) -> bool {
        let simple = class_name.rsplit("::").next().unwrap_or(class_name);
        self.return_type.is_empty() && self.name == simple
    }

    /// True for destructors (`~` prefix)
    pub fn is_destructor(&self) -> bool {
        self.name.starts_with('~')
    }
}
