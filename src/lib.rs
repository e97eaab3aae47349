//! cpp-header-model: semantic model extraction for C++ headers
//!
//! This library parses C++ header files with tree-sitter and builds a
//! structured model of the type definitions they declare: classes, structs
//! and unions with their properties, methods, nested enums and inheritance
//! relationships. The model serializes to JSON for downstream tooling
//! (UML round-tripping, code generation).
//!
//! Extraction is purely syntactic. There is no preprocessor, no template
//! instantiation and no name resolution; type references are recorded as
//! text. Member classification follows declarator shape, so a handful of
//! exotic declarators (function pointers with qualifiers, arrays of function
//! pointers) are known to misclassify.
//!
//! # Example
//!
//! ```ignore
//! use cpp_header_model::extract_from_source;
//!
//! let source = r#"
//! class Person {
//! public:
//!     Person();
//!     int getAge() const;
//! private:
//!     int age;
//! };
//! "#;
//!
//! let model = extract_from_source("person.h", source)?;
//! println!("{}", serde_json::to_string_pretty(&model)?);
//! ```

pub mod classify;
pub mod cli;
pub mod declarator;
pub mod error;
pub mod parsing;
pub mod schema;
pub mod visibility;
pub mod walker;

// Re-export commonly used types
pub use cli::{Cli, OutputFormat};
pub use error::{ModelError, Result};
pub use parsing::{
    build_model, extract_from_source, parse_header, parse_header_with_options, parse_source,
};
pub use schema::{
    ClassModel, EnumModel, HeaderModel, MethodModel, Multiplicity, ParameterModel, PropertyModel,
    RelationshipKind, RelationshipModel, Stereotype, Visibility, SCHEMA_VERSION,
};
pub use walker::ModelBuilder;
