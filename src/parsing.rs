//! Parser setup and the extraction pipeline
//!
//! Thin layer over tree-sitter: configure the C++ grammar, parse one header,
//! walk the tree into a [`HeaderModel`] and run the classification pass.
//! The syntax tree is consumed read-only and dropped before returning.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};
use tree_sitter::{Parser, Tree};

use crate::classify::classify;
use crate::error::{ModelError, Result};
use crate::schema::HeaderModel;
use crate::walker::ModelBuilder;

/// Parse C++ source text into a syntax tree
pub fn parse_source(source: &str) -> Result<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_cpp::LANGUAGE.into())
        .map_err(|e| ModelError::ParseFailure {
            message: format!("failed to load C++ grammar: {e}"),
        })?;

    parser.parse(source, None).ok_or_else(|| ModelError::ParseFailure {
        message: "parser returned no tree".to_string(),
    })
}

/// Walk a parsed tree into a classified model.
///
/// Grammar errors inside the tree degrade the affected members but do not
/// abort extraction; a header full of `ERROR` nodes still yields a model.
pub fn build_model(file_name: &str, tree: &Tree, source: &str) -> Result<HeaderModel> {
    if tree.root_node().has_error() {
        warn!(file = file_name, "syntax errors in header, extracting best-effort model");
    }

    let mut header = ModelBuilder::new(file_name).build(tree, source)?;
    classify(&mut header);
    debug!(
        file = file_name,
        classes = header.classes.len(),
        enums = header.enums.len(),
        "extraction complete"
    );
    Ok(header)
}

/// Read, parse and extract one header file
pub fn parse_header(path: &Path) -> Result<HeaderModel> {
    parse_header_with_options(path, false)
}

/// Like [`parse_header`], optionally dumping the raw syntax tree to stderr
pub fn parse_header_with_options(path: &Path, print_ast: bool) -> Result<HeaderModel> {
    if !path.exists() {
        return Err(ModelError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let source = fs::read_to_string(path)?;
    let tree = parse_source(&source)?;

    if print_ast {
        eprintln!("{}", tree.root_node().to_sexp());
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    build_model(&file_name, &tree, &source)
}

/// Parse in-memory source under a synthetic file name.
/// Test and embedding convenience; the CLI goes through [`parse_header`].
pub fn extract_from_source(file_name: &str, source: &str) -> Result<HeaderModel> {
    let tree = parse_source(source)?;
    build_model(file_name, &tree, source)
}
