//! Scoped access-level tracking for class bodies
//!
//! C++ access defaults depend on the class-key: `class` bodies start private,
//! `struct`/`union` bodies start public. Levels are scoped per type
//! definition, so nested classes restore the enclosing level on exit.

use crate::schema::Visibility;

/// Stack of active access levels, one entry per open type-definition scope.
///
/// The bottom entry corresponds to translation-unit scope; it exists so
/// `current()` never fails, but top-level declarations are not class members
/// and never consult it.
#[derive(Debug)]
pub struct VisibilityTracker {
    stack: Vec<Visibility>,
}

impl VisibilityTracker {
    pub fn new() -> Self {
        Self {
            stack: vec![Visibility::Private],
        }
    }

    /// Push the default level for a type body: private for `class`,
    /// public for anything else (struct/union)
    pub fn enter_scope(&mut self, class_key: &str) {
        let default = if class_key == "class" {
            Visibility::Private
        } else {
            Visibility::Public
        };
        self.stack.push(default);
    }

    /// Replace the current level from an access-specifier token.
    /// Unrecognized text is a no-op.
    pub fn set_current(&mut self, access_specifier: &str) {
        let level = match access_specifier.trim() {
            "public" => Visibility::Public,
            "protected" => Visibility::Protected,
            "private" => Visibility::Private,
            _ => return,
        };
        if let Some(top) = self.stack.last_mut() {
            *top = level;
        }
    }

    /// Pop the scope, restoring the enclosing level
    pub fn leave_scope(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    /// The level applied to members declared right now
    pub fn current(&self) -> Visibility {
        *self.stack.last().unwrap_or(&Visibility::Private)
    }
}

impl Default for VisibilityTracker {
    fn default() -> Self {
        Self::new()
    }
}
