//! Purpose: Hold the relation-name vocabulary used to interpret payload shapes.
//! Exports: `RelConventions`.
//! Role: Configuration constants; adapts the model to API dialect variations.
//! Invariants: Conventions are fixed per client and shared by every document it creates.

/// Relation names the model treats specially. HAL reserves `self`; the
/// `items`/`next`/`createForm` names are conventions of collection-style
/// APIs and can be renamed to match a server's dialect.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RelConventions {
    self_rel: String,
    items_rel: String,
    next_rel: String,
    create_form_rel: String,
}

impl Default for RelConventions {
    fn default() -> Self {
        Self {
            self_rel: "self".to_string(),
            items_rel: "items".to_string(),
            next_rel: "next".to_string(),
            create_form_rel: "createForm".to_string(),
        }
    }
}

impl RelConventions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items_rel(mut self, name: impl Into<String>) -> Self {
        self.items_rel = name.into();
        self
    }

    pub fn with_next_rel(mut self, name: impl Into<String>) -> Self {
        self.next_rel = name.into();
        self
    }

    pub fn with_create_form_rel(mut self, name: impl Into<String>) -> Self {
        self.create_form_rel = name.into();
        self
    }

    pub fn self_rel(&self) -> &str {
        &self.self_rel
    }

    pub fn items_rel(&self) -> &str {
        &self.items_rel
    }

    pub fn next_rel(&self) -> &str {
        &self.next_rel
    }

    pub fn create_form_rel(&self) -> &str {
        &self.create_form_rel
    }
}
