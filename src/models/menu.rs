use serde::{Deserialize, Serialize};

/// A named group of catalog items. Items are referenced by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Menu {
    pub name: String,
    pub description: String,
    pub parent: Option<String>,
    pub items: Vec<String>,
}

impl Menu {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parent: None,
            items: Vec::new(),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Adds an item name unless the menu already lists it.
    pub fn add_item(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.items.contains(&name) {
            self.items.push(name);
        }
    }

    pub fn has_items(&self) -> bool {
        !self.items.is_empty()
    }
}
