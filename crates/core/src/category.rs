use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryId(pub Uuid);

impl CategoryId {
    pub fn new() -> Self {
        CategoryId(Uuid::new_v4())
    }
}

impl Default for CategoryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named tag attached to transactions. Titles are matched exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub title: String,
}

impl Category {
    pub fn new(title: &str) -> Self {
        Category {
            id: CategoryId::new(),
            title: title.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_categories_get_distinct_ids() {
        let a = Category::new("Food");
        let b = Category::new("Food");
        assert_eq!(a.title, b.title);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn id_displays_as_hyphenated_uuid() {
        let id = CategoryId::new();
        assert_eq!(id.to_string().len(), 36);
        assert_eq!(id.to_string(), id.0.hyphenated().to_string());
    }
}
