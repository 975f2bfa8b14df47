use serde::{Deserialize, Serialize};

use crate::utils;

/// A catalog entry as stored and returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Book {
    /// Generated identifier
    pub id: i64,
    pub title: String,
    pub author: String,
    /// Free text, empty when not provided
    pub description: String,
}

/// Request body for creating or fully replacing a book.
///
/// Any `id` in the body is ignored; the path or the store decides it.
/// Missing fields deserialize as empty so they fail validation instead of
/// parsing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BookInput {
    pub title: String,
    pub author: String,
    pub description: Option<String>,
}

impl BookInput {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            description: Some(description.into()),
        }
    }

    /// Required fields that are empty or whitespace-only.
    pub fn blank_fields(&self) -> Vec<&'static str> {
        utils::blank_fields(&[("title", self.title.as_str()), ("author", self.author.as_str())])
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_default_to_empty() {
        let input: BookInput = serde_json::from_str(r#"{"title": "Dune"}"#).unwrap();

        assert_eq!(input.title, "Dune");
        assert_eq!(input.author, "");
        assert_eq!(input.description(), "");
        assert_eq!(input.blank_fields(), vec!["author"]);
    }

    #[test]
    fn id_in_body_is_ignored() {
        let input: BookInput =
            serde_json::from_str(r#"{"id": 99, "title": "Dune", "author": "Herbert"}"#).unwrap();

        assert!(input.blank_fields().is_empty());
    }

    #[test]
    fn null_description_is_empty() {
        let input: BookInput =
            serde_json::from_str(r#"{"title": "Dune", "author": "Herbert", "description": null}"#)
                .unwrap();

        assert_eq!(input.description(), "");
    }
}
