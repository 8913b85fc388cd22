use serde::Deserialize;
use utoipa::ToSchema;

/// `page` is kept as text: list endpoints answer 404 for a non-numeric page
/// while the catalog falls back to the first one. List endpoints also accept
/// `last` for the last page.
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
pub struct PageQuery {
    pub page: Option<String>,
    pub per_page: Option<i64>,
}

// Fields are repeated rather than flattened: query strings deserialize
// flattened numbers as text and reject them.
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<i64>,
}

impl SearchQuery {
    pub fn search(&self) -> Option<&str> {
        self.q.as_deref().filter(|s| !s.is_empty())
    }
}
