//! Combined search and pagination over notes.
//!
//! One call answers "page N of notes matching a free-text query AND a set
//! of tags, sorted by field/direction". The text filter runs against the
//! stored plain-text projection; the tag filter is an intersection, one
//! EXISTS subquery per required tag.

use async_trait::async_trait;
use sqlx::SqlitePool;

use quill_core::{
    Error, Result, SearchNotesRequest, SearchNotesResponse, SearchProvider,
};

use crate::notes::row_to_note;

/// SQLite implementation of [`SearchProvider`].
#[derive(Debug, Clone)]
pub struct SqliteSearchProvider {
    pool: SqlitePool,
}

impl SqliteSearchProvider {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Escape LIKE wildcards in user input so they match literally.
pub fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn where_clause(req: &SearchNotesRequest) -> String {
    let mut clauses: Vec<String> = Vec::new();
    if !req.query.is_empty() {
        clauses.push("n.search_text LIKE ? ESCAPE '\\'".to_string());
    }
    for _ in &req.tag_ids {
        clauses.push(
            "EXISTS (SELECT 1 FROM note_tag nt WHERE nt.note_id = n.id AND nt.tag_id = ?)"
                .to_string(),
        );
    }
    if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    }
}

#[async_trait]
impl SearchProvider for SqliteSearchProvider {
    async fn search(&self, req: SearchNotesRequest) -> Result<SearchNotesResponse> {
        req.validate()?;

        let filter = where_clause(&req);
        let pattern = if req.query.is_empty() {
            None
        } else {
            Some(format!("%{}%", escape_like(&req.query)))
        };

        let count_sql = format!("SELECT COUNT(*) FROM note n{filter}");
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(ref pattern) = pattern {
            count_query = count_query.bind(pattern);
        }
        for tag_id in &req.tag_ids {
            count_query = count_query.bind(*tag_id);
        }
        let total = count_query
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

        // Secondary sort on id keeps pagination stable when timestamps tie.
        let page_sql = format!(
            "SELECT n.id, n.content, n.created_at, n.updated_at FROM note n{filter}
             ORDER BY n.{column} {dir}, n.id {dir} LIMIT ? OFFSET ?",
            column = req.order_by.column(),
            dir = req.order.sql(),
        );
        let mut page_query = sqlx::query(&page_sql);
        if let Some(ref pattern) = pattern {
            page_query = page_query.bind(pattern);
        }
        for tag_id in &req.tag_ids {
            page_query = page_query.bind(*tag_id);
        }
        let rows = page_query
            .bind(req.page_size as i64)
            .bind(req.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        let items = rows.iter().map(row_to_note).collect::<Result<Vec<_>>>()?;

        Ok(SearchNotesResponse { items, total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_passes_plain_text() {
        assert_eq!(escape_like("hello world"), "hello world");
    }

    #[test]
    fn test_escape_like_escapes_wildcards() {
        assert_eq!(escape_like("100%_done\\"), "100\\%\\_done\\\\");
    }
}
