// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Full-text search over the FTS5 mirror with BM25 ranking.

use mnemo_core::{MemoryCategory, MnemoError, SearchHit};

use crate::database::{Database, map_tr_err};
use crate::queries::records::record_from_row;

/// Characters FTS5 treats as query syntax; stripped from user tokens.
const FTS5_CONTROL_CHARS: &[char] = &['*', '"', '(', ')', ':', '^', '{', '}'];

/// Sanitize raw user input into an FTS5 MATCH expression.
///
/// Tokenizes on whitespace, strips control characters, quotes each token,
/// and joins with OR for broad recall. Returns None when nothing
/// searchable remains.
fn sanitize_fts_query(raw: &str) -> Option<String> {
    let mut terms = Vec::new();
    for token in raw.split_whitespace() {
        let cleaned: String = token
            .chars()
            .filter(|c| !FTS5_CONTROL_CHARS.contains(c))
            .collect();
        let cleaned = cleaned.trim();
        if !cleaned.is_empty() {
            terms.push(format!("\"{cleaned}\""));
        }
    }
    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" OR "))
    }
}

/// Search all categories.
///
/// Ranks are BM25 scores as FTS5 reports them: more negative is more
/// relevant, and results come back best-first. A non-empty owner sees
/// shared records plus their own. Non-positive limits fall back to 20.
pub async fn search(
    db: &Database,
    query: &str,
    limit: i64,
    owner: &str,
) -> Result<Vec<SearchHit>, MnemoError> {
    search_inner(db, query, None, limit, owner).await
}

/// Search within a single category.
pub async fn search_by_category(
    db: &Database,
    query: &str,
    category: MemoryCategory,
    limit: i64,
    owner: &str,
) -> Result<Vec<SearchHit>, MnemoError> {
    search_inner(db, query, Some(category), limit, owner).await
}

async fn search_inner(
    db: &Database,
    query: &str,
    category: Option<MemoryCategory>,
    limit: i64,
    owner: &str,
) -> Result<Vec<SearchHit>, MnemoError> {
    let Some(match_expr) = sanitize_fts_query(query) else {
        return Ok(Vec::new());
    };
    let limit = if limit <= 0 { 20 } else { limit };
    let category = category.map(|c| c.as_str().to_string());
    let owner = owner.to_string();

    db.connection()
        .call(move |conn| {
            let mut sql = String::from(
                "SELECT m.id, m.key, m.content, m.category, m.owner, m.created_at, m.updated_at,
                        rank
                 FROM memories_fts
                 JOIN memories m ON memories_fts.rowid = m.id
                 WHERE memories_fts MATCH ?",
            );
            let mut args: Vec<&dyn rusqlite::ToSql> = vec![&match_expr];
            if let Some(category) = &category {
                sql.push_str(" AND m.category = ?");
                args.push(category);
            }
            if !owner.is_empty() {
                sql.push_str(" AND (m.owner = '' OR m.owner = ?)");
                args.push(&owner);
            }
            sql.push_str(" ORDER BY rank LIMIT ?");
            args.push(&limit);

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(args.as_slice(), |row| {
                Ok(SearchHit {
                    record: record_from_row(row)?,
                    rank: row.get(7)?,
                })
            })?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}
