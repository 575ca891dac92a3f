//! # Document Number Allocator
//!
//! Picks the next `PREFIX + YYYY + NNNN` number inside the caller's
//! transaction.
//!
//! ## Allocation Under Concurrency
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  create A                         create B                             │
//! │  BEGIN IMMEDIATE (write lock) ─┐                                        │
//! │  scan DEV2025%  → max 0041     │  BEGIN IMMEDIATE … waits (busy)       │
//! │  INSERT DEV20250042            │                                        │
//! │  COMMIT ───────────────────────┘                                        │
//! │                                   lock granted                          │
//! │                                   scan DEV2025%  → max 0042            │
//! │                                   INSERT DEV20250043                   │
//! │                                   COMMIT                                │
//! │                                                                         │
//! │  UNIQUE (prefix, number) catches anything that bypasses the lock       │
//! │  and is reported as a Conflict.                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no counter table. The highest committed number is the state, so
//! a rolled-back create leaves nothing behind.

use quotebook_core::numbering::{next_number, series};
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::{DbError, DocumentResult};

/// Allocates the next number for `prefix` in `year`.
///
/// Must run on a connection holding the write lock (`BEGIN IMMEDIATE`) so
/// the scan and the subsequent insert are not interleaved with another
/// allocator.
///
/// ## Errors
/// * `BusinessRule(SequenceExhausted)` - the year already reached `9999`
/// * `Storage` - the scan failed
pub async fn allocate(conn: &mut SqliteConnection, prefix: &str, year: i32) -> DocumentResult<String> {
    let series = series(prefix, year);

    let existing: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT number
        FROM documents
        WHERE prefix = ?1 AND substr(number, 1, length(?2)) = ?2
        "#,
    )
    .bind(prefix)
    .bind(&series)
    .fetch_all(&mut *conn)
    .await
    .map_err(DbError::from)?;

    let number = next_number(prefix, year, existing.iter().map(String::as_str))?;

    debug!(series = %series, scanned = existing.len(), number = %number, "Allocated document number");

    Ok(number)
}

// =============================================================================
// Unit Tests
// =============================================================================
