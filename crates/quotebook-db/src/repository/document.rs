//! # Document Repository
//!
//! Database operations for document headers and line items.
//!
//! ## Storage Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  documents                          document_lines                     │
//! │  ───────────────────────            ───────────────────────            │
//! │  id            PK                   document_id  FK ON DELETE CASCADE  │
//! │  prefix,number UNIQUE               ordinal      PK with document_id   │
//! │  status                             description / unit                 │
//! │  tax_rate      TEXT  "20"           quantity     TEXT  "2"             │
//! │  subtotal      TEXT  "250.00"       unit_price   TEXT  "100.00"        │
//! │  tax_amount    TEXT  "50.0000"                                          │
//! │  grand_total   TEXT  "300.0000"     (line total derived on read)       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Decimals are written with `Decimal::to_string` and parsed back with
//! `Decimal::from_str`; a value that fails to parse surfaces as
//! [`DbError::CorruptData`] instead of a silently wrong amount.
//!
//! The free functions taking `&mut SqliteConnection` are the write side.
//! They run on the connection of a transaction owned by the coordinator.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use quotebook_core::{Document, DocumentKind, DocumentStatus, LineItem, StatusSummary};
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Row, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};

const SELECT_DOCUMENT: &str = r#"
    SELECT
        id, kind, prefix, number, status, title, client_id, notes,
        tax_rate, subtotal, tax_amount, grand_total,
        created_by, updated_by, created_at, updated_at,
        date_sent, date_validated
    FROM documents
"#;

/// Repository for document queries.
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    pool: SqlitePool,
}

impl DocumentRepository {
    /// Creates a new DocumentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DocumentRepository { pool }
    }

    /// Gets a document header by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Document>> {
        fetch_document(&self.pool, id).await
    }

    /// Gets a document by its number within a prefix.
    pub async fn find_by_number(&self, prefix: &str, number: &str) -> DbResult<Option<Document>> {
        let sql = format!("{SELECT_DOCUMENT} WHERE prefix = ?1 AND number = ?2");

        let row = sqlx::query(&sql)
            .bind(prefix)
            .bind(number)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(document_from_row).transpose()
    }

    /// Lists documents, oldest first.
    ///
    /// ## Arguments
    /// * `kind` - Only quotes or only projects; `None` for both
    /// * `year` - Only documents created in this calendar year (UTC)
    pub async fn list(&self, kind: Option<DocumentKind>, year: Option<i32>) -> DbResult<Vec<Document>> {
        let sql = format!(
            "{SELECT_DOCUMENT}
             WHERE (?1 IS NULL OR kind = ?1)
               AND (?2 IS NULL OR substr(created_at, 1, 4) = ?2)
             ORDER BY created_at, number"
        );

        let rows = sqlx::query(&sql)
            .bind(kind)
            .bind(year.map(|y| format!("{y:04}")))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(document_from_row).collect()
    }

    /// Gets all line items of a document in display order.
    pub async fn get_lines(&self, document_id: &str) -> DbResult<Vec<LineItem>> {
        let rows = sqlx::query(
            r#"
            SELECT document_id, ordinal, description, quantity, unit, unit_price
            FROM document_lines
            WHERE document_id = ?1
            ORDER BY ordinal
            "#,
        )
        .bind(document_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(line_from_row).collect()
    }

    /// Counts documents numbered in the `prefix + year` series.
    pub async fn count_for_year(&self, prefix: &str, year: i32) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM documents
            WHERE prefix = ?1 AND substr(number, 1, length(?2)) = ?2
            "#,
        )
        .bind(prefix)
        .bind(quotebook_core::numbering::series(prefix, year))
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Per-status counts and totals of one kind, for the dashboard.
    ///
    /// Every status is present in the result, in lifecycle order. Amounts
    /// are summed in Rust because SQLite would sum the TEXT columns as REAL.
    pub async fn summary_by_status(&self, kind: DocumentKind, year: i32) -> DbResult<Vec<StatusSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT status, subtotal, grand_total
            FROM documents
            WHERE kind = ?1 AND substr(created_at, 1, 4) = ?2
            "#,
        )
        .bind(kind)
        .bind(format!("{year:04}"))
        .fetch_all(&self.pool)
        .await?;

        let mut summary: Vec<StatusSummary> = DocumentStatus::ALL
            .iter()
            .map(|&status| StatusSummary {
                status,
                count: 0,
                subtotal: Decimal::ZERO,
                grand_total: Decimal::ZERO,
            })
            .collect();

        for row in &rows {
            let status: DocumentStatus = row.try_get("status")?;
            let subtotal = decimal_column(row, "subtotal")?;
            let grand_total = decimal_column(row, "grand_total")?;

            if let Some(entry) = summary.iter_mut().find(|s| s.status == status) {
                entry.count += 1;
                entry.subtotal = checked_sum(entry.subtotal, subtotal)?;
                entry.grand_total = checked_sum(entry.grand_total, grand_total)?;
            }
        }

        Ok(summary)
    }

    /// Deletes a document; its line items go with it (`ON DELETE CASCADE`).
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting document");

        let result = sqlx::query("DELETE FROM documents WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Document", id));
        }

        Ok(())
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

/// Loads a header on any executor (pool or open transaction).
pub(crate) async fn fetch_document<'e, E>(executor: E, id: &str) -> DbResult<Option<Document>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("{SELECT_DOCUMENT} WHERE id = ?1");

    let row = sqlx::query(&sql).bind(id).fetch_optional(executor).await?;

    row.as_ref().map(document_from_row).transpose()
}

/// Inserts a document header.
pub(crate) async fn insert_header(conn: &mut SqliteConnection, doc: &Document) -> DbResult<()> {
    debug!(id = %doc.id, number = %doc.number, "Inserting document header");

    sqlx::query(
        r#"
        INSERT INTO documents (
            id, kind, prefix, number, status, title, client_id, notes,
            tax_rate, subtotal, tax_amount, grand_total,
            created_by, updated_by, created_at, updated_at,
            date_sent, date_validated
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8,
            ?9, ?10, ?11, ?12,
            ?13, ?14, ?15, ?16,
            ?17, ?18
        )
        "#,
    )
    .bind(&doc.id)
    .bind(doc.kind)
    .bind(&doc.prefix)
    .bind(&doc.number)
    .bind(doc.status)
    .bind(&doc.title)
    .bind(&doc.client_id)
    .bind(&doc.notes)
    .bind(doc.tax_rate.to_string())
    .bind(doc.subtotal.to_string())
    .bind(doc.tax_amount.to_string())
    .bind(doc.grand_total.to_string())
    .bind(&doc.created_by)
    .bind(&doc.updated_by)
    .bind(doc.created_at)
    .bind(doc.updated_at)
    .bind(doc.date_sent)
    .bind(doc.date_validated)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Rewrites the mutable header fields.
///
/// `kind`, `prefix`, `number`, `created_by` and `created_at` are never
/// touched.
pub(crate) async fn update_header(conn: &mut SqliteConnection, doc: &Document) -> DbResult<()> {
    debug!(id = %doc.id, status = ?doc.status, "Updating document header");

    let result = sqlx::query(
        r#"
        UPDATE documents SET
            status = ?2,
            title = ?3,
            client_id = ?4,
            notes = ?5,
            tax_rate = ?6,
            subtotal = ?7,
            tax_amount = ?8,
            grand_total = ?9,
            updated_by = ?10,
            updated_at = ?11,
            date_sent = ?12,
            date_validated = ?13
        WHERE id = ?1
        "#,
    )
    .bind(&doc.id)
    .bind(doc.status)
    .bind(&doc.title)
    .bind(&doc.client_id)
    .bind(&doc.notes)
    .bind(doc.tax_rate.to_string())
    .bind(doc.subtotal.to_string())
    .bind(doc.tax_amount.to_string())
    .bind(doc.grand_total.to_string())
    .bind(&doc.updated_by)
    .bind(doc.updated_at)
    .bind(doc.date_sent)
    .bind(doc.date_validated)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Document", doc.id.as_str()));
    }

    Ok(())
}

/// Inserts line items in order. Ordinals must already be assigned.
pub(crate) async fn insert_lines(conn: &mut SqliteConnection, lines: &[LineItem]) -> DbResult<()> {
    for line in lines {
        sqlx::query(
            r#"
            INSERT INTO document_lines (
                document_id, ordinal, description, quantity, unit, unit_price
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&line.document_id)
        .bind(i64::from(line.ordinal))
        .bind(&line.description)
        .bind(line.quantity.to_string())
        .bind(&line.unit)
        .bind(line.unit_price.to_string())
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Removes every line of a document. Returns how many were removed.
pub(crate) async fn delete_lines(conn: &mut SqliteConnection, document_id: &str) -> DbResult<u64> {
    let result = sqlx::query("DELETE FROM document_lines WHERE document_id = ?1")
        .bind(document_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

// =============================================================================
// Row Mapping
// =============================================================================

fn document_from_row(row: &SqliteRow) -> DbResult<Document> {
    Ok(Document {
        id: row.try_get("id")?,
        kind: row.try_get("kind")?,
        prefix: row.try_get("prefix")?,
        number: row.try_get("number")?,
        status: row.try_get("status")?,
        title: row.try_get("title")?,
        client_id: row.try_get("client_id")?,
        notes: row.try_get("notes")?,
        tax_rate: decimal_column(row, "tax_rate")?,
        subtotal: decimal_column(row, "subtotal")?,
        tax_amount: decimal_column(row, "tax_amount")?,
        grand_total: decimal_column(row, "grand_total")?,
        created_by: row.try_get("created_by")?,
        updated_by: row.try_get("updated_by")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
        date_sent: row.try_get::<Option<DateTime<Utc>>, _>("date_sent")?,
        date_validated: row.try_get::<Option<DateTime<Utc>>, _>("date_validated")?,
    })
}

fn line_from_row(row: &SqliteRow) -> DbResult<LineItem> {
    let ordinal: i64 = row.try_get("ordinal")?;

    Ok(LineItem {
        document_id: row.try_get("document_id")?,
        ordinal: u32::try_from(ordinal).map_err(|_| DbError::CorruptData {
            column: "ordinal".to_string(),
            value: ordinal.to_string(),
        })?,
        description: row.try_get("description")?,
        quantity: decimal_column(row, "quantity")?,
        unit: row.try_get("unit")?,
        unit_price: decimal_column(row, "unit_price")?,
    })
}

fn decimal_column(row: &SqliteRow, column: &str) -> DbResult<Decimal> {
    let raw: String = row.try_get(column)?;
    Decimal::from_str(&raw).map_err(|_| DbError::CorruptData {
        column: column.to_string(),
        value: raw,
    })
}

fn checked_sum(a: Decimal, b: Decimal) -> DbResult<Decimal> {
    a.checked_add(b)
        .ok_or_else(|| DbError::Internal("status summary overflowed".to_string()))
}

// =============================================================================
// Unit Tests
// =============================================================================
