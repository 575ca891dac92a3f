//! # Document Transaction Coordinator
//!
//! The only write path for documents. Each call is one SQLite transaction:
//! either every row it touches is committed, or none is.
//!
//! ## Create Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  NewDocument                                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate_new_document ──✗──► Validation (nothing opened)              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN IMMEDIATE  (write lock, waits up to busy_timeout)               │
//! │       │                                                                 │
//! │       ├── allocate number  DEV + 2025 + 0042   (unless supplied)       │
//! │       ├── Totals::aggregate(lines, rate)                               │
//! │       ├── INSERT documents        ──✗ UNIQUE ──► Conflict              │
//! │       ├── INSERT document_lines   ordinals 1..n                        │
//! │       │                                                                 │
//! │       ├── Ok  ──► COMMIT                                               │
//! │       └── Err ──► ROLLBACK, warn!, return the error                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Update replaces the whole line set (delete all, reinsert with fresh
//! ordinals) and recomputes totals in the same transaction. Status changes
//! go through the lifecycle rules in `quotebook_core::lifecycle`.
//!
//! A future dropped mid-call rolls back through sqlx's `Transaction` drop
//! guard. Nothing is retried here; a `Conflict` is the caller's to retry.

use chrono::{Datelike, Utc};
use quotebook_core::lifecycle::Transition;
use quotebook_core::validation::{
    validate_document_update, validate_new_document, validate_number_prefix, validate_uuid,
};
use quotebook_core::{Document, DocumentStatus, DocumentUpdate, LineItem, NewDocument, NewLineItem, TaxRate, Totals};
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::CoordinatorConfig;
use crate::error::{DbError, DocumentError, DocumentResult};
use crate::repository::allocator::allocate;
use crate::repository::document::{
    delete_lines, fetch_document, insert_header, insert_lines, update_header, DocumentRepository,
};

/// Coordinates multi-row document writes.
///
/// Cheap to clone; holds a pool handle and its configuration.
#[derive(Debug, Clone)]
pub struct DocumentCoordinator {
    pool: SqlitePool,
    config: CoordinatorConfig,
}

impl DocumentCoordinator {
    /// Creates a coordinator over `pool`.
    pub fn new(pool: SqlitePool, config: CoordinatorConfig) -> Self {
        DocumentCoordinator { pool, config }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Creates a document with its line items.
    ///
    /// The number is allocated for the current UTC year unless the request
    /// supplies one. A supplied number must carry the prefix of its kind.
    /// Without a tax rate, the configured default applies.
    ///
    /// ## Errors
    /// * `Validation` - request rejected before any write
    /// * `Conflict` - the number is already taken; retry the whole call
    /// * `BusinessRule` - sequence exhausted or amounts overflowed
    /// * `Storage` - anything the database refused
    pub async fn create(&self, request: NewDocument) -> DocumentResult<Document> {
        validate_new_document(&request, self.config.max_line_items)?;
        if let Some(number) = &request.number {
            validate_number_prefix(
                number,
                self.config.prefix_for(request.kind),
                &self.config.other_prefixes(request.kind),
            )?;
        }

        let mut tx = self.begin().await?;
        let result = self.create_in(&mut tx, request).await;
        let (doc, lines) = finish(tx, result, "create").await?;

        info!(id = %doc.id, number = %doc.number, lines, "Document created");
        Ok(doc)
    }

    async fn create_in(
        &self,
        conn: &mut SqliteConnection,
        request: NewDocument,
    ) -> DocumentResult<(Document, usize)> {
        let now = Utc::now();
        let prefix = self.config.prefix_for(request.kind).to_string();

        let number = match request.number {
            Some(number) => number,
            None => allocate(conn, &prefix, now.year()).await?,
        };

        let rate = request
            .tax_rate
            .map(TaxRate::from_percent)
            .unwrap_or(self.config.default_tax_rate);
        let totals = Totals::aggregate(&request.lines, rate)?;

        let doc = Document {
            id: Uuid::new_v4().to_string(),
            kind: request.kind,
            prefix,
            number,
            status: DocumentStatus::Draft,
            title: request.title,
            client_id: request.client_id,
            notes: request.notes,
            tax_rate: rate.percent(),
            subtotal: totals.subtotal,
            tax_amount: totals.tax_amount,
            grand_total: totals.grand_total,
            created_by: request.created_by.clone(),
            updated_by: request.created_by,
            created_at: now,
            updated_at: now,
            date_sent: None,
            date_validated: None,
        };

        insert_header(conn, &doc)
            .await
            .map_err(|e| conflict_or_storage(e, &doc.number))?;

        let lines = number_lines(&doc.id, request.lines);
        insert_lines(conn, &lines).await?;

        Ok((doc, lines.len()))
    }

    /// Replaces a document's editable header fields and its entire line set.
    ///
    /// `number`, `status`, `created_at` and `created_by` are kept. The tax
    /// rate is kept when the update carries none.
    ///
    /// ## Errors
    /// * `NotFound` - no document with this id
    /// * `BusinessRule` - the document is validated, rejected or expired
    pub async fn update(&self, id: &str, update: DocumentUpdate) -> DocumentResult<Document> {
        validate_document_update(&update, self.config.max_line_items)?;

        let mut tx = self.begin().await?;
        let result = update_in(&mut tx, id, update).await;
        let (doc, lines) = finish(tx, result, "update").await?;

        info!(id = %doc.id, number = %doc.number, lines, "Document updated");
        Ok(doc)
    }

    /// Moves a document to `target`.
    ///
    /// Asking for the current status succeeds without touching anything.
    ///
    /// ## Errors
    /// * `Validation` - `actor` is not a valid user id
    /// * `NotFound` - no document with this id
    /// * `BusinessRule` - the lifecycle does not allow the move
    pub async fn transition_status(
        &self,
        id: &str,
        target: DocumentStatus,
        actor: &str,
    ) -> DocumentResult<Document> {
        validate_uuid("updated_by", actor)?;

        let mut tx = self.begin().await?;
        let result = transition_in(&mut tx, id, target, actor).await;
        let (doc, transition) = finish(tx, result, "transition_status").await?;

        match transition {
            Transition::Applied => info!(id = %doc.id, number = %doc.number, status = ?doc.status, "Document status changed"),
            Transition::Unchanged => debug!(id = %doc.id, status = ?doc.status, "Status already current"),
        }
        Ok(doc)
    }

    /// Deletes a document and, by cascade, its line items.
    pub async fn delete(&self, id: &str) -> DocumentResult<()> {
        DocumentRepository::new(self.pool.clone())
            .delete(id)
            .await
            .map_err(|e| match e {
                DbError::NotFound { .. } => DocumentError::not_found(id),
                other => DocumentError::Storage(other),
            })?;

        info!(id = %id, "Document deleted");
        Ok(())
    }

    /// Opens a write transaction, taking the database lock up front so
    /// number allocation cannot interleave with another writer.
    async fn begin(&self) -> DocumentResult<Transaction<'static, Sqlite>> {
        let tx = self
            .pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(DbError::from)?;
        Ok(tx)
    }
}

async fn update_in(
    conn: &mut SqliteConnection,
    id: &str,
    update: DocumentUpdate,
) -> DocumentResult<(Document, usize)> {
    let mut doc = fetch_document(&mut *conn, id)
        .await?
        .ok_or_else(|| DocumentError::not_found(id))?;
    doc.ensure_editable()?;

    let rate = update
        .tax_rate
        .map(TaxRate::from_percent)
        .unwrap_or(TaxRate::from_percent(doc.tax_rate));
    let totals = Totals::aggregate(&update.lines, rate)?;

    doc.title = update.title;
    doc.client_id = update.client_id;
    doc.notes = update.notes;
    doc.tax_rate = rate.percent();
    doc.subtotal = totals.subtotal;
    doc.tax_amount = totals.tax_amount;
    doc.grand_total = totals.grand_total;
    doc.updated_by = update.updated_by;
    doc.updated_at = Utc::now();

    let removed = delete_lines(conn, &doc.id).await?;
    let lines = number_lines(&doc.id, update.lines);
    insert_lines(conn, &lines).await?;
    update_header(conn, &doc).await?;

    debug!(id = %doc.id, removed, inserted = lines.len(), "Line set replaced");
    Ok((doc, lines.len()))
}

async fn transition_in(
    conn: &mut SqliteConnection,
    id: &str,
    target: DocumentStatus,
    actor: &str,
) -> DocumentResult<(Document, Transition)> {
    let mut doc = fetch_document(&mut *conn, id)
        .await?
        .ok_or_else(|| DocumentError::not_found(id))?;

    let transition = doc.apply_status(target, Utc::now())?;
    if transition == Transition::Applied {
        doc.updated_by = actor.to_string();
        update_header(conn, &doc).await?;
    }

    Ok((doc, transition))
}

/// Commits on `Ok`, rolls back on `Err`. The step's error always wins over
/// a rollback failure, which is only logged.
async fn finish<T>(
    tx: Transaction<'static, Sqlite>,
    result: DocumentResult<T>,
    operation: &'static str,
) -> DocumentResult<T> {
    match result {
        Ok(value) => {
            tx.commit()
                .await
                .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
            Ok(value)
        }
        Err(err) => {
            warn!(operation, error = %err, "Rolling back document transaction");
            if let Err(rollback_err) = tx.rollback().await {
                error!(operation, error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}

fn number_lines(document_id: &str, lines: Vec<NewLineItem>) -> Vec<LineItem> {
    lines
        .into_iter()
        .zip(1u32..)
        .map(|(line, ordinal)| line.into_line_item(document_id, ordinal))
        .collect()
}

fn conflict_or_storage(err: DbError, number: &str) -> DocumentError {
    if err.is_duplicate_number() {
        DocumentError::Conflict {
            number: number.to_string(),
        }
    } else {
        DocumentError::Storage(err)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::pool::{Database, DbConfig};
    use quotebook_core::numbering::format_number;
    use quotebook_core::{CoreError, DocumentKind, ValidationError};
    use rust_decimal::Decimal;
    use std::collections::HashSet;
    use std::time::Duration;

    const USER: &str = "550e8400-e29b-41d4-a716-446655440000";
    const OTHER_USER: &str = "6fa459ea-ee8a-3ca4-894e-db77e160355e";

    async fn setup() -> (Database, DocumentCoordinator) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let coordinator = db.coordinator(CoordinatorConfig::default());
        (db, coordinator)
    }

    fn year() -> i32 {
        Utc::now().year()
    }

    fn dev(sequence: u32) -> String {
        format_number("DEV", year(), sequence)
    }

    fn line(description: &str, qty: i64, price_cents: i64) -> NewLineItem {
        NewLineItem::new(description, Decimal::from(qty), "u", Decimal::new(price_cents, 2))
    }

    fn quote(title: &str) -> NewDocument {
        NewDocument::new(DocumentKind::Quote, title, USER)
    }

    fn edit(title: &str, lines: Vec<NewLineItem>) -> DocumentUpdate {
        DocumentUpdate {
            title: title.to_string(),
            client_id: None,
            notes: None,
            tax_rate: None,
            updated_by: OTHER_USER.to_string(),
            lines,
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_never_share_a_number() {
        let dir = tempfile::tempdir().unwrap();
        let config = DbConfig::new(dir.path().join("quotebook.db"))
            .max_connections(8)
            .busy_timeout(Duration::from_secs(30));
        let db = Database::new(config).await.unwrap();
        let coordinator = db.coordinator(CoordinatorConfig::default());

        let mut handles = Vec::new();
        for i in 0..24 {
            let coordinator = coordinator.clone();
            handles.push(tokio::spawn(async move {
                coordinator
                    .create(quote(&format!("Devis {i}")).with_lines(vec![line("Pose", 1, 5000)]))
                    .await
            }));
        }

        let mut numbers = Vec::new();
        for handle in handles {
            numbers.push(handle.await.unwrap().unwrap().number);
        }

        let unique: HashSet<&String> = numbers.iter().collect();
        assert_eq!(unique.len(), 24);

        numbers.sort();
        let expected: Vec<String> = (1..=24).map(dev).collect();
        assert_eq!(numbers, expected);

        db.close().await;
    }

    #[tokio::test]
    async fn test_numbers_follow_each_other_per_kind() {
        let (_db, coordinator) = setup().await;

        let first = coordinator.create(quote("Véranda")).await.unwrap();
        let second = coordinator.create(quote("Pergola")).await.unwrap();
        let project = coordinator
            .create(NewDocument::new(DocumentKind::Project, "Chantier Martin", USER))
            .await
            .unwrap();

        assert_eq!(first.number, dev(1));
        assert_eq!(second.number, dev(2));
        assert_eq!(project.number, format_number("PRJ", year(), 1));
        assert_eq!(first.prefix, "DEV");
        assert_eq!(first.status, DocumentStatus::Draft);
    }

    #[tokio::test]
    async fn test_create_persists_totals_and_lines() {
        let (db, coordinator) = setup().await;

        let created = coordinator
            .create(
                quote("Fenêtres")
                    .with_tax_rate(Decimal::new(2000, 2))
                    .with_lines(vec![line("Fenêtre PVC", 2, 10000), line("Pose", 1, 5000)]),
            )
            .await
            .unwrap();

        assert_eq!(created.subtotal, Decimal::new(25000, 2));
        assert_eq!(created.tax_amount, Decimal::new(5000, 2));
        assert_eq!(created.grand_total, Decimal::new(30000, 2));

        let repo = db.documents();
        let stored = repo.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(stored.grand_total, Decimal::new(30000, 2));

        let lines = repo.get_lines(&created.id).await.unwrap();
        let ordinals: Vec<u32> = lines.iter().map(|l| l.ordinal).collect();
        assert_eq!(ordinals, vec![1, 2]);
        assert_eq!(lines[0].description, "Fenêtre PVC");
    }

    #[tokio::test]
    async fn test_empty_document_has_zero_totals() {
        let (_db, coordinator) = setup().await;

        let created = coordinator
            .create(quote("Brouillon").with_tax_rate(Decimal::new(55, 1)))
            .await
            .unwrap();

        assert_eq!(created.subtotal, Decimal::ZERO);
        assert_eq!(created.tax_amount, Decimal::ZERO);
        assert_eq!(created.grand_total, Decimal::ZERO);
        assert_eq!(created.tax_rate, Decimal::new(55, 1));
    }

    #[tokio::test]
    async fn test_configured_defaults_apply() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let config = CoordinatorConfig {
            quote_prefix: "Q".to_string(),
            default_tax_rate: TaxRate::from_percent(Decimal::new(10, 0)),
            ..CoordinatorConfig::default()
        };
        let coordinator = db.coordinator(config);

        let created = coordinator
            .create(quote("Portail").with_lines(vec![line("Portail alu", 1, 100000)]))
            .await
            .unwrap();

        assert_eq!(created.number, format_number("Q", year(), 1));
        assert_eq!(created.tax_rate, Decimal::new(10, 0));
        assert_eq!(created.grand_total, Decimal::new(110000, 2));
    }

    #[tokio::test]
    async fn test_failed_line_insert_leaves_nothing_behind() {
        let (db, coordinator) = setup().await;

        sqlx::query(
            r#"
            CREATE TRIGGER fail_lines BEFORE INSERT ON document_lines
            BEGIN
                SELECT RAISE(ABORT, 'injected fault');
            END
            "#,
        )
        .execute(db.pool())
        .await
        .unwrap();

        let err = coordinator
            .create(quote("Volets").with_lines(vec![line("Volet roulant", 3, 42000)]))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Storage);

        let repo = db.documents();
        assert!(repo.find_by_number("DEV", &dev(1)).await.unwrap().is_none());
        assert_eq!(repo.count_for_year("DEV", year()).await.unwrap(), 0);

        sqlx::query("DROP TRIGGER fail_lines")
            .execute(db.pool())
            .await
            .unwrap();

        // The number was never consumed.
        let created = coordinator
            .create(quote("Volets").with_lines(vec![line("Volet roulant", 3, 42000)]))
            .await
            .unwrap();
        assert_eq!(created.number, dev(1));
    }

    #[tokio::test]
    async fn test_update_replaces_line_set() {
        let (db, coordinator) = setup().await;
        let created = coordinator
            .create(quote("Cuisine").with_lines(vec![
                line("Plan de travail", 1, 80000),
                line("Évier", 1, 25000),
                line("Pose", 1, 30000),
            ]))
            .await
            .unwrap();

        let repo = db.documents();
        let before = repo.get_by_id(&created.id).await.unwrap().unwrap();

        let updated = coordinator
            .update(&created.id, edit("Cuisine (révisé)", vec![line("Forfait cuisine", 1, 100000)]))
            .await
            .unwrap();

        let lines = repo.get_lines(&created.id).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].ordinal, 1);
        assert_eq!(lines[0].description, "Forfait cuisine");

        let after = repo.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(after.created_at, before.created_at);
        assert_eq!(after.created_by, USER);
        assert_eq!(after.updated_by, OTHER_USER);
        assert_eq!(after.number, before.number);
        assert_eq!(after.title, "Cuisine (révisé)");
        assert_eq!(after.subtotal, Decimal::new(100000, 2));
        assert_eq!(after.grand_total, Decimal::new(120000, 2));
        assert_eq!(updated.grand_total, after.grand_total);
    }

    #[tokio::test]
    async fn test_update_new_tax_rate_recomputes_totals() {
        let (_db, coordinator) = setup().await;
        let created = coordinator
            .create(quote("Isolation").with_lines(vec![line("Laine de verre", 10, 1000)]))
            .await
            .unwrap();

        let mut change = edit("Isolation", vec![line("Laine de verre", 10, 1000)]);
        change.tax_rate = Some(Decimal::new(55, 1));
        let updated = coordinator.update(&created.id, change).await.unwrap();

        assert_eq!(updated.subtotal, Decimal::new(10000, 2));
        assert_eq!(updated.tax_amount, Decimal::new(550, 2));
        assert_eq!(updated.grand_total, Decimal::new(10550, 2));
    }

    #[tokio::test]
    async fn test_update_unknown_or_locked_document() {
        let (_db, coordinator) = setup().await;

        let err = coordinator.update("missing", edit("X", vec![])).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let created = coordinator.create(quote("Terrasse")).await.unwrap();
        coordinator
            .transition_status(&created.id, DocumentStatus::Rejected, USER)
            .await
            .unwrap();

        let err = coordinator
            .update(&created.id, edit("Terrasse bois", vec![]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DocumentError::BusinessRule(CoreError::DocumentLocked { .. })
        ));
    }

    #[tokio::test]
    async fn test_conflict_then_retry_gets_next_number() {
        let (db, coordinator) = setup().await;
        coordinator.create(quote("Premier")).await.unwrap();

        let err = coordinator
            .create(quote("Doublon").with_number(dev(1)))
            .await
            .unwrap_err();
        assert!(matches!(err, DocumentError::Conflict { ref number } if *number == dev(1)));
        assert!(err.is_retryable());

        let repo = db.documents();
        let committed = repo.count_for_year("DEV", year()).await.unwrap();
        assert_eq!(committed, 1);

        let retried = coordinator.create(quote("Doublon")).await.unwrap();
        assert_eq!(retried.number, dev(committed as u32 + 1));
    }

    #[tokio::test]
    async fn test_supplied_number_is_kept() {
        let (_db, coordinator) = setup().await;
        let created = coordinator
            .create(quote("Reprise").with_number("DEV-2019-118"))
            .await
            .unwrap();
        assert_eq!(created.number, "DEV-2019-118");

        // Legacy formats do not disturb the sequence.
        let next = coordinator.create(quote("Suivant")).await.unwrap();
        assert_eq!(next.number, dev(1));
    }

    #[tokio::test]
    async fn test_supplied_number_from_other_series_rejected() {
        let (db, coordinator) = setup().await;
        let project_number = format_number("PRJ", year(), 1);

        let err = coordinator
            .create(quote("Mauvaise série").with_number(project_number.clone()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DocumentError::Validation(ValidationError::InvalidFormat { ref field, .. }) if field == "number"
        ));
        assert!(db.documents().list(None, None).await.unwrap().is_empty());

        // The project series is untouched and hands out its first number.
        let project = coordinator
            .create(NewDocument::new(DocumentKind::Project, "Chantier Durand", USER))
            .await
            .unwrap();
        assert_eq!(project.number, project_number);
    }

    #[tokio::test]
    async fn test_failed_update_keeps_previous_version() {
        let (db, coordinator) = setup().await;
        let created = coordinator
            .create(quote("Salle de bain").with_lines(vec![
                line("Douche italienne", 1, 150000),
                line("Faïence", 20, 4500),
            ]))
            .await
            .unwrap();

        sqlx::query(
            r#"
            CREATE TRIGGER fail_lines BEFORE INSERT ON document_lines
            BEGIN
                SELECT RAISE(ABORT, 'injected fault');
            END
            "#,
        )
        .execute(db.pool())
        .await
        .unwrap();

        let err = coordinator
            .update(&created.id, edit("Salle de bain (révisé)", vec![line("Forfait", 1, 200000)]))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Storage);

        let repo = db.documents();
        let stored = repo.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Salle de bain");
        assert_eq!(stored.updated_by, USER);
        assert_eq!(stored.subtotal, created.subtotal);
        assert_eq!(stored.grand_total, created.grand_total);

        let lines = repo.get_lines(&created.id).await.unwrap();
        let descriptions: Vec<&str> = lines.iter().map(|l| l.description.as_str()).collect();
        assert_eq!(descriptions, vec!["Douche italienne", "Faïence"]);
    }

    #[tokio::test]
    async fn test_sent_timestamp_set_once() {
        let (db, coordinator) = setup().await;
        let created = coordinator.create(quote("Menuiseries")).await.unwrap();
        assert!(created.date_sent.is_none());

        let sent = coordinator
            .transition_status(&created.id, DocumentStatus::Sent, OTHER_USER)
            .await
            .unwrap();
        assert_eq!(sent.status, DocumentStatus::Sent);
        assert_eq!(sent.updated_by, OTHER_USER);

        let repo = db.documents();
        let first = repo.get_by_id(&created.id).await.unwrap().unwrap();
        assert!(first.date_sent.is_some());

        let again = coordinator
            .transition_status(&created.id, DocumentStatus::Sent, USER)
            .await
            .unwrap();
        let second = repo.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(second.date_sent, first.date_sent);
        assert_eq!(second.updated_at, first.updated_at);
        assert_eq!(again.status, DocumentStatus::Sent);
    }

    #[tokio::test]
    async fn test_full_lifecycle_stamps_validation_date() {
        let (_db, coordinator) = setup().await;
        let created = coordinator.create(quote("Extension")).await.unwrap();

        for status in [
            DocumentStatus::Sent,
            DocumentStatus::Negotiating,
            DocumentStatus::Validated,
        ] {
            coordinator
                .transition_status(&created.id, status, USER)
                .await
                .unwrap();
        }

        let done = coordinator
            .transition_status(&created.id, DocumentStatus::Validated, USER)
            .await
            .unwrap();
        assert!(done.date_sent.is_some());
        assert!(done.date_validated.is_some());
    }

    #[tokio::test]
    async fn test_invalid_transition_rejected() {
        let (db, coordinator) = setup().await;
        let created = coordinator.create(quote("Garage")).await.unwrap();

        let err = coordinator
            .transition_status(&created.id, DocumentStatus::Validated, USER)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DocumentError::BusinessRule(CoreError::InvalidTransition {
                from: DocumentStatus::Draft,
                to: DocumentStatus::Validated,
            })
        ));

        let stored = db.documents().get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(stored.status, DocumentStatus::Draft);
    }

    #[tokio::test]
    async fn test_transition_checks_actor_and_existence() {
        let (_db, coordinator) = setup().await;

        let err = coordinator
            .transition_status("missing", DocumentStatus::Sent, "not-a-uuid")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = coordinator
            .transition_status("missing", DocumentStatus::Sent, USER)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_validation_runs_before_any_write() {
        let (db, coordinator) = setup().await;

        let err = coordinator
            .create(quote("Toiture").with_lines(vec![line("Tuiles", -4, 300)]))
            .await
            .unwrap_err();
        assert!(matches!(err, DocumentError::Validation(ValidationError::Line { position: 1, .. })));

        let err = coordinator.create(quote("   ")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        assert!(db.documents().list(None, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_document_and_lines() {
        let (db, coordinator) = setup().await;
        let created = coordinator
            .create(quote("Clôture").with_lines(vec![line("Panneau", 12, 8900)]))
            .await
            .unwrap();

        coordinator.delete(&created.id).await.unwrap();

        let repo = db.documents();
        assert!(repo.get_by_id(&created.id).await.unwrap().is_none());
        assert!(repo.get_lines(&created.id).await.unwrap().is_empty());

        let err = coordinator.delete(&created.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
