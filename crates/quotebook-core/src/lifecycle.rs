//! # Document Lifecycle
//!
//! Status transitions and the timestamps they stamp.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Draft ──► Sent ──► Negotiating ──┬──► Validated   (terminal)         │
//! │     │        │                     ├──► Rejected    (terminal)         │
//! │     │        ├─────────────────────┤                                    │
//! │     │        │                     └──► Expired     (terminal)         │
//! │     └────────┴──────────────────────────► Rejected                      │
//! │                                                                         │
//! │   Sent  → Validated / Rejected / Expired directly is allowed too.      │
//! │   Expired is normally set by a time-based job outside this crate.      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `date_sent` and `date_validated` are written once, on first entry.

use chrono::{DateTime, Utc};

use crate::error::{CoreError, CoreResult};
use crate::types::{Document, DocumentStatus};

impl DocumentStatus {
    /// No transition leaves a terminal status.
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            DocumentStatus::Validated | DocumentStatus::Rejected | DocumentStatus::Expired
        )
    }

    /// Whether `self → next` is a legal transition. Staying put is not a
    /// transition and returns `false`.
    pub const fn can_transition_to(&self, next: DocumentStatus) -> bool {
        use DocumentStatus::*;

        matches!(
            (self, next),
            (Draft, Sent)
                | (Draft, Rejected)
                | (Sent, Negotiating)
                | (Sent, Validated)
                | (Sent, Rejected)
                | (Sent, Expired)
                | (Negotiating, Validated)
                | (Negotiating, Rejected)
                | (Negotiating, Expired)
        )
    }
}

/// Result of asking a document to move to a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The document already had that status; nothing changed.
    Unchanged,
    /// Status (and possibly a timestamp) changed.
    Applied,
}

impl Document {
    /// Moves the document to `next`, stamping first-entry timestamps.
    ///
    /// Re-requesting the current status is a no-op, including for terminal
    /// statuses.
    pub fn apply_status(&mut self, next: DocumentStatus, at: DateTime<Utc>) -> CoreResult<Transition> {
        if self.status == next {
            return Ok(Transition::Unchanged);
        }

        if !self.status.can_transition_to(next) {
            return Err(CoreError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }

        match next {
            DocumentStatus::Sent if self.date_sent.is_none() => self.date_sent = Some(at),
            DocumentStatus::Validated if self.date_validated.is_none() => {
                self.date_validated = Some(at)
            }
            _ => {}
        }

        self.status = next;
        self.updated_at = at;
        Ok(Transition::Applied)
    }

    /// Fails when the document can no longer be edited.
    pub fn ensure_editable(&self) -> CoreResult<()> {
        if self.status.is_terminal() {
            return Err(CoreError::DocumentLocked {
                number: self.number.clone(),
                status: self.status,
            });
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DocumentKind;
    use chrono::Duration;
    use rust_decimal::Decimal;

    fn draft() -> Document {
        let now = Utc::now();
        Document {
            id: "doc-1".to_string(),
            kind: DocumentKind::Quote,
            prefix: "DEV".to_string(),
            number: "DEV20250001".to_string(),
            status: DocumentStatus::Draft,
            title: "Baie coulissante".to_string(),
            client_id: None,
            notes: None,
            tax_rate: Decimal::new(20, 0),
            subtotal: Decimal::ZERO,
            tax_amount: Decimal::ZERO,
            grand_total: Decimal::ZERO,
            created_by: "user-1".to_string(),
            updated_by: "user-1".to_string(),
            created_at: now,
            updated_at: now,
            date_sent: None,
            date_validated: None,
        }
    }

    #[test]
    fn test_send_stamps_date_sent_once() {
        let mut doc = draft();
        let first = Utc::now();

        assert_eq!(doc.apply_status(DocumentStatus::Sent, first).unwrap(), Transition::Applied);
        assert_eq!(doc.date_sent, Some(first));

        let later = first + Duration::hours(2);
        assert_eq!(doc.apply_status(DocumentStatus::Sent, later).unwrap(), Transition::Unchanged);
        assert_eq!(doc.date_sent, Some(first));
    }

    #[test]
    fn test_validate_stamps_date_validated() {
        let mut doc = draft();
        let t = Utc::now();
        doc.apply_status(DocumentStatus::Sent, t).unwrap();
        doc.apply_status(DocumentStatus::Negotiating, t).unwrap();
        doc.apply_status(DocumentStatus::Validated, t).unwrap();

        assert_eq!(doc.status, DocumentStatus::Validated);
        assert_eq!(doc.date_validated, Some(t));
        assert_eq!(doc.date_sent, Some(t));
    }

    #[test]
    fn test_draft_can_be_rejected_directly() {
        let mut doc = draft();
        doc.apply_status(DocumentStatus::Rejected, Utc::now()).unwrap();
        assert_eq!(doc.status, DocumentStatus::Rejected);
        assert!(doc.date_sent.is_none());
    }

    #[test]
    fn test_draft_cannot_be_validated() {
        let mut doc = draft();
        let err = doc.apply_status(DocumentStatus::Validated, Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidTransition {
                from: DocumentStatus::Draft,
                to: DocumentStatus::Validated
            }
        ));
        assert_eq!(doc.status, DocumentStatus::Draft);
    }

    #[test]
    fn test_terminal_statuses_have_no_exit() {
        for terminal in [DocumentStatus::Validated, DocumentStatus::Rejected, DocumentStatus::Expired] {
            assert!(terminal.is_terminal());
            for next in DocumentStatus::ALL {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn test_terminal_same_status_is_noop() {
        let mut doc = draft();
        doc.apply_status(DocumentStatus::Rejected, Utc::now()).unwrap();
        assert_eq!(
            doc.apply_status(DocumentStatus::Rejected, Utc::now()).unwrap(),
            Transition::Unchanged
        );
    }

    #[test]
    fn test_ensure_editable() {
        let mut doc = draft();
        assert!(doc.ensure_editable().is_ok());

        doc.apply_status(DocumentStatus::Sent, Utc::now()).unwrap();
        assert!(doc.ensure_editable().is_ok());

        doc.apply_status(DocumentStatus::Expired, Utc::now()).unwrap();
        assert!(matches!(
            doc.ensure_editable(),
            Err(CoreError::DocumentLocked { .. })
        ));
    }
}
