//! # Domain Types
//!
//! Core domain types used throughout Quotebook.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────────┐          ┌─────────────────────┐              │
//! │  │      Document       │          │      LineItem       │              │
//! │  │  ─────────────────  │  1 ── n  │  ─────────────────  │              │
//! │  │  id (UUID)          │◄─────────│  document_id (FK)   │              │
//! │  │  number DEV20250001 │          │  ordinal (1..n)     │              │
//! │  │  status             │          │  quantity × price   │              │
//! │  │  subtotal / tax     │          └─────────────────────┘              │
//! │  └─────────────────────┘                                               │
//! │                                                                         │
//! │  ┌─────────────────────┐   ┌─────────────────────┐                     │
//! │  │    DocumentKind     │   │   DocumentStatus    │                     │
//! │  │  Quote   (DEV)      │   │  Draft → Sent → ... │                     │
//! │  │  Project (PRJ)      │   │  see lifecycle.rs   │                     │
//! │  └─────────────────────┘   └─────────────────────┘                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Arena-Style Relations
//! Documents and line items are stored and passed around separately and are
//! related only by `document_id`. A document never holds its lines, and a
//! line never points back at its document.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{PROJECT_PREFIX, QUOTE_PREFIX};

// =============================================================================
// Document Kind
// =============================================================================

/// The family a document belongs to. Each kind has its own number sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// A priced offer sent to a client ("Devis").
    Quote,
    /// A signed job being fabricated and installed.
    Project,
}

impl DocumentKind {
    /// The built-in number prefix for this kind.
    pub const fn default_prefix(&self) -> &'static str {
        match self {
            DocumentKind::Quote => QUOTE_PREFIX,
            DocumentKind::Project => PROJECT_PREFIX,
        }
    }

    /// Stable lowercase name, as stored in the database.
    pub const fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Quote => "quote",
            DocumentKind::Project => "project",
        }
    }
}

// =============================================================================
// Document Status
// =============================================================================

/// Where a document is in its commercial life.
///
/// Transition rules live in [`crate::lifecycle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    /// Being written; not yet shown to the client.
    Draft,
    /// Sent to the client.
    Sent,
    /// Client asked for changes; back-and-forth in progress.
    Negotiating,
    /// Accepted by the client.
    Validated,
    /// Declined (by the client or withdrawn internally).
    Rejected,
    /// Validity period ran out before an answer.
    Expired,
}

impl DocumentStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [DocumentStatus; 6] = [
        DocumentStatus::Draft,
        DocumentStatus::Sent,
        DocumentStatus::Negotiating,
        DocumentStatus::Validated,
        DocumentStatus::Rejected,
        DocumentStatus::Expired,
    ];
}

impl Default for DocumentStatus {
    fn default() -> Self {
        DocumentStatus::Draft
    }
}

// =============================================================================
// Document
// =============================================================================

/// A quote or project header with its persisted totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Document {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub kind: DocumentKind,

    /// Prefix the number was allocated under (`DEV`, `PRJ`, ...).
    pub prefix: String,

    /// Business identifier, `PREFIX + YYYY + NNNN`.
    pub number: String,

    pub status: DocumentStatus,

    pub title: String,

    /// Client this document is addressed to (opaque foreign key).
    pub client_id: Option<String>,

    pub notes: Option<String>,

    /// VAT rate in percent (20 = 20 %).
    #[ts(type = "string")]
    pub tax_rate: Decimal,

    /// Sum of line totals.
    #[ts(type = "string")]
    pub subtotal: Decimal,

    #[ts(type = "string")]
    pub tax_amount: Decimal,

    /// `subtotal + tax_amount`.
    #[ts(type = "string")]
    pub grand_total: Decimal,

    /// User who created the document (opaque foreign key).
    pub created_by: String,

    /// User who last modified the document.
    pub updated_by: String,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,

    /// First time the document entered `Sent`.
    #[ts(as = "Option<String>")]
    pub date_sent: Option<DateTime<Utc>>,

    /// First time the document entered `Validated`.
    #[ts(as = "Option<String>")]
    pub date_validated: Option<DateTime<Utc>>,
}

// =============================================================================
// Line Item
// =============================================================================

/// One priced row of a document.
///
/// The line total is never stored; see [`crate::LineAmount::line_total`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    pub document_id: String,

    /// 1-based position; defines display and print order.
    pub ordinal: u32,

    pub description: String,

    #[ts(type = "string")]
    pub quantity: Decimal,

    /// Unit of measure (`u`, `m²`, `ml`, `forfait`, ...).
    pub unit: String,

    #[ts(type = "string")]
    pub unit_price: Decimal,
}

// =============================================================================
// Request Shapes
// =============================================================================

/// A line item as submitted by the caller, before it has a position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewLineItem {
    pub description: String,

    #[ts(type = "string")]
    pub quantity: Decimal,

    pub unit: String,

    #[ts(type = "string")]
    pub unit_price: Decimal,
}

impl NewLineItem {
    pub fn new(
        description: impl Into<String>,
        quantity: Decimal,
        unit: impl Into<String>,
        unit_price: Decimal,
    ) -> Self {
        NewLineItem {
            description: description.into(),
            quantity,
            unit: unit.into(),
            unit_price,
        }
    }

    /// Places this line at a 1-based position inside a document.
    pub fn into_line_item(self, document_id: &str, ordinal: u32) -> LineItem {
        LineItem {
            document_id: document_id.to_string(),
            ordinal,
            description: self.description,
            quantity: self.quantity,
            unit: self.unit,
            unit_price: self.unit_price,
        }
    }
}

/// Header fields for a new document. Number and totals are computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewDocument {
    pub kind: DocumentKind,

    pub title: String,

    pub client_id: Option<String>,

    pub notes: Option<String>,

    /// VAT rate in percent; the configured default applies when absent.
    #[ts(type = "string | null")]
    pub tax_rate: Option<Decimal>,

    /// Explicit number (imports, legacy numbering). Allocated when absent.
    pub number: Option<String>,

    pub created_by: String,

    pub lines: Vec<NewLineItem>,
}

impl NewDocument {
    /// A document with no lines, no client and an allocated number.
    pub fn new(kind: DocumentKind, title: impl Into<String>, created_by: impl Into<String>) -> Self {
        NewDocument {
            kind,
            title: title.into(),
            client_id: None,
            notes: None,
            tax_rate: None,
            number: None,
            created_by: created_by.into(),
            lines: Vec::new(),
        }
    }

    pub fn with_lines(mut self, lines: Vec<NewLineItem>) -> Self {
        self.lines = lines;
        self
    }

    pub fn with_client(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn with_tax_rate(mut self, percent: Decimal) -> Self {
        self.tax_rate = Some(percent);
        self
    }

    pub fn with_number(mut self, number: impl Into<String>) -> Self {
        self.number = Some(number.into());
        self
    }
}

/// Replacement header fields and line set for an existing document.
///
/// Number, creation timestamp, creator and status are never changed by an
/// update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DocumentUpdate {
    pub title: String,

    pub client_id: Option<String>,

    pub notes: Option<String>,

    /// New VAT rate; the current rate is kept when absent.
    #[ts(type = "string | null")]
    pub tax_rate: Option<Decimal>,

    pub updated_by: String,

    /// The complete new line set. Existing lines are replaced, not merged.
    pub lines: Vec<NewLineItem>,
}

// =============================================================================
// Dashboard
// =============================================================================

/// Per-status counts and amounts for one kind and year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StatusSummary {
    pub status: DocumentStatus,
    pub count: i64,
    #[ts(type = "string")]
    pub subtotal: Decimal,
    #[ts(type = "string")]
    pub grand_total: Decimal,
}

// =============================================================================
// Unit Tests
// =============================================================================
