//! # quotebook-core: Pure Business Logic for Quotebook
//!
//! Everything about a quote or project that can be decided without touching
//! storage: line totals, tax, document numbers, the status lifecycle and
//! request validation.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Quotebook Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 HTTP layer (external collaborator)              │   │
//! │  │      Devis form ──► create / update / send / validate           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ quotebook-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  totals   │  │ numbering │  │ lifecycle │  │   │
//! │  │   │ Document  │  │  Totals   │  │ DEV2025.. │  │  Status   │  │   │
//! │  │   │ LineItem  │  │  TaxRate  │  │           │  │ machine   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  quotebook-db (Database Layer)                  │   │
//! │  │        SQLite, allocator, transaction coordinator               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Document, LineItem, request shapes)
//! - [`totals`] - Line item aggregation with exact decimals
//! - [`numbering`] - `PREFIX + YYYY + NNNN` document numbers
//! - [`lifecycle`] - Document status transitions
//! - [`error`] - Domain error types
//! - [`validation`] - Request validation
//!
//! ## Example Usage
//!
//! ```rust
//! use quotebook_core::totals::{TaxRate, Totals};
//! use quotebook_core::NewLineItem;
//! use rust_decimal::Decimal;
//!
//! let lines = vec![
//!     NewLineItem::new("Châssis alu", Decimal::new(2, 0), "u", Decimal::new(10000, 2)),
//!     NewLineItem::new("Pose", Decimal::ONE, "forfait", Decimal::new(5000, 2)),
//! ];
//!
//! let totals = Totals::aggregate(&lines, TaxRate::from_percent(Decimal::new(20, 0))).unwrap();
//! assert_eq!(totals.grand_total, Decimal::new(30000, 2));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod lifecycle;
pub mod numbering;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use totals::{LineAmount, TaxRate, Totals};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default prefix for quotes ("Devis").
pub const QUOTE_PREFIX: &str = "DEV";

/// Default prefix for projects.
pub const PROJECT_PREFIX: &str = "PRJ";

/// Width of the zero-padded sequence suffix (`0001`).
pub const SEQUENCE_WIDTH: usize = 4;

/// Largest sequence a prefix can reach within one year.
pub const MAX_SEQUENCE: u32 = 9999;

/// Default VAT rate, in percent.
pub const DEFAULT_TAX_RATE_PERCENT: i64 = 20;

/// Maximum line items on a single document.
///
/// ## Business Reason
/// Large fabrication quotes run to a few hundred rows; anything beyond this
/// is almost certainly a client bug resubmitting the same rows.
pub const MAX_LINE_ITEMS: usize = 500;
