//! # Repository Module
//!
//! Database access for documents and their line items.
//!
//! ## Read Side vs Write Side
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  HTTP layer / PDF renderer / mailer                                    │
//! │       │                                                                 │
//! │       │  db.documents().find_by_number("DEV", "DEV20250001")           │
//! │       ▼                                                                 │
//! │  DocumentRepository (pool)                                             │
//! │  ├── get_by_id / find_by_number / list                                 │
//! │  ├── get_lines                                                         │
//! │  ├── count_for_year / summary_by_status                                │
//! │  └── delete                                                             │
//! │                                                                         │
//! │  DocumentCoordinator (one transaction per call)                        │
//! │       │                                                                 │
//! │       │  &mut SqliteConnection from the open transaction               │
//! │       ▼                                                                 │
//! │  document::{insert_header, insert_lines, update_header, ...}           │
//! │  allocator::allocate                                                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Writes that must be atomic never take the pool; they borrow the
//! connection of the transaction the coordinator opened.
//!
//! ## Available Repositories
//!
//! - [`DocumentRepository`](document::DocumentRepository) - Document queries
//! - [`allocator`] - Year-scoped document number allocation

pub mod allocator;
pub mod document;
