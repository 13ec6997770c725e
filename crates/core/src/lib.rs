//! Core library for docfill
//!
//! This crate implements the **Functional Core** of the docfill application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! The docfill project uses a multi-crate architecture to enforce separation
//! of concerns:
//!
//! - **`docfill_core`** (this crate): Pure transformation functions with zero I/O
//! - **`docx`**: The DOCX package and body model (zip + XML parsing)
//! - **`docfill`**: I/O operations and orchestration (the Imperative Shell)
//!
//! ## Functional Core Principles
//!
//! All functions in this crate adhere to these principles:
//!
//! - **Pure functions**: Same input always produces the same output
//! - **No side effects**: No I/O operations, no external state mutations
//! - **Deterministic**: Behavior is predictable and reproducible
//! - **Testable**: Can be tested with simple fixture data, no mocking required
//!
//! Determinism matters more here than in most tools: the blank-scanning
//! algorithm runs twice over the same document (once to extract field labels,
//! once to fill values back in), and the two runs must make identical
//! label decisions for every blank or values land in the wrong fields.
//!
//! # Module Organization
//!
//! - [`blanks`]: Placeholder-run detection within a text string
//! - [`scan`]: Label resolution for blanks, shared by both passes
//! - [`mapping`]: Prompt construction and response parsing for the
//!   label-to-value mapping service
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use docfill_core::scan::{extract_labels, ScanState};
//!
//! let mut state = ScanState::new();
//! let labels = extract_labels("Name: ____", &mut state);
//! assert_eq!(labels, vec!["Name:".to_string()]);
//! ```

pub mod blanks;
pub mod mapping;
pub mod scan;
