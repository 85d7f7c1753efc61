//! # Tickergrid Core
//!
//! Shared contracts for the tickergrid market-data service.
//!
//! ## Overview
//!
//! This crate provides the types both tiers agree on:
//!
//! - **Wire error contract** ([`Problem`], [`FieldViolation`]): the single
//!   JSON shape every error response carries
//! - **Internal failure taxonomy** ([`Failure`], [`FailureKind`]): what
//!   handlers and collaborators report before classification
//! - **Resource identity** ([`ResourceClass`]): addressing for error
//!   messages and cache invalidation groups
//! - **Domain models** ([`Exchange`], [`Sector`], [`Stock`], [`PricePoint`])
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`domain`] | Domain models (Exchange, Sector, Stock, PricePoint) |
//! | [`error`] | Core validation error types |
//! | [`failure`] | Internal failure taxonomy |
//! | [`problem`] | Wire-format error payload |
//! | [`resource`] | Resource classes and invalidation links |
//!
//! ## Error Handling
//!
//! Internal failures never cross the wire directly. The web tier classifies
//! a [`Failure`] into a [`Problem`] with a fixed status, and unknown
//! failures are scrubbed so internal text reaches logs only:
//!
//! ```rust
//! use tickergrid_core::{Failure, FailureKind};
//!
//! fn handle(failure: &Failure) {
//!     match failure.kind() {
//!         FailureKind::NotFound => {
//!             // 404 with a resource-shaped detail
//!         }
//!         FailureKind::Timeout => {
//!             // 408, retryable on the client
//!         }
//!         _ => {
//!             // 500, generic detail on the wire
//!         }
//!     }
//! }
//! ```

pub mod domain;
pub mod error;
pub mod failure;
pub mod problem;
pub mod resource;

// Re-export commonly used types at crate root for convenience

pub use domain::{Exchange, PricePoint, PriceRange, Sector, Stock, Symbol};
pub use error::{CoreError, ValidationError};
pub use failure::{Failure, FailureKind};
pub use problem::{status_title, FieldViolation, Problem, BLANK_TYPE, SUPPORTED_STATUSES};
pub use resource::ResourceClass;
