//! Core use-case services.
//!
//! # Responsibility
//! - Compose validation, hashing, token issuance and repository calls into
//!   sign-up, log-in and task CRUD flows.
//! - Shape repository records into response projections.
//! - Collapse lower-layer failures into the caller-facing [`ServiceError`].
//!
//! # Invariants
//! - Task flows take an [`AuthenticatedUser`](crate::auth::identity::AuthenticatedUser)
//!   resolved upstream; they never look identity up themselves.
//! - Services remain storage-agnostic.

pub mod auth_service;
pub mod error;
pub mod task_service;

pub use error::{ErrorKind, ServiceError, ServiceResult};
