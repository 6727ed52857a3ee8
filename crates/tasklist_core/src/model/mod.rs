//! Domain records and their outward-facing projections.
//!
//! # Responsibility
//! - Define the stored shapes of users and tasks.
//! - Define the response projections that are allowed to leave the core.
//! - Own input-shape validation for credentials and task titles.
//!
//! # Invariants
//! - A password hash never appears in a response projection, `Debug` output,
//!   or serialized form.
//! - Every task has exactly one owner, fixed at creation.

pub mod task;
pub mod user;
pub mod validation;
