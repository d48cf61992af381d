//! Router Module Index
//!
//! One router per actor prefix. Both are nested by `create_router`, which also
//! owns the cross-cutting routes (`/health`, `/uploads`, `/api-docs`).

/// Routes mounted under `/customer`.
pub mod customer;

/// Routes mounted under `/admin`: admin identity plus vendor management.
pub mod admin;
