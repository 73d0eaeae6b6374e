//! Auth types shared across Storefront services.
//!
//! Provides JWT validation, the `BearerToken` extractor, and the
//! signing-key strength check.

pub mod bearer;
pub mod token;
