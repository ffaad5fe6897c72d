//! Authentication primitives.
//!
//! - [`jwt`] -- HS256 access-token validation (and minting, for operators and tests).
//!
//! Token issuance belongs to the identity service; this API only verifies.

pub mod jwt;
