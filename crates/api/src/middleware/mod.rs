//! Request extractors for caller identity.
//!
//! - [`auth`] -- [`yamdb_core::access::Subject`] from an optional Bearer
//!   token, plus [`auth::AuthUser`] for endpoints that need a logged-in caller.

pub mod auth;
