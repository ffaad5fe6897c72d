//! Domain logic for the title review service.
//!
//! Nothing in this crate touches the network or the database. The `db` crate
//! persists what these modules validate and compute, and the `api` crate maps
//! [`error::CoreError`] onto HTTP responses.

pub mod access;
pub mod catalog;
pub mod error;
pub mod pagination;
pub mod rating;
pub mod roles;
pub mod scoring;
pub mod types;
