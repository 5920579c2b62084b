//! # TaskNest Shared Library
//!
//! Domain logic for the TaskNest API: credentials, tokens, accounts and
//! owner-scoped tasks, plus the storage they sit on.
//!
//! ## Module Organization
//!
//! - `auth`: Password hashing and the token service
//! - `accounts`: Registration and login
//! - `tasks`: Owner-scoped task operations
//! - `store`: Storage trait with PostgreSQL and in-memory backends
//! - `models`: Database models and queries
//! - `db`: Connection pool and migrations

pub mod accounts;
pub mod auth;
pub mod db;
pub mod models;
pub mod store;
pub mod tasks;
