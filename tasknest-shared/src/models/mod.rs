/// Database models for TaskNest
///
/// This module contains the Postgres-backed models and their queries.
///
/// # Models
///
/// - `user`: Registered accounts (login + password digest)
/// - `task`: TODO items, each owned by one user
///
/// Task queries are always scoped by owner; there is no query that reads or
/// writes a task by ID alone.

pub mod task;
pub mod user;
