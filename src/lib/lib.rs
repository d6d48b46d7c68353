//! A small server-rendered todo list backed by SQLite.
//!
//! [`storage`] owns the table and hands out request-scoped sessions,
//! [`adapters`] maps the HTTP routes onto it and renders the pages.

pub mod adapters;
pub mod config;
pub mod core;
pub mod storage;
