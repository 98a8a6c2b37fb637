//! Storage infrastructure: the TOML configuration file.
//!
//! The bridge keeps no state across restarts; the only thing it reads from
//! disk is its own settings.  See [`config`] for the schema and lookup rules.

pub mod config;
