//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer.
//!
//! # Modules
//!
//! - [`persistence`] - Hit store implementations (PostgreSQL and in-memory)

pub mod persistence;
