//! Hit store implementations.
//!
//! # Repositories
//!
//! - [`PgHitRepository`] - PostgreSQL-backed append-only log
//! - [`InMemoryHitRepository`] - process-local store with identical aggregation semantics

pub mod memory_hit_repository;
pub mod pg_hit_repository;

pub use memory_hit_repository::InMemoryHitRepository;
pub use pg_hit_repository::PgHitRepository;
