//! Repository trait definitions for the domain layer.
//!
//! Implementations live in `crate::infrastructure::persistence`; mock
//! implementations are generated via `mockall` for unit tests.

pub mod hit_repository;

pub use hit_repository::HitRepository;

#[cfg(test)]
pub use hit_repository::MockHitRepository;
