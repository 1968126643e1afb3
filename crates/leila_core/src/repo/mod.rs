//! Data mappers and their registry.
//!
//! # Responsibility
//! - Translate persisted entity types to and from their backing tables.
//! - Resolve the mapper bound to the shared connection for an entity or type name.
//!
//! # Invariants
//! - Every mutating mapper call autocommits; batching belongs to `UnitOfWork`.
//! - Store failures surface as typed `MapperError`s carrying the cause.
//! - Mappers hold nothing but the connection.

pub mod mapper;
pub mod reader_mapper;
pub mod registry;
