//! Domain and application core for the Shelfward book catalogue.
//!
//! The crate is transport and storage agnostic: entities and value objects
//! enforce business invariants, port traits describe the collaborators the
//! core needs (persistence, cache, external metadata, password hashing), and
//! application services orchestrate the use-cases through those ports.
//! Adapters live outside this crate and are injected at construction time.

pub mod domain;
