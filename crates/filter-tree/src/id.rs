//! Identifier generation for canonical tree nodes.
//!
//! Ids are opaque strings. Generators are plain values owned by whoever
//! builds nodes (usually a [`crate::FilterSession`]), so tests can swap in a
//! deterministic one.

use uuid::Uuid;

/// Source of fresh node identifiers.
pub trait IdGenerator {
    /// Returns an id that this generator has not returned before.
    fn next_id(&mut self) -> String;
}

impl<G: IdGenerator + ?Sized> IdGenerator for Box<G> {
    fn next_id(&mut self) -> String {
        (**self).next_id()
    }
}

/// Generates random UUID v4 ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl UuidIdGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl IdGenerator for UuidIdGenerator {
    fn next_id(&mut self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}

/// Generates `<prefix><n>` ids from a counter.
#[derive(Debug, Clone)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: u64,
}

impl SequentialIdGenerator {
    /// Creates a generator producing `n1`, `n2`, ...
    pub fn new() -> Self {
        Self::with_prefix("n")
    }

    /// Creates a generator producing `<prefix>1`, `<prefix>2`, ...
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&mut self) -> String {
        let id = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}
