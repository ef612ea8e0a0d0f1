//! Verse identifier generation.
//!
//! Every merged verse gets a fresh identifier. Identifiers are unique within
//! one build and carry no meaning across builds, so the aligner only needs a
//! source of new tokens. [`UuidIds`] is the production source;
//! [`SequentialIds`] yields predictable tokens for byte-comparable output.

use uuid::Uuid;

/// A source of fresh, unique identifiers.
pub trait IdSource {
    fn new_id(&mut self) -> String;
}

/// Random v4 UUIDs.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl IdSource for UuidIds {
    fn new_id(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Counter-based identifiers: `verse-1`, `verse-2`, ...
#[derive(Debug, Default, Clone)]
pub struct SequentialIds {
    next: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdSource for SequentialIds {
    fn new_id(&mut self) -> String {
        self.next += 1;
        format!("verse-{}", self.next)
    }
}
