//! Example generation
//!
//! Every generator draws ids from one shared `IdSequence`, so ids stay
//! unique across single-tool, multi-tool, unknown-intent and paraphrased
//! examples of the same run.

pub mod multi_tool;
pub mod negative;
pub mod paraphrase;
pub mod single_tool;

pub use multi_tool::generate_multi_tool_examples;
pub use negative::generate_unknown_intent_examples;
pub use paraphrase::{paraphrase_dataset, paraphrase_query};
pub use single_tool::generate_single_tool_examples;

/// Sequential id allocator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdSequence {
    next: u64,
}

impl IdSequence {
    /// Start allocating at `first`
    pub fn starting_at(first: u64) -> Self {
        Self { next: first }
    }

    /// Allocate the next id
    pub fn allocate(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Id the next allocation will return
    pub fn peek(&self) -> u64 {
        self.next
    }
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_allocates_in_order() {
        let mut ids = IdSequence::default();
        assert_eq!(ids.allocate(), 1);
        assert_eq!(ids.allocate(), 2);
        assert_eq!(ids.peek(), 3);
    }

    #[test]
    fn test_custom_start() {
        let mut ids = IdSequence::starting_at(1000);
        assert_eq!(ids.allocate(), 1000);
    }
}
