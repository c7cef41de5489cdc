//! Concept registry
//!
//! Analyst-defined named token groups, usable as rule conditions through
//! the `is` sign. The registry is the single owner of concept state:
//! views read concepts through accessors and never mutate them directly.
//!
//! Identifiers come from a monotonically increasing counter and are never
//! reused within a session, so a removed id can never collide with a live
//! one.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::rules::{Condition, Sign};

use super::errors::{ConceptError, ConceptResult};

/// Identifier of a concept. Embedded in condition feature names as
/// `concept_<id>`.
pub type ConceptId = u32;

/// One analyst-defined concept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Concept {
    id: ConceptId,
    members: Vec<String>,
}

impl Concept {
    pub fn id(&self) -> ConceptId {
        self.id
    }

    /// Member tokens in submission order.
    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Comma-separated member text, the inverse of [`parse_members`].
    pub fn render_members(&self) -> String {
        self.members.join(", ")
    }
}

/// Parses free-text concept input into member tokens.
///
/// Entries are comma-separated; each entry is trimmed and internal
/// whitespace runs collapse to a single underscore, matching the token
/// form used by containment conditions. Empty entries are dropped.
/// Idempotent: re-parsing rendered members yields the same list.
pub fn parse_members(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|entry| entry.split_whitespace().collect::<Vec<_>>().join("_"))
        .filter(|token| !token.is_empty())
        .collect()
}

/// Session-wide registry of analyst-defined concepts.
#[derive(Debug, Clone, Default)]
pub struct ConceptRegistry {
    concepts: BTreeMap<ConceptId, Concept>,
    next_id: ConceptId,
}

impl ConceptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty concept and returns its id. Never fails; ids are
    /// allocated from the monotonic counter.
    pub fn create(&mut self) -> ConceptId {
        self.next_id += 1;
        let id = self.next_id;
        self.concepts.insert(
            id,
            Concept {
                id,
                members: Vec::new(),
            },
        );
        id
    }

    /// Replaces a concept's members from free-text input.
    pub fn set_members(&mut self, id: ConceptId, raw: &str) -> ConceptResult<()> {
        let concept = self
            .concepts
            .get_mut(&id)
            .ok_or(ConceptError::UnknownConcept(id))?;
        concept.members = parse_members(raw);
        Ok(())
    }

    /// Removes a concept. After the removal that empties the registry,
    /// [`ConceptRegistry::has_concepts`] reads false; the UI consumes that
    /// flag to disable concept-condition add actions.
    pub fn remove(&mut self, id: ConceptId) -> ConceptResult<()> {
        self.concepts
            .remove(&id)
            .map(|_| ())
            .ok_or(ConceptError::UnknownConcept(id))
    }

    pub fn get(&self, id: ConceptId) -> Option<&Concept> {
        self.concepts.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Concept> {
        self.concepts.values()
    }

    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    /// Observable "concepts remain" flag.
    pub fn has_concepts(&self) -> bool {
        !self.concepts.is_empty()
    }

    /// Resolves one condition: an `is` condition gets its operand replaced
    /// with the referenced concept's current members; every other sign
    /// passes through unchanged.
    ///
    /// Fails on a reference to an unknown or deleted concept. A known
    /// concept with zero members resolves to the empty list, which is
    /// valid.
    pub fn resolve(&self, condition: &Condition) -> ConceptResult<Condition> {
        if condition.sign() != Sign::MemberOf {
            return Ok(condition.clone());
        }
        let id = condition
            .concept_id()
            .ok_or_else(|| ConceptError::MalformedReference(condition.feature().to_string()))?;
        let concept = self.get(id).ok_or(ConceptError::UnknownConcept(id))?;
        Ok(condition.with_members(concept.members().to_vec()))
    }

    /// Resolves every condition of a rule for submission. Fails on the
    /// first unresolved reference, leaving the caller's pending edit
    /// untouched.
    pub fn resolve_all(&self, conditions: &[Condition]) -> ConceptResult<Vec<Condition>> {
        conditions.iter().map(|c| self.resolve(c)).collect()
    }
}
