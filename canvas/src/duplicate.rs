//! Element duplication with identifier remapping.
//!
//! DESIGN
//! ======
//! Duplicating a set of elements is a two-pass operation. The first pass
//! assigns every input element a fresh id from an [`IdSource`] and records
//! `original id -> new id`. The second pass clones each element in input
//! order, swaps in its new id, and rewrites its `label_id` through the same
//! mapping. A label that points outside the duplicated set is dropped, so the
//! output never references the originals.
//!
//! A drawn id is discarded and redrawn when it matches an input id, an id
//! already handed out in the same call, or an id the caller reports as taken.
//! Deterministic sources (seeded, sequential) replay the same ids, so this
//! keeps output disjoint from input when a run is fed its own output.
//!
//! The input slice is never mutated and nothing outside the call is touched;
//! the only side effects are `tracing` events.

#[cfg(test)]
#[path = "duplicate_test.rs"]
mod duplicate_test;

use std::collections::{HashMap, HashSet};

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::consts::{DEFAULT_SEQUENCE_PREFIX, MAX_ID_DRAWS};
use crate::doc::{CanvasElement, ElementId};

// =============================================================================
// ERRORS
// =============================================================================

/// Error returned when the input set cannot be duplicated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DuplicateError {
    /// The element at `index` has an empty identifier.
    #[error("element at index {index} has no id")]
    MissingId { index: usize },
    /// Two input elements share `id` and the policy is [`DuplicateIdPolicy::Reject`].
    #[error("duplicate element id in input: {id}")]
    DuplicateId { id: ElementId },
    /// The id source kept returning ids that were already in use.
    #[error("id source produced no unused id in {attempts} draws")]
    IdsExhausted { attempts: u32 },
}

// =============================================================================
// ID SOURCES
// =============================================================================

/// Supplies fresh, globally unique element identifiers on demand.
pub trait IdSource {
    /// Return the next identifier. Must not repeat within the source's lifetime.
    fn next_id(&mut self) -> ElementId;
}

impl<I: IdSource + ?Sized> IdSource for &mut I {
    fn next_id(&mut self) -> ElementId {
        (**self).next_id()
    }
}

impl<I: IdSource + ?Sized> IdSource for Box<I> {
    fn next_id(&mut self) -> ElementId {
        (**self).next_id()
    }
}

/// Random UUID v4 identifiers from the thread RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIds;

impl IdSource for UuidIds {
    fn next_id(&mut self) -> ElementId {
        ElementId::from(Uuid::new_v4())
    }
}

/// UUID v4 identifiers drawn from a seeded RNG, for reproducible output.
#[derive(Debug, Clone)]
pub struct SeededIds {
    rng: StdRng,
}

impl SeededIds {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }
}

impl IdSource for SeededIds {
    fn next_id(&mut self) -> ElementId {
        let mut bytes = [0_u8; 16];
        self.rng.fill_bytes(&mut bytes);
        ElementId::from(uuid::Builder::from_random_bytes(bytes).into_uuid())
    }
}

/// Counter-based identifiers of the form `<prefix>-<n>`, starting at 1.
#[derive(Debug, Clone)]
pub struct SequenceIds {
    prefix: String,
    next: u64,
}

impl SequenceIds {
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into(), next: 1 }
    }

    /// Number of ids handed out so far.
    #[must_use]
    pub fn issued(&self) -> u64 {
        self.next - 1
    }
}

impl Default for SequenceIds {
    fn default() -> Self {
        Self::new(DEFAULT_SEQUENCE_PREFIX)
    }
}

impl IdSource for SequenceIds {
    fn next_id(&mut self) -> ElementId {
        let id = ElementId::new(format!("{}-{}", self.prefix, self.next));
        self.next += 1;
        id
    }
}

// =============================================================================
// POLICY
// =============================================================================

/// How to treat two input elements that share an identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicateIdPolicy {
    /// Fail with [`DuplicateError::DuplicateId`].
    #[default]
    Reject,
    /// Give every occurrence its own fresh id. Labels pointing at the shared
    /// id resolve to the last occurrence.
    Disambiguate,
    /// Keep one mapping entry per original id; the last generated id wins and
    /// every occurrence receives it. Output ids are then not unique.
    LastWins,
}

// =============================================================================
// DUPLICATOR
// =============================================================================

/// Duplicates element sets using an injected [`IdSource`].
#[derive(Debug, Clone, Default)]
pub struct Duplicator<I> {
    ids: I,
    policy: DuplicateIdPolicy,
}

impl<I: IdSource> Duplicator<I> {
    /// Build a duplicator with the default [`DuplicateIdPolicy::Reject`] policy.
    #[must_use]
    pub fn new(ids: I) -> Self {
        Self { ids, policy: DuplicateIdPolicy::default() }
    }

    /// Replace the duplicate-id policy.
    #[must_use]
    pub fn with_policy(mut self, policy: DuplicateIdPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn policy(&self) -> DuplicateIdPolicy {
        self.policy
    }

    /// Borrow the underlying id source.
    #[must_use]
    pub fn ids(&self) -> &I {
        &self.ids
    }

    /// Produce copies of `elements` with fresh ids and remapped labels.
    ///
    /// The result has the same length and order as the input. An empty input
    /// returns an empty result without drawing any ids.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateError::MissingId`] if any element has an empty id, and
    /// [`DuplicateError::DuplicateId`] when ids repeat under the `Reject` policy.
    pub fn duplicate(&mut self, elements: &[CanvasElement]) -> Result<Vec<CanvasElement>, DuplicateError> {
        self.duplicate_avoiding(elements, |_| false)
    }

    /// Like [`Duplicator::duplicate`], but also never hands out an id for
    /// which `taken` returns `true` (typically ids already in a document).
    ///
    /// # Errors
    ///
    /// As [`Duplicator::duplicate`], plus [`DuplicateError::IdsExhausted`] when
    /// the source yields no usable id within a bounded number of draws.
    pub fn duplicate_avoiding(
        &mut self,
        elements: &[CanvasElement],
        taken: impl Fn(&ElementId) -> bool,
    ) -> Result<Vec<CanvasElement>, DuplicateError> {
        if elements.is_empty() {
            return Ok(Vec::new());
        }

        let remap = self.build_remap(elements, &taken)?;

        let mut out = Vec::with_capacity(elements.len());
        let mut dropped_labels = 0_usize;
        for (index, element) in elements.iter().enumerate() {
            let id = if let Some(id) = remap.id_for(index, &element.id) {
                id.clone()
            } else {
                warn!(id = %element.id, index, "no remap entry for element; generating a fresh id");
                self.ids.next_id()
            };

            let mut copy = element.clone();
            copy.id = id;
            if let Some(slot) = copy.body.label_slot_mut() {
                if let Some(label) = slot.as_ref().filter(|label| !label.is_empty()) {
                    let resolved = remap.targets.get(label).cloned();
                    if resolved.is_none() {
                        dropped_labels += 1;
                    }
                    *slot = resolved;
                }
            }
            out.push(copy);
        }

        debug!(count = out.len(), dropped_labels, policy = ?self.policy, "duplicated elements");
        Ok(out)
    }

    fn build_remap(
        &mut self,
        elements: &[CanvasElement],
        taken: &dyn Fn(&ElementId) -> bool,
    ) -> Result<Remap, DuplicateError> {
        let inputs: HashSet<&ElementId> = elements.iter().map(|e| &e.id).collect();
        let mut issued: HashSet<ElementId> = HashSet::with_capacity(elements.len());
        let mut remap = Remap {
            policy: self.policy,
            targets: HashMap::with_capacity(elements.len()),
            assigned: Vec::with_capacity(elements.len()),
        };

        for (index, element) in elements.iter().enumerate() {
            if element.id.is_empty() {
                return Err(DuplicateError::MissingId { index });
            }
            if self.policy == DuplicateIdPolicy::Reject && remap.targets.contains_key(&element.id) {
                return Err(DuplicateError::DuplicateId { id: element.id.clone() });
            }

            let fresh = self.draw_unused(|id| inputs.contains(id) || issued.contains(id) || taken(id))?;
            issued.insert(fresh.clone());
            if self.policy != DuplicateIdPolicy::LastWins {
                remap.assigned.push(fresh.clone());
            }
            remap.targets.insert(element.id.clone(), fresh);
        }

        Ok(remap)
    }

    fn draw_unused(&mut self, in_use: impl Fn(&ElementId) -> bool) -> Result<ElementId, DuplicateError> {
        for _ in 0..MAX_ID_DRAWS {
            let id = self.ids.next_id();
            if !in_use(&id) {
                return Ok(id);
            }
            debug!(%id, "drawn id already in use; redrawing");
        }
        Err(DuplicateError::IdsExhausted { attempts: MAX_ID_DRAWS })
    }
}

/// Mapping built by the first pass.
struct Remap {
    policy: DuplicateIdPolicy,
    /// Original id to new id; used for labels and, under `LastWins`, for ids.
    targets: HashMap<ElementId, ElementId>,
    /// New id per input position. Empty under `LastWins`.
    assigned: Vec<ElementId>,
}

impl Remap {
    fn id_for(&self, index: usize, original: &ElementId) -> Option<&ElementId> {
        match self.policy {
            DuplicateIdPolicy::LastWins => self.targets.get(original),
            DuplicateIdPolicy::Reject | DuplicateIdPolicy::Disambiguate => self.assigned.get(index),
        }
    }
}

/// Duplicate `elements` with random UUID v4 ids, rejecting repeated input ids.
///
/// # Errors
///
/// See [`Duplicator::duplicate`].
pub fn duplicate(elements: &[CanvasElement]) -> Result<Vec<CanvasElement>, DuplicateError> {
    Duplicator::new(UuidIds).duplicate(elements)
}
