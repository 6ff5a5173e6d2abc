//! Handle translation for copy-then-rebind cloning.
//!
//! Cloning an event (or a collision within one) happens in two phases.
//! First every reachable object is copied verbatim into its destination
//! arena and the old-to-new handle pairs are recorded in a
//! [`TranslationMap`]. Then every copy is handed the finished map through
//! [`Rebind::rebind`] and rewrites the handles it holds. Handles with no
//! entry in the map are left as they are.
//!
//! Rebinding only reads the map and the object's own state, so the order
//! in which copies are rebound does not matter.

use indexmap::IndexMap;
use smallvec::SmallVec;

use evrec_core::{CollisionId, ColourLineId, ParticleId, StepId, SubProcessId};

/// Original-to-copy handle pairs produced while cloning.
#[derive(Clone, Debug, Default)]
pub struct TranslationMap {
    particles: IndexMap<ParticleId, ParticleId>,
    steps: IndexMap<StepId, StepId>,
    sub_processes: IndexMap<SubProcessId, SubProcessId>,
    collisions: IndexMap<CollisionId, CollisionId>,
    colour_lines: IndexMap<ColourLineId, ColourLineId>,
}

impl TranslationMap {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of an original particle, if it was cloned.
    pub fn particle(&self, original: ParticleId) -> Option<ParticleId> {
        self.particles.get(&original).copied()
    }

    /// Copy of an original step, if it was cloned.
    pub fn step(&self, original: StepId) -> Option<StepId> {
        self.steps.get(&original).copied()
    }

    /// Copy of an original sub-process, if it was cloned.
    pub fn sub_process(&self, original: SubProcessId) -> Option<SubProcessId> {
        self.sub_processes.get(&original).copied()
    }

    /// Copy of an original collision, if it was cloned.
    pub fn collision(&self, original: CollisionId) -> Option<CollisionId> {
        self.collisions.get(&original).copied()
    }

    /// Copy of an original colour line, if it was cloned.
    pub fn colour_line(&self, original: ColourLineId) -> Option<ColourLineId> {
        self.colour_lines.get(&original).copied()
    }

    /// Particle pairs in the order they were recorded.
    pub fn particles(&self) -> impl Iterator<Item = (ParticleId, ParticleId)> + '_ {
        self.particles.iter().map(|(a, b)| (*a, *b))
    }

    /// Total number of recorded pairs across all object kinds.
    pub fn len(&self) -> usize {
        self.particles.len()
            + self.steps.len()
            + self.sub_processes.len()
            + self.collisions.len()
            + self.colour_lines.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn insert_particle(&mut self, from: ParticleId, to: ParticleId) {
        self.particles.insert(from, to);
    }

    pub(crate) fn insert_step(&mut self, from: StepId, to: StepId) {
        self.steps.insert(from, to);
    }

    pub(crate) fn insert_sub_process(&mut self, from: SubProcessId, to: SubProcessId) {
        self.sub_processes.insert(from, to);
    }

    pub(crate) fn insert_collision(&mut self, from: CollisionId, to: CollisionId) {
        self.collisions.insert(from, to);
    }

    pub(crate) fn insert_colour_line(&mut self, from: ColourLineId, to: ColourLineId) {
        self.colour_lines.insert(from, to);
    }
}

/// A handle (or handle container) that can be looked up in a
/// [`TranslationMap`].
pub trait Translate: Sized {
    /// The translated value; untranslated handles come back unchanged.
    fn translate(&self, map: &TranslationMap) -> Self;
}

macro_rules! translate_handle {
    ($ty:ty, $field:ident) => {
        impl Translate for $ty {
            fn translate(&self, map: &TranslationMap) -> Self {
                map.$field.get(self).copied().unwrap_or(*self)
            }
        }
    };
}

translate_handle!(ParticleId, particles);
translate_handle!(StepId, steps);
translate_handle!(SubProcessId, sub_processes);
translate_handle!(CollisionId, collisions);
translate_handle!(ColourLineId, colour_lines);

impl<T: Translate> Translate for Option<T> {
    fn translate(&self, map: &TranslationMap) -> Self {
        self.as_ref().map(|v| v.translate(map))
    }
}

impl<T: Translate> Translate for Vec<T> {
    fn translate(&self, map: &TranslationMap) -> Self {
        self.iter().map(|v| v.translate(map)).collect()
    }
}

impl<A: smallvec::Array> Translate for SmallVec<A>
where
    A::Item: Translate,
{
    fn translate(&self, map: &TranslationMap) -> Self {
        self.iter().map(|v| v.translate(map)).collect()
    }
}

impl<T: Translate + std::hash::Hash + Eq> Translate for indexmap::IndexSet<T> {
    fn translate(&self, map: &TranslationMap) -> Self {
        self.iter().map(|v| v.translate(map)).collect()
    }
}

/// An object that holds handles to other event objects.
pub trait Rebind {
    /// Rewrite every held handle through `map`.
    fn rebind(&mut self, map: &TranslationMap);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untranslated_handles_pass_through() {
        let mut map = TranslationMap::new();
        let a = ParticleId::from_raw(0, 0);
        let b = ParticleId::from_raw(1, 0);
        let a2 = ParticleId::from_raw(0, 1);
        map.insert_particle(a, a2);
        assert_eq!(a.translate(&map), a2);
        assert_eq!(b.translate(&map), b);
        assert_eq!(Some(a).translate(&map), Some(a2));
        assert_eq!(vec![a, b].translate(&map), vec![a2, b]);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn kinds_do_not_mix() {
        let mut map = TranslationMap::new();
        map.insert_step(StepId::from_raw(0, 0), StepId::from_raw(0, 1));
        let p = ParticleId::from_raw(0, 0);
        assert_eq!(p.translate(&map), p);
        assert_eq!(map.particle(p), None);
        assert_eq!(
            map.step(StepId::from_raw(0, 0)),
            Some(StepId::from_raw(0, 1))
        );
    }
}
