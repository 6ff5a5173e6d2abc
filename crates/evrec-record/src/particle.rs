//! Particle instances and their relations.
//!
//! A [`Particle`] is one instance of a species with a momentum. Every
//! instance has a compact core (species, momentum, relations, number) and
//! an optional [`ExtendedState`] holding production vertex, life-length,
//! scales, spin and free-form extras. The extended state is allocated the
//! first time it is written; until then reads see defaults computed from
//! the species.
//!
//! Relations are stored as handles and only ever edited through
//! [`Event`](crate::Event), which keeps both ends of every link in sync.

use std::any::Any;
use std::sync::Arc;

use smallvec::SmallVec;
use tracing::trace;

use evrec_core::{
    LifetimeModel, Lorentz5Momentum, LorentzPoint, ParticleData, ParticleId, SpeciesRef, StepId,
};

use crate::error::RecordError;
use crate::event::Event;
use crate::rebind::{Rebind, TranslationMap, Translate};

/// Opaque user payload attached to a particle.
///
/// Shared on copy: cloning a particle clones the `Arc`, not the payload.
pub type ExtraInfo = Arc<dyn Any + Send + Sync>;

/// Spin state of a particle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpinInfo {
    /// Polarization as `(theta, phi)` in the particle rest frame.
    pub polarization: Option<(f64, f64)>,
    /// Helicity, if known.
    pub helicity: Option<f64>,
}

/// Rarely-used per-particle data.
#[derive(Clone)]
pub struct ExtendedState {
    /// Production vertex relative to the collision vertex.
    pub vertex: LorentzPoint,
    /// Displacement from production to decay.
    pub life_length: LorentzPoint,
    /// Scale at which the particle was produced.
    pub scale: Option<f64>,
    /// Veto scale for subsequent emissions.
    pub veto_scale: Option<f64>,
    /// Spin information.
    pub spin: Option<SpinInfo>,
    /// Label of the decay mode used, if the particle was decayed.
    pub decay_mode: Option<String>,
    /// Opaque payloads.
    pub extra_info: Vec<ExtraInfo>,
}

impl ExtendedState {
    /// Defaults for a particle of the given species and momentum:
    /// production at the origin, nominal life-length.
    pub fn nominal(
        species: &ParticleData,
        momentum: &Lorentz5Momentum,
        model: &dyn LifetimeModel,
    ) -> Self {
        let ctau = model.proper_lifetime(species, momentum.mass);
        Self {
            vertex: LorentzPoint::origin(),
            life_length: LorentzPoint::along(momentum, ctau),
            scale: None,
            veto_scale: None,
            spin: None,
            decay_mode: None,
            extra_info: Vec::new(),
        }
    }
}

impl std::fmt::Debug for ExtendedState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtendedState")
            .field("vertex", &self.vertex)
            .field("life_length", &self.life_length)
            .field("scale", &self.scale)
            .field("veto_scale", &self.veto_scale)
            .field("spin", &self.spin)
            .field("decay_mode", &self.decay_mode)
            .field("extra_info", &self.extra_info.len())
            .finish()
    }
}

/// One particle instance.
#[derive(Clone, Debug)]
pub struct Particle {
    species: SpeciesRef,
    momentum: Lorentz5Momentum,
    number: i64,
    ext: Option<Box<ExtendedState>>,
    pub(crate) parents: SmallVec<[ParticleId; 2]>,
    pub(crate) children: SmallVec<[ParticleId; 4]>,
    pub(crate) previous: Option<ParticleId>,
    pub(crate) next: Option<ParticleId>,
    pub(crate) birth_step: Option<StepId>,
}

impl Particle {
    /// A fresh, unrelated particle. Its number stays 0 until it is first
    /// added to a step.
    pub fn new(species: SpeciesRef, momentum: Lorentz5Momentum) -> Self {
        Self {
            species,
            momentum,
            number: 0,
            ext: None,
            parents: SmallVec::new(),
            children: SmallVec::new(),
            previous: None,
            next: None,
            birth_step: None,
        }
    }

    /// Copy of the particle's own data without any relations, number or
    /// birth step. The extended state is copied if present.
    pub fn copy_data(&self) -> Self {
        let mut out = Self::new(Arc::clone(&self.species), self.momentum);
        out.ext = self.ext.clone();
        out
    }

    /// The species.
    pub fn data(&self) -> &ParticleData {
        &self.species
    }

    /// Shared handle to the species.
    pub fn species(&self) -> &SpeciesRef {
        &self.species
    }

    /// Replace the species, e.g. after a flavour change.
    pub fn set_species(&mut self, species: SpeciesRef) {
        self.species = species;
    }

    /// PDG code of the species.
    pub fn id(&self) -> i64 {
        self.species.pdg_id
    }

    /// Species name.
    pub fn pdg_name(&self) -> &str {
        &self.species.name
    }

    /// Whether the species carries electric charge.
    pub fn charged(&self) -> bool {
        self.species.charged()
    }

    /// Whether the species carries colour or anti-colour.
    pub fn coloured(&self) -> bool {
        self.species.coloured()
    }

    /// Momentum.
    pub fn momentum(&self) -> &Lorentz5Momentum {
        &self.momentum
    }

    /// Replace the momentum.
    pub fn set_momentum(&mut self, momentum: Lorentz5Momentum) {
        self.momentum = momentum;
    }

    /// Mass component of the momentum.
    pub fn mass(&self) -> f64 {
        self.momentum.mass
    }

    /// Event-local number, 0 until first added to a step.
    pub fn number(&self) -> i64 {
        self.number
    }

    pub(crate) fn set_number(&mut self, number: i64) {
        self.number = number;
    }

    /// Parents in insertion order.
    pub fn parents(&self) -> &[ParticleId] {
        &self.parents
    }

    /// Children in insertion order.
    pub fn children(&self) -> &[ParticleId] {
        &self.children
    }

    /// Earlier instance of the same physical particle.
    pub fn previous(&self) -> Option<ParticleId> {
        self.previous
    }

    /// Later instance of the same physical particle.
    pub fn next(&self) -> Option<ParticleId> {
        self.next
    }

    /// Step in which the particle was first added.
    pub fn birth_step(&self) -> Option<StepId> {
        self.birth_step
    }

    /// Record the birth step unless one is already set. Returns whether
    /// it was set.
    pub(crate) fn set_birth_step_once(&mut self, step: StepId) -> bool {
        if self.birth_step.is_some() {
            return false;
        }
        self.birth_step = Some(step);
        true
    }

    /// Whether the particle has children.
    pub fn decayed(&self) -> bool {
        !self.children.is_empty()
    }

    /// Whether the particle has neither children nor a later instance.
    pub fn is_final(&self) -> bool {
        self.children.is_empty() && self.next.is_none()
    }

    /// Whether the extended state has been allocated.
    pub fn has_extended(&self) -> bool {
        self.ext.is_some()
    }

    /// The extended state, if allocated.
    pub fn extended(&self) -> Option<&ExtendedState> {
        self.ext.as_deref()
    }

    /// The extended state, allocating it with nominal defaults first if
    /// needed.
    pub fn extended_mut(&mut self, model: &dyn LifetimeModel) -> &mut ExtendedState {
        let species = &self.species;
        let momentum = &self.momentum;
        self.ext.get_or_insert_with(|| {
            trace!(pdg = species.pdg_id, "materializing extended state");
            Box::new(ExtendedState::nominal(species, momentum, model))
        })
    }

    /// Production vertex relative to the collision vertex.
    pub fn vertex(&self) -> LorentzPoint {
        self.ext
            .as_ref()
            .map_or_else(LorentzPoint::origin, |e| e.vertex)
    }

    /// Life-length, computed from `model` when no extended state exists.
    pub fn life_length(&self, model: &dyn LifetimeModel) -> LorentzPoint {
        match &self.ext {
            Some(e) => e.life_length,
            None => LorentzPoint::along(
                &self.momentum,
                model.proper_lifetime(&self.species, self.momentum.mass),
            ),
        }
    }

    /// Decay vertex relative to the collision vertex.
    pub fn decay_vertex(&self, model: &dyn LifetimeModel) -> LorentzPoint {
        self.vertex() + self.life_length(model)
    }

    /// Production scale.
    pub fn scale(&self) -> Option<f64> {
        self.ext.as_ref().and_then(|e| e.scale)
    }

    /// Veto scale.
    pub fn veto_scale(&self) -> Option<f64> {
        self.ext.as_ref().and_then(|e| e.veto_scale)
    }

    /// Spin information.
    pub fn spin(&self) -> Option<&SpinInfo> {
        self.ext.as_ref().and_then(|e| e.spin.as_ref())
    }

    /// Decay mode label.
    pub fn decay_mode(&self) -> Option<&str> {
        self.ext.as_ref().and_then(|e| e.decay_mode.as_deref())
    }

    /// Opaque payloads.
    pub fn extra_info(&self) -> &[ExtraInfo] {
        self.ext.as_ref().map_or(&[], |e| e.extra_info.as_slice())
    }

    /// Copy momentum and extended state from another particle, keeping
    /// species and relations.
    pub fn copy_data_from(&mut self, other: &Particle) {
        self.momentum = other.momentum;
        self.ext = other.ext.clone();
    }

    fn link_count(&self) -> usize {
        self.parents.len()
            + self.children.len()
            + usize::from(self.previous.is_some())
            + usize::from(self.next.is_some())
    }
}

impl Rebind for Particle {
    fn rebind(&mut self, map: &TranslationMap) {
        self.parents = self.parents.translate(map);
        self.children = self.children.translate(map);
        self.previous = self.previous.translate(map);
        self.next = self.next.translate(map);
        self.birth_step = self.birth_step.translate(map);
    }
}

// Relation editing. Both ends of every link are kept in sync.
impl Event {
    /// Make `child` a child of `parent`. Idempotent.
    pub fn add_child(&mut self, parent: ParticleId, child: ParticleId) -> Result<(), RecordError> {
        self.require_particle(parent)?;
        self.require_particle(child)?;
        if let Some(p) = self.particles.get_mut(parent) {
            if !p.children.contains(&child) {
                p.children.push(child);
            }
        }
        if let Some(c) = self.particles.get_mut(child) {
            if !c.parents.contains(&parent) {
                c.parents.push(parent);
            }
        }
        Ok(())
    }

    /// Alias for `add_child(parent, child)`.
    pub fn add_parent(&mut self, child: ParticleId, parent: ParticleId) -> Result<(), RecordError> {
        self.add_child(parent, child)
    }

    /// Remove the parent/child link if present. Returns whether a link
    /// was removed.
    pub fn remove_child(&mut self, parent: ParticleId, child: ParticleId) -> bool {
        let mut removed = false;
        if let Some(p) = self.particles.get_mut(parent) {
            if let Some(pos) = p.children.iter().position(|c| *c == child) {
                p.children.remove(pos);
                removed = true;
            }
        }
        if let Some(c) = self.particles.get_mut(child) {
            if let Some(pos) = c.parents.iter().position(|q| *q == parent) {
                c.parents.remove(pos);
                removed = true;
            }
        }
        removed
    }

    /// Alias for `remove_child(parent, child)`.
    pub fn remove_parent(&mut self, child: ParticleId, parent: ParticleId) -> bool {
        self.remove_child(parent, child)
    }

    /// Link `new` as the later instance of `old`.
    ///
    /// Fails if `old` already has a later instance or `new` already has an
    /// earlier one.
    pub fn set_copy(&mut self, old: ParticleId, new: ParticleId) -> Result<(), RecordError> {
        let old_p = self.particle_ref(old)?;
        if old_p.next.is_some() || old == new {
            return Err(RecordError::AlreadySuperseded { particle: old });
        }
        if self.particle_ref(new)?.previous.is_some() {
            return Err(RecordError::AlreadySuperseded { particle: new });
        }
        if let Some(p) = self.particles.get_mut(old) {
            p.next = Some(new);
        }
        if let Some(p) = self.particles.get_mut(new) {
            p.previous = Some(old);
        }
        Ok(())
    }

    /// Follow `next` links to the latest instance.
    pub fn final_instance(&self, p: ParticleId) -> ParticleId {
        let mut cur = p;
        let mut guard = self.particles.len();
        while let Some(n) = self.particles.get(cur).and_then(|x| x.next) {
            if guard == 0 {
                break;
            }
            guard -= 1;
            cur = n;
        }
        cur
    }

    /// Follow `previous` links to the earliest instance.
    pub fn first_instance(&self, p: ParticleId) -> ParticleId {
        let mut cur = p;
        let mut guard = self.particles.len();
        while let Some(n) = self.particles.get(cur).and_then(|x| x.previous) {
            if guard == 0 {
                break;
            }
            guard -= 1;
            cur = n;
        }
        cur
    }

    /// Copy momentum and extended state from `source` onto `target`.
    pub fn copy_particle_data(
        &mut self,
        target: ParticleId,
        source: ParticleId,
    ) -> Result<(), RecordError> {
        let src = self.particle_ref(source)?.clone();
        self.particle_mut(target)?.copy_data_from(&src);
        Ok(())
    }

    /// Whether `p` has no relations at all.
    pub fn is_isolated(&self, p: ParticleId) -> bool {
        self.particles.get(p).is_none_or(|x| x.link_count() == 0)
    }

    /// Cut every link between `p` and particles outside `keep`.
    pub(crate) fn unlink_outside(
        &mut self,
        p: ParticleId,
        keep: &indexmap::IndexSet<ParticleId>,
    ) -> Vec<ParticleId> {
        let Some(x) = self.particles.get(p) else {
            return Vec::new();
        };
        let parents: Vec<_> = x.parents.iter().copied().filter(|q| !keep.contains(q)).collect();
        let children: Vec<_> = x.children.iter().copied().filter(|q| !keep.contains(q)).collect();
        let previous = x.previous.filter(|q| !keep.contains(q));
        let next = x.next.filter(|q| !keep.contains(q));
        let mut touched = Vec::new();
        for q in parents {
            self.remove_child(q, p);
            touched.push(q);
        }
        for c in children {
            self.remove_child(p, c);
            touched.push(c);
        }
        if let Some(q) = previous {
            if let Some(prev) = self.particles.get_mut(q) {
                prev.next = None;
            }
            if let Some(me) = self.particles.get_mut(p) {
                me.previous = None;
            }
            touched.push(q);
        }
        if let Some(q) = next {
            if let Some(nxt) = self.particles.get_mut(q) {
                nxt.previous = None;
            }
            if let Some(me) = self.particles.get_mut(p) {
                me.next = None;
            }
            touched.push(q);
        }
        touched
    }
}
