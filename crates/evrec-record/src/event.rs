//! The event: owner of every record object.

use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use evrec_arena::Arena;
use evrec_core::{
    CollisionId, LifetimeModel, Lorentz5Momentum, LorentzPoint, NominalLifetime,
    ParticleId, SpeciesRef, StepId, SubProcessId,
};

use crate::collision::{Collision, RemovalScope};
use crate::colour::ColourTable;
use crate::config::EventConfig;
use crate::error::RecordError;
use crate::particle::{ExtendedState, Particle};
use crate::step::Step;
use crate::sub_process::SubProcess;

/// Shared lifetime model handle.
pub type SharedLifetimeModel = Arc<dyn LifetimeModel + Send + Sync>;

/// A complete generated event.
///
/// The event owns one arena per object kind and hands out typed handles.
/// Particles are created unregistered; they receive an event-local
/// number when first added to a step of one of the event's collisions.
pub struct Event {
    pub(crate) name: String,
    pub(crate) number: i64,
    pub(crate) weight: f64,
    pub(crate) optional_weights: IndexMap<String, f64>,
    pub(crate) scale: Option<f64>,
    pub(crate) alpha_s: Option<f64>,
    pub(crate) alpha_em: Option<f64>,
    pub(crate) particles: Arena<ParticleId, Particle>,
    pub(crate) steps: Arena<StepId, Step>,
    pub(crate) sub_processes: Arena<SubProcessId, SubProcess>,
    pub(crate) collisions: Arena<CollisionId, Collision>,
    pub(crate) collision_order: Vec<CollisionId>,
    pub(crate) colour: ColourTable,
    pub(crate) registered: IndexSet<ParticleId>,
    pub(crate) last_number: i64,
    pub(crate) lifetime: SharedLifetimeModel,
}

impl Event {
    /// An empty event.
    pub fn new(config: EventConfig) -> Result<Self, RecordError> {
        config.validate()?;
        Ok(Self {
            name: config.name,
            number: config.number,
            weight: config.weight,
            optional_weights: IndexMap::new(),
            scale: None,
            alpha_s: None,
            alpha_em: None,
            particles: Arena::with_config(&config.arena)?,
            steps: Arena::with_config(&config.arena)?,
            sub_processes: Arena::with_config(&config.arena)?,
            collisions: Arena::with_config(&config.arena)?,
            collision_order: Vec::new(),
            colour: ColourTable::with_config(&config.arena)?,
            registered: IndexSet::new(),
            last_number: 0,
            lifetime: Arc::new(NominalLifetime),
        })
    }

    /// Metadata, lifetime model and colour-index counter of `self` with
    /// no record objects.
    pub(crate) fn metadata_only(&self) -> Event {
        Event {
            name: self.name.clone(),
            number: self.number,
            weight: self.weight,
            optional_weights: self.optional_weights.clone(),
            scale: self.scale,
            alpha_s: self.alpha_s,
            alpha_em: self.alpha_em,
            colour: self.colour.vacant_successor(),
            lifetime: Arc::clone(&self.lifetime),
            ..Event::default()
        }
    }

    // --- metadata ---

    /// Event name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the event name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Event number.
    pub fn number(&self) -> i64 {
        self.number
    }

    /// Set the event number.
    pub fn set_number(&mut self, number: i64) {
        self.number = number;
    }

    /// Nominal weight.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Set the nominal weight.
    pub fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }

    /// Named alternative weights in insertion order.
    pub fn optional_weights(&self) -> &IndexMap<String, f64> {
        &self.optional_weights
    }

    /// Set (or replace) a named alternative weight.
    pub fn set_optional_weight(&mut self, name: impl Into<String>, weight: f64) {
        self.optional_weights.insert(name.into(), weight);
    }

    /// A named alternative weight.
    pub fn optional_weight(&self, name: &str) -> Option<f64> {
        self.optional_weights.get(name).copied()
    }

    /// Event scale.
    pub fn scale(&self) -> Option<f64> {
        self.scale
    }

    /// Set the event scale.
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = Some(scale);
    }

    /// Strong coupling used for the event.
    pub fn alpha_s(&self) -> Option<f64> {
        self.alpha_s
    }

    /// Set the strong coupling.
    pub fn set_alpha_s(&mut self, alpha_s: f64) {
        self.alpha_s = Some(alpha_s);
    }

    /// Electromagnetic coupling used for the event.
    pub fn alpha_em(&self) -> Option<f64> {
        self.alpha_em
    }

    /// Set the electromagnetic coupling.
    pub fn set_alpha_em(&mut self, alpha_em: f64) {
        self.alpha_em = Some(alpha_em);
    }

    /// Lifetime model used to materialize extended particle state.
    pub fn lifetime_model(&self) -> &SharedLifetimeModel {
        &self.lifetime
    }

    /// Replace the lifetime model.
    pub fn set_lifetime_model(&mut self, model: SharedLifetimeModel) {
        self.lifetime = model;
    }

    // --- particles ---

    /// Create an unregistered particle. Its number stays 0 until it is
    /// added to a step.
    pub fn create_particle(
        &mut self,
        species: SpeciesRef,
        momentum: Lorentz5Momentum,
    ) -> Result<ParticleId, RecordError> {
        Ok(self.particles.insert(Particle::new(species, momentum))?)
    }

    /// Look up a particle.
    pub fn particle(&self, id: ParticleId) -> Option<&Particle> {
        self.particles.get(id)
    }

    /// Mutable access to a particle's own data.
    ///
    /// Relations cannot be edited through this reference.
    pub fn particle_mut(&mut self, id: ParticleId) -> Result<&mut Particle, RecordError> {
        self.particles
            .get_mut(id)
            .ok_or(RecordError::UnknownParticle { particle: id })
    }

    pub(crate) fn particle_ref(&self, id: ParticleId) -> Result<&Particle, RecordError> {
        self.particles
            .get(id)
            .ok_or(RecordError::UnknownParticle { particle: id })
    }

    pub(crate) fn require_particle(&self, id: ParticleId) -> Result<(), RecordError> {
        self.particle_ref(id).map(|_| ())
    }

    /// A particle's extended state, allocated with nominal defaults from
    /// the event's lifetime model on first access.
    pub fn extended_mut(&mut self, id: ParticleId) -> Result<&mut ExtendedState, RecordError> {
        let model = Arc::clone(&self.lifetime);
        Ok(self.particle_mut(id)?.extended_mut(model.as_ref()))
    }

    /// Every live particle handle, in slot order, registered or not.
    pub fn particle_ids(&self) -> impl Iterator<Item = ParticleId> + '_ {
        self.particles.keys()
    }

    /// Particles registered with the event, in numbering order.
    pub fn registered_particles(&self) -> &IndexSet<ParticleId> {
        &self.registered
    }

    /// Number of live particles, registered or not.
    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// Production vertex in the lab frame.
    pub fn lab_vertex(&self, id: ParticleId) -> Option<LorentzPoint> {
        let p = self.particles.get(id)?;
        let origin = self
            .collision_of(id)
            .and_then(|c| self.collisions.get(c))
            .map_or_else(LorentzPoint::origin, |c| c.vertex);
        Some(origin + p.vertex())
    }

    /// Decay vertex in the lab frame.
    pub fn lab_decay_vertex(&self, id: ParticleId) -> Option<LorentzPoint> {
        let p = self.particles.get(id)?;
        Some(self.lab_vertex(id)? + p.life_length(self.lifetime.as_ref()))
    }

    /// Remove a particle and its descendants from every step of its
    /// collision. An unregistered particle is simply deleted.
    pub fn remove_particle(&mut self, id: ParticleId) -> Result<Vec<ParticleId>, RecordError> {
        self.require_particle(id)?;
        match self.collision_of(id) {
            Some(cid) => self.remove_subtree(id, RemovalScope::Collision(cid)),
            None => {
                let keep = IndexSet::new();
                self.unlink_outside(id, &keep);
                self.colour.detach_all(id);
                for (_, sp) in self.sub_processes.iter_mut() {
                    sp.forget(id);
                }
                self.particles.remove(id);
                debug!(particle = %id, "removed unregistered particle");
                Ok(vec![id])
            }
        }
    }

    /// Remove every descendant of a particle.
    pub fn remove_decay(&mut self, id: ParticleId) -> Result<Vec<ParticleId>, RecordError> {
        let cid = self
            .collision_of(id)
            .ok_or(RecordError::NoCollision)?;
        self.collision_mut(cid)?.remove_decay(id)
    }

    // --- collisions ---

    /// Start a new collision between two particles.
    ///
    /// The first collision created is the primary one.
    pub fn new_collision(
        &mut self,
        a: ParticleId,
        b: ParticleId,
    ) -> Result<CollisionId, RecordError> {
        self.require_particle(a)?;
        self.require_particle(b)?;
        if a == b {
            return Err(RecordError::MissingIncoming);
        }
        let cid = self.collisions.insert(Collision::new((a, b)))?;
        self.collision_order.push(cid);
        Ok(cid)
    }

    /// Collisions in creation order.
    pub fn collisions(&self) -> &[CollisionId] {
        &self.collision_order
    }

    /// The first collision.
    pub fn primary_collision(&self) -> Option<CollisionId> {
        self.collision_order.first().copied()
    }

    /// The primary collision's first sub-process.
    pub fn primary_sub_process(&self) -> Option<SubProcessId> {
        self.primary_collision()
            .and_then(|c| self.collisions.get(c))
            .and_then(Collision::primary_sub_process)
    }

    /// Incoming pair of the primary collision.
    pub fn incoming(&self) -> Option<(ParticleId, ParticleId)> {
        self.primary_collision()
            .and_then(|c| self.collisions.get(c))
            .map(Collision::incoming)
    }

    /// Number of live steps across all collisions.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Number of live sub-processes.
    pub fn sub_process_count(&self) -> usize {
        self.sub_processes.len()
    }
}

impl Default for Event {
    fn default() -> Self {
        Self {
            name: String::new(),
            number: 0,
            weight: 1.0,
            optional_weights: IndexMap::new(),
            scale: None,
            alpha_s: None,
            alpha_em: None,
            particles: Arena::new(),
            steps: Arena::new(),
            sub_processes: Arena::new(),
            collisions: Arena::new(),
            collision_order: Vec::new(),
            colour: ColourTable::default(),
            registered: IndexSet::new(),
            last_number: 0,
            lifetime: Arc::new(NominalLifetime),
        }
    }
}

impl std::fmt::Debug for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Event")
            .field("name", &self.name)
            .field("number", &self.number)
            .field("weight", &self.weight)
            .field("particles", &self.particles.len())
            .field("steps", &self.steps.len())
            .field("sub_processes", &self.sub_processes.len())
            .field("collisions", &self.collision_order.len())
            .field("colour_lines", &self.colour.len())
            .finish()
    }
}
