//! Generation steps.
//!
//! A [`Step`] is a snapshot of one stage of event generation: the
//! particles that are final after it, the intermediates it produced and
//! decayed, and the sub-processes it ran. All edits go through
//! [`StepMut`], which keeps the collision and event registries, particle
//! birth steps and colour lines consistent.

use indexmap::IndexSet;
use tracing::{debug, trace};

use evrec_core::{CollisionId, ParticleId, StepId, SubProcessId};

use crate::collision::RemovalScope;
use crate::error::RecordError;
use crate::event::Event;
use crate::rebind::{Rebind, TranslationMap, Translate};

/// One stage of event generation.
#[derive(Clone, Debug, Default)]
pub struct Step {
    pub(crate) collision: Option<CollisionId>,
    pub(crate) particles: IndexSet<ParticleId>,
    pub(crate) intermediates: IndexSet<ParticleId>,
    pub(crate) all: IndexSet<ParticleId>,
    pub(crate) sub_processes: Vec<SubProcessId>,
}

impl Step {
    /// An empty step belonging to no collision yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Collision the step belongs to.
    pub fn collision(&self) -> Option<CollisionId> {
        self.collision
    }

    /// Particles that are final after this step.
    pub fn final_state(&self) -> &IndexSet<ParticleId> {
        &self.particles
    }

    /// Particles produced and decayed within this step.
    pub fn intermediates(&self) -> &IndexSet<ParticleId> {
        &self.intermediates
    }

    /// Every particle the step has seen, in insertion order.
    pub fn all_particles(&self) -> &IndexSet<ParticleId> {
        &self.all
    }

    /// Sub-processes run in this step.
    pub fn sub_processes(&self) -> &[SubProcessId] {
        &self.sub_processes
    }

    /// Whether the step lists `p` in any role.
    pub fn contains(&self, p: ParticleId) -> bool {
        self.all.contains(&p)
    }

    pub(crate) fn forget(&mut self, p: ParticleId) -> bool {
        let a = self.particles.shift_remove(&p);
        let b = self.intermediates.shift_remove(&p);
        let c = self.all.shift_remove(&p);
        a || b || c
    }
}

impl Rebind for Step {
    fn rebind(&mut self, map: &TranslationMap) {
        self.collision = self.collision.translate(map);
        self.particles = self.particles.translate(map);
        self.intermediates = self.intermediates.translate(map);
        self.all = self.all.translate(map);
        self.sub_processes = self.sub_processes.translate(map);
    }
}

/// Editing cursor for one step.
pub struct StepMut<'a> {
    event: &'a mut Event,
    id: StepId,
}

impl Event {
    /// Look up a step.
    pub fn step(&self, id: StepId) -> Option<&Step> {
        self.steps.get(id)
    }

    /// Editing cursor for a step.
    pub fn step_mut(&mut self, id: StepId) -> Result<StepMut<'_>, RecordError> {
        if !self.steps.contains(id) {
            return Err(RecordError::UnknownStep { step: id });
        }
        Ok(StepMut { event: self, id })
    }

    /// Whether the step introduced nothing: no sub-process and no
    /// particle born in it.
    pub fn null_step(&self, id: StepId) -> bool {
        let Some(step) = self.steps.get(id) else {
            return true;
        };
        step.sub_processes.is_empty()
            && !step
                .all
                .iter()
                .any(|p| self.particles.get(*p).and_then(|x| x.birth_step) == Some(id))
    }

    /// Whether `id` is the last step of its collision.
    pub fn is_final_step(&self, id: StepId) -> bool {
        self.steps
            .get(id)
            .and_then(|s| s.collision)
            .and_then(|c| self.collisions.get(c))
            .and_then(|c| c.steps.last())
            == Some(&id)
    }

    pub(crate) fn step_ref(&self, id: StepId) -> Result<&Step, RecordError> {
        self.steps.get(id).ok_or(RecordError::UnknownStep { step: id })
    }

    fn step_inner(&mut self, id: StepId) -> Result<&mut Step, RecordError> {
        self.steps
            .get_mut(id)
            .ok_or(RecordError::UnknownStep { step: id })
    }

    /// Final-state membership plus bookkeeping shared by every way a
    /// particle enters a step.
    pub(crate) fn enter_step(
        &mut self,
        id: StepId,
        p: ParticleId,
        intermediate: bool,
    ) -> Result<(), RecordError> {
        self.require_particle(p)?;
        let step = self.step_inner(id)?;
        let collision = step.collision;
        step.all.insert(p);
        if intermediate {
            step.particles.shift_remove(&p);
            step.intermediates.insert(p);
        } else {
            step.intermediates.shift_remove(&p);
            step.particles.insert(p);
        }
        if let Some(x) = self.particles.get_mut(p) {
            x.set_birth_step_once(id);
        }
        if let Some(cid) = collision {
            self.register(cid, p);
        }
        Ok(())
    }
}

impl StepMut<'_> {
    /// Handle of the step being edited.
    pub fn id(&self) -> StepId {
        self.id
    }

    /// Read access to the step being edited.
    pub fn get(&self) -> Result<&Step, RecordError> {
        self.event.step_ref(self.id)
    }

    /// Read access to the whole event.
    pub fn event(&self) -> &Event {
        self.event
    }

    /// Add a final-state particle. Sets its birth step on first entry.
    pub fn add_particle(&mut self, p: ParticleId) -> Result<(), RecordError> {
        self.event.enter_step(self.id, p, false)
    }

    /// Add several final-state particles.
    pub fn add_particles(
        &mut self,
        ps: impl IntoIterator<Item = ParticleId>,
    ) -> Result<(), RecordError> {
        for p in ps {
            self.add_particle(p)?;
        }
        Ok(())
    }

    /// Add an intermediate, moving it out of the final state if it is
    /// already there.
    pub fn add_intermediate(&mut self, p: ParticleId) -> Result<(), RecordError> {
        self.event.enter_step(self.id, p, true)
    }

    /// Add several intermediates.
    pub fn add_intermediates(
        &mut self,
        ps: impl IntoIterator<Item = ParticleId>,
    ) -> Result<(), RecordError> {
        for p in ps {
            self.add_intermediate(p)?;
        }
        Ok(())
    }

    /// Add a sub-process and all its particles.
    ///
    /// Incoming partons not yet known to the collision are attached as
    /// children of the collision's incoming pair (first to first, second
    /// to second). Incoming partons and intermediates become intermediates
    /// of this step; outgoing particles become final state.
    pub fn add_sub_process(&mut self, sp: SubProcessId) -> Result<(), RecordError> {
        let Some(cid) = self.get()?.collision else {
            return Err(RecordError::NoCollision);
        };
        let (incoming, intermediates, outgoing) = {
            let s = self
                .event
                .sub_processes
                .get(sp)
                .ok_or(RecordError::UnknownSubProcess { sub_process: sp })?;
            (s.incoming, s.intermediates.clone(), s.outgoing.clone())
        };
        let beams = self.event.collision_ref(cid)?.incoming;
        for (parton, beam) in [(incoming.0, beams.0), (incoming.1, beams.1)] {
            let Some(parton) = parton else { continue };
            let known = self
                .event
                .collisions
                .get(cid)
                .is_some_and(|c| c.all_particles.contains(&parton));
            if !known && parton != beam {
                self.event.add_child(beam, parton)?;
            }
        }
        let step = self.event.step_inner(self.id)?;
        if !step.sub_processes.contains(&sp) {
            step.sub_processes.push(sp);
        }
        for p in [incoming.0, incoming.1].into_iter().flatten() {
            self.add_intermediate(p)?;
        }
        self.add_intermediates(intermediates)?;
        self.add_particles(outgoing)?;
        self.event.collision_mut(cid)?.add_sub_process(sp)?;
        Ok(())
    }

    /// Make a later instance of `p` in this step.
    ///
    /// Only possible in the last step of a collision, for a final-state
    /// particle with no later instance and no children. The copy inherits
    /// `p`'s colour lines and replaces it in the final state; `p` becomes
    /// an intermediate if it was born here. Returns `None` if the copy is
    /// not possible.
    pub fn copy_particle(&mut self, p: ParticleId) -> Option<ParticleId> {
        let eligible = self.event.is_final_step(self.id)
            && self
                .event
                .steps
                .get(self.id)
                .is_some_and(|s| s.particles.contains(&p))
            && self.event.particles.get(p).is_some_and(|x| x.is_final());
        if !eligible {
            debug!(step = %self.id, particle = %p, "copy_particle declined");
            return None;
        }
        let data = self.event.particles.get(p)?.copy_data();
        let copy = match self.event.particles.insert(data) {
            Ok(copy) => copy,
            Err(e) => {
                debug!(step = %self.id, particle = %p, error = %e, "copy_particle allocation failed");
                return None;
            }
        };
        self.event.particles.get_mut(p)?.next = Some(copy);
        self.event.particles.get_mut(copy)?.previous = Some(p);
        for anti in [false, true] {
            if let Some(line) = self.event.colour.line_of(p, anti) {
                self.event.colour.attach(copy, line, anti).ok()?;
            }
        }
        let born_here = self.event.particles.get(p)?.birth_step == Some(self.id);
        let step = self.event.steps.get_mut(self.id)?;
        step.particles.shift_remove(&p);
        if born_here {
            step.intermediates.insert(p);
        }
        self.add_particle(copy).ok()?;
        Some(copy)
    }

    /// Record `child` as a decay product of `parent` in this step.
    pub fn add_decay_product(
        &mut self,
        parent: ParticleId,
        child: ParticleId,
        fix_colour: bool,
    ) -> Result<(), RecordError> {
        self.add_decay_products(parent, &[child], fix_colour)
    }

    /// Record several decay products of `parent` in this step.
    ///
    /// The step must be the last of its collision, and `parent` must be
    /// in it (or already have children in it). The parent leaves the
    /// final state. With `fix_colour`, the parent's colour and
    /// anti-colour pass to the products and open sides get new lines.
    pub fn add_decay_products(
        &mut self,
        parent: ParticleId,
        children: &[ParticleId],
        fix_colour: bool,
    ) -> Result<(), RecordError> {
        if !self.event.is_final_step(self.id) {
            return Err(RecordError::NotFinalStep { step: self.id });
        }
        for c in children {
            self.event.require_particle(*c)?;
        }
        let step = self.get()?;
        let x = self.event.particle_ref(parent)?;
        if x.next.is_some() {
            return Err(RecordError::AlreadySuperseded { particle: parent });
        }
        let present = step.all.contains(&parent) || x.children.iter().any(|c| step.all.contains(c));
        if !present {
            return Err(RecordError::ParentNotFound {
                parent,
                step: self.id,
            });
        }
        for c in children.iter().copied() {
            self.event.add_child(parent, c)?;
        }
        let born_here = self.event.particle_ref(parent)?.birth_step == Some(self.id);
        let step = self.event.step_inner(self.id)?;
        if step.particles.shift_remove(&parent) && born_here {
            step.intermediates.insert(parent);
        }
        if fix_colour {
            self.event.assign_decay_colour(parent, children)?;
        }
        self.add_particles(children.iter().copied())
    }

    /// Remove `p` and everything descending from it (children and later
    /// instances) from this step. Ancestors left without children become
    /// final state again. Particles no longer in any step are deleted
    /// from the event. Returns the deleted particles.
    pub fn remove_particle(&mut self, p: ParticleId) -> Result<Vec<ParticleId>, RecordError> {
        if !self.get()?.all.contains(&p) {
            return Err(RecordError::NotInStep {
                particle: p,
                step: self.id,
            });
        }
        self.event
            .remove_subtree(p, RemovalScope::Step(self.id))
    }

    /// Repair dangling colour connections among particles born in this
    /// step.
    ///
    /// A side whose line has no partner among the final state (or the
    /// incoming particles) is traced back through its ancestors. The
    /// first ancestor with a colour neighbour supplies the partner: its
    /// current instance is copied into this step if needed and its
    /// opposite side is moved onto the dangling line. Running the repair
    /// twice changes nothing the second time. Returns the number of
    /// connections made.
    pub fn fix_colour_flow(&mut self) -> Result<usize, RecordError> {
        let id = self.id;
        let mut worklist: Vec<ParticleId> = {
            let step = self.get()?;
            step.particles
                .iter()
                .copied()
                .filter(|p| self.event.particles.get(*p).and_then(|x| x.birth_step) == Some(id))
                .collect()
        };
        let mut repaired = 0;
        let mut i = 0;
        while i < worklist.len() {
            let p = worklist[i];
            i += 1;
            if !self.get()?.particles.contains(&p) {
                continue;
            }
            for anti in [false, true] {
                let Some(line) = self.event.colour.line_of(p, anti) else {
                    continue;
                };
                if self.final_neighbour(p, anti)?.is_some() {
                    continue;
                }
                let Some(target) = self.find_repair_partner(p, anti)? else {
                    continue;
                };
                trace!(step = %id, particle = %p, partner = %target, %line, anti, "reconnecting colour");
                self.event.colour.attach(target, line, !anti)?;
                repaired += 1;
                if !worklist.contains(&target) {
                    worklist.push(target);
                }
            }
        }
        if repaired > 0 {
            debug!(step = %id, repaired, "colour flow repaired");
        }
        Ok(repaired)
    }

    /// Colour partner of `p` among this step's final state and incoming
    /// particles.
    fn final_neighbour(&self, p: ParticleId, anti: bool) -> Result<Option<ParticleId>, RecordError> {
        let step = self.get()?;
        let candidates = step
            .all
            .iter()
            .copied()
            .filter(|c| step.particles.contains(c) || self.event.is_incoming_role(*c));
        Ok(self.event.colour_neighbour_among(p, anti, candidates))
    }

    fn find_repair_partner(
        &mut self,
        p: ParticleId,
        anti: bool,
    ) -> Result<Option<ParticleId>, RecordError> {
        let mut ancestor = p;
        let mut guard = self.event.particles.len();
        while let Some(a) = self.event.incoming_colour(ancestor, anti) {
            if guard == 0 {
                break;
            }
            guard -= 1;
            ancestor = a;
            let Some(n) = self.event.colour_neighbour(a, anti) else {
                continue;
            };
            let current = self.event.final_instance(n);
            let in_final = self.get()?.particles.contains(&current);
            if !in_final {
                continue;
            }
            // Leave partners that are already connected on the side we
            // would take over.
            if self.event.colour.line_of(current, !anti).is_some()
                && self.final_neighbour(current, !anti)?.is_some()
            {
                return Ok(None);
            }
            let born_here =
                self.event.particles.get(current).and_then(|x| x.birth_step) == Some(self.id);
            if born_here {
                return Ok(Some(current));
            }
            return Ok(self.copy_particle(current));
        }
        Ok(None)
    }
}
