//! Collisions: one beam-beam interaction and its generation history.

use indexmap::IndexSet;
use tracing::debug;

use evrec_core::{CollisionId, LorentzPoint, ParticleId, StepId, SubProcessId};

use crate::error::RecordError;
use crate::event::Event;
use crate::rebind::{Rebind, TranslationMap, Translate};
use crate::step::Step;

/// One interaction between two incoming particles.
#[derive(Clone, Debug)]
pub struct Collision {
    pub(crate) incoming: (ParticleId, ParticleId),
    pub(crate) steps: Vec<StepId>,
    pub(crate) sub_processes: Vec<SubProcessId>,
    pub(crate) all_particles: IndexSet<ParticleId>,
    pub(crate) vertex: LorentzPoint,
}

impl Collision {
    pub(crate) fn new(incoming: (ParticleId, ParticleId)) -> Self {
        Self {
            incoming,
            steps: Vec::new(),
            sub_processes: Vec::new(),
            all_particles: IndexSet::new(),
            vertex: LorentzPoint::origin(),
        }
    }

    /// The incoming pair.
    pub fn incoming(&self) -> (ParticleId, ParticleId) {
        self.incoming
    }

    /// Steps in generation order.
    pub fn steps(&self) -> &[StepId] {
        &self.steps
    }

    /// The last step, if any.
    pub fn final_step(&self) -> Option<StepId> {
        self.steps.last().copied()
    }

    /// Sub-processes in insertion order.
    pub fn sub_processes(&self) -> &[SubProcessId] {
        &self.sub_processes
    }

    /// The first sub-process.
    pub fn primary_sub_process(&self) -> Option<SubProcessId> {
        self.sub_processes.first().copied()
    }

    /// Every particle registered with the collision, in insertion order.
    pub fn all_particles(&self) -> &IndexSet<ParticleId> {
        &self.all_particles
    }

    /// Whether the particle is registered with the collision.
    pub fn contains(&self, p: ParticleId) -> bool {
        self.all_particles.contains(&p)
    }

    /// Interaction point in the lab frame.
    pub fn vertex(&self) -> LorentzPoint {
        self.vertex
    }

    fn is_incoming(&self, p: ParticleId) -> bool {
        self.incoming.0 == p || self.incoming.1 == p
    }
}

impl Rebind for Collision {
    fn rebind(&mut self, map: &TranslationMap) {
        self.incoming = (self.incoming.0.translate(map), self.incoming.1.translate(map));
        self.steps = self.steps.translate(map);
        self.sub_processes = self.sub_processes.translate(map);
        self.all_particles = self.all_particles.translate(map);
    }
}

/// Which step containers a subtree removal touches.
#[derive(Clone, Copy, Debug)]
pub(crate) enum RemovalScope {
    Step(StepId),
    Collision(CollisionId),
}

/// Editing cursor for one collision.
pub struct CollisionMut<'a> {
    event: &'a mut Event,
    id: CollisionId,
}

impl Event {
    /// Look up a collision.
    pub fn collision(&self, id: CollisionId) -> Option<&Collision> {
        self.collisions.get(id)
    }

    /// Editing cursor for a collision.
    pub fn collision_mut(&mut self, id: CollisionId) -> Result<CollisionMut<'_>, RecordError> {
        if !self.collisions.contains(id) {
            return Err(RecordError::UnknownCollision { collision: id });
        }
        Ok(CollisionMut { event: self, id })
    }

    pub(crate) fn collision_ref(&self, id: CollisionId) -> Result<&Collision, RecordError> {
        self.collisions
            .get(id)
            .ok_or(RecordError::UnknownCollision { collision: id })
    }

    fn collision_inner(&mut self, id: CollisionId) -> Result<&mut Collision, RecordError> {
        self.collisions
            .get_mut(id)
            .ok_or(RecordError::UnknownCollision { collision: id })
    }

    /// Collision a particle belongs to: that of its birth step, else the
    /// first collision that registered it.
    pub fn collision_of(&self, p: ParticleId) -> Option<CollisionId> {
        let from_step = self
            .particles
            .get(p)?
            .birth_step
            .and_then(|s| self.steps.get(s))
            .and_then(|s| s.collision);
        from_step.or_else(|| {
            self.collision_order
                .iter()
                .copied()
                .find(|c| self.collisions.get(*c).is_some_and(|col| col.contains(p)))
        })
    }

    /// Beam remnants of a collision: children of the incoming pair that
    /// neither enter a sub-process nor lead to one, each as its latest
    /// instance.
    pub fn get_remnants(&self, id: CollisionId) -> Vec<ParticleId> {
        let Some(col) = self.collisions.get(id) else {
            return Vec::new();
        };
        let partons: IndexSet<ParticleId> = col
            .sub_processes
            .iter()
            .filter_map(|sp| self.sub_processes.get(*sp))
            .flat_map(|sp| [sp.incoming.0, sp.incoming.1])
            .flatten()
            .collect();
        let mut out = IndexSet::new();
        for beam in [col.incoming.0, col.incoming.1] {
            let Some(b) = self.particles.get(beam) else {
                continue;
            };
            for c in b.children.iter().copied() {
                if partons.contains(&c) || self.leads_to_any(c, &partons) {
                    continue;
                }
                out.insert(self.final_instance(c));
            }
        }
        out.into_iter().collect()
    }

    /// Whether `p` (or its latest instance) is a remnant of `id`.
    pub fn is_remnant(&self, id: CollisionId, p: ParticleId) -> bool {
        let current = self.final_instance(p);
        self.get_remnants(id).contains(&current)
    }

    fn leads_to_any(&self, from: ParticleId, targets: &IndexSet<ParticleId>) -> bool {
        let mut seen = IndexSet::new();
        let mut stack = vec![from];
        while let Some(x) = stack.pop() {
            if !seen.insert(x) {
                continue;
            }
            if targets.contains(&x) && x != from {
                return true;
            }
            if let Some(px) = self.particles.get(x) {
                stack.extend(px.children.iter().copied());
                stack.extend(px.next);
            }
        }
        false
    }

    /// Register `p` with a collision and the event, numbering it on first
    /// registration.
    pub(crate) fn register(&mut self, cid: CollisionId, p: ParticleId) {
        if let Some(col) = self.collisions.get_mut(cid) {
            col.all_particles.insert(p);
        }
        if self.registered.insert(p) {
            if let Some(x) = self.particles.get_mut(p) {
                if x.number() == 0 {
                    self.last_number += 1;
                    x.set_number(self.last_number);
                }
            }
        }
    }

    /// Remove `root` and everything descending from it.
    pub(crate) fn remove_subtree(
        &mut self,
        root: ParticleId,
        scope: RemovalScope,
    ) -> Result<Vec<ParticleId>, RecordError> {
        self.require_particle(root)?;
        let cid = match scope {
            RemovalScope::Step(s) => self.step_ref(s)?.collision.ok_or(RecordError::NoCollision)?,
            RemovalScope::Collision(c) => c,
        };
        let col = self.collision_ref(cid)?;
        if col.is_incoming(root) {
            return Err(RecordError::ProtectedIncoming { particle: root });
        }
        let beams = col.incoming;
        let scope_steps = match scope {
            RemovalScope::Step(s) => vec![s],
            RemovalScope::Collision(_) => col.steps.clone(),
        };

        let mut subtree = IndexSet::new();
        let mut stack = vec![root];
        while let Some(x) = stack.pop() {
            if x == beams.0 || x == beams.1 || !subtree.insert(x) {
                continue;
            }
            if let Some(px) = self.particles.get(x) {
                stack.extend(px.next);
                stack.extend(px.children.iter().rev().copied());
            }
        }

        for s in &scope_steps {
            if let Some(step) = self.steps.get_mut(*s) {
                for x in &subtree {
                    step.forget(*x);
                }
            }
        }

        let mut touched = IndexSet::new();
        for x in subtree.iter().copied() {
            for q in self.unlink_outside(x, &subtree) {
                touched.insert(q);
            }
        }
        for q in touched {
            if q == beams.0 || q == beams.1 {
                continue;
            }
            if !self.particles.get(q).is_some_and(|x| x.is_final()) {
                continue;
            }
            for s in &scope_steps {
                if let Some(step) = self.steps.get_mut(*s) {
                    if step.all.contains(&q) && !step.particles.contains(&q) {
                        step.intermediates.shift_remove(&q);
                        step.particles.insert(q);
                    }
                }
            }
        }

        let all_steps = self.collision_ref(cid)?.steps.clone();
        let purged: Vec<ParticleId> = subtree
            .iter()
            .copied()
            .filter(|x| {
                !all_steps
                    .iter()
                    .any(|s| self.steps.get(*s).is_some_and(|st| st.all.contains(x)))
            })
            .collect();
        let sub_processes = self.collision_ref(cid)?.sub_processes.clone();
        for x in purged.iter().copied() {
            self.colour.detach_all(x);
            for sp in &sub_processes {
                if let Some(sp) = self.sub_processes.get_mut(*sp) {
                    sp.forget(x);
                }
            }
            if let Some(col) = self.collisions.get_mut(cid) {
                col.all_particles.shift_remove(&x);
            }
            self.registered.shift_remove(&x);
            self.particles.remove(x);
        }
        debug!(%root, removed = purged.len(), detached = subtree.len() - purged.len(), "removed particle subtree");
        Ok(purged)
    }
}

impl CollisionMut<'_> {
    /// Handle of the collision being edited.
    pub fn id(&self) -> CollisionId {
        self.id
    }

    /// Read access to the collision being edited.
    pub fn get(&self) -> Result<&Collision, RecordError> {
        self.event.collision_ref(self.id)
    }

    /// Append a new step.
    ///
    /// The first step of a collision starts with the incoming pair as
    /// intermediates. Later steps start from the previous step's final
    /// state.
    pub fn new_step(&mut self) -> Result<StepId, RecordError> {
        let col = self.get()?;
        let beams = col.incoming;
        let previous = col.final_step();
        let mut step = Step::new();
        step.collision = Some(self.id);
        if let Some(prev) = previous {
            let prev = self.event.step_ref(prev)?;
            step.particles = prev.particles.clone();
            step.all = prev.particles.clone();
        }
        let sid = self.event.steps.insert(step)?;
        self.event.collision_inner(self.id)?.steps.push(sid);
        if previous.is_none() {
            self.event.enter_step(sid, beams.0, true)?;
            self.event.enter_step(sid, beams.1, true)?;
        }
        Ok(sid)
    }

    /// Append a step built elsewhere, registering every particle it
    /// lists.
    pub fn add_step(&mut self, mut step: Step) -> Result<StepId, RecordError> {
        for p in step.all.iter().chain(&step.particles).chain(&step.intermediates) {
            self.event.require_particle(*p)?;
        }
        for sp in &step.sub_processes {
            if !self.event.sub_processes.contains(*sp) {
                return Err(RecordError::UnknownSubProcess { sub_process: *sp });
            }
        }
        step.collision = Some(self.id);
        let members: Vec<ParticleId> = step
            .all
            .iter()
            .chain(&step.particles)
            .chain(&step.intermediates)
            .copied()
            .collect();
        for p in &members {
            step.all.insert(*p);
        }
        let sub_processes = step.sub_processes.clone();
        let sid = self.event.steps.insert(step)?;
        self.event.collision_inner(self.id)?.steps.push(sid);
        for p in members {
            if let Some(x) = self.event.particles.get_mut(p) {
                x.set_birth_step_once(sid);
            }
            self.event.register(self.id, p);
        }
        for sp in sub_processes {
            self.add_sub_process(sp)?;
        }
        Ok(sid)
    }

    /// Remove the last step and every particle born in it. The incoming
    /// pair is never removed. Returns whether a step was removed.
    pub fn pop_step(&mut self) -> Result<bool, RecordError> {
        let col = self.get()?;
        let beams = col.incoming;
        let Some(last) = col.final_step() else {
            return Ok(false);
        };
        let step = self.event.step_ref(last)?;
        let born: Vec<ParticleId> = step
            .all
            .iter()
            .copied()
            .filter(|p| self.event.particles.get(*p).and_then(|x| x.birth_step) == Some(last))
            .collect();
        let sub_processes = step.sub_processes.clone();
        let mut removed = 0;
        for p in born {
            if p == beams.0 || p == beams.1 {
                if let Some(x) = self.event.particles.get_mut(p) {
                    x.birth_step = None;
                }
                continue;
            }
            if !self.event.particles.contains(p) {
                continue;
            }
            removed += self
                .event
                .remove_subtree(p, RemovalScope::Collision(self.id))?
                .len();
        }
        for sp in sub_processes {
            self.event.sub_processes.remove(sp);
            self.event.collision_inner(self.id)?.sub_processes.retain(|x| *x != sp);
        }
        self.event.collision_inner(self.id)?.steps.pop();
        self.event.steps.remove(last);
        debug!(collision = %self.id, step = %last, removed, "popped step");
        Ok(true)
    }

    /// Drop steps that introduced nothing. Returns how many were dropped.
    pub fn clean_steps(&mut self) -> Result<usize, RecordError> {
        let steps = self.get()?.steps.clone();
        let null: Vec<StepId> = steps
            .into_iter()
            .filter(|s| self.event.null_step(*s))
            .collect();
        for s in &null {
            self.event.steps.remove(*s);
        }
        self.event
            .collision_inner(self.id)?
            .steps
            .retain(|s| !null.contains(s));
        if !null.is_empty() {
            debug!(collision = %self.id, dropped = null.len(), "dropped null steps");
        }
        Ok(null.len())
    }

    /// Register a particle with the collision without putting it in a
    /// step.
    pub fn add_particle(&mut self, p: ParticleId) -> Result<(), RecordError> {
        self.event.require_particle(p)?;
        self.event.register(self.id, p);
        Ok(())
    }

    /// Attach a sub-process to the collision.
    pub fn add_sub_process(&mut self, sp: SubProcessId) -> Result<(), RecordError> {
        let s = self
            .event
            .sub_processes
            .get_mut(sp)
            .ok_or(RecordError::UnknownSubProcess { sub_process: sp })?;
        s.collision = Some(self.id);
        let col = self.event.collision_inner(self.id)?;
        if !col.sub_processes.contains(&sp) {
            col.sub_processes.push(sp);
        }
        Ok(())
    }

    /// Remove `p` and its descendants from every step of the collision.
    pub fn remove_particle(&mut self, p: ParticleId) -> Result<Vec<ParticleId>, RecordError> {
        self.event
            .remove_subtree(p, RemovalScope::Collision(self.id))
    }

    /// Remove every descendant of `p`, leaving `p` final again.
    pub fn remove_decay(&mut self, p: ParticleId) -> Result<Vec<ParticleId>, RecordError> {
        let children = self.event.particle_ref(p)?.children.to_vec();
        let mut purged = Vec::new();
        for c in children {
            if self.event.particles.contains(c) {
                purged.extend(
                    self.event
                        .remove_subtree(c, RemovalScope::Collision(self.id))?,
                );
            }
        }
        Ok(purged)
    }

    /// Set the interaction point.
    pub fn set_vertex(&mut self, vertex: LorentzPoint) -> Result<(), RecordError> {
        self.event.collision_inner(self.id)?.vertex = vertex;
        Ok(())
    }
}
