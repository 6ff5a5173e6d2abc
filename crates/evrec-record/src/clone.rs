//! Deep copies of events and collisions.
//!
//! Both operations copy the reachable objects first, recording each
//! original-to-copy handle pair, and then rebind every copy through the
//! finished [`TranslationMap`].
//!
//! A whole-event copy places each object in the same slot one generation
//! ahead, so no handle of the original ever resolves in the copy. Handles
//! that point outside the copied set (for example to a particle that was
//! created but never added to a step) are left untranslated and resolve
//! to nothing in the copy. Colour lines are the exception: a copied line
//! only lists copied particles.

use indexmap::IndexSet;
use tracing::debug;

use evrec_arena::Arena;
use evrec_core::{ArenaKey, CollisionId, ColourLineId, ParticleId, StepId, SubProcessId};

use crate::error::RecordError;
use crate::event::Event;
use crate::rebind::{Rebind, TranslationMap, Translate};

/// Objects reachable from a set of collisions.
#[derive(Default)]
struct Reachable {
    collisions: Vec<CollisionId>,
    steps: IndexSet<StepId>,
    sub_processes: IndexSet<SubProcessId>,
    particles: IndexSet<ParticleId>,
    colour_lines: IndexSet<ColourLineId>,
}

impl Event {
    fn reachable(&self, collisions: &[CollisionId]) -> Reachable {
        let mut r = Reachable {
            collisions: collisions.to_vec(),
            ..Reachable::default()
        };
        for c in collisions {
            let Some(col) = self.collisions.get(*c) else {
                continue;
            };
            r.particles.insert(col.incoming.0);
            r.particles.insert(col.incoming.1);
            r.particles.extend(col.all_particles.iter().copied());
            for s in &col.steps {
                r.steps.insert(*s);
                if let Some(step) = self.steps.get(*s) {
                    r.particles.extend(step.all.iter().copied());
                    r.sub_processes.extend(step.sub_processes.iter().copied());
                }
            }
            r.sub_processes.extend(col.sub_processes.iter().copied());
        }
        r.particles.retain(|p| self.particles.contains(*p));
        for p in &r.particles {
            for anti in [false, true] {
                if let Some(line) = self.colour.line_of(*p, anti) {
                    r.colour_lines.insert(line);
                }
            }
        }
        r
    }

    /// Deep copy of the event plus the handle translation used.
    ///
    /// The copy shares no mutable state with `self`: editing one never
    /// shows up in the other. Metadata, numbering, colour-line indices
    /// (and the counter that hands them out) and the lifetime model carry
    /// over.
    pub fn clone_with_map(&self) -> Result<(Event, TranslationMap), RecordError> {
        let reach = self.reachable(&self.collision_order);
        let mut map = TranslationMap::new();
        let mut out = Event {
            particles: self.particles.vacant_successor(),
            steps: self.steps.vacant_successor(),
            sub_processes: self.sub_processes.vacant_successor(),
            collisions: self.collisions.vacant_successor(),
            collision_order: Vec::new(),
            registered: IndexSet::new(),
            last_number: self.last_number,
            lifetime: std::sync::Arc::clone(&self.lifetime),
            ..self.metadata_only()
        };

        for c in &reach.collisions {
            if let Some(col) = self.collisions.get(*c) {
                let to = successor::<CollisionId>(*c);
                out.collisions.insert_at(to, col.clone())?;
                map.insert_collision(*c, to);
            }
        }
        for s in &reach.steps {
            if let Some(step) = self.steps.get(*s) {
                let to = successor::<StepId>(*s);
                out.steps.insert_at(to, step.clone())?;
                map.insert_step(*s, to);
            }
        }
        for sp in &reach.sub_processes {
            if let Some(x) = self.sub_processes.get(*sp) {
                let to = successor::<SubProcessId>(*sp);
                out.sub_processes.insert_at(to, x.clone())?;
                map.insert_sub_process(*sp, to);
            }
        }
        for p in &reach.particles {
            if let Some(x) = self.particles.get(*p) {
                let to = successor::<ParticleId>(*p);
                out.particles.insert_at(to, x.clone())?;
                map.insert_particle(*p, to);
            }
        }
        for l in &reach.colour_lines {
            if let Some(line) = self.colour.line(*l) {
                let to = successor::<ColourLineId>(*l);
                out.colour.lines.insert_at(to, line.clone())?;
                out.colour.inherit_index(&self.colour, *l, to);
                map.insert_colour_line(*l, to);
            }
        }

        out.rebind_all(&map);
        out.collision_order = self.collision_order.translate(&map);
        out.registered = self.registered.translate(&map);
        let copies: IndexSet<ParticleId> = map.particles().map(|(_, to)| to).collect();
        for line in reach.colour_lines.translate(&map) {
            out.colour.adopt_line(line, |p| copies.contains(&p));
        }
        debug!(
            particles = reach.particles.len(),
            steps = reach.steps.len(),
            collisions = reach.collisions.len(),
            "cloned event"
        );
        Ok((out, map))
    }

    /// Copy one collision, with everything reachable from it, into this
    /// event as a new collision. The copies are numbered after the
    /// existing particles.
    pub fn clone_collision(
        &mut self,
        collision: CollisionId,
    ) -> Result<(CollisionId, TranslationMap), RecordError> {
        let col = self.collision_ref(collision)?.clone();
        let reach = self.reachable(&[collision]);
        let mut map = TranslationMap::new();

        let new_collision = self.collisions.insert(col)?;
        map.insert_collision(collision, new_collision);
        let mut new_steps = Vec::new();
        for s in &reach.steps {
            if let Some(step) = self.steps.get(*s).cloned() {
                let to = self.steps.insert(step)?;
                map.insert_step(*s, to);
                new_steps.push(to);
            }
        }
        let mut new_sub_processes = Vec::new();
        for sp in &reach.sub_processes {
            if let Some(x) = self.sub_processes.get(*sp).cloned() {
                let to = self.sub_processes.insert(x)?;
                map.insert_sub_process(*sp, to);
                new_sub_processes.push(to);
            }
        }
        let mut new_particles = Vec::new();
        for p in &reach.particles {
            if let Some(mut x) = self.particles.get(*p).cloned() {
                x.set_number(0);
                let to = self.particles.insert(x)?;
                map.insert_particle(*p, to);
                new_particles.push(to);
            }
        }
        let mut new_lines = Vec::new();
        for l in &reach.colour_lines {
            if let Some(line) = self.colour.line(*l).cloned() {
                let to = self.colour.lines.insert(line)?;
                map.insert_colour_line(*l, to);
                new_lines.push(to);
            }
        }

        if let Some(c) = self.collisions.get_mut(new_collision) {
            c.rebind(&map);
        }
        for s in &new_steps {
            if let Some(x) = self.steps.get_mut(*s) {
                x.rebind(&map);
            }
        }
        for sp in &new_sub_processes {
            if let Some(x) = self.sub_processes.get_mut(*sp) {
                x.rebind(&map);
            }
        }
        for p in &new_particles {
            if let Some(x) = self.particles.get_mut(*p) {
                x.rebind(&map);
            }
        }
        for l in &new_lines {
            if let Some(x) = self.colour.lines.get_mut(*l) {
                x.rebind(&map);
            }
        }
        let copies: IndexSet<ParticleId> = new_particles.iter().copied().collect();
        for l in new_lines {
            self.colour.adopt_line(l, |p| copies.contains(&p));
        }

        self.collision_order.push(new_collision);
        let order: Vec<ParticleId> = self
            .collision_ref(new_collision)?
            .all_particles
            .iter()
            .copied()
            .collect();
        for p in order {
            self.register(new_collision, p);
        }
        debug!(
            from = %collision,
            to = %new_collision,
            particles = new_particles.len(),
            "cloned collision"
        );
        Ok((new_collision, map))
    }

    fn rebind_all(&mut self, map: &TranslationMap) {
        for (_, x) in self.collisions.iter_mut() {
            x.rebind(map);
        }
        for (_, x) in self.steps.iter_mut() {
            x.rebind(map);
        }
        for (_, x) in self.sub_processes.iter_mut() {
            x.rebind(map);
        }
        for (_, x) in self.particles.iter_mut() {
            x.rebind(map);
        }
        for (_, x) in self.colour.lines.iter_mut() {
            x.rebind(map);
        }
    }
}

fn successor<K: ArenaKey>(key: K) -> K {
    Arena::<K, ()>::successor_key(key)
}

impl Clone for Event {
    /// Deep copy. Allocation failure cannot occur here because the copy
    /// reuses the original's slot layout; should it happen anyway the
    /// result is an empty event with the same metadata.
    fn clone(&self) -> Self {
        match self.clone_with_map() {
            Ok((event, _)) => event,
            Err(e) => {
                tracing::warn!(error = %e, "event clone failed");
                self.metadata_only()
            }
        }
    }
}
