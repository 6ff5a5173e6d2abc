//! Hard sub-processes.

use tracing::debug;

use evrec_core::{CollisionId, ParticleId, SubProcessId};

use crate::error::RecordError;
use crate::event::Event;
use crate::rebind::{Rebind, TranslationMap, Translate};

/// A hard interaction inside a collision: two incoming partons, any
/// number of intermediates and outgoing products.
#[derive(Clone, Debug)]
pub struct SubProcess {
    pub(crate) collision: Option<CollisionId>,
    pub(crate) incoming: (Option<ParticleId>, Option<ParticleId>),
    pub(crate) intermediates: Vec<ParticleId>,
    pub(crate) outgoing: Vec<ParticleId>,
    label: String,
    group_weight: f64,
    decayed: bool,
}

impl SubProcess {
    /// Collision the sub-process has been added to.
    pub fn collision(&self) -> Option<CollisionId> {
        self.collision
    }

    /// Incoming partons. A slot is `None` once that particle was removed.
    pub fn incoming(&self) -> (Option<ParticleId>, Option<ParticleId>) {
        self.incoming
    }

    /// Intermediates in insertion order.
    pub fn intermediates(&self) -> &[ParticleId] {
        &self.intermediates
    }

    /// Outgoing products in insertion order.
    pub fn outgoing(&self) -> &[ParticleId] {
        &self.outgoing
    }

    /// Label of the matrix element or handler that produced it.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Relative weight within its sub-process group.
    pub fn group_weight(&self) -> f64 {
        self.group_weight
    }

    /// Whether the outgoing products have been decayed.
    pub fn decayed(&self) -> bool {
        self.decayed
    }

    fn contains(&self, p: ParticleId) -> bool {
        self.incoming.0 == Some(p)
            || self.incoming.1 == Some(p)
            || self.intermediates.contains(&p)
            || self.outgoing.contains(&p)
    }

    /// Drop every reference to `p`. Returns whether one was held.
    pub(crate) fn forget(&mut self, p: ParticleId) -> bool {
        let held = self.contains(p);
        if self.incoming.0 == Some(p) {
            self.incoming.0 = None;
        }
        if self.incoming.1 == Some(p) {
            self.incoming.1 = None;
        }
        self.intermediates.retain(|x| *x != p);
        self.outgoing.retain(|x| *x != p);
        held
    }
}

impl Rebind for SubProcess {
    fn rebind(&mut self, map: &TranslationMap) {
        self.collision = self.collision.translate(map);
        self.incoming = (self.incoming.0.translate(map), self.incoming.1.translate(map));
        self.intermediates = self.intermediates.translate(map);
        self.outgoing = self.outgoing.translate(map);
    }
}

/// Editing cursor for one sub-process.
pub struct SubProcessMut<'a> {
    event: &'a mut Event,
    id: SubProcessId,
}

impl Event {
    /// Create a sub-process with the given incoming pair.
    ///
    /// It is not part of any step or collision until added with
    /// [`StepMut::add_sub_process`](crate::StepMut::add_sub_process).
    pub fn new_sub_process(
        &mut self,
        incoming: (ParticleId, ParticleId),
        label: impl Into<String>,
    ) -> Result<SubProcessId, RecordError> {
        self.require_particle(incoming.0)?;
        self.require_particle(incoming.1)?;
        let sp = SubProcess {
            collision: None,
            incoming: (Some(incoming.0), Some(incoming.1)),
            intermediates: Vec::new(),
            outgoing: Vec::new(),
            label: label.into(),
            group_weight: 1.0,
            decayed: false,
        };
        Ok(self.sub_processes.insert(sp)?)
    }

    /// Look up a sub-process.
    pub fn sub_process(&self, id: SubProcessId) -> Option<&SubProcess> {
        self.sub_processes.get(id)
    }

    /// Editing cursor for a sub-process.
    pub fn sub_process_mut(&mut self, id: SubProcessId) -> Result<SubProcessMut<'_>, RecordError> {
        if !self.sub_processes.contains(id) {
            return Err(RecordError::UnknownSubProcess { sub_process: id });
        }
        Ok(SubProcessMut { event: self, id })
    }
}

impl SubProcessMut<'_> {
    /// Handle of the sub-process being edited.
    pub fn id(&self) -> SubProcessId {
        self.id
    }

    fn get(&mut self) -> Result<&mut SubProcess, RecordError> {
        self.event
            .sub_processes
            .get_mut(self.id)
            .ok_or(RecordError::UnknownSubProcess { sub_process: self.id })
    }

    /// Append an intermediate. With `fix_relations`, the incoming pair
    /// become its parents.
    pub fn add_intermediate(
        &mut self,
        p: ParticleId,
        fix_relations: bool,
    ) -> Result<(), RecordError> {
        self.event.require_particle(p)?;
        let sp = self.get()?;
        if !sp.intermediates.contains(&p) {
            sp.intermediates.push(p);
        }
        if fix_relations {
            self.link_from_incoming(p)?;
        }
        Ok(())
    }

    /// Append an outgoing product. With `fix_relations`, the incoming
    /// pair become its parents.
    pub fn add_outgoing(&mut self, p: ParticleId, fix_relations: bool) -> Result<(), RecordError> {
        self.event.require_particle(p)?;
        let sp = self.get()?;
        if !sp.outgoing.contains(&p) {
            sp.outgoing.push(p);
        }
        if fix_relations {
            self.link_from_incoming(p)?;
        }
        Ok(())
    }

    fn link_from_incoming(&mut self, p: ParticleId) -> Result<(), RecordError> {
        let (a, b) = self.get()?.incoming;
        for q in [a, b].into_iter().flatten() {
            self.event.add_child(q, p)?;
        }
        Ok(())
    }

    /// Replace one incoming parton.
    pub fn change_incoming(&mut self, new: ParticleId, old: ParticleId) -> Result<(), RecordError> {
        self.event.require_particle(new)?;
        let sp = self.get()?;
        if sp.incoming.0 == Some(old) {
            sp.incoming.0 = Some(new);
        } else if sp.incoming.1 == Some(old) {
            sp.incoming.1 = Some(new);
        } else {
            debug!(sub_process = %self.id, %old, "change_incoming: not an incoming parton");
            return Err(RecordError::UnknownParticle { particle: old });
        }
        Ok(())
    }

    /// Remove `p` from wherever the sub-process lists it. Returns whether
    /// it was listed.
    pub fn remove_entry(&mut self, p: ParticleId) -> bool {
        self.get().is_ok_and(|sp| sp.forget(p))
    }

    /// Set the label.
    pub fn set_label(&mut self, label: impl Into<String>) -> Result<(), RecordError> {
        self.get()?.label = label.into();
        Ok(())
    }

    /// Set the group weight.
    pub fn set_group_weight(&mut self, weight: f64) -> Result<(), RecordError> {
        self.get()?.group_weight = weight;
        Ok(())
    }

    /// Mark the outgoing products as decayed.
    pub fn set_decayed(&mut self, decayed: bool) -> Result<(), RecordError> {
        self.get()?.decayed = decayed;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evrec_test_utils::species;

    #[test]
    fn outgoing_with_relations_links_incoming_pair() {
        let mut ev = Event::default();
        let a = ev.create_particle(species::gluon(), Default::default()).unwrap();
        let b = ev.create_particle(species::gluon(), Default::default()).unwrap();
        let t = ev.create_particle(species::top(), Default::default()).unwrap();
        let sp = ev.new_sub_process((a, b), "gg->tt").unwrap();
        {
            let mut cur = ev.sub_process_mut(sp).unwrap();
            cur.add_outgoing(t, true).unwrap();
            cur.add_outgoing(t, true).unwrap();
            cur.set_group_weight(0.5).unwrap();
        }
        let s = ev.sub_process(sp).unwrap();
        assert_eq!(s.outgoing(), &[t]);
        assert_eq!(s.label(), "gg->tt");
        assert_eq!(s.group_weight(), 0.5);
        assert_eq!(ev.particle(t).unwrap().parents(), &[a, b]);
    }

    #[test]
    fn change_and_remove_incoming() {
        let mut ev = Event::default();
        let a = ev.create_particle(species::gluon(), Default::default()).unwrap();
        let b = ev.create_particle(species::gluon(), Default::default()).unwrap();
        let c = ev.create_particle(species::up(), Default::default()).unwrap();
        let sp = ev.new_sub_process((a, b), "").unwrap();
        let mut cur = ev.sub_process_mut(sp).unwrap();
        cur.change_incoming(c, a).unwrap();
        assert!(cur.change_incoming(c, a).is_err());
        assert!(cur.remove_entry(b));
        assert!(!cur.remove_entry(b));
        assert_eq!(ev.sub_process(sp).unwrap().incoming(), (Some(c), None));
    }
}
