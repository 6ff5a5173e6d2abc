//! Particle selection.
//!
//! A [`ParticleSelector`] decides which collisions and steps to visit,
//! which role within a step (final state or intermediate) to look at,
//! and which particles to keep. Results are deduplicated and returned in
//! first-seen order.

use indexmap::IndexSet;

use evrec_core::{CollisionId, ParticleId, StepId};

use crate::event::Event;
use crate::particle::Particle;

/// Chooses particles from an event.
pub trait ParticleSelector {
    /// Visit final-state particles of each step.
    fn final_state(&self) -> bool {
        true
    }

    /// Visit intermediates of each step.
    fn intermediate(&self) -> bool {
        false
    }

    /// Visit every step, not just the last of each collision.
    fn all_steps(&self) -> bool {
        false
    }

    /// Visit every collision, not just the primary one.
    fn all_collisions(&self) -> bool {
        false
    }

    /// Keep this particle.
    fn check(&self, _particle: &Particle) -> bool {
        true
    }
}

/// Final state of the primary collision's last step.
#[derive(Clone, Copy, Debug, Default)]
pub struct FinalState;

impl ParticleSelector for FinalState {}

/// Final state of the last step of every collision.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllFinalState;

impl ParticleSelector for AllFinalState {
    fn all_collisions(&self) -> bool {
        true
    }
}

/// Intermediates of every step of the primary collision.
#[derive(Clone, Copy, Debug, Default)]
pub struct Intermediates;

impl ParticleSelector for Intermediates {
    fn final_state(&self) -> bool {
        false
    }

    fn intermediate(&self) -> bool {
        true
    }

    fn all_steps(&self) -> bool {
        true
    }
}

/// Every particle in every step of every collision.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllParticles;

impl ParticleSelector for AllParticles {
    fn intermediate(&self) -> bool {
        true
    }

    fn all_steps(&self) -> bool {
        true
    }

    fn all_collisions(&self) -> bool {
        true
    }
}

/// Charged particles in the final state.
#[derive(Clone, Copy, Debug, Default)]
pub struct Charged;

impl ParticleSelector for Charged {
    fn check(&self, particle: &Particle) -> bool {
        particle.charged()
    }
}

/// Coloured particles in the final state.
#[derive(Clone, Copy, Debug, Default)]
pub struct Coloured;

impl ParticleSelector for Coloured {
    fn check(&self, particle: &Particle) -> bool {
        particle.coloured()
    }
}

/// Wraps another selector with an extra predicate.
pub struct Select<S, F> {
    inner: S,
    predicate: F,
}

impl<S, F> Select<S, F>
where
    S: ParticleSelector,
    F: Fn(&Particle) -> bool,
{
    /// Keep the particles `inner` keeps that also satisfy `predicate`.
    pub fn new(inner: S, predicate: F) -> Self {
        Self { inner, predicate }
    }
}

impl<S, F> ParticleSelector for Select<S, F>
where
    S: ParticleSelector,
    F: Fn(&Particle) -> bool,
{
    fn final_state(&self) -> bool {
        self.inner.final_state()
    }

    fn intermediate(&self) -> bool {
        self.inner.intermediate()
    }

    fn all_steps(&self) -> bool {
        self.inner.all_steps()
    }

    fn all_collisions(&self) -> bool {
        self.inner.all_collisions()
    }

    fn check(&self, particle: &Particle) -> bool {
        self.inner.check(particle) && (self.predicate)(particle)
    }
}

impl Event {
    /// Particles chosen by `selector` across the event.
    pub fn select<S: ParticleSelector + ?Sized>(&self, selector: &S) -> Vec<ParticleId> {
        let collisions: Vec<CollisionId> = if selector.all_collisions() {
            self.collision_order.clone()
        } else {
            self.primary_collision().into_iter().collect()
        };
        let mut out = IndexSet::new();
        for c in collisions {
            self.collect_collision(c, selector, &mut out);
        }
        out.into_iter().collect()
    }

    /// Particles chosen by `selector` within one collision.
    pub fn select_in_collision<S: ParticleSelector + ?Sized>(
        &self,
        collision: CollisionId,
        selector: &S,
    ) -> Vec<ParticleId> {
        let mut out = IndexSet::new();
        self.collect_collision(collision, selector, &mut out);
        out.into_iter().collect()
    }

    /// Particles chosen by `selector` within one step.
    pub fn select_in_step<S: ParticleSelector + ?Sized>(
        &self,
        step: StepId,
        selector: &S,
    ) -> Vec<ParticleId> {
        let mut out = IndexSet::new();
        self.collect_step(step, selector, &mut out);
        out.into_iter().collect()
    }

    /// Final state of the primary collision.
    pub fn final_state(&self) -> Vec<ParticleId> {
        self.select(&FinalState)
    }

    fn collect_collision<S: ParticleSelector + ?Sized>(
        &self,
        collision: CollisionId,
        selector: &S,
        out: &mut IndexSet<ParticleId>,
    ) {
        let Some(col) = self.collisions.get(collision) else {
            return;
        };
        if selector.all_steps() {
            for s in col.steps() {
                self.collect_step(*s, selector, out);
            }
        } else if let Some(s) = col.final_step() {
            self.collect_step(s, selector, out);
        }
    }

    fn collect_step<S: ParticleSelector + ?Sized>(
        &self,
        step: StepId,
        selector: &S,
        out: &mut IndexSet<ParticleId>,
    ) {
        let Some(st) = self.steps.get(step) else {
            return;
        };
        let mut take = |ids: &IndexSet<ParticleId>| {
            for p in ids {
                if self.particles.get(*p).is_some_and(|x| selector.check(x)) {
                    out.insert(*p);
                }
            }
        };
        if selector.final_state() {
            take(&st.particles);
        }
        if selector.intermediate() {
            take(&st.intermediates);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evrec_core::Lorentz5Momentum;
    use evrec_test_utils::species;

    fn event() -> (Event, Vec<ParticleId>) {
        let mut ev = Event::default();
        let a = ev.create_particle(species::electron(), Lorentz5Momentum::default()).unwrap();
        let b = ev.create_particle(species::positron(), Lorentz5Momentum::default()).unwrap();
        let c = ev.new_collision(a, b).unwrap();
        let s = ev.collision_mut(c).unwrap().new_step().unwrap();
        let z = ev.create_particle(species::z_boson(), Lorentz5Momentum::at_rest(91.19)).unwrap();
        let u = ev.create_particle(species::up(), Lorentz5Momentum::default()).unwrap();
        let ubar = ev.create_particle(species::anti_up(), Lorentz5Momentum::default()).unwrap();
        let mut step = ev.step_mut(s).unwrap();
        step.add_particle(z).unwrap();
        step.add_decay_products(z, &[u, ubar], false).unwrap();
        (ev, vec![a, b, z, u, ubar])
    }

    #[test]
    fn final_state_of_primary_collision() {
        let (ev, ids) = event();
        assert_eq!(ev.final_state(), vec![ids[3], ids[4]]);
    }

    #[test]
    fn intermediates_include_incoming_pair() {
        let (ev, ids) = event();
        assert_eq!(ev.select(&Intermediates), vec![ids[0], ids[1], ids[2]]);
    }

    #[test]
    fn all_particles_deduplicated() {
        let (ev, ids) = event();
        let all = ev.select(&AllParticles);
        assert_eq!(all.len(), 5);
        for id in ids {
            assert!(all.contains(&id));
        }
    }

    #[test]
    fn predicate_selectors() {
        let (ev, ids) = event();
        assert_eq!(ev.select(&Coloured), vec![ids[3], ids[4]]);
        let ups = Select::new(AllParticles, |p: &Particle| p.id() == 2);
        assert_eq!(ev.select(&ups), vec![ids[3]]);
        let charged_inter = Select::new(Intermediates, |p: &Particle| p.charged());
        assert_eq!(ev.select(&charged_inter), vec![ids[0], ids[1]]);
    }
}
