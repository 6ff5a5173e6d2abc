//! Seeded random decay cascades.
//!
//! Builds a `g g -> t tbar` hard process and then runs a number of steps,
//! each of which copies or decays randomly chosen final-state particles.
//! The same seed always produces the same event.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use evrec_core::{Lorentz5Momentum, LorentzPoint, ParticleId, SpeciesRef};
use evrec_record::{Event, EventConfig};

use crate::fixtures::BEAM_ENERGY;
use crate::species;

/// Shape of a random cascade.
#[derive(Clone, Debug)]
pub struct CascadeConfig {
    pub seed: u64,
    /// Steps after the hard-process step.
    pub steps: usize,
    /// Copy or decay operations per step.
    pub operations_per_step: usize,
    /// Upper bound on decay multiplicity (at least 2).
    pub max_children: usize,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            steps: 3,
            operations_per_step: 4,
            max_children: 3,
        }
    }
}

fn random_species(rng: &mut ChaCha8Rng) -> SpeciesRef {
    match rng.random_range(0..5) {
        0 => species::gluon(),
        1 => species::up(),
        2 => species::anti_up(),
        3 => species::down(),
        _ => species::photon(),
    }
}

/// Generate a cascade event.
pub fn random_cascade(config: &CascadeConfig) -> Event {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut ev = Event::new(EventConfig::named("cascade", config.seed as i64)).expect("config");

    let proton = species::proton();
    let m = proton.mass;
    let b1 = ev
        .create_particle(proton.clone(), Lorentz5Momentum::from_mass(0.0, 0.0, BEAM_ENERGY, m))
        .expect("beam");
    let b2 = ev
        .create_particle(proton, Lorentz5Momentum::from_mass(0.0, 0.0, -BEAM_ENERGY, m))
        .expect("beam");
    let g1 = ev
        .create_particle(species::gluon(), Lorentz5Momentum::from_mass(0.0, 0.0, 400.0, 0.0))
        .expect("parton");
    let g2 = ev
        .create_particle(species::gluon(), Lorentz5Momentum::from_mass(0.0, 0.0, -400.0, 0.0))
        .expect("parton");
    let t = ev
        .create_particle(species::top(), Lorentz5Momentum::from_mass(50.0, 20.0, 100.0, 172.5))
        .expect("top");
    let tbar = ev
        .create_particle(species::anti_top(), Lorentz5Momentum::from_mass(-50.0, -20.0, -100.0, 172.5))
        .expect("anti-top");
    let l1 = ev.colour_line_or_create(g1, false).expect("colour");
    ev.set_colour_line(t, l1, false).expect("colour");
    ev.colour_connect(g1, g2, true).expect("colour");
    let l3 = ev.colour_line_or_create(g2, true).expect("colour");
    ev.set_colour_line(tbar, l3, true).expect("colour");

    let collision = ev.new_collision(b1, b2).expect("collision");
    let first = ev.collision_mut(collision).expect("collision").new_step().expect("step");
    let sp = ev.new_sub_process((g1, g2), "gg->ttbar").expect("sub-process");
    {
        let mut cur = ev.sub_process_mut(sp).expect("sub-process");
        cur.add_outgoing(t, true).expect("outgoing");
        cur.add_outgoing(tbar, true).expect("outgoing");
    }
    ev.step_mut(first).expect("step").add_sub_process(sp).expect("sub-process");

    for _ in 0..config.steps {
        let step = ev.collision_mut(collision).expect("collision").new_step().expect("step");
        for _ in 0..config.operations_per_step {
            let finals: Vec<ParticleId> = ev
                .step(step)
                .expect("step")
                .final_state()
                .iter()
                .copied()
                .collect();
            if finals.is_empty() {
                break;
            }
            let target = finals[rng.random_range(0..finals.len())];
            if rng.random::<f64>() < 0.3 {
                let copy = ev.step_mut(step).expect("step").copy_particle(target);
                if let Some(copy) = copy {
                    if rng.random::<f64>() < 0.5 {
                        let shift = rng.random::<f64>();
                        ev.extended_mut(copy).expect("copy").vertex =
                            LorentzPoint::new(shift, 0.0, 0.0, shift);
                    }
                }
                continue;
            }
            let n = rng.random_range(2..=config.max_children.max(2));
            let parent_mom = *ev.particle(target).expect("target").momentum();
            let mut children = Vec::with_capacity(n);
            for _ in 0..n {
                let s = random_species(&mut rng);
                let mass = s.mass;
                let f = 1.0 / n as f64;
                let mom = Lorentz5Momentum::from_mass(
                    parent_mom.px * f,
                    parent_mom.py * f,
                    parent_mom.pz * f,
                    mass,
                );
                children.push(ev.create_particle(s, mom).expect("child"));
            }
            ev.step_mut(step)
                .expect("step")
                .add_decay_products(target, &children, true)
                .expect("decay");
        }
    }
    ev
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_event() {
        let cfg = CascadeConfig {
            seed: 11,
            ..CascadeConfig::default()
        };
        let a = random_cascade(&cfg);
        let b = random_cascade(&cfg);
        assert_eq!(a.particle_count(), b.particle_count());
        assert_eq!(a.registered_particles().len(), b.registered_particles().len());
        assert_eq!(a.final_state().len(), b.final_state().len());
    }

    #[test]
    fn cascade_grows_past_hard_process() {
        let ev = random_cascade(&CascadeConfig::default());
        // Beams, two partons and the top pair at the very least.
        assert!(ev.registered_particles().len() > 6);
    }
}
