//! Hand-built events with known topology.
//!
//! Each fixture returns the event together with the handles a test needs
//! to make assertions, so tests never search the record for them.

use evrec_core::{CollisionId, ColourLineId, Lorentz5Momentum, ParticleId, StepId, SubProcessId};
use evrec_record::{Event, EventConfig};

use crate::species;

/// Beam energy used by every fixture, in GeV.
pub const BEAM_ENERGY: f64 = 6500.0;

/// A collision with one hard sub-process in its first step.
pub struct HardProcess {
    pub event: Event,
    pub collision: CollisionId,
    pub beams: (ParticleId, ParticleId),
    pub partons: (ParticleId, ParticleId),
    pub step: StepId,
    pub sub_process: SubProcessId,
    pub outgoing: Vec<ParticleId>,
}

fn beam_pair(ev: &mut Event) -> (ParticleId, ParticleId) {
    let p = species::proton();
    let m = p.mass;
    let a = ev
        .create_particle(p.clone(), Lorentz5Momentum::from_mass(0.0, 0.0, BEAM_ENERGY, m))
        .expect("beam");
    let b = ev
        .create_particle(p, Lorentz5Momentum::from_mass(0.0, 0.0, -BEAM_ENERGY, m))
        .expect("beam");
    (a, b)
}

fn parton(ev: &mut Event, s: evrec_core::SpeciesRef, pz: f64) -> ParticleId {
    let m = s.mass;
    ev.create_particle(s, Lorentz5Momentum::from_mass(0.0, 0.0, pz, m))
        .expect("parton")
}

/// `p p -> (u ubar -> gamma Z)` with both partons wired as children of
/// both beams, and `Z -> e- e+` in the same step.
///
/// Exports to exactly three vertices: beams to partons, the hard
/// interaction, and the Z decay.
pub struct ThreeVertex {
    pub hard: HardProcess,
    pub z: ParticleId,
    pub leptons: (ParticleId, ParticleId),
}

pub fn three_vertex() -> ThreeVertex {
    let mut ev = Event::new(EventConfig::named("three-vertex", 1)).expect("config");
    let beams = beam_pair(&mut ev);
    let u = parton(&mut ev, species::up(), 650.0);
    let ubar = parton(&mut ev, species::anti_up(), -650.0);
    for beam in [beams.0, beams.1] {
        ev.add_child(beam, u).expect("link");
        ev.add_child(beam, ubar).expect("link");
    }
    let line = ev.colour_line_or_create(u, false).expect("colour");
    ev.set_colour_line(ubar, line, true).expect("colour");

    let gamma = ev
        .create_particle(species::photon(), Lorentz5Momentum::from_mass(40.0, 0.0, 10.0, 0.0))
        .expect("gamma");
    let z = ev
        .create_particle(species::z_boson(), Lorentz5Momentum::from_mass(-40.0, 0.0, -10.0, 91.1876))
        .expect("Z");
    let collision = ev.new_collision(beams.0, beams.1).expect("collision");
    let step = ev.collision_mut(collision).expect("collision").new_step().expect("step");
    let sub_process = ev.new_sub_process((u, ubar), "uubar->gammaZ").expect("sub-process");
    {
        let mut sp = ev.sub_process_mut(sub_process).expect("sub-process");
        sp.add_outgoing(gamma, true).expect("outgoing");
        sp.add_outgoing(z, true).expect("outgoing");
    }
    let e_minus = ev
        .create_particle(species::electron(), Lorentz5Momentum::from_mass(-10.0, 30.0, 0.0, 0.000_511))
        .expect("e-");
    let e_plus = ev
        .create_particle(species::positron(), Lorentz5Momentum::from_mass(-30.0, -30.0, -10.0, 0.000_511))
        .expect("e+");
    {
        let mut st = ev.step_mut(step).expect("step");
        st.add_sub_process(sub_process).expect("sub-process");
        st.add_decay_products(z, &[e_minus, e_plus], false)
            .expect("decay");
    }
    ThreeVertex {
        hard: HardProcess {
            event: ev,
            collision,
            beams,
            partons: (u, ubar),
            step,
            sub_process,
            outgoing: vec![gamma, z],
        },
        z,
        leptons: (e_minus, e_plus),
    }
}

/// `u ubar -> u ubar` with the outgoing quark split into a quark and an
/// antiquark in the same step, colour fixed automatically.
///
/// `l1` joins the colour of incoming `a`, outgoing `q1` and, after the
/// split, `q2`.
pub struct ColourScenario {
    pub event: Event,
    pub collision: CollisionId,
    pub step: StepId,
    pub a: ParticleId,
    pub b: ParticleId,
    pub q1: ParticleId,
    pub q1bar: ParticleId,
    pub q2: ParticleId,
    pub q3: ParticleId,
    pub l1: ColourLineId,
}

pub fn colour_scenario() -> ColourScenario {
    let mut ev = Event::default();
    let beams = beam_pair(&mut ev);
    let a = parton(&mut ev, species::up(), 500.0);
    let b = parton(&mut ev, species::anti_up(), -500.0);
    let q1 = parton(&mut ev, species::up(), 300.0);
    let q1bar = parton(&mut ev, species::anti_up(), -300.0);
    let l1 = ev.new_colour_line().expect("line");
    ev.set_colour_line(a, l1, false).expect("colour");
    ev.set_colour_line(q1, l1, false).expect("colour");
    let l2 = ev.new_colour_line().expect("line");
    ev.set_colour_line(b, l2, true).expect("colour");
    ev.set_colour_line(q1bar, l2, true).expect("colour");

    let collision = ev.new_collision(beams.0, beams.1).expect("collision");
    let step = ev.collision_mut(collision).expect("collision").new_step().expect("step");
    let sp = ev.new_sub_process((a, b), "uubar->uubar").expect("sub-process");
    {
        let mut cur = ev.sub_process_mut(sp).expect("sub-process");
        cur.add_outgoing(q1, true).expect("outgoing");
        cur.add_outgoing(q1bar, true).expect("outgoing");
    }
    let q2 = parton(&mut ev, species::up(), 200.0);
    let q3 = parton(&mut ev, species::anti_down(), 100.0);
    {
        let mut st = ev.step_mut(step).expect("step");
        st.add_sub_process(sp).expect("sub-process");
        st.add_decay_products(q1, &[q2, q3], true).expect("split");
    }
    ColourScenario {
        event: ev,
        collision,
        step,
        a,
        b,
        q1,
        q1bar,
        q2,
        q3,
        l1,
    }
}

/// A four-generation chain `g0 -> g1 -> g2 -> g3` hanging off a
/// final-state particle of a single step, each generation with one
/// extra sibling.
pub struct Chain {
    pub event: Event,
    pub collision: CollisionId,
    pub step: StepId,
    pub root_parent: ParticleId,
    pub generations: [ParticleId; 4],
    pub siblings: [ParticleId; 4],
}

pub fn four_generation_chain() -> Chain {
    let mut ev = Event::default();
    let beams = beam_pair(&mut ev);
    let collision = ev.new_collision(beams.0, beams.1).expect("collision");
    let step = ev.collision_mut(collision).expect("collision").new_step().expect("step");
    let root_parent = ev
        .create_particle(species::z_boson(), Lorentz5Momentum::at_rest(91.1876))
        .expect("root");
    ev.add_child(beams.0, root_parent).expect("link");
    ev.step_mut(step).expect("step").add_particle(root_parent).expect("add");
    let mut generations = Vec::new();
    let mut siblings = Vec::new();
    let mut parent = root_parent;
    for i in 0..4 {
        let pz = 10.0 * (i + 1) as f64;
        let g = parton(&mut ev, species::photon(), pz);
        let s = parton(&mut ev, species::photon(), -pz);
        ev.step_mut(step)
            .expect("step")
            .add_decay_products(parent, &[g, s], false)
            .expect("decay");
        generations.push(g);
        siblings.push(s);
        parent = g;
    }
    Chain {
        event: ev,
        collision,
        step,
        root_parent,
        generations: [generations[0], generations[1], generations[2], generations[3]],
        siblings: [siblings[0], siblings[1], siblings[2], siblings[3]],
    }
}

/// A colour-disconnected final state that `fix_colour_flow` can repair.
///
/// Step 1 holds `x` (colour `l`) and `y` (anti-colour `l`). Step 2 copies
/// `y` to `y2`, moves `y2`'s anti-colour onto a fresh dangling line, and
/// decays `x` to `x1`, which inherits `l` and is left without a partner.
pub struct DanglingColour {
    pub event: Event,
    pub collision: CollisionId,
    pub steps: (StepId, StepId),
    pub x: ParticleId,
    pub y: ParticleId,
    pub x1: ParticleId,
    pub y2: ParticleId,
    pub l: ColourLineId,
}

pub fn dangling_colour() -> DanglingColour {
    let mut ev = Event::default();
    let beams = beam_pair(&mut ev);
    let collision = ev.new_collision(beams.0, beams.1).expect("collision");
    let s1 = ev.collision_mut(collision).expect("collision").new_step().expect("step");
    let x = parton(&mut ev, species::up(), 100.0);
    let y = parton(&mut ev, species::anti_up(), -100.0);
    ev.step_mut(s1).expect("step").add_particles([x, y]).expect("add");
    let l = ev.colour_connect(x, y, false).expect("colour");

    let s2 = ev.collision_mut(collision).expect("collision").new_step().expect("step");
    let y2 = ev.step_mut(s2).expect("step").copy_particle(y).expect("copy");
    let dangling = ev.new_colour_line().expect("line");
    ev.set_colour_line(y2, dangling, true).expect("colour");
    let x1 = parton(&mut ev, species::up(), 90.0);
    ev.step_mut(s2)
        .expect("step")
        .add_decay_product(x, x1, true)
        .expect("decay");
    DanglingColour {
        event: ev,
        collision,
        steps: (s1, s2),
        x,
        y,
        x1,
        y2,
        l,
    }
}
