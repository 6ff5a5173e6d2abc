//! End-to-end behaviour of the event record on hand-built fixtures.

use evrec_core::{Lorentz5Momentum, ParticleId};
use evrec_record::{AllParticles, Event, RecordError};
use evrec_test_utils::{fixtures, species};

fn assert_links_consistent(ev: &Event) {
    for p in ev.particle_ids() {
        let x = ev.particle(p).unwrap();
        for c in x.children() {
            assert!(ev.particle(*c).unwrap().parents().contains(&p), "{p} -> {c}");
        }
        for q in x.parents() {
            assert!(ev.particle(*q).unwrap().children().contains(&p), "{q} -> {p}");
        }
        if let Some(n) = x.next() {
            assert_eq!(ev.particle(n).unwrap().previous(), Some(p));
        }
        if let Some(q) = x.previous() {
            assert_eq!(ev.particle(q).unwrap().next(), Some(p));
        }
    }
}

#[test]
fn colour_neighbour_crosses_incoming_partons() {
    let f = fixtures::colour_scenario();
    let ev = &f.event;
    assert_eq!(ev.colour_line(f.q2, false), Some(f.l1));
    let q3_line = ev.colour_line(f.q3, true).expect("antiquark gets a line");
    assert_ne!(q3_line, f.l1);
    assert_eq!(ev.colour_neighbour(f.q2, false), Some(f.a));
    assert_eq!(ev.incoming_colour(f.q2, false), Some(f.q1));
    assert_eq!(ev.outgoing_colour(f.q1, false), Some(f.q2));
    // The new anti-colour line has nobody on its colour side.
    assert_eq!(ev.colour_neighbour(f.q3, true), None);
    assert!(ev.is_incoming_role(f.a));
    assert!(!ev.is_incoming_role(f.q1));
    let st = ev.step(f.step).unwrap();
    assert!(st.intermediates().contains(&f.q1));
    assert!(st.final_state().contains(&f.q2));
    assert!(st.final_state().contains(&f.q1bar));
}

#[test]
fn removing_four_generations_restores_ancestors() {
    let mut f = fixtures::four_generation_chain();
    let ev = &mut f.event;
    let g = f.generations;
    let s = f.siblings;
    let before = ev.particle_count();

    let removed = ev.step_mut(f.step).unwrap().remove_particle(g[1]).unwrap();
    assert_eq!(removed.len(), 5);
    for p in [g[1], g[2], g[3], s[2], s[3]] {
        assert!(ev.particle(p).is_none(), "{p} should be gone");
        assert!(!ev.registered_particles().contains(&p));
    }
    assert_eq!(ev.particle_count(), before - 5);
    // g0 still has its other child, so it stays decayed.
    assert_eq!(ev.particle(g[0]).unwrap().children(), &[s[1]]);
    assert!(!ev.step(f.step).unwrap().final_state().contains(&g[0]));

    ev.step_mut(f.step).unwrap().remove_particle(s[1]).unwrap();
    assert!(ev.particle(g[0]).unwrap().is_final());
    assert!(ev.step(f.step).unwrap().final_state().contains(&g[0]));
    assert!(!ev.step(f.step).unwrap().intermediates().contains(&g[0]));
    assert_links_consistent(ev);
}

#[test]
fn collision_removal_of_whole_chain() {
    let mut f = fixtures::four_generation_chain();
    let ev = &mut f.event;
    let removed = ev
        .collision_mut(f.collision)
        .unwrap()
        .remove_particle(f.generations[0])
        .unwrap();
    assert_eq!(removed.len(), 7);
    ev.collision_mut(f.collision)
        .unwrap()
        .remove_decay(f.root_parent)
        .unwrap();
    assert!(ev.particle(f.root_parent).unwrap().children().is_empty());
    let st = ev.step(f.step).unwrap();
    assert_eq!(st.final_state().len(), 1);
    assert!(st.final_state().contains(&f.root_parent));
    assert_links_consistent(ev);
}

#[test]
fn removal_clears_sub_process_slots() {
    let mut f = fixtures::three_vertex();
    let hard = &mut f.hard;
    let ev = &mut hard.event;
    ev.remove_particle(f.z).unwrap();
    let sp = ev.sub_process(hard.sub_process).unwrap();
    assert_eq!(sp.outgoing(), &[hard.outgoing[0]]);
    assert!(ev.particle(f.leptons.0).is_none());

    let (u, _) = hard.partons;
    ev.remove_particle(u).unwrap();
    let sp = ev.sub_process(hard.sub_process).unwrap();
    assert_eq!(sp.incoming().0, None);
    assert!(sp.incoming().1.is_some());
    assert_links_consistent(ev);
}

#[test]
fn copy_of_superseded_particle_is_declined() {
    let mut f = fixtures::colour_scenario();
    let ev = &mut f.event;
    let s2 = ev.collision_mut(f.collision).unwrap().new_step().unwrap();
    let q2b = ev.step_mut(s2).unwrap().copy_particle(f.q2).unwrap();
    assert!(ev.step_mut(s2).unwrap().copy_particle(f.q2).is_none());
    // Decayed particles cannot be copied either.
    assert!(ev.step_mut(s2).unwrap().copy_particle(f.q1).is_none());
    assert_eq!(ev.colour_line(q2b, false), Some(f.l1));
    assert_eq!(ev.final_instance(f.q2), q2b);
    assert_eq!(ev.first_instance(q2b), f.q2);
}

#[test]
fn decay_of_superseded_parent_fails_without_mutation() {
    let mut f = fixtures::colour_scenario();
    let ev = &mut f.event;
    let s2 = ev.collision_mut(f.collision).unwrap().new_step().unwrap();
    ev.step_mut(s2).unwrap().copy_particle(f.q2).unwrap();
    let extra = ev
        .create_particle(species::gluon(), Lorentz5Momentum::default())
        .unwrap();
    let err = ev
        .step_mut(s2)
        .unwrap()
        .add_decay_product(f.q2, extra, true)
        .unwrap_err();
    assert_eq!(err, RecordError::AlreadySuperseded { particle: f.q2 });
    assert!(ev.particle(extra).unwrap().parents().is_empty());
    assert!(ev.colour_line(extra, false).is_none());
}

#[test]
fn decay_in_earlier_step_is_refused() {
    let mut f = fixtures::colour_scenario();
    let ev = &mut f.event;
    ev.collision_mut(f.collision).unwrap().new_step().unwrap();
    let extra = ev
        .create_particle(species::gluon(), Lorentz5Momentum::default())
        .unwrap();
    let err = ev
        .step_mut(f.step)
        .unwrap()
        .add_decay_product(f.q2, extra, false)
        .unwrap_err();
    assert_eq!(err, RecordError::NotFinalStep { step: f.step });
}

#[test]
fn fix_colour_flow_repairs_then_is_idempotent() {
    let mut f = fixtures::dangling_colour();
    let ev = &mut f.event;
    let lines_before = ev.colour_table().len();
    assert_eq!(ev.colour_line(f.x1, false), Some(f.l));
    let repaired = ev.step_mut(f.steps.1).unwrap().fix_colour_flow().unwrap();
    assert_eq!(repaired, 1);
    assert_eq!(ev.colour_line(f.y2, true), Some(f.l));
    // The dangling line lost its only member and was collected.
    assert_eq!(ev.colour_table().len(), lines_before - 1);

    let lines_after = ev.colour_table().len();
    let particles_after = ev.particle_count();
    let again = ev.step_mut(f.steps.1).unwrap().fix_colour_flow().unwrap();
    assert_eq!(again, 0);
    assert_eq!(ev.colour_table().len(), lines_after);
    assert_eq!(ev.particle_count(), particles_after);
}

#[test]
fn fix_colour_flow_leaves_connected_state_alone() {
    let mut f = fixtures::colour_scenario();
    let ev = &mut f.event;
    let n = ev.particle_count();
    assert_eq!(ev.step_mut(f.step).unwrap().fix_colour_flow().unwrap(), 0);
    assert_eq!(ev.particle_count(), n);
}

#[test]
fn stale_handles_resolve_to_nothing() {
    let mut f = fixtures::four_generation_chain();
    let ev = &mut f.event;
    let gone = f.generations[3];
    ev.remove_particle(gone).unwrap();
    assert!(ev.particle(gone).is_none());
    assert!(ev.colour_line(gone, false).is_none());
    assert!(matches!(
        ev.add_child(f.root_parent, gone),
        Err(RecordError::UnknownParticle { .. })
    ));
    let fresh = ev
        .create_particle(species::photon(), Lorentz5Momentum::default())
        .unwrap();
    assert_ne!(fresh, gone);
    assert!(ev.particle(gone).is_none());
}

#[test]
fn numbering_follows_first_registration() {
    let f = fixtures::three_vertex();
    let ev = &f.hard.event;
    let numbers: Vec<i64> = ev
        .registered_particles()
        .iter()
        .map(|p| ev.particle(*p).unwrap().number())
        .collect();
    let expected: Vec<i64> = (1..=numbers.len() as i64).collect();
    assert_eq!(numbers, expected);
    assert_eq!(ev.particle(f.hard.beams.0).unwrap().number(), 1);
}

#[test]
fn colour_line_index_is_stable() {
    let mut f = fixtures::colour_scenario();
    let ev = &mut f.event;
    let l2 = ev.colour_line(f.q3, true).unwrap();
    assert_eq!(ev.colour_line_index(l2), Some(1));
    assert_eq!(ev.colour_line_index(f.l1), Some(2));
    assert_eq!(ev.colour_line_index(l2), Some(1));
}

#[test]
fn select_all_covers_every_registered_particle() {
    let f = fixtures::three_vertex();
    let ev = &f.hard.event;
    let all = ev.select(&AllParticles);
    let registered: Vec<ParticleId> = ev.registered_particles().iter().copied().collect();
    for p in &registered {
        assert!(all.contains(p), "{p} missing from selection");
    }
}
