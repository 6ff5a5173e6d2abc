//! Deep copies: isomorphism, independence and in-event collision copies.

use evrec_core::{Lorentz5Momentum, ParticleId};
use evrec_record::{AllParticles, Event, TranslationMap, Translate};
use evrec_test_utils::cascade::{random_cascade, CascadeConfig};
use evrec_test_utils::{fixtures, species};

fn assert_isomorphic(orig: &Event, copy: &Event, map: &TranslationMap) {
    assert_eq!(orig.registered_particles().len(), copy.registered_particles().len());
    assert_eq!(orig.collisions().len(), copy.collisions().len());
    assert_eq!(orig.step_count(), copy.step_count());
    assert_eq!(orig.colour_table().len(), copy.colour_table().len());
    for p in orig.registered_particles() {
        let q = map.particle(*p).expect("registered particle is mapped");
        assert_ne!(*p, q);
        let a = orig.particle(*p).unwrap();
        let b = copy.particle(q).unwrap();
        assert_eq!(a.number(), b.number());
        assert_eq!(a.id(), b.id());
        assert_eq!(a.momentum(), b.momentum());
        assert_eq!(a.parents().to_vec().translate(map), b.parents().to_vec());
        assert_eq!(a.children().to_vec().translate(map), b.children().to_vec());
        assert_eq!(a.next().translate(map), b.next());
        assert_eq!(a.previous().translate(map), b.previous());
        assert_eq!(a.birth_step().translate(map), b.birth_step());
        for anti in [false, true] {
            assert_eq!(
                orig.colour_line(*p, anti).translate(map),
                copy.colour_line(q, anti)
            );
        }
        // Original handles never resolve in the copy.
        assert!(copy.particle(*p).is_none());
    }
    for (c, d) in orig.collisions().iter().zip(copy.collisions()) {
        let a = orig.collision(*c).unwrap();
        let b = copy.collision(*d).unwrap();
        assert_eq!(a.steps().to_vec().translate(map), b.steps().to_vec());
        for (s, t) in a.steps().iter().zip(b.steps()) {
            assert_eq!(
                orig.step(*s).unwrap().final_state().translate(map),
                *copy.step(*t).unwrap().final_state()
            );
        }
    }
    assert_eq!(orig.select(&AllParticles).translate(map), copy.select(&AllParticles));
}

#[test]
fn clone_of_fixture_is_isomorphic() {
    let f = fixtures::colour_scenario();
    let (copy, map) = f.event.clone_with_map().unwrap();
    assert_isomorphic(&f.event, &copy, &map);
    let a2 = map.particle(f.a).unwrap();
    let q2 = map.particle(f.q2).unwrap();
    assert_eq!(copy.colour_neighbour(q2, false), Some(a2));
}

#[test]
fn edits_to_clone_do_not_leak() {
    let f = fixtures::four_generation_chain();
    let orig = f.event;
    let (mut copy, map) = orig.clone_with_map().unwrap();
    let g0 = map.particle(f.generations[0]).unwrap();
    copy.remove_particle(g0).unwrap();
    copy.set_weight(0.25);
    assert!(copy.particle(g0).is_none());
    assert!(orig.particle(f.generations[0]).is_some());
    assert_eq!(orig.particle(f.generations[3]).unwrap().parents(), &[f.generations[2]]);
    assert_eq!(orig.weight(), 1.0);

    let extra = copy
        .create_particle(species::photon(), Lorentz5Momentum::default())
        .unwrap();
    assert!(orig.particle(extra).is_none());
}

#[test]
fn clone_trait_matches_clone_with_map() {
    let f = fixtures::three_vertex();
    let ev = &f.hard.event;
    let copy = ev.clone();
    assert_eq!(copy.registered_particles().len(), ev.registered_particles().len());
    assert_eq!(copy.name(), ev.name());
    assert_eq!(copy.final_state().len(), ev.final_state().len());
}

#[test]
fn unregistered_particles_are_not_copied() {
    let mut f = fixtures::three_vertex();
    let ev = &mut f.hard.event;
    let loose = ev
        .create_particle(species::photon(), Lorentz5Momentum::default())
        .unwrap();
    ev.add_child(f.leptons.0, loose).unwrap();
    let (copy, map) = ev.clone_with_map().unwrap();
    assert!(map.particle(loose).is_none());
    let e2 = map.particle(f.leptons.0).unwrap();
    // The reference is left untranslated and does not resolve.
    assert_eq!(copy.particle(e2).unwrap().children(), &[loose]);
    assert!(copy.particle(loose).is_none());
}

#[test]
fn clone_collision_adds_independent_copy() {
    let mut f = fixtures::colour_scenario();
    let ev = &mut f.event;
    let before = ev.registered_particles().len();
    let lines_before = ev.colour_table().len();
    let (c2, map) = ev.clone_collision(f.collision).unwrap();
    assert_eq!(ev.collisions(), &[f.collision, c2]);
    assert_eq!(ev.primary_collision(), Some(f.collision));
    assert_eq!(ev.registered_particles().len(), 2 * before);
    assert_eq!(ev.colour_table().len(), 2 * lines_before);

    let q2c = map.particle(f.q2).unwrap();
    let ac = map.particle(f.a).unwrap();
    assert_ne!(ev.colour_line(q2c, false), ev.colour_line(f.q2, false));
    assert_eq!(ev.colour_neighbour(q2c, false), Some(ac));
    assert_eq!(ev.collision_of(q2c), Some(c2));
    // Copies are numbered after the originals.
    assert!(ev.particle(q2c).unwrap().number() > before as i64);

    let numbers: Vec<i64> = ev
        .registered_particles()
        .iter()
        .map(|p| ev.particle(*p).unwrap().number())
        .collect();
    let mut dedup = numbers.clone();
    dedup.sort_unstable();
    dedup.dedup();
    assert_eq!(dedup.len(), numbers.len());

    ev.remove_particle(q2c).unwrap();
    assert!(ev.particle(f.q2).is_some());
    assert_eq!(ev.colour_line(f.q2, false), Some(f.l1));
}

#[test]
fn rebinding_twice_is_harmless() {
    let f = fixtures::colour_scenario();
    let (copy, map) = f.event.clone_with_map().unwrap();
    let q2 = map.particle(f.q2).unwrap();
    let parents: Vec<ParticleId> = copy.particle(q2).unwrap().parents().to_vec();
    assert_eq!(parents, vec![map.particle(f.q1).unwrap()]);
    // Translating already-translated handles is the identity.
    assert_eq!(parents.translate(&map), parents);
}

#[test]
fn colour_indices_survive_clone_and_are_not_reused() {
    let mut f = fixtures::colour_scenario();
    let ev = &mut f.event;
    let split = ev.colour_line(f.q3, true).unwrap();
    let l2 = ev.colour_line(f.b, true).unwrap();
    assert_eq!(ev.colour_line_index(split), Some(1));
    assert_eq!(ev.colour_line_index(f.l1), Some(2));
    assert_eq!(ev.colour_line_index(l2), Some(3));
    ev.remove_particle(f.q3).unwrap();
    assert!(ev.colour_table().line(split).is_none());

    let (mut copy, map) = ev.clone_with_map().unwrap();
    let l1c = map.colour_line(f.l1).unwrap();
    let l2c = map.colour_line(l2).unwrap();
    assert_eq!(copy.colour_line_index(l1c), Some(2));
    assert_eq!(copy.colour_line_index(l2c), Some(3));
    let fresh = copy.new_colour_line().unwrap();
    assert_eq!(copy.colour_line_index(fresh), Some(4));

    let again = ev.new_colour_line().unwrap();
    assert_eq!(ev.colour_line_index(again), Some(4));
}

#[test]
fn copied_lines_list_only_copied_particles() {
    let mut f = fixtures::colour_scenario();
    let ev = &mut f.event;
    let loose = ev
        .create_particle(species::up(), Lorentz5Momentum::default())
        .unwrap();
    ev.set_colour_line(loose, f.l1, false).unwrap();
    let kept: Vec<ParticleId> = ev
        .colour_table()
        .line(f.l1)
        .unwrap()
        .coloured()
        .iter()
        .copied()
        .filter(|p| *p != loose)
        .collect();

    let (copy, map) = ev.clone_with_map().unwrap();
    let l1c = map.colour_line(f.l1).unwrap();
    assert_eq!(
        copy.colour_table().line(l1c).unwrap().coloured().to_vec(),
        kept.translate(&map)
    );
    assert!(copy.colour_line(loose, false).is_none());
}

#[test]
fn collision_copy_leaves_other_collisions_on_the_original_line() {
    let mut f = fixtures::colour_scenario();
    let ev = &mut f.event;
    let p1 = ev
        .create_particle(species::proton(), Lorentz5Momentum::default())
        .unwrap();
    let p2 = ev
        .create_particle(species::proton(), Lorentz5Momentum::default())
        .unwrap();
    let other = ev.new_collision(p1, p2).unwrap();
    let s = ev.collision_mut(other).unwrap().new_step().unwrap();
    let x = ev
        .create_particle(species::up(), Lorentz5Momentum::default())
        .unwrap();
    ev.step_mut(s).unwrap().add_particle(x).unwrap();
    ev.set_colour_line(x, f.l1, false).unwrap();

    let (_, map) = ev.clone_collision(f.collision).unwrap();
    let l1c = map.colour_line(f.l1).unwrap();
    let expected: Vec<ParticleId> = [f.a, f.q1, f.q2]
        .iter()
        .map(|p| map.particle(*p).unwrap())
        .collect();
    assert_eq!(ev.colour_table().line(l1c).unwrap().coloured().to_vec(), expected);
    assert_eq!(ev.colour_line(x, false), Some(f.l1));

    ev.remove_particle(x).unwrap();
    assert!(!ev.colour_table().line(f.l1).unwrap().coloured().contains(&x));
    assert_eq!(ev.colour_table().line(l1c).unwrap().coloured().to_vec(), expected);
}

#[cfg(not(miri))]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn random_cascades_clone_isomorphically(seed in any::<u64>(), steps in 0usize..4) {
            let ev = random_cascade(&CascadeConfig { seed, steps, ..CascadeConfig::default() });
            let (copy, map) = ev.clone_with_map().unwrap();
            assert_isomorphic(&ev, &copy, &map);
        }

        #[test]
        fn fix_colour_flow_is_idempotent(seed in any::<u64>()) {
            let mut ev = random_cascade(&CascadeConfig { seed, ..CascadeConfig::default() });
            let c = ev.primary_collision().unwrap();
            let last = ev.collision(c).unwrap().final_step().unwrap();
            ev.step_mut(last).unwrap().fix_colour_flow().unwrap();
            let lines = ev.colour_table().len();
            let count = ev.particle_count();
            prop_assert_eq!(ev.step_mut(last).unwrap().fix_colour_flow().unwrap(), 0);
            prop_assert_eq!(ev.colour_table().len(), lines);
            prop_assert_eq!(ev.particle_count(), count);
        }

        #[test]
        fn birth_steps_never_change(seed in any::<u64>()) {
            let mut ev = random_cascade(&CascadeConfig { seed, steps: 1, ..CascadeConfig::default() });
            let births: Vec<_> = ev
                .registered_particles()
                .iter()
                .map(|p| (*p, ev.particle(*p).unwrap().birth_step()))
                .collect();
            let c = ev.primary_collision().unwrap();
            let s = ev.collision_mut(c).unwrap().new_step().unwrap();
            let finals: Vec<_> = ev.step(s).unwrap().final_state().iter().copied().collect();
            for p in finals {
                ev.step_mut(s).unwrap().add_particle(p).unwrap();
            }
            for (p, birth) in births {
                prop_assert_eq!(ev.particle(p).unwrap().birth_step(), birth);
            }
        }
    }
}
