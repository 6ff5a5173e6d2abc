//! Conversion of hand-built and random events into vertex graphs.

use evrec_core::{LorentzPoint, ParticleId};
use evrec_export::{
    convert, ExportConfig, ExportError, ExternalEvent, GraphExporter, ParticleStatus,
    ANTI_COLOUR_INDEX, COLOUR_INDEX,
};
use evrec_record::Event;
use evrec_test_utils::cascade::{random_cascade, CascadeConfig};
use evrec_test_utils::{fixtures, species};

fn index(out: &ExternalEvent, ev: &Event, p: ParticleId) -> usize {
    let number = ev.particle(p).unwrap().number();
    out.particle_index(number).unwrap()
}

fn sorted(mut v: Vec<usize>) -> Vec<usize> {
    v.sort_unstable();
    v
}

#[test]
fn hard_process_with_one_decay_gives_three_vertices() {
    let f = fixtures::three_vertex();
    let ev = &f.hard.event;
    let out = convert(ev).unwrap();

    assert_eq!(out.particles.len(), 8);
    assert_eq!(out.vertex_count(), 3);
    assert_eq!(out.vertices.len(), 2);
    // Each particle has a production and an end, except the beams (no
    // production) and the three final particles (no end).
    assert_eq!(out.edge_count(), 2 * 8 - 2 - 3);

    let (b1, b2) = f.hard.beams;
    let (u, ubar) = f.hard.partons;
    let [gamma, z] = [f.hard.outgoing[0], f.hard.outgoing[1]];
    let signal = out.signal_vertex.as_ref().expect("signal vertex");
    assert_eq!(sorted(signal.incoming.clone()), sorted(vec![index(&out, ev, u), index(&out, ev, ubar)]));
    assert_eq!(sorted(signal.outgoing.clone()), sorted(vec![index(&out, ev, gamma), index(&out, ev, z)]));

    let beam_vertex = out
        .vertices
        .iter()
        .find(|v| v.incoming.contains(&index(&out, ev, b1)))
        .expect("beam vertex");
    assert_eq!(sorted(beam_vertex.incoming.clone()), sorted(vec![index(&out, ev, b1), index(&out, ev, b2)]));
    assert_eq!(sorted(beam_vertex.outgoing.clone()), sorted(vec![index(&out, ev, u), index(&out, ev, ubar)]));

    let z_vertex = out
        .vertices
        .iter()
        .find(|v| v.incoming == vec![index(&out, ev, z)])
        .expect("Z decay vertex");
    assert_eq!(
        sorted(z_vertex.outgoing.clone()),
        sorted(vec![index(&out, ev, f.leptons.0), index(&out, ev, f.leptons.1)])
    );

    let status = |p| out.particles[index(&out, ev, p)].status;
    assert_eq!(status(b1), ParticleStatus::Decayed);
    assert_eq!(status(z), ParticleStatus::Decayed);
    assert_eq!(status(gamma), ParticleStatus::Stable);
    assert_eq!(status(f.leptons.1), ParticleStatus::Stable);

    // u and ubar share the hard-process colour line.
    let uf = out.particles[index(&out, ev, u)].flow(COLOUR_INDEX);
    let ubarf = out.particles[index(&out, ev, ubar)].flow(ANTI_COLOUR_INDEX);
    assert_eq!(uf, Some(501));
    assert_eq!(ubarf, uf);
}

#[test]
fn signal_vertex_can_stay_in_the_list() {
    let f = fixtures::three_vertex();
    let exporter = GraphExporter::new(ExportConfig {
        include_signal_vertex: false,
        ..ExportConfig::default()
    })
    .unwrap();
    let out = exporter.convert(&f.hard.event).unwrap();
    assert!(out.signal_vertex.is_none());
    assert_eq!(out.vertices.len(), 3);
    assert_eq!(out.vertex_count(), 3);
}

#[test]
fn dangling_child_aborts_export() {
    let mut f = fixtures::three_vertex();
    let ev = &mut f.hard.event;
    let loose = ev
        .create_particle(species::photon(), evrec_core::Lorentz5Momentum::default())
        .unwrap();
    ev.add_child(f.leptons.0, loose).unwrap();
    let err = convert(ev).unwrap_err();
    assert_eq!(
        err,
        ExportError::DanglingReference {
            from: f.leptons.0,
            to: loose,
        }
    );
}

#[test]
fn colour_flow_ids_follow_lines() {
    let f = fixtures::colour_scenario();
    let ev = &f.event;
    let exporter = GraphExporter::new(ExportConfig {
        colour_flow_offset: 1000,
        ..ExportConfig::default()
    })
    .unwrap();
    let out = exporter.convert(ev).unwrap();
    let flow = |p, side| out.particles[index(&out, ev, p)].flow(side);

    let l1 = flow(f.a, COLOUR_INDEX).expect("a carries colour");
    assert_eq!(flow(f.q1, COLOUR_INDEX), Some(l1));
    assert_eq!(flow(f.q2, COLOUR_INDEX), Some(l1));
    let l2 = flow(f.b, ANTI_COLOUR_INDEX).expect("b carries anti-colour");
    assert_eq!(flow(f.q1bar, ANTI_COLOUR_INDEX), Some(l2));
    let l3 = flow(f.q3, ANTI_COLOUR_INDEX).expect("q3 carries anti-colour");
    let mut ids = vec![l1, l2, l3];
    ids.sort_unstable();
    assert_eq!(ids, vec![1001, 1002, 1003]);
    assert_eq!(flow(f.q3, COLOUR_INDEX), None);
}

#[test]
fn vertex_positions_average_lab_vertices() {
    let mut f = fixtures::three_vertex();
    let ev = &mut f.hard.event;
    ev.collision_mut(f.hard.collision)
        .unwrap()
        .set_vertex(LorentzPoint::new(1.0, 2.0, 3.0, 4.0))
        .unwrap();
    let out = convert(ev).unwrap();
    let b1 = index(&out, ev, f.hard.beams.0);
    let beam_vertex = out.vertices.iter().find(|v| v.incoming.contains(&b1)).unwrap();
    for (got, want) in beam_vertex.position.iter().zip([1.0, 2.0, 3.0, 4.0]) {
        assert!((got - want).abs() < 1e-12, "{got} vs {want}");
    }
}

#[test]
fn copies_become_two_body_vertices() {
    let mut f = fixtures::colour_scenario();
    let ev = &mut f.event;
    let s2 = ev.collision_mut(f.collision).unwrap().new_step().unwrap();
    let q2b = ev.step_mut(s2).unwrap().copy_particle(f.q2).unwrap();
    let out = convert(ev).unwrap();
    let from = index(&out, ev, f.q2);
    let to = index(&out, ev, q2b);
    let v = out.all_vertices().find(|v| v.incoming == vec![from]).unwrap();
    assert_eq!(v.outgoing, vec![to]);
    assert_eq!(out.particles[from].status, ParticleStatus::Decayed);
}

#[test]
fn clones_export_identically() {
    let f = fixtures::three_vertex();
    let copy = f.hard.event.clone();
    let a = convert(&f.hard.event).unwrap();
    let b = convert(&copy).unwrap();
    assert_eq!(a, b);
}

#[cfg(not(miri))]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn random_cascades_export(seed in any::<u64>(), steps in 0usize..4) {
            let ev = random_cascade(&CascadeConfig { seed, steps, ..CascadeConfig::default() });
            let out = convert(&ev).unwrap();
            prop_assert_eq!(out.particles.len(), ev.registered_particles().len());
            // Every particle is attached at least once.
            let mut seen = vec![false; out.particles.len()];
            for v in out.all_vertices() {
                for &i in v.incoming.iter().chain(v.outgoing.iter()) {
                    seen[i] = true;
                }
            }
            prop_assert!(seen.into_iter().all(|s| s));

            let copy = ev.clone();
            let again = convert(&copy).unwrap();
            prop_assert_eq!(out.vertex_count(), again.vertex_count());
            prop_assert_eq!(out.edge_count(), again.edge_count());
        }
    }
}
