//! Plain-text listing of an exported event.

use std::fmt;

use crate::types::{ExternalEvent, ExternalParticle, ExternalVertex, ANTI_COLOUR_INDEX, COLOUR_INDEX};

fn flow_cell(p: &ExternalParticle, index: u8) -> String {
    p.flow(index).map_or_else(|| "-".to_string(), |id| id.to_string())
}

fn write_vertex(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    v: &ExternalVertex,
    ev: &ExternalEvent,
) -> fmt::Result {
    let [x, y, z, t] = v.position;
    writeln!(f, "{label} ({x:.4e}, {y:.4e}, {z:.4e}, {t:.4e})")?;
    for (arrow, members) in [("in ", &v.incoming), ("out", &v.outgoing)] {
        for &i in members {
            if let Some(p) = ev.particles.get(i) {
                let [px, py, pz, e] = p.momentum;
                writeln!(
                    f,
                    "  {arrow} {:>5} {:>8} {:>2} {:>5} {:>5} {px:>11.4e} {py:>11.4e} {pz:>11.4e} {e:>11.4e}",
                    p.number,
                    p.pdg_id,
                    p.status.code(),
                    flow_cell(p, COLOUR_INDEX),
                    flow_cell(p, ANTI_COLOUR_INDEX),
                )?;
            }
        }
    }
    Ok(())
}

impl fmt::Display for ExternalEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "event {} weight {} units {} {} particles {} vertices {}",
            self.event_number,
            self.weight,
            self.energy_unit,
            self.length_unit,
            self.particles.len(),
            self.vertex_count()
        )?;
        for (name, w) in &self.optional_weights {
            writeln!(f, "weight {name} = {w}")?;
        }
        if let Some(v) = &self.signal_vertex {
            write_vertex(f, "signal", v, self)?;
        }
        for (i, v) in self.vertices.iter().enumerate() {
            write_vertex(f, &format!("vertex {}", i + 1), v, self)?;
        }
        Ok(())
    }
}
