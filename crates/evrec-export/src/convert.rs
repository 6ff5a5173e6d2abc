//! Event-to-graph conversion.
//!
//! Conversion runs in three phases over a finished [`Event`]:
//!
//! 1. **Flatten** every particle of every collision into one ordered list
//!    of [`ExternalParticle`]s, assigning colour-flow ids per colour line
//!    in first-encounter order.
//! 2. **Build** temporary vertices: one decay vertex per particle with
//!    children or a later instance, one production vertex per particle
//!    with parents, an earlier instance, or no relations at all. Each
//!    parent-to-child and previous-to-next edge then merges the child's
//!    production vertex into the parent's decay vertex.
//! 3. **Emit** one [`ExternalVertex`] per surviving temporary vertex,
//!    positioned at the average of its members' lab-frame vertices, with
//!    the primary sub-process vertex split out as the signal vertex.
//!
//! A relation pointing outside the flattened set aborts the conversion.

use indexmap::{IndexMap, IndexSet};
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use evrec_core::{ColourLineId, LorentzPoint, ParticleId};
use evrec_record::{AllParticles, Event, Particle, RecordError};

use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::types::{
    ExternalEvent, ExternalParticle, ExternalVertex, ParticleStatus, ANTI_COLOUR_INDEX,
    COLOUR_INDEX,
};

/// Converts events into [`ExternalEvent`] graphs.
#[derive(Clone, Debug, Default)]
pub struct GraphExporter {
    config: ExportConfig,
}

/// Convert with the default configuration.
pub fn convert(event: &Event) -> Result<ExternalEvent, ExportError> {
    GraphExporter::default().convert(event)
}

impl GraphExporter {
    /// Validate `config` and build an exporter.
    pub fn new(config: ExportConfig) -> Result<Self, ExportError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The active configuration.
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Convert `event`. Nothing is returned if any relation dangles.
    pub fn convert(&self, event: &Event) -> Result<ExternalEvent, ExportError> {
        let flat = self.flatten(event)?;
        let graph = VertexGraph::build(event, &flat.ids)?;
        let signal = self.signal_slot(event, &flat.ids, &graph)?;

        let mut signal_vertex = None;
        let mut vertices = Vec::new();
        for (slot, v) in graph.vertices.iter().enumerate() {
            if v.merged {
                continue;
            }
            let ext = self.emit_vertex(event, &flat.ids, v)?;
            if Some(slot) == signal {
                signal_vertex = Some(ext);
            } else {
                vertices.push(ext);
            }
        }

        let e = self.config.energy_unit.factor();
        let out = ExternalEvent {
            event_number: event.number(),
            weight: event.weight(),
            optional_weights: event.optional_weights().clone(),
            scale: event.scale().map(|s| s * e),
            alpha_s: event.alpha_s(),
            alpha_em: event.alpha_em(),
            energy_unit: self.config.energy_unit,
            length_unit: self.config.length_unit,
            particles: flat.particles,
            signal_vertex,
            vertices,
        };
        debug!(
            event = out.event_number,
            particles = out.particles.len(),
            vertices = out.vertex_count(),
            signal = out.signal_vertex.is_some(),
            "exported event"
        );
        Ok(out)
    }

    fn flatten(&self, event: &Event) -> Result<Flattened, ExportError> {
        let ids: IndexSet<ParticleId> = event.select(&AllParticles).into_iter().collect();
        let e = self.config.energy_unit.factor();
        let mut flows: IndexMap<ColourLineId, i32> = IndexMap::new();
        let mut particles = Vec::with_capacity(ids.len());
        for &id in &ids {
            let p = lookup(event, id)?;
            let mut colour_flow = SmallVec::new();
            for (index, anti) in [(COLOUR_INDEX, false), (ANTI_COLOUR_INDEX, true)] {
                if let Some(line) = event.colour_line(id, anti) {
                    colour_flow.push((index, self.flow_id(&mut flows, line)?));
                }
            }
            let m = p.momentum();
            particles.push(ExternalParticle {
                number: p.number(),
                pdg_id: p.id(),
                momentum: [m.px * e, m.py * e, m.pz * e, m.e * e],
                generated_mass: m.mass * e,
                status: if p.is_final() {
                    ParticleStatus::Stable
                } else {
                    ParticleStatus::Decayed
                },
                colour_flow,
                polarization: p.spin().and_then(|s| s.polarization),
            });
        }
        Ok(Flattened { ids, particles })
    }

    fn flow_id(
        &self,
        flows: &mut IndexMap<ColourLineId, i32>,
        line: ColourLineId,
    ) -> Result<i32, ExportError> {
        if let Some(id) = flows.get(&line) {
            return Ok(*id);
        }
        let id = i32::try_from(flows.len() + 1)
            .ok()
            .and_then(|n| self.config.colour_flow_offset.checked_add(n))
            .ok_or_else(|| ExportError::InvalidConfig {
                reason: format!(
                    "colour flow ids overflow above offset {}",
                    self.config.colour_flow_offset
                ),
            })?;
        flows.insert(line, id);
        Ok(id)
    }

    /// Temporary vertex holding the decay of the primary sub-process's
    /// first incoming parton.
    fn signal_slot(
        &self,
        event: &Event,
        ids: &IndexSet<ParticleId>,
        graph: &VertexGraph,
    ) -> Result<Option<usize>, ExportError> {
        if !self.config.include_signal_vertex {
            return Ok(None);
        }
        let Some(sp) = event.primary_sub_process() else {
            if event.primary_collision().is_some() {
                warn!("primary collision has no sub-process; no signal vertex");
            }
            return Ok(None);
        };
        let incoming = event
            .sub_process(sp)
            .ok_or(RecordError::UnknownSubProcess { sub_process: sp })?
            .incoming();
        let Some(parton) = incoming.0.or(incoming.1) else {
            return Ok(None);
        };
        let index = ids
            .get_index_of(&parton)
            .ok_or(ExportError::MissingVertex { particle: parton })?;
        let slot = graph.decay[index];
        if slot.is_none() {
            debug!(%parton, "incoming parton has not interacted; no signal vertex");
        }
        Ok(slot)
    }

    fn emit_vertex(
        &self,
        event: &Event,
        ids: &IndexSet<ParticleId>,
        v: &TempVertex,
    ) -> Result<ExternalVertex, ExportError> {
        let mut sum = LorentzPoint::origin();
        for &i in &v.incoming {
            let id = ids[i];
            sum += event
                .lab_decay_vertex(id)
                .ok_or(RecordError::UnknownParticle { particle: id })?;
        }
        for &i in &v.outgoing {
            let id = ids[i];
            sum += event
                .lab_vertex(id)
                .ok_or(RecordError::UnknownParticle { particle: id })?;
        }
        let n = v.incoming.len() + v.outgoing.len();
        let position = if n == 0 {
            [0.0; 4]
        } else {
            sum.scale(self.config.length_unit.factor() / n as f64)
                .to_array()
        };
        Ok(ExternalVertex {
            position,
            incoming: v.incoming.clone(),
            outgoing: v.outgoing.clone(),
        })
    }
}

fn lookup(event: &Event, id: ParticleId) -> Result<&Particle, ExportError> {
    event
        .particle(id)
        .ok_or(ExportError::Record(RecordError::UnknownParticle { particle: id }))
}

struct Flattened {
    ids: IndexSet<ParticleId>,
    particles: Vec<ExternalParticle>,
}

#[derive(Debug, Default)]
struct TempVertex {
    incoming: Vec<usize>,
    outgoing: Vec<usize>,
    merged: bool,
}

/// Partition of particle ends into interaction vertices.
///
/// `decay[i]` and `production[i]` name the vertex slot currently holding
/// particle `i` as incoming and outgoing member respectively.
#[derive(Debug)]
struct VertexGraph {
    vertices: Vec<TempVertex>,
    decay: Vec<Option<usize>>,
    production: Vec<Option<usize>>,
}

impl VertexGraph {
    fn build(event: &Event, ids: &IndexSet<ParticleId>) -> Result<Self, ExportError> {
        let mut graph = Self {
            vertices: Vec::new(),
            decay: vec![None; ids.len()],
            production: vec![None; ids.len()],
        };
        for (i, &id) in ids.iter().enumerate() {
            let p = lookup(event, id)?;
            let has_out = !p.is_final();
            let has_in = !p.parents().is_empty() || p.previous().is_some();
            if has_out {
                graph.decay[i] = Some(graph.push(TempVertex {
                    incoming: vec![i],
                    ..TempVertex::default()
                }));
            }
            if has_in || !has_out {
                graph.production[i] = Some(graph.push(TempVertex {
                    outgoing: vec![i],
                    ..TempVertex::default()
                }));
            }
        }
        for (i, &id) in ids.iter().enumerate() {
            let p = lookup(event, id)?;
            for &parent in p.parents().iter().chain(p.previous().iter()) {
                if !ids.contains(&parent) {
                    return Err(ExportError::DanglingReference {
                        from: id,
                        to: parent,
                    });
                }
            }
            for &child in p.children().iter().chain(p.next().iter()) {
                let j = ids
                    .get_index_of(&child)
                    .ok_or(ExportError::DanglingReference { from: id, to: child })?;
                let into = graph.decay[i].ok_or(ExportError::MissingVertex { particle: id })?;
                let from = graph.production[j].ok_or(ExportError::MissingVertex { particle: child })?;
                graph.merge(from, into);
            }
        }
        Ok(graph)
    }

    fn push(&mut self, v: TempVertex) -> usize {
        self.vertices.push(v);
        self.vertices.len() - 1
    }

    /// Move every member of `from` into `into`.
    fn merge(&mut self, from: usize, into: usize) {
        if from == into {
            return;
        }
        let moved = std::mem::take(&mut self.vertices[from]);
        self.vertices[from].merged = true;
        for &k in &moved.incoming {
            self.decay[k] = Some(into);
        }
        for &k in &moved.outgoing {
            self.production[k] = Some(into);
        }
        trace!(
            from,
            into,
            members = moved.incoming.len() + moved.outgoing.len(),
            "merged vertices"
        );
        let target = &mut self.vertices[into];
        target.incoming.extend(moved.incoming);
        target.outgoing.extend(moved.outgoing);
    }
}
