//! Colour lines and colour-flow queries.
//!
//! A [`ColourLine`] joins the colour side of some particles with the
//! anti-colour side of others. Lines live in the event's
//! [`ColourTable`], which also indexes particle to line per side so the
//! common lookups are O(1). A line with no members left is deleted as
//! soon as its last member detaches.
//!
//! Particles entering a hard process (a collision's incoming pair and
//! the incoming partons of its sub-processes) flow backwards: their
//! colour side plays the role of an outgoing anti-colour. Neighbour
//! queries account for that crossing.

use indexmap::IndexMap;
use smallvec::SmallVec;
use tracing::trace;

use evrec_arena::{Arena, ArenaConfig, ArenaError};
use evrec_core::{ColourLineId, ParticleId};

use crate::error::RecordError;
use crate::event::Event;
use crate::rebind::{Rebind, TranslationMap, Translate};

/// One colour line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColourLine {
    coloured: SmallVec<[ParticleId; 4]>,
    anti_coloured: SmallVec<[ParticleId; 4]>,
}

impl ColourLine {
    /// Particles whose colour side is on this line.
    pub fn coloured(&self) -> &[ParticleId] {
        &self.coloured
    }

    /// Particles whose anti-colour side is on this line.
    pub fn anti_coloured(&self) -> &[ParticleId] {
        &self.anti_coloured
    }

    /// Members on one side.
    pub fn members(&self, anti: bool) -> &[ParticleId] {
        if anti {
            &self.anti_coloured
        } else {
            &self.coloured
        }
    }

    /// Whether the line has no members on either side.
    pub fn is_empty(&self) -> bool {
        self.coloured.is_empty() && self.anti_coloured.is_empty()
    }

    fn retain(&mut self, keep: impl Fn(ParticleId) -> bool) {
        self.coloured.retain(|p| keep(*p));
        self.anti_coloured.retain(|p| keep(*p));
    }

    fn side_mut(&mut self, anti: bool) -> &mut SmallVec<[ParticleId; 4]> {
        if anti {
            &mut self.anti_coloured
        } else {
            &mut self.coloured
        }
    }
}

impl Rebind for ColourLine {
    fn rebind(&mut self, map: &TranslationMap) {
        self.coloured = self.coloured.translate(map);
        self.anti_coloured = self.anti_coloured.translate(map);
    }
}

/// All colour lines of an event plus the particle-to-line index.
///
/// Lines can also carry a 1-based index, handed out on request from a
/// counter that never goes back: an index is not reused after its line
/// is deleted, nor by a copy of the table.
#[derive(Clone, Debug, Default)]
pub struct ColourTable {
    pub(crate) lines: Arena<ColourLineId, ColourLine>,
    colour_of: IndexMap<ParticleId, ColourLineId>,
    anti_colour_of: IndexMap<ParticleId, ColourLineId>,
    line_index: IndexMap<ColourLineId, usize>,
    last_index: usize,
}

impl ColourTable {
    /// An empty table sized by `config`.
    pub fn with_config(config: &ArenaConfig) -> Result<Self, ArenaError> {
        Ok(Self {
            lines: Arena::with_config(config)?,
            colour_of: IndexMap::new(),
            anti_colour_of: IndexMap::new(),
            line_index: IndexMap::new(),
            last_index: 0,
        })
    }

    /// A new line with no members.
    pub fn create_line(&mut self) -> Result<ColourLineId, ArenaError> {
        self.lines.insert(ColourLine::default())
    }

    /// Look up a line.
    pub fn line(&self, id: ColourLineId) -> Option<&ColourLine> {
        self.lines.get(id)
    }

    /// Line carrying one side of `p`.
    pub fn line_of(&self, p: ParticleId, anti: bool) -> Option<ColourLineId> {
        self.index(anti).get(&p).copied()
    }

    /// Put one side of `p` on `line`, detaching it from any previous line
    /// on that side.
    pub fn attach(
        &mut self,
        p: ParticleId,
        line: ColourLineId,
        anti: bool,
    ) -> Result<(), RecordError> {
        if !self.lines.contains(line) {
            return Err(RecordError::UnknownColourLine { line });
        }
        if self.line_of(p, anti) == Some(line) {
            return Ok(());
        }
        self.detach(p, anti);
        if let Some(l) = self.lines.get_mut(line) {
            l.side_mut(anti).push(p);
        }
        self.index_mut(anti).insert(p, line);
        Ok(())
    }

    /// Take one side of `p` off its line. Returns the line it was on.
    pub fn detach(&mut self, p: ParticleId, anti: bool) -> Option<ColourLineId> {
        let line = self.index_mut(anti).shift_remove(&p)?;
        if let Some(l) = self.lines.get_mut(line) {
            l.side_mut(anti).retain(|x| *x != p);
            if l.is_empty() {
                trace!(%line, "removing orphaned colour line");
                self.delete_line(line);
            }
        }
        Some(line)
    }

    /// Take both sides of `p` off their lines.
    pub fn detach_all(&mut self, p: ParticleId) {
        self.detach(p, false);
        self.detach(p, true);
    }

    /// Move every member of `absorb` onto `keep` and delete `absorb`.
    pub fn join(&mut self, keep: ColourLineId, absorb: ColourLineId) -> Result<(), RecordError> {
        if keep == absorb {
            return Ok(());
        }
        if !self.lines.contains(keep) {
            return Err(RecordError::UnknownColourLine { line: keep });
        }
        let Some(old) = self.delete_line(absorb) else {
            return Err(RecordError::UnknownColourLine { line: absorb });
        };
        for anti in [false, true] {
            for p in old.members(anti).iter().copied() {
                self.index_mut(anti).insert(p, keep);
                if let Some(l) = self.lines.get_mut(keep) {
                    l.side_mut(anti).push(p);
                }
            }
        }
        Ok(())
    }

    /// Number of live lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether there are no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (ColourLineId, &ColourLine)> + '_ {
        self.lines.iter()
    }

    /// Stable 1-based index of `line`, assigned on first request.
    pub fn line_index(&mut self, line: ColourLineId) -> Option<usize> {
        if !self.lines.contains(line) {
            return None;
        }
        if let Some(i) = self.line_index.get(&line) {
            return Some(*i);
        }
        self.last_index += 1;
        self.line_index.insert(line, self.last_index);
        Some(self.last_index)
    }

    /// Index of `line` if one has been assigned.
    pub fn assigned_index(&self, line: ColourLineId) -> Option<usize> {
        self.line_index.get(&line).copied()
    }

    /// Drop the members of a copied `line` that fail `keep` and index the
    /// rest, overwriting any previous entry. Used after a rebind.
    pub(crate) fn adopt_line(&mut self, line: ColourLineId, keep: impl Fn(ParticleId) -> bool) {
        let Some(l) = self.lines.get_mut(line) else {
            return;
        };
        l.retain(&keep);
        if l.is_empty() {
            self.delete_line(line);
            return;
        }
        let coloured: Vec<_> = l.coloured.to_vec();
        let anti: Vec<_> = l.anti_coloured.to_vec();
        for p in coloured {
            self.colour_of.insert(p, line);
        }
        for p in anti {
            self.anti_colour_of.insert(p, line);
        }
    }

    /// Carry the assigned index of `from` (a line of `source`) over to
    /// `to` in this table.
    pub(crate) fn inherit_index(
        &mut self,
        source: &ColourTable,
        from: ColourLineId,
        to: ColourLineId,
    ) {
        if let Some(i) = source.assigned_index(from) {
            self.line_index.insert(to, i);
        }
    }

    /// Table with the same line layout and index counter, every line
    /// vacant, and no particle or line index.
    pub(crate) fn vacant_successor(&self) -> Self {
        Self {
            lines: self.lines.vacant_successor(),
            colour_of: IndexMap::new(),
            anti_colour_of: IndexMap::new(),
            line_index: IndexMap::new(),
            last_index: self.last_index,
        }
    }

    fn delete_line(&mut self, line: ColourLineId) -> Option<ColourLine> {
        self.line_index.shift_remove(&line);
        self.lines.remove(line)
    }

    fn index(&self, anti: bool) -> &IndexMap<ParticleId, ColourLineId> {
        if anti {
            &self.anti_colour_of
        } else {
            &self.colour_of
        }
    }

    fn index_mut(&mut self, anti: bool) -> &mut IndexMap<ParticleId, ColourLineId> {
        if anti {
            &mut self.anti_colour_of
        } else {
            &mut self.colour_of
        }
    }
}

impl Event {
    /// The colour table.
    pub fn colour_table(&self) -> &ColourTable {
        &self.colour
    }

    /// Line carrying the colour (`anti == false`) or anti-colour side of
    /// `p`.
    pub fn colour_line(&self, p: ParticleId, anti: bool) -> Option<ColourLineId> {
        self.colour.line_of(p, anti)
    }

    /// Line carrying one side of `p`, creating a fresh one if the species
    /// carries that side and none is attached yet.
    pub fn colour_line_or_create(
        &mut self,
        p: ParticleId,
        anti: bool,
    ) -> Result<ColourLineId, RecordError> {
        let has_side = self.particle_ref(p)?.data().colour.has_side(anti);
        if let Some(line) = self.colour.line_of(p, anti) {
            return Ok(line);
        }
        if !has_side {
            return Err(RecordError::Colourless { particle: p, anti });
        }
        let line = self.colour.create_line()?;
        self.colour.attach(p, line, anti)?;
        Ok(line)
    }

    /// Put one side of `p` on `line`.
    pub fn set_colour_line(
        &mut self,
        p: ParticleId,
        line: ColourLineId,
        anti: bool,
    ) -> Result<(), RecordError> {
        self.require_particle(p)?;
        self.colour.attach(p, line, anti)
    }

    /// Take one side of `p` off its line.
    pub fn remove_colour_line(&mut self, p: ParticleId, anti: bool) -> Option<ColourLineId> {
        self.colour.detach(p, anti)
    }

    /// A fresh, empty colour line.
    pub fn new_colour_line(&mut self) -> Result<ColourLineId, RecordError> {
        Ok(self.colour.create_line()?)
    }

    /// Connect the colour side of `p` to the anti-colour side of
    /// `neighbour` (or, with `anti`, the anti-colour of `p` to the colour
    /// of `neighbour`), creating the line if `p` has none.
    pub fn colour_connect(
        &mut self,
        p: ParticleId,
        neighbour: ParticleId,
        anti: bool,
    ) -> Result<ColourLineId, RecordError> {
        self.require_particle(neighbour)?;
        let line = self.colour_line_or_create(p, anti)?;
        self.colour.attach(neighbour, line, !anti)?;
        Ok(line)
    }

    /// Parent (or earlier instance) of `p` sharing its line on the same
    /// side.
    pub fn incoming_colour(&self, p: ParticleId, anti: bool) -> Option<ParticleId> {
        let line = self.colour.line_of(p, anti)?;
        let x = self.particles.get(p)?;
        x.parents
            .iter()
            .copied()
            .chain(x.previous)
            .find(|q| self.colour.line_of(*q, anti) == Some(line))
    }

    /// Child (or later instance) of `p` sharing its line on the same side.
    pub fn outgoing_colour(&self, p: ParticleId, anti: bool) -> Option<ParticleId> {
        let line = self.colour.line_of(p, anti)?;
        let x = self.particles.get(p)?;
        x.children
            .iter()
            .copied()
            .chain(x.next)
            .find(|q| self.colour.line_of(*q, anti) == Some(line))
    }

    /// Colour partner of `p` among the particles of its birth step.
    ///
    /// The partner is on the same line as the given side of `p` with the
    /// opposite effective orientation, where incoming particles count
    /// with their sides swapped. The first such particle in step order is
    /// returned.
    pub fn colour_neighbour(&self, p: ParticleId, anti: bool) -> Option<ParticleId> {
        let step = self.particles.get(p)?.birth_step?;
        let candidates = self.steps.get(step)?.all.iter().copied();
        self.colour_neighbour_among(p, anti, candidates)
    }

    pub(crate) fn colour_neighbour_among(
        &self,
        p: ParticleId,
        anti: bool,
        candidates: impl Iterator<Item = ParticleId>,
    ) -> Option<ParticleId> {
        let line = self.colour.line_of(p, anti)?;
        let orientation = anti != self.is_incoming_role(p);
        for c in candidates {
            if c == p {
                continue;
            }
            let crossed = self.is_incoming_role(c);
            for side in [false, true] {
                if self.colour.line_of(c, side) == Some(line) && (side != crossed) != orientation {
                    return Some(c);
                }
            }
        }
        None
    }

    /// Whether `p` enters a hard interaction: one of its collision's
    /// incoming pair, or an incoming parton of one of its sub-processes.
    pub fn is_incoming_role(&self, p: ParticleId) -> bool {
        let Some(cid) = self.collision_of(p) else {
            return false;
        };
        let Some(col) = self.collisions.get(cid) else {
            return false;
        };
        if col.incoming.0 == p || col.incoming.1 == p {
            return true;
        }
        col.sub_processes.iter().any(|sp| {
            self.sub_processes
                .get(*sp)
                .is_some_and(|s| s.incoming.0 == Some(p) || s.incoming.1 == Some(p))
        })
    }

    /// Stable 1-based index of a colour line, assigned on first request.
    ///
    /// Indices survive cloning and are never handed out twice, even after
    /// the line that held one is deleted.
    pub fn colour_line_index(&mut self, line: ColourLineId) -> Option<usize> {
        self.colour.line_index(line)
    }

    /// Colour handling for a decay: the parent's colour goes to the first
    /// coloured child without a line, its anti-colour to the last
    /// anti-coloured child without one, unless a child already carries
    /// them. Sides still open afterwards get fresh lines.
    pub(crate) fn assign_decay_colour(
        &mut self,
        parent: ParticleId,
        children: &[ParticleId],
    ) -> Result<(), RecordError> {
        for anti in [false, true] {
            let Some(line) = self.colour.line_of(parent, anti) else {
                continue;
            };
            if self.outgoing_colour(parent, anti).is_some() {
                continue;
            }
            let open = |c: &&ParticleId| {
                self.particles
                    .get(**c)
                    .is_some_and(|x| x.data().colour.has_side(anti))
                    && self.colour.line_of(**c, anti).is_none()
            };
            let pick = if anti {
                children.iter().rev().find(open)
            } else {
                children.iter().find(open)
            };
            if let Some(c) = pick.copied() {
                trace!(%parent, child = %c, anti, "colour passed to decay product");
                self.colour.attach(c, line, anti)?;
            }
        }
        for c in children.iter().copied() {
            for anti in [false, true] {
                let needs = self
                    .particles
                    .get(c)
                    .is_some_and(|x| x.data().colour.has_side(anti))
                    && self.colour.line_of(c, anti).is_none();
                if needs {
                    let line = self.colour.create_line()?;
                    self.colour.attach(c, line, anti)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(i: u32) -> ParticleId {
        ParticleId::from_raw(i, 0)
    }

    #[test]
    fn attach_moves_between_lines() {
        let mut t = ColourTable::default();
        let l1 = t.create_line().unwrap();
        let l2 = t.create_line().unwrap();
        t.attach(p(0), l1, false).unwrap();
        t.attach(p(1), l1, true).unwrap();
        t.attach(p(0), l2, false).unwrap();
        assert_eq!(t.line_of(p(0), false), Some(l2));
        assert_eq!(t.line(l1).unwrap().coloured(), &[] as &[ParticleId]);
        assert_eq!(t.line(l1).unwrap().anti_coloured(), &[p(1)]);
    }

    #[test]
    fn last_detach_deletes_line() {
        let mut t = ColourTable::default();
        let l = t.create_line().unwrap();
        t.attach(p(0), l, false).unwrap();
        t.attach(p(1), l, true).unwrap();
        t.detach(p(0), false);
        assert!(t.line(l).is_some());
        t.detach_all(p(1));
        assert!(t.line(l).is_none());
        assert!(t.is_empty());
    }

    #[test]
    fn join_reindexes_members() {
        let mut t = ColourTable::default();
        let a = t.create_line().unwrap();
        let b = t.create_line().unwrap();
        t.attach(p(0), a, false).unwrap();
        t.attach(p(1), b, true).unwrap();
        t.join(a, b).unwrap();
        assert_eq!(t.line_of(p(1), true), Some(a));
        assert!(t.line(b).is_none());
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn attach_to_unknown_line_fails() {
        let mut t = ColourTable::default();
        let l = t.create_line().unwrap();
        t.attach(p(0), l, false).unwrap();
        t.detach(p(0), false);
        assert!(matches!(
            t.attach(p(0), l, false),
            Err(RecordError::UnknownColourLine { .. })
        ));
    }

    #[test]
    fn line_index_is_never_reused() {
        let mut t = ColourTable::default();
        let a = t.create_line().unwrap();
        let b = t.create_line().unwrap();
        t.attach(p(0), a, false).unwrap();
        t.attach(p(1), b, false).unwrap();
        assert_eq!(t.line_index(a), Some(1));
        assert_eq!(t.line_index(b), Some(2));
        assert_eq!(t.line_index(a), Some(1));
        t.detach(p(0), false);
        assert_eq!(t.assigned_index(a), None);
        let c = t.create_line().unwrap();
        assert_eq!(t.line_index(c), Some(3));
        assert_eq!(t.line_index(a), None);
    }

    #[test]
    fn join_drops_index_of_absorbed_line() {
        let mut t = ColourTable::default();
        let a = t.create_line().unwrap();
        let b = t.create_line().unwrap();
        t.attach(p(0), a, false).unwrap();
        t.attach(p(1), b, true).unwrap();
        t.line_index(a);
        t.line_index(b);
        t.join(a, b).unwrap();
        assert_eq!(t.assigned_index(a), Some(1));
        assert_eq!(t.assigned_index(b), None);
        let c = t.create_line().unwrap();
        assert_eq!(t.line_index(c), Some(3));
    }

    #[test]
    fn adopt_line_drops_foreign_members() {
        let mut t = ColourTable::default();
        let l = t.create_line().unwrap();
        t.lines.get_mut(l).unwrap().coloured.extend([p(0), p(5)]);
        t.lines.get_mut(l).unwrap().anti_coloured.push(p(6));
        t.adopt_line(l, |x| x == p(0));
        assert_eq!(t.line(l).unwrap().coloured(), &[p(0)]);
        assert!(t.line(l).unwrap().anti_coloured().is_empty());
        assert_eq!(t.line_of(p(0), false), Some(l));
        assert_eq!(t.line_of(p(5), false), None);

        let orphan = t.create_line().unwrap();
        t.lines.get_mut(orphan).unwrap().coloured.push(p(7));
        t.adopt_line(orphan, |_| false);
        assert!(t.line(orphan).is_none());
    }

    #[test]
    fn rebind_line_members() {
        let mut map = TranslationMap::new();
        map.insert_particle(p(0), ParticleId::from_raw(0, 1));
        let mut line = ColourLine::default();
        line.coloured.push(p(0));
        line.anti_coloured.push(p(3));
        line.rebind(&map);
        assert_eq!(line.coloured(), &[ParticleId::from_raw(0, 1)]);
        assert_eq!(line.anti_coloured(), &[p(3)]);
    }
}
