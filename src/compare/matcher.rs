use std::collections::VecDeque;

use smallvec::SmallVec;

use crate::geom::PointIndex;
use crate::types::{Tolerance, Vertex};

/// Result of a one-to-one tolerant matching of `source` against `target`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Matching {
    /// Matched `(source, target)` index pairs, in source order.
    pub pairs: Vec<(usize, usize)>,
    /// Source indices without a partner, in traversal order.
    pub unmatched_source: Vec<usize>,
    /// Target indices without a partner, in traversal order.
    pub unmatched_target: Vec<usize>,
}

/// Match every source vertex to at most one target vertex within `tolerance`,
/// each target being used at most once.
///
/// Sources are visited in traversal order and take the nearest free target;
/// distance ties go to the earliest target. Sources left over are then routed
/// through augmenting paths, so the number of pairs is maximal.
pub fn match_one_sided(source: &[Vertex], target: &[Vertex], tolerance: &Tolerance) -> Matching {
    let index = PointIndex::new(target, tolerance.xy());
    Matcher::new(&index, source, *tolerance).run()
}

/// Matching state on target locations. Targets at one location are
/// interchangeable, so sources are assigned to locations and the location's
/// slots are handed out in traversal order at the end.
pub(crate) struct Matcher<'a> {
    index: &'a PointIndex,
    source: &'a [Vertex],
    tolerance: Tolerance,
    slots: Vec<SmallVec<[usize; 2]>>,     // location -> targets open for matching
    assigned: Vec<Option<usize>>,          // source -> location
    holders: Vec<SmallVec<[usize; 2]>>,    // location -> sources assigned to it
    dead: Vec<bool>,                       // locations that can never be freed
    seen_source: Vec<u32>,
    seen_loc: Vec<u32>,
    parent_loc: Vec<usize>,                // location -> source that reached it
    generation: u32,
}

impl<'a> Matcher<'a> {
    /// Every indexed vertex is a target.
    pub(crate) fn new(index: &'a PointIndex, source: &'a [Vertex], tolerance: Tolerance) -> Self {
        let slots = (0..index.location_count())
            .map(|loc| SmallVec::from_slice(index.location(loc).members()))
            .collect();
        Self::with_slots(index, source, tolerance, slots)
    }

    /// Only the targets listed in `slots` (per location, in traversal order) can be matched.
    pub(crate) fn with_slots(
        index: &'a PointIndex,
        source: &'a [Vertex],
        tolerance: Tolerance,
        slots: Vec<SmallVec<[usize; 2]>>,
    ) -> Self {
        let locations = index.location_count();
        Self {
            index,
            source,
            tolerance,
            slots,
            assigned: vec![None; source.len()],
            holders: vec![SmallVec::new(); locations],
            dead: vec![false; locations],
            seen_source: vec![0; source.len()],
            seen_loc: vec![0; locations],
            parent_loc: vec![usize::MAX; locations],
            generation: 0,
        }
    }

    #[inline]
    fn is_full(&self, loc: usize) -> bool {
        self.holders[loc].len() >= self.slots[loc].len()
    }

    fn assign(&mut self, src: usize, loc: usize) {
        if let Some(previous) = self.assigned[src] {
            let holders = &mut self.holders[previous];
            if let Some(pos) = holders.iter().position(|&s| s == src) { holders.remove(pos); }
        }
        self.assigned[src] = Some(loc);
        self.holders[loc].push(src);
    }

    pub(crate) fn run(mut self) -> Matching {
        for src in 0..self.source.len() { self.take_nearest(src) }

        for src in 0..self.source.len() {
            if self.assigned[src].is_none() { self.augment(src); }
        }

        self.into_matching()
    }

    /// Greedy step: nearest free location, ties broken by its next free member.
    fn take_nearest(&mut self, src: usize) {
        let query = self.source[src];
        let best = self.index.neighbors(query, self.tolerance)
            .filter(|&loc| !self.is_full(loc))
            .map(|loc| {
                let next = self.slots[loc][self.holders[loc].len()];
                (self.index.location(loc).vertex().distance_xy_squared(&query), next, loc)
            })
            .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        if let Some((_, _, loc)) = best { self.assign(src, loc) }
    }

    /// Breadth-first search for an augmenting path starting at the unmatched
    /// source `start`. Returns true if `start` was matched.
    fn augment(&mut self, start: usize) -> bool {
        self.generation += 1;
        let generation = self.generation;
        let mut queue = VecDeque::from([start]);
        let mut reached = Vec::new();
        self.seen_source[start] = generation;

        while let Some(src) = queue.pop_front() {
            let candidates = self.index.neighbors(self.source[src], self.tolerance).collect::<SmallVec<[usize; 8]>>();
            for loc in candidates {
                if self.dead[loc] || self.seen_loc[loc] == generation { continue }
                self.seen_loc[loc] = generation;
                self.parent_loc[loc] = src;
                reached.push(loc);

                if !self.is_full(loc) {
                    self.flip_path(loc);
                    return true;
                }

                for &holder in self.holders[loc].iter() {
                    if self.seen_source[holder] != generation {
                        self.seen_source[holder] = generation;
                        queue.push_back(holder);
                    }
                }
            }
        }

        // Nothing reachable from here can be freed by later searches either.
        for loc in reached { self.dead[loc] = true }
        false
    }

    /// Re-route the path ending at the free location `free`.
    fn flip_path(&mut self, free: usize) {
        let mut loc = free;
        loop {
            let src = self.parent_loc[loc];
            let previous = self.assigned[src];
            self.assign(src, loc);
            match previous {
                Some(previous) => loc = previous,
                None => break,
            }
        }
    }

    fn into_matching(self) -> Matching {
        let mut handed_out = vec![0usize; self.index.location_count()];
        let mut matching = Matching::default();

        for (src, assigned) in self.assigned.iter().enumerate() {
            match *assigned {
                Some(loc) => {
                    let target = self.slots[loc][handed_out[loc]];
                    handed_out[loc] += 1;
                    matching.pairs.push((src, target));
                }
                None => matching.unmatched_source.push(src),
            }
        }

        for (loc, &count) in handed_out.iter().enumerate() {
            matching.unmatched_target.extend_from_slice(&self.slots[loc][count..]);
        }
        matching.unmatched_target.sort_unstable();
        matching
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xy(points: &[(f64, f64)]) -> Vec<Vertex> {
        points.iter().map(|&(x, y)| Vertex::xy(x, y)).collect()
    }

    #[test]
    fn identical_sets_match_completely() {
        let vertices = xy(&[(0.0, 0.0), (1.0, 0.0), (1.0, 0.0), (2.0, 2.0)]);
        let tolerance = Tolerance::xy_only(0.0).unwrap();
        let matching = match_one_sided(&vertices, &vertices, &tolerance);
        assert_eq!(matching.pairs, vec![(0, 0), (1, 1), (2, 2), (3, 3)]);
        assert!(matching.unmatched_source.is_empty());
        assert!(matching.unmatched_target.is_empty());
    }

    #[test]
    fn surplus_repeats_stay_unmatched() {
        let source = xy(&[(10.0, 0.0), (20.0, 0.0), (10.0, 0.0), (20.0, 0.0)]);
        let target = xy(&[(10.0, 0.0), (20.0, 0.0)]);
        let tolerance = Tolerance::xy_only(0.01).unwrap();
        let matching = match_one_sided(&source, &target, &tolerance);
        assert_eq!(matching.unmatched_source, vec![2, 3]);
        assert!(matching.unmatched_target.is_empty());
    }

    #[test]
    fn prefers_nearest_target() {
        let source = xy(&[(0.0, 0.0)]);
        let target = xy(&[(0.4, 0.0), (0.1, 0.0), (0.1, 0.0)]);
        let tolerance = Tolerance::xy_only(0.5).unwrap();
        let matching = match_one_sided(&source, &target, &tolerance);
        assert_eq!(matching.pairs, vec![(0, 1)]);
        assert_eq!(matching.unmatched_target, vec![0, 2]);
    }

    #[test]
    fn repair_reroutes_greedy_choice() {
        // Greedy gives the shared target to the first source, which also has a
        // private alternative; the repair pass moves it there.
        let source = xy(&[(0.0, 0.0), (0.9, 0.0)]);
        let target = xy(&[(0.5, 0.0), (-0.8, 0.0)]);
        let tolerance = Tolerance::xy_only(1.0).unwrap();
        let matching = match_one_sided(&source, &target, &tolerance);
        assert!(matching.unmatched_source.is_empty());
        assert_eq!(matching.pairs, vec![(0, 1), (1, 0)]);
    }

    #[test]
    fn z_tolerance_gates_matches() {
        let source = vec![Vertex::new(0.0, 0.0, 10.0), Vertex::new(5.0, 0.0, f64::NAN)];
        let target = vec![Vertex::new(0.0, 0.0, 10.5), Vertex::new(5.0, 0.0, 1.0)];
        let tolerance = Tolerance::new(0.1, 0.1).unwrap();
        let matching = match_one_sided(&source, &target, &tolerance);
        assert_eq!(matching.unmatched_source, vec![0, 1]);
        assert_eq!(matching.unmatched_target, vec![0, 1]);

        let matching = match_one_sided(&source, &target, &tolerance.without_z());
        assert!(matching.unmatched_source.is_empty());
    }

    #[test]
    fn empty_inputs() {
        let tolerance = Tolerance::xy_only(1.0).unwrap();
        let target = xy(&[(0.0, 0.0)]);
        let matching = match_one_sided(&[], &target, &tolerance);
        assert_eq!(matching.unmatched_target, vec![0]);
        let matching = match_one_sided(&target, &[], &tolerance);
        assert_eq!(matching.unmatched_source, vec![0]);
    }

    #[test]
    fn closed_slots_are_never_matched() {
        let target = xy(&[(0.0, 0.0), (0.0, 0.0), (5.0, 0.0)]);
        let source = xy(&[(0.0, 0.0), (0.0, 0.0), (5.0, 0.0)]);
        let tolerance = Tolerance::xy_only(0.1).unwrap();
        let index = PointIndex::new(&target, tolerance.xy());

        let mut slots = vec![SmallVec::new(); index.location_count()];
        slots[index.location_of(1)].push(1);
        let matching = Matcher::with_slots(&index, &source, tolerance, slots).run();
        assert_eq!(matching.pairs, vec![(0, 1)]);
        assert_eq!(matching.unmatched_source, vec![1, 2]);
        assert!(matching.unmatched_target.is_empty());
    }
}
