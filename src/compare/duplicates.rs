use crate::geom::PointIndex;
use crate::types::{Tolerance, Vertex};

/// Partition of a vertex list into groups of mutually coincident vertices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroups {
    group_of: Vec<usize>,
    representatives: Vec<usize>,
}

impl DuplicateGroups {
    /// Group id of vertex `index`. Ids follow the order of first occurrence.
    #[inline] pub fn group_of(&self, index: usize) -> usize { self.group_of[index] }

    #[inline] pub fn group_count(&self) -> usize { self.representatives.len() }

    /// First member of every group, in traversal order.
    #[inline] pub fn representatives(&self) -> &[usize] { &self.representatives }

    #[inline]
    pub fn is_representative(&self, index: usize) -> bool {
        self.representatives[self.group_of[index]] == index
    }

    /// Number of vertices that repeat an earlier member of their group.
    #[inline] pub fn duplicate_count(&self) -> usize { self.group_of.len() - self.representatives.len() }
}

/// Group `vertices` by chained proximity: two vertices are in the same group
/// if they are connected through vertices that pairwise match within `tolerance`.
pub fn find_duplicates(vertices: &[Vertex], tolerance: &Tolerance) -> DuplicateGroups {
    group_duplicates(&PointIndex::new(vertices, tolerance.xy()), tolerance)
}

pub(crate) fn group_duplicates(index: &PointIndex, tolerance: &Tolerance) -> DuplicateGroups {
    const UNSET: usize = usize::MAX;
    let mut group_of_loc = vec![UNSET; index.location_count()];
    let mut representatives = Vec::new();
    let mut stack = Vec::new();

    let group_of = (0..index.len())
        .map(|i| {
            let start = index.location_of(i);
            if group_of_loc[start] == UNSET {
                let group = representatives.len();
                representatives.push(i);
                group_of_loc[start] = group;
                stack.push(start);
                while let Some(loc) = stack.pop() {
                    for next in index.neighbors(*index.location(loc).vertex(), *tolerance) {
                        if group_of_loc[next] == UNSET {
                            group_of_loc[next] = group;
                            stack.push(next);
                        }
                    }
                }
            }
            group_of_loc[start]
        })
        .collect();

    DuplicateGroups { group_of, representatives }
}
