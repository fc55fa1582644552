#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Steepest-descent path planning over breadth-first distance fields.

use blast_arena_core::{ArenaView, CellCoord, Direction, HazardTolerance};
use blast_arena_world::navigation::DistanceField;

/// Longest path, in cells, the planner produces before giving up.
pub const MAX_PATH_LENGTH: usize = 1000;

/// Neighbour order examined at every descent step. The first strictly
/// smaller value wins, so this order also breaks ties.
const DESCENT_ORDER: [Direction; 4] = [
    Direction::Up,
    Direction::Down,
    Direction::Right,
    Direction::Left,
];

/// Stack of cells leading from an origin to a target.
///
/// The target sits at the bottom and the step adjacent to the origin on top.
/// The origin itself is never part of the path. An empty path means the
/// target cannot be reached.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Path {
    steps: Vec<CellCoord>,
}

impl Path {
    /// Path signalling that no route exists.
    #[must_use]
    pub const fn empty() -> Self {
        Self { steps: Vec::new() }
    }

    /// Reports whether the path holds no route.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of cells left on the path, target included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Cell to move onto next.
    #[must_use]
    pub fn next_step(&self) -> Option<CellCoord> {
        self.steps.last().copied()
    }

    /// Removes and returns the cell to move onto next.
    pub fn pop_step(&mut self) -> Option<CellCoord> {
        self.steps.pop()
    }

    /// Final cell of the path.
    #[must_use]
    pub fn target(&self) -> Option<CellCoord> {
        self.steps.first().copied()
    }

    /// Iterates the cells in walking order, nearest step first.
    pub fn iter_from_origin(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.steps.iter().rev().copied()
    }

    /// Consumes the path, yielding the cells in walking order.
    #[must_use]
    pub fn into_vec(self) -> Vec<CellCoord> {
        let mut steps = self.steps;
        steps.reverse();
        steps
    }
}

/// Walks down `field` from `target` until it reaches `origin`.
///
/// `field` must be seeded at `origin`. Each step moves the cursor towards the
/// neighbour holding the strictly smallest distance below the unreachable
/// sentinel. The walk fails with an empty path when no neighbour qualifies or
/// when the path grows beyond [`MAX_PATH_LENGTH`] cells without arriving.
#[must_use]
pub fn descend(field: &DistanceField, origin: CellCoord, target: CellCoord) -> Path {
    if field.distance(origin).is_none() || field.distance(target).is_none() {
        return Path::empty();
    }

    let mut steps = vec![target];
    if origin == target {
        return Path { steps };
    }

    let infinity = field.infinity();
    let mut cursor = target;

    loop {
        let mut best = infinity;
        let mut chosen = None;
        for direction in DESCENT_ORDER {
            let Some(value) = cursor.step(direction).and_then(|cell| field.distance(cell)) else {
                continue;
            };
            if value < best {
                best = value;
                chosen = Some(direction);
            }
        }

        let Some(next) = chosen.and_then(|direction| cursor.step(direction)) else {
            tracing::debug!(?origin, ?target, "no descending neighbour");
            return Path::empty();
        };
        if next == cursor {
            return Path::empty();
        }

        cursor = next;
        if cursor == origin {
            tracing::trace!(?origin, ?target, length = steps.len(), "path planned");
            return Path { steps };
        }
        steps.push(cursor);
        if steps.len() > MAX_PATH_LENGTH {
            tracing::warn!(?origin, ?target, "path length cap reached");
            return Path::empty();
        }
    }
}

/// Reusable planner that keeps its distance-field workspace between queries.
#[derive(Clone, Debug, Default)]
pub struct PathPlanner {
    field: DistanceField,
}

impl PathPlanner {
    /// Plans a path from `origin` to `target` over cells admitted by
    /// `tolerance`.
    pub fn plan(
        &mut self,
        view: ArenaView<'_>,
        origin: CellCoord,
        target: CellCoord,
        tolerance: HazardTolerance,
    ) -> Path {
        self.field
            .rebuild_with(view.width(), view.height(), origin, |cell| {
                !view.is_traversable(cell) || !tolerance.admits(view.danger_level(cell))
            });
        descend(&self.field, origin, target)
    }

    /// Distance field computed by the most recent query.
    #[must_use]
    pub fn last_field(&self) -> &DistanceField {
        &self.field
    }
}

/// Plans a path from `origin` to `target` over cells admitted by `tolerance`.
#[must_use]
pub fn plan_path(
    view: ArenaView<'_>,
    origin: CellCoord,
    target: CellCoord,
    tolerance: HazardTolerance,
) -> Path {
    PathPlanner::default().plan(view, origin, target, tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use blast_arena_core::{DangerLevel, Tile};

    fn field_from(width: u32, height: u32, source: CellCoord, walls: &[CellCoord]) -> DistanceField {
        let mut field = DistanceField::default();
        field.rebuild_with(width, height, source, |cell| walls.contains(&cell));
        field
    }

    #[test]
    fn path_stack_exposes_the_nearest_step_first() {
        let field = field_from(4, 1, CellCoord::new(0, 0), &[]);
        let mut path = descend(&field, CellCoord::new(0, 0), CellCoord::new(3, 0));

        assert_eq!(path.len(), 3);
        assert_eq!(path.target(), Some(CellCoord::new(3, 0)));
        assert_eq!(path.next_step(), Some(CellCoord::new(1, 0)));
        assert_eq!(
            path.iter_from_origin().collect::<Vec<_>>(),
            vec![
                CellCoord::new(1, 0),
                CellCoord::new(2, 0),
                CellCoord::new(3, 0),
            ]
        );
        assert_eq!(path.pop_step(), Some(CellCoord::new(1, 0)));
        assert_eq!(path.next_step(), Some(CellCoord::new(2, 0)));
    }

    #[test]
    fn origin_equal_to_target_yields_the_target_alone() {
        let field = field_from(3, 3, CellCoord::new(1, 1), &[]);
        let path = descend(&field, CellCoord::new(1, 1), CellCoord::new(1, 1));
        assert_eq!(path.into_vec(), vec![CellCoord::new(1, 1)]);
    }

    #[test]
    fn ties_prefer_up_then_down_then_right_then_left() {
        let field = field_from(3, 3, CellCoord::new(0, 0), &[]);

        // From (1,1) both down (1,0) and left (0,1) hold distance 1.
        let path = descend(&field, CellCoord::new(0, 0), CellCoord::new(1, 1));

        assert_eq!(path.next_step(), Some(CellCoord::new(1, 0)));
    }

    #[test]
    fn disconnected_target_yields_an_empty_path() {
        let walls = [CellCoord::new(1, 0), CellCoord::new(1, 1), CellCoord::new(1, 2)];
        let field = field_from(3, 3, CellCoord::new(0, 0), &walls);

        let path = descend(&field, CellCoord::new(0, 0), CellCoord::new(2, 2));

        assert!(path.is_empty());
    }

    #[test]
    fn out_of_bounds_endpoints_yield_an_empty_path() {
        let field = field_from(2, 2, CellCoord::new(0, 0), &[]);
        assert!(descend(&field, CellCoord::new(0, 0), CellCoord::new(5, 0)).is_empty());
        assert!(descend(&field, CellCoord::new(9, 9), CellCoord::new(1, 1)).is_empty());
    }

    #[test]
    fn overlong_walks_hit_the_length_cap() {
        let width = u32::try_from(MAX_PATH_LENGTH).expect("fits") + 5;
        let field = field_from(width, 1, CellCoord::new(0, 0), &[]);

        let capped = descend(&field, CellCoord::new(0, 0), CellCoord::new(width - 1, 0));
        let at_cap = descend(&field, CellCoord::new(0, 0), CellCoord::new(1000, 0));

        assert!(capped.is_empty());
        assert_eq!(at_cap.len(), MAX_PATH_LENGTH);
    }

    #[test]
    fn planner_respects_hazard_tolerance() {
        let tiles = vec![Tile::Empty; 3];
        let danger = vec![DangerLevel::Safe, DangerLevel::Armed, DangerLevel::Safe];
        let view = ArenaView::new(&tiles, &danger, 3, 1);
        let origin = CellCoord::new(0, 0);
        let target = CellCoord::new(2, 0);

        let mut planner = PathPlanner::default();
        assert!(planner
            .plan(view, origin, target, HazardTolerance::STRICT)
            .is_empty());
        assert_eq!(
            planner
                .plan(view, origin, target, HazardTolerance::PERMISSIVE)
                .len(),
            2
        );
        assert_eq!(planner.last_field().distance(target), Some(2));
    }
}
