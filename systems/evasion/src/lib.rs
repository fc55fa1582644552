#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Escape planning and bomb-planting safety checks.

use std::collections::VecDeque;

use blast_arena_core::{ArenaView, CellCoord, DangerLevel, Direction, HazardTolerance, Tile};
use blast_arena_system_pathfinding::{plan_path, Path};
use blast_arena_world::{query, World};

/// Cells an escaping agent may cross: anything short of a live explosion.
pub const ESCAPE_TOLERANCE: HazardTolerance = HazardTolerance::AtMost(DangerLevel::Imminent);

const SEARCH_ORDER: [Direction; 4] = [
    Direction::Up,
    Direction::Right,
    Direction::Down,
    Direction::Left,
];

/// Reports whether any hazard covers the cell.
#[must_use]
pub fn is_in_danger(view: ArenaView<'_>, cell: CellCoord) -> bool {
    !view.is_safe(cell)
}

/// First safe cell a breadth-first search from `origin` reaches.
///
/// The search crosses traversable cells admitted by [`ESCAPE_TOLERANCE`]. The
/// origin is always expanded, so an agent standing on its own bomb can still
/// flee. Returns the origin itself when it is already safe.
#[must_use]
pub fn find_nearest_safe_cell(view: ArenaView<'_>, origin: CellCoord) -> Option<CellCoord> {
    let origin_index = view.index(origin)?;
    if view.is_safe(origin) {
        return Some(origin);
    }

    let mut visited = vec![false; view.cell_count()];
    *visited.get_mut(origin_index)? = true;
    let mut queue = VecDeque::from([origin]);

    while let Some(cell) = queue.pop_front() {
        for direction in SEARCH_ORDER {
            let Some(neighbor) = cell.step(direction) else {
                continue;
            };
            let Some(index) = view.index(neighbor) else {
                continue;
            };
            let Some(seen) = visited.get_mut(index) else {
                continue;
            };
            if *seen {
                continue;
            }
            *seen = true;

            let crossable = view.is_traversable(neighbor)
                && ESCAPE_TOLERANCE.admits(view.danger_level(neighbor));
            if !crossable {
                continue;
            }
            if view.is_safe(neighbor) {
                return Some(neighbor);
            }
            queue.push_back(neighbor);
        }
    }

    None
}

/// Path from `origin` to the nearest safe cell.
///
/// Returns `None` when no safe cell is reachable. An origin that is already
/// safe yields a single-cell path holding the origin.
#[must_use]
pub fn plan_escape(view: ArenaView<'_>, origin: CellCoord) -> Option<Path> {
    let Some(refuge) = find_nearest_safe_cell(view, origin) else {
        tracing::debug!(?origin, "no safe cell reachable");
        return None;
    };

    let path = plan_path(view, origin, refuge, ESCAPE_TOLERANCE);
    if path.is_empty() {
        return None;
    }
    tracing::debug!(?origin, ?refuge, steps = path.len(), "escape planned");
    Some(path)
}

/// Reports whether an agent at `cell` could plant a bomb of the provided power
/// and still reach a safe cell.
#[must_use]
pub fn can_plant_bomb(world: &World, cell: CellCoord, power: u32) -> bool {
    let view = query::arena_view(world);
    if power == 0 || !matches!(view.classify(cell), Tile::Empty | Tile::Player) {
        return false;
    }

    let simulated = query::simulate_bomb_planting(world, cell, power);
    find_nearest_safe_cell(simulated.view(), cell).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view_of<'a>(tiles: &'a [Tile], danger: &'a [DangerLevel], width: u32) -> ArenaView<'a> {
        let height = u32::try_from(tiles.len()).expect("fits") / width;
        ArenaView::new(tiles, danger, width, height)
    }

    #[test]
    fn safe_origin_is_its_own_refuge() {
        let tiles = vec![Tile::Empty; 4];
        let danger = vec![DangerLevel::Safe; 4];
        let view = view_of(&tiles, &danger, 2);

        assert_eq!(
            find_nearest_safe_cell(view, CellCoord::new(1, 1)),
            Some(CellCoord::new(1, 1))
        );
        assert!(!is_in_danger(view, CellCoord::new(1, 1)));
    }

    #[test]
    fn search_leaves_the_bomb_the_agent_stands_on() {
        let tiles = vec![Tile::Empty, Tile::Bomb, Tile::Empty, Tile::Empty];
        let danger = vec![
            DangerLevel::Armed,
            DangerLevel::Armed,
            DangerLevel::Armed,
            DangerLevel::Safe,
        ];
        let view = view_of(&tiles, &danger, 4);

        assert_eq!(
            find_nearest_safe_cell(view, CellCoord::new(1, 0)),
            Some(CellCoord::new(3, 0))
        );
    }

    #[test]
    fn explosions_block_the_escape() {
        let tiles = vec![Tile::Empty, Tile::Empty, Tile::Empty];
        let danger = vec![DangerLevel::Imminent, DangerLevel::Exploding, DangerLevel::Safe];
        let view = view_of(&tiles, &danger, 3);

        assert_eq!(find_nearest_safe_cell(view, CellCoord::new(0, 0)), None);
        assert!(plan_escape(view, CellCoord::new(0, 0)).is_none());
    }

    #[test]
    fn escape_path_ends_on_the_refuge() {
        let tiles = vec![Tile::Empty; 6];
        let danger = vec![
            DangerLevel::Imminent,
            DangerLevel::Imminent,
            DangerLevel::Safe,
            DangerLevel::Imminent,
            DangerLevel::Imminent,
            DangerLevel::Imminent,
        ];
        let view = view_of(&tiles, &danger, 3);

        let path = plan_escape(view, CellCoord::new(0, 0)).expect("refuge reachable");

        assert_eq!(path.target(), Some(CellCoord::new(2, 0)));
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn out_of_bounds_origin_has_no_refuge() {
        let tiles = vec![Tile::Empty; 1];
        let danger = vec![DangerLevel::Safe; 1];
        let view = view_of(&tiles, &danger, 1);
        assert_eq!(find_nearest_safe_cell(view, CellCoord::new(3, 3)), None);
    }

    #[test]
    fn short_tile_layer_reads_as_walls_during_the_search() {
        let tiles = vec![Tile::Empty; 3];
        let armed = vec![DangerLevel::Armed; 4];
        let view = ArenaView::new(&tiles, &armed, 2, 2);

        assert_eq!(find_nearest_safe_cell(view, CellCoord::new(0, 0)), None);

        let danger = vec![
            DangerLevel::Armed,
            DangerLevel::Safe,
            DangerLevel::Armed,
            DangerLevel::Armed,
        ];
        let view = ArenaView::new(&tiles, &danger, 2, 2);
        assert_eq!(
            find_nearest_safe_cell(view, CellCoord::new(0, 1)),
            Some(CellCoord::new(1, 0))
        );
    }
}
