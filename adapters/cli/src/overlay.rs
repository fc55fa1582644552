//! Text overlays printed by the debugging subcommands.
//!
//! Every overlay prints the top row first so the output reads like the ASCII
//! layouts it was loaded from.

use blast_arena_core::{ArenaView, CellCoord, Tile};
use blast_arena_system_goal_selection::GoalMap;
use blast_arena_system_pathfinding::Path;
use blast_arena_world::{layout::glyph, navigation::DistanceField};

const UNREACHABLE_GLYPH: char = 'X';
const FAR_GLYPH: char = '_';
const ORIGIN_GLYPH: char = 'A';
const STEP_GLYPH: char = 'o';
const HIGHLIGHT_GLYPH: char = '!';

/// Renders hop counts as `a`..`z`, unreachable cells as `X` and anything
/// further away as `_`. Walls keep their layout glyph.
pub(crate) fn distances(view: ArenaView<'_>, field: &DistanceField) -> String {
    let infinity = field.infinity();
    render(view, |cell| {
        let tile = view.classify(cell);
        if is_wall(tile) {
            return glyph(tile);
        }
        match field.distance(cell) {
            Some(distance) if distance == infinity => UNREACHABLE_GLYPH,
            Some(distance) if distance < 26 => letter(distance),
            _ => FAR_GLYPH,
        }
    })
}

/// Renders the danger level of every non-wall cell as a digit.
pub(crate) fn danger(view: ArenaView<'_>) -> String {
    render(view, |cell| {
        let tile = view.classify(cell);
        if is_wall(tile) {
            glyph(tile)
        } else {
            char::from(b'0' + view.danger_level(cell).get())
        }
    })
}

/// Marks the origin with `A` and each path step with `o`.
pub(crate) fn path(view: ArenaView<'_>, origin: CellCoord, path: &Path) -> String {
    render(view, |cell| {
        if cell == origin {
            ORIGIN_GLYPH
        } else if path.iter_from_origin().any(|step| step == cell) {
            STEP_GLYPH
        } else {
            glyph(view.classify(cell))
        }
    })
}

/// Renders goal scores in base 36; zero-score cells keep their layout glyph.
pub(crate) fn scores(view: ArenaView<'_>, goals: &GoalMap) -> String {
    render(view, |cell| match goals.score(cell) {
        Some(score) if score > 0 => char::from_digit(score.min(35), 36).unwrap_or(FAR_GLYPH),
        _ => glyph(view.classify(cell)),
    })
}

/// Marks the provided cells with `!`.
pub(crate) fn highlight(view: ArenaView<'_>, cells: &[CellCoord]) -> String {
    render(view, |cell| {
        if cells.contains(&cell) {
            HIGHLIGHT_GLYPH
        } else {
            glyph(view.classify(cell))
        }
    })
}

fn render<F>(view: ArenaView<'_>, mut cell_glyph: F) -> String
where
    F: FnMut(CellCoord) -> char,
{
    let (width, height) = view.dimensions();
    let mut out = String::new();
    for row in (0..height).rev() {
        for column in 0..width {
            out.push(cell_glyph(CellCoord::new(column, row)));
        }
        out.push('\n');
    }
    out
}

fn is_wall(tile: Tile) -> bool {
    matches!(tile, Tile::PermanentWall | Tile::BreakableWall)
}

fn letter(distance: u32) -> char {
    u8::try_from(distance)
        .ok()
        .and_then(|offset| b'a'.checked_add(offset))
        .map_or(FAR_GLYPH, char::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use blast_arena_core::{DangerLevel, HazardTolerance};
    use blast_arena_system_pathfinding::plan_path;
    use blast_arena_world::{layout::ArenaLayout, navigation::build_distance_field};

    fn corridor() -> (Vec<Tile>, Vec<DangerLevel>) {
        let layout = ArenaLayout::parse("#####\n#...#\n#####").expect("valid layout");
        let levels = vec![DangerLevel::Safe; layout.tiles().len()];
        (layout.tiles().to_vec(), levels)
    }

    #[test]
    fn distance_overlay_letters_hop_counts() {
        let (tiles, levels) = corridor();
        let view = ArenaView::new(&tiles, &levels, 5, 3);
        let field = build_distance_field(view, CellCoord::new(1, 1), HazardTolerance::Ignore);

        assert_eq!(distances(view, &field), "#####\n#abc#\n#####\n");
    }

    #[test]
    fn unreachable_cells_render_as_x() {
        let layout = ArenaLayout::parse("..#.").expect("valid layout");
        let levels = vec![DangerLevel::Safe; 4];
        let view = ArenaView::new(layout.tiles(), &levels, 4, 1);
        let field = build_distance_field(view, CellCoord::new(0, 0), HazardTolerance::Ignore);

        assert_eq!(distances(view, &field), "ab#X\n");
    }

    #[test]
    fn danger_overlay_prints_levels() {
        let (tiles, mut levels) = corridor();
        levels[6] = DangerLevel::Armed;
        levels[7] = DangerLevel::Imminent;
        levels[8] = DangerLevel::Exploding;
        let view = ArenaView::new(&tiles, &levels, 5, 3);

        assert_eq!(danger(view), "#####\n#123#\n#####\n");
    }

    #[test]
    fn path_overlay_marks_origin_and_steps() {
        let (tiles, levels) = corridor();
        let view = ArenaView::new(&tiles, &levels, 5, 3);
        let origin = CellCoord::new(1, 1);
        let planned = plan_path(view, origin, CellCoord::new(3, 1), HazardTolerance::Ignore);

        assert_eq!(path(view, origin, &planned), "#####\n#Aoo#\n#####\n");
    }

    #[test]
    fn highlight_marks_cells_and_keeps_the_rest() {
        let (tiles, levels) = corridor();
        let view = ArenaView::new(&tiles, &levels, 5, 3);

        assert_eq!(
            highlight(view, &[CellCoord::new(2, 1)]),
            "#####\n#.!.#\n#####\n"
        );
    }
}
