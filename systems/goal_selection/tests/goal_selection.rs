use blast_arena_core::{CellCoord, Command, HazardTolerance, Tile};
use blast_arena_system_goal_selection::{score_goals, select_goal, Config, Exploration};
use blast_arena_world::{self as world, layout::ArenaLayout, query, World};

fn started_round(seed: u64) -> World {
    let mut world = World::new(&ArenaLayout::classic());
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::StartRound {
            wall_density: 1.0,
            seed,
        },
        &mut events,
    );
    world
}

#[test]
fn scoring_twice_yields_identical_maps() {
    let world = started_round(11);
    let origin = query::spawn_points(&world)[0];
    let config = Config::default();

    let first = score_goals(query::arena_view(&world), origin, &config);
    let second = score_goals(query::arena_view(&world), origin, &config);

    assert_eq!(first, second);
}

#[test]
fn fresh_round_goal_sits_next_to_breakable_walls() {
    let world = started_round(5);
    let origin = query::spawn_points(&world)[0];
    let view = query::arena_view(&world);

    let goal = select_goal(view, origin, &Config::default()).expect("walls surround the spawn");

    assert_eq!(view.classify(goal), Tile::Empty);
    let walls = [(0, 1), (1, 0), (0, -1), (-1, 0)]
        .iter()
        .filter_map(|(dc, dr)| {
            let column = u32::try_from(i64::from(goal.column()) + dc).ok()?;
            let row = u32::try_from(i64::from(goal.row()) + dr).ok()?;
            Some(CellCoord::new(column, row))
        })
        .filter(|cell| view.classify(*cell) == Tile::BreakableWall)
        .count();
    assert!(walls > 0);
}

#[test]
fn bonus_attracts_the_goal_over_walls() {
    let mut world = started_round(5);
    let origin = query::spawn_points(&world)[0];
    let bonus = CellCoord::new(origin.column(), origin.row() + 1);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SetTile {
            cell: bonus,
            tile: Tile::Bonus,
        },
        &mut events,
    );

    let goal = select_goal(query::arena_view(&world), origin, &Config::default());

    assert_eq!(goal, Some(bonus));
}

#[test]
fn exploration_falls_back_to_a_reachable_cell() {
    let world = World::new(&ArenaLayout::classic());
    let origin = query::spawn_points(&world)[0];
    let view = query::arena_view(&world);
    assert_eq!(select_goal(view, origin, &Config::default()), None);

    let field = query::distance_field(&world, origin, HazardTolerance::STRICT);
    let target = Exploration::new(42).pick(&field).expect("open arena");

    assert!(field.is_reachable(target));
    assert_ne!(target, origin);
}
