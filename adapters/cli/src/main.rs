#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter for inspecting Blast Arena navigation and hazards.

mod config;
mod layout_transfer;
mod overlay;

use std::{fs, path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use blast_arena_core::{CellCoord, Command, Event};
use blast_arena_system_evasion::{can_plant_bomb, find_nearest_safe_cell, plan_escape};
use blast_arena_system_goal_selection::{score_goals, Exploration};
use blast_arena_system_pathfinding::plan_path;
use blast_arena_world::{
    apply,
    grid::GridTransform,
    layout::ArenaLayout,
    query::{self, BombSnapshot},
    World,
};
use clap::{Parser, Subcommand};
use glam::{IVec2, Vec2};
use tracing_subscriber::EnvFilter;

use crate::{config::Settings, layout_transfer::LayoutSnapshot};

/// Inspect distance fields, paths, goals and hazards on a Blast Arena map.
#[derive(Parser)]
#[command(name = "blast-arena")]
#[command(about = "Navigation and hazard inspector for Blast Arena", long_about = None)]
#[command(version)]
struct Cli {
    /// ASCII layout file; the classic 13x11 arena is used when absent.
    #[arg(long, global = true, conflicts_with = "layout")]
    map: Option<PathBuf>,

    /// Encoded `arena:v1` layout snapshot.
    #[arg(long, global = true)]
    layout: Option<String>,

    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Generate breakable walls from the `[round]` settings before querying.
    #[arg(long, global = true)]
    start_round: bool,

    /// Bomb to arm before querying, as `column,row[,power]`.
    #[arg(long = "bomb", global = true, value_parser = parse_bomb)]
    bombs: Vec<BombSpec>,

    /// Milliseconds of simulated time to advance after arming bombs.
    #[arg(long, global = true, default_value_t = 0)]
    elapsed_ms: u64,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Print the breadth-first distance field from a cell
    Field {
        /// Source cell as `column,row`.
        #[arg(long, value_parser = parse_cell)]
        from: CellCoord,
    },

    /// Plan a path between two cells
    Path {
        /// Origin cell as `column,row`.
        #[arg(long, value_parser = parse_cell)]
        from: CellCoord,
        /// Target cell as `column,row`.
        #[arg(long, value_parser = parse_cell)]
        to: CellCoord,
    },

    /// Score goals and pick the most interesting one
    Goal {
        /// Origin cell as `column,row`.
        #[arg(long, value_parser = parse_cell)]
        from: CellCoord,
        /// Seed for the exploration fallback; the configured round seed by default.
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print the danger level of every cell
    Danger,

    /// Show the cells a detonation would reach
    Blast {
        /// Bomb cell as `column,row`.
        #[arg(long, value_parser = parse_cell)]
        at: CellCoord,
        /// Blast radius; the configured bomb power by default.
        #[arg(long)]
        power: Option<u32>,
    },

    /// Find the nearest safe cell and the path towards it
    Escape {
        /// Cell to flee from as `column,row`.
        #[arg(long, value_parser = parse_cell)]
        from: CellCoord,
    },

    /// Check whether planting a bomb leaves an escape route
    Plant {
        /// Bomb cell as `column,row`.
        #[arg(long, value_parser = parse_cell)]
        at: CellCoord,
        /// Blast radius; the configured bomb power by default.
        #[arg(long)]
        power: Option<u32>,
    },

    /// Print the arena as an `arena:v1` snapshot string
    Encode,

    /// Map a world-space point onto an arena cell
    Locate {
        /// Horizontal world coordinate.
        #[arg(long, allow_hyphen_values = true)]
        x: f32,
        /// Vertical world coordinate.
        #[arg(long, allow_hyphen_values = true)]
        y: f32,
        /// Side length of a cell in world units.
        #[arg(long, default_value_t = 1.0)]
        cell_length: f32,
        /// World-grid cell aligned with arena cell `0,0`, as `x,y`.
        #[arg(long, value_parser = parse_origin, default_value = "0,0", allow_hyphen_values = true)]
        origin: IVec2,
    },
}

#[derive(Clone, Copy, Debug)]
struct BombSpec {
    cell: CellCoord,
    power: Option<u32>,
}

/// Entry point for the Blast Arena command-line interface.
fn main() -> Result<()> {
    install_tracing();

    let cli = Cli::parse();
    let settings = config::load(cli.config.as_deref())?;
    let world = build_world(&cli, &settings)?;
    run(&cli.action, &world, &settings)
}

fn install_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_layout(cli: &Cli) -> Result<ArenaLayout> {
    if let Some(path) = &cli.map {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read layout file at {}", path.display()))?;
        return ArenaLayout::parse(&text)
            .with_context(|| format!("invalid layout file {}", path.display()));
    }

    if let Some(encoded) = &cli.layout {
        let snapshot = LayoutSnapshot::decode(encoded).context("invalid layout snapshot")?;
        return snapshot
            .to_layout()
            .context("layout snapshot rows are invalid");
    }

    Ok(ArenaLayout::classic())
}

fn build_world(cli: &Cli, settings: &Settings) -> Result<World> {
    let layout = load_layout(cli)?;
    let mut world = World::new(&layout).with_timing(settings.timing);
    let mut events = Vec::new();

    if cli.start_round {
        apply(
            &mut world,
            Command::StartRound {
                wall_density: settings.wall_density,
                seed: settings.seed,
            },
            &mut events,
        );
    }

    for bomb in &cli.bombs {
        ensure_in_bounds(&world, bomb.cell, "bomb")?;
        apply(
            &mut world,
            Command::PlaceBomb {
                cell: bomb.cell,
                power: bomb.power.unwrap_or(settings.bomb_power),
                fuse: None,
                owner: None,
            },
            &mut events,
        );
    }

    if cli.elapsed_ms > 0 {
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(cli.elapsed_ms),
            },
            &mut events,
        );
    }

    for event in &events {
        match event {
            Event::BombRejected { cell, reason } => {
                tracing::warn!(cell = %cell_label(*cell), ?reason, "bomb rejected");
            }
            other => tracing::debug!(event = ?other, "world event"),
        }
    }

    Ok(world)
}

fn run(action: &Action, world: &World, settings: &Settings) -> Result<()> {
    let view = query::arena_view(world);

    match *action {
        Action::Field { from } => {
            ensure_in_bounds(world, from, "source")?;
            let field = query::distance_field(world, from, settings.tolerance);
            print!("{}", overlay::distances(view, &field));
        }
        Action::Path { from, to } => {
            ensure_in_bounds(world, from, "origin")?;
            ensure_in_bounds(world, to, "target")?;
            let path = plan_path(view, from, to, settings.tolerance);
            if path.is_empty() {
                tracing::warn!(from = %cell_label(from), to = %cell_label(to), "target unreachable");
                println!("no path");
                return Ok(());
            }
            print!("{}", overlay::path(view, from, &path));
            println!("{}", walk_label(path.iter_from_origin()));
        }
        Action::Goal { from, seed } => {
            ensure_in_bounds(world, from, "origin")?;
            let goals = score_goals(view, from, &settings.goals);
            print!("{}", overlay::scores(view, &goals));
            if let Some(goal) = goals.best() {
                println!("goal {}", cell_label(goal));
                return Ok(());
            }

            let field = query::distance_field(world, from, settings.tolerance);
            let mut exploration = Exploration::new(seed.unwrap_or(settings.seed));
            match exploration.pick(&field) {
                Some(cell) => println!("no goal; exploring towards {}", cell_label(cell)),
                None => println!("no goal; nothing reachable"),
            }
        }
        Action::Danger => {
            print!("{}", overlay::danger(view));
            for bomb in query::bombs(world) {
                println!("{}", bomb_label(&bomb));
            }
            for explosion in query::explosions(world) {
                println!(
                    "explosion {} covering {} cells, {} ms left",
                    explosion.id.get(),
                    explosion.cells.len(),
                    explosion.remaining.as_millis()
                );
            }
        }
        Action::Blast { at, power } => {
            ensure_in_bounds(world, at, "bomb")?;
            let power = power.unwrap_or(settings.bomb_power);
            let cells = query::blast_cells(world, at, power);
            print!("{}", overlay::highlight(view, &cells));
            println!("{} cells", cells.len());
        }
        Action::Escape { from } => {
            ensure_in_bounds(world, from, "origin")?;
            let Some(refuge) = find_nearest_safe_cell(view, from) else {
                println!("no safe cell reachable");
                return Ok(());
            };
            if refuge == from {
                println!("{} is safe", cell_label(from));
                return Ok(());
            }
            println!("refuge {}", cell_label(refuge));
            if let Some(path) = plan_escape(view, from) {
                print!("{}", overlay::path(view, from, &path));
                println!("{}", walk_label(path.iter_from_origin()));
            }
        }
        Action::Plant { at, power } => {
            ensure_in_bounds(world, at, "bomb")?;
            let power = power.unwrap_or(settings.bomb_power);
            let simulated = query::simulate_bomb_planting(world, at, power);
            print!("{}", overlay::danger(simulated.view()));
            let verdict = if can_plant_bomb(world, at, power) {
                "safe"
            } else {
                "unsafe"
            };
            println!("planting at {} with power {power}: {verdict}", cell_label(at));
        }
        Action::Encode => {
            let snapshot = LayoutSnapshot::capture(query::grid(world), query::spawn_points(world));
            println!("{}", snapshot.encode()?);
        }
        Action::Locate {
            x,
            y,
            cell_length,
            origin,
        } => {
            if !cell_length.is_finite() || cell_length <= 0.0 {
                bail!("cell length must be a positive number, got {cell_length}");
            }
            let grid = query::grid(world)
                .clone()
                .with_transform(GridTransform::new(origin, cell_length));
            match grid.world_to_cell(Vec2::new(x, y)) {
                Some(cell) => {
                    let centre = grid.cell_to_world(cell);
                    println!(
                        "{} centred at ({}, {})",
                        cell_label(cell),
                        centre.x,
                        centre.y
                    );
                }
                None => println!("outside the arena"),
            }
        }
    }

    Ok(())
}

fn ensure_in_bounds(world: &World, cell: CellCoord, role: &str) -> Result<()> {
    if !query::grid(world).contains(cell) {
        let (width, height) = query::grid(world).dimensions();
        bail!(
            "{role} cell {} lies outside the {width}x{height} arena",
            cell_label(cell)
        );
    }
    Ok(())
}

fn cell_label(cell: CellCoord) -> String {
    format!("({},{})", cell.column(), cell.row())
}

fn walk_label(cells: impl Iterator<Item = CellCoord>) -> String {
    cells.map(cell_label).collect::<Vec<_>>().join(" -> ")
}

fn bomb_label(bomb: &BombSnapshot) -> String {
    format!(
        "bomb {} at {} power {} {:?} ({:?}), {} ms left",
        bomb.id.get(),
        cell_label(bomb.cell),
        bomb.power,
        bomb.state,
        bomb.level,
        bomb.remaining.as_millis()
    )
}

fn parse_cell(value: &str) -> Result<CellCoord, String> {
    let (column, row) = value
        .split_once(',')
        .ok_or_else(|| format!("expected `column,row`, got `{value}`"))?;
    let column = column
        .trim()
        .parse::<u32>()
        .map_err(|error| format!("invalid column `{column}`: {error}"))?;
    let row = row
        .trim()
        .parse::<u32>()
        .map_err(|error| format!("invalid row `{row}`: {error}"))?;
    Ok(CellCoord::new(column, row))
}

fn parse_bomb(value: &str) -> Result<BombSpec, String> {
    let (cell, power) = match value.splitn(3, ',').collect::<Vec<_>>().as_slice() {
        [column, row] => (format!("{column},{row}"), None),
        [column, row, power] => {
            let power = power
                .trim()
                .parse::<u32>()
                .map_err(|error| format!("invalid power `{power}`: {error}"))?;
            (format!("{column},{row}"), Some(power))
        }
        _ => return Err(format!("expected `column,row[,power]`, got `{value}`")),
    };
    Ok(BombSpec {
        cell: parse_cell(&cell)?,
        power,
    })
}

fn parse_origin(value: &str) -> Result<IVec2, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got `{value}`"))?;
    let x = x
        .trim()
        .parse::<i32>()
        .map_err(|error| format!("invalid x `{x}`: {error}"))?;
    let y = y
        .trim()
        .parse::<i32>()
        .map_err(|error| format!("invalid y `{y}`: {error}"))?;
    Ok(IVec2::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_parse_from_column_row_pairs() {
        assert_eq!(parse_cell("3, 4"), Ok(CellCoord::new(3, 4)));
        assert!(parse_cell("3").is_err());
        assert!(parse_cell("-1,2").is_err());
    }

    #[test]
    fn bombs_parse_with_optional_power() {
        let plain = parse_bomb("1,1").expect("bomb without power");
        assert_eq!(plain.cell, CellCoord::new(1, 1));
        assert_eq!(plain.power, None);

        let powered = parse_bomb("2,3,4").expect("bomb with power");
        assert_eq!(powered.cell, CellCoord::new(2, 3));
        assert_eq!(powered.power, Some(4));

        assert!(parse_bomb("1,1,x").is_err());
    }

    #[test]
    fn origins_accept_negative_offsets() {
        assert_eq!(parse_origin("-2,3"), Ok(IVec2::new(-2, 3)));
    }

    #[test]
    fn cli_arguments_are_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn global_bombs_are_armed_before_queries() {
        let cli = Cli::parse_from([
            "blast-arena",
            "--bomb",
            "1,1,2",
            "danger",
        ]);
        let world = build_world(&cli, &Settings::default()).expect("classic arena builds");

        let bombs = query::bombs(&world);
        assert_eq!(bombs.len(), 1);
        assert_eq!(bombs[0].power, 2);
        assert!(!query::is_safe(&world, CellCoord::new(1, 3)));
    }

    #[test]
    fn out_of_bounds_bombs_are_reported() {
        let cli = Cli::parse_from(["blast-arena", "--bomb", "40,1", "danger"]);
        assert!(build_world(&cli, &Settings::default()).is_err());
    }
}
