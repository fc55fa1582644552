#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative arena state for Blast Arena.
//!
//! The world owns the grid, the hazard registry and the bomb and explosion
//! timers. It mutates only through [`apply`] and exposes read-only access
//! through the [`query`] module.

pub mod blast;
pub mod danger;
pub mod grid;
pub mod layout;
pub mod navigation;
mod walls;

use std::{collections::VecDeque, time::Duration};

use blast_arena_core::{
    BombId, BombPlacementError, CellCoord, Command, Event, ExplosionId, PlayerId, Tile,
};

use crate::{blast::resolve_blast, danger::DangerField, grid::Grid, layout::ArenaLayout};

const DEFAULT_FUSE: Duration = Duration::from_secs(2);
const DEFAULT_IMMINENT_THRESHOLD: Duration = Duration::from_secs(1);
const DEFAULT_EXPLOSION_LIFETIME: Duration = Duration::from_millis(500);

/// Durations governing the bomb and explosion lifecycles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HazardTiming {
    fuse: Duration,
    imminent_threshold: Duration,
    explosion_lifetime: Duration,
}

impl HazardTiming {
    /// Creates a timing description.
    #[must_use]
    pub const fn new(
        fuse: Duration,
        imminent_threshold: Duration,
        explosion_lifetime: Duration,
    ) -> Self {
        Self {
            fuse,
            imminent_threshold,
            explosion_lifetime,
        }
    }

    /// Fuse applied to bombs placed without an explicit one.
    #[must_use]
    pub const fn fuse(&self) -> Duration {
        self.fuse
    }

    /// Remaining fuse below which a bomb becomes imminent.
    #[must_use]
    pub const fn imminent_threshold(&self) -> Duration {
        self.imminent_threshold
    }

    /// Time an explosion occupies its cells.
    #[must_use]
    pub const fn explosion_lifetime(&self) -> Duration {
        self.explosion_lifetime
    }
}

impl Default for HazardTiming {
    fn default() -> Self {
        Self::new(
            DEFAULT_FUSE,
            DEFAULT_IMMINENT_THRESHOLD,
            DEFAULT_EXPLOSION_LIFETIME,
        )
    }
}

/// Represents the authoritative arena state.
#[derive(Clone, Debug)]
pub struct World {
    grid: Grid,
    spawns: Vec<CellCoord>,
    danger: DangerField,
    bombs: Vec<BombTimer>,
    explosions: Vec<ExplosionTimer>,
    players: Vec<PlayerRecord>,
    timing: HazardTiming,
    next_bomb: u32,
    next_explosion: u32,
}

impl World {
    /// Creates a world from the provided static layout.
    #[must_use]
    pub fn new(layout: &ArenaLayout) -> Self {
        let grid = layout.to_grid();
        let (width, height) = grid.dimensions();
        Self {
            grid,
            spawns: layout.spawns().to_vec(),
            danger: DangerField::new(width, height),
            bombs: Vec::new(),
            explosions: Vec::new(),
            players: Vec::new(),
            timing: HazardTiming::default(),
            next_bomb: 0,
            next_explosion: 0,
        }
    }

    /// Replaces the hazard timing.
    #[must_use]
    pub fn with_timing(mut self, timing: HazardTiming) -> Self {
        self.timing = timing;
        self
    }

    fn allocate_bomb(&mut self) -> BombId {
        let id = BombId::new(self.next_bomb);
        self.next_bomb = self.next_bomb.wrapping_add(1);
        id
    }

    fn allocate_explosion(&mut self) -> ExplosionId {
        let id = ExplosionId::new(self.next_explosion);
        self.next_explosion = self.next_explosion.wrapping_add(1);
        id
    }

    fn player_index(&self, player: PlayerId) -> Option<usize> {
        self.players.iter().position(|record| record.id == player)
    }

    fn has_player_at(&self, cell: CellCoord) -> bool {
        self.players.iter().any(|record| record.cell == cell)
    }

    fn start_round(&mut self, wall_density: f32, seed: u64, out_events: &mut Vec<Event>) {
        self.grid.reset_overlay();
        let (width, height) = self.grid.dimensions();
        self.danger.reset(width, height);
        self.bombs.clear();
        self.explosions.clear();
        self.players.clear();

        let breakable_walls =
            walls::generate_breakable_walls(&mut self.grid, &self.spawns, wall_density, seed);
        tracing::debug!(breakable_walls, seed, "round started");
        out_events.push(Event::RoundStarted { breakable_walls });
    }

    fn set_tile(&mut self, cell: CellCoord, tile: Tile, out_events: &mut Vec<Event>) {
        if !self.grid.contains(cell) {
            tracing::warn!(?cell, "ignored tile change outside the arena");
            return;
        }
        if matches!(tile, Tile::Bomb | Tile::Explosion) {
            tracing::warn!(?cell, ?tile, "hazard tiles only come from bombs");
            return;
        }
        if self.bombs.iter().any(|timer| timer.cell == cell) || self.danger.is_exploding(cell) {
            tracing::warn!(?cell, ?tile, "ignored tile change over an active hazard");
            return;
        }

        self.grid.set(cell, tile);
        self.danger.rebuild(&self.grid);
        out_events.push(Event::TileChanged { cell, tile });
    }

    fn move_player(&mut self, player: PlayerId, to: CellCoord, out_events: &mut Vec<Event>) {
        let destination = self.grid.classify(to);
        if !self.grid.contains(to) || !destination.is_traversable() {
            tracing::warn!(player = player.get(), ?to, ?destination, "rejected player move");
            return;
        }

        let from = match self.player_index(player) {
            Some(index) => {
                let previous = self.players[index].cell;
                self.players[index].cell = to;
                Some(previous)
            }
            None => {
                self.players.push(PlayerRecord { id: player, cell: to });
                self.players.sort_by_key(|record| record.id);
                None
            }
        };

        if let Some(previous) = from {
            self.vacate(previous);
        }
        self.grid.set(to, Tile::Player);
        out_events.push(Event::PlayerMoved { player, from, to });
    }

    fn remove_player(&mut self, player: PlayerId, out_events: &mut Vec<Event>) {
        let Some(index) = self.player_index(player) else {
            tracing::warn!(player = player.get(), "ignored removal of unknown player");
            return;
        };

        let record = self.players.remove(index);
        self.vacate(record.cell);
        out_events.push(Event::PlayerRemoved {
            player,
            cell: record.cell,
        });
    }

    /// Clears a player tile unless it holds a bomb or another player.
    fn vacate(&mut self, cell: CellCoord) {
        if self.grid.classify(cell) == Tile::Player && !self.has_player_at(cell) {
            self.grid.set(cell, Tile::Empty);
        }
    }

    fn place_bomb(
        &mut self,
        cell: CellCoord,
        power: u32,
        fuse: Option<Duration>,
        owner: Option<PlayerId>,
        out_events: &mut Vec<Event>,
    ) {
        let rejection = if power == 0 {
            Some(BombPlacementError::ZeroPower)
        } else if !self.grid.contains(cell) {
            Some(BombPlacementError::OutOfBounds)
        } else if !matches!(self.grid.classify(cell), Tile::Empty | Tile::Player) {
            Some(BombPlacementError::Occupied)
        } else {
            None
        };

        if let Some(reason) = rejection {
            tracing::warn!(?cell, ?reason, "rejected bomb placement");
            out_events.push(Event::BombRejected { cell, reason });
            return;
        }

        let bomb = self.allocate_bomb();
        let remaining = fuse.unwrap_or(self.timing.fuse);
        self.grid.set(cell, Tile::Bomb);
        self.danger.on_bomb_armed(&self.grid, bomb, cell, power);
        self.bombs.push(BombTimer {
            id: bomb,
            cell,
            power,
            owner,
            remaining,
            imminent: false,
        });
        out_events.push(Event::BombArmed {
            bomb,
            cell,
            power,
            owner,
        });

        if remaining < self.timing.imminent_threshold {
            self.mark_imminent(bomb, out_events);
        }
    }

    fn mark_imminent(&mut self, bomb: BombId, out_events: &mut Vec<Event>) {
        let Some(timer) = self.bombs.iter_mut().find(|timer| timer.id == bomb) else {
            return;
        };
        if timer.imminent {
            return;
        }

        timer.imminent = true;
        let cell = timer.cell;
        let _ = self.danger.on_bomb_imminent(&self.grid, bomb);
        out_events.push(Event::BombImminent { bomb, cell });
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        out_events.push(Event::TimeAdvanced { dt });

        let mut finished = Vec::new();
        for timer in &mut self.explosions {
            timer.remaining = timer.remaining.saturating_sub(dt);
            if timer.remaining.is_zero() {
                finished.push(timer.id);
            }
        }
        for explosion in finished {
            let _ = self.finish_explosion(explosion, out_events);
        }

        let threshold = self.timing.imminent_threshold;
        let mut imminent = Vec::new();
        let mut due = Vec::new();
        for timer in &mut self.bombs {
            timer.remaining = timer.remaining.saturating_sub(dt);
            if timer.remaining.is_zero() {
                due.push(timer.id);
            } else if !timer.imminent && timer.remaining < threshold {
                imminent.push(timer.id);
            }
        }

        imminent.sort_unstable();
        for bomb in imminent {
            self.mark_imminent(bomb, out_events);
        }

        due.sort_unstable();
        for bomb in due {
            let _ = self.detonate(bomb, out_events);
        }
    }

    /// Detonates the bomb and every bomb its blast reaches, in one pass.
    ///
    /// Every blast of the chain is resolved against the walls standing when
    /// the pass began; walls hit by any blast are destroyed afterwards.
    ///
    /// Returns `false` when the bomb is not registered.
    fn detonate(&mut self, first: BombId, out_events: &mut Vec<Event>) -> bool {
        if !self.bombs.iter().any(|timer| timer.id == first) {
            return false;
        }

        let mut pending = VecDeque::from([first]);
        let mut destroyed_walls: Vec<CellCoord> = Vec::new();

        while let Some(bomb) = pending.pop_front() {
            let Some(position) = self.bombs.iter().position(|timer| timer.id == bomb) else {
                continue;
            };
            let timer = self.bombs.remove(position);
            let blast = resolve_blast(&self.grid, timer.cell, timer.power);
            let explosion = self.allocate_explosion();
            let _ = self.danger.on_bomb_exploded(&self.grid, bomb, explosion);

            tracing::debug!(
                bomb = bomb.get(),
                explosion = explosion.get(),
                cells = blast.cells().len(),
                "bomb detonated"
            );
            out_events.push(Event::BombDetonated {
                bomb,
                cell: timer.cell,
                owner: timer.owner,
            });

            for wall in blast.breakable_walls() {
                if !destroyed_walls.contains(wall) {
                    destroyed_walls.push(*wall);
                }
            }

            for cell in blast.cells() {
                for record in self.players.iter().filter(|record| record.cell == *cell) {
                    out_events.push(Event::PlayerCaught {
                        player: record.id,
                        cell: *cell,
                    });
                }

                for chained in self.bombs.iter().filter(|other| other.cell == *cell) {
                    if !pending.contains(&chained.id) {
                        pending.push_back(chained.id);
                    }
                }

                self.grid.set(*cell, Tile::Explosion);
            }

            let cells = blast.into_cells();
            self.explosions.push(ExplosionTimer {
                id: explosion,
                cells: cells.clone(),
                remaining: self.timing.explosion_lifetime,
            });
            out_events.push(Event::ExplosionStarted { explosion, cells });
        }

        if !destroyed_walls.is_empty() {
            for wall in destroyed_walls {
                self.grid.set(wall, Tile::Empty);
                out_events.push(Event::WallDestroyed { cell: wall });
            }
            self.danger.rebuild(&self.grid);
        }
        true
    }

    /// Ends the explosion and restores the cells no other explosion covers.
    ///
    /// Returns `false` when the explosion is not registered.
    fn finish_explosion(&mut self, explosion: ExplosionId, out_events: &mut Vec<Event>) -> bool {
        let Some(position) = self
            .explosions
            .iter()
            .position(|timer| timer.id == explosion)
        else {
            return false;
        };

        let timer = self.explosions.remove(position);
        let _ = self.danger.on_explosion_finished(&self.grid, explosion);

        for cell in timer.cells {
            if self.danger.is_exploding(cell) || self.grid.classify(cell) != Tile::Explosion {
                continue;
            }
            let tile = if self.has_player_at(cell) {
                Tile::Player
            } else {
                Tile::Empty
            };
            self.grid.set(cell, tile);
        }

        tracing::debug!(explosion = explosion.get(), "explosion finished");
        out_events.push(Event::ExplosionFinished { explosion });
        true
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(&ArenaLayout::classic())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartRound { wall_density, seed } => {
            world.start_round(wall_density, seed, out_events);
        }
        Command::SetTile { cell, tile } => world.set_tile(cell, tile, out_events),
        Command::MovePlayer { player, to } => world.move_player(player, to, out_events),
        Command::RemovePlayer { player } => world.remove_player(player, out_events),
        Command::PlaceBomb {
            cell,
            power,
            fuse,
            owner,
        } => world.place_bomb(cell, power, fuse, owner, out_events),
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::DetonateBomb { bomb } => {
            if !world.detonate(bomb, out_events) {
                tracing::warn!(bomb = bomb.get(), "ignored detonation of unknown bomb");
            }
        }
        Command::FinishExplosion { explosion } => {
            if !world.finish_explosion(explosion, out_events) {
                tracing::warn!(
                    explosion = explosion.get(),
                    "ignored finish of unknown explosion"
                );
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use blast_arena_core::{
        ArenaSnapshot, ArenaView, BombId, CellCoord, DangerLevel, ExplosionId, HazardTolerance,
        PlayerId, Tile,
    };

    use super::{HazardTiming, World};
    use crate::{
        blast,
        danger::{BombState, DangerField},
        grid::Grid,
        navigation::{build_distance_field, DistanceField},
    };

    /// Provides read-only access to the arena grid.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Provides read-only access to the danger field and its hazard registry.
    #[must_use]
    pub fn danger_field(world: &World) -> &DangerField {
        &world.danger
    }

    /// Borrows the classification and danger layers as a single view.
    #[must_use]
    pub fn arena_view(world: &World) -> ArenaView<'_> {
        world.grid.view(world.danger.levels())
    }

    /// Danger level currently covering the cell.
    #[must_use]
    pub fn danger_level(world: &World, cell: CellCoord) -> DangerLevel {
        world.danger.level(cell)
    }

    /// Reports whether no hazard covers the cell.
    #[must_use]
    pub fn is_safe(world: &World, cell: CellCoord) -> bool {
        world.danger.is_safe(cell)
    }

    /// Cells a detonation at `cell` with the provided power would reach now.
    #[must_use]
    pub fn blast_cells(world: &World, cell: CellCoord, power: u32) -> Vec<CellCoord> {
        blast::blast_cells(&world.grid, cell, power)
    }

    /// Builds a fresh distance field from `source`.
    #[must_use]
    pub fn distance_field(
        world: &World,
        source: CellCoord,
        tolerance: HazardTolerance,
    ) -> DistanceField {
        build_distance_field(arena_view(world), source, tolerance)
    }

    /// Spawn points declared by the layout.
    #[must_use]
    pub fn spawn_points(world: &World) -> &[CellCoord] {
        &world.spawns
    }

    /// Hazard timing the world applies.
    #[must_use]
    pub fn timing(world: &World) -> HazardTiming {
        world.timing
    }

    /// Captures every armed bomb ordered by identifier.
    #[must_use]
    pub fn bombs(world: &World) -> Vec<BombSnapshot> {
        let mut snapshots: Vec<BombSnapshot> = world
            .bombs
            .iter()
            .map(|timer| BombSnapshot {
                id: timer.id,
                cell: timer.cell,
                power: timer.power,
                owner: timer.owner,
                remaining: timer.remaining,
                state: world
                    .danger
                    .bomb_state(timer.id)
                    .unwrap_or(BombState::Armed),
                level: world
                    .danger
                    .bomb_level(timer.id)
                    .unwrap_or(DangerLevel::Armed),
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        snapshots
    }

    /// Captures every active explosion ordered by identifier.
    #[must_use]
    pub fn explosions(world: &World) -> Vec<ExplosionSnapshot> {
        let mut snapshots: Vec<ExplosionSnapshot> = world
            .explosions
            .iter()
            .map(|timer| ExplosionSnapshot {
                id: timer.id,
                cells: timer.cells.clone(),
                remaining: timer.remaining,
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        snapshots
    }

    /// Captures every tracked player ordered by identifier.
    #[must_use]
    pub fn players(world: &World) -> Vec<PlayerSnapshot> {
        world
            .players
            .iter()
            .map(|record| PlayerSnapshot {
                id: record.id,
                cell: record.cell,
            })
            .collect()
    }

    /// Cell occupied by the provided player.
    #[must_use]
    pub fn player_cell(world: &World, player: PlayerId) -> Option<CellCoord> {
        world
            .players
            .iter()
            .find(|record| record.id == player)
            .map(|record| record.cell)
    }

    /// Arena layers as they would read after arming a bomb at `cell`.
    ///
    /// The world itself is left untouched.
    #[must_use]
    pub fn simulate_bomb_planting(world: &World, cell: CellCoord, power: u32) -> ArenaSnapshot {
        let mut grid = world.grid.clone();
        grid.set(cell, Tile::Bomb);
        let danger = world.danger.simulate_bomb(&grid, cell, power);
        let (width, height) = grid.dimensions();
        ArenaSnapshot::new(grid.tiles().to_vec(), danger.levels().to_vec(), width, height)
    }

    /// Immutable representation of an armed bomb.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct BombSnapshot {
        /// Identifier assigned to the bomb.
        pub id: BombId,
        /// Cell holding the bomb.
        pub cell: CellCoord,
        /// Blast radius in cells.
        pub power: u32,
        /// Player credited with the bomb, if any.
        pub owner: Option<PlayerId>,
        /// Fuse time left before detonation.
        pub remaining: Duration,
        /// Lifecycle stage of the bomb.
        pub state: BombState,
        /// Level projected onto the blast, including chained hazards.
        pub level: DangerLevel,
    }

    /// Immutable representation of an active explosion.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct ExplosionSnapshot {
        /// Identifier assigned to the explosion.
        pub id: ExplosionId,
        /// Cells covered by the explosion.
        pub cells: Vec<CellCoord>,
        /// Lifetime left before the cells clear.
        pub remaining: Duration,
    }

    /// Immutable representation of a tracked player.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct PlayerSnapshot {
        /// Identifier of the player.
        pub id: PlayerId,
        /// Cell occupied by the player.
        pub cell: CellCoord,
    }
}

#[derive(Clone, Debug)]
struct BombTimer {
    id: BombId,
    cell: CellCoord,
    power: u32,
    owner: Option<PlayerId>,
    remaining: Duration,
    imminent: bool,
}

#[derive(Clone, Debug)]
struct ExplosionTimer {
    id: ExplosionId,
    cells: Vec<CellCoord>,
    remaining: Duration,
}

#[derive(Clone, Copy, Debug)]
struct PlayerRecord {
    id: PlayerId,
    cell: CellCoord,
}

#[cfg(test)]
mod tests {
    use super::*;
    use blast_arena_core::DangerLevel;

    fn open_world(width: u32, height: u32) -> World {
        let row = ".".repeat(width as usize);
        let text = vec![row; height as usize].join("\n");
        World::new(&ArenaLayout::parse(&text).expect("valid layout"))
    }

    fn place(world: &mut World, cell: CellCoord, power: u32) -> Vec<Event> {
        let mut events = Vec::new();
        apply(
            world,
            Command::PlaceBomb {
                cell,
                power,
                fuse: None,
                owner: None,
            },
            &mut events,
        );
        events
    }

    fn tick(world: &mut World, millis: u64) -> Vec<Event> {
        let mut events = Vec::new();
        apply(
            world,
            Command::Tick {
                dt: Duration::from_millis(millis),
            },
            &mut events,
        );
        events
    }

    #[test]
    fn bomb_placement_marks_the_blast_as_armed() {
        let mut world = open_world(5, 5);
        let cell = CellCoord::new(2, 2);

        let events = place(&mut world, cell, 1);

        assert_eq!(
            events,
            vec![Event::BombArmed {
                bomb: BombId::new(0),
                cell,
                power: 1,
                owner: None,
            }]
        );
        assert_eq!(query::grid(&world).classify(cell), Tile::Bomb);
        assert_eq!(
            query::danger_level(&world, CellCoord::new(2, 3)),
            DangerLevel::Armed
        );
        assert!(query::is_safe(&world, CellCoord::new(3, 3)));
    }

    #[test]
    fn bomb_placement_rejects_invalid_requests() {
        let mut world = open_world(3, 3);
        let _ = place(&mut world, CellCoord::new(1, 1), 1);

        let occupied = place(&mut world, CellCoord::new(1, 1), 1);
        let outside = place(&mut world, CellCoord::new(7, 1), 1);
        let powerless = place(&mut world, CellCoord::new(0, 0), 0);

        assert_eq!(
            occupied,
            vec![Event::BombRejected {
                cell: CellCoord::new(1, 1),
                reason: BombPlacementError::Occupied,
            }]
        );
        assert!(matches!(
            outside.as_slice(),
            [Event::BombRejected {
                reason: BombPlacementError::OutOfBounds,
                ..
            }]
        ));
        assert!(matches!(
            powerless.as_slice(),
            [Event::BombRejected {
                reason: BombPlacementError::ZeroPower,
                ..
            }]
        ));
        assert_eq!(query::bombs(&world).len(), 1);
    }

    #[test]
    fn fuse_progress_raises_then_detonates() {
        let mut world = open_world(5, 5);
        let cell = CellCoord::new(2, 2);
        let _ = place(&mut world, cell, 1);

        let first = tick(&mut world, 1_200);
        assert!(first.contains(&Event::BombImminent {
            bomb: BombId::new(0),
            cell,
        }));
        assert_eq!(
            query::danger_level(&world, CellCoord::new(1, 2)),
            DangerLevel::Imminent
        );

        let second = tick(&mut world, 800);
        assert!(second.contains(&Event::BombDetonated {
            bomb: BombId::new(0),
            cell,
            owner: None,
        }));
        assert_eq!(query::grid(&world).classify(cell), Tile::Explosion);
        assert_eq!(
            query::danger_level(&world, CellCoord::new(2, 1)),
            DangerLevel::Exploding
        );
        assert!(query::bombs(&world).is_empty());

        let third = tick(&mut world, 500);
        assert!(third.contains(&Event::ExplosionFinished {
            explosion: ExplosionId::new(0),
        }));
        assert_eq!(query::grid(&world).classify(cell), Tile::Empty);
        assert!(query::is_safe(&world, CellCoord::new(2, 1)));
    }

    #[test]
    fn short_fuse_is_imminent_from_the_start() {
        let mut world = open_world(3, 3);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::PlaceBomb {
                cell: CellCoord::new(1, 1),
                power: 1,
                fuse: Some(Duration::from_millis(300)),
                owner: Some(PlayerId::new(2)),
            },
            &mut events,
        );

        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], Event::BombImminent { .. }));
        assert_eq!(query::bombs(&world)[0].state, danger::BombState::Imminent);
    }

    #[test]
    fn detonation_chains_through_bombs_in_the_blast() {
        let mut world = open_world(7, 3);
        let _ = place(&mut world, CellCoord::new(1, 1), 2);
        let _ = place(&mut world, CellCoord::new(3, 1), 2);
        let _ = place(&mut world, CellCoord::new(6, 1), 1);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::DetonateBomb {
                bomb: BombId::new(0),
            },
            &mut events,
        );

        let detonated: Vec<BombId> = events
            .iter()
            .filter_map(|event| match event {
                Event::BombDetonated { bomb, .. } => Some(*bomb),
                _ => None,
            })
            .collect();
        assert_eq!(detonated, vec![BombId::new(0), BombId::new(1)]);
        assert_eq!(query::explosions(&world).len(), 2);
        assert_eq!(query::bombs(&world).len(), 1);
        assert_eq!(
            query::danger_level(&world, CellCoord::new(5, 1)),
            DangerLevel::Exploding
        );
        assert_eq!(
            query::bombs(&world)[0].level,
            DangerLevel::Armed,
            "bomb beyond the chained blast stays armed"
        );
    }

    #[test]
    fn detonation_destroys_breakable_walls_and_catches_players() {
        let layout = ArenaLayout::parse(
            "
            .....
            ..+..
            .....
            ",
        )
        .expect("valid layout");
        let mut world = World::new(&layout);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::MovePlayer {
                player: PlayerId::new(1),
                to: CellCoord::new(0, 0),
            },
            &mut events,
        );
        let _ = place(&mut world, CellCoord::new(2, 0), 2);
        events.clear();

        apply(
            &mut world,
            Command::DetonateBomb {
                bomb: BombId::new(0),
            },
            &mut events,
        );

        assert!(events.contains(&Event::WallDestroyed {
            cell: CellCoord::new(2, 1),
        }));
        assert!(events.contains(&Event::PlayerCaught {
            player: PlayerId::new(1),
            cell: CellCoord::new(0, 0),
        }));
        assert_eq!(
            query::grid(&world).classify(CellCoord::new(2, 1)),
            Tile::Empty
        );

        apply(
            &mut world,
            Command::FinishExplosion {
                explosion: ExplosionId::new(0),
            },
            &mut events,
        );
        assert_eq!(
            query::grid(&world).classify(CellCoord::new(0, 0)),
            Tile::Player
        );
    }

    #[test]
    fn moving_off_a_bomb_leaves_it_in_place() {
        let mut world = open_world(3, 3);
        let player = PlayerId::new(0);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::MovePlayer {
                player,
                to: CellCoord::new(0, 0),
            },
            &mut events,
        );
        let _ = place(&mut world, CellCoord::new(0, 0), 1);
        apply(
            &mut world,
            Command::MovePlayer {
                player,
                to: CellCoord::new(0, 1),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::MovePlayer {
                player,
                to: CellCoord::new(1, 1),
            },
            &mut events,
        );

        let grid = query::grid(&world);
        assert_eq!(grid.classify(CellCoord::new(0, 0)), Tile::Bomb);
        assert_eq!(grid.classify(CellCoord::new(0, 1)), Tile::Empty);
        assert_eq!(grid.classify(CellCoord::new(1, 1)), Tile::Player);
        assert_eq!(
            query::player_cell(&world, player),
            Some(CellCoord::new(1, 1))
        );
    }

    #[test]
    fn moves_onto_walls_are_rejected() {
        let layout = ArenaLayout::parse(".#").expect("valid layout");
        let mut world = World::new(&layout);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::MovePlayer {
                player: PlayerId::new(0),
                to: CellCoord::new(1, 0),
            },
            &mut events,
        );

        assert!(events.is_empty());
        assert!(query::players(&world).is_empty());
    }

    #[test]
    fn start_round_resets_overlay_and_is_deterministic() {
        let mut first = World::default();
        let mut second = World::default();
        let mut first_events = Vec::new();
        let mut second_events = Vec::new();
        let _ = place(&mut first, CellCoord::new(1, 1), 2);

        for (world, events) in [
            (&mut first, &mut first_events),
            (&mut second, &mut second_events),
        ] {
            apply(
                world,
                Command::StartRound {
                    wall_density: 0.6,
                    seed: 99,
                },
                events,
            );
        }

        assert_eq!(first_events, second_events);
        assert_eq!(query::grid(&first), query::grid(&second));
        assert!(query::bombs(&first).is_empty());
        assert!(query::is_safe(&first, CellCoord::new(1, 2)));
        for spawn in query::spawn_points(&first) {
            assert_eq!(query::grid(&first).classify(*spawn), Tile::Empty);
        }
    }

    #[test]
    fn simulated_planting_leaves_the_world_untouched() {
        let world = open_world(5, 5);
        let cell = CellCoord::new(2, 2);

        let snapshot = query::simulate_bomb_planting(&world, cell, 1);

        assert_eq!(snapshot.view().classify(cell), Tile::Bomb);
        assert_eq!(
            snapshot.view().danger_level(CellCoord::new(3, 2)),
            DangerLevel::Armed
        );
        assert_eq!(query::grid(&world).classify(cell), Tile::Empty);
        assert!(query::is_safe(&world, cell));
    }

    #[test]
    fn set_tile_rebuilds_danger() {
        let mut world = open_world(5, 1);
        let _ = place(&mut world, CellCoord::new(0, 0), 3);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::SetTile {
                cell: CellCoord::new(1, 0),
                tile: Tile::BreakableWall,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::TileChanged {
                cell: CellCoord::new(1, 0),
                tile: Tile::BreakableWall,
            }]
        );
        assert!(query::is_safe(&world, CellCoord::new(2, 0)));
    }
}
