//! Procedural room layouts.
//!
//! A layout is rolled at random and then checked with a breadth-first search
//! from the spawn cell; layouts where any exit cannot be reached are thrown
//! away and rolled again. With a 1-in-4 wall density a fully blocked room is
//! vanishingly rare, so the production path places no bound on retries.

use std::collections::VecDeque;

use log::{debug, trace};
use rand::Rng;

use crate::error::GenerateError;
use crate::grid::{Cell, CellPos, Exit, Grid, Side};

/// Smallest room that still has an interior cell.
pub const MIN_ROOM_SIZE: i32 = 3;

/// Spawn cell for rooms without an entrance.
pub const ROOT_SPAWN: CellPos = CellPos::new(1, 1);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    pub grid: Grid,
    /// In generation order; index 0 is the entrance when there is one.
    pub exits: Vec<Exit>,
    pub spawn: CellPos,
}

impl Layout {
    pub fn exit_index_at(&self, cell: CellPos) -> Option<usize> {
        self.exits.iter().position(|exit| exit.cell == cell)
    }
}

/// Generate a layout whose exits are all reachable from the spawn cell.
/// Maximum dimensions below [`MIN_ROOM_SIZE`] are raised to it.
pub fn generate<R: Rng + ?Sized>(
    rng: &mut R,
    max_width: i32,
    max_height: i32,
    entrance: Option<Side>,
) -> Layout {
    let mut attempts = 0usize;
    loop {
        attempts += 1;
        if let Some(layout) = attempt(rng, max_width, max_height, entrance) {
            log_accepted(&layout, attempts);
            return layout;
        }
    }
}

/// Like [`generate`], but gives up after `max_attempts` rolls.
pub fn generate_bounded<R: Rng + ?Sized>(
    rng: &mut R,
    max_width: i32,
    max_height: i32,
    entrance: Option<Side>,
    max_attempts: usize,
) -> Result<Layout, GenerateError> {
    for attempts in 1..=max_attempts {
        if let Some(layout) = attempt(rng, max_width, max_height, entrance) {
            log_accepted(&layout, attempts);
            return Ok(layout);
        }
    }
    Err(GenerateError::Exhausted {
        attempts: max_attempts,
    })
}

fn log_accepted(layout: &Layout, attempts: usize) {
    debug!(
        "generated {}x{} room with {} exits after {} attempt(s)",
        layout.grid.width(),
        layout.grid.height(),
        layout.exits.len(),
        attempts
    );
    trace!("layout:\n{}", layout.grid);
}

fn attempt<R: Rng + ?Sized>(
    rng: &mut R,
    max_width: i32,
    max_height: i32,
    entrance: Option<Side>,
) -> Option<Layout> {
    let layout = roll_layout(rng, max_width, max_height, entrance);
    if is_traversable(&layout.grid, layout.spawn, &layout.exits) {
        Some(layout)
    } else {
        trace!(
            "rejected {}x{} layout with unreachable exits",
            layout.grid.width(),
            layout.grid.height()
        );
        None
    }
}

/// One unchecked roll of a layout.
fn roll_layout<R: Rng + ?Sized>(
    rng: &mut R,
    max_width: i32,
    max_height: i32,
    entrance: Option<Side>,
) -> Layout {
    let width = roll_dimension(rng, max_width);
    let height = roll_dimension(rng, max_height);
    let mut grid = Grid::filled(width, height, Cell::Wall);

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let cell = if rng.gen_ratio(1, 4) {
                Cell::Wall
            } else {
                Cell::Empty
            };
            grid.set(CellPos::new(x as i32, y as i32), cell);
        }
    }

    smooth(&mut grid);

    let mut exits = Vec::with_capacity(4);
    let spawn = match entrance {
        Some(side) => {
            let cell = random_cell_on_side(rng, &grid, side);
            // smoothing fills one-cell-thick interiors completely, so the
            // cell behind the entrance has to be reopened
            grid.set(cell.offset(side.inward()), Cell::Empty);
            exits.push(Exit { cell, side });
            cell
        }
        None => ROOT_SPAWN,
    };
    grid.set(spawn, Cell::Empty);

    let mut sides: Vec<Side> = Side::ALL
        .into_iter()
        .filter(|&side| Some(side) != entrance)
        .collect();
    let exit_count = rng.gen_range(1..=3).min(sides.len());
    for _ in 0..exit_count {
        let side = sides.swap_remove(rng.gen_range(0..sides.len()));
        let cell = random_cell_on_side(rng, &grid, side);
        grid.set(cell, Cell::Empty);
        exits.push(Exit { cell, side });
    }

    Layout { grid, exits, spawn }
}

fn roll_dimension<R: Rng + ?Sized>(rng: &mut R, max: i32) -> usize {
    let max = max.max(MIN_ROOM_SIZE);
    if max == MIN_ROOM_SIZE {
        MIN_ROOM_SIZE as usize
    } else {
        rng.gen_range(MIN_ROOM_SIZE..max) as usize
    }
}

/// Single forward sweep: an interior cell with three or more walled
/// neighbours becomes a wall. Cells converted earlier in the sweep count as
/// walls for later ones; the sweep is not repeated.
fn smooth(grid: &mut Grid) {
    for y in 1..grid.height() as i32 - 1 {
        for x in 1..grid.width() as i32 - 1 {
            let pos = CellPos::new(x, y);
            let walls = pos.neighbours().iter().filter(|&&n| grid.is_wall(n)).count();
            if walls >= 3 {
                grid.set(pos, Cell::Wall);
            }
        }
    }
}

/// Uniform non-corner cell on the given side.
fn random_cell_on_side<R: Rng + ?Sized>(rng: &mut R, grid: &Grid, side: Side) -> CellPos {
    let right = grid.width() as i32 - 1;
    let bottom = grid.height() as i32 - 1;
    match side {
        Side::Left => CellPos::new(0, rng.gen_range(1..bottom)),
        Side::Right => CellPos::new(right, rng.gen_range(1..bottom)),
        Side::Top => CellPos::new(rng.gen_range(1..right), 0),
        Side::Bottom => CellPos::new(rng.gen_range(1..right), bottom),
    }
}

/// Whether every exit can be reached from `spawn` through empty cells,
/// moving in the four cardinal directions.
pub fn is_traversable(grid: &Grid, spawn: CellPos, exits: &[Exit]) -> bool {
    if !grid.is_empty(spawn) {
        return exits.is_empty();
    }

    let index = |p: CellPos| p.y as usize * grid.width() + p.x as usize;
    let mut visited = vec![false; grid.width() * grid.height()];
    let mut queue = VecDeque::new();
    let mut found = 0;

    visited[index(spawn)] = true;
    queue.push_back(spawn);
    while let Some(pos) = queue.pop_front() {
        if exits.iter().any(|exit| exit.cell == pos) {
            found += 1;
            if found == exits.len() {
                break;
            }
        }
        for next in pos.neighbours() {
            if grid.is_empty(next) && !visited[index(next)] {
                visited[index(next)] = true;
                queue.push_back(next);
            }
        }
    }

    found == exits.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const ATTEMPTS: usize = 10_000;

    fn seeded(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }

    #[test]
    fn open_room_with_top_exit_is_traversable() {
        let grid = Grid::from_ascii(&["###.#", "#...#", "#...#", "#...#", "#####"]);
        let exits = [Exit {
            cell: CellPos::new(3, 0),
            side: Side::Top,
        }];
        assert!(is_traversable(&grid, CellPos::new(1, 1), &exits));
    }

    #[test]
    fn walled_off_exit_is_rejected() {
        let grid = Grid::from_ascii(&["#####", "#.#.#", "#.#..", "#.#.#", "#####"]);
        let exits = [Exit {
            cell: CellPos::new(4, 2),
            side: Side::Right,
        }];
        assert!(!is_traversable(&grid, CellPos::new(1, 1), &exits));
        assert!(is_traversable(&grid, CellPos::new(3, 1), &exits));
    }

    #[test]
    fn smoothing_fills_pockets_in_one_sweep() {
        let mut grid = Grid::from_ascii(&["#####", "#...#", "#.#.#", "#####"]);
        smooth(&mut grid);
        // (1,1) would qualify once (1,2) is filled, but it is not revisited
        assert_eq!(grid.to_string(), "#####\n#...#\n#####\n#####\n");
    }

    #[test]
    fn same_seed_same_layout() {
        let a = generate(&mut seeded(42), 12, 9, Some(Side::Left));
        let b = generate(&mut seeded(42), 12, 9, Some(Side::Left));
        assert_eq!(a, b);
    }

    #[test]
    fn entrance_is_spawn_and_first_exit() {
        let layout =
            generate_bounded(&mut seeded(7), 10, 10, Some(Side::Bottom), ATTEMPTS).unwrap();
        assert_eq!(layout.exits[0].side, Side::Bottom);
        assert_eq!(layout.exits[0].cell, layout.spawn);
        assert_eq!(layout.spawn.y as usize, layout.grid.height() - 1);
        assert!(layout.exits[1..].iter().all(|e| e.side != Side::Bottom));
    }

    #[test]
    fn degenerate_maximums_are_clamped() {
        let layout = generate_bounded(&mut seeded(3), -4, 0, None, ATTEMPTS).unwrap();
        assert_eq!((layout.grid.width(), layout.grid.height()), (3, 3));
        assert_eq!(layout.spawn, ROOT_SPAWN);
    }

    #[test]
    fn thin_rooms_open_the_cell_behind_the_entrance() {
        for side in Side::ALL {
            let layout = generate_bounded(&mut seeded(1), 3, 3, Some(side), ATTEMPTS)
                .unwrap_or_else(|err| panic!("3x3 room entered from {side:?}: {err}"));
            let inside = layout.spawn.offset(side.inward());
            assert_eq!(inside, CellPos::new(1, 1));
            assert!(layout.grid.is_empty(inside));

            let layout = generate_bounded(&mut seeded(1), 12, 3, Some(side), ATTEMPTS)
                .unwrap_or_else(|err| panic!("12x3 room entered from {side:?}: {err}"));
            assert_eq!(layout.grid.height(), 3);
            assert!(layout.grid.is_empty(layout.spawn.offset(side.inward())));
        }
    }

    #[test]
    fn bounded_generation_reports_exhaustion() {
        assert_eq!(
            generate_bounded(&mut seeded(1), 8, 8, None, 0),
            Err(GenerateError::Exhausted { attempts: 0 })
        );
    }

    fn any_entrance() -> impl Strategy<Value = Option<Side>> {
        prop_oneof![
            Just(None),
            Just(Some(Side::Left)),
            Just(Some(Side::Right)),
            Just(Some(Side::Top)),
            Just(Some(Side::Bottom)),
        ]
    }

    proptest! {
        #[test]
        fn generated_layouts_hold_invariants(
            seed in any::<u64>(),
            max_width in -2i32..24,
            max_height in -2i32..24,
            entrance in any_entrance(),
        ) {
            let layout = generate_bounded(&mut seeded(seed), max_width, max_height, entrance, ATTEMPTS)
                .expect("generation should terminate");
            let grid = &layout.grid;

            prop_assert!(grid.width() >= 3 && grid.height() >= 3);
            prop_assert!(grid.width() as i32 <= max_width.max(3));
            prop_assert!(grid.height() as i32 <= max_height.max(3));

            let openings: Vec<CellPos> = layout.exits.iter().map(|e| e.cell).collect();
            prop_assert!(grid.boundary_is_wall_except(&openings));
            prop_assert!(is_traversable(grid, layout.spawn, &layout.exits));

            let extra = if entrance.is_some() { &layout.exits[1..] } else { &layout.exits[..] };
            prop_assert!((1..=3).contains(&extra.len()));
            for (i, exit) in layout.exits.iter().enumerate() {
                prop_assert!(grid.is_boundary(exit.cell));
                prop_assert!(grid.is_empty(exit.cell));
                prop_assert!(layout.exits[i + 1..].iter().all(|other| other.side != exit.side));
            }
        }
    }
}
