//! The simulation: which room the player is in, how they move, and which
//! view is drawn.

use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::Config;
use crate::geometry::Point;
use crate::grid::{CellPos, Grid};
use crate::input::{InputState, Key};
use crate::player::Player;
use crate::renderer::{self, DrawSurface, Scene};
use crate::rooms::{Room, RoomGraph, RoomId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewMode {
    TopDown,
    FirstPerson,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::TopDown => ViewMode::FirstPerson,
            ViewMode::FirstPerson => ViewMode::TopDown,
        }
    }
}

/// What a call to [`World::update`] did to the current room.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Stayed,
    Entered {
        from: RoomId,
        to: RoomId,
        /// The room was generated by this step.
        created: bool,
    },
}

pub struct World<R = ChaCha8Rng> {
    rooms: RoomGraph<R>,
    current: RoomId,
    player: Player,
    view: ViewMode,
    show_rays: bool,
    wall_size: f64,
    max_steps: u32,
}

impl World<ChaCha8Rng> {
    /// World with a freshly generated root room, seeded from `config`.
    pub fn from_config(config: &Config) -> Self {
        info!("room seed {}", config.seed);
        let rooms = RoomGraph::new(config.limits, ChaCha8Rng::seed_from_u64(config.seed));
        Self::new(rooms, config)
    }
}

impl<R: Rng> World<R> {
    /// Start in the root room of `rooms`, at its spawn cell, facing down.
    pub fn new(rooms: RoomGraph<R>, config: &Config) -> Self {
        let root = rooms.root();
        let spawn = rooms.room(root).layout.spawn;
        let player = Player::new(spawn.center(config.wall_size), 0.0, config.player);
        debug!(
            "field of view {:.1} degrees",
            player
                .camera_plane()
                .field_of_view(player.position())
                .to_degrees()
        );
        Self {
            rooms,
            current: root,
            player,
            view: config.view,
            show_rays: false,
            wall_size: config.wall_size,
            max_steps: config.max_steps,
        }
    }

    #[inline]
    pub fn rooms(&self) -> &RoomGraph<R> {
        &self.rooms
    }

    #[inline]
    pub fn current(&self) -> RoomId {
        self.current
    }

    #[inline]
    pub fn current_room(&self) -> &Room {
        self.rooms.room(self.current)
    }

    #[inline]
    pub fn player(&self) -> &Player {
        &self.player
    }

    #[inline]
    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    #[inline]
    pub fn view(&self) -> ViewMode {
        self.view
    }

    #[inline]
    pub fn show_rays(&self) -> bool {
        self.show_rays
    }

    #[inline]
    pub fn wall_size(&self) -> f64 {
        self.wall_size
    }

    /// Cell of the current room under the player.
    pub fn player_cell(&self) -> CellPos {
        Grid::cell_at_pixel(self.player.position(), self.wall_size)
    }

    /// Advance one frame.
    pub fn update(&mut self, dt: f64, input: &InputState) -> StepOutcome {
        if input.was_pressed(Key::ToggleView) {
            self.view = self.view.toggled();
            debug!("view mode {:?}", self.view);
        }
        if input.was_pressed(Key::ToggleRays) {
            self.show_rays = !self.show_rays;
        }

        let target = self.player.propose_move(dt, input);
        if self.walkable(target) {
            self.player.place(target);
        }

        let cell = self.player_cell();
        match self.current_room().layout.exit_index_at(cell) {
            Some(exit_index) => self.enter_through(exit_index),
            None => StepOutcome::Stayed,
        }
    }

    /// Inside the grid and not a wall. Anything else freezes the player.
    fn walkable(&self, point: Point) -> bool {
        let cell = Grid::cell_at_pixel(point, self.wall_size);
        self.current_room().layout.grid.is_empty(cell)
    }

    fn enter_through(&mut self, exit_index: usize) -> StepOutcome {
        let from = self.current;
        let before = self.rooms.len();
        let to = self.rooms.neighbour_or_create(from, exit_index);
        let created = self.rooms.len() > before;
        self.current = to;

        let (cell, facing) = match self.rooms.arrival(from, to) {
            Some((exit, inside)) => {
                let (dx, dy) = exit.side.inward();
                let facing = Point::default().angle_to(Point::new(dx as f64, dy as f64));
                (inside, facing)
            }
            None => (self.current_room().layout.spawn, self.player.heading()),
        };
        self.player.place(cell.center(self.wall_size));
        self.player.face(facing);

        info!(
            "moved from room {} to room {}{}",
            from.index(),
            to.index(),
            if created { " (new)" } else { "" }
        );
        StepOutcome::Entered { from, to, created }
    }

    /// Draw the current view. Does not touch simulation state.
    pub fn draw(&self, surface: &mut impl DrawSurface) {
        let scene = Scene {
            grid: &self.current_room().layout.grid,
            player: &self.player,
            cell_size: self.wall_size,
            max_steps: self.max_steps,
        };
        match self.view {
            ViewMode::TopDown => renderer::draw_top_down(surface, &scene, self.show_rays),
            ViewMode::FirstPerson => renderer::draw_first_person(surface, &scene),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::Layout;
    use crate::grid::{Exit, Side};
    use crate::rooms::RoomLimits;
    use crate::renderer::{Framebuffer, colors};

    fn config() -> Config {
        Config {
            seed: 17,
            ..Config::default()
        }
    }

    /// 5x5 open room, spawn (1,1), one exit at (3,0) on the top wall.
    fn open_world() -> World {
        let layout = Layout {
            grid: Grid::from_ascii(&["###.#", "#...#", "#...#", "#...#", "#####"]),
            exits: vec![Exit {
                cell: CellPos::new(3, 0),
                side: Side::Top,
            }],
            spawn: CellPos::new(1, 1),
        };
        let limits = RoomLimits {
            max_width: 8,
            max_height: 8,
        };
        let rooms = RoomGraph::with_root(layout, limits, ChaCha8Rng::seed_from_u64(3));
        World::new(rooms, &config())
    }

    #[test]
    fn starts_on_spawn() {
        let world = open_world();
        assert_eq!(world.player_cell(), CellPos::new(1, 1));
        assert_eq!(world.player().heading(), 0.0);
        assert_eq!(world.view(), ViewMode::TopDown);
    }

    #[test]
    fn idle_update_stays() {
        let mut world = open_world();
        let before = world.player().position();
        assert_eq!(world.update(0.1, &InputState::default()), StepOutcome::Stayed);
        assert_eq!(world.player().position(), before);
    }

    #[test]
    fn moves_into_open_cells() {
        let mut world = open_world();
        // facing down from (1,1): one cell forward is (1,2)
        world.update(50.0 / 120.0, &InputState::holding(&[Key::Forward]));
        assert_eq!(world.player_cell(), CellPos::new(1, 2));
    }

    #[test]
    fn walls_freeze_the_player() {
        let mut world = open_world();
        world.player_mut().face(std::f64::consts::PI);
        let before = world.player().position();
        // a full second of walking up runs into the top wall
        world.update(1.0, &InputState::holding(&[Key::Forward]));
        assert_eq!(world.player().position(), before);
    }

    #[test]
    fn leaving_the_grid_is_rejected() {
        let mut world = open_world();
        world.player_mut().place(CellPos::new(3, 1).center(50.0));
        world.player_mut().face(std::f64::consts::PI);
        let before = world.player().position();
        // far enough to skip past the exit cell and out of the grid
        world.update(1.0, &InputState::holding(&[Key::Forward]));
        assert_eq!(world.player().position(), before);
        assert_eq!(world.current(), world.rooms().root());
    }

    #[test]
    fn standing_on_an_exit_changes_room() {
        let mut world = open_world();
        let root = world.current();
        world.player_mut().place(CellPos::new(3, 0).center(50.0));

        let outcome = world.update(0.016, &InputState::default());
        let StepOutcome::Entered { from, to, created } = outcome else {
            panic!("expected a room change, got {outcome:?}");
        };
        assert_eq!(from, root);
        assert!(created);
        assert_ne!(to, root);
        assert_eq!(world.current(), to);
        assert_eq!(world.current_room().neighbour(0), Some(root));
        assert_eq!(world.current_room().exits()[0].side, Side::Bottom);

        // placed just inside the entrance, facing up into the room
        let entrance = world.current_room().exits()[0].cell;
        assert_eq!(world.player_cell(), entrance.offset(Side::Bottom.inward()));
        assert!((world.player().heading() - std::f64::consts::PI).abs() < 1e-9);
        assert_eq!(world.update(0.0, &InputState::default()), StepOutcome::Stayed);
    }

    #[test]
    fn going_back_reuses_the_parent() {
        let mut world = open_world();
        let root = world.current();
        world.player_mut().place(CellPos::new(3, 0).center(50.0));
        world.update(0.0, &InputState::default());
        let child = world.current();

        let entrance = world.current_room().exits()[0].cell;
        world.player_mut().place(entrance.center(50.0));
        let outcome = world.update(0.0, &InputState::default());
        assert_eq!(
            outcome,
            StepOutcome::Entered {
                from: child,
                to: root,
                created: false
            }
        );
        assert_eq!(world.player_cell(), CellPos::new(3, 1));
        assert_eq!(world.rooms().len(), 2);
    }

    #[test]
    fn smallest_rooms_can_be_walked_through() {
        let config = Config {
            seed: 5,
            limits: RoomLimits {
                max_width: 3,
                max_height: 3,
            },
            ..Config::default()
        };
        let mut world = World::from_config(&config);
        for step in 0..6 {
            let room = world.current_room();
            assert_eq!((room.layout.grid.width(), room.layout.grid.height()), (3, 3));
            // the root has no entrance to skip
            let exit_index = if step == 0 { 0 } else { 1 };
            let exit = room.exits()[exit_index].cell;
            world.player_mut().place(exit.center(config.wall_size));
            let outcome = world.update(0.0, &InputState::default());
            assert!(matches!(outcome, StepOutcome::Entered { created: true, .. }));
            assert_eq!(world.player_cell(), CellPos::new(1, 1));
        }
        assert_eq!(world.rooms().len(), 7);
    }

    #[test]
    fn toggle_keys() {
        let mut world = open_world();
        world.update(0.0, &InputState::pressing(&[Key::ToggleView, Key::ToggleRays]));
        assert_eq!(world.view(), ViewMode::FirstPerson);
        assert!(world.show_rays());
        // held without a fresh press does nothing
        world.update(0.0, &InputState::holding(&[Key::ToggleView]));
        assert_eq!(world.view(), ViewMode::FirstPerson);
    }

    #[test]
    fn draw_is_read_only() {
        let world = open_world();
        let before = (world.player().position(), world.player().heading(), world.current());
        let mut fb = Framebuffer::new(250, 250);
        world.draw(&mut fb);
        assert_eq!(fb.pixel(0, 0), Some(colors::WALL.packed()));
        let after = (world.player().position(), world.player().heading(), world.current());
        assert_eq!(before, after);
    }
}
