//! Occupancy grid of a single room.

use std::fmt;

use crate::geometry::Point;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cell {
    Wall,
    Empty,
}

/// Boundary side of a room.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Left, Side::Right, Side::Top, Side::Bottom];

    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
        }
    }

    /// Cell step from a boundary cell on this side into the room.
    pub fn inward(self) -> (i32, i32) {
        match self {
            Side::Left => (1, 0),
            Side::Right => (-1, 0),
            Side::Top => (0, 1),
            Side::Bottom => (0, -1),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CellPos {
    pub x: i32,
    pub y: i32,
}

impl CellPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, (dx, dy): (i32, i32)) -> CellPos {
        CellPos::new(self.x + dx, self.y + dy)
    }

    pub fn neighbours(self) -> [CellPos; 4] {
        [
            self.offset((1, 0)),
            self.offset((-1, 0)),
            self.offset((0, 1)),
            self.offset((0, -1)),
        ]
    }

    /// Pixel-space centre of this cell.
    pub fn center(self, cell_size: f64) -> Point {
        Point::new(
            (self.x as f64 + 0.5) * cell_size,
            (self.y as f64 + 0.5) * cell_size,
        )
    }
}

/// An opening in the boundary ring.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Exit {
    pub cell: CellPos,
    pub side: Side,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>, // row-major
}

impl Grid {
    pub fn filled(width: usize, height: usize, cell: Cell) -> Self {
        Self {
            width,
            height,
            cells: vec![cell; width * height],
        }
    }

    /// Parse an ASCII picture, `#` for walls and anything else empty.
    /// Rows shorter than the first are padded with walls.
    pub fn from_ascii(rows: &[&str]) -> Self {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.chars().count());
        let mut grid = Grid::filled(width, height, Cell::Wall);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().take(width).enumerate() {
                if ch != '#' {
                    grid.cells[y * width + x] = Cell::Empty;
                }
            }
        }
        grid
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, pos: CellPos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    #[inline]
    pub fn get(&self, pos: CellPos) -> Option<Cell> {
        if self.in_bounds(pos) {
            Some(self.cells[pos.y as usize * self.width + pos.x as usize])
        } else {
            None
        }
    }

    /// Out-of-bounds cells are not walls; callers decide what the outside means.
    #[inline]
    pub fn is_wall(&self, pos: CellPos) -> bool {
        self.get(pos) == Some(Cell::Wall)
    }

    #[inline]
    pub fn is_empty(&self, pos: CellPos) -> bool {
        self.get(pos) == Some(Cell::Empty)
    }

    pub(crate) fn set(&mut self, pos: CellPos, cell: Cell) {
        if self.in_bounds(pos) {
            self.cells[pos.y as usize * self.width + pos.x as usize] = cell;
        }
    }

    /// Cell containing a pixel-space point. Uses floor division, so anything
    /// left of or above the origin lands outside the grid.
    #[inline]
    pub fn cell_at_pixel(point: Point, cell_size: f64) -> CellPos {
        CellPos::new(
            (point.x / cell_size).floor() as i32,
            (point.y / cell_size).floor() as i32,
        )
    }

    pub fn is_boundary(&self, pos: CellPos) -> bool {
        self.in_bounds(pos)
            && (pos.x == 0
                || pos.y == 0
                || pos.x as usize == self.width - 1
                || pos.y as usize == self.height - 1)
    }

    /// All boundary cells are walls, ignoring the listed openings.
    pub fn boundary_is_wall_except(&self, openings: &[CellPos]) -> bool {
        self.cells().all(|(pos, cell)| {
            !self.is_boundary(pos) || cell == Cell::Wall || openings.contains(&pos)
        })
    }

    pub fn cells(&self) -> impl Iterator<Item = (CellPos, Cell)> + '_ {
        self.cells.iter().enumerate().map(|(i, &cell)| {
            let pos = CellPos::new((i % self.width) as i32, (i / self.width) as i32);
            (pos, cell)
        })
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.width.max(1)) {
            for cell in row {
                f.write_str(match cell {
                    Cell::Wall => "#",
                    Cell::Empty => ".",
                })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
