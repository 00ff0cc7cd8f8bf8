use crate::geometry::{Point, wrap_angle};
use crate::grid::{Cell, Grid};
use crate::player::Player;
use crate::ray::{self, HitAxis};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn grey(v: u8) -> Self {
        Self::opaque(v, v, v)
    }

    /// 0RGB packing used by the software surface.
    #[inline]
    pub fn packed(self) -> u32 {
        pack_rgb(self.r, self.g, self.b)
    }
}

pub mod colors {
    use super::Rgba;

    pub const BLACK: Rgba = Rgba::opaque(0, 0, 0);
    pub const WALL: Rgba = Rgba::grey(128);
    pub const PLAYER: Rgba = Rgba::opaque(255, 0, 0);
    pub const HEADING: Rgba = Rgba::opaque(255, 255, 0);
    pub const CAMERA_PLANE: Rgba = Rgba::opaque(0, 255, 0);
    pub const RAY_HIT: Rgba = Rgba::opaque(255, 0, 255);
    pub const RAY_MISS: Rgba = Rgba::opaque(255, 255, 0);
    pub const SKY: Rgba = Rgba::opaque(30, 30, 70);
    pub const GROUND: Rgba = Rgba::opaque(40, 40, 40);
}

#[inline]
fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    // BGRA8 in little-endian memory
    (b as u32) | ((g as u32) << 8) | ((r as u32) << 16)
    // Alpha at 0
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }
}

/// Something that can be drawn on in device pixel coordinates.
pub trait DrawSurface {
    /// Current size in pixels; may change between frames.
    fn size(&self) -> (usize, usize);

    fn fill_rect(&mut self, rect: Rect, color: Rgba);

    fn draw_line(&mut self, from: Point, to: Point, color: Rgba);
}

/// CPU-side frame buffer.
#[derive(Clone, Debug, Default)]
pub struct Framebuffer {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height],
        }
    }

    /// Reallocate when the size changes. Returns whether it did.
    pub fn resize(&mut self, width: usize, height: usize) -> bool {
        if (width, height) == (self.width, self.height) {
            return false;
        }
        *self = Self::new(width, height);
        true
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
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn clear(&mut self, color: Rgba) {
        self.pixels.fill(color.packed());
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    #[inline]
    fn plot(&mut self, x: i32, y: i32, color: Rgba) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            let idx = y as usize * self.width + x as usize;
            self.pixels[idx] = blend(self.pixels[idx], color);
        }
    }
}

/// Source-over blend of `color` onto a packed pixel.
#[inline]
fn blend(dst: u32, color: Rgba) -> u32 {
    match color.a {
        255 => color.packed(),
        0 => dst,
        a => {
            let a = a as u32;
            let inv = 255 - a;
            let mix = |src: u8, shift: u32| {
                let d = (dst >> shift) & 0xFF;
                ((src as u32 * a + d * inv) / 255) << shift
            };
            mix(color.r, 16) | mix(color.g, 8) | mix(color.b, 0)
        }
    }
}

impl DrawSurface for Framebuffer {
    fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        let x0 = rect.x.max(0);
        let y0 = rect.y.max(0);
        let x1 = rect.x.saturating_add(rect.w).min(self.width as i32);
        let y1 = rect.y.saturating_add(rect.h).min(self.height as i32);
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        for y in y0 as usize..y1 as usize {
            let row = &mut self.pixels[y * self.width..(y + 1) * self.width];
            for px in &mut row[x0 as usize..x1 as usize] {
                *px = blend(*px, color);
            }
        }
    }

    fn draw_line(&mut self, from: Point, to: Point, color: Rgba) {
        if !(from.x.is_finite() && from.y.is_finite() && to.x.is_finite() && to.y.is_finite()) {
            return;
        }
        // Bresenham
        let (mut x0, mut y0) = (from.x.round() as i32, from.y.round() as i32);
        let (x1, y1) = (to.x.round() as i32, to.y.round() as i32);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.plot(x0, y0, color);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }
}

/// Read-only view of what gets drawn.
#[derive(Clone, Copy)]
pub struct Scene<'a> {
    pub grid: &'a Grid,
    pub player: &'a Player,
    pub cell_size: f64,
    pub max_steps: u32,
}

impl Scene<'_> {
    /// Cast the view ray for `column` of `columns`, through the matching
    /// point of the camera plane. Returns the plane point and the ray.
    #[inline]
    fn column_ray(&self, column: usize, columns: usize) -> (Point, ray::Ray) {
        let eye = self.player.position();
        let through = self.player.camera_plane().sample(column, columns);
        let ray = ray::cast(
            eye,
            eye.angle_to(through),
            self.grid,
            self.cell_size,
            self.max_steps,
        );
        (through, ray)
    }
}

/// Map view: wall cells, the player marker with heading and camera plane,
/// and optionally every view ray.
pub fn draw_top_down(surface: &mut impl DrawSurface, scene: &Scene<'_>, show_rays: bool) {
    let size = scene.cell_size;
    let edge = size.round() as i32;
    for (pos, cell) in scene.grid.cells() {
        if cell == Cell::Wall {
            let x = (pos.x as f64 * size).round() as i32;
            let y = (pos.y as f64 * size).round() as i32;
            surface.fill_rect(Rect::new(x, y, edge, edge), colors::WALL);
        }
    }

    let player = scene.player;
    let eye = player.position();
    surface.fill_rect(
        Rect::new(eye.x.round() as i32 - 2, eye.y.round() as i32 - 2, 5, 5),
        colors::PLAYER,
    );
    let nose = eye + player.forward() * player.settings().plane_distance;
    surface.draw_line(eye, nose, colors::HEADING);
    let plane = player.camera_plane();
    surface.draw_line(plane.left, plane.right, colors::CAMERA_PLANE);

    if show_rays {
        let (columns, _) = surface.size();
        for column in 0..columns {
            let (through, ray) = scene.column_ray(column, columns);
            let color = if ray.hit() {
                colors::RAY_HIT
            } else {
                colors::RAY_MISS
            };
            surface.draw_line(through, ray.end(), color);
        }
    }
}

/// First-person view: one ray per screen column, each hit drawn as a vertical
/// wall slice whose height falls off with corrected distance.
pub fn draw_first_person(surface: &mut impl DrawSurface, scene: &Scene<'_>) {
    let (width, height) = surface.size();
    if width == 0 || height == 0 {
        return;
    }
    let mid = (height / 2) as i32;
    surface.fill_rect(Rect::new(0, 0, width as i32, mid), colors::SKY);
    surface.fill_rect(
        Rect::new(0, mid, width as i32, height as i32 - mid),
        colors::GROUND,
    );

    let screen_h = height as f64;
    let heading = scene.player.heading();
    for column in 0..width {
        let (_, ray) = scene.column_ray(column, width);
        if !ray.hit() {
            continue;
        }
        let length = corrected_length(ray.distance, heading, ray.angle);
        let slice = wall_slice_height(length, scene.cell_size, screen_h);
        let top = ((screen_h - slice) / 2.0) as i32;
        let shade = wall_shade(length, scene.cell_size, screen_h, ray.axis);
        surface.fill_rect(
            Rect::new(column as i32, top, 1, slice as i32),
            Rgba::grey(shade),
        );
    }
}

/// Project a ray length onto the view direction so flat walls stay flat.
/// Never shorter than one pixel.
#[inline]
pub fn corrected_length(distance: f64, heading: f64, ray_angle: f64) -> f64 {
    (distance * wrap_angle(heading - ray_angle).cos()).max(1.0)
}

#[inline]
pub fn wall_slice_height(length: f64, cell_size: f64, screen_h: f64) -> f64 {
    (cell_size * screen_h / length).min(screen_h)
}

/// Nearer walls are brighter; walls struck across a horizontal grid line are
/// a little darker so corners read.
pub fn wall_shade(length: f64, cell_size: f64, screen_h: f64, axis: HitAxis) -> u8 {
    let mut value = (255.0 * screen_h / length / cell_size) as i32 + 30;
    value = value.min(200);
    if axis == HitAxis::Horizontal {
        value -= 20;
    }
    value.max(0) as u8
}
