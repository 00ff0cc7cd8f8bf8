use rayon::{
    iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Filter {
    /// Hard pixel edges.
    #[default]
    Nearest,
    Bilinear,
}

/// Source taps for one destination coordinate along an axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Tap {
    lo: usize,
    hi: usize,
    weight: u32, // share of `hi`, 8.8 fixed point in [0, 256]
}

/// Precomputed mapping from window pixels back to framebuffer pixels.
#[derive(Clone, Debug, Default)]
pub struct Upscaler {
    src_w: usize,
    src_h: usize,
    dst_w: usize,
    dst_h: usize,
    filter: Filter,
    cols: Vec<Tap>,
    rows: Vec<Tap>,
}

impl Upscaler {
    pub fn new(dst_w: usize, dst_h: usize, src_w: usize, src_h: usize, filter: Filter) -> Self {
        Self {
            src_w,
            src_h,
            dst_w,
            dst_h,
            filter,
            cols: axis_taps(dst_w, src_w, filter),
            rows: axis_taps(dst_h, src_h, filter),
        }
    }

    #[inline]
    pub fn target_size(&self) -> (usize, usize) {
        (self.dst_w, self.dst_h)
    }

    /// Stretch `src` over `dst`. Rows are filled in parallel.
    pub fn blit(&self, dst: &mut [u32], src: &[u32]) {
        if self.dst_w == 0 || self.src_w == 0 || self.src_h == 0 {
            return;
        }
        let sw = self.src_w;
        dst.par_chunks_mut(self.dst_w)
            .zip(self.rows.par_iter())
            .for_each(|(dst_row, row)| {
                let upper = &src[row.lo * sw..(row.lo + 1) * sw];
                let lower = &src[row.hi * sw..(row.hi + 1) * sw];
                match self.filter {
                    Filter::Nearest => {
                        for (px, col) in dst_row.iter_mut().zip(&self.cols) {
                            *px = upper[col.lo];
                        }
                    }
                    Filter::Bilinear => {
                        for (px, col) in dst_row.iter_mut().zip(&self.cols) {
                            let top = lerp_color_u32(upper[col.lo], upper[col.hi], col.weight);
                            let bottom = lerp_color_u32(lower[col.lo], lower[col.hi], col.weight);
                            *px = lerp_color_u32(top, bottom, row.weight);
                        }
                    }
                }
            });
    }
}

fn axis_taps(dst: usize, src: usize, filter: Filter) -> Vec<Tap> {
    if src == 0 {
        return vec![Tap::default(); dst];
    }
    let ratio = src as f32 / dst as f32;
    (0..dst)
        .map(|d| match filter {
            Filter::Nearest => {
                let s = ((d as f32 * ratio) as usize).min(src - 1);
                Tap {
                    lo: s,
                    hi: s,
                    weight: 0,
                }
            }
            Filter::Bilinear => {
                let f = d as f32 * ratio;
                let lo = (f.floor() as usize).min(src - 1);
                Tap {
                    lo,
                    hi: (lo + 1).min(src - 1),
                    weight: ((f - lo as f32) * 256.0).round().clamp(0.0, 256.0) as u32,
                }
            }
        })
        .collect()
}

#[inline]
fn lerp_color_u32(a: u32, b: u32, w256: u32) -> u32 {
    let inv = 256 - w256;
    // red and blue share one multiply, green gets its own
    let rb = (((a & 0x00FF00FF) * inv + (b & 0x00FF00FF) * w256) >> 8) & 0x00FF00FF;
    let g = (((a & 0x0000FF00) * inv + (b & 0x0000FF00) * w256) >> 8) & 0x0000FF00;
    rb | g
}
