//! Triangle scan conversion
//!
//! Vertices are 12.4 fixed point. Rows and columns are covered when their pixel centre lies on
//! or right of the left edge and strictly left of the right edge. Every row's starting
//! parameters are evaluated directly from the triangle's start values and gradients, so rounding
//! never accumulates from one row to the next.

mod cache;


pub use cache::{RasterCache, RasterEntry, RasterKey};

use crate::color::Argb;
use crate::dither::Dither;
use crate::pixel::{clamped_argb, Iterated, PixelPipeline, PixelPosition};
use crate::texture::{TexCoords, TextureStage, TmuIterators, MAX_TMU};
use bincode::{Decode, Encode};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Encode, Decode)]
pub struct Vertex {
    pub x: i16,
    pub y: i16,
}

impl Vertex {
    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }
}

// One iterated parameter: value at vertex A plus per-pixel X and Y increments
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Encode, Decode)]
pub struct Gradient<T> {
    pub start: T,
    pub dx: T,
    pub dy: T,
}

impl Gradient<i32> {
    pub fn at(&self, dx: i32, dy: i32) -> i32 {
        self.start.wrapping_add(dy.wrapping_mul(self.dy)).wrapping_add(dx.wrapping_mul(self.dx))
    }

    // Moves the start value from vertex A to the centre of its pixel; offsets are in 1/16 pixel
    fn adjust_subpixel(&mut self, dx: i32, dy: i32) {
        self.start = self.start.wrapping_add(
            dy.wrapping_mul(self.dy).wrapping_add(dx.wrapping_mul(self.dx)) >> 4,
        );
    }
}

impl Gradient<i64> {
    pub fn at(&self, dx: i32, dy: i32) -> i64 {
        let (dx, dy) = (i64::from(dx), i64::from(dy));
        self.start.wrapping_add(dy.wrapping_mul(self.dy)).wrapping_add(dx.wrapping_mul(self.dx))
    }

    fn adjust_subpixel(&mut self, dx: i32, dy: i32) {
        let (dx, dy) = (i64::from(dx), i64::from(dy));
        self.start = self.start.wrapping_add(
            dy.wrapping_mul(self.dy).wrapping_add(dx.wrapping_mul(self.dx)) >> 4,
        );
    }
}

// FBI-side triangle parameters: vertices and iterated color, Z and W
#[derive(Debug, Clone, Default, PartialEq, Eq, Encode, Decode)]
pub struct TriangleSetup {
    pub a: Vertex,
    pub b: Vertex,
    pub c: Vertex,
    pub r: Gradient<i32>,
    pub g: Gradient<i32>,
    pub b_color: Gradient<i32>,
    pub a_color: Gradient<i32>,
    pub z: Gradient<i32>,
    pub w: Gradient<i64>,
}

impl TriangleSetup {
    // Subpixel offset from vertex A to the centre of its pixel
    pub fn subpixel_offset(&self) -> (i32, i32) {
        (8 - (i32::from(self.a.x) & 15), 8 - (i32::from(self.a.y) & 15))
    }

    pub fn adjust_subpixel(&mut self) {
        let (dx, dy) = self.subpixel_offset();
        for gradient in [&mut self.r, &mut self.g, &mut self.b_color, &mut self.a_color, &mut self.z]
        {
            gradient.adjust_subpixel(dx, dy);
        }
        self.w.adjust_subpixel(dx, dy);
    }
}

// Applies the same subpixel correction to a TMU's S/T/W
pub fn adjust_texture_subpixel(iterators: &mut TmuIterators, (dx, dy): (i32, i32)) {
    let (dx, dy) = (i64::from(dx), i64::from(dy));
    let adjust = |start: &mut i64, d_dx: i64, d_dy: i64| {
        *start = start.wrapping_add(dy.wrapping_mul(d_dy).wrapping_add(dx.wrapping_mul(d_dx)) >> 4);
    };
    adjust(&mut iterators.start_s, iterators.ds_dx, iterators.ds_dy);
    adjust(&mut iterators.start_t, iterators.dt_dx, iterators.dt_dy);
    adjust(&mut iterators.start_w, iterators.dw_dx, iterators.dw_dy);
}

// Edge walking state: X at the top vertex in 12.4 and the 16.16 slope in 12.4 units per 12.4 Y
#[derive(Debug, Clone, Copy)]
struct Edge {
    top: Vertex,
    slope: i64,
}

impl Edge {
    fn new(top: Vertex, bottom: Vertex) -> Self {
        let dy = i64::from(bottom.y) - i64::from(top.y);
        // Horizontal edges never cover a sample row; treat them as vertical
        let slope =
            if dy == 0 { 0 } else { ((i64::from(bottom.x) - i64::from(top.x)) << 16) / dy };
        Self { top, slope }
    }

    fn x_at(&self, fy: i32) -> i64 {
        i64::from(self.top.x) + ((i64::from(fy - i32::from(self.top.y)) * self.slope) >> 16)
    }
}

fn pixel_ceil(coordinate: i64) -> i32 {
    ((coordinate + 7) >> 4) as i32
}

// Covered [start, stop) column range for each covered row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub y: i32,
    pub start_x: i32,
    pub stop_x: i32,
}

pub fn triangle_spans(vertices: [Vertex; 3]) -> impl Iterator<Item = Span> {
    let mut sorted = vertices;
    sorted.sort_by_key(|vertex| vertex.y);
    let [min, mid, max] = sorted;

    let long_edge = Edge::new(min, max);
    let upper_edge = Edge::new(min, mid);
    let lower_edge = Edge::new(mid, max);

    let first_row = (i32::from(min.y) + 7) >> 4;
    let last_row = (i32::from(max.y) + 7) >> 4;

    (first_row..last_row).map(move |y| {
        let fy = y * 16 + 8;
        let short_edge = if fy < i32::from(mid.y) { upper_edge } else { lower_edge };

        let mut start_x = pixel_ceil(long_edge.x_at(fy));
        let mut stop_x = pixel_ceil(short_edge.x_at(fy));
        if start_x > stop_x {
            std::mem::swap(&mut start_x, &mut stop_x);
        }

        Span { y, start_x, stop_x }
    })
}

pub struct TriangleRaster<'a, 'p> {
    pub setup: &'a TriangleSetup,
    pub pipeline: &'a mut PixelPipeline<'p>,
    // Indexed by TMU number; TMU 1 feeds TMU 0
    pub textures: &'a [Option<TextureStage<'a>>; MAX_TMU],
    // Some(origin) when raster Y is flipped to screen Y
    pub y_flip: Option<i32>,
}

impl TriangleRaster<'_, '_> {
    // Draws every covered pixel; returns the number of pixels that entered the pipeline
    pub fn draw(&mut self) -> u32 {
        let setup = self.setup;
        let fbz_mode = self.pipeline.config().fbz_mode;
        let clamp = self.pipeline.config().color_path.rgbzw_clamp();

        let origin_x = i32::from(setup.a.x) >> 4;
        let origin_y = i32::from(setup.a.y) >> 4;

        let mut pixels = 0;
        for Span { y, start_x, stop_x } in triangle_spans([setup.a, setup.b, setup.c]) {
            let screen_y = match self.y_flip {
                Some(origin) => (origin - y) & 0x3FF,
                None => y,
            };
            let dither = Dither::new(fbz_mode, y);

            let (dx, dy) = (start_x - origin_x, y - origin_y);
            let mut r = setup.r.at(dx, dy);
            let mut g = setup.g.at(dx, dy);
            let mut b = setup.b_color.at(dx, dy);
            let mut a = setup.a_color.at(dx, dy);
            let mut z = setup.z.at(dx, dy);
            let mut w = setup.w.at(dx, dy);
            let mut coords: [TexCoords; MAX_TMU] = std::array::from_fn(|i| {
                self.textures[i]
                    .as_ref()
                    .map(|stage| stage.iterators().at(dx.into(), dy.into()))
                    .unwrap_or_default()
            });

            for x in start_x..stop_x {
                let position = PixelPosition { x, y, screen_y };
                let iterated = Iterated { color: clamped_argb(r, g, b, a, clamp), z, w };
                self.draw_pixel(position, &dither, &iterated, &coords);

                r = r.wrapping_add(setup.r.dx);
                g = g.wrapping_add(setup.g.dx);
                b = b.wrapping_add(setup.b_color.dx);
                a = a.wrapping_add(setup.a_color.dx);
                z = z.wrapping_add(setup.z.dx);
                w = w.wrapping_add(setup.w.dx);
                for (stage, coords) in self.textures.iter().zip(&mut coords) {
                    if let Some(stage) = stage {
                        stage.iterators().step_x(coords);
                    }
                }
            }

            pixels += (stop_x - start_x) as u32;
        }

        pixels
    }

    fn draw_pixel(
        &mut self,
        position: PixelPosition,
        dither: &Dither,
        iterated: &Iterated,
        coords: &[TexCoords; MAX_TMU],
    ) {
        let Some(depth) = self.pipeline.begin(position, iterated) else { return };

        let mut texel = Argb::BLACK;
        for tmu in (0..MAX_TMU).rev() {
            if let Some(stage) = &self.textures[tmu] {
                texel = stage.process(position.x, dither, coords[tmu], texel);
            }
        }

        if let Some(color) = self.pipeline.color_path(iterated, texel) {
            self.pipeline.end(position, dither, depth, color, iterated);
        }
    }
}
