//! Voodoo 2 triangle setup unit
//!
//! The host streams floating-point vertices through the `s*` registers; the setup unit keeps
//! the last three, computes start values and X/Y gradients itself, and hands the result to the
//! normal triangle path. Strips shift every vertex down one slot, fans keep the first vertex.


use crate::rasterizer::{Gradient, TriangleSetup, Vertex};
use crate::registers::{Register, RegisterCell, NUM_REGISTERS};
use crate::texture::Tmu;
use bincode::{Decode, Encode};
use proc_bitfield::bitfield;

bitfield! {
    #[derive(Clone, Copy, PartialEq, Eq, Default)]
    pub struct SetupMode(pub u32): Debug, FromStorage, IntoStorage {
        pub setup_rgb: bool @ 0,
        pub setup_alpha: bool @ 1,
        pub setup_z: bool @ 2,
        pub setup_wb: bool @ 3,
        pub setup_w0: bool @ 4,
        pub setup_st0: bool @ 5,
        pub setup_w1: bool @ 6,
        pub setup_st1: bool @ 7,
        pub fan: bool @ 16,
        pub enable_culling: bool @ 17,
        pub culling_sign: bool @ 18,
        pub disable_ping_pong: bool @ 19,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Encode, Decode)]
pub struct SetupVertex {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub wb: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
    pub s0: f32,
    pub t0: f32,
    pub w0: f32,
    pub s1: f32,
    pub t1: f32,
    pub w1: f32,
}

impl SetupVertex {
    fn from_registers(regs: &[RegisterCell; NUM_REGISTERS]) -> Self {
        let f = |register: usize| regs[register].f32();
        Self {
            x: f(Register::S_VX),
            y: f(Register::S_VY),
            z: f(Register::S_VZ),
            wb: f(Register::S_WB),
            r: f(Register::S_RED),
            g: f(Register::S_GREEN),
            b: f(Register::S_BLUE),
            a: f(Register::S_ALPHA),
            s0: f(Register::S_S_W0),
            t0: f(Register::S_T_W0),
            w0: f(Register::S_WTMU0),
            s1: f(Register::S_S_WTMU1),
            t1: f(Register::S_T_WTMU1),
            w1: f(Register::S_WTMU1),
        }
    }
}

// sARGB unpacks into the four float colour registers
pub fn unpack_argb(regs: &mut [RegisterCell; NUM_REGISTERS], data: u32) {
    let [b, g, r, a] = data.to_le_bytes();
    regs[Register::S_ALPHA].set_f32(a.into());
    regs[Register::S_RED].set_f32(r.into());
    regs[Register::S_GREEN].set_f32(g.into());
    regs[Register::S_BLUE].set_f32(b.into());
}

// Edge terms shared by every parameter's gradient computation
#[derive(Debug, Clone, Copy)]
struct PlaneEquation {
    divisor: f32,
    dx1: f32,
    dx2: f32,
    dy1: f32,
    dy2: f32,
}

impl PlaneEquation {
    fn new([v0, v1, v2]: &[SetupVertex; 3]) -> Self {
        Self {
            divisor: 1.0 / ((v0.x - v1.x) * (v0.y - v2.y) - (v0.x - v2.x) * (v0.y - v1.y)),
            dx1: v0.y - v2.y,
            dx2: v0.y - v1.y,
            dy1: v0.x - v1.x,
            dy2: v0.x - v2.x,
        }
    }

    fn deltas(&self, [p0, p1, p2]: [f32; 3], scale: f32) -> (f32, f32) {
        let tdiv = self.divisor * scale;
        let dx = ((p0 - p1) * self.dx1 - (p0 - p2) * self.dx2) * tdiv;
        let dy = ((p0 - p2) * self.dy1 - (p0 - p1) * self.dy2) * tdiv;
        (dx, dy)
    }

    // 12.12 colors and 20.12 Z
    fn gradient32(&self, values: [f32; 3]) -> Gradient<i32> {
        const SCALE: f32 = 4096.0;
        let (dx, dy) = self.deltas(values, SCALE);
        Gradient { start: (values[0] * SCALE) as i32, dx: dx as i32, dy: dy as i32 }
    }

    // .32 S/T/W
    fn gradient64(&self, values: [f32; 3]) -> Gradient<i64> {
        const SCALE: f32 = 65536.0 * 65536.0;
        let (dx, dy) = self.deltas(values, SCALE);
        Gradient { start: (values[0] * SCALE) as i64, dx: dx as i64, dy: dy as i64 }
    }
}

fn set_w(tmu: &mut Tmu, w: Gradient<i64>) {
    tmu.iterators.start_w = w.start;
    tmu.iterators.dw_dx = w.dx;
    tmu.iterators.dw_dy = w.dy;
}

fn set_st(tmu: &mut Tmu, s: Gradient<i64>, t: Gradient<i64>) {
    let iterators = &mut tmu.iterators;
    (iterators.start_s, iterators.ds_dx, iterators.ds_dy) = (s.start, s.dx, s.dy);
    (iterators.start_t, iterators.dt_dx, iterators.dt_dy) = (t.start, t.dx, t.dy);
}

#[derive(Debug, Clone, Default, Encode, Decode)]
pub struct SetupUnit {
    vertices: [SetupVertex; 3],
    count: u32,
}

impl SetupUnit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> u32 {
        self.count
    }

    pub fn vertices(&self) -> &[SetupVertex; 3] {
        &self.vertices
    }

    // sBeginTriCMD: the current vertex fills every slot
    pub fn begin(&mut self, regs: &[RegisterCell; NUM_REGISTERS]) {
        self.vertices = [SetupVertex::from_registers(regs); 3];
        self.count = 1;
    }

    // sDrawTriCMD: returns true once three vertices are available
    pub fn push_vertex(&mut self, regs: &[RegisterCell; NUM_REGISTERS]) -> bool {
        let mode = SetupMode(regs[Register::S_SETUP_MODE].u32());
        if !mode.fan() {
            self.vertices[0] = self.vertices[1];
        }
        self.vertices[1] = self.vertices[2];
        self.vertices[2] = SetupVertex::from_registers(regs);

        self.count = self.count.saturating_add(1);
        self.count >= 3
    }

    // Computes the triangle parameters enabled in sSetupMode; returns false if the triangle was
    // culled, in which case nothing is modified
    pub fn setup_triangle(
        &self,
        mode: SetupMode,
        fbi: &mut TriangleSetup,
        tmus: &mut [Tmu],
    ) -> bool {
        let vertices = &self.vertices;
        let plane = PlaneEquation::new(vertices);

        if mode.enable_culling() {
            let mut culling_sign = mode.culling_sign();
            // Strips alternate winding on every other triangle
            if !mode.fan() && !mode.disable_ping_pong() {
                culling_sign ^= (self.count.wrapping_sub(3) & 1) != 0;
            }

            if (plane.divisor < 0.0) == culling_sign {
                log::trace!("Setup unit culled triangle {vertices:?}");
                return false;
            }
        }

        // 12.4 vertex positions
        [fbi.a, fbi.b, fbi.c] =
            vertices.map(|vertex| Vertex::new((vertex.x * 16.0) as i16, (vertex.y * 16.0) as i16));

        let values = |f: fn(&SetupVertex) -> f32| vertices.each_ref().map(f);

        if mode.setup_rgb() {
            fbi.r = plane.gradient32(values(|v| v.r));
            fbi.g = plane.gradient32(values(|v| v.g));
            fbi.b_color = plane.gradient32(values(|v| v.b));
        }
        if mode.setup_alpha() {
            fbi.a_color = plane.gradient32(values(|v| v.a));
        }
        if mode.setup_z() {
            fbi.z = plane.gradient32(values(|v| v.z));
        }

        if mode.setup_wb() {
            let w = plane.gradient64(values(|v| v.wb));
            fbi.w = w;
            for tmu in tmus.iter_mut() {
                set_w(tmu, w);
            }
        }
        if mode.setup_w0() {
            let w = plane.gradient64(values(|v| v.w0));
            for tmu in tmus.iter_mut() {
                set_w(tmu, w);
            }
        }
        if mode.setup_st0() {
            let s = plane.gradient64(values(|v| v.s0));
            let t = plane.gradient64(values(|v| v.t0));
            for tmu in tmus.iter_mut() {
                set_st(tmu, s, t);
            }
        }
        if let Some(tmu1) = tmus.get_mut(1) {
            if mode.setup_w1() {
                set_w(tmu1, plane.gradient64(values(|v| v.w1)));
            }
            if mode.setup_st1() {
                let s = plane.gradient64(values(|v| v.s1));
                let t = plane.gradient64(values(|v| v.t1));
                set_st(tmu1, s, t);
            }
        }

        true
    }
}
