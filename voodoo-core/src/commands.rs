//! Register write dispatch: parameter conversion, FBI/TMU commands and the triangle trigger


use crate::api::Voodoo;
use crate::fbi::FbiInit3;
use crate::num::{float_to_fixed32, float_to_fixed64, U32Ext};
use crate::pixel::PixelConfig;
use crate::rasterizer::{
    adjust_texture_subpixel, Gradient, RasterEntry, RasterKey, TriangleRaster, Vertex,
};
use crate::registers::{FbzColorPath, FbzMode, Register};
use crate::setup::{self, SetupMode};
use crate::texture::{TextureStage, TmuIterators, MAX_TMU};

const CHIP_FBI: u32 = 1 << 0;

fn chip_tmu(index: usize) -> u32 {
    2 << index
}

// Which member of a start/dX/dY register triple is being written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GradientTerm {
    Start,
    Dx,
    Dy,
}

impl GradientTerm {
    fn of<T>(self, gradient: &mut Gradient<T>) -> &mut T {
        match self {
            Self::Start => &mut gradient.start,
            Self::Dx => &mut gradient.dx,
            Self::Dy => &mut gradient.dy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Parameter {
    Red,
    Green,
    Blue,
    Z,
    Alpha,
    S,
    T,
    W,
}

impl Parameter {
    // The integer (startR..dWdY) and float (fstartR..fdWdY) blocks share one layout
    fn decode(index: usize) -> (Self, GradientTerm) {
        let parameter = match index % 8 {
            0 => Self::Red,
            1 => Self::Green,
            2 => Self::Blue,
            3 => Self::Z,
            4 => Self::Alpha,
            5 => Self::S,
            6 => Self::T,
            _ => Self::W,
        };
        let term = match index / 8 {
            0 => GradientTerm::Start,
            1 => GradientTerm::Dx,
            _ => GradientTerm::Dy,
        };
        (parameter, term)
    }
}

fn tmu_term(iterators: &mut TmuIterators, parameter: Parameter, term: GradientTerm) -> &mut i64 {
    match (parameter, term) {
        (Parameter::S, GradientTerm::Start) => &mut iterators.start_s,
        (Parameter::S, GradientTerm::Dx) => &mut iterators.ds_dx,
        (Parameter::S, GradientTerm::Dy) => &mut iterators.ds_dy,
        (Parameter::T, GradientTerm::Start) => &mut iterators.start_t,
        (Parameter::T, GradientTerm::Dx) => &mut iterators.dt_dx,
        (Parameter::T, GradientTerm::Dy) => &mut iterators.dt_dy,
        (_, GradientTerm::Start) => &mut iterators.start_w,
        (_, GradientTerm::Dx) => &mut iterators.dw_dx,
        (_, GradientTerm::Dy) => &mut iterators.dw_dy,
    }
}

impl Voodoo {
    pub(crate) fn execute_register_write(&mut self, offset: u32, data: u32) {
        let register = (offset & 0xFF) as usize;
        let config = self.revision_config();
        let access = config.access(register);

        let mut chips = (offset >> 8) & 0xF;
        if chips == 0 {
            chips = 0xF;
        }

        log::trace!("{} = {data:08X} (chips {chips:X})", config.name(register));

        match register {
            Register::VERTEX_AX..=Register::VERTEX_CY => {
                if chips & CHIP_FBI != 0 {
                    self.write_vertex(register - Register::VERTEX_AX, data as i16);
                }
            }
            Register::FVERTEX_AX..=Register::FVERTEX_CY => {
                if chips & CHIP_FBI != 0 {
                    let value = float_to_fixed32(data, 4) as i16;
                    self.write_vertex(register - Register::FVERTEX_AX, value);
                }
            }
            Register::START_R..=Register::D_W_DY => {
                self.write_parameter(register - Register::START_R, data, false, chips);
            }
            Register::FSTART_R..=Register::FD_W_DY => {
                self.write_parameter(register - Register::FSTART_R, data, true, chips);
            }
            Register::TRIANGLE_CMD | Register::FTRIANGLE_CMD => self.draw_triangle(),
            Register::NOP_CMD => {
                if data.bit(0) {
                    self.fbi.stats.reset_registers();
                }
                if data.bit(1) {
                    self.fbi.triangles_out = 0;
                }
            }
            Register::FASTFILL_CMD => {
                let fbz_mode = FbzMode(self.regs[Register::FBZ_MODE].u32());
                let draw_offset = self.fbi.draw_buffer_offset(fbz_mode.draw_buffer(), config);
                self.fbi.fastfill(&self.regs, draw_offset);
            }
            Register::SWAPBUFFER_CMD => {
                let overlay = self.banshee_overlay();
                self.fbi.swap_buffer_command(data, overlay);
            }
            Register::FOG_TABLE..Register::FOG_TABLE_END => {
                if chips & CHIP_FBI != 0 {
                    self.fbi.fog_table_mut().write(register - Register::FOG_TABLE, data);
                }
            }
            Register::COL_BUFFER_ADDR..=Register::AUX_BUFFER_STRIDE if config.banshee_layout => {
                self.fbi.write_banshee_buffer_register(register, data);
            }
            Register::SWAP_PENDING if config.banshee_layout => self.fbi.add_pending_swap(),
            Register::S_ARGB => setup::unpack_argb(&mut self.regs, data),
            Register::S_BEGIN_TRI_CMD => self.setup.begin(&self.regs),
            Register::S_DRAW_TRI_CMD => {
                if self.setup.push_vertex(&self.regs) {
                    self.draw_setup_triangle();
                }
            }
            _ => {}
        }

        // The register files keep the raw value of every write
        let store_chips = if access.write_through() { 0xF } else { chips };
        if store_chips & CHIP_FBI != 0 {
            self.regs[register].set_u32(data);
        }
        for (i, tmu) in self.tmus.iter_mut().enumerate() {
            if store_chips & chip_tmu(i) != 0 {
                tmu.write_register(register, data);
            }
        }

        // Layout registers take effect once stored
        if store_chips & CHIP_FBI != 0 && !config.banshee_layout {
            match register {
                Register::FBI_INIT1
                | Register::FBI_INIT2
                | Register::FBI_INIT3
                | Register::FBI_INIT5
                | Register::FBI_INIT6 => self.fbi.recompute_layout(&self.regs, config),
                _ => {}
            }
        }
    }

    fn write_vertex(&mut self, index: usize, value: i16) {
        let setup = &mut self.fbi.setup;
        let vertex: &mut Vertex = match index / 2 {
            0 => &mut setup.a,
            1 => &mut setup.b,
            _ => &mut setup.c,
        };
        if index % 2 == 0 {
            vertex.x = value;
        } else {
            vertex.y = value;
        }
    }

    fn write_parameter(&mut self, index: usize, data: u32, float: bool, chips: u32) {
        let (parameter, term) = Parameter::decode(index);
        let setup = &mut self.fbi.setup;

        match parameter {
            Parameter::Red | Parameter::Green | Parameter::Blue | Parameter::Alpha => {
                // 12.12, sign-extended from 24 bits
                let value = if float { float_to_fixed32(data, 12) } else { data.sign_extend(24) };
                if chips & CHIP_FBI != 0 {
                    let gradient = match parameter {
                        Parameter::Red => &mut setup.r,
                        Parameter::Green => &mut setup.g,
                        Parameter::Blue => &mut setup.b_color,
                        _ => &mut setup.a_color,
                    };
                    *term.of(gradient) = value;
                }
            }
            Parameter::Z => {
                // 20.12
                let value = if float { float_to_fixed32(data, 12) } else { data as i32 };
                if chips & CHIP_FBI != 0 {
                    *term.of(&mut setup.z) = value;
                }
            }
            Parameter::S | Parameter::T | Parameter::W => {
                // S/T are 14.18 and W is 2.30 on the bus; all iterate as 16.32
                let value = match (float, parameter) {
                    (true, _) => float_to_fixed64(data, 32),
                    (false, Parameter::W) => i64::from(data as i32) << 2,
                    (false, _) => i64::from(data as i32) << 14,
                };

                if parameter == Parameter::W && chips & CHIP_FBI != 0 {
                    *term.of(&mut setup.w) = value;
                }
                for (i, tmu) in self.tmus.iter_mut().enumerate() {
                    if chips & chip_tmu(i) != 0 {
                        *tmu_term(&mut tmu.iterators, parameter, term) = value;
                    }
                }
            }
        }
    }

    fn draw_setup_triangle(&mut self) {
        let mode = SetupMode(self.regs[Register::S_SETUP_MODE].u32());
        if self.setup.setup_triangle(mode, &mut self.fbi.setup, &mut self.tmus) {
            self.draw_triangle();
        }
    }

    // Rasterizes the triangle described by the current FBI and TMU parameters
    pub(crate) fn draw_triangle(&mut self) {
        let config = self.revision_config();
        let color_path = FbzColorPath(self.regs[Register::FBZ_COLOR_PATH].u32());
        let fbz_mode = FbzMode(self.regs[Register::FBZ_MODE].u32());
        let init3 = FbiInit3(self.regs[Register::FBI_INIT3].u32());

        let texture_count = if color_path.texture_enable() && !init3.disable_tmus() {
            self.tmus.len().min(MAX_TMU)
        } else {
            0
        };

        if color_path.subpixel_adjust() {
            let offset = self.fbi.setup.subpixel_offset();
            self.fbi.setup.adjust_subpixel();
            for tmu in &mut self.tmus[..texture_count] {
                adjust_texture_subpixel(&mut tmu.iterators, offset);
            }
        }

        let Some(draw_offset) = self.fbi.draw_buffer_offset(fbz_mode.draw_buffer(), config) else {
            return;
        };

        let mut lod_bases = [None; MAX_TMU];
        for (lod_base, tmu) in lod_bases.iter_mut().zip(&mut self.tmus[..texture_count]) {
            *lod_base = tmu.begin_triangle();
        }

        let texture_modes: [Option<u32>; MAX_TMU] = std::array::from_fn(|i| {
            (i < texture_count).then(|| self.tmus[i].texture_mode().0)
        });
        let key = RasterKey::new(
            color_path.0,
            self.regs[Register::ALPHA_MODE].u32(),
            self.regs[Register::FOG_MODE].u32(),
            fbz_mode.0,
            texture_modes,
        );
        let mut uncached = None;
        let entry = match self.raster_cache.find_or_insert(key) {
            Some(entry) => entry,
            None => uncached.insert(RasterEntry::new(key)),
        };

        let pixel_config = PixelConfig::from_registers(&self.regs, config, entry.color_combine);
        let textures: [Option<TextureStage>; MAX_TMU] = std::array::from_fn(|i| {
            lod_bases[i].map(|lod_base| {
                TextureStage::new(&self.tmus[i], lod_base, entry.texture_combine[i])
            })
        });

        let y_flip = fbz_mode.y_origin().then_some(self.fbi.layout().y_origin);
        let stipple = self.regs[Register::STIPPLE].u32();
        let setup = self.fbi.setup.clone();

        let mut pipeline = self.fbi.pixel_pipeline(&pixel_config, draw_offset, stipple);
        let pixels =
            TriangleRaster { setup: &setup, pipeline: &mut pipeline, textures: &textures, y_flip }
                .draw();
        let stipple = pipeline.stipple();

        entry.polygons = entry.polygons.wrapping_add(1);
        entry.pixels += u64::from(pixels);

        self.regs[Register::STIPPLE].set_u32(stipple);
        self.fbi.triangles_out = self.fbi.triangles_out.wrapping_add(1);

        log::trace!(
            "Triangle {:?} {:?} {:?}: {pixels} pixels",
            setup.a,
            setup.b,
            setup.c
        );
    }
}
