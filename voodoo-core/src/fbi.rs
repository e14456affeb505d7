//! Frame buffer interface: memory layout, fog table, buffer swapping and fast fills


use crate::dither::Dither;
use crate::memory::Ram;
use crate::pixel::{FrameTarget, PixelConfig, PixelPipeline, Statistics};
use crate::rasterizer::TriangleSetup;
use crate::registers::{ClipRect, FbzMode, Register, RegisterCell, RevisionConfig, NUM_REGISTERS};
use bincode::{Decode, Encode};
use proc_bitfield::bitfield;

const PAGE_SIZE: u32 = 0x1000;

pub const FOG_TABLE_ENTRIES: usize = 64;

// Swap history and vblank counters saturate here
const MAX_SWAP_HISTORY_COUNT: u32 = 15;
const MAX_VBLANK_COUNT: u32 = 250;

bitfield! {
    #[derive(Clone, Copy, PartialEq, Eq)]
    struct FbiInit1(u32): Debug, FromStorage, IntoStorage {
        x_video_tiles: u8 @ 4..=7,
        x_video_tiles_bit5: bool @ 24,
    }
}

bitfield! {
    #[derive(Clone, Copy, PartialEq, Eq)]
    struct FbiInit2(u32): Debug, FromStorage, IntoStorage {
        enable_triple_buffer: bool @ 4,
        video_buffer_offset: u16 @ 11..=19,
    }
}

bitfield! {
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct FbiInit3(pub u32): Debug, FromStorage, IntoStorage {
        pub disable_tmus: bool @ 6,
        pub y_origin_subtract: u16 @ 22..=31,
    }
}

bitfield! {
    #[derive(Clone, Copy, PartialEq, Eq)]
    struct FbiInit5(u32): Debug, FromStorage, IntoStorage {
        buffer_allocation: u8 @ 9..=10,
    }
}

bitfield! {
    #[derive(Clone, Copy, PartialEq, Eq)]
    struct FbiInit6(u32): Debug, FromStorage, IntoStorage {
        x_video_tiles_bit0: bool @ 30,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct FogTable {
    pub blend: [u8; FOG_TABLE_ENTRIES],
    pub delta: [u8; FOG_TABLE_ENTRIES],
}

impl FogTable {
    pub fn new() -> Self {
        Self { blend: [0; FOG_TABLE_ENTRIES], delta: [0; FOG_TABLE_ENTRIES] }
    }

    // Each register packs two entries as (delta0, blend0, delta1, blend1) from the low byte up
    pub fn write(&mut self, register: usize, data: u32) {
        let base = 2 * (register % Register::FOG_TABLE_LEN);
        let [delta0, blend0, delta1, blend1] = data.to_le_bytes();
        self.delta[base] = delta0;
        self.blend[base] = blend0;
        self.delta[base + 1] = delta1;
        self.blend[base + 1] = blend1;
    }
}

impl Default for FogTable {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferSelect {
    Front,
    Back,
    Aux,
}

impl BufferSelect {
    // Decodes the 2-bit draw/read buffer fields; reserved codes select nothing
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(Self::Front),
            1 => Some(Self::Back),
            2 => Some(Self::Aux),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub struct FrameLayout {
    pub rgb_offsets: [Option<u32>; 3],
    pub aux_offset: Option<u32>,
    pub row_pixels: u32,
    pub y_origin: i32,
}

impl FrameLayout {
    // Flips a raster Y coordinate when the Y origin is at the bottom of the screen
    pub fn screen_y(&self, y: i32, flip: bool) -> i32 {
        if flip { (self.y_origin - y) & 0x3FF } else { y }
    }
}

#[derive(Debug, Clone, Default, Encode, Decode)]
struct SwapState {
    pending: u32,
    vblank_count: u32,
    sync_pending: bool,
    interval: u32,
    dont_swap: bool,
    history: u32,
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct Fbi {
    ram: Ram,
    layout: FrameLayout,
    front: usize,
    back: usize,
    fog_table: FogTable,
    swap: SwapState,
    in_vblank: bool,
    pub stats: Statistics,
    pub triangles_out: u32,
    pub setup: TriangleSetup,
}

impl Fbi {
    pub fn new(ram_len: usize) -> Self {
        Self {
            ram: Ram::new(ram_len),
            layout: FrameLayout {
                rgb_offsets: [Some(0), Some(0), None],
                aux_offset: None,
                row_pixels: 0,
                y_origin: 0,
            },
            front: 0,
            back: 1,
            fog_table: FogTable::new(),
            swap: SwapState::default(),
            in_vblank: false,
            stats: Statistics::default(),
            triangles_out: 0,
            setup: TriangleSetup::default(),
        }
    }

    pub fn ram(&self) -> &Ram {
        &self.ram
    }

    pub fn ram_mut(&mut self) -> &mut Ram {
        &mut self.ram
    }

    pub fn layout(&self) -> &FrameLayout {
        &self.layout
    }

    pub fn fog_table(&self) -> &FogTable {
        &self.fog_table
    }

    pub fn fog_table_mut(&mut self) -> &mut FogTable {
        &mut self.fog_table
    }

    pub fn front_buffer_index(&self) -> usize {
        self.front
    }

    pub fn swaps_pending(&self) -> u32 {
        self.swap.pending
    }

    pub fn swap_history(&self) -> u32 {
        self.swap.history
    }

    pub fn in_vblank(&self) -> bool {
        self.in_vblank
    }

    pub fn buffer_offset(&self, select: BufferSelect) -> Option<u32> {
        match select {
            BufferSelect::Front => self.layout.rgb_offsets[self.front],
            BufferSelect::Back => self.layout.rgb_offsets[self.back],
            BufferSelect::Aux => self.layout.aux_offset,
        }
    }

    // Draw target for a draw buffer field; Banshee always draws to the back buffer
    pub fn draw_buffer_offset(&self, bits: u8, config: &RevisionConfig) -> Option<u32> {
        let select = if config.banshee_layout {
            Some(BufferSelect::Back)
        } else {
            BufferSelect::from_bits(bits)
        };
        match select {
            Some(select @ (BufferSelect::Front | BufferSelect::Back)) => self.buffer_offset(select),
            _ => {
                log::warn!("Drawing to reserved buffer code {bits}; ignoring");
                None
            }
        }
    }

    // Splits out the frame buffer RAM, fog table and statistics borrows the pixel pipeline needs
    pub fn pixel_pipeline<'a>(
        &'a mut self,
        config: &'a PixelConfig,
        draw_offset: u32,
        stipple: u32,
    ) -> PixelPipeline<'a> {
        let target = FrameTarget {
            ram: &mut self.ram,
            draw_base: draw_offset,
            aux_base: self.layout.aux_offset,
            row_pixels: self.layout.row_pixels,
        };
        PixelPipeline::new(config, &self.fog_table, target, stipple, &mut self.stats)
    }

    // Recomputes the buffer layout from fbiInit1/2/3/5/6 (Voodoo 1 and 2)
    pub fn recompute_layout(&mut self, regs: &[RegisterCell; NUM_REGISTERS], config: &RevisionConfig) {
        let init1 = FbiInit1(regs[Register::FBI_INIT1].u32());
        let init2 = FbiInit2(regs[Register::FBI_INIT2].u32());
        let init3 = FbiInit3(regs[Register::FBI_INIT3].u32());
        let init5 = FbiInit5(regs[Register::FBI_INIT5].u32());
        let init6 = FbiInit6(regs[Register::FBI_INIT6].u32());
        let voodoo2 = config.revision.is_voodoo2_or_later();

        let buffer_size = u32::from(init2.video_buffer_offset()) * PAGE_SIZE;

        let mut memory_config = u8::from(init2.enable_triple_buffer());
        if voodoo2 && memory_config == 0 {
            memory_config = init5.buffer_allocation();
        }

        let mut x_tiles = u32::from(init1.x_video_tiles());
        if voodoo2 {
            x_tiles = (x_tiles << 1)
                | (u32::from(init1.x_video_tiles_bit5()) << 5)
                | u32::from(init6.x_video_tiles_bit0());
        }

        let layout = &mut self.layout;
        layout.row_pixels = config.tile_width * x_tiles;
        layout.y_origin = init3.y_origin_subtract().into();

        layout.rgb_offsets[0] = Some(0);
        layout.rgb_offsets[1] = Some(buffer_size);
        (layout.rgb_offsets[2], layout.aux_offset) = match memory_config {
            // 3 color buffers, no aux buffer
            1 => (Some(2 * buffer_size), None),
            // 3 color buffers, 1 aux buffer
            2 => (Some(2 * buffer_size), Some(3 * buffer_size)),
            // 2 color buffers, 1 aux buffer; code 3 is reserved
            code => {
                if code == 3 {
                    log::warn!("Reserved buffer allocation 3; using 2 color + 1 aux");
                }
                (None, Some(2 * buffer_size))
            }
        };

        let mask = self.ram.mask();
        for offset in layout.rgb_offsets.iter_mut().chain([&mut layout.aux_offset]).flatten() {
            *offset = (*offset).min(mask);
        }

        if layout.rgb_offsets[2].is_none() {
            if self.front == 2 {
                self.front = 0;
            }
            if self.back == 2 {
                self.back = 0;
            }
        }

        log::debug!(
            "Frame buffer layout: {} pixels per row, buffers {:X?}, aux {:X?}, Y origin {}",
            layout.row_pixels,
            layout.rgb_offsets,
            layout.aux_offset,
            layout.y_origin
        );
    }

    // Banshee swapPending writes announce a swap ahead of the command
    pub fn add_pending_swap(&mut self) {
        self.swap.pending += 1;
    }

    // Banshee programs buffer addresses and strides directly
    pub fn write_banshee_buffer_register(&mut self, register: usize, data: u32) {
        let mask = self.ram.mask();
        match register {
            Register::COL_BUFFER_ADDR => {
                self.layout.rgb_offsets[1] = Some(data & mask & !0xF);
            }
            Register::COL_BUFFER_STRIDE => {
                self.layout.row_pixels =
                    if data & 0x8000 != 0 { (data & 0x7F) << 6 } else { (data & 0x3FFF) >> 1 };
            }
            Register::AUX_BUFFER_ADDR => {
                self.layout.aux_offset = Some(data & mask & !0xF);
            }
            Register::AUX_BUFFER_STRIDE => {
                let row_pixels =
                    if data & 0x8000 != 0 { (data & 0x7F) << 6 } else { (data & 0x3FFF) >> 1 };
                if row_pixels != self.layout.row_pixels {
                    log::warn!(
                        "Aux buffer stride {row_pixels} differs from color buffer stride {}",
                        self.layout.row_pixels
                    );
                }
            }
            _ => {}
        }

        self.front = 0;
        self.back = 1;
    }

    // swapbufferCMD: bit 0 waits for vertical retrace, bits 1-8 are the swap interval
    pub fn swap_buffer_command(&mut self, data: u32, banshee_overlay: Option<u32>) {
        self.swap.pending += 1;
        self.swap.sync_pending = true;
        self.swap.interval = (data >> 1) & 0xFF;
        self.swap.dont_swap = (data >> 9) & 1 != 0;

        if data & 1 == 0 {
            self.swap_buffers(banshee_overlay);
        }
    }

    fn swap_buffers(&mut self, banshee_overlay: Option<u32>) {
        let count = self.swap.vblank_count.min(MAX_SWAP_HISTORY_COUNT);
        self.swap.history = (self.swap.history << 4) | count;

        match banshee_overlay {
            Some(overlay) => {
                self.layout.rgb_offsets[0] = Some(overlay & self.ram.mask() & !0xF);
            }
            None if !self.swap.dont_swap => {
                if self.layout.rgb_offsets[2].is_none() {
                    self.front = 1 - self.front;
                    self.back = 1 - self.front;
                } else {
                    self.front = (self.front + 1) % 3;
                    self.back = (self.front + 1) % 3;
                }
            }
            None => {}
        }

        self.swap.pending = self.swap.pending.saturating_sub(1);
        self.swap.vblank_count = 0;
        self.swap.sync_pending = false;

        log::debug!("Buffer swap: front={} back={}", self.front, self.back);
    }

    // Start of vertical retrace; performs a synced swap once its interval has elapsed
    pub fn vblank(&mut self, banshee_overlay: Option<u32>) {
        self.in_vblank = true;
        if self.swap.vblank_count < MAX_VBLANK_COUNT {
            self.swap.vblank_count += 1;
        }

        if self.swap.sync_pending && self.swap.vblank_count >= self.swap.interval {
            self.swap_buffers(banshee_overlay);
        }
    }

    pub fn end_vblank(&mut self) {
        self.in_vblank = false;
    }

    // Fills the clip rectangle with dithered color1 and/or the zaColor depth
    pub fn fastfill(&mut self, regs: &[RegisterCell; NUM_REGISTERS], draw_offset: Option<u32>) {
        let fbz_mode = FbzMode(regs[Register::FBZ_MODE].u32());
        let clip = ClipRect::from_registers(
            regs[Register::CLIP_LEFT_RIGHT].u32(),
            regs[Register::CLIP_LOW_Y_HIGH_Y].u32(),
        );
        let color = regs[Register::COLOR1].argb();
        let depth = regs[Register::ZA_COLOR].u32() as u16;

        let draw_offset = draw_offset.filter(|_| fbz_mode.rgb_buffer_mask());
        let aux_offset = self.layout.aux_offset.filter(|_| fbz_mode.aux_buffer_mask());
        if draw_offset.is_none() && aux_offset.is_none() {
            return;
        }

        let width = (clip.right - clip.left).max(0) as u32;
        for y in clip.low_y..clip.high_y {
            let screen_y = self.layout.screen_y(y, fbz_mode.y_origin());
            let row_base = (screen_y as u32).wrapping_mul(self.layout.row_pixels);

            if let Some(base) = draw_offset {
                let dither = Dither::new(fbz_mode, y);
                for x in clip.left..clip.right {
                    let value = dither.apply(x, color.r.into(), color.g.into(), color.b.into());
                    let address = row_base.wrapping_add(x as u32).wrapping_mul(2);
                    self.ram.write_u16(base.wrapping_add(address), value);
                }
                self.stats.pixels_out = self.stats.pixels_out.wrapping_add(width);
            }

            if let Some(base) = aux_offset {
                for x in clip.left..clip.right {
                    let address = row_base.wrapping_add(x as u32).wrapping_mul(2);
                    self.ram.write_u16(base.wrapping_add(address), depth);
                }
            }
        }

        log::trace!("Fast fill {clip:?} color={color:?} depth={depth:04X}");
    }
}
