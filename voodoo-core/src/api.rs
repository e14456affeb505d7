
use crate::fbi::{BufferSelect, Fbi, FrameLayout};
use crate::fifo::PciFifo;
use crate::pixel::Statistics;
use crate::rasterizer::RasterCache;
use crate::registers::{Register, RegisterCell, Revision, RevisionConfig, NUM_REGISTERS};
use crate::setup::SetupUnit;
use crate::texture::{Tmu, MAX_TMU};
use bincode::error::{DecodeError, EncodeError};
use bincode::{Decode, Encode};
use thiserror::Error;

const MAX_MEMORY_MB: u32 = 16;

macro_rules! bincode_config {
    () => {
        bincode::config::standard()
            .with_little_endian()
            .with_fixed_int_encoding()
            .with_limit::<1_000_000_000>()
    };
}

#[derive(Debug, Error)]
pub enum VoodooError {
    #[error("Frame buffer memory must be a power of two from 1 to {MAX_MEMORY_MB} MB, was {mb} MB")]
    InvalidFrameBufferSize { mb: u32 },
    #[error("Texture memory must be a power of two from 1 to {MAX_MEMORY_MB} MB, was {mb} MB")]
    InvalidTextureMemorySize { mb: u32 },
    #[error("TMU count must be at most {MAX_TMU}, was {count}")]
    InvalidTmuCount { count: usize },
    #[error("Error encoding save state: {0}")]
    StateEncode(#[from] EncodeError),
    #[error("Error decoding save state: {0}")]
    StateDecode(#[from] DecodeError),
}

pub type VoodooResult<T> = Result<T, VoodooError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct VoodooConfig {
    pub revision: Revision,
    pub fb_memory_mb: u32,
    pub tmu_memory_mb: u32,
    pub tmu_count: usize,
    // Queue FIFO-flagged register writes until a flush, read, or non-FIFO write
    pub defer_fifo: bool,
}

impl Default for VoodooConfig {
    fn default() -> Self {
        Self {
            revision: Revision::default(),
            fb_memory_mb: 4,
            tmu_memory_mb: 4,
            tmu_count: MAX_TMU,
            defer_fifo: false,
        }
    }
}

fn valid_memory_size(mb: u32) -> bool {
    mb.is_power_of_two() && mb <= MAX_MEMORY_MB
}

impl VoodooConfig {
    pub fn validate(&self) -> VoodooResult<()> {
        if !valid_memory_size(self.fb_memory_mb) {
            return Err(VoodooError::InvalidFrameBufferSize { mb: self.fb_memory_mb });
        }
        if !valid_memory_size(self.tmu_memory_mb) {
            return Err(VoodooError::InvalidTextureMemorySize { mb: self.tmu_memory_mb });
        }
        if self.tmu_count > MAX_TMU {
            return Err(VoodooError::InvalidTmuCount { count: self.tmu_count });
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Encode, Decode)]
pub struct Voodoo {
    pub(crate) config: VoodooConfig,
    pub(crate) regs: [RegisterCell; NUM_REGISTERS],
    pub(crate) fbi: Fbi,
    pub(crate) tmus: Vec<Tmu>,
    pub(crate) fifo: PciFifo,
    pub(crate) setup: SetupUnit,
    pub(crate) raster_cache: RasterCache,
}

impl Voodoo {
    pub fn new(config: VoodooConfig) -> VoodooResult<Self> {
        config.validate()?;

        let revision_config = config.revision.config();
        let fb_len = (config.fb_memory_mb as usize) << 20;
        let tmu_len = (config.tmu_memory_mb as usize) << 20;
        let tmus = (0..config.tmu_count).map(|i| Tmu::new(i, tmu_len, revision_config)).collect();

        log::info!(
            "Created {} with {} MB frame buffer and {} TMU(s) of {} MB",
            config.revision,
            config.fb_memory_mb,
            config.tmu_count,
            config.tmu_memory_mb
        );

        Ok(Self {
            config,
            regs: [RegisterCell::default(); NUM_REGISTERS],
            fbi: Fbi::new(fb_len),
            tmus,
            fifo: PciFifo::new(),
            setup: SetupUnit::new(),
            raster_cache: RasterCache::new(),
        })
    }

    pub fn config(&self) -> &VoodooConfig {
        &self.config
    }

    pub(crate) fn revision_config(&self) -> &'static RevisionConfig {
        self.config.revision.config()
    }

    // Register write entry point; `offset` is the dword register address including the chip
    // select bits 8-11
    pub fn write_register(&mut self, offset: u32, data: u32) {
        let register = (offset & 0xFF) as usize;
        let access = self.revision_config().access(register);
        if !access.write() {
            log::debug!(
                "Ignoring write to unwritable register {} ({data:08X})",
                self.revision_config().name(register)
            );
            return;
        }

        if self.config.defer_fifo && access.fifo() {
            if self.fifo.is_full() {
                self.flush();
            }
            self.fifo.push(offset, data);
            return;
        }

        self.flush();
        self.execute_register_write(offset, data);
    }

    // Applies every queued register write in order
    pub fn flush(&mut self) {
        while let Some(entry) = self.fifo.pop() {
            self.execute_register_write(entry.offset, entry.data);
        }
    }

    pub fn fifo_len(&self) -> usize {
        self.fifo.len()
    }

    pub fn read_register(&mut self, offset: u32) -> u32 {
        let register = (offset & 0xFF) as usize;
        let config = self.revision_config();
        if !config.access(register).read() {
            log::debug!("Read from unreadable register {}", config.name(register));
            return 0xFFFF_FFFF;
        }

        self.flush();

        let stats = &self.fbi.stats;
        let value = match register {
            Register::STATUS => self.status(),
            Register::FBI_PIXELS_IN => stats.pixels_in & 0xFF_FFFF,
            Register::FBI_CHROMA_FAIL => stats.chroma_fail & 0xFF_FFFF,
            Register::FBI_ZFUNC_FAIL => stats.zfunc_fail & 0xFF_FFFF,
            Register::FBI_AFUNC_FAIL => stats.afunc_fail & 0xFF_FFFF,
            Register::FBI_PIXELS_OUT => stats.pixels_out & 0xFF_FFFF,
            Register::FBI_TRIANGLES_OUT => self.fbi.triangles_out & 0xFF_FFFF,
            Register::FBI_SWAP_HISTORY => self.fbi.swap_history(),
            _ => self.regs[register].u32(),
        };

        log::trace!("{} read {value:08X}", config.name(register));
        value
    }

    // Reads always drain the FIFO first, so the chip is idle whenever status is observed
    fn status(&self) -> u32 {
        let free = if self.fifo.is_empty() { 0x3F } else { (self.fifo.free_space() / 2).min(0x3D) };
        let mut status = free as u32;
        status |= u32::from(self.fbi.in_vblank()) << 6;

        if !self.revision_config().banshee_layout {
            status |= (self.fbi.front_buffer_index() as u32) << 10;
            // Memory FIFO free space
            status |= 0xFFFF << 12;
        }

        status | (self.fbi.swaps_pending().min(7) << 28)
    }

    // Texture aperture write; `offset` is a dword offset with the TMU number in bits 19-20
    pub fn write_texture(&mut self, offset: u32, data: u32) {
        self.flush();

        let index = ((offset >> 19) & 3) as usize;
        let Some(tmu) = self.tmus.get_mut(index) else {
            log::debug!("Texture write to missing TMU{index} ignored");
            return;
        };

        let seq_8_downld = tmu.texture_mode().seq_8_downld();
        tmu.write_texture(offset, data, seq_8_downld);
    }

    // Start of vertical retrace
    pub fn vblank(&mut self) {
        self.flush();
        let overlay = self.banshee_overlay();
        self.fbi.vblank(overlay);
    }

    pub fn end_vblank(&mut self) {
        self.fbi.end_vblank();
    }

    pub(crate) fn banshee_overlay(&self) -> Option<u32> {
        self.revision_config()
            .banshee_layout
            .then(|| self.regs[Register::LEFT_OVERLAY_BUF].u32())
    }

    pub fn statistics(&self) -> Statistics {
        self.fbi.stats
    }

    pub fn triangles_out(&self) -> u32 {
        self.fbi.triangles_out
    }

    pub fn frame_layout(&self) -> &FrameLayout {
        self.fbi.layout()
    }

    pub fn frame_buffer(&self) -> &[u8] {
        self.fbi.ram().as_bytes()
    }

    pub fn texture_memory(&self, tmu: usize) -> Option<&[u8]> {
        self.tmus.get(tmu).map(|tmu| tmu.ram().as_bytes())
    }

    // One 16-bit pixel of a color or aux buffer in screen coordinates
    pub fn read_pixel(&self, select: BufferSelect, x: u32, y: u32) -> Option<u16> {
        let base = self.fbi.buffer_offset(select)?;
        let row_pixels = self.fbi.layout().row_pixels;
        let address = y.wrapping_mul(row_pixels).wrapping_add(x).wrapping_mul(2);
        Some(self.fbi.ram().read_u16(base.wrapping_add(address)))
    }

    pub fn register_name(&self, register: usize) -> &'static str {
        self.revision_config().name(register & 0xFF)
    }

    pub fn find_register(&self, name: &str) -> Option<usize> {
        self.revision_config().find_register(name)
    }

    pub fn save_state(&self) -> VoodooResult<Vec<u8>> {
        Ok(bincode::encode_to_vec(self, bincode_config!())?)
    }

    pub fn load_state(bytes: &[u8]) -> VoodooResult<Self> {
        let (voodoo, _): (Self, usize) = bincode::decode_from_slice(bytes, bincode_config!())?;
        voodoo.config.validate()?;
        Ok(voodoo)
    }
}
