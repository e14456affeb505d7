//! 3dfx Voodoo Graphics / Voodoo 2 / Banshee 3D pipeline: register model, triangle rasterizer,
//! texture mapping units and per-pixel pipeline

pub mod api;
mod color;
mod combine;
mod commands;
mod dither;
mod fbi;
mod fifo;
mod lfb;
mod memory;
mod num;
mod pixel;
mod rasterizer;
mod reciplog;
mod registers;
mod setup;
mod texture;

pub use api::{Voodoo, VoodooConfig, VoodooError, VoodooResult};
pub use fbi::{BufferSelect, FrameLayout};
pub use pixel::Statistics;
pub use registers::{Register, Revision, NUM_REGISTERS};
pub use texture::MAX_TMU;
