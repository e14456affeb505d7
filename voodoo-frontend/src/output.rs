use anyhow::{anyhow, Context};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use voodoo_core::{BufferSelect, Voodoo};

fn rgb565_to_rgb888(pixel: u16) -> [u8; 3] {
    let r = (pixel >> 11) as u8;
    let g = ((pixel >> 5) & 0x3F) as u8;
    let b = (pixel & 0x1F) as u8;

    // Replicate the high bits into the low bits so full intensity maps to 255
    [(r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2)]
}

/// Encode a color buffer as a binary PPM (P6) image.
///
/// # Errors
///
/// Returns an error if the chosen buffer does not exist in the current layout, or if writing
/// fails.
pub fn encode_ppm<W: Write>(
    voodoo: &Voodoo,
    select: BufferSelect,
    width: u32,
    height: u32,
    mut writer: W,
) -> anyhow::Result<()> {
    if voodoo.read_pixel(select, 0, 0).is_none() {
        return Err(anyhow!("{select:?} buffer is not allocated in the current frame buffer layout"));
    }

    write!(writer, "P6\n{width} {height}\n255\n")?;

    let mut row = Vec::with_capacity(3 * width as usize);
    for y in 0..height {
        row.clear();
        for x in 0..width {
            let pixel = voodoo.read_pixel(select, x, y).unwrap_or(0);
            row.extend(rgb565_to_rgb888(pixel));
        }
        writer.write_all(&row)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write a color buffer to a PPM file.
///
/// # Errors
///
/// Propagates errors from [`encode_ppm`] and from creating the file.
pub fn write_ppm<P: AsRef<Path>>(
    voodoo: &Voodoo,
    select: BufferSelect,
    width: u32,
    height: u32,
    path: P,
) -> anyhow::Result<()> {
    let path = path.as_ref();
    let file =
        File::create(path).with_context(|| format!("Error creating '{}'", path.display()))?;
    encode_ppm(voodoo, select, width, height, BufWriter::new(file))
        .with_context(|| format!("Error writing frame to '{}'", path.display()))?;

    log::info!("Wrote {width}x{height} {select:?} buffer to '{}'", path.display());

    Ok(())
}
