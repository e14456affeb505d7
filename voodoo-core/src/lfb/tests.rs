use super::*;
use crate::api::VoodooConfig;
use crate::fbi::FbiInit3;
use crate::registers::Revision;

fn write(voodoo: &mut Voodoo, register: usize, data: u32) {
    voodoo.write_register(register as u32, data);
}

fn new_voodoo(config: VoodooConfig) -> Voodoo {
    let mut voodoo = Voodoo::new(config).unwrap();
    write(&mut voodoo, Register::FBI_INIT1, 1 << 4);
    write(&mut voodoo, Register::FBI_INIT2, 4 << 11);
    assert_eq!(voodoo.frame_layout().row_pixels, 64);
    voodoo
}

// 64-pixel rows, front buffer at 0, back at 16K, aux at 32K
fn small_voodoo() -> Voodoo {
    new_voodoo(VoodooConfig::default())
}

fn set_modes(voodoo: &mut Voodoo, lfb_mode: LfbMode, fbz_mode: FbzMode) {
    write(voodoo, Register::LFB_MODE, lfb_mode.0);
    write(voodoo, Register::FBZ_MODE, fbz_mode.0);
}

// Dword offset of (x, y) for formats that pack two pixels per write
fn pair_offset(x: u32, y: u32) -> u32 {
    ((y << LFB_STRIDE_SHIFT) + x) >> 1
}

// Dword offset of (x, y) for one-pixel formats
fn single_offset(x: u32, y: u32) -> u32 {
    (y << LFB_STRIDE_SHIFT) + x
}

fn front(voodoo: &Voodoo, x: u32, y: u32) -> u16 {
    voodoo.read_pixel(BufferSelect::Front, x, y).unwrap()
}

fn aux(voodoo: &Voodoo, x: u32, y: u32) -> u16 {
    voodoo.read_pixel(BufferSelect::Aux, x, y).unwrap()
}

#[test]
fn rgb565_pairs() {
    let mut voodoo = small_voodoo();
    voodoo.write_lfb(pair_offset(4, 3), 0x1234_F800, 0xFFFF_FFFF);

    assert_eq!(front(&voodoo, 4, 3), 0xF800);
    assert_eq!(front(&voodoo, 5, 3), 0x1234);
    assert_eq!(aux(&voodoo, 4, 3), 0);
    assert_eq!(voodoo.statistics().pixels_out, 2);
}

#[test]
fn rgb565_survives_direct_write() {
    let mut voodoo = small_voodoo();
    for _ in 0..100 {
        let value: u16 = rand::random();
        voodoo.write_lfb(pair_offset(10, 10), u32::from(value), 0x0000_FFFF);
        assert_eq!(front(&voodoo, 10, 10), value);
    }
}

#[test]
fn mem_mask_selects_pixels() {
    let mut voodoo = small_voodoo();
    voodoo.write_lfb(pair_offset(0, 0), 0xFFFF_FFFF, 0xFFFF_0000);
    assert_eq!((front(&voodoo, 0, 0), front(&voodoo, 1, 0)), (0, 0xFFFF));
    assert_eq!(voodoo.statistics().pixels_out, 1);

    voodoo.write_lfb(pair_offset(2, 0), 0xFFFF_FFFF, 0x0000_00FF);
    assert_eq!((front(&voodoo, 2, 0), front(&voodoo, 3, 0)), (0xFFFF, 0));

    voodoo.write_lfb(pair_offset(4, 0), 0xFFFF_FFFF, 0);
    assert_eq!((front(&voodoo, 4, 0), front(&voodoo, 5, 0)), (0, 0));
    assert_eq!(voodoo.statistics().pixels_out, 2);
}

#[test]
fn x555_and_1555_pairs() {
    let mut voodoo = small_voodoo();

    // Format 1: 5-5-5 with the top bit ignored
    set_modes(&mut voodoo, LfbMode(0).with_write_format(1), FbzMode(0));
    voodoo.write_lfb(pair_offset(0, 0), 0x801F_7C00, 0xFFFF_FFFF);
    assert_eq!(front(&voodoo, 0, 0), 0xF800);
    assert_eq!(front(&voodoo, 1, 0), 0x001F);

    // Format 2 carries alpha, which lands in the alpha planes
    set_modes(
        &mut voodoo,
        LfbMode(0).with_write_format(2),
        FbzMode(0).with_enable_alpha_planes(true),
    );
    voodoo.write_lfb(pair_offset(2, 0), 0x03E0_8000, 0xFFFF_FFFF);
    assert_eq!((front(&voodoo, 2, 0), aux(&voodoo, 2, 0)), (0, 0xFF));
    assert_eq!((front(&voodoo, 3, 0), aux(&voodoo, 3, 0)), (0x07E0, 0));
}

#[test]
fn alpha_low_lanes() {
    let mut voodoo = small_voodoo();
    set_modes(&mut voodoo, LfbMode(0).with_write_format(1).with_rgba_lanes(2), FbzMode(0));
    // Blue in bits 1-5 once alpha sits in bit 0
    voodoo.write_lfb(pair_offset(0, 0), 0x0000_003E, 0xFFFF_FFFF);
    assert_eq!(front(&voodoo, 0, 0), 0x001F);
}

#[test]
fn argb8888_with_lane_swap() {
    let mut voodoo = small_voodoo();
    set_modes(
        &mut voodoo,
        LfbMode(0).with_write_format(5),
        FbzMode(0).with_enable_alpha_planes(true),
    );
    voodoo.write_lfb(single_offset(7, 2), 0x80FF_0000, 0xFFFF_FFFF);
    assert_eq!((front(&voodoo, 7, 2), aux(&voodoo, 7, 2)), (0xF800, 0x80));
    assert_eq!(front(&voodoo, 8, 2), 0);

    // ABGR lane order swaps red and blue
    set_modes(
        &mut voodoo,
        LfbMode(0).with_write_format(5).with_rgba_lanes(1),
        FbzMode(0).with_enable_alpha_planes(true),
    );
    voodoo.write_lfb(single_offset(8, 2), 0x40FF_0000, 0xFFFF_FFFF);
    assert_eq!((front(&voodoo, 8, 2), aux(&voodoo, 8, 2)), (0x001F, 0x40));

    // Format 4 carries no alpha, so the alpha planes keep their contents
    set_modes(
        &mut voodoo,
        LfbMode(0).with_write_format(4),
        FbzMode(0).with_enable_alpha_planes(true),
    );
    voodoo.write_lfb(single_offset(9, 2), 0x0000_FF00, 0xFFFF_FFFF);
    assert_eq!((front(&voodoo, 9, 2), aux(&voodoo, 9, 2)), (0x07E0, 0));
}

#[test]
fn depth_formats() {
    let mut voodoo = small_voodoo();

    set_modes(&mut voodoo, LfbMode(0).with_write_format(15), FbzMode(0));
    voodoo.write_lfb(pair_offset(0, 1), 0xBEEF_1234, 0xFFFF_FFFF);
    assert_eq!((aux(&voodoo, 0, 1), aux(&voodoo, 1, 1)), (0x1234, 0xBEEF));
    assert_eq!((front(&voodoo, 0, 1), front(&voodoo, 1, 1)), (0, 0));
    assert_eq!(voodoo.statistics().pixels_out, 2);

    // Depth plus 5-6-5 color
    set_modes(&mut voodoo, LfbMode(0).with_write_format(12), FbzMode(0));
    voodoo.write_lfb(single_offset(5, 1), 0x4321_07E0, 0xFFFF_FFFF);
    assert_eq!((front(&voodoo, 5, 1), aux(&voodoo, 5, 1)), (0x07E0, 0x4321));

    // The upper half carries the depth, so masking it keeps only the color
    voodoo.write_lfb(single_offset(6, 1), 0x4321_F800, 0x0000_FFFF);
    assert_eq!((front(&voodoo, 6, 1), aux(&voodoo, 6, 1)), (0xF800, 0));

    voodoo.write_lfb(single_offset(7, 1), 0x4321_F800, 0xFFFF_0000);
    assert_eq!((front(&voodoo, 7, 1), aux(&voodoo, 7, 1)), (0, 0x4321));
}

#[test]
fn depth_writes_skip_alpha_planes() {
    let mut voodoo = small_voodoo();
    set_modes(
        &mut voodoo,
        LfbMode(0).with_write_format(15),
        FbzMode(0).with_enable_alpha_planes(true),
    );
    voodoo.write_lfb(pair_offset(0, 0), 0xFFFF_FFFF, 0xFFFF_FFFF);

    assert_eq!(aux(&voodoo, 0, 0), 0);
    // Counted even though nothing was stored
    assert_eq!(voodoo.statistics().pixels_out, 2);
}

#[test]
fn reserved_formats_and_buffers_are_ignored() {
    let mut voodoo = small_voodoo();
    for format in [3, 6, 7, 8, 11] {
        set_modes(&mut voodoo, LfbMode(0).with_write_format(format), FbzMode(0));
        voodoo.write_lfb(0, 0xFFFF_FFFF, 0xFFFF_FFFF);
    }
    for select in [2, 3] {
        set_modes(&mut voodoo, LfbMode(0).with_write_buffer_select(select), FbzMode(0));
        voodoo.write_lfb(0, 0xFFFF_FFFF, 0xFFFF_FFFF);
    }

    assert!(voodoo.frame_buffer().iter().all(|&byte| byte == 0));
    assert_eq!(voodoo.statistics().pixels_out, 0);
}

#[test]
fn back_buffer_writes() {
    let mut voodoo = small_voodoo();
    set_modes(&mut voodoo, LfbMode(0).with_write_buffer_select(1), FbzMode(0));
    voodoo.write_lfb(pair_offset(0, 0), 0xFFFF_FFFF, 0xFFFF_FFFF);

    assert_eq!(front(&voodoo, 0, 0), 0);
    assert_eq!(voodoo.read_pixel(BufferSelect::Back, 0, 0), Some(0xFFFF));
}

#[test]
fn write_swaps() {
    let mut voodoo = small_voodoo();

    set_modes(&mut voodoo, LfbMode(0).with_word_swap_writes(true), FbzMode(0));
    voodoo.write_lfb(pair_offset(0, 0), 0x1111_2222, 0x0000_FFFF);
    // The mask is swapped with the data, so the surviving half moves to pixel 1
    assert_eq!((front(&voodoo, 0, 0), front(&voodoo, 1, 0)), (0, 0x2222));

    set_modes(&mut voodoo, LfbMode(0).with_byte_swizzle_writes(true), FbzMode(0));
    voodoo.write_lfb(pair_offset(2, 0), 0x1234_5678, 0xFFFF_FFFF);
    assert_eq!((front(&voodoo, 2, 0), front(&voodoo, 3, 0)), (0x3412, 0x7856));
}

#[test]
fn y_origin_flips_rows() {
    let mut voodoo = small_voodoo();
    write(&mut voodoo, Register::FBI_INIT3, FbiInit3(0).with_y_origin_subtract(63).0);
    set_modes(&mut voodoo, LfbMode(0).with_y_origin(true), FbzMode(0));

    voodoo.write_lfb(pair_offset(0, 0), 0xFFFF_FFFF, 0xFFFF_FFFF);
    voodoo.write_lfb(pair_offset(0, 10), 0x0000_F800, 0x0000_FFFF);

    assert_eq!(front(&voodoo, 0, 63), 0xFFFF);
    assert_eq!(front(&voodoo, 0, 53), 0xF800);
    assert_eq!(front(&voodoo, 0, 0), 0);

    // Reads flip the same way
    assert_eq!(voodoo.read_lfb(pair_offset(0, 10)), 0x0000_F800);
}

#[test]
fn dithered_direct_writes() {
    let mut voodoo = small_voodoo();
    set_modes(
        &mut voodoo,
        LfbMode(0).with_write_format(4),
        FbzMode(0).with_enable_dithering(true),
    );
    voodoo.write_lfb(single_offset(0, 0), 0x0000_0000, 0xFFFF_FFFF);
    voodoo.write_lfb(single_offset(1, 0), 0x00FF_FFFF, 0xFFFF_FFFF);

    // Black and white are fixed points of the dither
    assert_eq!((front(&voodoo, 0, 0), front(&voodoo, 1, 0)), (0, 0xFFFF));
}

#[test]
fn pipeline_writes_depth_test() {
    let mut voodoo = small_voodoo();
    let fbz_mode = FbzMode(0)
        .with_rgb_buffer_mask(true)
        .with_aux_buffer_mask(true)
        .with_enable_depthbuf(true)
        .with_depth_function(4);
    set_modes(
        &mut voodoo,
        LfbMode(0).with_write_format(12).with_enable_pixel_pipeline(true),
        fbz_mode,
    );

    // Passes against the cleared aux buffer, then the nearer depth is stored
    voodoo.write_lfb(single_offset(3, 3), 0x1000_F800, 0xFFFF_FFFF);
    assert_eq!((front(&voodoo, 3, 3), aux(&voodoo, 3, 3)), (0xF800, 0x1000));

    voodoo.write_lfb(single_offset(3, 3), 0x0800_001F, 0xFFFF_FFFF);
    assert_eq!((front(&voodoo, 3, 3), aux(&voodoo, 3, 3)), (0xF800, 0x1000));

    let stats = voodoo.statistics();
    assert_eq!((stats.pixels_in, stats.pixels_out, stats.zfunc_fail), (2, 1, 1));
}

#[test]
fn pipeline_writes_apply_color_tests() {
    let mut voodoo = small_voodoo();
    let fbz_mode = FbzMode(0).with_rgb_buffer_mask(true).with_enable_chromakey(true);
    set_modes(&mut voodoo, LfbMode(0).with_enable_pixel_pipeline(true), fbz_mode);
    write(&mut voodoo, Register::CHROMA_KEY, 0x00FF_0000);

    voodoo.write_lfb(pair_offset(0, 0), 0x001F_F800, 0xFFFF_FFFF);
    assert_eq!((front(&voodoo, 0, 0), front(&voodoo, 1, 0)), (0, 0x001F));

    let stats = voodoo.statistics();
    assert_eq!((stats.pixels_in, stats.chroma_fail, stats.pixels_out), (2, 1, 1));
}

#[test]
fn pipeline_stipple_advances() {
    let mut voodoo = small_voodoo();
    let fbz_mode = FbzMode(0).with_rgb_buffer_mask(true).with_enable_stipple(true);
    set_modes(&mut voodoo, LfbMode(0).with_enable_pixel_pipeline(true), fbz_mode);
    write(&mut voodoo, Register::STIPPLE, 0x4000_0000);

    // Rotating stipple: the first pixel sees bit 30 rotated into bit 31
    voodoo.write_lfb(pair_offset(0, 0), 0xFFFF_FFFF, 0xFFFF_FFFF);
    assert_eq!((front(&voodoo, 0, 0), front(&voodoo, 1, 0)), (0xFFFF, 0));
    assert_eq!(voodoo.regs[Register::STIPPLE].u32(), 0x0000_0001);
    assert_eq!(voodoo.statistics().stippled, 1);
}

#[test]
fn reads_return_pixel_pairs() {
    let mut voodoo = small_voodoo();
    voodoo.write_lfb(pair_offset(6, 4), 0xAAAA_5555, 0xFFFF_FFFF);
    assert_eq!(voodoo.read_lfb(pair_offset(6, 4)), 0xAAAA_5555);

    write(&mut voodoo, Register::LFB_MODE, LfbMode(0).with_word_swap_reads(true).0);
    assert_eq!(voodoo.read_lfb(pair_offset(6, 4)), 0x5555_AAAA);

    write(
        &mut voodoo,
        Register::LFB_MODE,
        LfbMode(0).with_word_swap_reads(true).with_byte_swizzle_reads(true).0,
    );
    voodoo.write_lfb(pair_offset(8, 4), 0x1234_5678, 0xFFFF_FFFF);
    // Word swap 5678_1234, then byte swizzle
    assert_eq!(voodoo.read_lfb(pair_offset(8, 4)), 0x3412_7856);
}

#[test]
fn read_buffer_select() {
    let mut voodoo = small_voodoo();
    set_modes(&mut voodoo, LfbMode(0).with_write_format(15), FbzMode(0));
    voodoo.write_lfb(pair_offset(0, 0), 0x2222_1111, 0xFFFF_FFFF);

    write(&mut voodoo, Register::LFB_MODE, LfbMode(0).with_read_buffer_select(2).0);
    assert_eq!(voodoo.read_lfb(pair_offset(0, 0)), 0x2222_1111);

    write(&mut voodoo, Register::LFB_MODE, LfbMode(0).with_read_buffer_select(1).0);
    assert_eq!(voodoo.read_lfb(pair_offset(0, 0)), 0);

    write(&mut voodoo, Register::LFB_MODE, LfbMode(0).with_read_buffer_select(3).0);
    assert_eq!(voodoo.read_lfb(pair_offset(0, 0)), 0xFFFF_FFFF);
}

#[test]
fn accesses_past_memory_end() {
    let mut voodoo = new_voodoo(VoodooConfig { fb_memory_mb: 1, ..VoodooConfig::default() });
    // 640-pixel rows put row 1000 past the end of 1 MB
    write(&mut voodoo, Register::FBI_INIT1, 10 << 4);

    assert_eq!(voodoo.read_lfb(pair_offset(0, 1000)), 0xFFFF_FFFF);

    voodoo.write_lfb(pair_offset(0, 1000), 0xFFFF_FFFF, 0xFFFF_FFFF);
    assert!(voodoo.frame_buffer().iter().all(|&byte| byte == 0));
    assert_eq!(voodoo.statistics().pixels_out, 2);
}

#[test]
fn banshee_uses_back_buffer() {
    let mut voodoo = Voodoo::new(VoodooConfig {
        revision: Revision::Banshee,
        ..VoodooConfig::default()
    })
    .unwrap();
    write(&mut voodoo, Register::COL_BUFFER_ADDR, 0x10_0000);
    write(&mut voodoo, Register::COL_BUFFER_STRIDE, 128);

    // Front buffer select is overridden
    voodoo.write_lfb(pair_offset(0, 1), 0x1234_5678, 0xFFFF_FFFF);
    assert_eq!(voodoo.read_pixel(BufferSelect::Back, 0, 1), Some(0x5678));
    assert_eq!(voodoo.read_pixel(BufferSelect::Front, 0, 1), Some(0));
    assert_eq!(voodoo.read_lfb(pair_offset(0, 1)), 0x1234_5678);
}
