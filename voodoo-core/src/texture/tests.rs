use super::*;
use crate::registers::{FbzMode, Revision};

const RAM_LEN: usize = 1 << 20;

fn new_tmu() -> Tmu {
    Tmu::new(0, RAM_LEN, Revision::Voodoo2.config())
}

fn lod_register(lod_min: u8, lod_max: u8) -> u32 {
    TexLod(0).with_lod_min(lod_min << 2).with_lod_max(lod_max << 2).0
}

fn no_dither() -> Dither {
    Dither::new(FbzMode(0), 0)
}

fn texel_coords(s: i64, t: i64) -> TexCoords {
    TexCoords { s: s << 32, t: t << 32, w: 1 << 32 }
}

// Writes one RGB565 texel pair at LOD 0 of a 256-wide texture
fn write_565_pair(tmu: &mut Tmu, s: u32, t: u32, even: u16, odd: u16) {
    let offset = (t << 7) | (s >> 1);
    tmu.write_texture(offset, u32::from(even) | (u32::from(odd) << 16), false);
}

#[test]
fn lod_offsets_accumulate() {
    let mut tmu = new_tmu();
    tmu.write_register(Register::TEXTURE_MODE, TextureMode(0).with_format(0).0);
    tmu.write_register(Register::T_LOD, lod_register(0, 8));
    tmu.write_register(Register::TEX_BASE_ADDR, 0x100);

    let base = 0x100 << 3;
    let params = tmu.params().clone();
    assert_eq!(
        params.lod_offset.map(|offset| offset - base),
        [0, 65536, 81920, 86016, 87040, 87296, 87360, 87376, 87380]
    );

    // 16-bit formats take twice the space
    tmu.write_register(Register::TEXTURE_MODE, TextureMode(0).with_format(10).0);
    assert_eq!(tmu.params().lod_offset[1] - base, 2 * 65536);
    assert_eq!(tmu.params().lod_offset[2] - base, 2 * 81920);
}

#[test]
fn split_lods_and_aspect() {
    let mut tmu = new_tmu();
    let tex_lod = TexLod(lod_register(0, 8))
        .with_lod_tsplit(true)
        .with_lod_odd(true)
        .with_lod_s_is_wider(true)
        .with_lod_aspect(1);
    tmu.write_register(Register::T_LOD, tex_lod.0);

    let params = tmu.params().clone();
    assert_eq!(params.lod_mask, 0x0AA);
    assert_eq!((params.wmask, params.hmask), (0xFF, 0x7F));
    // LOD 0 is not resident, so LOD 1 starts at the base
    assert_eq!(params.lod_offset[1], 0);
    assert_eq!(params.lod_offset[2], 128 * 64);
    assert_eq!(params.lod_offset[3], 128 * 64);

    tmu.write_register(Register::T_LOD, tex_lod.with_lod_odd(false).0);
    assert_eq!(tmu.params().lod_mask, 0x155);
}

#[test]
fn multi_base_addresses() {
    let mut tmu = new_tmu();
    tmu.write_register(Register::T_LOD, TexLod(lod_register(0, 8)).with_tmultibaseaddr(true).0);
    tmu.write_register(Register::TEX_BASE_ADDR, 0x10);
    tmu.write_register(Register::TEX_BASE_ADDR_1, 0x20);
    tmu.write_register(Register::TEX_BASE_ADDR_2, 0x30);
    tmu.write_register(Register::TEX_BASE_ADDR_3_8, 0x40);

    let params = tmu.params().clone();
    assert_eq!(params.lod_offset[..4], [0x80, 0x100, 0x180, 0x200]);
    assert_eq!(params.lod_offset[4], 0x200 + 32 * 32);
}

#[test]
fn disabled_by_lod_min() {
    let mut tmu = new_tmu();
    tmu.write_register(Register::T_LOD, lod_register(8, 8));
    assert_eq!(tmu.begin_triangle(), None);

    tmu.write_register(Register::T_LOD, lod_register(0, 8));
    assert!(tmu.begin_triangle().is_some());
}

#[test]
fn lod_base_tracks_texel_footprint() {
    let mut iterators = TmuIterators { ds_dx: 1 << 32, dt_dy: 1 << 32, ..TmuIterators::default() };
    assert_eq!(iterators.lod_base(), 0);

    iterators.ds_dx = 2 << 32;
    assert_eq!(iterators.lod_base(), 1 << 8);

    iterators.dt_dy = 8 << 32;
    assert_eq!(iterators.lod_base(), 3 << 8);
}

#[test]
fn point_sampling() {
    let mut tmu = new_tmu();
    let mode = TextureMode(0).with_format(10);
    tmu.write_register(Register::TEXTURE_MODE, mode.0);
    tmu.write_register(Register::T_LOD, lod_register(0, 8));

    for _ in 0..1000 {
        let s = rand::random::<u32>() & 0xFE;
        let t = rand::random::<u32>() & 0xFF;
        let even: u16 = rand::random();
        let odd: u16 = rand::random();
        write_565_pair(&mut tmu, s, t, even, odd);

        let lod_base = tmu.begin_triangle().unwrap();
        let dither = no_dither();
        let (texel, lod) = tmu.sample(mode, 0, &dither, texel_coords(s.into(), t.into()), lod_base);
        assert_eq!(texel, color::rgb565_to_argb(even));
        assert_eq!(lod, 0);

        let (texel, _) =
            tmu.sample(mode, 0, &dither, texel_coords((s + 1).into(), t.into()), lod_base);
        assert_eq!(texel, color::rgb565_to_argb(odd));

        // Wraps at the texture width
        let (texel, _) =
            tmu.sample(mode, 0, &dither, texel_coords((s + 256).into(), t.into()), lod_base);
        assert_eq!(texel, color::rgb565_to_argb(even));
    }
}

#[test]
fn perspective_with_unit_w_matches_affine() {
    let mut tmu = new_tmu();
    let affine = TextureMode(0).with_format(10);
    let perspective = affine.with_enable_perspective(true);
    tmu.write_register(Register::TEXTURE_MODE, affine.0);
    tmu.write_register(Register::T_LOD, lod_register(0, 8));
    for t in 0..256 {
        for s in (0..256).step_by(2) {
            write_565_pair(&mut tmu, s, t, rand::random(), rand::random());
        }
    }

    let lod_base = tmu.begin_triangle().unwrap();
    let dither = no_dither();
    for _ in 0..10000 {
        let coords = TexCoords {
            s: rand::random::<i64>() & 0xFF_FFFF_FFFF,
            t: rand::random::<i64>() & 0xFF_FFFF_FFFF,
            w: 1 << 32,
        };
        assert_eq!(
            tmu.sample(perspective, 0, &dither, coords, lod_base),
            tmu.sample(affine, 0, &dither, coords, lod_base)
        );
    }
}

#[test]
fn negative_w_mirrors_or_clamps_to_origin() {
    let mut tmu = new_tmu();
    let perspective = TextureMode(0).with_format(10).with_enable_perspective(true);
    let clamped = perspective.with_clamp_neg_w(true);
    tmu.write_register(Register::TEXTURE_MODE, perspective.0);
    tmu.write_register(Register::T_LOD, lod_register(0, 8));
    for t in 0..256 {
        for s in (0..256).step_by(2) {
            write_565_pair(&mut tmu, s, t, rand::random(), rand::random());
        }
    }

    let lod_base = tmu.begin_triangle().unwrap();
    let dither = no_dither();
    let origin = tmu.sample(perspective, 0, &dither, texel_coords(0, 0), lod_base).0;

    for _ in 0..1000 {
        let s = 1 + (rand::random::<i64>() & 0x7F);
        let t = 1 + (rand::random::<i64>() & 0x7F);
        let negative_w = TexCoords { w: -(1 << 32), ..texel_coords(s, t) };

        // 1/W flips sign, so S and T land on the mirrored texel
        let mirrored =
            tmu.sample(perspective, 0, &dither, texel_coords(256 - s, 256 - t), lod_base);
        assert_eq!(tmu.sample(perspective, 0, &dither, negative_w, lod_base), mirrored);

        let (texel, lod) = tmu.sample(clamped, 0, &dither, negative_w, lod_base);
        assert_eq!(texel, origin);
        assert_eq!(lod, 0);

        // Positive W is unaffected by the clamp
        let positive_w = texel_coords(s, t);
        assert_eq!(
            tmu.sample(clamped, 0, &dither, positive_w, lod_base),
            tmu.sample(perspective, 0, &dither, positive_w, lod_base)
        );
    }
}

#[test]
fn perspective_divide_wraps_for_tiny_w() {
    let mut tmu = new_tmu();
    let affine = TextureMode(0).with_format(10);
    let perspective = affine.with_enable_perspective(true);
    tmu.write_register(Register::TEXTURE_MODE, affine.0);
    // Single LOD so the 1/W log term cannot change the selected level
    tmu.write_register(Register::T_LOD, lod_register(0, 0));
    for t in 0..256 {
        for s in (0..256).step_by(2) {
            write_565_pair(&mut tmu, s, t, rand::random(), rand::random());
        }
    }

    let lod_base = tmu.begin_triangle().unwrap();
    let dither = no_dither();
    let wrapped = |oow: i32, value: i64| (i64::from(oow).wrapping_mul(value) >> 29) as i32;

    // startS = 0x7FFFFFFF and startW = 0x4000 as widened by the parameter registers
    let mut cases = vec![(i64::from(i32::MAX) << 14, i64::from(i32::MAX) << 14, 0x4000 << 2)];
    for _ in 0..10000 {
        let s = rand::random::<i64>() >> 17;
        let t = rand::random::<i64>() >> 17;
        let w = (rand::random::<i64>() >> 44) | 1;
        cases.push((s, t, w));
    }

    for (s, t, w) in cases {
        let oow = fast_reciplog(w).recip;
        let divided = TexCoords {
            s: i64::from(wrapped(oow, s)) << 14,
            t: i64::from(wrapped(oow, t)) << 14,
            w: 1 << 32,
        };

        let (texel, lod) = tmu.sample(perspective, 0, &dither, TexCoords { s, t, w }, lod_base);
        assert_eq!(lod, 0);
        let (expected, _) = tmu.sample(affine, 0, &dither, divided, lod_base);
        assert_eq!(texel, expected, "s={s:X} t={t:X} w={w:X}");
    }
}

#[test]
fn bilinear_filtering() {
    let mut tmu = new_tmu();
    let mode = TextureMode(0).with_format(10).with_magnification_filter(true).with_clamp_t(true);
    tmu.write_register(Register::TEXTURE_MODE, mode.0);
    tmu.write_register(Register::T_LOD, lod_register(0, 8));
    write_565_pair(&mut tmu, 0, 5, 0x0000, 0xFFFF);

    let lod_base = tmu.begin_triangle().unwrap();
    let dither = no_dither();

    // Texel centers return the texel exactly
    let center = TexCoords { s: 1 << 31, t: (5 << 32) + (1 << 31), w: 1 << 32 };
    let (texel, _) = tmu.sample(mode, 0, &dither, center, lod_base);
    assert_eq!(texel.to_u32(), 0xFF000000);

    // Halfway between black and white
    let halfway = TexCoords { s: 1 << 32, ..center };
    let (texel, _) = tmu.sample(mode, 0, &dither, halfway, lod_base);
    assert_eq!(texel.to_u32(), 0xFF7F7F7F);
}

#[test]
fn bilinear_filter_matches_scalar_lerp_for_constant_alpha() {
    for _ in 0..10000 {
        let texels: [u32; 4] = std::array::from_fn(|_| rand::random::<u32>() | 0xFF00_0000);
        let sfrac = rand::random::<u32>() & 0xFF;
        let tfrac = rand::random::<u32>() & 0xFF;
        let filtered = Argb::from_u32(bilinear_filter(texels, sfrac, tfrac));

        assert_eq!(filtered.a, 0xFF);
        for shift in [0, 8, 16] {
            let channel = |texel: u32| ((texel >> shift) & 0xFF) as i32;
            let lerp = |a: i32, b: i32, frac: u32| a + (((b - a) * frac as i32) >> 8);
            let top = lerp(channel(texels[0]), channel(texels[1]), sfrac);
            let bottom = lerp(channel(texels[2]), channel(texels[3]), sfrac);
            let expected = lerp(top, bottom, tfrac);
            assert_eq!(((filtered.to_u32() >> shift) & 0xFF) as i32, expected);
        }
    }
}

#[test]
fn palette_writes() {
    let mut tmu = new_tmu();
    tmu.write_register(Register::NCC_TABLE + 5, 0x89AB_CDEF);

    assert_eq!(tmu.decode_texel(5, 0x13), 0xFFAB_CDEF);
    // The NCC register itself is untouched
    assert_eq!(tmu.register(Register::NCC_TABLE + 5), 0);
    // AP88 keeps the high byte as alpha
    assert_eq!(tmu.decode_texel(14, 0x4013), 0x40AB_CDEF);
}

#[test]
fn ncc_texels_follow_table_select() {
    let mut tmu = new_tmu();
    // Table 0 Y0-3 = 0x10, table 1 Y0-3 = 0x80
    tmu.write_register(Register::NCC_TABLE, 0x1010_1010);
    tmu.write_register(Register::NCC_TABLE + NCC_REGISTERS, 0x8080_8080);
    tmu.write_register(Register::T_LOD, lod_register(0, 8));
    tmu.begin_triangle();

    assert_eq!(tmu.decode_texel(1, 0), 0xFF10_1010);

    tmu.write_register(Register::TEXTURE_MODE, TextureMode(0).with_ncc_table_select(true).0);
    tmu.begin_triangle();
    assert_eq!(tmu.decode_texel(1, 0), 0xFF80_8080);
    assert_eq!(tmu.decode_texel(9, 0x2000), 0x2080_8080);
}

#[test]
fn texel_formats() {
    let tmu = new_tmu();
    assert_eq!(tmu.decode_texel(2, 0x5A), 0x5A5A_5A5A);
    assert_eq!(tmu.decode_texel(3, 0x5A), 0xFF5A_5A5A);
    assert_eq!(tmu.decode_texel(4, 0x3C), 0x33CC_CCCC);
    assert_eq!(tmu.decode_texel(13, 0x805A), 0x805A_5A5A);
    assert_eq!(tmu.decode_texel(8, 0x40E0), 0x40FF_0000);
    assert_eq!(tmu.decode_texel(12, 0xF0F0), 0xFF00_FF00);
    assert_eq!(tmu.decode_texel(7, 0xFF), 0);
    assert_eq!(tmu.decode_texel(15, 0xFFFF), 0);
}

#[test]
fn detail_factor() {
    let mut tmu = new_tmu();
    let detail = TexDetail(0).with_detail_max(0xFF).with_detail_bias(0x10).with_detail_scale(0);
    tmu.write_register(Register::T_DETAIL, detail.0);
    tmu.begin_triangle();

    assert_eq!(tmu.detail_factor(0), 16);
    assert_eq!(tmu.detail_factor(4096), 0);

    tmu.write_register(Register::T_DETAIL, detail.with_detail_scale(7).with_detail_max(100).0);
    tmu.begin_triangle();
    assert_eq!(tmu.detail_factor(0), 100);
}

#[test]
fn eight_bit_sequential_download() {
    let mut tmu = new_tmu();
    tmu.write_register(Register::T_LOD, lod_register(0, 8));

    // Non-sequential: each dword covers s = (offset << 1) & 0xFC
    tmu.write_texture((3 << 7) | 2, 0x4433_2211, false);
    let row = 3 * 256;
    assert_eq!(tmu.ram().read_u8(row + 4), 0x11);
    assert_eq!(tmu.ram().read_u8(row + 7), 0x44);

    tmu.write_texture((3 << 7) | 2, 0x8877_6655, true);
    assert_eq!(tmu.ram().read_u8(row + 8), 0x55);
    assert_eq!(tmu.ram().read_u8(row + 11), 0x88);
}
