use super::*;

fn fbz_mode(enable: bool, two_by_two: bool) -> FbzMode {
    FbzMode(0).with_enable_dithering(enable).with_dither_type(two_by_two)
}

fn reference_dither(matrix: &[u8; 16], x: i32, y: i32, r: i32, g: i32, b: i32) -> u16 {
    let d = i32::from(matrix[((y & 3) * 4 + (x & 3)) as usize]);
    let r = (((r << 1) - (r >> 4) + (r >> 7) + d) >> 1) >> 3;
    let g = (((g << 2) - (g >> 4) + (g >> 6) + d) >> 2) >> 2;
    let b = (((b << 1) - (b >> 4) + (b >> 7) + d) >> 1) >> 3;
    ((r << 11) | (g << 5) | b) as u16
}

#[test]
fn matches_closed_form() {
    for _ in 0..100000 {
        let x: i32 = rand::random::<i32>() & 0x3FF;
        let y: i32 = rand::random::<i32>() & 0x3FF;
        let r = i32::from(rand::random::<u8>());
        let g = i32::from(rand::random::<u8>());
        let b = i32::from(rand::random::<u8>());

        let dither4 = Dither::new(fbz_mode(true, false), y);
        assert_eq!(dither4.apply(x, r, g, b), reference_dither(&DITHER_MATRIX_4X4, x, y, r, g, b));

        let dither2 = Dither::new(fbz_mode(true, true), y);
        assert_eq!(dither2.apply(x, r, g, b), reference_dither(&DITHER_MATRIX_2X2, x, y, r, g, b));
    }
}

#[test]
fn position_periodic() {
    for _ in 0..10000 {
        let x: i32 = rand::random::<i32>() & 0x3FF;
        let y: i32 = rand::random::<i32>() & 0x3FF;
        let r = i32::from(rand::random::<u8>());
        let g = i32::from(rand::random::<u8>());
        let b = i32::from(rand::random::<u8>());

        for two_by_two in [false, true] {
            let mode = fbz_mode(true, two_by_two);
            let expected = Dither::new(mode, y & 3).apply(x & 3, r, g, b);
            assert_eq!(Dither::new(mode, y).apply(x, r, g, b), expected);
            assert_eq!(Dither::new(mode, y + 4).apply(x + 8, r, g, b), expected);
        }
    }
}

#[test]
fn disabled_truncates() {
    for _ in 0..10000 {
        let y: i32 = rand::random::<i32>() & 0x3FF;
        let r = i32::from(rand::random::<u8>());
        let g = i32::from(rand::random::<u8>());
        let b = i32::from(rand::random::<u8>());

        let expected = (((r >> 3) << 11) | ((g >> 2) << 5) | (b >> 3)) as u16;
        assert_eq!(Dither::new(fbz_mode(false, false), y).apply(y, r, g, b), expected);
    }
}

#[test]
fn extremes_are_preserved() {
    for y in 0..4 {
        for x in 0..4 {
            for two_by_two in [false, true] {
                let dither = Dither::new(fbz_mode(true, two_by_two), y);
                assert_eq!(dither.apply(x, 255, 255, 255), 0xFFFF);
                assert_eq!(dither.apply(x, 0, 0, 0), 0x0000);
            }
        }
    }
}

#[test]
fn lod_dither_ignores_dither_type() {
    for y in 0..4 {
        let dither = Dither::new(fbz_mode(true, true), y);
        for x in 0..4 {
            assert_eq!(
                dither.matrix_4x4_value(x),
                i32::from(DITHER_MATRIX_4X4[(y * 4 + x) as usize])
            );
            assert_eq!(dither.matrix_value(x), i32::from(DITHER_MATRIX_2X2[(y * 4 + x) as usize]));
        }
    }
}
