//! Ordered dithering post-process
//!
//! Thresholds per-pixel luma against a 4x4 Bayer matrix. Pixels above the
//! threshold keep most of their color and pick up a palette tint; pixels at or
//! below it are crushed toward black, giving a halftone/terminal look.

use crate::catalog::Palette;

/// 4x4 Bayer index matrix, indexed `[y % 4][x % 4]`
pub const BAYER_4X4: [[u8; 4]; 4] = [
    [0, 8, 2, 10],
    [12, 4, 14, 6],
    [3, 11, 1, 9],
    [15, 7, 13, 5],
];

const KEEP: f32 = 0.7;
const SECONDARY_TINT: f32 = 0.2;
const ACCENT_TINT: f32 = 0.1;
const CRUSH: f32 = 0.15;

/// Threshold in 0-255 luma units for pixel `(x, y)`
#[inline]
pub fn threshold(x: u32, y: u32) -> f32 {
    (BAYER_4X4[(y % 4) as usize][(x % 4) as usize] as f32 + 0.5) * 16.0
}

#[inline]
fn luma(px: &[u8; 4]) -> f32 {
    0.299 * px[0] as f32 + 0.587 * px[1] as f32 + 0.114 * px[2] as f32
}

/// Dither one RGBA pixel in place; alpha is untouched
#[inline]
pub fn dither_pixel(px: &mut [u8; 4], x: u32, y: u32, palette: &Palette) {
    let l = luma(px);
    if l > threshold(x, y) {
        let b = l / 255.0;
        let sec = [palette.secondary.r, palette.secondary.g, palette.secondary.b];
        let acc = [palette.accent.r, palette.accent.g, palette.accent.b];
        for c in 0..3 {
            let v = px[c] as f32 * KEEP
                + sec[c] as f32 * SECONDARY_TINT * b
                + acc[c] as f32 * ACCENT_TINT * b;
            px[c] = v.round().clamp(0.0, 255.0) as u8;
        }
    } else {
        for c in px.iter_mut().take(3) {
            *c = (*c as f32 * CRUSH).round().clamp(0.0, 255.0) as u8;
        }
    }
}

/// Dither a full RGBA8 buffer of the given width.
///
/// Buffers whose length is not a whole number of pixels are left untouched.
pub fn ordered_dither(pixels: &mut [u8], width: u32, palette: &Palette) {
    if width == 0 {
        return;
    }
    let len = pixels.len();
    let Ok(px) = bytemuck::try_cast_slice_mut::<u8, [u8; 4]>(pixels) else {
        log::warn!("Skipping dither: buffer of {} bytes is not RGBA", len);
        return;
    };
    for (row_index, row) in px.chunks_mut(width as usize).enumerate() {
        let y = row_index as u32;
        for (x, p) in row.iter_mut().enumerate() {
            dither_pixel(p, x as u32, y, palette);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Rgb;
    use proptest::prelude::*;

    fn palette() -> Palette {
        Palette {
            primary: Rgb::new(255, 107, 53),
            secondary: Rgb::new(247, 197, 159),
            accent: Rgb::new(46, 31, 94),
        }
    }

    #[test]
    fn test_bayer_matrix_is_permutation() {
        let mut seen = [false; 16];
        for row in BAYER_4X4 {
            for v in row {
                seen[v as usize] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
        assert_eq!(threshold(0, 0), 8.0);
        assert_eq!(threshold(3, 3), 88.0);
        assert_eq!(threshold(4, 4), threshold(0, 0));
    }

    #[test]
    fn test_black_stays_black() {
        let mut buf = vec![0u8; 8 * 8 * 4];
        ordered_dither(&mut buf, 8, &palette());
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_dark_pixel_is_crushed() {
        // luma 20 is below the (1,0) threshold of 136
        let mut px = [20u8, 20, 20, 255];
        dither_pixel(&mut px, 1, 0, &palette());
        assert_eq!(px, [3, 3, 3, 255]);
    }

    #[test]
    fn test_bright_pixel_is_tinted() {
        let mut px = [255u8, 255, 255, 255];
        dither_pixel(&mut px, 0, 0, &palette());
        let p = palette();
        let expected = |o: u8, s: u8, a: u8| o as f32 * 0.7 + s as f32 * 0.2 + a as f32 * 0.1;
        let close = |got: u8, want: f32| (got as f32 - want).abs() <= 1.0;
        assert!(close(px[0], expected(255, p.secondary.r, p.accent.r)));
        assert!(close(px[1], expected(255, p.secondary.g, p.accent.g)));
        assert!(close(px[2], expected(255, p.secondary.b, p.accent.b)));
        assert_eq!(px[3], 255);
    }

    #[test]
    fn test_partial_pixel_buffer_untouched() {
        let mut buf = vec![200u8; 10];
        ordered_dither(&mut buf, 2, &palette());
        assert!(buf.iter().all(|&b| b == 200));
    }

    proptest! {
        #[test]
        fn prop_dither_is_deterministic(
            data in proptest::collection::vec(any::<u8>(), 4 * 16 * 9),
            s in any::<[u8; 3]>(),
            a in any::<[u8; 3]>(),
        ) {
            let palette = Palette {
                primary: Rgb::WHITE,
                secondary: Rgb::new(s[0], s[1], s[2]),
                accent: Rgb::new(a[0], a[1], a[2]),
            };
            let mut first = data.clone();
            let mut second = data.clone();
            ordered_dither(&mut first, 16, &palette);
            ordered_dither(&mut second, 16, &palette);
            prop_assert_eq!(&first, &second);
            // Alpha channel never changes
            for (out, orig) in first.chunks_exact(4).zip(data.chunks_exact(4)) {
                prop_assert_eq!(out[3], orig[3]);
            }
        }
    }
}
