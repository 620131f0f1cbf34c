//! Post-decode format conversion and vertical flip (spec §4.9/§6). Both
//! operate on the whole stacked output buffer the Animation Driver
//! produces, one frame (`stride`-sized slice) at a time.

/// Convert a contiguous RGBA buffer to `dst_channels` (1-3; 4 is a no-op
/// copy). Luma weights match the distilled spec's `(77*R + 150*G +
/// 29*B) >> 8`; alpha-fill is 255 wherever the channel count grows.
pub fn to_channels(src: &[u8], dst_channels: u8, width: usize, height: usize) -> Vec<u8> {
    if dst_channels == 4 {
        return src.to_vec();
    }
    let pixel_count = width * height;
    let mut dst = Vec::with_capacity(pixel_count * dst_channels as usize);
    for i in 0..pixel_count {
        let o = i * 4;
        let (r, g, b, a) = (src[o] as u32, src[o + 1] as u32, src[o + 2] as u32, src[o + 3]);
        match dst_channels {
            1 => {
                let luma = ((77 * r + 150 * g + 29 * b) >> 8) as u8;
                dst.push(luma);
            }
            2 => {
                let luma = ((77 * r + 150 * g + 29 * b) >> 8) as u8;
                dst.push(luma);
                dst.push(a);
            }
            3 => {
                dst.push(src[o]);
                dst.push(src[o + 1]);
                dst.push(src[o + 2]);
            }
            _ => unreachable!("dst_channels validated by caller to be in 1..=4"),
        }
    }
    dst
}

/// Reverse each frame's rows in place. Operates per `stride`-sized frame,
/// never across the whole stacked buffer (spec §6 "Optional flip").
pub fn flip_vertical_per_frame(buffer: &mut [u8], width: usize, height: usize, layers: usize, channels: usize) {
    let row_bytes = width * channels;
    let frame_bytes = row_bytes * height;
    for layer in 0..layers {
        let frame = &mut buffer[layer * frame_bytes..(layer + 1) * frame_bytes];
        for row in 0..(height / 2) {
            let other = height - 1 - row;
            let (lo, hi) = frame.split_at_mut(other * row_bytes);
            let top = &mut lo[row * row_bytes..row * row_bytes + row_bytes];
            let bottom = &mut hi[..row_bytes];
            top.swap_with_slice(bottom);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_4_is_passthrough() {
        let src = [1u8, 2, 3, 4, 5, 6, 7, 8];
        assert_eq!(to_channels(&src, 4, 2, 1), src.to_vec());
    }

    #[test]
    fn channel_3_drops_alpha() {
        let src = [10u8, 20, 30, 255];
        assert_eq!(to_channels(&src, 3, 1, 1), vec![10, 20, 30]);
    }

    #[test]
    fn channel_1_applies_luma_weights() {
        let src = [100u8, 150, 200, 255];
        let expected = ((77u32 * 100 + 150 * 150 + 29 * 200) >> 8) as u8;
        assert_eq!(to_channels(&src, 1, 1, 1), vec![expected]);
    }

    #[test]
    fn channel_2_pairs_luma_with_alpha() {
        let src = [100u8, 150, 200, 37];
        let expected = ((77u32 * 100 + 150 * 150 + 29 * 200) >> 8) as u8;
        assert_eq!(to_channels(&src, 2, 1, 1), vec![expected, 37]);
    }

    #[test]
    fn flip_reverses_rows_per_frame() {
        // 1x2 RGBA, two frames: frame0 rows [A,B], frame1 rows [C,D]
        let mut buf = vec![
            1, 1, 1, 1, // frame0 row0 = A
            2, 2, 2, 2, // frame0 row1 = B
            3, 3, 3, 3, // frame1 row0 = C
            4, 4, 4, 4, // frame1 row1 = D
        ];
        flip_vertical_per_frame(&mut buf, 1, 2, 2, 4);
        assert_eq!(buf, vec![2, 2, 2, 2, 1, 1, 1, 1, 4, 4, 4, 4, 3, 3, 3, 3]);
    }
}
