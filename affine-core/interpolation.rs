use crate::geometry::Affine2;
use crate::image::ImageView;

/// Sample `src` into `out` under `affine`, centered at `(cx, cy)`.
///
/// Output pixel `(i, j)`, measured from the output center, reads the source
/// at `(cx + i*a11 + j*a12, cy + i*a21 + j*a22)` with bilinear interpolation.
/// Samples that need pixels outside `src` are written as zero and make the
/// function return `true`.
///
/// # Panics
///
/// If either output side is even or `out` does not hold
/// `out_width * out_height` samples.
pub fn warp(
    src: ImageView<'_>,
    cx: f32,
    cy: f32,
    affine: &Affine2,
    out: &mut [f32],
    out_width: usize,
    out_height: usize,
) -> bool {
    assert!(
        out_width % 2 == 1 && out_height % 2 == 1,
        "warp output must have odd sides, got {}x{}",
        out_width,
        out_height
    );
    assert_eq!(out.len(), out_width * out_height, "warp output buffer does not match its size");

    // -1 keeps the bilinear neighbour in range
    let max_x = src.width() as f32 - 1.0;
    let max_y = src.height() as f32 - 1.0;
    let half_w = (out_width / 2) as i32;
    let half_h = (out_height / 2) as i32;

    let mut touched = false;
    let mut idx = 0;
    for j in -half_h..=half_h {
        let rx = cx + j as f32 * affine.a12;
        let ry = cy + j as f32 * affine.a22;
        for i in -half_w..=half_w {
            let wx = rx + i as f32 * affine.a11;
            let wy = ry + i as f32 * affine.a21;
            let fx = wx.floor();
            let fy = wy.floor();

            out[idx] = if fx >= 0.0 && fy >= 0.0 && fx < max_x && fy < max_y {
                let (x, y) = (fx as usize, fy as usize);
                let (dx, dy) = (wx - fx, wy - fy);
                (1.0 - dy) * ((1.0 - dx) * src.at(y, x) + dx * src.at(y, x + 1))
                    + dy * ((1.0 - dx) * src.at(y + 1, x) + dx * src.at(y + 1, x + 1))
            } else {
                touched = true;
                0.0
            };
            idx += 1;
        }
    }
    touched
}

/// Whether any corner of the `out_width × out_height` support region, mapped
/// through `affine` around `(cx, cy)`, lands within one pixel of the border.
///
/// Only the corners are tested: the mapped region is a parallelogram, so its
/// extremes are attained at the corners.
pub fn support_touches_border(
    src: ImageView<'_>,
    cx: f32,
    cy: f32,
    affine: &Affine2,
    out_width: usize,
    out_height: usize,
) -> bool {
    let width = src.width() as f32 - 2.0;
    let height = src.height() as f32 - 2.0;
    let half_w = (out_width / 2) as f32;
    let half_h = (out_height / 2) as f32;

    let corners = [(-half_w, -half_h), (-half_w, half_h), (half_w, -half_h), (half_w, half_h)];
    corners.iter().any(|&(i, j)| {
        let imx = cx + i * affine.a11 + j * affine.a12;
        let imy = cy + i * affine.a21 + j * affine.a22;
        !(imx.floor() > 0.0 && imy.floor() > 0.0 && imx.ceil() < width && imy.ceil() < height)
    })
}
