/// Per-pixel image gradients.
///
/// Centered differences `I(c+1) - I(c-1)` inside, one-sided differences on the
/// border rows and columns. Not divided by two. Requires at least 2x2 input.
pub fn compute_gradient(img: &[f32], width: usize, height: usize, gx: &mut [f32], gy: &mut [f32]) {
    debug_assert!(width >= 2 && height >= 2);
    debug_assert_eq!(img.len(), width * height);
    debug_assert_eq!(gx.len(), img.len());
    debug_assert_eq!(gy.len(), img.len());

    let at = |r: usize, c: usize| img[r * width + c];
    for r in 0..height {
        for c in 0..width {
            let xgrad = if c == 0 {
                at(r, c + 1) - at(r, c)
            } else if c == width - 1 {
                at(r, c) - at(r, c - 1)
            } else {
                at(r, c + 1) - at(r, c - 1)
            };

            let ygrad = if r == 0 {
                at(r + 1, c) - at(r, c)
            } else if r == height - 1 {
                at(r, c) - at(r - 1, c)
            } else {
                at(r + 1, c) - at(r - 1, c)
            };

            gx[r * width + c] = xgrad;
            gy[r * width + c] = ygrad;
        }
    }
}
