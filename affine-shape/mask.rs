/// Gaussian weighting kernel for SMM accumulation, `size × size`, row-major.
///
/// Three sigmas fit into the half size, so the weight falls to about 1% at
/// the window edge. Peak weight is 1 at the center.
pub fn gaussian_mask(size: usize) -> Vec<f32> {
    let half = size / 2;
    let sigma = (half as f32 / 3.0).max(f32::EPSILON);
    let denom = -2.0 * sigma * sigma;

    let profile: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - half as f32;
            (d * d / denom).exp()
        })
        .collect();

    let mut mask = Vec::with_capacity(size * size);
    for row in 0..size {
        for col in 0..size {
            mask.push(profile[row] * profile[col]);
        }
    }
    mask
}
