use affine_region::affine_core::{AffineParams, Image, KeypointCandidate, ResponseKind};
use affine_region::AffineRegionExtractor;

const CENTERS: [(f32, f32); 4] = [(50.0, 50.0), (150.0, 50.0), (50.0, 150.0), (150.0, 150.0)];

/// Four well separated Gaussian blobs with an empty strip on the right
fn blob_field() -> Image {
    Image::from_fn(301, 201, |col, row| {
        CENTERS
            .iter()
            .map(|&(cx, cy)| {
                let dx = col as f32 - cx;
                let dy = row as f32 - cy;
                255.0 * (-(dx * dx + dy * dy) / 50.0).exp()
            })
            .sum()
    })
}

fn candidates() -> Vec<KeypointCandidate> {
    let mut kps: Vec<_> = CENTERS
        .iter()
        .map(|&(x, y)| KeypointCandidate::new(x, y, 4.0, 1.0, ResponseKind::HessianBright, 2.0))
        .collect();
    // empty background far from every blob
    kps.insert(2, KeypointCandidate::new(250.0, 100.0, 4.0, 1.0, ResponseKind::HessianDark, 1.0));
    // hugging the left edge
    kps.push(KeypointCandidate::new(3.0, 100.0, 4.0, 1.0, ResponseKind::HessianSaddle, 1.0));
    kps
}

#[test]
fn test_only_blob_centers_become_regions() {
    let img = blob_field();
    let params = AffineParams { n_threads: 2, ..AffineParams::default() };
    let mut extractor = AffineRegionExtractor::new(params).unwrap();

    let regions = extractor.extract(img.view(), img.view(), &candidates());
    assert_eq!(regions.len(), 4);
    for (region, &(x, y)) in regions.iter().zip(CENTERS.iter()) {
        assert_eq!((region.x, region.y), (x, y));
        assert_eq!(region.kind, ResponseKind::HessianBright);
        assert_eq!(region.patch.dimensions(), (41, 41));
    }
}

#[test]
fn test_parallel_extraction_matches_sequential() {
    let img = blob_field();
    let params = AffineParams { n_threads: 3, ..AffineParams::default() };
    let mut extractor = AffineRegionExtractor::new(params).unwrap();
    let kps = candidates();

    let sequential = extractor.extract(img.view(), img.view(), &kps);
    let parallel = extractor.extract_par(img.view(), img.view(), &kps);
    assert_eq!(sequential, parallel);
}

#[test]
fn test_extractors_can_coexist() {
    // each extractor owns its pool, so building a second one must not fail
    let first = AffineRegionExtractor::new(AffineParams { n_threads: 1, ..AffineParams::default() });
    let second = AffineRegionExtractor::new(AffineParams { n_threads: 2, ..AffineParams::default() });
    assert!(first.is_ok());
    assert!(second.is_ok());
}
