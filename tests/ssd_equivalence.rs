use partscore::lowlevel::window_energy;
use partscore::{
    match_ssd, Backend, Field, ImageView, Sample, ScalarBackend, ScoreRegion, SsdConfig,
    SsdMatcher, SsdTemplatePlan, ValidBand,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_u8(rng: &mut StdRng, len: usize) -> Vec<u8> {
    (0..len).map(|_| rng.random_range(0..=255u8)).collect()
}

/// Direct per-window SSD over the valid band, anchored at `(w / 2, h / 2)`.
fn brute_force_ssd<T: Sample>(
    image: ImageView<'_, T>,
    tpl: ImageView<'_, T>,
) -> Field<f64> {
    let (w, h, c) = (tpl.width(), tpl.height(), tpl.channels());
    let band = ValidBand::new(image.width(), image.height(), w, h).unwrap();
    let mut out = Field::<f64>::zeros(image.width(), image.height(), 1).unwrap();
    for y in band.y0()..=band.y1() {
        for x in band.x0()..=band.x1() {
            let mut acc = 0.0f64;
            for ty in 0..h {
                for tx in 0..w {
                    for ch in 0..c {
                        let (ix, iy) = ((x + tx - w / 2) as isize, (y + ty - h / 2) as isize);
                        let iv = image.sample_or_zero(ix, iy, ch);
                        let tv = tpl.get(tx, ty, ch).unwrap().to_f64();
                        acc += (iv - tv) * (iv - tv);
                    }
                }
            }
            out.set(x, y, 0, acc);
        }
    }
    out
}

fn assert_band_close(got: &Field<f64>, want: &Field<f64>, band: &ValidBand) {
    for y in band.y0()..=band.y1() {
        for x in band.x0()..=band.x1() {
            let g = got.get(x, y, 0).unwrap();
            let w = want.get(x, y, 0).unwrap();
            let tol = 1e-6 * w.abs().max(1.0);
            assert!((g - w).abs() <= tol, "({x}, {y}): {g} vs {w}");
        }
    }
}

#[test]
fn matches_brute_force_for_odd_and_even_templates() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let (iw, ih) = (23, 17);
    for channels in [1usize, 3] {
        let image = random_u8(&mut rng, iw * ih * channels);
        let image_view = ImageView::with_channels(&image, iw, ih, channels).unwrap();
        for (tw, th) in [(3, 3), (5, 3), (4, 4), (2, 5), (1, 1), (6, 7)] {
            let tpl = random_u8(&mut rng, tw * th * channels);
            let tpl_view = ImageView::with_channels(&tpl, tw, th, channels).unwrap();

            let got = match_ssd(image_view, tpl_view).unwrap();
            let want = brute_force_ssd(image_view, tpl_view);
            let band = ValidBand::new(iw, ih, tw, th).unwrap();
            assert_eq!((got.width(), got.height(), got.channels()), (iw, ih, 1));
            assert_band_close(&got, &want, &band);
        }
    }
}

#[test]
fn strided_views_score_like_contiguous_ones() {
    let mut rng = StdRng::seed_from_u64(7);
    let (iw, ih, stride) = (12, 9, 16);
    let padded = random_u8(&mut rng, stride * ih);
    let strided = ImageView::new(&padded, iw, ih, 1, stride).unwrap();
    let packed = Field::from_view(strided).unwrap();

    let tpl = random_u8(&mut rng, 9);
    let tpl_view = ImageView::from_slice(&tpl, 3, 3).unwrap();

    let a = match_ssd(strided, tpl_view).unwrap();
    let b = match_ssd(packed.view(), tpl_view).unwrap();
    assert_eq!(a, b);
}

#[test]
fn all_zero_inputs_score_zero_everywhere() {
    let image = [0u8; 64];
    let tpl = [0u8; 9];
    let image_view = ImageView::from_slice(&image, 8, 8).unwrap();
    let tpl_view = ImageView::from_slice(&tpl, 3, 3).unwrap();
    let map = match_ssd(image_view, tpl_view).unwrap();
    assert!(map.data().iter().all(|&v| v == 0.0));
}

#[test]
fn one_pixel_margin_collapses_band_to_single_cell() {
    let image = [0u8; 8 * 6];
    let tpl = [0u8; 7 * 5];
    let image_view = ImageView::from_slice(&image, 8, 6).unwrap();
    let tpl_view = ImageView::from_slice(&tpl, 7, 5).unwrap();

    let band = ValidBand::new(8, 6, 7, 5).unwrap();
    assert_eq!((band.x0(), band.y0(), band.x1(), band.y1()), (3, 2, 3, 2));

    let map = match_ssd(image_view, tpl_view).unwrap();
    assert_eq!((map.width(), map.height()), (8, 6));
    assert_eq!(map.get(3, 2, 0), Some(0.0));
    assert!(map.data().iter().all(|&v| v == 0.0));
}

#[test]
fn scores_are_non_negative_up_to_rounding() {
    let mut rng = StdRng::seed_from_u64(99);
    let image: Vec<f32> = (0..30 * 20).map(|_| rng.random_range(-50.0f32..50.0)).collect();
    let tpl: Vec<f32> = (0..5 * 4).map(|_| rng.random_range(-50.0f32..50.0)).collect();
    let image_view = ImageView::from_slice(&image, 30, 20).unwrap();
    let tpl_view = ImageView::from_slice(&tpl, 5, 4).unwrap();
    let map = match_ssd(image_view, tpl_view).unwrap();
    let band = ValidBand::new(30, 20, 5, 4).unwrap();
    for y in band.y0()..=band.y1() {
        for x in band.x0()..=band.x1() {
            assert!(map.get(x, y, 0).unwrap() >= -1e-6);
        }
    }
}

#[test]
fn valid_band_crop_has_band_extent() {
    let mut rng = StdRng::seed_from_u64(3);
    let image = random_u8(&mut rng, 15 * 11);
    let tpl = random_u8(&mut rng, 4 * 3);
    let image_view = ImageView::from_slice(&image, 15, 11).unwrap();
    let tpl_view = ImageView::from_slice(&tpl, 4, 3).unwrap();
    let map = match_ssd(image_view, tpl_view).unwrap();
    let band = ValidBand::new(15, 11, 4, 3).unwrap();
    let cropped = band.crop(&map).unwrap();
    assert_eq!((cropped.width(), cropped.height()), (15 - 4, 11 - 3));
    assert_eq!(cropped.get(0, 0, 0), map.get(band.x0(), band.y0(), 0));
}

#[test]
fn window_energy_matches_direct_sum() {
    let mut rng = StdRng::seed_from_u64(11);
    let image = random_u8(&mut rng, 10 * 8 * 2);
    let field = Field::from_view(ImageView::with_channels(&image, 10, 8, 2).unwrap()).unwrap();
    let sat = ScalarBackend::prefix_sum(&field.squared().unwrap()).unwrap();
    let (x, y, w, h) = (5, 4, 4, 3);
    for c in 0..2 {
        let mut want = 0.0;
        for ty in 0..h {
            for tx in 0..w {
                let v = field.get(x + tx - w / 2, y + ty - h / 2, c).unwrap();
                want += v * v;
            }
        }
        assert_eq!(window_energy(&sat, x, y, w, h, c), want);
    }
}

#[test]
fn full_region_agrees_inside_band() {
    let mut rng = StdRng::seed_from_u64(21);
    let image = random_u8(&mut rng, 14 * 10);
    let tpl = random_u8(&mut rng, 5 * 5);
    let image_view = ImageView::from_slice(&image, 14, 10).unwrap();
    let plan = SsdTemplatePlan::from_view(ImageView::from_slice(&tpl, 5, 5).unwrap()).unwrap();

    let valid = SsdMatcher::new(plan.clone()).score_map(image_view).unwrap();
    let full = SsdMatcher::new(plan)
        .with_config(SsdConfig {
            region: ScoreRegion::Full,
            ..SsdConfig::default()
        })
        .score_map(image_view)
        .unwrap();
    let band = ValidBand::new(14, 10, 5, 5).unwrap();
    assert_band_close(&full, &valid, &band);
    assert!(full.data().iter().all(|v| v.is_finite()));
}

#[test]
fn best_matches_recover_planted_templates() {
    let mut rng = StdRng::seed_from_u64(42);
    let (iw, ih) = (40, 30);
    let mut image = random_u8(&mut rng, iw * ih);
    let tpl = random_u8(&mut rng, 5 * 5);
    for (ox, oy) in [(4usize, 6usize), (25, 18)] {
        for ty in 0..5 {
            let row = (oy + ty) * iw + ox;
            image[row..row + 5].copy_from_slice(&tpl[ty * 5..ty * 5 + 5]);
        }
    }

    let image_view = ImageView::from_slice(&image, iw, ih).unwrap();
    let plan = SsdTemplatePlan::from_view(ImageView::from_slice(&tpl, 5, 5).unwrap()).unwrap();
    let matcher = SsdMatcher::new(plan);
    let matches = matcher.best_matches(image_view, 2, 3).unwrap();
    assert_eq!(matches.len(), 2);

    let mut centres: Vec<(f64, f64)> = matches.iter().map(|m| (m.x, m.y)).collect();
    centres.sort_by(|a, b| a.0.total_cmp(&b.0));
    for (got, want) in centres.iter().zip([(6.0, 8.0), (27.0, 20.0)]) {
        assert!((got.0 - want.0).abs() <= 0.5, "{got:?} vs {want:?}");
        assert!((got.1 - want.1).abs() <= 0.5, "{got:?} vs {want:?}");
    }
    for m in &matches {
        assert!(m.score.abs() < 1e-6);
    }
}
