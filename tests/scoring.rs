mod common;

use common::{black_frame, frame_with, hash_pattern, paste, FRAME_HEIGHT, FRAME_WIDTH};
use pctmatch::{
    FrameScorer, Metric, OwnedImage, PctMatchError, RoiBand, ScorerConfig, Template,
};

fn sprite() -> Template {
    common::base_store().resize(common::SPRITE_WIDTH).unwrap()
}

#[test]
fn exact_copies_are_found_at_every_corner() {
    let tpl = sprite();
    let scorer = FrameScorer::default();
    let corners = [
        (0, 0),
        (FRAME_WIDTH - tpl.width(), 0),
        (0, FRAME_HEIGHT - tpl.height()),
        (FRAME_WIDTH - tpl.width(), FRAME_HEIGHT - tpl.height()),
    ];
    for (x0, y0) in corners {
        let frame = frame_with(&tpl, x0, y0);
        let best = scorer.best(frame.view(), &tpl, None).unwrap();
        assert_eq!((best.bbox.x, best.bbox.y), (x0, y0));
        assert_eq!((best.bbox.width, best.bbox.height), (tpl.width(), tpl.height()));
        assert!(best.confidence > 0.999, "confidence {}", best.confidence);
    }
}

#[test]
fn band_results_are_reported_in_frame_coordinates() {
    let tpl = sprite();
    let frame = frame_with(&tpl, 41, 75);
    let band = RoiBand::bottom_quarter(FRAME_HEIGHT);
    let best = FrameScorer::default()
        .best(frame.view(), &tpl, Some(band))
        .unwrap();
    assert_eq!((best.bbox.x, best.bbox.y), (41, 75));
    assert_eq!(best.bbox.bottom(), 75 + tpl.height());
}

#[test]
fn results_are_exactly_requested_and_non_increasing() {
    let tpl = sprite();
    let mut frame = frame_with(&tpl, 10, 8);
    paste(&mut frame, tpl.image(), 60, 70);
    let results = FrameScorer::default()
        .score(frame.view(), &tpl, None, 6)
        .unwrap();
    assert_eq!(results.len(), 6);
    assert!(results
        .windows(2)
        .all(|pair| pair[0].confidence >= pair[1].confidence));

    let mut top_two: Vec<_> = results[..2].iter().map(|d| (d.bbox.x, d.bbox.y)).collect();
    top_two.sort();
    assert_eq!(top_two, vec![(10, 8), (60, 70)]);
}

#[test]
fn suppression_keeps_results_apart() {
    let tpl = sprite();
    let frame = frame_with(&tpl, 33, 40);
    let scorer = FrameScorer::new(ScorerConfig {
        suppression_radius: 4,
        ..ScorerConfig::default()
    });
    let results = scorer.score(frame.view(), &tpl, None, 5).unwrap();
    for (i, a) in results.iter().enumerate() {
        for b in &results[i + 1..] {
            let dx = a.bbox.x.abs_diff(b.bbox.x);
            let dy = a.bbox.y.abs_diff(b.bbox.y);
            assert!(dx.max(dy) > 4, "{:?} and {:?} overlap", a.bbox, b.bbox);
        }
    }
}

#[test]
fn masked_out_pixels_do_not_affect_the_score() {
    let image = hash_pattern(20, 16, 1);
    let mask_data: Vec<u8> = (0..20 * 16)
        .map(|i| if i % 20 < 12 { 255 } else { 0 })
        .collect();
    let mask = OwnedImage::new(mask_data, 20, 16, 1).unwrap();
    let tpl = Template::new(image.clone(), Some(mask)).unwrap();

    let mut patch = image.clone();
    for (i, value) in patch.data_mut().iter_mut().enumerate() {
        if i % 20 >= 12 {
            *value = 200;
        }
    }
    let mut frame = black_frame(1);
    paste(&mut frame, &patch, 50, 30);

    let best = FrameScorer::default()
        .best(frame.view(), &tpl, None)
        .unwrap();
    assert_eq!((best.bbox.x, best.bbox.y), (50, 30));
    assert!(best.confidence > 0.999, "confidence {}", best.confidence);
}

#[test]
fn black_frames_score_zero() {
    let tpl = sprite();
    let frame = black_frame(1);
    let results = FrameScorer::default()
        .score(frame.view(), &tpl, None, 3)
        .unwrap();
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|d| d.confidence == 0.0));
}

#[test]
fn color_templates_match_color_frames() {
    let tpl = Template::new(hash_pattern(18, 14, 3), None).unwrap();
    let frame = frame_with(&tpl, 22, 61);
    let best = FrameScorer::default()
        .best(frame.view(), &tpl, None)
        .unwrap();
    assert_eq!((best.bbox.x, best.bbox.y), (22, 61));
    assert!(best.confidence > 0.999);
}

#[test]
fn zero_mean_metric_finds_the_same_match() {
    let tpl = sprite();
    let frame = frame_with(&tpl, 17, 52);
    let scorer = FrameScorer::new(ScorerConfig {
        metric: Metric::Zncc,
        ..ScorerConfig::default()
    });
    let best = scorer.best(frame.view(), &tpl, None).unwrap();
    assert_eq!((best.bbox.x, best.bbox.y), (17, 52));
    assert!(best.confidence > 0.999);
}

#[test]
fn invalid_inputs_are_rejected() {
    let tpl = sprite();
    let scorer = FrameScorer::default();

    let color = black_frame(3);
    assert!(matches!(
        scorer.best(color.view(), &tpl, None),
        Err(PctMatchError::ChannelMismatch { .. })
    ));

    let small = OwnedImage::filled(20, 20, 1, 7).unwrap();
    assert!(matches!(
        scorer.best(small.view(), &tpl, None),
        Err(PctMatchError::TemplateExceedsImage { .. })
    ));

    let frame = black_frame(1);
    let outside = RoiBand::new(80, FRAME_HEIGHT).unwrap();
    assert!(matches!(
        scorer.best(frame.view(), &tpl, Some(outside)),
        Err(PctMatchError::RoiOutOfBounds { .. })
    ));

    let thin = RoiBand::new(90, 95).unwrap();
    assert!(matches!(
        scorer.best(frame.view(), &tpl, Some(thin)),
        Err(PctMatchError::TemplateExceedsImage { .. })
    ));
}

#[test]
fn non_square_frames_keep_x_and_y_apart() {
    let tpl = sprite();
    let mut frame = OwnedImage::filled(130, 70, 1, 0).unwrap();
    paste(&mut frame, tpl.image(), 97, 44);
    let best = FrameScorer::default()
        .best(frame.view(), &tpl, None)
        .unwrap();
    assert_eq!((best.bbox.x, best.bbox.y), (97, 44));
    assert_eq!(best.bbox.right(), 97 + tpl.width());
}
