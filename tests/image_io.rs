#![cfg(feature = "image-io")]

use image::{GrayImage, Luma, Rgba, RgbaImage};
use pctmatch::{ColorMode, FrameSource, ImageSequenceSource, OwnedImage, PctMatchError, Template};

#[test]
fn template_mask_comes_from_alpha() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pct.png");
    let img = RgbaImage::from_fn(6, 4, |x, y| {
        let alpha = match x {
            0 => 0,
            1 => 250,
            _ => 251,
        };
        Rgba([(10 * x + y) as u8, 0, 0, alpha])
    });
    img.save(&path).unwrap();

    let gray = Template::load(&path, ColorMode::Gray).unwrap();
    assert_eq!((gray.width(), gray.height(), gray.channels()), (6, 4, 1));
    let mask = gray.mask().unwrap();
    assert_eq!(mask.data()[0], 0);
    assert_eq!(mask.data()[1], 0);
    assert_eq!(mask.data()[2], 255);

    let color = Template::load(&path, ColorMode::Color).unwrap();
    assert_eq!(color.channels(), 3);
    assert_eq!(color.mask().unwrap().channels(), 3);
    assert_eq!(&color.mask().unwrap().data()[..9], &[0, 0, 0, 0, 0, 0, 255, 255, 255]);
}

#[test]
fn decoded_gray_matches_in_memory_conversion() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("magenta.png");
    RgbaImage::from_pixel(4, 3, Rgba([200, 40, 220, 255]))
        .save(&path)
        .unwrap();

    let rgb = OwnedImage::new([200u8, 40, 220].repeat(12), 4, 3, 3).unwrap();
    let expected = rgb.to_mode(ColorMode::Gray).into_data();
    assert!(expected.iter().all(|&v| v == 108));

    let tpl = Template::load(&path, ColorMode::Gray).unwrap();
    assert_eq!(tpl.image().data(), expected.as_slice());

    let mut source = ImageSequenceSource::from_paths(vec![path]);
    assert_eq!(source.paths().len(), 1);
    let frame = source.frame(0, ColorMode::Gray).unwrap();
    assert_eq!(frame.data(), expected.as_slice());
}

#[test]
fn opaque_assets_have_no_mask() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("opaque.png");
    GrayImage::from_pixel(5, 5, Luma([90])).save(&path).unwrap();
    let tpl = Template::load(&path, ColorMode::Gray).unwrap();
    assert!(tpl.mask().is_none());
    assert!(tpl.image().data().iter().all(|&v| v == 90));
}

#[test]
fn missing_assets_fail_to_load() {
    let err = Template::load("does/not/exist.png", ColorMode::Gray).unwrap_err();
    assert!(matches!(err, PctMatchError::TemplateLoad { .. }));
}

#[test]
fn image_sequence_reads_frames_in_name_order() {
    let dir = tempfile::tempdir().unwrap();
    for (i, value) in [30u8, 10, 20].into_iter().enumerate() {
        let name = format!("frame_{:03}.png", [2, 0, 1][i]);
        GrayImage::from_pixel(8, 6, Luma([value]))
            .save(dir.path().join(name))
            .unwrap();
    }
    std::fs::write(dir.path().join("notes.txt"), "skip").unwrap();

    let mut source = ImageSequenceSource::open(dir.path()).unwrap();
    assert_eq!(source.frame_count(), 3);
    for (index, expected) in [10u8, 20, 30].into_iter().enumerate() {
        let frame = source.frame(index, ColorMode::Gray).unwrap();
        assert_eq!((frame.width(), frame.height()), (8, 6));
        assert!(frame.data().iter().all(|&v| v == expected));
    }
    assert_eq!(
        source.frame(3, ColorMode::Gray).unwrap_err(),
        PctMatchError::EndOfStream {
            frame: 3,
            frame_count: 3,
        }
    );
}

#[test]
fn undecodable_frames_report_their_index() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("frame_000.png"), b"not a png").unwrap();
    let mut source = ImageSequenceSource::open(dir.path()).unwrap();
    let err = source.frame(0, ColorMode::Gray).unwrap_err();
    assert!(matches!(err, PctMatchError::Decode { frame: 0, .. }));
}
