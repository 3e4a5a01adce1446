#![allow(dead_code)]

use std::ops::RangeInclusive;

use pctmatch::{MemorySource, OwnedImage, RoiBand, Template, TemplateStore, WorkingTemplate};

pub const FRAME_WIDTH: usize = 96;
pub const FRAME_HEIGHT: usize = 96;
pub const SPRITE_X: usize = 30;
pub const SPRITE_Y: usize = 74;
pub const SPRITE_WIDTH: usize = 26;

/// Deterministic texture with no repeated windows.
pub fn hash_pattern(width: usize, height: usize, channels: usize) -> OwnedImage {
    let mut data = Vec::with_capacity(width * height * channels);
    for y in 0..height {
        for x in 0..width {
            for c in 0..channels {
                let value = ((x * 73_856_093) ^ (y * 19_349_663) ^ (c * 83_492_791)) % 251;
                data.push(value as u8);
            }
        }
    }
    OwnedImage::new(data, width, height, channels).unwrap()
}

/// 32x24 grayscale template asset without a mask.
pub fn base_store() -> TemplateStore {
    TemplateStore::new(Template::new(hash_pattern(32, 24, 1), None).unwrap())
}

pub fn black_frame(channels: usize) -> OwnedImage {
    OwnedImage::filled(FRAME_WIDTH, FRAME_HEIGHT, channels, 0).unwrap()
}

/// Copies `sprite` into `frame` with its top-left corner at `(x0, y0)`.
pub fn paste(frame: &mut OwnedImage, sprite: &OwnedImage, x0: usize, y0: usize) {
    let channels = frame.channels();
    assert_eq!(channels, sprite.channels());
    let frame_width = frame.width();
    let row_len = sprite.width() * channels;
    let data = frame.data_mut();
    for y in 0..sprite.height() {
        let dst = ((y0 + y) * frame_width + x0) * channels;
        let src = y * row_len;
        data[dst..dst + row_len].copy_from_slice(&sprite.data()[src..src + row_len]);
    }
}

pub fn frame_with(sprite: &Template, x0: usize, y0: usize) -> OwnedImage {
    let mut frame = black_frame(sprite.channels());
    paste(&mut frame, sprite.image(), x0, y0);
    frame
}

/// Black video whose frames in `runs` show `sprite` at the fixture position.
pub fn presence_video(
    frame_count: usize,
    runs: &[RangeInclusive<usize>],
    sprite: &Template,
) -> MemorySource {
    let shown = frame_with(sprite, SPRITE_X, SPRITE_Y);
    let hidden = black_frame(sprite.channels());
    let frames = (0..frame_count)
        .map(|f| {
            if runs.iter().any(|r| r.contains(&f)) {
                shown.clone()
            } else {
                hidden.clone()
            }
        })
        .collect();
    MemorySource::new(frames)
}

/// Working template at the fixture scale and its calibrated band.
pub fn working_template(store: &TemplateStore) -> WorkingTemplate {
    let template = store.resize(SPRITE_WIDTH).unwrap();
    let y_max = (SPRITE_Y + template.height() + 3).min(FRAME_HEIGHT - 1);
    WorkingTemplate::new(template, RoiBand::new(SPRITE_Y - 3, y_max).unwrap())
}
