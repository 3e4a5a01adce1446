//! Frame source over a directory of still images.

use std::path::{Path, PathBuf};

use crate::image::io::owned_from_dynamic;
use crate::image::{ColorMode, OwnedImage};
use crate::source::FrameSource;
use crate::util::{PctMatchError, PctMatchResult};

const EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Frame source reading one decoded image per frame.
///
/// Frame `i` is the `i`-th image file of the directory in lexicographic
/// path order, so zero-padded names (`frame_00042.png`) map directly to
/// frame numbers.
#[derive(Clone, Debug)]
pub struct ImageSequenceSource {
    paths: Vec<PathBuf>,
}

impl ImageSequenceSource {
    /// Lists the png and jpeg files in `dir`.
    pub fn open<P: AsRef<Path>>(dir: P) -> PctMatchResult<Self> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir).map_err(|err| PctMatchError::Decode {
            frame: 0,
            reason: format!("{}: {err}", dir.display()),
        })?;
        let mut paths = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|err| PctMatchError::Decode {
                    frame: 0,
                    reason: err.to_string(),
                })?
                .path();
            if path.is_file() && has_image_extension(&path) {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(Self { paths })
    }

    /// Wraps an explicit, ordered list of frame paths.
    pub fn from_paths(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    /// Returns the frame paths in frame order.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

impl FrameSource for ImageSequenceSource {
    fn frame_count(&self) -> usize {
        self.paths.len()
    }

    fn frame(&mut self, index: usize, mode: ColorMode) -> PctMatchResult<OwnedImage> {
        let path = self.paths.get(index).ok_or(PctMatchError::EndOfStream {
            frame: index,
            frame_count: self.paths.len(),
        })?;
        let img = image::open(path).map_err(|err| PctMatchError::Decode {
            frame: index,
            reason: err.to_string(),
        })?;
        owned_from_dynamic(&img, mode)
    }
}

#[cfg(test)]
mod tests {
    use super::has_image_extension;
    use std::path::Path;

    #[test]
    fn extension_filter_is_case_insensitive() {
        assert!(has_image_extension(Path::new("a/frame_001.PNG")));
        assert!(has_image_extension(Path::new("frame.jpeg")));
        assert!(!has_image_extension(Path::new("notes.txt")));
        assert!(!has_image_extension(Path::new("frame")));
    }
}
