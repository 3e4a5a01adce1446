//! Iterative maximum extraction with local suppression.

use crate::candidate::map::ScoreMap;

/// Peak location in score-map coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Peak {
    /// X coordinate (column) of the placement.
    pub x: usize,
    /// Y coordinate (row) of the placement.
    pub y: usize,
    /// Score at the placement.
    pub score: f32,
}

/// Extracts `count` peaks by repeated argmax and neighborhood zeroing.
///
/// The map is consumed: suppression mutates it in place and it is dropped
/// when extraction ends. Exactly `count` peaks are returned for a non-empty
/// map; once every score is zero the remaining peaks repeat the first
/// zero position. Scores are non-increasing when the map is non-negative.
pub fn extract_peaks(mut map: ScoreMap, count: usize, radius: usize) -> Vec<Peak> {
    let mut peaks = Vec::with_capacity(count);
    for _ in 0..count {
        let Some((x, y, score)) = map.argmax() else {
            break;
        };
        map.suppress(x, y, radius);
        peaks.push(Peak { x, y, score });
    }
    peaks
}

#[cfg(test)]
mod tests {
    use super::extract_peaks;
    use crate::candidate::map::ScoreMap;

    #[test]
    fn neighbors_of_a_peak_are_not_reported() {
        let mut data = vec![0.0f32; 8 * 6];
        data[2 * 8 + 3] = 0.95;
        data[2 * 8 + 4] = 0.94;
        data[3 * 8 + 3] = 0.93;
        data[5 * 8 + 7] = 0.5;
        let map = ScoreMap::from_vec(data, 8, 6).unwrap();
        let peaks = extract_peaks(map, 2, 2);
        assert_eq!(peaks.len(), 2);
        assert_eq!((peaks[0].x, peaks[0].y), (3, 2));
        assert_eq!((peaks[1].x, peaks[1].y), (7, 5));
        assert_eq!(peaks[1].score, 0.5);
    }

    #[test]
    fn radius_zero_allows_adjacent_peaks() {
        let map = ScoreMap::from_vec(vec![0.9, 0.8, 0.1, 0.7], 2, 2).unwrap();
        let peaks = extract_peaks(map, 3, 0);
        let coords: Vec<_> = peaks.iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(coords, vec![(0, 0), (1, 0), (1, 1)]);
    }

    #[test]
    fn returns_requested_count_after_map_is_exhausted() {
        let map = ScoreMap::from_vec(vec![0.4, 0.6, 0.2], 3, 1).unwrap();
        let peaks = extract_peaks(map, 5, 4);
        assert_eq!(peaks.len(), 5);
        assert_eq!(peaks[0].score, 0.6);
        assert!(peaks[1..].iter().all(|p| p.score == 0.0 && p.x == 0));
    }
}
