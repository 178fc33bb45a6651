// src/decision.rs
//
// Heading selection. Pure and total: exactly one member of the closed
// set for every possible zone sequence, including the empty one.

use crate::types::{Direction, NavigableZone};

/// Half-width of the "straight ahead" band, as a fraction of the image
/// width. A centroid exactly on the band boundary still reads FORWARD.
const CENTER_BAND_FRACTION: f32 = 0.10;

/// Pick a heading from the ordered zone sequence.
///
/// The sequence is assumed sorted as produced by `extract_zones`; only
/// the highest-priority zone steers the decision. No zones means
/// nowhere to go: STOP.
pub fn decide(zones: &[NavigableZone], image_width: usize) -> Direction {
    let Some(best) = zones.first() else {
        return Direction::Stop;
    };
    let center = image_width as f32 / 2.0;
    let band = image_width as f32 * CENTER_BAND_FRACTION;
    let offset = best.centroid.0 - center;
    if offset.abs() <= band {
        Direction::Forward
    } else if offset < 0.0 {
        Direction::Left
    } else {
        Direction::Right
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone_at(x: f32) -> NavigableZone {
        NavigableZone {
            id: 0,
            centroid: (x, 200.0),
            pixel_area: 10_000,
            col_span: (0, 100),
        }
    }

    #[test]
    fn empty_sequence_stops() {
        assert_eq!(decide(&[], 640), Direction::Stop);
    }

    #[test]
    fn centered_zone_goes_forward() {
        assert_eq!(decide(&[zone_at(320.0)], 640), Direction::Forward);
        assert_eq!(decide(&[zone_at(300.0)], 640), Direction::Forward);
    }

    #[test]
    fn off_center_zones_turn() {
        assert_eq!(decide(&[zone_at(100.0)], 640), Direction::Left);
        assert_eq!(decide(&[zone_at(550.0)], 640), Direction::Right);
    }

    #[test]
    fn band_boundary_favors_forward() {
        // Band is 64 px for a 640 px image; exactly on the edge is
        // still forward, one pixel past is a turn.
        assert_eq!(decide(&[zone_at(320.0 - 64.0)], 640), Direction::Forward);
        assert_eq!(decide(&[zone_at(320.0 + 64.0)], 640), Direction::Forward);
        assert_eq!(decide(&[zone_at(320.0 - 65.0)], 640), Direction::Left);
        assert_eq!(decide(&[zone_at(320.0 + 65.0)], 640), Direction::Right);
    }

    #[test]
    fn only_the_first_zone_steers() {
        let zones = vec![zone_at(550.0), zone_at(320.0)];
        assert_eq!(decide(&zones, 640), Direction::Right);
    }
}
