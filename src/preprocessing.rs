// src/preprocessing.rs

use ndarray::Array2;

/// Clean a raw metric depth frame.
///
/// Readings outside `[near, far]`, non-positive readings (the usual
/// sensor dropout value), and non-finite readings become NaN. The
/// output always has the same shape as the input so pixel-space
/// products downstream (mask, zone centroids) stay aligned.
pub fn clean_depth(depth: &Array2<f32>, near: f32, far: f32) -> Array2<f32> {
    depth.mapv(|d| {
        if d.is_finite() && d > 0.0 && d >= near && d <= far {
            d
        } else {
            f32::NAN
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn shape_is_preserved() {
        let depth = Array2::from_elem((400, 640), 2.0f32);
        let clean = clean_depth(&depth, 0.5, 5.0);
        assert_eq!(clean.dim(), depth.dim());
    }

    #[test]
    fn in_range_values_pass_through() {
        let depth = array![[0.5f32, 2.0, 5.0]];
        let clean = clean_depth(&depth, 0.5, 5.0);
        assert_eq!(clean[[0, 0]], 0.5);
        assert_eq!(clean[[0, 1]], 2.0);
        assert_eq!(clean[[0, 2]], 5.0);
    }

    #[test]
    fn dropout_and_out_of_range_become_nan() {
        let depth = array![[0.0f32, -1.0, 0.3, 6.5, f32::NAN, f32::INFINITY]];
        let clean = clean_depth(&depth, 0.5, 5.0);
        assert!(clean.iter().all(|d| d.is_nan()));
    }

    #[test]
    fn input_is_not_mutated() {
        let depth = array![[0.0f32, 2.0]];
        let _ = clean_depth(&depth, 0.5, 5.0);
        assert_eq!(depth[[0, 0]], 0.0);
    }
}
