//! Fusing the samples of one update into a single raw position

use crate::types::{GazeUpdate, NormalizedPosition};

/// Unweighted mean of the sample positions, rounded to two decimals.
///
/// Sample confidence is not used as a weight.
pub fn aggregate(update: &GazeUpdate) -> NormalizedPosition {
    let samples = update.samples();
    let n = samples.len() as f64;
    let (sum_x, sum_y) = samples.iter().fold((0.0, 0.0), |(sx, sy), s| {
        (sx + s.position.x, sy + s.position.y)
    });
    NormalizedPosition::new(round2(sum_x / n), round2(sum_y / n))
}

/// Round half away from zero to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::decode;

    fn update_from(positions: &[(f64, f64)]) -> GazeUpdate {
        let data: Vec<String> = positions
            .iter()
            .enumerate()
            .map(|(i, (x, y))| {
                format!(
                    r#"{{"norm_pos":[{},{}],"confidence":0.5,"timestamp":{}}}"#,
                    x, y, i
                )
            })
            .collect();
        let message = format!(r#"{{"srf":"screen","data":[{}]}}"#, data.join(","));
        decode(message.as_bytes()).unwrap()
    }

    #[test]
    fn test_single_sample_is_its_own_mean() {
        let raw = aggregate(&update_from(&[(0.42, 0.17)]));
        assert_eq!(raw, NormalizedPosition::new(0.42, 0.17));
    }

    #[test]
    fn test_mean_is_rounded_to_two_decimals() {
        let raw = aggregate(&update_from(&[(0.1, 0.2), (0.2, 0.2), (0.2, 0.3)]));
        // 0.5 / 3 = 0.1666.. and 0.7 / 3 = 0.2333..
        assert_eq!(raw, NormalizedPosition::new(0.17, 0.23));
    }

    #[test]
    fn test_mean_matches_rounded_mean_for_many_packets() {
        let cases: &[&[(f64, f64)]] = &[
            &[(0.0, 1.0), (1.0, 0.0)],
            &[(0.333, 0.666), (0.111, 0.999), (0.5, 0.5), (0.01, 0.02)],
            &[(-0.2, 1.3), (0.4, 0.9)],
        ];
        for positions in cases {
            let n = positions.len() as f64;
            let mean_x = positions.iter().map(|p| p.0).sum::<f64>() / n;
            let mean_y = positions.iter().map(|p| p.1).sum::<f64>() / n;
            let raw = aggregate(&update_from(positions));
            assert!((raw.x - round2(mean_x)).abs() < 1e-12);
            assert!((raw.y - round2(mean_y)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_confidence_does_not_weight() {
        let update = decode(
            br#"{"srf":"screen","data":[
                {"norm_pos":[0.0,0.0],"confidence":1.0,"timestamp":1.0},
                {"norm_pos":[1.0,1.0],"confidence":0.0,"timestamp":1.0}]}"#,
        )
        .unwrap();
        assert_eq!(aggregate(&update), NormalizedPosition::new(0.5, 0.5));
    }
}
