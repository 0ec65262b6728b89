use orbitcore::stream::ObjectSample;

/// Counts object pairs closer than `threshold_km`, sweeping along x so only
/// neighbours within the threshold band are compared.
pub fn count_close_pairs(samples: &[ObjectSample], threshold_km: f64) -> u64 {
    if threshold_km <= 0.0 || samples.len() < 2 {
        return 0;
    }

    let mut order: Vec<usize> = (0..samples.len()).collect();
    order.sort_by(|&a, &b| {
        samples[a]
            .position_km
            .x
            .total_cmp(&samples[b].position_km.x)
    });

    let mut pairs = 0;
    for (i, &a) in order.iter().enumerate() {
        let pa = samples[a].position_km;
        for &b in &order[i + 1..] {
            let pb = samples[b].position_km;
            if pb.x - pa.x >= threshold_km {
                break;
            }
            if (pb - pa).length() < threshold_km {
                pairs += 1;
            }
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbitcore::geometry::Vector3;

    fn at(x: f64, y: f64) -> ObjectSample {
        ObjectSample::new(Vector3::new(x, y, 0.0), None)
    }

    #[test]
    fn counts_pairs_inside_threshold() {
        let samples = vec![at(0.0, 0.0), at(0.5, 0.0), at(0.2, 5.0), at(10.0, 0.0)];
        assert_eq!(count_close_pairs(&samples, 1.0), 1);
        assert_eq!(count_close_pairs(&samples, 6.0), 3);
    }

    #[test]
    fn zero_threshold_counts_nothing() {
        let samples = vec![at(1.0, 1.0), at(1.0, 1.0)];
        assert_eq!(count_close_pairs(&samples, 0.0), 0);
        assert_eq!(count_close_pairs(&samples, 0.1), 1);
    }
}
