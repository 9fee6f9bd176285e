use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Result of a k-means run.
#[derive(Debug, Clone)]
pub struct Clustering {
    pub centers: Vec<[f32; 3]>,
    /// Sum of squared distances of the samples to their centers.
    pub compactness: f32,
}

impl Clustering {
    /// Index of the center nearest to the point.
    pub fn nearest(&self, point: [f32; 3]) -> usize {
        nearest_center(&self.centers, point).0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct KMeansParams {
    pub k: usize,
    pub max_iterations: usize,
    pub attempts: usize,
    pub epsilon: f32,
    pub seed: u64,
}

fn distance2(a: [f32; 3], b: [f32; 3]) -> f32 {
    (0..3).map(|c| (a[c] - b[c]).powi(2)).sum()
}

fn nearest_center(centers: &[[f32; 3]], point: [f32; 3]) -> (usize, f32) {
    let mut best = (0, f32::INFINITY);
    for (i, center) in centers.iter().enumerate() {
        let d = distance2(*center, point);
        if d < best.1 {
            best = (i, d);
        }
    }
    best
}

/// k-means++ seeding: each new center is drawn with probability
/// proportional to its squared distance from the nearest chosen center.
fn seed_centers(samples: &[[f32; 3]], k: usize, rng: &mut ChaCha8Rng) -> Vec<[f32; 3]> {
    let mut centers = vec![samples[rng.gen_range(0..samples.len())]];
    let mut nearest: Vec<f32> = samples.iter().map(|s| distance2(*s, centers[0])).collect();

    while centers.len() < k {
        let total: f32 = nearest.iter().sum();
        let next = if total <= f32::EPSILON {
            samples[rng.gen_range(0..samples.len())]
        } else {
            let mut target = rng.gen_range(0.0..1.0f32) * total;
            let mut chosen = samples.len() - 1;
            for (i, d) in nearest.iter().enumerate() {
                target -= d;
                if target <= 0.0 {
                    chosen = i;
                    break;
                }
            }
            samples[chosen]
        };
        centers.push(next);
        for (d, s) in nearest.iter_mut().zip(samples) {
            *d = d.min(distance2(*s, next));
        }
    }
    centers
}

fn lloyd(samples: &[[f32; 3]], mut centers: Vec<[f32; 3]>, params: &KMeansParams) -> Clustering {
    let k = centers.len();
    for _ in 0..params.max_iterations {
        let mut sums = vec![[0.0f64; 3]; k];
        let mut counts = vec![0usize; k];
        for s in samples {
            let (i, _) = nearest_center(&centers, *s);
            counts[i] += 1;
            for c in 0..3 {
                sums[i][c] += s[c] as f64;
            }
        }

        let mut shift = 0.0f32;
        for i in 0..k {
            // Empty clusters keep their previous center.
            if counts[i] == 0 {
                continue;
            }
            let updated = [
                (sums[i][0] / counts[i] as f64) as f32,
                (sums[i][1] / counts[i] as f64) as f32,
                (sums[i][2] / counts[i] as f64) as f32,
            ];
            shift = shift.max(distance2(updated, centers[i]).sqrt());
            centers[i] = updated;
        }
        if shift <= params.epsilon {
            break;
        }
    }

    let compactness = samples.iter().map(|s| nearest_center(&centers, *s).1).sum();
    Clustering {
        centers,
        compactness,
    }
}

/// Cluster the samples, keeping the most compact of `attempts` runs.
///
/// Returns `None` when there are no samples or `k` is zero.
pub fn kmeans(samples: &[[f32; 3]], params: &KMeansParams) -> Option<Clustering> {
    if samples.is_empty() || params.k == 0 {
        return None;
    }
    let k = params.k.min(samples.len());
    let mut rng = ChaCha8Rng::seed_from_u64(params.seed);

    let mut best: Option<Clustering> = None;
    for _ in 0..params.attempts.max(1) {
        let centers = seed_centers(samples, k, &mut rng);
        let result = lloyd(samples, centers, params);
        if best.as_ref().is_none_or(|b| result.compactness < b.compactness) {
            best = Some(result);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(k: usize) -> KMeansParams {
        KMeansParams {
            k,
            max_iterations: 10,
            attempts: 3,
            epsilon: 0.5,
            seed: 7,
        }
    }

    #[test]
    fn separates_two_blobs() {
        let mut samples = vec![[10.0, 10.0, 10.0]; 50];
        samples.extend(vec![[200.0, 50.0, 90.0]; 30]);

        let clustering = kmeans(&samples, &params(2)).unwrap();
        let a = clustering.nearest([12.0, 9.0, 11.0]);
        let b = clustering.nearest([198.0, 52.0, 90.0]);
        assert_ne!(a, b);
        assert!(clustering.compactness < 1.0);
    }

    #[test]
    fn same_seed_same_centers() {
        let samples: Vec<[f32; 3]> = (0..200)
            .map(|i| [(i % 17) as f32 * 10.0, (i % 5) as f32 * 30.0, (i % 3) as f32 * 80.0])
            .collect();
        let a = kmeans(&samples, &params(4)).unwrap();
        let b = kmeans(&samples, &params(4)).unwrap();
        assert_eq!(a.centers, b.centers);
    }

    #[test]
    fn no_samples_no_clustering() {
        assert!(kmeans(&[], &params(3)).is_none());
    }
}
