//! Clustering math - dimensionality reduction and density clustering.
//!
//! Plain-f64 implementations: a power-iteration projection onto the top two
//! principal components, and DBSCAN over the projected points.

/// DBSCAN assignment for one point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointLabel {
    /// Assigned to the cluster with this id.
    Cluster(usize),
    /// Not assigned to any cluster.
    Noise,
}

/// Projects high-dimensional embeddings onto their top two principal
/// components.
///
/// Power iteration with deflation; deterministic start vectors so the whole
/// pipeline stays reproducible. Inputs shorter than 2 dimensions are padded
/// with zero.
pub fn project_2d(embeddings: &[Vec<f32>]) -> Vec<[f64; 2]> {
    let n = embeddings.len();
    if n == 0 {
        return Vec::new();
    }
    let d = embeddings[0].len();
    if d == 0 {
        return vec![[0.0, 0.0]; n];
    }

    // Center the data.
    let mut mean = vec![0.0f64; d];
    for e in embeddings {
        for (m, &v) in mean.iter_mut().zip(e.iter()) {
            *m += f64::from(v);
        }
    }
    for m in &mut mean {
        *m /= n as f64;
    }
    let centered: Vec<Vec<f64>> = embeddings
        .iter()
        .map(|e| {
            e.iter()
                .zip(mean.iter())
                .map(|(&v, &m)| f64::from(v) - m)
                .collect()
        })
        .collect();

    let first = principal_component(&centered, None);
    let second = principal_component(&centered, Some(&first));

    centered
        .iter()
        .map(|row| [dot(row, &first), dot(row, &second)])
        .collect()
}

/// Top principal component via power iteration, orthogonal to `deflate`
/// when given.
fn principal_component(centered: &[Vec<f64>], deflate: Option<&[f64]>) -> Vec<f64> {
    let d = centered[0].len();
    // Deterministic non-degenerate start vector.
    let mut v: Vec<f64> = (0..d).map(|i| 1.0 / (i as f64 + 1.0)).collect();
    if let Some(prev) = deflate {
        orthogonalize(&mut v, prev);
    }
    normalize(&mut v);

    for _ in 0..50 {
        // w = X^T (X v), avoiding the covariance matrix.
        let mut w = vec![0.0f64; d];
        for row in centered {
            let proj = dot(row, &v);
            for (wi, &xi) in w.iter_mut().zip(row.iter()) {
                *wi += proj * xi;
            }
        }
        if let Some(prev) = deflate {
            orthogonalize(&mut w, prev);
        }
        if normalize(&mut w) < 1e-12 {
            break;
        }
        let delta: f64 = v.iter().zip(w.iter()).map(|(a, b)| (a - b).abs()).sum();
        v = w;
        if delta < 1e-9 {
            break;
        }
    }
    v
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

fn orthogonalize(v: &mut [f64], against: &[f64]) {
    let proj = dot(v, against);
    for (vi, &ai) in v.iter_mut().zip(against.iter()) {
        *vi -= proj * ai;
    }
}

fn normalize(v: &mut [f64]) -> f64 {
    let norm = dot(v, v).sqrt();
    if norm > 0.0 {
        for vi in v.iter_mut() {
            *vi /= norm;
        }
    }
    norm
}

fn euclidean(a: &[f64; 2], b: &[f64; 2]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    (dx * dx + dy * dy).sqrt()
}

/// DBSCAN over 2-D points.
///
/// `eps` is the neighborhood radius and `min_points` the density threshold
/// (including the point itself). Cluster ids are assigned in discovery
/// order.
pub fn dbscan(points: &[[f64; 2]], eps: f64, min_points: usize) -> Vec<PointLabel> {
    let n = points.len();
    let mut labels = vec![None::<PointLabel>; n];
    let mut next_cluster = 0;

    for start in 0..n {
        if labels[start].is_some() {
            continue;
        }
        let neighbors = region_query(points, start, eps);
        if neighbors.len() < min_points {
            labels[start] = Some(PointLabel::Noise);
            continue;
        }

        let cluster = next_cluster;
        next_cluster += 1;
        labels[start] = Some(PointLabel::Cluster(cluster));

        let mut queue: Vec<usize> = neighbors;
        let mut head = 0;
        while head < queue.len() {
            let point = queue[head];
            head += 1;
            match labels[point] {
                Some(PointLabel::Noise) => {
                    // Border point: reachable from a core point.
                    labels[point] = Some(PointLabel::Cluster(cluster));
                }
                Some(PointLabel::Cluster(_)) => continue,
                None => {
                    labels[point] = Some(PointLabel::Cluster(cluster));
                    let point_neighbors = region_query(points, point, eps);
                    if point_neighbors.len() >= min_points {
                        for neighbor in point_neighbors {
                            if !queue.contains(&neighbor) {
                                queue.push(neighbor);
                            }
                        }
                    }
                }
            }
        }
    }

    labels
        .into_iter()
        .map(|l| l.unwrap_or(PointLabel::Noise))
        .collect()
}

fn region_query(points: &[[f64; 2]], center: usize, eps: f64) -> Vec<usize> {
    (0..points.len())
        .filter(|&i| euclidean(&points[center], &points[i]) <= eps)
        .collect()
}
