//! The cluster engine - duplicate consolidation plus density grouping.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::context::ContextualFinding;
use crate::domain::detection::Availability;
use crate::ports::{cosine_similarity, TextEmbedder};

use super::math::{dbscan, project_2d, PointLabel};
use super::ClusterSummary;

/// Result of one clustering pass.
#[derive(Debug, Clone)]
pub struct ClusterOutcome {
    pub clusters: Vec<ClusterSummary>,
    /// Whether the embedding backend answered for this pass.
    pub availability: Availability,
}

/// Stage-3 clusterer.
///
/// Phase a: pairwise cosine similarity at or above `dedup_threshold` groups
/// near-duplicates under the highest-confidence representative. Phase b:
/// unique findings are projected to 2-D and DBSCAN groups semantically
/// related findings; noise passes through individually.
pub struct ClusterEngine {
    embedder: Arc<dyn TextEmbedder>,
    dedup_threshold: f64,
    eps: f64,
    min_points: usize,
}

impl ClusterEngine {
    /// Creates an engine with the given thresholds.
    pub fn new(
        embedder: Arc<dyn TextEmbedder>,
        dedup_threshold: f64,
        eps: f64,
        min_points: usize,
    ) -> Self {
        Self {
            embedder,
            dedup_threshold,
            eps,
            min_points: min_points.max(2),
        }
    }

    /// Clusters the surviving findings of one document.
    ///
    /// Never fails: an unreachable embedding backend degrades to
    /// one-finding-per-cluster.
    pub async fn cluster(&self, findings: Vec<ContextualFinding>) -> ClusterOutcome {
        // Fewer than 2 findings: trivial result, no ML invoked.
        if findings.len() < 2 {
            let clusters = findings
                .into_iter()
                .enumerate()
                .map(|(i, f)| ClusterSummary::from_members(i, vec![f], false))
                .collect();
            return ClusterOutcome {
                clusters,
                availability: Availability::Available,
            };
        }

        let texts: Vec<String> = findings.iter().map(|f| f.finding.excerpt.clone()).collect();
        let embeddings = match self.embedder.embed_batch(&texts).await {
            Ok(e) => e,
            Err(err) => {
                warn!(error = %err, "clustering degraded: one finding per cluster");
                let reason = err.to_string();
                let clusters = findings
                    .into_iter()
                    .enumerate()
                    .map(|(i, f)| ClusterSummary::from_members(i, vec![f], false))
                    .collect();
                return ClusterOutcome {
                    clusters,
                    availability: Availability::unavailable(reason),
                };
            }
        };

        // Phase a: near-duplicate groups via union-find over similar pairs.
        let groups = self.duplicate_groups(&embeddings);

        // Collect members per group, preserving original order within each.
        let mut member_lists: Vec<Vec<usize>> = Vec::new();
        let mut group_of_root: std::collections::HashMap<usize, usize> =
            std::collections::HashMap::new();
        for (index, root) in groups.iter().enumerate() {
            let list_index = *group_of_root.entry(*root).or_insert_with(|| {
                member_lists.push(Vec::new());
                member_lists.len() - 1
            });
            member_lists[list_index].push(index);
        }

        // Representative embedding per unique group: its first member's.
        let unique_embeddings: Vec<Vec<f32>> = member_lists
            .iter()
            .map(|members| embeddings[members[0]].clone())
            .collect();

        // Phase b: reduce + density-cluster the uniques.
        let labels = if member_lists.len() < 2 {
            vec![PointLabel::Noise; member_lists.len()]
        } else {
            let points = project_2d(&unique_embeddings);
            dbscan(&points, self.eps, self.min_points)
        };

        // Each index occurs in exactly one member list, so the slots drain
        // cleanly.
        let mut slots: Vec<Option<ContextualFinding>> =
            findings.into_iter().map(Some).collect();

        let mut clusters: Vec<ClusterSummary> = Vec::new();
        let mut density_clusters: std::collections::BTreeMap<usize, Vec<ContextualFinding>> =
            std::collections::BTreeMap::new();

        for (unique_index, members) in member_lists.iter().enumerate() {
            let member_findings: Vec<ContextualFinding> =
                members.iter().filter_map(|&i| slots[i].take()).collect();
            if member_findings.is_empty() {
                continue;
            }
            match labels[unique_index] {
                PointLabel::Cluster(id) => {
                    density_clusters.entry(id).or_default().extend(member_findings);
                }
                PointLabel::Noise => {
                    // Noise uniques pass through individually (duplicate
                    // members still consolidated).
                    let is_noise = member_findings.len() == 1;
                    clusters.push(ClusterSummary::from_members(0, member_findings, is_noise));
                }
            }
        }
        for (_, members) in density_clusters {
            clusters.push(ClusterSummary::from_members(0, members, false));
        }

        // Re-number deterministically by earliest original clause index.
        clusters.sort_by_key(|c| {
            c.members
                .iter()
                .filter_map(|m| m.finding.clause_index)
                .min()
                .unwrap_or(usize::MAX)
        });
        for (id, cluster) in clusters.iter_mut().enumerate() {
            cluster.cluster_id = id;
        }

        debug!(clusters = clusters.len(), "clustering complete");
        ClusterOutcome {
            clusters,
            availability: Availability::Available,
        }
    }

    /// Union-find roots for the near-duplicate relation.
    fn duplicate_groups(&self, embeddings: &[Vec<f32>]) -> Vec<usize> {
        let n = embeddings.len();
        let mut parent: Vec<usize> = (0..n).collect();

        fn find(parent: &mut Vec<usize>, x: usize) -> usize {
            if parent[x] != x {
                let root = find(parent, parent[x]);
                parent[x] = root;
            }
            parent[x]
        }

        for i in 0..n {
            for j in (i + 1)..n {
                if cosine_similarity(&embeddings[i], &embeddings[j]) >= self.dedup_threshold {
                    let (ri, rj) = (find(&mut parent, i), find(&mut parent, j));
                    if ri != rj {
                        // Lower index wins so the first occurrence anchors
                        // the group.
                        let (low, high) = if ri < rj { (ri, rj) } else { (rj, ri) };
                        parent[high] = low;
                    }
                }
            }
        }

        (0..n).map(|i| find(&mut parent, i)).collect()
    }
}
