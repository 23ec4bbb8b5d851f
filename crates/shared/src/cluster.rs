//! Grid-bucket marker clustering.
//!
//! Markers are bucketed into `radius_px`-sized cells of the projected world
//! at the current zoom; one cluster per occupied cell. Deterministic: bucket
//! order follows first member insertion, so the same input always yields the
//! same clusters.

use std::collections::HashMap;

use crate::geo::{self, LatLng};

#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    members: Vec<usize>,
    lat_sum: f64,
    lng_sum: f64,
}

impl Cluster {
    fn new() -> Self {
        Self {
            members: Vec::new(),
            lat_sum: 0.0,
            lng_sum: 0.0,
        }
    }

    /// A degenerate cluster wrapping one marker, used when clustering is off
    /// or the view is above the cluster threshold.
    pub fn single(member: usize, position: LatLng) -> Self {
        let mut cluster = Self::new();
        cluster.push(member, position);
        cluster
    }

    fn push(&mut self, member: usize, position: LatLng) {
        self.members.push(member);
        self.lat_sum += position.lat;
        self.lng_sum += position.lng;
    }

    pub fn members(&self) -> &[usize] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Centroid of the member positions.
    pub fn lat_lng(&self) -> LatLng {
        let count = self.members.len().max(1) as f64;
        LatLng::new(self.lat_sum / count, self.lng_sum / count)
    }
}

/// Group `(marker index, position)` pairs into clusters for the given zoom.
pub fn cluster_markers(markers: &[(usize, LatLng)], zoom: u8, radius_px: f64) -> Vec<Cluster> {
    let mut clusters: Vec<Cluster> = Vec::new();
    let mut buckets: HashMap<(i64, i64), usize> = HashMap::new();

    for &(member, position) in markers {
        let (x, y) = geo::project(position, zoom);
        let key = (
            (x / radius_px).floor() as i64,
            (y / radius_px).floor() as i64,
        );
        let slot = *buckets.entry(key).or_insert_with(|| {
            clusters.push(Cluster::new());
            clusters.len() - 1
        });
        clusters[slot].push(member, position);
    }

    clusters
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close_pair() -> Vec<(usize, LatLng)> {
        // Two points ~150m apart in Leipzig, plus one in Berlin.
        vec![
            (0, LatLng::new(51.3396, 12.3730)),
            (1, LatLng::new(51.3405, 12.3745)),
            (2, LatLng::new(52.5200, 13.4050)),
        ]
    }

    #[test]
    fn test_nearby_markers_merge_at_low_zoom() {
        let clusters = cluster_markers(&close_pair(), 10, 80.0);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].members(), [0, 1]);
        assert_eq!(clusters[1].members(), [2]);
    }

    #[test]
    fn test_markers_separate_at_high_zoom() {
        let clusters = cluster_markers(&close_pair(), 18, 80.0);
        assert_eq!(clusters.len(), 3);
        assert!(clusters.iter().all(|c| c.len() == 1));
    }

    #[test]
    fn test_cluster_centroid() {
        let markers = vec![
            (0, LatLng::new(50.0, 10.0)),
            (1, LatLng::new(50.0002, 10.0002)),
        ];
        let clusters = cluster_markers(&markers, 5, 80.0);
        assert_eq!(clusters.len(), 1);
        let center = clusters[0].lat_lng();
        assert!((center.lat - 50.0001).abs() < 1e-9);
        assert!((center.lng - 10.0001).abs() < 1e-9);
    }

    #[test]
    fn test_clustering_is_order_stable() {
        let first = cluster_markers(&close_pair(), 10, 80.0);
        let second = cluster_markers(&close_pair(), 10, 80.0);
        assert_eq!(first, second);
    }

    #[test]
    fn test_clustering_preserves_displayed_feature_set() {
        // Grouping changes presentation, never which features are shown.
        let markers = close_pair();
        let clustered: Vec<usize> = cluster_markers(&markers, 8, 80.0)
            .iter()
            .flat_map(|c| c.members().to_vec())
            .collect();
        let mut clustered = clustered;
        clustered.sort_unstable();
        assert_eq!(clustered, [0, 1, 2]);
    }

    #[test]
    fn test_single_wraps_one_marker() {
        let cluster = Cluster::single(7, LatLng::new(45.0, 9.0));
        assert_eq!(cluster.members(), [7]);
        assert_eq!(cluster.lat_lng(), LatLng::new(45.0, 9.0));
    }

    #[test]
    fn test_empty_input() {
        assert!(cluster_markers(&[], 10, 80.0).is_empty());
    }
}
