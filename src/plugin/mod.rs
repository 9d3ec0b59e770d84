//! Scheduler-side score plugin (component D).
//!
//! Biases node selection toward nodes that already hold the greatest
//! byte-weight of a workload's dependencies, penalized by how crowded the
//! node already is. Two variants share this one algorithm, differing only in
//! which dependency list [`crate::resolver`] produces and in the de-heating
//! exponent and thresholds: [`Variant::Bundle`] scores software bundles,
//! [`Variant::Layer`] scores container image layers.

pub mod snapshot;

pub use snapshot::{AddressKind, ClusterSnapshot, NodeAddress, NodeRecord, StaticClusterSnapshot, Workload};

use serde::Deserialize;

use crate::error::PluginError;
use crate::net::HTTP_CLIENT;
use crate::resolver::{self, BlueprintSource, DependencyDescriptor};

/// The scheduling framework's maximum node score; every `Score` call returns
/// a value in `[0, MAX_NODE_SCORE]`.
pub const MAX_NODE_SCORE: i64 = 100;

/// Default port the per-node inspection daemon listens on. Callers whose
/// daemon fleet runs on a non-default `--listen-port` pass their own value to
/// [`score`] instead.
pub const DEFAULT_DAEMON_PORT: u16 = 9998;

/// Which artifact kind this plugin instance scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Software bundles, scored via the closure blueprint.
    Bundle,
    /// Container image layers, scored via the manifest store.
    Layer,
}

impl Variant {
    /// The daemon route segment this variant posts dependency lists to.
    fn route(self) -> &'static str {
        match self {
            Self::Bundle => "bundles",
            Self::Layer => "layers",
        }
    }

    /// Per-pod de-heating scale: `√(pods+1)` for layers, `(pods+1)²` for
    /// bundles. The bundle variant is deliberately far more aggressive about
    /// spreading pods across nodes than the layer variant.
    #[allow(clippy::cast_precision_loss)]
    fn scale(self, pods_on_node: u64) -> f64 {
        let base = (pods_on_node + 1) as f64;
        match self {
            Self::Layer => base.sqrt(),
            Self::Bundle => base * base,
        }
    }

    /// Per-container byte ceiling before the accumulator is clamped.
    fn max_container_threshold_bytes(self) -> f64 {
        const MIB: f64 = 1024.0 * 1024.0;
        match self {
            Self::Layer => 100.0 * MIB,
            Self::Bundle => 1000.0 * MIB,
        }
    }

    /// Byte floor the accumulator is clamped to before the linear map.
    fn min_threshold_bytes(self) -> f64 {
        const MIB: f64 = 1024.0 * 1024.0;
        match self {
            Self::Layer => 20.0 * MIB,
            Self::Bundle => 23.0 * MIB,
        }
    }

    /// Produce the dependency list for one container reference.
    async fn dependencies(
        self,
        image_ref: &str,
        blueprint_source: &dyn BlueprintSource,
    ) -> Vec<DependencyDescriptor> {
        match self {
            Self::Bundle => resolver::get_container_bundles(image_ref, blueprint_source).await,
            Self::Layer => resolver::get_container_layers(image_ref),
        }
    }
}

/// Body of the daemon's `{sizes}` response, mirrored from
/// [`crate::daemon`]'s handler output.
#[derive(Debug, Deserialize)]
struct SizesResponse {
    sizes: f64,
}

/// Resolve one reachable address: first internal, else first external, else
/// `None` — the candidate contributes 0 for this container in that case.
fn resolve_address(addresses: &[NodeAddress]) -> Option<&NodeAddress> {
    addresses
        .iter()
        .find(|a| a.kind == AddressKind::Internal)
        .or_else(|| addresses.iter().find(|a| a.kind == AddressKind::External))
}

/// POST `deps` to the daemon at `address` and return the byte count it
/// reports, or 0 on any transport failure, non-200 status, or decode
/// failure — the daemon query never fails the overall score.
async fn query_daemon(
    variant: Variant,
    address: &NodeAddress,
    daemon_port: u16,
    deps: &[DependencyDescriptor],
) -> f64 {
    let url = format!(
        "http://{}:{}/{}/{}",
        address.address,
        daemon_port,
        variant.route(),
        address.address
    );

    let response = match HTTP_CLIENT.post(&url).json(deps).send().await {
        Ok(response) => response,
        Err(err) => {
            tracing::warn!(url, error = %err, "daemon query failed");
            return 0.0;
        }
    };

    if !response.status().is_success() {
        tracing::warn!(url, status = %response.status(), "daemon query returned non-200");
        return 0.0;
    }

    match response.json::<SizesResponse>().await {
        Ok(body) => body.sizes,
        Err(err) => {
            tracing::warn!(url, error = %err, "daemon response decode failed");
            0.0
        }
    }
}

/// Map the accumulated byte total to `[0, MAX_NODE_SCORE]` by clamping it to
/// `[minThreshold, maxThreshold]` and linearly rescaling.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn priority_scaling(variant: Variant, accumulator: f64, num_containers: usize) -> i64 {
    let max_threshold = variant.max_container_threshold_bytes() * num_containers as f64;
    let min_threshold = variant.min_threshold_bytes();
    let clamped = accumulator.clamp(min_threshold, max_threshold);
    (MAX_NODE_SCORE as f64 * (clamped - min_threshold) / (max_threshold - min_threshold)) as i64
}

/// Score `candidate_node` for `workload` under `variant`.
///
/// Never fails due to a daemon being unreachable or slow — those cases
/// contribute 0 for the affected container and scoring continues. It fails
/// only when the snapshot itself is unusable: the candidate can't be found,
/// or the node listing can't be produced at all. Callers that need a hard
/// 500 ms ceiling on the whole call (not just each daemon round trip) should
/// wrap this in `tokio::time::timeout`; on cancellation, best effort is to
/// treat the call as having returned 0.
///
/// # Errors
/// Returns [`PluginError`] if the snapshot can't be listed or the candidate
/// node isn't present in it.
pub async fn score(
    variant: Variant,
    workload: &Workload,
    candidate_node: &str,
    snapshot: &dyn ClusterSnapshot,
    blueprint_source: &dyn BlueprintSource,
    daemon_port: u16,
) -> Result<i64, PluginError> {
    let node_names = snapshot
        .list_node_names()
        .map_err(PluginError::SnapshotUnavailable)?;
    let total_num_nodes = node_names.len();
    let candidate = snapshot
        .node(candidate_node)
        .ok_or_else(|| PluginError::CandidateNodeMissing(candidate_node.to_string()))?;

    tracing::debug!(total_num_nodes, candidate_node, "scoring candidate node");

    let containers: Vec<&str> = workload.all_containers().collect();
    let num_containers = containers.len();
    if num_containers == 0 {
        return Ok(0);
    }

    let address = resolve_address(&candidate.addresses);
    let scale = variant.scale(candidate.pods_on_node);

    let mut accumulator = 0.0_f64;
    for image_ref in containers {
        let raw = match address {
            Some(addr) => {
                let deps = variant.dependencies(image_ref, blueprint_source).await;
                query_daemon(variant, addr, daemon_port, &deps).await
            }
            None => {
                tracing::warn!(candidate_node, "no reachable address for candidate node");
                0.0
            }
        };
        accumulator += (raw / scale).floor();
    }

    Ok(priority_scaling(variant, accumulator, num_containers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::ClosureBlueprint;

    struct EmptySource;

    #[async_trait::async_trait]
    impl BlueprintSource for EmptySource {
        async fn request_closure_blueprint(
            &self,
            _name: &str,
            _tag: &str,
        ) -> Result<ClosureBlueprint, String> {
            Ok(ClosureBlueprint::default())
        }
    }

    fn node_with(pods_on_node: u64, addresses: Vec<NodeAddress>) -> NodeRecord {
        NodeRecord {
            name: "candidate".to_string(),
            addresses,
            pods_on_node,
        }
    }

    #[test]
    fn resolve_address_prefers_internal() {
        let addrs = vec![
            NodeAddress {
                kind: AddressKind::External,
                address: "203.0.113.1".to_string(),
            },
            NodeAddress {
                kind: AddressKind::Internal,
                address: "10.0.0.1".to_string(),
            },
        ];
        assert_eq!(resolve_address(&addrs).unwrap().address, "10.0.0.1");
    }

    #[test]
    fn resolve_address_falls_back_to_external() {
        let addrs = vec![NodeAddress {
            kind: AddressKind::External,
            address: "203.0.113.1".to_string(),
        }];
        assert_eq!(resolve_address(&addrs).unwrap().address, "203.0.113.1");
    }

    #[test]
    fn resolve_address_none_when_no_usable_kind() {
        let addrs = vec![NodeAddress {
            kind: AddressKind::Other,
            address: "fe80::1".to_string(),
        }];
        assert!(resolve_address(&addrs).is_none());
    }

    #[test]
    fn layer_scale_is_sqrt_pods_plus_one() {
        assert!((Variant::Layer.scale(3) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn bundle_scale_is_pods_plus_one_squared() {
        assert!((Variant::Bundle.scale(3) - 16.0).abs() < 1e-9);
    }

    #[test]
    fn bundle_priority_scaling_matches_worked_example() {
        const MIB: f64 = 1024.0 * 1024.0;
        let score = priority_scaling(Variant::Bundle, 250.0 * MIB, 2);
        let expected = (100.0 * (250.0 - 23.0) / (2000.0 - 23.0)) as i64;
        assert_eq!(score, expected);
    }

    #[test]
    fn accumulator_at_or_above_max_threshold_scores_max() {
        const MIB: f64 = 1024.0 * 1024.0;
        let score = priority_scaling(Variant::Layer, 1_000_000.0 * MIB, 1);
        assert_eq!(score, MAX_NODE_SCORE);
    }

    #[test]
    fn accumulator_at_or_below_min_threshold_scores_zero() {
        let score = priority_scaling(Variant::Bundle, 0.0, 1);
        assert_eq!(score, 0);
    }

    #[tokio::test]
    async fn score_is_zero_when_no_containers() {
        let snapshot = StaticClusterSnapshot::new(vec![node_with(0, vec![])]);
        let workload = Workload::default();
        let result = score(
            Variant::Layer,
            &workload,
            "candidate",
            &snapshot,
            &EmptySource,
            DEFAULT_DAEMON_PORT,
        )
        .await
        .unwrap();
        assert_eq!(result, 0);
    }

    #[tokio::test]
    async fn score_is_zero_when_candidate_unreachable() {
        let snapshot = StaticClusterSnapshot::new(vec![node_with(0, vec![])]);
        let workload = Workload {
            init_containers: vec![],
            containers: vec!["redis:7.2".to_string()],
        };
        let result = score(
            Variant::Layer,
            &workload,
            "candidate",
            &snapshot,
            &EmptySource,
            DEFAULT_DAEMON_PORT,
        )
        .await
        .unwrap();
        assert_eq!(result, 0);
    }

    #[tokio::test]
    async fn score_errors_when_candidate_missing_from_snapshot() {
        let snapshot = StaticClusterSnapshot::new(vec![]);
        let workload = Workload::default();
        let err = score(
            Variant::Layer,
            &workload,
            "ghost",
            &snapshot,
            &EmptySource,
            DEFAULT_DAEMON_PORT,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, PluginError::CandidateNodeMissing(name) if name == "ghost"));
    }
}
