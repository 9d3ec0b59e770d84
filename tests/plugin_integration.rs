// End-to-end test of the score plugin talking to a real daemon process over
// loopback TCP, reproducing the worked bundle-variant example: two
// containers, a candidate with 3 pods already assigned, each container
// costing 2000 MiB against the daemon (fixed-manifest mode, so the only
// moving part on the daemon side is the filesize catalog).
//
// Binds the daemon on `bloblocality::plugin::DEFAULT_DAEMON_PORT` since the
// plugin's address resolution talks to that port by convention; this test
// assumes nothing else on the host is bound there.

use std::sync::Arc;

use bloblocality::daemon::bundles::EmptyBundleManager;
use bloblocality::daemon::AppState;
use bloblocality::plugin::snapshot::{AddressKind, NodeAddress, NodeRecord, StaticClusterSnapshot};
use bloblocality::plugin::{self, Variant, Workload};
use bloblocality::resolver::{BlueprintSource, ClosureBlueprint};

struct EmptyBlueprintSource;

#[async_trait::async_trait]
impl BlueprintSource for EmptyBlueprintSource {
    async fn request_closure_blueprint(
        &self,
        _name: &str,
        _tag: &str,
    ) -> Result<ClosureBlueprint, String> {
        Ok(ClosureBlueprint::default())
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn bundle_variant_scores_match_the_worked_threshold_example() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::create_dir_all(dir.path().join("PrefabService")).expect("mkdir");
    // The app entry's own `prefab_size` (2000 MiB in bytes) is what fixed
    // mode sums; the catalog below only needs to have a `p1` entry at all —
    // its `filesize` value is irrelevant and deliberately different.
    std::fs::write(
        dir.path().join("apps.json"),
        r#"{"sam2": {"taskc": {"prefabID": "root", "blueprintID": "b", "prefabSize": 0},
                     "prefabs": [{"prefabID": "p1", "blueprintID": "b1", "prefabSize": 2097152000}]}}"#,
    )
    .expect("write apps.json");
    std::fs::write(
        dir.path().join("PrefabService/File.json"),
        r#"{"p1": {"filename": "w", "filetype": "t", "filesize": 1}}"#,
    )
    .expect("write File.json");

    let state = Arc::new(AppState::new(
        dir.path().to_path_buf(),
        dir.path().join("payload.json"),
        "definitely-not-a-real-binary-xyz".to_string(),
        dir.path().join("crictl_images.json"),
        "https://upstream.example.invalid".to_string(),
        Box::new(EmptyBundleManager),
    ));

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", plugin::DEFAULT_DAEMON_PORT))
        .await
        .expect("bind daemon port; is another test or process already using it?");
    let router = bloblocality::daemon::router(state);
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("daemon exited");
    });
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    let snapshot = StaticClusterSnapshot::new(vec![NodeRecord {
        name: "candidate".to_string(),
        addresses: vec![NodeAddress {
            kind: AddressKind::Internal,
            address: "127.0.0.1".to_string(),
        }],
        pods_on_node: 3,
    }]);
    let workload = Workload {
        init_containers: vec![],
        containers: vec!["sam2:latest".to_string(), "sam2:latest".to_string()],
    };

    let result = plugin::score(
        Variant::Bundle,
        &workload,
        "candidate",
        &snapshot,
        &EmptyBlueprintSource,
        plugin::DEFAULT_DAEMON_PORT,
    )
    .await
    .expect("score");

    // Each container's fixed-mode lookup resolves to exactly 2000 MiB
    // (2_097_152_000 bytes); scaled by (3+1)^2 = 16 that's
    // floor(2000 MiB / 16) = 125 MiB per container, for an accumulator of
    // 250 MiB — the same numbers as the worked threshold example.
    let expected = (100.0 * (250.0 - 23.0) / (2000.0 - 23.0)) as i64;
    assert_eq!(result, expected);
}
