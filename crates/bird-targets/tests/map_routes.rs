use std::path::Path;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use bird_targets::export::{export_all, write_targets_csv, TARGETS_CSV_FILE};
use bird_targets::inputs::Fixtures;
use bird_targets::map::map_router;
use bird_targets::scoring::{ScoreRanker, SpeciesScore};
use serde_json::Value;
use tower::ServiceExt;

fn exported_dir() -> (tempfile::TempDir, Vec<SpeciesScore>) {
    let fixtures_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    let fixtures = Fixtures::load(fixtures_dir, None).expect("fixtures load");
    let scores = ScoreRanker::default().rank(&fixtures.scoring);

    let out = tempfile::tempdir().expect("tempdir");
    export_all(&fixtures, &scores, out.path()).expect("export succeeds");
    write_targets_csv(out.path().join(TARGETS_CSV_FILE), &scores).expect("csv written");
    (out, scores)
}

async fn get(out: &Path, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = map_router(out)
        .oneshot(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body collected");
    (status, body.to_vec())
}

#[tokio::test]
async fn serves_exported_targets_in_rank_order() {
    let (out, scores) = exported_dir();

    let (status, body) = get(out.path(), "/targets").await;
    assert_eq!(status, StatusCode::OK);
    let served: Vec<SpeciesScore> = serde_json::from_slice(&body).expect("targets JSON");
    assert_eq!(served, scores);
}

#[tokio::test]
async fn serves_every_listed_layer() {
    let (out, _) = exported_dir();

    let (status, body) = get(out.path(), "/layers").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<String> = serde_json::from_slice(&body).expect("layer names");

    for name in names {
        let (status, body) = get(out.path(), &format!("/layers/{name}")).await;
        assert_eq!(status, StatusCode::OK, "layer {name}");
        let layer: Value = serde_json::from_slice(&body).expect("layer JSON");
        assert_eq!(layer["type"], "FeatureCollection");
    }
}

#[tokio::test]
async fn serves_dossiers_for_top_species_only() {
    let (out, _) = exported_dir();

    let (status, body) = get(out.path(), "/dossiers/woothr").await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(body)
        .expect("utf8")
        .starts_with("# Wood Thrush (woothr)"));

    let (status, _) = get(out.path(), "/dossiers/norcar").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
