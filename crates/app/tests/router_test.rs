//! Router tests over the bundled dataset

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use beasiswa_app::{build_router, AppConfig, AppContext};
use beasiswa_classifier::{ModelCache, ModelTrainer, Prediction};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

fn router() -> (Router, Arc<AppContext>) {
    let config = AppConfig {
        data_path: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/data_beasiswa.csv"),
        ..AppConfig::default()
    };
    let cache = ModelCache::new(ModelTrainer::new(config.training_params()));
    let ctx = Arc::new(AppContext::load(config, &cache).expect("bundled dataset loads"));
    (build_router(Arc::clone(&ctx)), ctx)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn form(body: &'static str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/prediksi")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

fn json(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_every_view_renders() {
    let (app, ctx) = router();

    for (uri, heading) in [
        ("/", "Deskripsi Sistem"),
        ("/data", "Lihat Data"),
        ("/prediksi", "Prediksi Kelayakan"),
        ("/tentang", "Tentang Pembuat"),
    ] {
        let (status, body) = send(app.clone(), get(uri)).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert!(body.contains(&format!("<h2>{heading}</h2>")), "{uri}");
        assert!(body.contains("Sistem Pendukung Keputusan Beasiswa Mahasiswa"));
    }

    let (_, body) = send(app, get("/data")).await;
    assert!(body.contains(&format!("Jumlah data: {}", ctx.dataset().row_count())));
    assert!(body.contains("Jumlah fitur: 5"));
}

#[tokio::test]
async fn test_form_submission_renders_result() {
    let (app, ctx) = router();
    let (status, body) = send(
        app,
        form("IPK=3.25&Penghasilan_Ortu=2-5jt&Jumlah_Tanggungan=3&Organisasi=Aktif&Prestasi=Nasional"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Hasil Prediksi"));
    assert!(body.contains("Probabilitas Prediksi"));
    for class in ctx.model().pipeline.classes() {
        assert!(body.contains(&format!("<th>{class}</th>")));
    }
    assert!(body.contains("<strong>LAYAK</strong>") || body.contains("<strong>TIDAK LAYAK</strong>"));
}

#[tokio::test]
async fn test_form_out_of_range_is_rejected() {
    let (app, _) = router();
    let (status, body) = send(
        app,
        form("IPK=4.5&Penghasilan_Ortu=%3C%3D2jt&Jumlah_Tanggungan=3&Organisasi=Tidak+Aktif&Prestasi=Lokal"),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body.contains("class=\"error\""));
    assert!(!body.contains("Hasil Prediksi"));
}

#[tokio::test]
async fn test_form_unknown_category_warns() {
    let (app, _) = router();
    let (status, body) = send(
        app,
        form("IPK=3.25&Penghasilan_Ortu=2-5jt&Jumlah_Tanggungan=3&Organisasi=Aktif&Prestasi=Regional"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("class=\"warning\""));
    assert!(body.contains("<li>Prestasi: Regional</li>"));
}

#[tokio::test]
async fn test_api_predict_matches_pipeline() {
    let (app, ctx) = router();
    let input = serde_json::json!({
        "IPK": 3.8,
        "Penghasilan_Ortu": "<=2jt",
        "Jumlah_Tanggungan": 5,
        "Organisasi": "Aktif",
        "Prestasi": "Nasional",
    });
    let expected = ctx
        .predict(&serde_json::from_value(input.clone()).unwrap())
        .unwrap();

    let (status, body) = send(app, json(input)).await;
    assert_eq!(status, StatusCode::OK);

    let prediction: Prediction = serde_json::from_str(&body).unwrap();
    assert_eq!(prediction.label, expected.label);
    assert_eq!(prediction.unknown_categories, expected.unknown_categories);
    for (got, want) in prediction.probabilities.iter().zip(&expected.probabilities) {
        assert_eq!(got.label, want.label);
        assert!((got.probability - want.probability).abs() < 1e-12);
    }
    let total: f64 = prediction.probabilities.iter().map(|p| p.probability).sum();
    assert!((total - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_api_predict_rejects_out_of_range() {
    let (app, _) = router();
    let (status, body) = send(
        app,
        json(serde_json::json!({
            "IPK": 3.0,
            "Penghasilan_Ortu": "2-5jt",
            "Jumlah_Tanggungan": 0,
            "Organisasi": "Aktif",
            "Prestasi": "Lokal",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let error: Value = serde_json::from_str(&body).unwrap();
    assert!(error["error"].as_str().unwrap().contains("Jumlah_Tanggungan"));
}

#[tokio::test]
async fn test_api_model_and_health() {
    let (app, ctx) = router();

    let (status, body) = send(app.clone(), get("/api/model")).await;
    assert_eq!(status, StatusCode::OK);
    let model: Value = serde_json::from_str(&body).unwrap();
    assert!((model["accuracy"].as_f64().unwrap() - ctx.model().accuracy).abs() < 1e-12);
    assert_eq!(model["classes"], serde_json::json!(["Layak", "Tidak Layak"]));
    assert_eq!(model["metadata"]["params"]["max_depth"], 5);
    assert_eq!(model["metadata"]["params"]["seed"], 42);

    let (status, body) = send(app, get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    let health: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["rows"], ctx.dataset().row_count());
}
