//! End-to-end workflow tests against an in-memory store.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use super::build_router;
use crate::config::LlmSettings;
use crate::llm_client::LlmClient;
use crate::models::context::ContextUpsert;
use crate::render::PdfRenderer;
use crate::state::AppState;
use crate::store::{MemoryStore, Store};

fn app() -> (Router, MemoryStore) {
    let store = MemoryStore::new();
    let llm = LlmSettings {
        mock: true,
        ..LlmSettings::default()
    };
    let state = AppState {
        store: Arc::new(store.clone()),
        renderer: Arc::new(PdfRenderer::default()),
        llm: LlmClient::new(llm).unwrap(),
    };
    (build_router(state), store)
}

async fn raw(app: &Router, method: Method, uri: &str, body: Option<Value>) -> axum::response::Response {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&json).unwrap())
        }
        None => Body::empty(),
    };
    app.clone().oneshot(request.body(body).unwrap()).await.unwrap()
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let response = raw(app, method, uri, body).await;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn context_body(user_id: Uuid) -> Value {
    json!({
        "user_id": user_id,
        "primary_goal": "Lancer une activité freelance",
        "success_definition": "Signer 2 clients",
        "constraints": {"temps": "8h/semaine"},
        "horizon_days": 90
    })
}

fn generation_body(user_id: Uuid) -> Value {
    json!({
        "user_id": user_id,
        "context": {
            "primary_goal": "Lancer une activité freelance",
            "success_definition": "Signer 2 clients"
        },
        "chosen_option": "Trajectoire équilibrée"
    })
}

#[tokio::test]
async fn test_health_reports_mode() {
    let (app, _) = app();
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["llm_mode"], "mock");
}

#[tokio::test]
async fn test_context_upsert_and_fetch() {
    let (app, _) = app();
    let user = Uuid::new_v4();

    let (status, saved) = send(&app, Method::POST, "/api/v1/context", Some(context_body(user))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["primary_goal"], "Lancer une activité freelance");

    let mut update = context_body(user);
    update["primary_goal"] = json!("  Décrocher un poste data  ");
    send(&app, Method::POST, "/api/v1/context", Some(update)).await;

    let uri = format!("/api/v1/context?user_id={user}");
    let (status, fetched) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["primary_goal"], "Décrocher un poste data");

    let other = format!("/api/v1/context?user_id={}", Uuid::new_v4());
    let (status, body) = send(&app, Method::GET, &other, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "CareerContext introuvable.");
}

#[tokio::test]
async fn test_context_validation_lists_all_errors() {
    let (app, store) = app();
    let user = Uuid::new_v4();
    let body = json!({
        "user_id": user,
        "primary_goal": " ",
        "success_definition": "",
        "constraints": {},
        "horizon_days": 120
    });

    let (status, body) = send(&app, Method::POST, "/api/v1/context", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["details"].as_array().unwrap().len(), 4);
    assert!(store.get_context(user).await.unwrap().is_none());
}

#[tokio::test]
async fn test_decision_options_flow() {
    let (app, _) = app();
    let user = Uuid::new_v4();
    let uri = format!("/api/v1/decision/options?user_id={user}");

    let (status, _) = send(&app, Method::POST, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    send(&app, Method::POST, "/api/v1/context", Some(context_body(user))).await;
    let (status, body) = send(&app, Method::POST, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["constraint_check"]["ok"], true);
    let titles: Vec<&str> = body["options"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["title"].as_str().unwrap())
        .collect();
    assert_eq!(
        titles,
        vec!["Trajectoire prudente", "Trajectoire équilibrée", "Trajectoire offensive"]
    );
}

#[tokio::test]
async fn test_decision_options_reports_constraint_violation() {
    let (app, store) = app();
    let user = Uuid::new_v4();
    store
        .upsert_context(
            user,
            ContextUpsert {
                primary_goal: "Lancer une activité freelance".to_string(),
                success_definition: "Signer 2 clients".to_string(),
                constraints: json!({}),
                horizon_days: None,
            },
        )
        .await
        .unwrap();

    let uri = format!("/api/v1/decision/options?user_id={user}");
    let (status, body) = send(&app, Method::POST, &uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "CONSTRAINT_VIOLATION");
    assert_eq!(body["error"]["details"]["ok"], false);
    assert!(body["error"]["details"]["suggested_adjustment"].is_string());
}

#[tokio::test]
async fn test_decision_choose_records_tradeoff() {
    let (app, store) = app();
    let user = Uuid::new_v4();
    let body = json!({
        "user_id": user,
        "options": ["Trajectoire prudente", "Trajectoire équilibrée", "Trajectoire offensive"],
        "chosen_option": "Trajectoire équilibrée",
        "abandoned_options": ["Trajectoire prudente", "Trajectoire offensive"],
        "justification": "  Meilleur ratio impact / effort  "
    });

    let (status, response) = send(&app, Method::POST, "/api/v1/decision/choose", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["validated"], true);
    assert_eq!(response["justification"], "Meilleur ratio impact / effort");

    let decisions = store.decisions_for(user).await;
    assert_eq!(decisions.len(), 1);
    assert_eq!(decisions[0].id.to_string(), response["decision_id"]);
}

#[tokio::test]
async fn test_decision_choose_rejects_invalid_tradeoffs() {
    let (app, store) = app();
    let user = Uuid::new_v4();
    let cases = [
        (
            json!({"options": ["A", "B"], "chosen_option": "A", "abandoned_options": [], "justification": "r"}),
            "L'arbitrage forcé exige au moins une option abandonnée.",
        ),
        (
            json!({"options": ["A", "B"], "chosen_option": "A", "abandoned_options": ["A"], "justification": "r"}),
            "L'option choisie ne peut pas faire partie des options abandonnées.",
        ),
        (
            json!({"options": ["A", "B"], "chosen_option": "A", "abandoned_options": ["B"], "justification": ""}),
            "Impossible de choisir sans justification.",
        ),
    ];

    for (mut body, expected) in cases {
        body["user_id"] = json!(user);
        let (status, response) =
            send(&app, Method::POST, "/api/v1/decision/choose", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"]["message"], expected);
    }
    assert!(store.decisions_for(user).await.is_empty());
}

#[tokio::test]
async fn test_bets_reuse_the_draft_plan() {
    let (app, _) = app();
    let user = Uuid::new_v4();

    let (status, first) = send(&app, Method::POST, "/api/v1/bets", Some(generation_body(user))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["status"], "draft");
    let count = first["bets"].as_array().unwrap().len();
    assert!((2..=3).contains(&count));

    let (_, second) = send(&app, Method::POST, "/api/v1/bets", Some(generation_body(user))).await;
    assert_eq!(first["plan_id"], second["plan_id"]);
    assert_eq!(first["bets"], second["bets"]);

    let uri = format!("/api/v1/plan/{}?user_id={user}", first["plan_id"].as_str().unwrap());
    let (_, plan) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(plan["plan"]["chosen_option"], "Trajectoire équilibrée");
    assert_eq!(plan["plan"]["bets"], first["bets"]);
}

#[tokio::test]
async fn test_generation_rejects_empty_context() {
    let (app, _) = app();
    let body = json!({"user_id": Uuid::new_v4(), "context": {}, "chosen_option": "X"});
    let (status, response) = send(&app, Method::POST, "/api/v1/plan/generate", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"]["message"], "`context` doit être renseigné.");
}

fn approvable_plan() -> Value {
    json!({
        "objective": "Décrocher trois entretiens qualifiés en data d'ici 90 jours",
        "monthly_objectives": [
            {"month": 1, "objective": "Repositionner le profil data", "deliverables": ["CV data publié", "Profil LinkedIn réécrit"]},
            {"month": 2, "objective": "Lancer les candidatures ciblées", "deliverables": ["20 candidatures envoyées"]},
            {"month": 3, "objective": "Transformer les entretiens obtenus", "deliverables": ["3 simulations d'entretien"]}
        ],
        "kpis": ["3 entretiens qualifiés", "20 candidatures ciblées"],
        "risks": ["Manque de temps disponible", "Marché data saturé localement"]
    })
}

#[tokio::test]
async fn test_generated_plan_is_rejected_and_not_exportable() {
    let (app, store) = app();
    let user = Uuid::new_v4();

    let (status, generated) =
        send(&app, Method::POST, "/api/v1/plan/generate", Some(generation_body(user))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(generated["status"], "draft");
    assert_eq!(generated["plan"]["monthly_objectives"].as_array().unwrap().len(), 3);
    let plan_id = generated["plan_id"].as_str().unwrap().to_string();

    let export_uri = format!("/api/v1/plan/{plan_id}/export?user_id={user}");
    let (status, body) = send(&app, Method::GET, &export_uri, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");

    // KPI and risk records are not plain text, so the plan is rejected.
    let evaluate_uri = format!("/api/v1/plan/{plan_id}/evaluate?user_id={user}");
    let (status, evaluation) = send(&app, Method::POST, &evaluate_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(evaluation["verdict"], "rejected");
    assert_eq!(evaluation["status"], "rejected");
    let feedback = evaluation["feedback"].as_str().unwrap();
    assert!(feedback.starts_with("Plan rejeté : corriger risk_awareness, coherence."));

    let (status, _) = send(&app, Method::GET, &export_uri, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let plan_uuid: Uuid = plan_id.parse().unwrap();
    assert_eq!(store.checklists_for(plan_uuid).await.len(), 1);
}

#[tokio::test]
async fn test_approved_plan_exports_pdf() {
    let (app, store) = app();
    let user = Uuid::new_v4();
    let plan = store.create_plan(user, approvable_plan()).await.unwrap();

    let evaluate_uri = format!("/api/v1/plan/{}/evaluate?user_id={user}", plan.id);
    let (status, evaluation) = send(&app, Method::POST, &evaluate_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(evaluation["verdict"], "approved");
    assert_eq!(evaluation["status"], "approved");
    assert_eq!(
        evaluation["feedback"],
        "Plan validé : checklist complète et cohérente."
    );

    let export_uri = format!("/api/v1/plan/{}/export?user_id={user}", plan.id);
    let response = raw(&app, Method::GET, &export_uri, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.starts_with("attachment;"));
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_draft_with_bets_is_rejected() {
    let (app, _) = app();
    let user = Uuid::new_v4();
    let (_, bets) = send(&app, Method::POST, "/api/v1/bets", Some(generation_body(user))).await;
    let plan_id = bets["plan_id"].as_str().unwrap();

    let uri = format!("/api/v1/plan/{plan_id}/evaluate?user_id={user}");
    let (status, evaluation) = send(&app, Method::POST, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(evaluation["verdict"], "rejected");
    assert!(evaluation["feedback"]
        .as_str()
        .unwrap()
        .starts_with("Plan rejeté : corriger"));

    let export = format!("/api/v1/plan/{plan_id}/export?user_id={user}");
    let (status, _) = send(&app, Method::GET, &export, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_plans_are_scoped_to_their_owner() {
    let (app, _) = app();
    let owner = Uuid::new_v4();
    let (_, generated) =
        send(&app, Method::POST, "/api/v1/plan/generate", Some(generation_body(owner))).await;
    let plan_id = generated["plan_id"].as_str().unwrap();
    let stranger = Uuid::new_v4();

    for (method, suffix) in [(Method::GET, ""), (Method::POST, "/evaluate"), (Method::GET, "/export")] {
        let uri = format!("/api/v1/plan/{plan_id}{suffix}?user_id={stranger}");
        let (status, body) = send(&app, method, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["message"], "Plan introuvable.");
    }
}
