//! End-to-end tests for the Axum HTTP API layer.
//!
//! These tests use mock repositories - no database required.
//! Run with: `cargo test --features "axum_api mocks" --test e2e_axum`

#![cfg(all(feature = "axum_api", feature = "mocks"))]
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use anteroom::api::axum::{invitation_routes, workspace_routes, AppState};
use anteroom::workspaces::{
    MockInvitationRepository, MockMembershipRepository, MockWorkspaceRepository,
};
use anteroom::{MockSessionRepository, WorkspaceConfig};

struct TestApp {
    app: Router,
    sessions: MockSessionRepository,
}

fn create_app() -> TestApp {
    let sessions = MockSessionRepository::new();
    let workspaces = MockWorkspaceRepository::new();
    let memberships = MockMembershipRepository::new();
    let invitations = MockInvitationRepository::new(workspaces.clone(), memberships.clone());

    let state = AppState {
        session_repo: sessions.clone(),
        workspace_repo: workspaces,
        membership_repo: memberships,
        invitation_repo: invitations,
        config: WorkspaceConfig::default(),
    };

    let app = Router::new()
        .nest(
            "/workspaces",
            workspace_routes::<
                MockSessionRepository,
                MockWorkspaceRepository,
                MockMembershipRepository,
                MockInvitationRepository,
            >(),
        )
        .nest(
            "/invitations",
            invitation_routes::<
                MockSessionRepository,
                MockWorkspaceRepository,
                MockMembershipRepository,
                MockInvitationRepository,
            >(),
        )
        .with_state(state);

    TestApp { app, sessions }
}

async fn body_to_json(body: Body) -> serde_json::Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<serde_json::Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Creates a workspace as the given session and returns its id.
async fn create_workspace(app: &Router, token: &str, name: &str) -> i64 {
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/workspaces",
            Some(token),
            Some(serde_json::json!({ "name": name })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_to_json(response.into_body()).await;
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_requests_without_session_are_unauthorized() {
    let harness = create_app();

    for (method, uri) in [
        ("GET", "/invitations"),
        ("POST", "/workspaces/1/invites"),
        ("GET", "/workspaces/1/invites"),
        ("POST", "/invitations/1/decline"),
    ] {
        let body = (method == "POST").then(|| serde_json::json!({}));
        let response = harness
            .app
            .clone()
            .oneshot(request(method, uri, None, body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
    }
}

#[tokio::test]
async fn test_invitation_flow_over_http() {
    let harness = create_app();
    harness.sessions.insert("owner-token", 1, "owner@x.com");
    harness.sessions.insert("carol-token", 2, "carol@x.com");

    let workspace_id = create_workspace(&harness.app, "owner-token", "Acme Corp").await;

    // owner invites carol
    let response = harness
        .app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/workspaces/{workspace_id}/invites"),
            Some("owner-token"),
            Some(serde_json::json!({ "email": "Carol@X.com", "role": "member" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let invitation = body_to_json(response.into_body()).await;
    assert_eq!(invitation["email"], "carol@x.com");
    assert_eq!(invitation["status"], "pending");
    let invitation_id = invitation["id"].as_i64().unwrap();

    // carol sees it in her pending list
    let response = harness
        .app
        .clone()
        .oneshot(request("GET", "/invitations", Some("carol-token"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let pending = body_to_json(response.into_body()).await;
    assert_eq!(pending.as_array().unwrap().len(), 1);
    assert_eq!(pending[0]["workspace_name"], "Acme Corp");
    assert_eq!(pending[0]["invited_by_email"], "owner@x.com");

    // carol accepts and becomes a member
    let response = harness
        .app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/invitations/{invitation_id}/accept"),
            Some("carol-token"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let membership = body_to_json(response.into_body()).await;
    assert_eq!(membership["workspace_id"].as_i64().unwrap(), workspace_id);
    assert_eq!(membership["user_id"], 2);
    assert_eq!(membership["role"], "member");

    // her pending list is now empty and the workspace shows up for her
    let response = harness
        .app
        .clone()
        .oneshot(request("GET", "/invitations", Some("carol-token"), None))
        .await
        .unwrap();
    let pending = body_to_json(response.into_body()).await;
    assert!(pending.as_array().unwrap().is_empty());

    let response = harness
        .app
        .clone()
        .oneshot(request("GET", "/workspaces", Some("carol-token"), None))
        .await
        .unwrap();
    let workspaces = body_to_json(response.into_body()).await;
    assert_eq!(workspaces.as_array().unwrap().len(), 1);
    assert_eq!(workspaces[0]["name"], "Acme Corp");
}

#[tokio::test]
async fn test_member_cannot_invite() {
    let harness = create_app();
    harness.sessions.insert("owner-token", 1, "owner@x.com");
    harness.sessions.insert("mem-token", 2, "mem@x.com");

    let workspace_id = create_workspace(&harness.app, "owner-token", "Acme Corp").await;

    // bring user 2 in as a plain member
    let response = harness
        .app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/workspaces/{workspace_id}/invites"),
            Some("owner-token"),
            Some(serde_json::json!({ "email": "mem@x.com", "role": "member" })),
        ))
        .await
        .unwrap();
    let invitation = body_to_json(response.into_body()).await;
    let invitation_id = invitation["id"].as_i64().unwrap();

    harness
        .app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/invitations/{invitation_id}/accept"),
            Some("mem-token"),
            None,
        ))
        .await
        .unwrap();

    // the member may not invite
    let response = harness
        .app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/workspaces/{workspace_id}/invites"),
            Some("mem-token"),
            Some(serde_json::json!({ "email": "other@x.com", "role": "member" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_to_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("role"));

    // nor list the workspace's invitations
    let response = harness
        .app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/workspaces/{workspace_id}/invites"),
            Some("mem-token"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_accept_with_wrong_email_is_forbidden() {
    let harness = create_app();
    harness.sessions.insert("owner-token", 1, "owner@x.com");
    harness.sessions.insert("bob-token", 3, "bob@x.com");

    let workspace_id = create_workspace(&harness.app, "owner-token", "Acme Corp").await;

    let response = harness
        .app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/workspaces/{workspace_id}/invites"),
            Some("owner-token"),
            Some(serde_json::json!({ "email": "alice@x.com", "role": "member" })),
        ))
        .await
        .unwrap();
    let invitation = body_to_json(response.into_body()).await;
    let invitation_id = invitation["id"].as_i64().unwrap();

    let response = harness
        .app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/invitations/{invitation_id}/accept"),
            Some("bob-token"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_to_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("email"));
}

#[tokio::test]
async fn test_decline_twice_conflicts() {
    let harness = create_app();
    harness.sessions.insert("owner-token", 1, "owner@x.com");
    harness.sessions.insert("carol-token", 2, "carol@x.com");

    let workspace_id = create_workspace(&harness.app, "owner-token", "Acme Corp").await;

    let response = harness
        .app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/workspaces/{workspace_id}/invites"),
            Some("owner-token"),
            Some(serde_json::json!({ "email": "carol@x.com", "role": "member" })),
        ))
        .await
        .unwrap();
    let invitation = body_to_json(response.into_body()).await;
    let invitation_id = invitation["id"].as_i64().unwrap();

    let decline = request(
        "POST",
        &format!("/invitations/{invitation_id}/decline"),
        Some("carol-token"),
        None,
    );
    let response = harness.app.clone().oneshot(decline).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_json(response.into_body()).await;
    assert!(body["message"].as_str().is_some());

    let decline = request(
        "POST",
        &format!("/invitations/{invitation_id}/decline"),
        Some("carol-token"),
        None,
    );
    let response = harness.app.clone().oneshot(decline).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_cancel_invitation() {
    let harness = create_app();
    harness.sessions.insert("owner-token", 1, "owner@x.com");

    let workspace_id = create_workspace(&harness.app, "owner-token", "Acme Corp").await;
    let other_workspace_id = create_workspace(&harness.app, "owner-token", "Other Corp").await;

    let response = harness
        .app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/workspaces/{workspace_id}/invites"),
            Some("owner-token"),
            Some(serde_json::json!({ "email": "carol@x.com", "role": "member" })),
        ))
        .await
        .unwrap();
    let invitation = body_to_json(response.into_body()).await;
    let invitation_id = invitation["id"].as_i64().unwrap();

    // the invitation is not reachable through another workspace's path
    let response = harness
        .app
        .clone()
        .oneshot(request(
            "DELETE",
            &format!("/workspaces/{other_workspace_id}/invites/{invitation_id}"),
            Some("owner-token"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = harness
        .app
        .clone()
        .oneshot(request(
            "DELETE",
            &format!("/workspaces/{workspace_id}/invites/{invitation_id}"),
            Some("owner-token"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["success"], true);

    // gone from the workspace listing
    let response = harness
        .app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/workspaces/{workspace_id}/invites"),
            Some("owner-token"),
            None,
        ))
        .await
        .unwrap();
    let invitations = body_to_json(response.into_body()).await;
    assert!(invitations.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_inputs_are_bad_requests() {
    let harness = create_app();
    harness.sessions.insert("owner-token", 1, "owner@x.com");

    let workspace_id = create_workspace(&harness.app, "owner-token", "Acme Corp").await;

    // unknown role
    let response = harness
        .app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/workspaces/{workspace_id}/invites"),
            Some("owner-token"),
            Some(serde_json::json!({ "email": "carol@x.com", "role": "superuser" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // malformed email
    let response = harness
        .app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/workspaces/{workspace_id}/invites"),
            Some("owner-token"),
            Some(serde_json::json!({ "email": "notanemail", "role": "member" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_to_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().to_lowercase().contains("email"));

    // empty workspace name
    let response = harness
        .app
        .clone()
        .oneshot(request(
            "POST",
            "/workspaces",
            Some("owner-token"),
            Some(serde_json::json!({ "name": "  " })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_accept_unknown_invitation_is_not_found() {
    let harness = create_app();
    harness.sessions.insert("carol-token", 2, "carol@x.com");

    let response = harness
        .app
        .clone()
        .oneshot(request(
            "POST",
            "/invitations/999/accept",
            Some("carol-token"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_last_owner_removal_conflicts_over_http() {
    let harness = create_app();
    harness.sessions.insert("owner-token", 1, "owner@x.com");

    let workspace_id = create_workspace(&harness.app, "owner-token", "Acme Corp").await;

    let response = harness
        .app
        .clone()
        .oneshot(request(
            "DELETE",
            &format!("/workspaces/{workspace_id}/members/1"),
            Some("owner-token"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_to_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("owner"));
}
