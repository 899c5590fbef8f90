//! PageRank handler
//!
//! `POST /api/pagerank` computes influence scores over the follower graph,
//! optionally restricted to a set of followers. Unrestricted runs also
//! write the scores back to the accounts table.

use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use serde::Deserialize;
use tracing::error;
use validator::Validate;

use crate::AppState;
use followrank_common::{
    db::AccountRepository,
    errors::{AppError, Result},
    metrics::RequestMetrics,
};
use followrank_ranking::{FollowerSelection, RankResponse, RankService};

/// Request body; an empty body means a global computation
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PageRankRequest {
    /// Only edges from these followers are counted; absent or empty means all
    #[validate(length(max = 100000))]
    pub selected_followers: Option<Vec<String>>,
}

impl PageRankRequest {
    fn parse(body: &[u8]) -> Result<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        let request: Self = serde_json::from_slice(body).map_err(|e| AppError::Validation {
            message: format!("Invalid request body: {}", e),
            field: None,
        })?;

        request.validate().map_err(|e| AppError::Validation {
            message: e.to_string(),
            field: Some("selectedFollowers".to_string()),
        })?;

        Ok(request)
    }
}

/// Compute PageRank scores.
///
/// Computation failures are reported in the body with `success: false`
/// and an empty score map; only malformed requests surface as `AppError`.
pub async fn calculate_pagerank(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<RankResponse>)> {
    let request = PageRankRequest::parse(&body)?;
    let request_metrics = RequestMetrics::start("POST", "/api/pagerank");

    let selection = FollowerSelection::from_request(request.selected_followers);
    let repo = AccountRepository::new(state.db.clone());
    let service = RankService::new(repo.clone(), repo, state.config.ranking.clone());

    let (status, response) = match service.compute(selection).await {
        Ok(result) => (StatusCode::OK, RankResponse::from(result)),
        Err(e) => {
            error!(error = %e, "PageRank calculation error");
            (StatusCode::INTERNAL_SERVER_ERROR, RankResponse::failure(e.to_string()))
        }
    };

    request_metrics.finish(status.as_u16());
    Ok((status, Json(response)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::router;
    use axum::{body::Body, http::Request};
    use sea_orm::{DatabaseConnection, DbBackend, DbErr, MockDatabase, MockExecResult, Value};
    use serde_json::{json, Value as JsonValue};
    use std::collections::BTreeMap;
    use tower::ServiceExt;

    fn account_row(username: &str, followers: &[&str]) -> BTreeMap<&'static str, Value> {
        let mut row = BTreeMap::new();
        row.insert("username", Value::from(username.to_string()));
        row.insert(
            "followed_by",
            Value::from(followers.iter().map(|f| f.to_string()).collect::<Vec<_>>()),
        );
        row
    }

    fn sample_db() -> MockDatabase {
        MockDatabase::new(DbBackend::Postgres)
            .append_query_results([vec![account_row("A", &["X", "Y"]), account_row("B", &["Y", "Z"])]])
    }

    async fn post(conn: DatabaseConnection, body: &str) -> (StatusCode, JsonValue) {
        let response = router(conn)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/pagerank")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_parse_empty_body_is_global() {
        let request = PageRankRequest::parse(b"").unwrap();
        assert!(request.selected_followers.is_none());

        let request = PageRankRequest::parse(b"  \n").unwrap();
        assert!(request.selected_followers.is_none());
    }

    #[test]
    fn test_parse_selected_followers() {
        let request = PageRankRequest::parse(br#"{"selectedFollowers": ["x", "y"]}"#).unwrap();
        assert_eq!(request.selected_followers, Some(vec!["x".to_string(), "y".to_string()]));
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        let err = PageRankRequest::parse(b"{not json").unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_global_request_persists_scores() {
        let conn = sample_db()
            .append_exec_results([MockExecResult { last_insert_id: 0, rows_affected: 5 }])
            .into_connection();
        let log_handle = conn.clone();

        let (status, body) = post(conn, "{}").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["scores"].as_object().unwrap().len(), 5);
        assert_eq!(body["stats"]["nodes"], 5);
        assert_eq!(body["stats"]["relationships"], 4);
        assert_eq!(body["stats"]["selectedFollowersCount"], "all");
        assert!(body["stats"]["iterations"].as_u64().unwrap() <= 50);

        // One relationship query plus one score batch
        assert_eq!(log_handle.into_transaction_log().len(), 2);
    }

    #[tokio::test]
    async fn test_restricted_request_does_not_persist() {
        let conn = sample_db().into_connection();
        let log_handle = conn.clone();

        let (status, body) = post(conn, r#"{"selectedFollowers": ["Y", "Y"]}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["scores"], json!({ "A": 100.0, "B": 100.0, "Y": 0.0 }));
        assert_eq!(body["stats"]["nodes"], 3);
        assert_eq!(body["stats"]["relationships"], 2);
        assert_eq!(body["stats"]["selectedFollowersCount"], 2);
        assert_eq!(log_handle.into_transaction_log().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_selection_is_global() {
        let conn = sample_db()
            .append_exec_results([MockExecResult { last_insert_id: 0, rows_affected: 5 }])
            .into_connection();

        let (status, body) = post(conn, r#"{"selectedFollowers": []}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stats"]["selectedFollowersCount"], "all");
    }

    #[tokio::test]
    async fn test_persistence_failure_still_returns_scores() {
        let conn = sample_db()
            .append_exec_errors([DbErr::Custom("deadlock detected".into())])
            .into_connection();

        let (status, body) = post(conn, "{}").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["scores"].as_object().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_no_relationships_returns_empty_result() {
        let conn = MockDatabase::new(DbBackend::Postgres)
            .append_query_results([Vec::<BTreeMap<&'static str, Value>>::new()])
            .into_connection();

        let (status, body) = post(conn, "").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "success": true,
                "scores": {},
                "stats": { "nodes": 0, "relationships": 0, "iterations": 0 }
            })
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_is_reported_in_body() {
        let conn = MockDatabase::new(DbBackend::Postgres)
            .append_query_errors([DbErr::Custom("relation does not exist".into())])
            .into_connection();

        let (status, body) = post(conn, "{}").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["scores"], json!({}));
        assert!(body["error"].as_str().unwrap().contains("relation does not exist"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let conn = MockDatabase::new(DbBackend::Postgres).into_connection();
        let (status, body) = post(conn, "[1, 2").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["field"], JsonValue::Null);
    }
}
