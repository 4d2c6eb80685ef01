//! 授权记录 API 集成测试（内存存储）

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

mod common;
use common::{create_entitlement, create_test_app, delete, get, send_json, COLLECTION};

#[tokio::test]
async fn test_create_entitlement() {
    let app = create_test_app();

    let (status, data) = send_json(
        &app,
        "POST",
        COLLECTION,
        json!({
            "user_id": "test_user_123",
            "resource_type": "document",
            "resource_id": "doc_abc_789",
            "access_level": "edit",
            "description": "Test document entitlement"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(data["user_id"], "test_user_123");
    assert_eq!(data["resource_type"], "document");
    assert_eq!(data["resource_id"], "doc_abc_789");
    assert_eq!(data["access_level"], "edit");
    assert_eq!(data["is_active"], true);
    assert!(Uuid::parse_str(data["id"].as_str().unwrap()).is_ok());
    assert!(data["created_at"].is_string());
    assert!(data["updated_at"].is_null());
    assert!(data["granted_by"].is_null());
}

#[tokio::test]
async fn test_create_entitlement_missing_fields() {
    let app = create_test_app();

    let (status, data) = send_json(&app, "POST", COLLECTION, json!({"user_id": "user1"})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        data["error"]["message"],
        "user_id, resource_type, and resource_id are required"
    );

    // 校验失败不应写入任何记录
    let (_, list) = get(&app, COLLECTION).await;
    assert_eq!(list["total"], 0);
}

#[tokio::test]
async fn test_create_entitlement_empty_field() {
    let app = create_test_app();

    let (status, _) = send_json(
        &app,
        "POST",
        COLLECTION,
        json!({"user_id": "u1", "resource_type": "", "resource_id": "d1"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_read_entitlements_empty() {
    let app = create_test_app();

    let (status, data) = get(&app, COLLECTION).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(data["items"], json!([]));
    assert_eq!(data["total"], 0);
}

#[tokio::test]
async fn test_collection_path_with_trailing_slash() {
    let app = create_test_app();
    let uri = format!("{}/", COLLECTION);

    let (status, _) = send_json(
        &app,
        "POST",
        &uri,
        json!({"user_id": "u1", "resource_type": "doc", "resource_id": "d1"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, data) = get(&app, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(data["total"], 1);
}

#[tokio::test]
async fn test_read_entitlements_with_data() {
    let app = create_test_app();
    create_entitlement(
        &app,
        json!({"user_id": "user1", "resource_type": "collection", "resource_id": "col1", "access_level": "read"}),
    )
    .await;
    create_entitlement(
        &app,
        json!({"user_id": "user2", "resource_type": "document", "resource_id": "doc1", "access_level": "write", "is_active": false}),
    )
    .await;

    let (status, data) = get(&app, COLLECTION).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(data["items"].as_array().unwrap().len(), 2);
    assert_eq!(data["total"], 2);
    assert_eq!(data["items"][0]["user_id"], "user1");
    assert_eq!(data["items"][1]["user_id"], "user2");
    assert_eq!(data["items"][1]["is_active"], false);
}

#[tokio::test]
async fn test_read_single_entitlement() {
    let app = create_test_app();
    let created = create_entitlement(
        &app,
        json!({"user_id": "user_single", "resource_type": "tool", "resource_id": "tool_xyz", "access_level": "use"}),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let (status, data) = get(&app, &format!("{}/{}", COLLECTION, id)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(data, created);
}

#[tokio::test]
async fn test_read_single_entitlement_not_found() {
    let app = create_test_app();

    let (status, data) = get(&app, &format!("{}/{}", COLLECTION, Uuid::new_v4())).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(data["error"]["message"], "Entitlement not found");
}

#[tokio::test]
async fn test_read_single_entitlement_malformed_id() {
    let app = create_test_app();

    let (status, _) = get(&app, &format!("{}/not-a-uuid", COLLECTION)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_entitlement() {
    let app = create_test_app();
    let created = create_entitlement(
        &app,
        json!({"user_id": "user_to_update", "resource_type": "system", "resource_id": "sys_main", "access_level": "admin"}),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let (status, data) = send_json(
        &app,
        "PUT",
        &format!("{}/{}", COLLECTION, id),
        json!({"access_level": "viewer", "is_active": false, "description": "Updated access"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(data["id"], created["id"]);
    assert_eq!(data["access_level"], "viewer");
    assert_eq!(data["is_active"], false);
    assert_eq!(data["description"], "Updated access");
    assert_eq!(data["user_id"], "user_to_update");
    assert_eq!(data["created_at"], created["created_at"]);
    assert!(data["updated_at"].is_string());
}

#[tokio::test]
async fn test_update_entitlement_explicit_null_clears_field() {
    let app = create_test_app();
    let created = create_entitlement(
        &app,
        json!({"user_id": "u1", "resource_type": "doc", "resource_id": "d1", "description": "temp", "granted_by": "admin"}),
    )
    .await;
    let uri = format!("{}/{}", COLLECTION, created["id"].as_str().unwrap());

    let (status, data) = send_json(&app, "PATCH", &uri, json!({"description": null})).await;

    assert_eq!(status, StatusCode::OK);
    assert!(data["description"].is_null());
    assert_eq!(data["granted_by"], "admin");
}

#[tokio::test]
async fn test_update_entitlement_allows_empty_required_field() {
    let app = create_test_app();
    let created = create_entitlement(
        &app,
        json!({"user_id": "u1", "resource_type": "doc", "resource_id": "d1"}),
    )
    .await;
    let uri = format!("{}/{}", COLLECTION, created["id"].as_str().unwrap());

    // 更新不做字段校验
    let (status, data) = send_json(&app, "PUT", &uri, json!({"user_id": ""})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(data["user_id"], "");
}

#[tokio::test]
async fn test_update_entitlement_null_required_field_is_storage_error() {
    let app = create_test_app();
    let created = create_entitlement(
        &app,
        json!({"user_id": "u1", "resource_type": "doc", "resource_id": "d1"}),
    )
    .await;
    let uri = format!("{}/{}", COLLECTION, created["id"].as_str().unwrap());

    let (status, data) = send_json(&app, "PUT", &uri, json!({"user_id": null})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(data["error"]["message"], "Database error occurred");

    let (_, unchanged) = get(&app, &uri).await;
    assert_eq!(unchanged, created);
}

#[tokio::test]
async fn test_update_entitlement_not_found() {
    let app = create_test_app();

    let (status, _) = send_json(
        &app,
        "PUT",
        &format!("{}/{}", COLLECTION, Uuid::new_v4()),
        json!({"access_level": "none"}),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_entitlement() {
    let app = create_test_app();
    let created = create_entitlement(
        &app,
        json!({"user_id": "user_to_delete", "resource_type": "feature", "resource_id": "feat_beta", "access_level": "tester"}),
    )
    .await;
    let uri = format!("{}/{}", COLLECTION, created["id"].as_str().unwrap());

    let (status, _) = get(&app, &uri).await;
    assert_eq!(status, StatusCode::OK);

    let (status, deleted) = delete(&app, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted, created);

    let (status, _) = get(&app, &uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = delete(&app, &uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send_json(&app, "PUT", &uri, json!({"is_active": true})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_entitlement_not_found() {
    let app = create_test_app();

    let (status, _) = delete(&app, &format!("{}/{}", COLLECTION, Uuid::new_v4())).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_read_entitlements_with_filters() {
    let app = create_test_app();
    create_entitlement(&app, json!({"user_id": "filter_user1", "resource_type": "doc", "resource_id": "doc1", "access_level": "read"})).await;
    create_entitlement(&app, json!({"user_id": "filter_user1", "resource_type": "col", "resource_id": "col1", "access_level": "edit"})).await;
    create_entitlement(&app, json!({"user_id": "filter_user2", "resource_type": "doc", "resource_id": "doc2", "access_level": "read", "is_active": false})).await;
    create_entitlement(&app, json!({"user_id": "filter_user1", "resource_type": "doc", "resource_id": "doc3", "access_level": "admin", "is_active": false})).await;

    let (status, data) = get(&app, &format!("{}?user_id=filter_user1", COLLECTION)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(data["total"], 3);
    assert!(data["items"]
        .as_array()
        .unwrap()
        .iter()
        .all(|item| item["user_id"] == "filter_user1"));

    let (_, data) = get(
        &app,
        &format!("{}?user_id=filter_user1&resource_type=doc", COLLECTION),
    )
    .await;
    assert_eq!(data["total"], 2);
    assert!(data["items"]
        .as_array()
        .unwrap()
        .iter()
        .all(|item| item["user_id"] == "filter_user1" && item["resource_type"] == "doc"));

    let (_, data) = get(
        &app,
        &format!(
            "{}?user_id=filter_user1&resource_type=doc&is_active=false",
            COLLECTION
        ),
    )
    .await;
    assert_eq!(data["total"], 1);
    let item = &data["items"][0];
    assert_eq!(item["resource_id"], "doc3");
    assert_eq!(item["is_active"], false);

    let (_, data) = get(&app, &format!("{}?is_active=true", COLLECTION)).await;
    assert_eq!(data["total"], 2);
    assert!(data["items"]
        .as_array()
        .unwrap()
        .iter()
        .all(|item| item["is_active"] == true));
}

#[tokio::test]
async fn test_pagination_total_ignores_skip_and_limit() {
    let app = create_test_app();
    for i in 0..5 {
        create_entitlement(
            &app,
            json!({"user_id": "u1", "resource_type": "doc", "resource_id": format!("d{i}")}),
        )
        .await;
    }

    let (status, data) = get(&app, &format!("{}?skip=1&limit=2", COLLECTION)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(data["total"], 5);
    let items = data["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["resource_id"], "d1");
    assert_eq!(items[1]["resource_id"], "d2");

    let (_, data) = get(&app, &format!("{}?skip=10", COLLECTION)).await;
    assert_eq!(data["total"], 5);
    assert_eq!(data["items"], json!([]));
}

#[tokio::test]
async fn test_pagination_bounds_rejected() {
    let app = create_test_app();

    for query in ["skip=-1", "limit=0", "limit=201"] {
        let (status, _) = get(&app, &format!("{}?{}", COLLECTION, query)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "query {query} should be rejected");
    }

    let (status, _) = get(&app, &format!("{}?limit=200", COLLECTION)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_lifecycle_scenario() {
    let app = create_test_app();

    let created = create_entitlement(
        &app,
        json!({"user_id": "u1", "resource_type": "doc", "resource_id": "d1", "access_level": "read"}),
    )
    .await;
    assert_eq!(created["is_active"], true);
    let uri = format!("{}/{}", COLLECTION, created["id"].as_str().unwrap());

    let (_, list) = get(&app, COLLECTION).await;
    assert_eq!(list["total"], 1);
    assert_eq!(list["items"][0]["user_id"], "u1");

    let (status, updated) = send_json(&app, "PUT", &uri, json!({"is_active": false})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["is_active"], false);
    assert_eq!(updated["user_id"], "u1");

    let (status, deleted) = delete(&app, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted, updated);

    let (status, _) = get(&app, &uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_response_carries_tracking_headers() {
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    let app = create_test_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri(COLLECTION)
                .header("x-trace-id", "trace-abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()["x-trace-id"], "trace-abc");
    assert!(response.headers().contains_key("x-request-id"));
}
