//! End-to-end API tests over a temporary libsql database

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use wayfinder_server::{create_router, AppState};

const NODES: &str = "nodeID,xcoord,ycoord,floor,building,nodeType,longName,shortName
CLOBB001L1,0,0,L1,Tower,LOBB,Main Lobby,Lobby
CHALL001L1,30,40,L1,Tower,HALL,Hallway 1,Hall 1
CHALL002L1,100,0,L1,Tower,HALL,Hallway 2,Hall 2
CPATI001L1,100,40,L1,Tower,PATI,Patient Room 1,Room 1
";

const EDGES: &str = "startNodeID,endNodeID
CLOBB001L1,CHALL001L1
CHALL001L1,CHALL002L1
CLOBB001L1,CHALL002L1
CHALL002L1,CPATI001L1
";

const EMPLOYEES: &str = "employeeID,firstName,lastName,email,position
E1,Ada,Lovelace,ada@hospital.test,Nurse
E2,Alan,Turing,alan@hospital.test,Porter
";

async fn test_app() -> (Router, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let state = AppState::from_database(temp_dir.path().join("wayfinder.db"))
        .await
        .unwrap();
    (create_router(state, &[]), temp_dir)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

async fn send_json(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, bytes) = send(app, method, uri, body).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn seeded_app() -> (Router, TempDir) {
    let (app, temp_dir) = test_app().await;
    for (uri, csv) in [
        ("/api/node-populate", NODES),
        ("/api/edge-populate", EDGES),
        ("/api/employee-populate", EMPLOYEES),
    ] {
        let (status, _) =
            send_json(&app, Method::POST, uri, Some(json!({ "csvString": csv }))).await;
        assert_eq!(status, StatusCode::OK, "populating {}", uri);
    }
    (app, temp_dir)
}

#[tokio::test]
async fn test_healthcheck_returns_empty_ok() {
    let (app, _dir) = test_app().await;
    let (status, body) = send(&app, Method::GET, "/healthcheck", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_path_finds_shortest_route() {
    let (app, _dir) = seeded_app().await;
    let (status, body) = send_json(
        &app,
        Method::GET,
        "/api/path?start=CLOBB001L1&end=CPATI001L1",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["found"], true);
    assert_eq!(
        body["path"],
        json!(["CLOBB001L1", "CHALL002L1", "CPATI001L1"])
    );
    assert_eq!(body["distance"], json!(140.0));
    assert_eq!(body["strategy"], "dijkstra");

    let (status, astar) = send_json(
        &app,
        Method::GET,
        "/api/path?start=CLOBB001L1&end=CPATI001L1&strategy=astar",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(astar["path"], body["path"]);

    for spelling in ["AStar", "a*"] {
        let uri = format!(
            "/api/path?start=CLOBB001L1&end=CPATI001L1&strategy={}",
            spelling
        );
        let (status, mixed) = send_json(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK, "strategy={}", spelling);
        assert_eq!(mixed["strategy"], "astar");
        assert_eq!(mixed["path"], body["path"]);
    }

    let (status, unknown) = send_json(
        &app,
        Method::GET,
        "/api/path?start=CLOBB001L1&end=CPATI001L1&strategy=bfs",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(unknown["error"]["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_path_unknown_node_uses_error_envelope() {
    let (app, _dir) = seeded_app().await;
    let (status, body) = send_json(
        &app,
        Method::GET,
        "/api/path?start=CLOBB001L1&end=NOPE",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["status"], 404);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
    assert_eq!(body["error"]["path"], "/api/path");
    assert_eq!(body["error"]["method"], "GET");
}

#[tokio::test]
async fn test_path_missing_query_is_bad_request() {
    let (app, _dir) = seeded_app().await;
    let (status, body) = send_json(&app, Method::GET, "/api/path?start=CLOBB001L1", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let (app, _dir) = test_app().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/node-populate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"]["status"], 400);
    assert_eq!(body["error"]["path"], "/api/node-populate");
    assert_eq!(body["error"]["method"], "POST");
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let (app, _dir) = test_app().await;
    let (status, body) = send_json(&app, Method::GET, "/x", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Not Found: GET /x");
}

#[tokio::test]
async fn test_csv_import_and_download() {
    let (app, _dir) = seeded_app().await;

    let (status, nodes) = send_json(&app, Method::GET, "/api/nodes", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(nodes.as_array().unwrap().len(), 4);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/download-edge-csv")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    assert!(response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("edges.csv"));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("edgeID,startNodeID,endNodeID"));
    assert_eq!(lines.next(), Some("CLOBB001L1_CHALL001L1,CLOBB001L1,CHALL001L1"));
    assert_eq!(lines.count(), 3);
}

#[tokio::test]
async fn test_rejected_csv_keeps_previous_map() {
    let (app, _dir) = seeded_app().await;
    let bad = "nodeID,xcoord,ycoord,floor,building,nodeType,longName,shortName\nX,abc,0,L1,T,HALL,H,H\n";
    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/node-populate",
        Some(json!({ "csvString": bad })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "CSV_ERROR");

    let (_, nodes) = send_json(&app, Method::GET, "/api/nodes", None).await;
    assert_eq!(nodes.as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_map_editing_round_trip() {
    let (app, _dir) = seeded_app().await;

    let new_node = json!({
        "nodeID": "CPATI002L1", "xcoord": 130, "ycoord": 40, "floor": "L1",
        "building": "Tower", "nodeType": "PATI",
        "longName": "Patient Room 2", "shortName": "Room 2"
    });
    let (status, edit) = send_json(
        &app,
        Method::POST,
        "/api/add-nodes-and-associated-edges",
        Some(json!({
            "nodes": [new_node],
            "edges": [{ "startNodeID": "CPATI001L1", "endNodeID": "CPATI002L1" }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(edit, json!({ "nodes": 1, "edges": 1 }));

    let (_, rooms) = send_json(&app, Method::GET, "/api/room-name-fetch", None).await;
    assert!(rooms
        .as_array()
        .unwrap()
        .contains(&json!("Patient Room 2")));

    let (status, edit) = send_json(
        &app,
        Method::POST,
        "/api/delete-nodes-and-associated-edges",
        Some(json!({ "nodeIDs": ["CPATI002L1"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(edit, json!({ "nodes": 1, "edges": 1 }));

    let (status, _) = send_json(&app, Method::GET, "/api/nodes/CPATI002L1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_service_request_lifecycle() {
    let (app, _dir) = seeded_app().await;

    let (status, created) = send_json(
        &app,
        Method::POST,
        "/api/flower-service-request",
        Some(json!({
            "requestedBy": "Front Desk",
            "location": "CPATI001L1",
            "priority": "High",
            "flowerType": "Tulip",
            "quantity": 6,
            "recipient": "Patient 12"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "Unassigned");
    let id = created["requestId"].as_str().unwrap().to_string();

    let (_, flowers) = send_json(&app, Method::GET, "/api/flower-service-request", None).await;
    assert_eq!(flowers.as_array().unwrap().len(), 1);
    let (_, gifts) = send_json(&app, Method::GET, "/api/gift-service-request", None).await;
    assert!(gifts.as_array().unwrap().is_empty());

    let uri = format!("/api/service-request/{}", id);
    let (status, assigned) = send_json(
        &app,
        Method::PATCH,
        &uri,
        Some(json!({ "assignedTo": "ada@hospital.test" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(assigned["status"], "Assigned");

    let (status, _) = send_json(
        &app,
        Method::PATCH,
        &uri,
        Some(json!({ "assignedTo": "nobody@hospital.test" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, closed) =
        send_json(&app, Method::PATCH, &uri, Some(json!({ "status": "Closed" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(closed["status"], "Closed");

    let (status, body) =
        send_json(&app, Method::PATCH, &uri, Some(json!({ "status": "InProgress" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");

    let (_, closed_list) =
        send_json(&app, Method::GET, "/api/service-request?status=Closed", None).await;
    assert_eq!(closed_list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_request_for_unknown_room_is_rejected() {
    let (app, _dir) = seeded_app().await;
    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/flower-service-request",
        Some(json!({
            "requestedBy": "Front Desk",
            "location": "NOWHERE",
            "flowerType": "Rose",
            "quantity": 1,
            "recipient": "Someone"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_high_scores_leaderboard() {
    let (app, _dir) = test_app().await;
    for (initials, time) in [("abc", 30), ("DEF", 90), ("GHI", 60)] {
        let (status, _) = send_json(
            &app,
            Method::POST,
            "/api/high-scores",
            Some(json!({ "initials": initials, "time": time })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, board) = send_json(&app, Method::GET, "/api/high-scores/all-time", None).await;
    assert_eq!(status, StatusCode::OK);
    let initials: Vec<&str> = board
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["initials"].as_str().unwrap())
        .collect();
    assert_eq!(initials, ["DEF", "GHI", "ABC"]);

    let (_, today) = send_json(&app, Method::GET, "/api/high-scores/today", None).await;
    assert_eq!(today.as_array().unwrap().len(), 3);

    let (status, _) = send_json(
        &app,
        Method::POST,
        "/api/high-scores",
        Some(json!({ "initials": "TOOLONG", "time": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
