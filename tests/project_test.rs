mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

use common::{Factory, TempDatabase, TestApp};
use taskflow::models::{DEFAULT_PROJECT_COLOR, INBOX_COLOR};
use taskflow::repositories::{Repository, TaskRepository};

async fn inbox_id(app: &TestApp) -> i64 {
    let body: Value = app.server.get("/api/projects").await.json();
    body.as_array()
        .unwrap()
        .iter()
        .find(|p| p["name"] == "Inbox")
        .and_then(|p| p["id"].as_i64())
        .unwrap()
}

#[tokio::test]
async fn test_create_project() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/api/projects")
        .json(&json!({
            "name": "Work",
            "color": "#000"
        }))
        .await;

    response.assert_status(StatusCode::CREATED);

    let body: Value = response.json();
    assert_eq!(body["name"].as_str().unwrap(), "Work");
    assert_eq!(body["color"].as_str().unwrap(), "#000");
    assert!(body["id"].as_i64().is_some());
}

#[tokio::test]
async fn test_create_project_default_color() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/api/projects")
        .json(&json!({ "name": "Personal" }))
        .await;

    response.assert_status(StatusCode::CREATED);

    let body: Value = response.json();
    assert_eq!(body["color"].as_str().unwrap(), DEFAULT_PROJECT_COLOR);
}

#[tokio::test]
async fn test_create_project_duplicate_name() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    factory.create_project_with_name("Work").await;

    let response = app
        .server
        .post("/api/projects")
        .json(&json!({ "name": "Work" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["error"].as_str().unwrap(), "conflict");
}

#[tokio::test]
async fn test_create_inbox_twice_conflicts() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/api/projects")
        .json(&json!({ "name": "Inbox" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"].as_str().unwrap(), "conflict");
}

#[tokio::test]
async fn test_concurrent_creates_with_same_name() {
    let app = TestApp::new().await;
    let payload = json!({ "name": "Race" });

    let (first, second) = tokio::join!(
        async { app.server.post("/api/projects").json(&payload).await },
        async { app.server.post("/api/projects").json(&payload).await },
    );

    let mut statuses = vec![
        first.status_code().as_u16(),
        second.status_code().as_u16(),
    ];
    statuses.sort_unstable();
    assert_eq!(statuses, vec![201, 400]);

    // Exactly one project carries the name
    let body: Value = app.server.get("/api/projects").await.json();
    let count = body
        .as_array()
        .unwrap()
        .iter()
        .filter(|p| p["name"] == "Race")
        .count();
    assert_eq!(count, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_on_file_database() {
    let database = TempDatabase::new();
    let app = TestApp::with_config(database.config()).await;

    for round in 0..10 {
        let payload = json!({ "name": format!("Race{}", round) });
        let (server, payload) = (&app.server, &payload);
        let create = move || async move { server.post("/api/projects").json(payload).await };

        let (a, b, c, d, e) = tokio::join!(create(), create(), create(), create(), create());
        let responses = [a, b, c, d, e];

        let created = responses
            .iter()
            .filter(|r| r.status_code() == StatusCode::CREATED)
            .count();
        assert_eq!(created, 1, "round {round}");

        for response in responses
            .iter()
            .filter(|r| r.status_code() != StatusCode::CREATED)
        {
            response.assert_status(StatusCode::BAD_REQUEST);
            let body: Value = response.json();
            assert_eq!(body["error"].as_str().unwrap(), "conflict");
        }
    }

    let body: Value = app.server.get("/api/projects").await.json();
    // Inbox plus one project per round
    assert_eq!(body.as_array().unwrap().len(), 11);
}

#[tokio::test]
async fn test_create_project_validation() {
    let app = TestApp::new().await;

    let blank = app
        .server
        .post("/api/projects")
        .json(&json!({ "name": "  " }))
        .await;
    blank.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = blank.json();
    assert_eq!(body["error"].as_str().unwrap(), "validation_error");

    let too_long = app
        .server
        .post("/api/projects")
        .json(&json!({ "name": "x".repeat(81) }))
        .await;
    too_long.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let long_color = app
        .server
        .post("/api/projects")
        .json(&json!({ "name": "Colourful", "color": "#".repeat(21) }))
        .await;
    long_color.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let missing_name = app
        .server
        .post("/api/projects")
        .json(&json!({ "color": "#fff" }))
        .await;
    missing_name.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_list_projects_sorted_by_name() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    factory.create_project_with_name("Zeta").await;
    factory.create_project_with_name("Alpha").await;

    let response = app.server.get("/api/projects").await;
    response.assert_status(StatusCode::OK);

    let body: Value = response.json();
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Alpha", "Inbox", "Zeta"]);
}

#[tokio::test]
async fn test_update_project() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let project = factory.create_project_with_name("Travail").await;

    let response = app
        .server
        .put(&format!("/api/projects/{}", project.id))
        .json(&json!({
            "name": "Travail Pro",
            "color": "#16a34a"
        }))
        .await;

    response.assert_status(StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["name"].as_str().unwrap(), "Travail Pro");
    assert_eq!(body["color"].as_str().unwrap(), "#16a34a");
}

#[tokio::test]
async fn test_update_project_partial() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let project = factory.create_project_with_name("Original Name").await;

    // Update only color
    let response = app
        .server
        .put(&format!("/api/projects/{}", project.id))
        .json(&json!({ "color": "#ff0000" }))
        .await;

    response.assert_status(StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["name"].as_str().unwrap(), "Original Name");
    assert_eq!(body["color"].as_str().unwrap(), "#ff0000");
}

#[tokio::test]
async fn test_update_project_empty_payload_is_noop() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let project = factory.create_project_with_name("Stable").await;

    let response = app
        .server
        .put(&format!("/api/projects/{}", project.id))
        .json(&json!({}))
        .await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["name"].as_str().unwrap(), "Stable");
    assert_eq!(body["color"].as_str().unwrap(), DEFAULT_PROJECT_COLOR);
}

#[tokio::test]
async fn test_update_project_not_found() {
    let app = TestApp::new().await;

    let response = app
        .server
        .put("/api/projects/9999")
        .json(&json!({ "name": "Ghost" }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error"].as_str().unwrap(), "not_found");
}

#[tokio::test]
async fn test_update_project_to_taken_name_conflicts() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    factory.create_project_with_name("Home").await;
    let project = factory.create_project_with_name("Garden").await;

    let response = app
        .server
        .put(&format!("/api/projects/{}", project.id))
        .json(&json!({ "name": "Home" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"].as_str().unwrap(), "conflict");
}

#[tokio::test]
async fn test_inbox_cannot_be_renamed_but_can_be_recolored() {
    let app = TestApp::new().await;
    let id = inbox_id(&app).await;

    let rename = app
        .server
        .put(&format!("/api/projects/{}", id))
        .json(&json!({ "name": "Someday" }))
        .await;
    rename.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = rename.json();
    assert_eq!(body["error"].as_str().unwrap(), "forbidden");

    let recolor = app
        .server
        .put(&format!("/api/projects/{}", id))
        .json(&json!({ "color": "#111111" }))
        .await;
    recolor.assert_status(StatusCode::OK);
    let body: Value = recolor.json();
    assert_eq!(body["name"].as_str().unwrap(), "Inbox");
    assert_ne!(body["color"].as_str().unwrap(), INBOX_COLOR);
}

#[tokio::test]
async fn test_delete_project() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let project = factory.create_project().await;

    let response = app
        .server
        .delete(&format!("/api/projects/{}", project.id))
        .await;

    response.assert_status(StatusCode::NO_CONTENT);

    // Verify it's deleted
    let body: Value = app.server.get("/api/projects").await.json();
    assert!(body
        .as_array()
        .unwrap()
        .iter()
        .all(|p| p["id"].as_i64() != Some(project.id as i64)));
}

#[tokio::test]
async fn test_delete_project_detaches_tasks() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let project = factory.create_project().await;
    let other = factory.create_project().await;

    let mut owned = Vec::new();
    for i in 0..3 {
        owned.push(
            factory
                .create_task_in_project(&format!("Task {}", i), project.id)
                .await,
        );
    }
    let bystander = factory.create_task_in_project("Elsewhere", other.id).await;

    let response = app
        .server
        .delete(&format!("/api/projects/{}", project.id))
        .await;
    response.assert_status(StatusCode::NO_CONTENT);

    // Tasks survive with their project reference cleared
    for task in owned {
        let stored = TaskRepository::find_by_id(&app.state.db, task.id)
            .await
            .unwrap();
        assert_eq!(stored.project_id, None);
        assert_eq!(stored.title, task.title);
    }

    let stored = TaskRepository::find_by_id(&app.state.db, bystander.id)
        .await
        .unwrap();
    assert_eq!(stored.project_id, Some(other.id));
}

#[tokio::test]
async fn test_delete_inbox_forbidden() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let id = inbox_id(&app).await;
    let task = factory.create_task_in_project("Inbox item", id as i32).await;

    let response = app.server.delete(&format!("/api/projects/{}", id)).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"].as_str().unwrap(), "forbidden");

    // Nothing was detached
    let stored = TaskRepository::find_by_id(&app.state.db, task.id)
        .await
        .unwrap();
    assert_eq!(stored.project_id, Some(id as i32));
}

#[tokio::test]
async fn test_delete_project_not_found() {
    let app = TestApp::new().await;

    let response = app.server.delete("/api/projects/9999").await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_project_id() {
    let app = TestApp::new().await;

    let response = app.server.delete("/api/projects/not-a-number").await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}
