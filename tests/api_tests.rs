use std::sync::Arc;

use actix_web::{http::StatusCode, test, App};
use chrono::{Duration, Utc};
use serde_json::{json, Value};

use taskboard_backend::store::MemoryStore;
use taskboard_backend::{app_configure, AppState, ServerInfo};

fn state() -> AppState {
    AppState {
        store: Arc::new(MemoryStore::new()),
        server: ServerInfo { started_at: Utc::now() },
    }
}

macro_rules! app {
    () => {
        test::init_service(App::new().configure(app_configure(state()))).await
    };
}

macro_rules! create_task {
    ($app:expr, $body:expr) => {{
        let req = test::TestRequest::post().uri("/api/tasks").set_json($body).to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        body["data"].clone()
    }};
}

#[actix_web::test]
async fn test_status() {
    let app = app!();
    let req = test::TestRequest::get().uri("/api/status").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "online");
    assert_eq!(body["store"], "memory");
    assert_eq!(body["connected"], true);
}

#[actix_web::test]
async fn test_create_and_get_task() {
    let app = app!();
    let due = Utc::now() + Duration::days(3);
    let task = create_task!(
        app,
        json!({"title": "  Plan sprint ", "priority": "high", "dueDate": due.to_rfc3339()})
    );
    assert_eq!(task["title"], "Plan sprint");
    assert_eq!(task["priority"], "high");
    assert_eq!(task["priorityText"], "High");
    assert_eq!(task["category"], "work");
    assert_eq!(task["completed"], false);
    assert_eq!(task["completedAt"], Value::Null);
    assert_eq!(task["isOverdue"], false);

    let id = task["id"].as_str().unwrap();
    let req = test::TestRequest::get().uri(&format!("/api/tasks/{}", id)).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["id"], id);
}

#[actix_web::test]
async fn test_create_task_validation() {
    let app = app!();

    let req = test::TestRequest::post().uri("/api/tasks").set_json(json!({"title": "   "})).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "ValidationError");

    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .set_json(json!({"title": "x", "category": "hobby"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let past = Utc::now() - Duration::days(1);
    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .set_json(json!({"title": "x", "dueDate": past.to_rfc3339()}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_list_filters_and_pagination() {
    let app = app!();
    for i in 0..12 {
        let priority = if i % 3 == 0 { "high" } else { "low" };
        create_task!(app, json!({"title": format!("task {}", i), "priority": priority}));
    }

    let req = test::TestRequest::get().uri("/api/tasks?page=2&limit=5").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total"], 12);
    assert_eq!(body["pages"], 3);
    assert_eq!(body["page"], 2);
    assert_eq!(body["data"].as_array().unwrap().len(), 5);
    assert_eq!(body["data"][0]["title"], "task 6");

    let req = test::TestRequest::get().uri("/api/tasks?priority=high").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total"], 4);

    let req = test::TestRequest::get().uri("/api/tasks?priority=urgent").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total"], 0);

    let req = test::TestRequest::get().uri("/api/tasks?page=9").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    let req = test::TestRequest::get().uri("/api/tasks?limit=0").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get().uri("/api/tasks?page=abc").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_search_toggle_and_stats() {
    let app = app!();
    let foobar = create_task!(app, json!({"title": "foobar"}));
    create_task!(app, json!({"title": "bar", "description": "nothing to see"}));
    create_task!(app, json!({"title": "other", "description": "about FOO"}));

    let id = foobar["id"].as_str().unwrap();
    let req = test::TestRequest::patch().uri(&format!("/api/tasks/{}/toggle", id)).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["completed"], true);
    assert!(body["data"]["completedAt"].is_string());

    let req = test::TestRequest::get().uri("/api/tasks/search?q=foo").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total"], 2);

    let req = test::TestRequest::get().uri("/api/tasks/search?q=foo&status=completed").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["id"], id);

    let req = test::TestRequest::get().uri("/api/tasks/stats").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["stats"]["total"], 3);
    assert_eq!(body["data"]["stats"]["completed"], 1);
    assert_eq!(body["data"]["stats"]["pending"], 2);
    assert_eq!(body["data"]["stats"]["completionRate"], 33);
    assert_eq!(body["data"]["recentTasks"].as_array().unwrap().len(), 3);
    assert_eq!(body["data"]["recentTasks"][0]["title"], "other");
    assert!(body["data"]["recentTasks"][0].get("description").is_none());
}

#[actix_web::test]
async fn test_partial_update() {
    let app = app!();
    let due = Utc::now() + Duration::days(5);
    let task = create_task!(
        app,
        json!({"title": "Read", "description": "chapter 2", "dueDate": due.to_rfc3339()})
    );
    let id = task["id"].as_str().unwrap();

    let req = test::TestRequest::put()
        .uri(&format!("/api/tasks/{}", id))
        .set_json(json!({"priority": "low"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["priority"], "low");
    assert_eq!(body["data"]["title"], "Read");
    assert_eq!(body["data"]["description"], "chapter 2");
    assert_eq!(body["data"]["dueDate"], task["dueDate"]);

    let req = test::TestRequest::put()
        .uri(&format!("/api/tasks/{}", id))
        .set_json(json!({"dueDate": null, "completed": true}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["dueDate"], Value::Null);
    assert_eq!(body["data"]["completed"], true);
    assert!(body["data"]["completedAt"].is_string());

    let req = test::TestRequest::put()
        .uri(&format!("/api/tasks/{}", id))
        .set_json(json!({"title": null}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "ValidationError");

    let req = test::TestRequest::put()
        .uri(&format!("/api/tasks/{}", id))
        .set_json(json!({"description": null}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["title"], "Read");
    assert_eq!(body["data"]["description"], "");
}

#[actix_web::test]
async fn test_delete_and_not_found() {
    let app = app!();
    let task = create_task!(app, json!({"title": "Temp"}));
    let id = task["id"].as_str().unwrap();

    let req = test::TestRequest::delete().uri(&format!("/api/tasks/{}", id)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::delete().uri(&format!("/api/tasks/{}", id)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "NotFoundError");

    let req = test::TestRequest::get().uri("/api/tasks/not-a-uuid").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_delete_completed() {
    let app = app!();
    create_task!(app, json!({"title": "keep"}));

    let req = test::TestRequest::delete().uri("/api/tasks/completed").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["deletedCount"], 0);

    let done = create_task!(app, json!({"title": "done"}));
    let req = test::TestRequest::patch()
        .uri(&format!("/api/tasks/{}/toggle", done["id"].as_str().unwrap()))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::delete().uri("/api/tasks/completed").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["deletedCount"], 1);

    let req = test::TestRequest::get().uri("/api/tasks").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["title"], "keep");
}

#[actix_web::test]
async fn test_project_lifecycle() {
    let app = app!();
    let task = create_task!(app, json!({"title": "Design logo"}));
    let task_id = task["id"].as_str().unwrap();

    let req = test::TestRequest::post()
        .uri("/api/projects")
        .set_json(json!({"name": "Rebrand", "description": "New identity"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let project_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["taskCount"], 0);

    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri(&format!("/api/projects/{}/tasks", project_id))
            .set_json(json!({"taskId": task_id}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["taskCount"], 1);
    }

    let req = test::TestRequest::get().uri(&format!("/api/projects/{}", project_id)).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["tasks"][0]["title"], "Design logo");

    let req = test::TestRequest::get().uri("/api/projects/stats").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["withTasks"], 1);
    assert_eq!(body["data"]["taskReferences"], 1);

    let req = test::TestRequest::get().uri("/api/projects?search=brand").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["taskCount"], 1);
    assert_eq!(body["data"][0]["tasks"][0]["id"], task_id);
    assert_eq!(body["data"][0]["tasks"][0]["title"], "Design logo");
    assert_eq!(body["data"][0]["tasks"][0]["priorityText"], "Medium");

    let req = test::TestRequest::delete()
        .uri(&format!("/api/projects/{}/tasks/{}", project_id, task_id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["taskCount"], 0);

    let req = test::TestRequest::delete().uri(&format!("/api/projects/{}", project_id)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Tasks outlive the project
    let req = test::TestRequest::get().uri(&format!("/api/tasks/{}", task_id)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_project_update_and_clear() {
    let app = app!();
    let a = create_task!(app, json!({"title": "a"}));
    let b = create_task!(app, json!({"title": "b"}));

    let req = test::TestRequest::post()
        .uri("/api/projects")
        .set_json(json!({"name": "Chores", "tasks": [a["id"], b["id"], a["id"]]}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    let project_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["taskCount"], 2);

    let req = test::TestRequest::put()
        .uri(&format!("/api/projects/{}", project_id))
        .set_json(json!({"description": "Weekly"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["name"], "Chores");
    assert_eq!(body["data"]["description"], "Weekly");
    assert_eq!(body["data"]["taskCount"], 2);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/projects/{}/tasks", project_id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["taskCount"], 0);

    let req = test::TestRequest::put()
        .uri(&format!("/api/projects/{}", project_id))
        .set_json(json!({"name": ""}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::put()
        .uri(&format!("/api/projects/{}", project_id))
        .set_json(json!({"name": null}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
