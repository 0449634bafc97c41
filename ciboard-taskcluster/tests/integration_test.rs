//! Integration tests for ciboard-taskcluster

use ciboard_taskcluster::*;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DECISION: &str = "LVTawdmFR2-uJiWWS2NxSw";
const TASK: &str = "JFF4Gt2lQqCcnmHg0FhMxw";

fn manifest() -> Value {
    json!({
        "version": 1,
        "variables": {"push": {"revision": "abcdef", "owner": "me@example.com"}},
        "actions": [
            {
                "name": "retrigger-multiple",
                "title": "Retrigger",
                "kind": "hook",
                "hookGroupId": "project-gecko",
                "hookId": "in-tree-action-1-generic/abc",
                "hookPayload": {
                    "decision": {"action": {"name": "retrigger-multiple"}, "push": {"$eval": "push"}},
                    "user": {"input": {"$eval": "input"}, "taskId": {"$eval": "taskId"}, "taskGroupId": {"$eval": "taskGroupId"}}
                },
                "context": [{}]
            },
            {
                "name": "add-new-jobs",
                "title": "Add new jobs",
                "kind": "hook",
                "hookGroupId": "project-gecko",
                "hookId": "in-tree-action-1-generic/abc",
                "hookPayload": {"user": {"input": {"$eval": "input"}, "taskGroupId": {"$eval": "taskGroupId"}}},
                "context": []
            },
            {
                "name": "backfill",
                "title": "Backfill",
                "kind": "task",
                "task": {
                    "taskGroupId": {"$eval": "taskGroupId"},
                    "dependencies": [{"$eval": "taskGroupId"}],
                    "payload": {"env": {"ACTION_INPUT": {"$json": {"$eval": "input"}}, "ACTION_TASK_ID": {"$eval": "taskId"}}},
                    "metadata": {"name": "Action: Backfill", "owner": "${push.owner}"}
                },
                "context": [{"kind": "test"}]
            },
            {
                "name": "cancel-all",
                "title": "Cancel all",
                "kind": "hook",
                "hookGroupId": "project-gecko",
                "hookId": "in-tree-action-1-generic/abc",
                "hookPayload": {"user": {"input": {"$eval": "input"}}},
                "context": []
            },
            {
                "name": "legacy",
                "title": "Legacy",
                "kind": "python",
                "context": []
            }
        ]
    })
}

fn task_definition() -> Value {
    json!({
        "taskGroupId": DECISION,
        "tags": {"kind": "test", "os": "linux"},
        "metadata": {"name": "test-linux64/opt-mochitest-1"}
    })
}

async fn mount_manifest(server: &MockServer, manifest: Value) {
    Mock::given(method("GET"))
        .and(path(format!(
            "/api/queue/v1/task/{DECISION}/artifacts/public%2Factions.json"
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(manifest))
        .expect(1)
        .mount(server)
        .await;
}

fn model(server: &MockServer) -> TaskclusterModel {
    TaskclusterModel::new(TaskclusterConfig::new(server.uri())).unwrap()
}

#[tokio::test]
async fn test_load_without_task_keeps_push_wide_actions() {
    let server = MockServer::start().await;
    mount_manifest(&server, manifest()).await;
    Mock::given(method("GET"))
        .and(path(format!("/api/queue/v1/task/{TASK}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_definition()))
        .expect(0)
        .mount(&server)
        .await;

    let loaded = model(&server).load(DECISION, None).await.unwrap();

    assert_eq!(loaded.action_names(), vec!["add-new-jobs", "cancel-all"]);
    assert!(loaded.original_task.is_none());
    assert!(loaded.original_task_id.is_none());
    assert_eq!(loaded.static_action_variables["push"]["revision"], "abcdef");
}

#[tokio::test]
async fn test_load_with_task_matches_tags() {
    let server = MockServer::start().await;
    mount_manifest(&server, manifest()).await;
    Mock::given(method("GET"))
        .and(path(format!("/api/queue/v1/task/{TASK}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_definition()))
        .expect(1)
        .mount(&server)
        .await;

    let loaded = model(&server).load(DECISION, Some(TASK)).await.unwrap();

    assert_eq!(loaded.action_names(), vec!["retrigger-multiple", "backfill"]);
    assert_eq!(loaded.original_task_id.as_deref(), Some(TASK));
    assert_eq!(loaded.original_task.unwrap()["tags"]["kind"], "test");
}

#[tokio::test]
async fn test_load_skips_entries_without_kind() {
    let server = MockServer::start().await;
    mount_manifest(
        &server,
        json!({
            "version": 1,
            "variables": {},
            "actions": [
                {"name": "foo"},
                {"name": "cancel-all", "kind": "hook", "context": []}
            ]
        }),
    )
    .await;

    let loaded = model(&server).load(DECISION, None).await.unwrap();
    assert_eq!(loaded.action_names(), vec!["cancel-all"]);
}

#[tokio::test]
async fn test_load_rejects_other_versions() {
    let server = MockServer::start().await;
    let mut manifest = manifest();
    manifest["version"] = json!(2);
    mount_manifest(&server, manifest).await;

    let err = model(&server).load(DECISION, None).await.unwrap_err();
    assert!(matches!(err, TaskclusterError::UnsupportedManifestVersion(2)));
}

#[tokio::test]
async fn test_load_with_nothing_usable_is_empty_manifest() {
    let server = MockServer::start().await;
    mount_manifest(&server, json!({"version": 1, "variables": {}, "actions": []})).await;

    let err = model(&server).load(DECISION, None).await.unwrap_err();
    assert!(err.is_warning());
    assert_eq!(
        err.to_string(),
        format!("No actions for task {DECISION}.  The task may be expired.")
    );
}

#[tokio::test]
async fn test_load_surfaces_missing_artifact() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("ResourceNotFound"))
        .mount(&server)
        .await;

    let err = model(&server).load(DECISION, None).await.unwrap_err();
    assert_eq!(err.status_code(), Some(404));
}

#[tokio::test]
async fn test_submit_hook_action() {
    let server = MockServer::start().await;
    mount_manifest(&server, manifest()).await;
    Mock::given(method("POST"))
        .and(path(
            "/api/hooks/v1/hooks/project-gecko/in-tree-action-1-generic%2Fabc/trigger",
        ))
        .and(body_json(json!({
            "user": {
                "input": {"tasks": ["test-linux64/opt-mochitest-1"], "times": 2},
                "taskGroupId": DECISION
            }
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": {"taskId": "NEWTASK"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let model = model(&server);
    let loaded = model.load(DECISION, None).await.unwrap();
    let action = loaded.get_action("add-new-jobs").unwrap().clone();
    let request = SubmissionRequest::from_load(
        &loaded,
        action,
        DECISION,
        json!({"tasks": ["test-linux64/opt-mochitest-1"], "times": 2}),
    );

    assert_eq!(model.submit(request).await.unwrap(), "NEWTASK");
}

#[tokio::test]
async fn test_submit_task_action_creates_task() {
    let server = MockServer::start().await;
    mount_manifest(&server, manifest()).await;
    Mock::given(method("GET"))
        .and(path(format!("/api/queue/v1/task/{TASK}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_definition()))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/queue/v1/task/ActionTaskId0000000000"))
        .and(body_json(json!({
            "taskGroupId": DECISION,
            "dependencies": [DECISION],
            "payload": {"env": {"ACTION_INPUT": "{}", "ACTION_TASK_ID": TASK}},
            "metadata": {"name": "Action: Backfill", "owner": "me@example.com"}
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": {"taskId": "ActionTaskId0000000000"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let model = model(&server);
    let loaded = model.load(DECISION, Some(TASK)).await.unwrap();
    let mut request = SubmissionRequest::from_load(
        &loaded,
        loaded.get_action("backfill").unwrap().clone(),
        DECISION,
        json!({}),
    );
    request.action_task_id = "ActionTaskId0000000000".to_string();

    assert_eq!(model.submit(request).await.unwrap(), "ActionTaskId0000000000");
}

#[tokio::test]
async fn test_submit_failure_is_formatted() {
    let server = MockServer::start().await;
    mount_manifest(&server, manifest()).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "code": "InsufficientScopes",
            "message": "Client ID static/ciboard does not have sufficient scopes\n\n---- \nmethod: triggerHook"
        })))
        .mount(&server)
        .await;

    let model = model(&server);
    let loaded = model.load(DECISION, None).await.unwrap();
    let request = SubmissionRequest::new(
        loaded.get_action("cancel-all").unwrap().clone(),
        DECISION,
        json!({}),
    );

    let err = model.submit(request).await.unwrap_err();
    assert_eq!(err.status_code(), Some(403));
    assert_eq!(
        format_taskcluster_error(&err),
        "Taskcluster: Client ID static/ciboard does not have sufficient scopes"
    );
}

#[tokio::test]
async fn test_access_token_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/api/queue/v1/task/{TASK}")))
        .and(header("authorization", "Bearer sekrit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_definition()))
        .expect(1)
        .mount(&server)
        .await;

    let model =
        TaskclusterModel::new(TaskclusterConfig::new(server.uri()).with_access_token("sekrit"))
            .unwrap();
    let task = model.task_definition(TASK).await.unwrap();
    assert_eq!(task["tags"]["os"], "linux");
}
