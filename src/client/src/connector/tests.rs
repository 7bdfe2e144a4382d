use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use bytes::Bytes;
use futures_util::StreamExt;
use rstest::rstest;

use super::*;
use crate::auth::InitialAuthConfig;
use crate::filters::Filters;
use crate::json::{AuthConfig, AuthConfigs, ContainerConfig, LogMessageType};

#[derive(Debug, Clone)]
struct Recorded {
    method: Method,
    uri: String,
    headers: Vec<(String, String)>,
    content_type: Option<&'static str>,
    body: Vec<u8>,
}

impl Recorded {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Answers requests from a queue of canned responses and records them.
#[derive(Default)]
struct FakeConnection {
    responses: Mutex<VecDeque<(u16, Vec<Bytes>)>>,
    requests: Mutex<Vec<Recorded>>,
}

impl FakeConnection {
    fn respond(self: &Arc<Self>, status: u16, chunks: &[&str]) -> Arc<Self> {
        self.responses.lock().unwrap().push_back((
            status,
            chunks.iter().map(|c| Bytes::from(c.to_string())).collect(),
        ));
        Arc::clone(self)
    }

    fn respond_bytes(self: &Arc<Self>, status: u16, body: Vec<u8>) -> Arc<Self> {
        self.responses
            .lock()
            .unwrap()
            .push_back((status, vec![Bytes::from(body)]));
        Arc::clone(self)
    }

    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    fn last(&self) -> Recorded {
        self.requests().pop().expect("a request was sent")
    }
}

#[async_trait]
impl DockerConnection for FakeConnection {
    async fn execute(&self, request: DockerRequest) -> DockerResult<DockerResponse> {
        let uri = request.path_and_query();
        let content_type = request.body.content_type();
        let body = match request.body {
            RequestBody::Empty => Vec::new(),
            RequestBody::Bytes { data, .. } => data.to_vec(),
            RequestBody::Stream { mut stream, .. } => {
                let mut collected = Vec::new();
                while let Some(chunk) = stream.next().await {
                    collected.extend_from_slice(&chunk?);
                }
                collected
            }
        };
        self.requests.lock().unwrap().push(Recorded {
            method: request.method,
            uri,
            headers: request.headers,
            content_type,
            body,
        });

        let (status, chunks) = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or((200, Vec::new()));
        let body = futures_util::stream::iter(chunks.into_iter().map(Ok)).boxed();
        Ok(DockerResponse { status, body })
    }
}

fn connector(fake: &Arc<FakeConnection>) -> DockerConnector {
    DockerConnector::new(fake.clone())
}

fn decode_header(value: &str) -> serde_json::Value {
    serde_json::from_slice(&URL_SAFE.decode(value).unwrap()).unwrap()
}

fn frame(stream: u8, payload: &str) -> Vec<u8> {
    let mut bytes = vec![stream, 0, 0, 0];
    bytes.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    bytes.extend_from_slice(payload.as_bytes());
    bytes
}

#[tokio::test]
async fn list_containers_asks_for_all() {
    let fake = Arc::new(FakeConnection::default()).respond(
        200,
        &[r#"[{"Id":"abc","Names":["/web"],"Status":"Up 1 minute"}]"#],
    );

    let containers = connector(&fake).list_containers().await.unwrap();

    assert_eq!(containers.len(), 1);
    assert_eq!(containers[0].names, vec!["/web"]);
    let request = fake.last();
    assert_eq!(request.method, Method::GET);
    assert_eq!(request.uri, "/containers/json?all=1");
}

#[tokio::test]
async fn list_tolerates_null_labels_and_ports() {
    let fake = Arc::new(FakeConnection::default()).respond(
        200,
        &[r#"[{"Id":"a","Names":["/x"],"Status":"Up","Labels":null,"Ports":null}]"#],
    );

    let containers = connector(&fake).list_containers().await.unwrap();

    assert_eq!(containers.len(), 1);
    assert!(containers[0].is_running());
    assert!(containers[0].labels.is_empty());
}

#[tokio::test]
async fn list_params_are_sent_only_when_set() {
    let fake = Arc::new(FakeConnection::default()).respond(200, &["[]"]);
    let params = ListContainersParams::new()
        .with_limit(5)
        .with_size(false)
        .with_filters(Filters::new().with_label("app"));

    connector(&fake).list_containers_with(params).await.unwrap();

    assert_eq!(
        fake.last().uri,
        "/containers/json?limit=5&size=0&filters=%7B%22label%22%3A%5B%22app%22%5D%7D"
    );
}

#[tokio::test]
async fn api_version_prefixes_paths() {
    let fake = Arc::new(FakeConnection::default()).respond(200, &[r#"{"Version":"24.0.7"}"#]);

    let version = connector(&fake)
        .with_api_version("/v1.41/")
        .version()
        .await
        .unwrap();

    assert_eq!(version.version, "24.0.7");
    assert_eq!(fake.last().uri, "/v1.41/version");
}

#[rstest]
#[case::start("start")]
#[case::stop("stop")]
#[case::kill("kill")]
#[case::remove("remove")]
#[tokio::test]
async fn server_error_carries_daemon_message(#[case] operation: &str) {
    let fake = Arc::new(FakeConnection::default())
        .respond(500, &[r#"{"message":"driver failed programming external connectivity"}"#]);
    let connector = connector(&fake);

    let result = match operation {
        "start" => {
            connector
                .start_container(StartContainerParams::new("abc").unwrap())
                .await
        }
        "stop" => {
            connector
                .stop_container(StopContainerParams::new("abc").unwrap())
                .await
        }
        "kill" => {
            connector
                .kill_container(KillContainerParams::new("abc").unwrap())
                .await
        }
        _ => {
            connector
                .remove_container(RemoveContainerParams::new("abc").unwrap())
                .await
        }
    };

    match result {
        Err(DockerError::Daemon { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "driver failed programming external connectivity");
        }
        other => panic!("expected daemon error, got {other:?}"),
    }
}

#[tokio::test]
async fn non_json_error_body_is_used_raw() {
    let fake = Arc::new(FakeConnection::default()).respond(404, &["page not found\n"]);

    let err = connector(&fake)
        .inspect_container(InspectContainerParams::new("abc").unwrap())
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(matches!(err, DockerError::Daemon { ref message, .. } if message == "page not found"));
}

#[tokio::test]
async fn not_modified_start_and_stop_succeed() {
    let fake = Arc::new(FakeConnection::default())
        .respond(304, &[])
        .respond(304, &[]);
    let connector = connector(&fake);

    connector
        .start_container(StartContainerParams::new("abc").unwrap())
        .await
        .unwrap();
    connector
        .stop_container(StopContainerParams::new("abc").unwrap().with_timeout(3))
        .await
        .unwrap();

    let requests = fake.requests();
    assert_eq!(requests[0].uri, "/containers/abc/start");
    assert_eq!(requests[1].uri, "/containers/abc/stop?t=3");
}

#[tokio::test]
async fn not_modified_kill_is_an_error() {
    let fake = Arc::new(FakeConnection::default()).respond(304, &[]);
    let result = connector(&fake)
        .kill_container(KillContainerParams::new("abc").unwrap())
        .await;
    assert!(matches!(result, Err(DockerError::Daemon { status: 304, .. })));
}

#[tokio::test]
async fn kill_and_remove_send_their_flags() {
    let fake = Arc::new(FakeConnection::default())
        .respond(204, &[])
        .respond(204, &[]);
    let connector = connector(&fake);

    connector
        .kill_container(KillContainerParams::new("abc").unwrap().with_signal(15).unwrap())
        .await
        .unwrap();
    connector
        .remove_container(
            RemoveContainerParams::new("abc")
                .unwrap()
                .with_force(true)
                .with_remove_volumes(true),
        )
        .await
        .unwrap();

    let requests = fake.requests();
    assert_eq!(requests[0].method, Method::POST);
    assert_eq!(requests[0].uri, "/containers/abc/kill?signal=15");
    assert_eq!(requests[1].method, Method::DELETE);
    assert_eq!(requests[1].uri, "/containers/abc?force=1&v=1");
}

#[tokio::test]
async fn container_ids_are_path_escaped() {
    let fake = Arc::new(FakeConnection::default()).respond(204, &[]);
    connector(&fake)
        .kill_container(KillContainerParams::new("a/b c").unwrap())
        .await
        .unwrap();
    assert_eq!(fake.last().uri, "/containers/a%2Fb%20c/kill");
}

#[tokio::test]
async fn create_container_posts_config() {
    let fake = Arc::new(FakeConnection::default())
        .respond(201, &[r#"{"Id":"e90e34656806","Warnings":[]}"#]);
    let params = CreateContainerParams::new(ContainerConfig::new("busybox").with_cmd(["date"]))
        .unwrap()
        .with_container_name("clock")
        .unwrap();

    let created = connector(&fake).create_container(params).await.unwrap();

    assert_eq!(created.id, "e90e34656806");
    let request = fake.last();
    assert_eq!(request.uri, "/containers/create?name=clock");
    assert_eq!(request.content_type, Some("application/json"));
    let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(body["Image"], "busybox");
    assert_eq!(body["Cmd"], serde_json::json!(["date"]));
}

#[tokio::test]
async fn wait_returns_exit_code() {
    let fake = Arc::new(FakeConnection::default()).respond(200, &[r#"{"StatusCode":137}"#]);
    let code = connector(&fake)
        .wait_container(WaitContainerParams::new("abc").unwrap())
        .await
        .unwrap();
    assert_eq!(code, 137);
    assert_eq!(fake.last().uri, "/containers/abc/wait");
}

#[tokio::test]
async fn top_passes_ps_args() {
    let fake = Arc::new(FakeConnection::default()).respond(
        200,
        &[r#"{"Titles":["PID","CMD"],"Processes":[["1","sleep"]]}"#],
    );
    let top = connector(&fake)
        .top(TopParams::new("abc").unwrap().with_ps_args("aux"))
        .await
        .unwrap();
    assert_eq!(top.processes, vec![vec!["1", "sleep"]]);
    assert_eq!(fake.last().uri, "/containers/abc/top?ps_args=aux");
}

#[tokio::test]
async fn build_returns_image_id() {
    let dir = tempfile::tempdir().unwrap();
    let dockerfile = dir.path().join("Dockerfile");
    std::fs::write(&dockerfile, "FROM busybox\n").unwrap();

    let fake = Arc::new(FakeConnection::default()).respond(
        200,
        &[
            "{\"stream\":\"Step 1/1 : FROM busybox\\n\"}\n",
            "{\"stream\":\"Successfully built abc123\\n\"}\n",
        ],
    );
    let mut seen = Vec::new();

    let image_id = connector(&fake)
        .build_image(
            BuildImageParams::new([dockerfile])
                .unwrap()
                .with_repository("team/app")
                .unwrap()
                .with_memory_limit(1024),
            |status: &ProgressStatus| seen.push(status.clone()),
        )
        .await
        .unwrap();

    assert_eq!(image_id, "abc123");
    assert_eq!(seen.len(), 2);
    let request = fake.last();
    assert_eq!(request.uri, "/build?rm=1&forcerm=1&t=team%2Fapp&memory=1024");
    assert_eq!(request.content_type, Some("application/x-compressed-tar"));
    assert!(!request.body.is_empty());
    assert_eq!(
        decode_header(request.header("X-Registry-Config").unwrap()),
        serde_json::json!({})
    );
}

#[tokio::test]
async fn build_without_success_marker_is_a_protocol_failure() {
    let dir = tempfile::tempdir().unwrap();
    let dockerfile = dir.path().join("Dockerfile");
    std::fs::write(&dockerfile, "FROM busybox\n").unwrap();
    let fake = Arc::new(FakeConnection::default()).respond(200, &[r#"{"stream":"layer pulled"}"#]);

    let err = connector(&fake)
        .build_image(BuildImageParams::new([dockerfile]).unwrap(), |_: &ProgressStatus| {})
        .await
        .unwrap_err();

    assert!(matches!(err, DockerError::StreamProtocol(ref m) if m == BUILD_FAILED));
}

#[tokio::test]
async fn build_sends_merged_registry_config() {
    let dir = tempfile::tempdir().unwrap();
    let dockerfile = dir.path().join("Dockerfile");
    std::fs::write(&dockerfile, "FROM busybox\n").unwrap();
    let fake = Arc::new(FakeConnection::default())
        .respond(200, &[r#"{"stream":"Successfully built ff00"}"#]);

    let initial: AuthConfigs = [AuthConfig::new("localhost:5000", "ci", "pw")]
        .into_iter()
        .collect();
    let explicit: AuthConfigs = [AuthConfig::new("registry.example.com", "bob", "secret")]
        .into_iter()
        .collect();

    connector(&fake)
        .with_initial_auth(InitialAuthConfig::new(initial))
        .build_image(
            BuildImageParams::new([dockerfile])
                .unwrap()
                .with_auth_configs(explicit),
            |_: &ProgressStatus| {},
        )
        .await
        .unwrap();

    let config = decode_header(fake.last().header("X-Registry-Config").unwrap());
    assert_eq!(config["localhost:5000"]["username"], "ci");
    assert_eq!(config["registry.example.com"]["username"], "bob");
}

#[tokio::test]
async fn inline_stream_error_is_a_daemon_error() {
    let dir = tempfile::tempdir().unwrap();
    let dockerfile = dir.path().join("Dockerfile");
    std::fs::write(&dockerfile, "FROM nope\n").unwrap();
    let fake = Arc::new(FakeConnection::default()).respond(
        200,
        &[r#"{"errorDetail":{"message":"pull access denied"},"error":"pull access denied"}"#],
    );

    let err = connector(&fake)
        .build_image(BuildImageParams::new([dockerfile]).unwrap(), |_: &ProgressStatus| {})
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DockerError::Daemon { status: 500, ref message } if message == "pull access denied"
    ));
}

#[tokio::test]
async fn push_returns_digest_for_tag() {
    let fake = Arc::new(FakeConnection::default()).respond(
        200,
        &[concat!(
            "{\"progress\":\"[=====>              ] 25%\"}\n",
            "{\"status\":\"Image already exists\"}\n",
            "{\"progress\":\"[===============>    ] 75%\"}\n",
            "{\"status\":\"latest: digest: sha256:deadbeef size: 1234\"}"
        )],
    );

    let digest = connector(&fake)
        .push(
            PushParams::new("team/app")
                .unwrap()
                .with_registry("localhost:5000"),
            |_: &ProgressStatus| {},
        )
        .await
        .unwrap();

    assert_eq!(digest, "sha256:deadbeef");
    let request = fake.last();
    assert_eq!(request.uri, "/images/localhost:5000/team/app/push");
    assert_eq!(
        decode_header(request.header("X-Registry-Auth").unwrap()),
        serde_json::json!({})
    );
}

#[tokio::test]
async fn push_with_explicit_tag_matches_that_tag() {
    let fake = Arc::new(FakeConnection::default()).respond(
        200,
        &[
            "{\"status\":\"latest: digest: sha256:0000 size: 1\"}",
            "{\"status\":\"v2: digest: sha256:2222 size: 1\"}",
        ],
    );

    let digest = connector(&fake)
        .push(
            PushParams::new("app").unwrap().with_tag("v2"),
            |_: &ProgressStatus| {},
        )
        .await
        .unwrap();

    assert_eq!(digest, "sha256:2222");
    assert_eq!(fake.last().uri, "/images/app/push?tag=v2");
}

#[tokio::test]
async fn push_without_digest_is_a_daemon_error() {
    let fake = Arc::new(FakeConnection::default())
        .respond(200, &[r#"{"status":"The push refers to a repository"}"#]);

    let err = connector(&fake)
        .push(PushParams::new("app").unwrap(), |_: &ProgressStatus| {})
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DockerError::Daemon { status: 500, ref message } if message == PUSH_DIGEST_MISSING
    ));
}

#[tokio::test]
async fn pull_reports_progress_and_digest() {
    let fake = Arc::new(FakeConnection::default()).respond(
        200,
        &[
            "{\"status\":\"Pulling from library/busybox\",\"id\":\"latest\"}\n",
            "{\"status\":\"Digest: sha256:abcd\"}\n{\"status\":\"Status: Downloaded newer image for busybox:latest\"}\n",
        ],
    );
    let mut statuses = Vec::new();

    let digest = connector(&fake)
        .pull(
            PullParams::new("busybox").unwrap().with_tag("latest"),
            |status: &ProgressStatus| statuses.push(status.status.clone().unwrap_or_default()),
        )
        .await
        .unwrap();

    assert_eq!(digest.as_deref(), Some("sha256:abcd"));
    assert_eq!(statuses.len(), 3);
    assert_eq!(fake.last().uri, "/images/create?fromImage=busybox&tag=latest");
}

#[tokio::test]
async fn pull_uses_configured_credentials_for_registry() {
    let fake = Arc::new(FakeConnection::default())
        .respond(200, &[r#"{"status":"Status: Image is up to date"}"#]);
    let initial: AuthConfigs = [AuthConfig::new("localhost:5000", "ci", "pw")]
        .into_iter()
        .collect();

    let digest = connector(&fake)
        .with_initial_auth(InitialAuthConfig::new(initial))
        .pull(
            PullParams::new("app").unwrap().with_registry("localhost:5000"),
            |_: &ProgressStatus| {},
        )
        .await
        .unwrap();

    assert_eq!(digest, None);
    let request = fake.last();
    assert_eq!(request.uri, "/images/create?fromImage=localhost%3A5000%2Fapp");
    assert_eq!(
        decode_header(request.header("X-Registry-Auth").unwrap())["username"],
        "ci"
    );
}

#[tokio::test]
async fn pull_without_final_status_is_a_protocol_failure() {
    let fake = Arc::new(FakeConnection::default())
        .respond(200, &[r#"{"status":"Pulling fs layer","id":"a3ed95caeb02"}"#]);
    let err = connector(&fake)
        .pull(PullParams::new("busybox").unwrap(), |_: &ProgressStatus| {})
        .await
        .unwrap_err();
    assert!(matches!(err, DockerError::StreamProtocol(_)));
}

#[tokio::test]
async fn logs_are_demultiplexed_to_processor() {
    let mut body = frame(1, "started\n");
    body.extend(frame(2, "warning: low disk\n"));
    let fake = Arc::new(FakeConnection::default()).respond_bytes(200, body);
    let mut messages = Vec::new();

    connector(&fake)
        .container_logs(
            ContainerLogsParams::new("abc")
                .unwrap()
                .with_tail("10")
                .with_timestamps(false),
            |message: LogMessage| messages.push(message),
        )
        .await
        .unwrap();

    assert_eq!(
        messages,
        vec![
            LogMessage::new(LogMessageType::Stdout, "started"),
            LogMessage::new(LogMessageType::Stderr, "warning: low disk"),
        ]
    );
    assert_eq!(
        fake.last().uri,
        "/containers/abc/logs?stdout=1&stderr=1&timestamps=0&tail=10"
    );
}

#[tokio::test]
async fn attach_streams_raw_tty_output() {
    let fake = Arc::new(FakeConnection::default()).respond(200, &["$ whoami\r\nroot\r\n"]);
    let mut lines = Vec::new();

    connector(&fake)
        .attach_container(
            AttachContainerParams::new("abc")
                .unwrap()
                .with_stream(true)
                .with_logs(true),
            |message: LogMessage| lines.push(message.content),
        )
        .await
        .unwrap();

    assert_eq!(lines, vec!["$ whoami", "root"]);
    let request = fake.last();
    assert_eq!(request.method, Method::POST);
    assert_eq!(
        request.uri,
        "/containers/abc/attach?stdout=1&stderr=1&stream=1&logs=1"
    );
}

#[tokio::test]
async fn exec_round_trip() {
    let fake = Arc::new(FakeConnection::default())
        .respond(201, &[r#"{"Id":"exec-1"}"#])
        .respond_bytes(200, frame(1, "hello\n"))
        .respond(
            200,
            &[r#"{"ID":"exec-1","ContainerID":"abc","Running":false,"ExitCode":0}"#],
        );
    let connector = connector(&fake);

    let exec = connector
        .create_exec(CreateExecParams::new("abc", ["echo", "hello"]).unwrap())
        .await
        .unwrap();
    let mut output = Vec::new();
    connector
        .start_exec(StartExecParams::new(&exec.id).unwrap(), |m: LogMessage| {
            output.push(m.content)
        })
        .await
        .unwrap();
    let info = connector
        .get_exec_info(GetExecInfoParams::new(&exec.id).unwrap())
        .await
        .unwrap();

    assert_eq!(output, vec!["hello"]);
    assert_eq!(info.exit_code, Some(0));
    assert!(!info.running);

    let requests = fake.requests();
    assert_eq!(requests[0].uri, "/containers/abc/exec");
    let config: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(config["Cmd"], serde_json::json!(["echo", "hello"]));
    assert_eq!(config["AttachStdout"], true);
    assert_eq!(requests[1].uri, "/exec/exec-1/start");
    let start: serde_json::Value = serde_json::from_slice(&requests[1].body).unwrap();
    assert_eq!(start, serde_json::json!({"Detach": false, "Tty": false}));
    assert_eq!(requests[2].uri, "/exec/exec-1/json");
}

#[tokio::test]
async fn detached_exec_does_not_attach_output() {
    let fake = Arc::new(FakeConnection::default()).respond(201, &[r#"{"Id":"exec-2"}"#]);
    connector(&fake)
        .create_exec(
            CreateExecParams::new("abc", ["sleep", "60"])
                .unwrap()
                .with_detach(true),
        )
        .await
        .unwrap();

    let config: serde_json::Value = serde_json::from_slice(&fake.last().body).unwrap();
    assert_eq!(config["AttachStdout"], false);
    assert_eq!(config["AttachStderr"], false);
}

#[tokio::test]
async fn events_are_delivered_one_by_one() {
    let fake = Arc::new(FakeConnection::default()).respond(
        200,
        &[
            r#"{"status":"create","id":"abc","Type":"container","Action":"create","time":1}"#,
            r#"{"status":"start","id":"abc","Type":"container","Act"#,
            r#"ion":"start","time":2}"#,
        ],
    );
    let mut actions = Vec::new();

    connector(&fake)
        .get_events(
            GetEventsParams::new().with_since(1).with_until(2),
            |event: Event| actions.push(event.action.unwrap_or_default()),
        )
        .await
        .unwrap();

    assert_eq!(actions, vec!["create", "start"]);
    assert_eq!(fake.last().uri, "/events?since=1&until=2");
}

#[tokio::test]
async fn resources_are_streamed_both_ways() {
    let fake = Arc::new(FakeConnection::default())
        .respond_bytes(200, b"tar bytes".to_vec())
        .respond(200, &[]);
    let connector = connector(&fake);

    let mut archive = connector
        .get_resource(GetResourceParams::new("abc", "/etc/hosts").unwrap())
        .await
        .unwrap();
    let mut fetched = Vec::new();
    while let Some(chunk) = archive.next().await {
        fetched.extend_from_slice(&chunk.unwrap());
    }
    assert_eq!(fetched, b"tar bytes");

    let upload: BodyStream = futures_util::stream::iter(vec![
        Ok(Bytes::from_static(b"tar ")),
        Ok(Bytes::from_static(b"upload")),
    ])
    .boxed();
    connector
        .put_resource(
            PutResourceParams::new("abc", "/tmp")
                .unwrap()
                .with_no_overwrite_dir_non_dir(true),
            upload,
        )
        .await
        .unwrap();

    let requests = fake.requests();
    assert_eq!(requests[0].uri, "/containers/abc/archive?path=%2Fetc%2Fhosts");
    assert_eq!(requests[1].method, Method::PUT);
    assert_eq!(
        requests[1].uri,
        "/containers/abc/archive?path=%2Ftmp&noOverwriteDirNonDir=1"
    );
    assert_eq!(requests[1].content_type, Some("application/x-tar"));
    assert_eq!(requests[1].body, b"tar upload");
}

#[tokio::test]
async fn image_operations_use_expected_endpoints() {
    let fake = Arc::new(FakeConnection::default())
        .respond(200, &[r#"{"Id":"sha256:1","Os":"linux"}"#])
        .respond(201, &[])
        .respond(201, &[r#"{"Id":"sha256:2"}"#])
        .respond(200, &[r#"[{"Deleted":"sha256:2"}]"#])
        .respond(200, &[r#"[{"Id":"sha256:1","RepoTags":["busybox:latest"]}]"#]);
    let connector = connector(&fake);

    let info = connector
        .inspect_image(InspectImageParams::new("busybox").unwrap())
        .await
        .unwrap();
    connector
        .tag(
            TagParams::new("busybox", "localhost:5000/busybox")
                .unwrap()
                .with_tag("v1")
                .with_force(true),
        )
        .await
        .unwrap();
    let image_id = connector
        .commit(
            CommitParams::new("abc", "snapshots/dev")
                .unwrap()
                .with_tag("1")
                .with_author("dockhand"),
        )
        .await
        .unwrap();
    connector
        .remove_image(RemoveImageParams::new("sha256:2").unwrap().with_force(true))
        .await
        .unwrap();
    let images = connector.list_images().await.unwrap();

    assert_eq!(info.os, "linux");
    assert_eq!(image_id, "sha256:2");
    assert_eq!(images[0].repo_tags.as_deref(), Some(&["busybox:latest".to_string()][..]));

    let uris: Vec<String> = fake.requests().into_iter().map(|r| r.uri).collect();
    assert_eq!(
        uris,
        vec![
            "/images/busybox/json",
            "/images/busybox/tag?repo=localhost%3A5000%2Fbusybox&tag=v1&force=1",
            "/commit?container=abc&repo=snapshots%2Fdev&tag=1&author=dockhand",
            "/images/sha256:2?force=1",
            "/images/json",
        ]
    );
}

#[tokio::test]
async fn system_info_is_parsed() {
    let fake = Arc::new(FakeConnection::default())
        .respond(200, &[r#"{"ID":"7TRN","Containers":3,"ServerVersion":"24.0.7"}"#]);
    let info = connector(&fake).system_info().await.unwrap();
    assert_eq!(info.containers, 3);
    assert_eq!(info.server_version, "24.0.7");
    assert_eq!(fake.last().uri, "/info");
}

#[tokio::test]
async fn malformed_json_is_reported() {
    let fake = Arc::new(FakeConnection::default()).respond(200, &["not json"]);
    let err = connector(&fake).version().await.unwrap_err();
    assert!(matches!(err, DockerError::Json(_)));
}

#[test]
fn digest_and_build_markers_are_parsed() {
    assert_eq!(
        pushed_digest("latest: digest: sha256:beef size: 1", "latest").as_deref(),
        Some("sha256:beef")
    );
    assert_eq!(pushed_digest("v1: digest: sha256:beef size: 1", "latest"), None);
    assert_eq!(
        built_image_id("Successfully built 9e8d7c\n").as_deref(),
        Some("9e8d7c")
    );
    assert_eq!(built_image_id("Step 2/3"), None);
}
