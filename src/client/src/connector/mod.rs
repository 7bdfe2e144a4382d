//! Typed operations over the Docker Engine REST API.

#[cfg(test)]
mod tests;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use hyper::Method;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::archive::{pack_build_context, BUILD_CONTEXT_CONTENT_TYPE};
use crate::auth::{config_header, InitialAuthConfig, REGISTRY_AUTH_HEADER, REGISTRY_CONFIG_HEADER};
use crate::connection::{
    BodyStream, DockerConnection, DockerEndpoint, DockerRequest, DockerResponse, RequestBody,
};
use crate::error::{DockerError, DockerResult};
use crate::json::{
    ContainerCreated, ContainerExitStatus, ContainerInfo, ContainerListEntry, ContainerProcesses,
    Event, Exec, ExecConfig, ExecInfo, ExecStart, Image, ImageInfo, LogMessage, ProgressStatus,
    SystemInfo, Version,
};
use crate::params::{
    AttachContainerParams, BuildImageParams, CommitParams, ContainerLogsParams,
    CreateContainerParams, CreateExecParams, GetEventsParams, GetExecInfoParams,
    GetResourceParams, InspectContainerParams, InspectImageParams, KillContainerParams,
    ListContainersParams, PullParams, PushParams, PutResourceParams, RemoveContainerParams,
    RemoveImageParams, StartContainerParams, StartExecParams, StopContainerParams, TagParams,
    TopParams, WaitContainerParams,
};
use crate::processor::{MessageProcessor, ProgressMonitor};
use crate::stream::{JsonObjectReader, LogMessageReader};
use dockhand_common::config_manager::Config;

const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

const TAR_CONTENT_TYPE: &str = "application/x-tar";
const DEFAULT_TAG: &str = "latest";
const NOT_MODIFIED: u16 = 304;

pub(crate) const PUSH_DIGEST_MISSING: &str =
    "Docker image was successfully pushed, but its digest wasn't obtained";
pub(crate) const BUILD_FAILED: &str = "Docker image build failed";
pub(crate) const PULL_FAILED: &str = "Docker image pull ended without a final status";

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Deserialize)]
struct IdBody {
    #[serde(rename = "Id")]
    id: String,
}

fn segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}

/// Client for one Docker daemon.
///
/// Cloning is cheap and clones share the underlying connection. Every call is
/// a separate request; nothing is cached between calls.
#[derive(Clone)]
pub struct DockerConnector {
    connection: Arc<dyn DockerConnection>,
    api_version: Option<String>,
    initial_auth: Arc<InitialAuthConfig>,
}

impl fmt::Debug for DockerConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DockerConnector")
            .field("api_version", &self.api_version)
            .finish_non_exhaustive()
    }
}

impl DockerConnector {
    pub fn new(connection: Arc<dyn DockerConnection>) -> Self {
        Self {
            connection,
            api_version: None,
            initial_auth: Arc::new(InitialAuthConfig::default()),
        }
    }

    pub fn connect(endpoint: &str, connect_timeout: Duration) -> DockerResult<Self> {
        let endpoint = DockerEndpoint::parse(endpoint)?;
        debug!(%endpoint, "connecting to docker daemon");
        Ok(Self::new(endpoint.connect(connect_timeout)?))
    }

    pub fn from_config(config: &Config) -> DockerResult<Self> {
        let mut connector =
            Self::connect(&config.docker_endpoint, config.docker_connect_timeout())?
                .with_initial_auth(InitialAuthConfig::from_credentials(&config.registry_auth));
        if let Some(version) = &config.docker_api_version {
            connector = connector.with_api_version(version.clone());
        }
        Ok(connector)
    }

    /// Prefix every path with `/<version>`, e.g. `v1.41`.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        let version = version.into();
        self.api_version = Some(version.trim_matches('/').to_string());
        self
    }

    pub fn with_initial_auth(mut self, initial_auth: InitialAuthConfig) -> Self {
        self.initial_auth = Arc::new(initial_auth);
        self
    }

    fn request(&self, method: Method, path: &str) -> DockerRequest {
        let path = match &self.api_version {
            Some(version) => format!("/{version}{path}"),
            None => path.to_string(),
        };
        DockerRequest::new(method, path)
    }

    async fn send(&self, request: DockerRequest) -> DockerResult<DockerResponse> {
        self.send_accepting(request, &[]).await
    }

    /// Like `send`, also treating the `extra` statuses as success.
    async fn send_accepting(
        &self,
        request: DockerRequest,
        extra: &[u16],
    ) -> DockerResult<DockerResponse> {
        debug!(method = %request.method, path = %request.path, "docker api call");
        let response = self.connection.execute(request).await?;
        if response.is_success() || extra.contains(&response.status) {
            return Ok(response);
        }
        Err(Self::daemon_error(response).await)
    }

    async fn daemon_error(response: DockerResponse) -> DockerError {
        let status = response.status;
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => return DockerError::daemon(status, e.to_string()),
        };
        let message = match serde_json::from_slice::<ErrorBody>(&body) {
            Ok(error) => error.message,
            Err(_) => String::from_utf8_lossy(&body).trim().to_string(),
        };
        DockerError::daemon(status, message)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: DockerRequest) -> DockerResult<T> {
        let body = self.send(request).await?.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Sends and drains the body, which the daemon leaves empty or ignorable.
    async fn send_discarding(&self, request: DockerRequest, extra: &[u16]) -> DockerResult<()> {
        self.send_accepting(request, extra).await?.bytes().await?;
        Ok(())
    }

    async fn pump_log<P>(&self, request: DockerRequest, mut processor: P) -> DockerResult<()>
    where
        P: MessageProcessor<LogMessage>,
    {
        let response = self.send(request).await?;
        let mut reader = LogMessageReader::new(response.body);
        while let Some(message) = reader.next().await? {
            processor.process(message);
        }
        Ok(())
    }

    pub async fn system_info(&self) -> DockerResult<SystemInfo> {
        self.send_json(self.request(Method::GET, "/info")).await
    }

    pub async fn version(&self) -> DockerResult<Version> {
        self.send_json(self.request(Method::GET, "/version")).await
    }

    pub async fn list_images(&self) -> DockerResult<Vec<Image>> {
        self.send_json(self.request(Method::GET, "/images/json"))
            .await
    }

    /// All containers, running or not.
    pub async fn list_containers(&self) -> DockerResult<Vec<ContainerListEntry>> {
        self.list_containers_with(ListContainersParams::new().with_all(true))
            .await
    }

    pub async fn list_containers_with(
        &self,
        params: ListContainersParams,
    ) -> DockerResult<Vec<ContainerListEntry>> {
        let filters = match &params.filters {
            Some(filters) => Some(filters.to_query_value()?),
            None => None,
        };
        let request = self
            .request(Method::GET, "/containers/json")
            .flag_opt("all", params.all)
            .query_opt("limit", params.limit)
            .query_opt("since", params.since)
            .query_opt("before", params.before)
            .flag_opt("size", params.size)
            .query_opt("filters", filters);
        self.send_json(request).await
    }

    pub async fn inspect_container(
        &self,
        params: InspectContainerParams,
    ) -> DockerResult<ContainerInfo> {
        let request = self
            .request(
                Method::GET,
                &format!("/containers/{}/json", segment(&params.container)),
            )
            .flag_opt("size", params.return_container_size);
        self.send_json(request).await
    }

    pub async fn create_container(
        &self,
        params: CreateContainerParams,
    ) -> DockerResult<ContainerCreated> {
        let body = serde_json::to_vec(&params.container_config)?;
        let request = self
            .request(Method::POST, "/containers/create")
            .query_opt("name", params.container_name)
            .body(RequestBody::json(body));
        self.send_json(request).await
    }

    /// Starting a running container is not an error.
    pub async fn start_container(&self, params: StartContainerParams) -> DockerResult<()> {
        let request = self.request(
            Method::POST,
            &format!("/containers/{}/start", segment(&params.container)),
        );
        self.send_discarding(request, &[NOT_MODIFIED]).await
    }

    /// Stopping a stopped container is not an error.
    pub async fn stop_container(&self, params: StopContainerParams) -> DockerResult<()> {
        let request = self
            .request(
                Method::POST,
                &format!("/containers/{}/stop", segment(&params.container)),
            )
            .query_opt("t", params.timeout);
        self.send_discarding(request, &[NOT_MODIFIED]).await
    }

    pub async fn kill_container(&self, params: KillContainerParams) -> DockerResult<()> {
        let request = self
            .request(
                Method::POST,
                &format!("/containers/{}/kill", segment(&params.container)),
            )
            .query_opt("signal", params.signal);
        self.send_discarding(request, &[]).await
    }

    pub async fn remove_container(&self, params: RemoveContainerParams) -> DockerResult<()> {
        let request = self
            .request(
                Method::DELETE,
                &format!("/containers/{}", segment(&params.container)),
            )
            .flag_opt("force", params.force)
            .flag_opt("v", params.remove_volumes);
        self.send_discarding(request, &[]).await
    }

    /// Blocks until the container exits and returns its exit code.
    pub async fn wait_container(&self, params: WaitContainerParams) -> DockerResult<i32> {
        let request = self.request(
            Method::POST,
            &format!("/containers/{}/wait", segment(&params.container)),
        );
        let status: ContainerExitStatus = self.send_json(request).await?;
        Ok(status.status_code)
    }

    pub async fn top(&self, params: TopParams) -> DockerResult<ContainerProcesses> {
        let request = self
            .request(
                Method::GET,
                &format!("/containers/{}/top", segment(&params.container)),
            )
            .query_opt("ps_args", params.ps_args);
        self.send_json(request).await
    }

    pub async fn attach_container<P>(
        &self,
        params: AttachContainerParams,
        processor: P,
    ) -> DockerResult<()>
    where
        P: MessageProcessor<LogMessage>,
    {
        let request = self
            .request(
                Method::POST,
                &format!("/containers/{}/attach", segment(&params.container)),
            )
            .query("stdout", 1)
            .query("stderr", 1)
            .flag_opt("stream", params.stream)
            .flag_opt("logs", params.logs);
        self.pump_log(request, processor).await
    }

    pub async fn container_logs<P>(
        &self,
        params: ContainerLogsParams,
        processor: P,
    ) -> DockerResult<()>
    where
        P: MessageProcessor<LogMessage>,
    {
        let request = self
            .request(
                Method::GET,
                &format!("/containers/{}/logs", segment(&params.container)),
            )
            .query("stdout", 1)
            .query("stderr", 1)
            .flag_opt("follow", params.follow)
            .flag_opt("timestamps", params.timestamps)
            .query_opt("tail", params.tail)
            .query_opt("since", params.since);
        self.pump_log(request, processor).await
    }

    pub async fn create_exec(&self, params: CreateExecParams) -> DockerResult<Exec> {
        let attach = !params.detach.unwrap_or(false);
        let config = ExecConfig {
            attach_stdin: false,
            attach_stdout: attach,
            attach_stderr: attach,
            tty: false,
            cmd: params.cmd,
        };
        let request = self
            .request(
                Method::POST,
                &format!("/containers/{}/exec", segment(&params.container)),
            )
            .body(RequestBody::json(serde_json::to_vec(&config)?));
        self.send_json(request).await
    }

    /// Runs the exec and feeds its output to `processor` until it finishes.
    /// A detached exec returns as soon as the daemon accepts it.
    pub async fn start_exec<P>(&self, params: StartExecParams, processor: P) -> DockerResult<()>
    where
        P: MessageProcessor<LogMessage>,
    {
        let start = ExecStart {
            detach: params.detach.unwrap_or(false),
            tty: params.tty.unwrap_or(false),
        };
        let request = self
            .request(
                Method::POST,
                &format!("/exec/{}/start", segment(&params.exec_id)),
            )
            .body(RequestBody::json(serde_json::to_vec(&start)?));
        self.pump_log(request, processor).await
    }

    pub async fn get_exec_info(&self, params: GetExecInfoParams) -> DockerResult<ExecInfo> {
        let request = self.request(
            Method::GET,
            &format!("/exec/{}/json", segment(&params.exec_id)),
        );
        self.send_json(request).await
    }

    /// Tar archive of `source_path`. Dropping the stream closes the
    /// connection.
    pub async fn get_resource(&self, params: GetResourceParams) -> DockerResult<BodyStream> {
        let request = self
            .request(
                Method::GET,
                &format!("/containers/{}/archive", segment(&params.container)),
            )
            .query("path", params.source_path);
        Ok(self.send(request).await?.body)
    }

    /// Extracts the tar `archive` into `target_path`.
    pub async fn put_resource(
        &self,
        params: PutResourceParams,
        archive: BodyStream,
    ) -> DockerResult<()> {
        let request = self
            .request(
                Method::PUT,
                &format!("/containers/{}/archive", segment(&params.container)),
            )
            .query("path", params.target_path)
            .flag_opt("noOverwriteDirNonDir", params.no_overwrite_dir_non_dir)
            .body(RequestBody::Stream {
                content_type: TAR_CONTENT_TYPE,
                stream: archive,
            });
        self.send_discarding(request, &[]).await
    }

    /// Feeds daemon events to `processor` until the stream ends.
    pub async fn get_events<P>(&self, params: GetEventsParams, mut processor: P) -> DockerResult<()>
    where
        P: MessageProcessor<Event>,
    {
        let filters = match &params.filters {
            Some(filters) => Some(filters.to_query_value()?),
            None => None,
        };
        let request = self
            .request(Method::GET, "/events")
            .query_opt("since", params.since)
            .query_opt("until", params.until)
            .query_opt("filters", filters);
        let response = self.send(request).await?;
        let mut reader = JsonObjectReader::<Event>::new(response.body);
        while let Some(event) = reader.next().await? {
            processor.process(event);
        }
        Ok(())
    }

    pub async fn inspect_image(&self, params: InspectImageParams) -> DockerResult<ImageInfo> {
        let request = self.request(Method::GET, &format!("/images/{}/json", params.image));
        self.send_json(request).await
    }

    /// Builds an image from the params' files and returns its id.
    pub async fn build_image<M>(&self, params: BuildImageParams, mut monitor: M) -> DockerResult<String>
    where
        M: ProgressMonitor,
    {
        let files = params.files.clone();
        let context = tokio::task::spawn_blocking(move || pack_build_context(&files))
            .await
            .map_err(|e| DockerError::Io(std::io::Error::other(e)))??;

        let auth_configs = self.initial_auth.merged_with(params.auth_configs.as_ref());
        let request = self
            .request(Method::POST, "/build")
            .query("rm", 1)
            .query("forcerm", 1)
            .query_opt("t", params.repository)
            .flag_opt("pull", params.do_force_pull)
            .query_opt("memory", params.memory_limit)
            .query_opt("memswap", params.memory_swap_limit)
            .header(REGISTRY_CONFIG_HEADER, config_header(&auth_configs)?)
            .body(RequestBody::Bytes {
                content_type: BUILD_CONTEXT_CONTENT_TYPE,
                data: context.into(),
            });

        let response = self.send(request).await?;
        let mut reader = JsonObjectReader::<ProgressStatus>::new(response.body);
        while let Some(status) = reader.next().await? {
            fail_on_stream_error(&status)?;
            monitor.update(&status);
            if let Some(image_id) = status.stream.as_deref().and_then(built_image_id) {
                return Ok(image_id);
            }
        }
        Err(DockerError::StreamProtocol(BUILD_FAILED.to_string()))
    }

    /// Pulls an image, returning its digest when the daemon reports one.
    pub async fn pull<M>(&self, params: PullParams, mut monitor: M) -> DockerResult<Option<String>>
    where
        M: ProgressMonitor,
    {
        let auth = self
            .initial_auth
            .auth_header_for(params.registry.as_deref(), params.auth_config.as_ref())?;
        let request = self
            .request(Method::POST, "/images/create")
            .query("fromImage", params.full_repository())
            .query_opt("tag", params.tag)
            .header(REGISTRY_AUTH_HEADER, auth);

        let response = self.send(request).await?;
        let mut reader = JsonObjectReader::<ProgressStatus>::new(response.body);
        let mut digest = None;
        let mut finished = false;
        while let Some(status) = reader.next().await? {
            fail_on_stream_error(&status)?;
            monitor.update(&status);
            if let Some(text) = status.status.as_deref() {
                if let Some(value) = text.strip_prefix("Digest: ") {
                    digest = Some(value.trim().to_string());
                } else if text.starts_with("Status: ") {
                    finished = true;
                }
            }
        }
        if !finished {
            return Err(DockerError::StreamProtocol(PULL_FAILED.to_string()));
        }
        Ok(digest)
    }

    /// Pushes an image and returns the digest the registry assigned.
    pub async fn push<M>(&self, params: PushParams, mut monitor: M) -> DockerResult<String>
    where
        M: ProgressMonitor,
    {
        let auth = self
            .initial_auth
            .auth_header_for(params.registry.as_deref(), params.auth_config.as_ref())?;
        let tag = params.tag.clone().unwrap_or_else(|| DEFAULT_TAG.to_string());
        let request = self
            .request(
                Method::POST,
                &format!("/images/{}/push", params.full_repository()),
            )
            .query_opt("tag", params.tag)
            .header(REGISTRY_AUTH_HEADER, auth);

        let response = self.send(request).await?;
        let mut reader = JsonObjectReader::<ProgressStatus>::new(response.body);
        let mut digest = None;
        while let Some(status) = reader.next().await? {
            fail_on_stream_error(&status)?;
            monitor.update(&status);
            if digest.is_none() {
                digest = status
                    .status
                    .as_deref()
                    .and_then(|text| pushed_digest(text, &tag));
            }
        }
        digest.ok_or_else(|| DockerError::daemon(500, PUSH_DIGEST_MISSING))
    }

    pub async fn tag(&self, params: TagParams) -> DockerResult<()> {
        let request = self
            .request(Method::POST, &format!("/images/{}/tag", params.image))
            .query("repo", params.repository)
            .query_opt("tag", params.tag)
            .flag_opt("force", params.force);
        self.send_discarding(request, &[]).await
    }

    /// Commits a container to a new image and returns the image id.
    pub async fn commit(&self, params: CommitParams) -> DockerResult<String> {
        let request = self
            .request(Method::POST, "/commit")
            .query("container", params.container)
            .query("repo", params.repository)
            .query_opt("tag", params.tag)
            .query_opt("comment", params.comment)
            .query_opt("author", params.author)
            .body(RequestBody::json(b"{}".to_vec()));
        let created: IdBody = self.send_json(request).await?;
        Ok(created.id)
    }

    pub async fn remove_image(&self, params: RemoveImageParams) -> DockerResult<()> {
        let request = self
            .request(Method::DELETE, &format!("/images/{}", params.image))
            .flag_opt("force", params.force);
        self.send_discarding(request, &[]).await
    }
}

fn fail_on_stream_error(status: &ProgressStatus) -> DockerResult<()> {
    match &status.error {
        Some(error) => Err(DockerError::daemon(500, error.trim())),
        None => Ok(()),
    }
}

/// Image id from a `Successfully built <id>` build line.
fn built_image_id(stream: &str) -> Option<String> {
    let rest = stream.trim().strip_prefix("Successfully built ")?;
    rest.split_whitespace().next().map(str::to_string)
}

/// Digest from a `<tag>: digest: <digest> size: <n>` push line.
fn pushed_digest(status: &str, tag: &str) -> Option<String> {
    let rest = status.strip_prefix(tag)?.strip_prefix(": digest: ")?;
    rest.split_whitespace().next().map(str::to_string)
}
