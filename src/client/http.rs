//! HTTP implementation of the inventory API
//!
//! Every call is a `POST {base_url}/{service}/{method}` carrying a JSON body.
//! The client logs in once; the returned token is attached as a bearer token to
//! every subsequent call.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use metrics::{counter, histogram};
use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, info, warn};
use url::Url;

use super::{
    AtRecord, CiCreateResponse, CiPayload, CiRecord, CiUpdateRequest, InventoryApi,
    MonitoringEvent, ProjectPayload, ProjectRecord, ProjectSearchHit, ProjectSearchRequest,
    ProjectUpdateRequest, RemoteCall, RemoteError, RemoteResult, SearchEventsRequest,
    ServiceCloudRecord, UpdateAtRequest, UpdateServiceCloudRequest, UpdateUseAndKeyDateRequest,
    UseAndKeyDateRecord,
};

const USER_AGENT: &str = "idefix-reconciler/0.1";
const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Serialize)]
struct LoginRequest<'a> {
    login: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Serialize)]
struct IdRequest<'a> {
    id: &'a str,
}

#[derive(Deserialize)]
struct ProjectCreateResponse {
    id: String,
}

/// Idefix client speaking JSON over HTTP
#[derive(Clone)]
pub struct HttpInventoryClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl std::fmt::Debug for HttpInventoryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpInventoryClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.token.is_some())
            .finish()
    }
}

impl HttpInventoryClient {
    /// Create an unauthenticated client for the given API base URL.
    pub fn new(base_url: &str, timeout: Duration) -> RemoteResult<Self> {
        Url::parse(base_url)?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Authenticate against the service, returning a client that carries the session token.
    pub async fn login(mut self, login: &str, password: &str) -> RemoteResult<Self> {
        info!(base_url = %self.base_url, login = %login, "Logging in to Idefix");

        let response = self
            .send(RemoteCall::Login, &LoginRequest { login, password })
            .await?;

        match response.status() {
            status if status.is_success() => {
                let body: LoginResponse = decode_body(response).await?;
                self.token = Some(body.token);
                debug!(base_url = %self.base_url, "Idefix login succeeded");
                Ok(self)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                let body = response.text().await.unwrap_or_default();
                Err(RemoteError::Login(truncate(&body)))
            }
            _ => Err(api_error(response).await),
        }
    }

    /// Whether `login` has completed.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn endpoint(&self, call: RemoteCall) -> RemoteResult<Url> {
        Ok(Url::parse(&format!(
            "{}/{}/{}",
            self.base_url,
            call.service(),
            call.method()
        ))?)
    }

    async fn send<B>(&self, call: RemoteCall, body: &B) -> RemoteResult<Response>
    where
        B: Serialize + ?Sized + Sync,
    {
        let url = self.endpoint(call)?;
        let mut request = self
            .http
            .post(url)
            .header("Accept", "application/json")
            .json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let started = Instant::now();
        let result = request.send().await;
        let elapsed = started.elapsed().as_secs_f64();

        histogram!("idefix_remote_call_duration_seconds", "call" => call.as_str())
            .record(elapsed);

        match result {
            Ok(response) => {
                let status = response.status().as_u16().to_string();
                counter!("idefix_remote_calls_total", "call" => call.as_str(), "status" => status)
                    .increment(1);
                debug!(
                    call = %call,
                    status = %response.status(),
                    elapsed_ms = %(elapsed * 1000.0).round(),
                    "Idefix call completed"
                );
                Ok(response)
            }
            Err(err) => {
                counter!(
                    "idefix_remote_calls_total",
                    "call" => call.as_str(),
                    "status" => "network_error"
                )
                .increment(1);
                warn!(call = %call, error = %err, "Idefix call failed before a response");
                Err(err.into())
            }
        }
    }

    /// Issue a call whose response body carries a value.
    async fn call<B, T>(&self, call: RemoteCall, body: &B) -> RemoteResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self.send(call, body).await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        decode_body(response).await
    }

    /// Issue a read whose target may be absent; HTTP 404 maps to `None`.
    async fn call_optional<B, T>(&self, call: RemoteCall, body: &B) -> RemoteResult<Option<T>>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self.send(call, body).await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(call = %call, "Idefix reports record absent");
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        decode_body(response).await
    }

    /// Issue a call whose response body is ignored.
    async fn call_unit<B>(&self, call: RemoteCall, body: &B) -> RemoteResult<()>
    where
        B: Serialize + ?Sized + Sync,
    {
        let response = self.send(call, body).await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        Ok(())
    }
}

async fn decode_body<T: DeserializeOwned>(response: Response) -> RemoteResult<T> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

async fn api_error(response: Response) -> RemoteError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    RemoteError::Api {
        status,
        body: truncate(&body),
    }
}

fn truncate(body: &str) -> String {
    if body.chars().count() > MAX_ERROR_BODY_CHARS {
        let head: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
        format!("{}...", head)
    } else {
        body.to_string()
    }
}

#[async_trait]
impl InventoryApi for HttpInventoryClient {
    async fn ci_create(&self, request: &CiPayload) -> RemoteResult<String> {
        let response: CiCreateResponse = self.call(RemoteCall::CiCreate, request).await?;
        Ok(response.id)
    }

    async fn ci_read(&self, id: &str) -> RemoteResult<Option<CiRecord>> {
        self.call_optional(RemoteCall::CiRead, &IdRequest { id })
            .await
    }

    async fn ci_update(&self, request: &CiUpdateRequest) -> RemoteResult<()> {
        self.call_unit(RemoteCall::CiUpdate, request).await
    }

    async fn ci_update_platform(&self, id: &str) -> RemoteResult<()> {
        self.call_unit(RemoteCall::CiUpdatePlatform, &IdRequest { id })
            .await
    }

    async fn ci_read_service_cloud(&self, id: &str) -> RemoteResult<ServiceCloudRecord> {
        self.call(RemoteCall::CiReadServiceCloud, &IdRequest { id })
            .await
    }

    async fn ci_update_service_cloud(
        &self,
        request: &UpdateServiceCloudRequest,
    ) -> RemoteResult<()> {
        self.call_unit(RemoteCall::CiUpdateServiceCloud, request)
            .await
    }

    async fn ci_read_use_and_key_date(&self, id: &str) -> RemoteResult<UseAndKeyDateRecord> {
        self.call(RemoteCall::CiReadUseAndKeyDate, &IdRequest { id })
            .await
    }

    async fn ci_update_use_and_key_date(
        &self,
        request: &UpdateUseAndKeyDateRequest,
    ) -> RemoteResult<()> {
        self.call_unit(RemoteCall::CiUpdateUseAndKeyDate, request)
            .await
    }

    async fn equipment_read_at(&self, id: &str) -> RemoteResult<AtRecord> {
        self.call(RemoteCall::EquipmentReadAt, &IdRequest { id })
            .await
    }

    async fn equipment_update_at(&self, request: &UpdateAtRequest) -> RemoteResult<()> {
        self.call_unit(RemoteCall::EquipmentUpdateAt, request).await
    }

    async fn equipment_delete(&self, id: &str) -> RemoteResult<()> {
        self.call_unit(RemoteCall::EquipmentDelete, &IdRequest { id })
            .await
    }

    async fn monitoring_search_events(
        &self,
        request: &SearchEventsRequest,
    ) -> RemoteResult<Vec<MonitoringEvent>> {
        let events: Option<Vec<MonitoringEvent>> = self
            .call(RemoteCall::MonitoringSearchEvents, request)
            .await?;
        Ok(events.unwrap_or_default())
    }

    async fn monitoring_delete_event(&self, event_id: &str) -> RemoteResult<()> {
        self.call_unit(RemoteCall::MonitoringDeleteEvents, &IdRequest { id: event_id })
            .await
    }

    async fn project_create(&self, request: &ProjectPayload) -> RemoteResult<String> {
        let response: ProjectCreateResponse =
            self.call(RemoteCall::ProjectCreate, request).await?;
        Ok(response.id)
    }

    async fn project_read(&self, id: &str) -> RemoteResult<Option<ProjectRecord>> {
        self.call_optional(RemoteCall::ProjectRead, &IdRequest { id })
            .await
    }

    async fn project_update(&self, request: &ProjectUpdateRequest) -> RemoteResult<()> {
        self.call_unit(RemoteCall::ProjectUpdate, request).await
    }

    async fn project_delete(&self, id: &str) -> RemoteResult<()> {
        self.call_unit(RemoteCall::ProjectDelete, &IdRequest { id })
            .await
    }

    async fn project_search(
        &self,
        request: &ProjectSearchRequest,
    ) -> RemoteResult<Option<Vec<ProjectSearchHit>>> {
        self.call(RemoteCall::ProjectSearch, request).await
    }
}
