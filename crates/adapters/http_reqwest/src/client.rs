//! reqwest implementation of [`RelayApi`].

use std::future::Future;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CACHE_CONTROL};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use relaydash_app::ports::RelayApi;
use relaydash_app::state::Resource;
use relaydash_domain::client::ClientConnection;
use relaydash_domain::credentials::{CredentialDomain, Credentials, RotationToken};
use relaydash_domain::error::DashError;
use relaydash_domain::payload::{Extracted, extract_list};
use relaydash_domain::phone::Phone;
use relaydash_domain::reply::ActionReply;

use crate::base::ApiBase;
use crate::error::HttpError;

/// Connection settings for [`ReqwestRelayApi`].
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub base: ApiBase,
    /// Whole-request timeout; `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl HttpConfig {
    #[must_use]
    pub fn new(base: &str) -> Self {
        Self {
            base: ApiBase::new(base),
            timeout: None,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Relay client over HTTP.
///
/// Cloning is cheap and shares the underlying connection pool. No cookie
/// store is configured, so the relay only ever sees the explicit Basic header.
#[derive(Debug, Clone)]
pub struct ReqwestRelayApi {
    client: Client,
    base: ApiBase,
}

#[derive(Serialize)]
struct CredentialsBody<'a> {
    user: &'a str,
    pass: &'a str,
}

impl ReqwestRelayApi {
    /// Build a client from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Client`] when the TLS backend cannot be initialised.
    pub fn new(config: &HttpConfig) -> Result<Self, HttpError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(HttpError::Client)?;
        Ok(Self {
            client,
            base: config.base.clone(),
        })
    }

    #[must_use]
    pub fn base(&self) -> &ApiBase {
        &self.base
    }

    fn request(&self, method: Method, path: &str, auth: Option<&Credentials>) -> RequestBuilder {
        let url = self.base.resolve(path);
        tracing::debug!(%method, %url, authenticated = auth.is_some(), "relay request");
        let request = self
            .client
            .request(method, url)
            .header(CACHE_CONTROL, "no-store");
        match auth {
            Some(credentials) => request.header(AUTHORIZATION, credentials.basic_header()),
            None => request,
        }
    }
}

/// Send `request` and reject 401 and other non-2xx statuses.
async fn send(request: RequestBuilder) -> Result<Response, HttpError> {
    let response = request.send().await?;
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(HttpError::Unauthorized);
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(HttpError::status(status.as_u16(), &body));
    }
    Ok(response)
}

async fn send_json(request: RequestBuilder) -> Result<Value, HttpError> {
    let body = send(request).await?.bytes().await?;
    serde_json::from_slice(&body).map_err(HttpError::Decode)
}

fn items<T: DeserializeOwned>(body: Value, key: &'static str) -> Vec<T> {
    let Extracted { items, skipped } = extract_list(body, key);
    if skipped > 0 {
        tracing::warn!(key, skipped, "ignored malformed items in relay payload");
    }
    items
}

fn credentials_path(domain: CredentialDomain, verb: &str) -> String {
    format!("/auth/{domain}/{verb}")
}

impl RelayApi for ReqwestRelayApi {
    fn fetch_phones(
        &self,
        auth: Option<&Credentials>,
    ) -> impl Future<Output = Result<Vec<Phone>, DashError>> + Send {
        let request = self.request(Method::GET, Resource::Phones.path(), auth);
        async move {
            let body = send_json(request).await?;
            Ok(items(body, "phones"))
        }
    }

    fn fetch_clients(
        &self,
        auth: Option<&Credentials>,
    ) -> impl Future<Output = Result<Vec<ClientConnection>, DashError>> + Send {
        let request = self.request(Method::GET, Resource::Clients.path(), auth);
        async move {
            let body = send_json(request).await?;
            Ok(items(body, "clients"))
        }
    }

    fn rotate(
        &self,
        token: Option<&RotationToken>,
        auth: Option<&Credentials>,
    ) -> impl Future<Output = Result<ActionReply, DashError>> + Send {
        let mut request = self.request(Method::GET, "/rotate", auth);
        if let Some(token) = token {
            request = request.query(&[("token", token.as_str())]);
        }
        async move {
            let body = send_json(request).await?;
            Ok(ActionReply::from_value(&body))
        }
    }

    fn restart(
        &self,
        auth: Option<&Credentials>,
    ) -> impl Future<Output = Result<ActionReply, DashError>> + Send {
        let request = self.request(Method::POST, "/restart", auth);
        async move {
            let body = send_json(request).await?;
            Ok(ActionReply::from_value(&body))
        }
    }

    fn probe_status(
        &self,
        auth: Option<&Credentials>,
    ) -> impl Future<Output = Result<(), DashError>> + Send {
        let request = self.request(Method::GET, "/status", auth);
        async move {
            send(request).await?;
            Ok(())
        }
    }

    fn get_credentials(
        &self,
        domain: CredentialDomain,
        auth: Option<&Credentials>,
    ) -> impl Future<Output = Result<Value, DashError>> + Send {
        let request = self.request(Method::GET, &credentials_path(domain, "get"), auth);
        async move { Ok(send_json(request).await?) }
    }

    fn set_credentials(
        &self,
        domain: CredentialDomain,
        credentials: &Credentials,
        auth: Option<&Credentials>,
    ) -> impl Future<Output = Result<ActionReply, DashError>> + Send {
        let request = self
            .request(Method::POST, &credentials_path(domain, "set"), auth)
            .json(&CredentialsBody {
                user: &credentials.user,
                pass: &credentials.pass,
            });
        async move {
            let body = send_json(request).await?;
            Ok(ActionReply::from_value(&body))
        }
    }
}
