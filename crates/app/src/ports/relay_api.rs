//! Relay API port: the HTTP endpoints exposed by the relay.

use std::future::Future;
use std::sync::Arc;

use relaydash_domain::client::ClientConnection;
use relaydash_domain::credentials::{CredentialDomain, Credentials, RotationToken};
use relaydash_domain::error::DashError;
use relaydash_domain::phone::Phone;
use relaydash_domain::reply::ActionReply;

/// Read and action endpoints of the relay.
///
/// Every call takes the credentials chosen by the auth gate; `None` means
/// no `Authorization` header is sent. A 401 must surface as
/// [`DashError::Unauthorized`].
pub trait RelayApi {
    /// `GET /phones`: connected phones.
    fn fetch_phones(
        &self,
        auth: Option<&Credentials>,
    ) -> impl Future<Output = Result<Vec<Phone>, DashError>> + Send;

    /// `GET /clients`: active client connections.
    fn fetch_clients(
        &self,
        auth: Option<&Credentials>,
    ) -> impl Future<Output = Result<Vec<ClientConnection>, DashError>> + Send;

    /// `GET /rotate?token=…`: rotate outbound IPs.
    fn rotate(
        &self,
        token: Option<&RotationToken>,
        auth: Option<&Credentials>,
    ) -> impl Future<Output = Result<ActionReply, DashError>> + Send;

    /// `POST /restart`: restart the relay.
    fn restart(
        &self,
        auth: Option<&Credentials>,
    ) -> impl Future<Output = Result<ActionReply, DashError>> + Send;

    /// `GET /status`: liveness and authentication probe.
    fn probe_status(
        &self,
        auth: Option<&Credentials>,
    ) -> impl Future<Output = Result<(), DashError>> + Send;

    /// `GET /auth/{domain}/get`: masked credentials, returned as sent.
    fn get_credentials(
        &self,
        domain: CredentialDomain,
        auth: Option<&Credentials>,
    ) -> impl Future<Output = Result<serde_json::Value, DashError>> + Send;

    /// `POST /auth/{domain}/set` with a `{user, pass}` body.
    fn set_credentials(
        &self,
        domain: CredentialDomain,
        credentials: &Credentials,
        auth: Option<&Credentials>,
    ) -> impl Future<Output = Result<ActionReply, DashError>> + Send;
}

impl<T: RelayApi + Send + Sync> RelayApi for Arc<T> {
    fn fetch_phones(
        &self,
        auth: Option<&Credentials>,
    ) -> impl Future<Output = Result<Vec<Phone>, DashError>> + Send {
        (**self).fetch_phones(auth)
    }

    fn fetch_clients(
        &self,
        auth: Option<&Credentials>,
    ) -> impl Future<Output = Result<Vec<ClientConnection>, DashError>> + Send {
        (**self).fetch_clients(auth)
    }

    fn rotate(
        &self,
        token: Option<&RotationToken>,
        auth: Option<&Credentials>,
    ) -> impl Future<Output = Result<ActionReply, DashError>> + Send {
        (**self).rotate(token, auth)
    }

    fn restart(
        &self,
        auth: Option<&Credentials>,
    ) -> impl Future<Output = Result<ActionReply, DashError>> + Send {
        (**self).restart(auth)
    }

    fn probe_status(
        &self,
        auth: Option<&Credentials>,
    ) -> impl Future<Output = Result<(), DashError>> + Send {
        (**self).probe_status(auth)
    }

    fn get_credentials(
        &self,
        domain: CredentialDomain,
        auth: Option<&Credentials>,
    ) -> impl Future<Output = Result<serde_json::Value, DashError>> + Send {
        (**self).get_credentials(domain, auth)
    }

    fn set_credentials(
        &self,
        domain: CredentialDomain,
        credentials: &Credentials,
        auth: Option<&Credentials>,
    ) -> impl Future<Output = Result<ActionReply, DashError>> + Send {
        (**self).set_credentials(domain, credentials, auth)
    }
}
