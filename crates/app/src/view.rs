//! Declarative view description derived from [`DashboardState`].
//!
//! [`render`] is a pure function of the state and the current time. A
//! presentation layer draws the returned [`DashboardView`] wholesale; there is
//! no incremental diffing and rows carry no identity beyond their position.

use serde::Serialize;

use relaydash_domain::client::ClientConnection;
use relaydash_domain::filter::ClientFilter;
use relaydash_domain::format::{
    PLACEHOLDER, format_age, format_count, format_rate, format_since,
};
use relaydash_domain::notification::Notification;
use relaydash_domain::phone::Phone;
use relaydash_domain::time::{Timestamp, format_absolute};

use crate::state::DashboardState;

/// One entry of the phone list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhoneItem {
    pub online: bool,
    pub title: String,
    /// `IP: … · v… · с …`, only the parts that are known.
    pub meta: String,
}

/// The phone list section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhonesView {
    pub items: Vec<PhoneItem>,
    /// Absolute time of the last successful refresh, if any.
    pub updated_at: Option<String>,
    pub error: Option<String>,
}

/// One row of the clients table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientRow {
    /// 1-based position in the filtered list.
    pub index: usize,
    pub stream: String,
    pub phone: String,
    pub ip: String,
    pub proto_port: String,
    pub age: String,
    pub uploaded: String,
    pub downloaded: String,
}

/// The clients table section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientsView {
    pub rows: Vec<ClientRow>,
    /// `Найдено: N`.
    pub found: String,
    /// `Фильтр: …`.
    pub filter_info: String,
    /// Aggregate rate badge over the filtered rows.
    pub total_rate: String,
    pub error: Option<String>,
}

/// Everything a presentation layer needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardView {
    pub phones: PhonesView,
    pub clients: ClientsView,
    pub toast: Option<Notification>,
    pub login_required: bool,
}

/// Derive the full view from `state` at `now`.
#[must_use]
pub fn render(state: &DashboardState, now: Timestamp) -> DashboardView {
    let mut phones = render_phones(&state.phones, state.phones_updated_at);
    phones.error.clone_from(&state.phones_error);

    let mut clients = render_clients(&state.clients, &state.filter, now);
    clients.error.clone_from(&state.clients_error);

    DashboardView {
        phones,
        clients,
        toast: state
            .toast
            .as_ref()
            .filter(|toast| toast.is_visible(now))
            .map(|toast| toast.notification.clone()),
        login_required: state.login_required,
    }
}

/// Render the phone list.
#[must_use]
pub fn render_phones(phones: &[Phone], updated_at: Option<Timestamp>) -> PhonesView {
    PhonesView {
        items: phones.iter().map(phone_item).collect(),
        updated_at: updated_at.map(format_absolute),
        error: None,
    }
}

fn phone_item(phone: &Phone) -> PhoneItem {
    let mut parts = Vec::new();
    if let Some(ip) = &phone.ip {
        parts.push(format!("IP: {ip}"));
    }
    if let Some(version) = &phone.version {
        parts.push(format!("v{version}"));
    }
    if let Some(since) = format_since(phone.since.as_deref()) {
        parts.push(format!("с {since}"));
    }
    PhoneItem {
        online: phone.online,
        title: format!("Телефон #{}", phone.id),
        meta: parts.join(" · "),
    }
}

/// Filter `clients`, aggregate rates over the survivors and render the table.
#[must_use]
pub fn render_clients(
    clients: &[ClientConnection],
    filter: &ClientFilter,
    now: Timestamp,
) -> ClientsView {
    let mut total_up = 0.0;
    let mut total_down = 0.0;
    let rows: Vec<ClientRow> = filter
        .apply(clients)
        .enumerate()
        .map(|(idx, client)| {
            total_up += client.upload_rate();
            total_down += client.download_rate();
            client_row(idx + 1, client, now)
        })
        .collect();

    ClientsView {
        found: format!("Найдено: {}", rows.len()),
        filter_info: filter.describe(),
        total_rate: format_rate(total_up, total_down),
        rows,
        error: None,
    }
}

fn client_row(index: usize, client: &ClientConnection, now: Timestamp) -> ClientRow {
    let or_placeholder =
        |value: &Option<String>| value.clone().unwrap_or_else(|| PLACEHOLDER.to_string());
    ClientRow {
        index,
        stream: or_placeholder(&client.stream),
        phone: or_placeholder(&client.phone),
        ip: or_placeholder(&client.ip),
        proto_port: client.proto_port(),
        age: format_age(client.since.as_deref(), now),
        uploaded: format_count(client.bytes_up),
        downloaded: format_count(client.bytes_down),
    }
}
