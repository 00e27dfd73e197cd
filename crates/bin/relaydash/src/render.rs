//! Plain-text drawing of a [`DashboardView`].
//!
//! Every frame is drawn from scratch; nothing is diffed against the previous
//! one.

use std::fmt::Write;

use relaydash_app::view::{ClientRow, ClientsView, DashboardView, PhonesView};
use relaydash_domain::notification::{Notification, NotificationLevel};

const HEADERS: [&str; 8] = ["#", "Stream", "Телефон", "IP", "Proto", "Возраст", "↑", "↓"];

/// Draw the whole dashboard.
#[must_use]
pub fn frame(view: &DashboardView) -> String {
    let mut out = String::new();
    if view.login_required {
        out.push_str("Требуется вход: relaydash login --user <логин> --pass <пароль>\n\n");
    }
    out.push_str(&phones(&view.phones));
    out.push('\n');
    out.push_str(&clients(&view.clients));
    if let Some(toast) = &view.toast {
        out.push('\n');
        out.push_str(&notification(toast));
        out.push('\n');
    }
    out
}

/// Draw the phone list.
#[must_use]
pub fn phones(view: &PhonesView) -> String {
    let mut out = String::from("Телефоны");
    if let Some(updated_at) = &view.updated_at {
        let _ = write!(out, " (обновлено: {updated_at})");
    }
    out.push('\n');
    if view.items.is_empty() {
        out.push_str("  нет подключённых телефонов\n");
    }
    for item in &view.items {
        let marker = if item.online { '●' } else { '○' };
        let _ = write!(out, "  {marker} {}", item.title);
        if !item.meta.is_empty() {
            let _ = write!(out, "  {}", item.meta);
        }
        out.push('\n');
    }
    if let Some(error) = &view.error {
        let _ = writeln!(out, "  ! {error}");
    }
    out
}

/// Draw the clients table with its summary line.
#[must_use]
pub fn clients(view: &ClientsView) -> String {
    let cells: Vec<[String; 8]> = view.rows.iter().map(row_cells).collect();
    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header = HEADERS.map(str::to_string);
    push_line(&mut out, &header, &widths);
    for row in &cells {
        push_line(&mut out, row, &widths);
    }
    let _ = writeln!(
        out,
        "{} · {} · {}",
        view.found, view.filter_info, view.total_rate
    );
    if let Some(error) = &view.error {
        let _ = writeln!(out, "! {error}");
    }
    out
}

/// One-line notification with a status marker.
#[must_use]
pub fn notification(notification: &Notification) -> String {
    let marker = match notification.level {
        NotificationLevel::Success => '✔',
        NotificationLevel::Failure => '✖',
    };
    format!("{marker} {}", notification.text)
}

fn row_cells(row: &ClientRow) -> [String; 8] {
    [
        row.index.to_string(),
        row.stream.clone(),
        row.phone.clone(),
        row.ip.clone(),
        row.proto_port.clone(),
        row.age.clone(),
        row.uploaded.clone(),
        row.downloaded.clone(),
    ]
}

fn push_line(out: &mut String, cells: &[String; 8], widths: &[usize; 8]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}
