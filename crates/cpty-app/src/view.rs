//! Terminal rendering
//!
//! Pure functions from state to text. Column widths count characters, not
//! bytes, since every label is Cyrillic.

use chrono::{DateTime, Utc};
use cpty_client::ServerStatus;
use cpty_model::{Counterparty, FormField};
use cpty_store::{AppState, FormSession, LoadStatus};
use std::fmt::Write as _;

/// Page title
pub const TITLE: &str = "Контрагенты";

/// Add action label
pub const ADD_LABEL: &str = "Добавить";

/// Save button label
pub const SAVE_LABEL: &str = "Сохранить";

/// Cancel button label
pub const CANCEL_LABEL: &str = "Отмена";

/// Shown while the first load is pending
pub const LOADING_TEXT: &str = "Загрузка...";

/// Shown for an empty registry
pub const EMPTY_TEXT: &str = "Нет данных";

const ID_HEADER: &str = "ID";
const SEPARATOR: &str = " | ";

/// Title line with the server indicator and the add action
#[must_use]
pub fn render_header(state: &AppState) -> String {
    format!(
        "{TITLE}  {}  [+] {ADD_LABEL}",
        render_status(state.server_status)
    )
}

/// Connectivity indicator
#[must_use]
pub fn render_status(status: ServerStatus) -> String {
    format!("[Сервер: {status}]")
}

/// Record table, or the loading, error or empty placeholder
#[must_use]
pub fn render_table(state: &AppState) -> String {
    if state.load == LoadStatus::Loading && state.records.is_empty() {
        return LOADING_TEXT.to_string();
    }

    let mut out = String::new();
    if let Some(message) = state.error_message {
        let _ = writeln!(out, "! {message}");
    }
    if state.records.is_empty() {
        out.push_str(EMPTY_TEXT);
        return out;
    }

    let widths = column_widths(&state.records);
    let mut header = vec![ID_HEADER];
    header.extend(FormField::ALL.iter().map(|f| f.label()));
    let _ = writeln!(out, "{}", join_row(&header, &widths));
    let _ = writeln!(
        out,
        "{}",
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-")
    );
    for record in &state.records {
        let _ = writeln!(out, "{}", join_row(&row_cells(record), &widths));
    }
    if let Some(at) = state.last_synced_at {
        out.push_str(&render_synced(at));
    } else if out.ends_with('\n') {
        out.pop();
    }
    out
}

/// Modal form with current values and field messages
#[must_use]
pub fn render_form(form: &FormSession) -> String {
    let label_width = FormField::ALL
        .iter()
        .map(|f| f.label().chars().count())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", form.title());
    for field in FormField::ALL {
        let _ = writeln!(
            out,
            "{}: [{}]",
            pad(field.label(), label_width),
            form.value(field)
        );
        if let Some(message) = form.error(field) {
            let _ = writeln!(out, "{}  {message}", " ".repeat(label_width));
        }
    }
    let _ = write!(out, "[{SAVE_LABEL}] [{CANCEL_LABEL}]");
    out
}

/// Full screen: header, table and the open modal, if any
#[must_use]
pub fn render_screen(state: &AppState) -> String {
    let mut out = render_header(state);
    out.push_str("\n\n");
    out.push_str(&render_table(state));
    if let Some(form) = FormSession::for_state(state) {
        out.push_str("\n\n");
        out.push_str(&render_form(&form));
    }
    out
}

/// Single record as label/value lines
#[must_use]
pub fn render_record(record: &Counterparty) -> String {
    let mut out = format!("{ID_HEADER}: {}", record.id);
    for field in FormField::ALL {
        let _ = write!(out, "\n{}: {}", field.label(), record.field(field));
    }
    out
}

fn render_synced(at: DateTime<Utc>) -> String {
    format!("Обновлено: {}", at.format("%H:%M:%S"))
}

fn row_cells(record: &Counterparty) -> Vec<&str> {
    let mut cells = vec![record.id.as_str()];
    cells.extend(FormField::ALL.iter().map(|f| record.field(*f)));
    cells
}

fn column_widths(records: &[Counterparty]) -> Vec<usize> {
    let mut widths = vec![ID_HEADER.chars().count()];
    widths.extend(FormField::ALL.iter().map(|f| f.label().chars().count()));
    for record in records {
        for (width, cell) in widths.iter_mut().zip(row_cells(record)) {
            *width = (*width).max(cell.chars().count());
        }
    }
    widths
}

fn join_row(cells: &[&str], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| pad(cell, *width))
        .collect::<Vec<_>>()
        .join(SEPARATOR)
        .trim_end()
        .to_string()
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{text}{}", " ".repeat(width.saturating_sub(len)))
}
