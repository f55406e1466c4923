//! Page rendering from a [`ViewModel`].

use crate::dom::{self, Elements, escape_html};
use ss_api_types::TxStatus;
use ss_dapp_core::{HistoryRow, ViewModel};
use wasm_bindgen::JsCast;

pub fn render(els: &Elements, view: &ViewModel) {
    els.connect_btn.set_text_content(Some(view.connect_label));
    dom::toggle_class(els.connect_btn.unchecked_ref(), "connected", view.connected);

    let account = view.account.as_deref().map(shorten).unwrap_or_default();
    dom::set_text(&els.account_label, &account);

    els.submit_btn.set_disabled(!view.can_submit());
    els.current_value_btn.set_disabled(!view.connected);

    match &view.error_message {
        Some(message) => {
            dom::set_text(els.error_box.unchecked_ref(), message);
            dom::set_hidden(&els.error_box, false);
        }
        None => {
            dom::set_text(els.error_box.unchecked_ref(), "");
            dom::set_hidden(&els.error_box, true);
        }
    }

    dom::set_inner_html(&els.history_body, &history_html(&view.rows));
}

pub fn history_html(rows: &[HistoryRow]) -> String {
    if rows.is_empty() {
        return r#"<tr class="history-empty"><td colspan="4">No transactions yet.</td></tr>"#.to_string();
    }
    rows.iter().map(row_html).collect()
}

fn row_html(row: &HistoryRow) -> String {
    let index = row.index;
    let value_cell = match &row.draft {
        Some(draft) => format!(
            r#"<input class="history-draft" type="text" data-draft data-index="{index}" value="{}">"#,
            escape_html(draft)
        ),
        None => escape_html(&row.input_value),
    };
    let actions = if row.editing {
        format!(
            r#"<button class="primary" data-action="save" data-index="{index}">Save</button>
            <button class="secondary" data-action="cancel" data-index="{index}">Cancel</button>"#
        )
    } else {
        format!(
            r#"<button class="secondary" data-action="edit" data-index="{index}">Edit</button>
            <button class="danger" data-action="delete" data-index="{index}">Delete</button>"#
        )
    };

    format!(
        r#"<tr class="history-row">
          <td>{}</td>
          <td>{value_cell}</td>
          <td><span class="status {}">{}</span></td>
          <td class="history-actions">{actions}</td>
        </tr>"#,
        index + 1,
        status_class(row.status),
        row.status,
    )
}

fn status_class(status: TxStatus) -> &'static str {
    match status {
        TxStatus::Pending => "status--pending",
        TxStatus::Completed => "status--completed",
        TxStatus::Error => "status--error",
    }
}

/// `0x1234…abcd` form for the header.
pub fn shorten(address: &str) -> String {
    if address.len() <= 12 || !address.is_ascii() {
        return address.to_string();
    }
    format!("{}…{}", &address[..6], &address[address.len() - 4..])
}
