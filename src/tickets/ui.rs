use axum::{response::Html, routing::get, Router};
use std::sync::Arc;

use crate::core::shared::html::render_page;
use crate::core::shared::state::AppState;

const SUBMIT_SCRIPT: &str = r#"
document.getElementById('ticket-form').addEventListener('submit', async (event) => {
  event.preventDefault();
  const form = event.target;
  const body = Object.fromEntries(new FormData(form).entries());
  const message = document.getElementById('message');
  const response = await fetch('/api/tickets', {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify(body),
  });
  const data = await response.json();
  if (response.status === 201) {
    message.textContent = 'Ticket #' + data.id + ' submitted. Status: ' + data.status + '.';
    form.reset();
  } else {
    message.textContent = data.error || 'Could not submit ticket.';
  }
});
"#;

pub async fn index() -> Html<String> {
    let body = format!(
        "<h1>Submit a support ticket</h1>\
        <form id=\"ticket-form\" class=\"card\">\
            <label for=\"title\">Title</label>\
            <input id=\"title\" name=\"title\" required maxlength=\"200\">\
            <label for=\"description\">Description</label>\
            <textarea id=\"description\" name=\"description\" rows=\"5\" required></textarea>\
            <label for=\"name\">Your name</label>\
            <input id=\"name\" name=\"name\" required>\
            <label for=\"office\">Office</label>\
            <input id=\"office\" name=\"office\" required>\
            <button type=\"submit\">Submit ticket</button>\
            <div id=\"message\" class=\"message\"></div>\
        </form>\
        <script>{SUBMIT_SCRIPT}</script>"
    );

    Html(render_page(
        "Submit a ticket",
        "<a href=\"/admin\">Admin</a>",
        &body,
    ))
}

pub fn configure_tickets_ui_routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(index))
}
