use crate::core::shared::html::{html_escape, render_page};
use crate::tickets::{Ticket, SUGGESTED_STATUSES};

const ADMIN_NAV: &str = "<a href=\"/\">Submit form</a>\
    <a href=\"/admin\">Tickets</a>\
    <a href=\"/admin/plot_titles\">Title chart</a>\
    <a href=\"/admin/export\">Export CSV</a>\
    <a href=\"/admin/login\" id=\"logout-link\" \
       onclick=\"fetch('/admin/logout',{method:'POST'})\
.finally(()=>{window.location.href='/admin/login'});return false;\">Log out</a>";

const LOGIN_SCRIPT: &str = r#"
document.getElementById('login-form').addEventListener('submit', async (event) => {
  event.preventDefault();
  const body = Object.fromEntries(new FormData(event.target).entries());
  const response = await fetch('/admin/login', {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify(body),
  });
  const data = await response.json();
  if (response.ok) {
    window.location.href = '/admin';
  } else {
    document.getElementById('message').textContent = data.message;
  }
});
"#;

const PANEL_SCRIPT: &str = r#"
async function updateStatus(id) {
  const status = document.getElementById('status-' + id).value;
  const response = await fetch('/api/tickets/' + id, {
    method: 'PUT',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify({ status }),
  });
  if (response.ok) { window.location.reload(); } else { alert('Update failed'); }
}
async function deleteTicket(id) {
  if (!confirm('Delete ticket #' + id + '?')) { return; }
  const response = await fetch('/api/tickets/' + id, { method: 'DELETE' });
  if (response.status === 204) { window.location.reload(); } else { alert('Delete failed'); }
}
async function toggleHistory(id) {
  const target = document.getElementById('history-' + id);
  if (target.dataset.loaded === 'true') {
    target.hidden = !target.hidden;
    return;
  }
  const response = await fetch('/api/tickets/' + id + '/history');
  const actions = await response.json();
  target.replaceChildren(...actions.map((a) => {
    const item = document.createElement('li');
    item.textContent = a.action_time + ' [' + a.action_type + '] ' + a.action_description;
    return item;
  }));
  target.dataset.loaded = 'true';
  target.hidden = false;
}
"#;

fn status_badge(status: &str) -> String {
    let class = match status {
        "Open" => "badge badge-primary",
        "In Progress" => "badge badge-warning",
        "Resolved" => "badge badge-success",
        "Closed" => "badge badge-secondary",
        _ => "badge",
    };
    format!("<span class=\"{class}\">{}</span>", html_escape(status))
}

fn status_options(current: &str) -> String {
    let mut options = String::new();
    if !SUGGESTED_STATUSES.contains(&current) {
        let current = html_escape(current);
        options.push_str(&format!("<option value=\"{current}\" selected>{current}</option>"));
    }
    for status in SUGGESTED_STATUSES {
        let selected = if status == current { " selected" } else { "" };
        options.push_str(&format!("<option value=\"{status}\"{selected}>{status}</option>"));
    }
    options
}

fn render_ticket_row(ticket: &Ticket) -> String {
    format!(
        "<tr class=\"ticket-row\" data-id=\"{id}\">\
            <td>#{id}</td>\
            <td><strong>{title}</strong><div class=\"history\">{description}</div></td>\
            <td>{name}</td>\
            <td>{office}</td>\
            <td>{badge}</td>\
            <td>{created}</td>\
            <td>\
                <select id=\"status-{id}\">{options}</select>\
                <button onclick=\"updateStatus({id})\">Update</button>\
                <button class=\"danger\" onclick=\"deleteTicket({id})\">Delete</button>\
                <button onclick=\"toggleHistory({id})\">History</button>\
                <ul id=\"history-{id}\" class=\"history\" hidden></ul>\
            </td>\
        </tr>",
        id = ticket.id,
        title = html_escape(&ticket.title),
        description = html_escape(&ticket.description),
        name = html_escape(&ticket.name),
        office = html_escape(&ticket.office),
        badge = status_badge(&ticket.status),
        created = ticket.created_at.format("%Y-%m-%d %H:%M"),
        options = status_options(&ticket.status),
    )
}

pub fn render_login_page() -> String {
    let body = format!(
        "<h1>Admin login</h1>\
        <form id=\"login-form\" class=\"card\">\
            <label for=\"username\">Username</label>\
            <input id=\"username\" name=\"username\" autocomplete=\"username\" required>\
            <label for=\"password\">Password</label>\
            <input id=\"password\" name=\"password\" type=\"password\" autocomplete=\"current-password\" required>\
            <button type=\"submit\">Log in</button>\
            <div id=\"message\" class=\"message\"></div>\
        </form>\
        <script>{LOGIN_SCRIPT}</script>"
    );
    render_page("Admin login", "<a href=\"/\">Submit form</a>", &body)
}

pub fn render_admin_panel(tickets: &[Ticket]) -> String {
    let rows = if tickets.is_empty() {
        "<tr><td colspan=\"7\">No open tickets.</td></tr>".to_string()
    } else {
        tickets.iter().map(render_ticket_row).collect::<String>()
    };

    let body = format!(
        "<h1>Tickets ({count})</h1>\
        <table>\
            <thead><tr>\
                <th>ID</th><th>Ticket</th><th>Submitted by</th><th>Office</th>\
                <th>Status</th><th>Created (UTC)</th><th>Actions</th>\
            </tr></thead>\
            <tbody>{rows}</tbody>\
        </table>\
        <script>{PANEL_SCRIPT}</script>",
        count = tickets.len(),
    );
    render_page("Admin panel", ADMIN_NAV, &body)
}

pub fn admin_nav() -> &'static str {
    ADMIN_NAV
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ticket(id: i32, title: &str, status: &str) -> Ticket {
        Ticket {
            id,
            title: title.into(),
            description: "No toner".into(),
            status: status.into(),
            name: "Alice".into(),
            office: "3B".into(),
            created_at: NaiveDate::from_ymd_opt(2024, 6, 1)
                .and_then(|d| d.and_hms_opt(9, 30, 0))
                .expect("date"),
            deleted: false,
        }
    }

    #[test]
    fn test_panel_escapes_ticket_fields() {
        let page = render_admin_panel(&[ticket(1, "<script>x</script>", "Open")]);
        assert!(page.contains("&lt;script&gt;x&lt;/script&gt;"));
        assert!(page.contains("Tickets (1)"));
        assert!(page.contains("2024-06-01 09:30"));
    }

    #[test]
    fn test_panel_keeps_custom_status_selectable() {
        let page = render_admin_panel(&[ticket(2, "VPN", "Waiting on vendor")]);
        assert!(page.contains("<option value=\"Waiting on vendor\" selected>"));
        assert!(page.contains("<option value=\"Resolved\">"));
    }

    #[test]
    fn test_empty_panel() {
        let page = render_admin_panel(&[]);
        assert!(page.contains("No open tickets."));
    }

    #[test]
    fn test_nav_logs_out_with_post_and_returns_to_login() {
        let nav = admin_nav();
        assert!(nav.contains("href=\"/admin/login\" id=\"logout-link\""));
        assert!(nav.contains("fetch('/admin/logout',{method:'POST'})"));
        assert!(nav.contains("window.location.href='/admin/login'"));
        assert!(!nav.contains("href=\"/admin/logout\""));
    }

    #[test]
    fn test_status_badge_classes() {
        assert!(status_badge("Resolved").contains("badge-success"));
        assert_eq!(status_badge("Odd"), "<span class=\"badge\">Odd</span>");
    }
}
