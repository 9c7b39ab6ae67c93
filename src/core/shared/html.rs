pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

const BASE_STYLE: &str = "\
body{font-family:system-ui,sans-serif;margin:0;background:#f5f6f8;color:#222}\
header{background:#2c3e50;color:#fff;padding:12px 24px;display:flex;justify-content:space-between;align-items:center}\
header a{color:#fff;margin-left:16px;text-decoration:none}\
main{max-width:1100px;margin:24px auto;padding:0 24px}\
form.card,div.card{background:#fff;border-radius:6px;padding:20px;box-shadow:0 1px 3px rgba(0,0,0,.1)}\
label{display:block;margin-top:12px;font-weight:600}\
input,textarea,select{width:100%;padding:8px;margin-top:4px;box-sizing:border-box}\
button{margin-top:12px;padding:8px 14px;border:0;border-radius:4px;background:#3498db;color:#fff;cursor:pointer}\
button.danger{background:#e74c3c}\
table{width:100%;border-collapse:collapse;background:#fff}\
th,td{padding:8px;border-bottom:1px solid #e1e4e8;text-align:left;vertical-align:top}\
.badge{display:inline-block;padding:2px 8px;border-radius:10px;font-size:12px;background:#bdc3c7}\
.badge-primary{background:#3498db;color:#fff}\
.badge-warning{background:#f39c12;color:#fff}\
.badge-success{background:#27ae60;color:#fff}\
.badge-secondary{background:#7f8c8d;color:#fff}\
.message{margin-top:12px;font-weight:600}\
.history{font-size:13px;color:#555}";

/// Wraps `body` in the shared page chrome.
pub fn render_page(title: &str, nav: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\
        <html lang=\"en\">\
        <head>\
            <meta charset=\"utf-8\">\
            <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
            <title>{title}</title>\
            <style>{style}</style>\
        </head>\
        <body>\
            <header><strong>Helpdesk</strong><nav>{nav}</nav></header>\
            <main>{body}</main>\
        </body>\
        </html>",
        title = html_escape(title),
        style = BASE_STYLE,
        nav = nav,
        body = body,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape("<b>\"Tom\" & 'Jerry'</b>"),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#x27;Jerry&#x27;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_render_page_escapes_title() {
        let page = render_page("<Admin>", "", "<p>ok</p>");
        assert!(page.contains("<title>&lt;Admin&gt;</title>"));
        assert!(page.contains("<main><p>ok</p></main>"));
    }
}
