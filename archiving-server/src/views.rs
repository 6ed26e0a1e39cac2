//! Server-rendered pages.
//!
//! Every value interpolated into markup goes through [`escape`].

use opentok_client::Archive;

use crate::services::ArchivePage;

const OPENTOK_JS: &str = "https://static.opentok.com/v2/js/opentok.min.js";

/// Escape text for use in HTML content and double-quoted attributes
pub fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn layout(title: &str, body: &str, scripts: &[&str]) -> String {
    let scripts: String = scripts
        .iter()
        .map(|src| format!("    <script src=\"{}\"></script>\n", escape(src)))
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <title>{title} | Archiving Sample</title>
    <link rel="stylesheet" href="/css/sample.css">
  </head>
  <body>
    <header class="banner">
      <a href="/">Archiving Sample</a>
      <nav><a href="/host-view">Host</a> <a href="/participant-view">Participant</a> <a href="/past-archives">Past Archives</a></nav>
    </header>
    <main>
{body}
    </main>
{scripts}  </body>
</html>
"#,
        title = escape(title),
        body = body,
        scripts = scripts,
    )
}

pub fn index() -> String {
    let body = r#"      <h1>Archiving Sample</h1>
      <p>Record a live session in the cloud and manage the recordings afterwards.</p>
      <ul class="choices">
        <li><a href="/host-view">Host view</a>: publish, and start or stop the recording.</li>
        <li><a href="/participant-view">Participant view</a>: join the same session.</li>
        <li><a href="/past-archives">Past archives</a>: download or delete finished recordings.</li>
      </ul>"#;
    layout("Home", body, &[])
}

fn session_config(api_key: &str, session_id: &str, token: &str) -> String {
    format!(
        r#"      <div id="session-config" data-api-key="{}" data-session-id="{}" data-token="{}"></div>"#,
        escape(api_key),
        escape(session_id),
        escape(token),
    )
}

pub fn host_view(api_key: &str, session_id: &str, token: &str) -> String {
    let body = format!(
        r#"      <h1>Host</h1>
{config}
      <div id="videos">
        <div id="publisher"></div>
        <div id="subscribers"></div>
      </div>
      <div class="controls">
        <span id="recording" class="hidden">Recording</span>
        <button id="start" type="button" class="hidden">Start Archiving</button>
        <button id="stop" type="button" class="hidden">Stop Archiving</button>
        <a id="view" class="hidden" href="/past-archives">View Archive</a>
      </div>
      <p id="archive-error" class="error hidden"></p>"#,
        config = session_config(api_key, session_id, token),
    );
    layout("Host", &body, &[OPENTOK_JS, "/js/host.js"])
}

pub fn participant_view(api_key: &str, session_id: &str, token: &str) -> String {
    let body = format!(
        r#"      <h1>Participant</h1>
{config}
      <div id="videos">
        <div id="publisher"></div>
        <div id="subscribers"></div>
      </div>
      <span id="recording" class="hidden">Recording</span>"#,
        config = session_config(api_key, session_id, token),
    );
    layout("Participant", &body, &[OPENTOK_JS, "/js/participant.js"])
}

fn archive_row(archive: &Archive) -> String {
    let label = archive
        .name
        .as_deref()
        .filter(|name| !name.is_empty())
        .unwrap_or("Untitled");

    let name = if archive.is_downloadable() {
        format!(
            r#"<a href="download-archive?id={}">{}</a>"#,
            escape(&archive.id),
            escape(label)
        )
    } else {
        escape(label)
    };

    let created = archive
        .created_at_utc()
        .map(|at| at.format("%B %e, %Y at %I:%M %p").to_string())
        .unwrap_or_default();

    let delete = if archive.is_downloadable() {
        format!(
            r#"<a href="delete-archive/{}">Delete</a>"#,
            escape(&archive.id)
        )
    } else {
        String::new()
    };

    format!(
        "          <tr><td>{}</td><td>{}</td><td>{} seconds</td><td>{}</td><td>{}</td></tr>\n",
        name,
        escape(&created),
        archive.duration,
        escape(archive.status.as_str()),
        delete
    )
}

pub fn past_archives(page: &ArchivePage) -> String {
    let rows: String = if page.archives.is_empty() {
        "          <tr><td colspan=\"5\">There are no archives.</td></tr>\n".to_string()
    } else {
        page.archives.iter().map(archive_row).collect()
    };

    let previous = page
        .links
        .previous
        .as_deref()
        .map(|href| format!(r#"<a class="previous" href="{}">&larr; Previous</a>"#, escape(href)))
        .unwrap_or_default();
    let next = page
        .links
        .next
        .as_deref()
        .map(|href| format!(r#"<a class="next" href="{}">Next &rarr;</a>"#, escape(href)))
        .unwrap_or_default();

    let body = format!(
        r#"      <h1>Past Archives</h1>
      <table class="archives">
        <thead>
          <tr><th>Name</th><th>Created</th><th>Duration</th><th>Status</th><th></th></tr>
        </thead>
        <tbody>
{rows}        </tbody>
      </table>
      <div class="pager">{previous} {next}</div>"#,
        rows = rows,
        previous = previous,
        next = next,
    );
    layout("Past Archives", &body, &[])
}
