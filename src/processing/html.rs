//! Small HTML splicing helpers for debug banners and panels.

use crate::stats::StatsSnapshot;

/// Escape text for inclusion in HTML.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Insert `snippet` right after the opening `<body ...>` tag, or prepend it.
pub fn insert_after_body_open(html: &str, snippet: &str) -> String {
    let lower = html.to_ascii_lowercase();
    let insert_at = lower
        .find("<body")
        .and_then(|start| lower[start..].find('>').map(|end| start + end + 1));
    match insert_at {
        Some(at) => format!("{}{}{}", &html[..at], snippet, &html[at..]),
        None => format!("{}{}", snippet, html),
    }
}

/// Insert `snippet` before the last `</body>`, or append it.
pub fn insert_before_body_close(html: &str, snippet: &str) -> String {
    match html.to_ascii_lowercase().rfind("</body>") {
        Some(at) => format!("{}{}{}", &html[..at], snippet, &html[at..]),
        None => format!("{}{}", html, snippet),
    }
}

pub fn debug_banner(mode: &str, cache_key: &str, outcome: &str) -> String {
    format!(
        concat!(
            "<div id=\"intercept-debug-banner\" style=\"background:#222;color:#0f0;",
            "font:12px monospace;padding:4px 8px\">",
            "debug | mode: {} | cache key: {} | {}</div>"
        ),
        escape(mode),
        escape(cache_key),
        escape(outcome)
    )
}

pub fn stats_panel(stats: &StatsSnapshot) -> String {
    let s = &stats.stats;
    let rows = [
        ("requests", s.total_requests.to_string()),
        ("responses", s.total_responses.to_string()),
        ("bytes processed", s.total_bytes_processed.to_string()),
        ("content modifications", s.content_modifications.to_string()),
        ("cache hits", s.cache_hits.to_string()),
        ("cache misses", s.cache_misses.to_string()),
        ("hit rate", format!("{:.1}%", stats.hit_rate * 100.0)),
        ("pages cached", s.total_pages_cached.to_string()),
        (
            "time saved",
            format!("{:.1}s", stats.estimated_time_saved_seconds),
        ),
    ];
    panel("intercept-stats-panel", "Intercept stats", &rows)
}

pub fn info_panel(url: &str, cache_key: &str, mode: &str, content_type: &str) -> String {
    let rows = [
        ("url", url.to_string()),
        ("cache key", cache_key.to_string()),
        ("mode", mode.to_string()),
        ("content type", content_type.to_string()),
    ];
    panel("intercept-info-panel", "Intercept info", &rows)
}

fn panel(id: &str, title: &str, rows: &[(&str, String)]) -> String {
    let body: String = rows
        .iter()
        .map(|(k, v)| format!("<tr><td>{}</td><td>{}</td></tr>", escape(k), escape(v)))
        .collect();
    format!(
        concat!(
            "<div id=\"{}\" style=\"position:fixed;bottom:0;right:0;background:#fff;",
            "border:1px solid #999;font:12px monospace;padding:6px;z-index:99999\">",
            "<strong>{}</strong><table>{}</table></div>"
        ),
        id,
        escape(title),
        body
    )
}
