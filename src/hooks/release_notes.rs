// ABOUTME: Parses the free-text release notes a hook returns.
// ABOUTME: Lines prefixed +, - and * become additions, removals and fixes.

use serde::Serialize;
use std::fmt::Write;

/// Release notes split into their three categories, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReleaseNotes {
    pub additions: Vec<String>,
    pub removals: Vec<String>,
    pub fixes: Vec<String>,
}

impl ReleaseNotes {
    /// Unprefixed and empty lines are ignored.
    pub fn parse(text: &str) -> Self {
        let mut notes = Self::default();
        for line in text.lines() {
            let line = line.trim_end_matches('\r');
            if let Some(rest) = line.strip_prefix('+') {
                notes.additions.push(clean(rest, '+'));
            } else if let Some(rest) = line.strip_prefix('-') {
                notes.removals.push(clean(rest, '-'));
            } else if let Some(rest) = line.strip_prefix('*') {
                notes.fixes.push(clean(rest, '*'));
            }
        }
        notes
    }

    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.removals.is_empty() && self.fixes.is_empty()
    }

    /// Render the non-empty categories as labelled HTML bullet lists, the
    /// markup the deployment report embeds. No notes render as `""`.
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        for (label, items) in self.sections() {
            let _ = writeln!(
                html,
                "<div style='font-size:90%;font-weight:bold'>{label}</div>"
            );
            html.push_str("<ul style='font-size:85%'>\n");
            for item in items {
                let _ = writeln!(html, "<li>{}</li>", escape_html(item));
            }
            html.push_str("</ul>\n");
        }
        html
    }

    /// Plain text rendering for the console.
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for (label, items) in self.sections() {
            let _ = writeln!(text, "{label}:");
            for item in items {
                let _ = writeln!(text, "  - {item}");
            }
        }
        text
    }

    fn sections(&self) -> impl Iterator<Item = (&'static str, &[String])> {
        [
            ("Added features", self.additions.as_slice()),
            ("Removed features", self.removals.as_slice()),
            ("Fixes", self.fixes.as_slice()),
        ]
        .into_iter()
        .filter(|(_, items)| !items.is_empty())
    }
}

fn clean(rest: &str, marker: char) -> String {
    rest.trim_start_matches(marker).trim().to_string()
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
