//! Redirect and error pages.
//!
//! A successful submission is answered with a small HTML page that sends the
//! browser to a `wa.me` deep link three ways: a `meta` refresh, a script
//! navigation, and a visible link. Failures get a page with a fixed message
//! and nothing else.

use crate::{error::Notice, lead::LeadId};
use core::fmt::Write;

/// Default text placed before the `Ref:` line of the prefilled message.
pub const DEFAULT_PROMPT: &str = "Can you send me the full details + latest promo?";

const WHATSAPP_BASE: &str = "https://wa.me/";

const PAGE_STYLE: &str = "body{font-family:system-ui,-apple-system,Segoe UI,Roboto,Arial,sans-serif;padding:24px;}\n        .box{max-width:520px;margin:40px auto;}";

/// Builds the prefilled message for `lead_id`.
pub fn reference_message(prompt: &str, lead_id: &LeadId) -> String {
    format!("{prompt}\nRef: {lead_id}")
}

/// `https://wa.me/<agent_digits>?text=<message>` with the message
/// percent-encoded.
///
/// ```
/// assert_eq!(
///     leadline::whatsapp_link("60143317056", "Hi there!\nRef: 250314-0905-ZX07"),
///     "https://wa.me/60143317056?text=Hi%20there!%0ARef%3A%20250314-0905-ZX07"
/// );
/// ```
pub fn whatsapp_link(agent_digits: &str, message: &str) -> String {
    format!(
        "{WHATSAPP_BASE}{agent_digits}?text={}",
        encode_uri_component(message)
    )
}

/// Percent-encodes everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`, the
/// same set as JavaScript's `encodeURIComponent`. Non-ASCII characters are
/// encoded as their UTF-8 bytes.
pub fn encode_uri_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len() * 3);
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(char::from(byte)),
            _ => {
                let _ = write!(out, "%{byte:02X}");
            }
        }
    }
    out
}

/// Escapes `& < > " '` for use in HTML text and attribute values.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Renders the page that forwards the browser to `url`.
pub fn redirect_page(url: &str) -> String {
    let escaped = escape_html(url);
    // `serde_json` never fails on a `&str`; the fallback keeps the page valid.
    let script_url = serde_json::to_string(url)
        .unwrap_or_else(|_| "\"\"".to_string())
        .replace('<', "\\u003c")
        .replace('>', "\\u003e");
    format!(
        r#"<html>
  <head>
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <meta http-equiv="refresh" content="0;url={escaped}" />
    <style>
        {PAGE_STYLE}
    </style>
  </head>
  <body>
    <div class="box">
      <p>Opening WhatsApp…</p>
      <p>If it doesn’t open, <a href="{escaped}">tap here</a>.</p>
    </div>
    <script>window.location.href = {script_url};</script>
  </body>
</html>"#
    )
}

/// Renders the failure page for `notice`.
pub fn error_page(notice: Notice) -> String {
    let message = escape_html(notice.message());
    format!(
        r#"<html>
  <head>
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <style>
        {PAGE_STYLE}
        .err{{color:#b00020;font-weight:600;}}
    </style>
  </head>
  <body>
    <div class="box">
      <p class="err">{message}</p>
      <p>Please go back and try again.</p>
    </div>
  </body>
</html>"#
    )
}

/// Builds deep links to a fixed agent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResponseBuilder {
    agent_digits: String,
    prompt: String,
}

impl ResponseBuilder {
    pub fn new(agent_digits: impl Into<String>) -> Self {
        Self {
            agent_digits: agent_digits.into(),
            prompt: DEFAULT_PROMPT.to_string(),
        }
    }

    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn agent_digits(&self) -> &str {
        &self.agent_digits
    }

    /// The deep link for `lead_id`.
    pub fn link(&self, lead_id: &LeadId) -> String {
        whatsapp_link(&self.agent_digits, &reference_message(&self.prompt, lead_id))
    }

    /// The redirect page for `lead_id`.
    pub fn success(&self, lead_id: &LeadId) -> String {
        redirect_page(&self.link(lead_id))
    }

    /// The failure page for `notice`.
    pub fn failure(&self, notice: Notice) -> String {
        error_page(notice)
    }
}
