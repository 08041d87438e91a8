use adapt_dash_core::{
    dashboard::{DashboardData, SETUP_STEPS},
    models::COPIED_MESSAGE,
    tester::ManualTester,
};
use std::fmt::Write;

pub const PAGE_TITLE: &str = "Integration Dashboard";
pub const TEST_ACTION_PATH: &str = "/app/dashboard/test";
pub const APP_BRIDGE_SRC: &str = "https://cdn.shopify.com/shopifycloud/app-bridge.js";

const STYLE: &str = r#"
    body { font-family: -apple-system, "Segoe UI", Roboto, sans-serif; background: #f1f1f1; margin: 0; color: #303030; }
    .page { max-width: 1000px; margin: 24px auto; padding: 0 16px; }
    .layout { display: flex; gap: 16px; align-items: flex-start; }
    .primary { flex: 2; display: flex; flex-direction: column; gap: 16px; }
    .one-third { flex: 1; }
    .card { background: #fff; border-radius: 12px; padding: 16px; box-shadow: 0 1px 2px rgba(0,0,0,.15); }
    .card h2 { font-size: 14px; margin: 0 0 12px; }
    .subdued { color: #616161; font-size: 13px; }
    label { display: block; font-size: 13px; margin-top: 12px; }
    .connected { display: flex; gap: 4px; }
    .connected input, .inline input { flex: 1; padding: 6px 8px; }
    .inline { display: flex; gap: 12px; }
    button { padding: 6px 12px; cursor: pointer; border-radius: 8px; border: 1px solid #c9c9c9; background: #fff; }
    button.primary-action { background: #303030; color: #fff; }
    button[disabled] { opacity: .5; cursor: default; }
    button[aria-busy="true"] { cursor: progress; }
    pre { font-size: 11px; margin: 0; padding: 8px; background: #f7f7f7; border-radius: 8px; }
    #toasts { position: fixed; bottom: 24px; left: 50%; transform: translateX(-50%); }
    .toast { background: #303030; color: #fff; padding: 8px 16px; border-radius: 8px; margin-top: 8px; }
    .toast.error { background: #c70a24; }
"#;

const SCRIPT: &str = r#"
(() => {
  const body = document.body;
  const input = document.getElementById('invoice');
  const button = document.getElementById('test-fulfillment');
  let inFlight = 0;

  const toast = (message, isError) => {
    if (window.shopify && window.shopify.toast) {
      window.shopify.toast.show(message, { isError: !!isError });
      return;
    }
    const el = document.createElement('div');
    el.className = isError ? 'toast error' : 'toast';
    el.textContent = message;
    document.getElementById('toasts').appendChild(el);
    setTimeout(() => el.remove(), 5000);
  };

  const setLoading = () => {
    button.setAttribute('aria-busy', inFlight > 0 ? 'true' : 'false');
  };

  input.addEventListener('input', () => {
    button.disabled = input.value === '';
  });

  document.querySelectorAll('[data-copy]').forEach((el) => {
    el.addEventListener('click', async () => {
      await navigator.clipboard.writeText(el.dataset.copy);
      toast(body.dataset.copied, false);
    });
  });

  button.addEventListener('click', async () => {
    const headers = { 'Content-Type': 'application/json' };
    if (window.shopify && window.shopify.idToken) {
      headers['Authorization'] = 'Bearer ' + await window.shopify.idToken();
    }
    inFlight += 1;
    setLoading();
    try {
      const res = await fetch(body.dataset.action + window.location.search, {
        method: 'POST',
        headers,
        body: JSON.stringify({ invoiceNumber: input.value, shop: body.dataset.shop }),
      });
      const reply = await res.json();
      if (reply.notification) {
        toast(reply.notification.message, reply.notification.isError);
      }
    } finally {
      inFlight -= 1;
      setLoading();
    }
  });
})();
"#;

/// Escape for element content.
pub fn escape_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape for double-quoted attribute values.
pub fn escape_attr(raw: &str) -> String {
    escape_text(raw).replace('"', "&quot;").replace('\'', "&#39;")
}

fn render_copy_field(html: &mut String, id: &str, label: &str, value: &str) {
    let value = escape_attr(value);
    writeln!(
        html,
        "<label for=\"{id}\">{}</label><div class=\"connected\"><input id=\"{id}\" type=\"text\" value=\"{value}\" readonly><button type=\"button\" class=\"copy\" data-copy=\"{value}\" aria-label=\"Copy {}\">&#128203;</button></div>",
        escape_text(label),
        escape_attr(label),
    )
    .ok();
}

pub fn render_credentials_card(data: &DashboardData) -> String {
    let mut html = String::new();
    html.push_str("<div class=\"card\" id=\"credentials\"><h2>Webhook Credentials</h2>");
    html.push_str(
        "<p class=\"subdued\">Use these details to connect your external automation systems.</p>",
    );
    render_copy_field(&mut html, "endpoint-url", "Endpoint URL", &data.api_url);
    render_copy_field(&mut html, "secret-key", "Secret Key (X-Adapt-Key)", &data.api_key);
    html.push_str("</div>");
    html
}

pub fn render_tester_card(tester: &ManualTester) -> String {
    let mut html = String::new();
    html.push_str("<div class=\"card\" id=\"tester\"><h2>Manual Fulfillment Tester</h2><div class=\"inline\">");
    writeln!(
        html,
        "<input id=\"invoice\" type=\"text\" placeholder=\"Enter Order Number (e.g. 1012)\" autocomplete=\"off\" value=\"{}\">",
        escape_attr(tester.input())
    )
    .ok();
    writeln!(
        html,
        "<button type=\"button\" id=\"test-fulfillment\" class=\"primary-action\" aria-busy=\"{}\"{}>Test Fulfillment</button>",
        tester.is_loading(),
        if tester.can_submit() { "" } else { " disabled" }
    )
    .ok();
    html.push_str("</div></div>");
    html
}

pub fn render_setup_card(data: &DashboardData) -> String {
    let mut html = String::new();
    html.push_str("<div class=\"card\" id=\"setup\"><h2>Quick Setup</h2><ul>");
    for step in SETUP_STEPS.iter() {
        writeln!(
            html,
            "<li>{}<b>{}</b>{}</li>",
            step.before, step.emphasis, step.after
        )
        .ok();
    }
    html.push_str("</ul><hr>");
    html.push_str("<p class=\"subdued\">Example JSON Body:</p>");
    writeln!(
        html,
        "<pre id=\"example-body\">{}</pre>",
        escape_text(&data.example_body())
    )
    .ok();
    html.push_str("</div>");
    html
}

/// App Bridge has to be the first script on the page; it supplies fresh
/// session tokens and the admin toast.
pub fn render_app_bridge(api_key: &str) -> String {
    format!(
        "<meta name=\"shopify-api-key\" content=\"{}\">\n<script src=\"{APP_BRIDGE_SRC}\"></script>",
        escape_attr(api_key)
    )
}

pub fn dashboard_page(data: &DashboardData, tester: &ManualTester, api_key: Option<&str>) -> String {
    let mut html = String::new();
    writeln!(html, "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">").ok();
    if let Some(api_key) = api_key {
        writeln!(html, "{}", render_app_bridge(api_key)).ok();
    }
    writeln!(
        html,
        "<title>{PAGE_TITLE}</title>\n<style>{STYLE}</style>\n</head>"
    )
    .ok();
    writeln!(
        html,
        "<body data-shop=\"{}\" data-action=\"{TEST_ACTION_PATH}\" data-copied=\"{}\">",
        escape_attr(&data.shop),
        escape_attr(COPIED_MESSAGE)
    )
    .ok();
    writeln!(html, "<main class=\"page\"><h1>{PAGE_TITLE}</h1><div class=\"layout\">").ok();
    html.push_str("<section class=\"primary\">");
    html.push_str(&render_credentials_card(data));
    html.push_str(&render_tester_card(tester));
    html.push_str("</section><aside class=\"one-third\">");
    html.push_str(&render_setup_card(data));
    html.push_str("</aside></div></main>\n<div id=\"toasts\" aria-live=\"polite\"></div>\n");
    writeln!(html, "<script>{SCRIPT}</script>\n</body>\n</html>").ok();
    html
}
