//! Page-side scripts evaluated in the webview

use crate::config::{FALLBACK_FILENAME_EXTENSION, FALLBACK_FILENAME_PREFIX};
use crate::host::ToastLength;

/// Key of the per-document install marker.
pub const INSTALL_MARKER: &str = "wallapp.download-interceptor";

/// Render the download interception script for `asset_host`.
///
/// The install marker is a non-enumerable symbol property on `document`, so a
/// fresh document (every navigation) gets exactly one install and re-evaluating
/// on the same document does nothing.
pub fn interceptor_script(asset_host: &str) -> String {
    let host = js_string(asset_host);
    let marker = js_string(INSTALL_MARKER);
    let prefix = js_string(FALLBACK_FILENAME_PREFIX);
    let extension = js_string(FALLBACK_FILENAME_EXTENSION);

    format!(
        r#"(function () {{
  const marker = Symbol.for({marker});
  if (document[marker]) return;
  Object.defineProperty(document, marker, {{ value: true }});

  const assetHost = {host};
  function resolve(raw) {{
    if (raw === null || raw === undefined) return null;
    try {{ return new URL(String(raw), document.baseURI); }} catch (_) {{ return null; }}
  }}
  function trusted(url) {{
    if (!url || (url.protocol !== 'https:' && url.protocol !== 'http:')) return false;
    const h = url.hostname.toLowerCase();
    return h === assetHost || h.endsWith('.' + assetHost);
  }}
  function fallbackName() {{ return {prefix} + Date.now() + {extension}; }}
  function bridge() {{
    const internals = window.__TAURI_INTERNALS__;
    return internals && typeof internals.invoke === 'function' ? internals : null;
  }}
  function forward(url, filename) {{
    const b = bridge();
    if (!b) return false;
    b.invoke('download_image', {{ url: url, filename: filename }});
    return true;
  }}

  const originalOpen = window.open;
  window.open = function (url, target, features) {{
    const resolved = url ? resolve(url) : null;
    if (trusted(resolved) && forward(resolved.href, fallbackName())) return null;
    return originalOpen.call(window, url, target, features);
  }};

  document.addEventListener('click', function (event) {{
    let node = event.target;
    while (node && String(node.nodeName).toUpperCase() !== 'A') node = node.parentElement;
    if (!node || !node.hasAttribute('download')) return;
    const href = resolve(node.getAttribute('href'));
    if (!trusted(href)) return;
    if (!forward(href.href, node.getAttribute('download') || fallbackName())) return;
    event.preventDefault();
    event.stopPropagation();
  }}, true);

  function hasHistory() {{
    const nav = window.navigation;
    if (nav && typeof nav.canGoBack === 'boolean') return nav.canGoBack;
    return history.length > 1;
  }}
  document.addEventListener('keydown', function (event) {{
    const back = event.key === 'BrowserBack' || (event.altKey && event.key === 'ArrowLeft');
    if (!back) return;
    if (hasHistory()) {{
      event.preventDefault();
      history.back();
      return;
    }}
    const b = bridge();
    if (!b) return;
    event.preventDefault();
    b.invoke('navigate_back');
  }}, true);
}})();"#
    )
}

/// A transient message overlaid on the page, removed after `length`.
pub fn toast_script(message: &str, length: ToastLength) -> String {
    let text = js_string(message);
    let millis = length.millis();
    format!(
        r#"(function () {{
  const el = document.createElement('div');
  el.textContent = {text};
  el.setAttribute('role', 'status');
  el.style.cssText = 'position:fixed;left:50%;bottom:48px;transform:translateX(-50%);' +
    'max-width:80%;padding:10px 18px;border-radius:20px;background:rgba(32,32,32,0.9);' +
    'color:#fff;font:14px sans-serif;z-index:2147483647;pointer-events:none;';
  (document.body || document.documentElement).appendChild(el);
  setTimeout(function () {{ el.remove(); }}, {millis});
}})();"#
    )
}

fn js_string(value: &str) -> String {
    // JSON string literals are valid JS literals.
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use boa_engine::{Context, Source};
    use serde_json::Value;

    /// Just enough DOM for the interceptor: elements with attributes and
    /// parents, listener registration, `history`, `window.open` and the
    /// Tauri invoke bridge. `report()` serializes what the page did.
    const PAGE: &str = r#"
var invoked = [];
var opened = [];
var backs = 0;
var listeners = [];
function URL(raw, base) {
  var m = /^([a-zA-Z][a-zA-Z0-9+.-]*:)(\/\/([^\/?#]*))?(.*)$/.exec(raw);
  if (!m) {
    if (base === undefined) throw new TypeError('Invalid URL: ' + raw);
    var b = new URL(base);
    var path = raw.charAt(0) === '/' ? raw : b.pathname.replace(/[^\/]*$/, '') + raw;
    return new URL(b.protocol + '//' + b.host + path);
  }
  this.protocol = m[1].toLowerCase();
  this.host = m[3] || '';
  this.hostname = this.host.split(':')[0];
  this.pathname = m[4] || '/';
  this.href = raw;
}
function el(nodeName, attrs, parent) {
  return {
    nodeName: nodeName,
    parentElement: parent || null,
    attrs: attrs || {},
    hasAttribute: function (n) { return Object.prototype.hasOwnProperty.call(this.attrs, n); },
    getAttribute: function (n) { return this.hasAttribute(n) ? this.attrs[n] : null; }
  };
}
var document = {
  baseURI: 'https://debwallapp.pages.dev/gallery/',
  addEventListener: function (type, fn, capture) {
    listeners.push({ type: type, fn: fn, capture: capture });
  }
};
var history = { length: 1, back: function () { backs += 1; } };
var window = {
  history: history,
  open: function (url) { opened.push(url); return 'popup'; },
  __TAURI_INTERNALS__: {
    invoke: function (cmd, args) { invoked.push({ cmd: cmd, args: args || null }); }
  }
};
function fire(type, init) {
  var event = {
    defaultPrevented: false,
    propagationStopped: false,
    preventDefault: function () { this.defaultPrevented = true; },
    stopPropagation: function () { this.propagationStopped = true; }
  };
  for (var key in init) event[key] = init[key];
  listeners.forEach(function (l) { if (l.type === type) l.fn(event); });
  return event;
}
function report(result) {
  return JSON.stringify({
    invoked: invoked,
    opened: opened,
    backs: backs,
    listeners: listeners.map(function (l) { return l.type + (l.capture ? ':capture' : ''); }),
    result: result === undefined ? null : result
  });
}
var IMAGE = 'https://res.cloudinary.com/demo/image/upload/v1/sunset.jpg';
"#;

    /// Install the interceptor `installs` times into a fresh page, run
    /// `scenario` and return its `report()`.
    fn run_in_page(installs: usize, scenario: &str) -> Value {
        let script = interceptor_script("res.cloudinary.com");
        let mut source = String::from(PAGE);
        for _ in 0..installs {
            source.push_str(&script);
            source.push('\n');
        }
        source.push_str(scenario);

        let mut context = Context::default();
        let value = context.eval(Source::from_bytes(&source)).unwrap();
        let json = value.to_string(&mut context).unwrap().to_std_string_escaped();
        serde_json::from_str(&json).unwrap()
    }

    fn download_calls(page: &Value) -> Vec<&Value> {
        page["invoked"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|call| call["cmd"] == "download_image")
            .collect()
    }

    #[test]
    fn second_install_on_the_same_document_is_a_no_op() {
        let page = run_in_page(
            2,
            r#"
            fire('click', { target: el('A', { download: 'sunset.jpg', href: IMAGE }) });
            report();
            "#,
        );
        assert_eq!(
            page["listeners"],
            serde_json::json!(["click:capture", "keydown:capture"])
        );
        assert_eq!(download_calls(&page).len(), 1);
    }

    #[test]
    fn nested_click_in_download_anchor_calls_bridge_once() {
        let page = run_in_page(
            1,
            r#"
            var anchor = el('A', { download: 'sunset.jpg', href: IMAGE });
            var target = el('SPAN', {}, el('DIV', {}, anchor));
            var event = fire('click', { target: target });
            report({ prevented: event.defaultPrevented, stopped: event.propagationStopped });
            "#,
        );
        let calls = download_calls(&page);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0]["args"]["url"], IMAGE_URL);
        assert_eq!(calls[0]["args"]["filename"], "sunset.jpg");
        assert_eq!(page["result"]["prevented"], true);
        assert_eq!(page["result"]["stopped"], true);
    }

    #[test]
    fn anchor_without_download_attribute_is_left_alone() {
        let page = run_in_page(
            1,
            r#"
            var event = fire('click', { target: el('IMG', {}, el('A', { href: IMAGE })) });
            report(event.defaultPrevented);
            "#,
        );
        assert!(download_calls(&page).is_empty());
        assert_eq!(page["result"], false);
    }

    #[test]
    fn empty_download_attribute_gets_timestamped_name() {
        let page = run_in_page(
            1,
            r#"
            fire('click', { target: el('A', { download: '', href: IMAGE }) });
            report();
            "#,
        );
        let calls = download_calls(&page);
        assert_eq!(calls.len(), 1);
        let name = calls[0]["args"]["filename"].as_str().unwrap();
        assert!(name.starts_with("wallpaper_") && name.ends_with(".jpg"), "{name}");
        assert!(name["wallpaper_".len()..name.len() - 4].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn lowercase_svg_anchor_is_intercepted() {
        let page = run_in_page(
            1,
            r#"
            fire('click', { target: el('image', {}, el('a', { download: 'x.jpg', href: IMAGE })) });
            report();
            "#,
        );
        assert_eq!(download_calls(&page).len(), 1);
    }

    #[test]
    fn foreign_hosts_and_missing_hrefs_pass_through() {
        let page = run_in_page(
            1,
            r#"
            var a = fire('click', { target: el('A', { download: 'x.jpg', href: 'https://example.com/x.jpg' }) });
            var b = fire('click', { target: el('A', { download: 'x.jpg', href: 'https://res.cloudinary.com.evil.net/x.jpg' }) });
            var c = fire('click', { target: el('A', { download: 'x.jpg' }) });
            var d = fire('click', { target: el('A', { download: 'x.jpg', href: 'pics/x.jpg' }) });
            var e = fire('click', { target: el('BUTTON', {}, el('BODY')) });
            report([a, b, c, d, e].map(function (ev) { return ev.defaultPrevented; }));
            "#,
        );
        assert!(download_calls(&page).is_empty());
        assert_eq!(page["result"], serde_json::json!([false, false, false, false, false]));
    }

    #[test]
    fn subdomain_of_asset_host_is_trusted() {
        let page = run_in_page(
            1,
            r#"
            fire('click', { target: el('A', { download: 'x.jpg', href: 'https://images.res.cloudinary.com/x.jpg' }) });
            report();
            "#,
        );
        assert_eq!(download_calls(&page).len(), 1);
    }

    #[test]
    fn missing_bridge_keeps_default_behaviour() {
        let page = run_in_page(
            1,
            r#"
            window.__TAURI_INTERNALS__ = undefined;
            var event = fire('click', { target: el('A', { download: 'x.jpg', href: IMAGE }) });
            var popup = window.open(IMAGE);
            report({ prevented: event.defaultPrevented, popup: popup });
            "#,
        );
        assert_eq!(page["result"]["prevented"], false);
        assert_eq!(page["result"]["popup"], "popup");
        assert_eq!(page["opened"], serde_json::json!([IMAGE_URL]));
    }

    #[test]
    fn popups_to_asset_host_become_downloads() {
        let page = run_in_page(
            1,
            r#"
            var asset = window.open(IMAGE, '_blank');
            var other = window.open('https://instagram.com/wallapp', '_blank');
            report({ asset: asset, other: other });
            "#,
        );
        let calls = download_calls(&page);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0]["args"]["url"], IMAGE_URL);
        assert_eq!(page["result"]["asset"], Value::Null);
        assert_eq!(page["result"]["other"], "popup");
        assert_eq!(page["opened"], serde_json::json!(["https://instagram.com/wallapp"]));
    }

    #[test]
    fn back_key_pops_in_page_history_first() {
        // in-app routes such as #/wallpaper/42 never reach a page-load event
        let page = run_in_page(
            1,
            r#"
            window.navigation = { canGoBack: true };
            var event = fire('keydown', { key: 'BrowserBack' });
            report(event.defaultPrevented);
            "#,
        );
        assert_eq!(page["backs"], 1);
        assert_eq!(page["invoked"], serde_json::json!([]));
        assert_eq!(page["result"], true);
    }

    #[test]
    fn back_key_without_history_asks_native_to_close() {
        let page = run_in_page(
            1,
            r#"
            window.navigation = { canGoBack: false };
            fire('keydown', { key: 'ArrowLeft', altKey: true });
            fire('keydown', { key: 'ArrowLeft', altKey: false });
            report();
            "#,
        );
        assert_eq!(page["backs"], 0);
        assert_eq!(
            page["invoked"],
            serde_json::json!([{ "cmd": "navigate_back", "args": null }])
        );
    }

    #[test]
    fn back_key_falls_back_to_history_length() {
        let page = run_in_page(
            1,
            r#"
            history.length = 3;
            fire('keydown', { key: 'BrowserBack' });
            report();
            "#,
        );
        assert_eq!(page["backs"], 1);
        assert_eq!(page["invoked"], serde_json::json!([]));
    }

    const IMAGE_URL: &str = "https://res.cloudinary.com/demo/image/upload/v1/sunset.jpg";

    #[test]
    fn interceptor_embeds_host_and_marker() {
        let script = interceptor_script("res.cloudinary.com");
        assert!(script.contains(r#"const assetHost = "res.cloudinary.com";"#));
        assert!(script.contains(r#"Symbol.for("wallapp.download-interceptor")"#));
        assert!(script.contains(r#""wallpaper_" + Date.now() + ".jpg""#));
    }

    #[test]
    fn toast_escapes_message() {
        let script = toast_script("Download failed: \"quote\" </script>", ToastLength::Long);
        assert!(script.contains(r#"el.textContent = "Download failed: \"quote\" </script>";"#));
        assert!(script.contains("}, 3500);"));
    }
}
