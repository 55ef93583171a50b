//! Page scripts run inside the session window.
//!
//! Every script is a self-invoking function applied to a JSON plan:
//! `(function(plan) { ... })(<plan json>);`. The plan carries all
//! caller-controlled data, so no value is ever spliced into script source.

use kiosk_config::{CompletionConfig, InjectionConfig};
use kiosk_protocols::SessionRequest;
use serde::{Deserialize, Serialize};

/// Page binding through which exit gestures reach the host.
pub const EXIT_BINDING: &str = "__kioskExit";

/// Binding payload sent when the exit key is pressed.
pub const EXIT_KEY_PAYLOAD: &str = "escape";

/// Binding payload sent when a hooked exit control is actuated.
pub const EXIT_CONTROL_PAYLOAD: &str = "exit-control";

/// Attribute set on exit controls once their click hook is attached.
pub const HOOKED_ATTRIBUTE: &str = "data-kiosk-exit-hooked";

/// One field the injector looks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedField {
    pub key: String,
    pub selector: String,
    pub required: bool,
    pub readonly: bool,
    /// Value to write; `None` leaves the field untouched.
    pub value: Option<String>,
}

/// Data driving the probe and fill scripts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectionPlan {
    pub fields: Vec<PlannedField>,
    /// Consent checkbox selector.
    pub checkbox: Option<String>,
}

impl InjectionPlan {
    /// Combine the field configuration with one request's prefill data.
    ///
    /// Fields whose prefill value is missing or empty are still probed (when
    /// required) but never written.
    pub fn new(config: &InjectionConfig, request: &SessionRequest) -> Self {
        let fields = config
            .fields
            .iter()
            .map(|field| PlannedField {
                key: field.key.clone(),
                selector: field.selector.clone(),
                required: field.required,
                readonly: field.readonly,
                value: request.value(&field.key).map(str::to_string),
            })
            .collect();

        let checkbox = config
            .checkbox_selector
            .clone()
            .filter(|selector| !selector.trim().is_empty());

        Self { fields, checkbox }
    }

    /// Keys of the fields that will be written.
    pub fn writable_keys(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.value.is_some())
            .map(|f| f.key.as_str())
            .collect()
    }
}

/// Data driving the completion watcher script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatcherPlan {
    pub binding: String,
    pub exit_key: String,
    /// Lower-cased, trimmed control texts.
    pub phrases: Vec<String>,
    pub hooked_attribute: String,
    pub key_payload: String,
    pub control_payload: String,
}

impl WatcherPlan {
    pub fn new(config: &CompletionConfig) -> Self {
        Self {
            binding: EXIT_BINDING.to_string(),
            exit_key: config.exit_key.clone(),
            phrases: config
                .exit_phrases
                .iter()
                .map(|p| p.trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
            hooked_attribute: HOOKED_ATTRIBUTE.to_string(),
            key_payload: EXIT_KEY_PAYLOAD.to_string(),
            control_payload: EXIT_CONTROL_PAYLOAD.to_string(),
        }
    }
}

const PROBE_BODY: &str = r#"
  var missing = plan.fields
    .filter(function (f) { return f.required && !document.querySelector(f.selector); })
    .map(function (f) { return f.key; });
  return { ready: missing.length === 0, missing: missing };
"#;

const FILL_BODY: &str = r#"
  function setNativeValue(el, value) {
    var proto = Object.getPrototypeOf(el);
    var desc = proto && Object.getOwnPropertyDescriptor(proto, 'value');
    if (desc && desc.set) {
      desc.set.call(el, value);
    } else {
      el.value = value;
    }
  }
  var report = { filled: [], events: 0, checkbox: false };
  plan.fields.forEach(function (f) {
    if (f.value === null || f.value === '') return;
    var el = document.querySelector(f.selector);
    if (!el) return;
    if (f.readonly) {
      el.removeAttribute('readonly');
      el.readOnly = false;
    }
    setNativeValue(el, f.value);
    ['input', 'change', 'blur'].forEach(function (type) {
      el.dispatchEvent(new Event(type, { bubbles: true }));
      report.events += 1;
    });
    report.filled.push(f.key);
  });
  if (plan.checkbox) {
    var box = document.querySelector(plan.checkbox);
    if (box && !box.checked) {
      box.click();
      report.checkbox = true;
    }
  }
  return report;
"#;

const WATCHER_BODY: &str = r#"
  if (window.__kioskWatcher) return;
  var notified = false;
  function notify(reason) {
    var fn = window[plan.binding];
    if (notified || typeof fn !== 'function') return;
    notified = true;
    fn(reason);
  }
  document.addEventListener('keydown', function (e) {
    if (plan.exitKey && e.key === plan.exitKey) notify(plan.keyPayload);
  }, true);
  function hook(root) {
    if (!plan.phrases.length || !root || !root.querySelectorAll) return;
    root.querySelectorAll('button, a, [role="button"]').forEach(function (el) {
      if (el.hasAttribute(plan.hookedAttribute)) return;
      var text = (el.innerText || el.textContent || '').trim().toLowerCase();
      if (plan.phrases.indexOf(text) === -1) return;
      el.setAttribute(plan.hookedAttribute, 'true');
      el.addEventListener('click', function () { notify(plan.controlPayload); }, true);
    });
  }
  var observer = new MutationObserver(function () { hook(document); });
  function start() {
    hook(document);
    observer.observe(document.documentElement || document, {
      childList: true,
      subtree: true,
      characterData: true
    });
  }
  if (document.readyState === 'loading') {
    document.addEventListener('DOMContentLoaded', start);
  } else {
    start();
  }
  window.__kioskWatcher = { disconnect: function () { observer.disconnect(); } };
"#;

/// Stops the exit-control observer in the current document.
pub const WATCHER_TEARDOWN: &str =
    "(function () { if (window.__kioskWatcher) { window.__kioskWatcher.disconnect(); } return true; })();";

fn wrap<T: Serialize>(body: &str, plan: &T) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(plan)?;
    let mut script = String::with_capacity(body.len() + json.len() + 32);
    script.push_str("(function (plan) {");
    script.push_str(body);
    script.push_str("})(");
    script.push_str(&json);
    script.push_str(");");
    Ok(script)
}

/// Reports `{ready, missing}`: whether every required field is present.
pub fn probe_script(plan: &InjectionPlan) -> Result<String, serde_json::Error> {
    wrap(PROBE_BODY, plan)
}

/// Writes the planned values and ticks the checkbox; reports
/// `{filled, events, checkbox}`.
pub fn fill_script(plan: &InjectionPlan) -> Result<String, serde_json::Error> {
    wrap(FILL_BODY, plan)
}

/// Installs the exit-key listener and exit-control observer.
pub fn watcher_script(plan: &WatcherPlan) -> Result<String, serde_json::Error> {
    wrap(WATCHER_BODY, plan)
}

/// Extract the plan JSON from a generated script.
#[cfg(test)]
pub(crate) fn embedded_plan<T: serde::de::DeserializeOwned>(script: &str) -> Option<T> {
    let start = script.rfind("})(")? + 3;
    let end = script.rfind(");")?;
    serde_json::from_str(script.get(start..end)?).ok()
}

#[cfg(test)]
#[path = "scripts_tests.rs"]
mod tests;
