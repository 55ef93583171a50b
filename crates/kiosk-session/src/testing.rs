//! In-memory session window and host doubles for orchestration tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use kiosk_protocols::{
    HostError, HostWindow, SessionWindow, WindowError, WindowEvent, WindowLauncher,
};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::sync::mpsc;

use crate::scripts::{InjectionPlan, embedded_plan};

/// Simulated form state.
#[derive(Debug, Default)]
pub(crate) struct FakePage {
    /// Probe number from which every field is present; `None` never renders.
    pub ready_after: Option<u32>,
    pub values: HashMap<String, String>,
    /// Synthetic events dispatched, by field key and event type.
    pub events: HashMap<(String, String), u32>,
    pub readonly_removed: Vec<String>,
    pub checkbox_checked: bool,
    pub checkbox_clicks: u32,
}

pub(crate) struct FakeWindow {
    id: String,
    events_tx: Mutex<Option<mpsc::UnboundedSender<WindowEvent>>>,
    events_rx: Mutex<Option<mpsc::UnboundedReceiver<WindowEvent>>>,
    pub page: Mutex<FakePage>,
    navigate_error: Option<String>,
    close_ends_stream: bool,
    pub navigations: Mutex<Vec<String>>,
    pub init_scripts: Mutex<Vec<String>>,
    pub bindings: Mutex<Vec<String>>,
    pub intercepting: AtomicBool,
    pub continued: Mutex<Vec<String>>,
    pub close_calls: AtomicUsize,
    pub probes: AtomicU32,
    pub fills: AtomicU32,
}

impl FakeWindow {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            id: "fake-target".to_string(),
            events_tx: Mutex::new(Some(tx)),
            events_rx: Mutex::new(Some(rx)),
            page: Mutex::new(FakePage {
                ready_after: Some(1),
                ..Default::default()
            }),
            navigate_error: None,
            close_ends_stream: true,
            navigations: Mutex::new(Vec::new()),
            init_scripts: Mutex::new(Vec::new()),
            bindings: Mutex::new(Vec::new()),
            intercepting: AtomicBool::new(false),
            continued: Mutex::new(Vec::new()),
            close_calls: AtomicUsize::new(0),
            probes: AtomicU32::new(0),
            fills: AtomicU32::new(0),
        }
    }

    pub fn ready_after(self, probes: u32) -> Self {
        self.page.lock().ready_after = Some(probes);
        self
    }

    pub fn never_ready(self) -> Self {
        self.page.lock().ready_after = None;
        self
    }

    pub fn with_checked_box(self) -> Self {
        self.page.lock().checkbox_checked = true;
        self
    }

    pub fn failing_navigation(mut self, message: &str) -> Self {
        self.navigate_error = Some(message.to_string());
        self
    }

    /// The window keeps delivering events after `close()` and never reports
    /// closed on its own.
    pub fn lingering(mut self) -> Self {
        self.close_ends_stream = false;
        self
    }

    /// Push an event as if the browser produced it.
    pub fn emit(&self, event: WindowEvent) {
        if let Some(tx) = self.events_tx.lock().as_ref() {
            let _ = tx.send(event);
        }
    }

    /// The window is destroyed out from under the session.
    pub fn destroy(&self) {
        self.emit(WindowEvent::Closed);
    }

    /// The browser connection drops.
    pub fn disconnect(&self) {
        self.events_tx.lock().take();
    }

    pub fn is_closed(&self) -> bool {
        self.close_calls.load(Ordering::SeqCst) > 0
    }

    pub fn navigated(&self) -> bool {
        !self.navigations.lock().is_empty()
    }

    fn run_probe(&self, plan: &InjectionPlan) -> Value {
        let probe = self.probes.fetch_add(1, Ordering::SeqCst) + 1;
        let ready = self.page.lock().ready_after.is_some_and(|n| probe >= n);
        let missing: Vec<&str> = if ready {
            Vec::new()
        } else {
            plan.fields
                .iter()
                .filter(|f| f.required)
                .map(|f| f.key.as_str())
                .collect()
        };
        json!({"ready": ready, "missing": missing})
    }

    fn run_fill(&self, plan: &InjectionPlan) -> Value {
        self.fills.fetch_add(1, Ordering::SeqCst);
        let mut page = self.page.lock();
        let mut filled = Vec::new();
        let mut events = 0;

        for field in &plan.fields {
            let Some(value) = field.value.as_ref().filter(|v| !v.is_empty()) else {
                continue;
            };
            if field.readonly {
                page.readonly_removed.push(field.key.clone());
            }
            page.values.insert(field.key.clone(), value.clone());
            for kind in ["input", "change", "blur"] {
                *page
                    .events
                    .entry((field.key.clone(), kind.to_string()))
                    .or_default() += 1;
                events += 1;
            }
            filled.push(field.key.clone());
        }

        let mut checkbox = false;
        if plan.checkbox.is_some() && !page.checkbox_checked {
            page.checkbox_checked = true;
            page.checkbox_clicks += 1;
            checkbox = true;
        }

        json!({"filled": filled, "events": events, "checkbox": checkbox})
    }
}

#[async_trait]
impl SessionWindow for FakeWindow {
    fn id(&self) -> &str {
        &self.id
    }

    async fn navigate(&self, url: &str) -> Result<(), WindowError> {
        self.navigations.lock().push(url.to_string());
        if let Some(message) = &self.navigate_error {
            return Err(WindowError::NavigationFailed(message.clone()));
        }
        self.emit(WindowEvent::Loaded);
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<Value, WindowError> {
        if self.is_closed() {
            return Err(WindowError::Closed);
        }
        if script.contains("dispatchEvent") {
            let plan: InjectionPlan = embedded_plan(script)
                .ok_or_else(|| WindowError::Script("unparseable fill plan".to_string()))?;
            return Ok(self.run_fill(&plan));
        }
        if script.contains("missing") {
            let plan: InjectionPlan = embedded_plan(script)
                .ok_or_else(|| WindowError::Script("unparseable probe plan".to_string()))?;
            return Ok(self.run_probe(&plan));
        }
        Ok(Value::Bool(true))
    }

    async fn add_init_script(&self, source: &str) -> Result<(), WindowError> {
        self.init_scripts.lock().push(source.to_string());
        Ok(())
    }

    async fn expose_binding(&self, name: &str) -> Result<(), WindowError> {
        self.bindings.lock().push(name.to_string());
        Ok(())
    }

    async fn intercept_requests(&self) -> Result<(), WindowError> {
        self.intercepting.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn continue_request(&self, request_id: &str) -> Result<(), WindowError> {
        self.continued.lock().push(request_id.to_string());
        Ok(())
    }

    async fn close(&self) -> Result<(), WindowError> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        if self.close_ends_stream {
            self.events_tx.lock().take();
        }
        Ok(())
    }

    fn take_events(&self) -> Option<mpsc::UnboundedReceiver<WindowEvent>> {
        self.events_rx.lock().take()
    }
}

/// Hands out pre-built windows in order.
#[derive(Default)]
pub(crate) struct FakeLauncher {
    windows: Mutex<VecDeque<Arc<FakeWindow>>>,
    error: Option<String>,
    pub opened: AtomicUsize,
}

impl FakeLauncher {
    pub fn with_window(window: Arc<FakeWindow>) -> Self {
        let launcher = Self::default();
        launcher.windows.lock().push_back(window);
        launcher
    }

    pub fn failing(message: &str) -> Self {
        Self {
            error: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn push(&self, window: Arc<FakeWindow>) {
        self.windows.lock().push_back(window);
    }
}

#[async_trait]
impl WindowLauncher for FakeLauncher {
    async fn open_window(&self) -> Result<Arc<dyn SessionWindow>, WindowError> {
        if let Some(message) = &self.error {
            return Err(WindowError::OpenFailed(message.clone()));
        }
        let window = self
            .windows
            .lock()
            .pop_front()
            .ok_or_else(|| WindowError::OpenFailed("no window available".to_string()))?;
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(window)
    }
}

/// Host window that counts visibility changes.
pub(crate) struct FakeHost {
    pub hides: AtomicUsize,
    pub shows: AtomicUsize,
    pub focuses: AtomicUsize,
    visible: AtomicBool,
    fail_hide: bool,
}

impl FakeHost {
    pub fn new() -> Self {
        Self {
            hides: AtomicUsize::new(0),
            shows: AtomicUsize::new(0),
            focuses: AtomicUsize::new(0),
            visible: AtomicBool::new(true),
            fail_hide: false,
        }
    }

    pub fn failing_hide() -> Self {
        Self {
            fail_hide: true,
            ..Self::new()
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    pub fn hide_count(&self) -> usize {
        self.hides.load(Ordering::SeqCst)
    }

    pub fn show_count(&self) -> usize {
        self.shows.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HostWindow for FakeHost {
    async fn hide(&self) -> Result<(), HostError> {
        self.hides.fetch_add(1, Ordering::SeqCst);
        if self.fail_hide {
            return Err(HostError::OperationFailed("hide refused".to_string()));
        }
        self.visible.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn show(&self) -> Result<(), HostError> {
        self.shows.fetch_add(1, Ordering::SeqCst);
        self.visible.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn focus(&self) -> Result<(), HostError> {
        self.focuses.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Poll `condition` on the (possibly paused) test clock.
pub(crate) async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..1000 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached");
}
