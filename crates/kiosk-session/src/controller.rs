//! Session controller: owns one kiosk session from hide to restore.
//!
//! ```text
//! Idle ──open──► Starting ──page loaded──► Active
//!                   │                        │
//!                   └──────── trigger ───────┴──► Closing ──► Idle
//! ```
//!
//! Each session runs as a single `select!` loop over the window's events, the
//! navigation task, the grace timer and the teardown latch. All observer
//! output funnels through that loop, so the result is decided in one place.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use kiosk_config::{CompletionConfig, Config, InjectionConfig, InterceptionConfig};
use kiosk_protocols::{
    HostWindow, InterceptedRequest, SessionRequest, SessionResult, SessionWindow, WindowError,
    WindowEvent, WindowLauncher,
};
use parking_lot::Mutex;
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::error::{LaunchError, SessionError};
use crate::host::HostGuard;
use crate::injector::{FieldInjector, InjectionOutcome};
use crate::interceptor::TrafficInterceptor;
use crate::latch::CompletionLatch;
use crate::store::PayloadStore;
use crate::watcher::{CompletionTrigger, CompletionWatcher};

const REASON_DESTROYED: &str = "window-destroyed";
const REASON_DISCONNECTED: &str = "browser-disconnected";

/// Lifecycle state of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    /// Host hidden, window opening or navigating.
    Starting,
    /// Page loaded; injector running.
    Active,
    /// Teardown requested; waiting for the window to go away.
    Closing,
}

/// Per-session behaviour.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub injection: InjectionConfig,
    pub interception: InterceptionConfig,
    pub completion: CompletionConfig,
    /// How long to keep draining events after teardown was requested.
    pub close_timeout: Duration,
}

impl SessionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            injection: config.injection.clone(),
            interception: config.interception.clone(),
            completion: config.completion.clone(),
            close_timeout: Duration::from_millis(config.session.close_timeout_ms),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[derive(Debug)]
struct Shared {
    state: Mutex<SessionState>,
    latch: Mutex<Option<Arc<CompletionLatch>>>,
}

impl Shared {
    fn begin(self: &Arc<Self>) -> Option<ActiveSlot> {
        let mut state = self.state.lock();
        if *state != SessionState::Idle {
            return None;
        }
        *state = SessionState::Starting;
        Some(ActiveSlot {
            shared: self.clone(),
        })
    }
}

/// Exclusive claim on the controller. Returns it to `Idle` on drop.
struct ActiveSlot {
    shared: Arc<Shared>,
}

impl ActiveSlot {
    fn set_state(&self, state: SessionState) {
        let mut current = self.shared.state.lock();
        if *current != state {
            debug!("Session state {:?} -> {:?}", *current, state);
            *current = state;
        }
    }

    fn state(&self) -> SessionState {
        *self.shared.state.lock()
    }

    fn attach_latch(&self, latch: Arc<CompletionLatch>) {
        *self.shared.latch.lock() = Some(latch);
    }
}

impl Drop for ActiveSlot {
    fn drop(&mut self) {
        self.shared.latch.lock().take();
        *self.shared.state.lock() = SessionState::Idle;
    }
}

/// Background work and the window of one running session.
///
/// If the session future is dropped before it finishes, dropping this stops
/// the injector and navigation and closes the window in a spawned task.
struct SessionTasks {
    window: Arc<dyn SessionWindow>,
    cancel: CancellationToken,
    handles: Vec<AbortHandle>,
    injector_started: bool,
    finished: bool,
}

impl SessionTasks {
    fn new(window: Arc<dyn SessionWindow>) -> Self {
        Self {
            window,
            cancel: CancellationToken::new(),
            handles: Vec::new(),
            injector_started: false,
            finished: false,
        }
    }

    fn track<T>(&mut self, handle: &JoinHandle<T>) {
        self.handles.push(handle.abort_handle());
    }

    fn stop(&self) {
        self.cancel.cancel();
        for handle in &self.handles {
            handle.abort();
        }
    }

    /// Stop everything and close the window.
    async fn finish(&mut self) {
        self.stop();
        self.finished = true;
        if let Err(e) = self.window.close().await {
            debug!("Session window close after teardown: {}", e);
        }
    }
}

impl Drop for SessionTasks {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        self.stop();
        warn!("Session abandoned before it finished; closing its window");
        let window = self.window.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    if let Err(e) = window.close().await {
                        debug!("Closing abandoned session window: {}", e);
                    }
                });
            }
            Err(_) => warn!("No runtime left to close the session window"),
        }
    }
}

/// Requests teardown of the active session from anywhere.
#[derive(Debug, Clone)]
pub struct SessionCloser {
    shared: Arc<Shared>,
}

impl SessionCloser {
    /// Ask the active session to close. Returns whether a session was active.
    pub fn close(&self) -> bool {
        let latch = self.shared.latch.lock().clone();
        match latch {
            Some(latch) => {
                latch.fire(CompletionTrigger::CloseRequested);
                latch.request_teardown();
                info!("Session close requested");
                true
            }
            None => false,
        }
    }
}

/// Runs kiosk sessions, one at a time.
pub struct KioskController {
    launcher: Arc<dyn WindowLauncher>,
    host: Arc<dyn HostWindow>,
    store: PayloadStore,
    settings: SessionSettings,
    shared: Arc<Shared>,
}

impl KioskController {
    pub fn new(
        launcher: Arc<dyn WindowLauncher>,
        host: Arc<dyn HostWindow>,
        store: PayloadStore,
        settings: SessionSettings,
    ) -> Self {
        Self {
            launcher,
            host,
            store,
            settings,
            shared: Arc::new(Shared {
                state: Mutex::new(SessionState::Idle),
                latch: Mutex::new(None),
            }),
        }
    }

    pub fn from_config(
        config: &Config,
        launcher: Arc<dyn WindowLauncher>,
        host: Arc<dyn HostWindow>,
    ) -> Self {
        Self::new(
            launcher,
            host,
            PayloadStore::from_config(&config.storage),
            SessionSettings::from_config(config),
        )
    }

    pub fn state(&self) -> SessionState {
        *self.shared.state.lock()
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn store(&self) -> &PayloadStore {
        &self.store
    }

    /// Handle for closing the active session from another task.
    pub fn closer(&self) -> SessionCloser {
        SessionCloser {
            shared: self.shared.clone(),
        }
    }

    /// Close the active session. Returns whether a session was active.
    pub fn close_session(&self) -> bool {
        self.closer().close()
    }

    /// Run one session with the configured injection settings.
    pub async fn open_session(&self, request: SessionRequest) -> Result<SessionResult, SessionError> {
        let injection = self.settings.injection.clone();
        self.open_session_with(request, injection).await
    }

    /// Run one session with an injection override.
    ///
    /// Resolves once the session window is gone and the host is visible
    /// again. Fails only when another session is already active. Dropping
    /// the returned future closes the window and restores the host.
    pub async fn open_session_with(
        &self,
        request: SessionRequest,
        injection: InjectionConfig,
    ) -> Result<SessionResult, SessionError> {
        let slot = self.shared.begin().ok_or(SessionError::AlreadyActive)?;
        let latch = Arc::new(CompletionLatch::new());
        slot.attach_latch(latch.clone());

        info!("Starting kiosk session for {}", request.target_url);
        let mut host = HostGuard::new(self.host.clone());
        host.hide().await;

        let result = match self.launcher.open_window().await {
            Ok(window) => {
                let span = info_span!("session", window = %window.id());
                self.drive(window, &request, &injection, &latch, &slot)
                    .instrument(span)
                    .await
            }
            Err(e) => {
                error!("Could not open session window: {}", e);
                let message = match e {
                    WindowError::OpenFailed(msg) => msg,
                    other => other.to_string(),
                };
                SessionResult::failed(format!("open-failed: {}", message))
            }
        };

        host.restore().await;
        drop(slot);

        info!(
            "Kiosk session ended: {:?} ({}), {} file(s) saved",
            result.outcome,
            result.reason,
            result.saved_files.len()
        );
        Ok(result)
    }

    async fn drive(
        &self,
        window: Arc<dyn SessionWindow>,
        request: &SessionRequest,
        injection: &InjectionConfig,
        latch: &CompletionLatch,
        slot: &ActiveSlot,
    ) -> SessionResult {
        let mut tasks = SessionTasks::new(window.clone());

        let Some(mut events) = window.take_events() else {
            warn!("Session window has no event stream");
            tasks.finish().await;
            return SessionResult::failed(REASON_DISCONNECTED);
        };

        let interceptor = TrafficInterceptor::new(window.clone(), &self.settings.interception);
        let watcher = CompletionWatcher::new(&self.settings.completion);

        if let Err(e) = interceptor.attach().await {
            warn!("Request interception unavailable: {}", e);
        }
        if let Err(e) = watcher.install(window.as_ref()).await {
            warn!("Completion watcher unavailable: {}", e);
        }

        let injector = Arc::new(FieldInjector::new(window.clone(), injection, request));

        let mut navigation = {
            let window = window.clone();
            let url = request.target_url.clone();
            tokio::spawn(async move { window.navigate(&url).await })
        };
        tasks.track(&navigation);
        let mut navigating = true;

        let grace = tokio::time::sleep(Duration::ZERO);
        tokio::pin!(grace);
        let mut grace_armed = false;

        let close_deadline = tokio::time::sleep(Duration::ZERO);
        tokio::pin!(close_deadline);
        let mut closing = false;

        let mut saved_files: Vec<PathBuf> = Vec::new();
        let mut ended_by: Option<&'static str> = None;

        loop {
            // Events first, so captures queued before the close deadline
            // are still persisted.
            tokio::select! {
                biased;

                event = events.recv() => {
                    let Some(event) = event else {
                        if !closing {
                            warn!("Session window event stream ended");
                        }
                        ended_by = Some(REASON_DISCONNECTED);
                        break;
                    };
                    match event {
                        WindowEvent::Loaded => {
                            if !closing {
                                self.activate(slot, &injector, &mut tasks);
                            }
                        }
                        WindowEvent::Request(intercepted) => {
                            self.capture(&interceptor, intercepted, &mut saved_files).await;
                        }
                        WindowEvent::Closed => {
                            info!("Session window closed");
                            ended_by = Some(REASON_DESTROYED);
                            break;
                        }
                        other => {
                            if let WindowEvent::Console(message) = &other {
                                debug!("console.{}: {}", message.level, message.text);
                            }
                            if let Some(trigger) = watcher.classify(&other) {
                                if let Some(delay) = Self::fire(latch, trigger, watcher.grace_delay()) {
                                    info!("Closing session window in {:?}", delay);
                                    grace.as_mut().reset(Instant::now() + delay);
                                    grace_armed = true;
                                }
                            }
                        }
                    }
                }
                outcome = &mut navigation, if navigating => {
                    navigating = false;
                    match outcome {
                        Ok(Ok(())) => {
                            debug!("Navigation to {} settled", request.target_url);
                            if !closing {
                                self.activate(slot, &injector, &mut tasks);
                            }
                        }
                        Ok(Err(e)) => warn!("Navigation to {} failed: {}", request.target_url, e),
                        Err(e) => warn!("Navigation task failed: {}", e),
                    }
                }
                _ = &mut grace, if grace_armed => {
                    grace_armed = false;
                    latch.request_teardown();
                }
                _ = latch.teardown_requested(), if !closing => {
                    closing = true;
                    slot.set_state(SessionState::Closing);
                    tasks.cancel.cancel();
                    watcher.uninstall(window.as_ref()).await;
                    if let Err(e) = window.close().await {
                        warn!("Failed to close session window: {}", e);
                    }
                    close_deadline.as_mut().reset(Instant::now() + self.settings.close_timeout);
                }
                _ = &mut close_deadline, if closing => {
                    while let Ok(event) = events.try_recv() {
                        if let WindowEvent::Request(intercepted) = event {
                            self.capture(&interceptor, intercepted, &mut saved_files).await;
                        }
                    }
                    warn!(
                        "Session window did not report closed within {:?}",
                        self.settings.close_timeout
                    );
                    break;
                }
            }
        }

        let winner = latch.winner();
        tasks.finish().await;

        let result = match winner {
            Some(trigger) => SessionResult::finished(trigger.reason()),
            None => SessionResult::failed(ended_by.unwrap_or(REASON_DESTROYED)),
        };
        result.with_saved_files(saved_files)
    }

    /// Continue a paused request and persist it if it is the submission.
    async fn capture(
        &self,
        interceptor: &TrafficInterceptor,
        request: InterceptedRequest,
        saved_files: &mut Vec<PathBuf>,
    ) {
        if let Some(payload) = interceptor.handle(request).await {
            match self.store.save(&payload).await {
                Ok(path) => saved_files.push(path),
                Err(e) => error!("Failed to persist captured payload: {}", e),
            }
        }
    }

    /// Enter `Active` and start the injector, once.
    fn activate(&self, slot: &ActiveSlot, injector: &Arc<FieldInjector>, tasks: &mut SessionTasks) {
        if tasks.injector_started || slot.state() != SessionState::Starting {
            return;
        }
        tasks.injector_started = true;
        slot.set_state(SessionState::Active);
        info!("Session page loaded");

        let injector = injector.clone();
        let cancel = tasks.cancel.clone();
        let handle: JoinHandle<InjectionOutcome> =
            tokio::spawn(async move { injector.run(cancel).await }.in_current_span());
        tasks.track(&handle);
    }

    /// Feed a trigger through the latch.
    ///
    /// Returns the grace delay to wait before teardown, or `None` when
    /// teardown was requested immediately (or not at all).
    fn fire(
        latch: &CompletionLatch,
        trigger: CompletionTrigger,
        grace_delay: Duration,
    ) -> Option<Duration> {
        let won = latch.fire(trigger);
        if won {
            info!("Completion trigger: {}", trigger);
        } else {
            debug!(
                "Ignoring {} after {:?} already fired",
                trigger,
                latch.winner()
            );
        }

        if !trigger.is_graceful() {
            latch.request_teardown();
            return None;
        }
        if !won {
            return None;
        }
        if grace_delay.is_zero() {
            latch.request_teardown();
            return None;
        }
        Some(grace_delay)
    }

    /// Hide the host, run an external program to completion, restore the host.
    ///
    /// Shares the one-active-session rule with kiosk sessions.
    pub async fn launch_external(&self, program: &str, args: &[String]) -> Result<String, LaunchError> {
        let slot = self.shared.begin().ok_or(LaunchError::AlreadyActive)?;
        slot.set_state(SessionState::Active);

        info!("Launching external program {} {:?}", program, args);
        let mut host = HostGuard::new(self.host.clone());
        host.hide().await;

        let status = tokio::process::Command::new(program)
            .args(args)
            .status()
            .await;

        host.restore().await;
        drop(slot);

        let status = status.map_err(|source| LaunchError::Spawn {
            program: program.to_string(),
            source,
        })?;

        if !status.success() {
            warn!("{} exited with {}", program, status);
            return Err(LaunchError::Exit {
                program: program.to_string(),
                status: status.to_string(),
            });
        }

        info!("{} exited normally", program);
        Ok(format!("{} closed", program))
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
