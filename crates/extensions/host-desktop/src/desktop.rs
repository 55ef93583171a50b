//! Desktop host window control through platform command line tools.

use std::process::Command;

use async_trait::async_trait;
use kiosk_protocols::{HostError, HostWindow};
use tracing::debug;

/// Visibility operation on the host window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostAction {
    Hide,
    Show,
    Focus,
}

/// One external command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostCommand {
    pub program: &'static str,
    pub args: Vec<String>,
}

impl HostCommand {
    /// `wmctrl` invocation for Linux window managers.
    pub fn wmctrl(action: HostAction, title: &str) -> Self {
        let args = match action {
            HostAction::Hide => vec!["-r", title, "-b", "add,hidden"],
            HostAction::Show => vec!["-r", title, "-b", "remove,hidden"],
            HostAction::Focus => vec!["-a", title],
        };
        Self {
            program: "wmctrl",
            args: args.into_iter().map(str::to_string).collect(),
        }
    }

    /// `osascript` invocation; `title` names the host application process.
    pub fn osascript(action: HostAction, title: &str) -> Self {
        let process = applescript_quote(title);
        let script = match action {
            HostAction::Hide => format!(
                r#"tell application "System Events" to set visible of (first process whose name is {}) to false"#,
                process
            ),
            HostAction::Show => format!(
                r#"tell application "System Events" to set visible of (first process whose name is {}) to true"#,
                process
            ),
            HostAction::Focus => format!(
                r#"tell application "System Events" to set frontmost of (first process whose name is {}) to true"#,
                process
            ),
        };
        Self {
            program: "osascript",
            args: vec!["-e".to_string(), script],
        }
    }

    /// Command for the current platform.
    pub fn for_platform(action: HostAction, title: &str) -> Result<Self, HostError> {
        #[cfg(target_os = "linux")]
        {
            Ok(Self::wmctrl(action, title))
        }

        #[cfg(target_os = "macos")]
        {
            Ok(Self::osascript(action, title))
        }

        #[cfg(not(any(target_os = "linux", target_os = "macos")))]
        {
            let _ = (action, title);
            Err(HostError::PlatformNotSupported)
        }
    }

    fn run(&self) -> Result<(), HostError> {
        let output = Command::new(self.program)
            .args(&self.args)
            .output()
            .map_err(|e| HostError::OperationFailed(format!("{}: {}", self.program, e)))?;

        if !output.status.success() {
            return Err(HostError::OperationFailed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        Ok(())
    }
}

/// Run `command` on the blocking pool.
async fn run_blocking(command: HostCommand) -> Result<(), HostError> {
    tokio::task::spawn_blocking(move || command.run())
        .await
        .map_err(|e| HostError::OperationFailed(e.to_string()))?
}

/// Quote a string as an AppleScript string literal.
fn applescript_quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

/// An existing desktop window identified by its title.
#[derive(Debug, Clone)]
pub struct DesktopHost {
    title: String,
}

impl DesktopHost {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    async fn apply(&self, action: HostAction) -> Result<(), HostError> {
        let command = HostCommand::for_platform(action, &self.title)?;
        debug!("Host window {:?}: {} {:?}", action, command.program, command.args);
        run_blocking(command).await
    }
}

#[async_trait]
impl HostWindow for DesktopHost {
    async fn hide(&self) -> Result<(), HostError> {
        self.apply(HostAction::Hide).await
    }

    async fn show(&self) -> Result<(), HostError> {
        self.apply(HostAction::Show).await
    }

    async fn focus(&self) -> Result<(), HostError> {
        self.apply(HostAction::Focus).await
    }
}
