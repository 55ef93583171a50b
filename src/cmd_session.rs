//! `kiosk open` and `kiosk launch`.

use std::sync::Arc;
use std::time::Duration;

use kiosk_browser_cdp::{ChromeLauncher, LauncherConfig};
use kiosk_config::{BrowserConfig, Config, ConfigValidator};
use kiosk_host_desktop::host_for;
use kiosk_session::KioskController;
use tracing::{info, warn};

use crate::cli::OpenArgs;

fn launcher_config(browser: &BrowserConfig) -> LauncherConfig {
    LauncherConfig {
        debug_port: browser.debug_port,
        chrome_path: browser.chrome_path.clone(),
        profile_dir: Some(browser.resolved_profile_dir()),
        headless: browser.headless,
        fullscreen: browser.fullscreen,
        kiosk_mode: browser.kiosk_mode,
        launch_timeout: Duration::from_millis(browser.launch_timeout_ms),
        extra_args: browser.extra_args.clone(),
    }
}

fn ensure_valid(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let warnings = ConfigValidator::validate(config)?.into_result()?;
    for warning in warnings {
        warn!("config {}: {}", warning.path, warning.message);
    }
    Ok(())
}

/// Run one kiosk session; Ctrl-C closes it.
pub(crate) async fn run_open(
    config: &Config,
    args: OpenArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    ensure_valid(config)?;

    let print_json = args.json;
    let request = args.into_request(&config.session.target_url);

    let launcher = Arc::new(ChromeLauncher::new(launcher_config(&config.browser)));
    let host = host_for(config.host.window_title.as_deref());
    let controller = KioskController::from_config(config, launcher.clone(), host);

    let closer = controller.closer();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, closing session");
            closer.close();
        }
    });

    let result = controller.open_session(request).await;
    interrupt.abort();
    launcher.shutdown().await;
    let result = result?;

    if print_json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{:?}: {}", result.outcome, result.reason);
        for path in &result.saved_files {
            println!("saved {}", path.display());
        }
    }

    if result.is_finished() {
        Ok(())
    } else {
        Err(format!("session failed: {}", result.reason).into())
    }
}

/// Run an external program with the host hidden.
pub(crate) async fn run_launch(
    config: &Config,
    program: &str,
    args: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let launcher = Arc::new(ChromeLauncher::new(launcher_config(&config.browser)));
    let host = host_for(config.host.window_title.as_deref());
    let controller = KioskController::from_config(config, launcher, host);

    let message = controller.launch_external(program, args).await?;
    println!("{}", message);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launcher_config_mapping() {
        let browser = BrowserConfig {
            debug_port: 9400,
            launch_timeout_ms: 1500,
            extra_args: vec!["--lang=fi".to_string()],
            ..Default::default()
        };
        let launcher = launcher_config(&browser);
        assert_eq!(launcher.debug_port, 9400);
        assert_eq!(launcher.launch_timeout, Duration::from_millis(1500));
        assert!(launcher.kiosk_mode);
        assert_eq!(launcher.profile_dir, Some(browser.resolved_profile_dir()));
        assert_eq!(launcher.extra_args, vec!["--lang=fi"]);
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(ensure_valid(&Config::default()).is_ok());
    }
}
