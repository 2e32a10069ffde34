//! Desktop notifications through the freedesktop notification service

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::timer::{Alert, AlertStyle};

/// Build the `notify-send` arguments for an alert.
///
/// `extended` adds `--print-id` and `--expire-time`, which older libnotify
/// releases reject.
pub fn notify_send_args(alert: &Alert, extended: bool) -> Vec<String> {
    let urgency = match alert.style {
        // critical notifications stay on screen until dismissed
        AlertStyle::Insistent => "critical",
        AlertStyle::Normal => "normal",
    };

    let mut args = vec![
        "--app-name=stopwatch".to_string(),
        format!("--urgency={}", urgency),
        format!("--category={}", alert.channel_id),
    ];
    if extended {
        args.push("--print-id".to_string());
        if alert.style == AlertStyle::Insistent {
            args.push("--expire-time=0".to_string());
        }
    }
    args.push(alert.title.clone());
    args.push(alert.body.clone());
    args
}

/// Whether a failed `notify-send` run complained about an option it does not know
pub fn rejected_option(stderr: &str) -> bool {
    let stderr = stderr.to_lowercase();
    stderr.contains("unknown option") || stderr.contains("unrecognized option")
}

/// Show an alert on the desktop, returning the desktop's notification id if it reported one
pub async fn show_desktop_notification(command: &str, alert: &Alert) -> Result<Option<u32>, String> {
    debug!("Sending alert {} through {}", alert.id, command);

    let output = Command::new(command)
        .args(notify_send_args(alert, true))
        .output()
        .await
        .map_err(|e| format!("Failed to execute {}: {}", command, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !rejected_option(&stderr) {
            return Err(format!("{} failed: {}", command, stderr));
        }

        warn!("{} rejected extended options, retrying without them: {}", command, stderr.trim());
        let output = Command::new(command)
            .args(notify_send_args(alert, false))
            .output()
            .await
            .map_err(|e| format!("Failed to execute {}: {}", command, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!("{} failed: {}", command, stderr));
        }

        info!("Desktop notification shown for alert {} (no desktop id)", alert.id);
        return Ok(None);
    }

    let desktop_id = String::from_utf8_lossy(&output.stdout).trim().parse::<u32>().ok();
    info!("Desktop notification shown for alert {} (desktop id {:?})", alert.id, desktop_id);
    Ok(desktop_id)
}

/// Close a desktop notification by the id the notification service assigned
pub async fn close_desktop_notification(desktop_id: u32) -> Result<(), String> {
    debug!("Closing desktop notification {}", desktop_id);

    let desktop_id_arg = desktop_id.to_string();
    let output = Command::new("gdbus")
        .args(&[
            "call",
            "--session",
            "--dest=org.freedesktop.Notifications",
            "--object-path=/org/freedesktop/Notifications",
            "--method=org.freedesktop.Notifications.CloseNotification",
            desktop_id_arg.as_str(),
        ])
        .output()
        .await
        .map_err(|e| format!("Failed to execute gdbus: {}", e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("gdbus CloseNotification failed: {}", stderr));
    }

    info!("Desktop notification {} closed", desktop_id);
    Ok(())
}

/// Check if the notification command is available on the system
pub async fn check_notify_command_available(command: &str) -> Result<(), String> {
    let output = Command::new(command)
        .arg("--version")
        .output()
        .await
        .map_err(|_| format!("{} is not available, desktop alerts are disabled.", command))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!(
            "{} --version failed, desktop alerts are disabled: {}",
            command,
            stderr.trim()
        ));
    }

    info!("{} is available", command);
    Ok(())
}
