//! Screen, power, audio and browser tools
//!
//! Environmental failures (missing binaries, unsupported platforms) are
//! reported in the returned text, not as errors.

use crate::tools::implementations::process::Platform;
use crate::tools::implementations::ToolContext;
use serde_json::{json, Value};
use std::fs;
use std::io;
use std::path::Path;

/// Lock the screen
pub async fn lock_screen(ctx: &ToolContext) -> String {
    let (program, args): (&str, Vec<String>) = match ctx.platform {
        Platform::MacOs => ("pmset", vec!["displaysleepnow".to_string()]),
        Platform::Linux => ("loginctl", vec!["lock-session".to_string()]),
        Platform::Windows => ("rundll32.exe", vec!["user32.dll,LockWorkStation".to_string()]),
        Platform::Other => return "Failed to lock screen: unsupported platform".to_string(),
    };

    match ctx.runner.run(program, &args).await {
        Ok(_) => "Screen locked".to_string(),
        Err(e) => format!("Failed to lock screen: {}", e),
    }
}

/// Battery level and charging state
pub async fn get_battery_status(ctx: &ToolContext) -> Value {
    let status = match ctx.platform {
        Platform::Linux => read_sysfs_battery(&ctx.power_supply_dir).ok().flatten(),
        Platform::MacOs => match ctx.runner.run("pmset", &["-g".to_string(), "batt".to_string()]).await {
            Ok(output) => parse_pmset_battery(&output),
            Err(_) => None,
        },
        _ => None,
    };

    match status {
        Some((percent, charging)) => json!({"percent": percent, "charging": charging}),
        None => json!({"error": "Battery information not available"}),
    }
}

/// Open a Google search in the default browser
pub async fn search_google(ctx: &ToolContext, query: &str) -> String {
    let url = format!("https://www.google.com/search?q={}", query.replace(' ', "+"));

    let launched = match ctx.platform {
        Platform::MacOs => ctx.runner.spawn("open", &[url]),
        Platform::Linux => ctx.runner.spawn("xdg-open", &[url]),
        Platform::Windows => ctx.runner.spawn(
            "cmd",
            &["/C".to_string(), "start".to_string(), String::new(), url],
        ),
        Platform::Other => Err(io::Error::new(io::ErrorKind::NotFound, "no browser launcher")),
    };

    match launched {
        Ok(()) => format!("Searched for: {}", query),
        Err(e) if e.kind() == io::ErrorKind::NotFound => "Failed to open browser".to_string(),
        Err(e) => format!("Failed to search: {}", e),
    }
}

/// Set output volume (0-100)
pub async fn set_volume(ctx: &ToolContext, level: i64) -> String {
    let (program, args): (&str, Vec<String>) = match ctx.platform {
        Platform::MacOs => (
            "osascript",
            vec!["-e".to_string(), format!("set volume output volume {}", level)],
        ),
        Platform::Linux => (
            "pactl",
            vec![
                "set-sink-volume".to_string(),
                "@DEFAULT_SINK@".to_string(),
                format!("{}%", level),
            ],
        ),
        _ => return "Failed to set volume: unsupported platform".to_string(),
    };

    match ctx.runner.run(program, &args).await {
        Ok(_) => format!("Volume set to {}%", level),
        Err(e) => format!("Failed to set volume: {}", e),
    }
}

/// Read the first battery under a sysfs power_supply directory
fn read_sysfs_battery(dir: &Path) -> io::Result<Option<(i64, bool)>> {
    let mut battery = None;
    let mut mains_online = None;

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let kind = read_trimmed(&path.join("type")).unwrap_or_default();

        match kind.as_str() {
            "Battery" if battery.is_none() => {
                let percent = read_trimmed(&path.join("capacity"))
                    .and_then(|c| c.parse::<i64>().ok());
                let state = read_trimmed(&path.join("status")).unwrap_or_default();
                if let Some(percent) = percent {
                    battery = Some((percent, state));
                }
            }
            "Mains" => {
                let online = read_trimmed(&path.join("online")).as_deref() == Some("1");
                mains_online = Some(mains_online.unwrap_or(false) || online);
            }
            _ => {}
        }
    }

    Ok(battery.map(|(percent, state)| {
        let charging = mains_online.unwrap_or(state != "Discharging");
        (percent, charging)
    }))
}

fn read_trimmed(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok().map(|s| s.trim().to_string())
}

/// Parse `pmset -g batt` output
fn parse_pmset_battery(output: &str) -> Option<(i64, bool)> {
    let on_ac = output
        .lines()
        .next()
        .map(|line| line.contains("AC Power"))
        .unwrap_or(false);

    let percent = output.lines().find_map(|line| {
        let end = line.find('%')?;
        let start = line[..end]
            .rfind(|c: char| !c.is_ascii_digit())
            .map(|i| i + 1)
            .unwrap_or(0);
        line[start..end].parse::<i64>().ok()
    })?;

    Some((percent, on_ac))
}
