//! Note creation tool

use crate::tools::implementations::process::Platform;
use crate::tools::implementations::ToolContext;
use std::io;
use std::path::PathBuf;

const ILLEGAL_FILENAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Create a note: Apple Notes on macOS, a text file opened in an editor elsewhere
pub async fn create_note(ctx: &ToolContext, title: &str, content: &str) -> String {
    let result = match ctx.platform {
        Platform::MacOs => create_apple_note(ctx, title, content).await,
        _ => create_note_file(ctx, title, content).await,
    };

    match result {
        Ok(message) => message,
        Err(e) => format!("Failed to create note: {}", e),
    }
}

async fn create_apple_note(ctx: &ToolContext, title: &str, content: &str) -> io::Result<String> {
    // Opening Notes first is best-effort
    let _ = ctx
        .runner
        .spawn("open", &["-a".to_string(), "Notes".to_string()]);

    let script = format!(
        r#"tell application "Notes"
    tell account "iCloud"
        make new note with properties {{name:"{}", body:"{}"}}
    end tell
    activate
end tell"#,
        escape_applescript(title),
        escape_applescript(content)
    );

    ctx.runner
        .run("osascript", &["-e".to_string(), script])
        .await?;
    Ok(format!("Note created in Apple Notes: {}", title))
}

async fn create_note_file(ctx: &ToolContext, title: &str, content: &str) -> io::Result<String> {
    let notes_dir = ctx.home_dir.join("Documents").join("Notes");
    tokio::fs::create_dir_all(&notes_dir).await?;

    let file_path: PathBuf = notes_dir.join(format!("{}.txt", sanitize_filename(title)));
    tokio::fs::write(&file_path, format!("{}\n\n{}", title, content)).await?;
    let path_arg = file_path.display().to_string();

    match ctx.platform {
        Platform::Windows => {
            if ctx.runner.spawn("notepad.exe", &[path_arg.clone()]).is_err() {
                ctx.runner.spawn(
                    "cmd",
                    &["/C".to_string(), "start".to_string(), String::new(), path_arg],
                )?;
            }
            Ok(format!(
                "Note created in {} and opened with Notepad",
                file_path.display()
            ))
        }
        Platform::Linux => {
            ctx.runner.spawn("xdg-open", &[path_arg])?;
            Ok(format!(
                "Note created in {} and opened with default editor",
                file_path.display()
            ))
        }
        _ => {
            let _ = ctx.runner.spawn("open", &[path_arg]);
            Ok(format!("Note created in {}", file_path.display()))
        }
    }
}

/// Strip characters illegal in Windows filenames
pub fn sanitize_filename(name: &str) -> String {
    let stripped: String = name
        .chars()
        .filter(|c| !ILLEGAL_FILENAME_CHARS.contains(c))
        .collect();
    let trimmed = stripped.trim().trim_end_matches('.');

    if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed.to_string()
    }
}

fn escape_applescript(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::implementations::process::testing::RecordingRunner;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn context(platform: Platform, runner: Arc<RecordingRunner>, home: &TempDir) -> ToolContext {
        ToolContext::default()
            .with_platform(platform)
            .with_runner(runner)
            .with_home_dir(home.path())
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("My Title"), "My Title");
        assert_eq!(sanitize_filename("a/b:c?"), "abc");
        assert_eq!(sanitize_filename("  notes...  "), "notes");
        assert_eq!(sanitize_filename("???"), "untitled");
    }

    #[tokio::test]
    async fn test_create_note_mac_uses_osascript() {
        let home = TempDir::new().unwrap();
        let runner = Arc::new(RecordingRunner::default());
        let ctx = context(Platform::MacOs, runner.clone(), &home);

        let message = create_note(&ctx, "My Title", "Body text").await;
        assert!(message.contains("Note created in Apple Notes"));
        assert!(runner.programs().contains(&"osascript".to_string()));
        assert!(!home.path().join("Documents").join("Notes").exists());
    }

    #[tokio::test]
    async fn test_create_note_linux_writes_file() {
        let home = TempDir::new().unwrap();
        let runner = Arc::new(RecordingRunner::default());
        let ctx = context(Platform::Linux, runner.clone(), &home);

        let message = create_note(&ctx, "My Title", "Body text").await;
        assert!(message.contains("Note created in"));
        assert!(runner.programs().contains(&"xdg-open".to_string()));

        let path = home.path().join("Documents").join("Notes").join("My Title.txt");
        let written = std::fs::read_to_string(path).unwrap();
        assert!(written.starts_with("My Title\n\nBody text"));
    }

    #[tokio::test]
    async fn test_create_note_windows_falls_back_to_start() {
        let home = TempDir::new().unwrap();
        let runner = Arc::new(RecordingRunner::failing());
        let ctx = context(Platform::Windows, runner.clone(), &home);

        let message = create_note(&ctx, "Todo", "x").await;
        // notepad and the `start` fallback both fail under the failing runner
        assert!(message.starts_with("Failed to create note"));
        assert_eq!(runner.programs(), vec!["notepad.exe", "cmd"]);
    }

    #[tokio::test]
    async fn test_applescript_quotes_are_escaped() {
        let home = TempDir::new().unwrap();
        let runner = Arc::new(RecordingRunner::default());
        let ctx = context(Platform::MacOs, runner.clone(), &home);

        create_note(&ctx, "Say \"hi\"", "body").await;
        let script = &runner.args_of("osascript").unwrap()[1];
        assert!(script.contains("name:\"Say \\\"hi\\\"\""));
    }
}
