//! Foreground window from the operating system

use std::path::Path;

use async_trait::async_trait;

use codepet_core::{WindowError, WindowSample, WindowSource};

/// Queries the focused window through `active-win-pos-rs`
#[derive(Debug, Default, Clone, Copy)]
pub struct DesktopWindow;

#[async_trait]
impl WindowSource for DesktopWindow {
    async fn foreground_window(&mut self) -> Result<WindowSample, WindowError> {
        // The platform call blocks; keep it off the runtime's worker threads.
        let window = tokio::task::spawn_blocking(active_win_pos_rs::get_active_window)
            .await
            .map_err(|e| WindowError::Query(e.to_string()))?
            .map_err(|()| WindowError::NoForegroundWindow)?;

        Ok(WindowSample::new(
            process_name(&window.process_path, &window.app_name),
            window.title,
        ))
    }
}

/// Executable file name, falling back to the app name
fn process_name(process_path: &Path, app_name: &str) -> String {
    process_path
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .map_or_else(|| app_name.to_string(), ToString::to_string)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_process_name_prefers_executable() {
        let path = PathBuf::from("C:/Program Files/Microsoft VS Code/Code.exe");
        assert_eq!(process_name(&path, "Visual Studio Code"), "Code.exe");
        assert_eq!(process_name(Path::new(""), "Terminal"), "Terminal");
    }
}
