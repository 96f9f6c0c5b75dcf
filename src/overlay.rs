// Overlay renderer launching.
//
// The renderer is an external script run by a native runtime; it paints
// one borderless full-screen window and exits on click or Escape. The
// launcher's job is to start it detached and report whether it came up,
// not to wait for it to finish.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use eyre::{eyre, Result, WrapErr};
use tokio::process::Command;

use crate::hex;

/// How long a freshly spawned renderer must stay alive before the
/// launch counts as successful.
pub const LAUNCH_GRACE: Duration = Duration::from_millis(300);

/// Handle on the configured renderer invocation
#[derive(Debug, Clone)]
pub struct Overlay {
    /// Runtime command, e.g. `swift` or `osascript -l JavaScript`
    runtime: String,
    /// Renderer script path
    script: PathBuf,
    grace: Duration,
}

impl Overlay {
    pub fn new(runtime: impl Into<String>, script: impl Into<PathBuf>) -> Self {
        Self {
            runtime: runtime.into(),
            script: script.into(),
            grace: LAUNCH_GRACE,
        }
    }

    #[cfg(test)]
    fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    pub fn script(&self) -> &Path {
        &self.script
    }

    /// Launch the renderer with one or two hex values.
    ///
    /// Both values are re-validated here even though callers already
    /// hold canonical strings. Resolves Ok once the grace period passes
    /// with the child still running (or exited clean); resolves Err if
    /// the child dies with a nonzero status inside the window. The
    /// child itself runs in its own session and is never awaited past
    /// the grace period, so repeated launches stack overlay windows.
    pub async fn launch(&self, hex1: &str, hex2: Option<&str>) -> Result<()> {
        let hex1 = hex::normalize(hex1).ok_or_else(|| eyre!("invalid HEX value: {:?}", hex1))?;
        let hex2 = match hex2 {
            Some(raw) => {
                Some(hex::normalize(raw).ok_or_else(|| eyre!("invalid HEX value: {:?}", raw))?)
            }
            None => None,
        };

        if !self.script.exists() {
            return Err(eyre!(
                "overlay renderer script not found at {}",
                self.script.display()
            ));
        }

        let runtime_words =
            shell_words::split(&self.runtime).wrap_err("invalid renderer runtime command")?;
        let Some((program, runtime_args)) = runtime_words.split_first() else {
            return Err(eyre!("renderer runtime command is empty"));
        };
        which::which(program)
            .map_err(|_| eyre!("renderer runtime '{}' is not installed", program))?;

        let mut exec = Command::new(program);
        exec.args(runtime_args)
            .arg(&self.script)
            .arg(&hex1)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        if let Some(hex2) = &hex2 {
            exec.arg(hex2);
        }

        // Own session so the overlay outlives us and ignores our HUP
        #[allow(unsafe_code)]
        unsafe {
            exec.pre_exec(|| {
                if libc::setsid() == -1 {
                    return Err(std::io::Error::last_os_error());
                }
                libc::signal(libc::SIGHUP, libc::SIG_IGN);
                Ok(())
            });
        }

        let mut child = exec
            .spawn()
            .wrap_err_with(|| format!("failed to spawn renderer {}", self.script.display()))?;

        // Race the grace timer against early exit; whichever fires
        // first settles the launch exactly once.
        tokio::select! {
            _ = tokio::time::sleep(self.grace) => Ok(()),
            status = child.wait() => {
                let status = status.wrap_err("failed waiting on renderer")?;
                if status.success() {
                    Ok(())
                } else {
                    match status.code() {
                        Some(code) => Err(eyre!("overlay renderer exited with code {}", code)),
                        None => Err(eyre!("overlay renderer was killed by a signal")),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn script_with(dir: &tempfile::TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("overlay.sh");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "{}", body).unwrap();
        path
    }

    #[tokio::test]
    async fn test_invalid_hex_fails_fast() {
        let overlay = Overlay::new("sh", "/nonexistent/overlay.sh");
        let err = overlay.launch("not-a-color", None).await.unwrap_err();
        assert!(err.to_string().contains("invalid HEX"));
    }

    #[tokio::test]
    async fn test_missing_script_reported_without_spawn() {
        let overlay = Overlay::new("sh", "/nonexistent/overlay.sh");
        let err = overlay.launch("#FF4757", None).await.unwrap_err();
        assert!(err.to_string().contains("/nonexistent/overlay.sh"));
    }

    #[tokio::test]
    async fn test_missing_runtime_reported() {
        let dir = tempfile::tempdir().unwrap();
        let script = script_with(&dir, "exit 0");
        let overlay = Overlay::new("definitely-not-a-real-runtime-9000", script);
        let err = overlay.launch("#FF4757", None).await.unwrap_err();
        assert!(err.to_string().contains("not installed"));
    }

    #[tokio::test]
    async fn test_nonzero_exit_within_grace_fails_with_code() {
        let dir = tempfile::tempdir().unwrap();
        let script = script_with(&dir, "exit 3");
        let overlay = Overlay::new("sh", script);
        let err = overlay.launch("#FF4757", None).await.unwrap_err();
        assert!(err.to_string().contains("code 3"), "got: {}", err);
    }

    #[tokio::test]
    async fn test_long_running_child_counts_as_success() {
        let dir = tempfile::tempdir().unwrap();
        let script = script_with(&dir, "sleep 5");
        let overlay = Overlay::new("sh", script).with_grace(Duration::from_millis(50));
        overlay
            .launch("#FF4757", Some("#1E90FF"))
            .await
            .expect("still-running child is a successful launch");
    }

    #[tokio::test]
    async fn test_clean_early_exit_counts_as_success() {
        let dir = tempfile::tempdir().unwrap();
        let script = script_with(&dir, "exit 0");
        let overlay = Overlay::new("sh", script);
        overlay.launch("#ff4757", None).await.unwrap();
    }
}
