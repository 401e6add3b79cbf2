use anyhow::{Context, Result, bail};
use tokio::process::Command;
use tracing::info;

/// Mirrors the report directory to an rclone remote.
pub struct RcloneSync {
    program: String,
    remote: String,
}

impl RcloneSync {
    pub fn new(remote: &str) -> Self {
        Self {
            program: "rclone".to_string(),
            remote: remote.to_string(),
        }
    }

    pub fn with_program(mut self, program: &str) -> Self {
        self.program = program.to_string();
        self
    }

    pub fn remote(&self) -> &str {
        &self.remote
    }

    pub async fn sync(&self, dir: &str) -> Result<()> {
        info!("Syncing {} to {}", dir, self.remote);
        let output = Command::new(&self.program)
            .args(["sync", dir, self.remote.as_str()])
            .output()
            .await
            .with_context(|| format!("Failed to run {} (is it installed?)", self.program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "{} sync exited with {}: {} (run `rclone config` to set up the remote)",
                self.program,
                output.status,
                stderr.trim()
            );
        }
        Ok(())
    }
}
