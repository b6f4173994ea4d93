// src/infrastructure/generator.rs
use crate::application::ContentGenerator;
use crate::domain::DomainError;
use crate::infrastructure::config::GeneratorConfig;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Runs an external command as the AI backend: `<command> <args..> <topic> <course>`.
/// Whatever it prints on stdout is the raw generated note.
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    command: String,
    args: Vec<String>,
}

impl CommandGenerator {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    /// `None` when no command is configured.
    pub fn from_config(config: &GeneratorConfig) -> Option<Self> {
        let command = config.command.trim();
        (!command.is_empty()).then(|| Self::new(command, config.args.clone()))
    }
}

#[async_trait]
impl ContentGenerator for CommandGenerator {
    #[instrument(level = "debug", skip(self), fields(command = %self.command))]
    async fn generate(&self, topic: &str, course: &str) -> Result<String, DomainError> {
        let output = Command::new(&self.command)
            .args(&self.args)
            .arg(topic)
            .arg(course)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| DomainError::Backend(format!("failed to spawn {}: {e}", self.command)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DomainError::Backend(format!(
                "{} exited with status {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| DomainError::MalformedContent(format!("generator output is not UTF-8: {e}")))?;
        debug!(bytes = stdout.len(), "Generator finished");
        Ok(stdout)
    }
}
