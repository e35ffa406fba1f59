//! Spoken announcements through the platform's command-line speech tool.
//!
//! The command runs as a child process with the sentence as its last argument,
//! and the caller waits until it exits. When no command is configured one is
//! picked per platform: `say` on macOS, otherwise the first of `espeak-ng`,
//! `espeak` or `spd-say` found on `PATH`.

use crate::config::SpeechConfig;
use crate::error::{AnnouncerError, Result};
use crate::router_api::models::signal_strength::SignalReading;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

pub fn announcement(reading: &SignalReading) -> String {
    format!("Signal strength is now {}", reading)
}

pub trait Speaker {
    /// Resolves once the sentence has been spoken.
    fn speak(&self, sentence: &str) -> impl std::future::Future<Output = Result<()>> + Send;
}

#[derive(Debug, Clone)]
pub struct CommandSpeaker {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl CommandSpeaker {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Option<Duration>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    pub fn from_config(config: &SpeechConfig, timeout: Option<Duration>) -> Self {
        let (program, args) = match &config.command {
            Some(command) => (command.clone(), config.args.clone()),
            None => detect_platform_command(),
        };
        info!(program = %program, args = ?args, "Using speech command");
        Self::new(program, args, timeout)
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl Speaker for CommandSpeaker {
    async fn speak(&self, sentence: &str) -> Result<()> {
        debug!("Speaking \"{}\" via {}", sentence, &self.program);
        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(sentence)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| AnnouncerError::Speech {
                program: self.program.clone(),
                source,
            })?;

        let output = child.wait_with_output();
        let output = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, output).await {
                Ok(output) => output,
                Err(_) => {
                    // Dropping the wait future kills the child.
                    warn!(
                        "Speech command {} did not finish within {:?}, killed it",
                        &self.program, limit
                    );
                    return Ok(());
                }
            },
            None => output.await,
        };

        match output {
            Ok(output) if !output.status.success() => {
                debug!("Speech command {} exited with {}", &self.program, output.status);
            }
            Ok(_) => {}
            Err(e) => {
                debug!("Lost track of speech command {}: {:?}", &self.program, e);
            }
        }
        Ok(())
    }
}

fn detect_platform_command() -> (String, Vec<String>) {
    if cfg!(target_os = "macos") {
        return ("say".to_string(), Vec::new());
    }
    if let Some(espeak) = find_in_path("espeak-ng").or_else(|| find_in_path("espeak")) {
        return (espeak.to_string_lossy().to_string(), Vec::new());
    }
    if let Some(spd_say) = find_in_path("spd-say") {
        // spd-say returns before speaking unless told to wait.
        return (
            spd_say.to_string_lossy().to_string(),
            vec!["--wait".to_string()],
        );
    }
    warn!("No speech command found on PATH, falling back to `say`");
    ("say".to_string(), Vec::new())
}

fn find_in_path(bin: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(bin))
        .find(|candidate| candidate.is_file())
}
