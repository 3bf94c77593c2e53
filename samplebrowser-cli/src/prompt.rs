//! Terminal prompts for download permission and dependency advisories.

use async_trait::async_trait;
use samplebrowser_core::{DownloadPermission, Interaction};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Asks questions on stderr and reads answers from stdin.
pub struct TerminalPrompt {
    assume_yes: bool,
}

impl TerminalPrompt {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }

    async fn ask(&self, question: &str) -> bool {
        if self.assume_yes {
            eprintln!("{} [y/N] y", question);
            return true;
        }

        let mut stderr = tokio::io::stderr();
        let prompt = format!("{} [y/N] ", question);
        if stderr.write_all(prompt.as_bytes()).await.is_err() || stderr.flush().await.is_err() {
            return false;
        }

        let mut line = String::new();
        match BufReader::new(tokio::io::stdin()).read_line(&mut line).await {
            Ok(_) => is_yes(&line),
            Err(e) => {
                tracing::warn!("Failed to read answer: {}", e);
                false
            }
        }
    }
}

/// Accepts `y` and `yes` in any case; everything else is a no.
pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[async_trait]
impl DownloadPermission for TerminalPrompt {
    async fn allow_download(&self) -> bool {
        self.ask("Required 'oneapi-cli' was not found on the PATH. Download it?")
            .await
    }
}

#[async_trait]
impl Interaction for TerminalPrompt {
    async fn confirm_dependencies(&self, advisory: &str) -> bool {
        eprintln!("{}", advisory);
        self.ask("Continue creating the sample?").await
    }

    async fn warn(&self, message: &str) {
        eprintln!("warning: {}", message);
    }
}
