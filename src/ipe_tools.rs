use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use log::{debug, error, info};
use tokio::process::Command;

use crate::app_config::IpeConfig;
use crate::errors::ToolError;
use crate::file_utils::FileManager;

// @module: Decoder/encoder subprocess wrappers

/// Wrapper around the external decode/encode binaries.
///
/// The decoder extracts the XML payload from a container; the encoder
/// re-typesets a restored payload back into a container. Both run under a
/// shared timeout and leave their inputs untouched on failure.
#[derive(Debug, Clone)]
pub struct IpeTools {
    decoder: String,
    encoder: String,
    timeout: Duration,
}

impl IpeTools {
    pub fn new(config: &IpeConfig) -> Self {
        Self {
            decoder: config.decoder.clone(),
            encoder: config.encoder.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Extract the XML payload of `container` into `payload_out`
    pub async fn decode(&self, container: &Path, payload_out: &Path) -> Result<(), ToolError> {
        if let Some(parent) = payload_out.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let output = self
            .run_tool(
                &self.decoder,
                &[container.as_os_str(), payload_out.as_os_str()],
            )
            .await?;

        if !output.status.success() || !FileManager::file_exists(payload_out) {
            let detail = format!(
                "exit {}{}",
                output
                    .status
                    .code()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string()),
                match filter_tool_stderr(&output.stderr) {
                    s if s.is_empty() => String::new(),
                    s => format!(": {}", s),
                }
            );
            return Err(ToolError::DecoderFailed {
                input: container.to_path_buf(),
                detail,
            });
        }
        info!(
            "decoded {} -> {}",
            container.display(),
            payload_out.display()
        );
        Ok(())
    }

    /// Re-encode the restored payload at `payload` into `container_out`.
    /// On rejection the captured stderr is written to `log_path` for LaTeX
    /// error diagnosis.
    pub async fn encode(
        &self,
        payload: &Path,
        container_out: &Path,
        log_path: &Path,
    ) -> Result<(), ToolError> {
        if let Some(parent) = container_out.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let pdf_flag = std::ffi::OsString::from("-pdf");
        let output = self
            .run_tool(
                &self.encoder,
                &[pdf_flag.as_os_str(), payload.as_os_str(), container_out.as_os_str()],
            )
            .await?;

        if !output.status.success() || !FileManager::file_exists(container_out) {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if let Err(e) = FileManager::write_to_file(log_path, &stderr) {
                error!("failed to write encoder log: {}", e);
            }
            return Err(ToolError::EncoderRejected {
                log_path: log_path.to_path_buf(),
            });
        }
        info!(
            "encoded {} -> {}",
            payload.display(),
            container_out.display()
        );
        Ok(())
    }

    async fn run_tool(
        &self,
        tool: &str,
        args: &[&std::ffi::OsStr],
    ) -> Result<Output, ToolError> {
        debug!("running {} {:?}", tool, args);
        let future = Command::new(tool).args(args).output();

        tokio::select! {
            result = future => {
                result.map_err(|source| ToolError::Launch {
                    tool: tool.to_string(),
                    source,
                })
            },
            _ = tokio::time::sleep(self.timeout) => {
                Err(ToolError::Timeout {
                    tool: tool.to_string(),
                    seconds: self.timeout.as_secs(),
                })
            }
        }
    }
}

/// Keep only the stderr lines worth surfacing: drop blank lines and the
/// progress chatter the tools emit on every run
fn filter_tool_stderr(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| {
            !line.starts_with("This is ")
                && !line.starts_with("entering extended mode")
                && !line.contains("Output written on")
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// The encode log path for a document name inside the logs directory
pub fn encode_log_path(logs_dir: &Path, name: &str) -> PathBuf {
    logs_dir.join(format!("{}.encode.log", name))
}
