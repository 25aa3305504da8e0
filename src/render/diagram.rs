//! Diagram rendering through an external command.
//!
//! The configured command line is split on whitespace (no shell), `{lang}`
//! is replaced with the fence language, the diagram source is written to
//! stdin, and stdout must contain an SVG document.
//!
//! ```toml
//! [render]
//! diagram_command = "mmdc --input - --output - --outputFormat svg"
//! ```

use super::{CollaboratorError, DiagramRenderer};
use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Instant;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct CommandDiagramRenderer {
    command: String,
}

impl CommandDiagramRenderer {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    fn argv(&self, language: &str) -> Vec<String> {
        self.command
            .split_whitespace()
            .map(|part| part.replace("{lang}", language))
            .collect()
    }
}

impl DiagramRenderer for CommandDiagramRenderer {
    fn render(&self, language: &str, source: &str) -> Result<String, CollaboratorError> {
        let started_at = Instant::now();
        let argv = self.argv(language);
        let (program, args) = argv.split_first().ok_or(CollaboratorError::EmptyCommand)?;

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| {
                warn!(
                    program = %program,
                    error = %err,
                    "Failed to spawn diagram command"
                );
                CollaboratorError::Spawn(err)
            })?;

        // stdin is fed while stdout is drained.
        let writer = child.stdin.take().map(|mut stdin| {
            let input = source.as_bytes().to_vec();
            thread::spawn(move || stdin.write_all(&input))
        });
        let output = child.wait_with_output().map_err(CollaboratorError::Spawn)?;
        if let Some(writer) = writer {
            match writer.join() {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    debug!(error = %err, "Diagram command closed stdin early");
                }
                Err(_) => {
                    debug!("Diagram stdin writer panicked");
                }
            }
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(CollaboratorError::Command {
                exit_code: output.status.code(),
                stderr,
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let Some(start) = stdout.find("<svg") else {
            return Err(CollaboratorError::NoSvg);
        };
        let svg = stdout[start..].trim_end().to_string();
        debug!(
            language = %language,
            elapsed_ms = started_at.elapsed().as_millis() as u64,
            svg_bytes = svg.len(),
            "Diagram rendered"
        );
        Ok(svg)
    }
}
