//! Markdown to HTML conversion backends

use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};

use super::MarkdownRenderer;
use crate::config::{ConverterConfig, ConverterKind};
use crate::error::PostError;

/// Turns a Markdown body into an HTML fragment
pub trait Converter {
    fn convert(&self, markdown: &str) -> Result<String, PostError>;
}

/// Build the converter selected in the configuration
pub fn from_config(config: &ConverterConfig) -> Box<dyn Converter> {
    match config.kind {
        ConverterKind::Pandoc => Box::new(PandocConverter::new(
            config.program.clone(),
            config.args.clone(),
        )),
        ConverterKind::Builtin => Box::new(BuiltinConverter::new()),
    }
}

/// External pandoc process emitting MathML for math notation
pub struct PandocConverter {
    program: String,
    extra_args: Vec<String>,
}

impl PandocConverter {
    pub fn new(program: impl Into<String>, extra_args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            extra_args,
        }
    }

    fn args(&self) -> Vec<&str> {
        let mut args = vec!["-f", "markdown", "-t", "html", "--mathml"];
        args.extend(self.extra_args.iter().map(String::as_str));
        args
    }
}

impl Converter for PandocConverter {
    fn convert(&self, markdown: &str) -> Result<String, PostError> {
        let unavailable = |source| PostError::ConverterUnavailable {
            program: self.program.clone(),
            source,
        };

        let mut child = Command::new(&self.program)
            .args(self.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(unavailable)?;

        // Dropping stdin signals EOF to the converter
        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(markdown.as_bytes()) {
                // A converter that exits early closes the pipe; its status tells why
                if e.kind() != ErrorKind::BrokenPipe {
                    let _ = child.kill();
                    return Err(unavailable(e));
                }
            }
        }

        let output = child.wait_with_output().map_err(unavailable)?;

        if !output.status.success() {
            return Err(PostError::ConverterFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// In-process pulldown-cmark rendering
pub struct BuiltinConverter {
    renderer: MarkdownRenderer,
}

impl BuiltinConverter {
    pub fn new() -> Self {
        Self {
            renderer: MarkdownRenderer::new(),
        }
    }
}

impl Default for BuiltinConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl Converter for BuiltinConverter {
    fn convert(&self, markdown: &str) -> Result<String, PostError> {
        Ok(self.renderer.render(markdown))
    }
}
