//! External format converter interface
//!
//! SVG→PDF and AI/EPS→SVG conversions are delegated to external tools,
//! invoked as isolated subprocesses. The engine only assumes exit status and
//! output-file existence as the success contract, so the whole capability
//! sits behind a narrow trait and tests inject fakes instead of spawning
//! real processes.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use log::debug;

use crate::error::{EngineError, EngineResult};

/// Narrow capability interface for the external converters.
pub trait Converter {
    /// Convert an SVG file to a vector PDF, returning the output path.
    fn svg_to_pdf(&self, input: &Path, work_dir: &Path) -> EngineResult<PathBuf>;

    /// Convert an AI/EPS file to SVG, returning the output path.
    fn ai_eps_to_svg(&self, input: &Path, work_dir: &Path) -> EngineResult<PathBuf>;
}

/// Subprocess-backed converter using `rsvg-convert` and Inkscape.
///
/// Conversions run with a wall-clock timeout; a timed-out tool is killed and
/// reported as a conversion failure so the caller can skip the element
/// rather than hang the whole generation.
pub struct CommandConverter {
    pub rsvg_convert_bin: String,
    pub inkscape_bin: String,
    pub timeout: Duration,
}

impl Default for CommandConverter {
    fn default() -> Self {
        Self {
            rsvg_convert_bin: "rsvg-convert".to_string(),
            inkscape_bin: "inkscape".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl CommandConverter {
    fn run(&self, mut command: Command, output: &Path, tool: &str) -> EngineResult<()> {
        debug!("running converter {tool}: {command:?}");
        let child = command
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| EngineError::ConversionTool(format!("{tool}: {e}")))?;

        let status = self.wait_with_timeout(child, tool)?;
        if !status.success() {
            return Err(EngineError::ConversionTool(format!(
                "{tool} exited with {status}"
            )));
        }
        if !output.exists() {
            return Err(EngineError::ConversionTool(format!(
                "{tool} reported success but produced no output file"
            )));
        }
        Ok(())
    }

    fn wait_with_timeout(
        &self,
        mut child: Child,
        tool: &str,
    ) -> EngineResult<std::process::ExitStatus> {
        let deadline = Instant::now() + self.timeout;
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) => {
                    if Instant::now() >= deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(EngineError::ConversionTool(format!(
                            "{tool} timed out after {:?}",
                            self.timeout
                        )));
                    }
                    std::thread::sleep(Duration::from_millis(25));
                }
                Err(e) => {
                    return Err(EngineError::ConversionTool(format!("{tool}: {e}")));
                }
            }
        }
    }
}

fn output_path(input: &Path, work_dir: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("converted");
    work_dir.join(format!("{stem}{suffix}"))
}

impl Converter for CommandConverter {
    fn svg_to_pdf(&self, input: &Path, work_dir: &Path) -> EngineResult<PathBuf> {
        let output = output_path(input, work_dir, "_converted.pdf");
        let mut command = Command::new(&self.rsvg_convert_bin);
        command
            .arg("-f")
            .arg("pdf")
            .arg("-o")
            .arg(&output)
            .arg(input);
        self.run(command, &output, "rsvg-convert")?;
        Ok(output)
    }

    fn ai_eps_to_svg(&self, input: &Path, work_dir: &Path) -> EngineResult<PathBuf> {
        let output = output_path(input, work_dir, "_converted.svg");
        let mut command = Command::new(&self.inkscape_bin);
        command
            .arg(input)
            .arg("--export-plain-svg")
            .arg(format!("--export-filename={}", output.display()));
        self.run(command, &output, "inkscape")?;
        Ok(output)
    }
}
