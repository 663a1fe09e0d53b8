//! Shared data types for botones-exec.

/// Result of a completed one-shot command.
#[derive(Debug, Clone)]
pub struct ExecOutput {
    /// Process exit code (0 = success).
    pub exit_code: i32,

    /// Captured standard output (ANSI escapes already stripped).
    pub stdout: String,

    /// Captured standard error (ANSI escapes already stripped).
    pub stderr: String,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Configuration knobs for one-shot command execution.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Timeout in seconds. The child is killed if it runs longer.
    ///
    /// Clamped to a maximum of 300 seconds so a handler can never block
    /// indefinitely on a stuck tool.
    pub timeout_secs: u64,

    /// Maximum characters per captured stream before middle-omission
    /// truncation is applied — see [`crate::truncate::truncate_output`].
    pub max_output_chars: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_output_chars: 4_000,
        }
    }
}

impl RunOptions {
    /// Clamp `timeout_secs` to the hard maximum (300 s).
    pub(crate) fn effective_timeout_secs(&self) -> u64 {
        self.timeout_secs.min(300)
    }
}
