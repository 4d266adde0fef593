//! Run transcript: one line per decision, identical in dry-run and apply.

use std::path::Path;

/// Accumulates the human-readable transcript of a run.
///
/// Every decision is recorded (and echoed to stdout) *before* the
/// corresponding mutation is attempted, so a failure's position in the output
/// identifies exactly which entry was being processed.
#[derive(Debug, Default)]
pub struct Report {
    lines: Vec<String>,
    echo: bool,
}

impl Report {
    /// A reporter that echoes each line to stdout as it is recorded.
    #[must_use]
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            echo: true,
        }
    }

    /// A reporter that only accumulates, for tests.
    #[must_use]
    pub fn silent() -> Self {
        Self::default()
    }

    fn record(&mut self, verb: &str, detail: &str) {
        let line = format!("{verb:<8} {detail}");
        if self.echo {
            println!("{line}");
        }
        self.lines.push(line);
    }

    pub fn root(&mut self, source: &Path, dest: &Path) {
        self.record("root", &format!("{} -> {}", source.display(), dest.display()));
    }

    pub fn noop_already_linked(&mut self, dest: &Path) {
        self.record("no-op", &format!("{} (already linked)", dest.display()));
    }

    pub fn noop_same_content(&mut self, dest: &Path) {
        self.record("no-op", &format!("{} (same content)", dest.display()));
    }

    pub fn ignore(&mut self, rel: &Path) {
        self.record("ignore", &rel.display().to_string());
    }

    pub fn ignore_destination(&mut self, rel: &Path) {
        self.record("ignore", &format!("{} (destination)", rel.display()));
    }

    pub fn mkdir(&mut self, dest: &Path) {
        self.record("mkdir", &dest.display().to_string());
    }

    pub fn backup(&mut self, dest: &Path, backup: &Path) {
        self.record(
            "backup",
            &format!("{} -> {}", dest.display(), backup.display()),
        );
    }

    pub fn remove(&mut self, dest: &Path) {
        self.record("remove", &dest.display().to_string());
    }

    pub fn link(&mut self, dest: &Path, source: &Path) {
        self.record("link", &format!("{} -> {}", dest.display(), source.display()));
    }

    pub fn skip(&mut self, dest: &Path) {
        self.record("skip", &dest.display().to_string());
    }

    /// The transcript so far.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The transcript as a single newline-joined block.
    #[must_use]
    pub fn transcript(&self) -> String {
        self.lines.join("\n")
    }
}
