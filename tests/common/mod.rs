#![allow(dead_code, clippy::expect_used, clippy::unwrap_used)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use linkfarm::cli::Args;
use linkfarm::fsx::RealFs;
use linkfarm::report::Report;
use linkfarm::settings::Settings;
use linkfarm::sync;

/// Temporary source and destination trees for end-to-end runs.
pub struct Sandbox {
    _root: TempDir,
    pub source: PathBuf,
    pub dest: PathBuf,
}

impl Sandbox {
    pub fn new() -> Self {
        let root = TempDir::new().expect("create sandbox");
        fs::create_dir(root.path().join("source")).expect("create source root");
        fs::create_dir(root.path().join("dest")).expect("create dest root");
        let source = dunce::canonicalize(root.path().join("source")).expect("canonical source");
        let dest = dunce::canonicalize(root.path().join("dest")).expect("canonical dest");
        Self {
            _root: root,
            source,
            dest,
        }
    }

    /// Write a file under the source tree, creating parent directories.
    pub fn source_file(&self, rel: &str, contents: &str) {
        write_file(&self.source.join(rel), contents);
    }

    /// Write a file under the destination tree, creating parent directories.
    pub fn dest_file(&self, rel: &str, contents: &str) {
        write_file(&self.dest.join(rel), contents);
    }

    pub fn args(&self) -> Args {
        Args {
            source: Some(self.source.clone()),
            dest: Some(self.dest.clone()),
            mode: None,
            apply: false,
            top_level: false,
            ignore: Vec::new(),
            verbose: false,
        }
    }

    /// Resolve settings and run one pass, returning the transcript.
    pub fn run(&self, args: &Args) -> Vec<String> {
        let fs = RealFs;
        let settings = Settings::resolve(&fs, args).expect("resolve settings");
        let mut report = Report::silent();
        sync::run(&fs, &settings, &mut report).expect("run sync");
        report.lines().to_vec()
    }

    /// Replace the sandbox roots and backup timestamps in a transcript with
    /// stable placeholders.
    pub fn normalize(&self, lines: &[String]) -> String {
        lines
            .iter()
            .map(|line| {
                let line = line
                    .replace(&self.source.display().to_string(), "<SRC>")
                    .replace(&self.dest.display().to_string(), "<DEST>");
                scrub_backup_stamps(&line)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Rewrite every `.bak-YYYYMMDD-HHMMSS` suffix as `.bak-[stamp]`.
fn scrub_backup_stamps(line: &str) -> String {
    const MARKER: &str = ".bak-";
    let mut out = String::new();
    let mut rest = line;
    while let Some(idx) = rest.find(MARKER) {
        let split = idx + MARKER.len();
        out.push_str(&rest[..split]);
        rest = &rest[split..];
        if is_backup_stamp(rest.as_bytes()) {
            out.push_str("[stamp]");
            rest = &rest[15..];
        }
    }
    out.push_str(rest);
    out
}

fn is_backup_stamp(bytes: &[u8]) -> bool {
    bytes.len() >= 15
        && bytes[..8].iter().all(u8::is_ascii_digit)
        && bytes[8] == b'-'
        && bytes[9..15].iter().all(u8::is_ascii_digit)
}

fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent directories");
    }
    fs::write(path, contents).expect("write fixture file");
}
