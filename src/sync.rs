//! Engine orchestration: walk the source, classify each entry against the
//! destination, execute the resulting actions.

use anyhow::{Context as _, Result};
use tracing::debug;

use crate::classify::{classify, classify_dir};
use crate::execute::Executor;
use crate::fsx::Fs;
use crate::report::Report;
use crate::settings::Settings;
use crate::walk::{WalkItem, Walker};

/// Run one synchronization pass under `settings`, recording every decision
/// into `report`.
///
/// The same classification runs in dry-run and apply mode; only the executor
/// differs. A failing mutation aborts the run at that entry.
pub fn run<F: Fs>(fs: &F, settings: &Settings, report: &mut Report) -> Result<()> {
    report.root(&settings.source, &settings.dest);

    let executor = Executor::new(fs, settings.mode);
    let mut walker = Walker::new(
        fs,
        &settings.source,
        &settings.dest,
        &settings.ignore,
        settings.scope,
    )
    .with_context(|| format!("list source: {}", settings.source.display()))?;

    // skip_current_dir needs the walker between items, so no for loop here.
    #[allow(clippy::while_let_on_iterator)]
    while let Some(item) = walker.next() {
        match item.context("walk source tree")? {
            WalkItem::Ignored { rel } => report.ignore(&rel),
            WalkItem::DestinationSkipped { rel } => report.ignore_destination(&rel),
            WalkItem::EnsureDir { abs: _, rel } => {
                let dest = settings.dest.join(&rel);
                let action = classify_dir(fs, &dest, settings.policy)
                    .with_context(|| format!("inspect: {}", dest.display()))?;
                debug!(dir = %rel.display(), ?action);
                if !executor.perform_dir(action, &dest, report)? {
                    walker.skip_current_dir();
                }
            }
            WalkItem::Leaf { abs, rel, kind: _ } => {
                let dest = settings.dest.join(&rel);
                let action = classify(fs, &abs, &dest, settings.policy)
                    .with_context(|| format!("inspect: {}", dest.display()))?;
                debug!(entry = %rel.display(), ?action);
                executor.perform(action, &abs, &dest, report)?;
            }
        }
    }
    Ok(())
}
