use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::score::Scorecard;

/// Write one `<column>: True|False` line per column, in column order.
pub fn write_verdicts(card: &Scorecard, out: &mut impl Write) -> io::Result<()> {
    for verdict in &card.columns {
        writeln!(out, "{}: {}", verdict.column, verdict_word(verdict.passed))?;
    }
    Ok(())
}

fn verdict_word(passed: bool) -> &'static str {
    if passed {
        "True"
    } else {
        "False"
    }
}

/// Write one line per unit that could not be scored.
pub fn write_failures(card: &Scorecard, out: &mut impl Write) -> io::Result<()> {
    for verdict in &card.columns {
        for failure in &verdict.failures {
            writeln!(out, "{} @ {}: {}", verdict.column, failure.date, failure.reason)?;
        }
    }
    Ok(())
}

/// Save the full scorecard as pretty-printed JSON.
pub fn save_json(card: &Scorecard, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(card).context("serializing scorecard")?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))
}
