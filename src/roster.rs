use std::collections::BTreeSet;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::aggregate::Tally;
use crate::counter::read_line_lossy;
use crate::error::ReportError;

/// Fields needed on a roster line: a shift code, then the consultant nick.
const ROSTER_FIELDS: usize = 2;

/// Reads the active roster: the second field of every line, minus `excluded` placeholders.
pub fn load_roster(path: &Path, excluded: &BTreeSet<String>) -> Result<BTreeSet<String>, ReportError> {
    let f = std::fs::File::open(path).map_err(|e| ReportError::from_io(path, e))?;
    read_roster(BufReader::new(f), path, excluded)
}

pub fn read_roster<R: BufRead>(mut reader: R, path: &Path, excluded: &BTreeSet<String>) -> Result<BTreeSet<String>, ReportError> {
    let mut active = BTreeSet::new();
    let mut buf = Vec::new();
    let mut line_no = 0usize;
    while let Some(line) = read_line_lossy(&mut reader, &mut buf, path)? {
        line_no += 1;
        let Some(nick) = line.split_whitespace().nth(1).map(str::to_string) else {
            return Err(ReportError::Format {
                path: path.to_path_buf(),
                line_no,
                expected: ROSTER_FIELDS,
                found: line.split_whitespace().count(),
                line,
            });
        };
        active.insert(nick);
    }
    active.retain(|n| !excluded.contains(n));
    log::debug!("{}: {} active consultants", path.display(), active.len());
    Ok(active)
}

/// Drops every issuer not on `active`, whatever their counts.
pub fn retain_active(mut tally: Tally, active: &BTreeSet<String>) -> Tally {
    let before = tally.len();
    tally.retain(|issuer, _| active.contains(issuer));
    log::info!("roster filter kept {} of {} issuers", tally.len(), before);
    tally
}

/// Applies the roster filter unless `show_all` is set.
pub fn filter(tally: Tally, show_all: bool, path: &Path, excluded: &BTreeSet<String>) -> Result<Tally, ReportError> {
    if show_all { return Ok(tally); }
    let active = load_roster(path, excluded)?;
    Ok(retain_active(tally, &active))
}
