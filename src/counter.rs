use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::ReportError;

/// Fields in a warning line: warned_user timestamp consultant comment.
const WARNING_FIELDS: usize = 4;

/// Counts warnings per issuing consultant in one category's log file.
pub fn count_warnings(path: &Path) -> Result<HashMap<String, u64>, ReportError> {
    let f = std::fs::File::open(path).map_err(|e| ReportError::from_io(path, e))?;
    count_lines(BufReader::new(f), path)
}

/// Same as [`count_warnings`] over any reader; `path` only labels errors.
pub fn count_lines<R: BufRead>(mut reader: R, path: &Path) -> Result<HashMap<String, u64>, ReportError> {
    let mut counts: HashMap<String, u64> = HashMap::new();
    let mut buf = Vec::new();
    let mut lines = 0usize;
    while let Some(line) = read_line_lossy(&mut reader, &mut buf, path)? {
        lines += 1;
        let issuer = issuer_of(&line).ok_or_else(|| ReportError::Format {
            path: path.to_path_buf(),
            line_no: lines,
            expected: WARNING_FIELDS,
            found: line.split_whitespace().count(),
            line: line.clone(),
        })?;
        *counts.entry(issuer.to_string()).or_insert(0) += 1;
    }
    log::debug!("{}: {} warnings from {} issuers", path.display(), lines, counts.len());
    Ok(counts)
}

/// Next line without its terminator, or `None` at end of input.
/// Bytes that are not UTF-8 become U+FFFD.
pub fn read_line_lossy<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>, path: &Path) -> Result<Option<String>, ReportError> {
    buf.clear();
    let read = reader.read_until(b'\n', buf).map_err(|e| ReportError::from_io(path, e))?;
    if read == 0 { return Ok(None); }
    if buf.last() == Some(&b'\n') { buf.pop(); }
    if buf.last() == Some(&b'\r') { buf.pop(); }
    Ok(Some(String::from_utf8_lossy(buf).into_owned()))
}

/// Third field of a warning line, provided a comment follows it.
fn issuer_of(line: &str) -> Option<&str> {
    let mut fields = line.split_whitespace();
    let (Some(_warned), Some(_timestamp), Some(issuer), Some(_comment)) = (fields.next(), fields.next(), fields.next(), fields.next()) else {
        return None;
    };
    Some(issuer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn counts_per_issuer() {
        let data = "alice 1000 bob hi\ncarol 1001 bob bye\ndave 1002 eve ok\n";
        let counts = count_lines(data.as_bytes(), Path::new("food")).unwrap();
        assert_eq!(counts.len(), 2);
        assert_eq!(counts["bob"], 2);
        assert_eq!(counts["eve"], 1);
    }

    #[test]
    fn comment_may_contain_spaces() {
        let data = "alice 1000 bob left a whole pizza on the keyboard\n";
        let counts = count_lines(data.as_bytes(), Path::new("food")).unwrap();
        assert_eq!(counts["bob"], 1);
    }

    #[test]
    fn short_line_is_a_format_error() {
        let data = "alice 1000 bob hi\nalice 1001 bob\n";
        match count_lines(data.as_bytes(), Path::new("food")) {
            Err(ReportError::Format { line_no, found, expected, .. }) => {
                assert_eq!((line_no, found, expected), (2, 3, 4));
            }
            other => panic!("expected format error, got {:?}", other),
        }
    }

    #[test]
    fn latin1_comment_still_counts() {
        let data: &[u8] = b"alice 1000 bob caf\xe9 spill\r\ncarol 1001 bob ok\n";
        let counts = count_lines(data, Path::new("food")).unwrap();
        assert_eq!(counts["bob"], 2);
    }

    #[test]
    fn blank_line_is_malformed() {
        let data = "alice 1000 bob hi\n\n";
        assert!(matches!(count_lines(data.as_bytes(), Path::new("food")), Err(ReportError::Format { line_no: 2, .. })));
    }

    #[test]
    fn empty_file_counts_nothing() {
        assert!(count_lines("".as_bytes(), Path::new("food")).unwrap().is_empty());
    }

    #[test]
    fn reads_from_disk_and_reports_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("printer-warnings");
        let mut f = std::fs::File::create(&p).unwrap();
        writeln!(f, "u1 1 zed jammed tray 2").unwrap();
        writeln!(f, "u2 2 zed again").unwrap();
        drop(f);
        assert_eq!(count_warnings(&p).unwrap()["zed"], 2);
        let missing = dir.path().join("food-warnings");
        match count_warnings(&missing) {
            Err(ReportError::NotFound { path }) => assert_eq!(path, missing),
            other => panic!("expected not found, got {:?}", other),
        }
    }
}
