use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use serde::Serialize;
use std::path::Path;

use crate::aggregate::Tally;
use crate::plan::SortOrder;
use crate::registry::Registry;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: String,
    pub short_name: String,
}

/// One consultant's counts, aligned with [`Leaderboard::columns`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Row {
    pub who: String,
    pub counts: Vec<u64>,
}

/// Rows sorted by descending count in the first column.
#[derive(Clone, Debug, Serialize)]
pub struct Leaderboard {
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
}

pub fn build(registry: &Registry, order: &SortOrder, tally: &Tally) -> Leaderboard {
    let columns: Vec<Column> = order
        .categories(registry)
        .map(|c| Column { name: c.name.clone(), short_name: c.short_name.clone() })
        .collect();
    let mut rows: Vec<Row> = tally
        .iter()
        .map(|(who, rec)| Row { who: who.clone(), counts: columns.iter().map(|c| rec.count(&c.name)).collect() })
        .collect();
    // Stable: equal counts stay in issuer-name order.
    rows.sort_by(|a, b| b.counts[0].cmp(&a.counts[0]));
    Leaderboard { columns, rows }
}

/// The classic fixed-width leaderboard, blank line above and below.
pub fn render_text(board: &Leaderboard) -> String {
    let mut s = String::from("\n");
    for c in &board.columns { s.push_str(&format!(" {:>5} ", c.short_name)); }
    s.push_str(" who\n");
    for _ in &board.columns { s.push_str(" ----- "); }
    s.push_str(" ---\n");
    for r in &board.rows {
        for n in &r.counts { s.push_str(&format!(" {:>5} ", n)); }
        s.push_str(&format!(" {}\n", r.who));
    }
    s.push('\n');
    s
}

pub fn render_table(board: &Leaderboard) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    let mut hdr: Vec<Cell> = board.columns.iter().map(|c| Cell::new(&c.short_name)).collect();
    hdr.push(Cell::new("who"));
    table.set_header(hdr);
    for r in &board.rows {
        let mut row: Vec<Cell> = r.counts.iter().map(|n| Cell::new(n).set_alignment(CellAlignment::Right)).collect();
        row.push(Cell::new(&r.who));
        table.add_row(row);
    }
    format!("{}\n", table)
}

pub fn render_json(board: &Leaderboard) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(board)
}

pub fn write_csv(path: &Path, board: &Leaderboard) -> Result<(), std::io::Error> {
    let mut wtr = csv::Writer::from_path(path)?;
    let mut hdr: Vec<&str> = board.columns.iter().map(|c| c.short_name.as_str()).collect();
    hdr.push("who");
    wtr.write_record(&hdr)?;
    for r in &board.rows {
        let mut rec: Vec<String> = r.counts.iter().map(|n| n.to_string()).collect();
        rec.push(r.who.clone());
        wtr.write_record(&rec)?;
    }
    wtr.flush()?;
    Ok(())
}
