//! Reconstruct tables from pdftotext -layout output.
//!
//! pdftotext -layout preserves column alignment using spaces. A cell is a
//! run of text whose words are separated by single spaces; two or more
//! spaces (or a tab) separate cells. A table is a run of consecutive lines
//! that each hold two or more cells.

use crate::extraction::PageContent;

const MIN_TABLE_LINES: usize = 2;

/// A cell on one layout line, positioned by character offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

/// A table found on one page: header cells plus data rows aligned to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

/// Split one layout line into cells.
pub fn split_cells(line: &str) -> Vec<Cell> {
    let chars: Vec<char> = line.chars().collect();
    let mut cells = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        if chars[i].is_whitespace() {
            i += 1;
            continue;
        }

        let start = i;
        let mut end = i;
        while i < chars.len() {
            if chars[i].is_whitespace() {
                let gap_start = i;
                while i < chars.len() && chars[i].is_whitespace() {
                    i += 1;
                }
                let gap = &chars[gap_start..i];
                if gap.len() >= 2 || gap.contains(&'\t') {
                    break;
                }
            } else {
                i += 1;
                end = i;
            }
        }

        cells.push(Cell {
            start,
            end,
            text: chars[start..end].iter().collect(),
        });
    }

    cells
}

/// Find the tables on a page, top to bottom.
pub fn find_tables(page: &PageContent) -> Vec<LayoutTable> {
    let mut tables = Vec::new();
    let mut run: Vec<Vec<Cell>> = Vec::new();

    for line in &page.lines {
        let cells = split_cells(line);
        if cells.len() >= 2 {
            run.push(cells);
            continue;
        }
        if run.len() >= MIN_TABLE_LINES {
            tables.push(build_table(&run));
        }
        run.clear();
    }

    if run.len() >= MIN_TABLE_LINES {
        tables.push(build_table(&run));
    }

    tables
}

fn build_table(run: &[Vec<Cell>]) -> LayoutTable {
    let header_cells = &run[0];
    let header: Vec<String> = header_cells.iter().map(|c| c.text.clone()).collect();

    // Column k spans from its header start to the next header start.
    let spans: Vec<(usize, usize)> = header_cells
        .iter()
        .enumerate()
        .map(|(k, c)| {
            let next = header_cells.get(k + 1).map(|n| n.start).unwrap_or(usize::MAX);
            (c.start, next)
        })
        .collect();

    let rows = run[1..]
        .iter()
        .map(|cells| {
            let mut row: Vec<Option<String>> = vec![None; header.len()];
            for cell in cells {
                let col = best_column(cell, &spans);
                row[col] = Some(match row[col].take() {
                    Some(existing) => format!("{existing} {}", cell.text),
                    None => cell.text.clone(),
                });
            }
            row
        })
        .collect();

    LayoutTable { header, rows }
}

/// Column whose span overlaps the cell most; first column when none do.
fn best_column(cell: &Cell, spans: &[(usize, usize)]) -> usize {
    let mut best = 0;
    let mut best_overlap = 0;
    for (k, &(lo, hi)) in spans.iter().enumerate() {
        let overlap = cell.end.min(hi).saturating_sub(cell.start.max(lo));
        if overlap > best_overlap {
            best = k;
            best_overlap = overlap;
        }
    }
    best
}
