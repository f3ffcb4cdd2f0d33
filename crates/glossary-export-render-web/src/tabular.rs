use core::fmt::Write as _;

use glossary_export_render::{BackendError, DocumentTitle, TableRow, TabularBackend};

/// Tab-separated rows preceded by the column-title row.
///
/// Tabs and line breaks inside a cell are folded to single spaces so every
/// entry stays on one line.
#[derive(Clone, Debug, Default)]
pub struct TsvBackend {
    out: String,
    rows: usize,
}

impl TsvBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn write_line(&mut self, cells: [&str; 3]) {
        for (i, cell) in cells.iter().enumerate() {
            if i > 0 {
                self.out.push('\t');
            }
            self.out.extend(cell.chars().map(|c| match c {
                '\t' | '\n' | '\r' => ' ',
                other => other,
            }));
        }
        self.out.push('\n');
    }
}

impl TabularBackend for TsvBackend {
    type Output = Vec<u8>;

    fn begin(&mut self, title: &DocumentTitle) -> Result<(), BackendError> {
        self.write_line(title.column_titles());
        Ok(())
    }

    fn push_row(&mut self, row: &TableRow<'_>) -> Result<(), BackendError> {
        self.write_line(row.cells());
        self.rows += 1;
        Ok(())
    }

    fn finish(self) -> Result<Self::Output, BackendError> {
        log::debug!("tsv backend wrote {} rows", self.rows);
        Ok(self.out.into_bytes())
    }
}

/// Bold title paragraph followed by a three-column pipe table.
#[derive(Clone, Debug, Default)]
pub struct MarkdownBackend {
    out: String,
    rows: usize,
}

impl MarkdownBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn write_row(&mut self, cells: [&str; 3]) -> Result<(), BackendError> {
        self.out.push('|');
        for cell in cells {
            write!(self.out, " {} |", escape_cell(cell))?;
        }
        self.out.push('\n');
        Ok(())
    }
}

fn escape_cell(cell: &str) -> String {
    let mut out = String::with_capacity(cell.len());
    for c in cell.trim_end().chars() {
        match c {
            '|' => out.push_str("\\|"),
            '\n' | '\r' => out.push(' '),
            other => out.push(other),
        }
    }
    out
}

impl TabularBackend for MarkdownBackend {
    type Output = Vec<u8>;

    fn begin(&mut self, title: &DocumentTitle) -> Result<(), BackendError> {
        writeln!(self.out, "**{}**", title.caption())?;
        self.out.push('\n');
        self.write_row(title.column_titles())?;
        self.out.push_str("|---|---|---|\n");
        Ok(())
    }

    fn push_row(&mut self, row: &TableRow<'_>) -> Result<(), BackendError> {
        self.write_row(row.cells())?;
        self.rows += 1;
        Ok(())
    }

    fn finish(self) -> Result<Self::Output, BackendError> {
        log::debug!("markdown backend wrote {} rows", self.rows);
        Ok(self.out.into_bytes())
    }
}
