//! Plain-text table rendering for report rows.
//!
//! The renderer has no knowledge of reports: it takes headers and rows of
//! display strings and draws a grid.

/// Headers plus rows of display strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str], rows: Vec<Vec<String>>) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows,
        }
    }

    /// Width of each column, in characters
    fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();

        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                let len = cell.chars().count();
                match widths.get_mut(i) {
                    Some(width) => *width = (*width).max(len),
                    None => widths.push(len),
                }
            }
        }
        widths
    }
}

/// Render a table as an ASCII grid
///
/// **Public** - used by the report command
///
/// # Example output
/// ```text
/// +-----+----------+
/// | Key | Nr. Keys |
/// +-----+----------+
/// | a:* | 3        |
/// +-----+----------+
/// ```
pub fn render_table(table: &Table) -> String {
    let widths = table.column_widths();
    let separator = separator_line(&widths);

    let mut out = String::new();
    out.push_str(&separator);
    out.push_str(&row_line(&table.headers, &widths));
    out.push_str(&separator);

    for row in &table.rows {
        out.push_str(&row_line(row, &widths));
    }
    if !table.rows.is_empty() {
        out.push_str(&separator);
    }
    out
}

fn separator_line(widths: &[usize]) -> String {
    let mut line = String::from("+");
    for width in widths {
        line.push_str(&"-".repeat(width + 2));
        line.push('+');
    }
    line.push('\n');
    line
}

fn row_line(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::from("|");
    for (i, width) in widths.iter().enumerate() {
        let cell = cells.get(i).map(String::as_str).unwrap_or("");
        let padding = width - cell.chars().count();
        line.push_str(&format!(" {}{} |", cell, " ".repeat(padding)));
    }
    line.push('\n');
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_table() {
        let table = Table::new(
            &["Key", "Nr. Keys"],
            vec![
                vec!["a:*".to_string(), "3".to_string()],
                vec!["bb:cc".to_string(), "12".to_string()],
            ],
        );

        let expected = "\
+-------+----------+
| Key   | Nr. Keys |
+-------+----------+
| a:*   | 3        |
| bb:cc | 12       |
+-------+----------+
";
        assert_eq!(render_table(&table), expected);
    }

    #[test]
    fn test_render_pads_short_rows() {
        let table = Table::new(&["Key", "GET"], vec![vec!["héllo".to_string()]]);

        let expected = "\
+-------+-----+
| Key   | GET |
+-------+-----+
| héllo |     |
+-------+-----+
";
        assert_eq!(render_table(&table), expected);
    }

    #[test]
    fn test_render_empty_table() {
        let table = Table::new(&["Key"], Vec::new());
        assert_eq!(render_table(&table), "+-----+\n| Key |\n+-----+\n");
    }
}
