//! Purpose: Render aligned plain-text tables for operator-facing reports.
//! Exports: `render_table`.
//! Invariants: Cells never break a line; embedded newlines are escaped.

pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    if headers.is_empty() {
        return String::new();
    }
    let column_count = headers.len();
    let mut sanitized_rows = Vec::with_capacity(rows.len());
    let mut widths = headers
        .iter()
        .map(|header| header.chars().count())
        .collect::<Vec<_>>();

    for row in rows {
        let mut sanitized = Vec::with_capacity(column_count);
        for (idx, width) in widths.iter_mut().enumerate() {
            let value = row.get(idx).map(String::as_str).unwrap_or("");
            let cleaned = sanitize_table_cell(value);
            *width = (*width).max(cleaned.chars().count());
            sanitized.push(cleaned);
        }
        sanitized_rows.push(sanitized);
    }

    let mut lines = Vec::with_capacity(sanitized_rows.len() + 1);
    lines.push(format_table_line(
        &headers
            .iter()
            .map(|header| header.to_string())
            .collect::<Vec<_>>(),
        &widths,
    ));
    for row in sanitized_rows {
        lines.push(format_table_line(&row, &widths));
    }
    lines.join("\n")
}

fn sanitize_table_cell(value: &str) -> String {
    value.replace('\n', "\\n").replace('\r', "\\r")
}

fn format_table_line(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::new();
    for (idx, width) in widths.iter().enumerate() {
        if idx > 0 {
            line.push_str("  ");
        }
        let cell = cells.get(idx).map(String::as_str).unwrap_or("");
        line.push_str(cell);
        let cell_len = cell.chars().count();
        if *width > cell_len {
            line.push_str(&" ".repeat(*width - cell_len));
        }
    }
    line.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::render_table;

    #[test]
    fn columns_align_to_widest_cell() {
        let text = render_table(
            &["COLUMN", "COUNT_FILES"],
            &[
                vec!["id".to_string(), "2".to_string()],
                vec!["description".to_string(), "1".to_string()],
            ],
        );
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "COLUMN       COUNT_FILES");
        assert_eq!(lines[1], "id           2");
        assert_eq!(lines[2], "description  1");
    }

    #[test]
    fn newlines_in_cells_are_escaped() {
        let text = render_table(&["A"], &[vec!["x\ny".to_string()]]);
        assert_eq!(text, "A\nx\\ny");
    }

    #[test]
    fn no_headers_renders_nothing() {
        assert_eq!(render_table(&[], &[vec!["x".to_string()]]), "");
    }
}
