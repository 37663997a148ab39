use usage_engine::SummaryTable;

/// Renders a summary table with right-aligned numeric columns.
pub fn render_table(first_column: &str, table: &SummaryTable) -> String {
    let mut header = vec![first_column.to_string()];
    header.extend(table.columns.iter().cloned());
    let rows: Vec<Vec<String>> = table
        .display
        .iter()
        .map(|row| {
            vec![
                row.label.clone(),
                row.total.clone(),
                row.commons.clone(),
                row.private.clone(),
                row.scavenge.clone(),
            ]
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(String::len).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    push_line(&mut out, &rule, &widths);
    for row in &rows {
        push_line(&mut out, row, &widths);
    }
    out
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(index, (cell, width))| {
            if index == 0 {
                format!("{:<width$}", cell, width = *width)
            } else {
                format!("{:>width$}", cell, width = *width)
            }
        })
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use usage_core::{CategoryTotals, SummaryRow};
    use usage_engine::summary_table;

    #[test]
    fn aligns_columns() {
        let table = summary_table(vec![
            SummaryRow {
                label: "2024-01".to_string(),
                totals: CategoryTotals {
                    total: 1234.5,
                    commons: 0.0,
                    private: 1234.5,
                    scavenge: 0.0,
                },
            },
            SummaryRow {
                label: "Grand Total".to_string(),
                totals: CategoryTotals {
                    total: 1234.5,
                    commons: 0.0,
                    private: 1234.5,
                    scavenge: 0.0,
                },
            },
        ]);
        let rendered = render_table("Month", &table);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "Month          Total  Commons       PI  Scavenge");
        assert_eq!(lines[2], "2024-01      1,234.5      0.0  1,234.5       0.0");
        assert!(lines[3].starts_with("Grand Total"));
    }
}
