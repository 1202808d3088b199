//! Plain-text table output.
//!
//! Pure formatting, no I/O: every function returns a String so the
//! renderers are testable without capturing stdout.

/// Left-pad columns to the widest cell, two spaces between columns.
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let mut out = String::new();
    render_row(&mut out, headers.iter().map(|h| h.to_string()), &widths);
    for row in rows {
        render_row(&mut out, row.iter().cloned(), &widths);
    }
    out
}

fn render_row(out: &mut String, cells: impl Iterator<Item = String>, widths: &[usize]) {
    let cells: Vec<String> = cells.collect();
    for (i, cell) in cells.iter().enumerate() {
        out.push_str(cell);
        if i + 1 < cells.len() {
            let pad = widths[i].saturating_sub(cell.chars().count()) + 2;
            out.extend(std::iter::repeat(' ').take(pad));
        }
    }
    out.push('\n');
}

/// Amounts in EUR, two decimals.
pub fn eur(value: f64) -> String {
    format!("{:.2} €", value)
}

/// Surfaces in m², two decimals.
pub fn mq(value: f64) -> String {
    format!("{:.2} m²", value)
}

/// `-` for absent optional fields.
pub fn opt<T: std::fmt::Display>(value: &Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_pads_to_widest_cell() {
        let out = table(
            &["ID", "COMUNE"],
            &[
                vec!["1".to_string(), "Treviso".to_string()],
                vec!["12".to_string(), "Oderzo".to_string()],
            ],
        );
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "ID  COMUNE");
        assert_eq!(lines[1], "1   Treviso");
        assert_eq!(lines[2], "12  Oderzo");
    }

    #[test]
    fn test_table_headers_only() {
        let out = table(&["A", "B"], &[]);
        assert_eq!(out, "A  B\n");
    }

    #[test]
    fn test_eur_and_mq() {
        assert_eq!(eur(1234.5), "1234.50 €");
        assert_eq!(mq(850.0), "850.00 m²");
    }

    #[test]
    fn test_opt() {
        assert_eq!(opt(&Some(42)), "42");
        assert_eq!(opt::<i64>(&None), "-");
    }
}
