use terminal_size::{Width, Height, terminal_size};

// Widest a single cell may grow before it is truncated with an ellipsis.
const MAX_CELL_WIDTH: usize = 48;

/// Render rows as an ASCII table sized to the current terminal.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    render_table_with_width(headers, rows, get_terminal_width())
}

/// Render rows as an ASCII table, eliding any line wider than `termw`.
pub fn render_table_with_width(headers: &[&str], rows: &[Vec<String>], termw: usize) -> String {
    let cols: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let mut widths: Vec<usize> = cols.iter().map(|s| display_len(s).min(MAX_CELL_WIDTH)).collect();
    for r in rows {
        for (i, cell) in r.iter().enumerate().take(cols.len()) {
            let w = display_len(cell);
            if w > widths[i] { widths[i] = w.min(MAX_CELL_WIDTH); }
        }
    }
    crate::tprintln!("[cli.outputformatter] table cols={} rows={} termw={}", cols.len(), rows.len(), termw);

    let sep = build_separator(&widths);
    let mut out: Vec<String> = Vec::with_capacity(rows.len() + 4);
    out.push(fit_line_to_width(&sep, termw));
    out.push(fit_line_to_width(&build_row(&cols, &widths), termw));
    out.push(fit_line_to_width(&sep, termw));
    for r in rows {
        out.push(fit_line_to_width(&build_row(r, &widths), termw));
    }
    out.push(fit_line_to_width(&sep, termw));
    out.join("\n")
}

fn display_len(s: &str) -> usize { s.chars().count() }

fn build_separator(widths: &[usize]) -> String {
    let mut s = String::new();
    s.push('+');
    for w in widths {
        s.push_str(&"-".repeat(*w + 2));
        s.push('+');
    }
    s
}

fn build_row(cells: &[String], widths: &[usize]) -> String {
    let mut s = String::new();
    s.push('|');
    for (i, w) in widths.iter().enumerate() {
        let cell = cells.get(i).cloned().unwrap_or_default();
        let (text, align_right) = (truncate(&cell, *w), is_numeric_like(&cell));
        let pad = w.saturating_sub(display_len(&text));
        s.push(' ');
        if align_right {
            s.push_str(&" ".repeat(pad));
            s.push_str(&text);
        } else {
            s.push_str(&text);
            s.push_str(&" ".repeat(pad));
        }
        s.push(' ');
        s.push('|');
    }
    s
}

fn truncate(s: &str, max: usize) -> String {
    let len = s.chars().count();
    if len <= max { return s.to_string(); }
    if max <= 1 { return "…".to_string(); }
    s.chars().take(max - 1).collect::<String>() + "…"
}

fn is_numeric_like(s: &str) -> bool {
    // crude detection for aligning numbers to right
    let st = s.trim();
    if st.is_empty() { return false; }
    let mut has_digit = false;
    for ch in st.chars() {
        if ch.is_ascii_digit() { has_digit = true; continue; }
        if ".-+eE,_".contains(ch) { continue; }
        return false;
    }
    has_digit
}

fn get_terminal_width() -> usize {
    if let Some((Width(w), Height(_h))) = terminal_size() {
        return (w as usize).saturating_sub(4).max(20);
    }
    80
}

fn fit_line_to_width(s: &str, maxw: usize) -> String {
    if display_len(s) <= maxw { return s.to_string(); }
    elide_middle(s, maxw)
}

// Keep both ends of an over-wide line so the closing border stays visible.
fn elide_middle(s: &str, maxw: usize) -> String {
    if maxw <= 1 { return "…".to_string(); }
    let chars: Vec<char> = s.chars().collect();
    let keep = maxw - 1;
    let head = keep / 2 + keep % 2;
    let tail = keep / 2;
    let mut out: String = chars[..head].iter().collect();
    out.push('…');
    out.extend(chars[chars.len() - tail..].iter());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_layout() {
        let rows = vec![
            vec!["1".to_string(), "report.pdf".to_string()],
            vec!["12".to_string(), "a.txt".to_string()],
        ];
        let t = render_table_with_width(&["ID", "FileName"], &rows, 200);
        let lines: Vec<&str> = t.lines().collect();
        assert_eq!(lines[0], "+----+------------+");
        assert_eq!(lines[1], "| ID | FileName   |");
        assert_eq!(lines[3], "|  1 | report.pdf |");
        assert_eq!(lines[4], "| 12 | a.txt      |");
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn long_cells_truncate_and_lines_fit() {
        let long = "x".repeat(100);
        let t = render_table_with_width(&["name"], &[vec![long]], 30);
        for l in t.lines() {
            assert!(display_len(l) <= 30, "{l}");
        }
        assert!(t.contains('…'));
    }

    #[test]
    fn elide_keeps_both_ends() {
        assert_eq!(elide_middle("abcdefghij", 5), "ab…ij");
        assert_eq!(truncate("abcdef", 4), "abc…");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
