//! Output formatting for tables and statistics (table, JSON, markdown, CSV).

use crate::config::OutputFormat;
use crate::dataset::{export, Table};
use crate::stats::{GenreDecades, StatEntry, StatsReport};

/// Formats tables and statistics for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the assembled table.
    pub fn format_table(&self, table: &Table) -> String {
        if table.is_empty() {
            return match self.format {
                OutputFormat::Json => "[]".to_string(),
                OutputFormat::Csv => format!("{}\n", export::HEADER.join(",")),
                _ => "No titles found.".to_string(),
            };
        }

        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(table).unwrap_or_else(|_| "[]".to_string())
            }
            OutputFormat::Table => self.table_rows(table),
            OutputFormat::Markdown => self.markdown_rows(table),
            OutputFormat::Csv => export::to_csv_string(table).unwrap_or_default(),
        }
    }

    /// Formats every statistic view.
    pub fn format_report(&self, report: &StatsReport) -> String {
        let sections: [(&str, &str, &[StatEntry]); 6] = [
            ("Decades", "decades", &report.decades),
            ("Genres", "genres", &report.genres),
            ("Cast", "cast", &report.cast),
            ("Directors", "directors", &report.directors),
            ("Top rated cast", "top_rated_cast", &report.top_rated_cast),
            ("Top rated directors", "top_rated_directors", &report.top_rated_directors),
        ];

        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
            }
            OutputFormat::Table => {
                let mut out = vec![format!("Rows: {}", report.rows)];
                for (title, _, entries) in sections {
                    out.push(String::new());
                    out.push(self.table_entries(title, entries));
                }
                out.push(String::new());
                out.push(self.table_genre_decades(&report.genre_decades));
                out.join("\n")
            }
            OutputFormat::Markdown => {
                let mut out = vec![format!("*{} rows*", report.rows)];
                for (title, _, entries) in sections {
                    out.push(String::new());
                    out.push(self.markdown_entries(title, entries));
                }
                out.push(String::new());
                out.push(self.markdown_genre_decades(&report.genre_decades));
                out.join("\n")
            }
            OutputFormat::Csv => Self::csv_entries(&sections, &report.genre_decades),
        }
    }

    // Table formatting

    fn table_rows(&self, table: &Table) -> String {
        let rank_width = 4;
        let year_width = 4;
        let rating_width = 6;
        let votes_width = 9;
        let title_width = 50;

        let mut lines = Vec::new();

        lines.push(format!(
            "{:>rank_width$}  {:<year_width$}  {:>rating_width$}  {:>votes_width$}  {}",
            "#", "Year", "Rating", "Votes", "Title"
        ));
        lines.push(format!(
            "{:-<rank_width$}  {:-<year_width$}  {:-<rating_width$}  {:-<votes_width$}  {:-<title_width$}",
            "", "", "", "", ""
        ));

        for (rank, row) in table.iter().enumerate() {
            lines.push(format!(
                "{:>rank_width$}  {:<year_width$}  {:>rating_width$.1}  {:>votes_width$}  {}",
                rank + 1,
                row.year,
                row.rating,
                row.votes,
                truncate(&row.title, title_width)
            ));
        }

        lines.push(String::new());
        lines.push(format!("Total: {} titles", table.len()));

        lines.join("\n")
    }

    fn table_entries(&self, title: &str, entries: &[StatEntry]) -> String {
        let key_width = 30;
        let mut lines = vec![format!("{}:", title)];

        if entries.is_empty() {
            lines.push("  (none)".to_string());
            return lines.join("\n");
        }

        lines.push(format!("  {:<key_width$}  {:>5}  {:>6}", "Key", "Count", "Avg"));
        for entry in entries {
            lines.push(format!(
                "  {:<key_width$}  {:>5}  {:>6}",
                truncate(&entry.key, key_width),
                entry.count,
                avg(entry)
            ));
        }

        lines.join("\n")
    }

    fn table_genre_decades(&self, genres: &[GenreDecades]) -> String {
        let mut lines = vec!["Genres by decade:".to_string()];

        if genres.is_empty() {
            lines.push("  (none)".to_string());
            return lines.join("\n");
        }

        for genre in genres {
            let decades: Vec<String> =
                genre.decades.iter().map(|d| format!("{} ({})", d.key, d.count)).collect();
            lines.push(format!("  {}: {}", genre.genre, decades.join(", ")));
        }

        lines.join("\n")
    }

    // Markdown formatting

    fn markdown_rows(&self, table: &Table) -> String {
        let mut lines = Vec::new();

        lines.push("| # | Title | Year | Rating | Director | Genres | Votes |".to_string());
        lines.push("|---|-------|------|--------|----------|--------|-------|".to_string());

        for (rank, row) in table.iter().enumerate() {
            lines.push(format!(
                "| {} | {} | {} | {:.1} | {} | {} | {} |",
                rank + 1,
                row.title,
                row.year,
                row.rating,
                row.director,
                row.genres.replace(',', ", "),
                row.votes
            ));
        }

        lines.push(String::new());
        lines.push(format!("*{} titles*", table.len()));

        lines.join("\n")
    }

    fn markdown_entries(&self, title: &str, entries: &[StatEntry]) -> String {
        let mut lines = vec![format!("## {}", title), String::new()];
        lines.push("| Key | Count | Avg rating |".to_string());
        lines.push("|-----|-------|------------|".to_string());

        for entry in entries {
            lines.push(format!("| {} | {} | {} |", entry.key, entry.count, avg(entry)));
        }

        lines.join("\n")
    }

    fn markdown_genre_decades(&self, genres: &[GenreDecades]) -> String {
        let mut lines = vec!["## Genres by decade".to_string(), String::new()];
        lines.push("| Genre | Decade | Count |".to_string());
        lines.push("|-------|--------|-------|".to_string());

        for genre in genres {
            for decade in &genre.decades {
                lines.push(format!("| {} | {} | {} |", genre.genre, decade.key, decade.count));
            }
        }

        lines.join("\n")
    }

    // CSV formatting

    fn csv_entries(sections: &[(&str, &str, &[StatEntry])], genres: &[GenreDecades]) -> String {
        let mut writer = csv::Writer::from_writer(Vec::new());
        let mut records = vec![vec![
            "view".to_string(),
            "key".to_string(),
            "count".to_string(),
            "avg_rating".to_string(),
        ]];

        for (_, view, entries) in sections {
            for entry in *entries {
                records.push(csv_record(view, entry));
            }
        }

        for genre in genres {
            let view = format!("genre_decades/{}", genre.genre);
            for entry in &genre.decades {
                records.push(csv_record(&view, entry));
            }
        }

        for record in &records {
            if writer.write_record(record).is_err() {
                return String::new();
            }
        }

        writer
            .into_inner()
            .map(|buffer| String::from_utf8_lossy(&buffer).into_owned())
            .unwrap_or_default()
    }
}

fn csv_record(view: &str, entry: &StatEntry) -> Vec<String> {
    vec![
        view.to_string(),
        entry.key.clone(),
        entry.count.to_string(),
        entry.avg_rating.map(|a| format!("{:.3}", a)).unwrap_or_default(),
    ]
}

fn avg(entry: &StatEntry) -> String {
    entry.avg_rating.map(|a| format!("{:.2}", a)).unwrap_or_else(|| "N/A".to_string())
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        let head: String = text.chars().take(width - 3).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Row;
    use crate::stats::Aggregator;

    fn make_row(title: &str, year: i32, rating: f32) -> Row {
        Row {
            title: title.to_string(),
            year,
            rating,
            director: "Frank Darabont".to_string(),
            runtime: "2h 22m".to_string(),
            genres: "Crime,Drama".to_string(),
            cast: "Tim Robbins,Morgan Freeman".to_string(),
            votes: 2_700_000,
            decade: year.div_euclid(10) * 10,
            detail_ref: String::new(),
        }
    }

    fn make_table() -> Table {
        Table::from_rows(vec![
            make_row("The Shawshank Redemption", 1994, 9.3),
            make_row("The Green Mile", 1999, 8.6),
        ])
    }

    #[test]
    fn test_table_format() {
        let output = Formatter::new(OutputFormat::Table).format_table(&make_table());
        assert!(output.contains("Rating"));
        assert!(output.contains("The Shawshank Redemption"));
        assert!(output.contains("9.3"));
        assert!(output.contains("2700000"));
        assert!(output.contains("Total: 2 titles"));
    }

    #[test]
    fn test_table_format_truncates_long_titles() {
        let long = "A".repeat(80);
        let table = Table::from_rows(vec![make_row(&long, 2001, 8.0)]);
        let output = Formatter::new(OutputFormat::Table).format_table(&table);
        assert!(output.contains(&format!("{}...", "A".repeat(47))));
        assert!(!output.contains(&long));
    }

    #[test]
    fn test_json_format() {
        let output = Formatter::new(OutputFormat::Json).format_table(&make_table());
        assert!(output.starts_with('['));
        assert!(output.contains("\"genres\": \"Crime,Drama\""));
        assert!(!output.contains("detail_ref"));
    }

    #[test]
    fn test_markdown_format() {
        let output = Formatter::new(OutputFormat::Markdown).format_table(&make_table());
        assert!(output.contains("| # | Title |"));
        assert!(output.contains("Crime, Drama"));
        assert!(output.contains("*2 titles*"));
    }

    #[test]
    fn test_csv_format_matches_export() {
        let table = make_table();
        let output = Formatter::new(OutputFormat::Csv).format_table(&table);
        assert_eq!(output, export::to_csv_string(&table).unwrap());
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(Formatter::new(OutputFormat::Json).format_table(&Table::new()), "[]");
        assert_eq!(
            Formatter::new(OutputFormat::Table).format_table(&Table::new()),
            "No titles found."
        );
        assert!(Formatter::new(OutputFormat::Csv).format_table(&Table::new()).starts_with("title,year"));
    }

    #[test]
    fn test_report_table() {
        let report = Aggregator::default().report(&make_table());
        let output = Formatter::new(OutputFormat::Table).format_report(&report);

        assert!(output.starts_with("Rows: 2"));
        assert!(output.contains("Decades:"));
        assert!(output.contains("1990"));
        assert!(output.contains("Morgan Freeman"));
        assert!(output.contains("8.95"));
        assert!(output.contains("Top rated cast:"));
        assert!(output.contains("Genres by decade:"));
        assert!(output.contains("  Drama: 1990 (2)"));
    }

    #[test]
    fn test_report_empty_sections() {
        let report = Aggregator::default().report(&Table::new());
        let output = Formatter::new(OutputFormat::Table).format_report(&report);
        assert!(output.contains("(none)"));
    }

    #[test]
    fn test_report_markdown() {
        let report = Aggregator::default().report(&make_table());
        let output = Formatter::new(OutputFormat::Markdown).format_report(&report);
        assert!(output.contains("## Genres"));
        assert!(output.contains("| Drama | 2 |"));
        assert!(output.contains("## Genres by decade"));
        assert!(output.contains("| Crime | 1990 | 2 |"));
        assert!(output.contains("## Top rated directors"));
    }

    #[test]
    fn test_report_json() {
        let report = Aggregator::default().report(&make_table());
        let output = Formatter::new(OutputFormat::Json).format_report(&report);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["rows"], 2);
        assert_eq!(value["directors"][0]["key"], "Frank Darabont");
    }

    #[test]
    fn test_report_csv() {
        let report = Aggregator::default().report(&make_table());
        let output = Formatter::new(OutputFormat::Csv).format_report(&report);
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines[0], "view,key,count,avg_rating");
        assert!(lines.contains(&"decades,1990,2,8.950"));
        assert!(lines.contains(&"directors,Frank Darabont,2,8.950"));
        assert!(lines.contains(&"top_rated_cast,Morgan Freeman,2,8.950"));
        assert!(lines.contains(&"genre_decades/Drama,1990,2,8.950"));
    }
}
