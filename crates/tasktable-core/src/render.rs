use std::io::{self, IsTerminal, Write};

use anyhow::anyhow;
use chrono::NaiveDate;
use chrono::format::{Item, StrftimeItems};
use unicode_width::UnicodeWidthStr;

use crate::board::Board;
use crate::config::Config;
use crate::datetime::{DEFAULT_DISPLAY_FORMAT, format_deadline};
use crate::filter::FilterMode;
use crate::task::{Status, TaskField};

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
    date_format: String,
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let color = cfg.get_bool("color")?.unwrap_or(true);

        // chrono panics while formatting a pattern it cannot parse.
        let date_format = cfg.date_format();
        if StrftimeItems::new(&date_format).any(|item| matches!(item, Item::Error)) {
            return Err(anyhow!("invalid date.format: {date_format:?}"));
        }

        Ok(Self {
            color: color && io::stdout().is_terminal(),
            date_format,
        })
    }

    /// No ANSI escapes, default date format.
    pub fn plain() -> Self {
        Self {
            color: false,
            date_format: DEFAULT_DISPLAY_FORMAT.to_string(),
        }
    }

    #[tracing::instrument(skip_all)]
    pub fn render_board<W: Write>(
        &self,
        mut out: W,
        board: &Board,
        today: NaiveDate,
    ) -> anyhow::Result<()> {
        let tabs = FilterMode::ALL
            .iter()
            .map(|mode| {
                let name = tab_label(*mode);
                if *mode == board.filter() {
                    self.paint(&format!("[{name}]"), "1")
                } else {
                    format!(" {name} ")
                }
            })
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(out, "{tabs}")?;

        let tasks = board.visible();
        if tasks.is_empty() {
            writeln!(out, "No tasks")?;
            return Ok(());
        }

        let headers = vec![
            "ID".to_string(),
            "Description".to_string(),
            "Status".to_string(),
            "Deadline".to_string(),
        ];

        let mut rows = Vec::with_capacity(tasks.len());
        for task in tasks {
            let editing = |field: TaskField| {
                board
                    .edit()
                    .session()
                    .filter(|s| s.task_id == task.id && s.field == field)
                    .map(|s| format!("> {} <", s.value))
            };

            let description =
                editing(TaskField::Description).unwrap_or_else(|| task.description.clone());

            let status = editing(TaskField::Status).unwrap_or_else(|| {
                let code = match task.status {
                    Status::Active => "32",
                    Status::Done => "34",
                    Status::Canceled => "90",
                };
                self.paint(task.status.label(), code)
            });

            let deadline = editing(TaskField::Deadline).unwrap_or_else(|| {
                let shown = format_deadline(task.deadline, &self.date_format);
                if task.is_overdue(today) {
                    self.paint(&format!("{shown} (overdue)"), "31")
                } else {
                    shown
                }
            });

            rows.push(vec![
                self.paint(&task.id.to_string(), "33"),
                description,
                status,
                deadline,
            ]);
        }

        write_table(&mut out, headers, rows)?;
        Ok(())
    }

    #[tracing::instrument(skip_all)]
    pub fn render_form<W: Write>(&self, mut out: W, board: &Board) -> anyhow::Result<()> {
        let form = board.form();
        if !form.is_open() {
            return Ok(());
        }

        writeln!(out, "New task")?;
        for field in TaskField::ALL {
            writeln!(out, "  {:<12} {}", field.as_str(), form.draft().get(field))?;
            if let Some(message) = form.errors().get(&field) {
                writeln!(out, "  {:<12} {}", "", self.paint(message, "31"))?;
            }
        }
        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn tab_label(mode: FilterMode) -> &'static str {
    match mode {
        FilterMode::All => "All tasks",
        FilterMode::Active => "Active tasks",
        FilterMode::Completed => "Completed tasks",
    }
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for (header, width) in headers.iter().zip(&widths) {
        write!(writer, "{}{} ", header, pad(header, *width))?;
    }
    writeln!(writer)?;

    for width in &widths {
        write!(writer, "{:-<width$} ", "", width = *width)?;
    }
    writeln!(writer)?;

    for row in rows {
        for (cell, width) in row.iter().zip(&widths) {
            write!(writer, "{}{} ", cell, pad(cell, *width))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn pad(cell: &str, width: usize) -> String {
    let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
    " ".repeat(width.saturating_sub(visible_width))
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{Renderer, strip_ansi};
    use crate::board::Board;
    use crate::config::Config;
    use crate::filter::FilterMode;
    use crate::loader::parse_tasks;
    use crate::store::{IdStrategy, TaskStore};
    use crate::task::TaskField;

    fn board() -> Board {
        let tasks = parse_tasks(
            r#"[
                {"id": 1, "description": "Пополнить баланс", "status": "active", "deadline": "2024-01-10"},
                {"id": 2, "description": "File taxes", "status": "done", "deadline": "2024-04-15"}
            ]"#,
        )
        .expect("parse");
        Board::new(TaskStore::from_tasks(tasks, IdStrategy::Sequential).expect("seed"))
    }

    fn render(board: &Board) -> String {
        let mut out = Vec::new();
        let today = NaiveDate::from_ymd_opt(2024, 2, 1).expect("valid date");
        Renderer::plain()
            .render_board(&mut out, board, today)
            .expect("render");
        String::from_utf8(out).expect("utf8")
    }

    #[test]
    fn renders_visible_rows_with_overdue_flag() {
        let text = render(&board());
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].contains("[All tasks]"));
        assert!(lines[1].starts_with("ID "));
        assert!(lines[3].contains("10.01.2024 (overdue)"));
        assert!(lines[4].contains("15.04.2024"));
        assert!(!lines[4].contains("overdue"));
    }

    #[test]
    fn shows_edit_value_in_place_and_empty_state() {
        let mut board = board();
        board.start_editing(2, TaskField::Description);
        board.change_value("File taxes early");
        assert!(render(&board).contains("> File taxes early <"));

        board.cancel();
        board.delete(1);
        board.set_filter(FilterMode::Active);
        assert!(render(&board).ends_with("No tasks\n"));
    }

    #[test]
    fn strip_ansi_removes_escapes() {
        assert_eq!(strip_ansi("\x1b[31mlate\x1b[0m"), "late");
    }

    fn configured(key: &str, value: &str) -> Config {
        let mut cfg = Config::default();
        cfg.apply_overrides(vec![(key.to_string(), value.to_string())]);
        cfg
    }

    #[test]
    fn rejects_unparseable_date_format() {
        let err = Renderer::new(&configured("date.format", "%d %Q")).expect_err("must fail");
        assert!(err.to_string().contains("invalid date.format"));

        let renderer = Renderer::new(&configured("date.format", "%Y/%m/%d")).expect("valid format");
        let mut out = Vec::new();
        let today = NaiveDate::from_ymd_opt(2024, 2, 1).expect("valid date");
        renderer
            .render_board(&mut out, &board(), today)
            .expect("render");
        assert!(String::from_utf8(out).expect("utf8").contains("2024/01/10"));
    }

    #[test]
    fn color_setting_goes_through_config_switches() {
        assert!(Renderer::new(&configured("color", "off")).is_ok());
        assert!(Renderer::new(&configured("color", "y")).is_ok());
        let err = Renderer::new(&configured("color", "maybe")).expect_err("must fail");
        assert!(err.to_string().contains("invalid color setting: maybe"));
    }
}
