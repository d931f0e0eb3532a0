use std::borrow::Cow;
use std::collections::BTreeMap;
use std::io::{self, Write};

use taskflow_app::{IntegrityReport, Progress, ProgressSummary};
use taskflow_core::{Category, CategoryId, HistoryEntry, Task};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use unicode_segmentation::UnicodeSegmentation;

const TITLE_WIDTH: usize = 40;

/// Category names keyed by id, for resolving weak references.
pub struct CategoryNames(BTreeMap<CategoryId, String>);

impl CategoryNames {
    pub fn new(categories: &[Category]) -> Self {
        Self(
            categories
                .iter()
                .map(|category| (category.id, category.name.clone()))
                .collect(),
        )
    }

    /// Name of the category, or a marker when the reference dangles.
    pub fn label(&self, id: Option<CategoryId>) -> Cow<'_, str> {
        match id {
            None => Cow::Borrowed("-"),
            Some(id) => self
                .0
                .get(&id)
                .map_or_else(|| Cow::Owned(format!("#{id} (missing)")), |name| Cow::Borrowed(name.as_str())),
        }
    }
}

pub fn task_table<W: Write>(
    out: &mut W,
    tasks: &[Task],
    names: &CategoryNames,
    now: OffsetDateTime,
) -> io::Result<()> {
    writeln!(out, "ID | Priority | Title | Category | Due | Status")?;
    writeln!(out, "-- | -------- | ----- | -------- | --- | ------")?;
    for task in tasks {
        writeln!(
            out,
            "{} | {} | {} | {} | {} | {}",
            task.id,
            task.priority,
            truncate_with_ellipsis(&task.title, TITLE_WIDTH),
            names.label(task.category_id),
            format_day(task.due_date),
            status(task, now),
        )?;
    }
    Ok(())
}

pub fn order_table<W: Write>(out: &mut W, tasks: &[Task]) -> io::Result<()> {
    writeln!(out, "Order | ID | Title")?;
    writeln!(out, "----- | -- | -----")?;
    for task in tasks {
        writeln!(
            out,
            "{} | {} | {}",
            task.order,
            task.id,
            truncate_with_ellipsis(&task.title, TITLE_WIDTH)
        )?;
    }
    Ok(())
}

pub fn task_detail<W: Write>(
    out: &mut W,
    task: &Task,
    names: &CategoryNames,
    now: OffsetDateTime,
) -> io::Result<()> {
    writeln!(out, "#{} {}", task.id, task.title)?;
    if !task.description.is_empty() {
        writeln!(out, "  {}", task.description)?;
    }
    writeln!(out, "Priority:  {}", task.priority)?;
    writeln!(out, "Category:  {}", names.label(task.category_id))?;
    writeln!(out, "Due:       {}", format_instant(task.due_date))?;
    writeln!(out, "Status:    {}", status(task, now))?;
    if task.completed {
        writeln!(out, "Completed: {}", format_instant(task.completed_at))?;
    }
    writeln!(out, "Created:   {}", format_instant(Some(task.created_at)))?;
    writeln!(out, "Order:     {}", task.order)?;
    writeln!(out)?;
    history(out, &task.edit_history)
}

pub fn history<W: Write>(out: &mut W, entries: &[HistoryEntry]) -> io::Result<()> {
    if entries.is_empty() {
        return writeln!(out, "No history recorded");
    }
    writeln!(out, "History:")?;
    for entry in entries {
        writeln!(
            out,
            "- {} {:?}",
            format_instant(Some(entry.timestamp)),
            entry.action
        )?;
        for change in &entry.changes {
            writeln!(
                out,
                "    {}: {} -> {}",
                change.field, change.old_value, change.new_value
            )?;
        }
    }
    Ok(())
}

pub fn category_table<W: Write>(out: &mut W, categories: &[Category]) -> io::Result<()> {
    writeln!(out, "ID | Name | Color | Icon | Active tasks")?;
    writeln!(out, "-- | ---- | ----- | ---- | ------------")?;
    for category in categories {
        writeln!(
            out,
            "{} | {} | {} | {} | {}",
            category.id, category.name, category.color, category.icon, category.task_count
        )?;
    }
    Ok(())
}

pub fn progress<W: Write>(out: &mut W, summary: &ProgressSummary) -> io::Result<()> {
    progress_line(out, "Overall", summary.overall)?;
    progress_line(out, "Today", summary.today)?;
    progress_line(out, "This week", summary.this_week)
}

fn progress_line<W: Write>(out: &mut W, label: &str, progress: Progress) -> io::Result<()> {
    writeln!(
        out,
        "{label:<10} {}/{} done ({}%)",
        progress.completed,
        progress.total,
        progress.percentage()
    )
}

pub fn integrity<W: Write>(out: &mut W, report: &IntegrityReport) -> io::Result<()> {
    if report.is_clean() {
        return writeln!(out, "No integrity problems found");
    }
    for dangling in &report.dangling {
        writeln!(
            out,
            "task #{} references missing category #{}",
            dangling.task_id, dangling.category_id
        )?;
    }
    for stale in &report.stale_counts {
        writeln!(
            out,
            "category #{} stores {} active tasks, actual {}",
            stale.category_id, stale.stored, stale.actual
        )?;
    }
    Ok(())
}

fn status(task: &Task, now: OffsetDateTime) -> &'static str {
    if task.completed {
        "done"
    } else if task.is_overdue(now) {
        "overdue"
    } else {
        "open"
    }
}

fn format_day(value: Option<OffsetDateTime>) -> String {
    value
        .and_then(|instant| {
            instant
                .format(format_description!("[year]-[month]-[day]"))
                .ok()
        })
        .unwrap_or_else(|| "-".to_owned())
}

fn format_instant(value: Option<OffsetDateTime>) -> String {
    value
        .and_then(|instant| instant.format(&Rfc3339).ok())
        .unwrap_or_else(|| "-".to_owned())
}

/// Shorten `input` to at most `max_graphemes`, ending in "..." when cut.
pub fn truncate_with_ellipsis(input: &str, max_graphemes: usize) -> Cow<'_, str> {
    const ELLIPSIS: &str = "...";
    const ELLIPSIS_GRAPHEMES: usize = 3;

    if max_graphemes == 0 {
        return Cow::Owned(String::new());
    }

    let grapheme_count = UnicodeSegmentation::graphemes(input, true).count();
    if grapheme_count <= max_graphemes {
        return Cow::Borrowed(input);
    }

    if max_graphemes <= ELLIPSIS_GRAPHEMES {
        return Cow::Owned(input.graphemes(true).take(max_graphemes).collect());
    }

    let mut truncated: String = input
        .graphemes(true)
        .take(max_graphemes - ELLIPSIS_GRAPHEMES)
        .collect();
    truncated.push_str(ELLIPSIS);
    Cow::Owned(truncated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskflow_core::{Priority, TaskId};
    use time::macros::datetime;

    fn task(title: &str) -> Task {
        Task {
            id: TaskId(4),
            title: title.into(),
            description: String::new(),
            priority: Priority::High,
            category_id: Some(CategoryId(9)),
            due_date: Some(datetime!(2025-06-10 12:00 UTC)),
            completed: false,
            completed_at: None,
            created_at: datetime!(2025-06-01 08:00 UTC),
            order: 4,
            edit_history: Vec::new(),
        }
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap_or_else(|err| panic!("render failed: {err}"));
        String::from_utf8(out).unwrap_or_else(|err| panic!("utf8: {err}"))
    }

    #[test]
    fn truncation_counts_graphemes() {
        assert_eq!(truncate_with_ellipsis("short", 10), "short");
        assert_eq!(truncate_with_ellipsis("abcdefghij", 8), "abcde...");
        assert_eq!(truncate_with_ellipsis("abcdef", 2), "ab");
        assert_eq!(
            truncate_with_ellipsis("e\u{301}e\u{301}e\u{301}e\u{301}", 3),
            "e\u{301}e\u{301}e\u{301}"
        );
        assert_eq!(truncate_with_ellipsis("anything", 0), "");
    }

    #[test]
    fn table_marks_dangling_category_and_overdue() {
        let names = CategoryNames::new(&[]);
        let text = render(|out| {
            task_table(out, &[task("Renew passport")], &names, datetime!(2025-06-16 08:00 UTC))
        });
        let row = text.lines().nth(2).unwrap_or_default();
        assert_eq!(
            row,
            "4 | high | Renew passport | #9 (missing) | 2025-06-10 | overdue"
        );
    }

    #[test]
    fn detail_without_history_says_so() {
        let names = CategoryNames::new(&[Category {
            id: CategoryId(9),
            name: "Errands".into(),
            color: "#f59e0b".into(),
            icon: "ShoppingCart".into(),
            task_count: 1,
        }]);
        let text = render(|out| {
            task_detail(out, &task("Renew passport"), &names, datetime!(2025-06-01 08:00 UTC))
        });
        assert!(text.contains("Category:  Errands"));
        assert!(text.contains("Status:    open"));
        assert!(text.ends_with("No history recorded\n"));
    }

    #[test]
    fn clean_report_prints_single_line() {
        let text = render(|out| integrity(out, &IntegrityReport::default()));
        assert_eq!(text, "No integrity problems found\n");
    }
}
