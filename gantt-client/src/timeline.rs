/// Timeline view model
///
/// Turns the controller's visible tasks into rows with bar styling, and
/// renders them as a text table and an ASCII Gantt chart:
///
/// ```text
/// Week view, 27/01/2025 to 16/02/2025
/// Design |####======      |  40%
/// Review |    ===         |   0%
/// ```
///
/// `#` is the completed share of a bar, `=` the remainder.
///
/// User actions reach the server only through [`Intent::apply`], which goes
/// through the controller's ownership checks.

use crate::controller::{ClientStateController, TaskDraft, TaskEdit, ViewScope, VisibleTask};
use crate::error::{ClientError, ClientResult};
use chrono::{Datelike, NaiveDate};
use gantt_shared::models::task::DEFAULT_TASK_COLOR;
use gantt_shared::wire::TaskView;
use std::fmt;
use std::str::FromStr;

/// Opacity of the progress part of a bar
pub const PROGRESS_OPACITY: f32 = 0.6;

const MAX_LABEL_WIDTH: usize = 30;

/// Chart time scale: one column per day, week or month
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Zoom {
    Day,
    #[default]
    Week,
    Month,
}

impl FromStr for Zoom {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Zoom::Day),
            "week" => Ok(Zoom::Week),
            "month" => Ok(Zoom::Month),
            other => Err(ClientError::Invalid(format!("Unknown zoom level: {}", other))),
        }
    }
}

impl fmt::Display for Zoom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Zoom::Day => write!(f, "Day"),
            Zoom::Week => write!(f, "Week"),
            Zoom::Month => write!(f, "Month"),
        }
    }
}

impl Zoom {
    /// First day of the column containing `date`
    fn align(self, date: NaiveDate) -> NaiveDate {
        match self {
            Zoom::Day => date,
            Zoom::Week => {
                date - chrono::Duration::days(i64::from(date.weekday().num_days_from_monday()))
            }
            Zoom::Month => date.with_day(1).unwrap_or(date),
        }
    }

    /// Column of `date` counted from the aligned `origin`
    fn column(self, origin: NaiveDate, date: NaiveDate) -> usize {
        let offset = match self {
            Zoom::Day => (date - origin).num_days(),
            Zoom::Week => (date - origin).num_days() / 7,
            Zoom::Month => {
                let months = |d: NaiveDate| i64::from(d.year()) * 12 + i64::from(d.month0());
                months(date) - months(origin)
            }
        };
        usize::try_from(offset).unwrap_or(0)
    }
}

/// How a task's bar is painted
#[derive(Debug, Clone, PartialEq)]
pub struct BarStyle {
    pub class_name: String,
    pub bar_fill: String,
    pub progress_fill: String,
    pub progress_opacity: f32,
}

impl BarStyle {
    /// Stylesheet rules for a `.gantt-bar` element carrying this class
    pub fn css_rules(&self) -> [String; 2] {
        [
            format!(
                ".gantt-bar.{} .bar {{ fill: {}; }}",
                self.class_name, self.bar_fill
            ),
            format!(
                ".gantt-bar.{} .bar-progress {{ fill: {}; opacity: {}; }}",
                self.class_name, self.progress_fill, self.progress_opacity
            ),
        ]
    }
}

/// Bar style of a task: its color for the bar, the same color at reduced
/// opacity for the progress fill
pub fn color_for_task(task: &TaskView) -> BarStyle {
    let color = if task.color.trim().is_empty() {
        DEFAULT_TASK_COLOR.to_string()
    } else {
        task.color.clone()
    };
    let class_name = if task.custom_class.trim().is_empty() {
        format!("task-{}", task.id)
    } else {
        task.custom_class.clone()
    };

    BarStyle {
        class_name,
        bar_fill: color.clone(),
        progress_fill: color,
        progress_opacity: PROGRESS_OPACITY,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineRow {
    pub task_id: i32,
    /// Task name as stored
    pub name: String,
    /// Name as charted
    pub label: String,
    pub owner: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub progress: i32,
    pub editable: bool,
    pub style: BarStyle,
}

pub fn build_rows(tasks: &[VisibleTask]) -> Vec<TimelineRow> {
    tasks
        .iter()
        .map(|visible| TimelineRow {
            task_id: visible.task.id,
            name: visible.task.name.clone(),
            label: visible.label.clone(),
            owner: visible.task.owner.clone(),
            start: visible.task.start,
            end: visible.task.end,
            progress: visible.task.progress,
            editable: visible.editable,
            style: color_for_task(&visible.task),
        })
        .collect()
}

/// `dd/mm/yyyy`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Task list as a text table; the team view adds an owner column
pub fn render_table(rows: &[TimelineRow], scope: ViewScope) -> String {
    let title = match scope {
        ViewScope::Individual => "My tasks",
        ViewScope::Team => "Team tasks",
    };
    if rows.is_empty() {
        return format!("{}\nNo tasks yet.\n", title);
    }

    let mut header = Vec::new();
    if scope == ViewScope::Team {
        header.push("Owner".to_string());
    }
    header.extend(["Task", "Start", "End", "Actions"].map(String::from));

    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            let mut cells = Vec::new();
            if scope == ViewScope::Team {
                cells.push(row.owner.clone());
            }
            cells.push(row.name.clone());
            cells.push(format_date(row.start));
            cells.push(format_date(row.end));
            cells.push(if row.editable { "edit, delete" } else { "read-only" }.to_string());
            cells
        })
        .collect();

    let widths: Vec<usize> = (0..header.len())
        .map(|i| {
            body.iter()
                .map(|cells| cells[i].chars().count())
                .chain(std::iter::once(header[i].chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut out = format!("{} ({})\n", title, rows.len());
    out.push_str(&line(header.as_slice()));
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    out.push('\n');
    for cells in &body {
        out.push_str(&line(cells.as_slice()));
        out.push('\n');
    }
    out
}

/// ASCII Gantt chart of the rows at the given zoom
pub fn render_chart(rows: &[TimelineRow], zoom: Zoom) -> String {
    let (Some(first), Some(last)) = (
        rows.iter().map(|r| r.start.min(r.end)).min(),
        rows.iter().map(|r| r.start.max(r.end)).max(),
    ) else {
        return "No tasks to chart.\n".to_string();
    };

    let origin = zoom.align(first);
    let columns = zoom.column(origin, last) + 1;
    let label_width = rows
        .iter()
        .map(|r| r.label.chars().count())
        .max()
        .unwrap_or(0)
        .min(MAX_LABEL_WIDTH);

    let mut out = format!(
        "{} view, {} to {}\n",
        zoom,
        format_date(origin),
        format_date(last)
    );
    for row in rows {
        let from = zoom.column(origin, row.start.min(row.end));
        let to = zoom.column(origin, row.start.max(row.end));
        let length = to - from + 1;
        let progress = usize::try_from(row.progress.clamp(0, 100)).unwrap_or(0);
        let done = (length * progress + 50) / 100;

        let label: String = row.label.chars().take(label_width).collect();
        out.push_str(&format!(
            "{:<width$} |{}{}{}{}| {:>3}%\n",
            label,
            " ".repeat(from),
            "#".repeat(done),
            "=".repeat(length - done),
            " ".repeat(columns - to - 1),
            row.progress,
            width = label_width
        ));
    }
    out
}

/// A change requested from the view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Create(TaskDraft),
    Edit { task_id: i32, edit: TaskEdit },
    Delete { task_id: i32 },
}

impl Intent {
    /// Sends the change through the controller
    pub async fn apply(self, controller: &mut ClientStateController) -> ClientResult<()> {
        match self {
            Intent::Create(draft) => controller.create(draft).await.map(|_| ()),
            Intent::Edit { task_id, edit } => controller.update(task_id, edit).await.map(|_| ()),
            Intent::Delete { task_id } => controller.delete(task_id).await.map(|_| ()),
        }
    }
}
