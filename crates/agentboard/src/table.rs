use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use agentboard_core::DashboardRow;

use crate::color;

const NAME_MAX: usize = 40;
const REPO_MAX: usize = 32;

pub struct TableFormatter {
    name_width: usize,
    status_width: usize,
    repo_width: usize,
    pr_width: usize,
    comments_width: usize,
    activity_width: usize,
}

struct Cells {
    name: String,
    status: String,
    repo: String,
    pr: String,
    comments: String,
    activity: String,
}

impl Cells {
    fn from_row(row: &DashboardRow) -> Self {
        let pr = match (&row.pr, row.agent.pr_url()) {
            (Some(info), _) if info.draft => format!("#{} draft", info.number),
            (Some(info), _) => format!("#{} {}", info.number, info.status),
            (None, Some(_)) => "...".to_string(),
            (None, None) => "-".to_string(),
        };
        Self {
            name: truncate(&row.agent.name, NAME_MAX),
            status: row.agent.status.to_string(),
            repo: truncate(short_repository(&row.agent.source.repository), REPO_MAX),
            pr,
            comments: row
                .comment_count
                .map_or_else(|| "-".to_string(), |n| n.to_string()),
            activity: row.last_activity.map_or_else(
                || "-".to_string(),
                |at| at.format("%Y-%m-%d %H:%M").to_string(),
            ),
        }
    }
}

impl TableFormatter {
    pub fn new(rows: &[DashboardRow]) -> Self {
        // Minimum widths = header label lengths
        let mut formatter = Self {
            name_width: "Agent".len(),
            status_width: "Status".len(),
            repo_width: "Repository".len(),
            pr_width: "PR".len(),
            comments_width: "Comments".len(),
            activity_width: "Activity".len(),
        };
        for row in rows {
            let cells = Cells::from_row(row);
            formatter.name_width = formatter.name_width.max(display_width(&cells.name));
            formatter.status_width = formatter.status_width.max(display_width(&cells.status));
            formatter.repo_width = formatter.repo_width.max(display_width(&cells.repo));
            formatter.pr_width = formatter.pr_width.max(display_width(&cells.pr));
            formatter.comments_width = formatter.comments_width.max(display_width(&cells.comments));
            formatter.activity_width = formatter.activity_width.max(display_width(&cells.activity));
        }
        formatter
    }

    pub fn print_table(&self, rows: &[DashboardRow]) {
        for line in self.render(rows) {
            println!("{}", line);
        }
    }

    pub fn render(&self, rows: &[DashboardRow]) -> Vec<String> {
        let mut lines = Vec::with_capacity(rows.len() + 4);
        lines.push(self.border('┌', '┬', '┐'));
        lines.push(self.header_row());
        lines.push(self.border('├', '┼', '┤'));
        lines.extend(rows.iter().map(|row| self.row(row)));
        lines.push(self.border('└', '┴', '┘'));
        lines
    }

    fn widths(&self) -> [usize; 6] {
        [
            self.name_width,
            self.status_width,
            self.repo_width,
            self.pr_width,
            self.comments_width,
            self.activity_width,
        ]
    }

    fn row(&self, row: &DashboardRow) -> String {
        let cells = Cells::from_row(row);
        let sep = color::muted("│");
        format!(
            "{sep} {} {sep} {} {sep} {} {sep} {} {sep} {} {sep} {} {sep}",
            color::kiri(&pad(&cells.name, self.name_width)),
            color::agent_status(row.agent.status, &pad(&cells.status, self.status_width)),
            color::ice(&pad(&cells.repo, self.repo_width)),
            color::pr_status(
                row.pr.as_ref().map(|info| info.status),
                &pad(&cells.pr, self.pr_width)
            ),
            pad(&cells.comments, self.comments_width),
            pad(&cells.activity, self.activity_width),
        )
    }

    fn header_row(&self) -> String {
        let sep = color::muted("│");
        format!(
            "{sep} {} {sep} {} {sep} {} {sep} {} {sep} {} {sep} {} {sep}",
            color::bold(&pad("Agent", self.name_width)),
            color::bold(&pad("Status", self.status_width)),
            color::bold(&pad("Repository", self.repo_width)),
            color::bold(&pad("PR", self.pr_width)),
            color::bold(&pad("Comments", self.comments_width)),
            color::bold(&pad("Activity", self.activity_width)),
        )
    }

    fn border(&self, left: char, mid: char, right: char) -> String {
        let segments: Vec<String> = self
            .widths()
            .iter()
            .map(|width| "─".repeat(width + 2))
            .collect();
        color::muted(&format!(
            "{}{}{}",
            left,
            segments.join(&mid.to_string()),
            right
        ))
    }
}

/// `github.com/acme/app` → `acme/app`.
fn short_repository(repository: &str) -> &str {
    repository
        .trim_start_matches("https://")
        .trim_start_matches("github.com/")
}

/// Compute the terminal display width of a string.
///
/// Wide characters (CJK, emoji) count as 2 columns.
pub(crate) fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Pad a string to a minimum display width without truncating.
pub(crate) fn pad(s: &str, min_width: usize) -> String {
    let width = display_width(s);
    if width >= min_width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(min_width - width))
    }
}

/// Cut `s` to at most `max_width` display columns, ending in `…` when cut.
pub(crate) fn truncate(s: &str, max_width: usize) -> String {
    if display_width(s) <= max_width {
        return s.to_string();
    }
    let budget = max_width.saturating_sub(1);
    let mut out = String::new();
    let mut used = 0;
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push('…');
    out
}
