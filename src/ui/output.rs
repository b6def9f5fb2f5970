use crossterm::style::Stylize;
use serde_json::Value;
use similar::{ChangeTag, TextDiff};

use iacdeploy::config::ConfigWarning;
use iacdeploy::domain::entities::Outputs;

use crate::ui::context::UiContext;
use crate::ui::theme::{self, Icon};

/// `deploymentOutput=<json>` followed by one `name=value` line per output
///
/// Strings are printed bare; everything else as compact JSON. Outputs keep
/// the order the template declares them in.
pub fn render_outputs(outputs: &Outputs) -> String {
    let mut out = format!("deploymentOutput={}\n", Value::Object(outputs.clone()));
    for (name, value) in outputs {
        let rendered = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        out.push_str(&format!("{}={}\n", name, rendered));
    }
    out
}

pub fn print_outputs(outputs: &Outputs) {
    print!("{}", render_outputs(outputs));
}

pub fn print_config_warnings(warnings: &[ConfigWarning], ctx: &UiContext) {
    if ctx.json {
        return;
    }
    for w in warnings {
        eprintln!("{} {}", Icon::Warning.render(ctx.color, ctx.unicode), w);
    }
}

pub fn print_warnings(warnings: &[String], ctx: &UiContext) {
    if ctx.json {
        return;
    }
    for w in warnings {
        eprintln!("{} {}", Icon::Warning.render(ctx.color, ctx.unicode), w);
    }
}

pub fn render_unified_diff(path: &str, old: &str, new: &str, supports_color: bool) -> String {
    let diff = TextDiff::from_lines(old, new);
    let old_lines = old.lines().count().max(1);
    let new_lines = new.lines().count().max(1);
    let width = old_lines.max(new_lines).to_string().len();

    let mut out = String::new();

    let header_a = format!("--- a/{}", path);
    let header_b = format!("+++ b/{}", path);
    out.push_str(&color_line(&header_a, ChangeTag::Equal, supports_color, LineStyle::Header));
    out.push('\n');
    out.push_str(&color_line(&header_b, ChangeTag::Equal, supports_color, LineStyle::Header));
    out.push('\n');

    for change in diff.iter_all_changes() {
        let (line_no, sign) = match change.tag() {
            ChangeTag::Delete => (change.old_index(), "-"),
            ChangeTag::Insert => (change.new_index(), "+"),
            ChangeTag::Equal => (change.new_index(), " "),
        };
        let line_col = line_no
            .map(|i| format!("{:>width$}", i + 1, width = width))
            .unwrap_or_else(|| " ".repeat(width));

        let value = change.value().trim_end_matches('\n');
        let line = format!("{line_col} {sign} {value}");
        out.push_str(&color_line(&line, change.tag(), supports_color, LineStyle::Body));
        out.push('\n');
    }

    out
}

#[derive(Debug, Clone, Copy)]
enum LineStyle {
    Header,
    Body,
}

fn color_line(s: &str, tag: ChangeTag, supports_color: bool, style: LineStyle) -> String {
    if !supports_color {
        return s.to_string();
    }

    match style {
        LineStyle::Header => format!("{}", s.with(theme::colors::INFO)),
        LineStyle::Body => match tag {
            ChangeTag::Delete => format!("{}", s.with(theme::colors::ERROR)),
            ChangeTag::Insert => format!("{}", s.with(theme::colors::SUCCESS)),
            ChangeTag::Equal => format!("{}", s.with(theme::colors::DIM)),
        },
    }
}
