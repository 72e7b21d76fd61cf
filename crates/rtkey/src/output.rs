//! Output formatting: table, JSON, YAML, plain.
//!
//! Table uses `tabled`, structured formats use serde, plain emits one line
//! per item.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

/// Dim a secondary value (timestamps, sentinels) when color is enabled.
pub fn dim(text: &str, color: bool) -> String {
    if color {
        text.dimmed().to_string()
    } else {
        text.to_owned()
    }
}

/// Green for healthy values, red otherwise.
pub fn flag(text: &str, ok: bool, color: bool) -> String {
    match (color, ok) {
        (false, _) => text.to_owned(),
        (true, true) => text.green().to_string(),
        (true, false) => text.red().to_string(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list in the chosen format.
///
/// `to_row` builds table rows; `to_line` builds the plain representation.
/// JSON and YAML serialize `data` itself.
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    to_line: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    Ok(match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Table::new(rows).with(Style::rounded()).to_string()
        }
        OutputFormat::Json => serde_json::to_string_pretty(data)?,
        OutputFormat::Yaml => serde_yaml::to_string(data)?,
        OutputFormat::Plain => data.iter().map(to_line).collect::<Vec<_>>().join("\n"),
    })
}

/// Render one item; table output uses a pre-formatted `detail` string.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail: impl FnOnce(&T) -> String,
    to_line: impl FnOnce(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
{
    Ok(match format {
        OutputFormat::Table => detail(data),
        OutputFormat::Json => serde_json::to_string_pretty(data)?,
        OutputFormat::Yaml => serde_yaml::to_string(data)?,
        OutputFormat::Plain => to_line(data),
    })
}

/// Print rendered output to stdout unless quiet.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(serde::Serialize)]
    struct Item {
        id: &'static str,
    }

    #[derive(Tabled)]
    struct Row {
        #[tabled(rename = "ID")]
        id: &'static str,
    }

    fn items() -> Vec<Item> {
        vec![Item { id: "1" }, Item { id: "2" }]
    }

    #[test]
    fn plain_is_one_line_per_item() {
        let out = render_list(OutputFormat::Plain, &items(), |i| Row { id: i.id }, |i| i.id.into())
            .unwrap();
        assert_eq!(out, "1\n2");
    }

    #[test]
    fn json_serializes_source_data() {
        let out = render_list(OutputFormat::Json, &items(), |i| Row { id: i.id }, |i| i.id.into())
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed, serde_json::json!([{ "id": "1" }, { "id": "2" }]));
    }

    #[test]
    fn table_has_header() {
        let out = render_list(OutputFormat::Table, &items(), |i| Row { id: i.id }, |i| i.id.into())
            .unwrap();
        assert!(out.contains("ID"));
        assert!(out.contains('2'));
    }

    #[test]
    fn no_color_passes_text_through() {
        assert_eq!(dim("x", false), "x");
        assert_eq!(flag("ok", true, false), "ok");
    }
}
