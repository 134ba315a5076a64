//! Line commands understood by the interactive loop
//!
//! One command per line: a keyword followed by its arguments. Arguments
//! that may contain spaces (paths, column names, font families) take the
//! rest of the line.

use std::str::FromStr;

use crate::error::{Error, Result};

pub const HELP: &str = "\
Dataset
  load <path>                 load a .csv, .xlsx or .db file
  columns                     list columns and their types
  suggest                     list chart suggestions
  pick <n>                    render suggestion n (1-based)
Charts
  x <column> | y <column> | z <column>
  kind <chart type>           e.g. Scatter, Box Plot, 3D Surface
  chart                       render the selected chart
  custom <kind> [color=<c>] [title=<text>]
  output <dir> <png|svg|json> write every figure to <dir>
  output off                  keep figures in memory only
Prediction
  model <Linear|Polynomial|ARIMA>
  horizon <n>
  ci <on|off>                 95% band (ARIMA)
  predict <on|off>            prediction mode
  forecast                    run the forecast again
  export <path>               save the table with Prediction as CSV
Anomalies
  anomalies [column ...]      isolation forest over numeric columns
  clear-anomalies
Conversion
  convert <CSV|Excel|SQLite> <path>
Dashboard
  count <n>
  entry <n> <x> <y> <chart type>
  dashboard
Settings
  theme | apply | reset
  color <background|text|button|chart-title|axis-label> <value>
  font <size> <family>
  palette <c1,c2,...>
Other
  status | help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Load(String),
    Columns,
    Suggestions,
    Pick(usize),
    SelectX(String),
    SelectY(String),
    SelectZ(String),
    Kind(String),
    Chart,
    Custom {
        kind: String,
        color: String,
        title: String,
    },
    Output {
        dir: String,
        extension: String,
    },
    OutputOff,
    Model(String),
    Horizon(String),
    Confidence(bool),
    Predict(bool),
    Forecast,
    Export(String),
    Anomalies(Vec<String>),
    ClearAnomalies,
    Convert {
        format: String,
        path: String,
    },
    Count(String),
    Entry {
        index: usize,
        x: String,
        y: String,
        kind: String,
    },
    Dashboard,
    Theme,
    Apply,
    Reset,
    Color {
        target: String,
        value: String,
    },
    Font {
        size: String,
        family: String,
    },
    Palette(String),
    Status,
    Help,
    Quit,
}

fn usage(text: &str) -> Error {
    Error::MissingInput(format!("usage: {}", text))
}

fn required(rest: &str, text: &str) -> Result<String> {
    if rest.is_empty() {
        Err(usage(text))
    } else {
        Ok(rest.to_string())
    }
}

fn switch(rest: &str, text: &str) -> Result<bool> {
    match rest.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => Err(usage(text)),
    }
}

/// 1-based position to 0-based index
fn position(text: &str, usage_text: &str) -> Result<usize> {
    match text.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n - 1),
        _ => Err(usage(usage_text)),
    }
}

fn split_first(text: &str) -> (&str, &str) {
    match text.split_once(char::is_whitespace) {
        Some((head, tail)) => (head, tail.trim()),
        None => (text, ""),
    }
}

fn parse_custom(rest: &str) -> Result<Command> {
    let (kind, mut options) = split_first(rest);
    if kind.is_empty() {
        return Err(usage("custom <kind> [color=<c>] [title=<text>]"));
    }
    let mut color = String::new();
    let mut title = String::new();
    while !options.is_empty() {
        if let Some(text) = options.strip_prefix("title=") {
            title = text.trim().to_string();
            break;
        }
        let (option, tail) = split_first(options);
        match option.split_once('=') {
            Some(("color", value)) => color = value.to_string(),
            _ => {
                return Err(Error::InvalidInput(format!(
                    "unknown custom chart option: {}",
                    option
                )))
            }
        }
        options = tail;
    }
    Ok(Command::Custom {
        kind: kind.to_string(),
        color,
        title,
    })
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self> {
        let (keyword, rest) = split_first(line.trim());
        let command = match keyword.to_ascii_lowercase().as_str() {
            "load" | "open" => Command::Load(required(rest, "load <path>")?),
            "columns" | "cols" => Command::Columns,
            "suggest" | "suggestions" => Command::Suggestions,
            "pick" => Command::Pick(position(rest, "pick <n>")?),
            "x" => Command::SelectX(rest.to_string()),
            "y" => Command::SelectY(rest.to_string()),
            "z" => Command::SelectZ(rest.to_string()),
            "kind" | "type" => Command::Kind(rest.to_string()),
            "chart" | "plot" => Command::Chart,
            "custom" => parse_custom(rest)?,
            "output" => {
                if rest.eq_ignore_ascii_case("off") {
                    Command::OutputOff
                } else {
                    let (dir, extension) = rest
                        .rsplit_once(char::is_whitespace)
                        .ok_or_else(|| usage("output <dir> <png|svg|json>"))?;
                    Command::Output {
                        dir: dir.trim().to_string(),
                        extension: extension.to_string(),
                    }
                }
            }
            "model" => Command::Model(required(rest, "model <Linear|Polynomial|ARIMA>")?),
            "horizon" => Command::Horizon(rest.to_string()),
            "ci" => Command::Confidence(switch(rest, "ci <on|off>")?),
            "predict" => Command::Predict(switch(rest, "predict <on|off>")?),
            "forecast" => Command::Forecast,
            "export" => Command::Export(required(rest, "export <path>")?),
            "anomalies" => Command::Anomalies(rest.split_whitespace().map(str::to_string).collect()),
            "clear-anomalies" => Command::ClearAnomalies,
            "convert" => {
                let (format, path) = split_first(rest);
                if format.is_empty() || path.is_empty() {
                    return Err(usage("convert <CSV|Excel|SQLite> <path>"));
                }
                Command::Convert {
                    format: format.to_string(),
                    path: path.to_string(),
                }
            }
            "count" => Command::Count(rest.to_string()),
            "entry" => {
                let text = "entry <n> <x> <y> <chart type>";
                let mut parts = rest.splitn(4, char::is_whitespace);
                let index = position(parts.next().unwrap_or_default(), text)?;
                let x = parts.next().unwrap_or_default();
                let y = parts.next().unwrap_or_default();
                let kind = parts.next().unwrap_or_default().trim();
                if x.is_empty() || y.is_empty() || kind.is_empty() {
                    return Err(usage(text));
                }
                Command::Entry {
                    index,
                    x: x.to_string(),
                    y: y.to_string(),
                    kind: kind.to_string(),
                }
            }
            "dashboard" => Command::Dashboard,
            "theme" => Command::Theme,
            "apply" => Command::Apply,
            "reset" => Command::Reset,
            "color" => {
                let (target, value) = split_first(rest);
                if target.is_empty() || value.is_empty() {
                    return Err(usage("color <target> <value>"));
                }
                Command::Color {
                    target: target.to_string(),
                    value: value.to_string(),
                }
            }
            "font" => {
                let (size, family) = split_first(rest);
                if size.is_empty() || family.is_empty() {
                    return Err(usage("font <size> <family>"));
                }
                Command::Font {
                    size: size.to_string(),
                    family: family.to_string(),
                }
            }
            "palette" => Command::Palette(rest.to_string()),
            "status" => Command::Status,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => {
                return Err(Error::InvalidInput(format!(
                    "unknown command '{}' (type 'help')",
                    other
                )))
            }
        };
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;

    fn parse(line: &str) -> Command {
        line.parse().unwrap()
    }

    #[test]
    fn test_rest_of_line_arguments() {
        assert_eq!(
            parse("load  data/my file.csv "),
            Command::Load("data/my file.csv".to_string())
        );
        assert_eq!(parse("x Player Name"), Command::SelectX("Player Name".to_string()));
        assert_eq!(parse("KIND box plot"), Command::Kind("box plot".to_string()));
        assert_eq!(parse("y"), Command::SelectY(String::new()));
    }

    #[test]
    fn test_positions_are_one_based() {
        assert_eq!(parse("pick 1"), Command::Pick(0));
        assert!("pick 0".parse::<Command>().is_err());
        assert_eq!(
            parse("entry 2 goals shots 3D Scatter"),
            Command::Entry {
                index: 1,
                x: "goals".to_string(),
                y: "shots".to_string(),
                kind: "3D Scatter".to_string(),
            }
        );
        assert!("entry 1 goals".parse::<Command>().is_err());
    }

    #[test]
    fn test_custom_options() {
        assert_eq!(
            parse("custom bar color=#ff0000 title=Goals per team"),
            Command::Custom {
                kind: "bar".to_string(),
                color: "#ff0000".to_string(),
                title: "Goals per team".to_string(),
            }
        );
        assert_eq!(
            parse("custom pie"),
            Command::Custom {
                kind: "pie".to_string(),
                color: String::new(),
                title: String::new(),
            }
        );
        assert!("custom pie size=3".parse::<Command>().is_err());
    }

    #[test]
    fn test_switches_and_settings() {
        assert_eq!(parse("predict on"), Command::Predict(true));
        assert_eq!(parse("ci off"), Command::Confidence(false));
        assert!("ci maybe".parse::<Command>().is_err());
        assert_eq!(
            parse("font 14 Times New Roman"),
            Command::Font {
                size: "14".to_string(),
                family: "Times New Roman".to_string(),
            }
        );
        assert_eq!(
            parse("output out/figs svg"),
            Command::Output {
                dir: "out/figs".to_string(),
                extension: "svg".to_string(),
            }
        );
        assert_eq!(parse("output OFF"), Command::OutputOff);
    }

    #[test]
    fn test_errors() {
        let err = "load".parse::<Command>().unwrap_err();
        assert_eq!(err.category(), ErrorCategory::MissingInput);
        assert_eq!(err.to_string(), "usage: load <path>");

        let err = "fly away".parse::<Command>().unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Runtime);
        assert!(err.to_string().contains("unknown command 'fly'"));
    }
}
