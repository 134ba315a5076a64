use std::io::{self, BufRead, Write};

use sportscope::app::{App, NoticeKind};
use sportscope::command::{Command, HELP};
use sportscope::Result;

fn print_columns(app: &App) {
    let Some(table) = app.table() else {
        println!("No dataset loaded.");
        return;
    };
    println!("{} rows", table.row_count());
    for column in table.columns() {
        println!("  {:<24} {:?}", column.name(), column.column_type());
    }
}

fn print_suggestions(app: &App) {
    if app.suggestions().is_empty() {
        println!("No chart suggestions available.");
    }
    for (i, suggestion) in app.suggestions().iter().enumerate() {
        println!("  {:>2}. {}", i + 1, suggestion);
    }
}

fn print_status(app: &App) {
    let status = app.status();
    let marker = if status.error { "!" } else { "-" };
    println!(
        "[{}] {} {}",
        status.at.format("%H:%M:%S"),
        marker,
        status.message
    );
}

fn execute(app: &mut App, command: Command) -> bool {
    match command {
        Command::Load(path) => {
            app.load_file(&path);
        }
        Command::Columns => print_columns(app),
        Command::Suggestions => print_suggestions(app),
        Command::Pick(index) => {
            app.select_suggestion(index);
        }
        Command::SelectX(name) => app.select_x(&name),
        Command::SelectY(name) => app.select_y(&name),
        Command::SelectZ(name) => app.select_z(&name),
        Command::Kind(name) => app.select_chart_kind(&name),
        Command::Chart => {
            app.generate_chart();
        }
        Command::Custom { kind, color, title } => {
            app.custom_chart(&kind, &title, &color);
        }
        Command::Output { dir, extension } => {
            app.set_output(&dir, &extension);
        }
        Command::OutputOff => app.clear_output(),
        Command::Model(name) => {
            app.set_forecast_model(&name);
        }
        Command::Horizon(text) => app.set_forecast_horizon(&text),
        Command::Confidence(enabled) => app.set_confidence_interval(enabled),
        Command::Predict(enabled) => {
            app.set_prediction_mode(enabled);
        }
        Command::Forecast => {
            app.run_prediction();
        }
        Command::Export(path) => {
            app.export_predictions(&path);
        }
        Command::Anomalies(columns) => {
            let columns: Vec<&str> = columns.iter().map(String::as_str).collect();
            app.detect_anomalies(&columns);
        }
        Command::ClearAnomalies => app.clear_anomalies(),
        Command::Convert { format, path } => {
            app.convert_file(&format, &path);
        }
        Command::Count(text) => {
            app.set_chart_count(&text);
        }
        Command::Entry { index, x, y, kind } => {
            app.set_dashboard_entry(index, &kind, &x, &y);
        }
        Command::Dashboard => {
            app.create_dashboard();
        }
        Command::Theme => {
            app.toggle_theme();
        }
        Command::Apply => {
            let style = app.apply_settings();
            println!(
                "font {} {}, background {}, text {}, buttons {}",
                style.font.0,
                style.font.1,
                style.frame_background,
                style.label_foreground,
                style.button_background
            );
        }
        Command::Reset => {
            app.reset_settings();
        }
        Command::Color { target, value } => {
            app.set_color(&target, &value);
        }
        Command::Font { size, family } => {
            app.set_font(&family, &size);
        }
        Command::Palette(text) => {
            app.set_palette(&text);
        }
        Command::Status => {}
        Command::Help => println!("{}", HELP),
        Command::Quit => return false,
    }
    true
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut app = App::new();
    print_status(&app);

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut line = String::new();
    loop {
        print!("sportscope> ");
        stdout.flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        let keep_going = match line.parse::<Command>() {
            Ok(command) => execute(&mut app, command),
            Err(e) => {
                eprintln!("{}", e);
                continue;
            }
        };

        for notice in app.take_notices() {
            match notice.kind {
                NoticeKind::Info => println!("[{}] {}", notice.title, notice.message),
                _ => eprintln!("[{}] {}", notice.title, notice.message),
            }
        }
        print_status(&app);

        if !keep_going {
            break;
        }
    }
    Ok(())
}
