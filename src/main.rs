use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use samanvaya::cli::{self, CliOptions};
use samanvaya::commands::{self, Reply};
use samanvaya::core::storage;
use samanvaya::settings::Settings;
use samanvaya::state::AppState;

fn load_settings(options: &CliOptions) -> Settings {
    let settings = match &options.settings_path {
        Some(path) => storage::load_settings_from(path),
        None => storage::load_settings(),
    };
    let mut settings = settings.with_env_overrides();
    if let Some(url) = &options.api_url {
        settings.api.origin = url.clone();
    }
    settings
}

fn prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_millis()
        .init();

    let args: Vec<String> = std::env::args().collect();
    let options = match cli::parse_cli_options(&args) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("{err}\n{}", cli::USAGE);
            return ExitCode::from(2);
        }
    };
    if options.show_help {
        println!("{}\n\n{}", cli::USAGE, cli::HELP);
        return ExitCode::SUCCESS;
    }

    let settings = load_settings(&options);
    let mut app = match AppState::load(settings) {
        Ok(app) => app,
        Err(err) => {
            log::error!("failed to start: {err}");
            eprintln!("samanvaya: {err}");
            return ExitCode::FAILURE;
        }
    };

    println!("{}", commands::render_panel(&app));
    prompt();
    for line in io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                log::error!("failed to read input: {err}");
                return ExitCode::FAILURE;
            }
        };

        let reply = cli::parse_panel_command(&line)
            .and_then(|command| commands::handle_command(&mut app, command));
        match reply {
            Ok(Reply::Panel) => println!("{}", commands::render_panel(&app)),
            Ok(Reply::Text(text)) => println!("{text}"),
            Ok(Reply::Quit) => break,
            Err(err) => eprintln!("{err}"),
        }
        prompt();
    }

    ExitCode::SUCCESS
}
