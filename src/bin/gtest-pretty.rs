use gtest_pretty::config::Settings;
use gtest_pretty::ui::{report_error, stdout_stream, MessageBlock, OutputMode};
use gtest_pretty::{execute, parse_command, print_usage, Command};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let fallback_mode = OutputMode::from_env().unwrap_or(OutputMode::Auto);
    let cli_args = match parse_command(args) {
        Ok(Command::Run(cli_args)) => cli_args,
        Ok(Command::Help) => {
            print_usage();
            return;
        }
        Err(err) => {
            let _ = report_error(
                fallback_mode,
                &MessageBlock::new("Invalid command arguments", err.to_string())
                    .with_hint("Run `gtest-pretty --help` to see supported flags"),
            );
            print_usage();
            std::process::exit(2);
        }
    };

    let settings = match Settings::load(&cli_args) {
        Ok(settings) => settings,
        Err(err) => {
            let _ = report_error(
                fallback_mode,
                &MessageBlock::new("Invalid configuration", err.to_string()),
            );
            std::process::exit(2);
        }
    };
    log::debug!("effective settings: {settings:?}");

    let (stream, color_enabled) = stdout_stream(settings.color);
    let stdin = std::io::stdin().lock();
    if let Err(err) = execute(stdin, stream, color_enabled, &settings) {
        if err.is_broken_pipe() {
            log::debug!("output closed early: {err}");
            return;
        }
        let _ = report_error(settings.color, &MessageBlock::new("Run failed", err.to_string()));
        std::process::exit(1);
    }
}
