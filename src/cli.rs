use clap::{App, Arg, ArgMatches};
use log::{LevelFilter, SetLoggerError};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use crate::diagnostics::config::TracingConfig;

// Exit Codes for different types of errors
pub const ERR_INPUT_ERROR: i32 = 1;
pub const ERR_DIAGNOSTICS: i32 = 2;
pub const ERR_OUTPUT_ERROR: i32 = 3;
pub const ERR_CONFIG_ERROR: i32 = 4;

pub fn print_errs(errs: &[String]) {
    for e in errs {
        println!("{}", e);
    }
}

pub fn configure_cli() -> clap::App<'static, 'static> {
    let app = App::new("HLASM Semantic Processor")
        .version("0.1.0")
        .author("Erich Ess")
        .about("Runs the semantic checks of the High Level Assembler over a file of pre-split source statements")
        .arg(
            Arg::with_name("input")
                .short("i")
                .long("input")
                .takes_value(true)
                .required(true)
                .help("YAML file listing the source statements to process"),
        )
        .arg(
            Arg::with_name("json")
                .long("json")
                .takes_value(true)
                .help("Write the diagnostics as JSON, one object per line, to the given file")
        )
        .arg(
            Arg::with_name("quiet")
                .short("q")
                .long("quiet")
                .help("Do not print diagnostics to the console")
        )
        .arg(
            Arg::with_name("log-level")
                .long("log-level")
                .possible_values(&["error", "warn", "info", "debug", "trace"])
                .takes_value(true)
                .help("Print log messages of this level and above")
        )
        .arg(
            Arg::with_name("trace")
                .long("trace")
                .takes_value(true)
                .help("Prints each statement as the processing manager receives it.  Takes a line range: `all`, `N`, `N:M`, `:M` or `N:`")
        );
    app
}

pub fn get_log_level(args: &ArgMatches) -> Option<LevelFilter> {
    match args.value_of("log-level") {
        Some("error") => Some(LevelFilter::Error),
        Some("warn") => Some(LevelFilter::Warn),
        Some("info") => Some(LevelFilter::Info),
        Some("debug") => Some(LevelFilter::Debug),
        Some("trace") => Some(LevelFilter::Trace),
        _ => None,
    }
}

pub fn configure_logging(level: LevelFilter) -> Result<(), SetLoggerError> {
    TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
}

pub fn get_tracing(args: &ArgMatches) -> Result<TracingConfig, String> {
    match args.value_of("trace") {
        None => Ok(TracingConfig::Off),
        Some(range) => range.parse(),
    }
}

pub fn get_json_output<'a>(args: &'a ArgMatches) -> Option<&'a str> {
    args.value_of("json")
}

pub fn enable_console(args: &ArgMatches) -> bool {
    !args.is_present("quiet")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags() {
        let args = configure_cli()
            .get_matches_from_safe(vec![
                "hlasmc",
                "-i",
                "src.yaml",
                "--log-level",
                "debug",
                "--trace",
                "3:7",
                "-q",
            ])
            .unwrap();
        assert_eq!(args.value_of("input"), Some("src.yaml"));
        assert_eq!(get_log_level(&args), Some(LevelFilter::Debug));
        assert_eq!(get_tracing(&args), Ok(TracingConfig::Between(3, 7)));
        assert_eq!(get_json_output(&args), None);
        assert!(!enable_console(&args));
    }

    #[test]
    fn defaults() {
        let args = configure_cli()
            .get_matches_from_safe(vec!["hlasmc", "--input", "src.yaml"])
            .unwrap();
        assert_eq!(get_log_level(&args), None);
        assert_eq!(get_tracing(&args), Ok(TracingConfig::Off));
        assert!(enable_console(&args));
    }

    #[test]
    fn input_is_required() {
        assert!(configure_cli().get_matches_from_safe(vec!["hlasmc"]).is_err());
    }
}
