use clap::Parser;
use log::LevelFilter;
use ruuvitag_decoder::app::{Options, RunError, run_with_io};
use ruuvitag_decoder::{AdPayloadParser, Dispatcher, LineSource};
use std::panic::{self, PanicHookInfo};

/// Exit codes for the application
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_PANIC: i32 = 2;

/// Log warnings by default and decode diagnostics with `--verbose`.
/// `RUST_LOG` overrides both.
fn init_logger(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp_secs()
        .init();
}

async fn run(options: Options) -> Result<(), RunError> {
    let source = LineSource::new(options.input.clone());
    let dispatcher = Dispatcher::new(AdPayloadParser);
    let mut out = std::io::stdout().lock();
    let mut err = std::io::stderr().lock();
    run_with_io(options, &source, &dispatcher, &mut out, &mut err).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Clean exit codes for process managers (e.g. systemd, Telegraf execd)
    panic::set_hook(Box::new(move |info: &PanicHookInfo| {
        eprintln!("Panic! {}", info);
        std::process::exit(EXIT_PANIC);
    }));

    let options = Options::parse();
    init_logger(options.verbose);

    match run(options).await {
        Ok(()) => std::process::exit(EXIT_SUCCESS),
        Err(why) => {
            eprintln!("error: {}", why);
            std::process::exit(EXIT_ERROR);
        }
    }
}
