#![warn(clippy::all)]

// main entry point
use log::{error, info, LevelFilter, SetLoggerError};
use qsed::network::processing::PacketProcessor;
use qsed::settings::{Cli, Settings};
use qsed::utils::log_rules;
use std::io::{self, Write};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// Simple console logger implementation
struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            let mut stdout = io::stdout();
            let timestamp = chrono::Local::now().format("%H:%M:%S%.3f");
            // a closed stdout leaves nowhere to report to
            let _ = writeln!(
                stdout,
                "[{}] {} - {}: {}",
                timestamp,
                record.level(),
                record.target(),
                record.args()
            );
            let _ = stdout.flush();
        }
    }

    fn flush(&self) {
        let _ = io::stdout().flush();
    }
}

static LOGGER: ConsoleLogger = ConsoleLogger;

/// Initialize the application logger
///
/// Info level by default, Debug when verbose
fn init_logger(verbose: bool) -> Result<(), SetLoggerError> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    log::set_logger(&LOGGER).map(|()| log::set_max_level(level))
}

/// Main entry point for qsed
fn main() {
    let cli = Cli::parse_args();

    let settings = match cli.settings() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    if let Err(e) = init_logger(settings.verbose) {
        eprintln!("Failed to initialize logger: {}", e);
        process::exit(1);
    }

    if let Some(path) = &cli.write_config {
        match settings.save_to_file(path) {
            Ok(()) => info!("Settings written to {}", path.display()),
            Err(e) => {
                error!("{}", e);
                process::exit(1);
            }
        }
        return;
    }

    if let Err(e) = run(&settings) {
        error!("{}", e);
        process::exit(1);
    }
}

fn run(settings: &Settings) -> qsed::Result<()> {
    let rules = settings.build_rule_store()?;
    let processor = PacketProcessor::new(Arc::new(rules), settings.rewrite_options());
    if settings.verbose {
        log_rules(processor.rules());
    }

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Shutdown requested, finishing current packet");
        r.store(false, Ordering::SeqCst);
    })
    .map_err(|e| qsed::QsedError::transport("installing signal handler", e))?;

    run_queue(settings, &processor, &running)
}

#[cfg(target_os = "linux")]
fn run_queue(
    settings: &Settings,
    processor: &PacketProcessor,
    running: &AtomicBool,
) -> qsed::Result<()> {
    use qsed::network::core::NfQueueHandle;
    use qsed::network::processing::receive_packets;

    let mut queue = NfQueueHandle::open(settings.queue_config())?;
    info!("qsed listening on queue {}", queue.config().queue_num);

    let stats = receive_packets(&mut queue, processor, running, &settings.receive_options())?;
    queue.close()?;

    info!(
        "Stopped after {} packets, {} substitutions",
        stats.received, stats.substitutions
    );
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn run_queue(
    _settings: &Settings,
    _processor: &PacketProcessor,
    _running: &AtomicBool,
) -> qsed::Result<()> {
    Err(qsed::QsedError::Transport(
        "netfilter queues are only available on Linux".to_string(),
    ))
}
