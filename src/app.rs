//! Application orchestrator.
//! Loads/merges config, initializes logging, installs the signal handler,
//! validates the directories, scans the library, and runs the watch loop.

use anyhow::{Context, Result};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use crate::cli::Args;
use crate::config::{self, Config};
use crate::intake::{self, IntakeState};
use crate::logging::init_tracing;
use crate::output as out;
use crate::sequence::SequenceCounter;
use crate::shutdown;
use crate::watcher;

/// Run the CLI application.
pub fn run(args: Args) -> Result<()> {
    // Handle --print-config before logging init
    if args.print_config {
        if let Ok(cfg_env) = std::env::var("IMG_INTAKE_CONFIG") {
            out::print_info(&format!("Using IMG_INTAKE_CONFIG (explicit):\n  {}\n", cfg_env));
            out::print_info("To override, unset IMG_INTAKE_CONFIG or set it to another file.");
            return Ok(());
        }
        match config::default_config_path() {
            Ok(p) => {
                out::print_info(&format!("Default img_intake config path:\n  {}\n", p.display()));
                if p.exists() {
                    out::print_info("A config file already exists at that location.");
                } else {
                    out::print_info(
                        "No config file exists there yet. Run without --print-config to create a template.",
                    );
                }
            }
            Err(e) => {
                out::print_error(&format!("Could not determine a default config path: {e}"));
            }
        }
        return Ok(());
    }

    // Create a template config on first run (before logging init)
    if let Some(path) = config::ensure_default_config_exists() {
        out::print_success(&format!(
            "A template img_intake config was written to: {}",
            path.display()
        ));
        out::print_info(
            "Edit the file to set `watch_dir`, `dest_dir` and optionally `log_level` and `log_file`. Example:\n\n<config>\n  <watch_dir>/path/to/temp</watch_dir>\n  <dest_dir>/path/to/assets/post</dest_dir>\n  <log_level>normal</log_level>\n</config>\n",
        );
        out::print_info("Then re-run this command. To use a different location set IMG_INTAKE_CONFIG.");
        return Ok(());
    }

    // Build config: explicit env file, else default XML, else defaults.
    // CLI flags win over config values.
    let mut cfg: Config = match config::load_config_from_xml_env()? {
        Some(c) => c,
        None => config::load_config_from_default_xml()?.unwrap_or_default(),
    };
    args.apply_overrides(&mut cfg);

    // Initialize logging and capture the guard so we can drop it on signal
    let guard_opt: Option<tracing_appender::non_blocking::WorkerGuard> =
        init_tracing(&cfg.log_level, cfg.log_file.as_deref(), args.json).map_err(|e| {
            out::print_error(&format!("Failed to initialize logging: {}", e));
            e
        })?;

    // Guard needs to be dropped on SIGINT to flush logs
    let guard_slot = Arc::new(Mutex::new(guard_opt));
    {
        let guard_slot = Arc::clone(&guard_slot);
        ctrlc::set_handler(move || {
            shutdown::request();
            out::print_warn("Received interrupt; shutting down gracefully...");
            if let Ok(mut g) = guard_slot.lock() {
                let _ = g.take(); // drop guard here to flush tracing_appender
            }
        })
        .expect("failed to install signal handler");
    }

    if shutdown::is_requested() {
        return Ok(());
    }

    debug!("Starting img_intake: {:?}", args);

    let result = (|| -> Result<()> {
        cfg.validate()?;

        let counter = SequenceCounter::scan_library(&cfg.dest_dir)
            .context("initialize sequence counter")?;
        info!(start = counter.current(), "Sequence counter initialized");

        let (tx, rx) = mpsc::channel();
        let watcher = watcher::spawn(&cfg.watch_dir, tx)?;

        let mut state = IntakeState::new(counter);
        let run_result = intake::run(&cfg, &mut state, &rx);

        watcher.stop();
        run_result
    })();

    // Ensure logs are flushed before exit
    if let Ok(mut g) = guard_slot.lock() {
        let _ = g.take();
    }

    result
}
