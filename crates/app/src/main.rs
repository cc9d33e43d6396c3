//! Entry point for `gbn-sim`.
//!
//! Owns only process setup (logging, argument parsing) and rendering of
//! the event trace; all protocol work happens in `gbn-sim-core`. The
//! binary drives the engine event by event under a budget, so a run that
//! cannot complete (say, total ACK loss) still exits with a clear
//! message instead of spinning.

mod config;

use config::Config;
use gbn_sim_core::{Engine, EngineState};

fn main() {
    // Initialise env_logger; set RUST_LOG to control verbosity.
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match Config::from_args(&args) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("error: {message}");
            eprintln!("run with --help for usage");
            std::process::exit(1);
        }
    };
    log::debug!("resolved config: {config:?}");

    if let Err(message) = run(&config) {
        eprintln!("error: {message}");
        std::process::exit(1);
    }
}

fn run(config: &Config) -> Result<(), String> {
    if config.print_config {
        config.print();
    }
    println!(
        "Go-Back-N: {} frames, window {}, timeout {} ms, seed {}",
        config.sim.frame_count, config.sim.window_size, config.sim.timeout_ms, config.sim.seed
    );
    println!();

    let mut engine = Engine::new(config.sim.clone()).map_err(|e| e.to_string())?;
    engine.start().map_err(|e| e.to_string())?;

    let mut processed = 0;
    loop {
        let events = engine.drain_events();
        if config.trace {
            for (at, event) in &events {
                println!("[{at:>6} ms] {event}");
            }
        }
        if engine.state() != EngineState::Running || processed >= config.max_events {
            break;
        }
        if !engine.process_next() {
            break;
        }
        processed += 1;
    }

    println!();
    match engine.state() {
        EngineState::Completed => {
            if config.print_stats {
                engine.stats().print_summary();
            }
            Ok(())
        }
        state => Err(format!(
            "run did not complete ({processed} events processed, engine {state}); \
             raise --max-events or soften the loss policies"
        )),
    }
}
