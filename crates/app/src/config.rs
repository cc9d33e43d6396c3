//! Configuration for the gbn-sim command line.
//!
//! Handles parsing command-line arguments and generating sensible
//! defaults (including randomized defaults that are reproducible with a
//! seed).
//!
//! # Philosophy
//!
//! The tool should work with ZERO arguments, using intelligent defaults.
//! The seed is always printed so any run can be replayed exactly.

use gbn_sim_core::{DelayPolicy, LossPolicy, SimConfig};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Complete configuration for one simulation run of the CLI.
#[derive(Debug, Clone)]
pub struct Config {
    /// Engine parameters
    pub sim: SimConfig,

    // === Behavior ===
    /// Upper bound on dispatched events, so hopeless runs still exit
    pub max_events: usize,

    /// Whether to print the per-event trace
    pub trace: bool,

    /// Whether to print detailed config before the run
    pub print_config: bool,

    /// Whether to print the statistics summary after the run
    pub print_stats: bool,
}

impl Config {
    /// Parse configuration from command-line arguments.
    ///
    /// If no arguments are provided, generates randomized defaults using
    /// a time-based seed. If --seed is provided, that seed drives both
    /// the defaults and the run itself (fully deterministic).
    pub fn from_args(args: &[String]) -> Result<Self, String> {
        let mut frame_count: Option<u32> = None;
        let mut window_size: Option<u32> = None;
        let mut timeout_ms: Option<u64> = None;
        let mut frame_loss: Option<LossPolicy> = None;
        let mut delay_seqs: Option<Vec<u32>> = None;
        let mut delay_every_k: Option<u32> = None;
        let mut extra_delay_ms: Option<u64> = None;
        let mut frame_transit_ms: Option<u64> = None;
        let mut ack_loss: Option<f64> = None;
        let mut ack_delay_ms: Option<u64> = None;
        let mut ack_transit_ms: Option<u64> = None;
        let mut process_ms: Option<u64> = None;
        let mut seed: Option<u64> = None;
        let mut max_events: Option<usize> = None;
        let mut trace = true;
        let mut print_config = false;
        let mut print_stats = true;

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--frames" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--frames requires a number".to_string());
                    }
                    frame_count = Some(args[i].parse().map_err(|_| "invalid frames")?);
                }
                "--window" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--window requires a number".to_string());
                    }
                    window_size = Some(args[i].parse().map_err(|_| "invalid window")?);
                }
                "--timeout" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--timeout requires a number".to_string());
                    }
                    timeout_ms = Some(args[i].parse().map_err(|_| "invalid timeout")?);
                }
                "--loss" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--loss requires a number".to_string());
                    }
                    let probability = args[i].parse().map_err(|_| "invalid loss rate")?;
                    frame_loss = Some(LossPolicy::Random { probability });
                }
                "--drop" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--drop requires a list like 2,7,9".to_string());
                    }
                    frame_loss = Some(LossPolicy::Specific {
                        seqs: parse_seq_list(&args[i])?,
                    });
                }
                "--every-k" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--every-k requires a number".to_string());
                    }
                    let k = args[i].parse().map_err(|_| "invalid every-k")?;
                    frame_loss = Some(LossPolicy::EveryK { k });
                }
                "--no-loss" => {
                    frame_loss = Some(LossPolicy::None);
                }
                "--delay-frames" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--delay-frames requires a list like 2,7,9".to_string());
                    }
                    delay_seqs = Some(parse_seq_list(&args[i])?);
                }
                "--delay-every-k" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--delay-every-k requires a number".to_string());
                    }
                    delay_every_k = Some(args[i].parse().map_err(|_| "invalid delay-every-k")?);
                }
                "--extra-delay" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--extra-delay requires a number".to_string());
                    }
                    extra_delay_ms = Some(args[i].parse().map_err(|_| "invalid extra-delay")?);
                }
                "--transit" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--transit requires a number".to_string());
                    }
                    frame_transit_ms = Some(args[i].parse().map_err(|_| "invalid transit")?);
                }
                "--ack-loss" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--ack-loss requires a number".to_string());
                    }
                    ack_loss = Some(args[i].parse().map_err(|_| "invalid ack-loss rate")?);
                }
                "--ack-delay" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--ack-delay requires a number".to_string());
                    }
                    ack_delay_ms = Some(args[i].parse().map_err(|_| "invalid ack-delay")?);
                }
                "--ack-transit" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--ack-transit requires a number".to_string());
                    }
                    ack_transit_ms = Some(args[i].parse().map_err(|_| "invalid ack-transit")?);
                }
                "--process" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--process requires a number".to_string());
                    }
                    process_ms = Some(args[i].parse().map_err(|_| "invalid process time")?);
                }
                "--seed" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--seed requires a number".to_string());
                    }
                    seed = Some(args[i].parse().map_err(|_| "invalid seed")?);
                }
                "--max-events" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--max-events requires a number".to_string());
                    }
                    max_events = Some(args[i].parse().map_err(|_| "invalid max-events")?);
                }
                "--quiet" => {
                    trace = false;
                }
                "--print-config" => {
                    print_config = true;
                }
                "--no-stats" => {
                    print_stats = false;
                }
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                _ => {
                    return Err(format!("unknown argument: {}", args[i]));
                }
            }
            i += 1;
        }

        // Determine seed (explicit or time-based)
        let seed = seed.unwrap_or_else(|| {
            use std::time::{SystemTime, UNIX_EPOCH};
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|t| t.as_millis() as u64)
                .unwrap_or(0)
        });

        // Generate defaults using the seed
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let frame_delay = match (delay_seqs, delay_every_k) {
            (Some(_), Some(_)) => {
                return Err("choose one of --delay-frames and --delay-every-k".to_string())
            }
            (Some(seqs), None) => DelayPolicy::Specific {
                seqs,
                extra_ms: extra_delay_ms.unwrap_or(1_000),
            },
            (None, Some(k)) => DelayPolicy::EveryK {
                k,
                extra_ms: extra_delay_ms.unwrap_or(1_000),
            },
            (None, None) => DelayPolicy::None,
        };

        let defaults = SimConfig::default();
        let sim = SimConfig {
            frame_count: frame_count.unwrap_or_else(|| rng.gen_range(8..=20)),
            window_size: window_size.unwrap_or_else(|| rng.gen_range(2..=6)),
            timeout_ms: timeout_ms.unwrap_or_else(|| rng.gen_range(5_000..=9_000)),
            frame_loss: frame_loss.unwrap_or_else(|| {
                // Bias toward small loss rates
                let r: f64 = rng.gen();
                LossPolicy::Random {
                    probability: (r * r * 0.3).min(0.3),
                }
            }),
            frame_delay,
            frame_transit_ms: frame_transit_ms.unwrap_or(defaults.frame_transit_ms),
            ack_loss: ack_loss.unwrap_or_else(|| {
                let r: f64 = rng.gen();
                (r * r * 0.1).min(0.1)
            }),
            ack_delay_ms: ack_delay_ms.unwrap_or(defaults.ack_delay_ms),
            process_ms: process_ms.unwrap_or(defaults.process_ms),
            ack_transit_ms: ack_transit_ms.unwrap_or(defaults.ack_transit_ms),
            seed,
        };

        Ok(Config {
            sim,
            max_events: max_events.unwrap_or(100_000),
            trace,
            print_config,
            print_stats,
        })
    }

    /// Print the configuration in human-readable form.
    pub fn print(&self) {
        println!("=== Protocol ===");
        println!("Frames: {}", self.sim.frame_count);
        println!("Window: {}", self.sim.window_size);
        println!("Timeout: {} ms", self.sim.timeout_ms);
        println!();
        println!("=== Frame Channel ===");
        println!("Loss: {}", describe_loss(&self.sim.frame_loss));
        println!("Delay: {}", describe_delay(&self.sim.frame_delay));
        println!("Transit: {} ms", self.sim.frame_transit_ms);
        println!();
        println!("=== ACK Channel ===");
        println!("Loss: {:.2}%", self.sim.ack_loss * 100.0);
        println!("Extra delay: {} ms", self.sim.ack_delay_ms);
        println!("Transit: {} ms", self.sim.ack_transit_ms);
        println!("Receiver turnaround: {} ms", self.sim.process_ms);
        println!();
        println!("=== Run ===");
        println!("Seed: {}", self.sim.seed);
        println!("Max events: {}", self.max_events);
        println!();
    }
}

/// Parse a comma-separated list of sequence numbers, e.g. "2,7,9".
fn parse_seq_list(raw: &str) -> Result<Vec<u32>, String> {
    raw.split(',')
        .map(|part| {
            part.trim()
                .parse()
                .map_err(|_| format!("invalid sequence number: {part:?}"))
        })
        .collect()
}

fn describe_loss(policy: &LossPolicy) -> String {
    match policy {
        LossPolicy::None => "none".to_string(),
        LossPolicy::Random { probability } => format!("random {:.2}%", probability * 100.0),
        LossPolicy::Specific { seqs } => format!("first attempt of frames {seqs:?}"),
        LossPolicy::EveryK { k } => format!("first attempt of every {k}th frame"),
    }
}

fn describe_delay(policy: &DelayPolicy) -> String {
    match policy {
        DelayPolicy::None => "none".to_string(),
        DelayPolicy::Specific { seqs, extra_ms } => {
            format!("+{extra_ms} ms for frames {seqs:?}")
        }
        DelayPolicy::EveryK { k, extra_ms } => {
            format!("+{extra_ms} ms for every {k}th frame")
        }
    }
}

fn print_help() {
    println!("gbn-sim: Go-Back-N ARQ simulator over an unreliable channel");
    println!();
    println!("USAGE:");
    println!("    gbn-sim [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --frames <N>          Frames to deliver (default: random 8-20)");
    println!("    --window <N>          Sender window size (default: random 2-6)");
    println!("    --timeout <MS>        Retransmission timeout (default: random 5000-9000)");
    println!();
    println!("    --loss <RATE>         Random frame loss 0.0-1.0 (default: random 0-0.3)");
    println!("    --drop <LIST>         Drop first attempts of these frames, e.g. 2,7,9");
    println!("    --every-k <N>         Drop the first attempt of every Nth frame");
    println!("    --no-loss             Disable frame loss");
    println!("    --delay-frames <LIST> Add extra transit delay to these frames");
    println!("    --delay-every-k <N>   Add extra transit delay to every Nth frame");
    println!("    --extra-delay <MS>    Extra delay amount (default: 1000)");
    println!("    --transit <MS>        Frame transit time (default: 2000)");
    println!();
    println!("    --ack-loss <RATE>     Random ACK loss 0.0-1.0 (default: random 0-0.1)");
    println!("    --ack-delay <MS>      Extra delay on every ACK (default: 800)");
    println!("    --ack-transit <MS>    ACK transit time (default: 2000)");
    println!("    --process <MS>        Receiver turnaround time (default: 600)");
    println!();
    println!("    --seed <N>            Random seed for determinism");
    println!("    --max-events <N>      Stop after this many events (default: 100000)");
    println!();
    println!("    --quiet               Don't print the event trace");
    println!("    --print-config        Print resolved configuration");
    println!("    --no-stats            Don't print the statistics summary");
    println!("    --help, -h            Print this help");
    println!();
    println!("EXAMPLES:");
    println!("    gbn-sim                          # Run with random defaults");
    println!("    gbn-sim --seed 42                # Deterministic run");
    println!("    gbn-sim --frames 5 --window 2 --drop 2 --no-stats");
    println!("    gbn-sim --no-loss --ack-loss 0   # Perfect channel");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_explicit_flags_parsed() {
        let config = Config::from_args(&args(&[
            "--frames", "5", "--window", "2", "--timeout", "4000", "--drop", "2,4", "--seed", "9",
        ]))
        .unwrap();

        assert_eq!(config.sim.frame_count, 5);
        assert_eq!(config.sim.window_size, 2);
        assert_eq!(config.sim.timeout_ms, 4_000);
        assert_eq!(config.sim.frame_loss, LossPolicy::Specific { seqs: vec![2, 4] });
        assert_eq!(config.sim.seed, 9);
        assert!(config.trace);
    }

    #[test]
    fn test_last_loss_flag_wins() {
        let config = Config::from_args(&args(&["--loss", "0.5", "--no-loss", "--seed", "1"])).unwrap();
        assert_eq!(config.sim.frame_loss, LossPolicy::None);
    }

    #[test]
    fn test_missing_value_is_error() {
        assert!(Config::from_args(&args(&["--frames"])).is_err());
        assert!(Config::from_args(&args(&["--drop", "2,x"])).is_err());
        assert!(Config::from_args(&args(&["--bogus"])).is_err());
    }

    #[test]
    fn test_conflicting_delay_modes_rejected() {
        let result = Config::from_args(&args(&[
            "--delay-frames", "1,2", "--delay-every-k", "3", "--seed", "1",
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_same_seed_same_defaults() {
        let a = Config::from_args(&args(&["--seed", "1234"])).unwrap();
        let b = Config::from_args(&args(&["--seed", "1234"])).unwrap();

        assert_eq!(a.sim.frame_count, b.sim.frame_count);
        assert_eq!(a.sim.window_size, b.sim.window_size);
        assert_eq!(a.sim.timeout_ms, b.sim.timeout_ms);
        assert_eq!(a.sim.frame_loss, b.sim.frame_loss);
        assert_eq!(a.sim.ack_loss, b.sim.ack_loss);
    }

    #[test]
    fn test_randomized_defaults_validate() {
        for seed in 0..50 {
            let config = Config::from_args(&args(&["--seed", &seed.to_string()])).unwrap();
            assert!(config.sim.validate().is_ok(), "seed {seed} produced an invalid config");
        }
    }
}
