// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later
use clap::Parser;
use std::path::PathBuf;
use std::thread::sleep;
use teleop::scheduler::{PeriodicScheduler, RealtimeConfig, StopReason};
use teleop::session::{prepare_session, share, BoundedSession, SetupParameters, SimulatedTeleop};
use teleop::termination::{install_termination_handler, termination_watch_task};
use teleop::{TeleopResult, TeleopSession};
use tracing::{error, info, warn};

const CONTROL_PERIOD_MS: u64 = 1;
const TERMINATION_WATCH_PERIOD_MS: u64 = 100;

/// An example which teleoperates two robot pairs at once. Both sessions are advanced in the same
/// control tick, the first pair before the second one. A fault on either pair stops both.
///
/// WARNING: Before executing this example, make sure there is enough space around all robots.
#[derive(Parser, Debug)]
#[clap(author, version, name = "dual_teleop")]
struct CommandLineArguments {
    /// Serial number of the local robot of the first pair
    #[clap(short = 'l', long)]
    pub local_serial: String,
    /// Serial number of the remote robot of the first pair
    #[clap(short = 'r', long)]
    pub remote_serial: String,
    /// Serial number of the local robot of the second pair
    #[clap(short = 'L', long)]
    pub second_local_serial: String,
    /// Serial number of the remote robot of the second pair
    #[clap(short = 'R', long)]
    pub second_remote_serial: String,
    /// Path to the teleoperation license config file
    #[clap(short = 'c', long)]
    pub config: PathBuf,
    /// Enforce realtime scheduling of the control task
    #[clap(long)]
    pub realtime: bool,
}

fn parse_arguments() -> CommandLineArguments {
    CommandLineArguments::try_parse().unwrap_or_else(|error| {
        if !error.use_stderr() {
            error.exit();
        }
        let _ = error.print();
        std::process::exit(1);
    })
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
    let args = parse_arguments();
    if let Err(error) = run(args) {
        error!(%error, "dual teleoperation failed");
        std::process::exit(1);
    }
}

fn run(args: CommandLineArguments) -> TeleopResult<()> {
    info!(
        first_local = %args.local_serial,
        first_remote = %args.remote_serial,
        second_local = %args.second_local_serial,
        second_remote = %args.second_remote_serial,
        config = %args.config.display(),
        "starting dual teleoperation"
    );
    warn!("This example will move the robots! Please make sure to have the user stop buttons at hand!");
    install_termination_handler()?;

    let parameters = SetupParameters::default();
    let mut first = BoundedSession::new(
        SimulatedTeleop::new(&args.local_serial, &args.remote_serial, &args.config)?,
        None,
        None,
    );
    let mut second = BoundedSession::new(
        SimulatedTeleop::new(
            &args.second_local_serial,
            &args.second_remote_serial,
            &args.config,
        )?,
        None,
        None,
    );
    prepare_session(&mut first, &parameters)?;
    prepare_session(&mut second, &parameters)?;
    info!(delay = ?parameters.ready_delay, "waiting for the robots to reach their posture");
    sleep(parameters.ready_delay);

    let (first, second) = (share(first), share(second));
    let realtime = if args.realtime {
        RealtimeConfig::Enforce
    } else {
        RealtimeConfig::Ignore
    };
    let mut scheduler = PeriodicScheduler::new(realtime);
    let stop = scheduler.stop_token();
    let (max_priority, min_priority) = (scheduler.max_priority(), scheduler.min_priority());
    scheduler.add_control_task(
        "control",
        CONTROL_PERIOD_MS,
        max_priority,
        vec![
            (args.local_serial.clone(), first.clone()),
            (args.second_local_serial.clone(), second.clone()),
        ],
    )?;
    scheduler.add_task(termination_watch_task(
        stop,
        TERMINATION_WATCH_PERIOD_MS,
        min_priority,
    )?)?;

    let reason = scheduler.start()?;
    for session in [&first, &second].iter() {
        if let Err(error) = session.borrow_mut().stop() {
            warn!(%error, "stopping the robots failed");
        }
    }
    match reason {
        StopReason::Cancelled => {
            info!("dual teleoperation stopped");
            Ok(())
        }
        StopReason::TaskFailed { task, error } => {
            error!(%task, "teleoperation stopped after a fault");
            Err(error)
        }
    }
}
