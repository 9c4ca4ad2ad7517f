// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later
use clap::Parser;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::thread::sleep;
use teleop::axis_lock::command::help_lines;
use teleop::axis_lock::AxisLockController;
use teleop::console::{console_task, script_task, ConsoleInput};
use teleop::scheduler::{PeriodicScheduler, RealtimeConfig, StopReason};
use teleop::session::{prepare_session, share, BoundedSession, SetupParameters, SimulatedTeleop};
use teleop::termination::{install_termination_handler, termination_watch_task};
use teleop::{TeleopResult, TeleopSession};
use tracing::{error, info, warn};

const CONTROL_PERIOD_MS: u64 = 1;
const CONSOLE_PERIOD_MS: u64 = 1000;
const SCRIPT_PERIOD_MS: u64 = 100;
const TERMINATION_WATCH_PERIOD_MS: u64 = 100;

/// An example showing how to lock single axes of the local robot during robot-to-robot
/// teleoperation. Type a key followed by Enter to toggle the lock of an axis, `m` prints the key
/// map. With `--script` a timed sequence walks through every axis in both frames instead.
///
/// WARNING: Before executing this example, make sure there is enough space around both robots.
#[derive(Parser, Debug)]
#[clap(author, version, name = "axis_lock_teleop")]
struct CommandLineArguments {
    /// Serial number of the local robot
    #[clap(short = 'l', long)]
    pub local_serial: String,
    /// Serial number of the remote robot
    #[clap(short = 'r', long)]
    pub remote_serial: String,
    /// Path to the teleoperation license config file
    #[clap(short = 'c', long)]
    pub config: PathBuf,
    /// Enforce realtime scheduling of the control task
    #[clap(long)]
    pub realtime: bool,
    /// Run the timed axis-lock test sequence instead of reading the console
    #[clap(long)]
    pub script: bool,
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
        error!(%error, "axis lock teleoperation failed");
        std::process::exit(1);
    }
}

fn run(args: CommandLineArguments) -> TeleopResult<()> {
    info!(
        local = %args.local_serial,
        remote = %args.remote_serial,
        config = %args.config.display(),
        script = args.script,
        "starting axis lock teleoperation"
    );
    warn!("This example will move the robots! Please make sure to have the user stop buttons at hand!");
    install_termination_handler()?;

    let simulated = SimulatedTeleop::new(&args.local_serial, &args.remote_serial, &args.config)?;
    let mut session = BoundedSession::new(simulated, None, None);
    let parameters = SetupParameters::default();
    prepare_session(&mut session, &parameters)?;
    info!(delay = ?parameters.ready_delay, "waiting for the robots to reach their posture");
    sleep(parameters.ready_delay);

    let session = share(session);
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
        vec![("teleop".to_string(), session.clone())],
    )?;

    let controller = AxisLockController::new(session.clone());
    if args.script {
        scheduler.add_task(script_task(controller, SCRIPT_PERIOD_MS, min_priority)?)?;
    } else {
        for line in help_lines() {
            info!("{}", line);
        }
        let input = ConsoleInput::spawn(BufReader::new(io::stdin()), stop.clone())?;
        scheduler.add_task(console_task(
            controller,
            input,
            CONSOLE_PERIOD_MS,
            min_priority,
        )?)?;
    }
    scheduler.add_task(termination_watch_task(
        stop,
        TERMINATION_WATCH_PERIOD_MS,
        min_priority,
    )?)?;

    let reason = scheduler.start()?;
    if let Err(error) = session.borrow_mut().stop() {
        warn!(%error, "stopping the robots failed");
    }
    match reason {
        StopReason::Cancelled => {
            info!("axis lock teleoperation stopped");
            Ok(())
        }
        StopReason::TaskFailed { error, .. } => Err(error),
    }
}
