// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later
use clap::Parser;
use std::path::PathBuf;
use std::thread::sleep;
use teleop::scheduler::{PeriodicScheduler, RealtimeConfig, StopReason};
use teleop::session::{prepare_session, share, BoundedSession, SetupParameters, SimulatedTeleop};
use teleop::termination::{install_termination_handler, termination_watch_task};
use teleop::{RemoteGripper, TeleopResult, TeleopSession};
use tracing::{error, info, warn};

const CONTROL_PERIOD_MS: u64 = 1;
const TERMINATION_WATCH_PERIOD_MS: u64 = 100;

/// An example of free space teleoperation. Both robots keep the posture they are in as their
/// null-space posture and the gripper of the remote robot is initialized before teleoperation
/// starts.
///
/// WARNING: Before executing this example, make sure there is enough space around both robots.
#[derive(Parser, Debug)]
#[clap(author, version, name = "free_space_teleop")]
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
        error!(%error, "free space teleoperation failed");
        std::process::exit(1);
    }
}

fn run(args: CommandLineArguments) -> TeleopResult<()> {
    info!(
        local = %args.local_serial,
        remote = %args.remote_serial,
        config = %args.config.display(),
        "starting free space teleoperation"
    );
    warn!("This example will move the robots! Please make sure to have the user stop buttons at hand!");
    install_termination_handler()?;

    let simulated = SimulatedTeleop::new(&args.local_serial, &args.remote_serial, &args.config)?;
    let mut session = BoundedSession::new(simulated, None, None);
    let parameters = SetupParameters::hold_current_posture();
    prepare_session(&mut session, &parameters)?;
    session.inner_mut().init_gripper()?;
    let gripper = session.inner().gripper_state()?;
    info!(
        width = gripper.width,
        max_width = gripper.max_width,
        "remote gripper initialized"
    );
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
    scheduler.add_task(termination_watch_task(
        stop,
        TERMINATION_WATCH_PERIOD_MS,
        min_priority,
    )?)?;

    let reason = scheduler.start()?;
    {
        let mut session = session.borrow_mut();
        if let Err(error) = session.inner_mut().stop_gripper() {
            warn!(%error, "stopping the gripper failed");
        }
        if let Err(error) = session.stop() {
            warn!(%error, "stopping the robots failed");
        }
    }
    match reason {
        StopReason::Cancelled => {
            info!("free space teleoperation stopped");
            Ok(())
        }
        StopReason::TaskFailed { error, .. } => Err(error),
    }
}
