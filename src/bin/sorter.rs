//! Main controller.  Brings the arm up, then reads pick commands (`BBB,SSS,EEE,C`) from stdin one
//! per line, sorts each object and answers `ready` so the vision side sends the next one.

use std::io;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::{error, info, warn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use braccio_sorter::arm::Arm;
use braccio_sorter::arm_task::{ArmHandle, ArmTask};
use braccio_sorter::command::parse_pick_command;
use braccio_sorter::config::ArmConfig;
use braccio_sorter::servo_hal_factory::ServoHalFactory;
use braccio_sorter::zone::ZoneVariant;

#[derive(Parser, Debug)]
#[clap(name = "sorter")]
struct Opts {
    #[clap(long)]
    fake_hw: bool,

    /// JSON file with tick timing, calibration angles and GPIO pins.
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Overrides the grasp zone table from the config file.
    #[clap(long, arg_enum)]
    zone_variant: Option<ZoneVariant>,

    #[clap(long)]
    calibrate_only: bool,

    /// Print the effective config as JSON and exit.
    #[clap(long)]
    dump_config: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opts: Opts = Opts::parse();

    let mut config = match &opts.config {
        Some(path) => ArmConfig::load_json(path)?,
        None => ArmConfig::default(),
    };
    if let Some(variant) = opts.zone_variant {
        config.calibration.zones = variant.table();
    }
    if opts.dump_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let hal = ServoHalFactory::new_maybe_mock(opts.fake_hw).create_hal(&config.gpio)?;
    let arm = Arm::new(hal, &config)?;
    let handle = ArmTask::start(arm);
    handle.initialize().await.context("bringing up the arm")?;
    if opts.calibrate_only {
        handle.shutdown().await?.dump();
        return Ok(());
    }

    info!("Waiting for commands...");
    let stdin = BufReader::new(tokio::io::stdin());
    let result = serve(&handle, stdin, io::stdout()).await;
    let arm = handle.shutdown().await?;
    arm.dump();
    result
}

async fn serve(
    handle: &ArmHandle,
    input: impl AsyncBufRead + Unpin,
    mut output: impl Write,
) -> anyhow::Result<()> {
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let request = match parse_pick_command(&line) {
            Ok(request) => request,
            Err(e) => {
                warn!("Ignoring [{line}]: {e}");
                continue;
            }
        };
        match handle.pick_and_sort(request).await {
            Ok(report) => info!("Sorted to {:?} ({} ticks)", request.destination, report.ticks),
            Err(e) => {
                error!("Pick failed: {e}");
                handle.move_home().await.context("returning home after a failed pick")?;
            }
        }
        writeln!(output, "ready")?;
        output.flush()?;
    }
    info!("Input closed");
    Ok(())
}
