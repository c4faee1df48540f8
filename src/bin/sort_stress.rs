//! Soak test the arm by sorting made-up objects in a loop:
//!
//! 1. Pick a random approach pose inside the reachable workspace
//! 2. Pick a random destination pile
//! 3. Run the full pick-and-sort routine
//!
//! This allows us to watch the servos for drift or stalls over many cycles.

use clap::Parser;
use rand::Rng;

use braccio_sorter::arm::Arm;
use braccio_sorter::config::ArmConfig;
use braccio_sorter::destination::Destination;
use braccio_sorter::sequencer::ApproachPose;
use braccio_sorter::servo_hal_factory::ServoHalFactory;

#[derive(Parser, Debug)]
#[clap(name = "sort_stress")]
struct Opts {
    #[clap(default_value = "50")]
    num_runs: u32,

    #[clap(long)]
    fake_hw: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opts: Opts = Opts::parse();

    let config = ArmConfig::default();
    let hal = ServoHalFactory::new_maybe_mock(opts.fake_hw).create_hal(&config.gpio)?;
    let mut arm = Arm::new(hal, &config)?;
    arm.initialize_arm().await?;

    let mut rng = rand::thread_rng();
    let mut total_ticks = 0;
    for i in 0..opts.num_runs {
        let approach = ApproachPose::new(rng.gen_range(0..=180), rng.gen_range(30..=90), rng.gen_range(30..=90));
        let destination = Destination::ALL[rng.gen_range(0..Destination::ALL.len())];
        println!("Starting run #{i}: {approach:?} -> {destination:?}");
        let report = arm.pick_and_sort(approach, destination).await?;
        total_ticks += report.ticks;
    }
    arm.dump();
    println!("Successful stress test! ({total_ticks} ticks)");
    Ok(())
}
