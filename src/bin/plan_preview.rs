use clap::Parser;

use braccio_sorter::calibration::Calibration;
use braccio_sorter::destination::Destination;
use braccio_sorter::motion::DEFAULT_TICK_INTERVAL;
use braccio_sorter::sequencer::{ApproachPose, PickPlaceSequencer, PickRequest};
use braccio_sorter::zone::ZoneVariant;

#[derive(Parser, Debug)]
#[clap(name = "plan_preview")]
struct Opts {
  #[clap(short, long, default_value = "90")]
  base: u8,

  #[clap(short, long, default_value = "40")]
  shoulder: u8,

  #[clap(short, long, default_value = "70")]
  elbow: u8,

  /// Destination colour index, 0-3.
  #[clap(short, long, default_value = "0")]
  colour: u8,

  #[clap(long, arg_enum, default_value = "narrow")]
  zone_variant: ZoneVariant,
}

fn main() -> anyhow::Result<()> {
  let opts: Opts = Opts::parse();

  let calibration = Calibration {
    zones: opts.zone_variant.table(),
    ..Default::default()
  };
  let request = PickRequest::new(
    ApproachPose::new(opts.base, opts.shoulder, opts.elbow),
    Destination::try_from(opts.colour)?,
  );
  let plan = PickPlaceSequencer::new(&calibration).plan(request)?;

  for band in calibration.zones.bands() {
    println!("zone <= {:3}: wrist {}", band.max_shoulder, band.wrist);
  }
  println!("zone beyond: wrist {}", calibration.zones.under());
  println!("grasp depth {}", plan.grasp_depth);

  let mut from = calibration.seed_pose();
  let mut total = 0u32;
  for planned in plan.moves {
    let ticks = from.distance_to(&planned.pose);
    total += u32::from(ticks);
    println!("{:<14} {:3} ticks  {}", format!("{:?}", planned.phase), ticks, planned.pose);
    from = planned.pose;
  }
  println!("{total} ticks, {:?} at the default tick interval", DEFAULT_TICK_INTERVAL * total);
  Ok(())
}
