use std::time::Instant;

use log::info;

use popmap::{PlanOptions, Result, logging, plan, read_plan_from_stdin};

fn main() -> Result<()> {
    let now = Instant::now();
    let options = PlanOptions::from_args().map_err(popmap::Error::invalid_input)?;
    logging::init_logger(&options)?;
    let mut input = read_plan_from_stdin()?;

    if let Some(space) = options.space_override {
        input.space = space;
    }
    if let Some(threshold) = options.threshold_miles {
        input.requirements.distance_threshold_miles = threshold;
    }

    info!(
        "input: sites={} facilities={} space={:?}",
        input.sites.len(),
        input.facilities.len(),
        input.space
    );

    let output = plan(&input)?;

    let rendered = if options.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{rendered}");

    info!(
        "output: assignments={} active={} scores={} skipped_sites={} skipped_facilities={} time={:.2}s",
        output.assignments.len(),
        output.selection.active_facility_ids.len(),
        output.scores.len(),
        output.skipped_sites.len(),
        output.skipped_facilities.len(),
        now.elapsed().as_secs_f32()
    );

    Ok(())
}
