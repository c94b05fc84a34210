use std::io::Read;

use crate::error::{Error, Result};
use crate::pipeline::PlanInput;

/// Read one optimization run's input as JSON from stdin.
pub fn read_plan_from_stdin() -> Result<PlanInput> {
    let mut raw = String::new();
    std::io::stdin().read_to_string(&mut raw)?;

    if raw.trim().is_empty() {
        return Err(Error::invalid_input("No plan input provided on stdin."));
    }

    let input: PlanInput = serde_json::from_str(&raw)?;
    Ok(input)
}
