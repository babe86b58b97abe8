//! Run summary output for the daybar CLI.

use anyhow::Result;
use daybar_lib::prelude::*;

use crate::logging::LogFormat;

/// Prints a finished run to stdout.
pub(crate) fn print_run(run: &PipelineRun, format: LogFormat) -> Result<()> {
    match format {
        LogFormat::Json => println!("{}", serde_json::to_string(run)?),
        LogFormat::Pretty => {
            println!("Run:        {}", run.id);
            println!("Ticker:     {}", run.ticker);
            println!("Window:     {}", run.window);
            println!("State:      {}", run.state);
            println!("Extracted:  {}", run.extracted);
            println!("Attempted:  {}", run.attempted);
            if let (Some(stage), Some(message)) = (run.failed_stage, &run.error_message) {
                println!("Failed in:  {stage}");
                println!("Error:      {message}");
            }
            if let (Some(started), Some(finished)) = (run.started_at, run.finished_at) {
                let elapsed = finished - started;
                println!("Elapsed:    {} ms", elapsed.num_milliseconds());
            }
        }
    }
    Ok(())
}
