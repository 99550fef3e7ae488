use clap::Args;
use matchclock_core::{format_time, Config, Timeline};

#[derive(Args)]
pub struct TimelineArgs {
    /// Print segments as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: TimelineArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    config.schedule.validate()?;
    let timeline = Timeline::build(&config.schedule);

    if args.json {
        println!("{}", serde_json::to_string_pretty(timeline.segments())?);
        return Ok(());
    }

    // Scheduled start times are informational; the clock never waits for them.
    let mut at = config.schedule.day_start_time();
    for segment in timeline.iter() {
        let start = at
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "--:--:--".to_string());
        println!(
            "{start}  {:<18} {:<9} {}",
            segment.full_name,
            segment.kind.to_string(),
            format_time(segment.duration_secs)
        );
        at = at.map(|t| t + chrono::Duration::seconds(segment.duration_secs));
    }
    println!(
        "{} segments, {} total",
        timeline.len(),
        format_time(timeline.total_duration_secs())
    );
    Ok(())
}
