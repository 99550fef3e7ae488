use clap::{Args, Subcommand};
use matchclock_core::{Config, ScheduleForm};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "schedule.num_games", "clock.clamp_adjustments")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
    /// Print the config file location
    Path,
    /// Fill in the schedule the way the settings form does
    Form(FormArgs),
}

#[derive(Args)]
pub struct FormArgs {
    /// Number of games
    #[arg(long)]
    games: Option<u32>,
    /// Quarters per game
    #[arg(long)]
    quarters: Option<u32>,
    /// Day start (HH:MM)
    #[arg(long)]
    day_start: Option<String>,
    /// Quarter length in minutes
    #[arg(long)]
    quarter_length: Option<u32>,
    /// Break lengths in minutes, comma separated
    #[arg(long)]
    breaks: Option<String>,
    /// Downtime between games in minutes
    #[arg(long)]
    downtime: Option<u32>,
    /// Warning bell lead time in minutes
    #[arg(long)]
    warn_bell: Option<f64>,
}

impl FormArgs {
    fn merge_into(self, mut form: ScheduleForm) -> ScheduleForm {
        if self.games.is_some() {
            form.num_games = self.games;
        }
        if self.quarters.is_some() {
            form.quarters_per_game = self.quarters;
        }
        if let Some(day_start) = self.day_start {
            form.day_start = day_start;
        }
        if self.quarter_length.is_some() {
            form.quarter_length = self.quarter_length;
        }
        if let Some(breaks) = self.breaks {
            form.break_times = breaks;
        }
        if self.downtime.is_some() {
            form.downtime = self.downtime;
        }
        if self.warn_bell.is_some() {
            form.warning_bell = self.warn_bell;
        }
        form
    }
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown key: {key}").into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            println!("ok");
        }
        ConfigAction::List => {
            let config = Config::load()?;
            let json = serde_json::to_string_pretty(&config)?;
            println!("{json}");
        }
        ConfigAction::Reset => {
            let config = Config::default();
            config.save()?;
            println!("config reset to defaults");
        }
        ConfigAction::Path => {
            println!("{}", Config::path()?.display());
        }
        ConfigAction::Form(args) => {
            let mut config = Config::load()?;
            let form = args.merge_into(ScheduleForm::from_schedule(&config.schedule));
            let schedule = form.into_schedule(&config.schedule);
            schedule.validate()?;
            config.schedule = schedule;
            config.save()?;
            println!("Settings saved. Reset the clock to apply changes.");
        }
    }
    Ok(())
}
