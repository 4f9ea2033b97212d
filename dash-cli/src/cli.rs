use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Confirm, CustomType, Select, Text};
use weather_dash_core::{
    Config, Dashboard, Units,
    model::{PrecipitationUnit, TemperatureUnit, WindSpeedUnit},
    request::MAX_FORECAST_DAYS,
};

use crate::terminal::TerminalSurface;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-dash", version, about = "Terminal weather dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch the forecast and draw the dashboard.
    Show(ShowArgs),

    /// Interactively edit the saved configuration.
    Configure,

    /// Print the config file location and the effective configuration.
    Config,
}

/// One-off overrides on top of the saved configuration.
#[derive(Debug, Default, clap::Args)]
pub struct ShowArgs {
    /// Display name for the location.
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long, allow_hyphen_values = true, requires = "lon")]
    pub lat: Option<f64>,

    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    pub lon: Option<f64>,

    /// Forecast horizon in days (1-16).
    #[arg(long)]
    pub days: Option<u8>,

    /// Use celsius, km/h and millimetres.
    #[arg(long)]
    pub metric: bool,

    /// Skip the alerts feed.
    #[arg(long)]
    pub no_alerts: bool,

    /// Always hit the network.
    #[arg(long)]
    pub no_cache: bool,
}

impl ShowArgs {
    fn apply(&self, cfg: &mut Config) {
        if let Some(name) = &self.name {
            cfg.location.name = name.clone();
        }
        if let (Some(lat), Some(lon)) = (self.lat, self.lon) {
            cfg.location.latitude = lat;
            cfg.location.longitude = lon;
            if self.name.is_none() {
                cfg.location.name = format!("{lat:.4}, {lon:.4}");
            }
        }
        if let Some(days) = self.days {
            cfg.forecast.forecast_days = days;
        }
        if self.metric {
            cfg.forecast.set_units(Units::metric());
        }
        if self.no_alerts {
            cfg.alerts.enabled = false;
        }
        if self.no_cache {
            cfg.cache.enabled = false;
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Show(args) => {
                let mut cfg = Config::load()?;
                args.apply(&mut cfg);

                let dashboard = Dashboard::from_config(&cfg)?;
                let mut surface = TerminalSurface::new();
                dashboard.render(&mut surface).await;
                print!("{}", surface.finish());
            }
            Command::Configure => {
                let cfg = Config::load()?;
                let cfg = configure_interactively(cfg)?;
                cfg.save()?;
                println!("Saved configuration to {}", Config::config_file_path()?.display());
            }
            Command::Config => {
                let cfg = Config::load()?;
                println!("# {}", Config::config_file_path()?.display());
                print!("{}", cfg.to_toml()?);
            }
        }

        Ok(())
    }
}

fn configure_interactively(mut cfg: Config) -> anyhow::Result<Config> {
    cfg.location.name = Text::new("Location name:")
        .with_default(&cfg.location.name)
        .prompt()
        .context("Failed to read location name")?;

    cfg.location.latitude = CustomType::<f64>::new("Latitude:")
        .with_default(cfg.location.latitude)
        .with_validator(|v: &f64| {
            Ok(if (-90.0..=90.0).contains(v) {
                inquire::validator::Validation::Valid
            } else {
                inquire::validator::Validation::Invalid("must be between -90 and 90".into())
            })
        })
        .prompt()
        .context("Failed to read latitude")?;

    cfg.location.longitude = CustomType::<f64>::new("Longitude:")
        .with_default(cfg.location.longitude)
        .with_validator(|v: &f64| {
            Ok(if (-180.0..=180.0).contains(v) {
                inquire::validator::Validation::Valid
            } else {
                inquire::validator::Validation::Invalid("must be between -180 and 180".into())
            })
        })
        .prompt()
        .context("Failed to read longitude")?;

    let units = Select::new("Units:", vec!["imperial (°F, mph, inch)", "metric (°C, km/h, mm)"])
        .prompt()
        .context("Failed to read units")?;
    if units.starts_with("metric") {
        cfg.forecast.set_units(Units::metric());
    } else {
        cfg.forecast.set_units(Units {
            temperature: TemperatureUnit::Fahrenheit,
            wind_speed: WindSpeedUnit::Mph,
            precipitation: PrecipitationUnit::Inch,
        });
    }

    cfg.forecast.forecast_days = CustomType::<u8>::new("Forecast days:")
        .with_default(cfg.forecast.forecast_days)
        .with_validator(|v: &u8| {
            Ok(if (1..=MAX_FORECAST_DAYS).contains(v) {
                inquire::validator::Validation::Valid
            } else {
                inquire::validator::Validation::Invalid(
                    format!("must be between 1 and {MAX_FORECAST_DAYS}").into(),
                )
            })
        })
        .prompt()
        .context("Failed to read forecast days")?;

    cfg.alerts.enabled = Confirm::new("Show NWS alerts (US only)?")
        .with_default(cfg.alerts.enabled)
        .prompt()
        .context("Failed to read alerts choice")?;

    if cfg.alerts.enabled {
        let contact = Text::new("Contact for the NWS User-Agent (email or URL):")
            .with_default(cfg.alerts.contact.as_deref().unwrap_or(""))
            .prompt()
            .context("Failed to read contact")?;
        cfg.alerts.contact = Some(contact.trim().to_string()).filter(|c| !c.is_empty());
    }

    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_overrides_apply_on_top_of_config() {
        let cli = Cli::parse_from([
            "weather-dash", "show", "--lat", "-33.87", "--lon", "151.21", "--days", "3", "--metric",
            "--no-alerts",
        ]);
        let Command::Show(args) = cli.command else {
            panic!("expected show");
        };

        let mut cfg = Config::default();
        args.apply(&mut cfg);

        assert_eq!(cfg.location.latitude, -33.87);
        assert_eq!(cfg.location.longitude, 151.21);
        assert_eq!(cfg.location.name, "-33.8700, 151.2100");
        assert_eq!(cfg.forecast.forecast_days, 3);
        assert_eq!(cfg.forecast.temperature_unit, TemperatureUnit::Celsius);
        assert!(!cfg.alerts.enabled);
        assert!(cfg.cache.enabled);
    }

    #[test]
    fn lat_requires_lon() {
        let res = Cli::try_parse_from(["weather-dash", "show", "--lat", "10"]);
        assert!(res.is_err());
    }

    #[test]
    fn no_overrides_keep_config() {
        let mut cfg = Config::default();
        ShowArgs::default().apply(&mut cfg);
        assert_eq!(cfg, Config::default());
    }
}
