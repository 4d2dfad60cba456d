use std::{io, path::PathBuf};

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use inquire::{Confirm, CustomType, Text};
use wxreport_core::{
    CachedStationSource, Config, GeoPoint, IpInfoLookup, LocationOverrides, NwsClient,
    ResolvedLocation, SavedLocation, StationSource, SunriseSunsetClient, WeatherReport, moon_phase,
    resolve,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "wxreport",
    version,
    about = "Current conditions, forecasts, alerts and radar from the National Weather Service"
)]
pub struct Cli {
    #[command(flatten)]
    pub location: LocationArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Explicit location. Without `--lat` and `--lon` the location is detected
/// from the public IP address.
#[derive(Debug, Clone, Default, Args)]
pub struct LocationArgs {
    /// Latitude in decimal degrees.
    #[arg(long, env = "LAT", global = true, allow_hyphen_values = true)]
    pub lat: Option<String>,

    /// Longitude in decimal degrees.
    #[arg(long, env = "LON", global = true, allow_hyphen_values = true)]
    pub lon: Option<String>,

    /// City name to display with explicit coordinates.
    #[arg(long, env = "CITY", global = true)]
    pub city: Option<String>,

    /// Region name to display with explicit coordinates.
    #[arg(long, env = "REGION", global = true)]
    pub region: Option<String>,
}

impl From<LocationArgs> for LocationOverrides {
    fn from(args: LocationArgs) -> Self {
        LocationOverrides {
            latitude: args.lat,
            longitude: args.lon,
            city: args.city,
            region: args.region,
        }
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct ShowArgs {
    /// Number of hourly forecast periods to show.
    #[arg(long)]
    pub hours: Option<usize>,

    /// Where to save the radar loop GIF.
    #[arg(long)]
    pub radar_out: Option<PathBuf>,

    /// Skip downloading the radar loop.
    #[arg(long)]
    pub no_radar: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the full report (the default).
    Show(ShowArgs),

    /// Interactively set the contact, default location and display options.
    Configure,

    /// Print the moon phase for a date.
    Moon {
        /// Date as YYYY-MM-DD; defaults to today (UTC).
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Print the radar station nearest to the location.
    Stations {
        /// Re-download the radar station list even if it is cached.
        #[arg(long)]
        refresh: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command.unwrap_or(Command::Show(ShowArgs::default())) {
            Command::Show(args) => show(self.location, args).await,
            Command::Configure => configure(),
            Command::Moon { date } => {
                let date = date.unwrap_or_else(|| Utc::now().date_naive());
                render::moon(&mut io::stdout(), date, moon_phase(date))?;
                Ok(())
            }
            Command::Stations { refresh } => stations(self.location, refresh).await,
        }
    }
}

async fn resolve_location(args: LocationArgs, config: &Config) -> anyhow::Result<ResolvedLocation> {
    let ip_lookup = IpInfoLookup::new(&config.user_agent())?;
    let overrides = LocationOverrides::from(args).or(config.location_overrides());
    tracing::debug!(explicit = overrides.has_coordinates(), "resolving location");

    let location = resolve(&overrides, &ip_lookup).await?;
    tracing::debug!(point = %location.point, "location resolved");
    Ok(location)
}

async fn show(location: LocationArgs, args: ShowArgs) -> anyhow::Result<()> {
    let config = Config::load()?;
    let user_agent = config.user_agent();
    let location = resolve_location(location, &config).await?;

    let mut out = io::stdout();
    render::location(&mut out, &location)?;

    let nws = NwsClient::new(&user_agent)?;
    let sun = SunriseSunsetClient::new(&user_agent)?;
    let stations = CachedStationSource::new(config.station_cache_path()?, nws.clone());
    let report = WeatherReport::new(&nws, &sun, &stations, &location);

    // A failed section is reported and the remaining sections still run.
    match report.current_conditions(Utc::now().date_naive()).await {
        Ok(current) => render::current_conditions(&mut out, &current)?,
        Err(e) => render::section_error(&mut out, "Error fetching current weather", &e)?,
    }

    let hours = args.hours.unwrap_or_else(|| config.hourly_periods());
    match report.forecasts(hours).await {
        Ok(forecasts) => render::forecasts(&mut out, &forecasts)?,
        Err(e) => render::section_error(&mut out, "Error fetching forecasts", &e)?,
    }

    match report.alerts().await {
        Ok(alerts) => render::alerts(&mut out, &alerts)?,
        Err(e) => render::section_error(&mut out, "Error fetching alerts", &e)?,
    }

    if !args.no_radar {
        let output = args.radar_out.unwrap_or_else(|| config.radar_output_path());
        match report.radar(&output).await {
            Ok(image) => render::radar(&mut out, &image)?,
            Err(e) => render::section_error(&mut out, "Error fetching radar", &e)?,
        }
    }

    Ok(())
}

async fn stations(location: LocationArgs, refresh: bool) -> anyhow::Result<()> {
    let config = Config::load()?;
    let location = resolve_location(location, &config).await?;

    let nws = NwsClient::new(&config.user_agent())?;
    let source = CachedStationSource::new(config.station_cache_path()?, nws);

    tracing::debug!(refresh, cache = %source.cache_path().display(), "loading radar stations");
    let catalog = if refresh {
        source.refresh().await?
    } else {
        source.fetch_station_catalog().await?
    };
    let nearest = catalog.nearest(location.point)?;

    let mut out = io::stdout();
    render::location(&mut out, &location)?;
    render::nearest_station(&mut out, &nearest, catalog.len(), source.cache_path())?;

    Ok(())
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let current_contact = config.contact.clone().unwrap_or_default();
    let contact = Text::new("Contact for the NWS User-Agent (email or URL):")
        .with_default(&current_contact)
        .prompt()?;
    config.contact = Some(contact.trim().to_string()).filter(|c| !c.is_empty());

    let save_location = Confirm::new("Save a default location?")
        .with_default(config.location.is_some())
        .with_help_message("Used when LAT/LON and --lat/--lon are not given")
        .prompt()?;

    config.location = if save_location {
        let latitude = CustomType::<f64>::new("Latitude:")
            .with_error_message("Please type a decimal number")
            .prompt()?;
        let longitude = CustomType::<f64>::new("Longitude:")
            .with_error_message("Please type a decimal number")
            .prompt()?;
        GeoPoint::new(latitude, longitude).context("Invalid default location")?;

        let city = Text::new("City (optional):").prompt()?;
        let region = Text::new("Region (optional):").prompt()?;

        Some(SavedLocation {
            latitude,
            longitude,
            city: Some(city).filter(|c| !c.trim().is_empty()),
            region: Some(region).filter(|r| !r.trim().is_empty()),
        })
    } else {
        None
    };

    let hours = CustomType::<usize>::new("Hourly forecast periods to show:")
        .with_default(config.hourly_periods())
        .with_error_message("Please type a whole number")
        .prompt()?;
    config.hourly_periods = Some(hours);

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(())
}
