//! Human-friendly, colorized output.

use std::{error::Error, io::Write, path::Path};

use chrono::{Local, NaiveDate};
use crossterm::style::{Color, Stylize};
use wxreport_core::{
    Alert, CurrentConditions, ForecastPeriod, Forecasts, MoonPhase, NearestStation, RadarImage,
    ResolvedLocation, Sky, TemperatureBand,
};

type Result = std::io::Result<()>;

const NA: &str = "N/A";

fn sky_color(sky: Sky) -> Color {
    match sky {
        Sky::Rain => Color::Cyan,
        Sky::Snow => Color::White,
        Sky::Sunny => Color::Yellow,
        Sky::Cloudy => Color::DarkGrey,
        Sky::Other => Color::Green,
    }
}

fn band_color(band: TemperatureBand) -> Color {
    match band {
        TemperatureBand::Hot => Color::Red,
        TemperatureBand::Cold => Color::Blue,
        TemperatureBand::Mild => Color::Green,
    }
}

fn heading(out: &mut impl Write, title: &str) -> Result {
    writeln!(out, "\n{}", format!("=== {title} ===").cyan().bold())
}

pub fn location(out: &mut impl Write, location: &ResolvedLocation) -> Result {
    let line = if location.city.is_some() || location.region.is_some() {
        format!("Location detected: {} ({})", location.label(), location.point)
    } else {
        format!("Location detected: {}", location.point)
    };
    writeln!(out, "{}", line.white().bold())
}

pub fn current_conditions(out: &mut impl Write, current: &CurrentConditions) -> Result {
    let obs = &current.observation;

    heading(out, "Current Conditions")?;
    writeln!(out, "{}", format!("Condition: {}", obs.description).yellow())?;
    writeln!(out, "{}", format!("Station: {}", current.station_id).dark_grey())?;

    if let (Some(c), Some(f)) = (obs.temperature_c, obs.temperature_f()) {
        let color = band_color(TemperatureBand::from_fahrenheit(f));
        writeln!(out, "{}", format!("Temperature: {c:.1}°C / {f:.1}°F").with(color))?;
    }
    if let Some(humidity) = obs.humidity_pct {
        writeln!(out, "{}", format!("Humidity: {humidity:.1}%").blue())?;
    }
    if let Some(wind) = obs.wind_speed_mph {
        writeln!(out, "{}", format!("Wind Speed: {wind:.1} mph").magenta())?;
    }

    let (sunrise, sunset) = match current.sun {
        Some(sun) => (
            sun.sunrise.with_timezone(&Local).format("%I:%M %p").to_string(),
            sun.sunset.with_timezone(&Local).format("%I:%M %p").to_string(),
        ),
        None => (NA.to_string(), NA.to_string()),
    };
    writeln!(out, "{}", format!("Sunrise: {sunrise} | Sunset: {sunset}").yellow())?;
    writeln!(out, "{}", format!("Moon Phase: {}", current.moon_phase).white())
}

fn period_line(out: &mut impl Write, label: &str, period: &ForecastPeriod) -> Result {
    let color = sky_color(Sky::classify(&period.short_forecast));
    let temp = format!("{:<6}", period.temperature_label());
    writeln!(out, "{label} | {} | {}", temp.with(color), period.short_forecast)
}

pub fn forecasts(out: &mut impl Write, forecasts: &Forecasts) -> Result {
    heading(out, &format!("Next {} Hours", forecasts.hourly.len()))?;
    for hour in &forecasts.hourly {
        let time = hour.start_time.with_timezone(&Local).format("%I %p").to_string();
        period_line(out, &format!("{time:>6}"), hour)?;
    }

    heading(out, "7-Day Forecast")?;
    for day in &forecasts.daily {
        period_line(out, &format!("{:<12}", day.name), day)?;
    }

    Ok(())
}

pub fn alerts(out: &mut impl Write, alerts: &[Alert]) -> Result {
    heading(out, "Active Alerts")?;
    if alerts.is_empty() {
        return writeln!(out, "{}", "No active alerts.".green());
    }

    for alert in alerts {
        writeln!(out, "{}", alert.event.as_str().red().bold())?;
        if let Some(headline) = &alert.headline {
            writeln!(out, "{}", format!("  {headline}").white())?;
        }
        if let Some(description) = &alert.description {
            writeln!(out, "{}", format!("  {description}").yellow())?;
        }
        writeln!(out)?;
    }

    Ok(())
}

pub fn radar(out: &mut impl Write, image: &RadarImage) -> Result {
    let line = format!(
        "Radar loop saved as {} (station {}, {:.0} km away)",
        image.path.display(),
        image.station_id,
        image.distance_km
    );
    writeln!(out, "{}", line.green())
}

pub fn nearest_station(
    out: &mut impl Write,
    nearest: &NearestStation<'_>,
    catalog_size: usize,
    cache: &Path,
) -> Result {
    let line = format!(
        "Nearest radar station: {} ({:.1} km)",
        nearest.station.id, nearest.distance_km
    );
    writeln!(out, "{}", line.green())?;
    writeln!(
        out,
        "{}",
        format!("{catalog_size} stations cached at {}", cache.display()).dark_grey()
    )
}

pub fn moon(out: &mut impl Write, date: NaiveDate, phase: MoonPhase) -> Result {
    writeln!(out, "{}", format!("{date}: {phase}").white().bold())
}

/// `context: error: cause: ...`, following the `source()` chain.
pub fn section_error(out: &mut impl Write, context: &str, err: &dyn Error) -> Result {
    let mut line = format!("{context}: {err}");
    for cause in std::iter::successors(err.source(), |&e| e.source()) {
        line.push_str(&format!(": {cause}"));
    }
    writeln!(out, "{}", line.red())
}

/// Last-resort report of an error that ends the run.
pub fn fatal(err: &anyhow::Error) {
    // Nothing sensible to do if stderr is gone.
    let _ = write_fatal(&mut std::io::stderr(), err);
}

fn write_fatal(out: &mut impl Write, err: &anyhow::Error) -> Result {
    writeln!(out, "{}", format!("{err:#}").red())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use wxreport_core::{
        CatalogError, FetchError, GeoPoint, LocationError, Observation, ReportError,
    };

    fn render(f: impl FnOnce(&mut Vec<u8>) -> Result) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn period(name: &str, temp: i32, forecast: &str) -> ForecastPeriod {
        ForecastPeriod {
            name: name.to_string(),
            start_time: DateTime::parse_from_rfc3339("2024-06-01T18:00:00-04:00").unwrap(),
            temperature: temp,
            temperature_unit: "F".to_string(),
            short_forecast: forecast.to_string(),
        }
    }

    #[test]
    fn location_line_with_and_without_names() {
        let mut loc = ResolvedLocation::new(GeoPoint::new(40.0, -75.0).unwrap());
        let bare = render(|out| location(out, &loc));
        assert!(bare.contains("Location detected: 40, -75"));

        loc.city = Some("Philadelphia".into());
        loc.region = Some("Pennsylvania".into());
        let named = render(|out| location(out, &loc));
        assert!(named.contains("Location detected: Philadelphia, Pennsylvania (40, -75)"));

        loc.region = None;
        let city_only = render(|out| location(out, &loc));
        assert!(city_only.contains("Location detected: Philadelphia (40, -75)"));
    }

    #[test]
    fn current_conditions_show_na_sun_times_and_skip_missing_values() {
        let current = CurrentConditions {
            station_id: "KPHL".into(),
            observation: Observation {
                description: "Mostly Clear".into(),
                temperature_c: Some(10.0),
                humidity_pct: None,
                wind_speed_mph: Some(4.47),
            },
            sun: None,
            moon_phase: MoonPhase::FullMoon,
        };

        let text = render(|out| current_conditions(out, &current));
        assert!(text.contains("Condition: Mostly Clear"));
        assert!(text.contains("Temperature: 10.0°C / 50.0°F"));
        assert!(!text.contains("Humidity"));
        assert!(text.contains("Wind Speed: 4.5 mph"));
        assert!(text.contains("Sunrise: N/A | Sunset: N/A"));
        assert!(text.contains("Moon Phase: Full Moon"));
    }

    #[test]
    fn daily_names_are_padded() {
        let fc = Forecasts {
            hourly: vec![],
            daily: vec![period("Tonight", 61, "Chance Rain Showers")],
        };

        let text = render(|out| forecasts(out, &fc));
        assert!(text.contains("Tonight      | "));
        assert!(text.contains("61°F"));
        assert!(text.contains("| Chance Rain Showers"));
    }

    #[test]
    fn no_alerts_message() {
        let text = render(|out| alerts(out, &[]));
        assert!(text.contains("No active alerts."));
    }

    #[test]
    fn alerts_list_event_headline_and_description() {
        let list = vec![Alert {
            event: "Flood Watch".into(),
            headline: Some("Flood Watch until Monday".into()),
            description: None,
            severity: Some("Severe".into()),
        }];

        let text = render(|out| alerts(out, &list));
        assert!(text.contains("Flood Watch"));
        assert!(text.contains("  Flood Watch until Monday"));
    }

    #[test]
    fn section_error_includes_context() {
        let err = ReportError::NoObservationStations;
        let text = render(|out| section_error(out, "Error fetching current weather", &err));
        assert!(text.contains("Error fetching current weather: No observation stations found"));
    }

    #[test]
    fn section_error_follows_the_cause_chain() {
        let err = ReportError::from(CatalogError::Fetch(FetchError::MissingField {
            url: "https://api.weather.gov/radar/stations".into(),
            field: "features",
        }));

        let text = render(|out| section_error(out, "Error fetching radar", &err));
        assert!(text.contains(
            "Error fetching radar: failed to fetch radar stations: \
             response from https://api.weather.gov/radar/stations is missing `features`"
        ));
    }

    #[test]
    fn fatal_location_error_names_the_cause_once() {
        let err = anyhow::Error::from(LocationError::Detection(FetchError::MissingField {
            url: "https://ipinfo.io/json".into(),
            field: "loc",
        }));

        let text = render(|out| write_fatal(out, &err));
        assert_eq!(text.matches("is missing `loc`").count(), 1);
        assert!(text.contains("set LAT and LON environment variables"));
    }
}
