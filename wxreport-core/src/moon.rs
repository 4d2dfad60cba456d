use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mean length of the synodic month, in days.
pub const SYNODIC_MONTH_DAYS: f64 = 29.53;

/// Day-count offset that places a known new moon at cycle position zero.
const EPOCH_OFFSET: f64 = 694_039.09;

/// One of the eight conventional lunar phases, in cycle order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoonPhase {
    NewMoon,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    FullMoon,
    WaningGibbous,
    LastQuarter,
    WaningCrescent,
}

impl MoonPhase {
    pub const fn all() -> &'static [MoonPhase; 8] {
        &[
            MoonPhase::NewMoon,
            MoonPhase::WaxingCrescent,
            MoonPhase::FirstQuarter,
            MoonPhase::WaxingGibbous,
            MoonPhase::FullMoon,
            MoonPhase::WaningGibbous,
            MoonPhase::LastQuarter,
            MoonPhase::WaningCrescent,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            MoonPhase::NewMoon => "New Moon",
            MoonPhase::WaxingCrescent => "Waxing Crescent",
            MoonPhase::FirstQuarter => "First Quarter",
            MoonPhase::WaxingGibbous => "Waxing Gibbous",
            MoonPhase::FullMoon => "Full Moon",
            MoonPhase::WaningGibbous => "Waning Gibbous",
            MoonPhase::LastQuarter => "Last Quarter",
            MoonPhase::WaningCrescent => "Waning Crescent",
        }
    }

    /// Phase for a UTC calendar date. See [`moon_phase`].
    pub fn on(date: NaiveDate) -> Self {
        moon_phase(date)
    }
}

impl fmt::Display for MoonPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Approximate moon phase for a calendar date (UTC).
///
/// This is a closed-form day-count approximation, not an ephemeris: the date
/// is turned into a day number, divided by [`SYNODIC_MONTH_DAYS`], and the
/// fractional part of the cycle is bucketed into eighths. January and
/// February count as months 13 and 14 of the previous year.
pub fn moon_phase(date: NaiveDate) -> MoonPhase {
    let mut year = f64::from(date.year());
    let mut month = f64::from(date.month());
    let day = f64::from(date.day());

    if month < 3.0 {
        year -= 1.0;
        month += 12.0;
    }
    month += 1.0;

    let c = 365.25 * year;
    let e = 30.6 * month;
    let mut jd = (c + e + day - EPOCH_OFFSET) / SYNODIC_MONTH_DAYS;
    jd -= jd.floor();

    // Ties round to even; a cycle position that rounds up to 8 is a new moon again.
    let index = (jd * 8.0).round_ties_even() as usize % 8;

    MoonPhase::all()[index]
}
