//! Time scales
//!
//! Linear mapping from a date-time domain onto a pixel range, plus
//! calendar-aware tick generation for the axes.
//!
//! The time axis range is not flipped: smaller (faster)
//! finish times map nearer the top of the canvas.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};

const SECOND: i64 = 1_000;
const MINUTE: i64 = 60 * SECOND;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const WEEK: i64 = 7 * DAY;
const MONTH: i64 = 30 * DAY;
const YEAR: i64 = 365 * DAY;

/// Default number of ticks requested by the axes
pub const DEFAULT_TICK_COUNT: usize = 10;

/// Continuous date-time → pixel mapping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    domain: (NaiveDateTime, NaiveDateTime),
    range: (f64, f64),
}

impl TimeScale {
    pub fn new(domain: (NaiveDateTime, NaiveDateTime), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Build a scale whose domain is the [min, max] extent of `values`
    ///
    /// Returns `None` when `values` is empty.
    pub fn from_extent<I>(values: I, range: (f64, f64)) -> Option<Self>
    where
        I: IntoIterator<Item = NaiveDateTime>,
    {
        let mut iter = values.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
        Some(Self::new((min, max), range))
    }

    pub fn domain(&self) -> (NaiveDateTime, NaiveDateTime) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Map a domain value to a pixel position
    ///
    /// A degenerate domain maps everything to the middle of the range.
    pub fn apply(&self, value: NaiveDateTime) -> f64 {
        let d0 = millis(self.domain.0);
        let d1 = millis(self.domain.1);
        let t = if d1 == d0 {
            0.5
        } else {
            (millis(value) - d0) as f64 / (d1 - d0) as f64
        };
        self.range.0 + t * (self.range.1 - self.range.0)
    }

    /// Map a pixel position back to the domain
    pub fn invert(&self, px: f64) -> Option<NaiveDateTime> {
        let (r0, r1) = self.range;
        let t = if r1 == r0 { 0.5 } else { (px - r0) / (r1 - r0) };
        let d0 = millis(self.domain.0) as f64;
        let d1 = millis(self.domain.1) as f64;
        from_millis((d0 + t * (d1 - d0)).round() as i64)
    }

    /// Roughly `count` human-friendly tick values inside the domain
    pub fn ticks(&self, count: usize) -> Vec<NaiveDateTime> {
        let (start, stop) = if self.domain.0 <= self.domain.1 {
            self.domain
        } else {
            (self.domain.1, self.domain.0)
        };

        match tick_interval(millis(start), millis(stop), count) {
            Some(interval) => interval.range(start, stop),
            None => Vec::new(),
        }
    }
}

/// Calendar interval between two consecutive ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickInterval {
    Millis(i64),
    Second(u32),
    Minute(u32),
    Hour(u32),
    Day(u32),
    Week,
    Month(u32),
    Year(i32),
}

const INTERVALS: [(TickInterval, i64); 18] = [
    (TickInterval::Second(1), SECOND),
    (TickInterval::Second(5), 5 * SECOND),
    (TickInterval::Second(15), 15 * SECOND),
    (TickInterval::Second(30), 30 * SECOND),
    (TickInterval::Minute(1), MINUTE),
    (TickInterval::Minute(5), 5 * MINUTE),
    (TickInterval::Minute(15), 15 * MINUTE),
    (TickInterval::Minute(30), 30 * MINUTE),
    (TickInterval::Hour(1), HOUR),
    (TickInterval::Hour(3), 3 * HOUR),
    (TickInterval::Hour(6), 6 * HOUR),
    (TickInterval::Hour(12), 12 * HOUR),
    (TickInterval::Day(1), DAY),
    (TickInterval::Day(2), 2 * DAY),
    (TickInterval::Week, WEEK),
    (TickInterval::Month(1), MONTH),
    (TickInterval::Month(3), 3 * MONTH),
    (TickInterval::Year(1), YEAR),
];

/// Pick the interval whose duration is closest to span / count
pub fn tick_interval(start_ms: i64, stop_ms: i64, count: usize) -> Option<TickInterval> {
    if count == 0 {
        return None;
    }

    let target = (stop_ms - start_ms).abs() as f64 / count as f64;
    let i = INTERVALS.partition_point(|(_, duration)| (*duration as f64) <= target);

    let interval = if i == INTERVALS.len() {
        let step = tick_step(start_ms as f64 / YEAR as f64, stop_ms as f64 / YEAR as f64, count);
        TickInterval::Year((step.floor() as i32).max(1))
    } else if i == 0 {
        let step = tick_step(start_ms as f64, stop_ms as f64, count);
        TickInterval::Millis((step.floor() as i64).max(1))
    } else {
        let (below, below_ms) = INTERVALS[i - 1];
        let (above, above_ms) = INTERVALS[i];
        if target / (below_ms as f64) < (above_ms as f64) / target {
            below
        } else {
            above
        }
    };

    Some(interval)
}

/// Step of roughly (stop - start) / count, rounded to 1, 2 or 5 times a power of ten
pub fn tick_step(start: f64, stop: f64, count: usize) -> f64 {
    let raw = (stop - start).abs() / count.max(1) as f64;
    if raw <= 0.0 || !raw.is_finite() {
        return 0.0;
    }

    let power = raw.log10().floor();
    let base = 10f64.powf(power);
    let error = raw / base;

    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };

    factor * base
}

impl TickInterval {
    /// Every tick of this interval in [start, stop]
    pub fn range(&self, start: NaiveDateTime, stop: NaiveDateTime) -> Vec<NaiveDateTime> {
        if let TickInterval::Millis(step) = *self {
            let step = step.max(1);
            let first = div_ceil(millis(start), step) * step;
            let last = millis(stop);
            return (0..)
                .map(|i| first + i * step)
                .take_while(|ms| *ms <= last)
                .filter_map(from_millis)
                .collect();
        }

        let mut ticks = Vec::new();
        let mut current = match self.ceil(start) {
            Some(t) => t,
            None => return ticks,
        };

        while current <= stop {
            if self.keeps(&current) {
                ticks.push(current);
            }
            current = match self.advance(current) {
                Some(next) => next,
                None => break,
            };
        }

        ticks
    }

    /// Round down to the start of the interval's unit
    fn floor(&self, dt: NaiveDateTime) -> Option<NaiveDateTime> {
        let date = dt.date();
        match self {
            TickInterval::Millis(_) => Some(dt),
            TickInterval::Second(_) => dt.with_nanosecond(0),
            TickInterval::Minute(_) => dt.with_nanosecond(0)?.with_second(0),
            TickInterval::Hour(_) => date.and_hms_opt(dt.hour(), 0, 0),
            TickInterval::Day(_) => date.and_hms_opt(0, 0, 0),
            TickInterval::Week => {
                let back = date.weekday().num_days_from_sunday() as i64;
                (date - Duration::days(back)).and_hms_opt(0, 0, 0)
            }
            TickInterval::Month(_) => {
                NaiveDate::from_ymd_opt(date.year(), date.month(), 1)?.and_hms_opt(0, 0, 0)
            }
            TickInterval::Year(_) => NaiveDate::from_ymd_opt(date.year(), 1, 1)?.and_hms_opt(0, 0, 0),
        }
    }

    fn ceil(&self, dt: NaiveDateTime) -> Option<NaiveDateTime> {
        let floored = self.floor(dt)?;
        if floored < dt {
            self.advance(floored)
        } else {
            Some(floored)
        }
    }

    /// Move forward by one unit of the interval
    fn advance(&self, dt: NaiveDateTime) -> Option<NaiveDateTime> {
        match self {
            TickInterval::Millis(step) => dt.checked_add_signed(Duration::milliseconds(*step)),
            TickInterval::Second(_) => dt.checked_add_signed(Duration::seconds(1)),
            TickInterval::Minute(_) => dt.checked_add_signed(Duration::minutes(1)),
            TickInterval::Hour(_) => dt.checked_add_signed(Duration::hours(1)),
            TickInterval::Day(_) => dt.checked_add_signed(Duration::days(1)),
            TickInterval::Week => dt.checked_add_signed(Duration::weeks(1)),
            TickInterval::Month(_) => {
                let (year, month) = if dt.month() == 12 {
                    (dt.year() + 1, 1)
                } else {
                    (dt.year(), dt.month() + 1)
                };
                NaiveDate::from_ymd_opt(year, month, 1)?.and_hms_opt(0, 0, 0)
            }
            TickInterval::Year(_) => NaiveDate::from_ymd_opt(dt.year() + 1, 1, 1)?.and_hms_opt(0, 0, 0),
        }
    }

    /// Whether a unit boundary falls on a multiple of the step
    fn keeps(&self, dt: &NaiveDateTime) -> bool {
        match *self {
            TickInterval::Millis(_) | TickInterval::Week => true,
            TickInterval::Second(k) => dt.second() % k == 0,
            TickInterval::Minute(k) => dt.minute() % k == 0,
            TickInterval::Hour(k) => dt.hour() % k == 0,
            TickInterval::Day(k) => (dt.day() - 1) % k == 0,
            TickInterval::Month(k) => dt.month0() % k == 0,
            TickInterval::Year(k) => dt.year().rem_euclid(k) == 0,
        }
    }
}

/// Default multi-scale tick label: the coarsest unit the value sits on
pub fn multi_format(dt: &NaiveDateTime) -> String {
    let pattern = if dt.nanosecond() != 0 {
        ".%3f"
    } else if dt.second() != 0 {
        ":%S"
    } else if dt.minute() != 0 {
        "%I:%M"
    } else if dt.hour() != 0 {
        "%I %p"
    } else if dt.day() != 1 {
        if dt.weekday().num_days_from_sunday() != 0 {
            "%a %d"
        } else {
            "%b %d"
        }
    } else if dt.month() != 1 {
        "%B"
    } else {
        "%Y"
    };

    dt.format(pattern).to_string()
}

fn millis(dt: NaiveDateTime) -> i64 {
    dt.and_utc().timestamp_millis()
}

fn from_millis(ms: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(ms).map(|dt| dt.naive_utc())
}

fn div_ceil(a: i64, b: i64) -> i64 {
    let q = a.div_euclid(b);
    if a.rem_euclid(b) == 0 {
        q
    } else {
        q + 1
    }
}
