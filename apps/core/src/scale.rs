//! Scales and color schemes used by the renderers.

use chrono::{Duration, NaiveDate};

use crate::backend::Rgb;

/// Ordinal palette for categorical slices.
pub const CATEGORY10: [Rgb; 10] = [
    Rgb(0x1f, 0x77, 0xb4),
    Rgb(0xff, 0x7f, 0x0e),
    Rgb(0x2c, 0xa0, 0x2c),
    Rgb(0xd6, 0x27, 0x28),
    Rgb(0x94, 0x67, 0xbd),
    Rgb(0x8c, 0x56, 0x4b),
    Rgb(0xe3, 0x77, 0xc2),
    Rgb(0x7f, 0x7f, 0x7f),
    Rgb(0xbc, 0xbd, 0x22),
    Rgb(0x17, 0xbe, 0xcf),
];

/// Sequential palette for the choropleth, light to dark.
pub const BLUES9: [Rgb; 9] = [
    Rgb(0xf7, 0xfb, 0xff),
    Rgb(0xde, 0xeb, 0xf7),
    Rgb(0xc6, 0xdb, 0xef),
    Rgb(0x9e, 0xca, 0xe1),
    Rgb(0x6b, 0xae, 0xd6),
    Rgb(0x42, 0x92, 0xc6),
    Rgb(0x21, 0x71, 0xb5),
    Rgb(0x08, 0x51, 0x9c),
    Rgb(0x08, 0x30, 0x6b),
];

/// Continuous linear mapping from a numeric domain to a range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub const fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub const fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn apply(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        if span == 0.0 || !span.is_finite() {
            return (r0 + r1) / 2.0;
        }
        ((value - d0) / span).mul_add(r1 - r0, r0)
    }

    pub fn ticks(&self, count: usize) -> Vec<f64> {
        ticks(self.domain.0, self.domain.1, count)
    }
}

/// Largest finite value, or `None` when nothing is finite.
pub fn max(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    values
        .into_iter()
        .filter(|value| value.is_finite())
        .fold(None, |acc, value| Some(acc.map_or(value, |m: f64| m.max(value))))
}

/// Smallest and largest finite value.
pub fn extent(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|value| value.is_finite())
        .fold(None, |acc, value| match acc {
            None => Some((value, value)),
            Some((lo, hi)) => Some((lo.min(value), hi.max(value))),
        })
}

/// Round tick values covering `[start, stop]`, stepping by 1, 2 or 5 × 10ⁿ.
pub fn ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if !start.is_finite() || !stop.is_finite() || count == 0 {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }

    let (lo, hi) = if start < stop { (start, stop) } else { (stop, start) };
    let step = tick_step(lo, hi, count);
    if step <= 0.0 || !step.is_finite() {
        return Vec::new();
    }

    let first = (lo / step).ceil() as i64;
    let last = (hi / step).floor() as i64;
    let mut values: Vec<f64> = (first..=last).map(|i| i as f64 * step).collect();
    if start > stop {
        values.reverse();
    }
    values
}

fn tick_step(start: f64, stop: f64, count: usize) -> f64 {
    let raw = (stop - start) / count as f64;
    let power = 10_f64.powf(raw.log10().floor());
    let error = raw / power;
    let factor = if error >= 50_f64.sqrt() {
        10.0
    } else if error >= 10_f64.sqrt() {
        5.0
    } else if error >= 2_f64.sqrt() {
        2.0
    } else {
        1.0
    };
    power * factor
}

/// Evenly spaced bands for discrete domains.
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale {
    domain: Vec<String>,
    start: f64,
    step: f64,
    bandwidth: f64,
}

impl BandScale {
    /// Duplicate domain entries share the band of their first occurrence.
    pub fn new(domain: impl IntoIterator<Item = String>, range: (f64, f64), padding: f64) -> Self {
        let mut unique: Vec<String> = Vec::new();
        for key in domain {
            if !unique.contains(&key) {
                unique.push(key);
            }
        }

        let n = unique.len() as f64;
        let (r0, r1) = range;
        let step = (r1 - r0) / (n - padding + 2.0 * padding).max(1.0);
        let start = (step * (n - padding)).mul_add(-0.5, r0 + (r1 - r0) / 2.0);
        let bandwidth = step * (1.0 - padding);

        Self {
            domain: unique,
            start,
            step,
            bandwidth,
        }
    }

    pub fn position(&self, key: &str) -> Option<f64> {
        let index = self.domain.iter().position(|entry| entry == key)?;
        Some((index as f64).mul_add(self.step, self.start))
    }

    pub const fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn domain(&self) -> &[String] {
        &self.domain
    }
}

/// Linear scale over calendar days.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    origin: NaiveDate,
    linear: LinearScale,
}

impl TimeScale {
    pub fn new(domain: (NaiveDate, NaiveDate), range: (f64, f64)) -> Self {
        let span = (domain.1 - domain.0).num_days() as f64;
        Self {
            origin: domain.0,
            linear: LinearScale::new((0.0, span), range),
        }
    }

    pub fn apply(&self, date: NaiveDate) -> f64 {
        self.linear.apply((date - self.origin).num_days() as f64)
    }

    pub fn ticks(&self, count: usize) -> Vec<NaiveDate> {
        self.linear
            .ticks(count)
            .into_iter()
            .map(|days| self.origin + Duration::days(days.round() as i64))
            .collect()
    }
}

/// Maps a continuous domain onto a fixed set of colors by equal-width bands.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantizeScale {
    domain: (f64, f64),
    colors: Vec<Rgb>,
    thresholds: Vec<f64>,
}

impl QuantizeScale {
    pub fn new(domain: (f64, f64), colors: &[Rgb]) -> Self {
        let (lo, hi) = domain;
        let n = colors.len();
        let thresholds = (1..n)
            .map(|i| (hi - lo).mul_add(i as f64 / n as f64, lo))
            .collect();
        Self {
            domain,
            colors: colors.to_vec(),
            thresholds,
        }
    }

    /// Index of the band `value` falls into; non-finite values have none.
    pub fn band(&self, value: f64) -> Option<usize> {
        if !value.is_finite() || self.colors.is_empty() {
            return None;
        }
        Some(self.thresholds.partition_point(|threshold| *threshold <= value))
    }

    pub fn color(&self, value: f64) -> Option<Rgb> {
        self.band(value).map(|band| self.colors[band])
    }

    /// Lower bound of each band, in band order.
    pub fn lower_bounds(&self) -> Vec<f64> {
        std::iter::once(self.domain.0)
            .chain(self.thresholds.iter().copied())
            .take(self.colors.len())
            .collect()
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }
}

/// Assigns palette colors to keys in order of first request.
#[derive(Debug, Clone)]
pub struct OrdinalScale {
    palette: &'static [Rgb],
    seen: Vec<String>,
}

impl OrdinalScale {
    pub const fn new(palette: &'static [Rgb]) -> Self {
        Self {
            palette,
            seen: Vec::new(),
        }
    }

    pub fn color(&mut self, key: &str) -> Rgb {
        let index = match self.seen.iter().position(|entry| entry == key) {
            Some(index) => index,
            None => {
                self.seen.push(key.to_string());
                self.seen.len() - 1
            }
        };
        self.palette[index % self.palette.len()]
    }
}
