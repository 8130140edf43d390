/*
 * Copyright 2020 Nikhil Marathe <nsm.nikhil@gmail.com>
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! Stage timings for the generator.
//!
//! Metrics are keyed by a static name and recorded per thread. Recording is a no-op until
//! [`enable`] is called, so the `scoped_metric!` guards can stay in the code unconditionally.

use std::{
    cell::RefCell,
    fmt,
    sync::atomic::{AtomicBool, Ordering},
    thread_local,
    time::{Duration, Instant},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub name: &'static str,
    pub count: usize,
    /// Total time spent, in microseconds.
    pub total: u128,
    /// Longest single run, in microseconds.
    pub max: u128,
}

impl Sample {
    fn new(name: &'static str) -> Self {
        Sample {
            name,
            count: 0,
            total: 0,
            max: 0,
        }
    }

    fn record(&mut self, elapsed: Duration) {
        let micros = elapsed.as_micros();
        self.count += 1;
        self.total += micros;
        self.max = std::cmp::max(self.max, micros);
    }

    fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total as f64 / self.count as f64
        }
    }
}

#[derive(Debug, Default)]
struct Registry {
    samples: Vec<Sample>,
}

impl Registry {
    // Linear search is fine, there are only a handful of stages.
    fn slot(&mut self, name: &'static str) -> &mut Sample {
        let index = match self.samples.iter().position(|s| s.name == name) {
            Some(index) => index,
            None => {
                self.samples.push(Sample::new(name));
                self.samples.len() - 1
            }
        };
        &mut self.samples[index]
    }
}

/// A timer that records into the named metric when dropped.
pub struct ScopedMetric {
    name: &'static str,
    start: Instant,
}

impl ScopedMetric {
    /// Returns `None` when metrics are disabled.
    pub fn start(name: &'static str) -> Option<Self> {
        if !is_enabled() {
            return None;
        }
        Some(ScopedMetric {
            name,
            start: Instant::now(),
        })
    }
}

impl Drop for ScopedMetric {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        REGISTRY.with(|r| r.borrow_mut().slot(self.name).record(elapsed));
    }
}

/// Times the rest of the enclosing scope under `$name`.
#[macro_export]
macro_rules! scoped_metric {
    ($name:literal) => {
        let _scoped_metric = $crate::ScopedMetric::start($name);
    };
}

thread_local! {
    static REGISTRY: RefCell<Registry> = RefCell::new(Registry::default());
}
static ENABLED: AtomicBool = AtomicBool::new(false);

pub fn enable() {
    ENABLED.store(true, Ordering::Relaxed);
}

pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

/// The samples recorded on the current thread, in first-recorded order.
pub fn samples() -> Vec<Sample> {
    REGISTRY.with(|r| r.borrow().samples.clone())
}

pub struct Report(Vec<Sample>);

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name_width = self
            .0
            .iter()
            .map(|s| s.name.len())
            .chain(std::iter::once("metric".len()))
            .max()
            .unwrap_or(0);
        writeln!(
            f,
            "{:name_width$} {:>6} {:>9} {:>9} {:>11}",
            "metric",
            "count",
            "avg (us)",
            "max (us)",
            "total (us)",
            name_width = name_width
        )?;
        writeln!(
            f,
            "{:-<name_width$} {:-^6} {:-^9} {:-^9} {:-^11}",
            "",
            "",
            "",
            "",
            "",
            name_width = name_width
        )?;
        for sample in &self.0 {
            writeln!(
                f,
                "{:name_width$} {:>6} {:>9.1} {:>9} {:>11}",
                sample.name,
                sample.count,
                sample.average(),
                sample.max,
                sample.total,
                name_width = name_width
            )?;
        }
        Ok(())
    }
}

pub fn report() -> Report {
    Report(samples())
}

pub fn dump() {
    eprint!("{}", report());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_scoped_runs() {
        enable();
        {
            scoped_metric!("stage");
        }
        {
            scoped_metric!("stage");
        }
        let stage = samples()
            .into_iter()
            .find(|s| s.name == "stage")
            .expect("stage recorded");
        assert_eq!(stage.count, 2);
        assert!(stage.max <= stage.total);
    }

    #[test]
    fn unused_registry_is_empty() {
        let mut registry = Registry::default();
        assert!(registry.samples.is_empty());
        let sample = registry.slot("never run").clone();
        assert_eq!(sample.count, 0);
        assert_eq!(sample.average(), 0.0);
    }

    #[test]
    fn report_lists_every_metric() {
        let mut registry = Registry::default();
        registry
            .slot("inventory")
            .record(Duration::from_micros(40));
        registry.slot("emit").record(Duration::from_micros(10));
        registry.slot("emit").record(Duration::from_micros(30));
        let text = Report(registry.samples).to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("metric"));
        assert!(lines[2].starts_with("inventory"));
        assert!(lines[3].starts_with("emit"));
        assert!(lines[3].contains(" 20.0 "));
        assert!(lines[3].ends_with(" 40"));
    }
}
