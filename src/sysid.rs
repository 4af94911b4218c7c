//! Builds SysId "Simple" test frames from the state, velocity, position and voltage signals.
//!
//! Each test phase is bounded by the first and last state sample carrying its label.
//! Inside that window the most densely sampled signal becomes the time base and the
//! other two are interpolated onto it.

use std::io::Write;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    catalog::{Catalog, Signal},
    resample::{average_interval, interpolate},
    Error, Result,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestPhase {
    DynamicForward,
    DynamicReverse,
    QuasistaticForward,
    QuasistaticReverse,
}

impl TestPhase {
    pub const ALL: [TestPhase; 4] = [
        TestPhase::DynamicForward,
        TestPhase::DynamicReverse,
        TestPhase::QuasistaticForward,
        TestPhase::QuasistaticReverse,
    ];

    /// Label written to the state signal while this phase runs
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            TestPhase::DynamicForward => "dynamic-forward",
            TestPhase::DynamicReverse => "dynamic-reverse",
            TestPhase::QuasistaticForward => "quasistatic-forward",
            TestPhase::QuasistaticReverse => "quasistatic-reverse",
        }
    }

    /// Key of this phase in the exported document
    #[must_use]
    pub fn document_key(self) -> &'static str {
        match self {
            TestPhase::DynamicForward => "fast-forward",
            TestPhase::DynamicReverse => "fast-backward",
            TestPhase::QuasistaticForward => "slow-forward",
            TestPhase::QuasistaticReverse => "slow-backward",
        }
    }
}

/// `[time, voltage, position, velocity]`, whichever signal was the time base
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestFrame(pub [f64; 4]);

impl TestFrame {
    #[must_use]
    pub fn time(&self) -> f64 {
        self.0[0]
    }

    #[must_use]
    pub fn voltage(&self) -> f64 {
        self.0[1]
    }

    #[must_use]
    pub fn position(&self) -> f64 {
        self.0[2]
    }

    #[must_use]
    pub fn velocity(&self) -> f64 {
        self.0[3]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SynthesisConfig {
    /// Multiplier turning log timestamps into seconds
    pub timestamp_scale: f64,
    pub units: String,
    pub units_per_rotation: f64,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        SynthesisConfig {
            timestamp_scale: 1e-6,
            units: "Rotations".into(),
            units_per_rotation: 1.0,
        }
    }
}

/// Which of the three measured signals a series is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Velocity,
    Position,
    Voltage,
}

/// The four signals a SysId export is built from
#[derive(Debug, Clone, Copy)]
pub struct SysIdSignals<'a> {
    pub state: &'a Signal<Box<str>>,
    pub velocity: &'a Signal<f64>,
    pub position: &'a Signal<f64>,
    pub voltage: &'a Signal<f64>,
}

impl<'a> SysIdSignals<'a> {
    /// Looks up the state signal and the named measurement signals in `catalog`
    pub fn select(
        catalog: &'a Catalog,
        velocity: &str,
        position: &str,
        voltage: &str,
    ) -> Result<Self> {
        let state = catalog.state_signal().ok_or_else(|| Error::MissingSignal {
            role: "State",
            hint: "please verify you have selected a valid characterization datalog".into(),
        })?;

        let numeric = |role: &'static str, name: &str| {
            catalog
                .numeric_by_name(name)
                .ok_or_else(|| Error::MissingSignal {
                    role,
                    hint: format!("no double signal named '{name}'"),
                })
        };

        Ok(SysIdSignals {
            state,
            velocity: numeric("Velocity", velocity)?,
            position: numeric("Position", position)?,
            voltage: numeric("Voltage", voltage)?,
        })
    }

    /// Frames for a single phase; a phase that never ran yields no frames
    pub fn frames(&self, phase: TestPhase, config: &SynthesisConfig) -> Result<Vec<TestFrame>> {
        info!("Retrieving test frames for {}", phase.label());

        let mut phase_times: Vec<i64> = self
            .state
            .values
            .iter()
            .filter(|(_, label)| &**label == phase.label())
            .map(|&(time, _)| time)
            .collect();
        phase_times.sort_unstable();

        let (Some(&min), Some(&max)) = (phase_times.first(), phase_times.last()) else {
            return Ok(Vec::new());
        };

        if min == max {
            warn!("Phase {} has a single state sample, skipping", phase.label());
            return Ok(Vec::new());
        }

        let velocity = window(self.velocity, min, max);
        let position = window(self.position, min, max);
        let voltage = window(self.voltage, min, max);

        let mut base: Option<(Channel, f64)> = None;

        for (channel, series) in [
            (Channel::Velocity, &velocity),
            (Channel::Position, &position),
            (Channel::Voltage, &voltage),
        ] {
            let times: Vec<i64> = series.iter().map(|&(time, _)| time).collect();

            match average_interval(&times) {
                Ok(interval) => {
                    info!("{channel:?} average interval: {interval}");

                    if base.map_or(true, |(_, best)| interval < best) {
                        base = Some((channel, interval));
                    }
                }
                Err(err) => warn!("{channel:?} cannot be the time base: {err}"),
            }
        }

        let Some((channel, _)) = base else {
            return Err(Error::NoTimeBase(phase.label().into()));
        };

        let base_series = match channel {
            Channel::Velocity => &velocity,
            Channel::Position => &position,
            Channel::Voltage => &voltage,
        };

        let frames = base_series
            .iter()
            .map(|&(time, value)| -> Result<TestFrame> {
                let sample = |own: Channel, series: &[(i64, f64)]| {
                    if own == channel {
                        Ok(value)
                    } else {
                        interpolate(series, time)
                    }
                };

                Ok(TestFrame([
                    time as f64 * config.timestamp_scale,
                    sample(Channel::Voltage, voltage.as_slice())?,
                    sample(Channel::Position, position.as_slice())?,
                    sample(Channel::Velocity, velocity.as_slice())?,
                ]))
            })
            .collect::<Result<Vec<_>>>()?;

        info!("Built {} frames using {channel:?} as time base", frames.len());

        Ok(frames)
    }
}

/// Samples strictly inside `(min, max)`, sorted by timestamp
fn window(signal: &Signal<f64>, min: i64, max: i64) -> Vec<(i64, f64)> {
    let mut samples: Vec<(i64, f64)> = signal
        .values
        .iter()
        .copied()
        .filter(|&(time, _)| time > min && time < max)
        .collect();
    samples.sort_by_key(|&(time, _)| time);
    samples
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SysIdDocument {
    pub sysid: bool,
    pub test: String,
    pub units: String,
    #[serde(rename = "unitsPerRotation")]
    pub units_per_rotation: f64,
    #[serde(rename = "fast-forward")]
    pub fast_forward: Vec<TestFrame>,
    #[serde(rename = "fast-backward")]
    pub fast_backward: Vec<TestFrame>,
    #[serde(rename = "slow-forward")]
    pub slow_forward: Vec<TestFrame>,
    #[serde(rename = "slow-backward")]
    pub slow_backward: Vec<TestFrame>,
}

impl SysIdDocument {
    /// Runs every phase and assembles the export
    pub fn build(signals: &SysIdSignals<'_>, config: &SynthesisConfig) -> Result<Self> {
        if signals.state.is_empty() {
            return Err(Error::MissingSignal {
                role: "State",
                hint: "the state signal has no samples".into(),
            });
        }

        let mut document = SysIdDocument {
            sysid: true,
            test: "Simple".into(),
            units: config.units.clone(),
            units_per_rotation: config.units_per_rotation,
            fast_forward: Vec::new(),
            fast_backward: Vec::new(),
            slow_forward: Vec::new(),
            slow_backward: Vec::new(),
        };

        for phase in TestPhase::ALL {
            *document.phase_mut(phase) = signals.frames(phase, config)?;
        }

        Ok(document)
    }

    #[must_use]
    pub fn phase(&self, phase: TestPhase) -> &[TestFrame] {
        match phase {
            TestPhase::DynamicForward => &self.fast_forward,
            TestPhase::DynamicReverse => &self.fast_backward,
            TestPhase::QuasistaticForward => &self.slow_forward,
            TestPhase::QuasistaticReverse => &self.slow_backward,
        }
    }

    fn phase_mut(&mut self, phase: TestPhase) -> &mut Vec<TestFrame> {
        match phase {
            TestPhase::DynamicForward => &mut self.fast_forward,
            TestPhase::DynamicReverse => &mut self.fast_backward,
            TestPhase::QuasistaticForward => &mut self.slow_forward,
            TestPhase::QuasistaticReverse => &mut self.slow_backward,
        }
    }

    pub fn to_writer_pretty(&self, writer: impl Write) -> serde_json::Result<()> {
        serde_json::to_writer_pretty(writer, self)
    }
}
