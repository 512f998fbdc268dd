//! Correlated GPU telemetry generator
//!
//! Each tick draws an independent activity state per GPU and derives the
//! remaining readings from it: clocks, temperature and power follow
//! utilization, frame buffer usage follows memory utilization. Only the
//! energy accumulator is carried from one tick to the next.

use crate::devices::{GpuDevice, TOTAL_FB_MEMORY_MB};
use crate::fields::DcgmFields;
use hwsim_engine::{uniform, Simulation};
use hwsim_metrics::{MetricsRegistry, Result};
use rand::rngs::SmallRng;
use rand::Rng;
use std::time::Duration;
use tracing::debug;

/// Probability that a GPU is busy during a tick
pub const ACTIVE_PROBABILITY: f64 = 0.8;

/// Probability that a GPU records one PCIe replay during a tick
pub const PCIE_REPLAY_PROBABILITY: f64 = 0.01;

/// Utilization above which the SM clock runs in the boost band
pub const SM_BOOST_THRESHOLD: f64 = 50.0;

pub const ACTIVE_UTIL_RANGE: (f64, f64) = (60.0, 100.0);
pub const IDLE_UTIL_RANGE: (f64, f64) = (0.0, 15.0);
pub const MEM_CLOCK_RANGE: (f64, f64) = (1590.0, 1595.0);
pub const SM_CLOCK_BOOST_RANGE: (f64, f64) = (1380.0, 1410.0);
pub const SM_CLOCK_IDLE_RANGE: (f64, f64) = (210.0, 300.0);
pub const ACTIVE_MEM_UTIL_RANGE: (f64, f64) = (10.0, 90.0);
pub const IDLE_MEM_UTIL_RANGE: (f64, f64) = (0.0, 5.0);

/// Energy counters start somewhere in this range (mJ), as if the GPU had
/// been powered for a while before the exporter started
pub const INITIAL_ENERGY_RANGE_MJ: (f64, f64) = (1.2e12, 1.8e12);

/// Readings generated for one GPU in one tick
#[derive(Debug, Clone, PartialEq)]
pub struct GpuSample {
    pub active: bool,
    pub gpu_util: f64,
    pub mem_clock: f64,
    pub sm_clock: f64,
    pub gpu_temp: f64,
    pub memory_temp: f64,
    /// Power draw implied by utilization, before measurement noise
    pub base_power: f64,
    pub power_usage: f64,
    pub mem_copy_util: f64,
    pub fb_used: f64,
    pub fb_free: f64,
    pub enc_util: f64,
    pub dec_util: f64,
    pub pcie_replay: bool,
}

impl GpuSample {
    /// Draw a fresh set of readings
    pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let active = rng.gen_bool(ACTIVE_PROBABILITY);

        let gpu_util = if active {
            uniform(rng, ACTIVE_UTIL_RANGE.0, ACTIVE_UTIL_RANGE.1)
        } else {
            uniform(rng, IDLE_UTIL_RANGE.0, IDLE_UTIL_RANGE.1)
        };

        let mem_clock = uniform(rng, MEM_CLOCK_RANGE.0, MEM_CLOCK_RANGE.1);

        let sm_clock = if gpu_util > SM_BOOST_THRESHOLD {
            uniform(rng, SM_CLOCK_BOOST_RANGE.0, SM_CLOCK_BOOST_RANGE.1)
        } else {
            uniform(rng, SM_CLOCK_IDLE_RANGE.0, SM_CLOCK_IDLE_RANGE.1)
        };

        let base_temp = base_temperature(gpu_util);
        let gpu_temp = base_temp + uniform(rng, -2.0, 2.0);
        let memory_temp = base_temp + uniform(rng, -5.0, 10.0);

        let base_power = base_power(gpu_util);
        let power_usage = base_power + uniform(rng, -10.0, 10.0);

        let mem_copy_util = if active {
            uniform(rng, ACTIVE_MEM_UTIL_RANGE.0, ACTIVE_MEM_UTIL_RANGE.1)
        } else {
            uniform(rng, IDLE_MEM_UTIL_RANGE.0, IDLE_MEM_UTIL_RANGE.1)
        };
        let fb_used = TOTAL_FB_MEMORY_MB * mem_copy_util / 100.0;
        let fb_free = TOTAL_FB_MEMORY_MB - fb_used;

        let enc_util = uniform(rng, 0.0, 1.0);
        let dec_util = uniform(rng, 0.0, 1.0);

        let pcie_replay = rng.gen_bool(PCIE_REPLAY_PROBABILITY);

        Self {
            active,
            gpu_util,
            mem_clock,
            sm_clock,
            gpu_temp,
            memory_temp,
            base_power,
            power_usage,
            mem_copy_util,
            fb_used,
            fb_free,
            enc_util,
            dec_util,
            pcie_replay,
        }
    }

    /// Energy drawn over `interval` at the base power, in mJ
    pub fn energy_mj(&self, interval: Duration) -> f64 {
        self.base_power * interval.as_secs_f64() * 1000.0
    }
}

/// Temperature (C) implied by utilization
pub fn base_temperature(gpu_util: f64) -> f64 {
    30.0 + gpu_util * 0.5
}

/// Power draw (W) implied by utilization: 60 W idle, 440 W at full load
pub fn base_power(gpu_util: f64) -> f64 {
    60.0 + 380.0 * gpu_util / 100.0
}

/// Simulated DCGM exporter state
pub struct DcgmSimulation {
    fields: DcgmFields,
    gpus: Vec<GpuDevice>,
    energy_mj: Vec<f64>,
    interval: Duration,
    rng: SmallRng,
}

impl DcgmSimulation {
    /// Register the DCGM fields and seed the per-GPU energy accumulators.
    ///
    /// `interval` is the tick interval; it converts power into energy. The
    /// exported energy counters start at zero and only receive per-tick deltas.
    pub fn new(
        registry: &MetricsRegistry,
        gpus: Vec<GpuDevice>,
        mut rng: SmallRng,
        interval: Duration,
    ) -> Result<Self> {
        let fields = DcgmFields::register(registry)?;

        let energy_mj: Vec<f64> = gpus
            .iter()
            .map(|_| uniform(&mut rng, INITIAL_ENERGY_RANGE_MJ.0, INITIAL_ENERGY_RANGE_MJ.1))
            .collect();

        for (gpu, energy) in gpus.iter().zip(&energy_mj) {
            debug!("GPU {} energy accumulator starts at {:.0} mJ", gpu.index, energy);
            // Materialize both counter series at zero so every GPU has rows from the first scrape
            let labels = gpu.label_values();
            fields.total_energy_consumption.with_label_values(&labels).inc_by(0.0);
            fields.pcie_replay_counter.with_label_values(&labels).inc_by(0.0);
        }

        Ok(Self {
            fields,
            gpus,
            energy_mj,
            interval,
            rng,
        })
    }

    /// Simulated GPUs
    pub fn gpus(&self) -> &[GpuDevice] {
        &self.gpus
    }

    /// Registered instruments
    pub fn fields(&self) -> &DcgmFields {
        &self.fields
    }

    /// Accumulated energy of GPU `index` in mJ
    pub fn energy_mj(&self, index: usize) -> Option<f64> {
        self.energy_mj.get(index).copied()
    }

    /// Run one tick and return what was published, one sample per GPU
    pub fn step(&mut self) -> Vec<GpuSample> {
        let mut samples = Vec::with_capacity(self.gpus.len());

        for (i, gpu) in self.gpus.iter().enumerate() {
            let sample = GpuSample::draw(&mut self.rng);
            let labels = gpu.label_values();
            let f = &self.fields;

            f.gpu_util.with_label_values(&labels).set(sample.gpu_util);
            f.mem_clock.with_label_values(&labels).set(sample.mem_clock);
            f.sm_clock.with_label_values(&labels).set(sample.sm_clock);
            f.gpu_temp.with_label_values(&labels).set(sample.gpu_temp);
            f.memory_temp.with_label_values(&labels).set(sample.memory_temp);
            f.power_usage.with_label_values(&labels).set(sample.power_usage);
            f.mem_copy_util.with_label_values(&labels).set(sample.mem_copy_util);
            f.fb_used.with_label_values(&labels).set(sample.fb_used);
            f.fb_free.with_label_values(&labels).set(sample.fb_free);
            f.enc_util.with_label_values(&labels).set(sample.enc_util);
            f.dec_util.with_label_values(&labels).set(sample.dec_util);

            let energy = sample.energy_mj(self.interval);
            self.energy_mj[i] += energy;
            f.total_energy_consumption.with_label_values(&labels).inc_by(energy);

            if sample.pcie_replay {
                f.pcie_replay_counter.with_label_values(&labels).inc();
                debug!("GPU {} recorded a PCIe replay", gpu.index);
            }

            samples.push(sample);
        }

        samples
    }
}

impl Simulation for DcgmSimulation {
    fn name(&self) -> &str {
        "dcgm"
    }

    fn tick(&mut self) {
        let samples = self.step();
        let active = samples.iter().filter(|s| s.active).count();
        debug!("DCGM tick: {}/{} GPUs active", active, samples.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::default_gpus;
    use crate::fields::{PCIE_REPLAY_COUNTER, TOTAL_ENERGY_CONSUMPTION};
    use rand::SeedableRng;

    const TICKS: usize = 2_000;

    fn in_range(value: f64, range: (f64, f64)) -> bool {
        value >= range.0 && value <= range.1
    }

    fn simulation(seed: u64) -> (MetricsRegistry, DcgmSimulation) {
        let registry = MetricsRegistry::new();
        let sim = DcgmSimulation::new(
            &registry,
            default_gpus(),
            SmallRng::seed_from_u64(seed),
            Duration::from_secs(15),
        )
        .unwrap();
        (registry, sim)
    }

    #[test]
    fn test_sample_values_within_bounds() {
        let mut rng = SmallRng::seed_from_u64(1);

        for _ in 0..TICKS * 4 {
            let s = GpuSample::draw(&mut rng);

            assert!(in_range(s.gpu_util, (0.0, 100.0)));
            if s.active {
                assert!(in_range(s.gpu_util, ACTIVE_UTIL_RANGE));
                assert!(in_range(s.mem_copy_util, ACTIVE_MEM_UTIL_RANGE));
            } else {
                assert!(in_range(s.gpu_util, IDLE_UTIL_RANGE));
                assert!(in_range(s.mem_copy_util, IDLE_MEM_UTIL_RANGE));
            }

            assert!(in_range(s.mem_clock, MEM_CLOCK_RANGE));
            assert!(in_range(s.enc_util, (0.0, 1.0)));
            assert!(in_range(s.dec_util, (0.0, 1.0)));

            let base_temp = base_temperature(s.gpu_util);
            assert!(in_range(s.gpu_temp, (base_temp - 2.0, base_temp + 2.0)));
            assert!(in_range(s.memory_temp, (base_temp - 5.0, base_temp + 10.0)));

            assert!(in_range(s.base_power, (60.0, 440.0)));
            assert!(in_range(s.power_usage, (s.base_power - 10.0, s.base_power + 10.0)));
        }
    }

    #[test]
    fn test_sm_clock_band_follows_utilization() {
        let mut rng = SmallRng::seed_from_u64(2);

        for _ in 0..TICKS * 4 {
            let s = GpuSample::draw(&mut rng);
            if s.gpu_util > SM_BOOST_THRESHOLD {
                assert!(in_range(s.sm_clock, SM_CLOCK_BOOST_RANGE), "{:?}", s);
            } else {
                assert!(in_range(s.sm_clock, SM_CLOCK_IDLE_RANGE), "{:?}", s);
            }
        }
    }

    #[test]
    fn test_frame_buffer_adds_up_to_capacity() {
        let mut rng = SmallRng::seed_from_u64(3);

        for _ in 0..TICKS {
            let s = GpuSample::draw(&mut rng);
            assert!((s.fb_used + s.fb_free - TOTAL_FB_MEMORY_MB).abs() < 1e-9);
            assert!(s.fb_used >= 0.0 && s.fb_free >= 0.0);
        }
    }

    #[test]
    fn test_activity_rate_is_close_to_probability() {
        let mut rng = SmallRng::seed_from_u64(4);
        let draws = 20_000;
        let active = (0..draws).filter(|_| GpuSample::draw(&mut rng).active).count();

        let rate = active as f64 / draws as f64;
        assert!((rate - ACTIVE_PROBABILITY).abs() < 0.02, "active rate {}", rate);
    }

    #[test]
    fn test_correlation_formulas() {
        assert_eq!(base_temperature(0.0), 30.0);
        assert_eq!(base_temperature(100.0), 80.0);
        assert_eq!(base_power(0.0), 60.0);
        assert_eq!(base_power(100.0), 440.0);
        assert_eq!(base_power(50.0), 250.0);
    }

    #[test]
    fn test_energy_accumulates_base_power() {
        let (_registry, mut sim) = simulation(5);
        let initial: Vec<f64> = (0..4).map(|i| sim.energy_mj(i).unwrap()).collect();
        for energy in &initial {
            assert!(in_range(*energy, INITIAL_ENERGY_RANGE_MJ));
        }

        let mut expected = initial.clone();
        for _ in 0..100 {
            for (i, sample) in sim.step().iter().enumerate() {
                expected[i] += sample.base_power * 15.0 * 1000.0;
            }
        }

        for i in 0..4 {
            let actual = sim.energy_mj(i).unwrap();
            assert!((actual - expected[i]).abs() / expected[i] < 1e-12);
            assert!(actual > initial[i]);
        }
        assert!(sim.energy_mj(4).is_none());
    }

    #[test]
    fn test_energy_follows_tick_interval() {
        let s = GpuSample::draw(&mut SmallRng::seed_from_u64(6));
        let per_second = s.energy_mj(Duration::from_secs(1));

        assert!((per_second - s.base_power * 1000.0).abs() < 1e-9);
        assert!((s.energy_mj(Duration::from_secs(15)) - 15.0 * per_second).abs() < 1e-6);
    }

    #[test]
    fn test_counters_never_decrease() {
        let (_registry, mut sim) = simulation(7);
        let gpus = sim.gpus().to_vec();
        let fields = sim.fields().clone();

        let read = |gpu: &GpuDevice| {
            let labels = gpu.label_values();
            (
                fields.total_energy_consumption.with_label_values(&labels).get(),
                fields.pcie_replay_counter.with_label_values(&labels).get(),
            )
        };

        let mut previous: Vec<(f64, f64)> = gpus.iter().map(read).collect();
        for _ in 0..500 {
            sim.step();
            for (gpu, prev) in gpus.iter().zip(previous.iter_mut()) {
                let current = read(gpu);
                assert!(current.0 > prev.0);
                assert!(current.1 >= prev.1);
                *prev = current;
            }
        }
    }

    #[test]
    fn test_energy_counter_starts_at_zero() {
        let (registry, sim) = simulation(1);

        for gpu in sim.gpus() {
            let counter = sim
                .fields()
                .total_energy_consumption
                .with_label_values(&gpu.label_values())
                .get();
            assert_eq!(counter, 0.0);
        }
        for i in 0..4 {
            assert!(in_range(sim.energy_mj(i).unwrap(), INITIAL_ENERGY_RANGE_MJ));
        }

        let text = registry.export_metrics().unwrap();
        for counter in [TOTAL_ENERGY_CONSUMPTION, PCIE_REPLAY_COUNTER] {
            let rows: Vec<&str> = text
                .lines()
                .filter(|line| line.starts_with(&format!("{}{{", counter)))
                .collect();
            assert_eq!(rows.len(), 4, "{}", counter);
            assert!(rows.iter().all(|row| row.ends_with("} 0")), "{:?}", rows);
        }
    }

    #[test]
    fn test_energy_counter_tracks_accumulator_minus_seed() {
        let (_registry, mut sim) = simulation(8);
        let seeds: Vec<f64> = (0..4).map(|i| sim.energy_mj(i).unwrap()).collect();

        for _ in 0..50 {
            sim.step();
        }

        for (i, gpu) in sim.gpus().iter().enumerate() {
            let counter = sim
                .fields()
                .total_energy_consumption
                .with_label_values(&gpu.label_values())
                .get();
            let consumed = sim.energy_mj(i).unwrap() - seeds[i];
            assert!(counter > 0.0);
            assert!((counter - consumed).abs() / consumed < 1e-6, "{} vs {}", counter, consumed);
        }
    }

    #[test]
    fn test_published_gauges_match_samples() {
        let (_registry, mut sim) = simulation(9);
        let samples = sim.step();

        for (gpu, sample) in sim.gpus().iter().zip(&samples) {
            let labels = gpu.label_values();
            let f = sim.fields();
            assert_eq!(f.gpu_util.with_label_values(&labels).get(), sample.gpu_util);
            assert_eq!(f.sm_clock.with_label_values(&labels).get(), sample.sm_clock);
            assert_eq!(f.power_usage.with_label_values(&labels).get(), sample.power_usage);
            assert_eq!(f.fb_used.with_label_values(&labels).get(), sample.fb_used);
            assert_eq!(f.fb_free.with_label_values(&labels).get(), sample.fb_free);
        }
    }

    #[test]
    fn test_replays_are_rare() {
        let (_registry, mut sim) = simulation(10);
        let replays: usize = (0..TICKS)
            .map(|_| sim.step().iter().filter(|s| s.pcie_replay).count())
            .sum();

        // 8000 draws at 1%: expect ~80
        assert!(replays > 20 && replays < 200, "replays {}", replays);
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let (_a, mut first) = simulation(11);
        let (_b, mut second) = simulation(11);

        for _ in 0..10 {
            assert_eq!(first.step(), second.step());
        }
    }
}
