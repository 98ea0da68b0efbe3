use crate::core::horse::{Horse, HorsePool};
use crate::core::schedule::Round;
use crate::core::speed::{compute_expected_finish_time_ms, compute_speed};
use helpers::general::{argmax, argsort, SortOrder};
use helpers::random::random_float;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::f64::consts::TAU;

/// Effective speed never drops below this share of the nominal speed
const MIN_DYNAMIC_FACTOR: f64 = 0.85;
/// (ms) Width of a finish time bucket, two finishers never share one
const FINISH_BUCKET_MS: f64 = 10.0;
/// (ms) Jitter range used to push a finish time into the next free bucket
const FINISH_JITTER_MS: [f64; 2] = [5.0, 15.0];

/// Per-horse pacing profile, drawn once at race start.
/// * `stamina_decay` - Speed share lost towards the finish, in [0.05, 0.15]
/// * `surge_amp` - Amplitude of the sinusoidal surge, in [0.0, 0.06]
/// * `phase` - Phase offset of the surge, in [0, 2π[
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VarianceProfile {
    pub stamina_decay: f64,
    pub surge_amp: f64,
    pub phase: f64,
}

impl VarianceProfile {
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> VarianceProfile {
        VarianceProfile {
            stamina_decay: random_float(rng, 0.05, 0.15),
            surge_amp: random_float(rng, 0.0, 0.06),
            phase: random_float(rng, 0.0, TAU),
        }
    }

    /// dynamic_factor returns the speed multiplier at the given progress (0-100).
    pub fn dynamic_factor(&self, progress: f64) -> f64 {
        let p_norm = (progress / 100.0).clamp(0.0, 1.0);
        let factor = 1.0 - self.stamina_decay * p_norm
            + (self.phase + p_norm * TAU).sin() * self.surge_amp;
        factor.max(MIN_DYNAMIC_FACTOR)
    }
}

/// RaceProgress is the live state of one horse in the active round. Once `finished` is set, the
/// finish related fields are never touched again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceProgress {
    pub horse_id: String,
    /// (%) 0-100
    pub progress: f64,
    /// (m/s) Nominal speed, fixed at race start
    pub speed: f64,
    pub finished: bool,
    /// (ms) Frame timestamp at which the horse crossed the line
    pub finish_time: Option<f64>,
    /// (ms) Unscaled race clock at the finish, deduplicated, decides the ranking
    pub real_elapsed_time: Option<f64>,
    /// (ms) Advisory baseline computed at race start
    pub expected_finish_time: Option<f64>,
    /// (ms) Playback-scaled race clock at the finish, for display
    pub viewer_finish_time: Option<f64>,
    pub variance: VarianceProfile,
}

/// ProgressMap stores the progress entries keyed by horse id in participant order.
#[derive(Debug, Clone, Default)]
pub struct ProgressMap {
    entries: Vec<RaceProgress>,
    idx_by_id: HashMap<String, usize>,
}

impl ProgressMap {
    pub fn insert(&mut self, entry: RaceProgress) {
        match self.idx_by_id.get(&entry.horse_id) {
            Some(&i) => self.entries[i] = entry,
            None => {
                self.idx_by_id.insert(entry.horse_id.to_owned(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    pub fn get(&self, horse_id: &str) -> Option<&RaceProgress> {
        self.idx_by_id.get(horse_id).map(|&i| &self.entries[i])
    }

    /// as_slice is the read-only list view in participant order.
    pub fn as_slice(&self) -> &[RaceProgress] {
        &self.entries
    }

    fn iter_mut(&mut self) -> std::slice::IterMut<'_, RaceProgress> {
        self.entries.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Race holds everything that changes while a round is animated.
#[derive(Debug, Clone)]
pub struct Race {
    pub round_number: u32,
    /// (m)
    pub distance: f64,
    /// (ms) Nominal frame duration, used as time step of the first frame after start or resume
    frame_duration_ms: f64,
    progress: ProgressMap,
    real_elapsed_ms: f64,
    viewer_elapsed_ms: f64,
    last_frame_time: Option<f64>,
    claimed_buckets: HashSet<i64>,
}

impl Race {
    /// new initializes a fresh progress entry for every participant of the round. The latest
    /// condition from the pool is used, so fatigue and rest of previous rounds are respected.
    pub fn new<P: HorsePool + ?Sized, R: Rng + ?Sized>(
        round: &Round,
        pool: &P,
        frame_duration_ms: f64,
        rng: &mut R,
    ) -> Race {
        let distance = round.distance as f64;
        let mut progress = ProgressMap::default();

        for (idx, participant) in round.participants.iter().enumerate() {
            let horse: &Horse = pool.get_by_id(&participant.id).unwrap_or(participant);
            let speed = compute_speed(horse, distance, rng);
            let expected_finish_time = compute_expected_finish_time_ms(speed, distance, idx, rng);

            progress.insert(RaceProgress {
                horse_id: horse.id.to_owned(),
                progress: 0.0,
                speed,
                finished: false,
                finish_time: None,
                real_elapsed_time: None,
                expected_finish_time: Some(expected_finish_time),
                viewer_finish_time: None,
                variance: VarianceProfile::sample(rng),
            });
        }

        Race {
            round_number: round.round_number,
            distance,
            frame_duration_ms,
            progress,
            real_elapsed_ms: 0.0,
            viewer_elapsed_ms: 0.0,
            last_frame_time: None,
            claimed_buckets: HashSet::new(),
        }
    }

    // ---------------------------------------------------------------------------------------------
    // MAIN METHOD ---------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// advance_frame moves every unfinished horse forward by one frame and returns true once all
    /// horses have finished. `timestamp` is the frame timestamp (ms), `speed_multiplier` only
    /// scales the playback, not the real race clock.
    pub fn advance_frame<R: Rng + ?Sized>(
        &mut self,
        timestamp: f64,
        speed_multiplier: f64,
        rng: &mut R,
    ) -> bool {
        let dt = match self.last_frame_time {
            Some(t_prev) => (timestamp - t_prev).max(0.0),
            None => self.frame_duration_ms,
        };
        self.last_frame_time = Some(timestamp);

        let dt_effective = dt * speed_multiplier;
        self.real_elapsed_ms += dt;
        self.viewer_elapsed_ms += dt_effective;

        let distance = self.distance;
        let real_elapsed_ms = self.real_elapsed_ms;
        let viewer_elapsed_ms = self.viewer_elapsed_ms;
        let round_number = self.round_number;
        let claimed_buckets = &mut self.claimed_buckets;
        let mut all_finished = true;

        for entry in self.progress.iter_mut().filter(|entry| !entry.finished) {
            let eff_speed = entry.speed * entry.variance.dynamic_factor(entry.progress);
            let increment = calc_progress_increment(eff_speed, distance, dt_effective);
            entry.progress = (entry.progress + increment).min(100.0);

            if entry.progress >= 100.0 {
                let t_real = dedup_finish_time(real_elapsed_ms, claimed_buckets, rng);

                entry.finished = true;
                entry.finish_time = Some(timestamp);
                entry.real_elapsed_time = Some(t_real);
                entry.viewer_finish_time = Some(viewer_elapsed_ms);

                log::debug!(
                    "Round {}: horse {} finished after {:.2}s (viewer {:.2}s)",
                    round_number,
                    entry.horse_id,
                    t_real / 1000.0,
                    viewer_elapsed_ms / 1000.0
                );
            } else {
                all_finished = false;
            }
        }

        all_finished
    }

    /// interrupt forgets the last frame timestamp, so the pause until the next frame is not
    /// counted as race time.
    pub fn interrupt(&mut self) {
        self.last_frame_time = None;
    }

    // ---------------------------------------------------------------------------------------------
    // METHODS (HELPERS) ---------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    pub fn get_all_finished(&self) -> bool {
        self.progress.as_slice().iter().all(|entry| entry.finished)
    }

    pub fn get_progress(&self, horse_id: &str) -> Option<&RaceProgress> {
        self.progress.get(horse_id)
    }

    pub fn progress_list(&self) -> &[RaceProgress] {
        self.progress.as_slice()
    }

    /// get_leader returns the horse furthest down the track (first in participant order on ties).
    pub fn get_leader(&self) -> Option<&RaceProgress> {
        let progresses: Vec<f64> = self.progress_list().iter().map(|e| e.progress).collect();
        argmax(&progresses).map(|idx| &self.progress_list()[idx])
    }

    /// finish_order returns the entries sorted by ascending real elapsed time, horses without a
    /// finish time come last in participant order.
    pub fn finish_order(&self) -> Vec<&RaceProgress> {
        let t_finish: Vec<f64> = self
            .progress_list()
            .iter()
            .map(|e| e.real_elapsed_time.unwrap_or(f64::INFINITY))
            .collect();

        argsort(&t_finish, SortOrder::Ascending)
            .into_iter()
            .map(|idx| &self.progress_list()[idx])
            .collect()
    }

    pub fn real_elapsed_ms(&self) -> f64 {
        self.real_elapsed_ms
    }

    pub fn viewer_elapsed_ms(&self) -> f64 {
        self.viewer_elapsed_ms
    }
}

/// calc_progress_increment returns the progress (%) gained at the given speed (m/s) over dt (ms)
/// of playback time.
pub fn calc_progress_increment(speed: f64, distance: f64, dt: f64) -> f64 {
    let progress_per_second = speed / distance * 10.0;
    progress_per_second * dt / 1000.0
}

/// dedup_finish_time returns the candidate finish time (ms), pushed forward by 5-15ms steps until
/// its centisecond bucket is not claimed by an earlier finisher, and claims that bucket.
pub fn dedup_finish_time<R: Rng + ?Sized>(
    candidate: f64,
    claimed: &mut HashSet<i64>,
    rng: &mut R,
) -> f64 {
    let mut t = candidate;
    let mut bucket = (t / FINISH_BUCKET_MS).floor() as i64;

    while claimed.contains(&bucket) {
        t += random_float(rng, FINISH_JITTER_MS[0], FINISH_JITTER_MS[1]);
        bucket = (t / FINISH_BUCKET_MS).floor() as i64;
    }

    claimed.insert(bucket);
    t
}
