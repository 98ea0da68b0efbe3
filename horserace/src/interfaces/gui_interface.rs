use crate::core::horse::HorsePool;
use crate::core::race::Race;
use crate::post::race_result::RaceResult;
use anyhow::Context;

/// (Hz) Snapshots are sent at most this often per simulated second
pub const MAX_GUI_UPDATE_FREQUENCY: f64 = 20.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// HorseState is the displayed state of one horse.
/// * `progress` - (%) 0-100
/// * `speed` - (m/s) Current effective speed, 0 after the finish
/// * `viewer_finish_time` - (ms) Finish time as shown on the race timer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HorseState {
    pub horse_id: String,
    pub name: String,
    pub color: RgbColor,
    pub progress: f64,
    pub speed: f64,
    pub finished: bool,
    pub viewer_finish_time: Option<f64>,
}

/// RaceSnapshot is an owned copy of everything a presentation layer needs to draw a race.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RaceSnapshot {
    pub round_number: u32,
    pub distance: f64,
    pub horse_states: Vec<HorseState>,
    pub real_elapsed_ms: f64,
    pub viewer_elapsed_ms: f64,
    pub speed_multiplier: f64,

    // final results payload (sent once when the round finishes)
    pub final_results: Option<Vec<RaceResult>>,
}

impl RaceSnapshot {
    pub fn from_race<P: HorsePool + ?Sized>(
        race: &Race,
        pool: &P,
        speed_multiplier: f64,
    ) -> anyhow::Result<RaceSnapshot> {
        let mut horse_states = Vec::with_capacity(race.progress_list().len());

        for entry in race.progress_list().iter() {
            let horse = pool
                .get_by_id(&entry.horse_id)
                .with_context(|| format!("Horse {} is not in the pool!", entry.horse_id))?;
            let tmp_color = horse
                .color
                .parse::<css_color_parser::Color>()
                .context("Could not parse hex color!")?;

            let speed = if entry.finished {
                0.0
            } else {
                entry.speed * entry.variance.dynamic_factor(entry.progress)
            };

            horse_states.push(HorseState {
                horse_id: entry.horse_id.to_owned(),
                name: horse.name.to_owned(),
                color: RgbColor {
                    r: tmp_color.r,
                    g: tmp_color.g,
                    b: tmp_color.b,
                },
                progress: entry.progress,
                speed,
                finished: entry.finished,
                viewer_finish_time: entry.viewer_finish_time,
            });
        }

        Ok(RaceSnapshot {
            round_number: race.round_number,
            distance: race.distance,
            horse_states,
            real_elapsed_ms: race.real_elapsed_ms(),
            viewer_elapsed_ms: race.viewer_elapsed_ms(),
            speed_multiplier,
            final_results: None,
        })
    }

    /// get_leader returns the horse furthest down the track.
    pub fn get_leader(&self) -> Option<&HorseState> {
        self.horse_states
            .iter()
            .fold(None, |best: Option<&HorseState>, cur| match best {
                Some(best) if cur.progress <= best.progress => Some(best),
                _ => Some(cur),
            })
    }
}
