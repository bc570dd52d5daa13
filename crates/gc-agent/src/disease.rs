//! Disease parameters and per-agent health state.

use gc_core::DiseaseConfig;

/// Timer value meaning "not applicable / already elapsed".
pub const NOT_APPLICABLE: f64 = -1.0;

/// Age over which the contact probability falls linearly to zero.
const AGE_DISCOUNT_SPAN: f64 = 200.0;

/// Runtime copy of the `[disease]` configuration section.
#[derive(Clone, Debug, PartialEq)]
pub struct DiseaseParams {
    pub spread_prob:           f64,
    pub incubation_days:       f64,
    pub infection_days:        f64,
    pub fatality_rate:         f64,
    pub immunity_prob:         f64,
    pub ambient_exposure_prob: f64,
    pub baseline_age:          f64,
}

impl DiseaseParams {
    /// Probability that the infectious stage ends in death for an agent of
    /// `age`: the base rate scaled by `age / baseline_age`.
    pub fn fatality_probability(&self, age: f64) -> f64 {
        (self.fatality_rate * age / self.baseline_age).clamp(0.0, 1.0)
    }

    /// Probability that co-location with an infectious agent infects an
    /// agent of `age`.  Younger agents catch it more easily.
    pub fn contact_probability(&self, age: f64) -> f64 {
        (self.spread_prob * (1.0 - age / AGE_DISCOUNT_SPAN)).clamp(0.0, 1.0)
    }
}

impl From<&DiseaseConfig> for DiseaseParams {
    fn from(c: &DiseaseConfig) -> Self {
        Self {
            spread_prob:           c.spread_prob,
            incubation_days:       c.incubation_days,
            infection_days:        c.infection_days,
            fatality_rate:         c.fatality_rate,
            immunity_prob:         c.immunity_prob,
            ambient_exposure_prob: c.ambient_exposure_prob,
            baseline_age:          c.baseline_age,
        }
    }
}

impl Default for DiseaseParams {
    fn default() -> Self {
        Self::from(&DiseaseConfig::default())
    }
}

// ── Health ────────────────────────────────────────────────────────────────────

/// Derived epidemiological stage.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Stage {
    Susceptible,
    Incubating,
    Infectious,
    Immune,
    Dead,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Susceptible => "susceptible",
            Stage::Incubating  => "incubating",
            Stage::Infectious  => "infectious",
            Stage::Immune      => "immune",
            Stage::Dead        => "dead",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw health flags and timers.  Timers are in days; a value `<= 0` means
/// the phase has elapsed or does not apply.
#[derive(Clone, Debug, PartialEq)]
pub struct Health {
    pub alive:           bool,
    pub infected:        bool,
    pub immune:          bool,
    pub incubation_left: f64,
    pub infection_left:  f64,
}

impl Default for Health {
    fn default() -> Self {
        Self {
            alive:           true,
            infected:        false,
            immune:          false,
            incubation_left: NOT_APPLICABLE,
            infection_left:  NOT_APPLICABLE,
        }
    }
}

impl Health {
    /// Infected and past incubation.
    #[inline]
    pub fn is_infectious(&self) -> bool {
        self.alive && self.infected && self.incubation_left <= 0.0
    }

    /// Can still catch the disease.
    #[inline]
    pub fn is_susceptible(&self) -> bool {
        self.alive && !self.infected && !self.immune
    }

    pub fn stage(&self) -> Stage {
        if !self.alive {
            Stage::Dead
        } else if self.infected && self.incubation_left > 0.0 {
            Stage::Incubating
        } else if self.infected {
            Stage::Infectious
        } else if self.immune {
            Stage::Immune
        } else {
            Stage::Susceptible
        }
    }

    /// Back to "no infection in progress".
    pub(crate) fn clear_infection(&mut self) {
        self.infected = false;
        self.incubation_left = NOT_APPLICABLE;
        self.infection_left = NOT_APPLICABLE;
    }
}
