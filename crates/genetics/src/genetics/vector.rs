//! Stochastic draws for parasites inside the mosquito.
//!
//! These helpers turn the configured bite and oocyst parameters into counts.
//! Both bite counts use a negative binomial over the number that *fail*, and
//! redraw until the count is positive.

use super::config::{check_range, DistributionKind, GeneticsConfig};
use super::Configurable;
use crate::base::RandomSource;
use crate::errors::ConfigError;

/// Validated distribution of sporozoites produced per oocyst.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SporozoitesPerOocyst {
    Constant(f64),
    Uniform { min: f64, max: f64 },
    Gaussian { mean: f64, std_dev: f64 },
    /// Exponential with the given mean
    Exponential { mean: f64 },
}

impl SporozoitesPerOocyst {
    /// Draw a (non-negative) number of sporozoites per oocyst.
    pub fn sample<R: RandomSource + ?Sized>(&self, rng: &mut R) -> f64 {
        let draw = match *self {
            Self::Constant(value) => value,
            Self::Uniform { min, max } => min + (max - min) * rng.unit(),
            Self::Gaussian { mean, std_dev } => rng.gaussian(mean, std_dev),
            Self::Exponential { mean } => rng.exponential(1.0 / mean),
        };
        draw.max(0.0)
    }
}

impl Configurable for SporozoitesPerOocyst {
    type Config = GeneticsConfig;

    fn configure(config: &GeneticsConfig) -> Result<Self, ConfigError> {
        match config.sporozoites_per_oocyst_distribution {
            DistributionKind::Constant => {
                let value = config.sporozoites_per_oocyst_constant;
                check_range("Sporozoites_Per_Oocyst_Constant", value, 0.0, f64::MAX)?;
                Ok(Self::Constant(value))
            }
            DistributionKind::Uniform => {
                let min = config.sporozoites_per_oocyst_min;
                let max = config.sporozoites_per_oocyst_max;
                check_range("Sporozoites_Per_Oocyst_Min", min, 0.0, f64::MAX)?;
                check_range("Sporozoites_Per_Oocyst_Max", max, min, f64::MAX)?;
                Ok(Self::Uniform { min, max })
            }
            DistributionKind::Gaussian => {
                let mean = config.sporozoites_per_oocyst_gaussian_mean;
                let std_dev = config.sporozoites_per_oocyst_gaussian_std_dev;
                check_range("Sporozoites_Per_Oocyst_Gaussian_Mean", mean, 0.0, f64::MAX)?;
                check_range("Sporozoites_Per_Oocyst_Gaussian_Std_Dev", std_dev, 0.0, f64::MAX)?;
                Ok(Self::Gaussian { mean, std_dev })
            }
            DistributionKind::Exponential => {
                let mean = config.sporozoites_per_oocyst_exponential;
                check_range(
                    "Sporozoites_Per_Oocyst_Exponential",
                    mean,
                    f64::EPSILON,
                    f64::MAX,
                )?;
                Ok(Self::Exponential { mean })
            }
        }
    }
}

/// Validated parameters for the mosquito-side draws.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorParameters {
    sporozoite_mortality_rate: f64,
    sporozoites_in_bite_fail: f64,
    probability_sporozoite_in_bite_fails: f64,
    oocysts_from_bite_fail: f64,
    probability_oocyst_from_bite_fails: f64,
    sporozoites_per_oocyst: SporozoitesPerOocyst,
    mortality_disabled: bool,
}

impl Configurable for VectorParameters {
    type Config = GeneticsConfig;

    fn configure(config: &GeneticsConfig) -> Result<Self, ConfigError> {
        let epsilon = f64::from(f32::EPSILON);
        check_range(
            "Sporozoite_Life_Expectancy",
            config.sporozoite_life_expectancy,
            epsilon,
            f64::MAX,
        )?;
        check_range(
            "Num_Sporozoites_In_Bite_Fail",
            config.num_sporozoites_in_bite_fail,
            epsilon,
            f64::MAX,
        )?;
        check_range(
            "Probability_Sporozoite_In_Bite_Fails",
            config.probability_sporozoite_in_bite_fails,
            epsilon,
            1.0 - epsilon,
        )?;
        check_range(
            "Num_Oocyst_From_Bite_Fail",
            config.num_oocyst_from_bite_fail,
            epsilon,
            f64::MAX,
        )?;
        check_range(
            "Probability_Oocyst_From_Bite_Fails",
            config.probability_oocyst_from_bite_fails,
            epsilon,
            1.0 - epsilon,
        )?;

        Ok(Self {
            sporozoite_mortality_rate: 1.0 / config.sporozoite_life_expectancy,
            sporozoites_in_bite_fail: config.num_sporozoites_in_bite_fail,
            probability_sporozoite_in_bite_fails: config.probability_sporozoite_in_bite_fails,
            oocysts_from_bite_fail: config.num_oocyst_from_bite_fail,
            probability_oocyst_from_bite_fails: config.probability_oocyst_from_bite_fails,
            sporozoites_per_oocyst: SporozoitesPerOocyst::configure(config)?,
            mortality_disabled: config.similarity_to_base,
        })
    }
}

impl VectorParameters {
    /// Daily sporozoite mortality rate (1 / life expectancy).
    #[inline]
    pub fn sporozoite_mortality_rate(&self) -> f64 {
        self.sporozoite_mortality_rate
    }

    #[inline]
    pub fn sporozoites_per_oocyst(&self) -> SporozoitesPerOocyst {
        self.sporozoites_per_oocyst
    }

    /// Number of sporozoites delivered in one bite. Always positive.
    pub fn num_sporozoites_in_bite<R: RandomSource + ?Sized>(&self, rng: &mut R) -> u32 {
        draw_positive(
            rng,
            self.sporozoites_in_bite_fail,
            self.probability_sporozoite_in_bite_fails,
        )
    }

    /// Number of oocysts formed after biting an infectious person. Always
    /// positive.
    pub fn num_oocysts_from_bite<R: RandomSource + ?Sized>(&self, rng: &mut R) -> u32 {
        draw_positive(
            rng,
            self.oocysts_from_bite_fail,
            self.probability_oocyst_from_bite_fails,
        )
    }

    /// Number of sporozoites still alive after `dt` days.
    ///
    /// `mortality_modifier` scales the death probability (e.g. for
    /// interventions). No sporozoites die when genetics stands in for the
    /// base model.
    pub fn reduce_sporozoites_due_to_death<R: RandomSource + ?Sized>(
        &self,
        rng: &mut R,
        dt: f64,
        num_sporozoites: u32,
        mortality_modifier: f64,
    ) -> u32 {
        if self.mortality_disabled {
            return num_sporozoites;
        }
        let prob = (1.0 - (-dt * self.sporozoite_mortality_rate).exp()) * mortality_modifier;
        let num_dead = rng.binomial(u64::from(num_sporozoites), prob);
        u64::from(num_sporozoites).saturating_sub(num_dead) as u32
    }

    /// Number of sporozoites produced by `num_oocysts` mature oocysts.
    pub fn convert_oocysts_to_sporozoites<R: RandomSource + ?Sized>(
        &self,
        rng: &mut R,
        num_oocysts: u32,
    ) -> u32 {
        let per_oocyst = self.sporozoites_per_oocyst.sample(rng);
        (f64::from(num_oocysts) * per_oocyst) as u32
    }
}

fn draw_positive<R: RandomSource + ?Sized>(rng: &mut R, fails: f64, p_fail: f64) -> u32 {
    loop {
        let n = rng.negative_binomial(fails, p_fail).min(u64::from(u32::MAX)) as u32;
        if n > 0 {
            return n;
        }
    }
}
