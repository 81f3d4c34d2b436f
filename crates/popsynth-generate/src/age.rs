use rand::{Rng, RngCore};
use rand_distr::{Distribution, Normal};

use popsynth_config::AgePolicy;

use crate::errors::GenerationError;

/// Ready-to-sample form of an [`AgePolicy`].
#[derive(Debug, Clone)]
pub enum AgeSampler {
    Uniform { min: u32, max: u32 },
    Normal { dist: Normal<f64>, max: u32 },
    Fixed(u32),
}

impl AgeSampler {
    pub fn from_policy(policy: &AgePolicy) -> Result<Self, GenerationError> {
        match *policy {
            AgePolicy::Uniform { min, max } => {
                if min > max {
                    return Err(GenerationError::InvalidInput(format!(
                        "uniform age range [{min}, {max}] is inverted"
                    )));
                }
                Ok(AgeSampler::Uniform { min, max })
            }
            AgePolicy::Normal { mean, std_dev, max } => {
                let dist = Normal::new(mean, std_dev).map_err(|err| {
                    GenerationError::InvalidInput(format!(
                        "normal age policy (mean {mean}, std_dev {std_dev}): {err}"
                    ))
                })?;
                Ok(AgeSampler::Normal { dist, max })
            }
            AgePolicy::Fixed { age } => Ok(AgeSampler::Fixed(age)),
        }
    }

    pub fn sample(&self, rng: &mut dyn RngCore) -> u32 {
        match self {
            AgeSampler::Uniform { min, max } => rng.random_range(*min..=*max),
            AgeSampler::Normal { dist, max } => {
                let value = dist.sample(rng).round();
                if value.is_nan() {
                    0
                } else {
                    value.clamp(0.0, f64::from(*max)) as u32
                }
            }
            AgeSampler::Fixed(age) => *age,
        }
    }
}
