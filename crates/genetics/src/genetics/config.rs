//! Raw genetics parameters as read from a configuration document.
//!
//! `GeneticsConfig` only describes the input. Validation happens when the
//! parameters are turned into a [`GenomeLocationRegistry`](super::GenomeLocationRegistry)
//! through the [`Configurable`](super::Configurable) trait.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// How the MSP and PfEMP1-major epitopes of new genomes are determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VarGeneRandomness {
    /// MSP and PfEMP1-major values are tracked in the genome and derived
    /// from the barcode.
    #[default]
    #[serde(rename = "FIXED_NEIGHBORHOOD")]
    FixedNeighborhood,
    /// Only the MSP value is tracked; PfEMP1-major variants are random.
    #[serde(rename = "FIXED_MSP")]
    FixedMsp,
    /// Neither is tracked in the genome.
    #[serde(rename = "ALL_RANDOM")]
    AllRandom,
}

impl fmt::Display for VarGeneRandomness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FixedNeighborhood => "FIXED_NEIGHBORHOOD",
            Self::FixedMsp => "FIXED_MSP",
            Self::AllRandom => "ALL_RANDOM",
        };
        f.write_str(name)
    }
}

/// Distribution family for the number of sporozoites produced per oocyst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DistributionKind {
    #[default]
    #[serde(rename = "CONSTANT_DISTRIBUTION")]
    Constant,
    #[serde(rename = "UNIFORM_DISTRIBUTION")]
    Uniform,
    #[serde(rename = "GAUSSIAN_DISTRIBUTION")]
    Gaussian,
    #[serde(rename = "EXPONENTIAL_DISTRIBUTION")]
    Exponential,
}

/// The master genetics configuration.
///
/// Field names on the wire are the simulator parameter names. Missing fields
/// take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneticsConfig {
    /// Run genetics as a stand-in for the non-genetic base model
    #[serde(rename = "Enable_FPG_Similarity_To_Base")]
    pub similarity_to_base: bool,

    #[serde(rename = "Var_Gene_Randomness_Type")]
    pub var_gene_randomness: VarGeneRandomness,

    #[serde(rename = "Barcode_Genome_Locations")]
    pub barcode_locations: Vec<i32>,
    #[serde(rename = "Drug_Resistant_Genome_Locations")]
    pub drug_resistant_locations: Vec<i32>,
    #[serde(rename = "HRP_Genome_Locations")]
    pub hrp_locations: Vec<i32>,
    #[serde(rename = "MSP_Genome_Location")]
    pub msp_location: i32,
    #[serde(rename = "PfEMP1_Variants_Genome_Locations")]
    pub pfemp1_major_locations: Vec<i32>,

    /// Number of distinct MSP variants
    #[serde(rename = "Falciparum_MSP_Variants")]
    pub msp_variants: i32,
    /// Number of distinct PfEMP1 variants
    #[serde(rename = "Falciparum_PfEMP1_Variants")]
    pub pfemp1_variants: i32,
    #[serde(rename = "Neighborhood_Size_MSP")]
    pub neighborhood_size_msp: i32,
    #[serde(rename = "Neighborhood_Size_PfEMP1")]
    pub neighborhood_size_pfemp1: i32,

    /// Shape of the gamma distribution of inter-crossover distances (cM)
    #[serde(rename = "Crossover_Gamma_K")]
    pub crossover_gamma_k: f64,
    /// Scale of the gamma distribution of inter-crossover distances (cM)
    #[serde(rename = "Crossover_Gamma_Theta")]
    pub crossover_gamma_theta: f64,

    /// Days
    #[serde(rename = "Sporozoite_Life_Expectancy")]
    pub sporozoite_life_expectancy: f64,
    #[serde(rename = "Num_Sporozoites_In_Bite_Fail")]
    pub num_sporozoites_in_bite_fail: f64,
    #[serde(rename = "Probability_Sporozoite_In_Bite_Fails")]
    pub probability_sporozoite_in_bite_fails: f64,
    #[serde(rename = "Num_Oocyst_From_Bite_Fail")]
    pub num_oocyst_from_bite_fail: f64,
    #[serde(rename = "Probability_Oocyst_From_Bite_Fails")]
    pub probability_oocyst_from_bite_fails: f64,

    #[serde(rename = "Sporozoites_Per_Oocyst_Distribution")]
    pub sporozoites_per_oocyst_distribution: DistributionKind,
    #[serde(rename = "Sporozoites_Per_Oocyst_Constant")]
    pub sporozoites_per_oocyst_constant: f64,
    #[serde(rename = "Sporozoites_Per_Oocyst_Min")]
    pub sporozoites_per_oocyst_min: f64,
    #[serde(rename = "Sporozoites_Per_Oocyst_Max")]
    pub sporozoites_per_oocyst_max: f64,
    #[serde(rename = "Sporozoites_Per_Oocyst_Gaussian_Mean")]
    pub sporozoites_per_oocyst_gaussian_mean: f64,
    #[serde(rename = "Sporozoites_Per_Oocyst_Gaussian_Std_Dev")]
    pub sporozoites_per_oocyst_gaussian_std_dev: f64,
    #[serde(rename = "Sporozoites_Per_Oocyst_Exponential")]
    pub sporozoites_per_oocyst_exponential: f64,

    /// Rank of this process, used to partition genome IDs
    #[serde(rename = "Rank")]
    pub rank: u32,
    /// Number of cooperating processes
    #[serde(rename = "Num_Tasks")]
    pub num_tasks: u32,
}

impl Default for GeneticsConfig {
    fn default() -> Self {
        Self {
            similarity_to_base: false,
            var_gene_randomness: VarGeneRandomness::FixedNeighborhood,
            barcode_locations: Vec::new(),
            drug_resistant_locations: Vec::new(),
            hrp_locations: Vec::new(),
            msp_location: 1,
            pfemp1_major_locations: Vec::new(),
            msp_variants: 100,
            pfemp1_variants: 1000,
            neighborhood_size_msp: 4,
            neighborhood_size_pfemp1: 10,
            crossover_gamma_k: 2.0,
            crossover_gamma_theta: 0.38,
            sporozoite_life_expectancy: 10.0,
            num_sporozoites_in_bite_fail: 12.0,
            probability_sporozoite_in_bite_fails: 0.5,
            num_oocyst_from_bite_fail: 3.0,
            probability_oocyst_from_bite_fails: 0.5,
            sporozoites_per_oocyst_distribution: DistributionKind::Constant,
            sporozoites_per_oocyst_constant: 1.0,
            sporozoites_per_oocyst_min: 0.0,
            sporozoites_per_oocyst_max: 1.0,
            sporozoites_per_oocyst_gaussian_mean: 1.0,
            sporozoites_per_oocyst_gaussian_std_dev: 1.0,
            sporozoites_per_oocyst_exponential: 1.0,
            rank: 0,
            num_tasks: 1,
        }
    }
}

impl GeneticsConfig {
    /// Parse a configuration from a JSON document.
    ///
    /// # Errors
    /// Returns `ConfigError::Parse` if the document is not valid JSON or a
    /// field has the wrong type.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the configuration to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Check that a numeric parameter lies in `[min, max]`.
pub(crate) fn check_range(
    param: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), ConfigError> {
    if value.is_nan() || value < min || value > max {
        return Err(ConfigError::OutOfRange {
            param,
            value,
            min,
            max,
        });
    }
    Ok(())
}
