//! Genome representation and seeded mutation for the behavior search.

use std::fmt;

use rand::prelude::*;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::schema::GenomeBounds;

/// Number of (slope, intercept) pairs in every genome.
pub const GENOME_LEN: usize = 3;

/// One linear mapping from a sensor reading to a wheel velocity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gene {
    pub slope: f64,
    pub intercept: f64,
}

/// The parameter vector under search: three sensor-to-wheel mappings.
///
/// Genomes are plain values. Mutation returns a new genome and never
/// touches the input, so an evaluated genome stays exactly what was
/// evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    pub genes: [Gene; GENOME_LEN],
}

impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, gene) in self.genes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "({:.2}, {:.2})", gene.slope, gene.intercept)?;
        }
        write!(f, "]")
    }
}

/// Random number generator wrapper for genome operations.
///
/// The draw order per gene is fixed (slope chance, slope noise, intercept
/// chance, intercept noise) so a fixed seed reproduces a whole search
/// trajectory exactly.
pub struct GenomeRng {
    rng: StdRng,
}

impl GenomeRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create with random seed.
    pub fn random() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Draw a random genome from the initialization ranges.
    pub fn random_genome(&mut self, bounds: &GenomeBounds) -> Genome {
        let mut genes = [Gene {
            slope: 0.0,
            intercept: 0.0,
        }; GENOME_LEN];
        for gene in &mut genes {
            gene.slope = self.uniform(bounds.init_slope);
            gene.intercept = self.uniform(bounds.init_intercept);
        }
        Genome { genes }
    }

    /// Mutate each gene component independently with probability `rate`,
    /// perturbing by Gaussian noise of `strength` and soft-clamping into
    /// the configured bounds. Returns a new genome.
    pub fn mutate_genome(
        &mut self,
        genome: &Genome,
        rate: f64,
        strength: f64,
        bounds: &GenomeBounds,
    ) -> Genome {
        let mut mutated = *genome;
        for gene in &mut mutated.genes {
            if self.rng.r#gen::<f64>() < rate {
                gene.slope = self.gaussian_mutate(gene.slope, strength, bounds.slope);
            }
            if self.rng.r#gen::<f64>() < rate {
                gene.intercept = self.gaussian_mutate(gene.intercept, strength, bounds.intercept);
            }
        }
        mutated
    }

    /// Gaussian mutation: add noise to a value, clamped into bounds.
    fn gaussian_mutate(&mut self, value: f64, strength: f64, bounds: (f64, f64)) -> f64 {
        let noise: f64 = self.rng.sample(StandardNormal);
        (value + noise * strength).clamp(bounds.0, bounds.1)
    }

    /// Uniform random in bounds.
    fn uniform(&mut self, bounds: (f64, f64)) -> f64 {
        self.rng.gen_range(bounds.0..=bounds.1)
    }

    /// Generate next u64 for seeding child RNGs.
    pub fn next_seed(&mut self) -> u64 {
        self.rng.r#gen()
    }
}
