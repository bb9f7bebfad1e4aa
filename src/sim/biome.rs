//! Biomes and difficulty bands
//!
//! Altitude picks a biome (tint + platform weight table) and a difficulty
//! band (vertical gap range). Lookups never fail: past the last band the
//! final entry applies.

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::platform::PlatformKind;
use crate::consts::DEFAULT_TERRAIN_TINT;
use crate::tuning::{BiomeDef, DifficultyBand, PlatformWeights};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BiomeKind {
    #[default]
    Depths,
    Caverns,
    Spire,
    Summit,
}

/// Parameters for one generation step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyProfile {
    pub min_gap: i32,
    pub max_gap: i32,
    pub biome: BiomeKind,
    pub tint: u32,
    pub weights: PlatformWeights,
}

/// First biome whose ceiling is above `altitude`, else the last one
pub fn biome_for_altitude(biomes: &[BiomeDef], altitude: f32) -> Option<&BiomeDef> {
    biomes
        .iter()
        .find(|b| altitude < b.max_altitude)
        .or_else(|| biomes.last())
}

/// Platform tint for a biome kind, falling back to the default terrain tint
pub fn tint_for(biomes: &[BiomeDef], kind: BiomeKind) -> u32 {
    biomes
        .iter()
        .find(|b| b.kind == kind)
        .map(|b| b.platform_tint)
        .unwrap_or(DEFAULT_TERRAIN_TINT)
}

fn band_for_altitude(bands: &[DifficultyBand], altitude: f32) -> Option<&DifficultyBand> {
    bands
        .iter()
        .find(|b| altitude < b.max_altitude)
        .or_else(|| bands.last())
}

/// Gap range, biome and weights for an altitude
pub fn difficulty_for(biomes: &[BiomeDef], bands: &[DifficultyBand], altitude: f32) -> DifficultyProfile {
    let (min_gap, max_gap) = band_for_altitude(bands, altitude)
        .map(|b| (b.min_gap, b.max_gap))
        .unwrap_or((80, 150));

    match biome_for_altitude(biomes, altitude) {
        Some(biome) => DifficultyProfile {
            min_gap,
            max_gap,
            biome: biome.kind,
            tint: biome.platform_tint,
            weights: biome.weights,
        },
        None => DifficultyProfile {
            min_gap,
            max_gap,
            biome: BiomeKind::Summit,
            tint: DEFAULT_TERRAIN_TINT,
            weights: PlatformWeights {
                standard: 1.0,
                ..PlatformWeights::default()
            },
        },
    }
}

/// Cumulative-weight roll over the platform types. Rolls past the table end
/// fall back to standard; a slope bucket picks left or right evenly.
pub fn roll_platform_type(weights: &PlatformWeights, rng: &mut Pcg32) -> PlatformKind {
    let roll: f32 = rng.random();
    let buckets = [
        (weights.standard, PlatformKind::Standard),
        (weights.moving, PlatformKind::Moving),
        (weights.breakable, PlatformKind::Breakable),
        (weights.ice, PlatformKind::Ice),
        (weights.sticky, PlatformKind::Sticky),
        (weights.bounce, PlatformKind::Bounce),
    ];

    let mut cumulative = 0.0;
    for (weight, kind) in buckets {
        cumulative += weight;
        // Strict comparison keeps zero-weight buckets unreachable
        if roll < cumulative && weight > 0.0 {
            return kind;
        }
    }

    cumulative += weights.slope;
    if roll < cumulative && weights.slope > 0.0 {
        return if rng.random_bool(0.5) {
            PlatformKind::SlopeLeft
        } else {
            PlatformKind::SlopeRight
        };
    }

    PlatformKind::Standard
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tuning;
    use rand::SeedableRng;
    use std::collections::HashMap;

    #[test]
    fn test_biome_bands_and_fallback() {
        let tuning = Tuning::default();
        let kind = |alt| biome_for_altitude(&tuning.biomes, alt).map(|b| b.kind);
        assert_eq!(kind(0.0), Some(BiomeKind::Depths));
        assert_eq!(kind(999.0), Some(BiomeKind::Depths));
        assert_eq!(kind(1000.0), Some(BiomeKind::Caverns));
        assert_eq!(kind(5999.0), Some(BiomeKind::Spire));
        assert_eq!(kind(1.0e9), Some(BiomeKind::Summit));
        assert!(biome_for_altitude(&[], 10.0).is_none());
        assert_eq!(tint_for(&[], BiomeKind::Spire), DEFAULT_TERRAIN_TINT);
    }

    #[test]
    fn test_difficulty_bands() {
        let tuning = Tuning::default();
        let profile = |alt| difficulty_for(&tuning.biomes, &tuning.difficulty, alt);
        assert_eq!((profile(0.0).min_gap, profile(0.0).max_gap), (80, 150));
        assert_eq!((profile(500.0).min_gap, profile(500.0).max_gap), (100, 200));
        assert_eq!((profile(4999.0).min_gap, profile(4999.0).max_gap), (130, 260));
        assert_eq!((profile(9000.0).min_gap, profile(9000.0).max_gap), (150, 300));
        assert_eq!(profile(2500.0).biome, BiomeKind::Caverns);
    }

    #[test]
    fn test_empty_tables_fall_back() {
        let profile = difficulty_for(&[], &[], 100.0);
        assert_eq!(profile.tint, DEFAULT_TERRAIN_TINT);
        assert!(profile.min_gap > 0 && profile.min_gap <= profile.max_gap);
    }

    #[test]
    fn test_roll_frequencies_match_weights() {
        const ROLLS: usize = 100_000;
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(7);

        for biome in &tuning.biomes {
            let w = biome.weights;
            let mut counts: HashMap<PlatformKind, usize> = HashMap::new();
            for _ in 0..ROLLS {
                *counts.entry(roll_platform_type(&w, &mut rng)).or_default() += 1;
            }
            let freq = |k: PlatformKind| *counts.get(&k).unwrap_or(&0) as f32 / ROLLS as f32;

            // Standard also absorbs rolls past the table end
            let leftover = (1.0 - w.total()).max(0.0);
            let expected = [
                (PlatformKind::Standard, w.standard + leftover),
                (PlatformKind::Moving, w.moving),
                (PlatformKind::Breakable, w.breakable),
                (PlatformKind::Ice, w.ice),
                (PlatformKind::Sticky, w.sticky),
                (PlatformKind::Bounce, w.bounce),
            ];
            for (kind, p) in expected {
                assert!(
                    (freq(kind) - p).abs() < 0.01,
                    "{:?} in {}: got {}, expected {}",
                    kind,
                    biome.name,
                    freq(kind),
                    p
                );
                if p == 0.0 {
                    assert_eq!(freq(kind), 0.0);
                }
            }
            let slopes = freq(PlatformKind::SlopeLeft) + freq(PlatformKind::SlopeRight);
            assert!((slopes - w.slope).abs() < 0.01);
        }
    }

    #[test]
    fn test_zero_weight_never_rolled() {
        let weights = PlatformWeights {
            moving: 0.5,
            bounce: 0.5,
            ..PlatformWeights::default()
        };
        let mut rng = Pcg32::seed_from_u64(99);
        for _ in 0..10_000 {
            let kind = roll_platform_type(&weights, &mut rng);
            assert!(matches!(kind, PlatformKind::Moving | PlatformKind::Bounce));
        }
    }
}
