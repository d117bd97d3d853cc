//! Synthetic Vehicle Data
//!
//! Labeled feature vectors; there is no real dataset behind the models.
//! Two generators:
//! - `generate`: per-class parameter ranges from the detailed catalog,
//!   produced class by class in catalog order, `samples_per_class` each
//! - `generate_rule_based`: broad uniform ranges labelled by coarse
//!   length/weight/seats rules, used for the server's fallback model
//!
//! With a fixed seed both are reproducible bit for bit.

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::features::{encode, FeatureVector, FuelType, VehicleAttributes};

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyntheticError {
    #[error("no vehicle classes defined")]
    EmptyCatalog,

    #[error("{label}: invalid {field} range")]
    InvalidRange { label: String, field: &'static str },

    #[error("{label}: fuel probabilities must be non-negative and sum to 1")]
    InvalidFuelProbabilities { label: String },
}

// ============================================================================
// CLASS SPECS
// ============================================================================

/// Coarse grouping of the detailed classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleCategory {
    Bike,
    Car,
    #[serde(rename = "SUV")]
    Suv,
    Truck,
    Bus,
}

impl VehicleCategory {
    pub const ALL: [VehicleCategory; 5] = [
        VehicleCategory::Bike,
        VehicleCategory::Car,
        VehicleCategory::Suv,
        VehicleCategory::Truck,
        VehicleCategory::Bus,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            VehicleCategory::Bike => "Bike",
            VehicleCategory::Car => "Car",
            VehicleCategory::Suv => "SUV",
            VehicleCategory::Truck => "Truck",
            VehicleCategory::Bus => "Bus",
        }
    }
}

/// Uniform ranges per attribute, inclusive integer ranges for axles/seats,
/// and fuel probabilities in one-hot order (diesel, electric, hybrid, petrol)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamRanges {
    pub length: (f64, f64),
    pub height: (f64, f64),
    pub width: (f64, f64),
    pub weight: (f64, f64),
    pub power: (f64, f64),
    pub speed: (f64, f64),
    pub axles: (u32, u32),
    pub seats: (u32, u32),
    pub fuel_probs: [f64; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSpec {
    pub label: String,
    pub category: VehicleCategory,
    pub ranges: ParamRanges,
}

impl ClassSpec {
    pub fn validate(&self) -> Result<(), SyntheticError> {
        let r = &self.ranges;
        let float_ranges = [
            ("length", r.length),
            ("height", r.height),
            ("width", r.width),
            ("weight", r.weight),
            ("power", r.power),
            ("speed", r.speed),
        ];

        for (field, (lo, hi)) in float_ranges {
            if !lo.is_finite() || !hi.is_finite() || lo > hi {
                return Err(self.invalid_range(field));
            }
        }
        if r.axles.0 > r.axles.1 {
            return Err(self.invalid_range("axles"));
        }
        if r.seats.0 > r.seats.1 {
            return Err(self.invalid_range("seats"));
        }

        let sum: f64 = r.fuel_probs.iter().sum();
        if r.fuel_probs.iter().any(|p| !p.is_finite() || *p < 0.0) || (sum - 1.0).abs() > 1e-6 {
            return Err(SyntheticError::InvalidFuelProbabilities {
                label: self.label.clone(),
            });
        }

        Ok(())
    }

    fn invalid_range(&self, field: &'static str) -> SyntheticError {
        SyntheticError::InvalidRange {
            label: self.label.clone(),
            field,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabeledSample {
    pub features: FeatureVector,
    pub label: String,
}

// ============================================================================
// CATALOG
// ============================================================================

#[allow(clippy::too_many_arguments)]
fn spec(
    label: &str,
    category: VehicleCategory,
    length: (f64, f64),
    height: (f64, f64),
    width: (f64, f64),
    weight: (f64, f64),
    power: (f64, f64),
    speed: (f64, f64),
    axles: (u32, u32),
    seats: (u32, u32),
    fuel_probs: [f64; 4],
) -> ClassSpec {
    ClassSpec {
        label: label.to_string(),
        category,
        ranges: ParamRanges {
            length,
            height,
            width,
            weight,
            power,
            speed,
            axles,
            seats,
            fuel_probs,
        },
    }
}

/// The 17 detailed vehicle classes used for the demo model
pub fn vehicle_catalog() -> Vec<ClassSpec> {
    use VehicleCategory::*;

    vec![
        // === Two-wheelers ===
        spec("Scooter", Bike, (1.6, 1.9), (1.1, 1.2), (0.65, 0.72), (100.0, 130.0), (6.0, 15.0), (60.0, 90.0), (2, 2), (2, 2), [0.05, 0.0, 0.85, 0.1]),
        spec("Standard_Motorcycle", Bike, (2.0, 2.2), (1.0, 1.15), (0.75, 0.85), (140.0, 220.0), (15.0, 50.0), (100.0, 140.0), (2, 2), (2, 2), [0.1, 0.0, 0.8, 0.1]),
        spec("Sports_Bike", Bike, (1.9, 2.1), (1.1, 1.2), (0.65, 0.75), (160.0, 220.0), (100.0, 220.0), (250.0, 320.0), (2, 2), (1, 2), [0.05, 0.0, 0.9, 0.05]),
        spec("Cruiser_Bike", Bike, (2.2, 2.5), (1.0, 1.2), (0.85, 1.0), (250.0, 350.0), (60.0, 120.0), (150.0, 190.0), (2, 2), (2, 2), [0.1, 0.0, 0.85, 0.05]),

        // === Cars ===
        spec("Hatchback", Car, (3.5, 4.2), (1.4, 1.6), (1.65, 1.8), (800.0, 1200.0), (70.0, 120.0), (150.0, 190.0), (2, 2), (4, 5), [0.2, 0.15, 0.5, 0.15]),
        spec("Sedan", Car, (4.3, 5.1), (1.35, 1.5), (1.75, 1.9), (1200.0, 1800.0), (120.0, 250.0), (180.0, 230.0), (2, 2), (4, 5), [0.3, 0.1, 0.45, 0.15]),
        spec("Luxury_Sedan", Car, (4.8, 5.5), (1.4, 1.55), (1.85, 2.0), (1600.0, 2200.0), (200.0, 400.0), (220.0, 280.0), (2, 2), (4, 5), [0.4, 0.05, 0.35, 0.2]),
        spec("Wagon", Car, (4.4, 5.0), (1.5, 1.7), (1.8, 1.95), (1300.0, 1900.0), (130.0, 220.0), (170.0, 210.0), (2, 2), (5, 7), [0.35, 0.1, 0.4, 0.15]),

        // === SUVs ===
        spec("Compact_SUV", Suv, (4.0, 4.5), (1.6, 1.75), (1.75, 1.9), (1300.0, 1700.0), (100.0, 160.0), (160.0, 190.0), (2, 2), (5, 5), [0.3, 0.15, 0.4, 0.15]),
        spec("Mid_Size_SUV", Suv, (4.5, 5.2), (1.7, 1.9), (1.85, 2.0), (1800.0, 2500.0), (150.0, 300.0), (170.0, 200.0), (2, 2), (5, 7), [0.4, 0.1, 0.35, 0.15]),
        spec("Full_Size_SUV", Suv, (5.0, 5.8), (1.8, 2.1), (1.95, 2.2), (2300.0, 3200.0), (250.0, 450.0), (180.0, 220.0), (2, 2), (6, 8), [0.5, 0.05, 0.3, 0.15]),

        // === Commercial ===
        spec("Pickup_Truck", Truck, (5.0, 6.2), (1.8, 2.0), (1.9, 2.1), (1800.0, 2800.0), (200.0, 350.0), (150.0, 180.0), (2, 2), (2, 5), [0.3, 0.05, 0.6, 0.05]),
        spec("Light_Truck", Truck, (5.5, 7.5), (2.2, 2.8), (1.9, 2.3), (3000.0, 8000.0), (150.0, 300.0), (90.0, 130.0), (2, 3), (2, 3), [0.7, 0.1, 0.15, 0.05]),
        spec("Heavy_Truck", Truck, (7.0, 20.0), (3.0, 4.2), (2.3, 2.8), (8000.0, 45000.0), (300.0, 700.0), (80.0, 120.0), (3, 8), (1, 3), [0.85, 0.05, 0.08, 0.02]),

        // === Buses ===
        spec("Mini_Bus", Bus, (6.0, 8.0), (2.3, 2.8), (2.0, 2.3), (3500.0, 6000.0), (120.0, 200.0), (120.0, 140.0), (2, 2), (12, 25), [0.5, 0.2, 0.2, 0.1]),
        spec("City_Bus", Bus, (9.0, 12.0), (2.8, 3.2), (2.4, 2.6), (8000.0, 15000.0), (200.0, 350.0), (80.0, 100.0), (2, 3), (25, 50), [0.7, 0.15, 0.1, 0.05]),
        spec("Coach_Bus", Bus, (11.0, 15.0), (3.2, 4.0), (2.5, 2.8), (15000.0, 25000.0), (350.0, 500.0), (90.0, 120.0), (3, 4), (40, 80), [0.8, 0.1, 0.08, 0.02]),
    ]
}

/// Coarse category of a label: either a category name itself or a catalog class
pub fn category_of(label: &str) -> Option<VehicleCategory> {
    VehicleCategory::ALL
        .into_iter()
        .find(|category| category.as_str() == label)
        .or_else(|| {
            vehicle_catalog()
                .into_iter()
                .find(|spec| spec.label == label)
                .map(|spec| spec.category)
        })
}

// ============================================================================
// GENERATION
// ============================================================================

/// Per-class share of a target total; the remainder is dropped
pub fn samples_per_class(total: usize, n_classes: usize) -> usize {
    if n_classes == 0 {
        0
    } else {
        total / n_classes
    }
}

pub fn generate<R: Rng + ?Sized>(
    specs: &[ClassSpec],
    samples_per_class: usize,
    rng: &mut R,
) -> Result<Vec<LabeledSample>, SyntheticError> {
    if specs.is_empty() {
        return Err(SyntheticError::EmptyCatalog);
    }
    for spec in specs {
        spec.validate()?;
    }

    let mut samples = Vec::with_capacity(specs.len() * samples_per_class);

    for spec in specs {
        let fuel_dist = WeightedIndex::new(spec.ranges.fuel_probs)
            .map_err(|_| SyntheticError::InvalidFuelProbabilities { label: spec.label.clone() })?;

        for _ in 0..samples_per_class {
            let attrs = draw_attributes(&spec.ranges, &fuel_dist, rng);
            samples.push(LabeledSample {
                features: encode(&attrs),
                label: spec.label.clone(),
            });
        }
    }

    Ok(samples)
}

pub fn generate_seeded(
    specs: &[ClassSpec],
    samples_per_class: usize,
    seed: u64,
) -> Result<Vec<LabeledSample>, SyntheticError> {
    let mut rng = StdRng::seed_from_u64(seed);
    generate(specs, samples_per_class, &mut rng)
}

// ============================================================================
// RULE-BASED GENERATION
// ============================================================================

/// Ranges covering every vehicle type at once, fuel uniform
pub fn broad_ranges() -> ParamRanges {
    ParamRanges {
        length: (2.0, 15.0),
        height: (1.2, 4.0),
        width: (1.5, 3.0),
        weight: (500.0, 40000.0),
        power: (50.0, 500.0),
        speed: (60.0, 300.0),
        axles: (2, 7),
        seats: (1, 59),
        fuel_probs: [0.25; 4],
    }
}

/// First matching rule wins; anything unmatched is a car
pub fn rule_label(length: f64, weight: f64, seats: i64) -> VehicleCategory {
    if length < 3.0 && seats <= 2 {
        VehicleCategory::Bike
    } else if length < 5.5 && weight < 2500.0 && seats <= 7 {
        VehicleCategory::Car
    } else if (5.0..=6.0).contains(&length) && weight < 3000.0 && seats <= 7 {
        VehicleCategory::Suv
    } else if length > 8.0 && seats > 20 {
        VehicleCategory::Bus
    } else if weight > 7500.0 {
        VehicleCategory::Truck
    } else {
        VehicleCategory::Car
    }
}

/// `n_samples` draws from `broad_ranges`, labelled with `rule_label`.
///
/// Rare categories may not appear at all for small `n_samples`.
pub fn generate_rule_based<R: Rng + ?Sized>(
    n_samples: usize,
    rng: &mut R,
) -> Result<Vec<LabeledSample>, SyntheticError> {
    let ranges = broad_ranges();
    let fuel_dist = WeightedIndex::new(ranges.fuel_probs).map_err(|_| {
        SyntheticError::InvalidFuelProbabilities {
            label: "rule-based".to_string(),
        }
    })?;

    Ok((0..n_samples)
        .map(|_| {
            let attrs = draw_attributes(&ranges, &fuel_dist, rng);
            let label = rule_label(attrs.length, attrs.weight, attrs.seats);
            LabeledSample {
                features: encode(&attrs),
                label: label.as_str().to_string(),
            }
        })
        .collect())
}

pub fn generate_rule_based_seeded(
    n_samples: usize,
    seed: u64,
) -> Result<Vec<LabeledSample>, SyntheticError> {
    let mut rng = StdRng::seed_from_u64(seed);
    generate_rule_based(n_samples, &mut rng)
}

fn draw_attributes<R: Rng + ?Sized>(
    ranges: &ParamRanges,
    fuel_dist: &WeightedIndex<f64>,
    rng: &mut R,
) -> VehicleAttributes {
    let length = uniform(ranges.length, rng);
    let height = uniform(ranges.height, rng);
    let width = uniform(ranges.width, rng);
    let weight = uniform(ranges.weight, rng);
    let engine_power = uniform(ranges.power, rng);
    let top_speed = uniform(ranges.speed, rng);
    let axle_count = uniform_int(ranges.axles, rng);
    let seats = uniform_int(ranges.seats, rng);
    let fuel = FuelType::ALL[fuel_dist.sample(rng)];

    VehicleAttributes {
        length,
        height,
        width,
        weight,
        engine_power,
        top_speed,
        axle_count: i64::from(axle_count),
        seats: i64::from(seats),
        fuel_type: fuel.as_str().to_string(),
    }
}

/// Half-open [lo, hi); a degenerate range returns its bound
fn uniform<R: Rng + ?Sized>((lo, hi): (f64, f64), rng: &mut R) -> f64 {
    if lo < hi {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}

/// Inclusive [lo, hi]; a degenerate range consumes no randomness
fn uniform_int<R: Rng + ?Sized>((lo, hi): (u32, u32), rng: &mut R) -> u32 {
    if lo == hi {
        lo
    } else {
        rng.gen_range(lo..=hi)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_is_valid() {
        let catalog = vehicle_catalog();
        assert_eq!(catalog.len(), 17);
        for spec in &catalog {
            assert!(spec.validate().is_ok(), "{} is invalid", spec.label);
        }
    }

    #[test]
    fn test_sample_count_and_labels() {
        let catalog = vehicle_catalog();
        let samples = generate_seeded(&catalog, 100, 42).unwrap();

        assert_eq!(samples.len(), 100 * catalog.len());
        for (i, spec) in catalog.iter().enumerate() {
            let block = &samples[i * 100..(i + 1) * 100];
            assert!(block.iter().all(|s| s.label == spec.label));
        }
    }

    #[test]
    fn test_same_seed_reproduces_bit_for_bit() {
        let catalog = vehicle_catalog();
        let a = generate_seeded(&catalog, 20, 42).unwrap();
        let b = generate_seeded(&catalog, 20, 42).unwrap();
        assert_eq!(a, b);

        let c = generate_seeded(&catalog, 20, 43).unwrap();
        assert_eq!(c.len(), a.len());
        assert_ne!(a, c);
    }

    #[test]
    fn test_samples_stay_in_range() {
        let catalog = vehicle_catalog();
        let samples = generate_seeded(&catalog, 50, 7).unwrap();

        for (i, spec) in catalog.iter().enumerate() {
            let r = &spec.ranges;
            for s in &samples[i * 50..(i + 1) * 50] {
                let v = s.features.values;
                assert!(v[0] >= r.length.0 && v[0] < r.length.1);
                assert!(v[3] >= r.weight.0 && v[3] < r.weight.1);
                assert!(v[6] >= r.axles.0 as f64 && v[6] <= r.axles.1 as f64);
                assert!(v[7] >= r.seats.0 as f64 && v[7] <= r.seats.1 as f64);
                assert_eq!(s.features.fuel_slots().iter().sum::<f64>(), 1.0);
            }
        }
    }

    #[test]
    fn test_zero_probability_fuel_never_drawn() {
        let catalog = vehicle_catalog();
        let scooter = catalog.iter().find(|s| s.label == "Scooter").unwrap().clone();
        let samples = generate_seeded(&[scooter], 200, 1).unwrap();

        // electric has probability 0 for scooters
        assert!(samples.iter().all(|s| s.features.fuel_slots()[1] == 0.0));
    }

    #[test]
    fn test_degenerate_ranges() {
        let mut fixed = vehicle_catalog()[0].clone();
        fixed.ranges.length = (2.0, 2.0);
        fixed.ranges.seats = (3, 3);

        let samples = generate_seeded(&[fixed], 10, 5).unwrap();
        assert!(samples.iter().all(|s| s.features.values[0] == 2.0));
        assert!(samples.iter().all(|s| s.features.values[7] == 3.0));
    }

    #[test]
    fn test_invalid_specs_are_rejected() {
        assert_eq!(
            generate_seeded(&[], 10, 1),
            Err(SyntheticError::EmptyCatalog)
        );

        let mut inverted = vehicle_catalog()[0].clone();
        inverted.ranges.weight = (200.0, 100.0);
        assert!(matches!(
            generate_seeded(&[inverted], 10, 1),
            Err(SyntheticError::InvalidRange { field: "weight", .. })
        ));

        let mut bad_fuel = vehicle_catalog()[0].clone();
        bad_fuel.ranges.fuel_probs = [0.5, 0.5, 0.5, 0.0];
        assert!(matches!(
            generate_seeded(&[bad_fuel], 10, 1),
            Err(SyntheticError::InvalidFuelProbabilities { .. })
        ));
    }

    #[test]
    fn test_samples_per_class_drops_remainder() {
        assert_eq!(samples_per_class(2000, 17), 117);
        assert_eq!(samples_per_class(100, 3), 33);
        assert_eq!(samples_per_class(10, 0), 0);
    }

    #[test]
    fn test_category_lookup() {
        assert_eq!(category_of("City_Bus"), Some(VehicleCategory::Bus));
        assert_eq!(category_of("Sports_Bike"), Some(VehicleCategory::Bike));
        assert_eq!(category_of("SUV"), Some(VehicleCategory::Suv));
        assert_eq!(category_of("Truck"), Some(VehicleCategory::Truck));
        assert_eq!(category_of("Hovercraft"), None);
    }

    #[test]
    fn test_rule_labels() {
        assert_eq!(rule_label(2.0, 200.0, 1), VehicleCategory::Bike);
        assert_eq!(rule_label(4.5, 1500.0, 5), VehicleCategory::Car);
        assert_eq!(rule_label(5.8, 2800.0, 7), VehicleCategory::Suv);
        assert_eq!(rule_label(12.0, 15000.0, 50), VehicleCategory::Bus);
        assert_eq!(rule_label(8.5, 12000.0, 2), VehicleCategory::Truck);
        // short but too many seats for a bike, too heavy for a car
        assert_eq!(rule_label(2.5, 5000.0, 10), VehicleCategory::Car);
    }

    #[test]
    fn test_rule_based_samples_follow_rules() {
        let samples = generate_rule_based_seeded(500, 42).unwrap();
        assert_eq!(samples.len(), 500);

        let ranges = broad_ranges();
        for s in &samples {
            let v = s.features.values;
            assert!(v[0] >= ranges.length.0 && v[0] < ranges.length.1);
            assert!(v[6] >= 2.0 && v[6] <= 7.0);
            assert!(v[7] >= 1.0 && v[7] <= 59.0);
            assert_eq!(s.features.fuel_slots().iter().sum::<f64>(), 1.0);
            assert_eq!(s.label, rule_label(v[0], v[3], v[7] as i64).as_str());
        }

        assert_eq!(samples, generate_rule_based_seeded(500, 42).unwrap());
    }
}
