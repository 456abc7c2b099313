//! Nutrient catalogue and per-meal totals
//!
//! Reference values are defined on a 100 g basis. `NutrientTotals` carries the
//! subset that is summed per meal and compared against `RECOMMENDED_PER_MEAL`.

use serde::{Deserialize, Serialize};

/// Every nutrient column the reference table can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Nutrient {
    Energy,
    Protein,
    Fat,
    Carbohydrate,
    Sugar,
    DietaryFiber,
    Sodium,
    VitaminA,
    VitaminB12,
    VitaminC,
    VitaminD,
    VitaminE,
    TotalFattyAcids,
    EssentialFattyAcids,
    SaturatedFattyAcids,
    UnsaturatedFattyAcids,
    TransFattyAcids,
    SaltEquivalent,
    RefuseRate,
}

impl Nutrient {
    pub const COUNT: usize = 19;

    pub const ALL: [Nutrient; Nutrient::COUNT] = [
        Nutrient::Energy,
        Nutrient::Protein,
        Nutrient::Fat,
        Nutrient::Carbohydrate,
        Nutrient::Sugar,
        Nutrient::DietaryFiber,
        Nutrient::Sodium,
        Nutrient::VitaminA,
        Nutrient::VitaminB12,
        Nutrient::VitaminC,
        Nutrient::VitaminD,
        Nutrient::VitaminE,
        Nutrient::TotalFattyAcids,
        Nutrient::EssentialFattyAcids,
        Nutrient::SaturatedFattyAcids,
        Nutrient::UnsaturatedFattyAcids,
        Nutrient::TransFattyAcids,
        Nutrient::SaltEquivalent,
        Nutrient::RefuseRate,
    ];

    /// Position in `ALL`, used as the storage slot in `NutrientValues`
    pub fn index(self) -> usize {
        self as usize
    }

    /// Column header used by the Korean food composition tables
    pub fn column_header(self) -> &'static str {
        match self {
            Nutrient::Energy => "에너지",
            Nutrient::Protein => "단백질",
            Nutrient::Fat => "지방",
            Nutrient::Carbohydrate => "탄수화물",
            Nutrient::Sugar => "당류",
            Nutrient::DietaryFiber => "총 식이섬유",
            Nutrient::Sodium => "나트륨",
            Nutrient::VitaminA => "비타민 A",
            Nutrient::VitaminB12 => "비타민 B12",
            Nutrient::VitaminC => "비타민 C",
            Nutrient::VitaminD => "비타민 D",
            Nutrient::VitaminE => "비타민 E",
            Nutrient::TotalFattyAcids => "총 지방산",
            Nutrient::EssentialFattyAcids => "총 필수 지방산",
            Nutrient::SaturatedFattyAcids => "총 포화 지방산",
            Nutrient::UnsaturatedFattyAcids => "총 불포화 지방산",
            Nutrient::TransFattyAcids => "총 트랜스 지방산",
            Nutrient::SaltEquivalent => "식염상당량",
            Nutrient::RefuseRate => "폐기율",
        }
    }

    /// snake_case alias accepted as a column name
    pub fn key(self) -> &'static str {
        match self {
            Nutrient::Energy => "energy",
            Nutrient::Protein => "protein",
            Nutrient::Fat => "fat",
            Nutrient::Carbohydrate => "carbohydrate",
            Nutrient::Sugar => "sugar",
            Nutrient::DietaryFiber => "dietary_fiber",
            Nutrient::Sodium => "sodium",
            Nutrient::VitaminA => "vitamin_a",
            Nutrient::VitaminB12 => "vitamin_b12",
            Nutrient::VitaminC => "vitamin_c",
            Nutrient::VitaminD => "vitamin_d",
            Nutrient::VitaminE => "vitamin_e",
            Nutrient::TotalFattyAcids => "total_fatty_acids",
            Nutrient::EssentialFattyAcids => "essential_fatty_acids",
            Nutrient::SaturatedFattyAcids => "saturated_fatty_acids",
            Nutrient::UnsaturatedFattyAcids => "unsaturated_fatty_acids",
            Nutrient::TransFattyAcids => "trans_fatty_acids",
            Nutrient::SaltEquivalent => "salt_equivalent",
            Nutrient::RefuseRate => "refuse_rate",
        }
    }

    /// Match a (trimmed) column name against the header or the alias
    pub fn from_column(name: &str) -> Option<Self> {
        Nutrient::ALL
            .into_iter()
            .find(|n| n.column_header() == name || n.key().eq_ignore_ascii_case(name))
    }
}

/// Nutrient totals for one meal
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutrientTotals {
    pub energy: f64,        // kcal
    pub carbohydrate: f64,  // grams
    pub protein: f64,       // grams
    pub fat: f64,           // grams
    pub sugar: f64,         // grams
    pub fiber: f64,         // grams
    pub saturated_fat: f64, // grams
    pub trans_fat: f64,     // grams
}

/// Per-meal reference intake for an average adult
pub const RECOMMENDED_PER_MEAL: NutrientTotals = NutrientTotals {
    energy: 700.0,
    carbohydrate: 45.0,
    protein: 20.0,
    fat: 15.0,
    sugar: 16.0,
    fiber: 8.0,
    saturated_fat: 5.0,
    trans_fat: 0.8,
};

/// How a tracked nutrient is reported back to the caller and the model
#[derive(Debug, Clone, Copy)]
pub struct TrackedNutrient {
    pub nutrient: Nutrient,
    pub label: &'static str,
    pub unit: &'static str,
    /// The recommended value is a ceiling rather than a target
    pub upper_limit: bool,
}

impl TrackedNutrient {
    const fn new(
        nutrient: Nutrient,
        label: &'static str,
        unit: &'static str,
        upper_limit: bool,
    ) -> Self {
        Self {
            nutrient,
            label,
            unit,
            upper_limit,
        }
    }
}

impl NutrientTotals {
    pub const TRACKED: [TrackedNutrient; 8] = [
        TrackedNutrient::new(Nutrient::Energy, "Energy", "kcal", false),
        TrackedNutrient::new(Nutrient::Carbohydrate, "Carbohydrate", "g", false),
        TrackedNutrient::new(Nutrient::Protein, "Protein", "g", false),
        TrackedNutrient::new(Nutrient::Fat, "Fat", "g", false),
        TrackedNutrient::new(Nutrient::Sugar, "Sugar", "g", true),
        TrackedNutrient::new(Nutrient::DietaryFiber, "Dietary fiber", "g", false),
        TrackedNutrient::new(Nutrient::SaturatedFattyAcids, "Saturated fat", "g", true),
        TrackedNutrient::new(Nutrient::TransFattyAcids, "Trans fat", "g", true),
    ];

    pub fn zero() -> Self {
        Self::default()
    }

    /// Value of a tracked nutrient; `None` for nutrients outside the subset
    pub fn get(&self, nutrient: Nutrient) -> Option<f64> {
        match nutrient {
            Nutrient::Energy => Some(self.energy),
            Nutrient::Carbohydrate => Some(self.carbohydrate),
            Nutrient::Protein => Some(self.protein),
            Nutrient::Fat => Some(self.fat),
            Nutrient::Sugar => Some(self.sugar),
            Nutrient::DietaryFiber => Some(self.fiber),
            Nutrient::SaturatedFattyAcids => Some(self.saturated_fat),
            Nutrient::TransFattyAcids => Some(self.trans_fat),
            _ => None,
        }
    }

    /// Pick the tracked subset out of a full per-100g profile
    pub fn from_values(values: &NutrientValues) -> Self {
        Self {
            energy: values.get(Nutrient::Energy),
            carbohydrate: values.get(Nutrient::Carbohydrate),
            protein: values.get(Nutrient::Protein),
            fat: values.get(Nutrient::Fat),
            sugar: values.get(Nutrient::Sugar),
            fiber: values.get(Nutrient::DietaryFiber),
            saturated_fat: values.get(Nutrient::SaturatedFattyAcids),
            trans_fat: values.get(Nutrient::TransFattyAcids),
        }
    }

    pub fn scale(&self, multiplier: f64) -> Self {
        Self {
            energy: self.energy * multiplier,
            carbohydrate: self.carbohydrate * multiplier,
            protein: self.protein * multiplier,
            fat: self.fat * multiplier,
            sugar: self.sugar * multiplier,
            fiber: self.fiber * multiplier,
            saturated_fat: self.saturated_fat * multiplier,
            trans_fat: self.trans_fat * multiplier,
        }
    }

    pub fn add(&self, other: &NutrientTotals) -> Self {
        Self {
            energy: self.energy + other.energy,
            carbohydrate: self.carbohydrate + other.carbohydrate,
            protein: self.protein + other.protein,
            fat: self.fat + other.fat,
            sugar: self.sugar + other.sugar,
            fiber: self.fiber + other.fiber,
            saturated_fat: self.saturated_fat + other.saturated_fat,
            trans_fat: self.trans_fat + other.trans_fat,
        }
    }
}

impl std::ops::Add for NutrientTotals {
    type Output = NutrientTotals;

    fn add(self, other: NutrientTotals) -> NutrientTotals {
        NutrientTotals::add(&self, &other)
    }
}

impl std::ops::Mul<f64> for NutrientTotals {
    type Output = NutrientTotals;

    fn mul(self, multiplier: f64) -> NutrientTotals {
        self.scale(multiplier)
    }
}

impl std::iter::Sum for NutrientTotals {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(NutrientTotals::zero(), |acc, n| acc + n)
    }
}

/// Full nutrient profile of one reference row, per 100 g
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NutrientValues([f64; Nutrient::COUNT]);

impl NutrientValues {
    pub fn get(&self, nutrient: Nutrient) -> f64 {
        self.0[nutrient.index()]
    }

    /// Store a value; anything that is not a finite non-negative number is kept as 0
    pub fn set(&mut self, nutrient: Nutrient, value: f64) {
        self.0[nutrient.index()] = if value.is_finite() && value >= 0.0 {
            value
        } else {
            0.0
        };
    }

    pub fn with(mut self, nutrient: Nutrient, value: f64) -> Self {
        self.set(nutrient, value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nutrient_index_matches_all_order() {
        for (i, n) in Nutrient::ALL.iter().enumerate() {
            assert_eq!(n.index(), i);
        }
    }

    #[test]
    fn test_from_column_accepts_header_and_alias() {
        assert_eq!(Nutrient::from_column("에너지"), Some(Nutrient::Energy));
        assert_eq!(Nutrient::from_column("총 포화 지방산"), Some(Nutrient::SaturatedFattyAcids));
        assert_eq!(Nutrient::from_column("Vitamin_C"), Some(Nutrient::VitaminC));
        assert_eq!(Nutrient::from_column("식품명"), None);
    }

    #[test]
    fn test_values_reject_invalid_numbers() {
        let values = NutrientValues::default()
            .with(Nutrient::Energy, f64::NAN)
            .with(Nutrient::Protein, -3.0)
            .with(Nutrient::Fat, 2.5);
        assert_eq!(values.get(Nutrient::Energy), 0.0);
        assert_eq!(values.get(Nutrient::Protein), 0.0);
        assert_eq!(values.get(Nutrient::Fat), 2.5);
    }

    #[test]
    fn test_scale_and_sum() {
        let values = NutrientValues::default()
            .with(Nutrient::Energy, 100.0)
            .with(Nutrient::TransFattyAcids, 0.2);
        let one = NutrientTotals::from_values(&values);
        let total: NutrientTotals = vec![one.scale(1.5), one * 0.5].into_iter().sum();
        assert!((total.energy - 200.0).abs() < 1e-9);
        assert!((total.trans_fat - 0.4).abs() < 1e-9);
        assert_eq!(total.protein, 0.0);
    }

    #[test]
    fn test_tracked_subset_is_readable() {
        for tracked in NutrientTotals::TRACKED {
            assert!(RECOMMENDED_PER_MEAL.get(tracked.nutrient).is_some());
        }
        assert_eq!(RECOMMENDED_PER_MEAL.get(Nutrient::Sodium), None);
    }

    #[test]
    fn test_totals_serialize_with_flat_keys() {
        let json = serde_json::to_value(RECOMMENDED_PER_MEAL).unwrap();
        assert_eq!(json["energy"], 700.0);
        assert_eq!(json["saturated_fat"], 5.0);
        assert_eq!(json["trans_fat"], 0.8);
    }
}
