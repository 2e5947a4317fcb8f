//! Treatment suggestions for the top-ranked condition.
//!
//! Static over-the-counter medicine and home-care tables keyed by `Condition`.
//! Nothing here feeds back into the suggestion engine.

use serde::{Deserialize, Serialize};

use crate::suggestions::{Condition, Suggestion};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MedicineKind {
    #[serde(rename = "OTC")]
    OverTheCounter,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medicine {
    pub name: String,
    pub kind: MedicineKind,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
    pub warnings: Vec<String>,
    pub category: String,
}

/// What the results view shows under the primary suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreatmentPlan {
    pub condition: Condition,
    pub medicines: Vec<Medicine>,
    pub home_remedies: Vec<String>,
}

fn otc(
    name: &str,
    dosage: &str,
    frequency: &str,
    duration: &str,
    warnings: &[&str],
    category: &str,
) -> Medicine {
    Medicine {
        name: name.to_string(),
        kind: MedicineKind::OverTheCounter,
        dosage: dosage.to_string(),
        frequency: frequency.to_string(),
        duration: duration.to_string(),
        warnings: warnings.iter().map(|w| w.to_string()).collect(),
        category: category.to_string(),
    }
}

/// Over-the-counter options. Empty for conditions that need a clinician.
pub fn otc_medicines(condition: Condition) -> Vec<Medicine> {
    match condition {
        Condition::CommonColdOrFlu => vec![
            otc(
                "Acetaminophen (Tylenol)", "500-1000mg", "Every 6-8 hours", "3-5 days",
                &["Do not exceed 4000mg per day", "Avoid alcohol"], "Pain Relief",
            ),
            otc(
                "Ibuprofen (Advil, Motrin)", "200-400mg", "Every 6 hours", "3-5 days",
                &["Take with food", "Avoid if allergic to NSAIDs"], "Anti-inflammatory",
            ),
            otc(
                "Dextromethorphan (Robitussin DM)", "15-30mg", "Every 4 hours", "7 days max",
                &["Do not exceed recommended dose", "May cause drowsiness"], "Cough Suppressant",
            ),
        ],
        Condition::Gastroenteritis => vec![
            otc(
                "Loperamide (Imodium)", "2mg", "After each loose stool", "2 days max",
                &["Do not use if fever present", "Maximum 8mg per day"], "Anti-diarrheal",
            ),
            otc(
                "Oral Rehydration Solution", "200-400ml", "After each episode", "Until symptoms resolve",
                &["Follow package instructions"], "Rehydration",
            ),
        ],
        Condition::TensionHeadache => vec![
            otc(
                "Acetaminophen (Tylenol)", "500-1000mg", "Every 6 hours", "3 days max",
                &["Do not exceed daily limit"], "Pain Relief",
            ),
            otc(
                "Aspirin", "325-650mg", "Every 4 hours", "3 days max",
                &["Take with food", "Avoid if under 18"], "Pain Relief",
            ),
        ],
        Condition::AllergicReaction => vec![
            otc(
                "Loratadine (Claritin)", "10mg", "Once daily", "As needed",
                &["May cause mild drowsiness"], "Antihistamine",
            ),
            otc(
                "Diphenhydramine (Benadryl)", "25-50mg", "Every 6 hours", "As needed",
                &["Causes drowsiness", "Do not drive"], "Antihistamine",
            ),
        ],
        Condition::Migraine | Condition::GeneralEvaluation => Vec::new(),
    }
}

const DEFAULT_HOME_REMEDIES: &[&str] = &[
    "Stay hydrated with plenty of water",
    "Get adequate rest and sleep",
    "Eat nutritious, easily digestible foods",
    "Monitor symptoms and track changes",
];

/// Home-care advice; conditions without a dedicated list get general advice.
pub fn home_remedies(condition: Condition) -> &'static [&'static str] {
    match condition {
        Condition::CommonColdOrFlu => &[
            "Drink plenty of warm fluids like tea with honey",
            "Gargle with warm salt water for sore throat",
            "Use a humidifier or breathe steam from hot shower",
            "Get adequate rest (7-9 hours of sleep)",
            "Eat chicken soup for hydration and comfort",
        ],
        Condition::Gastroenteritis => &[
            "Follow BRAT diet (Bananas, Rice, Applesauce, Toast)",
            "Drink clear fluids in small, frequent sips",
            "Avoid dairy, caffeine, alcohol, and fatty foods",
            "Rest and avoid solid foods until vomiting stops",
            "Try ginger tea for nausea relief",
        ],
        Condition::TensionHeadache => &[
            "Apply cold or warm compress to head/neck",
            "Practice relaxation techniques and deep breathing",
            "Massage temples and neck muscles gently",
            "Stay hydrated and maintain regular sleep schedule",
            "Reduce screen time and take breaks from work",
        ],
        Condition::AllergicReaction => &[
            "Identify and avoid known allergens",
            "Use saline nasal rinse to clear allergens",
            "Keep windows closed during high pollen days",
            "Shower after being outdoors",
            "Use HEPA air filters in your home",
        ],
        Condition::Migraine | Condition::GeneralEvaluation => DEFAULT_HOME_REMEDIES,
    }
}

pub fn plan_for(condition: Condition) -> TreatmentPlan {
    TreatmentPlan {
        condition,
        medicines: otc_medicines(condition),
        home_remedies: home_remedies(condition).iter().map(|r| r.to_string()).collect(),
    }
}

/// Plan for the first (highest-ranked) suggestion, if any.
pub fn treatment_plan(suggestions: &[Suggestion]) -> Option<TreatmentPlan> {
    suggestions.first().map(|primary| plan_for(primary.condition))
}
