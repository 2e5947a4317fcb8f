//! Fixed suggestion records, one per condition.

use super::{Condition, Severity, Suggestion};

fn record(
    condition: Condition,
    probability: u8,
    description: &str,
    severity: Severity,
    category: &str,
    symptoms: &[&str],
    recommendations: &[&str],
) -> Suggestion {
    Suggestion {
        condition,
        probability,
        description: description.to_string(),
        severity,
        category: category.to_string(),
        symptoms: symptoms.iter().map(|s| s.to_string()).collect(),
        recommendations: recommendations.iter().map(|s| s.to_string()).collect(),
    }
}

/// The literal record a rule emits for `condition`.
pub fn suggestion_for(condition: Condition) -> Suggestion {
    match condition {
        Condition::CommonColdOrFlu => record(
            condition,
            85,
            "Viral upper respiratory infection commonly affecting the nose, throat, and airways.",
            Severity::Low,
            "Respiratory",
            &["Fever", "Cough", "Runny nose", "Body aches"],
            &["Rest and fluids", "OTC pain relievers", "Throat lozenges", "Monitor symptoms"],
        ),
        Condition::Gastroenteritis => record(
            condition,
            75,
            "Inflammation of the stomach and intestines, often caused by viral or bacterial infection.",
            Severity::Medium,
            "Digestive",
            &["Nausea", "Vomiting", "Diarrhea", "Abdominal pain"],
            &["Stay hydrated", "BRAT diet", "Electrolyte replacement", "Avoid dairy"],
        ),
        Condition::TensionHeadache => record(
            condition,
            70,
            "Most common type of headache, often caused by stress, fatigue, or muscle tension.",
            Severity::Low,
            "Neurological",
            &["Headache", "Neck tension", "Mild sensitivity to light"],
            &["Rest in dark room", "OTC pain relievers", "Hydration", "Stress management"],
        ),
        Condition::Migraine => record(
            condition,
            60,
            "Intense headache disorder that can cause severe throbbing pain, often on one side of the head.",
            Severity::High,
            "Neurological",
            &["Severe headache", "Nausea", "Light sensitivity", "Sound sensitivity"],
            &["Dark, quiet environment", "Cold compress", "Prescription medication", "Avoid triggers"],
        ),
        Condition::AllergicReaction => record(
            condition,
            65,
            "Immune system response to allergens like pollen, dust, or certain foods.",
            Severity::Low,
            "Immunological",
            &["Runny nose", "Sneezing", "Itchy eyes", "Congestion"],
            &["Antihistamines", "Avoid allergens", "Nasal saline rinse", "Monitor symptoms"],
        ),
        Condition::GeneralEvaluation => record(
            condition,
            50,
            "Your symptoms require professional medical evaluation for accurate diagnosis.",
            Severity::Medium,
            "General",
            &["Various symptoms reported"],
            &["Schedule medical appointment", "Monitor symptoms", "Keep symptom diary", "Stay hydrated"],
        ),
    }
}
