// src/models.rs
// Result payloads and action-plan types shared by the generator, pipeline and API.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Priority of a single action item. Declaration order is the sort order,
/// so `High` comes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(format!("Unknown priority: {}", other)),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of professional a reader may want to contact for an action item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfessionalType {
    ImmigrationLawyer,
    TaxAdvisor,
    MedicalInterpreter,
    HousingAdvisor,
    FamilyLawAttorney,
    BenefitsCounselor,
}

impl ProfessionalType {
    pub const ALL: [ProfessionalType; 6] = [
        ProfessionalType::ImmigrationLawyer,
        ProfessionalType::TaxAdvisor,
        ProfessionalType::MedicalInterpreter,
        ProfessionalType::HousingAdvisor,
        ProfessionalType::FamilyLawAttorney,
        ProfessionalType::BenefitsCounselor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProfessionalType::ImmigrationLawyer => "immigration_lawyer",
            ProfessionalType::TaxAdvisor => "tax_advisor",
            ProfessionalType::MedicalInterpreter => "medical_interpreter",
            ProfessionalType::HousingAdvisor => "housing_advisor",
            ProfessionalType::FamilyLawAttorney => "family_law_attorney",
            ProfessionalType::BenefitsCounselor => "benefits_counselor",
        }
    }
}

impl FromStr for ProfessionalType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| format!("Unknown professional type: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionItem {
    pub step: String,
    pub description: String,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub professional_type: Option<ProfessionalType>,
}

impl ActionItem {
    pub fn new(
        step: impl Into<String>,
        description: impl Into<String>,
        priority: Priority,
        professional_type: Option<ProfessionalType>,
    ) -> Self {
        Self {
            step: step.into(),
            description: description.into(),
            priority,
            professional_type,
        }
    }
}

/// Output of a plan generator before translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPlan {
    pub summary: String,
    pub action_plan: Vec<ActionItem>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingResult {
    pub success: bool,
    pub translated_summary: String,
    pub action_plan: Vec<ActionItem>,
    pub target_language: String,
    pub summary_length: usize,
    pub original_length: usize,
    pub timestamp: String,
}

impl ProcessingResult {
    pub fn new(
        translated_summary: String,
        action_plan: Vec<ActionItem>,
        target_language: impl Into<String>,
        original_length: usize,
    ) -> Self {
        let summary_length = translated_summary.chars().count();
        Self {
            success: true,
            translated_summary,
            action_plan,
            target_language: target_language.into(),
            summary_length,
            original_length,
            timestamp: now_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessingError {
    pub success: bool,
    pub error: String,
    pub timestamp: String,
    /// Pipeline stage that failed; `None` for rejections before the pipeline ran
    #[serde(skip)]
    pub stage: Option<&'static str>,
}

impl ProcessingError {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            timestamp: now_rfc3339(),
            stage: None,
        }
    }

    pub fn at_stage(stage: &'static str, error: impl Into<String>) -> Self {
        Self {
            stage: Some(stage),
            ..Self::new(error)
        }
    }
}

/// Exactly one of these is produced per pipeline run.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ProcessingOutcome {
    Success(ProcessingResult),
    Failure(ProcessingError),
}

impl ProcessingOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ProcessingOutcome::Success(_))
    }
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}
