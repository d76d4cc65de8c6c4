// src/generator.rs
// Summary + action-plan generation. Model output is untrusted and is checked
// field by field before anything downstream sees it.

use crate::error::GenerationError;
use crate::llm::LLMProvider;
use crate::models::{ActionItem, GeneratedPlan, Priority, ProfessionalType};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info};

/// Produces a summary and action plan for an extracted document.
#[async_trait]
pub trait PlanGenerator: Send + Sync {
    async fn generate(&self, document_text: &str) -> Result<GeneratedPlan, GenerationError>;

    fn name(&self) -> &str;
}

const PROMPT_TEMPLATE: &str = r#"You are helping a person who is not a native English speaker understand an official document.
Read the document below and respond with JSON only. Do not add any text before or after the JSON.

The JSON must have exactly this shape:
{
  "summary": "string",
  "actionPlan": [
    {
      "step": "short title of the step",
      "description": "what to do and why, in one or two sentences",
      "priority": "high" | "medium" | "low",
      "professionalType": "immigration_lawyer" | "tax_advisor" | "medical_interpreter" | "housing_advisor" | "family_law_attorney" | "benefits_counselor" | "none"
    }
  ]
}

Rules:
- The summary is written in plain, simple English and is between 150 and 400 words.
- Explain deadlines, amounts, names of offices and what happens if the reader does nothing.
- The action plan has between 3 and 5 items, ordered with high priority items first.
- Use "professionalType" only when the reader should contact that kind of professional; otherwise use "none".

Document:
"""
{document}
"""
"#;

/// Fill the fixed instruction template with the document text, verbatim.
pub fn build_prompt(document_text: &str) -> String {
    PROMPT_TEMPLATE.replace("{document}", document_text)
}

/// Generator backed by a remote model
pub struct LlmPlanGenerator {
    provider: Arc<dyn LLMProvider>,
}

impl LlmPlanGenerator {
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl PlanGenerator for LlmPlanGenerator {
    async fn generate(&self, document_text: &str) -> Result<GeneratedPlan, GenerationError> {
        let prompt = build_prompt(document_text);
        debug!(
            model = %self.provider.model_name(),
            prompt_len = prompt.len(),
            "Requesting summary and action plan"
        );

        let raw = self.provider.generate_json(&prompt).await?;
        let plan = parse_plan(&raw)?;

        info!(
            model = %self.provider.model_name(),
            summary_len = plan.summary.chars().count(),
            action_items = plan.action_plan.len(),
            "Plan generated"
        );
        Ok(plan)
    }

    fn name(&self) -> &str {
        self.provider.model_name()
    }
}

/// Parse and validate a raw model answer into a plan.
///
/// A Markdown code fence around the JSON is tolerated; anything else that
/// deviates from the expected shape rejects the whole answer.
pub fn parse_plan(raw: &str) -> Result<GeneratedPlan, GenerationError> {
    let body = strip_code_fence(raw);
    if body.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    let value: Value = serde_json::from_str(body)?;
    let root = value
        .as_object()
        .ok_or_else(|| schema("response is not a JSON object"))?;

    let summary = root
        .get("summary")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| schema("\"summary\" must be a non-empty string"))?
        .to_string();

    let items = root
        .get("actionPlan")
        .and_then(Value::as_array)
        .ok_or_else(|| schema("\"actionPlan\" must be an array"))?;

    let mut action_plan = items
        .iter()
        .enumerate()
        .map(|(i, item)| parse_action_item(i, item))
        .collect::<Result<Vec<_>, _>>()?;

    // Stable, so the model's order survives within a priority
    action_plan.sort_by_key(|item| item.priority);

    Ok(GeneratedPlan {
        summary,
        action_plan,
    })
}

fn parse_action_item(index: usize, value: &Value) -> Result<ActionItem, GenerationError> {
    let obj = value
        .as_object()
        .ok_or_else(|| schema(format!("actionPlan[{}] is not an object", index)))?;

    let step = required_str(obj, index, "step")?;
    let description = required_str(obj, index, "description")?;
    if step.is_empty() || description.is_empty() {
        return Err(schema(format!(
            "actionPlan[{}] has an empty step or description",
            index
        )));
    }

    let priority = required_str(obj, index, "priority")?
        .parse::<Priority>()
        .map_err(|e| schema(format!("actionPlan[{}].priority: {}", index, e)))?;

    let professional_type = match obj.get("professionalType") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() || s.trim().eq_ignore_ascii_case("none") => {
            None
        }
        Some(Value::String(s)) => Some(
            s.parse::<ProfessionalType>()
                .map_err(|e| schema(format!("actionPlan[{}].professionalType: {}", index, e)))?,
        ),
        Some(_) => {
            return Err(schema(format!(
                "actionPlan[{}].professionalType must be a string",
                index
            )))
        }
    };

    Ok(ActionItem {
        step,
        description,
        priority,
        professional_type,
    })
}

fn required_str(
    obj: &Map<String, Value>,
    index: usize,
    field: &str,
) -> Result<String, GenerationError> {
    obj.get(field)
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .ok_or_else(|| schema(format!("actionPlan[{}].{} must be a string", index, field)))
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an optional language tag on the opening fence line
    let rest = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn schema(msg: impl Into<String>) -> GenerationError {
    GenerationError::Schema(msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LLMError;
    use serde_json::json;

    fn valid_response() -> String {
        json!({
            "summary": "You have a medical appointment on March 5th.",
            "actionPlan": [
                {"step": "Prepare documents", "description": "Find your ID card.", "priority": "medium", "professionalType": "none"},
                {"step": "Attend appointment", "description": "Go to the clinic on March 5th.", "priority": "high", "professionalType": "medical_interpreter"},
                {"step": "Follow up", "description": "Call if you need to reschedule.", "priority": "low"}
            ]
        })
        .to_string()
    }

    #[test]
    fn test_prompt_embeds_document_verbatim() {
        let prompt = build_prompt("Patient has an appointment on March 5th. Bring ID.");
        assert!(prompt.contains("\"\"\"\nPatient has an appointment on March 5th. Bring ID.\n\"\"\""));
        assert!(prompt.contains("JSON only"));
        assert!(prompt.contains("benefits_counselor"));
        assert!(!prompt.contains("{document}"));
    }

    #[test]
    fn test_parse_valid_plan_orders_by_priority() {
        let plan = parse_plan(&valid_response()).unwrap();
        assert_eq!(plan.summary, "You have a medical appointment on March 5th.");
        let priorities: Vec<_> = plan.action_plan.iter().map(|i| i.priority).collect();
        assert_eq!(priorities, vec![Priority::High, Priority::Medium, Priority::Low]);
        assert_eq!(
            plan.action_plan[0].professional_type,
            Some(ProfessionalType::MedicalInterpreter)
        );
        assert_eq!(plan.action_plan[1].professional_type, None);
        assert_eq!(plan.action_plan[2].professional_type, None);
    }

    #[test]
    fn test_code_fence_is_tolerated() {
        let fenced = format!("```json\n{}\n```", valid_response());
        assert!(parse_plan(&fenced).is_ok());
    }

    #[test]
    fn test_empty_response() {
        assert!(matches!(parse_plan("  "), Err(GenerationError::EmptyResponse)));
    }

    #[test]
    fn test_not_json() {
        assert!(matches!(
            parse_plan("Here is your summary!"),
            Err(GenerationError::MalformedJson(_))
        ));
    }

    #[test]
    fn test_missing_summary() {
        let raw = json!({"actionPlan": []}).to_string();
        assert!(matches!(parse_plan(&raw), Err(GenerationError::Schema(_))));
    }

    #[test]
    fn test_action_plan_must_be_array() {
        let raw = json!({"summary": "ok", "actionPlan": "call someone"}).to_string();
        assert!(matches!(parse_plan(&raw), Err(GenerationError::Schema(_))));
    }

    #[test]
    fn test_unknown_priority_rejects_whole_plan() {
        let raw = json!({
            "summary": "ok",
            "actionPlan": [
                {"step": "A", "description": "a", "priority": "high"},
                {"step": "B", "description": "b", "priority": "urgent"}
            ]
        })
        .to_string();
        let err = parse_plan(&raw).unwrap_err();
        assert!(err.to_string().contains("actionPlan[1].priority"));
    }

    #[test]
    fn test_unknown_professional_type_is_rejected() {
        let raw = json!({
            "summary": "ok",
            "actionPlan": [{"step": "A", "description": "a", "priority": "low", "professionalType": "astrologer"}]
        })
        .to_string();
        assert!(matches!(parse_plan(&raw), Err(GenerationError::Schema(_))));
    }

    #[test]
    fn test_item_must_be_object() {
        let raw = json!({"summary": "ok", "actionPlan": ["do this"]}).to_string();
        assert!(matches!(parse_plan(&raw), Err(GenerationError::Schema(_))));
    }

    struct CannedProvider(Result<String, LLMError>);

    #[async_trait]
    impl LLMProvider for CannedProvider {
        async fn generate_json(&self, _prompt: &str) -> Result<String, LLMError> {
            self.0.clone()
        }

        fn model_name(&self) -> &str {
            "canned"
        }
    }

    #[tokio::test]
    async fn test_llm_generator_parses_provider_output() {
        let generator = LlmPlanGenerator::new(Arc::new(CannedProvider(Ok(valid_response()))));
        let plan = generator.generate("Bring ID.").await.unwrap();
        assert_eq!(plan.action_plan.len(), 3);
        assert_eq!(generator.name(), "canned");
    }

    #[tokio::test]
    async fn test_llm_generator_surfaces_provider_errors() {
        let generator = LlmPlanGenerator::new(Arc::new(CannedProvider(Err(
            LLMError::ConnectionFailed("down".to_string()),
        ))));
        assert!(matches!(
            generator.generate("Bring ID.").await,
            Err(GenerationError::Provider(_))
        ));
    }
}
