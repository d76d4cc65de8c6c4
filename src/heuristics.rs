// src/heuristics.rs
// Offline summary and action plan: keyword classification into a fixed set of
// document kinds, each with a deterministic action template.

use crate::chunker::split_sentences;
use crate::error::GenerationError;
use crate::generator::PlanGenerator;
use crate::models::{ActionItem, GeneratedPlan, Priority, ProfessionalType};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Legal,
    Financial,
    Report,
    Proposal,
    Policy,
    Meeting,
    Research,
    General,
}

impl DocumentKind {
    /// Kinds that can be detected, in tie-break order
    pub const DETECTABLE: [DocumentKind; 7] = [
        DocumentKind::Legal,
        DocumentKind::Financial,
        DocumentKind::Report,
        DocumentKind::Proposal,
        DocumentKind::Policy,
        DocumentKind::Meeting,
        DocumentKind::Research,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DocumentKind::Legal => "legal document",
            DocumentKind::Financial => "financial document",
            DocumentKind::Report => "report",
            DocumentKind::Proposal => "proposal",
            DocumentKind::Policy => "policy document",
            DocumentKind::Meeting => "meeting record",
            DocumentKind::Research => "research paper",
            DocumentKind::General => "general document",
        }
    }

    fn keywords(&self) -> &'static [&'static str] {
        match self {
            DocumentKind::Legal => &[
                "agreement", "contract", "court", "plaintiff", "defendant", "attorney",
                "hereby", "clause", "lease", "tenant", "landlord", "hearing", "custody",
                "legal", "law", "eviction", "immigration", "visa",
            ],
            DocumentKind::Financial => &[
                "invoice", "payment", "balance", "tax", "taxes", "refund", "account",
                "bill", "due", "amount", "credit", "debt", "irs", "income",
            ],
            DocumentKind::Report => &[
                "report", "findings", "results", "analysis", "quarter", "performance",
                "overview", "metrics",
            ],
            DocumentKind::Proposal => &[
                "proposal", "proposed", "propose", "scope", "deliverables", "budget",
                "timeline", "bid",
            ],
            DocumentKind::Policy => &[
                "policy", "policies", "guidelines", "procedure", "compliance", "regulation",
                "eligibility", "benefits", "coverage",
            ],
            DocumentKind::Meeting => &[
                "meeting", "minutes", "agenda", "attendees", "discussed", "motion",
                "adjourned",
            ],
            DocumentKind::Research => &[
                "abstract", "methodology", "hypothesis", "study", "participants",
                "references", "conclusion", "experiment",
            ],
            DocumentKind::General => &[],
        }
    }
}

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z]+").expect("word regex is valid"));

/// Classify a document by keyword hits. The highest count wins, ties go to
/// the kind declared first, and no hits at all means `General`.
pub fn classify(text: &str) -> DocumentKind {
    let words = lowercase_words(text);

    let mut best = (DocumentKind::General, 0usize);
    for kind in DocumentKind::DETECTABLE {
        let hits = count_hits(&words, kind.keywords());
        if hits > best.1 {
            best = (kind, hits);
        }
    }
    best.0
}

const IMMIGRATION_TERMS: &[&str] = &["immigration", "visa", "asylum", "deportation", "citizenship"];
const HOUSING_TERMS: &[&str] = &["lease", "tenant", "landlord", "eviction", "rent"];

fn lowercase_words(text: &str) -> Vec<String> {
    WORD_RE
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

fn count_hits(words: &[String], keywords: &[&str]) -> usize {
    words.iter().filter(|w| keywords.contains(&w.as_str())).count()
}

/// Who to see about a legal document. Immigration wins ties with housing;
/// with neither topic present the referral is family law.
pub fn legal_referral(text: &str) -> ProfessionalType {
    let words = lowercase_words(text);
    let immigration = count_hits(&words, IMMIGRATION_TERMS);
    let housing = count_hits(&words, HOUSING_TERMS);

    match (immigration, housing) {
        (0, 0) => ProfessionalType::FamilyLawAttorney,
        (i, h) if i >= h => ProfessionalType::ImmigrationLawyer,
        _ => ProfessionalType::HousingAdvisor,
    }
}

/// Template for `kind` with legal referrals narrowed to the document's topic.
pub fn plan_for_document(text: &str, kind: DocumentKind) -> Vec<ActionItem> {
    let mut plan = action_plan_for(kind);
    if kind == DocumentKind::Legal {
        let referral = legal_referral(text);
        for item in plan.iter_mut().filter(|i| i.professional_type.is_some()) {
            item.professional_type = Some(referral);
        }
    }
    plan
}

/// Deterministic action list for a document kind, high priority first.
pub fn action_plan_for(kind: DocumentKind) -> Vec<ActionItem> {
    use Priority::{High, Low, Medium};

    match kind {
        DocumentKind::Legal => vec![
            ActionItem::new("Note every deadline", "Write down all dates in the document and what must happen by each one.", High, None),
            ActionItem::new("Get legal advice", "Ask a qualified professional to explain your rights and obligations before you sign or respond.", High, Some(ProfessionalType::FamilyLawAttorney)),
            ActionItem::new("Keep copies", "Store a copy of this document and any reply you send.", Medium, None),
            ActionItem::new("Respond in writing", "If a response is required, send it in writing and keep proof of delivery.", Low, None),
        ],
        DocumentKind::Financial => vec![
            ActionItem::new("Check the amounts", "Compare the amounts and due dates with your own records.", High, None),
            ActionItem::new("Pay or dispute on time", "Pay before the due date or contact the sender if something is wrong.", High, None),
            ActionItem::new("Ask a tax advisor", "If taxes or refunds are involved, ask a tax advisor to review the document.", Medium, Some(ProfessionalType::TaxAdvisor)),
        ],
        DocumentKind::Report => vec![
            ActionItem::new("Read the key findings", "Focus on the conclusions and any results that affect you.", High, None),
            ActionItem::new("List open questions", "Write down anything that is unclear so you can ask the author.", Medium, None),
            ActionItem::new("Share with others involved", "Send the report to people who need to act on it.", Low, None),
        ],
        DocumentKind::Proposal => vec![
            ActionItem::new("Review scope and cost", "Check what is offered, what it costs and the proposed timeline.", High, None),
            ActionItem::new("Compare alternatives", "Look at other options before you accept.", Medium, None),
            ActionItem::new("Reply with a decision", "Accept, reject or ask for changes before any stated deadline.", Medium, None),
        ],
        DocumentKind::Policy => vec![
            ActionItem::new("Check your eligibility", "Find the rules that apply to you and whether you qualify.", High, None),
            ActionItem::new("Ask a benefits counselor", "A benefits counselor can explain what you are entitled to.", Medium, Some(ProfessionalType::BenefitsCounselor)),
            ActionItem::new("Follow the procedure", "Complete any forms or steps the policy requires.", Medium, None),
        ],
        DocumentKind::Meeting => vec![
            ActionItem::new("Find your tasks", "Look for action items or decisions that name you.", High, None),
            ActionItem::new("Note the next meeting", "Add the next meeting date to your calendar.", Medium, None),
            ActionItem::new("Confirm decisions", "Contact the organizer if a decision is recorded incorrectly.", Low, None),
        ],
        DocumentKind::Research => vec![
            ActionItem::new("Read the conclusion", "Start with the abstract and conclusion to understand the main result.", High, None),
            ActionItem::new("Check the method", "See how the study was done and who took part.", Medium, None),
            ActionItem::new("Ask an expert", "Discuss what the results mean for you with a qualified professional.", Low, None),
        ],
        DocumentKind::General => vec![
            ActionItem::new("Read the document carefully", "Identify who sent it and what they are asking for.", High, None),
            ActionItem::new("Check for deadlines", "Look for dates or time limits and mark them on a calendar.", High, None),
            ActionItem::new("Ask for help if unsure", "Contact the sender or a community organization if anything is unclear.", Medium, None),
        ],
    }
}

/// Extractive summary: the detected kind plus the opening sentences.
pub fn summarize(text: &str, kind: DocumentKind) -> String {
    let opening: Vec<&str> = split_sentences(text).into_iter().take(3).collect();
    let mut summary = format!("This appears to be a {}.", kind.label());
    if !opening.is_empty() {
        summary.push_str(" It begins: ");
        summary.push_str(&opening.join(" "));
    }
    summary
}

/// Plan generator that needs no remote model.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicPlanGenerator;

#[async_trait]
impl PlanGenerator for HeuristicPlanGenerator {
    async fn generate(&self, document_text: &str) -> Result<GeneratedPlan, GenerationError> {
        if document_text.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        let kind = classify(document_text);
        debug!(kind = ?kind, "Heuristic classification");
        Ok(GeneratedPlan {
            summary: summarize(document_text, kind),
            action_plan: plan_for_document(document_text, kind),
        })
    }

    fn name(&self) -> &str {
        "heuristic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_legal() {
        let text = "This lease agreement is between the landlord and the tenant. The court may enforce this contract.";
        assert_eq!(classify(text), DocumentKind::Legal);
    }

    #[test]
    fn test_classify_financial() {
        assert_eq!(
            classify("Your invoice shows a balance due. Payment amount: $120."),
            DocumentKind::Financial
        );
    }

    #[test]
    fn test_classify_meeting() {
        assert_eq!(
            classify("Minutes of the board meeting. Attendees discussed the agenda."),
            DocumentKind::Meeting
        );
    }

    #[test]
    fn test_classify_is_case_insensitive_and_whole_word() {
        assert_eq!(classify("ABSTRACT. Methodology."), DocumentKind::Research);
        // "lawn" and "taxi" must not count as "law" or "tax"
        assert_eq!(classify("Mow the lawn and call a taxi."), DocumentKind::General);
    }

    #[test]
    fn test_tie_goes_to_first_declared_kind() {
        // one legal hit, one financial hit
        assert_eq!(classify("contract invoice"), DocumentKind::Legal);
    }

    #[test]
    fn test_no_hits_is_general() {
        assert_eq!(classify("Hello there."), DocumentKind::General);
    }

    #[test]
    fn test_every_template_is_ordered_high_first() {
        for kind in DocumentKind::DETECTABLE
            .iter()
            .copied()
            .chain(std::iter::once(DocumentKind::General))
        {
            let plan = action_plan_for(kind);
            assert!((3..=5).contains(&plan.len()), "{:?}", kind);
            assert_eq!(plan[0].priority, Priority::High);
            assert!(plan.windows(2).all(|w| w[0].priority <= w[1].priority));
        }
    }

    #[test]
    fn test_legal_referral_follows_topic() {
        assert_eq!(
            legal_referral("Your visa application requires an immigration hearing."),
            ProfessionalType::ImmigrationLawyer
        );
        assert_eq!(
            legal_referral("Eviction notice: the landlord ends your lease."),
            ProfessionalType::HousingAdvisor
        );
        assert_eq!(
            legal_referral("The court will hold a custody hearing."),
            ProfessionalType::FamilyLawAttorney
        );
        // one hit each
        assert_eq!(
            legal_referral("visa and lease"),
            ProfessionalType::ImmigrationLawyer
        );
    }

    #[test]
    fn test_non_legal_templates_keep_their_referrals() {
        let text = "Eviction notice. Your tax refund and invoice balance are due.";
        assert_eq!(
            plan_for_document(text, DocumentKind::Financial),
            action_plan_for(DocumentKind::Financial)
        );
    }

    #[tokio::test]
    async fn test_eviction_letter_gets_housing_referral() {
        let text = "Eviction notice. The landlord will end the lease with the tenant. The court hearing is on May 2.";
        let plan = HeuristicPlanGenerator.generate(text).await.unwrap();
        let referrals: Vec<_> = plan
            .action_plan
            .iter()
            .filter_map(|i| i.professional_type)
            .collect();
        assert_eq!(referrals, vec![ProfessionalType::HousingAdvisor]);
    }

    #[test]
    fn test_summarize_uses_first_sentences() {
        let text = "One. Two. Three. Four.";
        let summary = summarize(text, DocumentKind::General);
        assert_eq!(
            summary,
            "This appears to be a general document. It begins: One. Two. Three."
        );
    }

    #[tokio::test]
    async fn test_heuristic_generator_is_deterministic() {
        let generator = HeuristicPlanGenerator;
        let text = "Patient has an appointment on March 5th. Bring ID.";
        let first = generator.generate(text).await.unwrap();
        let second = generator.generate(text).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(generator.name(), "heuristic");
    }
}
