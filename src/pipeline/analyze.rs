// analyze.rs
// Phase 2: Classify one feature description via the model backend

use serde::{Deserialize, Serialize};

use crate::backend::Backend;
use crate::pipeline::glossary::Glossary;

const SYSTEM_PROMPT: &str = "You are an expert compliance analyst AI.";

/// The three-key analysis verdict for one feature description.
///
/// A null flag means the analyzer was skipped or the backend failed; the
/// reasoning then names the error category instead of a model explanation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Verdict {
    pub is_geo_compliance_needed: Option<bool>,
    pub reasoning: String,
    pub relevant_regulation: String,
}

impl Verdict {
    /// Verdict for a blank description - defined skip, not an error.
    pub fn skipped() -> Self {
        Self {
            is_geo_compliance_needed: None,
            reasoning: "Skipped: Empty feature description.".to_string(),
            relevant_regulation: "N/A".to_string(),
        }
    }

    /// Null verdict carrying the failure description as reasoning.
    pub fn failed(reasoning: String) -> Self {
        Self {
            is_geo_compliance_needed: None,
            reasoning,
            relevant_regulation: "N/A".to_string(),
        }
    }
}

/// Classify one feature description.
///
/// One backend round trip, one attempt. Every failure mode (unreachable
/// backend, bad status, malformed reply) folds into a null verdict so a
/// single row can never abort the batch.
pub async fn analyze_description(
    backend: &Backend,
    glossary: &Glossary,
    description: &str,
) -> Verdict {
    let prompt = render_prompt(glossary.bullet_text(), description);

    let reply = match backend.complete_json(SYSTEM_PROMPT, &prompt).await {
        Ok(reply) => reply,
        Err(e) => {
            tracing::warn!("backend call failed: {e}");
            return Verdict::failed(format!("Backend call failed: {e}"));
        }
    };

    match serde_json::from_str::<Verdict>(strip_code_fences(&reply)) {
        Ok(verdict) => verdict,
        Err(e) => {
            tracing::warn!(
                "model reply was not valid verdict JSON: {e}; reply (first 200 chars): {}",
                crate::backend::excerpt(&reply)
            );
            Verdict::failed(format!("Failed to parse model reply as JSON: {e}"))
        }
    }
}

/// Render the instructional prompt around the glossary and the description.
fn render_prompt(glossary_text: &str, description: &str) -> String {
    format!(
        r#"Decide whether the feature below requires geo-specific compliance logic.

Flag a feature ONLY if it is implemented to satisfy a specific law, regulation,
or legal mandate in a particular geographic region (a country, a state, or a
union such as the EU).

Do NOT flag:
- Business-driven regional behavior: market tests, phased rollouts, A/B tests.
- Safety or policy features applied globally, even when a region is mentioned for context.

Glossary of internal terms that may appear in the description:
---
<GLOSSARY>
{glossary_text}
</GLOSSARY>
---

Analyze the following feature description:
---
<FEATURE_DESCRIPTION>
{description}
</FEATURE_DESCRIPTION>
---

Return a JSON object with exactly these three keys:
- "is_geo_compliance_needed": boolean (true if the feature requires geo-specific compliance)
- "reasoning": string (a concise explanation for the decision)
- "relevant_regulation": string (the law or regulation if identifiable, otherwise "N/A")"#
    )
}

/// Strip a markdown code fence around a JSON body, if present.
///
/// Locally served models habitually wrap JSON in ```json fences even when
/// asked for a bare object.
fn strip_code_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.trim_start_matches('\n')
        .strip_suffix("```")
        .unwrap_or(rest)
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_glossary_and_description_in_delimited_blocks() {
        let prompt = render_prompt("- NR: not recommended", "Age gate for Utah minors");
        assert!(prompt.contains("<GLOSSARY>\n- NR: not recommended\n</GLOSSARY>"));
        assert!(prompt
            .contains("<FEATURE_DESCRIPTION>\nAge gate for Utah minors\n</FEATURE_DESCRIPTION>"));
    }

    #[test]
    fn verdict_parses_from_model_reply() {
        let raw = r#"{"is_geo_compliance_needed": true, "reasoning": "NetzDG mandate", "relevant_regulation": "NetzDG"}"#;
        let verdict: Verdict = serde_json::from_str(raw).unwrap();
        assert_eq!(verdict.is_geo_compliance_needed, Some(true));
        assert_eq!(verdict.relevant_regulation, "NetzDG");
    }

    #[test]
    fn verdict_accepts_null_flag() {
        let raw = r#"{"is_geo_compliance_needed": null, "reasoning": "unclear", "relevant_regulation": "N/A"}"#;
        let verdict: Verdict = serde_json::from_str(raw).unwrap();
        assert_eq!(verdict.is_geo_compliance_needed, None);
    }

    #[test]
    fn skipped_verdict_matches_contract() {
        let verdict = Verdict::skipped();
        assert_eq!(verdict.is_geo_compliance_needed, None);
        assert_eq!(verdict.reasoning, "Skipped: Empty feature description.");
        assert_eq!(verdict.relevant_regulation, "N/A");
    }

    #[test]
    fn code_fences_are_stripped() {
        assert_eq!(strip_code_fences("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("  {\"a\":1}  "), "{\"a\":1}");
    }
}
