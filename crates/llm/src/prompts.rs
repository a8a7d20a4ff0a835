//! Fixed free-form analysis requests built on top of [`CompletionProvider`].
//!
//! Each helper wraps caller-supplied text in a task description and sends it
//! with its own token cap.

use crate::{CompletionProvider, LlmError};

pub const BLUEPRINT_MAX_TOKENS: u32 = 3000;
pub const COST_BREAKDOWN_MAX_TOKENS: u32 = 2500;
pub const MAINTENANCE_ISSUES_MAX_TOKENS: u32 = 2500;
pub const PROJECT_DELAYS_MAX_TOKENS: u32 = 2500;

pub fn blueprint_prompt(blueprint: &str, additional_context: &str) -> String {
    format!(
        "Analyze the following construction blueprint and provide detailed insights:

Blueprint: {blueprint}
Additional Context: {additional_context}

Please provide:
1. Estimated material quantities
2. Labor requirements
3. Construction timeline
4. Potential challenges or risks
5. Cost estimation breakdown
6. Compliance considerations for South African building codes

Format your response with clear sections and specific measurements."
    )
}

pub fn cost_breakdown_prompt(project_details: &str) -> String {
    format!(
        "Generate a detailed cost breakdown for the following construction project:

{project_details}

Provide a comprehensive breakdown including:
1. Materials (with specific items and quantities)
2. Labor costs (different skill levels)
3. Equipment rental
4. Permits and regulatory fees
5. Subcontractor costs
6. Contingency (10-15%)
7. Overhead and profit margin

Use South African Rand (ZAR) and consider current market rates in South Africa.
Format as a structured breakdown with subtotals and grand total."
    )
}

pub fn maintenance_issues_prompt(historical_data: &str) -> String {
    format!(
        "Based on the following historical maintenance data, predict future maintenance needs:

{historical_data}

Analyze patterns and provide:
1. Top 5 predicted maintenance issues in next 3 months
2. Top 5 predicted issues in next 6 months
3. Long-term (12 month) predictions
4. Risk probability for each prediction (High/Medium/Low)
5. Estimated costs for each predicted issue
6. Preventive measures to avoid these issues
7. Recommended maintenance schedule

Focus on South African climate and construction standards."
    )
}

pub fn project_delays_prompt(project_data: &str) -> String {
    format!(
        "Analyze the following project data for potential delays and scheduling issues:

{project_data}

Provide comprehensive analysis including:
1. Current delay assessment
2. Root cause analysis
3. Impact on overall timeline
4. Critical path analysis
5. Risk of further delays
6. Recommended corrective actions with priorities
7. Revised timeline suggestions
8. Budget impact assessment
9. Stakeholder communication recommendations

Consider South African working conditions, public holidays, and typical project constraints."
    )
}

pub async fn analyze_blueprint(
    provider: &dyn CompletionProvider,
    blueprint: &str,
    additional_context: &str,
) -> Result<String, LlmError> {
    provider
        .complete(
            &blueprint_prompt(blueprint, additional_context),
            BLUEPRINT_MAX_TOKENS,
        )
        .await
}

pub async fn generate_cost_breakdown(
    provider: &dyn CompletionProvider,
    project_details: &str,
) -> Result<String, LlmError> {
    provider
        .complete(
            &cost_breakdown_prompt(project_details),
            COST_BREAKDOWN_MAX_TOKENS,
        )
        .await
}

pub async fn predict_maintenance_issues(
    provider: &dyn CompletionProvider,
    historical_data: &str,
) -> Result<String, LlmError> {
    provider
        .complete(
            &maintenance_issues_prompt(historical_data),
            MAINTENANCE_ISSUES_MAX_TOKENS,
        )
        .await
}

pub async fn analyze_project_delays(
    provider: &dyn CompletionProvider,
    project_data: &str,
) -> Result<String, LlmError> {
    provider
        .complete(
            &project_delays_prompt(project_data),
            PROJECT_DELAYS_MAX_TOKENS,
        )
        .await
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    /// Records the last prompt and token cap it was asked for.
    #[derive(Default)]
    struct Recorder {
        last: Mutex<Option<(String, u32)>>,
    }

    #[async_trait]
    impl CompletionProvider for Recorder {
        async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, LlmError> {
            *self.last.lock().unwrap() = Some((prompt.to_string(), max_tokens));
            Ok("ok".into())
        }
    }

    #[tokio::test]
    async fn blueprint_uses_larger_budget() {
        let rec = Recorder::default();
        analyze_blueprint(&rec, "plans/house.dwg", "Two storey").await.unwrap();
        let (prompt, tokens) = rec.last.lock().unwrap().clone().unwrap();
        assert_eq!(tokens, 3000);
        assert!(prompt.contains("Blueprint: plans/house.dwg"));
        assert!(prompt.contains("Additional Context: Two storey"));
    }

    #[tokio::test]
    async fn other_helpers_use_standard_budget() {
        let rec = Recorder::default();
        generate_cost_breakdown(&rec, "Clinic").await.unwrap();
        assert_eq!(rec.last.lock().unwrap().as_ref().unwrap().1, 2500);
        predict_maintenance_issues(&rec, "history").await.unwrap();
        assert!(rec.last.lock().unwrap().as_ref().unwrap().0.contains("history"));
        analyze_project_delays(&rec, "late").await.unwrap();
        assert!(rec
            .last
            .lock()
            .unwrap()
            .as_ref()
            .unwrap()
            .0
            .contains("public holidays"));
    }

    #[test]
    fn cost_breakdown_mentions_rand() {
        assert!(cost_breakdown_prompt("x").contains("South African Rand (ZAR)"));
    }
}
