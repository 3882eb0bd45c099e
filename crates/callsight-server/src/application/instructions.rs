//! Model instructions for each inference call
//!
//! Both stages ask for bare JSON. Models still wrap answers in Markdown
//! fences now and then, so answers go through [`strip_code_fences`] first.

use callsight::{DomainCategoryPair, PromptRecord};

/// Generic extraction instructions used when no specialised prompt resolves.
pub const FALLBACK_PROMPT: &str = "Extract all relevant information from the transcript. \
Focus on capturing dates, names, numbers, and key decisions made during the call. \
Return the result as a JSON object.";

/// Stage 1: transcribe the attached audio and classify it.
pub fn classification(guidance: &str) -> String {
    format!(
        r#"You are an expert call classifier and transcription specialist.

## TASK 1: TRANSCRIPTION
Transcribe the attached audio accurately with timestamps and speaker labels.
Format each turn as: [HH:MM - HH:MM] Speaker: Text

## TASK 2: DOMAIN AND CATEGORY DETECTION
Identify the business domain of the call and the category within that domain.

Known domain and category combinations:
{guidance}
If the call fits none of these, name a new domain and/or category.
Use snake_case for both values.

## OUTPUT FORMAT
Return ONLY valid JSON:
{{"transcription": "...", "domain": "...", "category": "..."}}"#
    )
}

/// Prompt generation for a newly discovered pair, with few-shot exemplars.
pub fn prompt_generation(pair: &DomainCategoryPair, examples: &[PromptRecord]) -> String {
    let examples_text: String = examples
        .iter()
        .enumerate()
        .map(|(idx, example)| format!("\nEXAMPLE {}:\n{}\n", idx + 1, example.text))
        .collect();

    format!(
        r#"You are an expert prompt engineer for call center analysis.

Write an extraction prompt for calls from the domain '{domain}' with category '{category}'.
Reference prompts:
{examples_text}
The prompt must:
1. Ask for the key fields relevant to {domain} - {category}
2. Name each field and describe it
3. Ask for the result as JSON
4. Be concise but comprehensive

A sample transcript follows for orientation. Answer with the prompt text only."#,
        domain = pair.domain,
        category = pair.category,
    )
}

/// Stage 2: domain-specific extraction plus the six-section general analysis.
pub fn extraction(pair: &DomainCategoryPair, extraction_prompt: &str) -> String {
    format!(
        r#"You are analyzing a {domain} call ({category} category).

## PART 1: DOMAIN-SPECIFIC DATA EXTRACTION
{extraction_prompt}

## PART 2: GENERAL CALL ANALYSIS
1. Names: agent_name, customer_name
2. Call metadata: call_direction (Inbound/Outbound), interaction_type (Conversation/Voicemail)
3. Sentiment and intent: sentiment (Positive/Neutral/Negative), intent (3-5 word summary)
4. Summary of the conversation in brief
5. Agent metrics: empathy_score (0-10), professionalism_score (0-10), knowledge_gap_detection (list)
6. PCI/PII detection: list any sensitive data mentioned

## OUTPUT FORMAT
Return ONLY valid JSON:
{{
  "domain_specific_data": {{ }},
  "general_metrics": {{
    "section_1_name_extraction": {{"agent_name": "", "customer_name": ""}},
    "section_2_call_direction_interaction_type": {{"call_direction": "", "interaction_type": ""}},
    "section_3_sentiment_and_intent_detection": {{"sentiment": "", "intent": ""}},
    "section_4_summary_of_conversation_in_brief": "",
    "section_5_agent_improvement_metrics": {{"empathy_score": 0, "professionalism_score": 0, "knowledge_gap_detection": []}},
    "section_6_pci_pii_data_detection": []
  }}
}}

The transcript to analyze follows."#,
        domain = pair.domain,
        category = pair.category,
    )
}

/// Tone and sentiment of the attached audio, with timestamped shifts.
pub const TONAL_ANALYSIS: &str = r#"You are an expert tonal and sentiment analysis specialist.
Listen to the attached call audio and analyze the tone and sentiment of the speakers:
their emotions, attitudes and the overall mood. Give timestamps for key tonal shifts.

## OUTPUT FORMAT
Return ONLY valid JSON:
{
  "overall_analysis": {
    "summary": "A brief paragraph on the call context and outcome",
    "overall_sentiment": "Positive | Neutral | Negative | Mixed",
    "overall_tone": "e.g. Professional, Polite, Urgent"
  },
  "key_tonal_shifts": [
    {
      "timestamp": "MM:SS",
      "trigger_event": "The topic or event causing the shift",
      "description": "How the tone changed"
    }
  ]
}"#;

/// Remove a surrounding Markdown code fence (```json ... ```), if any.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
