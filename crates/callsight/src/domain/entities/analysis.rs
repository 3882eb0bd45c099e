//! General call analysis produced by the extraction stage
//!
//! The model answers with a fixed six-section structure, but not always with
//! the types asked for (`"8/10"` for a score, `"None detected"` for a list).
//! Parsing is lenient: a section or field of the wrong shape reads as absent
//! and never takes the rest of the answer down with it.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Placeholder stored when the model did not report a value
pub const NOT_AVAILABLE: &str = "Not Available";

/// General metrics, one field per analysis section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneralMetrics {
    #[serde(
        rename = "section_1_name_extraction",
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub names: Option<NameExtraction>,

    #[serde(
        rename = "section_2_call_direction_interaction_type",
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub direction: Option<CallDirection>,

    #[serde(
        rename = "section_3_sentiment_and_intent_detection",
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub sentiment: Option<SentimentIntent>,

    #[serde(
        rename = "section_4_summary_of_conversation_in_brief",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub summary: Option<String>,

    #[serde(
        rename = "section_5_agent_improvement_metrics",
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub agent_quality: Option<AgentQuality>,

    #[serde(
        rename = "section_6_pci_pii_data_detection",
        default,
        deserialize_with = "lenient_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub sensitive_data: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NameExtraction {
    #[serde(default, deserialize_with = "lenient_string")]
    pub agent_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub customer_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallDirection {
    #[serde(default, deserialize_with = "lenient_string")]
    pub call_direction: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub interaction_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentIntent {
    #[serde(default, deserialize_with = "lenient_string")]
    pub sentiment: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub intent: Option<String>,
}

/// Agent quality scores, each on a 0-10 scale
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentQuality {
    #[serde(default, deserialize_with = "lenient_score")]
    pub empathy_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient_score")]
    pub professionalism_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub knowledge_gap_detection: Option<Vec<String>>,
}

impl GeneralMetrics {
    /// Read whatever sections `value` carries. Anything that is not an
    /// object reads as no metrics at all.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(_) => Self::deserialize(value).unwrap_or_default(),
            _ => Self::default(),
        }
    }

    /// Lift the flat call fields out of the nested sections.
    pub fn call_metadata(&self) -> CallMetadata {
        let names = self.names.clone().unwrap_or_default();
        let direction = self.direction.clone().unwrap_or_default();
        let sentiment = self.sentiment.clone().unwrap_or_default();

        CallMetadata {
            agent_name: or_not_available(names.agent_name),
            customer_name: or_not_available(names.customer_name),
            call_direction: or_not_available(direction.call_direction),
            interaction_type: or_not_available(direction.interaction_type),
            sentiment: or_not_available(sentiment.sentiment),
            intent: or_not_available(sentiment.intent),
        }
    }
}

/// Flat call fields stored on the call record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallMetadata {
    pub agent_name: String,
    pub customer_name: String,
    pub call_direction: String,
    pub interaction_type: String,
    pub sentiment: String,
    pub intent: String,
}

impl Default for CallMetadata {
    fn default() -> Self {
        GeneralMetrics::default().call_metadata()
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// Numbers, or strings such as `"8"`, `"8.5"` and `"8/10"` (numerator only).
fn lenient_score<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s
            .split('/')
            .next()
            .and_then(|head| head.trim().parse::<f64>().ok()),
        _ => None,
    })
}

/// A list of strings, or a single string taken as a one-item list.
fn lenient_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    Value::Null => None,
                    other => Some(other.to_string()),
                })
                .collect(),
        ),
        Value::String(s) => Some(vec![s]),
        _ => None,
    })
}

fn or_not_available(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_six_sections() {
        let metrics: GeneralMetrics = serde_json::from_value(json!({
            "section_1_name_extraction": {"agent_name": "Dana", "customer_name": "Lee"},
            "section_2_call_direction_interaction_type": {
                "call_direction": "Inbound",
                "interaction_type": "Conversation"
            },
            "section_3_sentiment_and_intent_detection": {
                "sentiment": "Positive",
                "intent": "book follow-up visit"
            },
            "section_4_summary_of_conversation_in_brief": "Caller booked a visit.",
            "section_5_agent_improvement_metrics": {
                "empathy_score": 8,
                "professionalism_score": 9.5,
                "knowledge_gap_detection": []
            },
            "section_6_pci_pii_data_detection": ["date of birth mentioned"]
        }))
        .unwrap();

        assert_ne!(metrics, GeneralMetrics::default());
        assert_eq!(metrics.agent_quality.as_ref().unwrap().empathy_score, Some(8.0));

        let meta = metrics.call_metadata();
        assert_eq!(meta.agent_name, "Dana");
        assert_eq!(meta.call_direction, "Inbound");
        assert_eq!(meta.intent, "book follow-up visit");
    }

    #[test]
    fn test_missing_fields_default_to_not_available() {
        let metrics: GeneralMetrics = serde_json::from_value(json!({
            "section_1_name_extraction": {"agent_name": "  "}
        }))
        .unwrap();

        let meta = metrics.call_metadata();
        assert_eq!(meta.agent_name, NOT_AVAILABLE);
        assert_eq!(meta.customer_name, NOT_AVAILABLE);
        assert_eq!(meta.sentiment, NOT_AVAILABLE);
        assert_eq!(CallMetadata::default(), GeneralMetrics::default().call_metadata());
    }

    #[test]
    fn test_loose_types_keep_other_sections() {
        let metrics = GeneralMetrics::from_value(&json!({
            "section_1_name_extraction": {"agent_name": "Dana", "customer_name": 42},
            "section_2_call_direction_interaction_type": "Inbound",
            "section_3_sentiment_and_intent_detection": {"sentiment": "Neutral", "intent": null},
            "section_5_agent_improvement_metrics": {
                "empathy_score": "8/10",
                "professionalism_score": "n/a",
                "knowledge_gap_detection": "None"
            },
            "section_6_pci_pii_data_detection": "None detected"
        }));

        let quality = metrics.agent_quality.clone().unwrap();
        assert_eq!(quality.empathy_score, Some(8.0));
        assert_eq!(quality.professionalism_score, None);
        assert_eq!(quality.knowledge_gap_detection, Some(vec!["None".to_string()]));
        assert_eq!(metrics.sensitive_data, Some(vec!["None detected".to_string()]));
        assert_eq!(metrics.direction, None);

        let meta = metrics.call_metadata();
        assert_eq!(meta.agent_name, "Dana");
        assert_eq!(meta.customer_name, "42");
        assert_eq!(meta.sentiment, "Neutral");
        assert_eq!(meta.intent, NOT_AVAILABLE);
        assert_eq!(meta.call_direction, NOT_AVAILABLE);
    }

    #[test]
    fn test_non_object_reads_as_empty() {
        assert_eq!(GeneralMetrics::from_value(&json!("n/a")), GeneralMetrics::default());
        assert_eq!(GeneralMetrics::from_value(&Value::Null), GeneralMetrics::default());
        assert_eq!(
            serde_json::to_value(GeneralMetrics::default()).unwrap(),
            json!({})
        );
    }
}
