use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{QuestionType, TypeCode};

/// Parameter key read by multiple-choice questions.
pub const MULTIPLE_SELECTION_KEY: &str = "multiple_selection";

/// Parameter key holding the date format of date questions.
pub const FORMAT_KEY: &str = "format";

/// Type-specific configuration of a question.
///
/// The map is opaque apart from the handful of keys read by the core;
/// everything else is passed straight through to templates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Parameters(Map<String, Value>);

impl Parameters {
    /// Create an empty parameter map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, returning the updated map.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Get a raw parameter value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Whether a multiple-choice question accepts several selections.
    ///
    /// Absent or non-boolean values count as `false`.
    pub fn multiple_selection(&self) -> bool {
        self.get(MULTIPLE_SELECTION_KEY)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// The declared date format, if it is a string.
    pub fn format(&self) -> Option<&str> {
        self.get(FORMAT_KEY).and_then(Value::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the underlying JSON map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Parameters {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// A single question of a survey.
///
/// Besides `type` and `parameters`, the fetch boundary delivers presentation
/// fields such as `question`, `description` and `choices`. They are kept
/// verbatim and exposed to templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "type")]
    kind: QuestionType,

    #[serde(default)]
    parameters: Parameters,

    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl Question {
    /// Create a question of the given type with no parameters.
    pub fn new(kind: impl Into<QuestionType>) -> Self {
        Self {
            kind: kind.into(),
            parameters: Parameters::new(),
            fields: Map::new(),
        }
    }

    /// Replace the parameters.
    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Set a presentation field (`question`, `choices`, ...).
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Set the prompt text.
    pub fn with_prompt(self, prompt: impl Into<String>) -> Self {
        self.with_field("question", prompt.into())
    }

    /// Set the choices from plain labels, as `[{"choice": label}, ...]`.
    pub fn with_choices<I, S>(self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let choices: Vec<Value> = labels
            .into_iter()
            .map(|label| serde_json::json!({ "choice": label.into() }))
            .collect();
        self.with_field("choices", choices)
    }

    /// The declared type.
    pub fn kind(&self) -> &QuestionType {
        &self.kind
    }

    /// The declared type if it is part of the closed set.
    pub fn type_code(&self) -> Option<TypeCode> {
        self.kind.type_code()
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Get a presentation field.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// The prompt text, if any.
    pub fn prompt(&self) -> Option<&str> {
        self.field("question").and_then(Value::as_str)
    }

    /// Build the JSON context templates are rendered against.
    ///
    /// The context mirrors the fetched record: presentation fields at the top
    /// level, plus `type`, `type_name` and `parameters`.
    pub fn context(&self) -> Value {
        let mut ctx = self.fields.clone();
        ctx.insert("type".to_string(), Value::String(self.kind.code().to_string()));
        if let Some(code) = self.type_code() {
            ctx.insert(
                "type_name".to_string(),
                Value::String(code.display_name().to_string()),
            );
        }
        ctx.insert(
            "parameters".to_string(),
            Value::Object(self.parameters.as_map().clone()),
        );
        Value::Object(ctx)
    }

    /// Fill in `choices` for opinion-scale and rating questions that arrived
    /// without them.
    ///
    /// Opinion scales count from 1 when `start_at_one` is set, else from 0;
    /// ratings always count from 0. Both produce `number_of_steps` entries.
    /// A step count that is missing, non-numeric, negative or larger than
    /// `u16::MAX` synthesizes nothing.
    pub(crate) fn fill_scale_choices(&mut self) {
        if self.fields.contains_key("choices") {
            return;
        }
        let start = match self.type_code() {
            Some(TypeCode::OpinionScale) => {
                let start_at_one = self
                    .parameters
                    .get("start_at_one")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                u64::from(start_at_one)
            }
            Some(TypeCode::Rating) => 0,
            _ => return,
        };
        let Some(steps) = self
            .parameters
            .get("number_of_steps")
            .and_then(Value::as_u64)
            .and_then(|n| u16::try_from(n).ok())
        else {
            return;
        };
        let Some(end) = start.checked_add(u64::from(steps)) else {
            return;
        };
        let choices: Vec<Value> = (start..end)
            .map(|n| serde_json::json!({ "choice": n }))
            .collect();
        self.fields.insert("choices".to_string(), Value::Array(choices));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_fetched_record() {
        let q: Question = serde_json::from_value(json!({
            "id": "8f1c",
            "question": "Pick one",
            "type": "MC",
            "required": true,
            "parameters": { "multiple_selection": true, "randomize": false },
            "choices": [{ "choice": "A" }, { "choice": "B" }]
        }))
        .unwrap();

        assert_eq!(q.type_code(), Some(TypeCode::MultipleChoice));
        assert!(q.parameters().multiple_selection());
        assert_eq!(q.prompt(), Some("Pick one"));
        assert_eq!(q.field("choices").unwrap().as_array().unwrap().len(), 2);
    }

    #[test]
    fn missing_parameters_default_to_empty() {
        let q: Question = serde_json::from_value(json!({ "type": "YN" })).unwrap();
        assert!(q.parameters().is_empty());
        assert!(!q.parameters().multiple_selection());
        assert_eq!(q.parameters().format(), None);
    }

    #[test]
    fn non_boolean_multiple_selection_is_false() {
        let params = Parameters::new().with(MULTIPLE_SELECTION_KEY, "yes");
        assert!(!params.multiple_selection());
    }

    #[test]
    fn context_exposes_type_and_parameters() {
        let q = Question::new(TypeCode::Date)
            .with_prompt("When?")
            .with_parameters(Parameters::new().with(FORMAT_KEY, "DD/MM/YYYY"));
        let ctx = q.context();

        assert_eq!(ctx["type"], "D_");
        assert_eq!(ctx["type_name"], "Date");
        assert_eq!(ctx["question"], "When?");
        assert_eq!(ctx["parameters"]["format"], "DD/MM/YYYY");
    }

    #[test]
    fn opinion_scale_choices_start_at_one() {
        let mut q = Question::new(TypeCode::OpinionScale).with_parameters(
            Parameters::new()
                .with("start_at_one", true)
                .with("number_of_steps", 10),
        );
        q.fill_scale_choices();

        let choices = q.field("choices").unwrap().as_array().unwrap();
        assert_eq!(choices.len(), 10);
        assert_eq!(choices[0], json!({ "choice": 1 }));
        assert_eq!(choices[9], json!({ "choice": 10 }));
    }

    #[test]
    fn rating_choices_start_at_zero() {
        let mut q = Question::new(TypeCode::Rating)
            .with_parameters(Parameters::new().with("number_of_steps", 5));
        q.fill_scale_choices();

        let choices = q.field("choices").unwrap().as_array().unwrap();
        assert_eq!(choices.first(), Some(&json!({ "choice": 0 })));
        assert_eq!(choices.last(), Some(&json!({ "choice": 4 })));
    }

    #[test]
    fn unusable_step_counts_synthesize_nothing() {
        let counts = [
            json!("5"),
            json!(-1),
            json!(2.5),
            json!(null),
            json!(65_536),
            json!(u64::MAX),
        ];
        for count in counts {
            for code in [TypeCode::OpinionScale, TypeCode::Rating] {
                let mut q = Question::new(code).with_parameters(
                    Parameters::new()
                        .with("start_at_one", true)
                        .with("number_of_steps", count.clone()),
                );
                q.fill_scale_choices();
                assert!(q.field("choices").is_none(), "{code} with {count}");
            }
        }
    }

    #[test]
    fn existing_choices_are_left_alone() {
        let mut q = Question::new(TypeCode::Rating)
            .with_parameters(Parameters::new().with("number_of_steps", 5))
            .with_choices(["low", "high"]);
        q.fill_scale_choices();
        assert_eq!(q.field("choices").unwrap().as_array().unwrap().len(), 2);
    }
}
