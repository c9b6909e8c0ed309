use serde::Deserialize;

use crate::{Question, SequenceError};

/// The ordered, immutable list of questions of one survey session.
///
/// Built once from the fetch result and never mutated afterwards; the
/// navigation controller only ever reads from it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestionSequence {
    questions: Vec<Question>,
}

/// Wire shape of the fetch result: either `{"questions": [...]}` or a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum Payload {
    Wrapped { questions: Vec<Question> },
    Bare(Vec<Question>),
}

impl QuestionSequence {
    /// Create a sequence from questions.
    ///
    /// Opinion-scale and rating questions without `choices` get them
    /// synthesized from their step parameters.
    pub fn new(questions: Vec<Question>) -> Self {
        let questions = questions
            .into_iter()
            .map(|mut q| {
                q.fill_scale_choices();
                q
            })
            .collect();
        Self { questions }
    }

    /// Create an empty sequence.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a fetch payload.
    pub fn from_json(payload: &str) -> Result<Self, SequenceError> {
        let payload: Payload = serde_json::from_str(payload)?;
        Ok(Self::from_payload(payload))
    }

    /// Build from an already parsed JSON value.
    pub fn from_value(payload: serde_json::Value) -> Result<Self, SequenceError> {
        let payload: Payload = serde_json::from_value(payload)?;
        Ok(Self::from_payload(payload))
    }

    fn from_payload(payload: Payload) -> Self {
        match payload {
            Payload::Wrapped { questions } | Payload::Bare(questions) => Self::new(questions),
        }
    }

    /// Get the question at `index`.
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// Get all questions.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Question> {
        self.questions.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }
}

impl FromIterator<Question> for QuestionSequence {
    fn from_iter<I: IntoIterator<Item = Question>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a QuestionSequence {
    type Item = &'a Question;
    type IntoIter = std::slice::Iter<'a, Question>;

    fn into_iter(self) -> Self::IntoIter {
        self.questions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TypeCode;

    #[test]
    fn parses_wrapped_payload() {
        let seq = QuestionSequence::from_json(
            r#"{"questions": [{"type": "YN"}, {"type": "MC", "parameters": {"multiple_selection": false}}]}"#,
        )
        .unwrap();

        assert_eq!(seq.len(), 2);
        assert_eq!(seq.get(0).unwrap().type_code(), Some(TypeCode::YesNo));
        assert_eq!(seq.get(1).unwrap().type_code(), Some(TypeCode::MultipleChoice));
        assert!(seq.get(2).is_none());
    }

    #[test]
    fn parses_bare_array() {
        let seq = QuestionSequence::from_json(r#"[{"type": "ST"}]"#).unwrap();
        assert_eq!(seq.len(), 1);
    }

    #[test]
    fn unknown_type_does_not_fail_the_sequence() {
        let seq = QuestionSequence::from_json(r#"[{"type": "ST"}, {"type": "??"}]"#).unwrap();
        assert_eq!(seq.len(), 2);
        assert!(!seq.get(1).unwrap().kind().is_supported());
    }

    #[test]
    fn malformed_payload_is_an_error() {
        let err = QuestionSequence::from_json(r#"{"questions": 3}"#).unwrap_err();
        assert!(err.to_string().starts_with("Malformed question payload"));
    }

    #[test]
    fn synthesizes_scale_choices() {
        let seq = QuestionSequence::from_json(
            r#"[{"type": "R_", "parameters": {"number_of_steps": 3}}]"#,
        )
        .unwrap();
        let choices = seq.get(0).unwrap().field("choices").unwrap();
        assert_eq!(choices.as_array().unwrap().len(), 3);
    }

    #[test]
    fn oversized_step_count_is_ignored() {
        let seq = QuestionSequence::from_json(
            r#"[
                {"type": "OS", "parameters": {"start_at_one": true, "number_of_steps": 18446744073709551615}},
                {"type": "R_", "parameters": {"number_of_steps": 1000000000}},
                {"type": "OS", "parameters": {"number_of_steps": "5"}},
                {"type": "R_", "parameters": {"number_of_steps": -1}}
            ]"#,
        )
        .unwrap();

        assert_eq!(seq.len(), 4);
        assert!(seq.iter().all(|q| q.field("choices").is_none()));
    }
}
