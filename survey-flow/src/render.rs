//! Turning a question into a fragment.

use survey_flow_types::{Diagnostic, Question, TemplateId};
use tracing::{debug, warn};

use crate::fragment::Fragment;
use crate::registry;
use crate::store::TemplateStore;
use crate::template::Template;

/// Result of rendering one question.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub fragment: Fragment,
    /// Set when the question degraded to an empty fragment.
    pub diagnostic: Option<Diagnostic>,
}

impl Rendered {
    fn ok(fragment: Fragment) -> Self {
        Self {
            fragment,
            diagnostic: None,
        }
    }

    fn degraded(diagnostic: Diagnostic) -> Self {
        warn!("{diagnostic}");
        Self {
            fragment: Fragment::empty(),
            diagnostic: Some(diagnostic),
        }
    }
}

/// Renders questions with templates taken from a [`TemplateStore`].
#[derive(Debug, Clone)]
pub struct TemplateRenderer<S> {
    store: S,
}

impl<S: TemplateStore> TemplateRenderer<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Render `question` with the template `template`.
    ///
    /// A template missing from the store, or one that fails to parse, yields
    /// an empty fragment and a diagnostic.
    pub fn render(&self, template: TemplateId, question: &Question, index: usize) -> Rendered {
        let Some(source) = self.store.template(&template.key()) else {
            return Rendered::degraded(Diagnostic::TemplateNotFound { index, template });
        };
        let parsed = match Template::parse(&source) {
            Ok(parsed) => parsed,
            Err(err) => {
                return Rendered::degraded(Diagnostic::MalformedTemplate {
                    index,
                    template,
                    reason: err.to_string(),
                });
            }
        };
        let fragment = Fragment::from_segments(parsed.render(&question.context()));
        debug!(
            index,
            %template,
            controls = fragment.controls().len(),
            "rendered question"
        );
        Rendered::ok(fragment)
    }

    /// Resolve the question's template and render it.
    ///
    /// Unsupported types never reach the template engine.
    pub fn render_question(&self, index: usize, question: &Question) -> Rendered {
        match registry::resolve_template(question.kind()) {
            Ok(template) => self.render(template, question, index),
            Err(registry::UnsupportedType(code)) => {
                Rendered::degraded(Diagnostic::UnsupportedType { index, code })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::{ControlKind, FragmentLine};
    use crate::store::{BundledTemplates, MapTemplates};
    use survey_flow_types::{Parameters, TypeCode, FORMAT_KEY, MULTIPLE_SELECTION_KEY};

    fn bundled() -> TemplateRenderer<BundledTemplates> {
        TemplateRenderer::new(BundledTemplates::new())
    }

    #[test]
    fn yes_no_renders_two_buttons() {
        let q = Question::new(TypeCode::YesNo).with_prompt("Do you like tea?");
        let rendered = bundled().render_question(0, &q);

        assert_eq!(rendered.diagnostic, None);
        let fragment = rendered.fragment;
        assert_eq!(
            fragment.lines().first(),
            Some(&FragmentLine::Text("Do you like tea?".to_string()))
        );
        let labels: Vec<_> = fragment.controls().iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Yes", "No"]);
        assert!(fragment.controls().iter().all(|c| c.kind == ControlKind::Button));
    }

    #[test]
    fn multiple_choice_submit_only_in_multi_mode() {
        let single = Question::new(TypeCode::MultipleChoice).with_choices(["A", "B", "C"]);
        let fragment = bundled().render_question(0, &single).fragment;
        assert_eq!(fragment.controls().len(), 3);
        assert!(fragment.first_of(ControlKind::Submit).is_none());

        let multi = single.with_parameters(Parameters::new().with(MULTIPLE_SELECTION_KEY, true));
        let fragment = bundled().render_question(0, &multi).fragment;
        assert_eq!(fragment.controls().len(), 4);
        assert!(fragment.first_of(ControlKind::Submit).is_some());
    }

    #[test]
    fn date_passes_format_into_control() {
        let q = Question::new(TypeCode::Date)
            .with_prompt("When?")
            .with_parameters(Parameters::new().with(FORMAT_KEY, "YYYY-MM-DD"));
        let fragment = bundled().render_question(3, &q).fragment;
        let date = fragment.first_of(ControlKind::Date).unwrap();
        assert_eq!(date.label, "YYYY-MM-DD");
    }

    #[test]
    fn dropdown_lists_choices() {
        let q = Question::new(TypeCode::Dropdown).with_choices(["Red", "Green"]);
        let fragment = bundled().render_question(0, &q).fragment;
        let select = fragment.first_of(ControlKind::Select).unwrap();
        assert_eq!(select.options, vec!["Red", "Green"]);
    }

    #[test]
    fn synthesized_scale_renders_options() {
        let sequence = survey_flow_types::QuestionSequence::new(vec![
            Question::new(TypeCode::OpinionScale).with_parameters(
                Parameters::new()
                    .with("start_at_one", true)
                    .with("number_of_steps", 5),
            ),
        ]);
        let fragment = bundled().render_question(0, &sequence.questions()[0]).fragment;
        let labels: Vec<_> = fragment
            .controls()
            .iter()
            .filter(|c| c.kind == ControlKind::Option)
            .map(|c| c.label.as_str())
            .collect();
        assert_eq!(labels, vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn every_type_renders_without_diagnostic() {
        for code in TypeCode::ALL {
            let q = Question::new(code).with_prompt("Prompt");
            let rendered = bundled().render_question(0, &q);
            assert_eq!(rendered.diagnostic, None, "{code}");
            assert!(!rendered.fragment.is_empty(), "{code}");
        }
    }

    #[test]
    fn missing_template_degrades() {
        let renderer = TemplateRenderer::new(MapTemplates::new());
        let q = Question::new(TypeCode::Email);
        let rendered = renderer.render_question(5, &q);

        assert!(rendered.fragment.is_empty());
        assert_eq!(
            rendered.diagnostic,
            Some(Diagnostic::TemplateNotFound {
                index: 5,
                template: TemplateId::new("email"),
            })
        );
    }

    #[test]
    fn unsupported_type_degrades() {
        let q = Question::new("PC");
        let rendered = bundled().render_question(1, &q);

        assert!(rendered.fragment.is_empty());
        assert_eq!(
            rendered.diagnostic,
            Some(Diagnostic::UnsupportedType {
                index: 1,
                code: "PC".to_string(),
            })
        );
    }

    #[test]
    fn malformed_template_degrades() {
        let store = MapTemplates::new().with_template("yes_no_template", "{{#question}} oops");
        let rendered = TemplateRenderer::new(store).render_question(0, &Question::new(TypeCode::YesNo));

        assert!(rendered.fragment.is_empty());
        assert!(matches!(
            rendered.diagnostic,
            Some(Diagnostic::MalformedTemplate { index: 0, .. })
        ));
    }
}
