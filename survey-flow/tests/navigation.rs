//! Integration tests for the navigation state machine

use survey_flow::{
    BundledTemplates, ControlKind, Diagnostic, Interaction, Key, MULTIPLE_SELECTION_KEY,
    MapTemplates, NavigationController, NavigationState, Parameters, Question, QuestionSequence,
    Reaction, ScriptError, ScriptedSession, TemplateId, TypeCode, resolve_template,
};

fn controller(questions: Vec<Question>) -> NavigationController<BundledTemplates> {
    NavigationController::with_store(QuestionSequence::new(questions), BundledTemplates::new())
}

fn click(controller: &mut NavigationController<BundledTemplates>, label: &str) -> Reaction {
    let id = controller
        .fragment()
        .and_then(|f| f.find(label))
        .unwrap_or_else(|| panic!("no control {label:?}"))
        .id;
    controller.interact(Interaction::Click(id))
}

fn single_choice(labels: &[&str]) -> Question {
    Question::new(TypeCode::MultipleChoice)
        .with_parameters(Parameters::new().with(MULTIPLE_SELECTION_KEY, false))
        .with_choices(labels.iter().copied())
}

#[test]
fn test_every_code_resolves() {
    for code in TypeCode::ALL {
        let id = resolve_template(&code.into()).unwrap();
        assert!(!id.name().is_empty());
    }
    for code in ["PC", "", "yn", "XX"] {
        assert!(resolve_template(&code.into()).is_err(), "{code:?}");
    }
}

#[test]
fn test_yes_no_then_single_choice_scenario() {
    let mut c = controller(vec![
        Question::new(TypeCode::YesNo).with_prompt("Do you agree?"),
        single_choice(&["A", "B"]),
    ]);
    assert_eq!(c.state(), NavigationState::Rendering(0));

    assert_eq!(click(&mut c, "Yes"), Reaction::Completed);
    assert_eq!(c.state(), NavigationState::Rendering(1));

    assert_eq!(click(&mut c, "A"), Reaction::Completed);
    assert_eq!(c.state(), NavigationState::Done);
    assert!(c.fragment().is_none());
    assert!(c.diagnostics().is_empty());
}

#[test]
fn test_single_trigger_types_advance_on_any_control() {
    let questions = [
        Question::new(TypeCode::YesNo),
        Question::new(TypeCode::Legal),
        Question::new(TypeCode::OpinionScale)
            .with_parameters(Parameters::new().with("number_of_steps", 5)),
        Question::new(TypeCode::Rating)
            .with_parameters(Parameters::new().with("number_of_steps", 3)),
    ];
    for question in questions {
        let probe = controller(vec![question.clone()]);
        let count = probe.fragment().map_or(0, |f| f.controls().len());
        assert!(count > 0, "{}", question.kind());

        for index in 0..count {
            let mut c = controller(vec![question.clone(), Question::new(TypeCode::Statement)]);
            let id = c.fragment().unwrap().controls()[index].id;
            assert_eq!(c.interact(Interaction::Click(id)), Reaction::Completed);
            assert_eq!(c.state(), NavigationState::Rendering(1));
        }
    }
}

#[test]
fn test_single_choice_selecting_any_option_advances() {
    for label in ["X", "Y", "Z"] {
        let mut c = controller(vec![single_choice(&["X", "Y", "Z"]), Question::new(TypeCode::Email)]);
        let stale = c.token();

        assert_eq!(click(&mut c, label), Reaction::Completed);
        assert_eq!(c.state(), NavigationState::Rendering(1));

        // Further clicks on the answered question go nowhere.
        assert_eq!(c.dispatch(stale, Interaction::Submit), Reaction::Ignored);
        assert_eq!(c.state(), NavigationState::Rendering(1));
    }
}

#[test]
fn test_multi_choice_only_submit_advances() {
    let mut c = controller(vec![
        Question::new(TypeCode::MultipleChoice)
            .with_parameters(Parameters::new().with(MULTIPLE_SELECTION_KEY, true))
            .with_choices(["A", "B", "C"]),
        Question::new(TypeCode::ThankYouScreen),
    ]);

    for label in ["A", "B", "A", "C", "B", "B"] {
        assert_eq!(click(&mut c, label), Reaction::Updated);
        assert_eq!(c.state(), NavigationState::Rendering(0));
    }
    assert_eq!(c.fragment().unwrap().selected_labels(), vec!["B", "C"]);

    assert_eq!(c.interact(Interaction::Submit), Reaction::Completed);
    assert_eq!(c.state(), NavigationState::Rendering(1));
}

#[test]
fn test_free_text_confirm_key_advances() {
    for code in [
        TypeCode::ShortText,
        TypeCode::Email,
        TypeCode::PhoneNumber,
        TypeCode::Number,
        TypeCode::Website,
        TypeCode::Date,
        TypeCode::FileUpload,
        TypeCode::Payment,
    ] {
        let mut c = controller(vec![Question::new(code), Question::new(TypeCode::Statement)]);
        let input = c
            .fragment()
            .unwrap()
            .controls()
            .iter()
            .find(|ctl| ctl.kind.is_single_line())
            .unwrap_or_else(|| panic!("{code} has no single-line input"))
            .id;

        for ch in "42".chars() {
            let typed = c.interact(Interaction::Key {
                control: input,
                key: Key::Char(ch),
            });
            assert_eq!(typed, Reaction::Updated);
        }
        assert_eq!(c.interact(Interaction::Click(input)), Reaction::Ignored);
        assert_eq!(c.state(), NavigationState::Rendering(0), "{code}");

        let confirmed = c.interact(Interaction::Key {
            control: input,
            key: Key::Confirm,
        });
        assert_eq!(confirmed, Reaction::Completed, "{code}");
        assert_eq!(c.state(), NavigationState::Rendering(1), "{code}");
    }
}

#[test]
fn test_free_text_clicks_do_not_advance() {
    let mut c = controller(vec![
        Question::new(TypeCode::Dropdown).with_choices(["Red", "Green"]),
        Question::new(TypeCode::Statement),
    ]);
    let select = c.fragment().unwrap().first_of(ControlKind::Select).unwrap().id;

    assert_eq!(c.interact(Interaction::Click(select)), Reaction::Ignored);
    let picked = c.interact(Interaction::SetValue {
        control: select,
        value: "Red".to_string(),
    });
    assert_eq!(picked, Reaction::Updated);
    assert_eq!(c.state(), NavigationState::Rendering(0));

    assert_eq!(click(&mut c, "OK"), Reaction::Completed);
    assert_eq!(c.state(), NavigationState::Rendering(1));
}

#[test]
fn test_stale_render_cannot_advance() {
    let mut c = controller(vec![
        Question::new(TypeCode::YesNo),
        Question::new(TypeCode::YesNo),
    ]);
    let stale = c.token();
    let yes = c.fragment().unwrap().find("Yes").unwrap().id;

    let fresh = c.render_current();
    assert_ne!(stale, fresh);

    assert_eq!(c.dispatch(stale, Interaction::Click(yes)), Reaction::Ignored);
    assert_eq!(c.dispatch(stale, Interaction::Submit), Reaction::Ignored);
    assert_eq!(c.state(), NavigationState::Rendering(0));

    assert_eq!(c.dispatch(fresh, Interaction::Click(yes)), Reaction::Completed);
    assert_eq!(c.state(), NavigationState::Rendering(1));

    // The token of the completed question is stale too.
    assert_eq!(c.dispatch(fresh, Interaction::Submit), Reaction::Ignored);
    assert_eq!(c.state(), NavigationState::Rendering(1));
}

#[test]
fn test_last_question_enters_done_and_stops() {
    let mut c = controller(vec![Question::new(TypeCode::Statement)]);
    let token = c.token();

    assert_eq!(c.interact(Interaction::Submit), Reaction::Completed);
    assert_eq!(c.state(), NavigationState::Done);
    assert_eq!(c.token(), token);
    assert!(c.current_question().is_none());
    assert!(c.widgets().is_empty());

    assert_eq!(c.interact(Interaction::Submit), Reaction::Ignored);
    assert_eq!(c.render_current(), c.token());
    assert!(c.fragment().is_none());
    assert_eq!(c.progress(), (1, 1));
}

#[test]
fn test_empty_sequence_starts_done() {
    let c = controller(Vec::new());
    assert_eq!(c.state(), NavigationState::Done);
    assert!(c.fragment().is_none());
    assert_eq!(c.progress(), (0, 0));
}

#[test]
fn test_unsupported_type_degrades_but_submits() {
    let mut c = controller(vec![
        Question::new("PC").with_prompt("Pick a picture"),
        Question::new(TypeCode::YesNo),
    ]);

    assert!(c.fragment().unwrap().is_empty());
    assert_eq!(
        c.diagnostics(),
        &[Diagnostic::UnsupportedType {
            index: 0,
            code: "PC".to_string(),
        }]
    );

    assert_eq!(c.interact(Interaction::Submit), Reaction::Completed);
    assert_eq!(c.state(), NavigationState::Rendering(1));
}

#[test]
fn test_missing_template_degrades_but_submits() {
    let store = MapTemplates::new().with_template("yes_no_template", "{{question}}\n@button Yes\n");
    let sequence = QuestionSequence::new(vec![
        Question::new(TypeCode::Email),
        Question::new(TypeCode::YesNo).with_prompt("Still there?"),
    ]);
    let mut c = NavigationController::with_store(sequence, store);

    assert!(c.fragment().unwrap().is_empty());
    assert_eq!(
        c.diagnostics(),
        &[Diagnostic::TemplateNotFound {
            index: 0,
            template: TemplateId::new("email"),
        }]
    );

    // Re-rendering the same question does not record the problem twice.
    c.render_current();
    assert_eq!(c.diagnostics().len(), 1);

    assert_eq!(c.interact(Interaction::Submit), Reaction::Completed);
    assert_eq!(
        c.fragment().unwrap().text(),
        "Still there?\n[Yes]"
    );
}

#[test]
fn test_independent_sessions() {
    let mut first = controller(vec![Question::new(TypeCode::YesNo)]);
    let second = controller(vec![Question::new(TypeCode::YesNo)]);

    assert_eq!(click(&mut first, "No"), Reaction::Completed);
    assert_eq!(first.state(), NavigationState::Done);
    assert_eq!(second.state(), NavigationState::Rendering(0));
}

#[test]
fn test_scripted_session_runs_to_done() {
    let mut c = controller(vec![
        Question::new(TypeCode::WelcomeScreen),
        Question::new(TypeCode::YesNo),
        single_choice(&["A", "B"]),
        Question::new(TypeCode::LongText),
        Question::new(TypeCode::ShortText),
    ]);
    let script = ScriptedSession::new()
        .click_label("Start")
        .click_label("No")
        .click_label("B")
        .type_text("line")
        .confirm()
        .submit()
        .type_text("ok")
        .confirm();

    let state = c.run(&script).unwrap();
    assert_eq!(state, NavigationState::Done);

    let reactions = script.reactions();
    assert_eq!(reactions.iter().filter(|r| r.is_completed()).count(), 5);
}

#[test]
fn test_scripted_session_reports_missing_control() {
    let mut c = controller(vec![Question::new(TypeCode::YesNo)]);
    let err = ScriptedSession::new()
        .click_label("Maybe")
        .play(&mut c)
        .unwrap_err();
    assert!(matches!(err, ScriptError::MissingControl { step: 0, .. }));

    let err = ScriptedSession::new()
        .click_label("Yes")
        .submit()
        .play(&mut c)
        .unwrap_err();
    assert!(matches!(err, ScriptError::AlreadyDone { step: 1 }));
}
