use survey_flow_types::QuestionSequence;

use crate::navigation::{NavigationController, NavigationState};
use crate::store::TemplateStore;

/// Trait for front-ends that present a session to a respondent.
///
/// A front-end shows the controller's current fragment, turns user input into
/// interactions and dispatches them until the session is done or the
/// respondent gives up. It never moves the cursor itself.
pub trait SurveyFrontend {
    /// The error type for this front-end.
    type Error: Into<anyhow::Error>;

    /// Drive `controller` until it reaches `Done` or the front-end stops.
    ///
    /// Returns the state the controller was left in.
    fn run<S: TemplateStore>(
        &self,
        controller: &mut NavigationController<S>,
    ) -> Result<NavigationState, Self::Error>;
}

impl<S: TemplateStore> NavigationController<S> {
    /// Hand the session over to a front-end.
    pub fn run<F: SurveyFrontend>(&mut self, frontend: &F) -> anyhow::Result<NavigationState> {
        frontend.run(self).map_err(Into::into)
    }
}

/// Start a session over `sequence` and run it on `frontend`.
pub fn run_session<S, F>(
    sequence: QuestionSequence,
    store: S,
    frontend: &F,
) -> anyhow::Result<NavigationController<S>>
where
    S: TemplateStore,
    F: SurveyFrontend,
{
    let mut controller = NavigationController::with_store(sequence, store);
    controller.run(frontend)?;
    Ok(controller)
}
