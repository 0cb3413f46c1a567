use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

use crate::catalog::PartId;
use crate::error::SessionError;
use crate::qa::{Answer, QaClient};
use crate::session::{Dispatch, Resolution, Session, SessionController};
use crate::view::{ViewProjector, ViewState};

/// A finished question, waiting to be applied to the session.
struct Completion {
    dispatch: Dispatch,
    answer: Answer,
}

/// Event-loop driver around a [`SessionController`].
///
/// Every dispatched question runs in its own task and reports back through a
/// channel; [`Inspector::next_resolution`] applies completions one at a time on
/// the task that owns the inspector, so the controller is never shared.
pub struct Inspector {
    controller: SessionController,
    projector: ViewProjector,
    client: Arc<dyn QaClient>,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
    in_flight: usize,
}

impl Inspector {
    pub fn new(
        controller: SessionController,
        projector: ViewProjector,
        client: Arc<dyn QaClient>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            controller,
            projector,
            client,
            tx,
            rx,
            in_flight: 0,
        }
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    pub fn session(&self) -> Option<&Session> {
        self.controller.session()
    }

    /// Questions spawned but not yet applied.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn view(&self) -> Option<ViewState> {
        self.controller.view(&self.projector)
    }

    pub fn start_session(&mut self, vehicle_id: &str) -> Result<(), SessionError> {
        self.controller.start_session(vehicle_id)?;
        Ok(())
    }

    pub fn select_part(&mut self, part_id: PartId) -> Result<(), SessionError> {
        if let Some(dispatch) = self.controller.select_part(part_id)? {
            self.spawn_ask(dispatch);
        }
        Ok(())
    }

    pub fn set_follow_up_input(&mut self, text: &str) -> Result<(), SessionError> {
        self.controller.set_follow_up_input(text)
    }

    pub fn ask_follow_up(&mut self, text: &str) -> Result<(), SessionError> {
        let dispatch = self.controller.ask_follow_up(text)?;
        self.spawn_ask(dispatch);
        Ok(())
    }

    /// Send whatever follow-up text has been typed so far.
    pub fn submit_follow_up(&mut self) -> Result<(), SessionError> {
        let text = self
            .session()
            .and_then(|s| s.follow_up())
            .unwrap_or_default()
            .to_string();
        self.ask_follow_up(&text)
    }

    pub fn deselect_part(&mut self) {
        self.controller.deselect_part();
    }

    /// Wait for the next question to finish and apply it.
    ///
    /// Cancel safe, so it can sit in a `tokio::select!` next to user input.
    pub async fn next_resolution(&mut self) -> Option<(PartId, Resolution)> {
        let completion = self.rx.recv().await?;
        self.in_flight = self.in_flight.saturating_sub(1);

        let part_id = completion.dispatch.part_id;
        let resolution = self.controller.resolve(&completion.dispatch, completion.answer);
        debug!(part_id, ?resolution, "completion applied");
        Some((part_id, resolution))
    }

    fn spawn_ask(&mut self, dispatch: Dispatch) {
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        self.in_flight += 1;

        tokio::spawn(async move {
            let answer = client.ask(&dispatch.question).await;
            // The inspector may have been dropped; nothing left to update then.
            let _ = tx.send(Completion { dispatch, answer });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::error::QaError;
    use crate::session::InquiryStatus;
    use crate::view::PanelState;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::sync::Notify;

    /// Answers every question with a canned reply and records what was asked.
    #[derive(Default)]
    struct EchoClient {
        asked: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl QaClient for EchoClient {
        async fn ask(&self, question: &str) -> Answer {
            self.asked.lock().unwrap().push(question.to_string());
            if self.fail {
                Err(QaError::Status(500))
            } else {
                Ok(format!("re: {question}"))
            }
        }
    }

    /// Holds every answer until released.
    struct GatedClient {
        gate: Notify,
    }

    #[async_trait]
    impl QaClient for GatedClient {
        async fn ask(&self, question: &str) -> Answer {
            self.gate.notified().await;
            Ok(format!("late: {question}"))
        }
    }

    fn inspector(client: Arc<dyn QaClient>) -> Inspector {
        let controller = SessionController::new(Arc::new(Catalog::builtin()));
        Inspector::new(controller, ViewProjector::default(), client)
    }

    #[tokio::test]
    async fn selecting_a_part_fetches_its_answer() {
        let client = Arc::new(EchoClient::default());
        let mut inspector = inspector(client.clone());
        inspector.start_session("Gt").unwrap();
        inspector.select_part(1).unwrap();
        assert_eq!(inspector.in_flight(), 1);
        assert_eq!(inspector.view().unwrap().panel.state, PanelState::Loading);

        let (part, resolution) = inspector.next_resolution().await.unwrap();
        assert_eq!((part, resolution), (1, Resolution::Answered));
        assert_eq!(inspector.in_flight(), 0);

        let view = inspector.view().unwrap();
        assert_eq!(view.panel.state, PanelState::Answer);
        assert_eq!(
            view.panel.text.as_deref(),
            Some("re: Tell me about this V7 engine.")
        );

        // Cached: reselecting asks nothing new.
        inspector.deselect_part();
        inspector.select_part(1).unwrap();
        assert_eq!(inspector.in_flight(), 0);
        assert_eq!(client.asked.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn typed_follow_up_is_submitted() {
        let client = Arc::new(EchoClient::default());
        let mut inspector = inspector(client.clone());
        inspector.start_session("Car").unwrap();
        inspector.select_part(4).unwrap();
        inspector.next_resolution().await.unwrap();

        inspector.set_follow_up_input("Are they ceramic?").unwrap();
        inspector.submit_follow_up().unwrap();
        inspector.next_resolution().await.unwrap();

        let session = inspector.session().unwrap();
        assert_eq!(
            session.inquiry(4).unwrap().answer_text(),
            Some("re: Are they ceramic?")
        );
        assert_eq!(
            *client.asked.lock().unwrap(),
            ["Explain the brake performance specs.", "Are they ceramic?"]
        );
    }

    #[tokio::test]
    async fn empty_submission_is_rejected() {
        let mut inspector = inspector(Arc::new(EchoClient::default()));
        inspector.start_session("Car").unwrap();
        inspector.select_part(4).unwrap();
        inspector.next_resolution().await.unwrap();

        assert_eq!(inspector.submit_follow_up(), Err(SessionError::EmptyQuestion));
        assert_eq!(inspector.in_flight(), 0);
    }

    #[tokio::test]
    async fn transport_failure_shows_fallback() {
        let client = Arc::new(EchoClient {
            fail: true,
            ..EchoClient::default()
        });
        let mut inspector = inspector(client);
        inspector.start_session("Car").unwrap();
        inspector.select_part(3).unwrap();

        let (_, resolution) = inspector.next_resolution().await.unwrap();
        assert_eq!(resolution, Resolution::Failed);
        let view = inspector.view().unwrap();
        assert_eq!(view.panel.state, PanelState::Error);
        assert_eq!(view.panel.text.as_deref(), Some("Failed to load response."));
    }

    #[tokio::test]
    async fn late_answer_for_previous_vehicle_is_dropped() {
        let client = Arc::new(GatedClient {
            gate: Notify::new(),
        });
        let mut inspector = inspector(client.clone());
        inspector.start_session("Car").unwrap();
        inspector.select_part(1).unwrap();

        inspector.start_session("Mustang1968").unwrap();
        client.gate.notify_one();

        let (part, resolution) = inspector.next_resolution().await.unwrap();
        assert_eq!((part, resolution), (1, Resolution::Stale));
        let session = inspector.session().unwrap();
        assert_eq!(session.vehicle().id, "Mustang1968");
        assert!(session
            .inquiries()
            .iter()
            .all(|i| i.status == InquiryStatus::Idle));
    }
}
