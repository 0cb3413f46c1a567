use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{InquiryStatus, RequestId, Session};
use crate::catalog::{Catalog, PartId};
use crate::error::SessionError;
use crate::qa::Answer;
use crate::view::{ViewProjector, ViewState};

/// A question the controller wants asked. The caller runs it against a
/// [`QaClient`](crate::qa::QaClient) and hands the ticket back to
/// [`SessionController::resolve`] along with the answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dispatch {
    pub generation: u64,
    pub part_id: PartId,
    pub request_id: RequestId,
    pub question: String,
}

/// What [`SessionController::resolve`] did with a completion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    Answered,
    Failed,
    /// The session moved on or the inquiry is no longer waiting for this
    /// request. Nothing changed.
    Stale,
}

/// Owns the active session and drives every state transition.
///
/// All methods take `&mut self`: mutation happens on one logical thread and the
/// `Pending` state alone guarantees one request in flight per part.
pub struct SessionController {
    catalog: Arc<Catalog>,
    session: Option<Session>,
    next_generation: u64,
    next_request: RequestId,
}

impl SessionController {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            session: None,
            next_generation: 1,
            next_request: 1,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Begin inspecting a vehicle. Calling this again, even with the same id,
    /// discards every answer from the previous session.
    pub fn start_session(&mut self, vehicle_id: &str) -> Result<&Session, SessionError> {
        let entry = self.catalog.entry(vehicle_id)?;
        let generation = self.next_generation;
        self.next_generation += 1;

        info!(vehicle = vehicle_id, generation, parts = entry.parts.len(), "session started");
        Ok(self.session.insert(Session::new(generation, entry)))
    }

    /// Select a part. The first time a part is viewed in a session its default
    /// question is dispatched; afterwards the cached state is reused.
    pub fn select_part(&mut self, part_id: PartId) -> Result<Option<Dispatch>, SessionError> {
        let session = self
            .session
            .as_mut()
            .ok_or(SessionError::UnknownPart(part_id))?;
        let question = session
            .part(part_id)
            .map(|p| p.default_question.clone())
            .ok_or(SessionError::UnknownPart(part_id))?;

        session.selected = Some(part_id);
        session.follow_up = None;

        let idle = session.inquiry(part_id).is_some_and(|i| i.status.is_idle());
        if !idle {
            debug!(part_id, "part reselected, using cached state");
            return Ok(None);
        }

        Ok(Some(self.dispatch(part_id, question)))
    }

    /// Store the in-progress follow-up text for the selected part.
    pub fn set_follow_up_input(&mut self, text: &str) -> Result<(), SessionError> {
        let session = self
            .session
            .as_mut()
            .filter(|s| s.selected.is_some())
            .ok_or(SessionError::NoActivePart)?;
        session.follow_up = Some(text.to_string());
        Ok(())
    }

    /// Ask a free-text question about the selected part.
    pub fn ask_follow_up(&mut self, text: &str) -> Result<Dispatch, SessionError> {
        let session = self.session.as_mut().ok_or(SessionError::NoActivePart)?;
        let part_id = session.selected.ok_or(SessionError::NoActivePart)?;

        if text.trim().is_empty() {
            return Err(SessionError::EmptyQuestion);
        }
        if session.inquiry(part_id).is_some_and(|i| i.status.is_pending()) {
            return Err(SessionError::RequestInFlight(part_id));
        }

        session.follow_up = None;
        Ok(self.dispatch(part_id, text.to_string()))
    }

    /// Clear the selection. Cached answers stay for the rest of the session.
    pub fn deselect_part(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.selected = None;
            session.follow_up = None;
        }
    }

    /// Apply a completed question.
    ///
    /// Only a completion for the current session whose inquiry is still waiting
    /// on this exact request is applied; anything else is ignored.
    pub fn resolve(&mut self, dispatch: &Dispatch, answer: Answer) -> Resolution {
        let Some(session) = self
            .session
            .as_mut()
            .filter(|s| s.generation == dispatch.generation)
        else {
            warn!(
                part_id = dispatch.part_id,
                generation = dispatch.generation,
                "dropping response from an abandoned session"
            );
            return Resolution::Stale;
        };

        let Some(inquiry) = session
            .inquiry_mut(dispatch.part_id)
            .filter(|i| i.status == InquiryStatus::Pending { request: dispatch.request_id })
        else {
            warn!(
                part_id = dispatch.part_id,
                request_id = dispatch.request_id,
                "dropping response for an inquiry that is not waiting on it"
            );
            return Resolution::Stale;
        };

        match answer {
            Ok(text) => {
                debug!(part_id = dispatch.part_id, "answered");
                inquiry.status = InquiryStatus::Answered { text };
                Resolution::Answered
            }
            Err(e) => {
                warn!(part_id = dispatch.part_id, error = %e, "inquiry failed");
                inquiry.status = InquiryStatus::Failed {
                    reason: e.to_string(),
                };
                Resolution::Failed
            }
        }
    }

    /// Project the current session with the given projector.
    pub fn view(&self, projector: &ViewProjector) -> Option<ViewState> {
        self.session.as_ref().map(|s| projector.project(s))
    }

    // Callers have already checked that the session and part exist.
    fn dispatch(&mut self, part_id: PartId, question: String) -> Dispatch {
        let request_id = self.next_request;
        self.next_request += 1;

        let mut generation = 0;
        if let Some(session) = self.session.as_mut() {
            generation = session.generation;
            if let Some(inquiry) = session.inquiry_mut(part_id) {
                inquiry.status = InquiryStatus::Pending {
                    request: request_id,
                };
                inquiry.last_question = Some(question.clone());
            }
        }

        debug!(part_id, request_id, question = %question, "dispatching question");
        Dispatch {
            generation,
            part_id,
            request_id,
            question,
        }
    }
}
