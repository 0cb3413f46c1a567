//! Per-vehicle inspection sessions and the question/answer state of each part.

mod controller;

pub use controller::{Dispatch, Resolution, SessionController};

use serde::Serialize;
use std::sync::Arc;

use crate::catalog::{CatalogEntry, Part, PartId, Vehicle};

/// Shown in place of an answer when the service could not be reached.
pub const FAILED_RESPONSE: &str = "Failed to load response.";

/// Identifies one dispatched question so its completion can be matched later.
pub type RequestId = u64;

/// Question/answer lifecycle of a single part.
///
/// `Idle → Pending → Answered | Failed`. A follow-up question moves an
/// `Answered` or `Failed` inquiry back to `Pending`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "state")]
pub enum InquiryStatus {
    Idle,
    Pending {
        #[serde(skip)]
        request: RequestId,
    },
    Answered {
        text: String,
    },
    Failed {
        #[serde(skip)]
        reason: String,
    },
}

impl InquiryStatus {
    pub fn is_idle(&self) -> bool {
        matches!(self, InquiryStatus::Idle)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, InquiryStatus::Pending { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartInquiry {
    pub part_id: PartId,
    pub status: InquiryStatus,
    pub last_question: Option<String>,
}

impl PartInquiry {
    fn idle(part_id: PartId) -> Self {
        Self {
            part_id,
            status: InquiryStatus::Idle,
            last_question: None,
        }
    }

    /// The answer text, present only once answered.
    pub fn answer_text(&self) -> Option<&str> {
        match &self.status {
            InquiryStatus::Answered { text } => Some(text),
            _ => None,
        }
    }

    /// What the answer panel shows: the answer, or the fixed failure message.
    pub fn display_text(&self) -> Option<&str> {
        match &self.status {
            InquiryStatus::Answered { text } => Some(text),
            InquiryStatus::Failed { .. } => Some(FAILED_RESPONSE),
            _ => None,
        }
    }
}

/// The active inspection context: one vehicle, one inquiry per part.
#[derive(Clone, Debug)]
pub struct Session {
    generation: u64,
    vehicle: Arc<Vehicle>,
    parts: Arc<[Part]>,
    inquiries: Vec<PartInquiry>,
    selected: Option<PartId>,
    follow_up: Option<String>,
}

impl Session {
    fn new(generation: u64, entry: &CatalogEntry) -> Self {
        let inquiries = entry.parts.iter().map(|p| PartInquiry::idle(p.id)).collect();
        Self {
            generation,
            vehicle: Arc::clone(&entry.vehicle),
            parts: Arc::clone(&entry.parts),
            inquiries,
            selected: None,
            follow_up: None,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn vehicle(&self) -> &Vehicle {
        &self.vehicle
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Inquiries, index-aligned with [`Session::parts`].
    pub fn inquiries(&self) -> &[PartInquiry] {
        &self.inquiries
    }

    pub fn selected_part_id(&self) -> Option<PartId> {
        self.selected
    }

    pub fn selected_part(&self) -> Option<&Part> {
        self.selected.and_then(|id| self.part(id))
    }

    pub fn follow_up(&self) -> Option<&str> {
        self.follow_up.as_deref()
    }

    pub fn part(&self, id: PartId) -> Option<&Part> {
        self.parts.iter().find(|p| p.id == id)
    }

    pub fn inquiry(&self, id: PartId) -> Option<&PartInquiry> {
        self.index_of(id).map(|i| &self.inquiries[i])
    }

    fn index_of(&self, id: PartId) -> Option<usize> {
        self.parts.iter().position(|p| p.id == id)
    }

    fn inquiry_mut(&mut self, id: PartId) -> Option<&mut PartInquiry> {
        self.index_of(id).map(move |i| &mut self.inquiries[i])
    }
}
