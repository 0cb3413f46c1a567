//! Renderer-facing projection of a session.
//!
//! [`project`] is a pure function of the session: callers recompute it after
//! every controller transition and hand the result to whatever draws the scene.

use serde::Serialize;
use std::collections::HashSet;
use std::f32::consts::FRAC_PI_4;

use crate::catalog::{EngineClass, PartId, PartName, PartStatus};
use crate::session::{InquiryStatus, Session};

/// Engine classes that ship with a detailed 3D model.
pub const DETAIL_MODELS: [EngineClass; 3] = [EngineClass::V6, EngineClass::V7, EngineClass::V8];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CameraFraming {
    Overview,
    PartDetail,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraPose {
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub fov: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    pub position: [f32; 3],
    pub rotation: [f32; 3],
    pub scale: f32,
}

/// What the renderer should put in front of the camera.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum SceneSubject {
    #[serde(rename_all = "camelCase")]
    Vehicle {
        vehicle_id: String,
        transform: Transform,
    },
    #[serde(rename_all = "camelCase")]
    EngineDetail {
        engine: EngineClass,
        transform: Transform,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleSummary {
    pub id: String,
    pub name: String,
    pub model_year: u16,
    pub engine: EngineClass,
    pub top_speed_mph: u16,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartCard {
    pub id: PartId,
    pub name: PartName,
    pub description: String,
    pub status: PartStatus,
    pub inquiry: InquiryStatus,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PanelState {
    /// No part selected; the part list is showing.
    Hidden,
    Idle,
    Loading,
    Answer,
    Error,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Panel {
    pub state: PanelState,
    pub text: Option<String>,
    pub follow_up: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub vehicle: VehicleSummary,
    pub parts: Vec<PartCard>,
    pub highlighted_part: Option<PartId>,
    pub framing: CameraFraming,
    /// The engine is selected but its class has no detail model to show.
    pub detail_unavailable: bool,
    pub camera: CameraPose,
    pub subject: SceneSubject,
    pub panel: Panel,
}

/// Projects sessions against a set of available engine detail models.
#[derive(Clone, Debug)]
pub struct ViewProjector {
    detail_models: HashSet<EngineClass>,
}

impl Default for ViewProjector {
    fn default() -> Self {
        Self::new(DETAIL_MODELS)
    }
}

impl ViewProjector {
    pub fn new(detail_models: impl IntoIterator<Item = EngineClass>) -> Self {
        Self {
            detail_models: detail_models.into_iter().collect(),
        }
    }

    pub fn has_detail_model(&self, engine: EngineClass) -> bool {
        self.detail_models.contains(&engine)
    }

    pub fn project(&self, session: &Session) -> ViewState {
        let vehicle = session.vehicle();
        let selected = session.selected_part();
        let engine_selected = selected.is_some_and(|p| p.name == PartName::Engine);
        let has_detail = self.has_detail_model(vehicle.engine);

        let framing = if engine_selected && has_detail {
            CameraFraming::PartDetail
        } else {
            CameraFraming::Overview
        };

        let (camera, subject) = match framing {
            CameraFraming::PartDetail => (
                engine_camera(vehicle.engine),
                SceneSubject::EngineDetail {
                    engine: vehicle.engine,
                    transform: engine_transform(vehicle.engine),
                },
            ),
            CameraFraming::Overview => (
                overview_camera(),
                SceneSubject::Vehicle {
                    vehicle_id: vehicle.id.clone(),
                    transform: vehicle_transform(),
                },
            ),
        };

        let parts = session
            .parts()
            .iter()
            .zip(session.inquiries())
            .map(|(part, inquiry)| PartCard {
                id: part.id,
                name: part.name,
                description: part.description.clone(),
                status: part.status,
                inquiry: inquiry.status.clone(),
            })
            .collect();

        ViewState {
            vehicle: VehicleSummary {
                id: vehicle.id.clone(),
                name: vehicle.name.clone(),
                model_year: vehicle.model_year,
                engine: vehicle.engine,
                top_speed_mph: vehicle.top_speed_mph,
            },
            parts,
            highlighted_part: session.selected_part_id(),
            framing,
            detail_unavailable: engine_selected && !has_detail,
            camera,
            subject,
            panel: panel(session),
        }
    }
}

/// Project with the default set of detail models.
pub fn project(session: &Session) -> ViewState {
    ViewProjector::default().project(session)
}

fn panel(session: &Session) -> Panel {
    let Some(inquiry) = session
        .selected_part_id()
        .and_then(|id| session.inquiry(id))
    else {
        return Panel {
            state: PanelState::Hidden,
            text: None,
            follow_up: None,
        };
    };

    let state = match inquiry.status {
        InquiryStatus::Idle => PanelState::Idle,
        InquiryStatus::Pending { .. } => PanelState::Loading,
        InquiryStatus::Answered { .. } => PanelState::Answer,
        InquiryStatus::Failed { .. } => PanelState::Error,
    };

    Panel {
        state,
        text: inquiry.display_text().map(str::to_string),
        follow_up: session.follow_up().map(str::to_string),
    }
}

fn overview_camera() -> CameraPose {
    CameraPose {
        position: [5.0, 3.0, 5.0],
        target: [0.0, 1.0, 0.0],
        fov: 50.0,
        min_distance: 3.0,
        max_distance: 12.0,
    }
}

// The V8 model is much larger, so the camera sits further back and may zoom out further.
fn engine_camera(engine: EngineClass) -> CameraPose {
    let (position, max_distance) = match engine {
        EngineClass::V8 => ([6.0, 6.0, 30.0], 200.0),
        _ => ([6.0, 5.0, 12.0], 20.0),
    };
    CameraPose {
        position,
        target: [0.0, 0.0, 0.0],
        fov: 50.0,
        min_distance: 2.0,
        max_distance,
    }
}

fn vehicle_transform() -> Transform {
    Transform {
        position: [0.0, -1.0, 0.0],
        rotation: [0.0, FRAC_PI_4, 0.0],
        scale: 1.8,
    }
}

fn engine_transform(engine: EngineClass) -> Transform {
    let scale = match engine {
        EngineClass::V8 => 0.2,
        _ => 2.5,
    };
    Transform {
        position: [0.0, 0.0, 0.0],
        rotation: [0.0, 0.0, 0.0],
        scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::error::QaError;
    use crate::session::{SessionController, FAILED_RESPONSE};
    use std::sync::Arc;

    fn started(vehicle: &str) -> SessionController {
        let mut c = SessionController::new(Arc::new(Catalog::builtin()));
        c.start_session(vehicle).unwrap();
        c
    }

    fn view(c: &SessionController) -> ViewState {
        project(c.session().unwrap())
    }

    #[test]
    fn fresh_session_shows_overview_and_part_list() {
        let c = started("Gt");
        let v = view(&c);
        assert_eq!(v.vehicle.name, "GT Sports");
        assert_eq!(v.parts.len(), 6);
        assert_eq!(v.highlighted_part, None);
        assert_eq!(v.framing, CameraFraming::Overview);
        assert_eq!(v.camera, overview_camera());
        assert!(matches!(v.subject, SceneSubject::Vehicle { ref vehicle_id, .. } if vehicle_id == "Gt"));
        assert_eq!(v.panel.state, PanelState::Hidden);
    }

    #[test]
    fn engine_selection_frames_engine_detail() {
        let mut c = started("Mustang1968");
        c.select_part(1).unwrap();
        let v = view(&c);
        assert_eq!(v.framing, CameraFraming::PartDetail);
        assert_eq!(v.highlighted_part, Some(1));
        assert_eq!(v.camera.position, [6.0, 6.0, 30.0]);
        assert_eq!(v.camera.max_distance, 200.0);
        assert_eq!(
            v.subject,
            SceneSubject::EngineDetail {
                engine: EngineClass::V8,
                transform: engine_transform(EngineClass::V8),
            }
        );
        assert_eq!(v.panel.state, PanelState::Loading);
        assert_eq!(v.panel.text, None);
    }

    #[test]
    fn other_parts_stay_on_overview() {
        let mut c = started("Car");
        c.select_part(4).unwrap();
        let v = view(&c);
        assert_eq!(v.framing, CameraFraming::Overview);
        assert!(!v.detail_unavailable);
        assert_eq!(v.highlighted_part, Some(4));
    }

    #[test]
    fn missing_detail_model_falls_back_to_overview() {
        let mut c = started("Gt");
        c.select_part(1).unwrap();

        let projector = ViewProjector::new([EngineClass::V6, EngineClass::V8]);
        let v = projector.project(c.session().unwrap());
        assert_eq!(v.framing, CameraFraming::Overview);
        assert!(v.detail_unavailable);
        assert!(matches!(v.subject, SceneSubject::Vehicle { .. }));
        assert_eq!(v.panel.state, PanelState::Loading);
    }

    #[test]
    fn panel_reflects_inquiry_state() {
        let mut c = started("Car");
        let d = c.select_part(2).unwrap().unwrap();
        c.set_follow_up_input("gear ratios?").unwrap();
        assert_eq!(view(&c).panel.follow_up.as_deref(), Some("gear ratios?"));

        c.resolve(&d, Err(QaError::Status(503)));
        let v = view(&c);
        assert_eq!(v.panel.state, PanelState::Error);
        assert_eq!(v.panel.text.as_deref(), Some(FAILED_RESPONSE));
        assert!(matches!(v.parts[1].inquiry, InquiryStatus::Failed { .. }));

        c.deselect_part();
        let v = view(&c);
        assert_eq!(v.panel.state, PanelState::Hidden);
        assert_eq!(v.framing, CameraFraming::Overview);
    }

    #[test]
    fn view_state_serializes_camel_case() {
        let mut c = started("Car");
        let d = c.select_part(1).unwrap().unwrap();
        c.resolve(&d, Ok("Inline six? No, a V6.".into()));

        let json = serde_json::to_value(view(&c)).unwrap();
        assert_eq!(json["highlightedPart"], 1);
        assert_eq!(json["framing"], "partDetail");
        assert_eq!(json["subject"]["kind"], "engineDetail");
        assert_eq!(json["panel"]["state"], "answer");
        assert_eq!(json["parts"][0]["inquiry"]["state"], "answered");
        assert_eq!(json["parts"][1]["inquiry"]["state"], "idle");
        assert_eq!(json["vehicle"]["topSpeedMph"], 150);
    }
}
