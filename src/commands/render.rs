use std::fmt::Write;

use crate::catalog::Catalog;
use crate::session::InquiryStatus;
use crate::view::{CameraFraming, PanelState, ViewState};

pub fn vehicle_list(catalog: &Catalog) -> String {
    let mut out = String::new();
    for v in catalog.vehicles() {
        let _ = writeln!(
            out,
            "{:<12} {} ({}) • Engine: {} • Top Speed: {}mph",
            v.id, v.name, v.model_year, v.engine, v.top_speed_mph
        );
    }
    out
}

/// Plain-text rendering of a view for the terminal.
pub fn view_text(view: &ViewState) -> String {
    let mut out = String::new();
    let v = &view.vehicle;
    let _ = writeln!(
        out,
        "{} — Model: {} • Engine: {} • Top Speed: {}mph",
        v.name, v.model_year, v.engine, v.top_speed_mph
    );

    let framing = match view.framing {
        CameraFraming::Overview => "overview",
        CameraFraming::PartDetail => "engine close-up",
    };
    let _ = writeln!(out, "[camera: {framing}]");
    if view.detail_unavailable {
        let _ = writeln!(
            out,
            "{} Engine Model Not Available: no detailed 3D model for this engine type.",
            v.engine
        );
    }

    let Some(selected) = view
        .highlighted_part
        .and_then(|id| view.parts.iter().find(|p| p.id == id))
    else {
        let _ = writeln!(out, "\nVehicle Systems");
        for part in &view.parts {
            let marker = match part.inquiry {
                InquiryStatus::Idle => " ",
                InquiryStatus::Pending { .. } => "…",
                InquiryStatus::Answered { .. } => "✓",
                InquiryStatus::Failed { .. } => "!",
            };
            let _ = writeln!(
                out,
                " {marker} {}. {:<13} [{:?}] {}",
                part.id, part.name, part.status, part.description
            );
        }
        return out;
    };

    let _ = writeln!(out, "\n{} [{:?}]", selected.name, selected.status);
    let _ = writeln!(out, "{}", selected.description);
    match view.panel.state {
        PanelState::Loading => {
            let _ = writeln!(out, "\nLoading AI response...");
        }
        PanelState::Answer | PanelState::Error => {
            let text = view.panel.text.as_deref().unwrap_or_default();
            let _ = writeln!(out, "\nAI Insight\n{text}");
        }
        PanelState::Idle | PanelState::Hidden => {}
    }
    if let Some(draft) = view.panel.follow_up.as_deref() {
        let _ = writeln!(out, "\nfollow-up> {draft}");
    }
    out
}
