use super::{EngineClass, Part, PartName, PartStatus, Vehicle};

pub(super) fn vehicles() -> Vec<Vehicle> {
    vec![
        Vehicle {
            id: "Car".into(),
            name: "Classic Car".into(),
            model_year: 1965,
            engine: EngineClass::V6,
            top_speed_mph: 150,
        },
        Vehicle {
            id: "Gt".into(),
            name: "GT Sports".into(),
            model_year: 1967,
            engine: EngineClass::V7,
            top_speed_mph: 180,
        },
        Vehicle {
            id: "Mustang1968".into(),
            name: "Mustang 1968".into(),
            model_year: 1968,
            engine: EngineClass::V8,
            top_speed_mph: 190,
        },
    ]
}

/// The six inspectable systems every showroom car has, ids 1 through 6.
pub fn standard_parts(engine: EngineClass) -> Vec<Part> {
    PartName::ALL
        .into_iter()
        .zip(1..)
        .map(|(name, id)| {
            let (description, question) = describe(name, engine);
            Part {
                id,
                name,
                description,
                status: PartStatus::Operational,
                default_question: question,
            }
        })
        .collect()
}

fn describe(name: PartName, engine: EngineClass) -> (String, String) {
    match name {
        PartName::Engine => (
            format!("{engine} engine with high performance capabilities and precision tuning."),
            format!("Tell me about this {engine} engine."),
        ),
        PartName::Transmission => (
            "6-speed manual transmission for optimal control and gear responsiveness.".into(),
            "How does the transmission system work?".into(),
        ),
        PartName::Suspension => (
            "Sport-tuned suspension system for enhanced handling and road grip.".into(),
            "What makes the suspension sport-tuned?".into(),
        ),
        PartName::Brakes => (
            "High-performance disc brakes on all wheels with rapid heat dissipation.".into(),
            "Explain the brake performance specs.".into(),
        ),
        PartName::Exhaust => (
            "Performance exhaust system with deep resonance and reduced backpressure.".into(),
            "How does the exhaust improve performance?".into(),
        ),
        PartName::Wheels => (
            "18-inch forged alloy wheels with ultra-grip performance tires.".into(),
            "What are the wheel material and tire specs?".into(),
        ),
    }
}
