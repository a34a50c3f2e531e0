use serde::Serialize;

/// A named assistant personality offered during onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Persona {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub personality: &'static str,
    pub strengths: &'static [&'static str],
    pub speed: &'static str,
}

pub const DEFAULT_PERSONA: &str = "Friday";

pub const PERSONAS: &[Persona] = &[
    Persona {
        id: "friday",
        name: "Friday",
        description: "Your reliable trading companion with advanced reasoning capabilities",
        personality: "Professional, analytical, and detail-oriented",
        strengths: &["Complex analysis", "Risk assessment", "Strategic planning"],
        speed: "Standard",
    },
    Persona {
        id: "velocity",
        name: "Velocity",
        description: "Lightning-fast responses for quick trading decisions",
        personality: "Quick, decisive, and action-oriented",
        strengths: &["Rapid analysis", "Real-time alerts", "Quick decisions"],
        speed: "Ultra Fast",
    },
    Persona {
        id: "oracle",
        name: "Oracle",
        description: "Deep market insights with sophisticated reasoning",
        personality: "Wise, thoughtful, and comprehensive",
        strengths: &["Market prediction", "Deep analysis", "Long-term strategy"],
        speed: "Thoughtful",
    },
    Persona {
        id: "nova",
        name: "Nova",
        description: "Creative problem solver with innovative approaches",
        personality: "Creative, innovative, and adaptive",
        strengths: &["Creative solutions", "Pattern recognition", "Innovation"],
        speed: "Creative",
    },
    Persona {
        id: "sentinel",
        name: "Sentinel",
        description: "Risk-focused guardian for your trading portfolio",
        personality: "Cautious, protective, and thorough",
        strengths: &["Risk management", "Portfolio protection", "Compliance"],
        speed: "Careful",
    },
    Persona {
        id: "apex",
        name: "Apex",
        description: "High-performance assistant for professional traders",
        personality: "Elite, precise, and performance-driven",
        strengths: &["Advanced strategies", "Performance optimization", "Elite insights"],
        speed: "Premium",
    },
];

/// Look up a persona by id or display name, ignoring case.
pub fn find_persona(name: &str) -> Option<&'static Persona> {
    PERSONAS
        .iter()
        .find(|p| p.id.eq_ignore_ascii_case(name) || p.name.eq_ignore_ascii_case(name))
}
