//! Banner instruction model and guidance view URL extraction
//!
//! Banner instructions arrive from the route source as JSON. Only the view
//! block matters here: it may carry a component of kind `guidance-view`
//! whose `image_url` points at the bitmap to fetch. Extraction is pure and
//! does no I/O, so callers can probe a banner without starting a fetch.

use serde::{Deserialize, Serialize};

/// A single banner instruction for an upcoming maneuver
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BannerInstruction {
    /// Distance from the maneuver at which the banner becomes relevant, in meters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_along_geometry: Option<f64>,

    /// Primary instruction text shown to the driver
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_text: Option<String>,

    /// Optional guidance view block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<BannerView>,
}

/// The view block of a banner instruction
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BannerView {
    /// Ordered component sequence; may be empty
    #[serde(default)]
    pub components: Vec<BannerComponent>,
}

/// One component of a banner view
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BannerComponent {
    /// Component kind tag
    #[serde(rename = "type")]
    pub kind: ComponentKind,

    /// Display text, if the component has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Image URL, populated for guidance view components
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Banner component kind
///
/// Kinds this library does not interpret still deserialize (as [`Other`])
/// so a newer route source cannot break banner parsing.
///
/// [`Other`]: ComponentKind::Other
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentKind {
    /// Plain instruction text
    Text,
    /// Inline icon (e.g., a route shield)
    Icon,
    /// Separator between text fragments
    Delimiter,
    /// Exit keyword
    Exit,
    /// Exit number
    ExitNumber,
    /// Lane guidance
    Lane,
    /// Guidance view image reference
    GuidanceView,
    /// Unrecognized kind
    #[serde(other)]
    Other,
}

/// Why a banner instruction yielded no guidance image URL
///
/// These are not failures; a banner without a guidance view is the normal
/// case for most maneuvers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoSourceReason {
    /// The instruction has no view block
    NoView,
    /// The view block has an empty component list
    NoComponents,
    /// Components exist but none is of guidance view kind
    NoGuidanceComponent,
    /// A guidance view component exists but carries no image URL
    MissingUrl,
}

impl std::fmt::Display for NoSourceReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            NoSourceReason::NoView => "banner instruction has no view",
            NoSourceReason::NoComponents => "banner view has no components",
            NoSourceReason::NoGuidanceComponent => "banner view has no guidance view component",
            NoSourceReason::MissingUrl => "guidance view component has no image URL",
        };
        write!(f, "{message}")
    }
}

/// Extract the guidance view image URL from a banner instruction
///
/// Scans the view components in order; the first component of guidance view
/// kind decides the result. A present but empty `image_url` counts as
/// missing. Pure and deterministic: the same instruction always yields the
/// same result.
pub fn guidance_image_url(instruction: &BannerInstruction) -> Result<&str, NoSourceReason> {
    let view = instruction.view.as_ref().ok_or(NoSourceReason::NoView)?;
    if view.components.is_empty() {
        return Err(NoSourceReason::NoComponents);
    }

    let component = view
        .components
        .iter()
        .find(|component| component.kind == ComponentKind::GuidanceView)
        .ok_or(NoSourceReason::NoGuidanceComponent)?;

    match component.image_url.as_deref() {
        Some(url) if !url.is_empty() => Ok(url),
        _ => Err(NoSourceReason::MissingUrl),
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn guidance_component(image_url: Option<&str>) -> BannerComponent {
        BannerComponent {
            kind: ComponentKind::GuidanceView,
            text: None,
            image_url: image_url.map(Into::into),
        }
    }

    fn text_component(text: &str) -> BannerComponent {
        BannerComponent {
            kind: ComponentKind::Text,
            text: Some(text.into()),
            image_url: None,
        }
    }

    fn instruction_with(components: Vec<BannerComponent>) -> BannerInstruction {
        BannerInstruction {
            view: Some(BannerView { components }),
            ..BannerInstruction::default()
        }
    }

    // --- Extraction outcomes ---

    #[test]
    fn instruction_without_view_yields_no_view() {
        let instruction = BannerInstruction::default();
        assert_eq!(
            guidance_image_url(&instruction),
            Err(NoSourceReason::NoView)
        );
    }

    #[test]
    fn view_with_empty_components_yields_no_components() {
        let instruction = instruction_with(vec![]);
        assert_eq!(
            guidance_image_url(&instruction),
            Err(NoSourceReason::NoComponents)
        );
    }

    #[test]
    fn components_without_guidance_view_yield_no_guidance_component() {
        let instruction = instruction_with(vec![
            text_component("Turn right"),
            BannerComponent {
                kind: ComponentKind::ExitNumber,
                text: Some("23B".into()),
                image_url: None,
            },
        ]);
        assert_eq!(
            guidance_image_url(&instruction),
            Err(NoSourceReason::NoGuidanceComponent)
        );
    }

    #[test]
    fn guidance_component_without_url_yields_missing_url() {
        let instruction = instruction_with(vec![guidance_component(None)]);
        assert_eq!(
            guidance_image_url(&instruction),
            Err(NoSourceReason::MissingUrl)
        );
    }

    #[test]
    fn guidance_component_with_empty_url_yields_missing_url() {
        let instruction = instruction_with(vec![guidance_component(Some(""))]);
        assert_eq!(
            guidance_image_url(&instruction),
            Err(NoSourceReason::MissingUrl),
            "an empty string is not a usable URL"
        );
    }

    #[test]
    fn guidance_component_with_url_yields_that_url() {
        let instruction = instruction_with(vec![
            text_component("Keep left"),
            guidance_component(Some("https://img.example.com/junction/42.png")),
        ]);
        assert_eq!(
            guidance_image_url(&instruction),
            Ok("https://img.example.com/junction/42.png")
        );
    }

    // --- Ordering and determinism ---

    #[test]
    fn first_guidance_component_decides() {
        let instruction = instruction_with(vec![
            guidance_component(Some("https://img.example.com/first.png")),
            guidance_component(Some("https://img.example.com/second.png")),
        ]);
        assert_eq!(
            guidance_image_url(&instruction),
            Ok("https://img.example.com/first.png"),
            "the first guidance view component in order must win"
        );
    }

    #[test]
    fn first_guidance_component_without_url_is_not_skipped() {
        let instruction = instruction_with(vec![
            guidance_component(None),
            guidance_component(Some("https://img.example.com/second.png")),
        ]);
        assert_eq!(
            guidance_image_url(&instruction),
            Err(NoSourceReason::MissingUrl),
            "extraction must not scan past a URL-less guidance component"
        );
    }

    #[test]
    fn extraction_is_deterministic() {
        let instruction = instruction_with(vec![guidance_component(Some(
            "https://img.example.com/junction.png",
        ))]);

        let first = guidance_image_url(&instruction);
        let second = guidance_image_url(&instruction);
        assert_eq!(first, second, "repeated extraction must agree");
    }

    // --- Wire format ---

    #[test]
    fn banner_json_with_guidance_view_parses_and_extracts() {
        let json = r#"{
            "distance_along_geometry": 150.0,
            "primary_text": "Exit 23B toward Midtown",
            "view": {
                "components": [
                    {"type": "text", "text": "Exit 23B"},
                    {"type": "guidance-view", "image_url": "https://img.example.com/23b.png"}
                ]
            }
        }"#;

        let instruction: BannerInstruction = serde_json::from_str(json).expect("parse failed");
        assert_eq!(
            guidance_image_url(&instruction),
            Ok("https://img.example.com/23b.png")
        );
    }

    #[test]
    fn unknown_component_kind_parses_as_other() {
        let json = r#"{"type": "holographic-overlay", "text": "new thing"}"#;
        let component: BannerComponent = serde_json::from_str(json).expect("parse failed");
        assert_eq!(
            component.kind,
            ComponentKind::Other,
            "unrecognized kinds must not fail deserialization"
        );
    }

    #[test]
    fn component_kind_uses_kebab_case_tags() {
        let component = guidance_component(Some("https://img.example.com/x.png"));
        let json = serde_json::to_string(&component).expect("serialize failed");
        assert!(
            json.contains(r#""type":"guidance-view""#),
            "guidance view kind must serialize as kebab-case, got: {json}"
        );
    }

    // --- NoSourceReason display ---

    #[test]
    fn no_source_reasons_have_distinct_messages() {
        let reasons = [
            NoSourceReason::NoView,
            NoSourceReason::NoComponents,
            NoSourceReason::NoGuidanceComponent,
            NoSourceReason::MissingUrl,
        ];

        let mut messages: Vec<String> = reasons.iter().map(ToString::to_string).collect();
        messages.sort();
        messages.dedup();
        assert_eq!(
            messages.len(),
            reasons.len(),
            "each reason needs its own human-readable message"
        );
    }
}
