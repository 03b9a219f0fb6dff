//! Prompt rendering for the two reasoning stages

use super::response::AdjustedSegment;
use crate::error::{ErrorCode, LibResult, PacemakerError};
use crate::plan::{DraftPlan, PlanRequest, RunnerProfile};
use serde::Serialize;
use tera::{Context, Tera};

const ADJUST_TEMPLATE: &str = include_str!("../../prompts/adjust.tera");
const NARRATE_TEMPLATE: &str = include_str!("../../prompts/narrate.tera");

#[derive(Debug, Serialize)]
struct RunnerView<'a> {
    age: u32,
    gender: &'a str,
    weight_kg: f64,
    height_cm: f64,
    condition: u8,
    condition_label: &'static str,
}

impl<'a> RunnerView<'a> {
    fn new(profile: &'a RunnerProfile) -> Self {
        let gender = match profile.gender {
            crate::plan::Gender::Male => "male",
            crate::plan::Gender::Female => "female",
            crate::plan::Gender::Other => "",
        };
        Self {
            age: profile.age,
            gender,
            weight_kg: profile.weight_kg,
            height_cm: profile.height_cm,
            condition: profile.condition.into(),
            condition_label: profile.condition.label(),
        }
    }
}

/// Segment with its pace pre-formatted, so "5.30" never renders as "5.3"
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SegmentView {
    set_num: u32,
    start_km: f64,
    end_km: f64,
    pace: String,
}

#[derive(Debug, Serialize)]
struct PaceView {
    #[serde(rename = "type")]
    kind: &'static str,
    pace: String,
}

pub struct PromptRenderer {
    tera: Tera,
}

impl std::fmt::Debug for PromptRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptRenderer").finish_non_exhaustive()
    }
}

impl PromptRenderer {
    /// Renderer with the embedded templates
    pub fn new() -> LibResult<Self> {
        Self::with_templates(ADJUST_TEMPLATE, NARRATE_TEMPLATE)
    }

    pub fn with_templates(adjust: &str, narrate: &str) -> LibResult<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.add_raw_templates(vec![("adjust", adjust), ("narrate", narrate)])
            .map_err(|e| {
                PacemakerError::config_with_code(
                    ErrorCode::CONFIG_INVALID_VALUE,
                    format!("Invalid prompt template: {}", e),
                )
            })?;
        Ok(Self { tera })
    }

    fn base_context(&self, profile: &RunnerProfile, request: &PlanRequest, vdot: u8) -> Context {
        let mut context = Context::new();
        context.insert("runner", &RunnerView::new(profile));
        context.insert("vdot", &vdot);
        context.insert("running_type", request.running_type.name());
        context.insert("goal_km", &request.goal_km);
        context.insert("temperature_c", &request.temperature_c);
        context
    }

    fn render(&self, stage: &str, context: &Context) -> LibResult<String> {
        self.tera.render(stage, context).map_err(|e| {
            PacemakerError::reasoning(
                ErrorCode::REASONING_PROMPT_RENDER,
                stage,
                format!("Template rendering failed: {}", e),
            )
        })
    }

    /// Prompt for the numeric adjustment of a draft
    pub fn render_adjust(
        &self,
        profile: &RunnerProfile,
        request: &PlanRequest,
        draft: &DraftPlan,
        tolerance_km: f64,
    ) -> LibResult<String> {
        let mut context = self.base_context(profile, request, draft.vdot);

        let paces: Vec<PaceView> = draft
            .paces
            .paces
            .iter()
            .map(|(kind, pace)| PaceView {
                kind: kind.code(),
                pace: pace.to_string(),
            })
            .collect();
        let segments: Vec<SegmentView> = draft
            .segments
            .iter()
            .map(|s| SegmentView {
                set_num: s.set_num,
                start_km: s.start_km,
                end_km: s.end_km,
                pace: s.pace.to_string(),
            })
            .collect();
        let segments_json = serde_json::to_string_pretty(&segments).map_err(|e| {
            PacemakerError::reasoning(ErrorCode::REASONING_PROMPT_RENDER, "adjust", e.to_string())
        })?;

        context.insert("template_id", &draft.workout.template_id);
        context.insert("paces", &paces);
        context.insert("segments_json", &segments_json);
        context.insert("tolerance_km", &tolerance_km);

        self.render("adjust", &context)
    }

    /// Prompt for the voice guidance of adjusted segments
    pub fn render_narrate(
        &self,
        profile: &RunnerProfile,
        request: &PlanRequest,
        vdot: u8,
        segments: &[AdjustedSegment],
        expected_minutes: u32,
    ) -> LibResult<String> {
        let mut context = self.base_context(profile, request, vdot);

        let segments: Vec<SegmentView> = segments
            .iter()
            .map(|s| SegmentView {
                set_num: s.set_num,
                start_km: s.start_km,
                end_km: s.end_km,
                pace: s.pace.to_string(),
            })
            .collect();
        context.insert("segments", &segments);
        context.insert("expected_minutes", &expected_minutes);

        self.render("narrate", &context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pace::{Pace, RunningType};
    use crate::plan::{Condition, Gender, PlanDrafter};

    fn profile() -> RunnerProfile {
        RunnerProfile {
            age: 34,
            gender: Gender::Female,
            weight_kg: 58.0,
            height_cm: 166.0,
            vdot: 40,
            condition: Condition::VeryGood,
        }
    }

    #[test]
    fn test_adjust_prompt_mentions_inputs() {
        let request = PlanRequest::new("runner-1", RunningType::Threshold, 10.0).with_temperature(32.0);
        let draft = PlanDrafter::builtin().unwrap().draft(&profile(), &request).unwrap();
        let prompt = PromptRenderer::new()
            .unwrap()
            .render_adjust(&profile(), &request, &draft, 0.25)
            .unwrap();

        assert!(prompt.contains("T-CRUISE-3X1600"));
        assert!(prompt.contains("32"));
        assert!(prompt.contains("very-good"));
        assert!(prompt.contains("- T: 5.00"));
        assert!(prompt.contains("\"setNum\""));
    }

    #[test]
    fn test_temperature_is_optional() {
        let request = PlanRequest::new("runner-1", RunningType::Easy, 8.0);
        let draft = PlanDrafter::builtin().unwrap().draft(&profile(), &request).unwrap();
        let prompt = PromptRenderer::new()
            .unwrap()
            .render_adjust(&profile(), &request, &draft, 0.25)
            .unwrap();
        assert!(!prompt.contains("Air temperature"));
    }

    #[test]
    fn test_narrate_prompt_keeps_padded_pace() {
        let request = PlanRequest::new("runner-1", RunningType::Threshold, 2.0);
        let segments = vec![AdjustedSegment {
            set_num: 1,
            start_km: 0.0,
            end_km: 2.0,
            pace: Pace::from_seconds(330),
        }];
        let prompt = PromptRenderer::new()
            .unwrap()
            .render_narrate(&profile(), &request, 40, &segments, 11)
            .unwrap();
        assert!(prompt.contains("at 5.30 per km"));
        assert!(prompt.contains("about 11 minutes"));
        assert!(prompt.contains("1 in total"));
    }

    #[test]
    fn test_broken_template_is_configuration_error() {
        let err = PromptRenderer::with_templates("{% if %}", "ok").unwrap_err();
        assert!(err.is_fatal());
    }
}
