//! Draw plan construction.
//!
//! A draw plan is a passive list of what to paint for one frame, already in
//! destination pixel coordinates. Any 2D backend can consume it through
//! [`Surface`].

use log::debug;
use serde::Serialize;

use crate::config::OverlayConfig;
use crate::pose::{LandmarkFrame, Topology};
use crate::rules::{evaluate, EvaluationResult, RuleSet};
use crate::technique::TechniqueKey;

use super::color::{Color, DeviationColorizer};
use super::mapper::{FitMode, ScaleTransform, ScreenPoint, Size};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointMarker {
    pub landmark: usize,
    pub position: ScreenPoint,
    pub color: Color,
    /// Diameter in pixels.
    pub size: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSegment {
    /// Topology edge this segment draws.
    pub connection: (usize, usize),
    pub from: ScreenPoint,
    pub to: ScreenPoint,
    pub color: Color,
    pub width: f32,
    /// Rule that colored this segment, if any.
    pub rule_index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextLabel {
    pub anchor: ScreenPoint,
    pub text: String,
    pub color: Color,
    pub size: f32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DrawPlan {
    pub points: Vec<PointMarker>,
    pub lines: Vec<LineSegment>,
    pub labels: Vec<TextLabel>,
    /// Rule results the plan was built from, in rule order.
    pub evaluations: Vec<EvaluationResult>,
    pub technique: Option<TechniqueKey>,
    /// Generation of the rule snapshot, set by the session.
    pub generation: u64,
}

impl DrawPlan {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.lines.is_empty() && self.labels.is_empty()
    }

    pub fn out_of_tolerance(&self) -> impl Iterator<Item = &EvaluationResult> {
        self.evaluations.iter().filter(|e| !e.within_tolerance)
    }

    /// Lines first, then landmark points, then labels on top.
    pub fn paint<S: Surface + ?Sized>(&self, surface: &mut S) {
        for line in &self.lines {
            surface.draw_line(line);
        }
        for point in &self.points {
            surface.draw_point(point);
        }
        for label in &self.labels {
            surface.draw_label(label);
        }
    }
}

/// A 2D drawing backend.
pub trait Surface {
    fn draw_line(&mut self, line: &LineSegment);
    fn draw_point(&mut self, point: &PointMarker);
    fn draw_label(&mut self, label: &TextLabel);
}

/// Turns a landmark frame and a rule set into a [`DrawPlan`].
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayRenderer {
    colorizer: DeviationColorizer,
    line_color: Color,
    point_color: Color,
    label_color: Color,
    stroke_width: f32,
    point_size: f32,
    label_size: f32,
}

impl OverlayRenderer {
    pub fn from_config(config: &OverlayConfig) -> Self {
        Self {
            colorizer: DeviationColorizer::new(config.good_color, config.bad_color),
            line_color: config.line_color,
            point_color: config.point_color,
            label_color: config.label_color,
            stroke_width: config.stroke_width,
            point_size: config.point_size,
            label_size: config.label_size,
        }
    }

    /// Builds the plan for one frame. Never fails: a degenerate image or
    /// viewport gives an empty plan, a rule that cannot be evaluated leaves
    /// its connections in the neutral color.
    pub fn build_draw_plan(
        &self,
        frame: &LandmarkFrame,
        rules: &RuleSet,
        topology: &Topology,
        viewport: Size,
    ) -> DrawPlan {
        match frame_transform(frame, viewport) {
            Some(transform) => self.build_with_transform(frame, rules, topology, &transform),
            None => DrawPlan::empty(),
        }
    }

    pub fn build_with_transform(
        &self,
        frame: &LandmarkFrame,
        rules: &RuleSet,
        topology: &Topology,
        transform: &ScaleTransform,
    ) -> DrawPlan {
        let evaluations = evaluate(frame, rules);
        let screen: Vec<ScreenPoint> = frame.landmarks.iter().map(|lm| transform.map(lm)).collect();

        let points = screen
            .iter()
            .enumerate()
            .map(|(landmark, &position)| PointMarker {
                landmark,
                position,
                color: self.point_color,
                size: self.point_size,
            })
            .collect();

        let mut lines = Vec::with_capacity(topology.connections().len());
        let mut labels = Vec::new();

        for &(start, end) in topology.connections() {
            let (from, to) = match (screen.get(start), screen.get(end)) {
                (Some(&from), Some(&to)) => (from, to),
                _ => continue,
            };

            let governing = governing_result(&evaluations, start, end);
            let color = match governing {
                Some(result) => self
                    .colorizer
                    .color_for(result.deviation, result.rule.tolerance()),
                None => self.line_color,
            };

            if let Some(result) = governing {
                labels.push(TextLabel {
                    anchor: from,
                    text: format!("{:.1}", result.angle),
                    color: self.label_color,
                    size: self.label_size,
                });
            }

            lines.push(LineSegment {
                connection: (start, end),
                from,
                to,
                color,
                width: self.stroke_width,
                rule_index: governing.map(|r| r.rule_index),
            });
        }

        DrawPlan {
            points,
            lines,
            labels,
            evaluations,
            technique: rules.key().cloned(),
            generation: 0,
        }
    }
}

impl Default for OverlayRenderer {
    fn default() -> Self {
        Self::from_config(&OverlayConfig::default())
    }
}

/// Scale for drawing `frame` into `viewport`, using the fit its running
/// mode calls for. `None` when either size is degenerate.
pub fn frame_transform(frame: &LandmarkFrame, viewport: Size) -> Option<ScaleTransform> {
    let image = Size::new(frame.image_width as f32, frame.image_height as f32);
    match ScaleTransform::new(image, viewport, FitMode::from(frame.mode)) {
        Ok(transform) => Some(transform),
        Err(e) => {
            debug!("skipping frame: {}", e);
            None
        }
    }
}

/// The rule result coloring edge (start, end): the one deviating most
/// relative to its tolerance, earliest rule on ties.
fn governing_result(
    evaluations: &[EvaluationResult],
    start: usize,
    end: usize,
) -> Option<&EvaluationResult> {
    evaluations
        .iter()
        .filter(|e| e.rule.governs(start, end))
        .fold(None, |best: Option<&EvaluationResult>, e| match best {
            Some(b) if b.deviation_fraction() >= e.deviation_fraction() => Some(b),
            _ => Some(e),
        })
}
