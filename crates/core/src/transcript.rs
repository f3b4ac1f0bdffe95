//! Transcript: the append-only record of a run that doubles as the prompt.
//!
//! A transcript is an ordered list of immutable [`Segment`]s. Rendering
//! concatenates their text; the result is exactly what the next model call
//! sees. Segments can only be appended through the typed `record_*` methods,
//! which encode the line protocol:
//!
//! ```text
//! <seed>
//! Tho 1: <thought>
//! Act 2: Search '<subject>'
//! Obs 2: <extract>
//! Act 3: Finish '<answer>'
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::schema::Choice;
use crate::step::{Action, Mode};

/// Tag used for observation lines.
pub const OBSERVATION_TAG: &str = "Obs";

/// Delimiter wrapped around action arguments.
pub const ARGUMENT_QUOTE: char = '\'';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Seed,
    Marker,
    Thought,
    Action,
    Argument,
    Observation,
}

/// One appended piece of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    kind: SegmentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    step: Option<u32>,
    text: String,
    timestamp: DateTime<Utc>,
}

impl Segment {
    pub fn kind(&self) -> SegmentKind {
        self.kind
    }

    /// The step that produced this segment (`None` for the seed).
    pub fn step(&self) -> Option<u32> {
        self.step
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Deserializing rejects segment lists that do not start with exactly one
/// seed, so [`Transcript::seed`] always has something to return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SegmentList")]
pub struct Transcript {
    segments: Vec<Segment>,
}

#[derive(Deserialize)]
struct SegmentList {
    segments: Vec<Segment>,
}

impl TryFrom<SegmentList> for Transcript {
    type Error = String;

    fn try_from(list: SegmentList) -> Result<Self, Self::Error> {
        match list.segments.first() {
            Some(first) if first.kind == SegmentKind::Seed => {}
            Some(first) => {
                return Err(format!("transcript starts with a {:?} segment", first.kind));
            }
            None => return Err("transcript has no seed segment".into()),
        }
        if list.segments[1..].iter().any(|s| s.kind == SegmentKind::Seed) {
            return Err("transcript has more than one seed segment".into());
        }
        Ok(Self {
            segments: list.segments,
        })
    }
}

impl Transcript {
    /// Start a transcript holding only the seed prompt.
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            segments: vec![Segment {
                kind: SegmentKind::Seed,
                step: None,
                text: seed.into(),
                timestamp: Utc::now(),
            }],
        }
    }

    pub fn seed(&self) -> &str {
        &self.segments[0].text
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments, the seed included.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Number of steps opened so far.
    pub fn step_count(&self) -> usize {
        self.segments_of(SegmentKind::Marker).count()
    }

    pub fn segments_of(&self, kind: SegmentKind) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(move |s| s.kind == kind)
    }

    /// The prompt text: every segment, in order.
    pub fn render(&self) -> String {
        let len = self.segments.iter().map(|s| s.text.len()).sum();
        let mut out = String::with_capacity(len);
        for segment in &self.segments {
            out.push_str(&segment.text);
        }
        out
    }

    /// `"\n{Mode} {i}: "`
    pub fn open_step(&mut self, step: u32, mode: Mode) {
        self.push(SegmentKind::Marker, step, format!("\n{} {}: ", mode.tag(), step));
    }

    /// The thought text, verbatim.
    pub fn record_thought(&mut self, step: u32, thought: &str) {
        self.push(SegmentKind::Thought, step, thought.to_string());
    }

    /// `"{Action} '"`
    pub fn record_action(&mut self, step: u32, action: Action) {
        self.push(
            SegmentKind::Action,
            step,
            format!("{} {}", action.tag(), ARGUMENT_QUOTE),
        );
    }

    /// `"{argument}'"`
    pub fn record_argument(&mut self, step: u32, argument: &str) {
        self.push(
            SegmentKind::Argument,
            step,
            format!("{argument}{ARGUMENT_QUOTE}"),
        );
    }

    /// `"\nObs {i}: {observation}"`
    pub fn record_observation(&mut self, step: u32, observation: &str) {
        self.push(
            SegmentKind::Observation,
            step,
            format!("\n{OBSERVATION_TAG} {step}: {observation}"),
        );
    }

    fn push(&mut self, kind: SegmentKind, step: u32, text: String) {
        self.segments.push(Segment {
            kind,
            step: Some(step),
            text,
            timestamp: Utc::now(),
        });
    }
}

impl fmt::Display for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            f.write_str(&segment.text)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_transcript_renders_seed_only() {
        let t = Transcript::new("Where is Apple Computers headquartered?");
        assert_eq!(t.render(), "Where is Apple Computers headquartered?");
        assert_eq!(t.segment_count(), 1);
        assert_eq!(t.step_count(), 0);
        assert_eq!(t.segments()[0].step(), None);
    }

    #[test]
    fn renders_the_line_protocol() {
        let mut t = Transcript::new("Q?");
        t.open_step(1, Mode::Thought);
        t.record_thought(1, "I need to search Colorado orogeny.");
        t.open_step(2, Mode::Act);
        t.record_action(2, Action::Search);
        t.record_argument(2, "Colorado orogeny");
        t.record_observation(2, "The Colorado orogeny was an episode of mountain building");
        t.open_step(3, Mode::Act);
        t.record_action(3, Action::Finish);
        t.record_argument(3, "1,800 to");

        assert_eq!(
            t.render(),
            "Q?\nTho 1: I need to search Colorado orogeny.\
             \nAct 2: Search 'Colorado orogeny'\
             \nObs 2: The Colorado orogeny was an episode of mountain building\
             \nAct 3: Finish '1,800 to'"
        );
        assert_eq!(t.step_count(), 3);
        assert_eq!(t.to_string(), t.render());
    }

    #[test]
    fn appending_only_extends_the_rendered_prefix() {
        let mut t = Transcript::new("seed");
        let mut previous = t.render();
        let before: Vec<Segment> = t.segments().to_vec();

        t.open_step(1, Mode::Act);
        t.record_action(1, Action::Search);
        t.record_argument(1, "Apple Inc");

        let now = t.render();
        assert!(now.starts_with(&previous));
        assert_eq!(&t.segments()[..before.len()], before.as_slice());

        previous = now;
        t.record_observation(1, "Apple Inc. is an American company");
        assert!(t.render().starts_with(&previous));
    }

    #[test]
    fn segments_are_tagged_with_their_step() {
        let mut t = Transcript::new("seed");
        t.open_step(4, Mode::Act);
        t.record_action(4, Action::Search);
        t.record_argument(4, "x");
        t.record_observation(4, "y");

        let kinds: Vec<SegmentKind> = t.segments().iter().map(Segment::kind).collect();
        assert_eq!(
            kinds,
            vec![
                SegmentKind::Seed,
                SegmentKind::Marker,
                SegmentKind::Action,
                SegmentKind::Argument,
                SegmentKind::Observation,
            ]
        );
        assert!(t.segments()[1..].iter().all(|s| s.step() == Some(4)));
        assert_eq!(t.segments_of(SegmentKind::Observation).count(), 1);
    }

    #[test]
    fn transcript_serializes_segments() {
        let mut t = Transcript::new("seed");
        t.open_step(1, Mode::Thought);
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["segments"][0]["kind"], "seed");
        assert_eq!(json["segments"][1]["kind"], "marker");
        assert_eq!(json["segments"][1]["step"], 1);

        let back: Transcript = serde_json::from_value(json).unwrap();
        assert_eq!(back, t);
        assert_eq!(back.seed(), "seed");
    }

    #[test]
    fn deserializing_requires_a_leading_seed() {
        let err = serde_json::from_str::<Transcript>(r#"{"segments": []}"#).unwrap_err();
        assert!(err.to_string().contains("no seed"));

        let mut t = Transcript::new("seed");
        t.open_step(1, Mode::Act);
        let mut json = serde_json::to_value(&t).unwrap();
        json["segments"].as_array_mut().unwrap().remove(0);
        assert!(serde_json::from_value::<Transcript>(json.clone()).is_err());

        let seed = serde_json::to_value(&Transcript::new("again").segments()[0]).unwrap();
        json["segments"].as_array_mut().unwrap().insert(0, seed.clone());
        json["segments"].as_array_mut().unwrap().push(seed);
        let err = serde_json::from_value::<Transcript>(json).unwrap_err();
        assert!(err.to_string().contains("more than one seed"));
    }
}
