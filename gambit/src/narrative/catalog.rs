use crate::models::{TemplateKind, Tone, VoiceMode};

/// Immutable narration skeleton.
///
/// `text` may use `*emphasis*` and `[pause]` markers and the placeholders
/// `{moment}` (or `{Moment}` at the start of a sentence), `{side}`,
/// `{leader}` and `{eval}`. A moment reads "move 16" for a game and
/// "passage 16" for prose.
#[derive(Debug)]
pub struct TemplateSpec {
    pub kind: TemplateKind,
    pub text: &'static str,
    /// `None` defers to the voice mode requested by the caller.
    pub voice_mode: Option<VoiceMode>,
    pub tone: Tone,
    /// Teaching line appended for educational audiences.
    pub coda: &'static str,
}

pub static CATALOG: [TemplateSpec; 5] = [
    TemplateSpec {
        kind: TemplateKind::CriticalMoment,
        text: "{Moment}. [pause] The balance has tipped *decisively*, and {leader} can sense the finish.",
        voice_mode: Some(VoiceMode::Dramatic),
        tone: Tone::Suspenseful,
        coda: "When the evaluation passes three pawns, the task becomes conversion: trade down and take away counterplay.",
    },
    TemplateSpec {
        kind: TemplateKind::TimePressure,
        text: "The clock is *ticking*. [pause] With seconds draining away at {moment}, {side} has to find a move now.",
        voice_mode: Some(VoiceMode::Expressive),
        tone: Tone::Urgent,
        coda: "Under time pressure, simple safe moves beat deep calculation.",
    },
    TemplateSpec {
        kind: TemplateKind::Endgame,
        text: "Only a handful of pieces remain. [pause] In this *quiet* endgame, every tempo counts for {side}.",
        voice_mode: Some(VoiceMode::Mysterious),
        tone: Tone::Contemplative,
        coda: "In endgames the king becomes a fighting piece, so activate it early.",
    },
    TemplateSpec {
        kind: TemplateKind::Recovery,
        text: "A slip at {moment}. [pause] But the game is *far* from over, and {side} can still fight back.",
        voice_mode: Some(VoiceMode::Calm),
        tone: Tone::Encouraging,
        coda: "After a mistake, reassess the position from scratch instead of mourning the previous one.",
    },
    TemplateSpec {
        kind: TemplateKind::Reflective,
        text: "{Moment}. [pause] The position *breathes*, and both players weigh their plans.",
        voice_mode: None,
        tone: Tone::Reflective,
        coda: "Quiet moves are where plans are made: ask what each side wants to achieve.",
    },
];

pub fn template(kind: TemplateKind) -> &'static TemplateSpec {
    let index = match kind {
        TemplateKind::CriticalMoment => 0,
        TemplateKind::TimePressure => 1,
        TemplateKind::Endgame => 2,
        TemplateKind::Recovery => 3,
        TemplateKind::Reflective => 4,
    };
    &CATALOG[index]
}
