use super::catalog::{template, TemplateSpec};
use crate::models::{GameStateSnapshot, NarrationTemplate, TargetAudience, TemplateKind, VoiceMode};

pub const CRITICAL_EVALUATION: f64 = 3.0;
pub const CRITICAL_AFTER_MOVE: u32 = 15;
pub const TIME_PRESSURE_SECONDS: f64 = 60.0;
pub const ENDGAME_PIECES: u32 = 10;

/// How far from zero an evaluation must be before a side counts as leading.
const LEAD_MARGIN: f64 = 0.25;

pub type RulePredicate = fn(&GameStateSnapshot) -> bool;

/// One `(predicate, template)` pair of the decision list.
pub struct Rule {
    pub name: &'static str,
    pub predicate: RulePredicate,
    pub kind: TemplateKind,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl Rule {
    pub fn matches(&self, snapshot: &GameStateSnapshot) -> bool {
        (self.predicate)(snapshot)
    }
}

fn is_critical(s: &GameStateSnapshot) -> bool {
    !s.prose
        && s.evaluation.abs() > CRITICAL_EVALUATION && s.move_number > CRITICAL_AFTER_MOVE
}

fn is_short_of_time(s: &GameStateSnapshot) -> bool {
    s.time_left_seconds
        .is_some_and(|t| t < TIME_PRESSURE_SECONDS)
}

fn is_endgame(s: &GameStateSnapshot) -> bool {
    s.piece_count.is_some_and(|p| p < ENDGAME_PIECES)
}

fn follows_error(s: &GameStateSnapshot) -> bool {
    s.last_move_quality.is_some_and(|q| q.is_error())
}

fn always(_: &GameStateSnapshot) -> bool {
    true
}

/// Ordered decision list. The first matching rule wins; the order is part
/// of the contract and must not change without a version bump.
pub static RULES: [Rule; 5] = [
    Rule {
        name: "critical-moment",
        predicate: is_critical,
        kind: TemplateKind::CriticalMoment,
    },
    Rule {
        name: "time-pressure",
        predicate: is_short_of_time,
        kind: TemplateKind::TimePressure,
    },
    Rule {
        name: "endgame",
        predicate: is_endgame,
        kind: TemplateKind::Endgame,
    },
    Rule {
        name: "recovery",
        predicate: follows_error,
        kind: TemplateKind::Recovery,
    },
    Rule {
        name: "reflective",
        predicate: always,
        kind: TemplateKind::Reflective,
    },
];

/// Picks and fills a narration template for one decision point.
#[derive(Debug, Clone, Copy, Default)]
pub struct NarrativeSelector {
    voice_mode: VoiceMode,
    audience: TargetAudience,
}

impl NarrativeSelector {
    pub fn new(voice_mode: VoiceMode, audience: TargetAudience) -> Self {
        Self {
            voice_mode,
            audience,
        }
    }

    pub fn rule_for(&self, snapshot: &GameStateSnapshot) -> &'static Rule {
        RULES
            .iter()
            .find(|rule| rule.matches(snapshot))
            .unwrap_or(&RULES[RULES.len() - 1])
    }

    pub fn select(&self, snapshot: &GameStateSnapshot) -> NarrationTemplate {
        let spec = template(self.rule_for(snapshot).kind);
        NarrationTemplate {
            kind: spec.kind,
            text: self.render(spec, snapshot),
            voice_mode: spec.voice_mode.unwrap_or(self.voice_mode),
            tone: spec.tone,
        }
    }

    fn render(&self, spec: &TemplateSpec, snapshot: &GameStateSnapshot) -> String {
        let side = snapshot.side.map_or("the player", |s| s.name());
        let leader = if snapshot.prose {
            "neither side"
        } else if snapshot.evaluation > LEAD_MARGIN {
            "White"
        } else if snapshot.evaluation < -LEAD_MARGIN {
            "Black"
        } else {
            "neither side"
        };
        let unit = if snapshot.prose { "passage" } else { "move" };
        let moment = format!("{unit} {}", snapshot.move_number);
        let eval = format!("{:+.1}", snapshot.evaluation);

        let text = spec
            .text
            .replace("{Moment}", &capitalize(&moment))
            .replace("{moment}", &moment)
            .replace("{side}", side)
            .replace("{leader}", leader)
            .replace("{eval}", &eval);

        match self.audience {
            TargetAudience::Casual => text,
            TargetAudience::Competitive if snapshot.prose => text,
            TargetAudience::Competitive => format!("{text} [pause] Evaluation {eval}."),
            TargetAudience::Educational => format!("{text} [pause] {}", spec.coda),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
