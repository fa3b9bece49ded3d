use crate::models::{Emotion, HeatmapEntry, KeyMoment};

/// Picks up to `max_moments` entries by intensity, keeping selections at
/// least `min_gap` plies apart, and returns them in ply order.
///
/// Equal intensities prefer the earlier ply. When the input is too short to
/// honour the gap for a full selection, the gap is narrowed step by step
/// until `min(len, max_moments)` entries fit; earlier picks are kept.
pub fn extract(heatmap: &[HeatmapEntry], max_moments: usize, min_gap: usize) -> Vec<KeyMoment> {
    let target = heatmap.len().min(max_moments);
    if target == 0 {
        return Vec::new();
    }

    let mut order: Vec<usize> = (0..heatmap.len()).collect();
    order.sort_by(|&a, &b| {
        heatmap[b]
            .intensity
            .total_cmp(&heatmap[a].intensity)
            .then(heatmap[a].ply_index.cmp(&heatmap[b].ply_index))
    });

    let may_relax = heatmap.len() < min_gap.saturating_mul(max_moments);
    let mut gap = min_gap;
    let mut chosen: Vec<usize> = Vec::with_capacity(target);

    loop {
        for &candidate in &order {
            if chosen.len() >= target {
                break;
            }
            if chosen.contains(&candidate) {
                continue;
            }
            let ply = heatmap[candidate].ply_index;
            if chosen
                .iter()
                .all(|&c| heatmap[c].ply_index.abs_diff(ply) >= gap)
            {
                chosen.push(candidate);
            }
        }

        if chosen.len() >= target || !may_relax || gap == 0 {
            break;
        }
        gap -= 1;
    }

    if gap < min_gap {
        tracing::debug!(min_gap, gap, plies = heatmap.len(), "Relaxed key-moment spacing");
    }

    let mut moments: Vec<KeyMoment> = chosen
        .into_iter()
        .map(|i| KeyMoment {
            rationale: rationale(&heatmap[i]),
            entry: heatmap[i].clone(),
        })
        .collect();
    moments.sort_by_key(|m| m.ply_index());
    moments
}

fn rationale(entry: &HeatmapEntry) -> String {
    let Some(side) = entry.side else {
        return format!(
            "Passage {} is a {} peak at intensity {:.2}.",
            entry.ply_index, entry.emotion, entry.intensity
        );
    };

    let who = side.name();
    let san = &entry.label;
    match entry.emotion {
        Emotion::Triumphant => format!("{who} delivers checkmate with {san}."),
        Emotion::Brilliant => {
            format!("{who} finds {san}, a brilliant resource that survives every reply.")
        }
        Emotion::BlunderRecovery => format!("{who} punishes the previous error with {san}."),
        Emotion::Dramatic => format!(
            "{san} swings the evaluation by {:.1} pawns.",
            entry.evaluation_delta.abs()
        ),
        Emotion::Tense => format!("{who} plays {san} with the position on a knife's edge."),
        Emotion::Mysterious => format!("{san} steers the game into a quiet, uncertain endgame."),
        Emotion::Calm => format!("{who} plays {san}, a calm moment before what follows."),
    }
}
