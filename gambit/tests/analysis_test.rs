mod common;

use std::sync::Arc;

use pretty_assertions::assert_eq;

use common::{material_pipeline, notation, pipeline_with, LevelEvaluator, OPERA_GAME, SCHOLARS_MATE};
use gambit::error::GambitError;
use gambit::models::{
    AnalysisConfig, AnalysisResponse, ContentItem, ContentType, Emotion, ErrorResponse,
    GameOutcome, TargetAudience, TemplateKind, VoiceMode,
};
use gambit::services::{JsonDirSink, ResultSink, VoiceDispatcher};

#[tokio::test]
async fn test_opera_game_heatmap() {
    let result = material_pipeline()
        .analyze(&notation(OPERA_GAME), &AnalysisConfig::default())
        .await
        .unwrap();

    let game = result.game.unwrap();
    assert_eq!(game.ply_count, 33);
    assert_eq!(game.outcome, GameOutcome::WhiteWins);
    assert_eq!(game.headers.get("White").map(String::as_str), Some("Paul Morphy"));

    let heatmap = result.heatmap.unwrap();
    assert_eq!(heatmap.len(), 33);
    assert!(heatmap.iter().all(|e| (0.0..=1.0).contains(&e.intensity)));
    let peak = heatmap.iter().map(|e| e.intensity).fold(0.0, f64::max);
    assert_eq!(peak, 1.0);

    let mate = heatmap.last().unwrap();
    assert_eq!(mate.label, "Rd8#");
    assert_eq!(mate.emotion, Emotion::Triumphant);
    assert_eq!(mate.intensity, 1.0);
}

#[tokio::test]
async fn test_key_moments_respect_spacing() {
    let options = AnalysisConfig {
        max_key_moments: 5,
        min_moment_gap: 4,
        ..AnalysisConfig::default()
    };
    let result = material_pipeline()
        .analyze(&notation(OPERA_GAME), &options)
        .await
        .unwrap();

    let moments = result.key_moments.unwrap();
    assert!(!moments.is_empty());
    assert!(moments.len() <= 5);
    for pair in moments.windows(2) {
        assert!(pair[0].ply_index() < pair[1].ply_index());
        assert!(pair[1].ply_index() - pair[0].ply_index() >= 4);
    }
    assert!(moments.iter().all(|m| !m.rationale.is_empty()));
}

#[tokio::test]
async fn test_short_game_relaxes_spacing() {
    let result = material_pipeline()
        .analyze(&notation(SCHOLARS_MATE), &AnalysisConfig::default())
        .await
        .unwrap();
    // Seven plies cannot hold eight moments three plies apart
    assert_eq!(result.key_moments.unwrap().len(), 7);
}

#[tokio::test]
async fn test_casual_snippets_fit_budget() {
    let options = AnalysisConfig {
        target_audience: TargetAudience::Casual,
        ..AnalysisConfig::default()
    };
    let result = material_pipeline()
        .analyze(&notation(OPERA_GAME), &options)
        .await
        .unwrap();

    let snippets = result.social_snippets.unwrap();
    assert!(!snippets.is_empty());
    for snippet in &snippets {
        assert!(snippet.excerpt_text.chars().count() <= 140);
        assert!(snippet.render(140).chars().count() <= 140);
        assert_eq!(snippet.suggested_hashtags[0], "#chess");
    }
}

#[tokio::test]
async fn test_educational_snippets_quote_annotations() {
    let pgn = "1. e4 e5 2. Bc4 Nc6 3. Qh5 Nf6?? 4. Qxf7# {The oldest trap in the book.} 1-0";
    let options = AnalysisConfig {
        target_audience: TargetAudience::Educational,
        ..AnalysisConfig::default()
    };
    let result = material_pipeline()
        .analyze(&notation(pgn), &options)
        .await
        .unwrap();

    let snippets = result.social_snippets.unwrap();
    assert_eq!(snippets.len(), 8);
    let quoted = snippets
        .iter()
        .find(|s| s.excerpt_text.starts_with("Annotator on Qxf7#"))
        .unwrap();
    assert_eq!(quoted.source_ply_index, 7);
    assert!(quoted.excerpt_text.contains("The oldest trap in the book."));
}

#[tokio::test]
async fn test_narration_uses_request_voice_for_reflective_template() {
    let options = AnalysisConfig {
        voice_mode: VoiceMode::Poetic,
        target_audience: TargetAudience::Casual,
        ..AnalysisConfig::default()
    };
    // Level evaluations never trigger the critical template
    let pipeline = pipeline_with(Arc::new(LevelEvaluator), |_| {});
    let result = pipeline
        .analyze(&notation(common::QUIET_GAMES[0]), &options)
        .await
        .unwrap();

    let adaptations = result.narrative_adaptations.unwrap();
    assert!(!adaptations.is_empty());
    for adaptation in &adaptations {
        assert_eq!(adaptation.template.voice_mode, VoiceMode::Poetic);
        assert!(!adaptation.template.text.contains('{'));
    }
}

#[tokio::test]
async fn test_narrations_reach_voice_channel() {
    let (dispatcher, mut rx) = VoiceDispatcher::channel();
    let pipeline = material_pipeline().with_voice(dispatcher);
    let result = pipeline
        .analyze(&notation(common::FOOLS_MATE), &AnalysisConfig::default())
        .await
        .unwrap();

    let expected = result.narrative_adaptations.unwrap().len();
    let mut received = 0;
    while let Ok(request) = rx.try_recv() {
        assert_eq!(request.analysis_id, result.analysis_id);
        received += 1;
    }
    assert_eq!(received, expected);
}

#[tokio::test]
async fn test_transcript_path() {
    let transcript = "[00:00:05] HOST: Welcome back to the show!\n\
                      [00:00:09] GUEST: White's attack looked strong.\n\
                      [00:00:15] GUEST: Then a terrible blunder on move 30.\n\
                      [00:00:21] HOST: What a stunning finish!";
    let result = material_pipeline()
        .analyze(
            &ContentItem::new(transcript, ContentType::Video),
            &AnalysisConfig::default(),
        )
        .await
        .unwrap();

    assert!(result.game.is_none());
    let heatmap = result.heatmap.unwrap();
    assert_eq!(heatmap.len(), 4);
    assert!(heatmap.iter().all(|e| e.side.is_none()));
    assert!(!heatmap[0].label.contains("00:00"));
    assert!(result.key_moments.is_some());
}

#[tokio::test]
async fn test_illegal_move_names_ply() {
    let err = material_pipeline()
        .analyze(
            &notation("1. e4 e5 2. Nf3 Nc6 3. Bb5 Ke7 4. Ke3"),
            &AnalysisConfig::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, GambitError::Parse { ply: 7, .. }));

    let value = serde_json::to_value(ErrorResponse::from(&err)).unwrap();
    assert_eq!(value["success"], false);
    assert_eq!(value["status"], 400);
    assert_eq!(value["error"]["code"], "parse_error");
}

#[tokio::test]
async fn test_oversized_content_is_rejected() {
    let err = material_pipeline()
        .analyze(
            &ContentItem::new("e4 ".repeat(33_334), ContentType::Notation),
            &AnalysisConfig::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, GambitError::Validation(_)));
}

#[tokio::test]
async fn test_content_size_limit_is_inclusive() {
    let pipeline = material_pipeline();

    let at_limit = ContentItem::new("a".repeat(100_000), ContentType::Article);
    let result = pipeline
        .analyze(&at_limit, &AnalysisConfig::default())
        .await
        .unwrap();
    assert_eq!(result.heatmap.unwrap().len(), 1);

    let over_limit = ContentItem::new("a".repeat(100_001), ContentType::Article);
    let err = pipeline
        .analyze(&over_limit, &AnalysisConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, GambitError::Validation(_)));
}

#[tokio::test]
async fn test_long_upbeat_article_gets_no_chess_claims() {
    let article: String = (1..=20)
        .map(|i| format!("Paragraph {i} was a strong and excellent read. "))
        .collect();
    let options = AnalysisConfig {
        target_audience: TargetAudience::Competitive,
        ..AnalysisConfig::default()
    };
    let result = material_pipeline()
        .analyze(&ContentItem::new(article, ContentType::Article), &options)
        .await
        .unwrap();

    let adaptations = result.narrative_adaptations.unwrap();
    assert!(!adaptations.is_empty());
    for adaptation in &adaptations {
        let text = &adaptation.template.text;
        assert_ne!(adaptation.template.kind, TemplateKind::CriticalMoment, "{text}");
        assert!(text.to_lowercase().contains("passage"), "{text}");
        for claim in ["White", "Black", "Move ", "Evaluation"] {
            assert!(!text.contains(claim), "{text}");
        }
    }
}

#[tokio::test]
async fn test_response_wire_shape_and_storage() {
    let result = material_pipeline()
        .analyze(&notation(SCHOLARS_MATE), &AnalysisConfig::default())
        .await
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let sink = JsonDirSink::new(dir.path());
    sink.store(&result).await.unwrap();
    let stored = std::fs::read_to_string(sink.path_for(&result.analysis_id)).unwrap();
    let stored: serde_json::Value = serde_json::from_str(&stored).unwrap();
    assert_eq!(stored["analysisId"], result.analysis_id.as_str());

    let value = serde_json::to_value(AnalysisResponse::new(result)).unwrap();
    assert_eq!(value["success"], true);
    assert!(value["processingTimeMs"].is_u64());
    let result = &value["result"];
    assert_eq!(result["contentType"], "notation");
    assert_eq!(result["heatmap"][0]["plyIndex"], 1);
    assert_eq!(result["heatmap"][6]["emotion"], "triumphant");
    assert!(result["keyMoments"][0]["rationale"].is_string());
    assert!(result["narrativeAdaptations"][0]["kind"].is_string());
    assert_eq!(result["socialSnippets"][0]["suggestedHashtags"][0], "#chess");
}
