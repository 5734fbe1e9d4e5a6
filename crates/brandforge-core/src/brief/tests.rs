use super::*;
use crate::testing::ScriptedChat;
use brandforge_llm::Error as LlmError;

fn complete_brief() -> CreativeBrief {
    CreativeBrief {
        overview: "Spring launch".into(),
        objectives: "Drive signups".into(),
        target_audience: "Urban professionals".into(),
        key_message: "Save an hour a day".into(),
        tone_and_style: "Confident, friendly".into(),
        deliverable: "Instagram post".into(),
        ..CreativeBrief::default()
    }
}

#[test]
fn test_complete_brief_has_no_missing_fields() {
    assert!(complete_brief().is_complete());
    assert!(complete_brief().missing_critical_fields().is_empty());
}

#[test]
fn test_whitespace_only_critical_field_is_missing() {
    let mut brief = complete_brief();
    brief.tone_and_style = "   ".into();
    assert!(!brief.is_complete());
    assert_eq!(brief.missing_critical_fields(), vec!["tone_and_style"]);
}

#[test]
fn test_non_critical_fields_do_not_block_completeness() {
    let mut brief = complete_brief();
    brief.overview.clear();
    brief.timelines.clear();
    brief.cta.clear();
    assert!(brief.is_complete());
}

#[test]
fn test_render_skips_empty_fields() {
    let mut brief = complete_brief();
    brief.cta.clear();
    let rendered = brief.render();
    assert!(rendered.contains("Objectives: Drive signups"));
    assert!(!rendered.contains("Call to action"));
}

mod label_scan {
    use super::*;

    #[test]
    fn test_labeled_fields_are_extracted() {
        let brief = CreativeBrief::from_labeled_text(
            "Objectives: Drive signups\n\
             Target Audience: Urban professionals\n\
             Key Message: Save an hour a day\n\
             Tone: Confident\n\
             Deliverable: Instagram post",
        );
        assert_eq!(brief.objectives, "Drive signups");
        assert_eq!(brief.target_audience, "Urban professionals");
        assert_eq!(brief.tone_and_style, "Confident");
        assert!(brief.is_complete());
    }

    #[test]
    fn test_unlabeled_leading_text_goes_to_overview() {
        let brief = CreativeBrief::from_labeled_text(
            "We are launching a new productivity app.\nObjectives: Drive signups",
        );
        assert_eq!(brief.overview, "We are launching a new productivity app.");
        assert_eq!(brief.objectives, "Drive signups");
    }

    #[test]
    fn test_continuation_lines_attach_to_current_field() {
        let brief = CreativeBrief::from_labeled_text(
            "Objectives: Drive signups\nand grow weekly active usage",
        );
        assert_eq!(brief.objectives, "Drive signups and grow weekly active usage");
    }

    #[test]
    fn test_synonyms_are_recognized_case_insensitively() {
        let brief = CreativeBrief::from_labeled_text(
            "GOALS: Grow revenue\naudience: Small businesses\nCall to Action: Sign up today",
        );
        assert_eq!(brief.objectives, "Grow revenue");
        assert_eq!(brief.target_audience, "Small businesses");
        assert_eq!(brief.cta, "Sign up today");
    }

    #[test]
    fn test_omitted_fields_stay_empty() {
        // No-hallucination: a field the text never states is never filled.
        let brief = CreativeBrief::from_labeled_text("Objectives: Drive signups");
        assert!(brief.tone_and_style.is_empty());
        assert!(brief.target_audience.is_empty());
        assert!(brief.key_message.is_empty());
        assert!(!brief.is_complete());
    }

    #[test]
    fn test_prose_with_colon_is_not_a_label() {
        let brief = CreativeBrief::from_labeled_text(
            "Remember what the last campaign taught us about timing: launch early.",
        );
        assert!(brief.overview.contains("launch early"));
        assert!(brief.timelines.is_empty());
    }
}

mod clarifier {
    use super::*;

    fn analysis_json(brief: &CreativeBrief, status: &str, question: Option<&str>) -> String {
        serde_json::json!({
            "status": status,
            "extracted_fields": brief,
            "missing_fields": brief.missing_critical_fields(),
            "clarifying_message": question,
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_complete_brief_needs_no_question() {
        let brief = complete_brief();
        let chat = ScriptedChat::replies(&[&analysis_json(&brief, "complete", None)]);
        let clarifier = BriefClarifier::new(chat);

        let parse = clarifier.parse("full brief text").await.unwrap();
        assert!(!parse.blocked);
        assert!(parse.clarifying_question.is_none());
        assert!(parse.draft.is_complete());
    }

    #[tokio::test]
    async fn test_incomplete_brief_surfaces_agent_question() {
        let mut brief = complete_brief();
        brief.tone_and_style.clear();
        let chat = ScriptedChat::replies(&[&analysis_json(
            &brief,
            "incomplete",
            Some("What tone should the copy take?"),
        )]);
        let clarifier = BriefClarifier::new(chat);

        let parse = clarifier.parse("partial brief").await.unwrap();
        assert!(!parse.blocked);
        assert_eq!(
            parse.clarifying_question.as_deref(),
            Some("What tone should the copy take?")
        );
    }

    #[tokio::test]
    async fn test_claimed_complete_with_empty_critical_field_is_downgraded() {
        // The upstream model is not trusted: it claims complete while
        // leaving tone_and_style empty.
        let mut brief = complete_brief();
        brief.tone_and_style.clear();
        let chat = ScriptedChat::replies(&[&analysis_json(&brief, "complete", None)]);
        let clarifier = BriefClarifier::new(chat);

        let parse = clarifier.parse("brief").await.unwrap();
        assert!(!parse.blocked);
        let question = parse.clarifying_question.expect("downgrade must ask");
        assert!(question.contains("tone and style"));
    }

    #[tokio::test]
    async fn test_safety_refusal_blocks_with_explanation() {
        let chat = ScriptedChat::new([Err(LlmError::SafetyRefused(
            "This request violates the content policy.".to_string(),
        ))]);
        let clarifier = BriefClarifier::new(chat);

        let parse = clarifier.parse("disallowed brief").await.unwrap();
        assert!(parse.blocked);
        assert_eq!(
            parse.clarifying_question.as_deref(),
            Some("This request violates the content policy.")
        );
        assert_eq!(parse.draft, CreativeBrief::default());
    }

    #[tokio::test]
    async fn test_transient_errors_propagate() {
        let chat = ScriptedChat::new([Err(LlmError::RateLimited)]);
        let clarifier = BriefClarifier::new(chat);
        assert!(clarifier.parse("brief").await.is_err());
    }

    #[tokio::test]
    async fn test_malformed_output_falls_back_to_label_scan() {
        let chat = ScriptedChat::replies(&["Sure! Here is my analysis of your brief..."]);
        let clarifier = BriefClarifier::new(chat);

        let parse = clarifier
            .parse("Objectives: Drive signups\nDeliverable: Banner ad")
            .await
            .unwrap();
        assert!(!parse.blocked);
        // The degrade path never asks a question and never invents fields.
        assert!(parse.clarifying_question.is_none());
        assert_eq!(parse.draft.objectives, "Drive signups");
        assert!(parse.draft.tone_and_style.is_empty());
    }

    #[tokio::test]
    async fn test_promissory_note_brief_asks_for_missing_fields() {
        // A deliverable-only request implies objectives and a key message
        // but states no tone or audience; the loop must ask rather than
        // proceed.
        let draft = CreativeBrief {
            deliverable: "Promissory note".into(),
            objectives: "Document a $100,000 loan".into(),
            key_message: "Proposed $100,000 for Washington State".into(),
            ..CreativeBrief::default()
        };
        let chat = ScriptedChat::replies(&[&analysis_json(&draft, "complete", None)]);
        let clarifier = BriefClarifier::new(chat);

        let parse = clarifier
            .parse("Generate promissory note with a proposed $100,000 for Washington State")
            .await
            .unwrap();

        assert!(!parse.blocked);
        let question = parse.clarifying_question.expect("must ask a question");
        assert!(question.contains("target audience"));
        assert!(question.contains("tone and style"));
    }
}
