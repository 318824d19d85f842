//! Response repair and validation.
//!
//! Backends return JSON wrapped in markdown fences, padded with narration,
//! or truncated mid-object by an output-token cap. This module is the single
//! entry point that turns raw completion text into a validated profile; the
//! orchestrator never parses backend text itself, so the repair heuristics
//! can be replaced without touching it.

use tracing::{debug, warn};

use crate::types::ExtractedProfile;

/// Outcome of repairing and validating one raw completion.
#[derive(Debug, Clone)]
pub enum RepairVerdict {
    /// Syntactically valid and past the acceptance gate
    Valid(Box<ExtractedProfile>),

    /// Syntactically valid JSON that fails the acceptance gate. Signals
    /// prompt/schema drift rather than a transport problem, so it is logged
    /// distinctly, but callers see it as an extraction failure.
    GateFailed(Box<ExtractedProfile>),

    /// Could not be turned into a profile at all
    Unparseable,
}

impl RepairVerdict {
    /// The validated profile, if this verdict carries one.
    pub fn into_valid(self) -> Option<ExtractedProfile> {
        match self {
            Self::Valid(profile) => Some(*profile),
            _ => None,
        }
    }
}

/// Repair raw completion text and apply the acceptance gate.
pub fn repair_and_validate(raw: &str) -> RepairVerdict {
    let unfenced = strip_code_fences(raw);

    let Some(start) = unfenced.find('{') else {
        warn!(raw_len = raw.len(), "completion contains no JSON object");
        return RepairVerdict::Unparseable;
    };

    let value = match parse_json_object(&unfenced[start..]) {
        Some(value) => value,
        None => {
            warn!(raw_len = raw.len(), "completion JSON unrecoverable");
            return RepairVerdict::Unparseable;
        }
    };

    let profile: ExtractedProfile = match serde_json::from_value(value) {
        Ok(profile) => profile,
        Err(e) => {
            warn!(error = %e, "completion JSON does not fit the profile schema");
            return RepairVerdict::Unparseable;
        }
    };

    if profile.meets_acceptance_gate() {
        RepairVerdict::Valid(Box::new(profile))
    } else {
        // Parsed cleanly but carries no usable identity; the prompt and the
        // schema may have drifted apart.
        warn!(
            name_present = !profile.profile.name.trim().is_empty(),
            experience = profile.experience.len(),
            education = profile.education.len(),
            "extraction failed the acceptance gate"
        );
        RepairVerdict::GateFailed(Box::new(profile))
    }
}

/// Strip markdown code-fence wrapping if present.
fn strip_code_fences(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Parse the text starting at the object's first `{`.
///
/// First try the balanced span from the first `{` to the last `}`, which
/// discards narration the model added around the object. When that fails,
/// hand the open-ended span to the truncation repairer: a token-cap cut
/// usually lands inside an array or string, which moves the last `}` to some
/// earlier, unrelated position.
fn parse_json_object(text: &str) -> Option<serde_json::Value> {
    if let Some(end) = text.rfind('}') {
        if let Ok(value) = serde_json::from_str(&text[..=end]) {
            return Some(value);
        }
    }
    repair_truncated(text)
}

/// Close whatever a token-cap cut left open, then re-parse once.
///
/// Scans the text tracking open strings, objects, and arrays, and appends
/// the closers in nesting order. A documented heuristic for the common
/// truncation case, not a general JSON repairer: a cut mid-key or mismatched
/// delimiters still fail.
fn repair_truncated(text: &str) -> Option<serde_json::Value> {
    let mut stack: Vec<char> = Vec::new();
    let mut in_string = false;

    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if in_string {
            match c {
                '\\' => {
                    chars.next();
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => stack.push('}'),
            '[' => stack.push(']'),
            '}' | ']' => {
                if stack.pop() != Some(c) {
                    return None;
                }
            }
            _ => {}
        }
    }

    if stack.is_empty() && !in_string {
        // Balanced already; the parse failure was something other than
        // truncation.
        return None;
    }

    let mut repaired = if in_string {
        let mut open_ended = text.to_string();
        open_ended.push('"');
        open_ended
    } else {
        text.trim_end().trim_end_matches(',').to_string()
    };
    let appended = stack.len();
    while let Some(closer) = stack.pop() {
        repaired.push(closer);
    }

    match serde_json::from_str(&repaired) {
        Ok(value) => {
            debug!(appended, "recovered truncated JSON");
            Some(value)
        }
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const COMPLETE: &str = r#"{
        "profile": {"name": "Ada Lovelace", "headline": "Analyst"},
        "experience": [{"title": "Analyst", "company": "Analytical Engines Ltd"}],
        "education": [{"school": "Home tutoring"}],
        "skills": ["mathematics"],
        "engagement": {"totalLikes": 5, "totalComments": 2}
    }"#;

    /// Drop the last `k` closing braces, the way an output-token cap cuts a
    /// completion that ends in nested objects.
    fn drop_trailing_braces(doc: &str, k: usize) -> String {
        let mut text = doc.trim_end().to_string();
        for _ in 0..k {
            assert!(text.ends_with('}'), "document has fewer than {} trailing braces", k);
            text.pop();
            text = text.trim_end().to_string();
        }
        text
    }

    #[test]
    fn test_clean_json_validates() {
        let verdict = repair_and_validate(COMPLETE);
        let profile = verdict.into_valid().unwrap();
        assert_eq!(profile.profile.name, "Ada Lovelace");
        assert_eq!(profile.experience.len(), 1);
    }

    #[test]
    fn test_strips_markdown_fences() {
        let fenced = format!("```json\n{}\n```", COMPLETE);
        assert!(repair_and_validate(&fenced).into_valid().is_some());

        let bare_fence = format!("```\n{}\n```", COMPLETE);
        assert!(repair_and_validate(&bare_fence).into_valid().is_some());
    }

    #[test]
    fn test_discards_surrounding_narration() {
        let chatty = format!(
            "Sure! Here is the extracted profile:\n{}\nLet me know if you need anything else.",
            COMPLETE
        );
        assert!(repair_and_validate(&chatty).into_valid().is_some());
    }

    #[test]
    fn test_repairs_truncated_braces() {
        // COMPLETE ends in a nested object, so the trailing two braces can
        // vanish to a token cap. At k=2 the remaining last `}` sits inside
        // the education array, so the repair must rebalance from the open
        // end rather than the last-brace slice.
        for k in 1..=2 {
            let truncated = drop_trailing_braces(COMPLETE, k);
            let verdict = repair_and_validate(&truncated);
            assert!(
                verdict.into_valid().is_some(),
                "failed to repair k={} truncation",
                k
            );
        }
    }

    #[test]
    fn test_repairs_truncation_inside_array() {
        // The cut lands mid-array: closing braces alone can never rebalance
        // this, the open `[` has to close too.
        let truncated = r#"{
            "profile": {"name": "Ada Lovelace"},
            "experience": [{"title": "Analyst", "company": "Analytical Engines Ltd"}"#;

        let profile = repair_and_validate(truncated).into_valid().unwrap();
        assert_eq!(profile.experience.len(), 1);
        assert_eq!(profile.experience[0].company, "Analytical Engines Ltd");
    }

    #[test]
    fn test_repairs_truncation_inside_string() {
        let truncated = r#"{"profile": {"name": "Ada Lovelace", "about": "Pioneer of comp"#;

        // Recoverable JSON, even though the gate then rejects it.
        assert!(matches!(
            repair_and_validate(truncated),
            RepairVerdict::GateFailed(_)
        ));
    }

    #[test]
    fn test_gate_failure_is_distinct_from_parse_failure() {
        let no_identity = r#"{"profile": {"headline": "Mystery"}, "skills": ["x"]}"#;
        assert!(matches!(
            repair_and_validate(no_identity),
            RepairVerdict::GateFailed(_)
        ));

        let name_only = r#"{"profile": {"name": "Ada"}}"#;
        assert!(matches!(
            repair_and_validate(name_only),
            RepairVerdict::GateFailed(_)
        ));
    }

    #[test]
    fn test_unparseable_inputs() {
        for raw in [
            "",
            "no json here",
            "[1, 2, 3]",
            "{\"profile\": }}}{{{",
            "```json\n```",
        ] {
            assert!(
                matches!(repair_and_validate(raw), RepairVerdict::Unparseable),
                "expected unparseable: {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_valid_profile_always_passes_gate() {
        if let RepairVerdict::Valid(profile) = repair_and_validate(COMPLETE) {
            assert!(profile.meets_acceptance_gate());
        } else {
            panic!("expected valid verdict");
        }
    }

    proptest! {
        /// Removing the last k closing braces from a valid document is
        /// recoverable for small k.
        #[test]
        fn prop_brace_truncation_recovers(k in 1usize..=3, likes in 0u64..10_000) {
            let doc = format!(
                r#"{{"profile": {{"name": "Ada", "meta": {{"likes": {}}}}}}}"#,
                likes
            );
            // Sanity: the document really ends in three closing braces.
            serde_json::from_str::<serde_json::Value>(&doc).unwrap();

            let truncated = drop_trailing_braces(&doc, k);
            let value = parse_json_object(&truncated);
            prop_assert!(value.is_some());
            prop_assert!(value.unwrap().is_object());
        }
    }
}
