//! Extraction prompts.
//!
//! The schema text embedded in the prompt must mirror `ExtractedProfile`
//! exactly; the two are kept in lock-step by the
//! `prompt_schema_matches_validator_fields` regression test below.

use crate::types::ProfileKind;

/// JSON schema presented to the backend. Mirrors `types::profile`.
pub const PROFILE_SCHEMA: &str = r#"{
    "profile": {
        "name": "Full display name",
        "headline": "Headline under the name",
        "currentRole": "Current role title",
        "currentCompany": "Current employer",
        "location": "Location as shown",
        "about": "About/summary section text",
        "followersCount": 1234,
        "connectionsCount": 500
    },
    "experience": [
        {
            "title": "Role title",
            "company": "Employer",
            "duration": "Date range as shown",
            "location": "Role location",
            "description": "Role description"
        }
    ],
    "education": [
        {
            "school": "Institution",
            "degree": "Degree",
            "field": "Field of study",
            "years": "Years attended"
        }
    ],
    "skills": ["Skill name"],
    "certifications": [
        {"name": "Certification", "issuer": "Issuing org", "date": "Issue date"}
    ],
    "awards": [
        {"title": "Award", "issuer": "Issuing org", "date": "Date"}
    ],
    "volunteer": [
        {"role": "Role", "organization": "Organization", "description": "Description"}
    ],
    "followingCompanies": ["Company name"],
    "activity": [
        {"content": "Post text", "likes": 10, "comments": 2}
    ],
    "engagement": {
        "totalLikes": 100,
        "totalComments": 20,
        "totalShares": 5,
        "averageLikes": 12.5
    }
}"#;

/// System prompt shared by both profile kinds.
const EXTRACTION_SYSTEM_PROMPT: &str = r#"You extract structured data from the HTML of a professional-network profile page.

{priorities}

Rules:
1. Output a single JSON object matching the schema below. No prose, no markdown fences.
2. Copy values exactly as shown on the page; do not invent or infer missing data.
3. Omit fields the page does not show. Use null for unknown counts, never 0.
4. Numbers like "1,234 followers" become the integer 1234.

Schema:
{schema}"#;

const OWN_PROFILE_PRIORITIES: &str = r#"This is the requesting member's own profile. Extract every section with equal care: identity, experience, education, certifications, awards, volunteer work, followed companies, activity, and engagement."#;

const TARGET_PROFILE_PRIORITIES: &str = r#"This is a third-party profile. Prioritize in order: identity (name, headline, current role), experience, education, certifications. Secondary fields (volunteer work, followed companies, activity, engagement) are best-effort."#;

const EXTRACTION_USER_PROMPT: &str = r#"Page HTML:
{html}

Return only the JSON object."#;

/// A system/user message pair ready for dispatch.
#[derive(Debug, Clone)]
pub struct ExtractionPrompt {
    /// System instructions with the embedded schema
    pub system: String,

    /// User message carrying the preprocessed page
    pub user: String,
}

/// Build the extraction prompt for a profile kind.
///
/// The two kinds differ only in extraction priority ordering; the schema is
/// identical.
pub fn build_prompt(kind: ProfileKind, html: &str) -> ExtractionPrompt {
    let priorities = match kind {
        ProfileKind::Own => OWN_PROFILE_PRIORITIES,
        ProfileKind::Target => TARGET_PROFILE_PRIORITIES,
    };

    ExtractionPrompt {
        system: EXTRACTION_SYSTEM_PROMPT
            .replace("{priorities}", priorities)
            .replace("{schema}", PROFILE_SCHEMA),
        user: EXTRACTION_USER_PROMPT.replace("{html}", html),
    }
}
