//! The validated profile schema.
//!
//! Every field except the acceptance gate is best-effort: backends routinely
//! omit sections, so deserialization must tolerate any subset of the schema.

use serde::{Deserialize, Serialize};

/// A structured profile extracted from a captured page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractedProfile {
    /// Identity and headline block
    pub profile: ProfileHeader,

    /// Work history
    pub experience: Vec<Experience>,

    /// Education history
    pub education: Vec<Education>,

    /// Listed skills
    pub skills: Vec<String>,

    /// Certifications and licenses
    pub certifications: Vec<Certification>,

    /// Honors and awards
    pub awards: Vec<Award>,

    /// Volunteer roles
    pub volunteer: Vec<VolunteerRole>,

    /// Companies the member follows
    pub following_companies: Vec<String>,

    /// Recent posts and reposts
    pub activity: Vec<ActivityPost>,

    /// Aggregate engagement metrics
    pub engagement: Engagement,
}

impl ExtractedProfile {
    /// The acceptance gate: a usable extraction has a name and at least one
    /// of experience or education. Everything else is best-effort.
    pub fn meets_acceptance_gate(&self) -> bool {
        !self.profile.name.trim().is_empty()
            && (!self.experience.is_empty() || !self.education.is_empty())
    }
}

/// Identity block at the top of a profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileHeader {
    /// Display name
    pub name: String,

    /// Headline under the name
    pub headline: String,

    /// Current role title
    pub current_role: String,

    /// Current employer
    pub current_company: String,

    /// Location string as shown on the page
    pub location: String,

    /// About / summary section
    pub about: String,

    /// Follower count, when visible
    pub followers_count: Option<u64>,

    /// Connection count, when visible
    pub connections_count: Option<u64>,
}

/// One work-history entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Experience {
    /// Role title
    pub title: String,

    /// Employer
    pub company: String,

    /// Duration or date range as shown
    pub duration: Option<String>,

    /// Role location
    pub location: Option<String>,

    /// Role description
    pub description: Option<String>,
}

/// One education entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Education {
    /// Institution name
    pub school: String,

    /// Degree earned
    pub degree: Option<String>,

    /// Field of study
    pub field: Option<String>,

    /// Years attended
    pub years: Option<String>,
}

/// A certification or license.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Certification {
    /// Certification name
    pub name: String,

    /// Issuing organization
    pub issuer: Option<String>,

    /// Issue date as shown
    pub date: Option<String>,
}

/// An honor or award.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Award {
    /// Award title
    pub title: String,

    /// Issuing organization
    pub issuer: Option<String>,

    /// Date as shown
    pub date: Option<String>,
}

/// A volunteer role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VolunteerRole {
    /// Role title
    pub role: String,

    /// Organization
    pub organization: String,

    /// Role description
    pub description: Option<String>,
}

/// One recent post or repost.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActivityPost {
    /// Post text, possibly truncated on the page
    pub content: Option<String>,

    /// Like count on the post
    pub likes: Option<u64>,

    /// Comment count on the post
    pub comments: Option<u64>,
}

/// Aggregate engagement metrics across visible activity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Engagement {
    /// Total likes across visible posts
    pub total_likes: Option<u64>,

    /// Total comments across visible posts
    pub total_comments: Option<u64>,

    /// Total shares across visible posts
    pub total_shares: Option<u64>,

    /// Mean likes per visible post
    pub average_likes: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> ExtractedProfile {
        ExtractedProfile {
            profile: ProfileHeader {
                name: name.to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_gate_requires_name() {
        let mut profile = named("");
        profile.experience.push(Experience {
            title: "Engineer".into(),
            company: "Acme".into(),
            ..Default::default()
        });
        assert!(!profile.meets_acceptance_gate());

        let mut whitespace = named("   ");
        whitespace.experience = profile.experience.clone();
        assert!(!whitespace.meets_acceptance_gate());
    }

    #[test]
    fn test_gate_requires_experience_or_education() {
        let profile = named("Ada Lovelace");
        assert!(!profile.meets_acceptance_gate());

        let mut with_experience = named("Ada Lovelace");
        with_experience.experience.push(Experience {
            title: "Analyst".into(),
            company: "Analytical Engines Ltd".into(),
            ..Default::default()
        });
        assert!(with_experience.meets_acceptance_gate());

        let mut with_education = named("Ada Lovelace");
        with_education.education.push(Education {
            school: "Home tutoring".into(),
            ..Default::default()
        });
        assert!(with_education.meets_acceptance_gate());
    }

    #[test]
    fn test_partial_json_deserializes() {
        let profile: ExtractedProfile = serde_json::from_str(
            r#"{"profile":{"name":"Grace Hopper","headline":"Rear Admiral"},"education":[{"school":"Yale"}]}"#,
        )
        .unwrap();

        assert_eq!(profile.profile.name, "Grace Hopper");
        assert_eq!(profile.education[0].school, "Yale");
        assert!(profile.experience.is_empty());
        assert!(profile.meets_acceptance_gate());
    }

    #[test]
    fn test_camel_case_round_trip() {
        let mut profile = named("Test");
        profile.profile.followers_count = Some(1200);
        profile.engagement.average_likes = Some(3.5);
        profile.following_companies.push("Acme".into());

        let json = serde_json::to_string(&profile).unwrap();
        assert!(json.contains("followersCount"));
        assert!(json.contains("averageLikes"));
        assert!(json.contains("followingCompanies"));
        assert!(!json.contains("followers_count"));
    }
}
