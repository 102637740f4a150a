//! Heuristic field recovery from resume text.
//!
//! Each category is a row in [`FIELD_RULES`]: an ordered list of patterns and
//! a capture mode. Categories are evaluated independently; a category whose
//! patterns fail to compile is reported absent and the others still run.
//!
//! Word boundaries and digits are ASCII-only: an accented or CJK letter next
//! to an address is a separator, and non-Latin numerals are not a phone.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Email,
    Phone,
    Skills,
    Experience,
    Education,
    Companies,
}

impl Field {
    pub fn key(self) -> &'static str {
        match self {
            Field::Email => "email",
            Field::Phone => "phone",
            Field::Skills => "skills",
            Field::Experience => "experience",
            Field::Education => "education",
            Field::Companies => "companies",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    /// Text of the first match of the first pattern that matches at all.
    FirstMatch,
    /// Every match of every pattern, de-duplicated, in order of appearance.
    Distinct,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: Field,
    pub capture: Capture,
    pub patterns: &'static [&'static str],
}

const SKILLS: &str = r"(?i)(JavaScript|TypeScript|Python|Java|React|Node\.js|Angular|Vue|HTML|CSS|SQL|MongoDB|PostgreSQL|MySQL|AWS|Azure|GCP|Docker|Kubernetes|Git|GitHub|C\+\+|C#|PHP|Ruby|Swift|Kotlin|Flutter|Android|iOS|Machine Learning|AI|Data Science|Agile|Scrum|DevOps|Linux|Windows|REST|API|JSON|XML|Bootstrap|Tailwind|Sass|Less|Express|Django|Flask|Spring|Laravel|Unity|Photoshop|Figma|Sketch)";

const EDUCATION: &str = r"(?i)(Bachelor|Master|PhD|B\.S\.|B\.A\.|M\.S\.|M\.A\.|MBA|Computer Science|Engineering|University|College|Degree|Graduate|Undergraduate)";

const COMPANIES: &str = r"(?i)(Google|Microsoft|Apple|Amazon|Meta|Facebook|Netflix|Tesla|Uber|Airbnb|Spotify|Slack|Adobe|Oracle|IBM|Intel|NVIDIA|Salesforce|Twitter|LinkedIn|Dropbox|Stripe|Zoom|Shopify|Atlassian|Red Hat|VMware)";

pub const FIELD_RULES: &[FieldRule] = &[
    FieldRule {
        field: Field::Email,
        capture: Capture::FirstMatch,
        patterns: &[r"(?-u:\b)[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}(?-u:\b)"],
    },
    FieldRule {
        field: Field::Phone,
        capture: Capture::FirstMatch,
        patterns: &[
            r"(\+?[0-9]{1,3}[-.\s]?)?\(?[0-9]{3}\)?[-.\s]?[0-9]{3}[-.\s]?[0-9]{4}",
            r"\+?[0-9]{1,3}[-\s]?[0-9]{3,4}[-\s]?[0-9]{3,4}[-\s]?[0-9]{3,4}",
            r"\([0-9]{3}\)\s?[0-9]{3}-?[0-9]{4}",
        ],
    },
    FieldRule {
        field: Field::Skills,
        capture: Capture::Distinct,
        patterns: &[SKILLS],
    },
    FieldRule {
        field: Field::Experience,
        capture: Capture::FirstMatch,
        patterns: &[
            r"(?i)([0-9]+)[+\s]*(years?|yrs?)\s*(of\s*)?(experience|exp)",
            r"(?i)([0-9]+)\+?\s*(year|yr)\s*(experience|exp)",
            r"(?i)(over|more than)\s*([0-9]+)\s*(years?|yrs?)",
        ],
    },
    FieldRule {
        field: Field::Education,
        capture: Capture::Distinct,
        patterns: &[EDUCATION],
    },
    FieldRule {
        field: Field::Companies,
        capture: Capture::Distinct,
        patterns: &[COMPANIES],
    },
];

/// Facts recovered from resume text. A `None` field was not found; lists are
/// never present and empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFields {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub skills: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub experience: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub education: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub companies: Option<Vec<String>>,
}

impl ExtractedFields {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

enum FieldValue {
    Single(String),
    List(Vec<String>),
}

struct CompiledRule {
    field: Field,
    capture: Capture,
    patterns: Result<Vec<Regex>, String>,
}

pub struct FieldExtractor {
    rules: Vec<CompiledRule>,
}

impl FieldExtractor {
    pub fn new(table: &[FieldRule]) -> Self {
        let rules = table
            .iter()
            .map(|rule| CompiledRule {
                field: rule.field,
                capture: rule.capture,
                patterns: rule
                    .patterns
                    .iter()
                    .map(|p| Regex::new(p).map_err(|e| e.to_string()))
                    .collect(),
            })
            .collect();
        Self { rules }
    }

    pub fn extract(&self, text: &str) -> ExtractedFields {
        let mut fields = ExtractedFields::default();

        for rule in &self.rules {
            let patterns = match &rule.patterns {
                Ok(patterns) => patterns,
                Err(reason) => {
                    warn!(field = rule.field.key(), %reason, "Field patterns unusable; skipping");
                    continue;
                }
            };

            let value = match rule.capture {
                Capture::FirstMatch => first_match(patterns, text).map(FieldValue::Single),
                Capture::Distinct => {
                    let found = distinct_matches(patterns, text);
                    (!found.is_empty()).then_some(FieldValue::List(found))
                }
            };

            if let Some(value) = value {
                assign(&mut fields, rule.field, value);
            }
        }

        fields
    }
}

fn first_match(patterns: &[Regex], text: &str) -> Option<String> {
    patterns
        .iter()
        .find_map(|re| re.find(text).map(|m| m.as_str().to_string()))
}

fn distinct_matches(patterns: &[Regex], text: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for re in patterns {
        for m in re.find_iter(text) {
            if !out.iter().any(|seen| seen == m.as_str()) {
                out.push(m.as_str().to_string());
            }
        }
    }
    out
}

fn assign(fields: &mut ExtractedFields, field: Field, value: FieldValue) {
    match (field, value) {
        (Field::Email, FieldValue::Single(v)) => fields.email = Some(v),
        (Field::Phone, FieldValue::Single(v)) => fields.phone = Some(v),
        (Field::Experience, FieldValue::Single(v)) => fields.experience = Some(v),
        (Field::Skills, FieldValue::List(v)) => fields.skills = Some(v),
        (Field::Education, FieldValue::List(v)) => fields.education = Some(v),
        (Field::Companies, FieldValue::List(v)) => fields.companies = Some(v),
        // A single-valued field configured with a list capture, or the reverse.
        (Field::Email | Field::Phone | Field::Experience, FieldValue::List(mut v)) => {
            let first = v.swap_remove(0);
            match field {
                Field::Email => fields.email = Some(first),
                Field::Phone => fields.phone = Some(first),
                _ => fields.experience = Some(first),
            }
        }
        (Field::Skills | Field::Education | Field::Companies, FieldValue::Single(v)) => {
            let list = Some(vec![v]);
            match field {
                Field::Skills => fields.skills = list,
                Field::Education => fields.education = list,
                _ => fields.companies = list,
            }
        }
    }
}

static DEFAULT_EXTRACTOR: Lazy<FieldExtractor> = Lazy::new(|| FieldExtractor::new(FIELD_RULES));

/// Runs the built-in rule table over `text`. Never fails.
pub fn extract_fields(text: &str) -> ExtractedFields {
    DEFAULT_EXTRACTOR.extract(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Contact: jane.doe@example.com or (555) 123-4567. 5+ years of experience. Skills: React, Node.js, AWS.";

    #[test]
    fn test_built_in_patterns_compile() {
        for rule in &DEFAULT_EXTRACTOR.rules {
            assert!(rule.patterns.is_ok(), "{} patterns failed", rule.field.key());
        }
    }

    #[test]
    fn test_contact_sample() {
        let fields = extract_fields(SAMPLE);

        assert_eq!(fields.email.as_deref(), Some("jane.doe@example.com"));
        assert_eq!(fields.phone.as_deref(), Some("(555) 123-4567"));
        assert_eq!(fields.experience.as_deref(), Some("5+ years of experience"));
        assert_eq!(
            fields.skills,
            Some(vec!["React".to_string(), "Node.js".to_string(), "AWS".to_string()])
        );
        assert_eq!(fields.education, None);
        assert_eq!(fields.companies, None);
    }

    #[test]
    fn test_extraction_is_idempotent() {
        assert_eq!(extract_fields(SAMPLE), extract_fields(SAMPLE));
    }

    #[test]
    fn test_nothing_recognisable_yields_no_keys() {
        let fields = extract_fields("Hello there, this is a note about the weather.");
        assert!(fields.is_empty());
        assert_eq!(serde_json::to_value(&fields).unwrap(), serde_json::json!({}));
    }

    #[test]
    fn test_first_email_by_position_wins() {
        let fields = extract_fields("a@first.io then b@second.io");
        assert_eq!(fields.email.as_deref(), Some("a@first.io"));
    }

    #[test]
    fn test_distinct_values_keep_first_occurrence_order() {
        let fields = extract_fields("Worked at Stripe, then Google, then Stripe again.");
        assert_eq!(
            fields.companies,
            Some(vec!["Stripe".to_string(), "Google".to_string()])
        );
    }

    #[test]
    fn test_matching_is_case_insensitive_and_keeps_source_text() {
        let fields = extract_fields("python and PYTHON");
        assert_eq!(
            fields.skills,
            Some(vec!["python".to_string(), "PYTHON".to_string()])
        );
    }

    #[test]
    fn test_longer_vocabulary_entry_wins_over_prefix() {
        let fields = extract_fields("JavaScript");
        assert_eq!(fields.skills, Some(vec!["JavaScript".to_string()]));
    }

    #[test]
    fn test_international_phone() {
        let fields = extract_fields("Call +44 7911 123 456 anytime");
        assert!(fields.phone.unwrap().contains("7911"));
    }

    #[test]
    fn test_experience_falls_through_to_later_patterns() {
        let fields = extract_fields("I have more than 10 yrs in the field");
        assert_eq!(fields.experience.as_deref(), Some("more than 10 yrs"));
    }

    #[test]
    fn test_education_keywords() {
        let fields = extract_fields("Bachelor of Computer Science, Stanford University");
        assert_eq!(
            fields.education,
            Some(vec![
                "Bachelor".to_string(),
                "Computer Science".to_string(),
                "University".to_string()
            ])
        );
    }

    #[test]
    fn test_broken_category_does_not_abort_others() {
        let table = [
            FieldRule {
                field: Field::Email,
                capture: Capture::FirstMatch,
                patterns: &["(unclosed"],
            },
            FIELD_RULES[2],
        ];
        let fields = FieldExtractor::new(&table).extract("jane@example.com knows Docker");

        assert_eq!(fields.email, None);
        assert_eq!(fields.skills, Some(vec!["Docker".to_string()]));
    }

    #[test]
    fn test_values_are_substrings_of_input() {
        let text = "Rust? no. Kubernetes at Red Hat, MBA, reach me: x.y@corp.dev, 415-555-0134";
        let fields = extract_fields(text);
        let mut values: Vec<String> = Vec::new();
        values.extend(fields.email.clone());
        values.extend(fields.phone.clone());
        values.extend(fields.skills.clone().unwrap_or_default());
        values.extend(fields.education.clone().unwrap_or_default());
        values.extend(fields.companies.clone().unwrap_or_default());
        assert!(!values.is_empty());
        for v in values {
            assert!(text.contains(&v), "{v} not in input");
        }
    }

    #[test]
    fn test_email_touching_cjk_text() {
        assert_eq!(
            extract_fields("邮箱jane@x.com").email.as_deref(),
            Some("jane@x.com")
        );
        assert_eq!(
            extract_fields("jane@x.com电话").email.as_deref(),
            Some("jane@x.com")
        );
    }

    #[test]
    fn test_email_after_accented_name_starts_at_ascii_word() {
        assert_eq!(
            extract_fields("José.garcia@x.com").email.as_deref(),
            Some("garcia@x.com")
        );
    }

    #[test]
    fn test_non_latin_digits_are_not_a_phone() {
        let fields = extract_fields("tel ٥٥٥١٢٣٤٥٦٧, ٥ years of experience");
        assert_eq!(fields.phone, None);
        assert_eq!(fields.experience, None);
    }
}
