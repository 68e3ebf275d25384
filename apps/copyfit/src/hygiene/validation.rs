use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::hygiene::coherence::{answer_shape, coherence_score, AnswerShape};
use crate::hygiene::headline::clean_headline;
use crate::hygiene::kinds::{post_process_kind, KindOutcome};
use crate::hygiene::text::{dedupe_keep_order, has_numerals, normalize_key, strip_numerals};
use crate::layout::schema::RoleSpec;
use crate::models::{Bundle, RoleKind, RoleValue};

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// Policy inputs supplied by the caller per batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanPolicy {
    /// Allowed CTA labels (case-insensitive). `None` disables the check.
    #[serde(default)]
    pub allowed_ctas: Option<Vec<String>>,
    /// Reject bundles whose CTA is not allowed. When `false` the violation is a warning
    /// and the bundle is kept, to be penalized at pick time.
    #[serde(default = "default_true")]
    pub reject_disallowed_cta: bool,
}

fn default_true() -> bool {
    true
}

impl Default for CleanPolicy {
    fn default() -> Self {
        CleanPolicy {
            allowed_ctas: None,
            reject_disallowed_cta: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    UnknownRole,
    TooManyValues,
    UnderSupplied,
    EmptyRole,
    NumeralsStripped,
    AwkwardEnding,
    HeadlineRejected,
    KindAdjusted,
    KindRejected,
    CtaNotAllowed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// The bundle is rejected.
    Error,
    /// Recorded; the cleaned bundle stays usable.
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub bundle_id: String,
    pub role: Option<String>,
    pub kind: IssueKind,
    pub severity: Severity,
    pub message: String,
}

/// Per-bundle signals consumed by the aggregate pick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BundleSignals {
    pub coherence: f32,
    pub answer_shape: AnswerShape,
    pub cta_allowed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// At least one bundle survived cleaning.
    pub ok: bool,
    pub bundles: Vec<Bundle>,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    pub scores: BTreeMap<String, BundleSignals>,
}

// ────────────────────────────────────────────────────────────────────────────
// Entry point
// ────────────────────────────────────────────────────────────────────────────

/// Cleans raw bundles against the role schema. Each bundle is judged independently:
/// a rejected bundle never affects its siblings.
pub fn validate_and_clean(
    raw: &[Bundle],
    schema: &[RoleSpec],
    policy: &CleanPolicy,
) -> ValidationResult {
    let mut result = ValidationResult {
        ok: false,
        bundles: Vec::new(),
        errors: Vec::new(),
        warnings: Vec::new(),
        scores: BTreeMap::new(),
    };

    for bundle in raw {
        let mut issues = Issues::new(&bundle.id);
        let cleaned = clean_bundle(bundle, schema, policy, &mut issues);
        let rejected = issues.has_errors();

        if !rejected {
            let signals = signals_for(&cleaned, schema, issues.cta_allowed);
            result.scores.insert(cleaned.id.clone(), signals);
            result.bundles.push(cleaned);
        } else {
            debug!(bundle = %bundle.id, errors = issues.errors.len(), "Bundle rejected");
        }
        result.errors.extend(issues.errors);
        result.warnings.extend(issues.warnings);
    }

    result.ok = !result.bundles.is_empty();
    info!(
        total = raw.len(),
        kept = result.bundles.len(),
        errors = result.errors.len(),
        warnings = result.warnings.len(),
        "Validated bundle batch"
    );
    result
}

// ────────────────────────────────────────────────────────────────────────────
// Per-bundle cleaning
// ────────────────────────────────────────────────────────────────────────────

struct Issues<'a> {
    bundle_id: &'a str,
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
    cta_allowed: bool,
}

impl<'a> Issues<'a> {
    fn new(bundle_id: &'a str) -> Self {
        Issues {
            bundle_id,
            errors: Vec::new(),
            warnings: Vec::new(),
            cta_allowed: true,
        }
    }

    fn push(&mut self, role: &str, kind: IssueKind, severity: Severity, message: String) {
        let issue = ValidationIssue {
            bundle_id: self.bundle_id.to_string(),
            role: Some(role.to_string()),
            kind,
            severity,
            message,
        };
        match severity {
            Severity::Error => self.errors.push(issue),
            Severity::Warning => self.warnings.push(issue),
        }
    }

    fn error(&mut self, role: &str, kind: IssueKind, message: String) {
        self.push(role, kind, Severity::Error, message);
    }

    fn warn(&mut self, role: &str, kind: IssueKind, message: String) {
        self.push(role, kind, Severity::Warning, message);
    }

    fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

fn clean_bundle(
    bundle: &Bundle,
    schema: &[RoleSpec],
    policy: &CleanPolicy,
    issues: &mut Issues<'_>,
) -> Bundle {
    let mut roles = BTreeMap::new();

    for (role, value) in &bundle.roles {
        let Some(spec) = schema.iter().find(|s| &s.role == role) else {
            issues.error(role, IssueKind::UnknownRole, format!("role '{role}' is not in the template"));
            continue;
        };
        if let Some(cleaned) = clean_role(spec, value, policy, issues) {
            roles.insert(role.clone(), cleaned);
        }
    }

    for spec in schema {
        if !bundle.roles.contains_key(&spec.role) {
            issues.warn(&spec.role, IssueKind::UnderSupplied, "role missing".to_string());
        }
    }

    Bundle {
        id: bundle.id.clone(),
        angle: bundle.angle.clone(),
        roles,
    }
}

fn clean_role(
    spec: &RoleSpec,
    value: &RoleValue,
    policy: &CleanPolicy,
    issues: &mut Issues<'_>,
) -> Option<RoleValue> {
    let role = spec.role.as_str();
    let mut values: Vec<String> = Vec::new();

    for raw in value.values() {
        let mut text = raw.trim().to_string();
        if has_numerals(&text) {
            text = strip_numerals(&text);
            issues.warn(role, IssueKind::NumeralsStripped, format!("numerals removed from '{raw}'"));
        }

        match post_process_kind(spec.kind, &text) {
            KindOutcome::Clean(t) => text = t,
            KindOutcome::Adjusted { text: t, note } => {
                issues.warn(role, IssueKind::KindAdjusted, note);
                text = t;
            }
            KindOutcome::Rejected(reason) => {
                issues.error(role, IssueKind::KindRejected, reason);
                continue;
            }
        }

        if spec.kind == RoleKind::Headline && !text.is_empty() {
            match clean_headline(&text) {
                Some(h) => {
                    if h != text {
                        issues.warn(role, IssueKind::AwkwardEnding, format!("'{text}' → '{h}'"));
                    }
                    text = h;
                }
                None => {
                    issues.error(
                        role,
                        IssueKind::HeadlineRejected,
                        format!("'{text}' has fewer than three words after cleanup"),
                    );
                    continue;
                }
            }
        }
        values.push(text);
    }

    let mut values = dedupe_keep_order(&values);
    if values.is_empty() {
        issues.warn(role, IssueKind::EmptyRole, "no usable text".to_string());
        return None;
    }

    if spec.kind == RoleKind::Cta {
        check_cta(role, &values, policy, issues);
    }

    if !spec.is_multi() {
        if values.len() > 1 {
            issues.error(
                role,
                IssueKind::TooManyValues,
                format!("{} distinct values for a single-area role", values.len()),
            );
            return None;
        }
        return values.pop().map(RoleValue::One);
    }

    if values.len() > spec.count {
        issues.warn(
            role,
            IssueKind::TooManyValues,
            format!("{} values capped to {} areas", values.len(), spec.count),
        );
        values.truncate(spec.count);
    } else if values.len() < spec.count {
        issues.warn(
            role,
            IssueKind::UnderSupplied,
            format!("{} unique values for {} areas", values.len(), spec.count),
        );
    }
    Some(RoleValue::Many(values))
}

fn check_cta(role: &str, values: &[String], policy: &CleanPolicy, issues: &mut Issues<'_>) {
    let Some(allowed) = &policy.allowed_ctas else {
        return;
    };
    let allowed: Vec<String> = allowed.iter().map(|a| normalize_key(a)).collect();
    for v in values {
        if allowed.contains(&normalize_key(v)) {
            continue;
        }
        issues.cta_allowed = false;
        let message = format!("CTA '{v}' is not in the allowed set");
        if policy.reject_disallowed_cta {
            issues.error(role, IssueKind::CtaNotAllowed, message);
        } else {
            issues.warn(role, IssueKind::CtaNotAllowed, message);
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Signals
// ────────────────────────────────────────────────────────────────────────────

/// Headline text and the most body-like companion text of a bundle, by schema order.
pub(crate) fn headline_and_body<'b>(
    bundle: &'b Bundle,
    schema: &[RoleSpec],
) -> (Option<&'b str>, Option<&'b str>) {
    let by_kind = |pred: &dyn Fn(RoleKind) -> bool| {
        schema
            .iter()
            .filter(|s| pred(s.kind))
            .find_map(|s| bundle.text(&s.role))
    };
    let headline = by_kind(&|k| k == RoleKind::Headline);
    let body = by_kind(&|k| k == RoleKind::Body)
        .or_else(|| by_kind(&|k| k == RoleKind::Subhead))
        .or_else(|| by_kind(&|k| k.is_body_like()));
    (headline, body)
}

fn signals_for(bundle: &Bundle, schema: &[RoleSpec], cta_allowed: bool) -> BundleSignals {
    let (headline, body) = headline_and_body(bundle, schema);
    let (coherence, shape) = match (headline, body) {
        (Some(h), Some(b)) => (coherence_score(h, b), answer_shape(h, b)),
        _ => (0.0, AnswerShape::NotAQuestion),
    };
    BundleSignals {
        coherence,
        answer_shape: shape,
        cta_allowed,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::schema::derive_role_schema;
    use crate::models::area::fixtures::area;
    use crate::models::{MaxLines, Template};

    fn schema() -> Vec<RoleSpec> {
        let t = Template::new(
            "t",
            1080.0,
            vec![
                area("h1", "headline", 900.0, 300.0, MaxLines::Fixed(3), 32),
                area("p1", "body", 900.0, 200.0, MaxLines::Fixed(4), 18),
                area("b1", "bullets", 400.0, 60.0, MaxLines::Fixed(1), 14),
                area("b2", "bullets", 400.0, 60.0, MaxLines::Fixed(1), 14),
                area("btn", "cta", 400.0, 90.0, MaxLines::Fixed(1), 20),
            ],
        )
        .unwrap();
        derive_role_schema(&t)
    }

    fn bundle(id: &str, roles: &[(&str, RoleValue)]) -> Bundle {
        Bundle {
            id: id.to_string(),
            angle: "benefit".to_string(),
            roles: roles
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        }
    }

    fn one(s: &str) -> RoleValue {
        RoleValue::One(s.to_string())
    }

    fn many(xs: &[&str]) -> RoleValue {
        RoleValue::Many(xs.iter().map(|s| s.to_string()).collect())
    }

    fn good(id: &str) -> Bundle {
        bundle(
            id,
            &[
                ("headline", one("Fresh bread delivered daily")),
                ("body", one("Baked every morning and at your door by eight")),
                ("bullets", many(&["Free shipping", "Easy returns"])),
                ("cta", one("Order now")),
            ],
        )
    }

    fn has(issues: &[ValidationIssue], kind: IssueKind) -> bool {
        issues.iter().any(|i| i.kind == kind)
    }

    // ── structure ───────────────────────────────────────────────────────────

    #[test]
    fn test_clean_bundle_passes_through() {
        let r = validate_and_clean(&[good("b1")], &schema(), &CleanPolicy::default());
        assert!(r.ok);
        assert_eq!(r.bundles.len(), 1);
        assert!(r.errors.is_empty(), "unexpected errors: {:?}", r.errors);
        assert!(r.scores.contains_key("b1"));
    }

    #[test]
    fn test_unknown_role_rejects_only_that_bundle() {
        let mut bad = good("bad");
        bad.roles.insert("sticker_text".to_string(), one("Hot"));
        let r = validate_and_clean(&[bad, good("fine")], &schema(), &CleanPolicy::default());
        assert!(r.ok);
        assert_eq!(r.bundles.len(), 1);
        assert_eq!(r.bundles[0].id, "fine");
        assert!(has(&r.errors, IssueKind::UnknownRole));
    }

    #[test]
    fn test_multi_area_values_deduped_and_capped() {
        let mut b = good("b1");
        b.roles.insert(
            "bullets".to_string(),
            many(&["Free shipping", "free shipping!", "Easy returns", "Gift wrap"]),
        );
        let r = validate_and_clean(&[b], &schema(), &CleanPolicy::default());
        assert_eq!(
            r.bundles[0].role("bullets"),
            Some(&many(&["Free shipping", "Easy returns"]))
        );
        assert!(has(&r.warnings, IssueKind::TooManyValues));
    }

    #[test]
    fn test_under_supplied_is_warning() {
        let mut b = good("b1");
        b.roles.insert("bullets".to_string(), many(&["Free shipping", "FREE SHIPPING"]));
        let r = validate_and_clean(&[b], &schema(), &CleanPolicy::default());
        assert!(r.ok);
        assert!(has(&r.warnings, IssueKind::UnderSupplied));
    }

    #[test]
    fn test_single_area_role_with_two_values_is_error() {
        let mut b = good("b1");
        b.roles.insert("cta".to_string(), many(&["Order now", "Shop now"]));
        let r = validate_and_clean(&[b], &schema(), &CleanPolicy::default());
        assert!(!r.ok);
        assert!(has(&r.errors, IssueKind::TooManyValues));
    }

    // ── content policy ──────────────────────────────────────────────────────

    #[test]
    fn test_numerals_stripped_everywhere() {
        let mut b = good("b1");
        b.roles.insert("body".to_string(), one("Save 20% on 3 loaves today"));
        let r = validate_and_clean(&[b], &schema(), &CleanPolicy::default());
        assert_eq!(r.bundles[0].text("body"), Some("Save on loaves today"));
        assert!(has(&r.warnings, IssueKind::NumeralsStripped));
    }

    #[test]
    fn test_headline_cleanup_and_rejection() {
        let mut awkward = good("awkward");
        awkward
            .roles
            .insert("headline".to_string(), one("Fresh bread delivered to the"));
        let mut short = good("short");
        short.roles.insert("headline".to_string(), one("Bread for the"));
        let r = validate_and_clean(&[awkward, short], &schema(), &CleanPolicy::default());
        assert_eq!(r.bundles.len(), 1);
        assert_eq!(r.bundles[0].text("headline"), Some("Fresh bread delivered"));
        assert!(has(&r.warnings, IssueKind::AwkwardEnding));
        assert!(has(&r.errors, IssueKind::HeadlineRejected));
    }

    #[test]
    fn test_cta_whitelist() {
        let policy = CleanPolicy {
            allowed_ctas: Some(vec!["ORDER NOW".to_string(), "Learn more".to_string()]),
            ..CleanPolicy::default()
        };
        let mut off_list = good("off");
        off_list.roles.insert("cta".to_string(), one("Click here"));
        let r = validate_and_clean(&[good("on"), off_list.clone()], &schema(), &policy);
        assert_eq!(r.bundles.len(), 1, "case-insensitive match keeps 'Order now'");
        assert!(has(&r.errors, IssueKind::CtaNotAllowed));

        let lenient = CleanPolicy {
            reject_disallowed_cta: false,
            ..policy
        };
        let r = validate_and_clean(&[off_list], &schema(), &lenient);
        assert!(r.ok);
        assert!(!r.scores["off"].cta_allowed);
    }

    // ── signals ─────────────────────────────────────────────────────────────

    #[test]
    fn test_signals_reflect_answer_shape() {
        let b = bundle(
            "q",
            &[
                ("headline", one("How do you bake better bread?")),
                ("body", one("Use our slow starter and bake better bread")),
                ("cta", one("Order now")),
            ],
        );
        let r = validate_and_clean(&[b], &schema(), &CleanPolicy::default());
        let s = r.scores["q"];
        assert_eq!(s.answer_shape, AnswerShape::Answered);
        assert!(s.coherence > 0.5);
    }

    #[test]
    fn test_all_rejected_is_not_ok() {
        let b = bundle("x", &[("unknown", one("Hello there friend"))]);
        let r = validate_and_clean(&[b], &schema(), &CleanPolicy::default());
        assert!(!r.ok);
        assert!(r.bundles.is_empty());
    }
}
