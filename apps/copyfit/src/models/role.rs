use serde::{Deserialize, Serialize};

/// Framing of a meme-style line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemeVariant {
    /// States the pain only — any embedded solution clause is cut.
    Negative,
    Positive,
    Oneliner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewPart {
    Quote,
    Attribution,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightPart {
    Fact,
    Takeaway,
}

/// Semantic kind of a template role, attached to every `Area` once at template-load time.
///
/// Scoring and hygiene code match on this instead of sniffing role/id strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleKind {
    Headline,
    Subhead,
    #[default]
    Body,
    Bullets,
    Cta,
    Legal,
    Badge,
    Meme(MemeVariant),
    Review(ReviewPart),
    Insight(InsightPart),
    Tagline,
    LogoText,
}

impl RoleKind {
    /// Classifies a role from its template naming. The role name is consulted first and
    /// the area id only when the role name carries no recognizable convention.
    pub fn classify(role: &str, area_id: &str) -> RoleKind {
        match_kind(role)
            .or_else(|| match_kind(area_id))
            .unwrap_or(RoleKind::Body)
    }

    /// Word-count bounds enforced by kind-specific post-processing, if any.
    pub fn word_bounds(&self) -> Option<(usize, usize)> {
        match self {
            RoleKind::Meme(MemeVariant::Oneliner) => Some((5, 12)),
            RoleKind::Meme(_) => Some((4, 14)),
            RoleKind::Review(ReviewPart::Quote) => Some((6, 30)),
            RoleKind::Review(ReviewPart::Attribution) => Some((1, 6)),
            RoleKind::Insight(InsightPart::Fact) => Some((4, 16)),
            RoleKind::Insight(InsightPart::Takeaway) => Some((4, 14)),
            _ => None,
        }
    }

    /// Kinds whose copy is collapsed to a single line and stripped of emoji/hashtags.
    pub fn is_one_liner_kind(&self) -> bool {
        matches!(
            self,
            RoleKind::Meme(_) | RoleKind::Review(_) | RoleKind::Insight(_)
        )
    }

    /// Kinds that count toward the "body" share of the bundle aggregate.
    pub fn is_body_like(&self) -> bool {
        !matches!(self, RoleKind::Headline | RoleKind::Cta)
    }
}

fn match_kind(name: &str) -> Option<RoleKind> {
    let n = name.to_ascii_lowercase();
    let has = |needle: &str| n.contains(needle);

    let kind = if has("meme") {
        if has("neg") || has("pain") {
            RoleKind::Meme(MemeVariant::Negative)
        } else if has("pos") || has("gain") {
            RoleKind::Meme(MemeVariant::Positive)
        } else {
            RoleKind::Meme(MemeVariant::Oneliner)
        }
    } else if has("review") || has("testimonial") || has("quote") {
        if has("attribution") || has("author") || has("name") {
            RoleKind::Review(ReviewPart::Attribution)
        } else {
            RoleKind::Review(ReviewPart::Quote)
        }
    } else if has("insight") || has("stat") || has("fact") {
        if has("takeaway") {
            RoleKind::Insight(InsightPart::Takeaway)
        } else {
            RoleKind::Insight(InsightPart::Fact)
        }
    } else if has("subhead") || has("subtitle") {
        RoleKind::Subhead
    } else if has("headline") || has("title") || n == "h1" {
        RoleKind::Headline
    } else if has("cta") || has("button") {
        RoleKind::Cta
    } else if has("bullet") || has("feature") || has("list") {
        RoleKind::Bullets
    } else if has("legal") || has("disclaimer") || has("fineprint") {
        RoleKind::Legal
    } else if has("badge") || has("sticker") {
        RoleKind::Badge
    } else if has("tagline") || has("slogan") {
        RoleKind::Tagline
    } else if has("logo") || has("brand") {
        RoleKind::LogoText
    } else if has("body") || has("copy") || has("description") {
        RoleKind::Body
    } else {
        return None;
    };
    Some(kind)
}
