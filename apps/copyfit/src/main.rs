use std::io::Read;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use copyfit::config::Config;
use copyfit::contrast::{plan_legible_text, ContrastPlan, ContrastRequest};
use copyfit::hygiene::{validate_and_clean, CleanPolicy, ValidationResult};
use copyfit::layout::{derive_role_schema, fit_text, FitOptions, RoleSpec, StaticMetrics};
use copyfit::models::{Bundle, RenderProfile, RoleKind, Template};
use copyfit::ranking::{
    fit_bundle_all_roles, pick_top_bundle_by_aggregate, select_top, BundleFit, FieldCandidate,
    FileNoveltyStore, NoveltyKey, ScoredCandidate, SelectOptions,
};

/// One batch: a template and the raw bundles to fit into it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Job {
    template: Template,
    bundles: Vec<Bundle>,
    #[serde(default)]
    profile: RenderProfile,
    #[serde(default)]
    allowed_ctas: Option<Vec<String>>,
    #[serde(default)]
    brand_id: Option<String>,
    #[serde(default)]
    brand_colors: Vec<String>,
    /// Average background luminance behind the text areas, if the caller sampled it.
    #[serde(default)]
    background_luminance: Option<f32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AreaContrast {
    area_id: String,
    plan: ContrastPlan,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JobOutput {
    schema: Vec<RoleSpec>,
    validation: ValidationResult,
    fits: Vec<BundleFit>,
    picked: Option<String>,
    headline_shortlist: Vec<ScoredCandidate>,
    contrast: Vec<AreaContrast>,
}

fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Logs go to stderr; stdout carries the JSON result.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting copyfit v{}", env!("CARGO_PKG_VERSION"));

    let raw = read_input(std::env::args().nth(1))?;
    let job: Job = serde_json::from_str(&raw).context("job is not valid JSON")?;
    let output = run(job, &config)?;

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn read_input(path: Option<String>) -> Result<String> {
    match path {
        Some(p) if p != "-" => {
            std::fs::read_to_string(&p).with_context(|| format!("reading job file {p}"))
        }
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading job from stdin")?;
            Ok(buf)
        }
    }
}

fn run(job: Job, config: &Config) -> Result<JobOutput> {
    let template = Template::new(job.template.id, job.template.canvas_width, job.template.areas)
        .context("template failed validation")?;
    let mut profile = job.profile;
    if profile.locale.is_none() {
        profile.locale = Some(config.locale.clone());
    }
    let opts = FitOptions {
        tracking_floor: config.tracking_floor,
        ..FitOptions::default()
    };
    let measurer = StaticMetrics;

    let schema = derive_role_schema(&template);
    let policy = CleanPolicy {
        allowed_ctas: job.allowed_ctas,
        ..CleanPolicy::default()
    };
    let validation = validate_and_clean(&job.bundles, &schema, &policy);

    let fits: Vec<BundleFit> = validation
        .bundles
        .iter()
        .map(|b| fit_bundle_all_roles(b, &template, &profile, &opts, &measurer))
        .collect();
    let picked = pick_top_bundle_by_aggregate(&fits, &validation.scores);

    let headline_shortlist = shortlist_headlines(
        &validation.bundles,
        &template,
        &profile,
        &opts,
        job.brand_id.as_deref(),
        config,
    );

    let contrast = match (picked, job.background_luminance) {
        (Some(fit), Some(bg)) => fit
            .areas
            .iter()
            .map(|area| {
                let request = ContrastRequest {
                    bg_luminance: bg,
                    brand_colors: job.brand_colors.clone(),
                    override_color: profile.style_for(&area.role).color,
                    allow_scrim: true,
                    role_kind: area.kind,
                    font_px: area.report.font_px.unwrap_or(0),
                };
                plan_legible_text(&request)
                    .with_context(|| format!("contrast for area {}", area.area_id))
                    .map(|plan| AreaContrast {
                        area_id: area.area_id.clone(),
                        plan,
                    })
            })
            .collect::<Result<Vec<_>>>()?,
        _ => Vec::new(),
    };

    Ok(JobOutput {
        schema,
        picked: picked.map(|f| f.bundle_id.clone()),
        validation,
        fits,
        headline_shortlist,
        contrast,
    })
}

/// Top-k headlines across all cleaned bundles, fitted into the first headline area.
fn shortlist_headlines(
    bundles: &[Bundle],
    template: &Template,
    profile: &RenderProfile,
    opts: &FitOptions,
    brand_id: Option<&str>,
    config: &Config,
) -> Vec<ScoredCandidate> {
    let Some(area) = template.areas.iter().find(|a| a.kind == RoleKind::Headline) else {
        return Vec::new();
    };
    let candidates: Vec<FieldCandidate> = bundles
        .iter()
        .filter_map(|b| {
            let text = b.text(&area.role)?;
            let report = fit_text(text, area, profile, template.canvas_width, opts, &StaticMetrics);
            FieldCandidate::from_fit(b.id.clone(), text, b.angle.clone(), &report)
        })
        .collect();

    let store = FileNoveltyStore::new(&config.novelty_dir);
    let select = SelectOptions {
        k: config.select_k,
        novelty_key: brand_id.map(|brand| NoveltyKey::new(brand, template.id.clone())),
        ..SelectOptions::default()
    };
    select_top(&candidates, &select, Some(&store))
}
