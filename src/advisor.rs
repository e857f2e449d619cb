//! Model-backed advice: generated routines, coach tips, product picks and
//! barcode compatibility analysis.
//!
//! The rule-based [`crate::routine::RoutineDeriver`] is the offline baseline;
//! everything here goes through the [`GenerativeModel`] and [`ProductLookup`]
//! collaborators and can fail or fall back.

use crate::clients::traits::{ClientError, GenerativeModel, ProductInfo, ProductLookup};
use crate::error::{Result, SkinRoutineError};
use crate::profile::SkinProfile;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

pub const MAX_RECOMMENDATIONS: usize = 4;
pub const MAX_NOTABLE_INGREDIENTS: usize = 3;

const TIP_NO_KEY: &str = "Remember to wear sunscreen today!";
const TIP_SERVICE_ERROR: &str = "Always be gentle with your skin!";
const TIP_OFFLINE: &str = "Drinking plenty of water is great for your skin's hydration!";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedStep {
    pub step: u32,
    pub title: String,
    pub product_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tip: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratedRoutine {
    #[serde(default)]
    pub am: Vec<GeneratedStep>,
    #[serde(default)]
    pub pm: Vec<GeneratedStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecommendation {
    #[serde(default)]
    pub brand: String,
    pub name: String,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub tag: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RecommendationList {
    #[serde(default)]
    products: Vec<ProductRecommendation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "Good Match")]
    GoodMatch,
    #[serde(rename = "Use with Caution")]
    UseWithCaution,
    #[serde(rename = "Not Recommended")]
    NotRecommended,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Verdict::GoodMatch => "Good Match",
            Verdict::UseWithCaution => "Use with Caution",
            Verdict::NotRecommended => "Not Recommended",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotableIngredient {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductAnalysis {
    #[serde(default)]
    pub product_name: String,
    pub verdict: Verdict,
    pub analysis: String,
    #[serde(default)]
    pub notable_ingredients: Vec<NotableIngredient>,
}

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^\s*```[A-Za-z]*\s*\n?(.*?)\n?\s*```\s*$").expect("fence pattern is valid")
});

/// Models sometimes wrap JSON in a Markdown fence even in JSON mode.
fn strip_code_fence(text: &str) -> &str {
    match CODE_FENCE.captures(text).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str(),
        None => text.trim(),
    }
}

fn parse_model_json<T: DeserializeOwned>(what: &str, raw: &str) -> Result<T> {
    serde_json::from_str(strip_code_fence(raw)).map_err(|e| {
        warn!(what, error = %e, raw = %truncate(raw, 200), "model response was not valid JSON");
        SkinRoutineError::Upstream {
            message: format!("{} response was not valid JSON: {}", what, e),
        }
    })
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        format!("{}...", s.chars().take(max).collect::<String>())
    }
}

fn profile_json(profile: &SkinProfile) -> String {
    serde_json::to_string(profile).unwrap_or_else(|_| "{}".to_string())
}

fn routine_prompt(profile: &SkinProfile) -> String {
    format!(
        "You are an expert esthetician. Based on this user's skin profile: {},\n\
         generate a simple AM and PM skincare routine.\n\
         For each step, recommend ONE specific, real product.\n\
         Format your response as a valid JSON object ONLY, with this structure:\n\
         {{ \"am\": [{{\"step\": 1, \"title\": \"Cleanse\", \"productName\": \"Product Name Here\", \"tip\": \"A short tip\"}}], \"pm\": [...] }}",
        profile_json(profile)
    )
}

fn tip_prompt(profile: &SkinProfile) -> String {
    let concern = profile
        .primary_concerns
        .first()
        .map(String::as_str)
        .unwrap_or("none given");
    let goal = profile.primary_goal.as_deref().unwrap_or("none given");
    format!(
        "You are a friendly and encouraging AI Skincare Coach.\n\
         Based on this user's primary skin concern, which is \"{}\",\n\
         and their main goal, which is \"{}\",\n\
         write ONE short, helpful, and positive tip as a plain string.",
        concern, goal
    )
}

fn recommendations_prompt(profile: &SkinProfile) -> String {
    format!(
        "You are a skincare product recommendation expert.\n\
         Based on this user's skin profile: {},\n\
         recommend exactly {} real, popular products.\n\
         Format your response as a valid JSON object ONLY, like this:\n\
         {{ \"products\": [{{\"brand\": \"Brand Name\", \"name\": \"Full Product Name\", \"rating\": 4.5, \"tag\": \"Good for Acne\"}}] }}",
        profile_json(profile),
        MAX_RECOMMENDATIONS
    )
}

fn analysis_prompt(profile: &SkinProfile, product: &ProductInfo) -> String {
    format!(
        "A user with this skin profile is asking about a product: {profile}.\n\
         The product is called \"{name}\".\n\
         The ingredients are: \"{ingredients}\".\n\n\
         Your task is to:\n\
         1. Analyze this ingredient list based on the user's specific skin profile.\n\
         2. Provide a verdict from these three options ONLY: \"Good Match\", \"Use with Caution\", or \"Not Recommended\".\n\
         3. Provide a simple, one-sentence analysis explaining your verdict.\n\
         4. List up to {max} \"Notable Ingredients\" (good or bad) with one simple sentence on why each matters for this user.\n\n\
         Format your response as a valid JSON object ONLY, with this structure:\n\
         {{ \"productName\": \"{name}\", \"verdict\": \"Good Match\", \"analysis\": \"...\", \
         \"notableIngredients\": [{{\"name\": \"Niacinamide\", \"reason\": \"...\"}}] }}",
        profile = profile_json(profile),
        name = product.product_name,
        ingredients = product.ingredients,
        max = MAX_NOTABLE_INGREDIENTS,
    )
}

fn clean_tip(raw: &str) -> String {
    raw.replace('"', "").trim().to_string()
}

/// Front door to the model and product-database collaborators.
#[derive(Clone)]
pub struct Advisor {
    model: Arc<dyn GenerativeModel>,
    products: Arc<dyn ProductLookup>,
}

impl Advisor {
    pub fn new(model: Arc<dyn GenerativeModel>, products: Arc<dyn ProductLookup>) -> Self {
        Self { model, products }
    }

    /// Ask the model for a full routine. Errors surface to the caller, who
    /// can fall back to the rule-derived routine.
    pub async fn generated_routine(&self, profile: &SkinProfile) -> Result<GeneratedRoutine> {
        let raw = self.model.generate(&routine_prompt(profile), true).await?;
        let routine: GeneratedRoutine = parse_model_json("routine", &raw)?;
        info!(
            am = routine.am.len(),
            pm = routine.pm.len(),
            "generated routine received"
        );
        Ok(routine)
    }

    /// One short coaching tip. Always returns something.
    pub async fn coach_tip(&self, profile: &SkinProfile) -> String {
        match self.model.generate(&tip_prompt(profile), false).await {
            Ok(raw) => {
                let tip = clean_tip(&raw);
                if tip.is_empty() {
                    TIP_SERVICE_ERROR.to_string()
                } else {
                    tip
                }
            }
            Err(ClientError::MissingApiKey) => TIP_NO_KEY.to_string(),
            Err(ClientError::Status { status, .. }) => {
                warn!(status, "coach tip request rejected");
                TIP_SERVICE_ERROR.to_string()
            }
            Err(e) => {
                warn!(error = %e, "coach tip request failed");
                TIP_OFFLINE.to_string()
            }
        }
    }

    /// Up to [`MAX_RECOMMENDATIONS`] products; empty on any failure.
    pub async fn product_recommendations(&self, profile: &SkinProfile) -> Vec<ProductRecommendation> {
        let raw = match self.model.generate(&recommendations_prompt(profile), true).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "product recommendations unavailable");
                return Vec::new();
            }
        };
        match parse_model_json::<RecommendationList>("recommendations", &raw) {
            Ok(list) => list
                .products
                .into_iter()
                .filter(|p| !p.name.trim().is_empty())
                .take(MAX_RECOMMENDATIONS)
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Look the barcode up, then have the model judge the ingredient list
    /// against the profile.
    pub async fn analyze_barcode(
        &self,
        barcode: &str,
        profile: &SkinProfile,
    ) -> Result<ProductAnalysis> {
        let product = match self.products.lookup(barcode).await {
            Ok(Some(product)) => product,
            Ok(None) => {
                return Err(SkinRoutineError::NotFound {
                    message: "Product not found in our database or it lacks an ingredient list. \
                              Try scanning another product."
                        .to_string(),
                });
            }
            Err(ClientError::InvalidRequest(message)) => {
                return Err(SkinRoutineError::Validation { message });
            }
            Err(e) => {
                warn!(error = %e, barcode, "product database lookup failed");
                return Err(SkinRoutineError::Upstream {
                    message: "Could not connect to the product database. \
                              Please check your internet connection."
                        .to_string(),
                });
            }
        };
        info!(barcode, product = %product.product_name, "product found, requesting analysis");

        let raw = self
            .model
            .generate(&analysis_prompt(profile, &product), true)
            .await?;
        let mut analysis: ProductAnalysis = parse_model_json("analysis", &raw)?;
        if analysis.product_name.trim().is_empty() {
            analysis.product_name = product.product_name;
        }
        analysis.notable_ingredients.truncate(MAX_NOTABLE_INGREDIENTS);
        Ok(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n[1]\n```  "), "[1]");
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn test_clean_tip() {
        assert_eq!(clean_tip("  \"Wear SPF daily.\"\n"), "Wear SPF daily.");
    }

    #[test]
    fn test_verdict_wire_names() {
        let v: Verdict = serde_json::from_str("\"Use with Caution\"").unwrap();
        assert_eq!(v, Verdict::UseWithCaution);
        assert_eq!(v.to_string(), "Use with Caution");
        assert!(serde_json::from_str::<Verdict>("\"Great\"").is_err());
    }

    #[test]
    fn test_tip_prompt_handles_empty_profile() {
        let prompt = tip_prompt(&SkinProfile::default());
        assert!(prompt.contains("\"none given\""));
    }

    #[test]
    fn test_analysis_prompt_mentions_product() {
        let product = ProductInfo {
            barcode: "12345678".into(),
            product_name: "Gel Cleanser".into(),
            ingredients: "Aqua, Glycerin".into(),
        };
        let prompt = analysis_prompt(&SkinProfile::default(), &product);
        assert!(prompt.contains("\"Gel Cleanser\""));
        assert!(prompt.contains("Aqua, Glycerin"));
        assert!(prompt.contains("up to 3"));
    }
}
