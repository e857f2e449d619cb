//! Routine derivation: skin profile + catalog → AM/PM step lists.
//!
//! Rules run in a fixed order and each fills one positional step:
//! cleanse (1), treat (2), moisturize (3), and protect (4, AM only).
//! Every rule has a default branch, so derivation is total.

use crate::catalog::{Catalog, Product, ProductSlot};
use crate::profile::SkinProfile;
use crate::quiz::{
    CONCERN_BREAKOUTS, CONCERN_DULLNESS, CONCERN_FINE_LINES, CONCERN_OPTIONS, GOAL_OPTIONS,
    SKIN_DRY, SKIN_OILY, SKIN_TYPE_OPTIONS,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Goal fragment that selects the brightening AM serum.
pub const BRIGHTNESS_GOAL_FRAGMENT: &str = "bright, radiant";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepTitle {
    Cleanse,
    Treat,
    Moisturize,
    Protect,
}

impl StepTitle {
    pub fn as_str(self) -> &'static str {
        match self {
            StepTitle::Cleanse => "Cleanse",
            StepTitle::Treat => "Treat",
            StepTitle::Moisturize => "Moisturize",
            StepTitle::Protect => "Protect",
        }
    }
}

impl fmt::Display for StepTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineStep {
    pub step: u32,
    pub title: StepTitle,
    pub product: Product,
}

/// Morning or evening half of a routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Session {
    #[serde(rename = "AM")]
    Am,
    #[serde(rename = "PM")]
    Pm,
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Session::Am => f.write_str("AM"),
            Session::Pm => f.write_str("PM"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Routine {
    pub am: Vec<RoutineStep>,
    pub pm: Vec<RoutineStep>,
}

impl Routine {
    pub fn steps(&self, session: Session) -> &[RoutineStep] {
        match session {
            Session::Am => &self.am,
            Session::Pm => &self.pm,
        }
    }
}

/// The rule whose default branch fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Cleanser,
    AmTreatment,
    PmTreatment,
    Moisturizer,
}

/// A rule resolved through its default branch for a value it did not recognize.
#[derive(Debug, Clone, PartialEq)]
pub struct Fallback<'a> {
    pub rule: Rule,
    pub value: &'a str,
    /// Closest entry in the questionnaire vocabulary, if any is reasonably near.
    pub suggestion: Option<&'static str>,
}

/// Diagnostic hook for answers that fell through to a default branch.
pub trait FallbackObserver: Send + Sync {
    fn on_fallback(&self, fallback: &Fallback<'_>);
}

/// Reports fallbacks through `tracing`.
///
/// Values with a near-miss vocabulary suggestion (casing, stray whitespace)
/// are logged at warn; anything else at debug.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl FallbackObserver for TracingObserver {
    fn on_fallback(&self, fallback: &Fallback<'_>) {
        match fallback.suggestion {
            Some(suggestion) => warn!(
                rule = ?fallback.rule,
                value = fallback.value,
                suggestion,
                "quiz answer did not match any rule; using default branch"
            ),
            None => debug!(
                rule = ?fallback.rule,
                value = fallback.value,
                "quiz answer did not match any rule; using default branch"
            ),
        }
    }
}

const SUGGESTION_MIN_SIMILARITY: f64 = 0.85;

fn nearest(value: &str, vocabulary: &[&'static str]) -> Option<&'static str> {
    let needle = value.trim().to_lowercase();
    vocabulary
        .iter()
        .map(|v| (*v, strsim::jaro_winkler(&needle, &v.to_lowercase())))
        .filter(|(_, score)| *score >= SUGGESTION_MIN_SIMILARITY)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(v, _)| v)
}

/// Applies the routine rules against an injected catalog.
#[derive(Clone)]
pub struct RoutineDeriver {
    catalog: Arc<Catalog>,
    observer: Arc<dyn FallbackObserver>,
}

impl fmt::Debug for RoutineDeriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutineDeriver")
            .field("catalog", &self.catalog)
            .finish_non_exhaustive()
    }
}

impl Default for RoutineDeriver {
    fn default() -> Self {
        Self::new(Catalog::builtin())
    }
}

impl RoutineDeriver {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn FallbackObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Derive the AM/PM routine for `profile`. Never fails; an empty profile
    /// produces the all-defaults routine.
    pub fn derive(&self, profile: &SkinProfile) -> Routine {
        let mut routine = Routine::default();

        let cleanser = self.cleanser(profile);
        routine.am.push(self.step(1, StepTitle::Cleanse, cleanser));
        routine.pm.push(self.step(1, StepTitle::Cleanse, cleanser));

        routine
            .am
            .push(self.step(2, StepTitle::Treat, self.am_treatment(profile)));
        routine
            .pm
            .push(self.step(2, StepTitle::Treat, self.pm_treatment(profile)));

        let moisturizer = self.moisturizer(profile);
        routine.am.push(self.step(3, StepTitle::Moisturize, moisturizer));
        routine.pm.push(self.step(3, StepTitle::Moisturize, moisturizer));

        routine
            .am
            .push(self.step(4, StepTitle::Protect, ProductSlot::Spf50));

        debug!(
            am = routine.am.len(),
            pm = routine.pm.len(),
            cleanser = %cleanser,
            moisturizer = %moisturizer,
            "derived routine"
        );
        routine
    }

    fn step(&self, step: u32, title: StepTitle, slot: ProductSlot) -> RoutineStep {
        RoutineStep {
            step,
            title,
            product: self.catalog.get(slot).clone(),
        }
    }

    fn cleanser(&self, profile: &SkinProfile) -> ProductSlot {
        let skin = profile.skin_type();
        if skin == SKIN_DRY {
            ProductSlot::GentleCleanser
        } else {
            if !SKIN_TYPE_OPTIONS.contains(&skin) {
                self.report(Rule::Cleanser, skin, SKIN_TYPE_OPTIONS);
            }
            ProductSlot::FoamingCleanser
        }
    }

    fn am_treatment(&self, profile: &SkinProfile) -> ProductSlot {
        let goal = profile.goal();
        if goal.contains(BRIGHTNESS_GOAL_FRAGMENT) {
            ProductSlot::VitaminC
        } else {
            if !GOAL_OPTIONS.contains(&goal) {
                self.report(Rule::AmTreatment, goal, GOAL_OPTIONS);
            }
            ProductSlot::HydratingSerum
        }
    }

    fn pm_treatment(&self, profile: &SkinProfile) -> ProductSlot {
        if profile.has_concern(CONCERN_BREAKOUTS) {
            ProductSlot::SalicylicAcid
        } else if profile.has_concern(CONCERN_FINE_LINES) {
            ProductSlot::Retinol
        } else if profile.has_concern(CONCERN_DULLNESS) {
            ProductSlot::GlycolicAcid
        } else {
            for concern in &profile.primary_concerns {
                if !CONCERN_OPTIONS.contains(&concern.as_str()) {
                    self.report(Rule::PmTreatment, concern, CONCERN_OPTIONS);
                }
            }
            ProductSlot::HydratingSerum
        }
    }

    fn moisturizer(&self, profile: &SkinProfile) -> ProductSlot {
        let skin = profile.skin_type();
        if skin == SKIN_OILY {
            ProductSlot::LightMoisturizer
        } else {
            if !SKIN_TYPE_OPTIONS.contains(&skin) {
                self.report(Rule::Moisturizer, skin, SKIN_TYPE_OPTIONS);
            }
            ProductSlot::SimpleMoisturizer
        }
    }

    // Absent answers are the normal "no quiz yet" state and are not reported.
    fn report(&self, rule: Rule, value: &str, vocabulary: &[&'static str]) {
        if value.is_empty() {
            return;
        }
        self.observer.on_fallback(&Fallback {
            rule,
            value,
            suggestion: nearest(value, vocabulary),
        });
    }
}
