use skin_routine::catalog::{Catalog, ProductSlot};
use skin_routine::quiz::{
    CONCERN_OPTIONS, GOAL_CLEAR, GOAL_GLOW, GOAL_OPTIONS, QuizAnswer, QuizAnswerMap, SKIN_DRY,
    SKIN_NORMAL, SKIN_OILY, SKIN_TYPE_OPTIONS,
};
use skin_routine::{
    Routine, RoutineDeriver, SkinProfile, StepTitle, normalize, routine_for_answers,
};
use std::collections::HashSet;

fn profile(skin: &str, concerns: &[&str], goal: &str) -> SkinProfile {
    SkinProfile {
        skin_type_answer: Some(skin.to_string()),
        primary_concerns: concerns.iter().map(|c| c.to_string()).collect(),
        primary_goal: Some(goal.to_string()),
    }
}

fn product_id(slot: ProductSlot) -> String {
    Catalog::builtin().get(slot).id.clone()
}

fn ids(routine: &Routine) -> (Vec<String>, Vec<String>) {
    (
        routine.am.iter().map(|s| s.product.id.clone()).collect(),
        routine.pm.iter().map(|s| s.product.id.clone()).collect(),
    )
}

fn assert_well_formed(routine: &Routine) {
    assert!((3..=4).contains(&routine.am.len()));
    assert!((3..=4).contains(&routine.pm.len()));
    assert_eq!(routine.am.last().map(|s| s.title), Some(StepTitle::Protect));
    assert!(routine.pm.iter().all(|s| s.title != StepTitle::Protect));
    for list in [&routine.am, &routine.pm] {
        for (i, step) in list.iter().enumerate() {
            assert_eq!(step.step as usize, i + 1);
        }
        let titles: HashSet<StepTitle> = list.iter().map(|s| s.title).collect();
        assert_eq!(titles.len(), list.len(), "titles must be unique");
    }
}

#[test]
fn scenario_a_dry_skin_defaults() {
    let routine = RoutineDeriver::default().derive(&profile(SKIN_DRY, &[], ""));
    let (am, pm) = ids(&routine);
    assert_eq!(
        am,
        vec![
            product_id(ProductSlot::GentleCleanser),
            product_id(ProductSlot::HydratingSerum),
            product_id(ProductSlot::SimpleMoisturizer),
            product_id(ProductSlot::Spf50),
        ]
    );
    assert_eq!(
        pm,
        vec![
            product_id(ProductSlot::GentleCleanser),
            product_id(ProductSlot::HydratingSerum),
            product_id(ProductSlot::SimpleMoisturizer),
        ]
    );
    assert_eq!(routine.am[3].step, 4);
}

#[test]
fn scenario_b_oily_breakouts() {
    let routine = RoutineDeriver::default().derive(&profile(
        SKIN_OILY,
        &["Pimples & Breakouts"],
        GOAL_CLEAR,
    ));
    let (am, pm) = ids(&routine);
    assert_eq!(am[0], product_id(ProductSlot::FoamingCleanser));
    assert_eq!(am[1], product_id(ProductSlot::HydratingSerum));
    assert_eq!(pm[1], product_id(ProductSlot::SalicylicAcid));
    assert_eq!(am[2], product_id(ProductSlot::LightMoisturizer));
    assert_eq!(pm[2], product_id(ProductSlot::LightMoisturizer));
}

#[test]
fn scenario_c_glow_and_fine_lines() {
    let routine =
        RoutineDeriver::default().derive(&profile(SKIN_NORMAL, &["Fine Lines"], GOAL_GLOW));
    let (am, pm) = ids(&routine);
    assert_eq!(am[0], product_id(ProductSlot::FoamingCleanser));
    assert_eq!(am[1], product_id(ProductSlot::VitaminC));
    assert_eq!(pm[1], product_id(ProductSlot::Retinol));
    assert_eq!(am[2], product_id(ProductSlot::SimpleMoisturizer));
}

#[test]
fn scenario_d_no_profile() {
    let deriver = RoutineDeriver::default();
    let routine = routine_for_answers(&deriver, None);
    let (am, pm) = ids(&routine);
    assert_eq!(am[0], product_id(ProductSlot::FoamingCleanser));
    assert_eq!(am[1], product_id(ProductSlot::HydratingSerum));
    assert_eq!(pm[1], product_id(ProductSlot::HydratingSerum));
    assert_eq!(am[2], product_id(ProductSlot::SimpleMoisturizer));
    assert_eq!(am[3], product_id(ProductSlot::Spf50));
    assert_eq!(routine, deriver.derive(&SkinProfile::default()));
}

#[test]
fn every_vocabulary_combination_is_well_formed() {
    let deriver = RoutineDeriver::default();
    let skins = SKIN_TYPE_OPTIONS.iter().copied().chain(["", "unknown"]);
    for skin in skins {
        for goal in GOAL_OPTIONS.iter().copied().chain([""]) {
            for concern in CONCERN_OPTIONS.iter().copied().chain(["Dullness"]) {
                let p = profile(skin, &[concern], goal);
                let routine = deriver.derive(&p);
                assert_well_formed(&routine);
                assert_eq!(routine, deriver.derive(&p), "derivation must be repeatable");
            }
        }
    }
    assert_well_formed(&deriver.derive(&SkinProfile::default()));
}

#[test]
fn case_and_whitespace_variants_fall_back() {
    let deriver = RoutineDeriver::default();
    let sloppy = profile(
        " a bit tight, dry, or even flaky.",
        &["pimples & breakouts"],
        "Get that BRIGHT, RADIANT 'glow'.",
    );
    let (am, pm) = ids(&deriver.derive(&sloppy));
    assert_eq!(am[0], product_id(ProductSlot::FoamingCleanser));
    assert_eq!(am[1], product_id(ProductSlot::HydratingSerum));
    assert_eq!(pm[1], product_id(ProductSlot::HydratingSerum));
}

#[test]
fn raw_answers_flow_through_normalizer() {
    let json = r#"{
        "step1_q0": "Shiny or greasy all over.",
        "step1_q1": "Often reacts.",
        "step2_q0": ["Redness", "Fine Lines"],
        "step3_q0": "Get that bright, radiant 'glow'.",
        "step4_q0": "Humid & Warm",
        "step4_q1": "A Lot"
    }"#;
    let answers: QuizAnswerMap = serde_json::from_str(json).unwrap();
    assert!(matches!(answers["step2_q0"], QuizAnswer::Multi(_)));

    let profile = normalize(Some(&answers));
    let routine = RoutineDeriver::default().derive(&profile);
    let (am, pm) = ids(&routine);
    assert_eq!(am[1], product_id(ProductSlot::VitaminC));
    assert_eq!(pm[1], product_id(ProductSlot::Retinol));
    assert_eq!(pm[2], product_id(ProductSlot::LightMoisturizer));
}

#[test]
fn deriver_is_shareable_across_threads() {
    let deriver = std::sync::Arc::new(RoutineDeriver::default());
    let handles: Vec<_> = SKIN_TYPE_OPTIONS
        .iter()
        .map(|skin| {
            let deriver = deriver.clone();
            let p = profile(skin, &[], "");
            std::thread::spawn(move || deriver.derive(&p))
        })
        .collect();
    for handle in handles {
        assert_well_formed(&handle.join().unwrap());
    }
}
