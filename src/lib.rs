//! Skincare routine derivation from onboarding quiz answers, plus the
//! wellness-log, storage and model-backed advice pieces around it.

pub mod advisor;
pub mod catalog;
pub mod clients;
pub mod config;
pub mod context;
pub mod error;
pub mod profile;
pub mod quiz;
pub mod routine;
pub mod schedule;
pub mod store;
pub mod wellness;

pub use catalog::{Catalog, Product, ProductSlot};
pub use error::{Result, SkinRoutineError};
pub use profile::{SkinProfile, normalize};
pub use quiz::{QuizAnswer, QuizAnswerMap};
pub use routine::{Routine, RoutineDeriver, RoutineStep, Session, StepTitle};

/// Normalize raw answers and derive the routine in one call.
pub fn routine_for_answers(deriver: &RoutineDeriver, answers: Option<&QuizAnswerMap>) -> Routine {
    deriver.derive(&normalize(answers))
}
