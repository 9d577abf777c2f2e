//! Intake wizard — the multi-step data-collection flow.
//!
//! One ordered list of steps, one pointer into it, clamped at both ends.
//! Each step can hold a JSON draft of its form so a half-filled page
//! survives navigating away; drafts live in the session, never the
//! database, and vanish on reset or logout.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WizardError {
    #[error("Unknown intake step: {0}")]
    UnknownStep(String),
}

/// The intake steps, in collection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntakeStep {
    Demographics,
    Pregnancy,
    Nutrition,
    Vaccination,
    Complications,
    Breastfeeding,
    PrenatalCare,
    EducationPrevention,
    Intrapartum,
    ChildBirth,
    Postpartum,
    BabyData,
}

pub const INTAKE_STEPS: &[IntakeStep] = &[
    IntakeStep::Demographics,
    IntakeStep::Pregnancy,
    IntakeStep::Nutrition,
    IntakeStep::Vaccination,
    IntakeStep::Complications,
    IntakeStep::Breastfeeding,
    IntakeStep::PrenatalCare,
    IntakeStep::EducationPrevention,
    IntakeStep::Intrapartum,
    IntakeStep::ChildBirth,
    IntakeStep::Postpartum,
    IntakeStep::BabyData,
];

impl IntakeStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntakeStep::Demographics => "demographics",
            IntakeStep::Pregnancy => "pregnancy",
            IntakeStep::Nutrition => "nutrition",
            IntakeStep::Vaccination => "vaccination",
            IntakeStep::Complications => "complications",
            IntakeStep::Breastfeeding => "breastfeeding",
            IntakeStep::PrenatalCare => "prenatal_care",
            IntakeStep::EducationPrevention => "education_prevention",
            IntakeStep::Intrapartum => "intrapartum",
            IntakeStep::ChildBirth => "child_birth",
            IntakeStep::Postpartum => "postpartum",
            IntakeStep::BabyData => "baby_data",
        }
    }

    /// Heading shown at the top of the step's page.
    pub fn title(&self) -> &'static str {
        match self {
            IntakeStep::Demographics => "Demographics",
            IntakeStep::Pregnancy => "Pregnancy Follow-up",
            IntakeStep::Nutrition => "Nutrition",
            IntakeStep::Vaccination => "Vaccination",
            IntakeStep::Complications => "Complications",
            IntakeStep::Breastfeeding => "Breastfeeding",
            IntakeStep::PrenatalCare => "Prenatal Care",
            IntakeStep::EducationPrevention => "Education & Prevention",
            IntakeStep::Intrapartum => "Intrapartum Care",
            IntakeStep::ChildBirth => "Child Birth",
            IntakeStep::Postpartum => "Postpartum",
            IntakeStep::BabyData => "Baby Data",
        }
    }
}

impl std::str::FromStr for IntakeStep {
    type Err = WizardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        INTAKE_STEPS
            .iter()
            .copied()
            .find(|step| step.as_str() == s)
            .ok_or_else(|| WizardError::UnknownStep(s.to_string()))
    }
}

/// Per-session wizard state: the step pointer plus per-step form drafts.
#[derive(Debug, Default)]
pub struct IntakeWizard {
    index: usize,
    drafts: HashMap<IntakeStep, Value>,
}

impl IntakeWizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> IntakeStep {
        INTAKE_STEPS[self.index]
    }

    /// 1-based position and total, for the "Step 3/12" banner.
    pub fn position(&self) -> (usize, usize) {
        (self.index + 1, INTAKE_STEPS.len())
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index == INTAKE_STEPS.len() - 1
    }

    /// Advance one step. Returns whether the pointer moved — at the last
    /// step this is a no-op, not an error.
    pub fn next(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.index += 1;
        true
    }

    /// Go back one step, clamped at the first.
    pub fn prev(&mut self) -> bool {
        if self.is_first() {
            return false;
        }
        self.index -= 1;
        true
    }

    /// Jump directly to a named step (the section-menu navigation).
    pub fn goto(&mut self, step: IntakeStep) {
        self.index = INTAKE_STEPS
            .iter()
            .position(|s| *s == step)
            .unwrap_or(self.index);
    }

    /// Store the draft for the current step, replacing any previous one.
    pub fn save_draft(&mut self, value: Value) {
        self.drafts.insert(self.current(), value);
    }

    pub fn draft(&self, step: IntakeStep) -> Option<&Value> {
        self.drafts.get(&step)
    }

    pub fn draft_count(&self) -> usize {
        self.drafts.len()
    }

    /// Clear every draft and rewind to the first step.
    pub fn reset(&mut self) {
        self.index = 0;
        self.drafts.clear();
    }
}
