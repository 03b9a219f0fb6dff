//! Test data builders for runner profiles

use crate::plan::{Condition, Gender, RunnerProfile};

/// Builder for runner profiles, starting from a VDOT 40 runner in very good shape
pub struct RunnerProfileBuilder {
    profile: RunnerProfile,
}

impl Default for RunnerProfileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RunnerProfileBuilder {
    pub fn new() -> Self {
        Self {
            profile: RunnerProfile {
                age: 34,
                gender: Gender::Female,
                weight_kg: 58.0,
                height_cm: 166.0,
                vdot: 40,
                condition: Condition::VeryGood,
            },
        }
    }

    pub fn with_vdot(mut self, vdot: u8) -> Self {
        self.profile.vdot = vdot;
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.profile.condition = condition;
        self
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.profile.age = age;
        self
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.profile.gender = gender;
        self
    }

    pub fn build(self) -> RunnerProfile {
        self.profile
    }
}
