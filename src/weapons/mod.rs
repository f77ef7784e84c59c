//! Weapon profiles, keyword abilities and the expectation pipeline

pub mod keywords;
pub mod pipeline;
pub mod profile;

pub use keywords::{
    anti_threshold_against, blast_bonus_attacks, half_range_applies, has_keyword, KeywordKind,
    WeaponKeyword,
};
pub use pipeline::{
    effective_profile, AttackerContext, EffectiveProfile, PipelineStage, RangeBand,
    TargetContext, STAGE_ORDER,
};
pub use profile::{WeaponClass, WeaponProfile};
