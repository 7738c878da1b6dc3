//! Likelihood and impact reference scales

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};
use crate::value_objects::{ImpactId, LikelihoodId};

/// Ordinal likelihood level (1-5)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Likelihood {
    pub id: LikelihoodId,
    pub level: String,
    pub score: u8,
    pub description: String,
}

impl Likelihood {
    /// Valid likelihood scores
    pub const SCALE: RangeInclusive<u8> = 1..=5;

    pub fn new(
        id: LikelihoodId,
        level: impl Into<String>,
        score: u8,
        description: impl Into<String>,
    ) -> DomainResult<Self> {
        check_scale("likelihood", score, &Self::SCALE)?;
        Ok(Self {
            id,
            level: level.into(),
            score,
            description: description.into(),
        })
    }

    /// The standard five-step likelihood scale, ids equal to scores
    pub fn standard_scale() -> Vec<Likelihood> {
        [
            (1, "Rare", "May occur only in exceptional circumstances"),
            (2, "Unlikely", "Could occur at some time"),
            (3, "Possible", "Might occur at some time"),
            (4, "Likely", "Will probably occur in most circumstances"),
            (5, "Almost Certain", "Is expected to occur in most circumstances"),
        ]
        .into_iter()
        .map(|(score, level, description)| Likelihood {
            id: LikelihoodId::new(i64::from(score)),
            level: level.to_string(),
            score,
            description: description.to_string(),
        })
        .collect()
    }
}

/// Ordinal impact level (1-10)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Impact {
    pub id: ImpactId,
    pub level: String,
    pub score: u8,
    pub description: String,
}

impl Impact {
    /// Valid impact scores
    pub const SCALE: RangeInclusive<u8> = 1..=10;

    pub fn new(
        id: ImpactId,
        level: impl Into<String>,
        score: u8,
        description: impl Into<String>,
    ) -> DomainResult<Self> {
        check_scale("impact", score, &Self::SCALE)?;
        Ok(Self {
            id,
            level: level.into(),
            score,
            description: description.into(),
        })
    }

    /// The standard ten-step impact scale, ids equal to scores
    pub fn standard_scale() -> Vec<Impact> {
        [
            (1, "Negligible", "No measurable effect on objectives"),
            (2, "Very Minor", "Effect absorbed by routine operations"),
            (3, "Minor", "Small, short-lived disruption"),
            (4, "Moderate-Low", "Noticeable disruption handled locally"),
            (5, "Moderate", "Disruption requiring management attention"),
            (6, "Moderate-High", "Disruption affecting several departments"),
            (7, "Major", "Significant financial or reputational damage"),
            (8, "Severe", "Objectives of a business unit are compromised"),
            (9, "Critical", "Organization-wide objectives are compromised"),
            (10, "Catastrophic", "Threatens the continuity of the organization"),
        ]
        .into_iter()
        .map(|(score, level, description)| Impact {
            id: ImpactId::new(i64::from(score)),
            level: level.to_string(),
            score,
            description: description.to_string(),
        })
        .collect()
    }
}

fn check_scale(field: &str, score: u8, scale: &RangeInclusive<u8>) -> DomainResult<()> {
    if !scale.contains(&score) {
        return Err(DomainError::validation(
            field,
            format!(
                "score {} outside {}..={}",
                score,
                scale.start(),
                scale.end()
            ),
        ));
    }
    Ok(())
}
