//! Specialist registry — immutable, built once at startup, shared as `Arc`.
//!
//! `SpecialistKey` is a closed enum: parsing a key IS the registry membership
//! check, so an invalid key from the routing model can never reach a lookup.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::agents::prompts;

/// The six interview domains the system answers for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialistKey {
    ProductManager,
    Technical,
    Architect,
    Coding,
    Behavioral,
    SystemDesign,
}

impl SpecialistKey {
    pub const ALL: [SpecialistKey; 6] = [
        SpecialistKey::ProductManager,
        SpecialistKey::Technical,
        SpecialistKey::Architect,
        SpecialistKey::Coding,
        SpecialistKey::Behavioral,
        SpecialistKey::SystemDesign,
    ];

    /// The fallback specialist used whenever routing cannot produce a valid
    /// selection.
    pub const FALLBACK: SpecialistKey = SpecialistKey::Technical;

    pub fn as_str(&self) -> &'static str {
        match self {
            SpecialistKey::ProductManager => "product_manager",
            SpecialistKey::Technical => "technical",
            SpecialistKey::Architect => "architect",
            SpecialistKey::Coding => "coding",
            SpecialistKey::Behavioral => "behavioral",
            SpecialistKey::SystemDesign => "system_design",
        }
    }
}

impl fmt::Display for SpecialistKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpecialistKey {
    type Err = UnknownSpecialist;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "product_manager" => Ok(SpecialistKey::ProductManager),
            "technical" => Ok(SpecialistKey::Technical),
            "architect" => Ok(SpecialistKey::Architect),
            "coding" => Ok(SpecialistKey::Coding),
            "behavioral" => Ok(SpecialistKey::Behavioral),
            "system_design" => Ok(SpecialistKey::SystemDesign),
            other => Err(UnknownSpecialist(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSpecialist(pub String);

impl fmt::Display for UnknownSpecialist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown specialist '{}'", self.0)
    }
}

/// Persona configuration for one specialist. Immutable after bootstrap.
#[derive(Debug, Clone)]
pub struct SpecialistProfile {
    pub key: SpecialistKey,
    pub display_name: &'static str,
    /// System instructions defining the persona's expertise and answer style.
    pub persona: &'static str,
    pub specializations: &'static [&'static str],
    pub best_for: &'static [&'static str],
}

/// Process-wide catalog of specialist profiles, one per `SpecialistKey`.
#[derive(Debug)]
pub struct SpecialistRegistry {
    profiles: Vec<SpecialistProfile>,
}

impl SpecialistRegistry {
    /// Builds the full registry. Called once at startup.
    pub fn bootstrap() -> Self {
        let profiles = vec![
            SpecialistProfile {
                key: SpecialistKey::ProductManager,
                display_name: "Product Manager",
                persona: prompts::PRODUCT_MANAGER_PERSONA,
                specializations: &[
                    "Product Strategy",
                    "Prioritization Frameworks (RICE, ICE, Kano)",
                    "Metrics (AARRR, HEART)",
                    "User Research",
                    "Roadmap Planning",
                    "Stakeholder Management",
                ],
                best_for: &[
                    "Product strategy questions",
                    "Feature prioritization",
                    "Metric definition",
                    "User research approaches",
                    "PM framework application",
                ],
            },
            SpecialistProfile {
                key: SpecialistKey::Technical,
                display_name: "Technical Expert",
                persona: prompts::TECHNICAL_PERSONA,
                specializations: &[
                    "Algorithms and Data Structures",
                    "Complexity Analysis (Big O)",
                    "Design Patterns",
                    "Software Engineering Principles",
                    "Code Optimization",
                    "Debugging Techniques",
                ],
                best_for: &[
                    "Algorithm explanations",
                    "Data structure questions",
                    "Complexity analysis",
                    "Design pattern discussions",
                    "Technical concept clarification",
                ],
            },
            SpecialistProfile {
                key: SpecialistKey::Architect,
                display_name: "System Architect",
                persona: prompts::ARCHITECT_PERSONA,
                specializations: &[
                    "System Architecture Design",
                    "Microservices Architecture",
                    "Scalability and Performance",
                    "High Availability",
                    "Database Design",
                    "Cloud Architecture (AWS, GCP, Azure)",
                ],
                best_for: &[
                    "Architecture design questions",
                    "Scalability discussions",
                    "Infrastructure planning",
                    "Cloud architecture",
                    "High-level system design",
                ],
            },
            SpecialistProfile {
                key: SpecialistKey::Coding,
                display_name: "Coding Expert",
                persona: prompts::CODING_PERSONA,
                specializations: &[
                    "Clean Code Principles",
                    "Multiple Programming Languages",
                    "Test-Driven Development",
                    "Code Review",
                    "Performance Optimization",
                    "Error Handling",
                ],
                best_for: &[
                    "Code implementation",
                    "Algorithm coding",
                    "Code review and refactoring",
                    "Best practices guidance",
                    "Performance optimization",
                ],
            },
            SpecialistProfile {
                key: SpecialistKey::Behavioral,
                display_name: "Behavioral Coach",
                persona: prompts::BEHAVIORAL_PERSONA,
                specializations: &[
                    "STAR Method",
                    "Leadership and Management",
                    "Conflict Resolution",
                    "Communication Skills",
                    "Team Building",
                    "Problem-Solving",
                ],
                best_for: &[
                    "Behavioral interview questions",
                    "Leadership scenarios",
                    "Conflict resolution stories",
                    "Team management questions",
                    "Communication challenges",
                ],
            },
            SpecialistProfile {
                key: SpecialistKey::SystemDesign,
                display_name: "System Design",
                persona: prompts::SYSTEM_DESIGN_PERSONA,
                specializations: &[
                    "Distributed Systems Design",
                    "Scalability Patterns",
                    "CAP Theorem Trade-offs",
                    "Database Selection",
                    "Caching Strategies",
                    "Microservices Architecture",
                ],
                best_for: &[
                    "Design Twitter/Instagram/Uber",
                    "URL shortener design",
                    "Distributed system questions",
                    "Scalability challenges",
                    "Trade-off discussions",
                ],
            },
        ];

        debug_assert_eq!(profiles.len(), SpecialistKey::ALL.len());
        Self { profiles }
    }

    /// Total lookup: every key has a profile by construction.
    pub fn get(&self, key: SpecialistKey) -> &SpecialistProfile {
        self.profiles
            .iter()
            .find(|p| p.key == key)
            .unwrap_or(&self.profiles[0])
    }

    pub fn profiles(&self) -> &[SpecialistProfile] {
        &self.profiles
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_covers_every_key() {
        let registry = SpecialistRegistry::bootstrap();
        assert_eq!(registry.len(), SpecialistKey::ALL.len());
        for key in SpecialistKey::ALL {
            assert_eq!(registry.get(key).key, key);
        }
    }

    #[test]
    fn test_key_roundtrips_through_str() {
        for key in SpecialistKey::ALL {
            assert_eq!(key.as_str().parse::<SpecialistKey>().unwrap(), key);
        }
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!("quantum_oracle".parse::<SpecialistKey>().is_err());
        assert!("".parse::<SpecialistKey>().is_err());
    }

    #[test]
    fn test_key_serde_uses_snake_case() {
        let json = serde_json::to_string(&SpecialistKey::SystemDesign).unwrap();
        assert_eq!(json, "\"system_design\"");
        let back: SpecialistKey = serde_json::from_str("\"product_manager\"").unwrap();
        assert_eq!(back, SpecialistKey::ProductManager);
    }

    #[test]
    fn test_profiles_carry_capabilities() {
        let registry = SpecialistRegistry::bootstrap();
        for profile in registry.profiles() {
            assert!(!profile.persona.is_empty());
            assert!(!profile.specializations.is_empty());
            assert!(!profile.best_for.is_empty());
        }
    }
}
