//! Framework catalog — ordered, immutable set of product-management problem
//! categories. Drives case-study classification and framework recommendation.
//! Built once at startup and shared as `Arc`.

use serde::Serialize;

/// One PM problem category with its recommended framework.
#[derive(Debug, Clone, Serialize)]
pub struct FrameworkCategory {
    pub name: &'static str,
    pub primary: &'static str,
    pub alternatives: &'static [&'static str],
    pub description: &'static str,
}

/// Ordered catalog. The first category is the classification default.
#[derive(Debug)]
pub struct FrameworkCatalog {
    categories: Vec<FrameworkCategory>,
}

impl FrameworkCatalog {
    pub fn bootstrap() -> Self {
        let categories = vec![
            FrameworkCategory {
                name: "Product Improvement",
                primary: "CIRCLES Method",
                alternatives: &["SWOT Analysis", "Jobs-to-be-Done"],
                description: "Comprehend, Identify, Report, Cut, List, Evaluate, Summarize",
            },
            FrameworkCategory {
                name: "Product Design",
                primary: "Design Thinking",
                alternatives: &["CIRCLES Method", "Working Backwards"],
                description: "Empathize, Define, Ideate, Prototype, Test",
            },
            FrameworkCategory {
                name: "Metrics & Analytics",
                primary: "AARRR Pirate Metrics",
                alternatives: &["HEART Framework", "North Star Metric"],
                description: "Acquisition, Activation, Retention, Revenue, Referral",
            },
            FrameworkCategory {
                name: "Prioritization",
                primary: "RICE Scoring",
                alternatives: &["ICE Scoring", "Kano Model", "MoSCoW"],
                description: "Reach, Impact, Confidence, Effort",
            },
            FrameworkCategory {
                name: "Root Cause Analysis",
                primary: "Five Whys",
                alternatives: &["Fishbone Diagram", "Issue Trees"],
                description: "Iterative why-questioning to isolate the underlying cause",
            },
            FrameworkCategory {
                name: "Product Strategy",
                primary: "Porter's Five Forces",
                alternatives: &["Blue Ocean Strategy", "Ansoff Matrix"],
                description: "Competitive-position analysis across five market forces",
            },
            FrameworkCategory {
                name: "Go-to-Market",
                primary: "4Ps Marketing Mix",
                alternatives: &["Crossing the Chasm", "STP"],
                description: "Product, Price, Place, Promotion",
            },
        ];

        Self { categories }
    }

    /// Resolves a model-reported category name: exact match first, then
    /// case-insensitive containment, else the default first category.
    pub fn resolve(&self, name: &str) -> &FrameworkCategory {
        if let Some(exact) = self.categories.iter().find(|c| c.name == name) {
            return exact;
        }
        let lower = name.to_lowercase();
        self.categories
            .iter()
            .find(|c| lower.contains(&c.name.to_lowercase()))
            .unwrap_or_else(|| self.default_category())
    }

    pub fn default_category(&self) -> &FrameworkCategory {
        &self.categories[0]
    }

    pub fn categories(&self) -> &[FrameworkCategory] {
        &self.categories
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.categories.iter().map(|c| c.name).collect()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }
}
