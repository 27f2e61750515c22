//! Activity suitability evaluation
//!
//! Each activity is judged by a strategy; the built-in strategies are ordered
//! threshold rule sets. [`ActivityEvaluator`] dispatches an activity name to
//! its strategy.

pub mod rules;
pub mod strategies;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{Verdict, WeatherReading};
use crate::{Result, WeatherCardError};

pub use rules::{Limit, Metric, Rule, RuleSet};

/// Judges whether weather suits one activity
pub trait ActivityStrategy: Send + Sync {
    /// Lower-case identifier stored on cards
    fn id(&self) -> &str;
    /// Display name
    fn name(&self) -> &str;
    fn evaluate(&self, reading: &WeatherReading) -> Verdict;
}

/// Activity as listed to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub name: String,
}

/// Registry mapping activity names to their strategies
pub struct ActivityEvaluator {
    strategies: Vec<Box<dyn ActivityStrategy>>,
}

impl Default for ActivityEvaluator {
    fn default() -> Self {
        let mut evaluator = Self::empty();
        evaluator.register(strategies::running());
        evaluator.register(strategies::beach());
        evaluator.register(strategies::picnic());
        evaluator
    }
}

impl ActivityEvaluator {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// Register a strategy. A strategy with the same id replaces the old one.
    pub fn register(&mut self, strategy: impl ActivityStrategy + 'static) {
        self.strategies.retain(|s| s.id() != strategy.id());
        self.strategies.push(Box::new(strategy));
    }

    /// Find the strategy by id or display name, ignoring case and surrounding whitespace
    pub fn resolve(&self, activity: &str) -> Result<&dyn ActivityStrategy> {
        let wanted = activity.trim();
        self.strategies
            .iter()
            .find(|s| s.id().eq_ignore_ascii_case(wanted) || s.name().eq_ignore_ascii_case(wanted))
            .map(|s| &**s)
            .ok_or_else(|| WeatherCardError::unsupported_activity(wanted))
    }

    /// Judge `reading` for `activity`
    pub fn evaluate(&self, activity: &str, reading: &WeatherReading) -> Result<Verdict> {
        let strategy = self.resolve(activity)?;
        let verdict = strategy.evaluate(reading);
        debug!(
            activity = strategy.id(),
            suitable = verdict.suitable,
            "Evaluated weather for activity"
        );
        Ok(verdict)
    }

    /// Registered activities in registration order
    #[must_use]
    pub fn activities(&self) -> Vec<Activity> {
        self.strategies
            .iter()
            .map(|s| Activity {
                id: s.id().to_string(),
                name: s.name().to_string(),
            })
            .collect()
    }
}
