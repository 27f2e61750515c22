//! Threshold rules and the rule sets built from them

use crate::models::{Verdict, WeatherReading};

use super::ActivityStrategy;

/// Weather quantity a rule inspects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Temperature,
    Humidity,
    WindSpeed,
    RainProbability,
}

impl Metric {
    #[must_use]
    pub fn value(self, reading: &WeatherReading) -> f32 {
        match self {
            Metric::Temperature => reading.temperature,
            Metric::Humidity => reading.humidity,
            Metric::WindSpeed => reading.wind_speed_kmh,
            Metric::RainProbability => reading.rain_probability,
        }
    }
}

/// Bound a metric must respect. Bounds themselves are acceptable values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Limit {
    Above(f32),
    Below(f32),
    Outside { min: f32, max: f32 },
}

impl Limit {
    #[must_use]
    pub fn is_exceeded(self, value: f32) -> bool {
        match self {
            Limit::Above(max) => value > max,
            Limit::Below(min) => value < min,
            Limit::Outside { min, max } => value < min || value > max,
        }
    }
}

/// A single check: fails when `metric` breaks `limit`
#[derive(Debug, Clone)]
pub struct Rule {
    pub metric: Metric,
    pub limit: Limit,
    pub justification: &'static str,
}

impl Rule {
    #[must_use]
    pub const fn new(metric: Metric, limit: Limit, justification: &'static str) -> Self {
        Self {
            metric,
            limit,
            justification,
        }
    }

    #[must_use]
    pub fn is_violated_by(&self, reading: &WeatherReading) -> bool {
        self.limit.is_exceeded(self.metric.value(reading))
    }
}

/// Ordered rules for one activity. The first violated rule decides the verdict.
#[derive(Debug, Clone)]
pub struct RuleSet {
    id: &'static str,
    name: &'static str,
    rules: Vec<Rule>,
}

impl RuleSet {
    #[must_use]
    pub fn new(id: &'static str, name: &'static str) -> Self {
        Self {
            id,
            name,
            rules: Vec::new(),
        }
    }

    #[must_use]
    pub fn rule(mut self, metric: Metric, limit: Limit, justification: &'static str) -> Self {
        self.rules.push(Rule::new(metric, limit, justification));
        self
    }

    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

impl ActivityStrategy for RuleSet {
    fn id(&self) -> &str {
        self.id
    }

    fn name(&self) -> &str {
        self.name
    }

    fn evaluate(&self, reading: &WeatherReading) -> Verdict {
        self.rules
            .iter()
            .find(|rule| rule.is_violated_by(reading))
            .map_or_else(Verdict::suitable, |rule| {
                Verdict::unsuitable(rule.justification)
            })
    }
}
