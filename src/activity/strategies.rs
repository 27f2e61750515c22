//! Built-in activity rule sets

use super::rules::{Limit, Metric, RuleSet};

#[must_use]
pub fn running() -> RuleSet {
    RuleSet::new("running", "Running")
        .rule(
            Metric::RainProbability,
            Limit::Above(50.0),
            "High chance of heavy rain.",
        )
        .rule(
            Metric::Temperature,
            Limit::Below(5.0),
            "Too cold for running (below 5°C).",
        )
        .rule(
            Metric::Temperature,
            Limit::Above(30.0),
            "Too hot for running (above 30°C).",
        )
}

#[must_use]
pub fn beach() -> RuleSet {
    RuleSet::new("beach", "Beach")
        .rule(
            Metric::RainProbability,
            Limit::Above(25.0),
            "Moderate to high chance of rain.",
        )
        .rule(
            Metric::Temperature,
            Limit::Below(22.0),
            "Too cold for the beach (below 22°C).",
        )
        .rule(
            Metric::WindSpeed,
            Limit::Above(30.0),
            "Wind too strong (above 30 km/h).",
        )
}

#[must_use]
pub fn picnic() -> RuleSet {
    RuleSet::new("picnic", "Picnic")
        .rule(
            Metric::RainProbability,
            Limit::Above(15.0),
            "Any chance of rain could spoil it.",
        )
        .rule(Metric::Humidity, Limit::Above(85.0), "Humidity too high.")
        .rule(
            Metric::WindSpeed,
            Limit::Above(20.0),
            "Wind could blow the napkins away (above 20 km/h).",
        )
        .rule(
            Metric::Temperature,
            Limit::Outside {
                min: 18.0,
                max: 28.0,
            },
            "Uncomfortable temperature (ideal between 18°C and 28°C).",
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::ActivityStrategy;
    use crate::models::{Verdict, WeatherReading};
    use rstest::rstest;

    fn reading(temperature: f32, humidity: f32, wind: f32, rain: f32) -> WeatherReading {
        WeatherReading::new(temperature, humidity, wind, rain)
    }

    #[rstest]
    #[case(reading(20.0, 60.0, 10.0, 50.0), None)]
    #[case(reading(20.0, 60.0, 10.0, 50.1), Some("High chance of heavy rain."))]
    #[case(reading(5.0, 60.0, 10.0, 0.0), None)]
    #[case(reading(4.9, 60.0, 10.0, 0.0), Some("Too cold for running (below 5°C)."))]
    #[case(reading(30.0, 60.0, 10.0, 0.0), None)]
    #[case(reading(30.1, 60.0, 10.0, 0.0), Some("Too hot for running (above 30°C)."))]
    #[case(reading(35.0, 99.0, 80.0, 0.0), Some("Too hot for running (above 30°C)."))]
    #[case(reading(35.0, 60.0, 10.0, 80.0), Some("High chance of heavy rain."))]
    fn test_running_thresholds(#[case] weather: WeatherReading, #[case] expected: Option<&str>) {
        assert_verdict(&running().evaluate(&weather), expected);
    }

    #[rstest]
    #[case(reading(25.0, 60.0, 10.0, 25.0), None)]
    #[case(reading(25.0, 60.0, 10.0, 25.1), Some("Moderate to high chance of rain."))]
    #[case(reading(22.0, 60.0, 10.0, 0.0), None)]
    #[case(reading(21.9, 60.0, 10.0, 0.0), Some("Too cold for the beach (below 22°C)."))]
    #[case(reading(25.0, 60.0, 30.0, 0.0), None)]
    #[case(reading(25.0, 60.0, 30.1, 0.0), Some("Wind too strong (above 30 km/h)."))]
    #[case(reading(25.0, 100.0, 10.0, 0.0), None)]
    #[case(reading(10.0, 60.0, 50.0, 0.0), Some("Too cold for the beach (below 22°C)."))]
    fn test_beach_thresholds(#[case] weather: WeatherReading, #[case] expected: Option<&str>) {
        assert_verdict(&beach().evaluate(&weather), expected);
    }

    #[rstest]
    #[case(reading(22.0, 60.0, 10.0, 15.0), None)]
    #[case(reading(22.0, 60.0, 10.0, 15.1), Some("Any chance of rain could spoil it."))]
    #[case(reading(22.0, 85.0, 10.0, 0.0), None)]
    #[case(reading(22.0, 85.1, 10.0, 0.0), Some("Humidity too high."))]
    #[case(reading(22.0, 60.0, 20.0, 0.0), None)]
    #[case(reading(22.0, 60.0, 20.1, 0.0), Some("Wind could blow the napkins away (above 20 km/h)."))]
    #[case(reading(18.0, 60.0, 10.0, 0.0), None)]
    #[case(reading(28.0, 60.0, 10.0, 0.0), None)]
    #[case(reading(17.9, 60.0, 10.0, 0.0), Some("Uncomfortable temperature (ideal between 18°C and 28°C)."))]
    #[case(reading(28.1, 60.0, 10.0, 0.0), Some("Uncomfortable temperature (ideal between 18°C and 28°C)."))]
    #[case(reading(40.0, 95.0, 30.0, 0.0), Some("Humidity too high."))]
    fn test_picnic_thresholds(#[case] weather: WeatherReading, #[case] expected: Option<&str>) {
        assert_verdict(&picnic().evaluate(&weather), expected);
    }

    fn assert_verdict(verdict: &Verdict, expected: Option<&str>) {
        match expected {
            None => assert_eq!(verdict, &Verdict::suitable()),
            Some(message) => assert_eq!(verdict, &Verdict::unsuitable(message)),
        }
    }

    #[test]
    fn test_rule_counts() {
        assert_eq!(running().rules().len(), 3);
        assert_eq!(beach().rules().len(), 3);
        assert_eq!(picnic().rules().len(), 4);
    }
}
