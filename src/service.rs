//! Card workflows
//!
//! [`CardService`] ties a weather provider, the activity evaluator and a card
//! repository together. HTTP handlers and the CLI only talk to this type.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument};

use crate::activity::{Activity, ActivityEvaluator, ActivityStrategy};
use crate::models::{Card, DailyForecast, HistoryEntry, Verdict, WeatherReading};
use crate::store::CardRepository;
use crate::weather::WeatherProvider;
use crate::{Result, WeatherCardError};

const CARD_NOT_FOUND: &str = "Card not found.";
const ACTIVITY_NOT_FOUND: &str = "Activity not found.";

/// A stored card as shown to clients
#[derive(Debug, Clone, Serialize)]
pub struct CardSummary {
    #[serde(flatten)]
    pub card: Card,
    pub activity_name: String,
}

/// Result of a one-off suitability check
#[derive(Debug, Clone, Serialize)]
pub struct Assessment {
    pub city: String,
    pub activity: Activity,
    pub weather: WeatherReading,
    pub verdict: Verdict,
}

pub struct CardService {
    weather: Arc<dyn WeatherProvider>,
    cards: Arc<dyn CardRepository>,
    evaluator: ActivityEvaluator,
}

impl CardService {
    pub fn new(
        weather: Arc<dyn WeatherProvider>,
        cards: Arc<dyn CardRepository>,
        evaluator: ActivityEvaluator,
    ) -> Self {
        Self {
            weather,
            cards,
            evaluator,
        }
    }

    #[must_use]
    pub fn list_activities(&self) -> Vec<Activity> {
        self.evaluator.activities()
    }

    /// Activities referenced by cards must exist; an unknown one is a missing record here
    fn card_activity(&self, activity: &str) -> Result<&dyn ActivityStrategy> {
        self.evaluator.resolve(activity).map_err(|e| match e {
            WeatherCardError::UnsupportedActivity { .. } => {
                WeatherCardError::not_found(ACTIVITY_NOT_FOUND)
            }
            other => other,
        })
    }

    async fn find_card(&self, id: &str) -> Result<Card> {
        self.cards
            .get(id)
            .await?
            .ok_or_else(|| WeatherCardError::not_found(CARD_NOT_FOUND))
    }

    #[instrument(skip(self))]
    pub async fn create_card(&self, city: &str, activity_id: &str) -> Result<Card> {
        let city = city.trim();
        let activity_id = activity_id.trim();
        if city.is_empty() || activity_id.is_empty() {
            return Err(WeatherCardError::validation(
                "City and activity are required.",
            ));
        }

        let strategy = self.card_activity(activity_id)?;
        let current = self.weather.current(city).await?;
        let verdict = strategy.evaluate(&current.reading);

        let card = Card::new(
            current.city,
            strategy.id().to_string(),
            &current.reading,
            &verdict,
        );
        self.cards.insert(&card).await?;
        info!(card_id = %card.id, city = %card.city, "Created card");
        Ok(card)
    }

    pub async fn list_cards(&self) -> Result<Vec<CardSummary>> {
        let cards = self.cards.list().await?;
        Ok(cards
            .into_iter()
            .map(|card| {
                let activity_name = self
                    .evaluator
                    .resolve(&card.activity_id)
                    .map_or_else(|_| card.activity_id.clone(), |s| s.name().to_string());
                CardSummary {
                    card,
                    activity_name,
                }
            })
            .collect())
    }

    /// Re-fetch weather for the card's city, bypassing any cache, and re-evaluate its activity
    #[instrument(skip(self))]
    pub async fn refresh_card(&self, id: &str) -> Result<Card> {
        let mut card = self.find_card(id).await?;
        let strategy = self.card_activity(&card.activity_id)?;
        let current = self.weather.current_fresh(&card.city).await?;
        let verdict = strategy.evaluate(&current.reading);

        card.apply(current.city, &current.reading, &verdict);
        if !self.cards.update(&card).await? {
            return Err(WeatherCardError::not_found(CARD_NOT_FOUND));
        }
        info!(card_id = %card.id, condition = %card.condition, "Refreshed card");
        Ok(card)
    }

    #[instrument(skip(self))]
    pub async fn delete_card(&self, id: &str) -> Result<()> {
        if !self.cards.delete(id).await? {
            return Err(WeatherCardError::not_found(CARD_NOT_FOUND));
        }
        info!(card_id = %id, "Deleted card");
        Ok(())
    }

    /// Verdict for the card's activity on each upcoming day
    #[instrument(skip(self))]
    pub async fn card_forecast(&self, id: &str) -> Result<Vec<DailyForecast>> {
        let card = self.find_card(id).await?;
        let strategy = self.card_activity(&card.activity_id)?;
        let readings = self.weather.daily_forecast(&card.city).await?;

        Ok(readings
            .into_iter()
            .map(|weather| DailyForecast {
                date: weather.timestamp.clone(),
                verdict: strategy.evaluate(&weather),
                weather,
            })
            .collect())
    }

    pub async fn history(&self) -> Result<Vec<HistoryEntry>> {
        self.cards.history().await
    }

    /// Evaluate current weather for an activity without storing anything
    #[instrument(skip(self))]
    pub async fn check(&self, city: &str, activity: &str) -> Result<Assessment> {
        let city = city.trim();
        if city.is_empty() {
            return Err(WeatherCardError::validation("City is required."));
        }
        let strategy = self.evaluator.resolve(activity)?;
        let current = self.weather.current(city).await?;
        let verdict = strategy.evaluate(&current.reading);

        Ok(Assessment {
            city: current.city,
            activity: Activity {
                id: strategy.id().to_string(),
                name: strategy.name().to_string(),
            },
            weather: current.reading,
            verdict,
        })
    }
}
