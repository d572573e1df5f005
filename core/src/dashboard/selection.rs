use crate::prelude::{DashboardError, DashboardResult};
use crate::processing::{AnnualComposite, CompositeSet};
use serde::{Deserialize, Serialize};

/// Year as it arrives from a selector: dropdown string or integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum YearInput {
    Number(i32),
    Text(String),
}

impl YearInput {
    pub fn normalize(&self) -> DashboardResult<i32> {
        match self {
            YearInput::Number(year) => Ok(*year),
            YearInput::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| DashboardError::InvalidYear(text.clone())),
        }
    }
}

impl From<i32> for YearInput {
    fn from(year: i32) -> Self {
        YearInput::Number(year)
    }
}

impl From<&str> for YearInput {
    fn from(text: &str) -> Self {
        YearInput::Text(text.to_string())
    }
}

impl From<String> for YearInput {
    fn from(text: String) -> Self {
        YearInput::Text(text)
    }
}

/// Selected year and its composite, always updated together.
#[derive(Debug, Clone)]
pub struct SelectionState {
    year: i32,
    composite: AnnualComposite,
}

impl SelectionState {
    pub fn initial(composites: &CompositeSet, year: i32) -> DashboardResult<Self> {
        let composite = composites
            .get(year)
            .cloned()
            .ok_or(DashboardError::NoCompositeForYear(year))?;
        Ok(Self { year, composite })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn composite(&self) -> &AnnualComposite {
        &self.composite
    }

    /// Leaves the selection untouched when `input` is invalid or unknown.
    pub fn select(&mut self, composites: &CompositeSet, input: &YearInput) -> DashboardResult<i32> {
        let year = input.normalize()?;
        let composite = composites
            .get(year)
            .ok_or(DashboardError::NoCompositeForYear(year))?;
        self.year = year;
        self.composite = composite.clone();
        Ok(year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imagery::testing::{sample_boundary, sample_provider, sample_series};
    use crate::processing::AnnualCompositeBuilder;
    use std::sync::Arc;

    fn composites() -> CompositeSet {
        AnnualCompositeBuilder::new(2015..=2025, Arc::new(sample_boundary()))
            .build(&sample_provider(), &sample_series())
            .unwrap()
    }

    #[test]
    fn year_input_accepts_string_and_integer() {
        assert_eq!(YearInput::from("2017").normalize(), Ok(2017));
        assert_eq!(YearInput::from(" 2018 ").normalize(), Ok(2018));
        assert_eq!(YearInput::from(2019).normalize(), Ok(2019));
        assert_eq!(
            YearInput::from("twenty").normalize(),
            Err(DashboardError::InvalidYear("twenty".into()))
        );
    }

    #[test]
    fn select_updates_year_and_composite_together() {
        let set = composites();
        let mut state = SelectionState::initial(&set, 2015).unwrap();
        assert_eq!(state.select(&set, &"2020".into()), Ok(2020));
        assert_eq!(state.year(), 2020);
        assert_eq!(state.composite().year, 2020);
    }

    #[test]
    fn unknown_year_fails_and_keeps_selection() {
        let set = composites();
        let mut state = SelectionState::initial(&set, 2015).unwrap();
        assert_eq!(
            state.select(&set, &2031.into()),
            Err(DashboardError::NoCompositeForYear(2031))
        );
        assert_eq!(state.year(), 2015);
        assert_eq!(state.composite().year, 2015);
    }

    #[test]
    fn year_input_deserializes_untagged() {
        let text: YearInput = serde_json::from_str("\"2016\"").unwrap();
        let number: YearInput = serde_json::from_str("2016").unwrap();
        assert_eq!(text.normalize(), number.normalize());
    }
}
