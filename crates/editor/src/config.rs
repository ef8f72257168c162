use std::{env, fmt, time::Duration};

use model::parking::DEFAULT_PARKING_PRICE;

use crate::gesture::PointerKind;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Lift-off of a finger is imprecise, so touch devices keep the vertex
/// handles around this long after the pointer left.
pub const DEFAULT_TOUCH_HIDE_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    pub base_url: String,
    pub api_token: Option<String>,
    pub parking_price: f64,
    pub mouse_hide_delay: Duration,
    pub touch_hide_delay: Duration,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_token: None,
            parking_price: DEFAULT_PARKING_PRICE,
            mouse_hide_delay: Duration::ZERO,
            touch_hide_delay: DEFAULT_TOUCH_HIDE_DELAY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub variable: &'static str,
    pub value: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} has an invalid value `{}`", self.variable, self.value)
    }
}

impl std::error::Error for ConfigError {}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    variable: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(variable) {
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError { variable, value }),
        None => Ok(None),
    }
}

impl EditorConfig {
    /// Defaults overridden by `EDITOR_*` variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|variable| env::var(variable).ok())
    }

    fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let parking_price = parse_var::<f64>(&lookup, "EDITOR_PARKING_PRICE")?
            .unwrap_or(defaults.parking_price);
        if !(parking_price.is_finite() && parking_price > 0.0) {
            return Err(ConfigError {
                variable: "EDITOR_PARKING_PRICE",
                value: parking_price.to_string(),
            });
        }

        Ok(Self {
            base_url: lookup("EDITOR_BASE_URL").unwrap_or(defaults.base_url),
            api_token: lookup("EDITOR_API_TOKEN").filter(|t| !t.is_empty()),
            parking_price,
            touch_hide_delay: parse_var::<u64>(&lookup, "EDITOR_TOUCH_HIDE_DELAY_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.touch_hide_delay),
            mouse_hide_delay: defaults.mouse_hide_delay,
        })
    }

    pub fn hide_delay(&self, pointer: PointerKind) -> Duration {
        match pointer {
            PointerKind::Mouse => self.mouse_hide_delay,
            PointerKind::Touch => self.touch_hide_delay,
        }
    }
}
