use serde::Serialize;

/// Description bucket for a WMO weather code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Clear,
    PartlyCloudy,
    Fog,
    Drizzle,
    Rain,
    Showers,
    Thunderstorm,
    Cloudy,
}

impl Condition {
    /// Map a weather code to its bucket. Codes outside the table, including
    /// anything above the WMO range, are "cloudy".
    pub fn classify(code: i32) -> Self {
        match code {
            0 => Self::Clear,
            1..=3 => Self::PartlyCloudy,
            45 | 48 => Self::Fog,
            51..=55 => Self::Drizzle,
            61..=65 => Self::Rain,
            80..=82 => Self::Showers,
            95..=99 => Self::Thunderstorm,
            _ => Self::Cloudy,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::PartlyCloudy => "Partly cloudy",
            Self::Fog => "Fog",
            Self::Drizzle => "Drizzle",
            Self::Rain => "Rain",
            Self::Showers => "Showers",
            Self::Thunderstorm => "Thunderstorm",
            Self::Cloudy => "Cloudy",
        }
    }

    /// Icon category; rain and showers share one.
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Clear => "sun",
            Self::PartlyCloudy => "cloud-sun",
            Self::Fog => "cloud-fog",
            Self::Drizzle => "cloud-drizzle",
            Self::Rain | Self::Showers => "cloud-rain",
            Self::Thunderstorm => "cloud-lightning",
            Self::Cloudy => "cloud",
        }
    }
}
