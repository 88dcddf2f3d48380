//! Classification of provider condition descriptions.
//!
//! One ordered table maps a keyword in the description to an icon, a
//! background class and a short advice line. Matching is a case-insensitive
//! substring test and the first matching row wins, so "thunderstorm with light
//! rain" classifies as rain.
//!
//! The advice line is looked up with rain first: any description mentioning
//! rain gets the umbrella advice, whatever icon it shows.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Sun,
    Cloud,
    Rain,
    Snow,
    Thunderstorm,
    Fog,
}

impl Icon {
    pub fn name(&self) -> &'static str {
        match self {
            Icon::Sun => "sun",
            Icon::Cloud => "cloud",
            Icon::Rain => "rain",
            Icon::Snow => "snow",
            Icon::Thunderstorm => "thunderstorm",
            Icon::Fog => "fog",
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            Icon::Sun => "☀",
            Icon::Cloud => "☁",
            Icon::Rain => "☂",
            Icon::Snow => "❄",
            Icon::Thunderstorm => "⚡",
            Icon::Fog => "≋",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConditionStyle {
    pub icon: Icon,
    pub background: &'static str,
    pub advice: &'static str,
}

const RAIN_ADVICE: &str = "Don't forget your umbrella today!";

struct Rule {
    keywords: &'static [&'static str],
    style: ConditionStyle,
}

const RULES: &[Rule] = &[
    Rule {
        keywords: &["clear"],
        style: ConditionStyle {
            icon: Icon::Sun,
            background: "bg-clear",
            advice: "Great day to go outside!",
        },
    },
    Rule {
        keywords: &["cloud"],
        style: ConditionStyle {
            icon: Icon::Cloud,
            background: "bg-cloud",
            advice: "Maybe a cozy day indoors!",
        },
    },
    Rule {
        keywords: &["rain"],
        style: ConditionStyle {
            icon: Icon::Rain,
            background: "bg-rain",
            advice: RAIN_ADVICE,
        },
    },
    Rule {
        keywords: &["snow"],
        style: ConditionStyle {
            icon: Icon::Snow,
            background: "bg-snow",
            advice: "Stay warm and enjoy the snow!",
        },
    },
    Rule {
        keywords: &["thunder"],
        style: ConditionStyle {
            icon: Icon::Thunderstorm,
            background: "bg-thunder",
            advice: "Better stay inside, stay safe!",
        },
    },
    Rule {
        keywords: &["fog", "mist"],
        style: ConditionStyle {
            icon: Icon::Fog,
            background: "bg-fog",
            advice: "Drive carefully in the fog!",
        },
    },
];

/// Used when no keyword matches, including for an empty description.
pub const FALLBACK: ConditionStyle = ConditionStyle {
    icon: Icon::Sun,
    background: "bg-default",
    advice: "Have a nice day!",
};

pub fn classify(description: &str) -> ConditionStyle {
    let desc = description.to_lowercase();
    let mut style = RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|k| desc.contains(k)))
        .map(|rule| rule.style)
        .unwrap_or(FALLBACK);
    if desc.contains("rain") {
        style.advice = RAIN_ADVICE;
    }
    style
}
