//! Text rendering of the dashboard state.
//!
//! Everything here is a pure function of the [`ViewState`]; nothing is
//! fetched or stored.

use std::fmt::Write;

use chrono::Utc;
use skyview_core::{
    ForecastEntry, Phase, UnitSystem, ViewState,
    condition::classify,
    format::{compass, hour_label, local_clock, local_time_12h, round_temp, weekday_short},
    map::TileLayer,
};

const CHART_WIDTH: usize = 30;

pub fn render(state: &ViewState, overlays: &[TileLayer]) -> String {
    let mut out = String::new();
    let _ = write_dashboard(&mut out, state, overlays);
    out
}

fn write_dashboard(out: &mut String, state: &ViewState, overlays: &[TileLayer]) -> std::fmt::Result {
    let unit = state.unit;
    let background = state
        .current
        .as_ref()
        .map(|c| classify(&c.description).background)
        .unwrap_or("bg-default");
    writeln!(out, "skyview [{}] ({background})", unit.temperature_symbol())?;

    if let Some(advisory) = &state.advisory {
        writeln!(out, "! {advisory}")?;
    }
    if state.phase == Phase::Loading {
        writeln!(out, "Loading...")?;
    }
    if let Some(error) = &state.error {
        writeln!(out, "Error: {error}")?;
    }

    if let Some(c) = &state.current {
        let style = classify(&c.description);
        let star = if state.is_favorite(&c.location_name) { "★" } else { "☆" };
        let offset = c.timezone_offset_secs;

        writeln!(out)?;
        writeln!(out, "{} {} {star}", style.icon.glyph(), c.location_name)?;
        writeln!(out, "  {}{}  {}", round_temp(c.temperature), unit.temperature_symbol(), c.description)?;
        writeln!(out, "  {}", style.advice)?;
        writeln!(out, "  Feels like: {}°", round_temp(c.feels_like))?;
        writeln!(out, "  Humidity: {}%", c.humidity_pct)?;
        write!(out, "  Wind: {} {}", c.wind_speed, unit.speed_unit())?;
        match c.wind_direction_deg {
            Some(deg) => writeln!(out, " {}", compass(deg))?,
            None => writeln!(out)?,
        }
        writeln!(out, "  Local time: {}", local_clock(Utc::now(), offset))?;
        writeln!(out, "  Updated: {}", local_clock(c.observation_time, offset))?;
        if let Some(sunrise) = c.sunrise {
            writeln!(out, "  Sunrise: {}", local_time_12h(sunrise, offset))?;
        }
        if let Some(sunset) = c.sunset {
            writeln!(out, "  Sunset: {}", local_time_12h(sunset, offset))?;
        }
        if let Some(aqi) = state.air_quality {
            writeln!(out, "  AQI: {} ({})", aqi.value(), aqi.label())?;
        }
        if let Some(uv) = state.uv_index {
            writeln!(out, "  UV index: {:.1} ({})", uv.0, uv.category())?;
        }

        if !state.hourly.is_empty() {
            writeln!(out)?;
            writeln!(out, "Next 24 hours")?;
            let cells: Vec<String> = state
                .hourly
                .iter()
                .map(|h| {
                    format!(
                        "{} {} {}°",
                        hour_label(h.timestamp, offset),
                        classify(&h.description).icon.glyph(),
                        round_temp(h.temperature)
                    )
                })
                .collect();
            writeln!(out, "  {}", cells.join(" | "))?;
        }

        if !state.daily.is_empty() {
            writeln!(out)?;
            writeln!(out, "Daily forecast")?;
            for d in &state.daily {
                writeln!(
                    out,
                    "  {} {} {:>4}°  {}",
                    weekday_short(d.timestamp, offset),
                    classify(&d.description).icon.glyph(),
                    round_temp(d.temperature),
                    d.description
                )?;
            }

            writeln!(out)?;
            writeln!(out, "Temperature trend")?;
            for line in trend_chart(&state.daily, unit, offset) {
                writeln!(out, "  {line}")?;
            }
        }
    }

    if !overlays.is_empty() {
        writeln!(out)?;
        writeln!(out, "Map layers")?;
        for layer in overlays {
            writeln!(
                out,
                "  [{}] {:<11} {} ({})",
                layer.z_index, layer.name, layer.url, layer.attribution
            )?;
        }
    }

    writeln!(out)?;
    if state.favorites.is_empty() {
        writeln!(out, "Favorites: No favorites added")?;
    } else {
        writeln!(out, "Favorites: {}", state.favorites.as_slice().join(", "))?;
    }
    if !state.recents.is_empty() {
        writeln!(out, "Recent: {}", state.recents.as_slice().join(", "))?;
    }

    Ok(())
}

/// One bar per day, scaled between the coldest and warmest entry.
pub fn trend_chart(daily: &[ForecastEntry], unit: UnitSystem, offset_secs: i32) -> Vec<String> {
    let (min, max) = daily.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), d| {
        (lo.min(d.temperature), hi.max(d.temperature))
    });
    let span = max - min;

    daily
        .iter()
        .map(|d| {
            let filled = if span > 0.0 {
                1 + ((d.temperature - min) / span * (CHART_WIDTH - 1) as f64).round() as usize
            } else {
                CHART_WIDTH
            };
            format!(
                "{} {:<width$} {}{}",
                weekday_short(d.timestamp, offset_secs),
                "█".repeat(filled),
                round_temp(d.temperature),
                unit.temperature_symbol(),
                width = CHART_WIDTH
            )
        })
        .collect()
}
