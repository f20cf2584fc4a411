//! Dashboard rendering.
//!
//! One full redraw per tick: header, a body split into the location column
//! (search, favorites, stations) and the weather column (current conditions,
//! forecast table), the call log strip, and a one-line footer. The settings
//! form renders as a centered overlay when focused.

use chrono::Local;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, List, ListItem, Paragraph, Row, Table};
use ratatui::Frame;

use wxmdash_store::{is_valid_api_key, Phase};
use wxmdash_weather::{haversine_km, CallLogEntry, Observation};

use crate::app::{quick_picks, App, ForecastState, Panel};

const SPINNER_FRAMES: [char; 4] = ['|', '/', '-', '\\'];

pub fn draw(frame: &mut Frame, app: &App) {
    let [header, body, log, footer] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(12),
        Constraint::Length(8),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_header(frame, app, header);
    draw_body(frame, app, body);
    draw_call_log(frame, app, log);
    draw_footer(frame, app, footer);

    if app.focus == Panel::Settings {
        draw_settings(frame, app);
    }
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::styled(
        " wxmdash ",
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];

    if let Some(label) = &app.location_label {
        spans.push(Span::raw(format!("  {label}")));
    } else if let Some(coord) = app.weather.selected_location() {
        spans.push(Span::raw(format!("  {}", coord.display())));
    }

    if app.weather.is_loading() {
        spans.push(Span::styled(
            format!("  {} loading", spinner(app.tick)),
            Style::default().fg(Color::Yellow),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_body(frame: &mut Frame, app: &App, area: Rect) {
    let [left, right] =
        Layout::horizontal([Constraint::Length(44), Constraint::Min(40)]).areas(area);

    let search_height = 3 + app.search_results.len() as u16;
    let [search, favorites, stations] = Layout::vertical([
        Constraint::Length(search_height),
        Constraint::Min(4),
        Constraint::Min(5),
    ])
    .areas(left);

    draw_search(frame, app, search);
    draw_favorites(frame, app, favorites);
    draw_stations(frame, app, stations);

    let [conditions, forecast] =
        Layout::vertical([Constraint::Length(10), Constraint::Min(4)]).areas(right);

    draw_conditions(frame, app, conditions);
    draw_forecast(frame, app, forecast);
}

fn panel_block(title: &str, focused: bool) -> Block<'_> {
    let style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .title(title)
}

fn draw_search(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Panel::Search;
    let cursor = if focused { "_" } else { "" };

    let mut lines = vec![Line::from(format!("> {}{}", app.search_input, cursor))];
    for (i, hit) in app.search_results.iter().enumerate() {
        let style = if focused && i == app.search_selected {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default()
        };
        lines.push(Line::styled(truncate(&hit.display_name, 40), style));
    }

    let widget = Paragraph::new(lines).block(panel_block("Search (place or lat, lon)", focused));
    frame.render_widget(widget, area);
}

fn draw_favorites(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Panel::Favorites;

    let items: Vec<ListItem> = if app.favorites.favorites().is_empty() {
        vec![ListItem::new(Span::styled(
            "none yet ('a' saves the current location)",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        app.favorites
            .favorites()
            .iter()
            .enumerate()
            .map(|(i, favorite)| {
                let style = if focused && i == app.favorites_selected {
                    Style::default().fg(Color::Black).bg(Color::Cyan)
                } else {
                    Style::default()
                };
                ListItem::new(Line::styled(
                    format!(
                        "{}  ({:.4}, {:.4})",
                        truncate(&favorite.name, 24),
                        favorite.lat,
                        favorite.lon
                    ),
                    style,
                ))
            })
            .collect()
    };

    frame.render_widget(List::new(items).block(panel_block("Favorites", focused)), area);
}

fn draw_stations(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Panel::Stations;
    let stations = app.weather.stations();
    let picks = quick_picks(stations);

    let items: Vec<ListItem> = if stations.is_empty() {
        let hint = match app.weather.phase() {
            Phase::Loading => format!("{} searching...", spinner(app.tick)),
            _ => "select a location to find stations".to_string(),
        };
        vec![ListItem::new(Span::styled(
            hint,
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        stations
            .iter()
            .enumerate()
            .map(|(i, station)| {
                let style = if focused && i == app.stations_selected {
                    Style::default().fg(Color::Black).bg(Color::Cyan)
                } else {
                    Style::default()
                };
                let pick = picks
                    .iter()
                    .position(|p| p.id == station.id)
                    .map(|n| format!("[{}] ", n + 1))
                    .unwrap_or_else(|| "    ".to_string());
                let distance = app
                    .weather
                    .selected_location()
                    .map(|from| format!("{:>5.1} km", haversine_km(from, &station.coordinate())))
                    .unwrap_or_default();
                ListItem::new(Line::styled(
                    format!(
                        "{}{}  qod {:.2}  {}",
                        pick,
                        truncate(&station.name, 18),
                        station.last_day_qod,
                        distance
                    ),
                    style,
                ))
            })
            .collect()
    };

    frame.render_widget(List::new(items).block(panel_block("Stations", focused)), area);
}

fn draw_conditions(frame: &mut Frame, app: &App, area: Rect) {
    let title = match app.weather.selected_station() {
        Some(station) => format!("Conditions - {}", station.name),
        None => "Conditions".to_string(),
    };

    let lines = match (app.weather.phase(), app.weather.observation()) {
        (Phase::Error(message), _) => vec![Line::styled(
            message.clone(),
            Style::default().fg(Color::Red),
        )],
        (Phase::Loading, _) => vec![Line::from(format!("{} fetching...", spinner(app.tick)))],
        (Phase::Ready, Some(obs)) => observation_lines(obs),
        _ => vec![Line::styled(
            "no data",
            Style::default().fg(Color::DarkGray),
        )],
    };

    let widget = Paragraph::new(lines).block(panel_block(&title, false));
    frame.render_widget(widget, area);
}

fn observation_lines(obs: &Observation) -> Vec<Line<'static>> {
    vec![
        Line::from(vec![
            Span::styled(
                condition_label(&obs.condition),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(
                "   {:.1}\u{b0}C (feels like {:.1}\u{b0}C)",
                obs.temperature, obs.feels_like
            )),
        ]),
        Line::from(format!(
            "Humidity {:.0}%   Dew point {:.1}\u{b0}C   Pressure {:.1} hPa",
            obs.humidity, obs.dew_point, obs.pressure
        )),
        Line::from(format!(
            "Wind {:.1} m/s {} (gusts {:.1})",
            obs.wind_speed,
            cardinal(obs.wind_direction),
            obs.wind_gust
        )),
        Line::from(format!(
            "Rain {:.1} mm/h ({:.1} mm today)   UV {:.1}   Solar {:.0} W/m\u{b2}",
            obs.precipitation_rate, obs.precipitation_accumulated, obs.uv_index,
            obs.solar_irradiance
        )),
        Line::from(Span::styled(
            format!("as of {}", obs.timestamp),
            Style::default().fg(Color::DarkGray),
        )),
    ]
}

fn draw_forecast(frame: &mut Frame, app: &App, area: Rect) {
    let block = panel_block("Forecast", false);

    match &app.forecast {
        ForecastState::Idle => {
            let widget = Paragraph::new(Span::styled(
                "no forecast cell",
                Style::default().fg(Color::DarkGray),
            ))
            .block(block);
            frame.render_widget(widget, area);
        }
        ForecastState::Loading => {
            let widget =
                Paragraph::new(format!("{} fetching...", spinner(app.tick))).block(block);
            frame.render_widget(widget, area);
        }
        ForecastState::Error(message) => {
            let widget =
                Paragraph::new(Span::styled(message.clone(), Style::default().fg(Color::Red)))
                    .block(block);
            frame.render_widget(widget, area);
        }
        ForecastState::Ready(points) => {
            let header = Row::new(vec![
                "Time", "Temp", "Hum", "Wind", "Rain", "hPa", "Solar",
            ])
            .style(Style::default().add_modifier(Modifier::BOLD));

            let rows: Vec<Row> = points
                .iter()
                .take(app.config.ui.forecast_rows as usize)
                .map(|point| {
                    Row::new(vec![
                        Cell::from(fmt_hour(&point.timestamp)),
                        Cell::from(format!("{:.1}\u{b0}", point.temperature)),
                        Cell::from(format!("{:.0}%", point.humidity)),
                        Cell::from(format!(
                            "{:.1} {}",
                            point.wind_speed,
                            cardinal(point.wind_direction)
                        )),
                        Cell::from(format!("{:.1}", point.precipitation)),
                        Cell::from(format!("{:.0}", point.pressure)),
                        Cell::from(format!("{:.0}", point.solar_radiation)),
                    ])
                })
                .collect();

            let table = Table::new(
                rows,
                [
                    Constraint::Length(6),
                    Constraint::Length(7),
                    Constraint::Length(5),
                    Constraint::Length(9),
                    Constraint::Length(5),
                    Constraint::Length(5),
                    Constraint::Length(6),
                ],
            )
            .header(header)
            .block(block);
            frame.render_widget(table, area);
        }
    }
}

fn draw_call_log(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Panel::CallLog;
    let log = app.call_log.lock();

    let items: Vec<ListItem> = if log.is_empty() {
        vec![ListItem::new(Span::styled(
            "no calls yet",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        log.entries().map(call_log_item).collect()
    };

    let title = format!("API calls ({})", log.len());
    frame.render_widget(List::new(items).block(panel_block(&title, focused)), area);
}

fn call_log_item(entry: &CallLogEntry) -> ListItem<'static> {
    let time = entry
        .timestamp
        .with_timezone(&Local)
        .format("%H:%M:%S")
        .to_string();

    let (status, style) = match entry.status {
        Some(code) if (200..300).contains(&code) => {
            (code.to_string(), Style::default().fg(Color::Green))
        }
        Some(code) => (code.to_string(), Style::default().fg(Color::Red)),
        None if entry.duration.is_some() => ("ERR".to_string(), Style::default().fg(Color::Red)),
        None => ("...".to_string(), Style::default().fg(Color::Yellow)),
    };

    let duration = entry
        .duration
        .map(|d| format!("{:>4} ms", d.as_millis()))
        .unwrap_or_default();

    ListItem::new(Line::from(vec![
        Span::styled(format!("{time} "), Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{} ", entry.method)),
        Span::styled(format!("{status:>3} "), style),
        Span::raw(format!("{duration} ")),
        Span::raw(entry.url.clone()),
    ]))
}

fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    let text = match &app.status {
        Some(status) => status.clone(),
        None => match app.focus {
            Panel::Search => {
                "Enter search/select | Up/Down results | Tab next panel | Esc quit".to_string()
            }
            Panel::Favorites => {
                "Enter open | a save current | d remove | Tab next panel | q quit".to_string()
            }
            Panel::Stations => {
                "Enter select | 1-5 quick pick | Tab next panel | q quit".to_string()
            }
            Panel::CallLog => "c clear | Tab next panel | q quit".to_string(),
            Panel::Settings => "Enter save key | Esc close | Tab next panel".to_string(),
        },
    };

    frame.render_widget(
        Paragraph::new(Span::styled(text, Style::default().fg(Color::DarkGray))),
        area,
    );
}

fn draw_settings(frame: &mut Frame, app: &App) {
    let area = centered_rect(56, 8, frame.area());
    frame.render_widget(Clear, area);

    let current = if app.settings.api_key().is_some() {
        Span::styled("configured", Style::default().fg(Color::Green))
    } else {
        Span::styled("not set", Style::default().fg(Color::Yellow))
    };

    let validation = if app.key_input.is_empty() {
        Span::styled(
            "paste your WeatherXM Pro API key",
            Style::default().fg(Color::DarkGray),
        )
    } else if is_valid_api_key(&app.key_input) {
        Span::styled("valid format", Style::default().fg(Color::Green))
    } else {
        Span::styled(
            "expected 8-4-4-4-12 hex groups",
            Style::default().fg(Color::Red),
        )
    };

    let lines = vec![
        Line::from(vec![Span::raw("API key: "), current]),
        Line::from(""),
        Line::from(format!("> {}_", app.key_input)),
        Line::from(validation),
    ];

    let widget = Paragraph::new(lines).block(panel_block("Settings", true));
    frame.render_widget(widget, area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn spinner(tick: u64) -> char {
    SPINNER_FRAMES[(tick as usize) % SPINNER_FRAMES.len()]
}

/// 16-point compass label for a bearing in degrees.
fn cardinal(degrees: f64) -> &'static str {
    const POINTS: [&str; 16] = [
        "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW",
        "NW", "NNW",
    ];
    let normalized = degrees.rem_euclid(360.0);
    let index = ((normalized / 22.5) + 0.5) as usize % 16;
    POINTS[index]
}

/// Provider condition codes are kebab-case ("partly-cloudy-day").
fn condition_label(condition: &str) -> String {
    let spaced = condition.replace('-', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => spaced,
    }
}

/// Hour of an ISO-8601 timestamp, or the raw value if it is shaped
/// differently.
fn fmt_hour(timestamp: &str) -> String {
    if timestamp.as_bytes().get(10) == Some(&b'T') {
        if let Some(hour) = timestamp.get(11..16) {
            return hour.to_string();
        }
    }
    timestamp.to_string()
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}\u{2026}")
    }
}
