use chrono::Local;
use haulquote_core::{Quote, QuoteStatus};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table, Wrap},
};

use crate::app::{App, Screen};

pub(crate) fn draw(frame: &mut Frame<'_>, app: &App) {
    let area = frame.area();

    // Outer layout: title, main content, status line
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [header_area, content_area, status_area] = chunks else {
        return;
    };

    let header = Paragraph::new(format!(
        "haulquote – {} · {}",
        app.config.pricing_path.display(),
        app.config.requests_path.display()
    ))
    .block(Block::default().borders(Borders::ALL).title("Haulquote"));
    frame.render_widget(header, *header_area);

    match app.screen {
        Screen::QuoteList => draw_quote_list(frame, app, *content_area),
        Screen::QuoteDetail => draw_quote_detail(frame, app, *content_area),
    }

    let nav_hint = match app.screen {
        Screen::QuoteList => "↑/↓ move · Enter open · r reload · q/Ctrl-C quit",
        Screen::QuoteDetail => "↑/↓ previous/next · Esc/←/b back · q/Ctrl-C quit",
    };

    let summary = &app.summary;
    let totals = format!(
        "{}/{} priced · {} failed · ${:.2}/month · ${:.2} one-time",
        summary.succeeded, summary.total, summary.failed, summary.monthly_total, summary.one_time_total
    );

    let status_text = if app.is_loading {
        format!("Generating quotes… · {nav_hint}")
    } else if let Some(msg) = &app.error_message {
        format!("{msg} · {nav_hint}")
    } else {
        format!("{totals} · {nav_hint}")
    };

    let status_style = if app.error_message.is_some() {
        Style::default().fg(Color::Red)
    } else if app.is_loading {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let status = Paragraph::new(status_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(status_style)
        .wrap(Wrap { trim: true });

    frame.render_widget(status, *status_area);
}

fn draw_quote_list(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let items = if app.quotes.is_empty() {
        vec![ListItem::new("No quotes yet. Press r to load the request file.")]
    } else {
        app.quotes
            .iter()
            .map(|quote| ListItem::new(quote_line(quote)).style(status_style(quote.status)))
            .collect()
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Quotes ({})", app.quotes.len())),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD));

    let mut state = ListState::default();
    if !app.quotes.is_empty() {
        state.select(Some(app.quote_list_index));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn quote_line(quote: &Quote) -> String {
    let location = quote.service_request.as_ref().map_or_else(
        || "<unresolved request>".to_owned(),
        |request| {
            format!(
                "{}, {} · {} {} {}",
                request.city,
                request.state,
                request.container_size,
                request.equipment_type,
                request.frequency
            )
        },
    );

    match quote.status {
        QuoteStatus::Success => format!(
            "{:<12} {location:<48} {:>10} {}",
            quote.request_id,
            money(quote.total_monthly_cost),
            quote.pricing_source
        ),
        QuoteStatus::Failed => format!(
            "{:<12} {location:<48} {:>10} {}",
            quote.request_id,
            "FAILED",
            quote.failure_reason.as_deref().unwrap_or_default()
        ),
    }
}

fn draw_quote_detail(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let Some(quote) = app.selected_quote() else {
        let paragraph = Paragraph::new("No quote selected.")
            .block(Block::default().borders(Borders::ALL).title("Quote"));
        frame.render_widget(paragraph, area);
        return;
    };

    let generated = quote
        .generated_at
        .with_timezone(&Local)
        .format("%d.%m.%Y %H:%M");
    let title = format!("{} · generated {generated} (Esc/←/b to go back)", quote.id);

    if quote.status == QuoteStatus::Failed {
        let reason = quote
            .failure_reason
            .as_deref()
            .unwrap_or("Unknown failure");
        let paragraph = Paragraph::new(format!("Could not price this location.\n\n{reason}"))
            .style(status_style(quote.status))
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    }

    let lines = breakdown_rows(quote);
    let rows = lines.into_iter().map(|(label, rate, amount, emphasis)| {
        let row = Row::new(vec![Cell::from(label), Cell::from(rate), Cell::from(amount)]);
        if emphasis {
            row.style(Style::default().add_modifier(Modifier::BOLD))
        } else {
            row
        }
    });

    let column_widths = [
        Constraint::Length(26),
        Constraint::Length(16),
        Constraint::Min(14),
    ];

    let table = Table::new(rows, column_widths)
        .header(
            Row::new(vec!["Item", "Rate", "Amount"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL).title(title))
        .column_spacing(1);

    frame.render_widget(table, area);
}

fn breakdown_rows(quote: &Quote) -> Vec<(String, String, String, bool)> {
    vec![
        ("Pricing source".to_owned(), String::new(), quote.pricing_source.clone(), false),
        (
            "Monthly volume".to_owned(),
            format!("{} unit(s) · {}/wk", quote.number_of_units, quote.pickups_per_week),
            format!("{:.2} yd", quote.total_monthly_volume),
            false,
        ),
        (
            "Base rate".to_owned(),
            format!("{}/yd", money(quote.price_per_yard)),
            money(quote.base_rate),
            false,
        ),
        (
            "Fuel surcharge".to_owned(),
            percent(quote.fuel_surcharge_rate),
            money(quote.fuel_surcharge_amount),
            false,
        ),
        (
            "Franchise fee".to_owned(),
            percent(quote.franchise_fee_rate),
            money(quote.franchise_fee_amount),
            false,
        ),
        ("Add-ons".to_owned(), String::new(), money(quote.add_ons_cost), false),
        ("Subtotal".to_owned(), String::new(), money(quote.subtotal), true),
        (
            "Sales tax".to_owned(),
            percent(quote.local_tax_rate),
            money(quote.local_tax_amount),
            false,
        ),
        ("Monthly total".to_owned(), String::new(), money(quote.total_monthly_cost), true),
        ("Delivery (one-time)".to_owned(), String::new(), money(quote.delivery_fee), false),
        ("Extra pickup (each)".to_owned(), String::new(), money(quote.extra_pickup_rate), false),
    ]
}

fn money(amount: f64) -> String {
    format!("${amount:.2}")
}

fn percent(rate: f64) -> String {
    format!("{rate:.2}%")
}

fn status_style(status: QuoteStatus) -> Style {
    match status {
        QuoteStatus::Success => Style::default(),
        QuoteStatus::Failed => Style::default().fg(Color::Red),
    }
}
