use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, Screen};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    None,
    Quit,
    /// Re-read the pricing and request files, then regenerate all quotes
    Reload,
}

pub(crate) fn handle_key_event(key: KeyEvent, app: &mut App) -> Action {
    use KeyCode::{Char, Down, End, Enter, Esc, Home, Left, Right, Up};

    // Global quit shortcuts
    if key.code == Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }
    if key.code == Char('q') && key.modifiers.is_empty() {
        return Action::Quit;
    }

    let mut action = Action::None;

    match app.screen {
        Screen::QuoteList => match key.code {
            Up | Char('k') => {
                app.quote_list_index = app.quote_list_index.saturating_sub(1);
            }
            Down | Char('j') => {
                if app.quote_list_index + 1 < app.quotes.len() {
                    app.quote_list_index += 1;
                }
            }
            Home => app.quote_list_index = 0,
            End => app.quote_list_index = app.quotes.len().saturating_sub(1),
            Enter | Right | Char(' ') => app.open_selected_quote(),
            Char('r') => action = Action::Reload,
            _ => {}
        },

        Screen::QuoteDetail => match key.code {
            Left | Esc | Char('b') => {
                app.screen = Screen::QuoteList;
            }
            Up | Char('k') => {
                app.quote_list_index = app.quote_list_index.saturating_sub(1);
            }
            Down | Char('j') => {
                if app.quote_list_index + 1 < app.quotes.len() {
                    app.quote_list_index += 1;
                }
            }
            _ => {}
        },
    }
    action
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crossterm::event::KeyEventKind;
    use haulquote_core::{FeeRegistry, PricingContext, QuoteService, ServiceRequestDraft};
    use serde_json::json;

    use super::*;
    use crate::config::AppConfig;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Press)
    }

    async fn app_with_quotes(count: usize) -> App {
        let service = Arc::new(QuoteService::new(Arc::new(FeeRegistry::new(Vec::new()))));
        let config = AppConfig::from_sources(Vec::new(), |_| None).expect("default config");
        let drafts: Vec<ServiceRequestDraft> = (0..count)
            .map(|idx| {
                serde_json::from_value(json!({
                    "id": format!("loc-{idx}"),
                    "city": "Plano",
                    "state": "TX",
                    "equipmentType": "Cart",
                    "containerSize": "2YD",
                    "frequency": "1x/week",
                    "materialType": "MSW",
                }))
                .expect("valid draft")
            })
            .collect();
        let quotes = service
            .generate_quotes(&PricingContext::default(), &drafts)
            .await;

        let mut app = App::new(service, config);
        app.set_quotes(quotes);
        app
    }

    #[tokio::test]
    async fn list_navigation_stays_in_bounds() {
        let mut app = app_with_quotes(2).await;
        handle_key_event(key(KeyCode::Up), &mut app);
        assert_eq!(app.quote_list_index, 0);
        handle_key_event(key(KeyCode::Down), &mut app);
        handle_key_event(key(KeyCode::Down), &mut app);
        assert_eq!(app.quote_list_index, 1);
        assert_eq!(app.summary.failed, 2);
    }

    #[tokio::test]
    async fn detail_opens_and_closes() {
        let mut app = app_with_quotes(1).await;
        handle_key_event(key(KeyCode::Enter), &mut app);
        assert_eq!(app.screen, Screen::QuoteDetail);
        handle_key_event(key(KeyCode::Esc), &mut app);
        assert_eq!(app.screen, Screen::QuoteList);
    }

    #[tokio::test]
    async fn shortcuts_map_to_actions() {
        let mut app = app_with_quotes(0).await;
        handle_key_event(key(KeyCode::Enter), &mut app);
        assert_eq!(app.screen, Screen::QuoteList);
        assert_eq!(handle_key_event(key(KeyCode::Char('r')), &mut app), Action::Reload);
        assert_eq!(handle_key_event(key(KeyCode::Char('q')), &mut app), Action::Quit);
    }
}
