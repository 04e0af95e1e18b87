use std::sync::Arc;

use haulquote_core::{BatchSummary, PricingContext, Quote, service::QuoteService};

use crate::config::AppConfig;
use crate::files::{self, RequestRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    QuoteList,
    QuoteDetail,
}

pub(crate) struct App {
    pub service: Arc<QuoteService>,
    pub config: AppConfig,

    pub screen: Screen,
    pub quotes: Vec<Quote>,
    pub summary: BatchSummary,
    pub quote_list_index: usize,

    pub is_loading: bool,
    pub error_message: Option<String>,
}

impl App {
    pub(crate) fn new(service: Arc<QuoteService>, config: AppConfig) -> Self {
        Self {
            service,
            config,
            screen: Screen::QuoteList,
            quotes: Vec::new(),
            summary: BatchSummary::default(),
            quote_list_index: 0,
            is_loading: false,
            error_message: None,
        }
    }

    /// Re-read both files and regenerate every quote.
    pub(crate) async fn reload(&mut self) {
        let loaded = files::load_pricing(&self.config.pricing_path).and_then(|context| {
            files::load_requests(&self.config.requests_path).map(|rows| (context, rows))
        });

        match loaded {
            Ok((context, rows)) => {
                let quotes = quote_rows(&self.service, &context, rows).await;
                self.set_quotes(quotes);
                self.error_message = None;
            }
            Err(err) => {
                self.error_message = Some(format!("Reload failed: {err:#}"));
            }
        }
    }

    pub(crate) fn set_quotes(&mut self, quotes: Vec<Quote>) {
        self.summary = BatchSummary::from_quotes(&quotes);
        self.quotes = quotes;
        self.quote_list_index = self
            .quote_list_index
            .min(self.quotes.len().saturating_sub(1));
    }

    pub(crate) fn selected_quote(&self) -> Option<&Quote> {
        self.quotes.get(self.quote_list_index)
    }

    pub(crate) fn open_selected_quote(&mut self) {
        if self.selected_quote().is_some() {
            self.screen = Screen::QuoteDetail;
        }
    }
}

/// Price every row of a requests file, one quote per row in file order.
pub(crate) async fn quote_rows(
    service: &QuoteService,
    context: &PricingContext,
    rows: Vec<RequestRow>,
) -> Vec<Quote> {
    let mut drafts = Vec::with_capacity(rows.len());
    let mut slots = Vec::with_capacity(rows.len());
    for row in rows {
        match row {
            RequestRow::Draft(draft) => {
                drafts.push(*draft);
                slots.push(None);
            }
            RequestRow::Rejected { id, reason } => slots.push(Some(Quote::rejected(&id, reason))),
        }
    }

    let mut priced = service.generate_quotes(context, &drafts).await.into_iter();
    slots
        .into_iter()
        .filter_map(|slot| slot.or_else(|| priced.next()))
        .collect()
}
