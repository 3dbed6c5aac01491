// Status service - One fetch and render cycle
use crate::application::presenter::{StatusView, render};
use crate::application::reading_source::ReadingSource;
use crate::application::status_sink::{Notice, StatusSink};
use crate::domain::reading::Reading;
use crate::infrastructure::config::Settings;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub struct StatusService {
    source: Arc<dyn ReadingSource>,
    sink: Arc<dyn StatusSink>,
    active: Arc<AtomicBool>,
    last_reading: Reading,
    error_shown: bool,
}

impl StatusService {
    pub fn new(source: Arc<dyn ReadingSource>, sink: Arc<dyn StatusSink>, active: Arc<AtomicBool>) -> Self {
        Self {
            source,
            sink,
            active,
            last_reading: Reading::no_data(),
            error_shown: false,
        }
    }

    pub fn last_reading(&self) -> &Reading {
        &self.last_reading
    }

    /// Fetch the latest entry and push the rendered view to the sink.
    ///
    /// A failed fetch resets the last reading to the sentinel so stale data
    /// is never shown as current. Only the first error after a success is
    /// surfaced as a notice.
    pub async fn run_cycle(&mut self, settings: &Settings) -> Option<StatusView> {
        let result = self.source.latest_reading(&settings.connection).await;

        if !self.active.load(Ordering::SeqCst) {
            tracing::debug!("Discarding fetch result, widget was torn down");
            return None;
        }

        match result {
            Ok(reading) => {
                tracing::info!(
                    "Fetched reading sgv={} direction={:?} date={}",
                    reading.sgv,
                    reading.direction,
                    reading.timestamp
                );
                self.error_shown = false;
                self.last_reading = reading;
            }
            Err(e) => {
                tracing::error!("Error fetching data: {}", e);
                self.last_reading = Reading::no_data();
                if !self.error_shown {
                    self.sink.notify(Notice::error(format!("Error fetching data: {}", e)));
                    self.error_shown = true;
                }
            }
        }

        let view = render(&self.last_reading, &settings.display);
        self.sink.show_status(&view);
        if let Some(message) = view.warning {
            tracing::warn!("{} ({})", message, view.text);
            self.sink.notify(Notice::warning(message));
        }

        Some(view)
    }

    /// Notice reported by the manual refresh command.
    pub fn timestamp_notice(&self) -> Notice {
        match self.last_reading().recorded_at() {
            Some(at) => Notice::info(format!("Last entry: {}", at.format("%Y-%m-%d %H:%M:%S"))),
            None => Notice::info("No data available"),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{RecordingSink, ScriptedSource};
    use super::*;
    use crate::application::reading_source::FetchError;
    use crate::application::status_sink::NoticeLevel;
    use crate::infrastructure::config::build_settings;

    fn settings() -> Settings {
        build_settings(config::Config::builder()).unwrap()
    }

    fn good(sgv: f64) -> Reading {
        Reading::new(sgv, "Flat".to_string(), 1_700_000_000_000)
    }

    fn service(source: Arc<ScriptedSource>, sink: Arc<RecordingSink>) -> (StatusService, Arc<AtomicBool>) {
        let active = Arc::new(AtomicBool::new(true));
        (StatusService::new(source, sink, active.clone()), active)
    }

    #[tokio::test]
    async fn test_successful_cycle_renders_reading() {
        let source = Arc::new(ScriptedSource::new(vec![], good(150.0)));
        let sink = Arc::new(RecordingSink::default());
        let (mut service, _) = service(source.clone(), sink.clone());

        let view = service.run_cycle(&settings()).await.unwrap();

        assert_eq!(view.text, "150.0 mg/dL →");
        assert_eq!(sink.last_view().unwrap(), view);
        assert_eq!(service.last_reading(), &good(150.0));
        assert!(sink.notices().is_empty());
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_failure_resets_reading_to_sentinel() {
        let source = Arc::new(ScriptedSource::new(
            vec![Ok(good(120.0)), Err(FetchError::BadStatus { status: 404 })],
            good(120.0),
        ));
        let sink = Arc::new(RecordingSink::default());
        let (mut service, _) = service(source, sink.clone());

        service.run_cycle(&settings()).await;
        assert_eq!(service.last_reading(), &good(120.0));

        let view = service.run_cycle(&settings()).await.unwrap();
        assert_eq!(view.text, "---");
        assert_eq!(service.last_reading(), &Reading::no_data());

        let notices = sink.notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert_eq!(notices[0].message, "Error fetching data: Request Failed. Status Code: 404");
    }

    #[tokio::test]
    async fn test_repeated_errors_are_reported_once_until_success() {
        let source = Arc::new(ScriptedSource::new(
            vec![
                Err(FetchError::ConfigMissing),
                Err(FetchError::ConfigMissing),
                Ok(good(100.0)),
                Err(FetchError::BadStatus { status: 500 }),
            ],
            good(100.0),
        ));
        let sink = Arc::new(RecordingSink::default());
        let (mut service, _) = service(source, sink.clone());

        for _ in 0..4 {
            service.run_cycle(&settings()).await;
        }

        let errors: Vec<String> = sink
            .notices()
            .into_iter()
            .filter(|n| n.level == NoticeLevel::Error)
            .map(|n| n.message)
            .collect();
        assert_eq!(
            errors,
            vec![
                "Error fetching data: Nightscout host and token must be configured".to_string(),
                "Error fetching data: Request Failed. Status Code: 500".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_warning_notice_raised_for_low_reading() {
        let source = Arc::new(ScriptedSource::new(vec![], good(60.0)));
        let sink = Arc::new(RecordingSink::default());
        let (mut service, _) = service(source, sink.clone());

        service.run_cycle(&settings()).await;

        assert_eq!(sink.notices(), vec![Notice::warning("Low blood glucose!")]);
    }

    #[tokio::test]
    async fn test_result_discarded_after_teardown() {
        let source = Arc::new(ScriptedSource::new(vec![], good(150.0)));
        let sink = Arc::new(RecordingSink::default());
        let (mut service, active) = service(source.clone(), sink.clone());

        active.store(false, Ordering::SeqCst);

        assert!(service.run_cycle(&settings()).await.is_none());
        assert_eq!(source.calls(), 1);
        assert!(sink.last_view().is_none());
        assert_eq!(service.last_reading(), &Reading::no_data());
    }

    #[tokio::test]
    async fn test_timestamp_notice() {
        let source = Arc::new(ScriptedSource::new(vec![], good(150.0)));
        let sink = Arc::new(RecordingSink::default());
        let (mut service, _) = service(source, sink);

        assert_eq!(service.timestamp_notice(), Notice::info("No data available"));

        service.run_cycle(&settings()).await;
        let notice = service.timestamp_notice();
        assert_eq!(notice.level, NoticeLevel::Info);
        assert!(notice.message.starts_with("Last entry: "));
    }
}
