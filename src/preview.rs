use std::sync::{mpsc, Arc};

use chrono::{DateTime, Utc};
use log::{debug, error};

use crate::fetcher::{ActivityQuery, ActivitySource};
use crate::model::{ActivityRecord, DisplayConfig, RefetchKey};
use crate::pipeline::{build_listing, Listing};

pub enum FetchUpdate {
    Fetched {
        generation: u64,
        result: Result<Vec<ActivityRecord>, String>,
    },
}

#[derive(Debug, Clone)]
pub enum FetchState {
    Loading,
    Loaded(Vec<ActivityRecord>),
    Failed(String),
}

/// Keeps the live preview's activities in step with the settings panel.
///
/// Fetches run on a worker thread and report back over a channel. Each request gets a
/// generation number; a response for anything but the latest generation is discarded.
pub struct Preview {
    source: Arc<dyn ActivitySource>,
    current_user: Option<u64>,
    requested: Option<RefetchKey>,
    generation: u64,
    pub state: FetchState,
    update_rx: mpsc::Receiver<FetchUpdate>,
    update_tx: mpsc::Sender<FetchUpdate>,
}

impl Preview {
    pub fn new(source: Arc<dyn ActivitySource>, current_user: Option<u64>) -> Self {
        let (update_tx, update_rx) = mpsc::channel();
        Self {
            source,
            current_user,
            requested: None,
            generation: 0,
            state: FetchState::Loading,
            update_rx,
            update_tx,
        }
    }

    /// Starts a fetch if the fields that decide what to fetch changed. Returns whether it did.
    pub fn sync(&mut self, config: &DisplayConfig) -> bool {
        let key = config.refetch_key();
        if self.requested == Some(key) {
            return false;
        }
        self.start_fetch(config);
        true
    }

    /// Fetches again with the current settings, changed or not.
    pub fn refresh(&mut self, config: &DisplayConfig) {
        self.start_fetch(config);
    }

    fn start_fetch(&mut self, config: &DisplayConfig) {
        self.generation += 1;
        self.requested = Some(config.refetch_key());
        let generation = self.generation;

        let query = match ActivityQuery::for_config(config, self.current_user) {
            Ok(query) => query,
            Err(err) => {
                self.state = FetchState::Failed(err.to_string());
                return;
            }
        };
        if !matches!(self.state, FetchState::Loaded(_)) {
            self.state = FetchState::Loading;
        }

        debug!("preview fetch #{} for {:?}", generation, query);
        let source = Arc::clone(&self.source);
        let tx = self.update_tx.clone();
        std::thread::spawn(move || {
            let result = source.fetch(&query).map_err(|err| {
                error!("Error fetching activities: {}", err);
                err.to_string()
            });
            let _ = tx.send(FetchUpdate::Fetched { generation, result });
        });
    }

    /// Applies finished fetches. Returns whether the state changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Ok(update) = self.update_rx.try_recv() {
            changed |= self.apply(update);
        }
        changed
    }

    /// Waits for the next finished fetch and applies it.
    #[cfg(test)]
    pub fn wait(&mut self) -> bool {
        match self.update_rx.recv() {
            Ok(update) => self.apply(update),
            Err(_) => false,
        }
    }

    fn apply(&mut self, update: FetchUpdate) -> bool {
        let FetchUpdate::Fetched { generation, result } = update;
        if generation != self.generation {
            debug!("dropping stale preview fetch #{} (latest #{})", generation, self.generation);
            return false;
        }
        self.state = match result {
            Ok(records) => FetchState::Loaded(records),
            Err(message) => FetchState::Failed(message),
        };
        true
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, FetchState::Loading)
    }

    /// `None` while the first fetch is still outstanding.
    pub fn listing(&self, config: &DisplayConfig, now: DateTime<Utc>) -> Option<Listing> {
        match &self.state {
            FetchState::Loading => None,
            FetchState::Loaded(records) => Some(build_listing(records, config, now)),
            FetchState::Failed(message) => Some(Listing::Failed(message.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::model::{ActivityType, Layout};
    use crate::pipeline::tests::{now, record};
    use std::sync::Mutex;

    /// Answers with `per_page` records and records every query.
    struct Counting {
        calls: Mutex<Vec<ActivityQuery>>,
    }

    impl Counting {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl ActivitySource for Counting {
        fn fetch(&self, query: &ActivityQuery) -> Result<Vec<ActivityRecord>, FetchError> {
            self.calls.lock().unwrap().push(query.clone());
            Ok((1..=query.per_page as u64).map(record).collect())
        }
    }

    /// Holds back any request for `slow_page` items until released.
    struct Gated {
        slow_page: u32,
        gate: Mutex<mpsc::Receiver<()>>,
    }

    impl ActivitySource for Gated {
        fn fetch(&self, query: &ActivityQuery) -> Result<Vec<ActivityRecord>, FetchError> {
            if query.per_page == self.slow_page {
                let _ = self.gate.lock().unwrap().recv();
            }
            Ok((1..=query.per_page as u64).map(record).collect())
        }
    }

    struct Failing;

    impl ActivitySource for Failing {
        fn fetch(&self, _: &ActivityQuery) -> Result<Vec<ActivityRecord>, FetchError> {
            Err(FetchError::Status {
                status: 502,
                message: "Bad Gateway".to_owned(),
            })
        }
    }

    #[test]
    fn first_sync_fetches_and_loads() {
        let source = Counting::new();
        let mut preview = Preview::new(source.clone(), None);
        let config = DisplayConfig::default();

        assert!(preview.sync(&config));
        assert!(preview.is_loading());
        assert_eq!(preview.listing(&config, now()), None);
        assert!(preview.wait());

        match preview.listing(&config, now()) {
            Some(Listing::Rows { rows, heading }) => {
                assert_eq!(rows.len(), 5);
                assert_eq!(heading, Some("All Activities"));
            }
            other => panic!("unexpected listing {:?}", other),
        }
        assert_eq!(source.calls(), 1);
    }

    #[test]
    fn cosmetic_changes_do_not_refetch() {
        let source = Counting::new();
        let mut preview = Preview::new(source.clone(), None);
        let mut config = DisplayConfig::default();
        preview.sync(&config);
        preview.wait();

        config.avatar_size = 90;
        assert!(!preview.sync(&config));
        config.layout = Layout::Grid;
        assert!(!preview.sync(&config));
        config.show_date = false;
        assert!(!preview.sync(&config));
        config.hide_heading = true;
        assert!(!preview.sync(&config));
        assert_eq!(source.calls(), 1);

        match preview.listing(&config, now()) {
            Some(Listing::Rows { rows, heading }) => {
                assert_eq!(heading, None);
                assert!(rows.iter().all(|row| row.layout_class == "activity-grid"));
                assert!(rows.iter().all(|row| row.relative_time.is_none()));
            }
            other => panic!("unexpected listing {:?}", other),
        }
    }

    #[test]
    fn type_or_count_changes_refetch() {
        let source = Counting::new();
        let mut preview = Preview::new(source.clone(), Some(3));
        let mut config = DisplayConfig::default();
        preview.sync(&config);
        preview.wait();

        config.number_of_items = 2;
        assert!(preview.sync(&config));
        preview.wait();
        config.activity_type = ActivityType::My;
        assert!(preview.sync(&config));
        preview.wait();

        let calls = source.calls.lock().unwrap();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1].per_page, 2);
        assert_eq!(calls[2].user_id, Some(3));
    }

    #[test]
    fn stale_response_does_not_clobber_newer_one() {
        let (release, gate) = mpsc::channel();
        let source = Arc::new(Gated {
            slow_page: 4,
            gate: Mutex::new(gate),
        });

        let mut preview = Preview::new(source, None);
        let mut config = DisplayConfig {
            number_of_items: 4,
            ..DisplayConfig::default()
        };
        // First fetch parks on the gate.
        preview.sync(&config);
        config.number_of_items = 2;
        preview.sync(&config);

        // The second fetch answers first and wins.
        assert!(preview.wait());
        release.send(()).unwrap();
        assert!(!preview.wait());

        match &preview.state {
            FetchState::Loaded(records) => assert_eq!(records.len(), 2),
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[test]
    fn failure_becomes_error_listing() {
        let mut preview = Preview::new(Arc::new(Failing), None);
        let config = DisplayConfig::default();
        preview.sync(&config);
        preview.wait();
        assert_eq!(
            preview.listing(&config, now()).and_then(|listing| listing.message()),
            Some("Error loading activities: service responded with 502: Bad Gateway".to_owned())
        );
    }

    #[test]
    fn missing_user_fails_without_fetching() {
        let source = Counting::new();
        let mut preview = Preview::new(source.clone(), None);
        let config = DisplayConfig {
            activity_type: ActivityType::Favorites,
            ..DisplayConfig::default()
        };
        preview.sync(&config);
        assert!(matches!(preview.state, FetchState::Failed(_)));
        assert_eq!(source.calls(), 0);
        assert!(!preview.sync(&config));
    }

    #[test]
    fn refresh_refetches_same_key() {
        let source = Counting::new();
        let mut preview = Preview::new(source.clone(), None);
        let config = DisplayConfig::default();
        preview.sync(&config);
        preview.wait();
        preview.refresh(&config);
        preview.wait();
        assert_eq!(source.calls(), 2);
    }
}
