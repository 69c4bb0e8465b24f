use crate::core::geo::TileCoord;
use crate::prelude::HashSet;
use crate::Result;
use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, warn};
use once_cell::sync::Lazy;
use std::time::Duration;

/// Blocking client used by the fetch threads; the async client in the
/// source module stays dedicated to metadata requests
static BLOCKING_CLIENT: Lazy<reqwest::blocking::Client> = Lazy::new(|| {
    reqwest::blocking::Client::builder()
        .user_agent("noitamap/0.1 (+https://github.com/example/noitamap)")
        .timeout(Duration::from_secs(30))
        .build()
        .expect("failed to build reqwest blocking client")
});

/// Outcome of one tile fetch, delivered over the result channel
pub struct TileResult {
    pub coord: TileCoord,
    pub result: Result<Vec<u8>>,
}

#[derive(Debug, Clone)]
pub struct TileLoaderConfig {
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for TileLoaderConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay: Duration::from_millis(250),
        }
    }
}

/// Fetches tiles on background threads, reporting results over a channel
/// the layer drains once per update cycle. Requests already in flight are
/// deduplicated by coordinate.
pub struct TileLoader {
    results_tx: Sender<TileResult>,
    results_rx: Receiver<TileResult>,
    in_flight: HashSet<TileCoord>,
    config: TileLoaderConfig,
}

impl TileLoader {
    pub fn new() -> Self {
        Self::with_config(TileLoaderConfig::default())
    }

    pub fn with_config(config: TileLoaderConfig) -> Self {
        let (results_tx, results_rx) = unbounded();
        Self {
            results_tx,
            results_rx,
            in_flight: HashSet::default(),
            config,
        }
    }

    /// Starts fetching a tile unless the same coordinate is already in
    /// flight
    pub fn request_tile(&mut self, coord: TileCoord, url: String) {
        if !self.in_flight.insert(coord) {
            return;
        }

        debug!("fetching tile {:?} from {}", coord, url);
        let tx = self.results_tx.clone();
        let config = self.config.clone();
        std::thread::spawn(move || {
            let result = fetch_with_retry(&url, &config);
            // The receiver may be gone if the layer was dropped mid-fetch.
            let _ = tx.send(TileResult { coord, result });
        });
    }

    /// Drains completed fetches without blocking
    pub fn poll_results(&mut self) -> Vec<TileResult> {
        let mut results = Vec::new();
        while let Ok(result) = self.results_rx.try_recv() {
            self.in_flight.remove(&result.coord);
            results.push(result);
        }
        results
    }

    pub fn is_loading(&self, coord: &TileCoord) -> bool {
        self.in_flight.contains(coord)
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }
}

impl Default for TileLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn fetch_with_retry(url: &str, config: &TileLoaderConfig) -> Result<Vec<u8>> {
    let mut last_error: Option<crate::Error> = None;

    for attempt in 1..=config.max_attempts {
        match fetch_once(url) {
            Ok(bytes) => return Ok(bytes),
            Err(e) => {
                warn!(
                    "tile fetch from {} failed (attempt {}/{}): {}",
                    url, attempt, config.max_attempts, e
                );
                last_error = Some(crate::MapError::TileSource(e.to_string()));
                if attempt < config.max_attempts {
                    std::thread::sleep(config.retry_delay);
                }
            }
        }
    }

    Err(last_error
        .unwrap_or_else(|| crate::MapError::TileSource(format!("no attempts made for {}", url)))
        .into())
}

fn fetch_once(url: &str) -> std::result::Result<Vec<u8>, reqwest::Error> {
    let response = BLOCKING_CLIENT.get(url).send()?.error_for_status()?;
    Ok(response.bytes()?.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_drains_channel_and_in_flight() {
        let mut loader = TileLoader::new();
        let coord = TileCoord::new(1, 1, 5);

        // Simulate a completed fetch arriving on the channel.
        loader.in_flight.insert(coord);
        loader
            .results_tx
            .clone()
            .send(TileResult {
                coord,
                result: Ok(vec![0xff]),
            })
            .unwrap();

        assert!(loader.is_loading(&coord));
        let results = loader.poll_results();
        assert_eq!(results.len(), 1);
        assert!(results[0].result.is_ok());
        assert!(!loader.is_loading(&coord));
    }

    #[test]
    fn test_poll_empty() {
        let mut loader = TileLoader::new();
        assert!(loader.poll_results().is_empty());
        assert_eq!(loader.in_flight_count(), 0);
    }
}
