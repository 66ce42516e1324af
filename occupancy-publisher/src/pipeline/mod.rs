use std::{future::Future, io::Write, path::Path};

use rand::Rng;

use crate::{clock::Clock, config::PublisherConfig, generator::ReadingGenerator};

#[derive(thiserror::Error, Debug)]
pub enum PublisherError {
    #[error("config error: {0}")]
    Config(String),
    #[error("binding error: {0}")]
    Binding(String),
    #[error("publish error for station {station_id}: {reason}")]
    Publish { station_id: u32, reason: String },
    #[error("encode error: {0}")]
    Encode(String),
    #[error("failed to report message id: {0}")]
    Report(#[from] std::io::Error),
}

/// Producer handle bound to a single topic.
///
/// `publish` resolves only once the backend has acknowledged the message,
/// yielding the backend-assigned message id.
#[async_trait::async_trait]
pub trait Publisher: Send + Sync {
    type Error: std::fmt::Display + Send;

    async fn publish(&self, data: Vec<u8>) -> Result<String, Self::Error>;
}

/// Generates and publishes one reading per station, strictly in order.
///
/// Abort policy: the first failure ends the run. There is no retry and no
/// skip-and-continue; stations already published stay published and the
/// remaining ones are never attempted.
pub struct PublishLoop<P, R, C> {
    pub publisher: P,
    pub generator: ReadingGenerator<R, C>,
    pub stations: Vec<u32>,
}

impl<P, R, C> PublishLoop<P, R, C>
where
    P: Publisher,
    R: Rng,
    C: Clock,
{
    /// Writes one line per acknowledged message id to `out` and returns the ids.
    pub async fn run<W: Write>(mut self, out: &mut W) -> Result<Vec<String>, PublisherError> {
        let mut message_ids = Vec::with_capacity(self.stations.len());

        for &station_id in &self.stations {
            let reading = self.generator.generate(station_id)?;
            let data = reading
                .to_payload()
                .map_err(|e| PublisherError::Encode(format!("station {station_id}: {e}")))?;

            let message_id = match self.publisher.publish(data).await {
                Ok(id) => id,
                Err(e) => {
                    tracing::error!(
                        station_id,
                        error = %e,
                        published = message_ids.len(),
                        "publish failed, aborting remaining stations"
                    );
                    return Err(PublisherError::Publish {
                        station_id,
                        reason: e.to_string(),
                    });
                }
            };

            tracing::info!(
                station_id,
                charger_in_use = reading.charger_in_use,
                message_id = %message_id,
                "published station reading"
            );
            writeln!(out, "{message_id}")?;
            message_ids.push(message_id);
        }

        Ok(message_ids)
    }
}

/// Full run: load config from `config_path`, bind a publisher with `bind`,
/// then publish one reading per station.
///
/// A config failure returns before `bind` is invoked, so nothing is published.
pub async fn run_from_config<B, Fut, P, R, C, W>(
    config_path: &Path,
    bind: B,
    generator: ReadingGenerator<R, C>,
    stations: &[u32],
    out: &mut W,
) -> Result<Vec<String>, PublisherError>
where
    B: FnOnce(PublisherConfig) -> Fut,
    Fut: Future<Output = Result<P, PublisherError>>,
    P: Publisher,
    R: Rng,
    C: Clock,
    W: Write,
{
    let cfg = PublisherConfig::load_from(config_path)?;
    tracing::info!(project_id = %cfg.project_id, topic_id = %cfg.topic_id, "configuration loaded");

    let publisher = bind(cfg).await?;

    let publish_loop = PublishLoop {
        publisher,
        generator,
        stations: stations.to_vec(),
    };
    publish_loop.run(out).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use rand::{rngs::StdRng, SeedableRng};
    use station_client::domain::StationReading;
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    };
    use time::macros::datetime;

    /// In-memory backend that records payloads and can reject the n-th call.
    #[derive(Clone, Default)]
    struct ScriptedPublisher {
        calls: Arc<Mutex<Vec<Vec<u8>>>>,
        fail_on_call: Option<usize>,
    }

    impl ScriptedPublisher {
        fn failing_on(call: usize) -> Self {
            Self {
                fail_on_call: Some(call),
                ..Self::default()
            }
        }

        fn readings(&self) -> Vec<StationReading> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|body| StationReading::from_payload(body).unwrap())
                .collect()
        }
    }

    #[async_trait::async_trait]
    impl Publisher for ScriptedPublisher {
        type Error = String;

        async fn publish(&self, data: Vec<u8>) -> Result<String, String> {
            let mut calls = self.calls.lock().unwrap();
            calls.push(data);
            let n = calls.len();
            if self.fail_on_call == Some(n) {
                return Err("acknowledgment timed out".to_string());
            }
            Ok(format!("msg-{n}"))
        }
    }

    fn generator() -> ReadingGenerator<StdRng, FixedClock> {
        ReadingGenerator::new(
            StdRng::seed_from_u64(11),
            FixedClock(datetime!(2024-05-01 08:30:00 UTC)),
        )
    }

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn publishes_each_station_in_order_and_reports_ids() {
        let file = write_config(r#"{"project_id": "demo-proj", "topic_id": "demo-topic"}"#);
        let publisher = ScriptedPublisher::default();
        let handle = publisher.clone();
        let mut out = Vec::new();

        let ids = run_from_config(
            file.path(),
            |cfg| async move {
                assert_eq!(cfg.project_id, "demo-proj");
                assert_eq!(cfg.topic_id, "demo-topic");
                Ok::<_, PublisherError>(publisher)
            },
            generator(),
            &[40, 48],
            &mut out,
        )
        .await
        .unwrap();

        assert_eq!(ids, vec!["msg-1", "msg-2"]);
        assert_eq!(String::from_utf8(out).unwrap(), "msg-1\nmsg-2\n");

        let readings = handle.readings();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].station_id, 40);
        assert_eq!(readings[1].station_id, 48);
        assert!(readings.iter().all(|r| r.charger_total == 2 && r.charger_in_use <= 2));
    }

    #[tokio::test]
    async fn first_failure_aborts_remaining_stations() {
        let publisher = ScriptedPublisher::failing_on(2);
        let handle = publisher.clone();
        let mut out = Vec::new();

        let publish_loop = PublishLoop {
            publisher,
            generator: generator(),
            stations: vec![40, 48, 58],
        };
        let err = publish_loop.run(&mut out).await.unwrap_err();

        assert!(matches!(
            err,
            PublisherError::Publish { station_id: 48, ref reason } if reason.contains("timed out")
        ));
        assert_eq!(String::from_utf8(out).unwrap(), "msg-1\n");

        // 58 is never attempted.
        let attempted: Vec<u32> = handle.readings().iter().map(|r| r.station_id).collect();
        assert_eq!(attempted, vec![40, 48]);
    }

    #[tokio::test]
    async fn config_error_publishes_nothing() {
        let file = write_config(r#"{"project_id": "demo-proj"}"#);
        let publisher = ScriptedPublisher::default();
        let handle = publisher.clone();
        let bound = Arc::new(AtomicBool::new(false));
        let bound_flag = bound.clone();
        let mut out = Vec::new();

        let err = run_from_config(
            file.path(),
            |_cfg| async move {
                bound_flag.store(true, Ordering::SeqCst);
                Ok::<_, PublisherError>(publisher)
            },
            generator(),
            &[40, 48],
            &mut out,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, PublisherError::Config(_)));
        assert!(!bound.load(Ordering::SeqCst));
        assert!(handle.calls.lock().unwrap().is_empty());
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn binding_error_publishes_nothing() {
        let file = write_config(r#"{"project_id": "demo-proj", "topic_id": "demo-topic"}"#);
        let mut out = Vec::new();

        let err = run_from_config(
            file.path(),
            |_cfg| async move {
                Err::<ScriptedPublisher, _>(PublisherError::Binding("no credentials".to_string()))
            },
            generator(),
            &[40],
            &mut out,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, PublisherError::Binding(_)));
        assert!(out.is_empty());
    }
}
