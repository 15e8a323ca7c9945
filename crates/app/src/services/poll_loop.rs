//! Poll loop — the read → decode → publish → sleep cycle.
//!
//! ```text
//! Idle → Reading → Publishing → Sleeping → Idle → …
//!                                   └─(one-shot)→ Done
//! ```
//!
//! Sensor failures send the loop straight back to `Reading` with no delay.
//! Publish failures are logged and the cycle carries on.

use std::time::Duration;

use inkbird_domain::error::BridgeError;
use inkbird_domain::sample::Sample;
use inkbird_domain::temperature::Temperature;

use crate::ports::{Publisher, SensorReader};

/// How the loop behaves after a completed cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// One read/publish cycle, then disconnect.
    Once,
    /// Repeat forever, sleeping `interval` between cycles.
    Daemon {
        /// Pause between two cycles.
        interval: Duration,
    },
}

/// Immutable settings for a [`PollLoop`].
#[derive(Debug, Clone)]
pub struct PollSettings {
    /// Base topic; readings go to `{topic}/celsius` and `{topic}/fahrenheit`.
    pub topic: String,
    pub mode: RunMode,
    /// Also publish the Fahrenheit value.
    pub publish_fahrenheit: bool,
}

impl PollSettings {
    #[must_use]
    pub fn celsius_topic(&self) -> String {
        format!("{}/celsius", self.topic)
    }

    #[must_use]
    pub fn fahrenheit_topic(&self) -> String {
        format!("{}/fahrenheit", self.topic)
    }
}

/// States of the poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Reading,
    Publishing(Sample),
    Sleeping,
    Done,
}

/// Drives a [`SensorReader`] and a [`Publisher`] through the poll cycle.
pub struct PollLoop<S, P> {
    sensor: S,
    publisher: P,
    settings: PollSettings,
    cycles: u64,
}

impl<S: SensorReader, P: Publisher> PollLoop<S, P> {
    /// Create a new loop over the given ports.
    pub fn new(sensor: S, publisher: P, settings: PollSettings) -> Self {
        Self {
            sensor,
            publisher,
            settings,
            cycles: 0,
        }
    }

    /// Number of completed read/publish cycles.
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Run until the loop reaches [`PollState::Done`].
    ///
    /// In daemon mode this only returns on error; cancel the future to stop
    /// it and call [`disconnect`](Self::disconnect) afterwards.
    ///
    /// # Errors
    ///
    /// Returns the publisher's error when the final disconnect of a one-shot
    /// run fails.
    pub async fn run(&mut self) -> Result<(), BridgeError> {
        let mut state = PollState::Idle;
        while state != PollState::Done {
            state = self.step(state).await?;
        }
        Ok(())
    }

    /// Advance the loop by one state.
    ///
    /// # Errors
    ///
    /// Only the transition out of `Sleeping` in one-shot mode can fail, when
    /// disconnecting from the broker fails.
    pub async fn step(&mut self, state: PollState) -> Result<PollState, BridgeError> {
        let next = match state {
            PollState::Idle => PollState::Reading,
            PollState::Reading => match self.read().await {
                Ok(sample) => PollState::Publishing(sample),
                Err(err) => {
                    tracing::error!(error = ?err, "failed to read sensor, retrying");
                    PollState::Reading
                }
            },
            PollState::Publishing(sample) => {
                self.publish(sample.decode()).await;
                self.cycles += 1;
                PollState::Sleeping
            }
            PollState::Sleeping => match self.settings.mode {
                RunMode::Once => {
                    self.disconnect().await?;
                    tracing::info!("one-shot execution done");
                    PollState::Done
                }
                RunMode::Daemon { interval } => {
                    tracing::debug!(interval_secs = interval.as_secs(), "sleeping");
                    tokio::time::sleep(interval).await;
                    PollState::Idle
                }
            },
            PollState::Done => PollState::Done,
        };
        Ok(next)
    }

    /// Disconnect the publisher.
    ///
    /// # Errors
    ///
    /// Propagates the publisher's disconnect error.
    pub async fn disconnect(&mut self) -> Result<(), BridgeError> {
        self.publisher.disconnect().await
    }

    async fn read(&mut self) -> Result<Sample, BridgeError> {
        let bytes = self.sensor.read_sample().await?;
        tracing::info!(raw = ?bytes, "raw sensor data");
        Ok(Sample::from_bytes(&bytes)?)
    }

    async fn publish(&self, temperature: Temperature) {
        tracing::debug!(%temperature, "temperature decoded");

        let topic = self.settings.celsius_topic();
        self.publish_one(&topic, temperature.to_payload()).await;

        if self.settings.publish_fahrenheit {
            let topic = self.settings.fahrenheit_topic();
            self.publish_one(&topic, temperature.to_fahrenheit_payload())
                .await;
        }
    }

    async fn publish_one(&self, topic: &str, payload: String) {
        match self.publisher.publish(topic, payload.clone()).await {
            Ok(()) => tracing::debug!(%topic, %payload, "mqtt: sent"),
            Err(err) => tracing::warn!(%err, %topic, "mqtt: failed to send"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use inkbird_domain::error::DecodeError;

    use super::*;

    /// Sensor that replays a scripted list of results.
    struct ScriptedSensor {
        script: VecDeque<Result<Vec<u8>, BridgeError>>,
        reads: usize,
    }

    impl ScriptedSensor {
        fn new(script: Vec<Result<Vec<u8>, BridgeError>>) -> Self {
            Self {
                script: script.into(),
                reads: 0,
            }
        }
    }

    impl SensorReader for ScriptedSensor {
        async fn read_sample(&mut self) -> Result<Vec<u8>, BridgeError> {
            self.reads += 1;
            self.script
                .pop_front()
                .unwrap_or_else(|| Ok(vec![0x64, 0x00]))
        }
    }

    #[derive(Clone, Default)]
    struct RecordingPublisher {
        sent: Arc<Mutex<Vec<(String, String)>>>,
        disconnects: Arc<Mutex<usize>>,
        fail_publish: bool,
    }

    impl Publisher for RecordingPublisher {
        async fn publish(&self, topic: &str, payload: String) -> Result<(), BridgeError> {
            if self.fail_publish {
                return Err(BridgeError::Messaging(Box::new(std::io::Error::other(
                    "broker gone",
                ))));
            }
            self.sent.lock().unwrap().push((topic.to_owned(), payload));
            Ok(())
        }

        async fn disconnect(&mut self) -> Result<(), BridgeError> {
            *self.disconnects.lock().unwrap() += 1;
            Ok(())
        }
    }

    fn sensor_error() -> BridgeError {
        BridgeError::Sensor(Box::new(std::io::Error::other("device not found")))
    }

    fn settings(mode: RunMode) -> PollSettings {
        PollSettings {
            topic: "/test/sensor/pool".to_owned(),
            mode,
            publish_fahrenheit: false,
        }
    }

    #[test]
    fn should_build_topics_from_base() {
        let settings = settings(RunMode::Once);
        assert_eq!(settings.celsius_topic(), "/test/sensor/pool/celsius");
        assert_eq!(settings.fahrenheit_topic(), "/test/sensor/pool/fahrenheit");
    }

    #[tokio::test]
    async fn should_move_from_idle_to_reading() {
        let mut poll = PollLoop::new(
            ScriptedSensor::new(Vec::new()),
            RecordingPublisher::default(),
            settings(RunMode::Once),
        );
        let next = poll.step(PollState::Idle).await.unwrap();
        assert_eq!(next, PollState::Reading);
    }

    #[tokio::test]
    async fn should_stay_in_reading_on_sensor_failure() {
        let mut poll = PollLoop::new(
            ScriptedSensor::new(vec![Err(sensor_error())]),
            RecordingPublisher::default(),
            settings(RunMode::Once),
        );
        let next = poll.step(PollState::Reading).await.unwrap();
        assert_eq!(next, PollState::Reading);
        assert_eq!(poll.sensor.reads, 1);
    }

    #[tokio::test]
    async fn should_stay_in_reading_on_short_sample() {
        let mut poll = PollLoop::new(
            ScriptedSensor::new(vec![Ok(vec![0x01])]),
            RecordingPublisher::default(),
            settings(RunMode::Once),
        );
        let next = poll.step(PollState::Reading).await.unwrap();
        assert_eq!(next, PollState::Reading);
    }

    #[tokio::test]
    async fn should_report_short_sample_as_decode_error() {
        let mut poll = PollLoop::new(
            ScriptedSensor::new(vec![Ok(vec![0x01])]),
            RecordingPublisher::default(),
            settings(RunMode::Once),
        );
        let err = poll.read().await.unwrap_err();
        assert!(matches!(
            err,
            BridgeError::Decode(DecodeError::TooShort {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[tokio::test]
    async fn should_move_to_publishing_with_sample() {
        let mut poll = PollLoop::new(
            ScriptedSensor::new(vec![Ok(vec![0x9C, 0xFF, 0x00])]),
            RecordingPublisher::default(),
            settings(RunMode::Once),
        );
        let next = poll.step(PollState::Reading).await.unwrap();
        assert_eq!(next, PollState::Publishing(Sample::new(0x9C, 0xFF)));
    }

    #[tokio::test]
    async fn should_publish_celsius_payload() {
        let publisher = RecordingPublisher::default();
        let mut poll = PollLoop::new(
            ScriptedSensor::new(Vec::new()),
            publisher.clone(),
            settings(RunMode::Once),
        );
        let next = poll
            .step(PollState::Publishing(Sample::new(0x9C, 0xFF)))
            .await
            .unwrap();
        assert_eq!(next, PollState::Sleeping);
        assert_eq!(poll.cycles(), 1);

        let sent = publisher.sent.lock().unwrap();
        assert_eq!(
            *sent,
            vec![("/test/sensor/pool/celsius".to_owned(), "-1.0".to_owned())]
        );
    }

    #[tokio::test]
    async fn should_publish_fahrenheit_when_enabled() {
        let publisher = RecordingPublisher::default();
        let mut settings = settings(RunMode::Once);
        settings.publish_fahrenheit = true;
        let mut poll = PollLoop::new(ScriptedSensor::new(Vec::new()), publisher.clone(), settings);

        poll.step(PollState::Publishing(Sample::new(0x00, 0x00)))
            .await
            .unwrap();

        let sent = publisher.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].0, "/test/sensor/pool/fahrenheit");
        assert_eq!(sent[1].1, "32.0");
    }

    #[tokio::test]
    async fn should_continue_after_publish_failure() {
        let publisher = RecordingPublisher {
            fail_publish: true,
            ..RecordingPublisher::default()
        };
        let mut poll = PollLoop::new(
            ScriptedSensor::new(Vec::new()),
            publisher,
            settings(RunMode::Once),
        );
        let next = poll
            .step(PollState::Publishing(Sample::new(0x64, 0x00)))
            .await
            .unwrap();
        assert_eq!(next, PollState::Sleeping);
    }

    #[tokio::test]
    async fn should_disconnect_and_finish_in_one_shot_mode() {
        let publisher = RecordingPublisher::default();
        let mut poll = PollLoop::new(
            ScriptedSensor::new(Vec::new()),
            publisher.clone(),
            settings(RunMode::Once),
        );
        let next = poll.step(PollState::Sleeping).await.unwrap();
        assert_eq!(next, PollState::Done);
        assert_eq!(*publisher.disconnects.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn should_sleep_and_return_to_idle_in_daemon_mode() {
        let publisher = RecordingPublisher::default();
        let mut poll = PollLoop::new(
            ScriptedSensor::new(Vec::new()),
            publisher.clone(),
            settings(RunMode::Daemon {
                interval: Duration::from_millis(1),
            }),
        );
        let next = poll.step(PollState::Sleeping).await.unwrap();
        assert_eq!(next, PollState::Idle);
        assert_eq!(*publisher.disconnects.lock().unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn should_sleep_for_the_configured_interval() {
        let interval = Duration::from_secs(3600);
        let mut poll = PollLoop::new(
            ScriptedSensor::new(Vec::new()),
            RecordingPublisher::default(),
            settings(RunMode::Daemon { interval }),
        );

        let early = tokio::time::timeout(
            interval - Duration::from_secs(1),
            poll.step(PollState::Sleeping),
        )
        .await;
        assert!(early.is_err(), "woke up before the interval elapsed");

        let start = tokio::time::Instant::now();
        let next = poll.step(PollState::Sleeping).await.unwrap();
        assert_eq!(next, PollState::Idle);
        assert!(start.elapsed() >= interval);
    }

    #[tokio::test]
    async fn should_stay_done() {
        let mut poll = PollLoop::new(
            ScriptedSensor::new(Vec::new()),
            RecordingPublisher::default(),
            settings(RunMode::Once),
        );
        assert_eq!(poll.step(PollState::Done).await.unwrap(), PollState::Done);
    }

    #[tokio::test]
    async fn should_run_exactly_one_cycle_in_one_shot_mode() {
        let publisher = RecordingPublisher::default();
        let mut poll = PollLoop::new(
            ScriptedSensor::new(vec![Ok(vec![0x64, 0x00])]),
            publisher.clone(),
            settings(RunMode::Once),
        );
        poll.run().await.unwrap();

        assert_eq!(poll.cycles(), 1);
        assert_eq!(poll.sensor.reads, 1);
        assert_eq!(publisher.sent.lock().unwrap().len(), 1);
        assert_eq!(*publisher.disconnects.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn should_retry_reads_until_success() {
        let publisher = RecordingPublisher::default();
        let mut poll = PollLoop::new(
            ScriptedSensor::new(vec![
                Err(sensor_error()),
                Err(sensor_error()),
                Ok(vec![0x29, 0x09]),
            ]),
            publisher.clone(),
            settings(RunMode::Once),
        );
        poll.run().await.unwrap();

        assert_eq!(poll.sensor.reads, 3);
        assert_eq!(
            publisher.sent.lock().unwrap()[0],
            ("/test/sensor/pool/celsius".to_owned(), "23.45".to_owned())
        );
    }
}
