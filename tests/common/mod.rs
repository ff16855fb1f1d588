//! In-memory backend that records every call, for ordering and caching tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use sovits_client::{Error, ModelSlot, Result, TtsBackend, TtsRequest};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SetWeights(ModelSlot, String),
    Synthesize(TtsRequest),
}

pub struct RecordingBackend {
    calls: Mutex<Vec<Call>>,
    failing_weights: Mutex<HashSet<String>>,
    weights_delay: Mutex<Option<Duration>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    audio: Bytes,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::with_audio(Bytes::from_static(b"RIFF\x24\x00\x00\x00WAVEfmt "))
    }

    pub fn with_audio(audio: Bytes) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failing_weights: Mutex::new(HashSet::new()),
            weights_delay: Mutex::new(None),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            audio,
        }
    }

    /// Make every `set_weights` call for this id fail.
    pub fn fail_weights(&self, weights_id: &str) {
        self.failing_weights
            .lock()
            .unwrap()
            .insert(weights_id.to_string());
    }

    pub fn heal_weights(&self, weights_id: &str) {
        self.failing_weights.lock().unwrap().remove(weights_id);
    }

    pub fn set_weights_delay(&self, delay: Duration) {
        *self.weights_delay.lock().unwrap() = Some(delay);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn weight_calls(&self) -> Vec<(ModelSlot, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::SetWeights(slot, id) => Some((slot, id)),
                Call::Synthesize(_) => None,
            })
            .collect()
    }

    pub fn synth_requests(&self) -> Vec<TtsRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Synthesize(r) => Some(r),
                Call::SetWeights(..) => None,
            })
            .collect()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TtsBackend for RecordingBackend {
    async fn set_weights(&self, slot: ModelSlot, weights_id: &str) -> Result<()> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.calls
            .lock()
            .unwrap()
            .push(Call::SetWeights(slot, weights_id.to_string()));

        let delay = *self.weights_delay.lock().unwrap();
        if let Some(d) = delay {
            tokio::time::sleep(d).await;
        }
        let fails = self.failing_weights.lock().unwrap().contains(weights_id);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if fails {
            Err(Error::switch(slot, format!("weights not found: {}", weights_id)))
        } else {
            Ok(())
        }
    }

    async fn synthesize(&self, request: &TtsRequest) -> Result<Bytes> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Synthesize(request.clone()));
        Ok(self.audio.clone())
    }
}
