// Copyright 2024 tison <wander4096@gmail.com>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Required metric names (§6 External interfaces).
pub const METRIC_KAFKA_PRODUCERS: &str = "kafka_producers";
pub const METRIC_KAFKA_CONSUMERS: &str = "kafka_consumers";
pub const METRIC_KAFKA_PRODUCED_MESSAGES: &str = "kafka_produced_messages";
pub const METRIC_KAFKA_CONSUMED_MESSAGES: &str = "kafka_consumed_messages";

pub trait Counter: Send + Sync {
    fn inc(&self);
    fn inc_by(&self, n: u64);
}

pub trait Gauge: Send + Sync {
    fn inc(&self);
    fn dec(&self);
    fn set(&self, v: i64);
}

/// Injected by the application; metrics emission itself is out of scope (§1 Non-goals), this is
/// only the seam the producer/consumer call into.
pub trait MetricsSink: Send + Sync {
    fn counter(&self, name: &'static str) -> Arc<dyn Counter>;
    fn gauge(&self, name: &'static str) -> Arc<dyn Gauge>;
}

/// Default sink: every call is a no-op. Used when the application does not inject its own.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetricsSink;

impl MetricsSink for NoopMetricsSink {
    fn counter(&self, _name: &'static str) -> Arc<dyn Counter> {
        Arc::new(AtomicCounter::default())
    }

    fn gauge(&self, _name: &'static str) -> Arc<dyn Gauge> {
        Arc::new(AtomicGauge::default())
    }
}

/// A plain in-process counter, also handy for tests that want to assert on call counts without
/// standing up a real metrics backend.
#[derive(Debug, Default)]
pub struct AtomicCounter(AtomicI64);

impl Counter for AtomicCounter {
    fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    fn inc_by(&self, n: u64) {
        self.0.fetch_add(n as i64, Ordering::Relaxed);
    }
}

impl AtomicCounter {
    pub fn get(&self) -> i64 {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Default)]
pub struct AtomicGauge(AtomicI64);

impl Gauge for AtomicGauge {
    fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    fn dec(&self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }

    fn set(&self, v: i64) {
        self.0.store(v, Ordering::Relaxed);
    }
}

impl AtomicGauge {
    pub fn get(&self) -> i64 {
        self.0.load(Ordering::Relaxed)
    }
}
