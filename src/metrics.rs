//! OpenTelemetry counters for descriptor caching and compilation.
//!
//! Instruments are created against the global meter provider; install an
//! exporter in the application to collect them.

use once_cell::sync::Lazy;
use opentelemetry::{global, metrics::Counter};

pub static METRICS: Lazy<TagdalMetrics> = Lazy::new(TagdalMetrics::init);

pub struct TagdalMetrics {
    pub descriptor_hits: Counter<u64>,
    pub descriptor_builds: Counter<u64>,
    pub schema_failures: Counter<u64>,
    pub compile_failures: Counter<u64>,
    pub statements_total: Counter<u64>,
}

impl TagdalMetrics {
    pub fn init() -> Self {
        let meter = global::meter("tagdal");

        let descriptor_hits = meter
            .u64_counter("tagdal_descriptor_cache_hits_total")
            .with_description("Descriptor lookups served from the registry cache")
            .build();

        let descriptor_builds = meter
            .u64_counter("tagdal_descriptor_builds_total")
            .with_description("Descriptors parsed on first use of a type")
            .build();

        let schema_failures = meter
            .u64_counter("tagdal_schema_failures_total")
            .with_description("Types rejected by declaration checks")
            .build();

        let compile_failures = meter
            .u64_counter("tagdal_compile_failures_total")
            .with_description("Where/update values that failed to compile")
            .build();

        let statements_total = meter
            .u64_counter("tagdal_statements_total")
            .with_description("Statements handed to the executor")
            .build();

        Self {
            descriptor_hits,
            descriptor_builds,
            schema_failures,
            compile_failures,
            statements_total,
        }
    }

    pub fn record_lookup(&self, cached: bool) {
        if cached {
            self.descriptor_hits.add(1, &[]);
        } else {
            self.descriptor_builds.add(1, &[]);
        }
    }

    pub fn record_schema_failure(&self) {
        self.schema_failures.add(1, &[]);
    }

    pub fn record_compile_failure(&self) {
        self.compile_failures.add(1, &[]);
    }

    pub fn record_statement(&self) {
        self.statements_total.add(1, &[]);
    }
}
