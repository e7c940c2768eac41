//! Metric hooks; no-ops without the `metrics` feature.

#[cfg(feature = "metrics")]
mod enabled {
    use sc_telemetry::metrics::{FLOOD_DUPLICATES, FRAMES_RECEIVED, PEERS_CONNECTED};

    pub fn connection_opened() {
        PEERS_CONNECTED.inc();
    }

    pub fn connection_closed() {
        PEERS_CONNECTED.dec();
    }

    pub fn frame_received(name: &str) {
        FRAMES_RECEIVED.with_label_values(&[name]).inc();
    }

    pub fn flood_duplicate() {
        FLOOD_DUPLICATES.inc();
    }
}

#[cfg(not(feature = "metrics"))]
mod enabled {
    pub fn connection_opened() {}
    pub fn connection_closed() {}
    pub fn frame_received(_name: &str) {}
    pub fn flood_duplicate() {}
}

pub(crate) use enabled::*;
