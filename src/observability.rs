use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("streak.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("streak.client.request_errors");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("streak.client.request_duration_seconds");

pub(crate) static FETCH_MISSING_CREDENTIAL: Counter =
    Counter::new("streak.fetch.missing_credential");
pub(crate) static FETCH_SUCCESS: Counter = Counter::new("streak.fetch.success");
pub(crate) static FETCH_NETWORK_ERRORS: Counter = Counter::new("streak.fetch.network_errors");
pub(crate) static FETCH_UNEXPECTED_ERRORS: Counter =
    Counter::new("streak.fetch.unexpected_errors");
pub(crate) static FETCH_RETRIES: Counter = Counter::new("streak.fetch.retries");

pub(crate) static REVEAL_CHUNKS: Counter = Counter::new("streak.reveal.chunks");

pub(crate) static SESSION_TURNS: Counter = Counter::new("streak.session.turns");
pub(crate) static SESSION_CLEARS: Counter = Counter::new("streak.session.clears");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&FETCH_MISSING_CREDENTIAL);
    collector.register_counter(&FETCH_SUCCESS);
    collector.register_counter(&FETCH_NETWORK_ERRORS);
    collector.register_counter(&FETCH_UNEXPECTED_ERRORS);
    collector.register_counter(&FETCH_RETRIES);

    collector.register_counter(&REVEAL_CHUNKS);

    collector.register_counter(&SESSION_TURNS);
    collector.register_counter(&SESSION_CLEARS);
}
