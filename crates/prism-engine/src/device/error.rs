/// Failure while turning a backend into a ready device.
#[derive(Debug, thiserror::Error)]
pub enum NegotiationError {
    /// Enumeration produced nothing that matches the preference.
    #[error("no adapter found matching {0}")]
    NoAdapter(String),

    /// The adapter request resolved with a failure status.
    #[error("could not get adapter: {0}")]
    Adapter(String),

    /// The device request resolved with a failure status.
    #[error("could not get device: {0}")]
    Device(String),
}
