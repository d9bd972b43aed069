use std::future::Future;

use super::{
    select_adapter, AdapterHandle, AdapterSelection, BackendPreference, DeviceRequest,
    NegotiationError,
};

/// Standing callback for GPU errors raised outside any explicit request.
///
/// Invoked on the backend's schedule; it must only log.
pub type ErrorSink = Box<dyn Fn(&str) + Send + Sync + 'static>;

/// Instance-level operations the negotiator drives.
///
/// Every request is one-shot: it resolves exactly once with a result or an error.
pub trait GpuBackend {
    type Adapter: AdapterHandle;
    type Device;

    /// Lists adapters, restricted to `backend` when given. May be empty.
    fn enumerate_adapters(
        &self,
        backend: Option<super::BackendKind>,
    ) -> impl Future<Output = Vec<Self::Adapter>>;

    /// Asks for a single best-match adapter.
    fn request_adapter(
        &self,
        request: &DeviceRequest,
    ) -> impl Future<Output = Result<Self::Adapter, NegotiationError>>;

    /// Turns an adapter into a device.
    fn request_device(
        &self,
        adapter: &Self::Adapter,
        request: &DeviceRequest,
    ) -> impl Future<Output = Result<Self::Device, NegotiationError>>;

    fn install_error_sink(&self, device: &Self::Device, sink: ErrorSink);
}

/// Adapter and device produced by a successful negotiation.
pub struct Negotiated<B: GpuBackend> {
    pub adapter: B::Adapter,
    pub device: B::Device,
}

/// Runs adapter selection then the device request, in that order.
///
/// Nothing device-related is constructed until an adapter exists, and the
/// error sink is installed before the device is handed back.
pub async fn negotiate<B: GpuBackend>(
    backend: &B,
    request: &DeviceRequest,
) -> Result<Negotiated<B>, NegotiationError> {
    let adapter = match request.selection {
        AdapterSelection::Enumerate => {
            let adapters = backend.enumerate_adapters(request.preference.backend).await;
            log::debug!("enumerated {} adapter(s)", adapters.len());
            select_adapter(adapters, &request.preference)
                .ok_or_else(|| NegotiationError::NoAdapter(describe(&request.preference)))?
        }
        AdapterSelection::Request => backend.request_adapter(request).await?,
    };

    let profile = adapter.profile();
    log::info!(
        "selected adapter '{}' ({:?}, {:?})",
        profile.name,
        profile.backend,
        profile.device_class
    );

    let device = backend.request_device(&adapter, request).await?;
    backend.install_error_sink(&device, Box::new(log_uncaptured));

    Ok(Negotiated { adapter, device })
}

/// Blocks the calling thread until negotiation resolves.
pub fn negotiate_blocking<B: GpuBackend>(
    backend: &B,
    request: &DeviceRequest,
) -> Result<Negotiated<B>, NegotiationError> {
    pollster::block_on(negotiate(backend, request))
}

/// Continuation style: `then` runs only after the device request succeeded.
pub fn negotiate_then<B, T, E, F>(backend: &B, request: &DeviceRequest, then: F) -> Result<T, E>
where
    B: GpuBackend,
    E: From<NegotiationError>,
    F: FnOnce(Negotiated<B>) -> Result<T, E>,
{
    let negotiated = negotiate_blocking(backend, request)?;
    then(negotiated)
}

fn log_uncaptured(message: &str) {
    log::error!("uncaptured device error: {message}");
}

fn describe(preference: &BackendPreference) -> String {
    let backend = preference
        .backend
        .map_or_else(|| "any backend".to_string(), |b| format!("{b:?}"));
    let class = preference
        .device_class
        .map_or_else(|| "any device class".to_string(), |c| format!("{c:?}"));
    format!("{backend} / {class}")
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::device::{AdapterProfile, BackendKind, DeviceClass};

    #[derive(Clone)]
    struct FakeAdapter(BackendKind, DeviceClass);

    impl AdapterHandle for FakeAdapter {
        fn profile(&self) -> AdapterProfile {
            AdapterProfile { name: "fake".into(), backend: Some(self.0), device_class: self.1 }
        }
    }

    #[derive(Default)]
    struct FakeBackend {
        adapters: Vec<FakeAdapter>,
        fail_device: bool,
        calls: RefCell<Vec<&'static str>>,
    }

    impl GpuBackend for FakeBackend {
        type Adapter = FakeAdapter;
        type Device = ();

        async fn enumerate_adapters(&self, _backend: Option<BackendKind>) -> Vec<FakeAdapter> {
            self.calls.borrow_mut().push("enumerate");
            self.adapters.clone()
        }

        async fn request_adapter(
            &self,
            _request: &DeviceRequest,
        ) -> Result<FakeAdapter, NegotiationError> {
            self.calls.borrow_mut().push("request_adapter");
            self.adapters
                .first()
                .cloned()
                .ok_or_else(|| NegotiationError::Adapter("nothing available".into()))
        }

        async fn request_device(
            &self,
            _adapter: &FakeAdapter,
            _request: &DeviceRequest,
        ) -> Result<(), NegotiationError> {
            self.calls.borrow_mut().push("request_device");
            if self.fail_device {
                Err(NegotiationError::Device("device lost during creation".into()))
            } else {
                Ok(())
            }
        }

        fn install_error_sink(&self, _device: &(), _sink: ErrorSink) {
            self.calls.borrow_mut().push("error_sink");
        }
    }

    fn vulkan_dgpu() -> FakeAdapter {
        FakeAdapter(BackendKind::Vulkan, DeviceClass::Discrete)
    }

    #[test]
    fn success_installs_sink_after_device() {
        let backend = FakeBackend { adapters: vec![vulkan_dgpu()], ..Default::default() };
        let negotiated = negotiate_blocking(&backend, &DeviceRequest::default());
        assert!(negotiated.is_ok());
        assert_eq!(*backend.calls.borrow(), ["enumerate", "request_device", "error_sink"]);
    }

    #[test]
    fn unmatched_preference_fails_before_device_request() {
        let backend = FakeBackend { adapters: vec![vulkan_dgpu()], ..Default::default() };
        let mut request = DeviceRequest::default();
        request.preference.backend = Some(BackendKind::Metal);

        let err = negotiate_blocking(&backend, &request).err();
        assert!(matches!(err, Some(NegotiationError::NoAdapter(_))));
        assert_eq!(*backend.calls.borrow(), ["enumerate"]);
    }

    #[test]
    fn device_failure_skips_continuation() {
        let backend = FakeBackend {
            adapters: vec![vulkan_dgpu()],
            fail_device: true,
            ..Default::default()
        };
        let mut built = false;

        let result: Result<(), NegotiationError> =
            negotiate_then(&backend, &DeviceRequest::default(), |_| {
                built = true;
                Ok(())
            });

        assert!(matches!(result, Err(NegotiationError::Device(_))));
        assert!(!built);
        assert!(!backend.calls.borrow().contains(&"error_sink"));
    }

    #[test]
    fn request_strategy_bypasses_enumeration() {
        let backend = FakeBackend { adapters: vec![vulkan_dgpu()], ..Default::default() };
        let request = DeviceRequest { selection: AdapterSelection::Request, ..Default::default() };

        assert!(negotiate_blocking(&backend, &request).is_ok());
        assert_eq!(*backend.calls.borrow(), ["request_adapter", "request_device", "error_sink"]);
    }

    #[test]
    fn adapter_request_failure_is_reported() {
        let backend = FakeBackend::default();
        let request = DeviceRequest { selection: AdapterSelection::Request, ..Default::default() };

        let err = negotiate_blocking(&backend, &request).err();
        assert!(matches!(err, Some(NegotiationError::Adapter(_))));
    }
}
