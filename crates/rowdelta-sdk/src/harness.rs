use rowdelta_observe::{
    Conversion, Observer, ObserverConfig, SnapshotProvider, TypedObserver,
};
use rowdelta_types::DataSet;
use rowdelta_verify::ErrorLog;
use tracing::debug;

use crate::config::HarnessConfig;
use crate::error::SdkResult;

/// Builds observers that share one configured error log.
#[derive(Clone, Debug, Default)]
pub struct Harness {
    config: HarnessConfig,
    log: Option<ErrorLog>,
}

impl Harness {
    /// Open the configured log (if any) once; every observer built by this
    /// harness writes to it.
    pub fn new(config: HarnessConfig) -> SdkResult<Self> {
        let log = config.build_log()?;
        debug!(logging = log.is_some(), "harness created");
        Ok(Self { config, log })
    }

    /// Use `log` regardless of what the config says.
    pub fn with_error_log(mut self, log: ErrorLog) -> Self {
        self.log = Some(log);
        self
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn error_log(&self) -> Option<&ErrorLog> {
        self.log.as_ref()
    }

    fn observer_config(&self) -> ObserverConfig {
        ObserverConfig {
            error_log: self.log.clone(),
        }
    }

    pub fn observe<S: SnapshotProvider>(&self, source: S) -> SdkResult<Observer<S>> {
        Ok(Observer::with_config(source, self.observer_config())?)
    }

    pub fn observe_with<S: SnapshotProvider>(
        &self,
        source: S,
        initial: &DataSet,
    ) -> SdkResult<Observer<S>> {
        Ok(Observer::with_baseline_and_config(
            source,
            initial,
            self.observer_config(),
        )?)
    }

    pub fn observe_typed<T, S: SnapshotProvider>(
        &self,
        source: S,
        conversion: Conversion<T>,
    ) -> SdkResult<TypedObserver<T, S>> {
        Ok(TypedObserver::with_config(
            source,
            conversion,
            self.observer_config(),
        )?)
    }
}
