//! Factory turning data source configuration into bound sources.
//!
//! The `DataSourceFactory` resolves a configured `loader` name to:
//! - a source registered by the caller (real data readers live outside
//!   this crate and hand over a [`PointSource`](crate::PointSource)), or
//! - one of the built-in synthetic generators.
//!
//! # Example
//!
//! ```rust,ignore
//! use mesh_generation::{DataSourceFactory, MeshBuilder, PointSource};
//!
//! let mut factory = DataSourceFactory::new();
//! factory.register("sea_ice", Arc::new(PointSource::scalar("sea_ice", "SIC", samples)?));
//!
//! let mesh = MeshBuilder::with_factory(config, factory)?.build_environmental_mesh()?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use mesh_common::{Boundary, MeshError, MeshResult};
use tracing::debug;

use crate::config::DataSourceConfig;
use crate::data_source::DataSource;
use crate::metadata::Metadata;

/// Resolves loader names to data sources.
#[derive(Default, Clone)]
pub struct DataSourceFactory {
    registered: HashMap<String, Arc<dyn DataSource>>,
}

impl DataSourceFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `source` available under `name`. Replaces any earlier source.
    pub fn register(&mut self, name: impl Into<String>, source: Arc<dyn DataSource>) {
        self.registered.insert(name.into(), source);
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.registered.contains_key(name)
    }

    /// Build the source named by `config` over `region`.
    pub fn create(
        &self,
        config: &DataSourceConfig,
        region: &Boundary,
    ) -> MeshResult<Arc<dyn DataSource>> {
        if let Some(source) = self.registered.get(&config.loader) {
            return Ok(Arc::clone(source));
        }

        match config.shape_pattern()? {
            Some(pattern) => {
                let source = pattern.generate(region, config.params.n, &config.params.data_name)?;
                debug!(
                    loader = %config.loader,
                    samples = source.sample_count(),
                    "Generated synthetic data source"
                );
                Ok(Arc::new(source))
            }
            None => Err(MeshError::UnknownDataSource(config.loader.clone())),
        }
    }

    /// Build the metadata binding for `config`.
    pub fn metadata(&self, config: &DataSourceConfig, region: &Boundary) -> MeshResult<Metadata> {
        let source = self.create(config, region)?;
        Ok(Metadata::new(source)
            .with_splitting_conditions(config.params.splitting_conditions.clone())
            .with_aggregation(config.params.aggregate_type)
            .with_fill_policy(config.params.value_fill_type))
    }
}

impl std::fmt::Debug for DataSourceFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.registered.keys().collect();
        names.sort();
        f.debug_struct("DataSourceFactory")
            .field("registered", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DataSourceParams;
    use crate::data_source::{PointSource, Sample};

    fn region() -> Boundary {
        Boundary::new([0.0, 10.0], [0.0, 10.0]).unwrap()
    }

    fn config(loader: &str) -> DataSourceConfig {
        DataSourceConfig {
            loader: loader.into(),
            params: DataSourceParams {
                n: 4,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_builtin_generator() {
        let factory = DataSourceFactory::new();
        let source = factory.create(&config("uniform"), &region()).unwrap();
        assert_eq!(source.name(), "uniform");
        assert_eq!(source.samples(&region()).len(), 16);
    }

    #[test]
    fn test_registered_source_takes_precedence() {
        let mut factory = DataSourceFactory::new();
        let points = PointSource::scalar("ice", "SIC", vec![Sample::scalar(1.0, 1.0, 0.7)]).unwrap();
        factory.register("uniform", Arc::new(points));
        let source = factory.create(&config("uniform"), &region()).unwrap();
        assert_eq!(source.name(), "ice");
    }

    #[test]
    fn test_unknown_loader() {
        let err = DataSourceFactory::new()
            .create(&config("era5_wind"), &region())
            .unwrap_err();
        assert!(matches!(err, MeshError::UnknownDataSource(ref name) if name == "era5_wind"));
    }
}
