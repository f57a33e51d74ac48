//! Priority-ordered selection among resolver plugins.

use tracing::debug;

use crate::config::TestConfig;
use crate::descriptor::ManifestDescriptor;
use crate::error::{ManifestError, Result};
use crate::factory::ManifestFactory;

#[cfg(test)]
mod tests;

/// Runs registered [`ManifestFactory`]s from highest to lowest priority.
///
/// The first one that does not report itself unsuitable produces the
/// descriptor. Ties keep registration order.
#[derive(Default)]
pub struct ManifestResolver {
	factories: Vec<Box<dyn ManifestFactory>>,
}

impl ManifestResolver {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with(mut self, factory: impl ManifestFactory + 'static) -> Self {
		self.register(factory);
		self
	}

	pub fn register(&mut self, factory: impl ManifestFactory + 'static) {
		let factory: Box<dyn ManifestFactory> = Box::new(factory);
		let priority = factory.priority();
		let at = self.factories.partition_point(|f| f.priority() >= priority);
		self.factories.insert(at, factory);
	}

	/// Factory names in the order they will be tried.
	pub fn order(&self) -> Vec<&'static str> {
		self.factories.iter().map(|f| f.name()).collect()
	}

	pub fn resolve(&self, config: &TestConfig) -> Result<ManifestDescriptor> {
		let mut tried = Vec::with_capacity(self.factories.len());
		for factory in &self.factories {
			tried.push(factory.name());
			match factory.identify(config) {
				Err(err) if err.is_unsuitable() => {
					debug!("manifest resolver {} unsuitable, trying next", factory.name());
				}
				result => return result,
			}
		}
		Err(ManifestError::NoSuitableResolver { tried })
	}
}
