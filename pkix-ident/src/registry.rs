use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;

use crate::Error;

/// What a registry does when an entry collides with one already present.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DuplicatePolicy {
	/// Keep the existing entry and report [`Registration::IgnoredDuplicate`].
	#[default]
	Ignore,
	/// Fail with [`Error::DuplicateRegistration`].
	Reject,
}

impl DuplicatePolicy {
	/// Apply the policy to a detected collision described by `what`.
	pub(crate) fn on_duplicate(self, what: String) -> Result<Registration, Error> {
		match self {
			DuplicatePolicy::Ignore => {
				tracing::warn!(entry = %what, "ignoring duplicate registration");
				Ok(Registration::IgnoredDuplicate)
			},
			DuplicatePolicy::Reject => Err(Error::DuplicateRegistration(what)),
		}
	}
}

/// Outcome of a successful call to a registry's `register` operation
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Registration {
	/// The entry was appended
	Added,
	/// The entry collided and was dropped under [`DuplicatePolicy::Ignore`]
	IgnoredDuplicate,
}

/// A registry that still accepts registrations after it has been shared.
///
/// Readers take an immutable snapshot with [`SharedRegistry::load`]. Writers
/// are serialized by a mutex; each write clones the current snapshot, applies
/// the registration to the clone and publishes it with a single atomic store,
/// so a reader sees either the old or the new registry and never a partial one.
pub struct SharedRegistry<R> {
	current: ArcSwap<R>,
	writer: Mutex<()>,
}

impl<R: Clone> SharedRegistry<R> {
	/// Share an already built registry
	pub fn new(registry: R) -> Self {
		Self {
			current: ArcSwap::from_pointee(registry),
			writer: Mutex::new(()),
		}
	}

	/// The currently published snapshot
	pub fn load(&self) -> Arc<R> {
		self.current.load_full()
	}

	/// Apply `update` to a copy of the current snapshot and publish the copy.
	///
	/// Nothing is published when `update` fails.
	pub fn update<T>(&self, update: impl FnOnce(&mut R) -> Result<T, Error>) -> Result<T, Error> {
		// A poisoned lock only means another writer panicked before storing;
		// the published snapshot is still consistent.
		let _guard = self
			.writer
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner());
		let mut next = R::clone(&self.current.load());
		let out = update(&mut next)?;
		self.current.store(Arc::new(next));
		Ok(out)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn ignore_policy_reports_the_duplicate() {
		assert_eq!(
			DuplicatePolicy::Ignore.on_duplicate("x".to_string()),
			Ok(Registration::IgnoredDuplicate)
		);
		assert_eq!(
			DuplicatePolicy::Reject.on_duplicate("x".to_string()),
			Err(Error::DuplicateRegistration("x".to_string()))
		);
		assert_eq!(DuplicatePolicy::default(), DuplicatePolicy::Ignore);
	}

	#[test]
	fn update_publishes_a_new_snapshot() {
		let shared = SharedRegistry::new(vec![1u32]);
		let before = shared.load();
		shared
			.update(|v| {
				v.push(2);
				Ok(())
			})
			.unwrap();
		assert_eq!(*before, vec![1]);
		assert_eq!(*shared.load(), vec![1, 2]);
	}

	#[test]
	fn failed_update_publishes_nothing() {
		let shared = SharedRegistry::new(vec![1u32]);
		let res = shared.update(|v| {
			v.push(2);
			Err::<(), _>(Error::DuplicateRegistration("2".to_string()))
		});
		assert!(res.is_err());
		assert_eq!(*shared.load(), vec![1]);
	}

	#[test]
	fn concurrent_writers_are_serialized() {
		let shared = Arc::new(SharedRegistry::new(Vec::<u32>::new()));
		let handles = (0..8)
			.map(|i| {
				let shared = shared.clone();
				std::thread::spawn(move || {
					for j in 0..50 {
						shared
							.update(|v| {
								v.push(i * 100 + j);
								Ok(())
							})
							.unwrap();
					}
				})
			})
			.collect::<Vec<_>>();
		for handle in handles {
			handle.join().unwrap();
		}
		assert_eq!(shared.load().len(), 8 * 50);
	}
}
