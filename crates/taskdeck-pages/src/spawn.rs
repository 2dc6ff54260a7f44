//! Local task spawning
//!
//! In the browser futures run on the microtask queue via
//! `wasm_bindgen_futures`. Natively they run on a thread-local
//! [`LocalPool`](futures::executor::LocalPool) that tests drive explicitly
//! with [`run_until_stalled`].

use std::future::Future;
use std::time::Duration;

#[cfg(not(target_arch = "wasm32"))]
mod native {
	use std::cell::RefCell;

	use futures::executor::{LocalPool, LocalSpawner};

	thread_local! {
		pub(super) static EXECUTOR: (RefCell<LocalPool>, LocalSpawner) = {
			let pool = LocalPool::new();
			let spawner = pool.spawner();
			(RefCell::new(pool), spawner)
		};
	}
}

/// Spawns a `!Send` future on the current thread
#[cfg(target_arch = "wasm32")]
pub fn spawn_local<F>(future: F)
where
	F: Future<Output = ()> + 'static,
{
	wasm_bindgen_futures::spawn_local(future);
}

/// Spawns a `!Send` future on the current thread's pool
#[cfg(not(target_arch = "wasm32"))]
pub fn spawn_local<F>(future: F)
where
	F: Future<Output = ()> + 'static,
{
	use futures::task::LocalSpawnExt;

	native::EXECUTOR.with(|(_, spawner)| {
		if let Err(e) = spawner.spawn_local(future) {
			taskdeck_core::error_log!("Failed to spawn local task: {}", e);
		}
	});
}

/// Runs spawned tasks until none can make progress.
///
/// Calling this from inside a running task is a no-op.
#[cfg(not(target_arch = "wasm32"))]
pub fn run_until_stalled() {
	native::EXECUTOR.with(|(pool, _)| match pool.try_borrow_mut() {
		Ok(mut pool) => pool.run_until_stalled(),
		Err(_) => taskdeck_core::warn_log!("run_until_stalled called from inside a task"),
	});
}

/// Completes after `duration` in the browser; immediately on native targets
pub async fn sleep(duration: Duration) {
	#[cfg(target_arch = "wasm32")]
	gloo_timers::future::TimeoutFuture::new(duration.as_millis().min(u32::MAX as u128) as u32)
		.await;

	#[cfg(not(target_arch = "wasm32"))]
	let _ = duration;
}
