use std::time::Duration;

use anyhow::{Error, anyhow};
use chrono::Utc;
use cucumber::{gherkin::Step, given};
use http::StatusCode;
use swcache::NavigationPolicy;
use swcache_configuration::Settings;

use crate::world::SwWorld;

// =============================================================================
// Worker Configuration Steps
// =============================================================================

#[given(expr = "the worker is configured with")]
fn configured_with(world: &mut SwWorld, step: &Step) -> Result<(), Error> {
    let yaml = step
        .docstring
        .as_deref()
        .ok_or_else(|| anyhow!("configuration step requires a docstring"))?;
    let (config, store) = Settings::from_yaml(yaml)?.into_parts()?;
    world.config = config;
    world.store = store;
    Ok(())
}

#[given(expr = "workers wait for open clients to close")]
fn workers_wait(world: &mut SwWorld) -> Result<(), Error> {
    world.config.skip_waiting = false;
    Ok(())
}

#[given(expr = "the navigation policy is {string}")]
fn navigation_policy(world: &mut SwWorld, policy: String) -> Result<(), Error> {
    world.config.navigation = match policy.as_str() {
        "network_first" => NavigationPolicy::NetworkFirst,
        "shell_cache_first" => NavigationPolicy::ShellCacheFirst,
        _ => return Err(anyhow!("Unknown navigation policy: {}", policy)),
    };
    Ok(())
}

#[given(expr = "the freshness window is {int} seconds")]
fn freshness_window(world: &mut SwWorld, seconds: u64) -> Result<(), Error> {
    world.config.freshness_window = Duration::from_secs(seconds);
    Ok(())
}

// =============================================================================
// Network Steps
// =============================================================================

#[given(expr = "the network serves the static assets")]
fn serves_static_assets(world: &mut SwWorld) -> Result<(), Error> {
    world.serve_static_assets();
    Ok(())
}

#[given(expr = "the network answers {string} with {int} {string}")]
fn network_answers(
    world: &mut SwWorld,
    target: String,
    status: u16,
    body: String,
) -> Result<(), Error> {
    let status = StatusCode::from_u16(status)?;
    world.network.respond(&SwWorld::url(&target), status, body);
    Ok(())
}

#[given(expr = "the network cannot reach {string}")]
fn network_fails(world: &mut SwWorld, target: String) -> Result<(), Error> {
    world.network.fail(&SwWorld::url(&target));
    Ok(())
}

#[given(expr = "the network is offline")]
fn network_offline(world: &mut SwWorld) -> Result<(), Error> {
    world.network.set_offline(true);
    Ok(())
}

// =============================================================================
// Lifecycle Steps
// =============================================================================

#[given(expr = "worker version {int} is active")]
async fn worker_active(world: &mut SwWorld, version: u32) -> Result<(), Error> {
    world.serve_static_assets();
    world.register(version).await;
    match &world.registered {
        Some(Ok(_)) => {}
        Some(Err(error)) => return Err(anyhow!("registration failed: {}", error)),
        None => return Err(anyhow!("registration did not run")),
    }
    let active = world
        .registration
        .controller()
        .await
        .ok_or_else(|| anyhow!("worker version {} is not active", version))?;
    if active.config().version != version {
        return Err(anyhow!(
            "Expected worker version {} to be active, found version {}",
            version,
            active.config().version
        ));
    }
    world.network.reset_calls();
    Ok(())
}

// =============================================================================
// Cache State Steps
// =============================================================================

#[given(expr = "the generation {string} holds {string} with body {string}")]
async fn generation_holds(
    world: &mut SwWorld,
    generation: String,
    target: String,
    body: String,
) -> Result<(), Error> {
    world.seed(&generation, &target, &body, None).await
}

#[given(expr = "the generation {string} holds {string} with body {string} dated {int} minutes ago")]
async fn generation_holds_dated(
    world: &mut SwWorld,
    generation: String,
    target: String,
    body: String,
    minutes: i64,
) -> Result<(), Error> {
    let date = Utc::now() - chrono::Duration::minutes(minutes);
    world.seed(&generation, &target, &body, Some(date)).await
}

#[given(expr = "the generation {string} exists")]
async fn generation_exists(world: &mut SwWorld, generation: String) -> Result<(), Error> {
    world
        .store
        .open(&swcache_core::GenerationName::new(generation))
        .await?;
    Ok(())
}
