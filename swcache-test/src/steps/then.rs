use anyhow::{Error, anyhow};
use cucumber::then;
use swcache::{CacheMode, ControlOutcome};

use crate::world::{Answer, SwWorld};

// =============================================================================
// Lifecycle Assertions
// =============================================================================

#[then(expr = "the registration ends {string}")]
fn registration_ends(world: &mut SwWorld, expected: String) -> Result<(), Error> {
    match &world.registered {
        Some(Ok(state)) if state.as_str() == expected => Ok(()),
        other => Err(anyhow!(
            "Expected registration to end {}, got {:?}",
            expected,
            other
        )),
    }
}

#[then(expr = "the registration fails with {string}")]
fn registration_fails(world: &mut SwWorld, message: String) -> Result<(), Error> {
    match &world.registered {
        Some(Err(error)) if error.contains(&message) => Ok(()),
        other => Err(anyhow!(
            "Expected registration to fail with {:?}, got {:?}",
            message,
            other
        )),
    }
}

#[then(expr = "worker version {int} controls the page")]
async fn controls_the_page(world: &mut SwWorld, version: u32) -> Result<(), Error> {
    let active = world
        .registration
        .controller()
        .await
        .ok_or_else(|| anyhow!("Expected worker version {} to be active, none is", version))?;
    if active.config().version != version {
        return Err(anyhow!(
            "Expected worker version {} to be active, found version {}",
            version,
            active.config().version
        ));
    }
    Ok(())
}

#[then(expr = "no worker controls the page")]
async fn no_controller(world: &mut SwWorld) -> Result<(), Error> {
    match world.registration.controller().await {
        None => Ok(()),
        Some(active) => Err(anyhow!(
            "Expected no active worker, found version {}",
            active.config().version
        )),
    }
}

#[then(expr = "worker version {int} is waiting")]
async fn is_waiting(world: &mut SwWorld, version: u32) -> Result<(), Error> {
    match world.registration.waiting().await {
        Some(waiting) if waiting.config().version == version => Ok(()),
        other => Err(anyhow!(
            "Expected worker version {} to be waiting, got {:?}",
            version,
            other.map(|worker| worker.config().version)
        )),
    }
}

#[then(expr = "no worker is waiting")]
async fn none_waiting(world: &mut SwWorld) -> Result<(), Error> {
    match world.registration.waiting().await {
        None => Ok(()),
        Some(waiting) => Err(anyhow!(
            "Expected no waiting worker, found version {}",
            waiting.config().version
        )),
    }
}

// =============================================================================
// Cache Assertions
// =============================================================================

#[then(expr = "the cache generations are {string}")]
async fn generations_are(world: &mut SwWorld, expected: String) -> Result<(), Error> {
    let mut expected: Vec<String> = expected
        .split(',')
        .map(|name| name.trim().to_owned())
        .filter(|name| !name.is_empty())
        .collect();
    expected.sort();
    let actual = world.generations().await?;
    if actual != expected {
        return Err(anyhow!(
            "Expected cache generations {:?}, found {:?}",
            expected,
            actual
        ));
    }
    Ok(())
}

#[then(expr = "no cache generation exists")]
async fn no_generations(world: &mut SwWorld) -> Result<(), Error> {
    let actual = world.generations().await?;
    if !actual.is_empty() {
        return Err(anyhow!("Expected no cache generation, found {:?}", actual));
    }
    Ok(())
}

#[then(expr = "the generation {string} holds {string} with body {string}")]
async fn generation_holds(
    world: &mut SwWorld,
    generation: String,
    target: String,
    body: String,
) -> Result<(), Error> {
    let entry = world
        .lookup(&generation, &target)
        .await?
        .ok_or_else(|| anyhow!("Expected {} to hold {}, it does not", generation, target))?;
    if entry.body().as_ref() != body.as_bytes() {
        return Err(anyhow!(
            "Expected cached body {:?}, found {:?}",
            body,
            String::from_utf8_lossy(entry.body())
        ));
    }
    Ok(())
}

#[then(expr = "the generation {string} does not hold {string}")]
async fn generation_lacks(
    world: &mut SwWorld,
    generation: String,
    target: String,
) -> Result<(), Error> {
    if world.lookup(&generation, &target).await?.is_some() {
        return Err(anyhow!(
            "Expected {} not to hold {}, it does",
            generation,
            target
        ));
    }
    Ok(())
}

// =============================================================================
// Response Assertions
// =============================================================================

#[then(expr = "the response status is {int}")]
fn response_status(world: &mut SwWorld, expected: u16) -> Result<(), Error> {
    let (status, ..) = world.response()?;
    if status.as_u16() != expected {
        return Err(anyhow!(
            "Expected response status {}, got {}",
            expected,
            status
        ));
    }
    Ok(())
}

#[then(expr = "the response body is {string}")]
fn response_body(world: &mut SwWorld, expected: String) -> Result<(), Error> {
    let (_, body, ..) = world.response()?;
    if body.as_ref() != expected.as_bytes() {
        return Err(anyhow!(
            "Expected response body {:?}, got {:?}",
            expected,
            String::from_utf8_lossy(body)
        ));
    }
    Ok(())
}

#[then(expr = "the cache status is {string}")]
fn cache_status(world: &mut SwWorld, expected: String) -> Result<(), Error> {
    let (_, _, cache_status, _) = world.response()?;
    if cache_status != Some(expected.as_str()) {
        return Err(anyhow!(
            "Expected cache status {}, got {:?}",
            expected,
            cache_status
        ));
    }
    Ok(())
}

#[then(expr = "the response comes from {string}")]
fn response_source(world: &mut SwWorld, expected: String) -> Result<(), Error> {
    let (.., source) = world.response()?;
    if source != expected {
        return Err(anyhow!(
            "Expected response from {}, got it from {}",
            expected,
            source
        ));
    }
    Ok(())
}

#[then(expr = "the request is not intercepted")]
fn not_intercepted(world: &mut SwWorld) -> Result<(), Error> {
    match world.answer()? {
        Answer::NotIntercepted => Ok(()),
        other => Err(anyhow!("Expected a pass-through, got {:?}", other)),
    }
}

#[then(expr = "the request fails with {string}")]
fn request_fails(world: &mut SwWorld, message: String) -> Result<(), Error> {
    match world.answer()? {
        Answer::Failed(error) if error.contains(&message) => Ok(()),
        other => Err(anyhow!(
            "Expected the request to fail with {:?}, got {:?}",
            message,
            other
        )),
    }
}

// =============================================================================
// Network Assertions
// =============================================================================

#[then(expr = "the network was called {int} time(s) for {string}")]
fn network_called(world: &mut SwWorld, expected: usize, target: String) -> Result<(), Error> {
    let actual = world.network.calls(&SwWorld::url(&target));
    if actual != expected {
        return Err(anyhow!(
            "Expected {} to be fetched {} time(s), but it was fetched {} time(s)",
            target,
            expected,
            actual
        ));
    }
    Ok(())
}

#[then(expr = "the network was not called for {string}")]
fn network_not_called(world: &mut SwWorld, target: String) -> Result<(), Error> {
    let actual = world.network.calls(&SwWorld::url(&target));
    if actual != 0 {
        return Err(anyhow!(
            "Expected {} not to be fetched, but it was fetched {} time(s)",
            target,
            actual
        ));
    }
    Ok(())
}

#[then(expr = "every fetch of {string} bypassed HTTP caches")]
fn fetches_bypassed(world: &mut SwWorld, target: String) -> Result<(), Error> {
    let modes = world.network.cache_modes(&SwWorld::url(&target));
    if modes.is_empty() || modes.iter().any(|mode| *mode != CacheMode::Reload) {
        return Err(anyhow!(
            "Expected every fetch of {} to reload, got {:?}",
            target,
            modes
        ));
    }
    Ok(())
}

// =============================================================================
// Control Channel Assertions
// =============================================================================

fn control(world: &SwWorld) -> Result<ControlOutcome, Error> {
    world
        .control
        .ok_or_else(|| anyhow!("no control message was posted in this scenario"))
}

#[then(expr = "the message is ignored")]
fn message_ignored(world: &mut SwWorld) -> Result<(), Error> {
    match control(world)? {
        ControlOutcome::Ignored => Ok(()),
        other => Err(anyhow!("Expected the message to be ignored, got {:?}", other)),
    }
}

#[then(expr = "the message activates the waiting worker")]
fn message_activates(world: &mut SwWorld) -> Result<(), Error> {
    match control(world)? {
        ControlOutcome::SkippedWaiting { activated: true } => Ok(()),
        other => Err(anyhow!(
            "Expected the message to activate a worker, got {:?}",
            other
        )),
    }
}

#[then(expr = "the message activates nothing")]
fn message_activates_nothing(world: &mut SwWorld) -> Result<(), Error> {
    match control(world)? {
        ControlOutcome::SkippedWaiting { activated: false } => Ok(()),
        other => Err(anyhow!(
            "Expected the message to find no waiting worker, got {:?}",
            other
        )),
    }
}

#[then(expr = "the message deletes {int} generation(s)")]
fn message_deletes(world: &mut SwWorld, expected: usize) -> Result<(), Error> {
    match control(world)? {
        ControlOutcome::CachesCleared { generations } if generations == expected => Ok(()),
        other => Err(anyhow!(
            "Expected the message to delete {} generation(s), got {:?}",
            expected,
            other
        )),
    }
}
