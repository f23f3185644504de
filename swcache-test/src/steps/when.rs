use anyhow::Error;
use cucumber::when;

use crate::world::SwWorld;

#[when(expr = "worker version {int} is registered")]
async fn register_worker(world: &mut SwWorld, version: u32) -> Result<(), Error> {
    world.register(version).await;
    Ok(())
}

#[when(expr = "the page requests {string}")]
async fn page_requests(world: &mut SwWorld, target: String) -> Result<(), Error> {
    world.request(&target).await
}

#[when(expr = "the page requests {string} {int} times")]
async fn page_requests_times(
    world: &mut SwWorld,
    target: String,
    times: usize,
) -> Result<(), Error> {
    for _ in 0..times {
        world.request(&target).await?;
    }
    Ok(())
}

#[when(expr = "the page posts the message {string}")]
async fn page_posts(world: &mut SwWorld, payload: String) -> Result<(), Error> {
    let outcome = world.registration.post_message(payload.as_bytes()).await;
    world.control = Some(outcome);
    Ok(())
}

#[when(expr = "all clients are closed")]
async fn clients_closed(world: &mut SwWorld) -> Result<(), Error> {
    world.registration.clients_closed().await?;
    Ok(())
}

#[when(expr = "the network goes offline")]
fn goes_offline(world: &mut SwWorld) -> Result<(), Error> {
    world.network.set_offline(true);
    Ok(())
}

#[when(expr = "the network comes back")]
fn comes_back(world: &mut SwWorld) -> Result<(), Error> {
    world.network.set_offline(false);
    Ok(())
}
