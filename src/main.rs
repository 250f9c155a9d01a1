/*

    Replay a scripted manipulation session without a renderer.

    Loads a session file, grabs one affordance with the first
    pointer sample and follows the remaining samples, logging
    the owner transform after every tick.

    Usage: manipulate <session>.json
    Verbosity is controlled with RUST_LOG, e.g. RUST_LOG=debug.

    @date: Nov, 2025
*/

use std::env;

use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use bounds_manipulator::bbox::AxisAlignedBox;
use bounds_manipulator::bounding_box::BoundingBoxManipulator;
use bounds_manipulator::config::load_session;
use bounds_manipulator::host::InMemoryHost;
use bounds_manipulator::manipulator::ManipulationTarget;
use bounds_manipulator::numeric::Vector3;
use bounds_manipulator::transform::Transform;

fn main() -> Result<(), Box<dyn std::error::Error>> {

    // Logging on console
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    fmt().with_env_filter(filter).with_target(false).init();

    // Parse args
    let args: Vec<String> = env::args().collect();
    let session_path: &String = if args.len() == 2 {
        &args[1]
    } else {
        error!("Usage: {} <session>.json", args[0]);
        std::process::exit(1);
    };

    info!("Loading session from {}...", session_path);
    let session = load_session(session_path).map_err(|e| {
        error!("Failed to load session: {}", e);
        e
    })?;

    let mut host = InMemoryHost::new(session.owner.to_transform());
    let bounds = session
        .local_bounds
        .unwrap_or_else(|| AxisAlignedBox::new(Vector3::NEG_ONE, Vector3::ONE));
    host.add_part(Transform::IDENTITY, bounds);

    let mut manipulator = BoundingBoxManipulator::new(session.config.clone());
    manipulator.begin_play(&mut host);
    debug!("Bounds: {:?}", manipulator.bounds());

    let Some(proxy) = manipulator.affordance_proxy(session.grab_affordance) else {
        manipulator.end_play(&mut host);
        return Err(format!(
            "Affordance {} has no proxy ({} affordances in use)",
            session.grab_affordance,
            manipulator.used_affordances().len()
        )
        .into());
    };

    let mut samples = session.samples.iter();
    let Some(first) = samples.next() else {
        warn!("Session has no pointer samples, nothing to do");
        manipulator.end_play(&mut host);
        return Ok(());
    };

    let affordance = &manipulator.used_affordances()[session.grab_affordance];
    info!("Grabbing {:?} affordance {} ({:?})", affordance.kind, session.grab_affordance, affordance.action);

    host.set_pointer_pose(session.pointer, first.to_transform());
    let events = host.grab_proxy(session.pointer, proxy, first.time);
    manipulator.handle_grab_events(&host, proxy, events);
    if !manipulator.is_grabbing() {
        warn!("Grab was not accepted");
    }

    for sample in samples {
        host.set_pointer_pose(session.pointer, sample.to_transform());
        match manipulator.tick(&mut host) {
            Some(update) if update.transform.is_some() => {
                let owner = host.world_transform();
                info!(
                    "t={:.3} translation={:?} rotation={:?} scale={:?}",
                    sample.time, owner.translation, owner.rotation, owner.scale
                );
            }
            Some(_) => warn!("t={:.3} bounds are degenerate, owner not moved", sample.time),
            None => debug!("t={:.3} not grabbing", sample.time),
        }
    }

    let events = host.release_proxy(session.pointer, proxy);
    manipulator.handle_grab_events(&host, proxy, events);
    manipulator.end_play(&mut host);

    info!("Final owner transform: {:?}", host.world_transform());
    Ok(())
}
