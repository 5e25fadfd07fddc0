use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use winit::event_loop::EventLoop;

use path_tracer::app::App;
use path_tracer::cli::Cli;

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let (scene, settings) = cli.load_scene()?;
    log::info!(
        "starting: {} spheres, {} spp, {} bounces, accumulation {}",
        scene.len(),
        settings.samples,
        settings.bounces,
        settings.accumulation.label()
    );

    let event_loop = EventLoop::new()?;
    let mut app = App::new(cli, scene, settings);
    event_loop.run_app(&mut app)?;

    match app.take_failure() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}
