use svghost_core::{Headless, Host, HostConfig};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let mut host = Host::bootstrap(HostConfig::default(), Headless::default())?;
    let frames = host.run()?;

    let frontend = host.frontend();
    tracing::info!(
        frames,
        path_updates = frontend.path_updates,
        path_len = frontend.path_data().map_or(0, str::len),
        "guest finished"
    );
    Ok(())
}
