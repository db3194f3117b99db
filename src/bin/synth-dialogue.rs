#[path = "synth-dialogue/app/mod.rs"]
mod app;
#[path = "synth-dialogue/args.rs"]
mod args;
#[path = "synth-dialogue/logging.rs"]
mod logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    app::run().await
}
