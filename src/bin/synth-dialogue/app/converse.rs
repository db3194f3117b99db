use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use futures::stream::{self, StreamExt};
use synth_dialogue::records::{write_json, ConversationConfig, ConversationGenerator};
use synth_dialogue::GeneratingAgent;

use super::agent::build_agent;
use super::display::print_events;
use super::{collect_inputs, summarize};
use crate::args::ConverseArgs;

pub async fn run_converse(args: ConverseArgs) -> anyhow::Result<()> {
    let agent = build_agent(&args.model)?;
    let inputs = collect_inputs(&args.input, ".json")?;
    let parallel = args.parallel.max(1);
    // Live output only when jobs run one at a time.
    let live = !args.quiet && parallel == 1;
    log::info!("running {} conversation(s), {parallel} at a time", inputs.len());

    let output_dir = args.output_dir.as_path();
    let results: Vec<anyhow::Result<PathBuf>> = stream::iter(inputs)
        .map(|path| {
            let agent = Arc::clone(&agent);
            async move {
                converse_one(&path, agent, output_dir, live)
                    .await
                    .with_context(|| format!("conversation from {}", path.display()))
            }
        })
        .buffer_unordered(parallel)
        .collect()
        .await;

    summarize("conversation", results)
}

async fn converse_one(
    config_path: &Path,
    agent: Arc<dyn GeneratingAgent>,
    output_dir: &Path,
    live: bool,
) -> anyhow::Result<PathBuf> {
    let config = ConversationConfig::from_file(config_path)?;
    let generator = ConversationGenerator::new(config, Arc::clone(&agent), Some(agent))?;
    let mut conversation = generator.produce_conversation()?;
    log::info!(
        "conversation {} from {}",
        conversation.id(),
        config_path.display()
    );

    if live {
        let events = conversation.create_event_channel();
        let (result, ()) = tokio::join!(conversation.run(), print_events(events));
        result?;
    } else {
        conversation.run().await?;
    }

    let path = output_dir.join(format!("{}.json", conversation.id()));
    write_json(&path, &conversation.export())?;
    Ok(path)
}
