use std::path::{Path, PathBuf};

use anyhow::Context;
use futures::stream::{self, StreamExt};
use synth_dialogue::dialogue::SourceTranscript;
use synth_dialogue::records::{write_json, AnnotationGenerator, AnnotatorConfig};
use uuid::Uuid;

use super::agent::build_agent;
use super::display::print_events;
use super::{collect_inputs, summarize};
use crate::args::AnnotateArgs;

pub async fn run_annotate(args: AnnotateArgs) -> anyhow::Result<()> {
    let agent = build_agent(&args.model)?;
    let config = AnnotatorConfig::from_file(&args.annotator_config)
        .with_context(|| format!("annotator config {}", args.annotator_config.display()))?;
    let generator = AnnotationGenerator::new(config, agent);
    let inputs = collect_inputs(&args.conversations, ".json")?;
    let parallel = args.parallel.max(1);
    let live = !args.quiet && parallel == 1;
    log::info!("annotating {} conversation(s)", inputs.len());

    let generator = &generator;
    let output_dir = args.output_dir.as_path();
    let results: Vec<anyhow::Result<PathBuf>> = stream::iter(inputs)
        .map(|path| async move {
            annotate_one(&path, generator, output_dir, live)
                .await
                .with_context(|| format!("annotation of {}", path.display()))
        })
        .buffer_unordered(parallel)
        .collect()
        .await;

    summarize("annotation", results)
}

async fn annotate_one(
    conversation_path: &Path,
    generator: &AnnotationGenerator,
    output_dir: &Path,
    live: bool,
) -> anyhow::Result<PathBuf> {
    let source = SourceTranscript::from_file(conversation_path)?;
    let mut job = generator.produce_annotation(source);

    if live {
        let events = job.create_event_channel();
        let (result, ()) = tokio::join!(job.run(), print_events(events));
        result?;
    } else {
        job.run().await?;
    }

    let path = output_dir.join(format!("{}.json", Uuid::new_v4()));
    write_json(&path, &job.export())?;
    Ok(path)
}
