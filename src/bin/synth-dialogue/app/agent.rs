use std::sync::Arc;

use synth_dialogue::backends::ChatCompletionsAgent;
use synth_dialogue::GeneratingAgent;

use crate::args::ModelArgs;

pub fn build_agent(args: &ModelArgs) -> anyhow::Result<Arc<dyn GeneratingAgent>> {
    let mut builder = ChatCompletionsAgent::builder(&args.base_url, &args.model)
        .max_tokens(args.max_tokens)
        .seed(Some(args.seed))
        .remove_strings(args.remove_strings.clone());
    if let Some(key) = &args.api_key {
        builder = builder.api_key(key.as_str());
    }
    if let Some(temperature) = args.temperature {
        builder = builder.temperature(temperature);
    }
    if let Some(timeout) = args.timeout_secs {
        builder = builder.timeout_seconds(timeout);
    }
    log::info!("using model {} at {}", args.model, args.base_url);
    Ok(Arc::new(builder.build()?))
}
