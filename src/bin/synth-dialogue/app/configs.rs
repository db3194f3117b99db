use anyhow::Context;
use rand::rngs::StdRng;
use rand::SeedableRng;
use synth_dialogue::persona::Persona;
use synth_dialogue::records::{generate_datetime_filename, read_files_from_directory, read_text};
use synth_dialogue::synthesis::{generate_annotator_config, generate_conv_config, GenerationSettings};
use uuid::Uuid;

use crate::args::{AnnotatorConfigsArgs, ConvConfigsArgs};

fn load_personas(dir: &std::path::Path) -> anyhow::Result<Vec<Persona>> {
    read_files_from_directory(dir, ".json")?
        .iter()
        .map(|path| Persona::from_file(path).with_context(|| format!("persona {}", path.display())))
        .collect()
}

pub fn run_conv_configs(args: ConvConfigsArgs) -> anyhow::Result<()> {
    log::info!("reading input files");
    let personas = load_personas(&args.persona_dir)?;
    let topics = read_files_from_directory(&args.topics_dir, ".txt")?
        .iter()
        .map(|path| read_text(path))
        .collect::<Result<Vec<_>, _>>()?;
    let settings = GenerationSettings::from_file(&args.configs_path)?;
    let user_instructions = read_text(&args.user_instruction_path)?;
    let mod_instructions = read_text(&args.mod_instruction_path)?;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    for _ in 0..args.num_generated_files {
        let config = generate_conv_config(
            &personas,
            &topics,
            &user_instructions,
            &mod_instructions,
            &settings,
            args.num_users,
            !args.no_moderator,
            &mut rng,
        )?;
        config.to_json_file(args.output_dir.join(format!("{}.json", Uuid::new_v4())))?;
    }
    log::info!(
        "{} conversation configs written to {}",
        args.num_generated_files,
        args.output_dir.display()
    );
    Ok(())
}

pub fn run_annotator_configs(args: AnnotatorConfigsArgs) -> anyhow::Result<()> {
    let personas = load_personas(&args.persona_dir)?;
    let instructions = read_text(&args.instruction_path)?;
    let config = generate_annotator_config(&personas, &instructions, args.history_ctx_len);

    let path = generate_datetime_filename(Some(&args.output_dir), ".json");
    config.to_json_file(&path)?;
    log::info!("annotator config written to {}", path.display());
    Ok(())
}
