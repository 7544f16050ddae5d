use log::{error, info, LevelFilter};
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use patch_eval::archive::PatchArchive;
use patch_eval::classifier::LinearClassifier;
use patch_eval::config::EvalConfig;
use patch_eval::dataset::ImageFolder;
use patch_eval::evaluate::Evaluator;
use patch_eval::labels::{load_class_names, LabelMap};
use patch_eval::patch::ApplyPatch;
use patch_eval::util::{coverage, seeded_rng};
use patch_eval::Result;
use std::env;
use std::process;

fn init_logging() {
    let stderr = ConsoleAppender::builder()
        .target(log4rs::append::console::Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("{d(%H:%M:%S)} {l} {t} - {m}{n}")))
        .build();
    let level = env::var("PATCH_EVAL_LOG")
        .ok()
        .and_then(|l| l.parse().ok())
        .unwrap_or(LevelFilter::Info);
    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(level));
    if let Ok(config) = config {
        let _log_res = log4rs::init_config(config);
    }
}

fn run(config: &EvalConfig) -> Result<()> {
    let archive = PatchArchive::load(&config.archive_path)?;
    info!("archive of {} patches, targets {:?}", archive.len(), archive.targets());
    let (patch, target) = archive.select(config.patch_id)?;
    info!(
        "patch {} targets {} ({})",
        config.patch_id,
        target,
        archive.class_name(target).unwrap_or("unknown")
    );

    let patch_size = config.patch_size.unwrap_or(archive.info().patch_size);
    let applier = ApplyPatch::new(patch, target, config.transforms()?, patch_size)?;
    info!("{}, mask covers {:.1}% of the image", applier, 100. * coverage(applier.mask()));

    let label_map = LabelMap::new(config.label_table.clone());
    let dataset = ImageFolder::open(&config.dataset_path, config.preprocess, label_map.clone())?;
    if let Some(path) = &config.class_names_path {
        let names = load_class_names(path)?;
        for (idx, class) in dataset.classes().iter().enumerate() {
            let label = label_map.remap(idx);
            let name = names.get(&label).map_or("unnamed", String::as_str);
            info!("class {} ({}) -> label {} ({})", idx, class, label, name);
        }
    }
    let model = LinearClassifier::load(&config.model_path)?;
    info!("model with {} classes", model.num_classes());

    let mut rng = seeded_rng(config.seed);
    let shuffle_rng = if config.shuffle { Some(&mut rng) } else { None };
    let batches = dataset.batches(config.batch_size, shuffle_rng);
    let evaluator = Evaluator::new(applier, config.normalizer()?);
    let report = evaluator.evaluate(batches, &model, &mut rng)?;
    println!("{}", report);
    Ok(())
}

fn program_name(args: &[String]) -> &str {
    args.first().map_or("patch-eval", String::as_str)
}

fn main() {
    init_logging();
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("usage: {} <config.json>", program_name(&args));
        process::exit(2);
    }
    let result = EvalConfig::load(&args[1]).and_then(|config| run(&config));
    if let Err(err) = result {
        error!("{}", err);
        process::exit(1);
    }
}
