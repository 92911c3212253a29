//! SmartSort native entry point.
//!
//! Classifies folders of images and writes one `<label>.zip` per group.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;
    use std::process::ExitCode;
    use std::time::Duration;

    use clap::Parser;
    use web_time::Instant;

    use smartsort::classifier::{ClassifierLoader, FileModelLoader, ModelStatus};
    use smartsort::config::{AppConfig, LogLevel};
    use smartsort::export::FolderSink;
    use smartsort::geometry::{Rect, Region};
    use smartsort::input::{load_folder, load_paths};
    use smartsort::merge::MergeMode;
    use smartsort::{Message, SmartSortApp};

    #[derive(Parser, Debug)]
    #[command(
        author,
        version,
        about = "Sort images into groups with an image classifier and zip each group"
    )]
    struct Args {
        /// Folders or image files to classify as one batch
        #[arg(value_name = "PATH", required_unless_present = "plate", conflicts_with = "plate")]
        paths: Vec<PathBuf>,

        /// Stage a folder on the plate; all plate folders are merged into one batch
        #[arg(short, long, value_name = "FOLDER")]
        plate: Vec<PathBuf>,

        /// Folder the group archives are written to
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Model weights JSON
        #[arg(long, value_name = "FILE")]
        model: Option<String>,

        /// Model metadata JSON
        #[arg(long, value_name = "FILE")]
        metadata: Option<String>,

        /// Configuration file (defaults to the platform config dir)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Log level: error, warn, info, debug, trace
        #[arg(short, long)]
        log_level: Option<String>,

        /// Print the groups without writing archives
        #[arg(short = 'n', long, default_value_t = false)]
        dry_run: bool,

        /// Write the effective configuration back to the config file
        #[arg(long, default_value_t = false)]
        save_config: bool,
    }

    pub fn main() -> ExitCode {
        let args = Args::parse();
        match run(args) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                log::error!("{}", e);
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            }
        }
    }

    fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
        let config_path = args.config.clone().or_else(AppConfig::default_path);
        let mut config = AppConfig::load_or_default(config_path.as_deref());

        if let Some(level) = &args.log_level {
            config.preferences.log_level =
                LogLevel::from_name(level).ok_or_else(|| format!("unknown log level '{}'", level))?;
        }
        if let Some(model) = &args.model {
            config.model.model_url = model.clone();
        }
        if let Some(metadata) = &args.metadata {
            config.model.metadata_url = metadata.clone();
        }
        if let Some(output) = &args.output {
            config.preferences.export_folder = output.to_string_lossy().into_owned();
        }

        smartsort::logging::init(config.preferences.log_level);

        if args.save_config {
            if let Some(path) = &config_path {
                config.save_to(path)?;
            }
        }

        let export_folder = if config.preferences.export_folder.is_empty() {
            PathBuf::from(".")
        } else {
            PathBuf::from(&config.preferences.export_folder)
        };
        let sink = FolderSink::new(export_folder);
        let mut app = SmartSortApp::new(&config);

        let loaded = FileModelLoader.load(&config.model.model_url, &config.model.metadata_url);
        app.dispatch(Message::ModelLoaded(loaded), &sink);
        println!("{}", app.status_text());
        if app.model_status() != ModelStatus::Loaded {
            let reason = app.model_error().unwrap_or("model could not be loaded");
            return Err(reason.into());
        }

        if args.plate.is_empty() {
            let files = load_paths(&args.paths)?;
            app.dispatch(Message::FilesDropped(files), &sink);
        } else {
            for folder in &args.plate {
                app.dispatch(Message::PlateFolderDropped(load_folder(folder)?), &sink);
            }
            println!("Plate: {}", app.plate_summary());
            merge_plate(&mut app, &config, &sink);
        }

        println!("{}", app.summary_text());
        let labels: Vec<String> = app.groups().labels().map(str::to_string).collect();
        for group in app.groups().iter() {
            println!("  {}: {} images", group.label, group.files.len());
        }

        if args.dry_run {
            return Ok(());
        }

        let mut failed = 0;
        for label in labels {
            app.dispatch(Message::ExportGroup(label), &sink);
            if let Some(e) = app.last_export_error() {
                eprintln!("Export failed: {}", e);
                failed += 1;
            }
        }
        if failed > 0 {
            return Err(format!("{} group exports failed", failed).into());
        }
        Ok(())
    }

    /// Drop the staged plate on the drop zone and let the merge run.
    ///
    /// There is no pointer on the command line, so the plate and drop zone
    /// are laid out on the same spot and the gesture is played directly.
    fn merge_plate(app: &mut SmartSortApp, config: &AppConfig, sink: &FolderSink) {
        let origin = config.plate.origin;
        let spot = Rect::new(origin.x, origin.y, 1.0, 1.0);
        app.dispatch(Message::LayoutChanged(Region::Plate, Some(spot)), sink);
        app.dispatch(Message::LayoutChanged(Region::DropZone, Some(spot)), sink);

        app.dispatch(Message::PlatePressed(origin), sink);
        app.dispatch(Message::PointerReleased(origin), sink);

        let now = Instant::now();
        app.dispatch(Message::PoofFinished(now), sink);
        if let MergeMode::Delayed { delay_ms } = config.plate.merge_mode {
            app.dispatch(Message::Tick(now + Duration::from_millis(delay_ms)), sink);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    native::main()
}

// WASM doesn't use main(), it uses wasm_bindgen's start function
#[cfg(target_arch = "wasm32")]
fn main() {}
